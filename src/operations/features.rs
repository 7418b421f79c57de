//! Spectral centroid, roll-off and the complete feature pipeline.
//!
//! [`compute_spectral_features`] runs the whole chain: PSD estimation, band
//! selection, peak picking on the band-limited decibel curve and the two
//! aggregate descriptors. Peaks, centroid and roll-off always share one
//! frequency window.

use tracing::debug;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::band::{FrequencyBand, select_band};
use super::peak_picking::{Peak, find_spectrum_peaks};
use super::psd::{PowerSpectrum, power_spectral_density};
use super::types::{SpectralConfig, validate_rolloff_fraction};
use crate::{RealFloat, Signal, SpectralError, SpectralResult, to_precision};

/// Spectral descriptors of one signal over one frequency window.
///
/// `frequencies`, `power` and `decibel_curve` are paired element-wise and
/// cover only the selected band.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SpectralFeatureBundle<F> {
    /// Power-weighted mean frequency in Hz
    pub centroid: F,
    /// Frequency below which the configured fraction of power lies, in Hz
    pub rolloff: F,
    /// Peaks sorted by frequency
    pub peaks: Vec<Peak<F>>,
    /// Power in dB
    pub decibel_curve: Vec<F>,
    /// Frequency grid in Hz
    pub frequencies: Vec<F>,
    /// Power density per bin
    pub power: Vec<F>,
}

impl<F: RealFloat> SpectralFeatureBundle<F> {
    /// Peak frequencies in Hz.
    pub fn peak_frequencies(&self) -> Vec<F> {
        self.peaks.iter().map(|p| p.frequency).collect()
    }

    /// Peak amplitudes in dB.
    pub fn peak_amplitudes_db(&self) -> Vec<F> {
        self.peaks.iter().map(|p| p.amplitude_db).collect()
    }

    /// The band-limited power spectrum the features were computed from.
    pub fn power_spectrum(&self) -> PowerSpectrum<F> {
        PowerSpectrum {
            frequencies: self.frequencies.clone(),
            power: self.power.clone(),
        }
    }
}

fn total_power<F: RealFloat>(spectrum: &PowerSpectrum<F>) -> SpectralResult<F> {
    spectrum.validate()?;
    let total = spectrum.total_power();
    if !total.is_finite() || total <= F::zero() {
        return Err(SpectralError::DegenerateSpectrum(
            "total power is zero, spectral descriptors are undefined".to_string(),
        ));
    }
    Ok(total)
}

/// Power-weighted mean frequency of a spectrum.
///
/// The result is clamped to the first and last grid frequency.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] for an inconsistent spectrum (see
/// [`PowerSpectrum::validate`]) and [`SpectralError::DegenerateSpectrum`] if
/// the spectrum carries no power.
///
/// # Examples
/// ```
/// use spectral_features::{PowerSpectrum, spectral_centroid};
///
/// let spectrum = PowerSpectrum::new(vec![0.0f64, 10.0, 20.0, 30.0], vec![0.0, 1.0, 1.0, 0.0]).unwrap();
/// assert_eq!(spectral_centroid(&spectrum).unwrap(), 15.0);
/// ```
pub fn spectral_centroid<F: RealFloat>(spectrum: &PowerSpectrum<F>) -> SpectralResult<F> {
    let total = total_power(spectrum)?;
    let weighted = spectrum
        .frequencies
        .iter()
        .zip(&spectrum.power)
        .fold(F::zero(), |acc, (&f, &p)| acc + f * p);

    let first = spectrum.frequencies[0];
    let last = spectrum.frequencies[spectrum.len() - 1];
    Ok((weighted / total).max(first).min(last))
}

/// Lowest frequency below which `fraction` of the total power lies.
///
/// Returns the first grid frequency whose cumulative power reaches
/// `fraction * total`. A fraction of `1.0`, or one that rounding keeps out of
/// reach, yields the last grid frequency.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] if `fraction` lies outside
/// `[0, 1]` or the spectrum is inconsistent, and
/// [`SpectralError::DegenerateSpectrum`] if the spectrum carries no power.
///
/// # Examples
/// ```
/// use spectral_features::{PowerSpectrum, spectral_rolloff};
///
/// let spectrum = PowerSpectrum::new(vec![0.0f64, 10.0, 20.0, 30.0], vec![1.0; 4]).unwrap();
/// assert_eq!(spectral_rolloff(&spectrum, 0.5).unwrap(), 10.0);
/// assert_eq!(spectral_rolloff(&spectrum, 1.0).unwrap(), 30.0);
/// ```
pub fn spectral_rolloff<F: RealFloat>(spectrum: &PowerSpectrum<F>, fraction: F) -> SpectralResult<F> {
    validate_rolloff_fraction(to_precision::<f64, F>(fraction))?;
    let total = total_power(spectrum)?;
    let last = spectrum.frequencies[spectrum.len() - 1];

    if fraction >= F::one() {
        return Ok(last);
    }

    let target = fraction * total;
    let mut cumulative = F::zero();
    for (&frequency, &power) in spectrum.frequencies.iter().zip(&spectrum.power) {
        cumulative = cumulative + power;
        if cumulative >= target {
            return Ok(frequency);
        }
    }

    Ok(last)
}

/// Compute the spectral feature bundle of a signal.
///
/// Estimates the PSD, restricts it to `band` (the full `[0, fs/2]` range when
/// `None`), picks peaks on the band-limited decibel curve and computes the
/// centroid and roll-off over the same bins.
///
/// With the default [`PeakPickingConfig`](crate::PeakPickingConfig) a peak
/// must clear `threshold_db` above the baseline and also rise above 30% of
/// the baseline-corrected range, so a small peak next to a much larger one
/// can be dropped even though it passes `threshold_db`. Set
/// `relative_threshold` to `0.0` (for example
/// `SpectralConfig::new().with_peaks(PeakPickingConfig::new().with_relative_threshold(0.0))`)
/// to select peaks on `threshold_db` and `min_dist` alone.
///
/// # Errors
/// - [`SpectralError::InvalidInput`] for an invalid configuration
/// - [`SpectralError::EmptySelection`] when the band excludes every bin
/// - [`SpectralError::DegenerateSpectrum`] when the band carries no power,
///   e.g. for an all-zero signal
///
/// # Examples
/// ```
/// use spectral_features::{Signal, SpectralConfig, compute_spectral_features, sine_wave};
/// use std::time::Duration;
///
/// let samples = sine_wave::<f64>(100.0, Duration::from_secs(3), 1000.0, 1.0);
/// let signal = Signal::new(&samples, 1000.0).unwrap();
///
/// let features = compute_spectral_features(&signal, None, &SpectralConfig::new()).unwrap();
/// assert_eq!(features.peaks.len(), 1);
/// assert!((features.peaks[0].frequency - 100.0).abs() < 0.5);
/// ```
pub fn compute_spectral_features<F: RealFloat>(
    signal: &Signal<'_, F>,
    band: Option<&FrequencyBand<F>>,
    config: &SpectralConfig,
) -> SpectralResult<SpectralFeatureBundle<F>> {
    config.validate()?;

    let spectrum = power_spectral_density(signal, &config.psd)?;
    let selected = select_band(&spectrum, band)?;
    let peaks = find_spectrum_peaks(&selected, &config.peaks)?;

    let centroid = spectral_centroid(&selected)?;
    let rolloff = spectral_rolloff(&selected, to_precision::<F, _>(config.rolloff_fraction))?;

    debug!(
        bins = selected.len(),
        peaks = peaks.peaks.len(),
        centroid = to_precision::<f64, F>(centroid),
        rolloff = to_precision::<f64, F>(rolloff),
        "spectral features computed"
    );

    Ok(SpectralFeatureBundle {
        centroid,
        rolloff,
        peaks: peaks.peaks,
        decibel_curve: peaks.decibel_curve,
        frequencies: selected.frequencies,
        power: selected.power,
    })
}

/// Compute the spectral feature bundle with optional band edges.
///
/// Both edges or neither must be given; see [`FrequencyBand::from_bounds`].
///
/// # Errors
/// As [`compute_spectral_features`], plus
/// [`SpectralError::InvalidInput`] when only one edge is given or
/// `fmin > fmax`.
pub fn compute_spectral_features_with_bounds<F: RealFloat>(
    signal: &Signal<'_, F>,
    fmin: Option<F>,
    fmax: Option<F>,
    config: &SpectralConfig,
) -> SpectralResult<SpectralFeatureBundle<F>> {
    let band = FrequencyBand::from_bounds(fmin, fmax)?;
    compute_spectral_features(signal, band.as_ref(), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::types::PeakPickingConfig;
    use crate::utils::generation::{ToneComponent, compound_tone, silence};
    use approx_eq::assert_approx_eq;
    use std::time::Duration;

    const FS: f64 = 1000.0;

    fn two_tone() -> Vec<f64> {
        compound_tone(
            &[ToneComponent::new(50.0, 1.0), ToneComponent::new(200.0, 1.0)],
            Duration::from_secs(4),
            FS,
        )
    }

    fn scenario_config() -> SpectralConfig {
        SpectralConfig::new().with_nfft(1024).with_min_dist(2)
    }

    fn flat_spectrum() -> PowerSpectrum<f64> {
        PowerSpectrum::new(vec![0.0, 10.0, 20.0, 30.0], vec![1.0; 4]).unwrap()
    }

    #[test]
    fn test_spectral_centroid() {
        assert_approx_eq!(spectral_centroid(&flat_spectrum()).unwrap(), 15.0, 1e-12);

        let low = PowerSpectrum::new(vec![0.0f64, 10.0, 20.0], vec![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(spectral_centroid(&low).unwrap(), 0.0);

        let high = PowerSpectrum::new(vec![5.0f64, 10.0, 20.0], vec![0.0, 0.0, 2.0]).unwrap();
        assert_approx_eq!(spectral_centroid(&high).unwrap(), 20.0, 1e-12);
    }

    #[test]
    fn test_degenerate_spectrum() {
        let silent = PowerSpectrum::new(vec![0.0f64, 10.0], vec![0.0, 0.0]).unwrap();
        assert!(matches!(
            spectral_centroid(&silent),
            Err(SpectralError::DegenerateSpectrum(_))
        ));
        assert!(matches!(
            spectral_rolloff(&silent, 0.85),
            Err(SpectralError::DegenerateSpectrum(_))
        ));
    }

    #[test]
    fn test_spectral_rolloff() {
        let spectrum = flat_spectrum();
        assert_eq!(spectral_rolloff(&spectrum, 0.0).unwrap(), 0.0);
        assert_eq!(spectral_rolloff(&spectrum, 0.5).unwrap(), 10.0);
        assert_eq!(spectral_rolloff(&spectrum, 0.74).unwrap(), 20.0);
        assert_eq!(spectral_rolloff(&spectrum, 0.85).unwrap(), 30.0);
        assert_eq!(spectral_rolloff(&spectrum, 1.0).unwrap(), 30.0);

        assert!(spectral_rolloff(&spectrum, 1.5).unwrap_err().is_invalid_input());
        assert!(spectral_rolloff(&spectrum, -0.1).unwrap_err().is_invalid_input());
        assert!(spectral_rolloff(&spectrum, f64::NAN).is_err());
    }

    #[test]
    fn test_spectral_rolloff_is_monotonic() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();

        let mut previous = 0.0;
        for fraction in [0.0, 0.1, 0.25, 0.5, 0.75, 0.85, 0.95, 1.0] {
            let config = scenario_config().with_rolloff_fraction(fraction);
            let rolloff = compute_spectral_features(&signal, None, &config).unwrap().rolloff;
            assert!(rolloff >= previous);
            previous = rolloff;
        }
        assert_eq!(previous, FS / 2.0);
    }

    #[test]
    fn test_two_tone_scenario() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();
        let features = compute_spectral_features(&signal, None, &scenario_config()).unwrap();

        let resolution = FS / 1024.0;
        assert_eq!(features.frequencies.len(), 513);
        assert_eq!(features.power.len(), 513);
        assert_eq!(features.decibel_curve.len(), 513);

        assert_eq!(features.peaks.len(), 2);
        assert!((features.peaks[0].frequency - 50.0).abs() <= resolution);
        assert!((features.peaks[1].frequency - 200.0).abs() <= resolution);
        assert!(features.centroid > 50.0 && features.centroid < 200.0);

        for peak in &features.peaks {
            assert_eq!(features.frequencies[peak.index], peak.frequency);
            assert_eq!(features.decibel_curve[peak.index], peak.amplitude_db);
        }
        assert_eq!(features.peak_frequencies().len(), 2);
        assert_eq!(features.peak_amplitudes_db().len(), 2);
    }

    #[test]
    fn test_band_limited_features() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();
        let band = FrequencyBand::new(100.0, 300.0).unwrap();
        let features = compute_spectral_features(&signal, Some(&band), &scenario_config()).unwrap();

        assert!(features.frequencies.iter().all(|&f| band.contains(f)));
        assert!(features.frequencies.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(features.frequencies.len(), features.decibel_curve.len());

        assert_eq!(features.peaks.len(), 1);
        assert!((features.peaks[0].frequency - 200.0).abs() <= FS / 1024.0);
        assert!(band.contains(features.centroid));
        assert!(band.contains(features.rolloff));

        let by_bounds =
            compute_spectral_features_with_bounds(&signal, Some(100.0), Some(300.0), &scenario_config())
                .unwrap();
        assert_eq!(by_bounds, features);
    }

    #[test]
    fn test_peak_properties_hold() {
        let samples = compound_tone(
            &[
                ToneComponent::new(40.0, 1.0),
                ToneComponent::new(120.0, 0.5),
                ToneComponent::new(125.0, 0.5),
                ToneComponent::new(310.0, 0.25),
            ],
            Duration::from_secs(5),
            FS,
        );
        let signal = Signal::new(&samples, FS).unwrap();

        for min_dist in [1, 3, 10] {
            let config = SpectralConfig::new().with_nfft(1024).with_min_dist(min_dist);
            let features = compute_spectral_features(&signal, None, &config).unwrap();
            assert!(!features.peaks.is_empty());
            assert!(
                features
                    .peaks
                    .windows(2)
                    .all(|w| w[1].index - w[0].index >= min_dist && w[0].frequency < w[1].frequency)
            );
        }
    }

    #[test]
    fn test_threshold_monotonicity() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();

        let mut previous = usize::MAX;
        for threshold_db in [0.0, 3.0, 6.0, 24.0, 96.0, 200.0] {
            let config = scenario_config().with_threshold_db(threshold_db);
            let count = compute_spectral_features(&signal, None, &config).unwrap().peaks.len();
            assert!(count <= previous);
            previous = count;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_all_zero_signal() {
        let samples = silence::<f64>(Duration::from_secs(2), FS);
        let signal = Signal::new(&samples, FS).unwrap();

        let err = compute_spectral_features(&signal, None, &scenario_config()).unwrap_err();
        assert!(matches!(err, SpectralError::DegenerateSpectrum(_)));

        let spectrum = power_spectral_density(&signal, &scenario_config().psd).unwrap();
        let peaks = find_spectrum_peaks(&spectrum, &PeakPickingConfig::new()).unwrap();
        assert!(peaks.peaks.is_empty());
    }

    #[test]
    fn test_invalid_bounds() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();
        let config = scenario_config();

        let err = compute_spectral_features_with_bounds(&signal, Some(600.0), Some(500.0), &config)
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(compute_spectral_features_with_bounds(&signal, Some(10.0), None, &config).is_err());
        assert!(compute_spectral_features_with_bounds(&signal, None, Some(10.0), &config).is_err());

        let err = compute_spectral_features_with_bounds(&signal, Some(600.0), Some(700.0), &config)
            .unwrap_err();
        assert!(matches!(err, SpectralError::EmptySelection { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();

        for config in [
            scenario_config().with_nfft(0),
            scenario_config().with_min_dist(0),
            scenario_config().with_rolloff_fraction(2.0),
            scenario_config().with_threshold_db(-6.0),
        ] {
            assert!(compute_spectral_features(&signal, None, &config).unwrap_err().is_invalid_input());
        }
    }

    #[test]
    fn test_short_signal_uses_fallback() {
        let samples = compound_tone(
            &[ToneComponent::new(50.0, 1.0)],
            Duration::from_millis(300),
            FS,
        );
        let signal = Signal::new(&samples, FS).unwrap();
        let features = compute_spectral_features(&signal, None, &scenario_config()).unwrap();

        assert_eq!(features.frequencies.len(), 513);
        assert!(features.decibel_curve.iter().all(|v| v.is_finite()));
        assert!(features.centroid >= 0.0 && features.centroid <= FS / 2.0);
    }

    #[test]
    fn test_f32_pipeline() {
        let samples = compound_tone::<f32>(
            &[ToneComponent::new(50.0, 1.0), ToneComponent::new(200.0, 1.0)],
            Duration::from_secs(4),
            1000.0,
        );
        let signal = Signal::new(&samples, 1000.0f32).unwrap();
        let features = compute_spectral_features(&signal, None, &scenario_config()).unwrap();

        assert_eq!(features.frequencies.len(), 513);
        assert!(features.centroid > 0.0 && features.centroid < 500.0);
        assert!(features.peaks.windows(2).all(|w| w[1].index - w[0].index >= 2));
    }

    #[test]
    fn test_bundle_power_spectrum_roundtrip() {
        let samples = two_tone();
        let signal = Signal::new(&samples, FS).unwrap();
        let features = compute_spectral_features(&signal, None, &scenario_config()).unwrap();

        let spectrum = features.power_spectrum();
        assert_eq!(spectral_centroid(&spectrum).unwrap(), features.centroid);
    }

    #[test]
    fn test_mismatched_spectrum_is_rejected() {
        let spectrum = PowerSpectrum {
            frequencies: Vec::<f64>::new(),
            power: vec![1.0],
        };
        assert!(spectral_centroid(&spectrum).unwrap_err().is_invalid_input());
        assert!(spectral_rolloff(&spectrum, 0.5).unwrap_err().is_invalid_input());

        let shorter_grid = PowerSpectrum {
            frequencies: vec![0.0, 10.0],
            power: vec![1.0, 2.0, 3.0],
        };
        assert!(spectral_centroid(&shorter_grid).unwrap_err().is_invalid_input());
        assert!(spectral_rolloff(&shorter_grid, 1.0).unwrap_err().is_invalid_input());
    }
}
