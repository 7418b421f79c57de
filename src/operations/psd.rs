//! Power spectral density estimation.
//!
//! Implements Welch's averaged periodogram and the plain single-segment
//! periodogram. Both produce a one-sided density spectrum in units of
//! `signal² / Hz` on the grid `k * fs / nfft` for `k = 0..=nfft/2`.
//!
//! ## Scaling
//!
//! Every segment is detrended by subtracting its mean, multiplied by the
//! window `w`, zero-padded to `nfft` and transformed. The density of bin `k`
//! is `|X[k]|² / (fs * Σ w²)`; every bin except DC and, for even `nfft`, the
//! Nyquist bin is doubled to fold in the negative frequencies. Welch's method
//! averages these segment densities.

use std::sync::Arc;

use ndarray::{ArrayView1, s};
use num_complex::Complex;
use num_traits::FloatConst;
use rustfft::{Fft, FftPlanner};
use tracing::{debug, trace};

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::types::{PsdMethod, WelchConfig, WindowType};
use crate::utils::audio_math::{fft_frequencies, power_to_db_curve};
use crate::{ParameterError, RealFloat, Signal, SpectralError, SpectralResult, to_precision};

/// A frequency grid paired with its power curve.
///
/// `frequencies` is strictly increasing and has the same length as `power`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PowerSpectrum<F> {
    /// Bin centre frequencies in Hz
    pub frequencies: Vec<F>,
    /// Power density per bin (non-negative)
    pub power: Vec<F>,
}

impl<F: RealFloat> PowerSpectrum<F> {
    /// Pairs a frequency grid with a power curve.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`] when the lengths differ, the
    /// grid is not strictly increasing, or a power value is negative or not
    /// finite.
    pub fn new(frequencies: Vec<F>, power: Vec<F>) -> SpectralResult<Self> {
        let spectrum = Self { frequencies, power };
        spectrum.validate()?;
        Ok(spectrum)
    }

    /// Checks the pairing, ordering and range invariants.
    ///
    /// Every operation taking a `PowerSpectrum` runs this first, so a
    /// spectrum built directly from its fields fails with an error instead of
    /// an out-of-bounds index.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`] when the lengths differ, the
    /// grid is not strictly increasing, or a power value is negative or not
    /// finite.
    pub fn validate(&self) -> SpectralResult<()> {
        let Self { frequencies, power } = self;
        if frequencies.len() != power.len() {
            return Err(ParameterError::invalid_value(
                "power",
                format!(
                    "power curve has {} values but the frequency grid has {} bins",
                    power.len(),
                    frequencies.len()
                ),
            )
            .into());
        }

        if !frequencies.windows(2).all(|w| w[0] < w[1]) {
            return Err(ParameterError::invalid_value(
                "frequencies",
                "frequency grid must be strictly increasing",
            )
            .into());
        }

        if let Some(position) = power.iter().position(|&p| !p.is_finite() || p < F::zero()) {
            return Err(ParameterError::invalid_value(
                "power",
                format!("power at index {position} is negative or not finite"),
            )
            .into());
        }

        Ok(())
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// True if the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Sum of the power curve.
    pub fn total_power(&self) -> F {
        self.power.iter().fold(F::zero(), |acc, &p| acc + p)
    }

    /// Power curve in decibels, clamped at [`DB_FLOOR`](crate::DB_FLOOR).
    pub fn to_db(&self) -> Vec<F> {
        power_to_db_curve(&self.power)
    }
}

/// Generate periodic window coefficients of length `size`.
///
/// A single-sample window is always `[1.0]`.
pub fn generate_window<F: RealFloat>(size: usize, window_type: WindowType) -> Vec<F> {
    if size <= 1 {
        return vec![F::one(); size];
    }

    let n = to_precision::<F, _>(size);
    let two_pi = to_precision::<F, _>(2.0) * <F as FloatConst>::PI();
    let phase = |i: usize| two_pi * to_precision::<F, _>(i) / n;

    match window_type {
        WindowType::Rectangular => vec![F::one(); size],
        WindowType::Hanning => (0..size)
            .map(|i| to_precision::<F, _>(0.5) * (F::one() - phase(i).cos()))
            .collect(),
        WindowType::Hamming => (0..size)
            .map(|i| to_precision::<F, _>(0.54) - to_precision::<F, _>(0.46) * phase(i).cos())
            .collect(),
        WindowType::Blackman => (0..size)
            .map(|i| {
                let theta = phase(i);
                (to_precision::<F, _>(0.42) - to_precision::<F, _>(0.5) * theta.cos()
                    + to_precision::<F, _>(0.08) * (theta + theta).cos())
                .max(F::zero())
            })
            .collect(),
    }
}

/// Detrends, windows and transforms segments, accumulating their one-sided
/// densities.
struct SegmentEstimator<F: RealFloat> {
    fft: Arc<dyn Fft<F>>,
    window: Vec<F>,
    scale: F,
    nfft: usize,
    buffer: Vec<Complex<F>>,
}

impl<F: RealFloat> SegmentEstimator<F> {
    fn new(
        nfft: usize,
        segment_len: usize,
        window_type: WindowType,
        sample_rate: F,
    ) -> SpectralResult<Self> {
        let window = generate_window::<F>(segment_len, window_type);
        let energy = window.iter().fold(F::zero(), |acc, &w| acc + w * w);
        if energy <= F::zero() {
            return Err(SpectralError::processing(format!(
                "{window_type:?} window of length {segment_len} has no energy"
            )));
        }

        let mut planner = FftPlanner::<F>::new();
        Ok(Self {
            fft: planner.plan_fft_forward(nfft),
            window,
            scale: sample_rate * energy,
            nfft,
            buffer: vec![Complex::new(F::zero(), F::zero()); nfft],
        })
    }

    fn accumulate(&mut self, segment: ArrayView1<'_, F>, density: &mut [F]) {
        let len = to_precision::<F, _>(segment.len());
        let mean = segment.iter().fold(F::zero(), |acc, &x| acc + x) / len;

        self.buffer.fill(Complex::new(F::zero(), F::zero()));
        for ((dst, &x), &w) in self.buffer.iter_mut().zip(segment.iter()).zip(&self.window) {
            *dst = Complex::new((x - mean) * w, F::zero());
        }
        self.fft.process(&mut self.buffer);

        let nyquist = self.nfft / 2;
        for (k, acc) in density.iter_mut().enumerate() {
            let mut value = self.buffer[k].norm_sqr() / self.scale;
            if k != 0 && !(self.nfft.is_multiple_of(2) && k == nyquist) {
                value = value + value;
            }
            *acc = *acc + value;
        }
    }
}

/// Start offsets of every full segment that fits into `len` samples.
fn segment_starts(len: usize, segment_len: usize, overlap: usize) -> Vec<usize> {
    let hop = segment_len - overlap;
    (0..)
        .map(|i| i * hop)
        .take_while(|start| start + segment_len <= len)
        .collect()
}

/// Estimate the power spectral density with Welch's method.
///
/// The signal is split into segments of `segment_len` samples overlapping by
/// `overlap` samples; the periodograms of all full segments are averaged.
/// When the signal is shorter than one segment, a single segment spanning
/// the whole signal is used instead (zero-padded to `nfft`).
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] for an invalid configuration.
///
/// # Examples
/// ```
/// use spectral_features::{Signal, WelchConfig, sine_wave};
/// use spectral_features::operations::psd::welch;
/// use std::time::Duration;
///
/// let samples = sine_wave::<f64>(125.0, Duration::from_secs(2), 1000.0, 1.0);
/// let signal = Signal::new(&samples, 1000.0).unwrap();
/// let spectrum = welch(&signal, &WelchConfig::new().with_nfft(256)).unwrap();
///
/// assert_eq!(spectrum.len(), 129);
/// let peak_bin = (0..spectrum.len())
///     .max_by(|&a, &b| spectrum.power[a].total_cmp(&spectrum.power[b]))
///     .unwrap();
/// assert_eq!(spectrum.frequencies[peak_bin], 125.0);
/// ```
pub fn welch<F: RealFloat>(
    signal: &Signal<'_, F>,
    config: &WelchConfig,
) -> SpectralResult<PowerSpectrum<F>> {
    config.validate()?;

    let samples = signal.samples();
    let nfft = config.nfft;
    let mut segment_len = config.effective_segment_len();
    let mut overlap = config.effective_overlap();

    if samples.len() < segment_len {
        debug!(
            signal_len = samples.len(),
            segment_len, "signal shorter than one segment, using a single-segment periodogram"
        );
        segment_len = samples.len();
        overlap = 0;
    }

    let starts = segment_starts(samples.len(), segment_len, overlap);
    let mut estimator =
        SegmentEstimator::new(nfft, segment_len, config.window, signal.sample_rate())?;
    let mut density = vec![F::zero(); config.num_bins()];

    for &start in &starts {
        estimator.accumulate(samples.slice(s![start..start + segment_len]), &mut density);
    }

    let count = to_precision::<F, _>(starts.len());
    for value in &mut density {
        *value = *value / count;
    }

    debug!(
        segments = starts.len(),
        segment_len,
        overlap,
        nfft,
        "welch estimate complete"
    );

    Ok(PowerSpectrum {
        frequencies: fft_frequencies(nfft, signal.sample_rate()),
        power: density,
    })
}

/// Estimate the power spectral density with a single periodogram.
///
/// Uses the first `nfft` samples when the signal is longer and zero-pads
/// shorter signals. The segment is mean-detrended and windowed like a Welch
/// segment.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] if `nfft` is zero.
pub fn periodogram<F: RealFloat>(
    signal: &Signal<'_, F>,
    nfft: usize,
    window: WindowType,
) -> SpectralResult<PowerSpectrum<F>> {
    if nfft == 0 {
        return Err(ParameterError::invalid_value("nfft", "FFT size must be greater than 0").into());
    }

    let samples = signal.samples();
    let segment_len = samples.len().min(nfft);
    if segment_len < samples.len() {
        trace!(
            signal_len = samples.len(),
            nfft, "periodogram uses the first nfft samples"
        );
    }

    let mut estimator = SegmentEstimator::new(nfft, segment_len, window, signal.sample_rate())?;
    let mut density = vec![F::zero(); nfft / 2 + 1];
    estimator.accumulate(samples.slice(s![..segment_len]), &mut density);

    Ok(PowerSpectrum {
        frequencies: fft_frequencies(nfft, signal.sample_rate()),
        power: density,
    })
}

/// Estimate the power spectral density with the method selected in `config`.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] for an invalid configuration.
pub fn power_spectral_density<F: RealFloat>(
    signal: &Signal<'_, F>,
    config: &WelchConfig,
) -> SpectralResult<PowerSpectrum<F>> {
    match config.method {
        PsdMethod::Welch => welch(signal, config),
        PsdMethod::Periodogram => {
            config.validate()?;
            periodogram(signal, config.nfft, config.window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generation::sine_wave;
    use approx_eq::assert_approx_eq;
    use ndarray::Array1;
    use std::time::Duration;

    fn integrated_power(spectrum: &PowerSpectrum<f64>) -> f64 {
        let df = spectrum.frequencies[1] - spectrum.frequencies[0];
        spectrum.total_power() * df
    }

    fn argmax(values: &[f64]) -> usize {
        (0..values.len())
            .max_by(|&a, &b| values[a].total_cmp(&values[b]))
            .unwrap()
    }

    #[test]
    fn test_window_functions() {
        let hann = generate_window::<f64>(4, WindowType::Hanning);
        assert_eq!(hann[0], 0.0);
        assert_approx_eq!(hann[1], 0.5, 1e-12);
        assert_approx_eq!(hann[2], 1.0, 1e-12);
        assert_approx_eq!(hann[3], 0.5, 1e-12);

        assert_eq!(generate_window::<f64>(1, WindowType::Hanning), vec![1.0]);
        assert_eq!(generate_window::<f64>(1, WindowType::Blackman), vec![1.0]);
        assert!(generate_window::<f64>(0, WindowType::Hamming).is_empty());
        assert_eq!(generate_window::<f32>(3, WindowType::Rectangular), vec![1.0; 3]);

        let hamming = generate_window::<f64>(8, WindowType::Hamming);
        assert_approx_eq!(hamming[0], 0.08, 1e-12);
        let blackman = generate_window::<f64>(8, WindowType::Blackman);
        assert!(blackman.iter().all(|&w| (0.0..=1.0 + 1e-12).contains(&w)));
    }

    #[test]
    fn test_segment_starts() {
        assert_eq!(segment_starts(10, 4, 2), vec![0, 2, 4, 6]);
        assert_eq!(segment_starts(4, 4, 2), vec![0]);
        assert_eq!(segment_starts(9, 3, 0), vec![0, 3, 6]);
    }

    #[test]
    fn test_welch_grid_and_peak() {
        // 256 Hz sits exactly on bin 64 of a 256-point FFT at 1024 Hz
        let samples = sine_wave::<f64>(256.0, Duration::from_secs(2), 1024.0, 1.0);
        let signal = Signal::new(&samples, 1024.0).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(256)).unwrap();

        assert_eq!(spectrum.len(), 129);
        assert_eq!(spectrum.power.len(), spectrum.frequencies.len());
        assert_eq!(spectrum.frequencies[0], 0.0);
        assert_eq!(spectrum.frequencies[128], 512.0);
        assert_eq!(argmax(&spectrum.power), 64);
        assert!(spectrum.power.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_welch_density_preserves_power() {
        // A bin-centred sine of amplitude 2 carries 2.0 units of power
        let samples = sine_wave::<f64>(256.0, Duration::from_secs(2), 1024.0, 2.0);
        let signal = Signal::new(&samples, 1024.0).unwrap();

        for window in [WindowType::Hanning, WindowType::Rectangular] {
            let config = WelchConfig::new().with_nfft(256).with_window(window);
            let spectrum = welch(&signal, &config).unwrap();
            assert_approx_eq!(integrated_power(&spectrum), 2.0, 1e-6);
        }
    }

    #[test]
    fn test_welch_zero_padding_with_short_segments() {
        let samples = sine_wave::<f64>(100.0, Duration::from_secs(1), 1000.0, 1.0);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let config = WelchConfig::new().with_nfft(512).with_segment_len(200);
        let spectrum = welch(&signal, &config).unwrap();

        assert_eq!(spectrum.len(), 257);
        let peak = spectrum.frequencies[argmax(&spectrum.power)];
        assert!((peak - 100.0).abs() <= 2.0);
    }

    #[test]
    fn test_welch_short_signal_falls_back_to_single_segment() {
        let samples = sine_wave::<f64>(50.0, Duration::from_millis(100), 1000.0, 1.0);
        let signal = Signal::new(&samples, 1000.0).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(1024)).unwrap();

        assert_eq!(spectrum.len(), 513);
        assert!(spectrum.power.iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!(spectrum.total_power() > 0.0);

        let single = Signal::new(&[1.5f64], 1000.0).unwrap();
        let spectrum = welch(&single, &WelchConfig::new().with_nfft(16)).unwrap();
        assert_eq!(spectrum.len(), 9);
        assert!(spectrum.power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_constant_and_zero_signals_have_no_power() {
        let constant = vec![3.0f64; 512];
        let signal = Signal::new(&constant, 100.0).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(128)).unwrap();
        assert!(spectrum.power.iter().all(|&p| p == 0.0));

        let zeros = vec![0.0f64; 300];
        let signal = Signal::new(&zeros, 100.0).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(64)).unwrap();
        assert_eq!(spectrum.total_power(), 0.0);
    }

    #[test]
    fn test_odd_nfft_grid() {
        let samples = sine_wave::<f64>(10.0, Duration::from_secs(1), 100.0, 1.0);
        let signal = Signal::new(&samples, 100.0).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(25)).unwrap();
        assert_eq!(spectrum.len(), 13);
        assert!(spectrum.frequencies[12] < 50.0);
    }

    #[test]
    fn test_periodogram_truncates_and_preserves_power() {
        let samples = sine_wave::<f64>(256.0, Duration::from_secs(2), 1024.0, 1.0);
        let signal = Signal::new(&samples, 1024.0).unwrap();
        let spectrum = periodogram(&signal, 512, WindowType::Rectangular).unwrap();

        assert_eq!(spectrum.len(), 257);
        assert_eq!(argmax(&spectrum.power), 128);
        assert_approx_eq!(integrated_power(&spectrum), 0.5, 1e-6);
    }

    #[test]
    fn test_power_spectral_density_dispatch() {
        let samples = sine_wave::<f64>(256.0, Duration::from_secs(1), 1024.0, 1.0);
        let signal = Signal::new(&samples, 1024.0).unwrap();

        let config = WelchConfig::periodogram(256, WindowType::Hanning);
        let dispatched = power_spectral_density(&signal, &config).unwrap();
        let direct = periodogram(&signal, 256, WindowType::Hanning).unwrap();
        assert_eq!(dispatched, direct);

        let config = WelchConfig::new().with_nfft(256);
        assert_eq!(
            power_spectral_density(&signal, &config).unwrap(),
            welch(&signal, &config).unwrap()
        );
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let samples = vec![1.0f64, -1.0, 1.0, -1.0];
        let signal = Signal::new(&samples, 4.0).unwrap();

        let err = welch(&signal, &WelchConfig::new().with_nfft(0)).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(periodogram(&signal, 0, WindowType::Hanning).is_err());
        assert!(
            welch(
                &signal,
                &WelchConfig::new().with_nfft(8).with_segment_len(8).with_overlap(8)
            )
            .is_err()
        );
    }

    #[test]
    fn test_strided_view_and_f32() {
        let data = Array1::from(sine_wave::<f32>(50.0, Duration::from_secs(2), 1000.0, 1.0));
        let strided = data.slice(s![..;2]);
        let signal = Signal::from_view(strided, 500.0f32).unwrap();
        let spectrum = welch(&signal, &WelchConfig::new().with_nfft(256)).unwrap();

        assert_eq!(spectrum.len(), 129);
        assert!(spectrum.power.iter().all(|p| p.is_finite() && *p >= 0.0));
    }

    #[test]
    fn test_power_spectrum_new_validates() {
        assert!(PowerSpectrum::new(vec![0.0f64, 1.0], vec![1.0, 2.0]).is_ok());
        assert!(PowerSpectrum::new(vec![0.0f64, 1.0], vec![1.0]).is_err());
        assert!(PowerSpectrum::new(vec![1.0f64, 1.0], vec![1.0, 2.0]).is_err());
        assert!(PowerSpectrum::new(vec![0.0f64, 1.0], vec![-1.0, 2.0]).is_err());

        let assembled = PowerSpectrum {
            frequencies: Vec::<f64>::new(),
            power: vec![1.0],
        };
        assert!(assembled.validate().unwrap_err().is_invalid_input());
        assert!(PowerSpectrum::<f64>::new(Vec::new(), Vec::new()).unwrap().validate().is_ok());
    }
}
