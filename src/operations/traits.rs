//! Method-style access to the spectral pipeline.

use super::band::{FrequencyBand, select_band};
use super::features::{
    SpectralFeatureBundle, compute_spectral_features, spectral_centroid, spectral_rolloff,
};
use super::peak_picking::{SpectrumPeaks, find_spectrum_peaks};
use super::psd::{PowerSpectrum, power_spectral_density};
use super::types::{PeakPickingConfig, SpectralConfig, WelchConfig};
use crate::{RealFloat, Signal, SpectralResult};

/// Spectral analysis operations on a signal.
///
/// Every method is a thin wrapper over the free functions in
/// [`operations`](crate::operations) and shares their error behaviour.
///
/// # Examples
/// ```
/// use spectral_features::{Signal, SpectralAnalysis, WelchConfig, sine_wave};
/// use std::time::Duration;
///
/// let samples = sine_wave::<f64>(100.0, Duration::from_secs(1), 1000.0, 1.0);
/// let signal = Signal::new(&samples, 1000.0).unwrap();
///
/// let centroid = signal.spectral_centroid(None, &WelchConfig::new().with_nfft(512)).unwrap();
/// assert!((centroid - 100.0).abs() < 5.0);
/// ```
pub trait SpectralAnalysis<F: RealFloat> {
    /// Power spectral density of the signal.
    fn power_spectrum(&self, config: &WelchConfig) -> SpectralResult<PowerSpectrum<F>>;

    /// Peaks of the (optionally band-limited) power spectrum.
    fn spectral_peaks(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
        peaks: &PeakPickingConfig,
    ) -> SpectralResult<SpectrumPeaks<F>>;

    /// Spectral centroid over the (optionally band-limited) spectrum.
    fn spectral_centroid(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
    ) -> SpectralResult<F>;

    /// Spectral roll-off over the (optionally band-limited) spectrum.
    fn spectral_rolloff(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
        fraction: F,
    ) -> SpectralResult<F>;

    /// The complete feature bundle.
    fn spectral_features(
        &self,
        band: Option<&FrequencyBand<F>>,
        config: &SpectralConfig,
    ) -> SpectralResult<SpectralFeatureBundle<F>>;
}

impl<F: RealFloat> SpectralAnalysis<F> for Signal<'_, F> {
    fn power_spectrum(&self, config: &WelchConfig) -> SpectralResult<PowerSpectrum<F>> {
        power_spectral_density(self, config)
    }

    fn spectral_peaks(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
        peaks: &PeakPickingConfig,
    ) -> SpectralResult<SpectrumPeaks<F>> {
        let spectrum = select_band(&self.power_spectrum(psd)?, band)?;
        find_spectrum_peaks(&spectrum, peaks)
    }

    fn spectral_centroid(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
    ) -> SpectralResult<F> {
        spectral_centroid(&select_band(&self.power_spectrum(psd)?, band)?)
    }

    fn spectral_rolloff(
        &self,
        band: Option<&FrequencyBand<F>>,
        psd: &WelchConfig,
        fraction: F,
    ) -> SpectralResult<F> {
        spectral_rolloff(&select_band(&self.power_spectrum(psd)?, band)?, fraction)
    }

    fn spectral_features(
        &self,
        band: Option<&FrequencyBand<F>>,
        config: &SpectralConfig,
    ) -> SpectralResult<SpectralFeatureBundle<F>> {
        compute_spectral_features(self, band, config)
    }
}
