//! Spectral analysis operations.
//!
//! The pipeline is split into focused modules, each usable on its own:
//!
//! - [`types`] - Configuration types and enums
//! - [`psd`] - Welch and periodogram power spectral density estimation
//! - [`band`] - Inclusive frequency band selection
//! - [`baseline`] - Min-max normalisation and polynomial baseline fitting
//! - [`peak_picking`] - Baseline-relative peak detection
//! - [`features`] - Spectral centroid, roll-off and the feature bundle
//! - [`traits`] - Method-style access on [`Signal`](crate::Signal)
//!
//! ## Quick Start
//!
//! ```rust
//! use spectral_features::operations::*;
//! use spectral_features::{Signal, sine_wave};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let samples = sine_wave::<f64>(60.0, Duration::from_secs(4), 1000.0, 1.0);
//! let signal = Signal::new(&samples, 1000.0)?;
//!
//! // Step by step
//! let spectrum = power_spectral_density(&signal, &WelchConfig::new().with_nfft(1024))?;
//! let band = FrequencyBand::new(20.0, 120.0)?;
//! let selected = select_band(&spectrum, Some(&band))?;
//! let peaks = find_spectrum_peaks(&selected, &PeakPickingConfig::new())?;
//! let centroid = spectral_centroid(&selected)?;
//!
//! // Or all at once
//! let features = signal.spectral_features(Some(&band), &SpectralConfig::new().with_nfft(1024))?;
//! assert_eq!(features.peaks, peaks.peaks);
//! assert_eq!(features.centroid, centroid);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod band;
pub mod baseline;
pub mod features;
pub mod peak_picking;
#[cfg(feature = "plotting")]
pub mod plotting;
pub mod psd;
pub mod traits;
pub mod types;

pub use band::{FrequencyBand, select_band, select_band_indices};
pub use baseline::{NormalizedCurve, normalize_min_max, polynomial_baseline};
pub use features::{
    SpectralFeatureBundle, compute_spectral_features, compute_spectral_features_with_bounds,
    spectral_centroid, spectral_rolloff,
};
pub use peak_picking::{
    Peak, PeakDetection, SpectrumPeaks, enforce_min_distance, find_peaks, find_spectrum_peaks,
    local_maxima,
};
pub use psd::{PowerSpectrum, generate_window, periodogram, power_spectral_density, welch};
pub use traits::SpectralAnalysis;
pub use types::{
    BaselineConfig, PeakPickingConfig, PsdMethod, SpectralConfig, WelchConfig, WindowType,
};
