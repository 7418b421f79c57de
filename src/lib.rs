// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)] // Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![allow(clippy::too_many_arguments)]
#![deny(missing_docs)] // Documentation is a must for release

//! # spectral_features
//!
//! Spectral peak detection and feature extraction for one-dimensional signals.
//!
//! Given a signal and its sample rate the crate estimates a power spectral
//! density, removes a slowly varying noise floor, picks the spectral peaks that
//! stand out from that floor, and summarises the spectrum with its centroid and
//! roll-off frequency. Every stage can be restricted to an inclusive frequency
//! band.
//!
//! ## Pipeline
//!
//! 1. [`operations::psd`] - Welch power spectral density (periodogram fallback).
//! 2. [`operations::band`] - inclusive `[fmin, fmax]` band selection.
//! 3. [`operations::baseline`] and [`operations::peak_picking`] - dB conversion,
//!    min-max normalisation, iterative polynomial baseline, thresholded peaks.
//! 4. [`operations::features`] - spectral centroid, roll-off and the
//!    [`SpectralFeatureBundle`].
//!
//! All stages are pure functions: no I/O, no shared state, no interior
//! mutability. Independent signals can be analysed from as many threads as
//! you like (see the `parallel-processing` feature).
//!
//! ## Features
//!
//! - `serialization`: `serde` support for configurations and results
//! - `plotting`: interactive plots of a feature bundle (using `plotly`)
//! - `parallel-processing`: batch analysis over many signals (using `rayon`)
//!
//! ## Error Handling
//!
//! ```rust
//! use spectral_features::{ParameterError, SpectralError, SpectralResult};
//!
//! let result: SpectralResult<()> = Err(SpectralError::InvalidInput(
//!     ParameterError::invalid_value("nfft", "must be > 0"),
//! ));
//!
//! match result {
//!     Ok(()) => {}
//!     Err(SpectralError::InvalidInput(err)) => eprintln!("Invalid input: {err}"),
//!     Err(SpectralError::DegenerateSpectrum(msg)) => eprintln!("No energy: {msg}"),
//!     Err(other) => eprintln!("Other error: {other}"),
//! }
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use spectral_features::{
//!     FrequencyBand, Signal, SpectralConfig, ToneComponent, compound_tone,
//!     compute_spectral_features,
//! };
//! use std::time::Duration;
//!
//! let samples = compound_tone::<f64>(
//!     &[ToneComponent::new(50.0, 1.0), ToneComponent::new(200.0, 1.0)],
//!     Duration::from_secs(4),
//!     1000.0,
//! );
//! let signal = Signal::new(&samples, 1000.0).unwrap();
//!
//! let config = SpectralConfig::new().with_nfft(1024).with_min_dist(2);
//! let features = compute_spectral_features(&signal, None, &config).unwrap();
//! assert_eq!(features.peaks.len(), 2);
//! assert!(features.centroid > 50.0 && features.centroid < 200.0);
//!
//! // Restrict the analysis to 100-300 Hz
//! let band = FrequencyBand::new(100.0, 300.0).unwrap();
//! let features = compute_spectral_features(&signal, Some(&band), &config).unwrap();
//! assert!(features.frequencies.iter().all(|&f| (100.0..=300.0).contains(&f)));
//! ```
//!
//! ## License
//!
//! MIT License

mod error;

#[cfg(feature = "parallel-processing")]
pub mod batch;
pub mod operations;
mod signal;
pub mod utils;

pub use crate::error::{ParameterError, SpectralError, SpectralResult};
pub use crate::operations::{
    BaselineConfig, FrequencyBand, NormalizedCurve, Peak, PeakDetection, PeakPickingConfig,
    PowerSpectrum, PsdMethod, SpectralAnalysis, SpectralConfig, SpectralFeatureBundle,
    SpectrumPeaks, WelchConfig, WindowType, compute_spectral_features,
    compute_spectral_features_with_bounds, find_peaks, find_spectrum_peaks,
    power_spectral_density, select_band, spectral_centroid, spectral_rolloff,
};
pub use crate::signal::Signal;
pub use crate::utils::{
    audio_math::{DB_FLOOR, db_to_power, fft_frequencies, power_to_db, power_to_db_curve},
    generation::{ToneComponent, compound_tone, silence, sine_wave},
};

#[cfg(feature = "plotting")]
pub use crate::operations::plotting::SpectralFeaturePlot;

#[cfg(feature = "parallel-processing")]
pub use crate::batch::{
    compute_spectral_features_batch, compute_spectral_features_batch_with_threads,
};

use num_traits::{Float, FloatConst, NumCast};
use rustfft::FftNum;

/// Marker trait for real floating-point types (f32, f64)
pub trait RealFloat: Float + FloatConst + NumCast + FftNum {}

impl RealFloat for f32 {}
impl RealFloat for f64 {}

/// Casts a numeric value into the target floating-point type `F`.
///
/// Abstracts over floating-point precision in generic code where the target
/// type `F: RealFloat` may be either `f32` or `f64`. Internally uses
/// `num_traits::NumCast::from`.
///
/// # Examples
/// ```
/// use spectral_features::to_precision;
///
/// let value_f32: f32 = to_precision(42usize);
/// assert_eq!(value_f32, 42.0);
///
/// let value_f64: f64 = to_precision(0.5f32);
/// assert_eq!(value_f64, 0.5);
/// ```
///
/// # Panics
/// Panics if the numeric conversion fails. Conversions between primitive
/// integers and `f32`/`f64` never fail.
#[inline(always)]
pub fn to_precision<F, T>(value: T) -> F
where
    F: RealFloat + NumCast,
    T: NumCast,
{
    NumCast::from(value).expect("to_precision: valid numeric conversion")
}
