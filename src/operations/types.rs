//! Supporting types and enums for spectral operations.
//!
//! This module contains the configuration types used by the PSD estimator,
//! the baseline fit, the peak picker and the full feature pipeline. Every
//! configuration follows the same pattern: a `const fn new()` with the
//! documented defaults, a handful of presets, `with_*` builder setters and a
//! `validate()` that reports the first offending parameter.

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use crate::{ParameterError, SpectralResult};

/// Window functions for spectral analysis.
///
/// All windows are generated in their periodic form (denominator `N`
/// rather than `N - 1`), which is the form used for spectral estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum WindowType {
    /// Rectangular window (no windowing) - best frequency resolution but high leakage.
    Rectangular,
    /// Hanning window - good general-purpose window with moderate leakage.
    #[default]
    Hanning,
    /// Hamming window - similar to Hanning but slightly different coefficients.
    Hamming,
    /// Blackman window - low leakage but wider main lobe.
    Blackman,
}

/// Power spectral density estimation methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PsdMethod {
    /// Welch's method: average of windowed, overlapping segment periodograms.
    /// Lower variance at the cost of frequency resolution.
    #[default]
    Welch,
    /// Single-segment periodogram over (at most `nfft` samples of) the signal.
    Periodogram,
}

/// Configuration for power spectral density estimation.
///
/// `segment_len` and `overlap` are optional; when unset the segment length
/// equals `nfft` and consecutive segments overlap by half a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct WelchConfig {
    /// Estimation method
    pub method: PsdMethod,
    /// FFT length; the frequency grid has `nfft / 2 + 1` bins
    pub nfft: usize,
    /// Samples per segment (defaults to `nfft`)
    pub segment_len: Option<usize>,
    /// Samples shared by consecutive segments (defaults to `segment_len / 2`)
    pub overlap: Option<usize>,
    /// Window applied to every segment
    pub window: WindowType,
}

impl WelchConfig {
    /// Create a new PSD configuration with default settings.
    ///
    /// Default configuration:
    /// - Welch's method
    /// - 2048-point FFT
    /// - Segment length equal to `nfft`, 50% overlap
    /// - Hanning window
    pub const fn new() -> Self {
        Self {
            method: PsdMethod::Welch,
            nfft: 2048,
            segment_len: None,
            overlap: None,
            window: WindowType::Hanning,
        }
    }

    /// Create a single-segment periodogram configuration.
    pub const fn periodogram(nfft: usize, window: WindowType) -> Self {
        Self {
            method: PsdMethod::Periodogram,
            nfft,
            segment_len: None,
            overlap: None,
            window,
        }
    }

    /// Set the FFT length.
    pub const fn with_nfft(mut self, nfft: usize) -> Self {
        self.nfft = nfft;
        self
    }

    /// Set the segment length in samples.
    pub const fn with_segment_len(mut self, segment_len: usize) -> Self {
        self.segment_len = Some(segment_len);
        self
    }

    /// Set the segment overlap in samples.
    pub const fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = Some(overlap);
        self
    }

    /// Set the window function.
    pub const fn with_window(mut self, window: WindowType) -> Self {
        self.window = window;
        self
    }

    /// Set the estimation method.
    pub const fn with_method(mut self, method: PsdMethod) -> Self {
        self.method = method;
        self
    }

    /// Segment length actually used.
    pub fn effective_segment_len(&self) -> usize {
        self.segment_len.unwrap_or(self.nfft)
    }

    /// Overlap actually used.
    pub fn effective_overlap(&self) -> usize {
        self.overlap.unwrap_or(self.effective_segment_len() / 2)
    }

    /// Number of bins in the one-sided frequency grid.
    pub const fn num_bins(&self) -> usize {
        self.nfft / 2 + 1
    }

    /// Validate the PSD configuration.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
    /// if `nfft` is zero, the segment length is zero or exceeds `nfft`, or the
    /// overlap is not smaller than the segment length.
    pub fn validate(&self) -> SpectralResult<()> {
        if self.nfft == 0 {
            return Err(ParameterError::invalid_value("nfft", "FFT size must be greater than 0").into());
        }

        let segment_len = self.effective_segment_len();
        if segment_len == 0 {
            return Err(ParameterError::invalid_value(
                "segment_len",
                "segment length must be greater than 0",
            )
            .into());
        }
        if segment_len > self.nfft {
            return Err(ParameterError::invalid_value(
                "segment_len",
                format!(
                    "segment length {segment_len} exceeds FFT size {}",
                    self.nfft
                ),
            )
            .into());
        }

        let overlap = self.effective_overlap();
        if overlap >= segment_len {
            return Err(ParameterError::invalid_value(
                "overlap",
                format!("overlap {overlap} must be smaller than segment length {segment_len}"),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the iterative polynomial baseline fit.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BaselineConfig {
    /// Polynomial degree (0..=10)
    pub degree: usize,
    /// Upper bound on refit iterations
    pub max_iterations: usize,
    /// Relative coefficient change below which the fit is considered converged
    pub tolerance: f64,
    /// Margin added to the fit before clipping the working curve
    pub clip_tolerance: f64,
}

impl BaselineConfig {
    /// Highest supported polynomial degree.
    pub const MAX_DEGREE: usize = 10;

    /// Create a new baseline configuration with default settings.
    ///
    /// Default configuration:
    /// - Cubic polynomial
    /// - At most 100 iterations
    /// - Convergence tolerance of 1e-3
    /// - No clip margin
    pub const fn new() -> Self {
        Self {
            degree: 3,
            max_iterations: 100,
            tolerance: 1e-3,
            clip_tolerance: 0.0,
        }
    }

    /// Set the polynomial degree.
    pub const fn with_degree(mut self, degree: usize) -> Self {
        self.degree = degree;
        self
    }

    /// Set the maximum number of iterations.
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the convergence tolerance.
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the clip margin.
    pub const fn with_clip_tolerance(mut self, clip_tolerance: f64) -> Self {
        self.clip_tolerance = clip_tolerance;
        self
    }

    /// Validate the baseline configuration.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
    /// for a degree above [`Self::MAX_DEGREE`], zero iterations, a non-positive
    /// tolerance or a negative clip margin.
    pub fn validate(&self) -> SpectralResult<()> {
        if self.degree > Self::MAX_DEGREE {
            return Err(ParameterError::out_of_range(
                "degree",
                self.degree as f64,
                0.0,
                Self::MAX_DEGREE as f64,
            )
            .into());
        }

        if self.max_iterations == 0 {
            return Err(ParameterError::invalid_value(
                "max_iterations",
                "at least one iteration is required",
            )
            .into());
        }

        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ParameterError::invalid_value(
                "tolerance",
                "tolerance must be finite and greater than 0",
            )
            .into());
        }

        if !self.clip_tolerance.is_finite() || self.clip_tolerance < 0.0 {
            return Err(ParameterError::invalid_value(
                "clip_tolerance",
                "clip tolerance must be finite and non-negative",
            )
            .into());
        }

        Ok(())
    }
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for baseline-relative spectral peak picking.
///
/// A peak survives when it is a local maximum of the baseline-corrected,
/// min-max normalised decibel curve, rises above `relative_threshold` of that
/// curve's range, is at least `min_dist` bins away from every stronger
/// survivor and exceeds the baseline by more than `threshold_db` decibels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PeakPickingConfig {
    /// Required height above the baseline, in dB
    pub threshold_db: f64,
    /// Minimum index separation between peaks
    pub min_dist: usize,
    /// Height gate as a fraction of the corrected curve's range (0.0-1.0)
    pub relative_threshold: f64,
    /// Baseline fit settings
    pub baseline: BaselineConfig,
}

impl PeakPickingConfig {
    /// Create a new peak picking configuration with default settings.
    ///
    /// Default configuration:
    /// - 6 dB above baseline
    /// - Adjacent peaks allowed (`min_dist = 1`)
    /// - 30% relative height gate
    /// - Default cubic baseline
    pub const fn new() -> Self {
        Self {
            threshold_db: 6.0,
            min_dist: 1,
            relative_threshold: 0.3,
            baseline: BaselineConfig::new(),
        }
    }

    /// Create a permissive configuration that reports every local maximum
    /// standing above the baseline.
    pub const fn sensitive() -> Self {
        Self {
            threshold_db: 0.0,
            min_dist: 1,
            relative_threshold: 0.0,
            baseline: BaselineConfig::new(),
        }
    }

    /// Set the threshold above baseline in dB.
    pub const fn with_threshold_db(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    /// Set the minimum index separation.
    pub const fn with_min_dist(mut self, min_dist: usize) -> Self {
        self.min_dist = min_dist;
        self
    }

    /// Set the relative height gate.
    pub const fn with_relative_threshold(mut self, relative_threshold: f64) -> Self {
        self.relative_threshold = relative_threshold;
        self
    }

    /// Set the baseline configuration.
    pub const fn with_baseline(mut self, baseline: BaselineConfig) -> Self {
        self.baseline = baseline;
        self
    }

    /// Validate the peak picking configuration.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
    /// for a non-finite or negative threshold, `min_dist == 0`, a relative
    /// threshold outside `[0, 1]` or an invalid baseline configuration.
    pub fn validate(&self) -> SpectralResult<()> {
        if !self.threshold_db.is_finite() || self.threshold_db < 0.0 {
            return Err(ParameterError::invalid_value(
                "threshold_db",
                format!(
                    "threshold must be finite and non-negative, got {}",
                    self.threshold_db
                ),
            )
            .into());
        }

        if self.min_dist == 0 {
            return Err(ParameterError::invalid_value(
                "min_dist",
                "minimum peak distance must be greater than 0",
            )
            .into());
        }

        if !(0.0..=1.0).contains(&self.relative_threshold) {
            return Err(ParameterError::out_of_range(
                "relative_threshold",
                self.relative_threshold,
                0.0,
                1.0,
            )
            .into());
        }

        self.baseline.validate()
    }
}

impl Default for PeakPickingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the complete spectral feature pipeline.
///
/// # Examples
/// ```
/// use spectral_features::{SpectralConfig, WindowType};
///
/// let config = SpectralConfig::new()
///     .with_nfft(1024)
///     .with_threshold_db(3.0)
///     .with_min_dist(4)
///     .with_window(WindowType::Hamming);
/// assert!(config.validate().is_ok());
/// assert!(SpectralConfig::new().with_rolloff_fraction(1.5).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SpectralConfig {
    /// PSD estimation settings
    pub psd: WelchConfig,
    /// Peak picking settings
    pub peaks: PeakPickingConfig,
    /// Fraction of total power below the roll-off frequency (0.0-1.0)
    pub rolloff_fraction: f64,
}

impl SpectralConfig {
    /// Create a new pipeline configuration with default settings.
    ///
    /// Default configuration:
    /// - Welch PSD with a 2048-point FFT
    /// - Peaks 6 dB above baseline, `min_dist = 1`
    /// - 85% roll-off
    pub const fn new() -> Self {
        Self {
            psd: WelchConfig::new(),
            peaks: PeakPickingConfig::new(),
            rolloff_fraction: 0.85,
        }
    }

    /// Set the FFT length.
    pub const fn with_nfft(mut self, nfft: usize) -> Self {
        self.psd.nfft = nfft;
        self
    }

    /// Set the window function.
    pub const fn with_window(mut self, window: WindowType) -> Self {
        self.psd.window = window;
        self
    }

    /// Set the PSD estimation method.
    pub const fn with_method(mut self, method: PsdMethod) -> Self {
        self.psd.method = method;
        self
    }

    /// Replace the PSD configuration.
    pub const fn with_psd(mut self, psd: WelchConfig) -> Self {
        self.psd = psd;
        self
    }

    /// Set the threshold above baseline in dB.
    pub const fn with_threshold_db(mut self, threshold_db: f64) -> Self {
        self.peaks.threshold_db = threshold_db;
        self
    }

    /// Set the minimum index separation between peaks.
    pub const fn with_min_dist(mut self, min_dist: usize) -> Self {
        self.peaks.min_dist = min_dist;
        self
    }

    /// Replace the peak picking configuration.
    pub const fn with_peaks(mut self, peaks: PeakPickingConfig) -> Self {
        self.peaks = peaks;
        self
    }

    /// Set the roll-off fraction.
    pub const fn with_rolloff_fraction(mut self, rolloff_fraction: f64) -> Self {
        self.rolloff_fraction = rolloff_fraction;
        self
    }

    /// Validate the pipeline configuration.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
    /// for the first invalid nested value.
    pub fn validate(&self) -> SpectralResult<()> {
        self.psd.validate()?;
        self.peaks.validate()?;
        validate_rolloff_fraction(self.rolloff_fraction)
    }
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_rolloff_fraction(fraction: f64) -> SpectralResult<()> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(ParameterError::out_of_range("rolloff_fraction", fraction, 0.0, 1.0).into());
    }
    Ok(())
}
