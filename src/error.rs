//! Error types and result utilities for spectral analysis operations.

use thiserror::Error;

/// Convenience type alias for results that may contain a [`SpectralError`].
pub type SpectralResult<T> = Result<T, SpectralError>;

/// Error types that can occur while estimating spectra or extracting features.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectralError {
    /// The caller supplied invalid input.
    ///
    /// Covers empty signals, malformed band bounds, a zero FFT size and any
    /// configuration value outside its documented range.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ParameterError),

    /// The requested frequency band excludes every bin of the frequency grid.
    #[error("Empty selection: no frequency bins within [{fmin}, {fmax}] Hz")]
    EmptySelection {
        /// Lower band edge in Hz.
        fmin: f64,
        /// Upper band edge in Hz.
        fmax: f64,
    },

    /// The spectrum carries no energy, so centroid and roll-off are undefined.
    #[error("Degenerate spectrum: {0}")]
    DegenerateSpectrum(String),

    /// An internal numeric step failed for otherwise valid input.
    #[error("Processing error: {msg}")]
    Processing {
        /// Description of the failure.
        msg: String,
    },
}

impl SpectralError {
    /// Shorthand for [`SpectralError::InvalidInput`] with an
    /// [`ParameterError::InvalidValue`] payload.
    pub fn invalid_input(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput(ParameterError::invalid_value(parameter, reason))
    }

    /// Shorthand for [`SpectralError::Processing`].
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing { msg: msg.into() }
    }

    /// Returns true if this error reports invalid caller input.
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Details about a rejected parameter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// The parameter has a value that is not allowed.
    #[error("invalid value for '{parameter}': {reason}")]
    InvalidValue {
        /// Name of the offending parameter.
        parameter: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The parameter lies outside its permitted numeric range.
    #[error("'{parameter}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        /// Name of the offending parameter.
        parameter: String,
        /// The rejected value.
        value: f64,
        /// Smallest permitted value.
        min: f64,
        /// Largest permitted value.
        max: f64,
    },

    /// A parameter that must accompany another one was not supplied.
    #[error("missing parameter '{parameter}': {reason}")]
    Missing {
        /// Name of the missing parameter.
        parameter: String,
        /// Why it is required.
        reason: String,
    },
}

impl ParameterError {
    /// Create an [`ParameterError::InvalidValue`].
    pub fn invalid_value(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Create an [`ParameterError::OutOfRange`].
    pub fn out_of_range(parameter: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            parameter: parameter.into(),
            value,
            min,
            max,
        }
    }

    /// Create a [`ParameterError::Missing`].
    pub fn missing(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Missing {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    /// Name of the parameter this error refers to.
    pub fn parameter(&self) -> &str {
        match self {
            Self::InvalidValue { parameter, .. }
            | Self::OutOfRange { parameter, .. }
            | Self::Missing { parameter, .. } => parameter,
        }
    }
}
