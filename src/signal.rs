//! Borrowed signal representation consumed by the analysis pipeline.

use ndarray::ArrayView1;

use crate::{ParameterError, RealFloat, SpectralResult, to_precision};

/// A one-dimensional real signal paired with its sample rate.
///
/// The samples are borrowed from the caller and never modified. Construction
/// validates the invariants every downstream stage relies on: at least one
/// sample, only finite sample values and a finite, strictly positive sample
/// rate.
#[derive(Debug, Clone, Copy)]
pub struct Signal<'a, F: RealFloat> {
    samples: ArrayView1<'a, F>,
    sample_rate: F,
}

impl<'a, F: RealFloat> Signal<'a, F> {
    /// Creates a signal from a slice of samples.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
    /// if `samples` is empty, contains a non-finite value, or if
    /// `sample_rate` is not finite and positive.
    ///
    /// # Examples
    /// ```
    /// use spectral_features::Signal;
    ///
    /// let samples = [0.0f64, 1.0, 0.0, -1.0];
    /// let signal = Signal::new(&samples, 4.0).unwrap();
    /// assert_eq!(signal.len(), 4);
    ///
    /// assert!(Signal::<f64>::new(&[], 4.0).is_err());
    /// ```
    pub fn new(samples: &'a [F], sample_rate: F) -> SpectralResult<Self> {
        Self::from_view(ArrayView1::from(samples), sample_rate)
    }

    /// Creates a signal from an `ndarray` view.
    ///
    /// # Errors
    /// Same conditions as [`Signal::new`].
    pub fn from_view(samples: ArrayView1<'a, F>, sample_rate: F) -> SpectralResult<Self> {
        if samples.is_empty() {
            return Err(ParameterError::invalid_value("signal", "signal must not be empty").into());
        }

        if !sample_rate.is_finite() || sample_rate <= F::zero() {
            return Err(ParameterError::invalid_value(
                "sample_rate",
                format!(
                    "sample rate must be finite and > 0, got {}",
                    to_precision::<f64, F>(sample_rate)
                ),
            )
            .into());
        }

        if let Some(position) = samples.iter().position(|s| !s.is_finite()) {
            return Err(ParameterError::invalid_value(
                "signal",
                format!("sample at index {position} is not finite"),
            )
            .into());
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Borrowed view of the samples.
    pub const fn samples(&self) -> ArrayView1<'a, F> {
        self.samples
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> F {
        self.sample_rate
    }

    /// Nyquist frequency (`sample_rate / 2`) in Hz.
    pub fn nyquist(&self) -> F {
        self.sample_rate / to_precision::<F, _>(2.0)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a successfully constructed signal.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the signal in seconds.
    pub fn duration_seconds(&self) -> F {
        to_precision::<F, _>(self.len()) / self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpectralError;
    use approx_eq::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn test_signal_accessors() {
        let samples = vec![0.5f64; 100];
        let signal = Signal::new(&samples, 50.0).unwrap();

        assert_eq!(signal.len(), 100);
        assert!(!signal.is_empty());
        assert_eq!(signal.sample_rate(), 50.0);
        assert_approx_eq!(signal.nyquist(), 25.0, 1e-12);
        assert_approx_eq!(signal.duration_seconds(), 2.0, 1e-12);
    }

    #[test]
    fn test_signal_from_ndarray_view() {
        let data = array![1.0f32, -1.0, 0.5];
        let signal = Signal::from_view(data.view(), 8.0).unwrap();
        assert_eq!(signal.samples()[1], -1.0);
    }

    #[test]
    fn test_empty_signal_rejected() {
        let err = Signal::<f64>::new(&[], 1000.0).unwrap_err();
        assert!(matches!(err, SpectralError::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_sample_rate_rejected() {
        let samples = [1.0f64, 2.0];
        assert!(Signal::new(&samples, 0.0).is_err());
        assert!(Signal::new(&samples, -44100.0).is_err());
        assert!(Signal::new(&samples, f64::NAN).is_err());
        assert!(Signal::new(&samples, f64::INFINITY).is_err());
    }

    #[test]
    fn test_non_finite_sample_rejected() {
        let samples = [1.0f64, f64::NAN, 2.0];
        let err = Signal::new(&samples, 100.0).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}
