//! Inclusive frequency band selection.

use std::ops::Range;

use tracing::trace;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::psd::PowerSpectrum;
use crate::{ParameterError, RealFloat, SpectralError, SpectralResult, to_precision};

/// An inclusive frequency band `[fmin, fmax]` in Hz.
///
/// Construction guarantees both edges are finite, `fmin >= 0` and
/// `fmin <= fmax`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FrequencyBand<F> {
    fmin: F,
    fmax: F,
}

impl<F: RealFloat> FrequencyBand<F> {
    /// Creates a band from its lower and upper edge.
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`] if either edge is not finite,
    /// `fmin` is negative or `fmin > fmax`.
    ///
    /// # Examples
    /// ```
    /// use spectral_features::FrequencyBand;
    ///
    /// let alpha = FrequencyBand::new(8.0f64, 12.0).unwrap();
    /// assert!(alpha.contains(10.0));
    /// assert!(FrequencyBand::new(600.0f64, 500.0).is_err());
    /// ```
    pub fn new(fmin: F, fmax: F) -> SpectralResult<Self> {
        if !fmin.is_finite() || !fmax.is_finite() {
            return Err(ParameterError::invalid_value(
                "band",
                "band edges must be finite",
            )
            .into());
        }

        if fmin < F::zero() {
            return Err(ParameterError::invalid_value(
                "fmin",
                format!("fmin must be >= 0, got {}", to_precision::<f64, F>(fmin)),
            )
            .into());
        }

        if fmin > fmax {
            return Err(ParameterError::invalid_value(
                "band",
                format!(
                    "fmin ({}) must not exceed fmax ({})",
                    to_precision::<f64, F>(fmin),
                    to_precision::<f64, F>(fmax)
                ),
            )
            .into());
        }

        Ok(Self { fmin, fmax })
    }

    /// Builds an optional band from optional edges.
    ///
    /// Both edges give a band, neither gives `None` (the full spectrum).
    ///
    /// # Errors
    /// Returns [`SpectralError::InvalidInput`] when exactly one edge is given
    /// or the edges are invalid.
    pub fn from_bounds(fmin: Option<F>, fmax: Option<F>) -> SpectralResult<Option<Self>> {
        match (fmin, fmax) {
            (Some(fmin), Some(fmax)) => Self::new(fmin, fmax).map(Some),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ParameterError::missing(
                "fmax",
                "fmin was given without fmax",
            )
            .into()),
            (None, Some(_)) => Err(ParameterError::missing(
                "fmin",
                "fmax was given without fmin",
            )
            .into()),
        }
    }

    /// Lower edge in Hz.
    pub const fn fmin(&self) -> F {
        self.fmin
    }

    /// Upper edge in Hz.
    pub const fn fmax(&self) -> F {
        self.fmax
    }

    /// Whether `frequency` lies within the band, edges included.
    pub fn contains(&self, frequency: F) -> bool {
        self.fmin <= frequency && frequency <= self.fmax
    }

    fn empty_selection(&self) -> SpectralError {
        SpectralError::EmptySelection {
            fmin: to_precision::<f64, F>(self.fmin),
            fmax: to_precision::<f64, F>(self.fmax),
        }
    }
}

/// Index range of the bins of a strictly increasing grid that fall inside
/// `band`.
///
/// # Errors
/// Returns [`SpectralError::EmptySelection`] when no bin lies in the band.
pub fn select_band_indices<F: RealFloat>(
    frequencies: &[F],
    band: &FrequencyBand<F>,
) -> SpectralResult<Range<usize>> {
    let start = frequencies.partition_point(|&f| f < band.fmin);
    let end = frequencies.partition_point(|&f| f <= band.fmax);

    if start >= end {
        return Err(band.empty_selection());
    }
    Ok(start..end)
}

/// Restricts a spectrum to the bins inside `band`.
///
/// `None` returns the full spectrum unchanged. Order and the pairing of
/// frequencies with power values are preserved.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] for an inconsistent spectrum and
/// [`SpectralError::EmptySelection`] when the band excludes every bin.
///
/// # Examples
/// ```
/// use spectral_features::{FrequencyBand, PowerSpectrum, select_band};
///
/// let spectrum = PowerSpectrum::new(vec![0.0f64, 10.0, 20.0, 30.0], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
/// let band = FrequencyBand::new(10.0, 20.0).unwrap();
///
/// let selected = select_band(&spectrum, Some(&band)).unwrap();
/// assert_eq!(selected.frequencies, vec![10.0, 20.0]);
/// assert_eq!(selected.power, vec![2.0, 3.0]);
/// ```
pub fn select_band<F: RealFloat>(
    spectrum: &PowerSpectrum<F>,
    band: Option<&FrequencyBand<F>>,
) -> SpectralResult<PowerSpectrum<F>> {
    spectrum.validate()?;
    let Some(band) = band else {
        return Ok(spectrum.clone());
    };

    let range = select_band_indices(&spectrum.frequencies, band)?;
    trace!(
        start = range.start,
        end = range.end,
        bins = spectrum.len(),
        "band selection"
    );

    Ok(PowerSpectrum {
        frequencies: spectrum.frequencies[range.clone()].to_vec(),
        power: spectrum.power[range].to_vec(),
    })
}
