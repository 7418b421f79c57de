//! Min-max normalisation and iterative polynomial baseline estimation.
//!
//! The baseline is the lower envelope of a curve approximated by a low-order
//! polynomial. Starting from the curve itself, each iteration fits a
//! polynomial by least squares and clips the working curve to
//! `min(curve, fit + clip_tolerance)`, so peaks are progressively shaved off
//! while the slowly varying floor is kept. Iteration stops once the relative
//! change of the coefficient vector drops below the tolerance, or after
//! `max_iterations` fits.
//!
//! Abscissae are `x_i = i / (n - 1)`, keeping the Vandermonde matrix well
//! conditioned for every supported degree. The fit runs in `f64` through the
//! SVD pseudo-inverse of the Vandermonde matrix, computed once per curve.

use nalgebra::{DMatrix, DVector};
use tracing::trace;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::types::BaselineConfig;
use crate::{RealFloat, SpectralError, SpectralResult, to_precision};

/// A curve scaled to `[0, 1]` together with the range it was scaled from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct NormalizedCurve<F> {
    /// Scaled values
    pub values: Vec<F>,
    /// Minimum of the original curve
    pub min: F,
    /// Maximum of the original curve
    pub max: F,
}

impl<F: RealFloat> NormalizedCurve<F> {
    /// Width of the original range, `max - min`.
    pub fn range(&self) -> F {
        self.max - self.min
    }

    /// True when the original curve had no measurable range.
    pub fn is_flat(&self) -> bool {
        self.range() < F::epsilon()
    }

    /// Maps a span of the original units onto the normalised scale.
    ///
    /// Returns infinity for a flat curve, where no span can be exceeded.
    pub fn scale_span(&self, span: F) -> F {
        if self.is_flat() {
            F::infinity()
        } else {
            span / self.range()
        }
    }

    /// Maps a normalised value back onto the original scale.
    pub fn denormalize(&self, value: F) -> F {
        self.min + value * self.range()
    }
}

/// Min-max normalises `curve` to `[0, 1]`.
///
/// A curve whose range is below machine epsilon becomes a constant `0.5`.
///
/// # Examples
/// ```
/// use spectral_features::operations::baseline::normalize_min_max;
///
/// let normalized = normalize_min_max(&[-10.0f64, 0.0, 10.0]);
/// assert_eq!(normalized.values, vec![0.0, 0.5, 1.0]);
/// assert_eq!((normalized.min, normalized.max), (-10.0, 10.0));
/// ```
pub fn normalize_min_max<F: RealFloat>(curve: &[F]) -> NormalizedCurve<F> {
    if curve.is_empty() {
        return NormalizedCurve {
            values: Vec::new(),
            min: F::zero(),
            max: F::zero(),
        };
    }

    let (min, max) = curve
        .iter()
        .fold((F::infinity(), F::neg_infinity()), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let range = max - min;
    let values = if range < F::epsilon() {
        vec![to_precision::<F, _>(0.5); curve.len()]
    } else {
        curve.iter().map(|&v| (v - min) / range).collect()
    };

    NormalizedCurve { values, min, max }
}

/// Least-squares polynomial fit on a fixed abscissa, factored once and
/// reused for every right-hand side.
struct PolynomialFit {
    /// Vandermonde matrix with columns `x^0, x^1, ..., x^degree`.
    design: DMatrix<f64>,
    /// Moore-Penrose pseudo-inverse of `design`.
    pseudo_inverse: DMatrix<f64>,
}

impl PolynomialFit {
    fn new(x: &[f64], degree: usize) -> SpectralResult<Self> {
        let design = vandermonde(x, degree);
        let (rows, cols) = design.shape();

        let svd = design.clone().svd(true, true);
        let largest = svd.singular_values.iter().fold(0.0f64, |acc, &s| acc.max(s));
        let rank_tolerance = largest * f64::EPSILON * rows.max(cols) as f64;
        if svd.rank(rank_tolerance) < cols {
            return Err(SpectralError::processing(
                "singular least-squares system in baseline fit",
            ));
        }

        let pseudo_inverse = svd
            .pseudo_inverse(rank_tolerance)
            .map_err(|e| SpectralError::processing(format!("baseline fit failed: {e}")))?;

        Ok(Self {
            design,
            pseudo_inverse,
        })
    }

    /// Coefficients minimising `||design * c - y||`.
    fn coefficients(&self, y: &DVector<f64>) -> DVector<f64> {
        &self.pseudo_inverse * y
    }

    fn evaluate(&self, coefficients: &DVector<f64>) -> DVector<f64> {
        &self.design * coefficients
    }
}

fn vandermonde(x: &[f64], degree: usize) -> DMatrix<f64> {
    DMatrix::from_fn(x.len(), degree + 1, |i, j| x[i].powi(j as i32))
}

/// Estimates the baseline of `curve` with an iteratively clipped polynomial
/// fit.
///
/// The degree is reduced to `curve.len() - 1` for short curves; curves with
/// fewer than two points are returned unchanged. A flat curve yields a
/// baseline equal to the curve.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`] for an invalid configuration and
/// [`SpectralError::Processing`] if the least-squares system is singular.
///
/// # Examples
/// ```
/// use spectral_features::BaselineConfig;
/// use spectral_features::operations::baseline::polynomial_baseline;
///
/// let floor: Vec<f64> = (0..50).map(|i| 0.01 * i as f64).collect();
/// let mut curve = floor.clone();
/// curve[25] += 1.0;
///
/// let baseline = polynomial_baseline(&curve, &BaselineConfig::new()).unwrap();
/// assert!((baseline[25] - floor[25]).abs() < 0.05);
/// ```
pub fn polynomial_baseline<F: RealFloat>(
    curve: &[F],
    config: &BaselineConfig,
) -> SpectralResult<Vec<F>> {
    config.validate()?;

    let n = curve.len();
    if n < 2 {
        return Ok(curve.to_vec());
    }

    let degree = config.degree.min(n - 1);
    let last = (n - 1) as f64;
    let x: Vec<f64> = (0..n).map(|i| i as f64 / last).collect();
    let fit = PolynomialFit::new(&x, degree)?;

    let tolerance = config.tolerance;
    let clip_tolerance = config.clip_tolerance;

    let mut working = DVector::from_iterator(n, curve.iter().map(|&v| to_precision::<f64, F>(v)));
    let mut coefficients = DVector::<f64>::from_element(degree + 1, 1.0);
    let mut baseline = working.clone();

    for iteration in 0..config.max_iterations {
        let updated = fit.coefficients(&working);
        let change = (&updated - &coefficients).norm();
        let reference = coefficients.norm().max(f64::EPSILON);

        if change / reference < tolerance {
            trace!(iteration, degree, "baseline fit converged");
            break;
        }

        coefficients = updated;
        baseline = fit.evaluate(&coefficients);
        for (w, &b) in working.iter_mut().zip(baseline.iter()) {
            *w = (*w).min(b + clip_tolerance);
        }
    }

    Ok(baseline.iter().map(|&v| to_precision::<F, _>(v)).collect())
}
