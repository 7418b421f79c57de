//! Baseline-relative peak picking for spectral curves.
//!
//! This module finds the peaks of a decibel curve that stand out from its
//! slowly varying noise floor. It is used on band-limited power spectra but
//! accepts any finite curve.
//!
//! ## Algorithm
//!
//! 1. Min-max normalise the curve to `[0, 1]`, remembering the original range.
//! 2. Estimate the floor with an iteratively clipped polynomial baseline
//!    (see [`polynomial_baseline`]) and subtract it.
//! 3. Find local maxima of the corrected curve. Plateaus resolve to their
//!    first index; the first and last sample are never peaks.
//! 4. Discard maxima below `relative_threshold` of the corrected curve's range.
//! 5. Apply the minimum-distance constraint greedily, strongest first, ties
//!    going to the lower index.
//! 6. Keep survivors that exceed the baseline by more than `threshold_db`,
//!    converted to the normalised scale as `threshold_db / (max - min)`.
//!
//! Steps 5 and 6 mean a weak peak close to a strong one is suppressed even
//! when the strong peak itself later fails the threshold.

use std::cmp::Ordering;

use tracing::debug;

#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

use super::baseline::{NormalizedCurve, normalize_min_max, polynomial_baseline};
use super::psd::PowerSpectrum;
use super::types::PeakPickingConfig;
use crate::{ParameterError, RealFloat, SpectralResult, to_precision};

/// A detected spectral peak.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Peak<F> {
    /// Index into the (band-limited) frequency grid
    pub index: usize,
    /// Frequency of the peak bin in Hz
    pub frequency: F,
    /// Original decibel value at the peak bin
    pub amplitude_db: F,
}

/// Result of [`find_peaks`] together with its intermediate curves.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PeakDetection<F> {
    /// Peak indices, strictly increasing
    pub indices: Vec<usize>,
    /// Normalised curve minus baseline
    pub corrected: Vec<F>,
    /// Baseline on the normalised scale
    pub baseline: Vec<F>,
    /// Normalised input and its original range
    pub normalized: NormalizedCurve<F>,
    /// Threshold on the normalised scale
    pub threshold: F,
}

/// Peaks of a power spectrum and the decibel curve they were picked from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SpectrumPeaks<F> {
    /// Peaks sorted by frequency
    pub peaks: Vec<Peak<F>>,
    /// The spectrum's power in dB, clamped at [`DB_FLOOR`](crate::DB_FLOOR)
    pub decibel_curve: Vec<F>,
}

/// Find the interior local maxima of `curve`.
///
/// A sample is a maximum when it is strictly greater than its predecessor and
/// strictly greater than the first following sample that differs from it.
/// A plateau therefore reports its first index, and a plateau running into
/// the end of the curve is not a maximum.
///
/// # Examples
/// ```
/// use spectral_features::operations::peak_picking::local_maxima;
///
/// let curve = [0.0f64, 1.0, 0.0, 2.0, 2.0, 1.0, 3.0, 3.0];
/// assert_eq!(local_maxima(&curve), vec![1, 3]);
/// ```
pub fn local_maxima<F: RealFloat>(curve: &[F]) -> Vec<usize> {
    let n = curve.len();
    let mut maxima = Vec::new();
    let mut i = 1;

    while i + 1 < n {
        if curve[i] > curve[i - 1] {
            let mut end = i;
            while end + 1 < n && curve[end + 1] == curve[i] {
                end += 1;
            }
            if end + 1 < n && curve[end + 1] < curve[i] {
                maxima.push(i);
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }

    maxima
}

/// Apply the minimum-distance constraint to `(index, strength)` candidates.
///
/// Candidates are visited in descending strength, ties going to the lower
/// index; a candidate closer than `min_dist` to an already kept one is
/// dropped. The kept indices are returned in increasing order.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
/// if `min_dist` is zero.
///
/// # Examples
/// ```
/// use spectral_features::operations::peak_picking::enforce_min_distance;
///
/// let candidates = [(2, 0.5f64), (3, 0.9), (6, 0.7), (10, 0.7)];
/// assert_eq!(enforce_min_distance(&candidates, 4).unwrap(), vec![3, 10]);
/// ```
pub fn enforce_min_distance<F: RealFloat>(
    candidates: &[(usize, F)],
    min_dist: usize,
) -> SpectralResult<Vec<usize>> {
    if min_dist == 0 {
        return Err(ParameterError::invalid_value(
            "min_dist",
            "minimum peak distance must be greater than 0",
        )
        .into());
    }

    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let mut kept: Vec<usize> = Vec::with_capacity(ordered.len());
    for &(index, _) in &ordered {
        if kept.iter().all(|&other| index.abs_diff(other) >= min_dist) {
            kept.push(index);
        }
    }

    kept.sort_unstable();
    Ok(kept)
}

/// Pick the peaks of a decibel curve that rise above its baseline.
///
/// Returns the peak indices together with the normalised curve, the baseline,
/// the corrected curve and the normalised threshold. Curves with fewer than
/// three points and flat curves yield no peaks.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
/// for an invalid configuration or a non-finite curve value.
///
/// # Examples
/// ```
/// use spectral_features::{PeakPickingConfig, find_peaks};
///
/// let mut curve: Vec<f64> = (0..64).map(|i| -60.0 + 0.1 * i as f64).collect();
/// curve[20] += 25.0;
/// curve[45] += 3.0;
///
/// let detection = find_peaks(&curve, &PeakPickingConfig::new()).unwrap();
/// assert_eq!(detection.indices, vec![20]);
/// ```
pub fn find_peaks<F: RealFloat>(
    curve_db: &[F],
    config: &PeakPickingConfig,
) -> SpectralResult<PeakDetection<F>> {
    config.validate()?;

    if let Some(position) = curve_db.iter().position(|v| !v.is_finite()) {
        return Err(ParameterError::invalid_value(
            "curve",
            format!("value at index {position} is not finite"),
        )
        .into());
    }

    let normalized = normalize_min_max(curve_db);
    let threshold = normalized.scale_span(to_precision::<F, _>(config.threshold_db));

    if normalized.is_flat() || curve_db.len() < 3 {
        debug!(len = curve_db.len(), "curve too short or flat, no peaks");
        let baseline = if normalized.is_flat() {
            normalized.values.clone()
        } else {
            polynomial_baseline(&normalized.values, &config.baseline)?
        };
        let corrected = subtract(&normalized.values, &baseline);
        return Ok(PeakDetection {
            indices: Vec::new(),
            corrected,
            baseline,
            normalized,
            threshold,
        });
    }

    let baseline = polynomial_baseline(&normalized.values, &config.baseline)?;
    let corrected = subtract(&normalized.values, &baseline);

    let (low, high) = corrected
        .iter()
        .fold((F::infinity(), F::neg_infinity()), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let gate = low + to_precision::<F, _>(config.relative_threshold) * (high - low);

    let candidates: Vec<(usize, F)> = local_maxima(&corrected)
        .into_iter()
        .map(|i| (i, corrected[i]))
        .filter(|&(_, value)| value > gate)
        .collect();

    let mut indices = enforce_min_distance(&candidates, config.min_dist)?;
    indices.retain(|&i| corrected[i] > threshold);

    debug!(
        candidates = candidates.len(),
        peaks = indices.len(),
        min_dist = config.min_dist,
        "peak picking complete"
    );

    Ok(PeakDetection {
        indices,
        corrected,
        baseline,
        normalized,
        threshold,
    })
}

/// Pick the peaks of a power spectrum.
///
/// Converts the power to decibels, runs [`find_peaks`] and maps the indices
/// back to frequencies and original decibel amplitudes.
///
/// # Errors
/// Returns [`SpectralError::InvalidInput`](crate::SpectralError::InvalidInput)
/// for an invalid configuration or an inconsistent spectrum.
pub fn find_spectrum_peaks<F: RealFloat>(
    spectrum: &PowerSpectrum<F>,
    config: &PeakPickingConfig,
) -> SpectralResult<SpectrumPeaks<F>> {
    spectrum.validate()?;
    let decibel_curve = spectrum.to_db();
    let detection = find_peaks(&decibel_curve, config)?;

    let peaks = detection
        .indices
        .iter()
        .map(|&index| Peak {
            index,
            frequency: spectrum.frequencies[index],
            amplitude_db: decibel_curve[index],
        })
        .collect();

    Ok(SpectrumPeaks {
        peaks,
        decibel_curve,
    })
}

fn subtract<F: RealFloat>(values: &[F], baseline: &[F]) -> Vec<F> {
    values
        .iter()
        .zip(baseline)
        .map(|(&v, &b)| v - b)
        .collect()
}
