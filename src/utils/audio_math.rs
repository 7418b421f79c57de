//! Spectral mathematics utilities and conversion functions.
//!
//! Power/decibel conversions and FFT frequency grids shared by the PSD
//! estimator, the peak picker and the feature aggregator.
//!
//! # Examples
//!
//! ```rust
//! use spectral_features::utils::audio_math::{fft_frequencies, power_to_db};
//!
//! let db = power_to_db(0.5f64); // ≈ -3.01 dB
//! let freqs = fft_frequencies(8, 1000.0f64); // [0, 125, ..., 500]
//! assert_eq!(freqs.len(), 5);
//! ```

use crate::{RealFloat, to_precision};

// =============================================================================
// POWER CONVERSIONS
// =============================================================================

/// Lowest decibel value produced by [`power_to_db`].
///
/// `10 * log10(0)` is `-inf`, which the polynomial baseline fit cannot work
/// with. Any power at or below `1e-30` (including exact zero) is reported as
/// `-300 dB`.
pub const DB_FLOOR: f64 = -300.0;

/// Converts power to decibels.
///
/// Uses the formula: `dB = 10 * log10(power)` and clamps the result at
/// [`DB_FLOOR`], so zero, negative and NaN power all map to `-300 dB`.
///
/// # Examples
///
/// ```rust
/// use spectral_features::utils::audio_math::{DB_FLOOR, power_to_db};
///
/// let db = power_to_db(1.0f64); // 0.0 dB
/// let db_half = power_to_db(0.5f64); // ≈ -3.01 dB
/// assert_eq!(power_to_db(0.0f64), DB_FLOOR);
/// ```
pub fn power_to_db<F: RealFloat>(power: F) -> F {
    let floor = to_precision::<F, _>(DB_FLOOR);
    if power > F::zero() {
        (to_precision::<F, _>(10.0) * power.log10()).max(floor)
    } else {
        floor
    }
}

/// Converts a whole power curve to decibels with [`power_to_db`].
pub fn power_to_db_curve<F: RealFloat>(power: &[F]) -> Vec<F> {
    power.iter().map(|&p| power_to_db(p)).collect()
}

/// Converts decibels to power.
///
/// Uses the formula: `power = 10^(dB / 10)` for power ratios.
///
/// # Examples
///
/// ```rust
/// use spectral_features::utils::audio_math::db_to_power;
///
/// let power = db_to_power(0.0f64); // 1.0
/// let power_neg3 = db_to_power(-3.0f64); // ≈ 0.501
/// ```
pub fn db_to_power<F: RealFloat>(db: F) -> F {
    to_precision::<F, _>(10.0).powf(db / to_precision::<F, _>(10.0))
}

// =============================================================================
// SPECTRAL HELPER FUNCTIONS
// =============================================================================

/// Generates frequency bins for FFT analysis.
///
/// Returns the `n_fft / 2 + 1` non-negative frequency bins of a real-valued
/// FFT, bin `k` sitting at `k * sample_rate / n_fft`.
///
/// # Examples
///
/// ```rust
/// use spectral_features::utils::audio_math::fft_frequencies;
///
/// let freqs = fft_frequencies(1024, 44100.0f64);
/// assert_eq!(freqs.len(), 513); // n_fft/2 + 1
/// assert_eq!(freqs[0], 0.0); // DC component
/// assert!(freqs[freqs.len()-1] <= 22050.0f64); // Nyquist frequency
/// ```
pub fn fft_frequencies<F: RealFloat>(n_fft: usize, sample_rate: F) -> Vec<F> {
    let n_bins = n_fft / 2 + 1;
    let freq_resolution = sample_rate / to_precision::<F, _>(n_fft);

    (0..n_bins)
        .map(|i| to_precision::<F, _>(i) * freq_resolution)
        .collect()
}
