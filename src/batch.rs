//! Parallel feature extraction over many independent signals.
//!
//! Signals are distributed across a rayon thread pool; each signal is still
//! analysed on a single thread. Results keep the input order and every
//! signal succeeds or fails on its own.

use rayon::prelude::*;
use tracing::debug;

use crate::operations::{FrequencyBand, SpectralConfig, SpectralFeatureBundle, compute_spectral_features};
use crate::{RealFloat, Signal, SpectralError, SpectralResult};

/// Compute spectral features for every signal on the global rayon pool.
///
/// # Examples
/// ```
/// use spectral_features::{Signal, SpectralConfig, compute_spectral_features_batch, sine_wave};
/// use std::time::Duration;
///
/// let a = sine_wave::<f64>(50.0, Duration::from_secs(2), 1000.0, 1.0);
/// let b = vec![0.0f64; 2000];
/// let signals = [Signal::new(&a, 1000.0).unwrap(), Signal::new(&b, 1000.0).unwrap()];
///
/// let results = compute_spectral_features_batch(&signals, None, &SpectralConfig::new());
/// assert!(results[0].is_ok());
/// assert!(results[1].is_err()); // silence has no centroid
/// ```
pub fn compute_spectral_features_batch<F: RealFloat>(
    signals: &[Signal<'_, F>],
    band: Option<&FrequencyBand<F>>,
    config: &SpectralConfig,
) -> Vec<SpectralResult<SpectralFeatureBundle<F>>> {
    debug!(signals = signals.len(), "batch spectral feature extraction");
    signals
        .par_iter()
        .map(|signal| compute_spectral_features(signal, band, config))
        .collect()
}

/// Compute spectral features for every signal on a dedicated pool.
///
/// `thread_count` of `None` lets rayon choose the number of threads.
///
/// # Errors
/// Returns [`SpectralError::Processing`] if the thread pool cannot be built.
pub fn compute_spectral_features_batch_with_threads<F: RealFloat>(
    signals: &[Signal<'_, F>],
    band: Option<&FrequencyBand<F>>,
    config: &SpectralConfig,
    thread_count: Option<usize>,
) -> SpectralResult<Vec<SpectralResult<SpectralFeatureBundle<F>>>> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = thread_count {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().map_err(|e| {
        SpectralError::processing(format!("Thread pool creation failed: {e}"))
    })?;

    Ok(pool.install(|| compute_spectral_features_batch(signals, band, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generation::sine_wave;
    use std::time::Duration;

    fn tones() -> Vec<Vec<f64>> {
        [40.0, 80.0, 160.0, 320.0]
            .iter()
            .map(|&f| sine_wave(f, Duration::from_secs(3), 1000.0, 1.0))
            .collect()
    }

    #[test]
    fn test_batch_matches_sequential() {
        let tones = tones();
        let signals: Vec<_> = tones
            .iter()
            .map(|t| Signal::new(t, 1000.0).unwrap())
            .collect();
        let config = SpectralConfig::new().with_nfft(1024);

        let results = compute_spectral_features_batch(&signals, None, &config);
        assert_eq!(results.len(), signals.len());
        for (signal, result) in signals.iter().zip(&results) {
            let expected = compute_spectral_features(signal, None, &config).unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn test_batch_reports_errors_per_signal() {
        let tones = tones();
        let silent = vec![0.0f64; 3000];
        let signals = [
            Signal::new(&tones[0], 1000.0).unwrap(),
            Signal::new(&silent, 1000.0).unwrap(),
            Signal::new(&tones[1], 1000.0).unwrap(),
        ];

        let results =
            compute_spectral_features_batch_with_threads(&signals, None, &SpectralConfig::new(), Some(2))
                .unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SpectralError::DegenerateSpectrum(_))));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_batch_with_band() {
        let tones = tones();
        let signals: Vec<_> = tones
            .iter()
            .map(|t| Signal::new(t, 1000.0).unwrap())
            .collect();
        let band = FrequencyBand::new(100.0, 200.0).unwrap();

        let results = compute_spectral_features_batch(&signals, Some(&band), &SpectralConfig::new());
        for result in results {
            let bundle = result.unwrap();
            assert!(bundle.frequencies.iter().all(|&f| band.contains(f)));
        }
    }
}
