//! Deterministic test-signal generation.
//!
//! Sine, multi-tone and silent signals used to exercise and demonstrate the
//! analysis pipeline. All generators are pure and return owned sample
//! vectors that can be wrapped in a [`Signal`](crate::Signal).

use std::time::Duration;

use num_traits::FloatConst;

use crate::{RealFloat, to_precision};

/// Number of samples covering `duration` at `sample_rate`, rounded to nearest.
fn sample_count<F: RealFloat>(duration: Duration, sample_rate: F) -> usize {
    let sample_rate = to_precision::<f64, F>(sample_rate).max(0.0);
    (duration.as_secs_f64() * sample_rate).round() as usize
}

/// Generates a sine wave with the specified parameters.
///
/// # Arguments
/// * `frequency` - Frequency of the sine wave in Hz
/// * `duration` - Duration of the signal
/// * `sample_rate` - Sample rate in Hz
/// * `amplitude` - Peak amplitude of the sine wave
///
/// # Examples
/// ```rust
/// use spectral_features::sine_wave;
/// use std::time::Duration;
///
/// let samples = sine_wave::<f64>(50.0, Duration::from_secs(1), 1000.0, 1.0);
/// assert_eq!(samples.len(), 1000);
/// ```
pub fn sine_wave<F: RealFloat>(
    frequency: F,
    duration: Duration,
    sample_rate: F,
    amplitude: F,
) -> Vec<F> {
    compound_tone(
        &[ToneComponent::new(frequency, amplitude)],
        duration,
        sample_rate,
    )
}

/// A single frequency component for compound tone generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneComponent<F> {
    /// Frequency in Hz
    pub frequency: F,
    /// Peak amplitude
    pub amplitude: F,
}

impl<F: RealFloat> ToneComponent<F> {
    /// Creates a new tone component.
    pub const fn new(frequency: F, amplitude: F) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Generates a compound tone from multiple frequency components.
///
/// Each component contributes `amplitude * sin(2π f t)`. An empty component
/// list yields silence.
///
/// # Examples
/// ```rust
/// use spectral_features::{compound_tone, ToneComponent};
/// use std::time::Duration;
///
/// let components = [
///     ToneComponent::new(440.0, 1.0),    // fundamental
///     ToneComponent::new(880.0, 0.5),    // 2nd harmonic
/// ];
/// let samples = compound_tone::<f64>(&components, Duration::from_millis(10), 44100.0);
/// assert_eq!(samples.len(), 441);
/// ```
pub fn compound_tone<F: RealFloat>(
    components: &[ToneComponent<F>],
    duration: Duration,
    sample_rate: F,
) -> Vec<F> {
    let num_samples = sample_count(duration, sample_rate);
    let two_pi = to_precision::<F, _>(2.0) * <F as FloatConst>::PI();

    (0..num_samples)
        .map(|i| {
            let t = to_precision::<F, _>(i) / sample_rate;
            components.iter().fold(F::zero(), |acc, comp| {
                acc + comp.amplitude * (two_pi * comp.frequency * t).sin()
            })
        })
        .collect()
}

/// Generates `duration` worth of zero-valued samples.
pub fn silence<F: RealFloat>(duration: Duration, sample_rate: F) -> Vec<F> {
    vec![F::zero(); sample_count(duration, sample_rate)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_sine_wave_values() {
        let samples = sine_wave::<f64>(1.0, Duration::from_secs(1), 4.0, 2.0);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0], 0.0);
        assert_approx_eq!(samples[1], 2.0, 1e-12);
        assert!(samples[2].abs() < 1e-12);
        assert_approx_eq!(samples[3], -2.0, 1e-12);
    }

    #[test]
    fn test_compound_tone_is_sum_of_components() {
        let duration = Duration::from_millis(100);
        let a = sine_wave::<f64>(50.0, duration, 1000.0, 1.0);
        let b = sine_wave::<f64>(200.0, duration, 1000.0, 0.5);
        let both = compound_tone(
            &[ToneComponent::new(50.0, 1.0), ToneComponent::new(200.0, 0.5)],
            duration,
            1000.0,
        );

        assert_eq!(both.len(), 100);
        for i in 0..both.len() {
            assert!((both[i] - (a[i] + b[i])).abs() < 1e-12);
        }
    }

    #[test]
    fn test_silence_and_rounding() {
        let zeros = silence::<f32>(Duration::from_millis(1500), 2.0);
        assert_eq!(zeros, vec![0.0f32; 3]);

        let samples = sine_wave::<f64>(1.0, Duration::from_secs_f64(4.096), 1000.0, 1.0);
        assert_eq!(samples.len(), 4096);
    }
}
