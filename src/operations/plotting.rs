//! Interactive visualisation of a [`SpectralFeatureBundle`].
//!
//! Renders the decibel curve, the spectral centroid as a vertical line and
//! the detected peaks as markers. The bundle is only borrowed; plotting never
//! changes the analysis results.

use std::path::Path;

use plotly::common::{DashType, Line, Marker, MarkerSymbol, Mode, Title};
use plotly::layout::{Axis, AxisType, Layout};
use plotly::{Plot, Scatter};

use super::features::SpectralFeatureBundle;
use crate::{RealFloat, SpectralError, SpectralResult, to_precision};

const PSD_COLOR: &str = "#1f77b4";
const PEAK_COLOR: &str = "#ff7f0e";
const CENTROID_COLOR: &str = "#2ca02c";

/// Plot builder for a spectral feature bundle.
///
/// # Examples
/// ```
/// use spectral_features::{Signal, SpectralConfig, SpectralFeaturePlot, compute_spectral_features, sine_wave};
/// use std::time::Duration;
///
/// let samples = sine_wave::<f64>(100.0, Duration::from_secs(2), 1000.0, 1.0);
/// let signal = Signal::new(&samples, 1000.0).unwrap();
/// let features = compute_spectral_features(&signal, None, &SpectralConfig::new()).unwrap();
///
/// let plot = SpectralFeaturePlot::new(&features)
///     .with_title("Sine at 100 Hz")
///     .with_log_frequency_axis(false)
///     .to_plot();
/// assert!(plot.to_json().contains("Spectral Peaks"));
/// ```
#[derive(Debug, Clone)]
pub struct SpectralFeaturePlot<'a, F: RealFloat> {
    bundle: &'a SpectralFeatureBundle<F>,
    title: String,
    log_frequency_axis: bool,
}

impl<'a, F: RealFloat> SpectralFeaturePlot<'a, F> {
    /// Creates a plot with the default title and a logarithmic frequency axis.
    pub fn new(bundle: &'a SpectralFeatureBundle<F>) -> Self {
        Self {
            bundle,
            title: "Spectral Features".to_string(),
            log_frequency_axis: true,
        }
    }

    /// Set the plot title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Use a logarithmic (`true`) or linear (`false`) frequency axis.
    pub fn with_log_frequency_axis(mut self, log: bool) -> Self {
        self.log_frequency_axis = log;
        self
    }

    /// Builds the plotly figure.
    ///
    /// On a logarithmic axis the 0 Hz bin cannot be drawn and is left out.
    pub fn to_plot(&self) -> Plot {
        let (frequencies, decibels): (Vec<f64>, Vec<f64>) = self
            .bundle
            .frequencies
            .iter()
            .zip(&self.bundle.decibel_curve)
            .map(|(&f, &db)| (to_precision::<f64, F>(f), to_precision::<f64, F>(db)))
            .filter(|&(f, _)| !self.log_frequency_axis || f > 0.0)
            .unzip();

        let (y_min, y_max) = decibels
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let centroid = to_precision::<f64, F>(self.bundle.centroid);

        let psd = Scatter::new(frequencies, decibels)
            .mode(Mode::Lines)
            .name("Pxx (dB)")
            .line(Line::new().color(PSD_COLOR).width(2.0));

        let centroid_line = Scatter::new(vec![centroid, centroid], vec![y_min, y_max])
            .mode(Mode::Lines)
            .name("Spectral Centroid")
            .line(Line::new().color(CENTROID_COLOR).dash(DashType::Dash));

        let peaks = Scatter::new(
            self.bundle
                .peak_frequencies()
                .into_iter()
                .map(to_precision::<f64, F>)
                .collect(),
            self.bundle
                .peak_amplitudes_db()
                .into_iter()
                .map(to_precision::<f64, F>)
                .collect(),
        )
        .mode(Mode::Markers)
        .name("Spectral Peaks")
        .marker(
            Marker::new()
                .color(PEAK_COLOR)
                .size(9)
                .symbol(MarkerSymbol::Circle),
        );

        let mut x_axis = Axis::new()
            .title(Title::with_text("Frequency (Hz)"))
            .show_grid(true);
        if self.log_frequency_axis {
            x_axis = x_axis.type_(AxisType::Log);
        }

        let layout = Layout::new()
            .title(Title::with_text(&self.title))
            .x_axis(x_axis)
            .y_axis(Axis::new().title(Title::with_text("Gain (dB)")).show_grid(true));

        let mut plot = Plot::new();
        plot.add_trace(psd);
        plot.add_trace(centroid_line);
        plot.add_trace(peaks);
        plot.set_layout(layout);
        plot
    }

    /// Render to an HTML file (interactive).
    ///
    /// # Errors
    /// Returns [`SpectralError::Processing`] if `create_parent` is set and the
    /// parent directories cannot be created.
    pub fn render_to_html<P: AsRef<Path>>(&self, path: P, create_parent: bool) -> SpectralResult<()> {
        let plot = self.to_plot();

        if create_parent && let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SpectralError::processing(format!(
                    "Failed to create parent directories of {}: {e}",
                    parent.display()
                ))
            })?;
        }

        plot.write_html(path);
        Ok(())
    }
}
