//! Renderer-agnostic figures handed to a display sink.

use crate::{
    peaks::PeakSet,
    signal::SamplingPeriod,
    spectrum::Spectrum,
    stats::Histogram,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
    /// Logarithmic scale (positive values only)
    #[serde(default)]
    pub log: bool,
}

impl Axis {
    fn labelled(label: &str) -> Self {
        Self {
            label: Some(label.into()),
            log: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(&self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

const SIGNAL_COLOR: Color = Color(0x1F77B4);
const MARKER_COLOR: Color = Color(0xFF7F0E);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Connected polyline
    Line,
    /// Unconnected markers
    Points,
    /// Vertical bars of the given width, centred on x
    Bars { width: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x: Axis::labelled(x_label),
            y: Axis::labelled(y_label),
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(min, max)` over every finite coordinate of every series.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for p in self.series.iter().flat_map(|s| s.points.iter()) {
            if !(p[0].is_finite() && p[1].is_finite()) {
                continue;
            }
            x = [x[0].min(p[0]), x[1].max(p[0])];
            y = [y[0].min(p[1]), y[1].max(p[1])];
        }
        if x[0] > x[1] {
            None
        } else {
            Some((x, y))
        }
    }
}

/// Anything that can show a figure (window, image file, test recorder).
pub trait DisplaySink {
    /// Show `fig`; returns where it was written when the sink persists it.
    fn show(&mut self, name: &str, fig: &Figure) -> anyhow::Result<Option<PathBuf>>;
}

pub fn decimate_points(points: &[[f64; 2]], max_points: usize) -> Vec<[f64; 2]> {
    if points.len() <= max_points || max_points == 0 {
        return points.to_vec();
    }
    let bucket_size = points.len() as f64 / max_points as f64;
    let mut result = Vec::with_capacity(max_points);
    for i in 0..max_points {
        let start = (i as f64 * bucket_size).floor() as usize;
        if start >= points.len() {
            break;
        }
        result.push(points[start]);
    }
    result
}

fn line(name: &str, points: Vec<[f64; 2]>, color: Color) -> Series {
    Series {
        name: name.into(),
        kind: SeriesKind::Line,
        points,
        style: Style { width: 1.4, color },
    }
}

fn zip_points(x: &[f64], y: &[f64]) -> Vec<[f64; 2]> {
    x.iter().zip(y).map(|(a, b)| [*a, *b]).collect()
}

/// Values against time in seconds.
pub fn figure_time(title: &str, time: &[f64], values: &[f64], max_points: usize) -> Figure {
    let mut fig = Figure::new(Some(title.into()), "Time [sec]", "Acceleration amplitude");
    let points = decimate_points(&zip_points(time, values), max_points);
    fig.add_series(line(title, points, SIGNAL_COLOR));
    fig
}

/// The signal with its peaks overlaid as markers.
pub fn figure_peaks(
    time: &[f64],
    values: &[f64],
    peaks: &PeakSet,
    peak_times: &[f64],
    max_points: usize,
) -> Figure {
    let mut fig = figure_time("Peak values of the data set", time, values, max_points);
    fig.add_series(Series {
        name: "peaks".into(),
        kind: SeriesKind::Points,
        points: zip_points(peak_times, &peaks.values()),
        style: Style {
            width: 3.0,
            color: MARKER_COLOR,
        },
    });
    fig
}

/// dB magnitude on a logarithmic frequency axis. The 0 Hz bin and
/// empty (−∞ dB) bins cannot be drawn on that scale and are left out.
pub fn figure_spectrum(spectrum: &Spectrum, max_points: usize) -> Figure {
    let mut fig = Figure::new(
        Some("DFT of the data set on logarithmic scale".into()),
        "Frequency [Hz]",
        "Amplitude [dB]",
    );
    fig.x.log = true;
    let points: Vec<[f64; 2]> = spectrum
        .bins
        .iter()
        .map(|b| [b.frequency, b.magnitude_db()])
        .filter(|p| p[0] > 0.0 && p[1].is_finite())
        .collect();
    fig.add_series(line("spectrum", decimate_points(&points, max_points), SIGNAL_COLOR));
    fig
}

/// Histogram with the y axis expressed as time spent in each bin.
pub fn figure_histogram(hist: &Histogram, period: SamplingPeriod) -> Figure {
    let mut fig = Figure::new(
        Some("Histogram of the data set".into()),
        "Acceleration amplitude",
        "Time [sec]",
    );
    let points = hist
        .centres()
        .into_iter()
        .zip(&hist.counts)
        .map(|(x, c)| [x, *c as f64 * period.seconds()])
        .collect();
    fig.add_series(Series {
        name: "histogram".into(),
        kind: SeriesKind::Bars { width: hist.width() },
        points,
        style: Style {
            width: 1.0,
            color: SIGNAL_COLOR,
        },
    });
    fig
}

/// Values against their sample positions.
pub fn figure_scatter(values: &[f64], max_points: usize) -> Figure {
    let mut fig = Figure::new(Some("Scatter diagram".into()), "Locations", "Values");
    let points: Vec<[f64; 2]> = values
        .iter()
        .enumerate()
        .map(|(i, v)| [i as f64, *v])
        .collect();
    fig.add_series(Series {
        name: "values".into(),
        kind: SeriesKind::Points,
        points: decimate_points(&points, max_points),
        style: Style {
            width: 2.0,
            color: SIGNAL_COLOR,
        },
    });
    fig
}

/// Original and filtered series on one time axis.
pub fn figure_filtered(time: &[f64], original: &[f64], filtered: &[f64], max_points: usize) -> Figure {
    let mut fig = figure_time("Filtered data set", time, original, max_points);
    let points = decimate_points(&zip_points(time, filtered), max_points);
    fig.add_series(line("filtered", points, MARKER_COLOR));
    fig
}
