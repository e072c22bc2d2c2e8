use accel_lib::plot::{DisplaySink, Figure, SeriesKind};
use anyhow::Result;
use log::{info, warn};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Display sink writing each figure as a PNG file into a directory.
pub struct PngSink {
    out_dir: PathBuf,
    size: (u32, u32),
}

impl PngSink {
    pub fn new(out_dir: &Path) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            size: (1024, 600),
        }
    }
}

impl DisplaySink for PngSink {
    fn show(&mut self, name: &str, fig: &Figure) -> Result<Option<PathBuf>> {
        std::fs::create_dir_all(&self.out_dir)?;
        let path = self.out_dir.join(format!("{name}.png"));
        draw_plotters_figure(&path, fig, self.size)?;
        info!("figure written to {}", path.display());
        Ok(Some(path))
    }
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        let pad = (hi - lo) * 0.02;
        (lo - pad, hi + pad)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn rgb(fig_color: accel_lib::plot::Color) -> RGBColor {
    let (r, g, b) = fig_color.rgb();
    RGBColor(r, g, b)
}

macro_rules! draw_all_series {
    ($chart:expr, $fig:expr) => {
        for series in &$fig.series {
            let color = rgb(series.style.color);
            match series.kind {
                SeriesKind::Line => {
                    $chart.draw_series(LineSeries::new(
                        series
                            .points
                            .iter()
                            .filter(|p| p[1].is_finite())
                            .map(|p| (p[0], p[1])),
                        color.stroke_width(series.style.width.ceil() as u32),
                    ))?;
                }
                SeriesKind::Points => {
                    let radius = series.style.width.ceil() as u32;
                    $chart.draw_series(
                        series
                            .points
                            .iter()
                            .map(|p| Circle::new((p[0], p[1]), radius, color.filled())),
                    )?;
                }
                SeriesKind::Bars { width } => {
                    let half = width / 2.0;
                    $chart.draw_series(series.points.iter().map(|p| {
                        Rectangle::new([(p[0] - half, 0.0), (p[0] + half, p[1])], color.filled())
                    }))?;
                }
            }
        }
    };
}

fn draw_plotters_figure(path: &Path, fig: &Figure, size: (u32, u32)) -> Result<()> {
    let backend = BitMapBackend::new(path, size);
    let root = backend.into_drawing_area();
    root.fill(&WHITE)?;
    let Some((x, y)) = fig.bounds() else {
        warn!("figure {:?} has no drawable points", fig.title);
        root.present()?;
        return Ok(());
    };
    let has_bars = fig
        .series
        .iter()
        .any(|s| matches!(s.kind, SeriesKind::Bars { .. }));
    let (y_min, y_max) = if has_bars {
        padded(y[0].min(0.0), y[1].max(0.0))
    } else {
        padded(y[0], y[1])
    };
    let x_desc = fig.x.label.clone().unwrap_or_default();
    let y_desc = fig.y.label.clone().unwrap_or_default();
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(10)
        .caption(
            fig.title.clone().unwrap_or_else(|| "Plot".into()),
            ("sans-serif", 24),
        )
        .x_label_area_size(40)
        .y_label_area_size(60);

    if fig.x.log && x[0] > 0.0 {
        let x_max = if x[1] > x[0] { x[1] } else { x[0] * 10.0 };
        let mut chart = builder.build_cartesian_2d((x[0]..x_max).log_scale(), y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;
        draw_all_series!(chart, fig);
    } else {
        let (x_min, x_max) = padded(x[0], x[1]);
        let mut chart = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        chart
            .configure_mesh()
            .x_desc(x_desc)
            .y_desc(y_desc)
            .draw()?;
        draw_all_series!(chart, fig);
    }
    root.present()?;
    Ok(())
}
