//! Chart rendering for reduced datasets.
//!
//! Static PNG output via plotters: measured series as scatter + connecting
//! line, with an optional fitted-line overlay labelled with the fit
//! parameters.

use std::path::Path;

use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::processors::fitting::LinearFit;

/// Errors that can occur during chart rendering.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("plotting error: {0}")]
    PlottingError(String),

    #[error("no points to plot")]
    EmptySeries,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Marker size in pixels for data points.
const MARKER_SIZE: u32 = 3;

/// Fraction of the data range added as padding on each axis.
const PAD_FRACTION: f64 = 0.05;

/// Axis labels and title for one chart.
#[derive(Debug, Clone)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
        }
    }
}

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Compute padded axis bounds for a point set.
fn padded_bounds(points: &[(f64, f64)]) -> ((f64, f64), (f64, f64)) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for (x, y) in points {
        if *x < x_min {
            x_min = *x;
        }
        if *x > x_max {
            x_max = *x;
        }
        if *y < y_min {
            y_min = *y;
        }
        if *y > y_max {
            y_max = *y;
        }
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let x_pad = (x_max - x_min) * PAD_FRACTION;
    let y_pad = (y_max - y_min) * PAD_FRACTION;
    ((x_min - x_pad, x_max + x_pad), (y_min - y_pad, y_max + y_pad))
}

/// Plot a measured series as connected scatter points and save as PNG.
///
/// Used for the B vs I loop graphs and the raw pressure/temperature
/// charts. Parent directories must already exist.
pub fn plot_series(
    output_path: &Path,
    points: &[(f64, f64)],
    labels: &ChartLabels,
    config: &PlotConfig,
) -> Result<()> {
    plot_with_overlay(output_path, points, None, labels, config)
}

/// Plot a series with a fitted-line overlay.
///
/// The fit line spans the x range of the data and carries a legend entry
/// with slope, intercept, and R².
pub fn plot_fit(
    output_path: &Path,
    points: &[(f64, f64)],
    fit: &LinearFit,
    labels: &ChartLabels,
    config: &PlotConfig,
) -> Result<()> {
    plot_with_overlay(output_path, points, Some(fit), labels, config)
}

fn plot_with_overlay(
    output_path: &Path,
    points: &[(f64, f64)],
    fit: Option<&LinearFit>,
    labels: &ChartLabels,
    config: &PlotConfig,
) -> Result<()> {
    if points.is_empty() {
        return Err(VisualizationError::EmptySeries);
    }

    let ((x_lo, x_hi), (y_lo, y_hi)) = padded_bounds(points);

    let root =
        BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(labels.title.as_str(), ("sans-serif", 24))
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(plot_err)?;

    let light_grid = RGBColor(230, 230, 230);
    chart
        .configure_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .light_line_style(&light_grid)
        .draw()
        .map_err(plot_err)?;

    // Connecting line follows acquisition order so loops stay loops.
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            BLUE.stroke_width(1),
        ))
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), MARKER_SIZE, BLUE.filled())),
        )
        .map_err(plot_err)?
        .label("measured")
        .legend(|(x, y)| Circle::new((x + 10, y), MARKER_SIZE, BLUE.filled()));

    if let Some(fit) = fit {
        let line = [(x_lo, fit.predict(x_lo)), (x_hi, fit.predict(x_hi))];
        chart
            .draw_series(LineSeries::new(line.iter().copied(), RED.stroke_width(2)))
            .map_err(plot_err)?
            .label(format!(
                "fit: y = {:.4}x + {:.4}, R² = {:.5}",
                fit.slope,
                fit.intercept,
                fit.r_squared()
            ))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;

    Ok(())
}
