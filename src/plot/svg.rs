//! SVG diagnostic figures via Plotters.
//!
//! Plots are side effects: a failure to write one is reported as an output
//! error, but nothing computed upstream depends on them.

use std::fs::create_dir_all;
use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::figure::{Figure, LayerKind};

pub const DEFAULT_SIZE: (u32, u32) = (1024, 640);

/// Write `figure` as an SVG file, creating parent directories as needed.
pub fn render_svg(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), AppError> {
    let Some((x_bounds, y_bounds)) = figure.bounds() else {
        log::warn!("{}: nothing to plot, skipping '{}'", figure.title, path.display());
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::output(format!("Failed to create plot dir '{}': {e}", parent.display())))?;
    }

    draw(figure, path, size, x_bounds, y_bounds)
        .map_err(|e| AppError::output(format!("Failed to draw '{}': {e}", path.display())))?;

    log::info!("wrote {}", path.display());
    Ok(())
}

fn draw(
    figure: &Figure,
    path: &Path,
    size: (u32, u32),
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) -> Result<(), Box<dyn std::error::Error>> {
    let (x0, x1) = widen(x_bounds[0], x_bounds[1]);
    let (y0, y1) = pad(y_bounds[0], y_bounds[1]);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&figure.title, ("sans-serif", 18))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_labels(8)
        .y_labels(8)
        .draw()?;

    for (i, layer) in figure.layers.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let points = layer
            .points
            .iter()
            .copied()
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        match layer.kind {
            LayerKind::Line => {
                chart
                    .draw_series(LineSeries::new(points, color.stroke_width(2)))?
                    .label(layer.label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
            }
            LayerKind::Points => {
                chart
                    .draw_series(points.map(|p| Circle::new(p, 2, color.filled())))?
                    .label(layer.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 8, y), 3, color.filled()));
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad(min: f64, max: f64) -> (f64, f64) {
    let span = (max - min).abs().max(1e-9);
    (min - 0.05 * span, max + 0.05 * span)
}
