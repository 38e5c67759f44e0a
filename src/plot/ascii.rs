//! ASCII plotting for terminal previews.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a fitted relationship in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Lines are drawn first so points overlay them. Each layer gets its own
//! glyph; a legend line maps glyphs to labels.

use crate::plot::figure::{Figure, LayerKind};

const POINT_GLYPHS: [char; 4] = ['o', 'x', '+', '*'];
const LINE_GLYPHS: [char; 3] = ['-', '=', '~'];

/// Render a figure into a `width × height` character grid.
pub fn render_ascii(figure: &Figure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_bounds, y_bounds)) = figure.bounds() else {
        return format!("{}: no data to plot\n", figure.title);
    };
    let (x_min, x_max) = widen(x_bounds[0], x_bounds[1]);
    let (y_min, y_max) = pad_range(y_bounds[0], y_bounds[1], 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let mut legend = Vec::new();
    let (mut n_points, mut n_lines) = (0usize, 0usize);

    for layer in figure.layers.iter().filter(|l| l.kind == LayerKind::Line) {
        let ch = LINE_GLYPHS[n_lines % LINE_GLYPHS.len()];
        n_lines += 1;
        legend.push(format!("{ch} {}", layer.label));

        let mut prev = None;
        for &(x, y) in layer.points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
            let cx = map_x(x, x_min, x_max, width);
            let cy = map_y(y, y_min, y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(&mut grid, x0, y0, cx, cy, ch),
                None => grid[cy][cx] = ch,
            }
            prev = Some((cx, cy));
        }
    }

    for layer in figure.layers.iter().filter(|l| l.kind == LayerKind::Points) {
        let ch = POINT_GLYPHS[n_points % POINT_GLYPHS.len()];
        n_points += 1;
        legend.push(format!("{ch} {}", layer.label));

        for &(x, y) in layer.points.iter().filter(|(x, y)| x.is_finite() && y.is_finite()) {
            let cx = map_x(x, x_min, x_max, width);
            let cy = map_y(y, y_min, y_max, height);
            grid[cy][cx] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}: {}=[{x_min:.3}, {x_max:.3}] | {}=[{y_min:.3}, {y_max:.3}]\n",
        figure.title, figure.x_label, figure.y_label
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    if !legend.is_empty() {
        out.push_str(&legend.join("  "));
        out.push('\n');
    }
    out
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if max > min { (min, max) } else { (min - 0.5, max + 0.5) }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish). Never overwrites non-blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x0, mut y0) = (x0 as isize, y0 as isize);
    let (x1, y1) = (x1 as isize, y1 as isize);

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::figure::Layer;

    #[test]
    fn plot_golden_snapshot_small() {
        let fig = Figure::new("fcorr", "x", "y")
            .with_layer(Layer::points("obs", vec![(0.0, 0.0), (1.0, 1.0)]))
            .with_layer(Layer::horizontal("a", 0.0, 0.0, 1.0));

        let txt = render_ascii(&fig, 10, 5);
        let expected = concat!(
            "fcorr: x=[0.000, 1.000] | y=[-0.050, 1.050]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
            "- a  o obs\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn empty_figure_renders_a_note() {
        let fig = Figure::new("alb", "x", "y");
        assert_eq!(render_ascii(&fig, 20, 5), "alb: no data to plot\n");
    }
}
