//! Backend-independent figure description.
//!
//! Estimators and the compare pipeline describe *what* to draw as a
//! `Figure`; the ASCII and SVG renderers decide *how*.

use chrono::{NaiveDate, NaiveDateTime};

/// How a layer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Points,
    Line,
}

/// One labeled set of `(x, y)` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub label: String,
    pub kind: LayerKind,
    pub points: Vec<(f64, f64)>,
}

impl Layer {
    pub fn points(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            kind: LayerKind::Points,
            points,
        }
    }

    pub fn line(label: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            kind: LayerKind::Line,
            points,
        }
    }

    /// Straight line `y = intercept + slope * x` sampled at both ends of `[x0, x1]`.
    pub fn straight(label: impl Into<String>, intercept: f64, slope: f64, x0: f64, x1: f64) -> Self {
        Self::line(
            label,
            vec![(x0, intercept + slope * x0), (x1, intercept + slope * x1)],
        )
    }

    /// Horizontal line at `y` across `[x0, x1]`.
    pub fn horizontal(label: impl Into<String>, y: f64, x0: f64, x1: f64) -> Self {
        Self::line(label, vec![(x0, y), (x1, y)])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub layers: Vec<Layer>,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            layers: Vec::new(),
        }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|l| l.points.is_empty())
    }

    /// Bounds over all finite points, or `None` if there are none.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut x = [f64::INFINITY, f64::NEG_INFINITY];
        let mut y = [f64::INFINITY, f64::NEG_INFINITY];
        for &(px, py) in self.layers.iter().flat_map(|l| l.points.iter()) {
            if px.is_finite() && py.is_finite() {
                x = [x[0].min(px), x[1].max(px)];
                y = [y[0].min(py), y[1].max(py)];
            }
        }
        (x[0].is_finite() && y[0].is_finite()).then_some((x, y))
    }
}

/// Maps timestamps to fractional days since an origin, for time-axis figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxis {
    pub origin: NaiveDateTime,
}

impl TimeAxis {
    pub fn starting_at(origin: NaiveDateTime) -> Self {
        Self { origin }
    }

    pub fn x(&self, t: NaiveDateTime) -> f64 {
        (t - self.origin).num_seconds() as f64 / 86_400.0
    }

    pub fn label(&self) -> String {
        format!("days since {}", self.origin.format("%Y-%m-%d %H:%M"))
    }
}

/// Whether `t` falls in the optional inclusive date window.
pub fn in_window(t: NaiveDateTime, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let d = t.date();
    from.is_none_or(|f| d >= f) && to.is_none_or(|e| d <= e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_skip_non_finite() {
        let fig = Figure::new("t", "x", "y")
            .with_layer(Layer::points("a", vec![(0.0, 1.0), (f64::NAN, 5.0), (2.0, -1.0)]))
            .with_layer(Layer::straight("b", 0.0, 1.0, 0.0, 3.0));
        let (x, y) = fig.bounds().unwrap();
        assert_eq!(x, [0.0, 3.0]);
        assert_eq!(y, [-1.0, 3.0]);
        assert!(Figure::new("t", "x", "y").bounds().is_none());
    }

    #[test]
    fn time_axis_in_days() {
        let t0 = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let axis = TimeAxis::starting_at(t0);
        let t1 = NaiveDate::from_ymd_opt(2021, 6, 2).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(axis.x(t1), 1.5);
        assert!(in_window(t1, Some(t0.date()), None));
        assert!(!in_window(t1, None, Some(t0.date())));
    }
}
