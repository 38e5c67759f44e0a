//! Simulated vs observed: aligned table, running totals, goodness of fit.

use chrono::{NaiveDate, NaiveDateTime};

use crate::data::{TimeSeries, align_pair};
use crate::error::AppError;
use crate::math::metrics::FitMetrics;
use crate::plot::{Figure, Layer, TimeAxis, in_window};

/// One aligned row of the comparison table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    pub timestamp: NaiveDateTime,
    pub simulated: f64,
    pub observed: f64,
    pub simulated_cum: f64,
    pub observed_cum: f64,
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub simulated_name: String,
    pub observed_name: String,
    pub rows: Vec<ComparisonRow>,
    pub metrics: FitMetrics,
}

impl Comparison {
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.timestamp.date(), self.rows.last()?.timestamp.date()))
    }

    pub fn simulated(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.simulated).collect()
    }

    pub fn observed(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.observed).collect()
    }
}

/// Inner-join `simulated` and `observed`, keep complete cases and summarize.
pub fn compare_series(simulated: &TimeSeries, observed: &TimeSeries) -> Result<Comparison, AppError> {
    let (index, sim, obs) = align_pair(simulated, observed);
    let joined = index.len();

    let mut rows = Vec::with_capacity(joined);
    let (mut sim_cum, mut obs_cum) = (0.0, 0.0);
    for ((t, s), o) in index.into_iter().zip(sim).zip(obs) {
        if !(s.is_finite() && o.is_finite()) {
            continue;
        }
        sim_cum += s;
        obs_cum += o;
        rows.push(ComparisonRow {
            timestamp: t,
            simulated: s,
            observed: o,
            simulated_cum: sim_cum,
            observed_cum: obs_cum,
        });
    }

    if rows.is_empty() {
        return Err(AppError::data(format!(
            "`{}` and `{}` share no complete samples ({} common timestamps).",
            simulated.name(),
            observed.name(),
            joined
        )));
    }
    log::info!(
        "comparing {} complete samples ({} dropped as incomplete)",
        rows.len(),
        joined - rows.len()
    );

    let sim_values: Vec<f64> = rows.iter().map(|r| r.simulated).collect();
    let obs_values: Vec<f64> = rows.iter().map(|r| r.observed).collect();
    let metrics = FitMetrics::compute(&obs_values, &sim_values);

    Ok(Comparison {
        simulated_name: simulated.name().to_string(),
        observed_name: observed.name().to_string(),
        rows,
        metrics,
    })
}

/// Simulated and observed series plus smoothed auxiliary channels.
pub fn comparison_figure(
    comparison: &Comparison,
    auxiliary: &[TimeSeries],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Figure {
    let title = format!("{} vs {}", comparison.simulated_name, comparison.observed_name);
    let Some(first) = comparison.rows.first() else {
        return Figure::new(title, "time", "value");
    };
    let axis = TimeAxis::starting_at(first.timestamp);
    let rows = || comparison.rows.iter().filter(|r| in_window(r.timestamp, from, to));

    let mut figure = Figure::new(title, axis.label(), "value")
        .with_layer(Layer::line(
            comparison.simulated_name.clone(),
            rows().map(|r| (axis.x(r.timestamp), r.simulated)).collect(),
        ))
        .with_layer(Layer::line(
            comparison.observed_name.clone(),
            rows().map(|r| (axis.x(r.timestamp), r.observed)).collect(),
        ));
    for series in auxiliary {
        figure.push(Layer::line(
            series.name(),
            series
                .points()
                .iter()
                .filter(|&&(t, v)| v.is_finite() && in_window(t, from, to))
                .map(|&(t, v)| (axis.x(t), v))
                .collect(),
        ));
    }
    figure
}

/// Running totals of both series.
pub fn cumulative_figure(comparison: &Comparison, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Figure {
    let title = format!("Cumulative {} vs {}", comparison.simulated_name, comparison.observed_name);
    let Some(first) = comparison.rows.first() else {
        return Figure::new(title, "time", "cumulative");
    };
    let axis = TimeAxis::starting_at(first.timestamp);
    let rows = || comparison.rows.iter().filter(|r| in_window(r.timestamp, from, to));

    Figure::new(title, axis.label(), "cumulative")
        .with_layer(Layer::line(
            format!("{}_cum", comparison.simulated_name),
            rows().map(|r| (axis.x(r.timestamp), r.simulated_cum)).collect(),
        ))
        .with_layer(Layer::line(
            format!("{}_cum", comparison.observed_name),
            rows().map(|r| (axis.x(r.timestamp), r.observed_cum)).collect(),
        ))
}
