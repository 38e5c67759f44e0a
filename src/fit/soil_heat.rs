//! Soil heat fraction `|G| / |Rn|`, split by sun position.

use crate::data::ObservationFrame;
use crate::domain::{Family, ParameterEstimate, Variable};
use crate::error::AppError;
use crate::fit::{EstimateContext, Estimation};
use crate::math::mean;
use crate::models::is_daytime;
use crate::plot::{Figure, Layer, TimeAxis, in_window};

pub fn estimate_soil_heat(frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    let site = ctx.require_location(Family::SoilHeat)?;
    let rn = frame.column(Variable::Rn)?;
    let g = frame.column(Variable::G)?;

    let mut day = Vec::new();
    let mut night = Vec::new();
    for (i, &t) in frame.index().iter().enumerate() {
        if !rn[i].is_finite() || !g[i].is_finite() || rn[i] == 0.0 {
            continue;
        }
        let fraction = g[i].abs() / rn[i].abs();
        if is_daytime(&site, t) {
            day.push((t, fraction));
        } else {
            night.push((t, fraction));
        }
    }

    let f_day = half_mean("day", &day);
    let f_night = half_mean("night", &night);
    log::info!(
        "f: day {f_day:.4} ({} rows), night {f_night:.4} ({} rows)",
        day.len(),
        night.len()
    );

    let mut figure = Figure::new("Soil heat fraction", "time", "|G| / |Rn|");
    if let Some(&origin) = frame.index().first() {
        let axis = TimeAxis::starting_at(origin);
        figure.x_label = axis.label();
        let project = |rows: &[(chrono::NaiveDateTime, f64)]| -> Vec<(f64, f64)> {
            rows.iter()
                .filter(|&&(t, _)| in_window(t, ctx.plot_from, ctx.plot_to))
                .map(|&(t, f)| (axis.x(t), f))
                .collect()
        };
        figure.push(Layer::points("day", project(&day)));
        figure.push(Layer::points("night", project(&night)));
    }

    Ok(Estimation {
        estimate: ParameterEstimate::SoilHeat {
            f_day,
            f_night,
            n_day: day.len(),
            n_night: night.len(),
        },
        figure,
    })
}

fn half_mean(half: &str, rows: &[(chrono::NaiveDateTime, f64)]) -> f64 {
    let values: Vec<f64> = rows.iter().map(|&(_, f)| f).collect();
    mean(&values).unwrap_or_else(|| {
        log::warn!("f: no {half} rows, reporting NaN");
        f64::NAN
    })
}
