//! Radiation-extinction coefficients from the clear-sky envelope.
//!
//! With `ratio = sw_in / sw_ext`, the upper envelope of the daytime ratios
//! approximates clear-sky transmissivity (`a + b`) and a low quantile the
//! overcast floor (`a`).

use std::collections::BTreeMap;

use crate::data::{ObservationFrame, and_masks};
use crate::domain::{Family, ParameterEstimate, Variable};
use crate::error::AppError;
use crate::fit::{EstimateContext, Estimation, in_daytime_window, no_valid_samples};
use crate::math::{max, quantile};
use crate::plot::{Figure, Layer};

/// Downward shortwave below this is too dark to carry information.
pub const MIN_SW_IN: f64 = 50.0;

pub fn estimate_radex(frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    if !(0.0..=1.0).contains(&ctx.quantile) {
        return Err(AppError::config(format!(
            "Quantile must be within [0, 1], got {}.",
            ctx.quantile
        )));
    }

    let sw_ext = frame.column(Variable::SwExt)?;
    let sw_in = frame.column(Variable::SwIn)?;
    let hours = frame.hours();

    let mask = and_masks(
        &frame.hour_mask(in_daytime_window),
        &and_masks(
            &frame.value_mask(Variable::SwExt, |v| v != 0.0)?,
            &frame.value_mask(Variable::SwIn, |v| v > MIN_SW_IN)?,
        ),
    );

    let samples: Vec<(u32, f64)> = mask
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(i, _)| (hours[i], sw_in[i] / sw_ext[i]))
        .collect();
    if samples.is_empty() {
        return Err(no_valid_samples(Family::Radex));
    }

    // Per-hour maxima of the physically plausible ratios.
    let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for &(h, r) in samples.iter().filter(|(_, r)| *r < 1.0) {
        by_hour.entry(h).or_default().push(r);
    }
    let hourly_max: Vec<(u32, f64)> = by_hour
        .iter()
        .filter_map(|(&h, rs)| max(rs).map(|m| (h, m)))
        .collect();
    for (h, m) in &hourly_max {
        log::debug!("radex: hour {h:02} max ratio {m:.4}");
    }

    let maxima: Vec<f64> = hourly_max.iter().map(|&(_, m)| m).collect();
    let r_max = max(&maxima).ok_or_else(|| no_valid_samples(Family::Radex))?;

    let ratios: Vec<f64> = samples.iter().map(|&(_, r)| r).collect();
    let a = quantile(&ratios, ctx.quantile).ok_or_else(|| no_valid_samples(Family::Radex))?;
    let b = r_max - a;
    log::info!(
        "radex: a={a:.4} (q{:.0}) b={b:.4} r_max={r_max:.4} from {} ratios",
        ctx.quantile * 100.0,
        ratios.len()
    );

    let figure = Figure::new("Radiation extinction", "hour of day", "sw_in / sw_ext")
        .with_layer(Layer::points(
            "ratio",
            samples.iter().map(|&(h, r)| (h as f64, r)).collect(),
        ))
        .with_layer(Layer::line(
            "hourly max",
            hourly_max.iter().map(|&(h, m)| (h as f64, m)).collect(),
        ))
        .with_layer(Layer::horizontal(format!("r_max = {r_max:.3}"), r_max, 8.0, 16.0))
        .with_layer(Layer::horizontal(format!("a = {a:.3}"), a, 8.0, 16.0));

    Ok(Estimation {
        estimate: ParameterEstimate::Radex {
            a,
            b,
            r_max,
            quantile: ctx.quantile,
            n: ratios.len(),
        },
        figure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::testutil::{at, frame};
    use approx::assert_relative_eq;

    const VARS: [Variable; 2] = [Variable::SwExt, Variable::SwIn];

    fn radex_of(rows: &[(chrono::NaiveDateTime, Vec<f64>)], q: f64) -> Result<(f64, f64, f64), AppError> {
        let ctx = EstimateContext {
            quantile: q,
            ..EstimateContext::default()
        };
        match estimate_radex(&frame(&VARS, rows), &ctx)?.estimate {
            ParameterEstimate::Radex { a, b, r_max, .. } => Ok((a, b, r_max)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn envelope_and_quantile() {
        let rows = vec![
            (at(1, 9), vec![1000.0, 700.0]),   // 0.70
            (at(1, 12), vec![1000.0, 750.0]),  // 0.75
            (at(2, 9), vec![1000.0, 300.0]),   // 0.30
            (at(2, 12), vec![1000.0, 200.0]),  // 0.20
            (at(3, 5), vec![1000.0, 990.0]),   // outside window
            (at(3, 10), vec![1000.0, 40.0]),   // too dark
            (at(3, 12), vec![1000.0, 1100.0]), // 1.10, above envelope cap
        ];
        let (a, b, r_max) = radex_of(&rows, 0.0).unwrap();
        assert_relative_eq!(r_max, 0.75);
        assert_relative_eq!(a, 0.20);
        assert_relative_eq!(b, 0.55, epsilon = 1e-12);

        // Quantile spans all masked ratios (including those >= 1).
        let (a_med, _, _) = radex_of(&rows, 0.5).unwrap();
        assert_relative_eq!(a_med, 0.70);
    }

    #[test]
    fn b_is_non_negative_when_maxima_exceed_quantile() {
        let mut rows = Vec::new();
        for day in 1..=10 {
            for hour in 8..=16 {
                let r = 0.2 + 0.05 * ((day * hour) % 11) as f64;
                rows.push((at(day, hour), vec![1000.0, 1000.0 * r]));
            }
        }
        let (a, b, r_max) = radex_of(&rows, 0.05).unwrap();
        assert!(r_max >= a);
        assert!(b >= 0.0);
    }

    #[test]
    fn only_saturated_ratios_is_a_data_error() {
        let rows = vec![(at(1, 12), vec![500.0, 600.0])];
        let err = radex_of(&rows, 0.05).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn invalid_quantile_is_a_config_error() {
        let rows = vec![(at(1, 12), vec![1000.0, 600.0])];
        let err = radex_of(&rows, 1.5).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
