//! Cloud correction factor as a linear function of the clear-sky ratio.
//!
//! For each emissivity model the raw correction
//! `-(lw_in - lw_out) / (ε σ T⁴)` is regressed on `sw_in / clear_sky`,
//! then the line is forced through `(1, 1)`: a fully clear sky needs no
//! correction.

use crate::data::{ObservationFrame, and_masks, count};
use crate::domain::{Family, FcorrRow, ParameterEstimate, Variable};
use crate::error::AppError;
use crate::fit::{EstimateContext, Estimation, in_daytime_window, no_valid_samples};
use crate::math::linear_fit;
use crate::models::{blackbody, hpa_to_kpa, net_emissivity, vapor_pressure_magnus};
use crate::plot::{Figure, Layer};

pub fn estimate_fcorr(frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    let radex = ctx.require_radex(Family::Fcorr)?;
    let clear_sky_fraction = radex.clear_sky_fraction();
    if clear_sky_fraction <= 0.0 || !clear_sky_fraction.is_finite() {
        return Err(AppError::config(format!(
            "radex a + b must be positive for `fcorr`, got {clear_sky_fraction}."
        )));
    }

    let ta = frame.column(Variable::Ta)?;
    let rh = frame.column(Variable::Rh)?;
    let lw_in = frame.column(Variable::LwIn)?;
    let lw_out = frame.column(Variable::LwOut)?;
    let sw_in = frame.column(Variable::SwIn)?;
    let sw_ext = frame.column(Variable::SwExt)?;

    let mut mask = and_masks(
        &frame.hour_mask(in_daytime_window),
        &frame.value_mask(Variable::SwExt, |v| v != 0.0)?,
    );
    for var in [Variable::Ta, Variable::Rh, Variable::LwIn, Variable::LwOut, Variable::SwIn] {
        mask = and_masks(&mask, &frame.value_mask(var, |_| true)?);
    }
    log::debug!("fcorr: {} of {} rows pass the daytime mask", count(&mask), frame.len());
    let rows: Vec<usize> = (0..frame.len()).filter(|&i| mask[i]).collect();
    if rows.is_empty() {
        return Err(no_valid_samples(Family::Fcorr));
    }

    let clear_sky_ratio: Vec<f64> = rows
        .iter()
        .map(|&i| sw_in[i] / (clear_sky_fraction * sw_ext[i]))
        .collect();
    let x_max = clear_sky_ratio
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .fold(1.0_f64, f64::max);

    let mut table = Vec::new();
    let mut figure = Figure::new("Cloud correction", "sw_in / clear-sky sw", "fcorr");

    for &model in ctx.method.models() {
        let fcorr_raw: Vec<f64> = rows
            .iter()
            .map(|&i| {
                let vapor = hpa_to_kpa(vapor_pressure_magnus(ta[i], rh[i]));
                let eps = net_emissivity(model, ctx.brunt, ta[i], vapor);
                -(lw_in[i] - lw_out[i]) / (eps * blackbody(ta[i]))
            })
            .collect();

        let raw = linear_fit(&clear_sky_ratio, &fcorr_raw)
            .map_err(|e| AppError::data(format!("fcorr ({}): {}", model.display_name(), e.message())))?;
        let forced = raw.through_unit_point();
        log::info!(
            "fcorr ({}): raw {:.4} + {:.4}·x over {} samples; forced a={:.4} b={:.4}",
            model.display_name(),
            raw.intercept,
            raw.slope,
            raw.n,
            forced.intercept,
            forced.slope
        );

        figure.push(Layer::points(
            format!("{} samples", model.display_name()),
            clear_sky_ratio.iter().copied().zip(fcorr_raw.iter().copied()).collect(),
        ));
        figure.push(Layer::straight(
            format!("{} OLS", model.display_name()),
            raw.intercept,
            raw.slope,
            0.0,
            x_max,
        ));
        figure.push(Layer::straight(
            format!("{} through (1,1)", model.display_name()),
            forced.intercept,
            forced.slope,
            0.0,
            x_max,
        ));

        table.push(FcorrRow {
            method: model,
            a: forced.intercept,
            b: forced.slope,
            raw_intercept: raw.intercept,
            raw_slope: raw.slope,
            n: raw.n,
        });
    }

    Ok(Estimation {
        estimate: ParameterEstimate::Fcorr { rows: table },
        figure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BruntCoefficients, EmissivityMethod, EmissivityModel, RadexCoefficients};
    use crate::fit::testutil::{at, frame};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const VARS: [Variable; 6] = [
        Variable::Ta,
        Variable::Rh,
        Variable::LwIn,
        Variable::LwOut,
        Variable::SwIn,
        Variable::SwExt,
    ];

    const RADEX: RadexCoefficients = RadexCoefficients { a: 0.25, b: 0.5 };

    /// Rows whose raw correction under `model` is `intercept + slope * x (+ noise)`.
    fn synthetic(
        model: EmissivityModel,
        intercept: f64,
        slope: f64,
        noise: f64,
        seed: u64,
    ) -> Vec<(chrono::NaiveDateTime, Vec<f64>)> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (ta, rh, lw_out, ext) = (20.0, 50.0, 400.0, 1000.0);
        let eps = net_emissivity(
            model,
            BruntCoefficients::default(),
            ta,
            hpa_to_kpa(vapor_pressure_magnus(ta, rh)),
        );
        let mut rows = Vec::new();
        for day in 1..=20 {
            for hour in 8..=16 {
                let x: f64 = rng.gen_range(0.1..1.0);
                let y = intercept + slope * x + noise * rng.gen_range(-1.0..1.0);
                let lw_in = lw_out - y * eps * blackbody(ta);
                let sw_in = x * RADEX.clear_sky_fraction() * ext;
                rows.push((at(day, hour), vec![ta, rh, lw_in, lw_out, sw_in, ext]));
            }
        }
        rows
    }

    fn ctx(method: EmissivityMethod) -> EstimateContext {
        EstimateContext {
            method,
            radex: Some(RADEX),
            ..EstimateContext::default()
        }
    }

    #[test]
    fn recovers_exact_line_and_forces_unit_point() {
        let rows = synthetic(EmissivityModel::Idso, 0.3, 0.8, 0.0, 1);
        let est = estimate_fcorr(&frame(&VARS, &rows), &ctx(EmissivityMethod::Idso)).unwrap();
        let ParameterEstimate::Fcorr { rows } = est.estimate else {
            panic!("expected fcorr");
        };
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.method, EmissivityModel::Idso);
        assert_relative_eq!(row.raw_intercept, 0.3, epsilon = 1e-8);
        assert_relative_eq!(row.raw_slope, 0.8, epsilon = 1e-8);
        assert_relative_eq!(row.a, 0.3, epsilon = 1e-8);
        assert_relative_eq!(row.b, 0.7, epsilon = 1e-8);
        assert_eq!(row.n, 180);
    }

    #[test]
    fn each_method_sums_to_one_on_noisy_data() {
        let rows = synthetic(EmissivityModel::Brunt, 0.2, 0.9, 0.05, 42);
        let est = estimate_fcorr(&frame(&VARS, &rows), &ctx(EmissivityMethod::Both)).unwrap();
        let ParameterEstimate::Fcorr { rows } = est.estimate else {
            panic!("expected fcorr");
        };
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_relative_eq!(row.a + row.b, 1.0, epsilon = 1e-12);
        }
        assert!((rows[0].raw_intercept - 0.2).abs() < 0.05);
        assert_eq!(est.figure.layers.len(), 6);
    }

    #[test]
    fn missing_radex_is_a_config_error() {
        let rows = synthetic(EmissivityModel::Idso, 0.3, 0.8, 0.0, 1);
        let err = estimate_fcorr(&frame(&VARS, &rows), &EstimateContext::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn night_only_data_has_no_valid_samples() {
        let rows = vec![(at(1, 2), vec![10.0, 80.0, 300.0, 350.0, 0.0, 0.0])];
        let err = estimate_fcorr(&frame(&VARS, &rows), &ctx(EmissivityMethod::Both)).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }
}
