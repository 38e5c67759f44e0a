//! Net emissivity: reported constant plus clear-sky diagnostics.
//!
//! The Brunt literature coefficients are always returned. Clear-sky samples
//! only serve to show how observed emissivity compares with the Brunt and
//! Idso predictions.

use crate::data::ObservationFrame;
use crate::domain::{BruntCoefficients, EmissivityDiagnostics, ParameterEstimate, Variable};
use crate::error::AppError;
use crate::fit::{EstimateContext, Estimation};
use crate::math::mean;
use crate::models::{emissivity_brunt, emissivity_idso, hpa_to_kpa, observed_emissivity, vapor_pressure_magnus};
use crate::plot::{Figure, Layer};

/// Clear-sky ratio band `(low, high]` treated as cloud-free.
pub const CLEAR_SKY_BAND: (f64, f64) = (0.9, 1.0);

#[derive(Debug, Clone, Copy)]
struct ClearSkySample {
    observed: f64,
    brunt: f64,
    idso: f64,
}

pub fn estimate_emissivity(frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    let constant = BruntCoefficients::default();

    let samples = match ctx.radex {
        Some(radex) => clear_sky_samples(frame, ctx, radex.clear_sky_fraction())?,
        None => {
            log::warn!("emis: no radex coefficients, diagnostics left empty");
            Vec::new()
        }
    };

    let observed: Vec<f64> = samples.iter().map(|s| s.observed).collect();
    let brunt: Vec<f64> = samples.iter().map(|s| s.brunt).collect();
    let idso: Vec<f64> = samples.iter().map(|s| s.idso).collect();
    let diagnostics = EmissivityDiagnostics {
        n: samples.len(),
        mean_observed: mean(&observed).unwrap_or(f64::NAN),
        mean_brunt: mean(&brunt).unwrap_or(f64::NAN),
        mean_idso: mean(&idso).unwrap_or(f64::NAN),
    };
    if samples.is_empty() {
        log::warn!("emis: no clear-sky samples");
    } else {
        log::info!(
            "emis: {} clear-sky samples, observed {:.4} vs Brunt {:.4} / Idso {:.4}",
            diagnostics.n,
            diagnostics.mean_observed,
            diagnostics.mean_brunt,
            diagnostics.mean_idso
        );
    }

    let figure = Figure::new("Net emissivity (clear sky)", "observed", "modeled")
        .with_layer(Layer::points("Brunt", observed.iter().copied().zip(brunt).collect()))
        .with_layer(Layer::points("Idso", observed.iter().copied().zip(idso).collect()))
        .with_layer(one_to_one(&observed));

    Ok(Estimation {
        estimate: ParameterEstimate::Emis {
            a: constant.a,
            b: constant.b,
            diagnostics,
        },
        figure,
    })
}

fn clear_sky_samples(
    frame: &ObservationFrame,
    ctx: &EstimateContext,
    clear_sky_fraction: f64,
) -> Result<Vec<ClearSkySample>, AppError> {
    let ta = frame.column(Variable::Ta)?;
    let rh = frame.column(Variable::Rh)?;
    let lw_in = frame.column(Variable::LwIn)?;
    let lw_out = frame.column(Variable::LwOut)?;
    let sw_in = frame.column(Variable::SwIn)?;
    let sw_ext = frame.column(Variable::SwExt)?;

    let (low, high) = CLEAR_SKY_BAND;
    let samples = (0..frame.len())
        .filter(|&i| {
            let ratio = sw_in[i] / (clear_sky_fraction * sw_ext[i]);
            ratio.is_finite() && ratio > low && ratio <= high
        })
        .map(|i| {
            let vapor = hpa_to_kpa(vapor_pressure_magnus(ta[i], rh[i]));
            ClearSkySample {
                observed: observed_emissivity(lw_in[i], lw_out[i], ta[i]),
                brunt: emissivity_brunt(ctx.brunt.a, ctx.brunt.b, vapor),
                idso: emissivity_idso(ta[i]),
            }
        })
        .filter(|s| s.observed.is_finite() && s.brunt.is_finite() && s.idso.is_finite())
        .collect();
    Ok(samples)
}

fn one_to_one(observed: &[f64]) -> Layer {
    let (lo, hi) = observed
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &x| (a.min(x), b.max(x)));
    if lo.is_finite() {
        Layer::straight("1:1", 0.0, 1.0, lo, hi)
    } else {
        Layer::line("1:1", Vec::new())
    }
}
