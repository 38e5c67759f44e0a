//! Surface albedo from reflected vs incoming shortwave.

use crate::data::{ObservationFrame, and_masks};
use crate::domain::{Family, ParameterEstimate, Variable};
use crate::error::AppError;
use crate::fit::{EstimateContext, Estimation, in_daytime_window, no_valid_samples};
use crate::math::mean;
use crate::plot::{Figure, Layer, TimeAxis, in_window};

/// Mean of `sw_out / sw_in` over daytime samples with both fluxes non-zero
/// and the ratio below 1.
pub fn estimate_albedo(frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    let sw_in = frame.column(Variable::SwIn)?;
    let sw_out = frame.column(Variable::SwOut)?;

    let mask = and_masks(
        &frame.hour_mask(in_daytime_window),
        &and_masks(
            &frame.value_mask(Variable::SwIn, |v| v != 0.0)?,
            &frame.value_mask(Variable::SwOut, |v| v != 0.0)?,
        ),
    );

    let samples: Vec<(usize, f64)> = mask
        .iter()
        .enumerate()
        .filter(|(_, keep)| **keep)
        .map(|(i, _)| (i, sw_out[i] / sw_in[i]))
        .filter(|&(_, ratio)| ratio < 1.0)
        .collect();

    let ratios: Vec<f64> = samples.iter().map(|&(_, r)| r).collect();
    let albedo = mean(&ratios).ok_or_else(|| no_valid_samples(Family::Alb))?;
    log::info!("alb: {:.4} from {} daytime ratios", albedo, ratios.len());

    let figure = match frame.index().first() {
        Some(&origin) => {
            let axis = TimeAxis::starting_at(origin);
            let points = samples
                .iter()
                .map(|&(i, r)| (frame.index()[i], r))
                .filter(|&(t, _)| in_window(t, ctx.plot_from, ctx.plot_to))
                .map(|(t, r)| (axis.x(t), r))
                .collect::<Vec<_>>();
            let (x0, x1) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &(x, _)| (a.min(x), b.max(x)));
            let mut fig = Figure::new("Albedo", axis.label(), "sw_out / sw_in")
                .with_layer(Layer::points("ratio", points));
            if x0.is_finite() {
                fig.push(Layer::horizontal(format!("alb = {albedo:.3}"), albedo, x0, x1));
            }
            fig
        }
        None => Figure::new("Albedo", "time", "sw_out / sw_in"),
    };

    Ok(Estimation {
        estimate: ParameterEstimate::Alb {
            albedo,
            n: ratios.len(),
        },
        figure,
    })
}
