//! Parameter estimation.
//!
//! Responsibilities:
//!
//! - resolve the requested family (`Family::resolve`) and dispatch to its estimator
//! - apply the family's validity mask to the merged observations
//! - reduce the masked samples to the parameter estimate (mean, quantile, OLS)
//! - describe a diagnostic figure for the caller to render or ignore

use chrono::NaiveDate;

use crate::data::ObservationFrame;
use crate::domain::{
    BruntCoefficients, EmissivityMethod, EstimateConfig, Family, ParameterEstimate, RadexCoefficients,
    SiteLocation,
};
use crate::error::AppError;
use crate::plot::Figure;

pub mod albedo;
pub mod emis;
pub mod fcorr;
pub mod radex;
pub mod soil_heat;

/// Inputs besides the observations themselves.
#[derive(Debug, Clone)]
pub struct EstimateContext {
    pub method: EmissivityMethod,
    pub quantile: f64,
    pub brunt: BruntCoefficients,
    pub radex: Option<RadexCoefficients>,
    pub location: Option<SiteLocation>,
    /// Date window for time-axis diagnostics.
    pub plot_from: Option<NaiveDate>,
    pub plot_to: Option<NaiveDate>,
}

impl Default for EstimateContext {
    fn default() -> Self {
        Self {
            method: EmissivityMethod::Both,
            quantile: 0.05,
            brunt: BruntCoefficients::default(),
            radex: None,
            location: None,
            plot_from: None,
            plot_to: None,
        }
    }
}

impl EstimateContext {
    pub fn from_config(config: &EstimateConfig) -> Self {
        Self {
            method: config.method,
            quantile: config.quantile,
            brunt: config.brunt,
            radex: config.radex,
            location: None,
            plot_from: config.plots.from,
            plot_to: config.plots.to,
        }
    }

    pub fn require_radex(&self, family: Family) -> Result<RadexCoefficients, AppError> {
        self.radex.ok_or_else(|| {
            AppError::config(format!(
                "`{family}` needs radiation-extinction coefficients (--radex-a/--radex-b)."
            ))
        })
    }

    pub fn require_location(&self, family: Family) -> Result<SiteLocation, AppError> {
        self.location.ok_or_else(|| {
            AppError::config(format!("`{family}` needs the site latitude/longitude."))
        })
    }
}

/// An estimate plus the figure that documents it.
#[derive(Debug, Clone)]
pub struct Estimation {
    pub estimate: ParameterEstimate,
    pub figure: Figure,
}

/// Daytime window used by the radiation families: hours 8 through 16.
pub fn in_daytime_window(hour: u32) -> bool {
    hour > 7 && hour < 17
}

/// Run the estimator for `family` on an already merged frame.
pub fn estimate(family: Family, frame: &ObservationFrame, ctx: &EstimateContext) -> Result<Estimation, AppError> {
    log::info!("estimating `{family}` from {} merged rows", frame.len());
    match family {
        Family::Alb => albedo::estimate_albedo(frame, ctx),
        Family::Radex => radex::estimate_radex(frame, ctx),
        Family::Fcorr => fcorr::estimate_fcorr(frame, ctx),
        Family::Emis => emis::estimate_emissivity(frame, ctx),
        Family::SoilHeat => soil_heat::estimate_soil_heat(frame, ctx),
    }
}

pub(crate) fn no_valid_samples(family: Family) -> AppError {
    AppError::data(format!(
        "No valid samples for `{family}` after filtering; check the input period and sources."
    ))
}

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::data::{ObservationFrame, TimeSeries};
    use crate::domain::Variable;

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    /// Frame from `(timestamp, [values in `vars` order])` rows, in any order.
    pub fn frame(vars: &[Variable], rows: &[(NaiveDateTime, Vec<f64>)]) -> ObservationFrame {
        let mut rows = rows.to_vec();
        rows.sort_by_key(|(t, _)| *t);
        let series = vars
            .iter()
            .enumerate()
            .map(|(j, &var)| {
                let points = rows.iter().map(|(t, vals)| (*t, vals[j])).collect();
                (var, TimeSeries::new(var.key(), points).unwrap())
            })
            .collect();
        ObservationFrame::inner_join(series).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use crate::domain::Variable;

    #[test]
    fn daytime_window_is_exclusive() {
        assert!(!in_daytime_window(7));
        assert!(in_daytime_window(8));
        assert!(in_daytime_window(16));
        assert!(!in_daytime_window(17));
    }

    #[test]
    fn dispatch_resolved_family() {
        let frame = frame(&[Variable::SwIn, Variable::SwOut], &[(at(1, 12), vec![500.0, 50.0])]);
        let family = Family::resolve("alb").unwrap();
        let est = estimate(family, &frame, &EstimateContext::default()).unwrap();
        assert_eq!(est.estimate.family(), Family::Alb);
    }

    #[test]
    fn missing_radex_is_a_config_error() {
        let err = EstimateContext::default().require_radex(Family::Fcorr).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }
}
