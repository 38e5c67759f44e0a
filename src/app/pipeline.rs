//! Shared "estimate" and "compare" pipelines.
//!
//! Keeping the workflows here keeps `app` focused on presentation:
//!
//! - estimate: load channels -> merge -> (radex on the fly) -> fit -> SVG
//! - compare: run engine -> read output -> align with observations -> SVG
//!
//! Observations always come through an `ObservationProvider`, so tests can
//! drive both pipelines from memory.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::compare::{Comparison, compare_series, comparison_figure, cumulative_figure, read_engine_output, run_engine};
use crate::data::TimeSeries;
use crate::domain::{
    CompareConfig, EngineSpec, EstimateConfig, Family, ParameterEstimate, PlotConfig, RadexCoefficients,
};
use crate::error::AppError;
use crate::fit::{self, EstimateContext, Estimation};
use crate::io::{ObservationProvider, load_frame};
use crate::plot::{Figure, plot_path, render_svg, svg::DEFAULT_SIZE};

/// All computed outputs of a single `etcal estimate` run.
#[derive(Debug, Clone)]
pub struct EstimateRun {
    pub site: String,
    pub family: Family,
    pub period: Option<(NaiveDate, NaiveDate)>,
    pub estimation: Estimation,
    /// Radex coefficients estimated on the fly for `fcorr`/`emis`.
    pub derived_radex: Option<RadexCoefficients>,
    pub plots: Vec<PathBuf>,
}

/// Execute the estimation pipeline for `site`.
pub fn run_estimate(
    config: &EstimateConfig,
    provider: &dyn ObservationProvider,
    site: &str,
) -> Result<EstimateRun, AppError> {
    let family = Family::resolve(&config.parameter)?;
    log::info!("{site}: '{}' resolves to `{family}`", config.parameter);

    let mut ctx = EstimateContext::from_config(config);
    if family == Family::SoilHeat {
        ctx.location = Some(provider.location(site)?);
    }

    let mut derived_radex = None;
    if family.needs_radex() && ctx.radex.is_none() {
        match derive_radex(provider, site, &ctx) {
            Ok(radex) => {
                derived_radex = Some(radex);
                ctx.radex = Some(radex);
            }
            // emis only needs radex for its diagnostics.
            Err(err) if family == Family::Emis => {
                log::warn!("{site}: radex not available for emis diagnostics: {err}");
            }
            Err(err) => return Err(err),
        }
    }

    let frame = load_frame(provider, site, family.required_variables())?;
    let period = frame.date_range();
    let estimation = fit::estimate(family, &frame, &ctx)?;

    let mut plots = Vec::new();
    if let Some(path) = write_plot(&config.plots, &[site, family.tag()], period, &estimation.figure)? {
        plots.push(path);
    }

    Ok(EstimateRun {
        site: site.to_string(),
        family,
        period,
        estimation,
        derived_radex,
        plots,
    })
}

/// Estimate radex from the same source set when it was not given.
fn derive_radex(
    provider: &dyn ObservationProvider,
    site: &str,
    ctx: &EstimateContext,
) -> Result<RadexCoefficients, AppError> {
    log::info!("{site}: no radex coefficients given, estimating them first");
    let frame = load_frame(provider, site, Family::Radex.required_variables())?;
    match fit::estimate(Family::Radex, &frame, ctx)?.estimate {
        ParameterEstimate::Radex { a, b, .. } => Ok(RadexCoefficients { a, b }),
        other => Err(AppError::data(format!(
            "radex estimation returned a `{}` estimate",
            other.family()
        ))),
    }
}

/// All computed outputs of a single `etcal compare` run.
#[derive(Debug, Clone)]
pub struct CompareRun {
    pub site: String,
    pub comparison: Comparison,
    /// Moving averages of the auxiliary channels that could be loaded.
    pub auxiliary: Vec<TimeSeries>,
    pub plots: Vec<PathBuf>,
}

/// Execute the run-and-compare pipeline for `site`.
pub fn run_compare(
    config: &CompareConfig,
    provider: &dyn ObservationProvider,
    site: &str,
    engine: &EngineSpec,
) -> Result<CompareRun, AppError> {
    if config.window == 0 {
        return Err(AppError::config("Moving-average window must be > 0."));
    }
    if !config.fill.is_finite() {
        return Err(AppError::config(format!(
            "Moving-average fill must be a finite number, got {}.",
            config.fill
        )));
    }

    if config.skip_run {
        log::info!("skipping {} run, reusing its last output", engine.name);
    } else {
        run_engine(engine)?;
    }
    let simulated = read_engine_output(engine)?;
    let observed = provider.channel(site, config.variable.observed())?;
    let comparison = compare_series(&simulated, &observed)?;

    let mut auxiliary = Vec::new();
    for &var in config.variable.auxiliary() {
        match provider.channel(site, var) {
            Ok(series) => auxiliary.push(series.moving_average(config.window, config.fill)?),
            Err(err) => log::warn!("{site}: skipping auxiliary `{var}`: {err}"),
        }
    }

    let period = comparison.date_range();
    let parts = [site, engine.name.as_str(), config.variable.key()];
    let mut plots = Vec::new();
    let main = comparison_figure(&comparison, &auxiliary, config.plots.from, config.plots.to);
    if let Some(path) = write_plot(&config.plots, &parts, period, &main)? {
        plots.push(path);
    }
    let cumulative = cumulative_figure(&comparison, config.plots.from, config.plots.to);
    let cum_parts = [site, engine.name.as_str(), config.variable.key(), "cum"];
    if let Some(path) = write_plot(&config.plots, &cum_parts, period, &cumulative)? {
        plots.push(path);
    }

    Ok(CompareRun {
        site: site.to_string(),
        comparison,
        auxiliary,
        plots,
    })
}

fn write_plot(
    plots: &PlotConfig,
    parts: &[&str],
    period: Option<(NaiveDate, NaiveDate)>,
    figure: &Figure,
) -> Result<Option<PathBuf>, AppError> {
    if !plots.enabled || figure.is_empty() {
        return Ok(None);
    }
    let path = plot_path(&plots.dir, parts, period);
    render_svg(figure, &path, DEFAULT_SIZE)?;
    Ok(Some(path))
}
