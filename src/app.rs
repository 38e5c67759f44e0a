//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into run configurations
//! - loads the source set / engine spec
//! - runs the estimate or compare pipeline
//! - prints reports and previews
//! - writes optional exports

use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, CompareArgs, EstimateArgs, PlotArgs};
use crate::domain::{BruntCoefficients, CompareConfig, EmissivityMethod, EstimateConfig, PlotConfig, RadexCoefficients};
use crate::error::AppError;
use crate::io::{SourceSetProvider, load_engine_spec, load_source_set, write_comparison_csv, write_estimate_json};
use crate::plot::render_ascii;
use crate::report::{format_comparison, format_estimate};

pub mod pipeline;

/// Environment variable holding the default plot directory.
pub const PLOT_DIR_ENV: &str = "ETCAL_PLOT_DIR";

/// Entry point for the `etcal` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Estimate(args) => handle_estimate(args),
        Command::Compare(args) => handle_compare(args),
    }
}

fn handle_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = estimate_config_from_args(&args)?;
    let set = load_source_set(&config.sources_path)?;
    let site = set.site.clone();
    let provider = SourceSetProvider::new([set]);

    let run = pipeline::run_estimate(&config, &provider, &site)?;

    println!("{}", format_estimate(&run.site, run.period, &run.estimation.estimate));
    if let Some(radex) = run.derived_radex {
        println!("(radex estimated on the fly: a={:.4} b={:.4})", radex.a, radex.b);
    }

    if config.preview {
        println!(
            "{}",
            render_ascii(&run.estimation.figure, config.preview_width, config.preview_height)
        );
    }

    if let Some(path) = &config.export {
        write_estimate_json(path, &run.site, &run.estimation.estimate)?;
    }

    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = compare_config_from_args(&args)?;
    let set = load_source_set(&config.sources_path)?;
    let engine = load_engine_spec(&config.engine_path)?;
    let site = set.site.clone();
    let provider = SourceSetProvider::new([set]);

    let run = pipeline::run_compare(&config, &provider, &site, &engine)?;

    println!("{}", format_comparison(&run.site, &engine, &run.comparison));

    if let Some(path) = &config.export {
        write_comparison_csv(path, &run.comparison)?;
    }

    Ok(())
}

pub fn estimate_config_from_args(args: &EstimateArgs) -> Result<EstimateConfig, AppError> {
    let radex = match (args.radex_a, args.radex_b) {
        (Some(a), Some(b)) => Some(RadexCoefficients { a, b }),
        _ => None,
    };

    Ok(EstimateConfig {
        parameter: args.parameter.clone(),
        sources_path: args.sources.clone(),
        method: resolve_method(args)?,
        quantile: args.quantile,
        radex,
        brunt: BruntCoefficients {
            a: args.brunt_a,
            b: args.brunt_b,
        },
        plots: plot_config_from_args(&args.plots)?,
        preview: args.preview,
        preview_width: args.width,
        preview_height: args.height,
        export: args.export.clone(),
    })
}

/// An explicit `--method` wins; otherwise a `fcorr_<method>` name decides.
fn resolve_method(args: &EstimateArgs) -> Result<EmissivityMethod, AppError> {
    let implied = EmissivityMethod::implied_by(&args.parameter);
    let Some(method) = &args.method else {
        return Ok(implied.unwrap_or(EmissivityMethod::Both));
    };
    let method = EmissivityMethod::parse(method)?;
    if let Some(implied) = implied.filter(|&m| m != method) {
        log::warn!(
            "--method {method:?} overrides the {implied:?} model named by `{}`",
            args.parameter
        );
    }
    Ok(method)
}

pub fn compare_config_from_args(args: &CompareArgs) -> Result<CompareConfig, AppError> {
    Ok(CompareConfig {
        sources_path: args.sources.clone(),
        engine_path: args.engine.clone(),
        variable: args.variable,
        window: args.window,
        fill: args.fill,
        skip_run: args.skip_run,
        plots: plot_config_from_args(&args.plots)?,
        export: args.export.clone(),
    })
}

fn plot_config_from_args(args: &PlotArgs) -> Result<PlotConfig, AppError> {
    if let (Some(from), Some(to)) = (args.plot_from, args.plot_to) {
        if from > to {
            return Err(AppError::config(format!(
                "--plot-from ({from}) is after --plot-to ({to})."
            )));
        }
    }

    Ok(PlotConfig {
        enabled: !args.no_plots,
        dir: args.plot_dir.clone().unwrap_or_else(default_plot_dir),
        from: args.plot_from,
        to: args.plot_to,
    })
}

fn default_plot_dir() -> PathBuf {
    std::env::var(PLOT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("plots"))
}
