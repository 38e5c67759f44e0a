//! Command-line parsing for the evapotranspiration calibration helper.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! estimation/comparison code. Flags are turned into `EstimateConfig` /
//! `CompareConfig` in `app`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::CompareVariable;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "etcal",
    version,
    about = "Evapotranspiration model parameter estimation and run comparison"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate one parameter family (alb, radex, fcorr, emis, f) from observations.
    Estimate(EstimateArgs),
    /// Run the simulation engine and compare its output with observations.
    Compare(CompareArgs),
}

/// Diagnostic plot options shared by both subcommands.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Do not write SVG diagnostics.
    #[arg(long)]
    pub no_plots: bool,

    /// Plot directory (default: $ETCAL_PLOT_DIR or `plots`).
    #[arg(long, value_name = "DIR")]
    pub plot_dir: Option<PathBuf>,

    /// First date shown on time-axis plots (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub plot_from: Option<NaiveDate>,

    /// Last date shown on time-axis plots (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub plot_to: Option<NaiveDate>,
}

#[derive(Debug, Args, Clone)]
pub struct EstimateArgs {
    /// Parameter to estimate; `radex_a`, `fcorr_idso`, `f_day` etc. resolve to their family.
    #[arg(value_name = "FAMILY")]
    pub parameter: String,

    /// Source-set JSON listing the observation files of one site.
    #[arg(long, value_name = "JSON")]
    pub sources: PathBuf,

    /// Emissivity model(s) for `fcorr`: brunt, idso or both
    /// (default: taken from a `fcorr_brunt`/`fcorr_idso` name, else both).
    #[arg(long)]
    pub method: Option<String>,

    /// Lower quantile of the clear-sky ratio used for `radex_a`.
    #[arg(long, default_value_t = 0.05)]
    pub quantile: f64,

    /// Known radiation-extinction intercept (estimated from the sources when omitted).
    #[arg(long, requires = "radex_b", allow_negative_numbers = true)]
    pub radex_a: Option<f64>,

    /// Known radiation-extinction slope.
    #[arg(long, requires = "radex_a", allow_negative_numbers = true)]
    pub radex_b: Option<f64>,

    /// Brunt emissivity intercept.
    #[arg(long, default_value_t = 0.34, allow_negative_numbers = true)]
    pub brunt_a: f64,

    /// Brunt emissivity slope.
    #[arg(long, default_value_t = -0.14, allow_negative_numbers = true)]
    pub brunt_b: f64,

    #[command(flatten)]
    pub plots: PlotArgs,

    /// Print an ASCII preview of the diagnostic figure.
    #[arg(long)]
    pub preview: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write the estimate to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    /// Source-set JSON listing the observation files of one site.
    #[arg(long, value_name = "JSON")]
    pub sources: PathBuf,

    /// Engine spec JSON (program, arguments, run directory, output file).
    #[arg(long, value_name = "JSON")]
    pub engine: PathBuf,

    /// Simulated quantity to compare.
    #[arg(long, value_enum, default_value_t = CompareVariable::Et)]
    pub variable: CompareVariable,

    /// Moving-average window (samples) for auxiliary channels.
    #[arg(long, default_value_t = 24)]
    pub window: usize,

    /// Substitute for missing samples before averaging.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub fill: f64,

    /// Reuse the existing engine output instead of running the engine.
    #[arg(long)]
    pub skip_run: bool,

    #[command(flatten)]
    pub plots: PlotArgs,

    /// Write the aligned comparison table to a CSV file.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
