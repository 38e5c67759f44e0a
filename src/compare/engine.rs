//! External simulation engine: run it, then read what it wrote.

use std::path::PathBuf;
use std::process::Command;

use crate::data::TimeSeries;
use crate::domain::EngineSpec;
use crate::error::AppError;
use crate::io::ingest::{DelimitedOptions, read_delimited};

/// Absolute path of the engine's output file.
pub fn output_path(spec: &EngineSpec) -> PathBuf {
    spec.run_dir.join(&spec.output)
}

/// Run `program args...` inside `run_dir` and wait for it.
///
/// Spawn failures and non-zero exits are external errors carrying the child's stderr.
pub fn run_engine(spec: &EngineSpec) -> Result<(), AppError> {
    if !spec.run_dir.is_dir() {
        return Err(AppError::config(format!(
            "Engine run directory '{}' does not exist.",
            spec.run_dir.display()
        )));
    }

    log::info!(
        "running {} ({} {}) in '{}'",
        spec.name,
        spec.program,
        spec.args.join(" "),
        spec.run_dir.display()
    );
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.run_dir)
        .output()
        .map_err(|e| AppError::external(format!("Failed to start `{}`: {e}", spec.program)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
        return Err(AppError::external(format!(
            "{} exited with {}:\n{}",
            spec.name,
            output.status,
            stderr.trim_end()
        )));
    }
    if !stderr.trim().is_empty() {
        log::debug!("{} stderr:\n{}", spec.name, stderr.trim_end());
    }
    log::info!("{} finished", spec.name);
    Ok(())
}

/// Read the engine's output series.
pub fn read_engine_output(spec: &EngineSpec) -> Result<TimeSeries, AppError> {
    let path = output_path(spec);
    if !path.is_file() {
        return Err(AppError::data(format!(
            "Engine output '{}' not found; run without --skip-run first.",
            path.display()
        )));
    }
    let opts = DelimitedOptions {
        delimiter: spec.delimiter,
        time_column: Some(spec.time_column.clone()),
        value_column: spec.value_column.clone(),
    };
    let series = read_delimited(&spec.name, &path, &opts)?;
    log::info!("{}: {} simulated samples from '{}'", spec.name, series.len(), path.display());
    Ok(series)
}
