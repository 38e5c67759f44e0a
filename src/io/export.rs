//! Result exports.
//!
//! Estimates go to JSON (transcribed into model configurations); comparison
//! tables go to CSV for spreadsheets and downstream scripts.

use std::fs::{File, create_dir_all};
use std::path::Path;

use serde::Serialize;

use crate::compare::Comparison;
use crate::domain::ParameterEstimate;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct EstimateFile<'a> {
    tool: &'static str,
    site: &'a str,
    #[serde(flatten)]
    estimate: &'a ParameterEstimate,
}

/// Write an estimate (tagged by family) as pretty JSON.
pub fn write_estimate_json(path: &Path, site: &str, estimate: &ParameterEstimate) -> Result<(), AppError> {
    let file = create(path, "estimate JSON")?;
    let doc = EstimateFile {
        tool: "etcal",
        site,
        estimate,
    };
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::output(format!("Failed to write estimate JSON: {e}")))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Write the aligned comparison table with running totals.
pub fn write_comparison_csv(path: &Path, comparison: &Comparison) -> Result<(), AppError> {
    let file = create(path, "comparison CSV")?;
    let mut writer = csv::Writer::from_writer(file);
    let csv_err =
        |e: csv::Error| AppError::output(format!("Failed to write comparison CSV '{}': {e}", path.display()));

    let (sim, obs) = (&comparison.simulated_name, &comparison.observed_name);
    writer
        .write_record([
            "timestamp".to_string(),
            sim.clone(),
            obs.clone(),
            format!("{sim}_cum"),
            format!("{obs}_cum"),
        ])
        .map_err(csv_err)?;

    for r in &comparison.rows {
        writer
            .write_record([
                r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                format!("{:.6}", r.simulated),
                format!("{:.6}", r.observed),
                format!("{:.6}", r.simulated_cum),
                format!("{:.6}", r.observed_cum),
            ])
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush comparison CSV '{}': {e}", path.display())))?;

    log::info!("wrote {} rows to {}", comparison.rows.len(), path.display());
    Ok(())
}

fn create(path: &Path, what: &str) -> Result<File, AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .map_err(|e| AppError::output(format!("Failed to create '{}': {e}", parent.display())))?;
    }
    File::create(path).map_err(|e| AppError::output(format!("Failed to create {what} '{}': {e}", path.display())))
}
