//! Source-set files and observation providers.
//!
//! Pipelines never look data up by name at run time. They receive an
//! `ObservationProvider` and ask it for a `(site, variable)` channel; the
//! default provider is backed by per-site `SourceSet` JSON files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::data::{ObservationFrame, TimeSeries};
use crate::domain::{EngineSpec, SiteLocation, SourceSet, Variable};
use crate::error::AppError;
use crate::io::ingest::read_series;

/// Supplies observed channels for a site.
pub trait ObservationProvider {
    /// Hourly series of `variable` at `site`.
    fn channel(&self, site: &str, variable: Variable) -> Result<TimeSeries, AppError>;

    /// Geographic location of `site`.
    fn location(&self, site: &str) -> Result<SiteLocation, AppError>;
}

/// Load several channels of one site and inner-join them.
pub fn load_frame(
    provider: &dyn ObservationProvider,
    site: &str,
    variables: &[Variable],
) -> Result<ObservationFrame, AppError> {
    let mut series = Vec::with_capacity(variables.len());
    for &var in variables {
        let s = provider.channel(site, var)?;
        log::info!("{site}/{var}: {} hourly samples", s.len());
        series.push((var, s));
    }
    let frame = ObservationFrame::inner_join(series)?;
    log::info!("{site}: {} rows after merging {} channels", frame.len(), variables.len());
    Ok(frame)
}

/// Provider reading the files listed in one or more `SourceSet`s.
#[derive(Debug, Clone, Default)]
pub struct SourceSetProvider {
    sites: BTreeMap<String, SourceSet>,
}

impl SourceSetProvider {
    pub fn new(sets: impl IntoIterator<Item = SourceSet>) -> Self {
        Self {
            sites: sets.into_iter().map(|s| (s.site.clone(), s)).collect(),
        }
    }

    pub fn site(&self, site: &str) -> Result<&SourceSet, AppError> {
        self.sites.get(site).ok_or_else(|| {
            AppError::config(format!(
                "Unknown site '{site}'. Known sites: {}",
                self.sites.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}

impl ObservationProvider for SourceSetProvider {
    fn channel(&self, site: &str, variable: Variable) -> Result<TimeSeries, AppError> {
        let spec = self.site(site)?.source(variable)?;
        read_series(variable.key(), spec)
    }

    fn location(&self, site: &str) -> Result<SiteLocation, AppError> {
        self.site(site)?.location()
    }
}

/// Read a source-set JSON file; relative source paths resolve against its directory.
pub fn load_source_set(path: &Path) -> Result<SourceSet, AppError> {
    let mut set: SourceSet = read_json_config(path, "source set")?;
    let base = path.parent().unwrap_or(Path::new(""));
    for spec in set.sources.values_mut() {
        if spec.path.is_relative() {
            spec.path = base.join(&spec.path);
        }
    }
    Ok(set)
}

/// Read an engine spec JSON file; a relative `run_dir` resolves against its directory.
pub fn load_engine_spec(path: &Path) -> Result<EngineSpec, AppError> {
    let mut spec: EngineSpec = read_json_config(path, "engine spec")?;
    if spec.run_dir.is_relative() {
        let base = path.parent().unwrap_or(Path::new(""));
        spec.run_dir = base.join(&spec.run_dir);
    }
    Ok(spec)
}

fn read_json_config<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open {what} '{}': {e}", path.display())))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::config(format!("Invalid {what} '{}': {e}", path.display())))
}
