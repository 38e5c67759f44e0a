//! Shared domain types.
//!
//! This module defines:
//!
//! - observed quantities and how their sources are read (`Variable`, `SourceSpec`, `SourceSet`)
//! - parameter families and emissivity selectors (`Family`, `EmissivityMethod`)
//! - resolved run configurations (`EstimateConfig`, `CompareConfig`)

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An observed (or simulated) physical quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    /// Downward (incoming) shortwave flux, W/m².
    SwIn,
    /// Upward (reflected) shortwave flux, W/m².
    SwOut,
    /// Extraterrestrial shortwave flux, W/m².
    SwExt,
    /// Downward longwave flux, W/m².
    LwIn,
    /// Upward longwave flux, W/m².
    LwOut,
    /// Air temperature, °C.
    Ta,
    /// Relative humidity, %.
    Rh,
    /// Net radiation, W/m².
    Rn,
    /// Soil heat flux, W/m².
    G,
    /// Observed evapotranspiration.
    Et,
}

impl Variable {
    /// Column name used in frames, exports and source files.
    pub fn key(self) -> &'static str {
        match self {
            Variable::SwIn => "sw_in",
            Variable::SwOut => "sw_out",
            Variable::SwExt => "sw_ext",
            Variable::LwIn => "lw_in",
            Variable::LwOut => "lw_out",
            Variable::Ta => "ta",
            Variable::Rh => "rh",
            Variable::Rn => "rn",
            Variable::G => "g",
            Variable::Et => "et",
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Native resolution of a source file.
///
/// Declared per source instead of being guessed from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampling {
    /// Already one sample per hour; loaded as-is.
    #[default]
    Hourly,
    /// Finer than hourly; collapsed to hourly means on load.
    SubHourly,
}

/// On-disk encoding of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Two-column delimited text (timestamp, value).
    Delimited,
    /// A serialized `TimeSeries` (JSON).
    Json,
}

/// How to read one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub path: PathBuf,
    #[serde(default)]
    pub sampling: Sampling,
    /// Explicit format; when absent `.json` files are read as JSON, everything else as text.
    #[serde(default)]
    pub format: Option<SourceFormat>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Header name of the timestamp column (default: first column).
    #[serde(default)]
    pub time_column: Option<String>,
    /// Header name of the value column (default: second column).
    #[serde(default)]
    pub value_column: Option<String>,
}

impl SourceSpec {
    /// Source with default reader options; the format follows the file extension.
    pub fn new(path: impl Into<PathBuf>, sampling: Sampling) -> Self {
        Self {
            path: path.into(),
            sampling,
            format: None,
            delimiter: default_delimiter(),
            time_column: None,
            value_column: None,
        }
    }

    pub fn resolved_format(&self) -> SourceFormat {
        if let Some(format) = self.format {
            return format;
        }
        let is_json = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            SourceFormat::Json
        } else {
            SourceFormat::Delimited
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Geographic location used for sunrise/sunset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteLocation {
    /// Degrees north.
    pub latitude: f64,
    /// Degrees east.
    pub longitude: f64,
    /// Offset of the data's clock time from UTC, hours.
    pub utc_offset_hours: f64,
}

/// All observation sources of one site (the `--sources` JSON file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSet {
    pub site: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub utc_offset_hours: f64,
    pub sources: BTreeMap<Variable, SourceSpec>,
}

impl SourceSet {
    pub fn source(&self, variable: Variable) -> Result<&SourceSpec, AppError> {
        self.sources.get(&variable).ok_or_else(|| {
            AppError::config(format!(
                "Site '{}' has no source configured for `{variable}`.",
                self.site
            ))
        })
    }

    pub fn location(&self) -> Result<SiteLocation, AppError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Ok(SiteLocation {
                latitude,
                longitude,
                utc_offset_hours: self.utc_offset_hours,
            }),
            _ => Err(AppError::config(format!(
                "Site '{}' needs `latitude` and `longitude` for sunrise/sunset.",
                self.site
            ))),
        }
    }
}

/// A parameter family the estimator knows how to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Surface albedo.
    Alb,
    /// Radiation-extinction coefficients (clear-sky transmissivity).
    Radex,
    /// Cloud correction factor for clear-sky longwave.
    Fcorr,
    /// Net emissivity coefficients.
    Emis,
    /// Soil heat fraction (day/night).
    #[serde(rename = "f")]
    SoilHeat,
}

impl Family {
    /// Resolution order. `fcorr` must be tried before `f`.
    pub const PRIORITY: [Family; 5] = [
        Family::Alb,
        Family::Radex,
        Family::Fcorr,
        Family::Emis,
        Family::SoilHeat,
    ];

    /// Resolve a requested parameter name to a family.
    ///
    /// `alb` must match exactly; every other family matches names starting
    /// with its tag (`radex_a`, `fcorr_idso`, `f_day`, ...).
    pub fn resolve(name: &str) -> Result<Family, AppError> {
        let name = name.trim().to_ascii_lowercase();
        Family::PRIORITY
            .into_iter()
            .find(|family| family.matches(&name))
            .ok_or_else(|| {
                AppError::config(format!(
                    "Unknown parameter '{name}': expected one of {{radex*, fcorr*, f*, emis*, alb}}"
                ))
            })
    }

    fn matches(self, name: &str) -> bool {
        match self {
            Family::Alb => name == "alb",
            other => name.starts_with(other.tag()),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Family::Alb => "alb",
            Family::Radex => "radex",
            Family::Fcorr => "fcorr",
            Family::Emis => "emis",
            Family::SoilHeat => "f",
        }
    }

    /// Variables that must be present in the merged frame.
    pub fn required_variables(self) -> &'static [Variable] {
        match self {
            Family::Alb => &[Variable::SwIn, Variable::SwOut],
            Family::Radex => &[Variable::SwExt, Variable::SwIn],
            Family::Fcorr | Family::Emis => &[
                Variable::Ta,
                Variable::Rh,
                Variable::LwIn,
                Variable::LwOut,
                Variable::SwIn,
                Variable::SwExt,
            ],
            Family::SoilHeat => &[Variable::Rn, Variable::G],
        }
    }

    /// Whether the family needs radiation-extinction coefficients as input.
    pub fn needs_radex(self) -> bool {
        matches!(self, Family::Fcorr | Family::Emis)
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which emissivity model(s) drive the `fcorr` regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissivityMethod {
    Brunt,
    Idso,
    Both,
}

impl EmissivityMethod {
    /// Parse a selector from configuration text.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brunt" => Ok(EmissivityMethod::Brunt),
            "idso" => Ok(EmissivityMethod::Idso),
            "both" => Ok(EmissivityMethod::Both),
            other => Err(AppError::config(format!(
                "Unknown emissivity method '{other}': expected one of {{brunt, idso, both}}"
            ))),
        }
    }

    /// Method named by a `fcorr_<method>` parameter, if any.
    pub fn implied_by(parameter: &str) -> Option<Self> {
        let name = parameter.trim().to_ascii_lowercase();
        EmissivityMethod::parse(name.strip_prefix("fcorr_")?).ok()
    }

    pub fn models(self) -> &'static [EmissivityModel] {
        match self {
            EmissivityMethod::Brunt => &[EmissivityModel::Brunt],
            EmissivityMethod::Idso => &[EmissivityModel::Idso],
            EmissivityMethod::Both => &[EmissivityModel::Brunt, EmissivityModel::Idso],
        }
    }
}

/// A single concrete emissivity model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissivityModel {
    Brunt,
    Idso,
}

impl EmissivityModel {
    pub fn display_name(self) -> &'static str {
        match self {
            EmissivityModel::Brunt => "Brunt",
            EmissivityModel::Idso => "Idso",
        }
    }
}

/// Intercept/slope of the Brunt net-emissivity model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BruntCoefficients {
    pub a: f64,
    pub b: f64,
}

impl Default for BruntCoefficients {
    /// Literature values (FAO-56).
    fn default() -> Self {
        Self { a: 0.34, b: -0.14 }
    }
}

/// Radiation-extinction coefficients: clear-sky shortwave = `(a + b) * extraterrestrial`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadexCoefficients {
    pub a: f64,
    pub b: f64,
}

impl RadexCoefficients {
    pub fn clear_sky_fraction(self) -> f64 {
        self.a + self.b
    }
}

/// Where and whether diagnostic plots are written.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Optional date window for time-axis plots.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PlotConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("plots"),
            from: None,
            to: None,
        }
    }
}

/// A full estimation run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` defaults).
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    /// Requested parameter name (resolved via `Family::resolve`).
    pub parameter: String,
    pub sources_path: PathBuf,
    pub method: EmissivityMethod,
    /// Lower quantile used for `radex_a`.
    pub quantile: f64,
    /// Known radiation-extinction coefficients (estimated on the fly when absent).
    pub radex: Option<RadexCoefficients>,
    pub brunt: BruntCoefficients,
    pub plots: PlotConfig,
    /// Print an ASCII preview of the fitted relationship.
    pub preview: bool,
    pub preview_width: usize,
    pub preview_height: usize,
    pub export: Option<PathBuf>,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            parameter: "alb".to_string(),
            sources_path: PathBuf::from("sources.json"),
            method: EmissivityMethod::Both,
            quantile: 0.05,
            radex: None,
            brunt: BruntCoefficients::default(),
            plots: PlotConfig::disabled(),
            preview: false,
            preview_width: 80,
            preview_height: 20,
            export: None,
        }
    }
}

/// Which simulated quantity is compared against observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompareVariable {
    /// Evapotranspiration.
    Et,
    /// Global (downward shortwave) radiation.
    GlobalRadiation,
    /// Net radiation.
    NetRadiation,
    /// Soil heat flux.
    SoilHeat,
}

impl CompareVariable {
    /// Observed channel the simulation is compared against.
    pub fn observed(self) -> Variable {
        match self {
            CompareVariable::Et => Variable::Et,
            CompareVariable::GlobalRadiation => Variable::SwIn,
            CompareVariable::NetRadiation => Variable::Rn,
            CompareVariable::SoilHeat => Variable::G,
        }
    }

    /// Observed channels smoothed and drawn alongside the comparison.
    pub fn auxiliary(self) -> &'static [Variable] {
        match self {
            CompareVariable::Et => &[Variable::Ta, Variable::Rh, Variable::Rn],
            CompareVariable::GlobalRadiation | CompareVariable::NetRadiation => &[Variable::Ta],
            CompareVariable::SoilHeat => &[Variable::Rn],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            CompareVariable::Et => "et",
            CompareVariable::GlobalRadiation => "global_radiation",
            CompareVariable::NetRadiation => "net_radiation",
            CompareVariable::SoilHeat => "soil_heat",
        }
    }
}

/// How to run the external simulation engine and where its output lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSpec {
    /// Engine name, used in plot/export file names.
    pub name: String,
    /// Project-specific run directory (the child's working directory).
    pub run_dir: PathBuf,
    /// Runner executable.
    pub program: String,
    /// Fixed arguments, typically naming the configuration file.
    #[serde(default)]
    pub args: Vec<String>,
    /// Output file, relative to `run_dir`.
    pub output: PathBuf,
    #[serde(default = "default_time_column")]
    pub time_column: String,
    /// Value column header (default: second column).
    #[serde(default)]
    pub value_column: Option<String>,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_time_column() -> String {
    "end_of_interval".to_string()
}

/// A full compare run's configuration as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub sources_path: PathBuf,
    pub engine_path: PathBuf,
    pub variable: CompareVariable,
    /// Trailing moving-average width (samples).
    pub window: usize,
    /// Substitute for missing samples before averaging.
    pub fill: f64,
    /// Reuse an existing engine output instead of running the engine.
    pub skip_run: bool,
    pub plots: PlotConfig,
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_and_prefixed_names() {
        assert_eq!(Family::resolve("alb").unwrap(), Family::Alb);
        assert_eq!(Family::resolve("radex_a").unwrap(), Family::Radex);
        assert_eq!(Family::resolve("fcorr").unwrap(), Family::Fcorr);
        assert_eq!(Family::resolve("fcorr_brunt").unwrap(), Family::Fcorr);
        assert_eq!(Family::resolve("emis_b").unwrap(), Family::Emis);
        assert_eq!(Family::resolve("f").unwrap(), Family::SoilHeat);
        assert_eq!(Family::resolve("f_night").unwrap(), Family::SoilHeat);
    }

    #[test]
    fn fcorr_wins_over_soil_heat_prefix() {
        // Both "fcorr" and "f" are prefixes of this name.
        assert_eq!(Family::resolve("fcorr_idso").unwrap(), Family::Fcorr);
    }

    #[test]
    fn unknown_family_is_a_config_error_listing_choices() {
        let err = Family::resolve("xyz").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
        assert!(err.message().contains("{radex*, fcorr*, f*, emis*, alb}"));
    }

    #[test]
    fn alb_requires_exact_match() {
        assert!(Family::resolve("albedo").is_err());
    }

    #[test]
    fn fcorr_suffix_implies_method() {
        assert_eq!(EmissivityMethod::implied_by("fcorr_idso"), Some(EmissivityMethod::Idso));
        assert_eq!(EmissivityMethod::implied_by("FCORR_Brunt"), Some(EmissivityMethod::Brunt));
        assert_eq!(EmissivityMethod::implied_by("fcorr"), None);
        assert_eq!(EmissivityMethod::implied_by("fcorr_a"), None);
        assert_eq!(EmissivityMethod::implied_by("emis_idso"), None);
    }

    #[test]
    fn emissivity_method_parse() {
        assert_eq!(EmissivityMethod::parse("Brunt").unwrap(), EmissivityMethod::Brunt);
        assert_eq!(EmissivityMethod::Both.models().len(), 2);
        let err = EmissivityMethod::parse("swinbank").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn source_format_defaults_by_extension() {
        let spec = SourceSpec::new("a/b/lw_in.json", Sampling::SubHourly);
        assert_eq!(spec.resolved_format(), SourceFormat::Json);
        let spec = SourceSpec::new("a/b/lw_in.dat", Sampling::Hourly);
        assert_eq!(spec.resolved_format(), SourceFormat::Delimited);
    }

    #[test]
    fn source_set_parses_from_json() {
        let json = r#"{
            "site": "hs",
            "latitude": 47.3,
            "longitude": 8.5,
            "sources": {
                "sw_in": {"path": "sw_in.dat"},
                "lw_in": {"path": "lw_in.json", "sampling": "sub_hourly", "delimiter": ";"}
            }
        }"#;
        let set: SourceSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.sources.len(), 2);
        assert_eq!(set.source(Variable::SwIn).unwrap().sampling, Sampling::Hourly);
        let lw = set.source(Variable::LwIn).unwrap();
        assert_eq!(lw.sampling, Sampling::SubHourly);
        assert_eq!(lw.delimiter, ';');
        assert!(set.source(Variable::G).is_err());
        assert_eq!(set.location().unwrap().utc_offset_hours, 0.0);
    }
}
