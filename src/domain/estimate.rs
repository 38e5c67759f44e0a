//! Estimation outputs.
//!
//! A `ParameterEstimate` is the terminal product of one `etcal estimate` run:
//! the caller transcribes it into the model configuration. It serializes to
//! JSON for `--export`.

use serde::{Deserialize, Serialize};

use crate::domain::{EmissivityModel, Family};

/// One row of the `fcorr` method table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FcorrRow {
    pub method: EmissivityModel,
    /// Intercept of the constrained line (value at clear-sky ratio 0).
    pub a: f64,
    /// Slope of the constrained line; `a + b = 1`.
    pub b: f64,
    /// Unconstrained OLS intercept.
    pub raw_intercept: f64,
    /// Unconstrained OLS slope.
    pub raw_slope: f64,
    pub n: usize,
}

/// Observed vs modeled emissivity over clear-sky samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissivityDiagnostics {
    pub n: usize,
    pub mean_observed: f64,
    pub mean_brunt: f64,
    pub mean_idso: f64,
}

/// Result of one parameter estimation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ParameterEstimate {
    Alb {
        albedo: f64,
        n: usize,
    },
    Radex {
        a: f64,
        b: f64,
        r_max: f64,
        quantile: f64,
        n: usize,
    },
    Fcorr {
        rows: Vec<FcorrRow>,
    },
    Emis {
        a: f64,
        b: f64,
        diagnostics: EmissivityDiagnostics,
    },
    #[serde(rename = "f")]
    SoilHeat {
        f_day: f64,
        f_night: f64,
        n_day: usize,
        n_night: usize,
    },
}

impl ParameterEstimate {
    pub fn family(&self) -> Family {
        match self {
            ParameterEstimate::Alb { .. } => Family::Alb,
            ParameterEstimate::Radex { .. } => Family::Radex,
            ParameterEstimate::Fcorr { .. } => Family::Fcorr,
            ParameterEstimate::Emis { .. } => Family::Emis,
            ParameterEstimate::SoilHeat { .. } => Family::SoilHeat,
        }
    }

    /// `(name, value)` pairs in the order they are usually written to a model config.
    pub fn named_values(&self) -> Vec<(String, f64)> {
        match self {
            ParameterEstimate::Alb { albedo, .. } => vec![("alb".to_string(), *albedo)],
            ParameterEstimate::Radex { a, b, .. } => {
                vec![("radex_a".to_string(), *a), ("radex_b".to_string(), *b)]
            }
            ParameterEstimate::Fcorr { rows } => rows
                .iter()
                .flat_map(|row| {
                    let suffix = row.method.display_name().to_ascii_lowercase();
                    [
                        (format!("fcorr_a_{suffix}"), row.a),
                        (format!("fcorr_b_{suffix}"), row.b),
                    ]
                })
                .collect(),
            ParameterEstimate::Emis { a, b, .. } => {
                vec![("emis_a".to_string(), *a), ("emis_b".to_string(), *b)]
            }
            ParameterEstimate::SoilHeat { f_day, f_night, .. } => {
                vec![("f_day".to_string(), *f_day), ("f_night".to_string(), *f_night)]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_family_tag() {
        let est = ParameterEstimate::SoilHeat {
            f_day: 0.1,
            f_night: 0.5,
            n_day: 10,
            n_night: 12,
        };
        let json = serde_json::to_string(&est).unwrap();
        assert!(json.contains("\"family\":\"f\""));
        let back: ParameterEstimate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.family(), Family::SoilHeat);
    }

    #[test]
    fn fcorr_named_values_are_suffixed_by_method() {
        let est = ParameterEstimate::Fcorr {
            rows: vec![FcorrRow {
                method: EmissivityModel::Idso,
                a: -0.3,
                b: 1.3,
                raw_intercept: -0.3,
                raw_slope: 1.25,
                n: 40,
            }],
        };
        let names: Vec<String> = est.named_values().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["fcorr_a_idso", "fcorr_b_idso"]);
    }
}
