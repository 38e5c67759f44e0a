//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the estimation code stays free of presentation concerns
//! - output changes are localized (and covered by the tests below)

use chrono::NaiveDate;

use crate::compare::Comparison;
use crate::domain::{EngineSpec, ParameterEstimate};

/// Format an estimate: header, parameter table and family diagnostics.
pub fn format_estimate(site: &str, period: Option<(NaiveDate, NaiveDate)>, estimate: &ParameterEstimate) -> String {
    let mut out = String::new();

    out.push_str("=== etcal - parameter estimate ===\n");
    out.push_str(&format!("Site: {site}\n"));
    out.push_str(&format!("Period: {}\n", fmt_period(period)));
    out.push_str(&format!("Family: {}\n", estimate.family()));

    out.push_str("\nParameters:\n");
    out.push_str(&format!("{:<16} {:>12}\n", "name", "value"));
    out.push_str(&format!("{:-<16} {:-<12}\n", "", ""));
    for (name, value) in estimate.named_values() {
        out.push_str(&format!("{name:<16} {:>12}\n", fmt_num(value)));
    }

    match estimate {
        ParameterEstimate::Alb { n, .. } => {
            out.push_str(&format!("\nSamples: {n}\n"));
        }
        ParameterEstimate::Radex { r_max, quantile, n, .. } => {
            out.push_str(&format!(
                "\nSamples: {n} | r_max={} | quantile={quantile}\n",
                fmt_num(*r_max)
            ));
        }
        ParameterEstimate::Fcorr { rows } => {
            out.push_str("\nRegression (raw OLS, forced through (1,1)):\n");
            out.push_str(&format!(
                "{:<8} {:>10} {:>10} {:>10} {:>10} {:>6}\n",
                "method", "intercept", "slope", "a", "b", "n"
            ));
            for row in rows {
                out.push_str(&format!(
                    "{:<8} {:>10} {:>10} {:>10} {:>10} {:>6}\n",
                    row.method.display_name(),
                    fmt_num(row.raw_intercept),
                    fmt_num(row.raw_slope),
                    fmt_num(row.a),
                    fmt_num(row.b),
                    row.n
                ));
            }
        }
        ParameterEstimate::Emis { diagnostics, .. } => {
            out.push_str(&format!(
                "\nClear-sky diagnostics: n={} | observed={} | Brunt={} | Idso={}\n",
                diagnostics.n,
                fmt_num(diagnostics.mean_observed),
                fmt_num(diagnostics.mean_brunt),
                fmt_num(diagnostics.mean_idso)
            ));
        }
        ParameterEstimate::SoilHeat { n_day, n_night, .. } => {
            out.push_str(&format!("\nSamples: day={n_day} | night={n_night}\n"));
        }
    }

    out
}

/// Format the goodness-of-fit summary of a comparison.
pub fn format_comparison(site: &str, engine: &EngineSpec, comparison: &Comparison) -> String {
    let m = &comparison.metrics;
    let mut out = String::new();

    out.push_str("=== etcal - simulation vs observation ===\n");
    out.push_str(&format!("Site: {site} | Engine: {}\n", engine.name));
    out.push_str(&format!(
        "Series: {} vs {}\n",
        comparison.simulated_name, comparison.observed_name
    ));
    out.push_str(&format!("Period: {}\n", fmt_period(comparison.date_range())));

    if let Some(last) = comparison.rows.last() {
        out.push_str(&format!(
            "Totals: simulated={} | observed={}\n",
            fmt_num(last.simulated_cum),
            fmt_num(last.observed_cum)
        ));
    }

    out.push_str(&format!(
        "\nn={} | bias={} | RMSE={} | NSE={} | KGE={} | PBIAS={}%\n",
        m.n,
        fmt_num(m.bias),
        fmt_num(m.rmse),
        fmt_num(m.nse),
        fmt_num(m.kge),
        fmt_pct(m.pbias)
    ));

    out
}

fn fmt_period(period: Option<(NaiveDate, NaiveDate)>) -> String {
    match period {
        Some((start, end)) => format!("{start} .. {end}"),
        None => "-".to_string(),
    }
}

fn fmt_num(v: f64) -> String {
    if v.is_nan() { "NaN".to_string() } else { format!("{v:.4}") }
}

fn fmt_pct(v: f64) -> String {
    if v.is_finite() { format!("{v:.2}") } else { fmt_num(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_series;
    use crate::data::TimeSeries;
    use crate::domain::{EmissivityDiagnostics, EmissivityModel, FcorrRow};
    use std::path::PathBuf;

    #[test]
    fn alb_summary() {
        let d0 = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let d1 = NaiveDate::from_ymd_opt(2021, 6, 30).unwrap();
        let text = format_estimate("hs", Some((d0, d1)), &ParameterEstimate::Alb { albedo: 0.1, n: 7 });
        let expected = "\
=== etcal - parameter estimate ===
Site: hs
Period: 2021-06-01 .. 2021-06-30
Family: alb

Parameters:
name                    value
---------------- ------------
alb                    0.1000

Samples: 7
";
        assert_eq!(text, expected);
    }

    #[test]
    fn fcorr_table_lists_each_method() {
        let row = |method, a: f64| FcorrRow {
            method,
            a,
            b: 1.0 - a,
            raw_intercept: a,
            raw_slope: 0.9,
            n: 12,
        };
        let est = ParameterEstimate::Fcorr {
            rows: vec![row(EmissivityModel::Brunt, 0.2), row(EmissivityModel::Idso, 0.3)],
        };
        let text = format_estimate("hs", None, &est);
        assert!(text.contains("fcorr_b_brunt          0.8000"));
        assert!(text.contains("Idso         0.3000"));
        assert!(text.contains("Period: -"));
    }

    #[test]
    fn empty_emis_diagnostics_print_nan() {
        let est = ParameterEstimate::Emis {
            a: 0.34,
            b: -0.14,
            diagnostics: EmissivityDiagnostics {
                n: 0,
                mean_observed: f64::NAN,
                mean_brunt: f64::NAN,
                mean_idso: f64::NAN,
            },
        };
        let text = format_estimate("hs", None, &est);
        assert!(text.contains("emis_b                -0.1400"));
        assert!(text.contains("n=0 | observed=NaN"));
    }

    #[test]
    fn comparison_summary() {
        let t = |h| NaiveDate::from_ymd_opt(2021, 6, 1).unwrap().and_hms_opt(h, 0, 0).unwrap();
        let sim = TimeSeries::new("toy", vec![(t(1), 2.0), (t(2), 3.0)]).unwrap();
        let obs = TimeSeries::new("et", vec![(t(1), 1.0), (t(2), 2.0)]).unwrap();
        let cmp = compare_series(&sim, &obs).unwrap();
        let engine = EngineSpec {
            name: "toy".to_string(),
            run_dir: PathBuf::from("."),
            program: "true".to_string(),
            args: Vec::new(),
            output: PathBuf::from("out.csv"),
            time_column: "end_of_interval".to_string(),
            value_column: None,
            delimiter: ',',
        };
        let text = format_comparison("hs", &engine, &cmp);
        assert!(text.contains("Site: hs | Engine: toy"));
        assert!(text.contains("Totals: simulated=5.0000 | observed=3.0000"));
        assert!(text.contains("n=2 | bias=1.0000 | RMSE=1.0000"));
        assert!(text.contains("PBIAS=66.67%"));
    }
}
