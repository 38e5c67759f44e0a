//! Time-series file ingest.
//!
//! This module turns observation files into `TimeSeries` values:
//!
//! - **Delimited text**: two columns, timestamp then value, optional header.
//! - **JSON series**: `{"name": "...", "points": [["2021-06-01T10:00:00", 1.5], ...]}`
//!   with `null` for missing samples.
//!
//! Sub-hourly sources are collapsed to hourly means here, so everything
//! downstream works on hourly data.
//!
//! Design goals:
//! - **Strict rows**: a malformed line fails the whole load with its line number
//! - **Explicit missing values**: `NA`, `NaN`, `-` and empty fields become `NaN`
//! - **No fitting logic here**

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::Deserialize;

use crate::data::TimeSeries;
use crate::domain::{Sampling, SourceFormat, SourceSpec};
use crate::error::AppError;

/// Column layout of a delimited file.
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    pub delimiter: char,
    /// Header name of the timestamp column (implies a header row).
    pub time_column: Option<String>,
    /// Header name of the value column (implies a header row).
    pub value_column: Option<String>,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            time_column: None,
            value_column: None,
        }
    }
}

impl From<&SourceSpec> for DelimitedOptions {
    fn from(spec: &SourceSpec) -> Self {
        Self {
            delimiter: spec.delimiter,
            time_column: spec.time_column.clone(),
            value_column: spec.value_column.clone(),
        }
    }
}

/// Load one source as an hourly series named `name`.
pub fn read_series(name: &str, spec: &SourceSpec) -> Result<TimeSeries, AppError> {
    let raw = match spec.resolved_format() {
        SourceFormat::Delimited => read_delimited(name, &spec.path, &DelimitedOptions::from(spec))?,
        SourceFormat::Json => read_json_series(&spec.path)?.with_name(name),
    };

    match spec.sampling {
        Sampling::Hourly => {
            log::debug!("{name}: {} hourly samples from '{}'", raw.len(), spec.path.display());
            Ok(raw)
        }
        Sampling::SubHourly => {
            let hourly = raw.hourly_mean();
            log::info!(
                "{name}: collapsed {} sub-hourly samples to {} hourly means",
                raw.len(),
                hourly.len()
            );
            Ok(hourly)
        }
    }
}

/// Read a delimited `(timestamp, value)` file.
pub fn read_delimited(name: &str, path: &Path, opts: &DelimitedOptions) -> Result<TimeSeries, AppError> {
    if !opts.delimiter.is_ascii() {
        return Err(AppError::config(format!(
            "Delimiter {:?} for '{}' must be a single ASCII character.",
            opts.delimiter,
            path.display()
        )));
    }

    let file = File::open(path)
        .map_err(|e| AppError::data(format!("Failed to open '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(opts.delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut records = reader.records().enumerate().peekable();

    // Decide whether the first row is a header and which columns to read.
    let needs_header = opts.time_column.is_some() || opts.value_column.is_some();
    let (time_idx, value_idx, has_header) = match records.peek() {
        Some((_, Ok(first))) => {
            let looks_like_header = first.get(0).is_none_or(|s| parse_timestamp(s).is_err());
            if needs_header || looks_like_header {
                let (t, v) = resolve_columns(first, opts, path)?;
                (t, v, true)
            } else {
                (0, 1, false)
            }
        }
        Some((_, Err(e))) => {
            return Err(AppError::data(format!(
                "Failed to parse '{}' line 1: {e}",
                path.display()
            )));
        }
        None => (0, 1, false),
    };
    if has_header {
        records.next();
    }

    let mut points = Vec::new();
    for (idx, result) in records {
        let line = idx + 1;
        let record = result
            .map_err(|e| AppError::data(format!("Failed to parse '{}' line {line}: {e}", path.display())))?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let raw_time = record.get(time_idx).ok_or_else(|| missing_field(path, line, time_idx))?;
        let raw_value = record.get(value_idx).ok_or_else(|| missing_field(path, line, value_idx))?;

        let t = parse_timestamp(raw_time)
            .map_err(|e| AppError::data(format!("'{}' line {line}: {e}", path.display())))?;
        let v = parse_value(raw_value)
            .map_err(|e| AppError::data(format!("'{}' line {line}: {e}", path.display())))?;
        points.push((t, v));
    }

    TimeSeries::new(name, points)
}

fn resolve_columns(header: &StringRecord, opts: &DelimitedOptions, path: &Path) -> Result<(usize, usize), AppError> {
    let find = |wanted: &str| {
        header
            .iter()
            .position(|h| normalize_header_name(h) == normalize_header_name(wanted))
            .ok_or_else(|| {
                AppError::data(format!(
                    "Column `{wanted}` not found in '{}' (header: {}).",
                    path.display(),
                    header.iter().collect::<Vec<_>>().join(", ")
                ))
            })
    };

    let time_idx = match &opts.time_column {
        Some(name) => find(name)?,
        None => 0,
    };
    let value_idx = match &opts.value_column {
        Some(name) => find(name)?,
        None => (0..header.len()).find(|&i| i != time_idx).unwrap_or(1),
    };
    Ok((time_idx, value_idx))
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM some exporters put on the first header.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn missing_field(path: &Path, line: usize, idx: usize) -> AppError {
    AppError::data(format!(
        "'{}' line {line}: expected at least {} columns.",
        path.display(),
        idx + 1
    ))
}

/// Parse a timestamp in one of the accepted layouts.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    const FMTS: [&str; 7] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
        "%d.%m.%Y %H:%M",
        "%Y/%m/%d %H:%M",
        "%d.%m.%Y %H:%M:%S",
    ];
    let s = s.trim().trim_matches('"');
    for fmt in FMTS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(chrono::NaiveTime::MIN));
    }
    Err(format!(
        "Invalid timestamp '{s}'. Expected e.g. YYYY-MM-DD HH:MM[:SS], YYYY-MM-DDTHH:MM[:SS], DD.MM.YYYY HH:MM."
    ))
}

/// Parse a numeric value; missing-value markers become `NaN`.
pub fn parse_value(s: &str) -> Result<f64, String> {
    let s = s.trim().trim_matches('"');
    if s.is_empty() || s == "-" || s.eq_ignore_ascii_case("na") || s.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .map_err(|_| format!("Invalid numeric value '{s}'."))
}

#[derive(Debug, Deserialize)]
struct SeriesFile {
    #[serde(default)]
    name: Option<String>,
    points: Vec<(NaiveDateTime, Option<f64>)>,
}

/// Read a JSON-serialized series.
pub fn read_json_series(path: &Path) -> Result<TimeSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::data(format!("Failed to open '{}': {e}", path.display())))?;
    let parsed: SeriesFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::data(format!("Invalid series JSON '{}': {e}", path.display())))?;

    let name = parsed.name.unwrap_or_else(|| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("series")
            .to_string()
    });
    let points = parsed
        .points
        .into_iter()
        .map(|(t, v)| (t, v.unwrap_or(f64::NAN)))
        .collect();
    TimeSeries::new(name, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("etcal-ingest-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_headerless_two_column_file() {
        let path = write_temp(
            "sw_in.dat",
            "2021-06-01 10:00:00,450.5\n2021-06-01 11:00:00,NA\n2021-06-01 12:00:00,600\n",
        );
        let series = read_delimited("sw_in", &path, &DelimitedOptions::default()).unwrap();
        assert_eq!(series.len(), 3);
        let values: Vec<f64> = series.values().collect();
        assert_eq!(values[0], 450.5);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 600.0);
    }

    #[test]
    fn detects_header_and_named_columns() {
        let path = write_temp(
            "engine.csv",
            "end_of_interval;et;other\n2021-06-01T10:00;0.1;9\n2021-06-01T11:00;0.2;9\n",
        );
        let opts = DelimitedOptions {
            delimiter: ';',
            time_column: Some("end_of_interval".to_string()),
            value_column: Some("ET".to_string()),
        };
        let series = read_delimited("sim", &path, &opts).unwrap();
        assert_eq!(series.values().collect::<Vec<_>>(), vec![0.1, 0.2]);

        // Header without named columns falls back to the first two columns.
        let plain = DelimitedOptions {
            delimiter: ';',
            ..DelimitedOptions::default()
        };
        let series = read_delimited("sim", &path, &plain).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn malformed_value_reports_line() {
        let path = write_temp("bad.dat", "2021-06-01 10:00,1\n2021-06-01 11:00,abc\n");
        let err = read_delimited("x", &path, &DelimitedOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
        assert!(err.message().contains("line 2"), "{}", err.message());
    }

    #[test]
    fn single_column_row_is_an_error() {
        let path = write_temp("short.dat", "2021-06-01 10:00,1\n2021-06-01 11:00\n");
        assert!(read_delimited("x", &path, &DelimitedOptions::default()).is_err());
    }

    #[test]
    fn missing_file_is_a_data_error() {
        let err = read_delimited("x", Path::new("/nonexistent/etcal.dat"), &DelimitedOptions::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_DATA);
    }

    #[test]
    fn reads_json_series_and_collapses_sub_hourly() {
        let mut points = Vec::new();
        for h in 0..4 {
            for m in [0, 30] {
                points.push(format!("[\"2021-06-01T{h:02}:{m:02}:00\", {}]", h * 10 + m / 30));
            }
        }
        let json = format!("{{\"name\": \"lw\", \"points\": [{}]}}", points.join(","));
        let path = write_temp("lw_in.json", &json);

        let spec = SourceSpec::new(path, Sampling::SubHourly);
        let series = read_series("lw_in", &spec).unwrap();
        assert_eq!(series.name(), "lw_in");
        // Hours 0 and 3 are dropped; hour 1 -> mean(10, 11), hour 2 -> mean(20, 21).
        assert_eq!(series.values().collect::<Vec<_>>(), vec![10.5, 20.5]);
    }

    #[test]
    fn timestamp_formats() {
        assert!(parse_timestamp("2021-06-01 10:00").is_ok());
        assert!(parse_timestamp("01.06.2021 10:00").is_ok());
        assert!(parse_timestamp("2021-06-01").is_ok());
        assert!(parse_timestamp("June 1st").is_err());
    }
}
