//! Time series of one physical quantity.
//!
//! A `TimeSeries` is an ordered list of `(timestamp, value)` samples with
//! strictly increasing timestamps. Missing samples are `NaN`. Series are
//! immutable; every transformation returns a new series.

use chrono::{NaiveDateTime, TimeDelta, Timelike};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    points: Vec<(NaiveDateTime, f64)>,
}

impl TimeSeries {
    /// Build a series, rejecting non-increasing timestamps.
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDateTime, f64)>) -> Result<Self, AppError> {
        let name = name.into();
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(AppError::data(format!(
                "Series '{name}': timestamps must be strictly increasing ({} is followed by {}).",
                pair[0].0, pair[1].0
            )));
        }
        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(NaiveDateTime, f64)] {
        &self.points
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.points.iter().map(|&(t, _)| t)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, v)| v)
    }

    /// Collapse sub-hourly samples to hourly means.
    ///
    /// Samples are grouped by clock hour; each group is labeled with its ending
    /// timestamp (hour start + 1h) and holds the mean of its finite samples.
    /// The first and last groups are dropped since they may be partial.
    pub fn hourly_mean(&self) -> TimeSeries {
        let mut groups: Vec<(NaiveDateTime, f64, usize)> = Vec::new();
        for &(t, v) in &self.points {
            let start = floor_hour(t);
            match groups.last_mut() {
                Some((s, sum, n)) if *s == start => {
                    if v.is_finite() {
                        *sum += v;
                        *n += 1;
                    }
                }
                _ => {
                    let (sum, n) = if v.is_finite() { (v, 1) } else { (0.0, 0) };
                    groups.push((start, sum, n));
                }
            }
        }

        let empty = groups.iter().filter(|&&(_, _, n)| n == 0).count();
        if empty > 0 {
            log::warn!("{}: {empty} hourly group(s) without a valid sample", self.name);
        }

        let points = if groups.len() < 3 {
            Vec::new()
        } else {
            groups[1..groups.len() - 1]
                .iter()
                .map(|&(start, sum, n)| {
                    let mean = if n == 0 { f64::NAN } else { sum / n as f64 };
                    (start + TimeDelta::hours(1), mean)
                })
                .collect()
        };

        TimeSeries {
            name: self.name.clone(),
            points,
        }
    }

    /// Trailing moving average over `window` samples.
    ///
    /// Missing samples are replaced by `fill` before averaging. The first
    /// `window - 1` outputs are `NaN` (incomplete window).
    pub fn moving_average(&self, window: usize, fill: f64) -> Result<TimeSeries, AppError> {
        if window == 0 {
            return Err(AppError::config("Moving-average window must be > 0."));
        }
        if !fill.is_finite() {
            return Err(AppError::config(format!("Moving-average fill must be a finite number, got {fill}.")));
        }

        let filled: Vec<f64> = self
            .values()
            .map(|v| if v.is_finite() { v } else { fill })
            .collect();

        let mut points = Vec::with_capacity(filled.len());
        let mut running = 0.0;
        for (i, &(t, _)) in self.points.iter().enumerate() {
            running += filled[i];
            if i >= window {
                running -= filled[i - window];
            }
            let value = if i + 1 >= window {
                running / window as f64
            } else {
                f64::NAN
            };
            points.push((t, value));
        }

        Ok(TimeSeries {
            name: format!("{}_ma{window}", self.name),
            points,
        })
    }
}

fn floor_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date().and_hms_opt(t.hour(), 0, 0).unwrap_or(t)
}
