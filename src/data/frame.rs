//! Merged observation sets.
//!
//! An `ObservationFrame` holds several variables on one shared, strictly
//! increasing timestamp index. It is built by an inner join: a timestamp
//! survives only if every input series has a sample at it.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::data::series::TimeSeries;
use crate::domain::Variable;
use crate::error::AppError;

/// Row-inclusion flags aligned to a frame index.
pub type Mask = Vec<bool>;

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationFrame {
    index: Vec<NaiveDateTime>,
    columns: BTreeMap<Variable, Vec<f64>>,
}

impl ObservationFrame {
    /// Inner-join the given series on timestamp.
    pub fn inner_join(series: Vec<(Variable, TimeSeries)>) -> Result<Self, AppError> {
        let mut seen = Vec::with_capacity(series.len());
        for (var, _) in &series {
            if seen.contains(var) {
                return Err(AppError::config(format!("Variable `{var}` given twice.")));
            }
            seen.push(*var);
        }

        let refs: Vec<&TimeSeries> = series.iter().map(|(_, s)| s).collect();
        let index = common_index(&refs);

        let columns = series
            .iter()
            .map(|(var, s)| (*var, values_at(s, &index)))
            .collect();

        Ok(Self { index, columns })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn column(&self, var: Variable) -> Result<&[f64], AppError> {
        self.columns
            .get(&var)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::config(format!("Merged observations have no `{var}` column.")))
    }

    /// Hour of day (0-23) of every row.
    pub fn hours(&self) -> Vec<u32> {
        self.index.iter().map(|t| t.hour()).collect()
    }

    /// Mask of rows whose hour of day satisfies `pred`.
    pub fn hour_mask(&self, pred: impl Fn(u32) -> bool) -> Mask {
        self.index.iter().map(|t| pred(t.hour())).collect()
    }

    /// Mask of rows where `pred` holds for a finite value of `var`.
    pub fn value_mask(&self, var: Variable, pred: impl Fn(f64) -> bool) -> Result<Mask, AppError> {
        Ok(self
            .column(var)?
            .iter()
            .map(|&v| v.is_finite() && pred(v))
            .collect())
    }

    /// First and last date covered by the index.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.index.first()?.date(), self.index.last()?.date()))
    }
}

/// Elementwise AND of two masks (shorter mask pads with `false`).
pub fn and_masks(a: &[bool], b: &[bool]) -> Mask {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| a.get(i).copied().unwrap_or(false) && b.get(i).copied().unwrap_or(false))
        .collect()
}

pub fn count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}

/// Timestamps present in every series, in increasing order.
pub fn common_index(series: &[&TimeSeries]) -> Vec<NaiveDateTime> {
    let Some((first, rest)) = series.split_first() else {
        return Vec::new();
    };

    let mut index: Vec<NaiveDateTime> = first.timestamps().collect();
    for s in rest {
        let mut cursor = s.timestamps().peekable();
        index.retain(|t| {
            while cursor.next_if(|c| c < t).is_some() {}
            cursor.peek() == Some(t)
        });
    }
    index
}

/// Values of `series` at each timestamp of `index` (which must be a subset of its timestamps).
pub fn values_at(series: &TimeSeries, index: &[NaiveDateTime]) -> Vec<f64> {
    let mut out = Vec::with_capacity(index.len());
    let mut points = series.points().iter().peekable();
    for t in index {
        while points.next_if(|(c, _)| c < t).is_some() {}
        match points.peek() {
            Some((c, v)) if c == t => out.push(*v),
            _ => out.push(f64::NAN),
        }
    }
    out
}

/// Inner-join two series into aligned value pairs.
pub fn align_pair(a: &TimeSeries, b: &TimeSeries) -> (Vec<NaiveDateTime>, Vec<f64>, Vec<f64>) {
    let index = common_index(&[a, b]);
    let va = values_at(a, &index);
    let vb = values_at(b, &index);
    (index, va, vb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 6, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn series(name: &str, pts: &[(NaiveDateTime, f64)]) -> TimeSeries {
        TimeSeries::new(name, pts.to_vec()).unwrap()
    }

    #[test]
    fn inner_join_keeps_common_timestamps_only() {
        let a = series("a", &[(hour(1, 8), 1.0), (hour(1, 9), 2.0), (hour(1, 10), 3.0)]);
        let b = series("b", &[(hour(1, 9), 20.0), (hour(1, 10), 30.0), (hour(1, 11), 40.0)]);
        let frame = ObservationFrame::inner_join(vec![(Variable::SwIn, a), (Variable::SwOut, b)]).unwrap();

        assert_eq!(frame.index(), &[hour(1, 9), hour(1, 10)]);
        assert_eq!(frame.column(Variable::SwIn).unwrap(), &[2.0, 3.0]);
        assert_eq!(frame.column(Variable::SwOut).unwrap(), &[20.0, 30.0]);
    }

    #[test]
    fn inner_join_of_disjoint_series_is_empty() {
        let a = series("a", &[(hour(1, 8), 1.0), (hour(1, 10), 2.0)]);
        let b = series("b", &[(hour(1, 9), 1.0), (hour(1, 11), 2.0)]);
        let frame = ObservationFrame::inner_join(vec![(Variable::Rn, a), (Variable::G, b)]).unwrap();
        assert!(frame.is_empty());
        assert!(frame.column(Variable::G).unwrap().is_empty());
    }

    #[test]
    fn inner_join_rejects_duplicate_variables() {
        let a = series("a", &[(hour(1, 8), 1.0)]);
        let err = ObservationFrame::inner_join(vec![(Variable::Rn, a.clone()), (Variable::Rn, a)]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn masks_combine() {
        let a = series("a", &[(hour(1, 7), 0.0), (hour(1, 12), 5.0), (hour(1, 16), f64::NAN)]);
        let frame = ObservationFrame::inner_join(vec![(Variable::SwIn, a)]).unwrap();

        let by_hour = frame.hour_mask(|h| h > 7 && h < 17);
        assert_eq!(by_hour, vec![false, true, true]);

        let nonzero = frame.value_mask(Variable::SwIn, |v| v != 0.0).unwrap();
        assert_eq!(nonzero, vec![false, true, false]);

        let mask = and_masks(&by_hour, &nonzero);
        assert_eq!(mask, vec![false, true, false]);
        assert_eq!(count(&mask), 1);
    }

    #[test]
    fn align_pair_matches_values() {
        let a = series("sim", &[(hour(1, 1), 1.0), (hour(1, 2), 2.0), (hour(2, 1), 3.0)]);
        let b = series("obs", &[(hour(1, 2), 5.0), (hour(2, 1), 6.0)]);
        let (index, va, vb) = align_pair(&a, &b);
        assert_eq!(index.len(), 2);
        assert_eq!(va, vec![2.0, 3.0]);
        assert_eq!(vb, vec![5.0, 6.0]);
    }
}
