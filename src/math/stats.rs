//! Summary statistics over finite samples.
//!
//! Every function ignores non-finite values and returns `None` when nothing
//! is left, so callers decide whether an empty sample is an error.

pub fn finite(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite()).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, n) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

pub fn max(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
}

/// Sample quantile with linear interpolation between order statistics.
///
/// Uses `h = (n - 1) * p` on the sorted sample (Hyndman & Fan type 7).
pub fn quantile(values: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    let mut sorted = finite(values);
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let frac = h - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_ignores_nan() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]).unwrap(), 2.0);
        assert!(mean(&[f64::NAN]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn max_of_finite_values() {
        assert_eq!(max(&[0.2, f64::INFINITY, 0.7, 0.1]), Some(0.7));
        assert_eq!(max(&[]), None);
    }

    #[test]
    fn quantile_interpolates() {
        let v = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_relative_eq!(quantile(&v, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&v, 0.5).unwrap(), 3.0);
        assert_relative_eq!(quantile(&v, 1.0).unwrap(), 5.0);
        // h = 4 * 0.05 = 0.2 -> 1 + 0.2 * (2 - 1)
        assert_relative_eq!(quantile(&v, 0.05).unwrap(), 1.2);
        assert!(quantile(&v, 1.5).is_none());
        assert!(quantile(&[], 0.5).is_none());
    }
}
