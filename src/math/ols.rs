//! Least squares solver.
//!
//! The estimators only ever need one-predictor regressions with an intercept:
//!
//! ```text
//! minimize Σ (y_i - (β0 + β1 x_i))^2
//! ```
//!
//! Implementation choices:
//! - We build the `n × 2` design matrix and solve it with nalgebra's SVD,
//!   which handles tall systems and reports rank deficiency instead of
//!   producing garbage.
//! - A constant predictor (all `x_i` equal) is rejected up front with a clear
//!   message rather than relying on the SVD tolerance.

use nalgebra::{DMatrix, DVector};

use crate::error::AppError;

/// Intercept and slope of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// The line through `(0, intercept)` and `(1, 1)`.
    ///
    /// This is the degenerate two-point regression that forces
    /// `intercept + slope = 1` while keeping the fitted intercept.
    pub fn through_unit_point(&self) -> LinearFit {
        LinearFit {
            intercept: self.intercept,
            slope: 1.0 - self.intercept,
            n: 2,
        }
    }
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Ordinary least squares of `y` on `x` with an intercept.
///
/// Pairs where either value is non-finite are skipped.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, AppError> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();

    let n = pairs.len();
    if n < 2 {
        return Err(AppError::data(format!(
            "Linear regression needs at least 2 finite points, got {n}."
        )));
    }

    let x0 = pairs[0].0;
    if pairs.iter().all(|&(a, _)| (a - x0).abs() < 1e-12) {
        return Err(AppError::data("Linear regression predictor is constant."));
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { pairs[i].0 });
    let target = DVector::from_iterator(n, pairs.iter().map(|&(_, b)| b));

    let beta = solve_least_squares(&design, &target)
        .ok_or_else(|| AppError::data("Linear regression is too ill-conditioned to solve."))?;

    Ok(LinearFit {
        intercept: beta[0],
        slope: beta[1],
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn linear_fit_recovers_line_and_skips_nan() {
        let x = [0.0, 0.5, 1.0, f64::NAN, 2.0];
        let y = [-0.35, 0.325, 1.0, 7.0, 2.35];
        let fit = linear_fit(&x, &y).unwrap();
        assert_relative_eq!(fit.intercept, -0.35, epsilon = 1e-10);
        assert_relative_eq!(fit.slope, 1.35, epsilon = 1e-10);
        assert_eq!(fit.n, 4);
    }

    #[test]
    fn linear_fit_rejects_degenerate_input() {
        assert!(linear_fit(&[1.0], &[2.0]).is_err());
        assert!(linear_fit(&[1.0, 1.0, 1.0], &[2.0, 3.0, 4.0]).is_err());
    }

    #[test]
    fn unit_point_line_sums_to_one() {
        let fit = LinearFit { intercept: 0.27, slope: 0.4, n: 10 };
        let forced = fit.through_unit_point();
        assert_relative_eq!(forced.intercept + forced.slope, 1.0);
        assert_relative_eq!(forced.predict(1.0), 1.0);
        assert_relative_eq!(forced.predict(0.0), 0.27);
    }
}
