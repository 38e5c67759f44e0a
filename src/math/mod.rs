//! Mathematical utilities: summary statistics, least squares, goodness-of-fit.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
