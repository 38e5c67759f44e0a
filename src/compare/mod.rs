//! Run-and-compare post-processing.
//!
//! Runs an external simulation engine with a fixed configuration, reads its
//! output and scores it against the matching observed channel.

pub mod comparison;
pub mod engine;

pub use comparison::{Comparison, ComparisonRow, compare_series, comparison_figure, cumulative_figure};
pub use engine::{output_path, read_engine_output, run_engine};
