//! Reporting: terminal summaries for estimates and comparisons.

pub mod format;

pub use format::{format_comparison, format_estimate};
