//! Physical formulas used by the estimators.
//!
//! All functions are pure and evaluated elementwise over aligned series.

pub mod emissivity;
pub mod solar;
pub mod vapor;

pub use emissivity::*;
pub use solar::*;
pub use vapor::*;
