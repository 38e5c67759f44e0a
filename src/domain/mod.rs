//! Domain types used throughout the pipelines.
//!
//! This module defines:
//!
//! - input configuration (`Variable`, `SourceSpec`, `SourceSet`, `EngineSpec`)
//! - parameter families and emissivity selectors (`Family`, `EmissivityMethod`)
//! - estimation outputs (`ParameterEstimate`, `FcorrRow`)

pub mod estimate;
pub mod types;

pub use estimate::*;
pub use types::*;
