//! Input/output helpers.
//!
//! - delimited/JSON series readers (`ingest`)
//! - source-set files and the observation provider (`sources`)
//! - result exports (JSON/CSV) (`export`)

pub mod export;
pub mod ingest;
pub mod sources;

pub use export::*;
pub use ingest::*;
pub use sources::*;
