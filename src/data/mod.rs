//! Time-series primitives: single series and merged observation frames.

pub mod frame;
pub mod series;

pub use frame::{Mask, ObservationFrame, align_pair, and_masks, count};
pub use series::TimeSeries;
