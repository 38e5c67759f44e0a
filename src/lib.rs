//! `etcal` library crate.
//!
//! The binary (`etcal`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - estimators and the comparison can be driven from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod compare;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
