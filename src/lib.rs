//! `flow-curves` library crate.
//!
//! The binary (`cf`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the characterization/fit cycle is reusable from other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod material;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
