//! Reporting utilities: run summaries and curve tables.

pub mod format;

pub use format::{format_curve_table, format_run_summary};
