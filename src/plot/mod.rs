//! Terminal plotting.

pub mod ascii;

pub use ascii::{render_curve_file, render_flow_plot};
