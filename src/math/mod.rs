//! Mathematical utilities: linear least squares, Levenberg–Marquardt, grids.

pub mod grid;
pub mod lm;
pub mod ols;

pub use grid::*;
pub use lm::*;
pub use ols::*;
