//! Flow-curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - seed and fit the Swift / Voce laws on the plastic branch (`fitter`)
//! - combine both into a weighted Swift-Voce blend (`blend`)
//! - re-sample the fitted law for export and plotting

pub mod blend;
pub mod fitter;

pub use blend::*;
pub use fitter::*;
