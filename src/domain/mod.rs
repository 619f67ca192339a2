//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - curves and characteristic values (`Curve`, `MaterialCharacteristics`)
//! - the closed set of flow-curve models (`ModelKind`, `FitModel`)
//! - fit outputs and run configuration (`ExtrapolatedCurve`, `FitConfig`)

pub mod types;

pub use types::*;
