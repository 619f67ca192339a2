//! Material characterization of a tensile test.
//!
//! - zero-offset the raw table (`normalize`)
//! - derive E, Rp0.2, Rm, Ag, Af from the engineering curve (`characterize`)
//! - convert to true stress/strain and extract the plastic branch (`true_curve`)

pub mod characterize;
pub mod normalize;
pub mod true_curve;

pub use characterize::*;
pub use normalize::*;
pub use true_curve::*;
