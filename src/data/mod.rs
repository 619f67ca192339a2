//! Synthetic input data.

pub mod sample;

pub use sample::{SpecimenSpec, generate_specimen, write_specimen_csv};
