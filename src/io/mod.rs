//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - material card export (`export`, `template`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;
pub mod template;

pub use curve::*;
pub use export::*;
pub use ingest::*;
