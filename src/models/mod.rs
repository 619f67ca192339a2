//! Flow-curve model implementations.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the law being fitted.

pub mod model;

pub use model::*;
