//! # Domain Module
//!
//! Ring, configuration, errors and invariants.

pub mod entities;
pub mod errors;
pub mod invariants;

pub use entities::*;
pub use errors::*;
pub use invariants::*;
