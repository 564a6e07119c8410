//! # Shared Types Crate
//!
//! This crate contains the content-addressed `TransactionRecord` and the pure
//! integrity checks every other subsystem relies on.
//!
//! ## Design Principles
//!
//! - **Content Addressing**: A record's `id` IS its hash. Identity is derived
//!   from content, never assigned.
//! - **Tamper Evidence**: Recomputing the hash from the current fields must
//!   reproduce the stored hash at every observation point.
//! - **Monotonic Validation**: `validated` is the only mutable field and it
//!   only ever moves `false -> true`.

pub mod entities;
pub mod errors;
pub mod integrity;

pub use entities::*;
pub use errors::*;
pub use integrity::{check_structure, is_structurally_valid, validate_structure, verify_integrity};
