//! # Algorithms Module
//!
//! Ring hashing and load tracking.

pub mod consistent_hash;
pub mod load;

pub use consistent_hash::{point_label, ring_position, shard_points, successor_index};
pub use load::{LoadTracker, DEFAULT_EWMA_ALPHA};
