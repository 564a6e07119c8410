//! # AF-03 Shard Routing
//!
//! Consistent-hash ring that assigns transactions to storage shards.
//!
//! **Subsystem ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Spread the ledger's write load over horizontally scaled shards:
//! - SHA-256 ring with virtual nodes (128 per shard by default)
//! - Adding or removing one shard moves only ~1/n of keys
//! - Optional load-aware routing over a small ring neighborhood
//!
//! ## Ring Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Position | first 8 bytes (big endian) of SHA-256 of the point label `"{shard}#{i}"` |
//! | Owner | first point with `position >= hash(key)`, wrapping to the first point |
//! | Add | keys move only to the new shard |
//! | Remove | only the removed shard's keys move |
//!
//! ## Module Structure
//!
//! ```text
//! af-03-shard-routing/
//! ├── domain/          # ShardRing, RouterConfig, RouterError, invariants
//! ├── algorithms/      # Ring positions, EWMA load tracking
//! ├── ports/           # ShardRoutingApi
//! └── service.rs       # ShardRouter (copy-on-update ring)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{point_label, ring_position, LoadTracker, DEFAULT_EWMA_ALPHA};
pub use domain::{
    invariant_add_moves_only_to_new_shard, invariant_deterministic_route,
    invariant_remove_moves_only_orphans, invariant_ring_well_formed, RouterConfig, RouterError,
    ShardId, ShardRing, DEFAULT_PROBE, DEFAULT_VIRTUAL_NODES,
};
pub use ports::ShardRoutingApi;
pub use service::ShardRouter;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
