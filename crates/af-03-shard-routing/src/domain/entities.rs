//! # Domain Entities
//!
//! Router configuration and the immutable shard ring.

use super::errors::{RouterError, ShardId};
use crate::algorithms::{ring_position, shard_points, successor_index, DEFAULT_EWMA_ALPHA};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default virtual nodes per shard.
pub const DEFAULT_VIRTUAL_NODES: u32 = 128;

/// Default number of ring points probed by load-aware routing.
pub const DEFAULT_PROBE: usize = 5;

/// Router configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Virtual nodes placed on the ring per shard.
    pub virtual_nodes_per_shard: u32,
    /// EWMA smoothing factor for load tracking, in (0, 1].
    pub ewma_alpha: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            virtual_nodes_per_shard: DEFAULT_VIRTUAL_NODES,
            ewma_alpha: DEFAULT_EWMA_ALPHA,
        }
    }
}

impl RouterConfig {
    /// Create config for testing with a smaller ring.
    pub fn for_testing() -> Self {
        Self {
            virtual_nodes_per_shard: 32,
            ..Self::default()
        }
    }

    /// Check the configuration.
    pub fn validate(&self) -> Result<(), RouterError> {
        if self.virtual_nodes_per_shard == 0 {
            return Err(RouterError::InvalidConfig(
                "virtual_nodes_per_shard must be at least 1".to_string(),
            ));
        }
        if !(self.ewma_alpha > 0.0 && self.ewma_alpha <= 1.0) {
            return Err(RouterError::InvalidConfig(format!(
                "ewma_alpha must be in (0, 1], got {}",
                self.ewma_alpha
            )));
        }
        Ok(())
    }
}

/// Immutable consistent-hash ring.
///
/// Mutations return a new ring; readers holding an older ring keep routing
/// against a complete state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardRing {
    virtual_nodes: u32,
    /// Sorted by position, ties broken by shard id.
    points: Vec<(u64, ShardId)>,
    shards: BTreeSet<ShardId>,
}

impl ShardRing {
    /// Create an empty ring.
    pub fn new(virtual_nodes: u32) -> Self {
        Self {
            virtual_nodes,
            points: Vec::new(),
            shards: BTreeSet::new(),
        }
    }

    /// A copy of this ring with `shard` added.
    pub fn with_shard(&self, shard: ShardId) -> Result<Self, RouterError> {
        if self.shards.contains(&shard) {
            return Err(RouterError::DuplicateShard(shard));
        }

        let mut next = self.clone();
        next.points
            .extend(shard_points(shard, self.virtual_nodes).map(|position| (position, shard)));
        next.points.sort_unstable();
        next.shards.insert(shard);
        Ok(next)
    }

    /// A copy of this ring with `shard` and all its points removed.
    pub fn without_shard(&self, shard: ShardId) -> Result<Self, RouterError> {
        if !self.shards.contains(&shard) {
            return Err(RouterError::UnknownShard(shard));
        }

        let mut next = self.clone();
        next.points.retain(|(_, owner)| *owner != shard);
        next.shards.remove(&shard);
        Ok(next)
    }

    /// Shard owning the first point at or after the key's position.
    pub fn route(&self, key: &[u8]) -> Result<ShardId, RouterError> {
        if self.points.is_empty() {
            return Err(RouterError::EmptyRing);
        }
        let index = successor_index(&self.points, ring_position(key));
        Ok(self.points[index].1)
    }

    /// The owner followed by the shards of the next `probe` points, in ring
    /// order. Shards may repeat.
    pub fn candidates(&self, key: &[u8], probe: usize) -> Result<Vec<ShardId>, RouterError> {
        if self.points.is_empty() {
            return Err(RouterError::EmptyRing);
        }
        let start = successor_index(&self.points, ring_position(key));
        Ok((0..=probe)
            .map(|step| self.points[(start + step) % self.points.len()].1)
            .collect())
    }

    /// Registered shards, ascending.
    pub fn shard_ids(&self) -> Vec<ShardId> {
        self.shards.iter().copied().collect()
    }

    /// Whether `shard` is on the ring.
    pub fn contains(&self, shard: ShardId) -> bool {
        self.shards.contains(&shard)
    }

    /// Number of registered shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Sorted ring points.
    pub fn points(&self) -> &[(u64, ShardId)] {
        &self.points
    }

    /// Virtual nodes per shard.
    pub fn virtual_nodes(&self) -> u32 {
        self.virtual_nodes
    }

    /// No shard registered.
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }
}
