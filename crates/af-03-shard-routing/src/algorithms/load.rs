//! # Load Tracking
//!
//! Exponentially weighted moving average of per-item latency per shard.

use crate::domain::ShardId;
use std::collections::HashMap;

/// Default EWMA smoothing factor.
pub const DEFAULT_EWMA_ALPHA: f64 = 0.2;

/// Per-shard EWMA of latency per item, in milliseconds.
///
/// Shards never observed have load 0.0.
#[derive(Clone, Debug)]
pub struct LoadTracker {
    alpha: f64,
    loads: HashMap<ShardId, f64>,
}

impl LoadTracker {
    /// Create a tracker with smoothing factor `alpha` in (0, 1].
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            loads: HashMap::new(),
        }
    }

    /// Fold one observation of `items` processed in `latency_ms`.
    ///
    /// `items == 0` counts as one item.
    pub fn record(&mut self, shard: ShardId, latency_ms: f64, items: usize) {
        let per_item = latency_ms / items.max(1) as f64;
        let load = self.loads.entry(shard).or_insert(0.0);
        *load = (1.0 - self.alpha) * *load + self.alpha * per_item;
    }

    /// Current load of `shard`.
    pub fn load(&self, shard: ShardId) -> f64 {
        self.loads.get(&shard).copied().unwrap_or(0.0)
    }

    /// Drop the history of a removed shard.
    pub fn forget(&mut self, shard: ShardId) {
        self.loads.remove(&shard);
    }
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EWMA_ALPHA)
    }
}
