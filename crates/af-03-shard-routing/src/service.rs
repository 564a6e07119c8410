//! # Shard Router Service
//!
//! Thread-safe router over a copy-on-update ring.
//!
//! The ring lives in `RwLock<Arc<ShardRing>>`. Routing clones the `Arc`
//! under a short read lock and works on that snapshot; topology changes build
//! a new ring and swap the `Arc` under the write lock.

use crate::algorithms::LoadTracker;
use crate::domain::{RouterConfig, RouterError, ShardId, ShardRing};
use crate::ports::inbound::ShardRoutingApi;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Consistent-hash shard router with optional load-aware probing.
pub struct ShardRouter {
    config: RouterConfig,
    ring: RwLock<Arc<ShardRing>>,
    loads: RwLock<LoadTracker>,
}

impl ShardRouter {
    /// Create a router with an empty ring.
    pub fn new(config: RouterConfig) -> Result<Self, RouterError> {
        config.validate()?;
        Ok(Self {
            ring: RwLock::new(Arc::new(ShardRing::new(config.virtual_nodes_per_shard))),
            loads: RwLock::new(LoadTracker::new(config.ewma_alpha)),
            config,
        })
    }

    /// Create a router and register `shards`.
    pub fn with_shards(
        config: RouterConfig,
        shards: impl IntoIterator<Item = ShardId>,
    ) -> Result<Self, RouterError> {
        let router = Self::new(config)?;
        let ring = shards
            .into_iter()
            .try_fold(ShardRing::new(router.config.virtual_nodes_per_shard), |ring, shard| {
                ring.with_shard(shard)
            })?;

        info!(
            "[af-03] Router initialized: {} shards, {} virtual nodes",
            ring.shard_count(),
            ring.points().len()
        );
        *router.ring.write() = Arc::new(ring);
        Ok(router)
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Current ring. Never observes a half-built ring.
    pub fn snapshot(&self) -> Arc<ShardRing> {
        Arc::clone(&self.ring.read())
    }

    /// Fold a latency observation into `shard`'s load.
    pub fn record_load(
        &self,
        shard: ShardId,
        latency_ms: f64,
        items: usize,
    ) -> Result<(), RouterError> {
        if !self.snapshot().contains(shard) {
            return Err(RouterError::UnknownShard(shard));
        }
        self.loads.write().record(shard, latency_ms, items);
        Ok(())
    }

    /// Current EWMA load of `shard` (ms per item).
    pub fn load(&self, shard: ShardId) -> f64 {
        self.loads.read().load(shard)
    }

    /// Least-loaded shard among the owner of `key` and the shards of the next
    /// `probe` ring points. Ties keep the earliest candidate, so with no load
    /// recorded this equals `route`.
    pub fn route_load_aware(&self, key: &[u8], probe: usize) -> Result<ShardId, RouterError> {
        let candidates = self.snapshot().candidates(key, probe)?;
        let loads = self.loads.read();

        let mut best = candidates[0];
        let mut best_load = loads.load(best);
        for shard in candidates.into_iter().skip(1) {
            let load = loads.load(shard);
            if load < best_load {
                best = shard;
                best_load = load;
            }
        }
        Ok(best)
    }

    /// Group `items` by the shard owning `key_fn(item)`.
    ///
    /// Every registered shard gets an entry, possibly empty. All items are
    /// routed against one ring snapshot.
    pub fn distribute<T, K>(
        &self,
        items: impl IntoIterator<Item = T>,
        key_fn: impl Fn(&T) -> K,
    ) -> Result<HashMap<ShardId, Vec<T>>, RouterError>
    where
        K: AsRef<[u8]>,
    {
        let ring = self.snapshot();
        let mut buckets: HashMap<ShardId, Vec<T>> =
            ring.shard_ids().into_iter().map(|id| (id, Vec::new())).collect();

        for item in items {
            let shard = ring.route(key_fn(&item).as_ref())?;
            buckets.entry(shard).or_default().push(item);
        }
        Ok(buckets)
    }

    fn replace_ring(
        &self,
        change: impl FnOnce(&ShardRing) -> Result<ShardRing, RouterError>,
    ) -> Result<Arc<ShardRing>, RouterError> {
        let mut guard = self.ring.write();
        let next = Arc::new(change(&guard)?);
        *guard = Arc::clone(&next);
        Ok(next)
    }
}

impl ShardRoutingApi for ShardRouter {
    fn add_shard(&self, shard: ShardId) -> Result<(), RouterError> {
        let ring = self.replace_ring(|ring| ring.with_shard(shard))?;
        info!(
            "[af-03] Added shard {} ({} shards on ring)",
            shard,
            ring.shard_count()
        );
        Ok(())
    }

    fn remove_shard(&self, shard: ShardId) -> Result<(), RouterError> {
        let ring = self.replace_ring(|ring| ring.without_shard(shard))?;
        self.loads.write().forget(shard);
        info!(
            "[af-03] Removed shard {} ({} shards on ring)",
            shard,
            ring.shard_count()
        );
        Ok(())
    }

    fn route(&self, key: &[u8]) -> Result<ShardId, RouterError> {
        let shard = self.snapshot().route(key)?;
        debug!("[af-03] Routed key ({} bytes) to shard {}", key.len(), shard);
        Ok(shard)
    }

    fn shard_ids(&self) -> Vec<ShardId> {
        self.snapshot().shard_ids()
    }
}
