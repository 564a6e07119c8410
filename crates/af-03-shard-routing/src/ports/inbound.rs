//! # Inbound Ports
//!
//! API offered by the shard router.

use crate::domain::{RouterError, ShardId};

/// Shard routing API.
pub trait ShardRoutingApi: Send + Sync {
    /// Register a shard and its virtual nodes.
    fn add_shard(&self, shard: ShardId) -> Result<(), RouterError>;

    /// Remove a shard and all its virtual nodes.
    fn remove_shard(&self, shard: ShardId) -> Result<(), RouterError>;

    /// Consistent-hash owner of `key`.
    fn route(&self, key: &[u8]) -> Result<ShardId, RouterError>;

    /// Registered shards, ascending.
    fn shard_ids(&self) -> Vec<ShardId>;
}
