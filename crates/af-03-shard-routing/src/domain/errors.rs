//! # Domain Errors
//!
//! Error types for the shard router.

use thiserror::Error;

/// Shard identifier (u16 supports up to 65536 shards).
pub type ShardId = u16;

/// Shard router error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// No shard is registered.
    #[error("Shard ring is empty")]
    EmptyRing,

    /// Shard is already on the ring.
    #[error("Shard already registered: {0}")]
    DuplicateShard(ShardId),

    /// Shard is not on the ring.
    #[error("Unknown shard: {0}")]
    UnknownShard(ShardId),

    /// Configuration error.
    #[error("Invalid router configuration: {0}")]
    InvalidConfig(String),
}
