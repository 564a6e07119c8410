//! # Outbound Ports
//!
//! Dependencies the pipeline needs from the outside world.

use crate::domain::SinkError;
use af_03_shard_routing::ShardId;
use async_trait::async_trait;
use shared_types::TransactionRecord;

/// Durable storage behind the in-memory ledger.
///
/// Fed by the write-behind task. The in-memory ledger stays authoritative:
/// a failed write is logged, never rolled back.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persist one committed record on its shard.
    async fn persist(&self, shard: ShardId, record: TransactionRecord) -> Result<(), SinkError>;
}
