//! Record Sink Adapters
//!
//! In-process implementations of the `RecordSink` port.

use crate::domain::SinkError;
use crate::ports::outbound::RecordSink;
use af_03_shard_routing::ShardId;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::TransactionRecord;
use tracing::debug;

/// Sink that only logs. Used by the node runtime when no store is configured.
#[derive(Debug, Default)]
pub struct TracingRecordSink;

#[async_trait]
impl RecordSink for TracingRecordSink {
    async fn persist(&self, shard: ShardId, record: TransactionRecord) -> Result<(), SinkError> {
        debug!(
            "[af-04] Persisted {} on shard {}",
            record.id().short(),
            shard
        );
        Ok(())
    }
}

/// Sink that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryRecordSink {
    stored: Mutex<Vec<(ShardId, TransactionRecord)>>,
}

impl MemoryRecordSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything persisted so far, in arrival order.
    pub fn stored(&self) -> Vec<(ShardId, TransactionRecord)> {
        self.stored.lock().clone()
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.stored.lock().len()
    }

    /// True if nothing was persisted.
    pub fn is_empty(&self) -> bool {
        self.stored.lock().is_empty()
    }
}

#[async_trait]
impl RecordSink for MemoryRecordSink {
    async fn persist(&self, shard: ShardId, record: TransactionRecord) -> Result<(), SinkError> {
        self.stored.lock().push((shard, record));
        Ok(())
    }
}
