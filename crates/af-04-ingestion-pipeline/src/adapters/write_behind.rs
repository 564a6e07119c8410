//! Write-Behind Adapter
//!
//! Forwards committed records to a `RecordSink` from a background task so the
//! commit path never waits on storage.
//!
//! ```text
//! commit ──enqueue──→ mpsc (unbounded) ──→ task ──persist──→ RecordSink
//! ```

use crate::domain::PipelineError;
use crate::ports::outbound::RecordSink;
use af_03_shard_routing::ShardId;
use shared_types::TransactionRecord;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One record to persist.
#[derive(Clone, Debug)]
pub struct PersistRequest {
    /// Shard the record was routed to
    pub shard: ShardId,
    /// Committed record
    pub record: TransactionRecord,
}

/// Totals reported when the write-behind task stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteBehindStats {
    /// Records the sink accepted
    pub persisted: usize,
    /// Records the sink refused
    pub failed: usize,
}

/// Sending half of the write-behind queue.
///
/// The task stops once every clone is dropped and the queue has drained.
#[derive(Clone, Debug)]
pub struct WriteBehind {
    sender: mpsc::UnboundedSender<PersistRequest>,
}

impl WriteBehind {
    /// Spawn the forwarding task on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn RecordSink>) -> (Self, JoinHandle<WriteBehindStats>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(sink, receiver));
        (Self { sender }, handle)
    }

    /// Queue a committed record. Never blocks.
    pub fn enqueue(&self, shard: ShardId, record: TransactionRecord) -> Result<(), PipelineError> {
        self.sender
            .send(PersistRequest { shard, record })
            .map_err(|_| PipelineError::PersistenceClosed)
    }
}

async fn run(
    sink: Arc<dyn RecordSink>,
    mut receiver: mpsc::UnboundedReceiver<PersistRequest>,
) -> WriteBehindStats {
    let mut stats = WriteBehindStats::default();

    while let Some(request) = receiver.recv().await {
        let id = request.record.id();
        match sink.persist(request.shard, request.record).await {
            Ok(()) => stats.persisted += 1,
            Err(e) => {
                warn!("[af-04] Write-behind failed for {}: {}", id.short(), e);
                stats.failed += 1;
            }
        }
    }

    info!(
        "[af-04] Write-behind stopped: {} persisted, {} failed",
        stats.persisted, stats.failed
    );
    stats
}
