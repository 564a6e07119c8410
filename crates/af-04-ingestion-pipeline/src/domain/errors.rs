//! # Domain Errors
//!
//! Error types for the ingestion pipeline.

use af_03_shard_routing::RouterError;
use thiserror::Error;

/// Pipeline error types.
///
/// Per-record failures are reported in the `BatchReport`; these errors abort
/// a whole batch before anything is committed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No shard could be assigned.
    #[error("Routing error: {0}")]
    Router(#[from] RouterError),

    /// Batch was cancelled before commit; the ledger is unchanged.
    #[error("Batch cancelled before commit")]
    Cancelled,

    /// Write-behind channel is closed.
    #[error("Persistence channel closed")]
    PersistenceClosed,
}

/// Failure reported by a `RecordSink`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Sink failure: {0}")]
pub struct SinkError(pub String);
