//! # AF-04 Ingestion Pipeline
//!
//! Turns raw transaction payloads into committed ledger records.
//!
//! **Subsystem ID:** 4
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Flow
//!
//! ```text
//! NDJSON ─decode─→ drafts ─construct─→ records ─validate─→ BatchOutcome
//!                                                              │
//!         RecordSink ←─write-behind─ commit ←─cancel check─ route(sender)
//! ```
//!
//! ## Batch Discipline
//!
//! | Step | Ledger access |
//! |------|---------------|
//! | Phase A + Phase B | upgradable guard (stable snapshot, readers continue) |
//! | Routing + cancellation check | same guard |
//! | Commit + bound enforcement | guard upgraded to exclusive |
//! | Write-behind | none (background task) |
//!
//! A batch that is cancelled or fails to route leaves the ledger unchanged.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    MemoryRecordSink, PersistRequest, TracingRecordSink, WriteBehind, WriteBehindStats,
};
pub use domain::{
    decode_json_batch, decode_line, BatchReport, CancellationFlag, DecodeFailure, DecodedBatch,
    InsertionStatus, PipelineError, RecordReport, SinkError, TransactionDraft, DEFAULT_RECEIVER,
    DEFAULT_SENDER,
};
pub use ports::{IngestionApi, RecordSink};
pub use service::{IngestionPipeline, PipelineConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
