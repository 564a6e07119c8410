//! # Inbound Ports
//!
//! API offered by the ingestion pipeline.

use crate::domain::{BatchReport, CancellationFlag, PipelineError, TransactionDraft};
use shared_types::TransactionRecord;

/// Ingestion API.
pub trait IngestionApi: Send + Sync {
    /// Decode newline-delimited JSON and process the result as one batch.
    fn ingest_lines(
        &self,
        lines: &[String],
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError>;

    /// Build records from normalized drafts and process them as one batch.
    fn ingest_drafts(
        &self,
        drafts: Vec<TransactionDraft>,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError>;

    /// Validate, route and commit already constructed records.
    fn submit(
        &self,
        records: Vec<TransactionRecord>,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError>;
}
