//! # Domain Module
//!
//! Decoding, batch reports and pipeline errors.

pub mod decoder;
pub mod errors;
pub mod report;

pub use decoder::{
    decode_json_batch, decode_line, DecodeFailure, DecodedBatch, TransactionDraft,
    DEFAULT_RECEIVER, DEFAULT_SENDER,
};
pub use errors::{PipelineError, SinkError};
pub use report::{BatchReport, CancellationFlag, InsertionStatus, RecordReport};
