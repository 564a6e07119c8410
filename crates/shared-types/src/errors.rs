//! # Error Types
//!
//! Errors raised while constructing or structurally checking records.

use crate::entities::TxId;
use thiserror::Error;

/// Errors raised by record construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Malformed construction arguments. The record never reaches a batch.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The same parent hash is listed more than once.
    #[error("Duplicate parent hash: {0}")]
    DuplicateParent(TxId),

    /// A transaction id string is not 64 hex characters.
    #[error("Malformed transaction id: {0}")]
    MalformedId(String),
}

/// Why a record failed the structural check.
///
/// Recorded per record; never fatal to a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructuralFailure {
    /// `amount` is zero, negative or NaN.
    #[error("amount must be strictly positive")]
    NonPositiveAmount,

    /// `timestamp` is zero, negative or NaN.
    #[error("timestamp must be strictly positive")]
    NonPositiveTimestamp,

    /// Recomputed hash differs from the stored hash.
    #[error("stored hash does not match record content")]
    HashMismatch,
}
