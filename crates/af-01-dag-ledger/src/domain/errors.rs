//! # Domain Errors
//!
//! Error types for the DAG Ledger subsystem.

use shared_types::TxId;
use thiserror::Error;

/// Ledger error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Record id already present. The ledger is unchanged.
    #[error("Duplicate record: {0}")]
    Duplicate(TxId),

    /// Record has not passed the structural check.
    #[error("Record not validated: {0}")]
    NotValidated(TxId),

    /// A parent is neither retained nor a tracked pruned ancestor.
    #[error("Unresolved parent {parent} for record {id}")]
    UnresolvedParent {
        /// Record being inserted
        id: TxId,
        /// Parent that could not be resolved
        parent: TxId,
    },

    /// No record can be evicted without breaking referential integrity.
    #[error("Ledger capacity exceeded: {capacity} records, none evictable")]
    CapacityExceeded {
        /// Configured maximum retained records
        capacity: usize,
    },

    /// Ledger state inconsistency.
    #[error("Ledger state inconsistency: {0}")]
    StateInconsistency(String),
}
