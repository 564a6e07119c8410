//! # Domain Errors
//!
//! Per-record topology failures. Never fatal to a batch.

use shared_types::TxId;
use thiserror::Error;

/// Why a structurally valid record cannot be admitted to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TopologyFailure {
    /// Parent is neither in the ledger nor an earlier accepted sibling.
    #[error("unresolved parent {0}")]
    UnresolvedParent(TxId),

    /// Parent appears later in the same batch.
    #[error("parent {parent} appears later in the batch (position {position})")]
    ForwardReference {
        /// Referenced sibling
        parent: TxId,
        /// Its position in the batch
        position: usize,
    },

    /// Parent is an earlier sibling that failed the structural check.
    #[error("parent {0} failed structural validation")]
    ParentStructurallyInvalid(TxId),

    /// Parent is an earlier sibling that failed its own topology check.
    #[error("parent {0} was rejected by topology validation")]
    ParentRejected(TxId),

    /// Record lists itself as a parent.
    #[error("record lists itself as a parent")]
    SelfReference,
}
