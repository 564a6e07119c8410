//! # Inbound Ports
//!
//! Read-only ledger access for downstream phases (risk scoring, audit,
//! intel). Consumers never mutate ledger state through this port.

use crate::domain::{AncestorStatus, DagLedger};
use shared_types::{TransactionRecord, TxId};

/// Read-only ledger view.
pub trait LedgerReader: Send + Sync {
    /// Current frontier, oldest first.
    fn tips(&self) -> Vec<TxId>;

    /// Copy of a retained record.
    fn get(&self, id: &TxId) -> Option<TransactionRecord>;

    /// Whether a record is retained.
    fn contains(&self, id: &TxId) -> bool;

    /// Retained, pruned or unknown.
    fn ancestor_status(&self, id: &TxId) -> AncestorStatus;
}

impl LedgerReader for DagLedger {
    fn tips(&self) -> Vec<TxId> {
        DagLedger::tips(self)
    }

    fn get(&self, id: &TxId) -> Option<TransactionRecord> {
        DagLedger::get(self, id).cloned()
    }

    fn contains(&self, id: &TxId) -> bool {
        DagLedger::contains(self, id)
    }

    fn ancestor_status(&self, id: &TxId) -> AncestorStatus {
        DagLedger::ancestor_status(self, id)
    }
}
