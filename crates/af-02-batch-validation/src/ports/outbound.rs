//! # Outbound Ports
//!
//! Read access to ledger state for the topology phase.

use af_01_dag_ledger::{AncestorStatus, DagLedger};
use shared_types::TxId;
use std::collections::HashSet;

/// Answers whether a parent id is known to the ledger.
///
/// Implementations must answer from one stable snapshot for the duration of
/// a batch's topology phase.
pub trait ParentResolver {
    /// Retained, pruned or unknown.
    fn resolve(&self, id: &TxId) -> AncestorStatus;
}

impl ParentResolver for DagLedger {
    fn resolve(&self, id: &TxId) -> AncestorStatus {
        self.ancestor_status(id)
    }
}

/// A fixed set of retained ids. Useful when no ledger exists yet.
impl ParentResolver for HashSet<TxId> {
    fn resolve(&self, id: &TxId) -> AncestorStatus {
        if self.contains(id) {
            AncestorStatus::Retained
        } else {
            AncestorStatus::Unknown
        }
    }
}
