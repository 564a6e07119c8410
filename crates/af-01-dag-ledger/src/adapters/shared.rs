//! Shared Ledger Adapter
//!
//! Single-writer, many-reader handle around [`DagLedger`].
//!
//! - Readers take a shared guard.
//! - A batch takes an upgradable guard: a stable snapshot for its topology
//!   pass that also keeps other batches out, then upgrades to commit.
//! - Single inserts take the exclusive guard for one insert only.

use crate::domain::{AncestorStatus, DagLedger, LedgerConfig, LedgerError, LedgerStats};
use crate::ports::inbound::LedgerReader;
use crate::ports::outbound::AuditSink;
use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard};
use shared_types::{TransactionRecord, TxId};
use std::sync::Arc;
use tracing::info;

/// Cloneable handle to the process-wide ledger.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<RwLock<DagLedger>>,
}

impl SharedLedger {
    /// Create a handle around a new empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self::from_ledger(DagLedger::new(config))
    }

    /// Wrap an existing ledger.
    pub fn from_ledger(ledger: DagLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Shared read guard.
    pub fn read(&self) -> RwLockReadGuard<'_, DagLedger> {
        self.inner.read()
    }

    /// Upgradable guard for one batch's validate-then-commit sequence.
    ///
    /// Plain readers proceed concurrently; other batches and writers wait
    /// until the guard is dropped.
    pub fn begin_batch(&self) -> RwLockUpgradableReadGuard<'_, DagLedger> {
        self.inner.upgradable_read()
    }

    /// Insert one record under the exclusive lock.
    pub fn insert(&self, record: TransactionRecord) -> Result<(), LedgerError> {
        self.inner.write().insert(record)
    }

    /// Apply the bounded-memory policy.
    pub fn evict_if_over_bound(&self) -> Vec<TxId> {
        self.inner.write().evict_if_over_bound()
    }

    /// Re-verify every retained record and forward new violations to `sink`.
    pub fn audit(&self, sink: &dyn AuditSink) -> usize {
        let reports = self.inner.write().audit();
        let count = reports.len();
        for report in reports {
            sink.report_tampering(report);
        }
        if count > 0 {
            info!("[af-01] Audit forwarded {} tampering report(s)", count);
        }
        count
    }

    /// Counters snapshot.
    pub fn stats(&self) -> LedgerStats {
        self.inner.read().stats()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl LedgerReader for SharedLedger {
    fn tips(&self) -> Vec<TxId> {
        self.inner.read().tips()
    }

    fn get(&self, id: &TxId) -> Option<TransactionRecord> {
        self.inner.read().get(id).cloned()
    }

    fn contains(&self, id: &TxId) -> bool {
        self.inner.read().contains(id)
    }

    fn ancestor_status(&self, id: &TxId) -> AncestorStatus {
        self.inner.read().ancestor_status(id)
    }
}
