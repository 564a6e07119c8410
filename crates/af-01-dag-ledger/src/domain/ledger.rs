//! # DAG Ledger - Validated Records and Tip Frontier
//!
//! ## Data Structures
//!
//! - `entries`: O(1) lookup by id, with insertion sequence and retained child count
//! - `order`: insertion order (oldest first) for referenced-record eviction
//! - `tips`: frontier ids keyed by insertion sequence, the tip eviction scan
//! - `pruned`: evicted ancestors still referenced by retained records
//!
//! ## Invariants Enforced
//!
//! - entries are keyed by the record hash
//! - every parent of a retained record is retained or in `pruned`
//! - Tips are exactly the retained records with zero retained children

use super::entities::{
    AncestorStatus, LedgerConfig, LedgerStats, RetentionPolicy, TamperReport, TrustStatus,
};
use super::errors::LedgerError;
use shared_types::{verify_integrity, TransactionRecord, TxId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, error, info, warn};

#[derive(Clone, Debug)]
struct LedgerEntry {
    record: TransactionRecord,
    seq: u64,
    children: usize,
}

/// Bounded-memory DAG of validated transaction records.
#[derive(Clone, Debug)]
pub struct DagLedger {
    config: LedgerConfig,
    entries: HashMap<TxId, LedgerEntry>,
    order: BTreeMap<u64, TxId>,
    tips: BTreeMap<u64, TxId>,
    /// Pruned id -> number of retained records listing it as a parent.
    pruned: HashMap<TxId, usize>,
    tampered: HashSet<TxId>,
    next_seq: u64,
    newest_timestamp: f64,
    evicted_total: u64,
    inserted_total: u64,
}

impl DagLedger {
    /// Creates an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            tips: BTreeMap::new(),
            pruned: HashMap::new(),
            tampered: HashSet::new(),
            next_seq: 0,
            newest_timestamp: 0.0,
            evicted_total: 0,
            inserted_total: 0,
        }
    }

    /// Creates a ledger with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LedgerConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks if a record is retained.
    pub fn contains(&self, id: &TxId) -> bool {
        self.entries.contains_key(id)
    }

    /// Gets a retained record by id.
    pub fn get(&self, id: &TxId) -> Option<&TransactionRecord> {
        self.entries.get(id).map(|e| &e.record)
    }

    /// Current frontier, oldest first.
    pub fn tips(&self) -> Vec<TxId> {
        self.tips.values().copied().collect()
    }

    /// Retained records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.order
            .values()
            .filter_map(move |id| self.entries.get(id).map(|e| &e.record))
    }

    /// Retained records with the id they are stored under.
    pub(crate) fn keyed_records(&self) -> impl Iterator<Item = (&TxId, &TransactionRecord)> + '_ {
        self.entries.iter().map(|(id, entry)| (id, &entry.record))
    }

    /// Replace the stored copy of a retained record, keeping its key.
    #[cfg(test)]
    pub(crate) fn overwrite_stored(&mut self, id: &TxId, record: TransactionRecord) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.record = record;
        }
    }

    /// Whether `id` is retained, a tracked pruned ancestor, or unknown.
    pub fn ancestor_status(&self, id: &TxId) -> AncestorStatus {
        if self.entries.contains_key(id) {
            AncestorStatus::Retained
        } else if self.pruned.contains_key(id) {
            AncestorStatus::Pruned
        } else {
            AncestorStatus::Unknown
        }
    }

    /// Trust status of a retained record.
    pub fn trust_status(&self, id: &TxId) -> Option<TrustStatus> {
        if !self.entries.contains_key(id) {
            return None;
        }
        if self.tampered.contains(id) {
            Some(TrustStatus::Tampered)
        } else {
            Some(TrustStatus::Trusted)
        }
    }

    /// Counters snapshot.
    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            retained: self.entries.len(),
            tips: self.tips.len(),
            pruned: self.pruned.len(),
            evicted_total: self.evicted_total,
            inserted_total: self.inserted_total,
        }
    }

    /// Inserts a validated, topology-resolved record.
    ///
    /// When the ledger is full one eligible record is evicted first. Parents
    /// of the incoming record are never chosen.
    ///
    /// # Errors
    /// - `Duplicate` if the id is already retained (ledger unchanged)
    /// - `NotValidated` if the record has not passed the structural check
    /// - `UnresolvedParent` if a parent is neither retained nor pruned
    /// - `CapacityExceeded` if the ledger is full and nothing is evictable
    pub fn insert(&mut self, record: TransactionRecord) -> Result<(), LedgerError> {
        let id = record.id();

        if self.entries.contains_key(&id) {
            return Err(LedgerError::Duplicate(id));
        }

        self.check_admissible(&record, &HashSet::new())?;

        let victim = if self.entries.len() >= self.config.max_records {
            match self.find_victim(record.parent_hashes(), None) {
                Some(victim) => Some(victim),
                None => {
                    warn!(
                        "[af-01] Refusing {}: {} records retained, none evictable",
                        id.short(),
                        self.entries.len()
                    );
                    return Err(LedgerError::CapacityExceeded {
                        capacity: self.config.max_records,
                    });
                }
            }
        } else {
            None
        };

        let seq = self.next_seq;
        self.next_seq += 1;

        for parent in record.parent_hashes() {
            if let Some(entry) = self.entries.get_mut(parent) {
                entry.children += 1;
                self.tips.remove(&entry.seq);
            } else if let Some(refs) = self.pruned.get_mut(parent) {
                *refs += 1;
            }
        }

        // Parents are referenced before eviction so a pruned parent shared
        // with the victim keeps a non-zero count.
        if let Some(victim) = victim {
            self.evict(&victim);
        }

        if record.timestamp() > self.newest_timestamp {
            self.newest_timestamp = record.timestamp();
        }

        debug!(
            "[af-01] Inserted {} with {} parent(s)",
            id.short(),
            record.parent_hashes().len()
        );

        // A pruned ancestor coming back keeps its retained children.
        let children = self.pruned.remove(&id).unwrap_or(0);
        self.order.insert(seq, id);
        if children == 0 {
            self.tips.insert(seq, id);
        }
        self.entries.insert(
            id,
            LedgerEntry {
                record,
                seq,
                children,
            },
        );
        self.inserted_total += 1;
        Ok(())
    }

    /// Inserts every record of `records`, in order, or none of them.
    ///
    /// Records already retained (or repeated within `records`) are skipped
    /// and reported as `false`. On any other refusal the ledger is left
    /// untouched and the position of the refused record is returned.
    pub fn insert_all(
        &mut self,
        records: Vec<TransactionRecord>,
    ) -> Result<Vec<bool>, (usize, LedgerError)> {
        if self.entries.len() + records.len() > self.config.max_records {
            // Evictions interleave with the inserts: commit on a copy.
            let mut trial = self.clone();
            let inserted = trial.insert_each(records)?;
            *self = trial;
            return Ok(inserted);
        }

        // Nothing is evicted below the bound, so these checks cover every
        // refusal `insert` can produce.
        let mut staged = HashSet::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let id = record.id();
            if self.entries.contains_key(&id) || staged.contains(&id) {
                continue;
            }
            self.check_admissible(record, &staged)
                .map_err(|e| (position, e))?;
            staged.insert(id);
        }
        self.insert_each(records)
    }

    fn insert_each(
        &mut self,
        records: Vec<TransactionRecord>,
    ) -> Result<Vec<bool>, (usize, LedgerError)> {
        records
            .into_iter()
            .enumerate()
            .map(|(position, record)| match self.insert(record) {
                Ok(()) => Ok(true),
                Err(LedgerError::Duplicate(_)) => Ok(false),
                Err(e) => Err((position, e)),
            })
            .collect()
    }

    /// Checks that do not depend on capacity. Parents may also resolve to
    /// `staged` ids that will be inserted first.
    fn check_admissible(
        &self,
        record: &TransactionRecord,
        staged: &HashSet<TxId>,
    ) -> Result<(), LedgerError> {
        let id = record.id();

        if !record.is_validated() {
            return Err(LedgerError::NotValidated(id));
        }

        for parent in record.parent_hashes() {
            let resolvable =
                staged.contains(parent) || self.ancestor_status(parent).is_resolvable();
            if *parent == id || !resolvable {
                return Err(LedgerError::UnresolvedParent {
                    id,
                    parent: *parent,
                });
            }
        }
        Ok(())
    }

    /// Applies the bounded-memory policy and returns evicted ids.
    ///
    /// Evicts while over `max_records`, then evicts eligible records older
    /// than the retention window. Stops early when nothing is eligible.
    pub fn evict_if_over_bound(&mut self) -> Vec<TxId> {
        let mut evicted = Vec::new();

        while self.entries.len() > self.config.max_records {
            match self.find_victim(&[], None) {
                Some(victim) => {
                    self.evict(&victim);
                    evicted.push(victim);
                }
                None => {
                    warn!(
                        "[af-01] Over bound ({} > {}) with nothing evictable",
                        self.entries.len(),
                        self.config.max_records
                    );
                    break;
                }
            }
        }

        if let Some(window) = self.config.retention_window_secs {
            let cutoff = self.newest_timestamp - window;
            while let Some(victim) = self.find_victim(&[], Some(cutoff)) {
                self.evict(&victim);
                evicted.push(victim);
            }
        }

        if !evicted.is_empty() {
            info!(
                "[af-01] Evicted {} record(s), {} retained",
                evicted.len(),
                self.entries.len()
            );
        }
        evicted
    }

    /// Recomputes the hash of every retained record.
    ///
    /// Newly detected mismatches are logged, marked `Tampered` and returned.
    pub fn audit(&mut self) -> Vec<TamperReport> {
        let mut reports = Vec::new();
        for (id, entry) in &self.entries {
            if verify_integrity(&entry.record) || self.tampered.contains(id) {
                continue;
            }
            let recomputed = entry.record.recompute_hash();
            error!(
                "[af-01] Integrity violation: stored {} recomputes to {}",
                id, recomputed
            );
            reports.push(TamperReport {
                id: *id,
                recomputed,
            });
        }
        for report in &reports {
            self.tampered.insert(report.id);
        }
        reports
    }

    /// Oldest record the policy allows to evict.
    ///
    /// `PruneAncestors` prefers referenced records and falls back to tips.
    fn find_victim(&self, exclude: &[TxId], older_than: Option<f64>) -> Option<TxId> {
        match self.config.policy {
            RetentionPolicy::Strict => {
                self.oldest_eligible(self.tips.values(), exclude, older_than)
            }
            RetentionPolicy::PruneAncestors => {
                let referenced = self
                    .order
                    .iter()
                    .filter(|(seq, _)| !self.tips.contains_key(seq))
                    .map(|(_, id)| id);
                self.oldest_eligible(referenced, exclude, older_than)
                    .or_else(|| self.oldest_eligible(self.tips.values(), exclude, older_than))
            }
        }
    }

    /// First id of `candidates` (oldest first) that is not excluded and,
    /// when `older_than` is set, carries an older timestamp.
    fn oldest_eligible<'a>(
        &self,
        mut candidates: impl Iterator<Item = &'a TxId>,
        exclude: &[TxId],
        older_than: Option<f64>,
    ) -> Option<TxId> {
        candidates
            .find(|id| {
                if exclude.contains(*id) {
                    return false;
                }
                match (older_than, self.entries.get(*id)) {
                    (Some(cutoff), Some(entry)) => entry.record.timestamp() < cutoff,
                    (None, Some(_)) => true,
                    (_, None) => false,
                }
            })
            .copied()
    }

    fn evict(&mut self, id: &TxId) {
        let Some(entry) = self.entries.remove(id) else {
            return;
        };
        self.order.remove(&entry.seq);
        self.tips.remove(&entry.seq);
        self.tampered.remove(id);

        for parent in entry.record.parent_hashes() {
            if let Some(parent_entry) = self.entries.get_mut(parent) {
                parent_entry.children -= 1;
                if parent_entry.children == 0 {
                    self.tips.insert(parent_entry.seq, *parent);
                }
            } else if let Some(refs) = self.pruned.get_mut(parent) {
                *refs -= 1;
                if *refs == 0 {
                    self.pruned.remove(parent);
                }
            }
        }

        if entry.children > 0 {
            self.pruned.insert(*id, entry.children);
        }

        debug!(
            "[af-01] Evicted {} ({} retained child(ren))",
            id.short(),
            entry.children
        );
        self.evicted_total += 1;
    }
}
