//! # Domain Entities
//!
//! Configuration and status types for the DAG Ledger.

use serde::{Deserialize, Serialize};
use shared_types::TxId;

/// Default maximum retained records.
pub const DEFAULT_MAX_RECORDS: usize = 1_000_000;

/// Which records may be evicted when the ledger is over its bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Evict only records no retained record references (tips), oldest
    /// first. Never creates a dangling parent link.
    #[default]
    Strict,
    /// Evict the oldest referenced (non-tip) records and remember their ids
    /// as pruned ancestors.
    PruneAncestors,
}

/// Ledger configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Maximum retained records.
    pub max_records: usize,
    /// Optional age bound in seconds, measured against the newest retained
    /// record timestamp.
    pub retention_window_secs: Option<f64>,
    /// Eviction policy.
    pub policy: RetentionPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            retention_window_secs: None,
            policy: RetentionPolicy::Strict,
        }
    }
}

impl LedgerConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_records: 16,
            retention_window_secs: None,
            policy: RetentionPolicy::Strict,
        }
    }

    /// Same config with a different policy.
    pub fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// How the ledger knows (or does not know) an id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AncestorStatus {
    /// Record is retained.
    Retained,
    /// Record was pruned but retained records still reference it.
    Pruned,
    /// Never seen, or no longer referenced by anything retained.
    Unknown,
}

impl AncestorStatus {
    /// Retained or pruned: a parent link to this id is not dangling.
    pub fn is_resolvable(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Trust status of a retained record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrustStatus {
    /// Hash still matches content.
    Trusted,
    /// An audit found the stored hash no longer matches content.
    Tampered,
}

/// Tampering report handed to the audit collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TamperReport {
    /// Stored id of the record.
    pub id: TxId,
    /// Hash recomputed from the record's current fields.
    pub recomputed: TxId,
}

/// Ledger counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Records currently retained.
    pub retained: usize,
    /// Current tip count.
    pub tips: usize,
    /// Pruned ancestors still referenced.
    pub pruned: usize,
    /// Records evicted since creation.
    pub evicted_total: u64,
    /// Records inserted since creation.
    pub inserted_total: u64,
}
