//! # Batch Report
//!
//! Per-record account of one pipeline run: validation outcome, shard
//! assignment and what the ledger did with the record.

use super::decoder::DecodeFailure;
use af_02_batch_validation::TopologyStatus;
use af_03_shard_routing::ShardId;
use shared_types::{StructuralFailure, TxId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What happened to a record at commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertionStatus {
    /// Stored in the ledger.
    Inserted,
    /// Already retained.
    Duplicate,
    /// Ledger full and nothing evictable.
    CapacityExceeded,
    /// Failed structural or topology validation, or the ledger refused it.
    Rejected,
    /// Passed both phases but the acceptance policy withheld the batch.
    NotAdmitted,
}

/// Outcome for one record of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordReport {
    /// Position in the submitted batch.
    pub index: usize,
    /// Input line (text batches) or draft position (draft batches).
    pub line: Option<usize>,
    /// Record id.
    pub id: TxId,
    /// Phase A result.
    pub structural: Result<(), StructuralFailure>,
    /// Phase B result.
    pub topology: TopologyStatus,
    /// Assigned shard, for admitted records.
    pub shard: Option<ShardId>,
    /// Commit result.
    pub insertion: InsertionStatus,
}

/// Aggregate report for one batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchReport {
    /// Per-record reports in batch order.
    pub records: Vec<RecordReport>,
    /// Input lines that could not be decoded.
    pub decode_failures: Vec<DecodeFailure>,
    /// Drafts that could not be built into records.
    pub construction_failures: Vec<DecodeFailure>,
    /// Records that passed Phase A.
    pub structural_pass_count: usize,
    /// Records that passed both phases.
    pub topology_pass_count: usize,
    /// Ids evicted by the bounded-memory policy after commit.
    pub evicted: Vec<TxId>,
}

impl BatchReport {
    /// Records in the batch (after decoding).
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Strict structural signal for the batch.
    pub fn all_valid(&self) -> bool {
        self.structural_pass_count == self.total()
    }

    /// Number of records with `status`.
    pub fn count(&self, status: InsertionStatus) -> usize {
        self.records
            .iter()
            .filter(|r| r.insertion == status)
            .count()
    }

    /// Number of inserted records.
    pub fn inserted_count(&self) -> usize {
        self.count(InsertionStatus::Inserted)
    }

    /// Inserted record counts per shard.
    pub fn per_shard(&self) -> BTreeMap<ShardId, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            if let (InsertionStatus::Inserted, Some(shard)) = (record.insertion, record.shard) {
                *counts.entry(shard).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Cooperative cancellation checked before commit.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
