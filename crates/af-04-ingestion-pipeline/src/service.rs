//! # Ingestion Pipeline Service
//!
//! `decode -> construct -> validate -> route -> commit`
//!
//! One batch at a time holds the ledger's upgradable guard: validation reads
//! a stable snapshot, routing happens, the cancellation flag is checked, and
//! only then is the guard upgraded to commit. A cancelled or failed batch
//! leaves the ledger unchanged.

use crate::adapters::WriteBehind;
use crate::domain::{
    decode_json_batch, BatchReport, CancellationFlag, DecodeFailure, InsertionStatus,
    PipelineError, RecordReport, TransactionDraft,
};
use crate::ports::inbound::IngestionApi;
use af_01_dag_ledger::{AuditSink, DagLedger, LedgerError, SharedLedger};
use af_02_batch_validation::{AcceptancePolicy, BatchValidationApi, BatchValidator};
use af_03_shard_routing::{ShardId, ShardRouter, ShardRoutingApi, DEFAULT_PROBE};
use parking_lot::RwLockUpgradableReadGuard;
use serde::{Deserialize, Serialize};
use shared_types::TransactionRecord;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// All-or-nothing or partial admission.
    pub acceptance: AcceptancePolicy,
    /// Route by least-loaded neighbor instead of the plain ring owner.
    pub load_aware: bool,
    /// Ring points probed when `load_aware` is set.
    pub probe: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            acceptance: AcceptancePolicy::Partial,
            load_aware: false,
            probe: DEFAULT_PROBE,
        }
    }
}

impl PipelineConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

/// Transaction ingestion pipeline.
pub struct IngestionPipeline {
    config: PipelineConfig,
    ledger: SharedLedger,
    validator: BatchValidator,
    router: Arc<ShardRouter>,
    write_behind: Option<WriteBehind>,
}

impl IngestionPipeline {
    /// Assemble a pipeline.
    pub fn new(
        config: PipelineConfig,
        ledger: SharedLedger,
        validator: BatchValidator,
        router: Arc<ShardRouter>,
    ) -> Self {
        Self {
            config,
            ledger,
            validator,
            router,
            write_behind: None,
        }
    }

    /// Forward inserted records to a write-behind queue.
    pub fn with_write_behind(mut self, write_behind: WriteBehind) -> Self {
        self.write_behind = Some(write_behind);
        self
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ledger handle.
    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Shard router.
    pub fn router(&self) -> &Arc<ShardRouter> {
        &self.router
    }

    /// Re-verify the ledger and forward tampering reports to `sink`.
    pub fn audit(&self, sink: &dyn AuditSink) -> usize {
        self.ledger.audit(sink)
    }

    fn route(&self, key: &[u8]) -> Result<ShardId, PipelineError> {
        let shard = if self.config.load_aware {
            self.router.route_load_aware(key, self.config.probe)?
        } else {
            self.router.route(key)?
        };
        Ok(shard)
    }

    fn process(
        &self,
        mut records: Vec<TransactionRecord>,
        lines: Option<Vec<usize>>,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError> {
        let guard = self.ledger.begin_batch();
        let outcome = self.validator.validate(&mut records, &*guard);
        let admitted: HashSet<usize> = outcome
            .admitted_indices(self.config.acceptance)
            .into_iter()
            .collect();

        let mut shards: Vec<Option<ShardId>> = vec![None; records.len()];
        for &index in &admitted {
            shards[index] = Some(self.route(records[index].sender().as_bytes())?);
        }

        if cancel.is_cancelled() {
            info!(
                "[af-04] Batch of {} cancelled before commit",
                records.len()
            );
            return Err(PipelineError::Cancelled);
        }

        let started = Instant::now();
        let mut ledger = RwLockUpgradableReadGuard::upgrade(guard);

        let mut insertions: Vec<InsertionStatus> = outcome
            .records
            .iter()
            .map(|result| {
                if result.is_accepted() {
                    InsertionStatus::NotAdmitted
                } else {
                    InsertionStatus::Rejected
                }
            })
            .collect();
        let staged: Vec<(usize, ShardId, TransactionRecord)> = records
            .into_iter()
            .zip(&shards)
            .enumerate()
            .filter_map(|(index, (record, shard))| shard.map(|shard| (index, shard, record)))
            .collect();

        let committed = match self.config.acceptance {
            AcceptancePolicy::Partial => self.commit_each(&mut ledger, staged, &mut insertions),
            AcceptancePolicy::Strict => self.commit_all(&mut ledger, staged, &mut insertions),
        };

        let reports: Vec<RecordReport> = outcome
            .records
            .iter()
            .zip(shards)
            .zip(insertions)
            .map(|((result, shard), insertion)| RecordReport {
                index: result.index,
                line: lines.as_ref().and_then(|l| l.get(result.index).copied()),
                id: result.id,
                structural: result.structural,
                topology: result.topology,
                shard,
                insertion,
            })
            .collect();

        let evicted = ledger.evict_if_over_bound();
        drop(ledger);

        let report = BatchReport {
            records: reports,
            decode_failures: Vec::new(),
            construction_failures: Vec::new(),
            structural_pass_count: outcome.structural_pass_count,
            topology_pass_count: outcome.topology_pass_count,
            evicted,
        };

        self.record_shard_load(&report.per_shard(), started);
        self.persist(committed);

        info!(
            "[af-04] Batch committed: {} records, {} valid, {} accepted, {} inserted, {} evicted",
            report.total(),
            report.structural_pass_count,
            report.topology_pass_count,
            report.inserted_count(),
            report.evicted.len()
        );
        Ok(report)
    }

    /// Insert staged records one by one; each refusal only affects its record.
    fn commit_each(
        &self,
        ledger: &mut DagLedger,
        staged: Vec<(usize, ShardId, TransactionRecord)>,
        insertions: &mut [InsertionStatus],
    ) -> Vec<(ShardId, TransactionRecord)> {
        let mut committed = Vec::new();
        for (index, shard, record) in staged {
            let copy = self.write_behind.as_ref().map(|_| record.clone());
            insertions[index] = match ledger.insert(record) {
                Ok(()) => {
                    if let Some(copy) = copy {
                        committed.push((shard, copy));
                    }
                    InsertionStatus::Inserted
                }
                Err(e) => refusal_status(index, &e),
            };
        }
        committed
    }

    /// Insert all staged records or none. A refusal leaves the ledger
    /// unchanged and every other staged record `NotAdmitted`.
    fn commit_all(
        &self,
        ledger: &mut DagLedger,
        staged: Vec<(usize, ShardId, TransactionRecord)>,
        insertions: &mut [InsertionStatus],
    ) -> Vec<(ShardId, TransactionRecord)> {
        let mut placements = Vec::with_capacity(staged.len());
        let mut batch = Vec::with_capacity(staged.len());
        for (index, shard, record) in staged {
            placements.push((index, shard));
            batch.push(record);
        }
        let copies = self.write_behind.as_ref().map(|_| batch.clone());

        match ledger.insert_all(batch) {
            Ok(inserted) => {
                for (&(index, _), &new) in placements.iter().zip(&inserted) {
                    insertions[index] = if new {
                        InsertionStatus::Inserted
                    } else {
                        InsertionStatus::Duplicate
                    };
                }
                copies
                    .unwrap_or_default()
                    .into_iter()
                    .zip(placements.iter().zip(inserted))
                    .filter(|(_, (_, new))| *new)
                    .map(|(record, (&(_, shard), _))| (shard, record))
                    .collect()
            }
            Err((position, e)) => {
                if let Some(&(index, _)) = placements.get(position) {
                    warn!(
                        "[af-04] Batch withheld: record #{} refused by ledger: {}",
                        index, e
                    );
                    insertions[index] = refusal_status(index, &e);
                }
                Vec::new()
            }
        }
    }

    /// Fold the commit latency into each shard's load, per inserted item.
    fn record_shard_load(&self, per_shard: &BTreeMap<ShardId, usize>, started: Instant) {
        let inserted: usize = per_shard.values().sum();
        if inserted == 0 {
            return;
        }
        let per_item_ms = started.elapsed().as_secs_f64() * 1_000.0 / inserted as f64;
        for (&shard, &count) in per_shard {
            if let Err(e) = self
                .router
                .record_load(shard, per_item_ms * count as f64, count)
            {
                debug!("[af-04] Skipped load sample for shard {}: {}", shard, e);
            }
        }
    }

    fn persist(&self, committed: Vec<(ShardId, TransactionRecord)>) {
        let Some(queue) = &self.write_behind else {
            return;
        };
        for (shard, record) in committed {
            if let Err(e) = queue.enqueue(shard, record) {
                warn!("[af-04] Write-behind unavailable: {}", e);
                return;
            }
        }
    }

    fn build_records(
        drafts: impl IntoIterator<Item = (Option<usize>, TransactionDraft)>,
    ) -> (Vec<TransactionRecord>, Vec<usize>, Vec<DecodeFailure>) {
        let mut records = Vec::new();
        let mut lines = Vec::new();
        let mut failures = Vec::new();

        for (position, (line, draft)) in drafts.into_iter().enumerate() {
            let line = line.unwrap_or(position);
            match draft.into_record() {
                Ok(record) => {
                    records.push(record);
                    lines.push(line);
                }
                Err(e) => {
                    debug!("[af-04] Could not build record from line {}: {}", line, e);
                    failures.push(DecodeFailure {
                        line,
                        reason: e.to_string(),
                    });
                }
            }
        }

        (records, lines, failures)
    }
}

fn refusal_status(index: usize, error: &LedgerError) -> InsertionStatus {
    match error {
        LedgerError::Duplicate(_) => InsertionStatus::Duplicate,
        LedgerError::CapacityExceeded { .. } => InsertionStatus::CapacityExceeded,
        e => {
            warn!("[af-04] Ledger refused record #{}: {}", index, e);
            InsertionStatus::Rejected
        }
    }
}

impl IngestionApi for IngestionPipeline {
    fn ingest_lines(
        &self,
        lines: &[String],
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError> {
        let decoded = decode_json_batch(lines);
        if !decoded.failures.is_empty() || decoded.skipped > 0 {
            debug!(
                "[af-04] Decoded {} of {} lines ({} malformed, {} skipped)",
                decoded.drafts.len(),
                lines.len(),
                decoded.failures.len(),
                decoded.skipped
            );
        }

        let (records, line_numbers, construction_failures) = Self::build_records(
            decoded
                .drafts
                .into_iter()
                .map(|(line, draft)| (Some(line), draft)),
        );

        let mut report = self.process(records, Some(line_numbers), cancel)?;
        report.decode_failures = decoded.failures;
        report.construction_failures = construction_failures;
        Ok(report)
    }

    fn ingest_drafts(
        &self,
        drafts: Vec<TransactionDraft>,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError> {
        let (records, positions, construction_failures) =
            Self::build_records(drafts.into_iter().map(|draft| (None, draft)));

        let mut report = self.process(records, Some(positions), cancel)?;
        report.construction_failures = construction_failures;
        Ok(report)
    }

    fn submit(
        &self,
        records: Vec<TransactionRecord>,
        cancel: &CancellationFlag,
    ) -> Result<BatchReport, PipelineError> {
        self.process(records, None, cancel)
    }
}
