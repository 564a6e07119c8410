//! # Batch Validation Service
//!
//! Application service implementing `BatchValidationApi`.
//!
//! Validation is pure and re-entrant: no internal waits, no locks. The
//! caller provides the ledger snapshot through `ParentResolver`.

use crate::domain::{
    run_structural_phase, run_topology_phase, BatchOutcome, RecordOutcome, PARALLEL_THRESHOLD,
};
use crate::ports::inbound::BatchValidationApi;
use crate::ports::outbound::ParentResolver;
use serde::{Deserialize, Serialize};
use shared_types::TransactionRecord;
use tracing::{debug, info};

/// Validator configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchValidatorConfig {
    /// Phase A workers. `0` uses the rayon pool size.
    pub workers: usize,
    /// Batches smaller than this run Phase A on the calling thread.
    pub parallel_threshold: usize,
}

impl Default for BatchValidatorConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            parallel_threshold: PARALLEL_THRESHOLD,
        }
    }
}

impl BatchValidatorConfig {
    /// Create config for testing: always parallel, four workers.
    pub fn for_testing() -> Self {
        Self {
            workers: 4,
            parallel_threshold: 1,
        }
    }
}

/// Two-phase batch validator.
#[derive(Clone, Debug, Default)]
pub struct BatchValidator {
    config: BatchValidatorConfig,
}

impl BatchValidator {
    /// Create a validator.
    pub fn new(config: BatchValidatorConfig) -> Self {
        Self { config }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &BatchValidatorConfig {
        &self.config
    }
}

impl BatchValidationApi for BatchValidator {
    fn validate(
        &self,
        records: &mut [TransactionRecord],
        resolver: &dyn ParentResolver,
    ) -> BatchOutcome {
        let structural = run_structural_phase(
            records,
            self.config.workers,
            self.config.parallel_threshold,
        );

        let topology = run_topology_phase(records, &structural.results, |id| {
            resolver.resolve(id)
        });

        let outcomes: Vec<RecordOutcome> = records
            .iter()
            .zip(structural.results)
            .zip(topology)
            .enumerate()
            .map(|(index, ((record, structural), topology))| RecordOutcome {
                index,
                id: record.id(),
                structural,
                topology,
            })
            .collect();

        let topology_pass_count = outcomes.iter().filter(|o| o.is_accepted()).count();

        for rejected in outcomes.iter().filter(|o| !o.is_accepted()) {
            debug!(
                "[af-02] Record #{} ({}) rejected: structural={:?} topology={:?}",
                rejected.index,
                rejected.id.short(),
                rejected.structural,
                rejected.topology
            );
        }

        info!(
            "[af-02] Validated batch of {}: {} structural, {} accepted",
            outcomes.len(),
            structural.pass_count,
            topology_pass_count
        );

        BatchOutcome {
            records: outcomes,
            structural_pass_count: structural.pass_count,
            topology_pass_count,
        }
    }
}
