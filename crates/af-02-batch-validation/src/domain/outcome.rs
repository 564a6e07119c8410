//! # Batch Outcome
//!
//! Dual-signal result of validating a batch:
//!
//! - the strict all-or-nothing boolean (`all_valid()`)
//! - the itemized per-record outcome, so the caller can admit partially
//!
//! Both are always available; the caller picks via [`AcceptancePolicy`].

use super::errors::TopologyFailure;
use serde::{Deserialize, Serialize};
use shared_types::{StructuralFailure, TxId};

/// How the caller admits a validated batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptancePolicy {
    /// Admit nothing unless every record passes both phases.
    Strict,
    /// Admit every record that passes both phases.
    #[default]
    Partial,
}

/// Phase B result for one record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopologyStatus {
    /// Every parent resolved. `unknown_ancestors` counts parents that resolved
    /// to pruned ledger ancestors.
    Resolved {
        /// Parents known only as pruned ancestors
        unknown_ancestors: usize,
    },
    /// At least one parent did not resolve.
    Failed(TopologyFailure),
    /// Not checked because the record failed Phase A.
    Skipped,
}

impl TopologyStatus {
    /// True for `Resolved`.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Outcome for one record of a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordOutcome {
    /// Position in the submitted batch.
    pub index: usize,
    /// Stored record id.
    pub id: TxId,
    /// Phase A result.
    pub structural: Result<(), StructuralFailure>,
    /// Phase B result.
    pub topology: TopologyStatus,
}

impl RecordOutcome {
    /// Phase A passed.
    pub fn structural_passed(&self) -> bool {
        self.structural.is_ok()
    }

    /// Phase B passed.
    pub fn topology_passed(&self) -> bool {
        self.topology.is_resolved()
    }

    /// Both phases passed: acceptable for insertion.
    pub fn is_accepted(&self) -> bool {
        self.structural_passed() && self.topology_passed()
    }
}

/// Aggregate result for a batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutcome {
    /// Per-record outcomes in batch order.
    pub records: Vec<RecordOutcome>,
    /// Records that passed Phase A (sum of per-worker counts).
    pub structural_pass_count: usize,
    /// Records that passed Phase B.
    pub topology_pass_count: usize,
}

impl BatchOutcome {
    /// Batch size.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Strict structural signal: `structural_pass_count == total`.
    pub fn all_valid(&self) -> bool {
        self.structural_pass_count == self.total()
    }

    /// Every record passed both phases.
    pub fn all_accepted(&self) -> bool {
        self.topology_pass_count == self.total()
    }

    /// Indices of records that passed both phases.
    pub fn accepted_indices(&self) -> Vec<usize> {
        self.records
            .iter()
            .filter(|o| o.is_accepted())
            .map(|o| o.index)
            .collect()
    }

    /// Indices the caller should insert under `policy`.
    pub fn admitted_indices(&self, policy: AcceptancePolicy) -> Vec<usize> {
        match policy {
            AcceptancePolicy::Partial => self.accepted_indices(),
            AcceptancePolicy::Strict if self.all_accepted() => self.accepted_indices(),
            AcceptancePolicy::Strict => Vec::new(),
        }
    }

    /// Outcomes of records that failed either phase.
    pub fn rejected(&self) -> impl Iterator<Item = &RecordOutcome> + '_ {
        self.records.iter().filter(|o| !o.is_accepted())
    }
}
