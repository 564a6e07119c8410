//! # Phase B - Topology Validation
//!
//! Sequential pass, in batch order, over records that passed Phase A.
//!
//! A parent resolves when it is:
//! - retained by the ledger,
//! - a pruned ledger ancestor (counted as an unknown ancestor), or
//! - an EARLIER sibling in the same batch that passed both phases.
//!
//! Later siblings never resolve a parent, even when they are valid.

use super::errors::TopologyFailure;
use super::outcome::TopologyStatus;
use af_01_dag_ledger::AncestorStatus;
use shared_types::{StructuralFailure, TransactionRecord, TxId};
use std::collections::{HashMap, HashSet};

/// Run Phase B.
///
/// `resolve` must answer from one stable ledger snapshot for the whole call.
pub fn run_topology_phase(
    records: &[TransactionRecord],
    structural: &[Result<(), StructuralFailure>],
    resolve: impl Fn(&TxId) -> AncestorStatus,
) -> Vec<TopologyStatus> {
    // First position of every id in the batch, for diagnostics.
    let mut positions: HashMap<TxId, usize> = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        positions.entry(record.id()).or_insert(index);
    }

    let mut accepted: HashSet<TxId> = HashSet::with_capacity(records.len());
    let mut statuses = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if structural.get(index).map_or(true, |r| r.is_err()) {
            statuses.push(TopologyStatus::Skipped);
            continue;
        }

        let status = check_parents(record, index, &accepted, &positions, structural, &resolve);
        if status.is_resolved() {
            accepted.insert(record.id());
        }
        statuses.push(status);
    }

    statuses
}

fn check_parents(
    record: &TransactionRecord,
    index: usize,
    accepted: &HashSet<TxId>,
    positions: &HashMap<TxId, usize>,
    structural: &[Result<(), StructuralFailure>],
    resolve: &impl Fn(&TxId) -> AncestorStatus,
) -> TopologyStatus {
    let mut unknown_ancestors = 0;

    for parent in record.parent_hashes() {
        if *parent == record.id() {
            return TopologyStatus::Failed(TopologyFailure::SelfReference);
        }
        if accepted.contains(parent) {
            continue;
        }
        match resolve(parent) {
            AncestorStatus::Retained => continue,
            AncestorStatus::Pruned => {
                unknown_ancestors += 1;
                continue;
            }
            AncestorStatus::Unknown => {}
        }

        let failure = match positions.get(parent) {
            Some(&position) if position > index => TopologyFailure::ForwardReference {
                parent: *parent,
                position,
            },
            Some(&position) if structural.get(position).map_or(true, |r| r.is_err()) => {
                TopologyFailure::ParentStructurallyInvalid(*parent)
            }
            Some(_) => TopologyFailure::ParentRejected(*parent),
            None => TopologyFailure::UnresolvedParent(*parent),
        };
        return TopologyStatus::Failed(failure);
    }

    TopologyStatus::Resolved { unknown_ancestors }
}
