//! # Domain Invariants
//!
//! Checks that must hold for every reachable ledger state. Used by tests and
//! by callers that want to assert ledger health after bulk operations.

use super::entities::AncestorStatus;
use super::errors::LedgerError;
use super::ledger::DagLedger;
use std::collections::HashMap;

/// Every parent of a retained record is retained or pruned.
pub fn invariant_referential_integrity(ledger: &DagLedger) -> Result<(), LedgerError> {
    for record in ledger.records() {
        for parent in record.parent_hashes() {
            if ledger.ancestor_status(parent) == AncestorStatus::Unknown {
                return Err(LedgerError::StateInconsistency(format!(
                    "record {} has dangling parent {}",
                    record.id(),
                    parent
                )));
            }
        }
    }
    Ok(())
}

/// Invariant: tips are exactly the retained records no retained record
/// lists as a parent.
pub fn invariant_tips_consistent(ledger: &DagLedger) -> Result<(), LedgerError> {
    let mut referenced: HashMap<_, usize> = HashMap::new();
    for record in ledger.records() {
        for parent in record.parent_hashes() {
            *referenced.entry(*parent).or_default() += 1;
        }
    }

    let tips = ledger.tips();
    for id in &tips {
        if referenced.contains_key(id) {
            return Err(LedgerError::StateInconsistency(format!(
                "tip {} is referenced as a parent",
                id
            )));
        }
    }

    let expected = ledger
        .records()
        .filter(|r| !referenced.contains_key(&r.id()))
        .count();
    if expected != tips.len() {
        return Err(LedgerError::StateInconsistency(format!(
            "expected {} tips, found {}",
            expected,
            tips.len()
        )));
    }
    Ok(())
}

/// Every retained record is stored under the hash of its current content.
pub fn invariant_content_addressed(ledger: &DagLedger) -> Result<(), LedgerError> {
    for (key, record) in ledger.keyed_records() {
        let recomputed = record.recompute_hash();
        if *key != recomputed {
            return Err(LedgerError::StateInconsistency(format!(
                "record stored under {} hashes to {}",
                key, recomputed
            )));
        }
    }
    Ok(())
}

/// Invariant: retained count never exceeds the configured bound.
pub fn invariant_within_bound(ledger: &DagLedger) -> Result<(), LedgerError> {
    if ledger.len() > ledger.config().max_records {
        return Err(LedgerError::StateInconsistency(format!(
            "{} records retained, bound is {}",
            ledger.len(),
            ledger.config().max_records
        )));
    }
    Ok(())
}
