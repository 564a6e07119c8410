//! # Integrity Validator
//!
//! Pure checks over a single record. No side effects except in
//! [`validate_structure`], which sets the monotonic `validated` flag.

use crate::entities::TransactionRecord;
use crate::errors::StructuralFailure;

/// Recompute the hash from the current fields and compare to the stored one.
pub fn verify_integrity(record: &TransactionRecord) -> bool {
    record.recompute_hash() == record.hash
}

/// First structural failure of a record, if any.
///
/// Comparisons are written so that NaN fails.
pub fn check_structure(record: &TransactionRecord) -> Result<(), StructuralFailure> {
    if !(record.amount > 0.0) {
        return Err(StructuralFailure::NonPositiveAmount);
    }
    if !(record.timestamp > 0.0) {
        return Err(StructuralFailure::NonPositiveTimestamp);
    }
    if !verify_integrity(record) {
        return Err(StructuralFailure::HashMismatch);
    }
    Ok(())
}

/// `amount > 0 && timestamp > 0 && verify_integrity(record)`.
pub fn is_structurally_valid(record: &TransactionRecord) -> bool {
    check_structure(record).is_ok()
}

/// Run the structural check and mark the record validated on success.
///
/// A record that fails keeps whatever flag it had; the flag is never reset.
pub fn validate_structure(record: &mut TransactionRecord) -> Result<(), StructuralFailure> {
    check_structure(record)?;
    record.mark_validated();
    Ok(())
}
