//! # Inbound Ports
//!
//! API trait defining what the Batch Validation subsystem can do.

use super::outbound::ParentResolver;
use crate::domain::BatchOutcome;
use shared_types::TransactionRecord;

/// Batch Validation API - inbound port.
pub trait BatchValidationApi: Send + Sync {
    /// Validate a batch in two ordered phases.
    ///
    /// Sets `validated` on every record passing Phase A. Never aborts early.
    fn validate(
        &self,
        records: &mut [TransactionRecord],
        resolver: &dyn ParentResolver,
    ) -> BatchOutcome;
}
