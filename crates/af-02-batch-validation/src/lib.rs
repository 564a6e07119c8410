//! # AF-02 Batch Validation
//!
//! Two-phase validation of transaction batches.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Phases
//!
//! | Phase | Scheduling | Checks | Effect |
//! |-------|------------|--------|--------|
//! | A - Structural | rayon, one chunk per worker | amount > 0, timestamp > 0, hash | sets `validated` |
//! | B - Topology | sequential, batch order | parents in ledger or earlier accepted siblings | none |
//!
//! ## Dual Signal
//!
//! `BatchOutcome` carries both the strict boolean (`all_valid()`) and the
//! itemized per-record outcome. The caller chooses all-or-nothing or partial
//! admission with `AcceptancePolicy`; the validator never decides.
//!
//! ```text
//! records ──Phase A──→ structural results ──Phase B (ledger snapshot)──→ BatchOutcome
//!            (parallel)                        (sequential)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    run_structural_phase, run_topology_phase, AcceptancePolicy, BatchOutcome, RecordOutcome,
    StructuralPhase, TopologyFailure, TopologyStatus, PARALLEL_THRESHOLD,
};
pub use ports::{BatchValidationApi, ParentResolver};
pub use service::{BatchValidator, BatchValidatorConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
