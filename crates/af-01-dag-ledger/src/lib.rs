//! # AF-01 DAG Ledger
//!
//! Bounded-memory store of validated transactions and their tips.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Track every validated, topology-resolved transaction as a node of a DAG
//! whose edges are parent hashes, and maintain the frontier ("tips").
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Enforcement Location |
//! |----|-----------|---------------------|
//! | CONTENT-ADDRESSED | Records keyed by their own hash | `domain/ledger.rs` - `insert()` |
//! | REFERENTIAL | No dangling parent links | `domain/ledger.rs` - `find_victim()`, `evict()` |
//! | TIPS | Tips = retained records without retained children | `domain/ledger.rs` - child counts |
//! | HASH-BINDING | Post-insertion tampering is reported | `domain/ledger.rs` - `audit()` |
//!
//! ## Retention Policies
//!
//! | Policy | Evicts | Dangling links |
//! |--------|--------|----------------|
//! | `Strict` | Oldest tips not referenced by the incoming record | Never |
//! | `PruneAncestors` | Oldest referenced records, then oldest tips | Tracked as pruned ancestors |
//!
//! ## Module Structure
//!
//! ```text
//! af-01-dag-ledger/
//! ├── domain/          # DagLedger, config, errors, invariants
//! ├── ports/           # LedgerReader (inbound), AuditSink (outbound)
//! └── adapters/        # SharedLedger (RwLock handle)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::SharedLedger;
pub use domain::{
    invariant_content_addressed, invariant_referential_integrity, invariant_tips_consistent,
    invariant_within_bound, AncestorStatus, DagLedger, LedgerConfig, LedgerError, LedgerStats,
    RetentionPolicy, TamperReport, TrustStatus, DEFAULT_MAX_RECORDS,
};
pub use ports::{AuditSink, LedgerReader, RecordingAuditSink, TracingAuditSink};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
