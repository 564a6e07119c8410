//! # Ports Module
//!
//! - `inbound`: read-only view exposed to downstream consumers
//! - `outbound`: audit collaborator

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerReader;
pub use outbound::{AuditSink, RecordingAuditSink, TracingAuditSink};
