//! # Outbound Ports
//!
//! The audit collaborator that receives tampering reports.

use crate::domain::TamperReport;
use parking_lot::Mutex;
use tracing::error;

/// Receives integrity violations found after insertion.
pub trait AuditSink: Send + Sync {
    /// Report a retained record whose hash no longer matches its content.
    fn report_tampering(&self, report: TamperReport);
}

/// Audit sink that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn report_tampering(&self, report: TamperReport) {
        error!(
            id = %report.id,
            recomputed = %report.recomputed,
            "[af-01] Tampered record reported to audit"
        );
    }
}

/// Audit sink that keeps every report in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    reports: Mutex<Vec<TamperReport>>,
}

impl RecordingAuditSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports received so far.
    pub fn reports(&self) -> Vec<TamperReport> {
        self.reports.lock().clone()
    }
}

impl AuditSink for RecordingAuditSink {
    fn report_tampering(&self, report: TamperReport) {
        self.reports.lock().push(report);
    }
}
