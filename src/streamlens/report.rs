//! Run report
//!
//! Append-only accumulator of counters, warnings and failures for one run.
//! The driver is the single writer; resolution logic never reads it. The
//! report is an explicit value returned to the caller rather than ambient
//! global state.

use serde::Serialize;

/// One warning or failure entry, keyed by the topic or subsystem it
/// concerns
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub key: String,
    pub reason: String,
}

/// Process-scoped report for a single extraction run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionReport {
    /// Topics returned by broker discovery
    pub topics_discovered: usize,
    /// Topics dropped by the inclusion rules
    pub topics_filtered: usize,
    /// Records pushed to the output stream (snapshots plus subtype records)
    pub records_emitted: usize,
    /// Non-fatal conditions encountered during the run
    pub warnings: Vec<ReportEntry>,
    /// Conditions that degraded the run more severely but did not abort it
    pub failures: Vec<ReportEntry>,
}

impl IngestionReport {
    /// Record a non-fatal warning
    pub fn warn(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        let entry = ReportEntry {
            key: key.into(),
            reason: reason.into(),
        };
        log::warn!("{}: {}", entry.key, entry.reason);
        self.warnings.push(entry);
    }

    /// Record a degraded-but-not-fatal failure
    pub fn fail(&mut self, key: impl Into<String>, reason: impl Into<String>) {
        let entry = ReportEntry {
            key: key.into(),
            reason: reason.into(),
        };
        log::error!("{}: {}", entry.key, entry.reason);
        self.failures.push(entry);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
