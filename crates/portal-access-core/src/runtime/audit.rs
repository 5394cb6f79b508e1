// crates/portal-access-core/src/runtime/audit.rs
// ============================================================================
// Module: Access Audit Logging
// Description: Structured audit events for registry and ledger mutations.
// Purpose: Emit JSON-line audit records without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every mutation performed through [`crate::AccessAdmin`] produces one
//! [`AccessAuditEvent`]. Sinks serialize events as JSON lines so deployments
//! can route them to whatever pipeline they run. Events carry emails and
//! authority targets only; display names are never logged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Mutation recorded by an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// User account created.
    UserCreated,
    /// User account updated.
    UserUpdated,
    /// User account and grants deleted.
    UserDeleted,
    /// A user's grants replaced.
    UserAuthoritiesReplaced,
    /// A study's grantees replaced.
    StudyUsersReplaced,
    /// A group's grantees replaced.
    GroupUsersReplaced,
    /// Registry and ledger exported.
    SnapshotExported,
    /// Registry and ledger replaced from a snapshot.
    SnapshotImported,
}

/// Mutation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The mutation was applied.
    Ok,
    /// The mutation was rejected or failed; nothing was applied.
    Error,
}

/// Access audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct AccessAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Mutation performed.
    pub action: AuditAction,
    /// Email, study identifier, or group name the mutation was keyed by.
    pub subject: Option<String>,
    /// Targets or emails supplied with the mutation.
    pub targets: Vec<String>,
    /// Mutation outcome.
    pub outcome: AuditOutcome,
    /// Error kind label when the mutation failed.
    pub error_kind: Option<&'static str>,
}

impl AccessAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(action: AuditAction, subject: Option<String>, targets: Vec<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "access_audit",
            timestamp_ms,
            action,
            subject,
            targets,
            outcome: AuditOutcome::Ok,
            error_kind: None,
        }
    }

    /// Marks the event as failed with the given error kind.
    #[must_use]
    pub const fn failed(mut self, error_kind: &'static str) -> Self {
        self.outcome = AuditOutcome::Error;
        self.error_kind = Some(error_kind);
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for access mutations.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AccessAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, event: &AccessAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AccessAuditEvent) {}
}
