// crates/portal-access-core/src/runtime/mod.rs
// ============================================================================
// Module: Portal Access Runtime
// Description: Admin service, classification, bulk transfer, and audit sinks.
// Purpose: Provide the consumer-facing layer over any portal store.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime code sits between presentation callers and stores. It holds no
//! state of its own beyond a store handle and an audit sink.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admin;
pub mod audit;
pub mod bulk;
pub mod classify;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admin::AccessAdmin;
pub use admin::AuthorityChoice;
pub use admin::ClassifiedAuthority;
pub use admin::Dashboard;
pub use admin::GroupAccess;
pub use admin::GroupUsers;
pub use admin::StudyAccess;
pub use admin::UserAccess;
pub use audit::AccessAuditEvent;
pub use audit::AuditAction;
pub use audit::AuditOutcome;
pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use bulk::export_all;
pub use bulk::import_all;
pub use classify::classify_target;
pub use store::InMemoryPortalStore;
