// crates/portal-access-core/src/lib.rs
// ============================================================================
// Module: Portal Access Core Library
// Description: Public API surface for the portal access data layer.
// Purpose: Expose the access model, store interfaces, and admin runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Portal access core models the users, studies, groups, and authority grants
//! stored in a portal database it does not own. It is backend-agnostic: stores
//! implement the interfaces in [`interfaces`], and presentation layers talk to
//! the [`AccessAdmin`] service rather than to stores directly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AuthorityLedger;
pub use interfaces::PortalError;
pub use interfaces::PortalStore;
pub use interfaces::SnapshotStore;
pub use interfaces::StudyCatalog;
pub use interfaces::UserRegistry;
pub use runtime::AccessAdmin;
pub use runtime::AccessAuditEvent;
pub use runtime::AuditAction;
pub use runtime::AuditOutcome;
pub use runtime::AuditSink;
pub use runtime::AuthorityChoice;
pub use runtime::ClassifiedAuthority;
pub use runtime::Dashboard;
pub use runtime::FileAuditSink;
pub use runtime::GroupAccess;
pub use runtime::GroupUsers;
pub use runtime::InMemoryPortalStore;
pub use runtime::NoopAuditSink;
pub use runtime::StderrAuditSink;
pub use runtime::StudyAccess;
pub use runtime::UserAccess;
pub use runtime::classify_target;
pub use runtime::export_all;
pub use runtime::import_all;
