// crates/portal-access-core/src/runtime/bulk.rs
// ============================================================================
// Module: Bulk Export/Import
// Description: Serialize and restore the user registry and authority ledger.
// Purpose: Move every user and grant between portal databases as one document.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Export reads users and grants and renders a YAML snapshot. Import parses
//! and validates the whole document before handing it to the store, which
//! replaces both tables in one transaction. A rejected document leaves the
//! store untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::PortalSnapshot;
use crate::interfaces::PortalError;
use crate::interfaces::SnapshotStore;

// ============================================================================
// SECTION: Export/Import
// ============================================================================

/// Renders every user and grant as a snapshot document.
///
/// # Errors
///
/// Returns [`PortalError::Storage`] when a query fails.
pub fn export_all<S>(store: &S) -> Result<String, PortalError>
where
    S: SnapshotStore + ?Sized,
{
    Ok(store.export_snapshot()?.to_yaml()?)
}

/// Replaces every user and grant with the contents of `text`.
///
/// Returns the number of users and grants restored.
///
/// # Errors
///
/// Returns [`PortalError::InvalidInput`] when the document is malformed or
/// larger than `max_bytes`, and [`PortalError::Storage`] when the restore
/// transaction fails.
pub fn import_all<S>(store: &S, text: &str, max_bytes: usize) -> Result<(usize, usize), PortalError>
where
    S: SnapshotStore + ?Sized,
{
    let snapshot = PortalSnapshot::parse(text, max_bytes)?;
    store.restore_snapshot(&snapshot)?;
    Ok((snapshot.users.len(), snapshot.authorities.len()))
}
