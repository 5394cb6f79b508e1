// crates/portal-access-core/src/runtime/classify.rs
// ============================================================================
// Module: Authority Classification
// Description: Resolve an authority target to study, group, or `ALL`.
// Purpose: Back the codec's classification with a live catalog lookup.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Classification consults the catalog on every call. Studies can appear in
//! the portal at any time, so results are never memoized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AuthorityKind;
use crate::core::is_all_target;
use crate::interfaces::PortalError;
use crate::interfaces::StudyCatalog;

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies an authority target.
///
/// `ALL` wins, then a case-insensitive study match; anything else is reported
/// as a group without checking the derived group set.
///
/// # Errors
///
/// Returns [`PortalError::Storage`] when the study lookup fails.
pub fn classify_target<C>(catalog: &C, target: &str) -> Result<AuthorityKind, PortalError>
where
    C: StudyCatalog + ?Sized,
{
    if is_all_target(target) {
        return Ok(AuthorityKind::All);
    }
    if catalog.study_exists(target)? {
        return Ok(AuthorityKind::Study);
    }
    Ok(AuthorityKind::Group)
}
