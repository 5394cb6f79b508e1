// crates/portal-access-core/src/core/records.rs
// ============================================================================
// Module: Portal Access Records
// Description: Typed records for users, studies, groups, and authorities.
// Purpose: Replace column-dictionary row mapping with explicit structs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Records are constructed by stores from typed query results. Study group
//! memberships arrive as a `;`-delimited column and are parsed once here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::authority::decode_authority;
use crate::core::identifiers::Email;
use crate::core::identifiers::GroupName;
use crate::core::identifiers::StudyId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Delimiter used by the portal's `cancer_study.groups` column.
pub const GROUP_FIELD_DELIMITER: char = ';';

// ============================================================================
// SECTION: Records
// ============================================================================

/// A user account in the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Whether the account is enabled.
    pub enabled: bool,
}

impl User {
    /// Creates a new user record.
    #[must_use]
    pub fn new(email: impl Into<Email>, name: impl Into<String>, enabled: bool) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            enabled,
        }
    }
}

/// A study owned by the portal (read-only here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    /// Study identifier as stored.
    pub identifier: StudyId,
    /// Study title.
    pub name: String,
    /// Groups the study belongs to, sorted and deduplicated.
    pub groups: Vec<GroupName>,
}

impl Study {
    /// Builds a study from its raw `groups` column value.
    #[must_use]
    pub fn from_columns(
        identifier: impl Into<StudyId>,
        name: impl Into<String>,
        groups_field: &str,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            groups: parse_group_field(groups_field),
        }
    }

    /// Returns the `groups` column value for this study.
    #[must_use]
    pub fn groups_field(&self) -> String {
        self.groups.iter().map(GroupName::as_str).collect::<Vec<_>>().join(";")
    }
}

/// A group derived from study memberships.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Group {
    /// Group name.
    pub name: GroupName,
}

impl Group {
    /// Creates a group record.
    #[must_use]
    pub fn new(name: impl Into<GroupName>) -> Self {
        Self {
            name: name.into(),
        }
    }
}

/// A single authority grant with the stored prefix removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Authority {
    /// Decoded target (`ALL`, a study identifier, or a group name).
    pub target: String,
    /// Email of the grantee.
    pub email: Email,
}

impl Authority {
    /// Builds an authority from a stored row, decoding the target.
    #[must_use]
    pub fn from_stored(stored: &str, email: impl Into<Email>) -> Self {
        Self {
            target: decode_authority(stored).to_string(),
            email: email.into(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a `;`-delimited group column into sorted, distinct group names.
///
/// Entries are trimmed and empty entries dropped, so an empty column yields no
/// groups.
#[must_use]
pub fn parse_group_field(field: &str) -> Vec<GroupName> {
    field
        .split(GROUP_FIELD_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(GroupName::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
