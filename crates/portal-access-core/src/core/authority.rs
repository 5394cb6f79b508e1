// crates/portal-access-core/src/core/authority.rs
// ============================================================================
// Module: Authority Codec
// Description: Stored-form encoding and classification of authority targets.
// Purpose: Keep the `cbioportal:` prefix and upper-casing rules in one place.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The portal stores every grant as `cbioportal:<TARGET>` with the target
//! upper-cased. In memory the prefix is stripped. A target is the `ALL`
//! sentinel, a study identifier, or a group name; telling study from group
//! requires the study catalog, so classification lives in
//! [`crate::runtime::classify_target`] and only the resulting kind is defined
//! here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix carried by every stored authority string.
pub const AUTHORITY_PREFIX: &str = "cbioportal:";
/// Reserved target granting access to every study.
pub const ALL_TARGET: &str = "ALL";

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Encodes a bare target into its stored authority form.
#[must_use]
pub fn encode_authority(target: &str) -> String {
    format!("{AUTHORITY_PREFIX}{}", target.to_uppercase())
}

/// Decodes a stored authority string into its bare target.
///
/// The prefix is optional; the remainder keeps its case.
#[must_use]
pub fn decode_authority(stored: &str) -> &str {
    stored.strip_prefix(AUTHORITY_PREFIX).unwrap_or(stored)
}

/// Returns true when the target is the `ALL` sentinel.
#[must_use]
pub fn is_all_target(target: &str) -> bool {
    target.eq_ignore_ascii_case(ALL_TARGET)
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// What an authority target refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityKind {
    /// The `ALL` sentinel.
    All,
    /// A known study identifier.
    Study,
    /// Anything else; group existence is not verified.
    Group,
}

impl AuthorityKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "special",
            Self::Study => "study",
            Self::Group => "group",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
