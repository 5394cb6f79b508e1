// crates/portal-access-core/src/core/transfer.rs
// ============================================================================
// Module: Bulk Transfer Documents
// Description: YAML snapshot of the user registry and authority ledger.
// Purpose: Define the export/import document and its validation rules.
// Dependencies: serde, serde_yaml, thiserror, time
// ============================================================================

//! ## Overview
//! A snapshot document has two sequences, `users` and `authorities`, plus a
//! `version` key. Documents written before versioning existed omit `version`,
//! quote scalars with single quotes, and record `enabled` as `0`/`1`; all of
//! that still parses. Authority strings travel in their stored (prefixed) form;
//! imported ones are re-encoded, so a bare or lower-case target is stored the
//! same way the ledger writes it.
//!
//! ```yaml
//! version: 1
//! users:
//! - email: alice@example.org
//!   name: Alice
//!   enabled: 1
//! authorities:
//! - email: alice@example.org
//!   authority: cbioportal:ALL
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::authority::decode_authority;
use crate::core::authority::encode_authority;
use crate::core::identifiers::Email;
use crate::core::records::Authority;
use crate::core::records::User;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Current snapshot document version.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;
/// Fixed suffix of exported snapshot filenames.
pub const EXPORT_FILENAME_SUFFIX: &str = "cbioportal_users.yaml";
/// Default maximum size of an imported snapshot document.
pub const DEFAULT_MAX_SNAPSHOT_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Snapshot parsing and validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Document is not valid YAML or does not match the document shape.
    #[error("snapshot parse error: {0}")]
    Parse(String),
    /// Document parsed but violates a snapshot rule.
    #[error("snapshot invalid: {0}")]
    Invalid(String),
    /// Document exceeds the configured size limit.
    #[error("snapshot too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual document size in bytes.
        actual_bytes: usize,
    },
    /// Snapshot could not be rendered.
    #[error("snapshot serialization error: {0}")]
    Serialize(String),
}

// ============================================================================
// SECTION: Document Types
// ============================================================================

/// Full registry and ledger contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalSnapshot {
    /// Document version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Every user account.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<SnapshotUser>,
    /// Every authority grant.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub authorities: Vec<SnapshotAuthority>,
}

/// User entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotUser {
    /// Unique email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Enabled flag, written as `0`/`1`.
    #[serde(serialize_with = "serialize_flag", deserialize_with = "deserialize_flag")]
    pub enabled: bool,
}

/// Authority entry in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotAuthority {
    /// Email of the grantee.
    pub email: Email,
    /// Stored authority string, including the prefix.
    pub authority: String,
}

impl PortalSnapshot {
    /// Builds a snapshot from registry and ledger records.
    #[must_use]
    pub fn from_records(users: Vec<User>, authorities: Vec<Authority>) -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION,
            users: users
                .into_iter()
                .map(|user| SnapshotUser {
                    email: user.email,
                    name: user.name,
                    enabled: user.enabled,
                })
                .collect(),
            authorities: authorities
                .into_iter()
                .map(|authority| SnapshotAuthority {
                    authority: encode_authority(&authority.target),
                    email: authority.email,
                })
                .collect(),
        }
    }

    /// Parses and validates a snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError`] when the document is too large, malformed, or
    /// violates a snapshot rule.
    pub fn parse(text: &str, max_bytes: usize) -> Result<Self, SnapshotError> {
        if text.len() > max_bytes {
            return Err(SnapshotError::TooLarge {
                max_bytes,
                actual_bytes: text.len(),
            });
        }
        if text.trim().is_empty() {
            return Err(SnapshotError::Invalid("document is empty".to_string()));
        }
        let mut snapshot: Self =
            serde_yaml::from_str(text).map_err(|err| SnapshotError::Parse(err.to_string()))?;
        snapshot.normalize()?;
        Ok(snapshot)
    }

    /// Renders the snapshot as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Serialize`] when rendering fails.
    pub fn to_yaml(&self) -> Result<String, SnapshotError> {
        serde_yaml::to_string(self).map_err(|err| SnapshotError::Serialize(err.to_string()))
    }

    /// Returns the user records described by the snapshot.
    #[must_use]
    pub fn user_records(&self) -> Vec<User> {
        self.users
            .iter()
            .map(|user| User::new(user.email.clone(), user.name.clone(), user.enabled))
            .collect()
    }

    /// Returns the decoded authority records described by the snapshot.
    #[must_use]
    pub fn authority_records(&self) -> Vec<Authority> {
        self.authorities
            .iter()
            .map(|entry| Authority::from_stored(&entry.authority, entry.email.clone()))
            .collect()
    }

    /// Validates entries, re-encodes authorities in stored form, and drops
    /// duplicate grants.
    fn normalize(&mut self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::Invalid(format!(
                "unsupported snapshot version: {}",
                self.version
            )));
        }
        let mut emails = BTreeSet::new();
        for (index, user) in self.users.iter().enumerate() {
            if user.email.is_blank() {
                return Err(SnapshotError::Invalid(format!("users[{index}]: email is blank")));
            }
            if !emails.insert(user.email.as_str()) {
                return Err(SnapshotError::Invalid(format!(
                    "users[{index}]: duplicate email {}",
                    user.email
                )));
            }
        }
        let mut seen = BTreeSet::new();
        let mut authorities = Vec::with_capacity(self.authorities.len());
        for (index, entry) in self.authorities.iter().enumerate() {
            if entry.email.is_blank() {
                return Err(SnapshotError::Invalid(format!(
                    "authorities[{index}]: email is blank"
                )));
            }
            if decode_authority(&entry.authority).trim().is_empty() {
                return Err(SnapshotError::Invalid(format!(
                    "authorities[{index}]: authority is blank"
                )));
            }
            let normalized = SnapshotAuthority {
                email: entry.email.clone(),
                authority: encode_authority(decode_authority(&entry.authority)),
            };
            if seen.insert(normalized.clone()) {
                authorities.push(normalized);
            }
        }
        self.authorities = authorities;
        Ok(())
    }
}

/// Returns the suggested download filename for an export taken at `now`.
#[must_use]
pub fn export_filename(now: OffsetDateTime) -> String {
    export_filename_with_suffix(now, EXPORT_FILENAME_SUFFIX)
}

/// Returns an export filename built from the timestamp and `suffix`.
#[must_use]
pub fn export_filename_with_suffix(now: OffsetDateTime, suffix: &str) -> String {
    format!(
        "{:04}-{:02}-{:02}_{:02}-{:02}-{:02}_{suffix}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

// ============================================================================
// SECTION: Serde Helpers
// ============================================================================

/// Returns the version assumed for documents without a `version` key.
const fn default_version() -> u32 {
    SNAPSHOT_FORMAT_VERSION
}

/// Treats an explicit YAML null (`users:` with no items) as an empty sequence.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Writes a boolean as `0`/`1`.
fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Accepted encodings of the enabled flag.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    /// YAML boolean.
    Bool(bool),
    /// Integer `0` or `1`.
    Int(i64),
}

/// Reads a boolean written as `0`/`1` or `true`/`false`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(value) => Ok(value),
        FlagRepr::Int(0) => Ok(false),
        FlagRepr::Int(1) => Ok(true),
        FlagRepr::Int(other) => {
            Err(serde::de::Error::custom(format!("enabled must be 0 or 1, got {other}")))
        }
    }
}
