// crates/portal-access-core/src/interfaces/mod.rs
// ============================================================================
// Module: Portal Access Interfaces
// Description: Backend-agnostic traits for the catalog, registry, and ledger.
// Purpose: Define the contract stores implement and consumers call.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Each component of the data layer is a trait so that the `SQLite` store and
//! the in-memory store are interchangeable. Every method either returns a
//! value or fails with a [`PortalError`]; stores must run multi-statement
//! mutations inside a single transaction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::Authority;
use crate::core::Email;
use crate::core::Group;
use crate::core::PortalSnapshot;
use crate::core::SnapshotError;
use crate::core::Study;
use crate::core::User;
use crate::core::encode_authority;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Data-layer errors surfaced to presentation callers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// No matching user, study, or group.
    #[error("not found: {0}")]
    NotFound(String),
    /// A create collided with an existing record.
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// Malformed import document or request data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Stored data violates a uniqueness assumption.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
    /// Connectivity or transaction failure in the underlying store.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl PortalError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::AlreadyExists(_) => "already_exists",
            Self::InvalidInput(_) => "invalid_input",
            Self::InternalInconsistency(_) => "internal_inconsistency",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<SnapshotError> for PortalError {
    fn from(error: SnapshotError) -> Self {
        match error {
            SnapshotError::Serialize(message) => Self::InternalInconsistency(message),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Study/Group Catalog
// ============================================================================

/// Read-only access to portal studies and the groups derived from them.
///
/// Study lookups ignore case. Groups are not stored; the provided methods
/// derive them from [`StudyCatalog::list_studies`] on every call.
pub trait StudyCatalog {
    /// Lists every study sorted by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn list_studies(&self) -> Result<Vec<Study>, PortalError>;

    /// Fetches a study by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when no study matches.
    fn get_study(&self, identifier: &str) -> Result<Study, PortalError>;

    /// Returns true when a study with the identifier exists.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn study_exists(&self, identifier: &str) -> Result<bool, PortalError>;

    /// Returns the number of studies.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn count_studies(&self) -> Result<usize, PortalError>;

    /// Lists the distinct groups referenced by any study, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the study query fails.
    fn list_groups(&self) -> Result<Vec<Group>, PortalError> {
        let groups: BTreeSet<Group> = self
            .list_studies()?
            .into_iter()
            .flat_map(|study| study.groups)
            .map(Group::new)
            .collect();
        Ok(groups.into_iter().collect())
    }

    /// Returns true when at least one study references the group.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the study query fails.
    fn group_exists(&self, name: &str) -> Result<bool, PortalError> {
        Ok(self.list_groups()?.iter().any(|group| group.name.as_str() == name))
    }

    /// Returns the number of distinct groups.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the study query fails.
    fn count_groups(&self) -> Result<usize, PortalError> {
        Ok(self.list_groups()?.len())
    }
}

// ============================================================================
// SECTION: User Registry
// ============================================================================

/// CRUD over portal user accounts keyed by email.
pub trait UserRegistry {
    /// Lists every user sorted by email.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn list_users(&self) -> Result<Vec<User>, PortalError>;

    /// Fetches a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] for no match and
    /// [`PortalError::InternalInconsistency`] for more than one.
    fn get_user(&self, email: &Email) -> Result<User, PortalError>;

    /// Returns true when the user exists.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn user_exists(&self, email: &Email) -> Result<bool, PortalError>;

    /// Returns the number of users.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn count_users(&self) -> Result<usize, PortalError>;

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AlreadyExists`] when the email is taken and
    /// [`PortalError::InvalidInput`] when the email is blank.
    fn create_user(&self, user: &User) -> Result<(), PortalError>;

    /// Overwrites the name and enabled flag of an existing user.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist.
    fn update_user(&self, user: &User) -> Result<(), PortalError>;

    /// Deletes a user together with the user's authority rows.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist.
    fn delete_user(&self, email: &Email) -> Result<(), PortalError>;

    /// Lists users holding a grant on the encoded form of `target`, sorted by
    /// email. `ALL` is matched literally and never expanded.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn users_with_authority(&self, target: &str) -> Result<Vec<User>, PortalError>;
}

// ============================================================================
// SECTION: Authority Ledger
// ============================================================================

/// Replace-only access to the authority grant table.
///
/// The ledger never checks that users, studies, or groups exist; callers
/// validate before mutating.
pub trait AuthorityLedger {
    /// Lists a user's grants sorted by decoded target.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn authorities_for_user(&self, email: &Email) -> Result<Vec<Authority>, PortalError>;

    /// Lists every grant sorted by email, then decoded target.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the query fails.
    fn all_authorities(&self) -> Result<Vec<Authority>, PortalError>;

    /// Replaces every grant of `email` with one grant per target.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidInput`] for blank input and
    /// [`PortalError::Storage`] when the transaction fails; prior grants are
    /// left intact on failure.
    fn replace_authorities_for_user(
        &self,
        email: &Email,
        targets: &[String],
    ) -> Result<(), PortalError>;

    /// Replaces every grant on `target` with one grant per email.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidInput`] for blank input and
    /// [`PortalError::Storage`] when the transaction fails; prior grants are
    /// left intact on failure.
    fn replace_users_for_target(&self, target: &str, emails: &[Email]) -> Result<(), PortalError>;

    /// Replaces every grant on a group. Groups share the target namespace with
    /// studies.
    ///
    /// # Errors
    ///
    /// See [`AuthorityLedger::replace_users_for_target`].
    fn replace_users_for_group(&self, name: &str, emails: &[Email]) -> Result<(), PortalError> {
        self.replace_users_for_target(name, emails)
    }
}

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

/// Whole-registry export and transactional restore.
pub trait SnapshotStore: UserRegistry + AuthorityLedger {
    /// Captures every user and grant.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when a query fails.
    fn export_snapshot(&self) -> Result<PortalSnapshot, PortalError> {
        Ok(PortalSnapshot::from_records(self.list_users()?, self.all_authorities()?))
    }

    /// Replaces every user and grant with the snapshot contents in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidInput`] when the snapshot violates a
    /// store constraint and [`PortalError::Storage`] when the transaction
    /// fails; prior state is left intact on any failure.
    fn restore_snapshot(&self, snapshot: &PortalSnapshot) -> Result<(), PortalError>;
}

/// Every data-layer component behind one handle.
pub trait PortalStore: StudyCatalog + UserRegistry + AuthorityLedger + SnapshotStore {}

impl<T> PortalStore for T where T: StudyCatalog + UserRegistry + AuthorityLedger + SnapshotStore {}

// ============================================================================
// SECTION: Input Validation
// ============================================================================

/// Rejects blank emails.
///
/// # Errors
///
/// Returns [`PortalError::InvalidInput`] when the email is blank.
pub fn ensure_email(email: &Email) -> Result<(), PortalError> {
    if email.is_blank() {
        return Err(PortalError::InvalidInput("email must not be blank".to_string()));
    }
    Ok(())
}

/// Encodes a target set into distinct stored authority strings.
///
/// # Errors
///
/// Returns [`PortalError::InvalidInput`] when any target is blank.
pub fn encode_target_set(targets: &[String]) -> Result<BTreeSet<String>, PortalError> {
    targets
        .iter()
        .map(|target| {
            if target.trim().is_empty() {
                Err(PortalError::InvalidInput("authority target must not be blank".to_string()))
            } else {
                Ok(encode_authority(target))
            }
        })
        .collect()
}

/// Collapses an email list into a distinct set.
///
/// # Errors
///
/// Returns [`PortalError::InvalidInput`] when any email is blank.
pub fn email_set(emails: &[Email]) -> Result<BTreeSet<Email>, PortalError> {
    emails
        .iter()
        .map(|email| ensure_email(email).map(|()| email.clone()))
        .collect()
}
