// crates/portal-access-core/src/runtime/store.rs
// ============================================================================
// Module: Portal Access In-Memory Store
// Description: In-memory implementation of every data-layer interface.
// Purpose: Provide a deterministic store for tests, demos, and dry runs.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory implementation of the catalog, registry,
//! ledger, and snapshot interfaces. Each operation holds one mutex for its
//! whole duration and validates before mutating, which gives the same
//! all-or-nothing behavior the `SQLite` store gets from transactions. It is not
//! intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::Authority;
use crate::core::Email;
use crate::core::PortalSnapshot;
use crate::core::Study;
use crate::core::User;
use crate::core::encode_authority;
use crate::interfaces::AuthorityLedger;
use crate::interfaces::PortalError;
use crate::interfaces::SnapshotStore;
use crate::interfaces::StudyCatalog;
use crate::interfaces::UserRegistry;
use crate::interfaces::email_set;
use crate::interfaces::encode_target_set;
use crate::interfaces::ensure_email;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Tables guarded by the store mutex.
#[derive(Debug, Default)]
struct PortalTables {
    /// Users keyed by email.
    users: BTreeMap<Email, User>,
    /// Studies keyed by identifier as stored.
    studies: BTreeMap<String, Study>,
    /// Grants as `(email, stored authority)` pairs.
    authorities: BTreeSet<(Email, String)>,
}

/// In-memory portal store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPortalStore {
    /// Portal tables protected by a mutex.
    tables: Arc<Mutex<PortalTables>>,
}

impl InMemoryPortalStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with studies.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AlreadyExists`] when two studies share an
    /// identifier, ignoring case.
    pub fn with_studies(studies: impl IntoIterator<Item = Study>) -> Result<Self, PortalError> {
        let store = Self::new();
        for study in studies {
            store.insert_study(study)?;
        }
        Ok(store)
    }

    /// Adds a study, standing in for the portal that owns the study table.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AlreadyExists`] when the identifier is taken,
    /// ignoring case.
    pub fn insert_study(&self, study: Study) -> Result<(), PortalError> {
        let mut tables = self.lock()?;
        let identifier = study.identifier.as_str();
        if tables.studies.values().any(|existing| existing.identifier.matches(identifier)) {
            return Err(PortalError::AlreadyExists(format!("study {}", study.identifier)));
        }
        tables.studies.insert(study.identifier.as_str().to_string(), study);
        drop(tables);
        Ok(())
    }

    /// Locks the tables.
    fn lock(&self) -> Result<MutexGuard<'_, PortalTables>, PortalError> {
        self.tables
            .lock()
            .map_err(|_| PortalError::Storage("portal store mutex poisoned".to_string()))
    }
}

impl StudyCatalog for InMemoryPortalStore {
    fn list_studies(&self) -> Result<Vec<Study>, PortalError> {
        Ok(self.lock()?.studies.values().cloned().collect())
    }

    fn get_study(&self, identifier: &str) -> Result<Study, PortalError> {
        self.lock()?
            .studies
            .values()
            .find(|study| study.identifier.matches(identifier))
            .cloned()
            .ok_or_else(|| PortalError::NotFound(format!("study {identifier}")))
    }

    fn study_exists(&self, identifier: &str) -> Result<bool, PortalError> {
        Ok(self.lock()?.studies.values().any(|study| study.identifier.matches(identifier)))
    }

    fn count_studies(&self) -> Result<usize, PortalError> {
        Ok(self.lock()?.studies.len())
    }
}

impl UserRegistry for InMemoryPortalStore {
    fn list_users(&self) -> Result<Vec<User>, PortalError> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn get_user(&self, email: &Email) -> Result<User, PortalError> {
        self.lock()?
            .users
            .get(email)
            .cloned()
            .ok_or_else(|| PortalError::NotFound(format!("user {email}")))
    }

    fn user_exists(&self, email: &Email) -> Result<bool, PortalError> {
        Ok(self.lock()?.users.contains_key(email))
    }

    fn count_users(&self) -> Result<usize, PortalError> {
        Ok(self.lock()?.users.len())
    }

    fn create_user(&self, user: &User) -> Result<(), PortalError> {
        ensure_email(&user.email)?;
        let mut tables = self.lock()?;
        if tables.users.contains_key(&user.email) {
            return Err(PortalError::AlreadyExists(format!("user {}", user.email)));
        }
        tables.users.insert(user.email.clone(), user.clone());
        drop(tables);
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<(), PortalError> {
        let mut tables = self.lock()?;
        let Some(existing) = tables.users.get_mut(&user.email) else {
            return Err(PortalError::NotFound(format!("user {}", user.email)));
        };
        existing.name.clone_from(&user.name);
        existing.enabled = user.enabled;
        drop(tables);
        Ok(())
    }

    fn delete_user(&self, email: &Email) -> Result<(), PortalError> {
        let mut tables = self.lock()?;
        if tables.users.remove(email).is_none() {
            return Err(PortalError::NotFound(format!("user {email}")));
        }
        tables.authorities.retain(|(grantee, _)| grantee != email);
        drop(tables);
        Ok(())
    }

    fn users_with_authority(&self, target: &str) -> Result<Vec<User>, PortalError> {
        let encoded = encode_authority(target);
        let tables = self.lock()?;
        let grantees: BTreeSet<&Email> = tables
            .authorities
            .iter()
            .filter(|(_, stored)| *stored == encoded)
            .map(|(grantee, _)| grantee)
            .collect();
        Ok(tables
            .users
            .values()
            .filter(|user| grantees.contains(&user.email))
            .cloned()
            .collect())
    }
}

impl AuthorityLedger for InMemoryPortalStore {
    fn authorities_for_user(&self, email: &Email) -> Result<Vec<Authority>, PortalError> {
        let mut authorities: Vec<Authority> = self
            .lock()?
            .authorities
            .iter()
            .filter(|(grantee, _)| grantee == email)
            .map(|(grantee, stored)| Authority::from_stored(stored, grantee.clone()))
            .collect();
        authorities.sort();
        Ok(authorities)
    }

    fn all_authorities(&self) -> Result<Vec<Authority>, PortalError> {
        let mut authorities: Vec<Authority> = self
            .lock()?
            .authorities
            .iter()
            .map(|(grantee, stored)| Authority::from_stored(stored, grantee.clone()))
            .collect();
        authorities.sort_by(|a, b| a.email.cmp(&b.email).then_with(|| a.target.cmp(&b.target)));
        Ok(authorities)
    }

    fn replace_authorities_for_user(
        &self,
        email: &Email,
        targets: &[String],
    ) -> Result<(), PortalError> {
        ensure_email(email)?;
        let encoded = encode_target_set(targets)?;
        let mut tables = self.lock()?;
        tables.authorities.retain(|(grantee, _)| grantee != email);
        tables.authorities.extend(encoded.into_iter().map(|stored| (email.clone(), stored)));
        drop(tables);
        Ok(())
    }

    fn replace_users_for_target(&self, target: &str, emails: &[Email]) -> Result<(), PortalError> {
        let encoded = encode_target_set(&[target.to_string()])?
            .pop_first()
            .ok_or_else(|| PortalError::InvalidInput("authority target missing".to_string()))?;
        let emails = email_set(emails)?;
        let mut tables = self.lock()?;
        tables.authorities.retain(|(_, stored)| *stored != encoded);
        tables.authorities.extend(emails.into_iter().map(|email| (email, encoded.clone())));
        drop(tables);
        Ok(())
    }
}

impl SnapshotStore for InMemoryPortalStore {
    fn restore_snapshot(&self, snapshot: &PortalSnapshot) -> Result<(), PortalError> {
        let mut users = BTreeMap::new();
        for user in snapshot.user_records() {
            ensure_email(&user.email)?;
            if users.insert(user.email.clone(), user).is_some() {
                return Err(PortalError::InvalidInput("snapshot repeats a user email".to_string()));
            }
        }
        let authorities: BTreeSet<(Email, String)> = snapshot
            .authorities
            .iter()
            .map(|entry| (entry.email.clone(), entry.authority.clone()))
            .collect();
        let mut tables = self.lock()?;
        tables.users = users;
        tables.authorities = authorities;
        drop(tables);
        Ok(())
    }
}
