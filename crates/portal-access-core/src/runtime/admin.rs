// crates/portal-access-core/src/runtime/admin.rs
// ============================================================================
// Module: Access Admin Service
// Description: Validated mutations and read views over a portal store.
// Purpose: Enforce referential checks the schema cannot and audit mutations.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! The authority table joins on loose strings, so nothing in the database
//! stops a grant on a study that does not exist. [`AccessAdmin`] is the layer
//! that checks: study and group replaces require the target to exist and every
//! email to be registered, and user replaces require the user to exist. Each
//! mutation emits one [`AccessAuditEvent`], successful or not.
//!
//! Read views mirror what an admin screen shows: dashboard counts, who can
//! see a study and through which grant, and the selectable authority choices.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use crate::core::ALL_TARGET;
use crate::core::AuthorityKind;
use crate::core::DEFAULT_MAX_SNAPSHOT_BYTES;
use crate::core::Email;
use crate::core::Group;
use crate::core::GroupName;
use crate::core::Study;
use crate::core::User;
use crate::core::is_all_target;
use crate::interfaces::PortalError;
use crate::interfaces::PortalStore;
use crate::runtime::audit::AccessAuditEvent;
use crate::runtime::audit::AuditAction;
use crate::runtime::audit::AuditSink;
use crate::runtime::bulk;
use crate::runtime::classify::classify_target;

// ============================================================================
// SECTION: Views
// ============================================================================

/// Record counts shown on the admin landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Number of users.
    pub users: usize,
    /// Number of studies.
    pub studies: usize,
    /// Number of distinct groups.
    pub groups: usize,
}

/// Users reaching a study through one of its groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupUsers {
    /// Group the grant is on.
    pub group: GroupName,
    /// Users holding the group grant, sorted by email.
    pub users: Vec<User>,
}

/// Everyone with access to a study, split by grant type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudyAccess {
    /// The study.
    pub study: Study,
    /// Users with a grant on the study itself.
    pub direct_users: Vec<User>,
    /// Users with the `ALL` grant.
    pub all_users: Vec<User>,
    /// Users per group of the study, in group order.
    pub group_users: Vec<GroupUsers>,
    /// Sum of the group user lists; a user in two groups counts twice.
    pub group_user_total: usize,
}

/// A group, its member studies, and its grantees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAccess {
    /// The group.
    pub group: Group,
    /// Studies listing the group.
    pub studies: Vec<Study>,
    /// Users with a grant on the group.
    pub direct_users: Vec<User>,
}

/// A user's grant with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedAuthority {
    /// Decoded target.
    pub target: String,
    /// What the target refers to at lookup time.
    pub kind: AuthorityKind,
}

/// A user and the user's classified grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccess {
    /// The user.
    pub user: User,
    /// Grants sorted by target.
    pub authorities: Vec<ClassifiedAuthority>,
}

/// One selectable entry when editing a user's grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorityChoice {
    /// Target value submitted back to [`AccessAdmin::set_user_authorities`].
    pub value: String,
    /// Human-readable label.
    pub label: String,
    /// Kind of target.
    pub kind: AuthorityKind,
}

// ============================================================================
// SECTION: Service
// ============================================================================

/// Validating, auditing front end over a [`PortalStore`].
pub struct AccessAdmin<S> {
    /// Backing store.
    store: S,
    /// Audit sink for mutations.
    audit: Arc<dyn AuditSink>,
    /// Upper bound on imported document size.
    max_import_bytes: usize,
}

impl<S> AccessAdmin<S>
where
    S: PortalStore,
{
    /// Creates a service over `store` that reports mutations to `audit`.
    #[must_use]
    pub fn new(store: S, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            max_import_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }

    /// Overrides the import size limit.
    #[must_use]
    pub const fn with_max_import_bytes(mut self, max_import_bytes: usize) -> Self {
        self.max_import_bytes = max_import_bytes;
        self
    }

    /// Returns the backing store for plain reads.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// Counts users, studies, and groups.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when a query fails.
    pub fn dashboard(&self) -> Result<Dashboard, PortalError> {
        Ok(Dashboard {
            users: self.store.count_users()?,
            studies: self.store.count_studies()?,
            groups: self.store.count_groups()?,
        })
    }

    /// Lists who can see a study, grouped by how.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the study does not exist.
    pub fn study_access(&self, identifier: &str) -> Result<StudyAccess, PortalError> {
        let study = self.store.get_study(identifier)?;
        let direct_users = self.store.users_with_authority(study.identifier.as_str())?;
        let all_users = self.store.users_with_authority(ALL_TARGET)?;
        let mut group_users = Vec::with_capacity(study.groups.len());
        for group in &study.groups {
            group_users.push(GroupUsers {
                group: group.clone(),
                users: self.store.users_with_authority(group.as_str())?,
            });
        }
        let group_user_total = group_users.iter().map(|entry| entry.users.len()).sum();
        Ok(StudyAccess {
            study,
            direct_users,
            all_users,
            group_users,
            group_user_total,
        })
    }

    /// Shows a group's studies and grantees.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when no study lists the group.
    pub fn group_access(&self, name: &str) -> Result<GroupAccess, PortalError> {
        let studies: Vec<Study> = self
            .store
            .list_studies()?
            .into_iter()
            .filter(|study| study.groups.iter().any(|group| group.as_str() == name))
            .collect();
        if studies.is_empty() {
            return Err(PortalError::NotFound(format!("group {name}")));
        }
        Ok(GroupAccess {
            group: Group::new(name),
            studies,
            direct_users: self.store.users_with_authority(name)?,
        })
    }

    /// Shows a user with each grant classified.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist.
    pub fn user_access(&self, email: &Email) -> Result<UserAccess, PortalError> {
        let user = self.store.get_user(email)?;
        let grants = self.store.authorities_for_user(email)?;
        let mut authorities = Vec::with_capacity(grants.len());
        for authority in grants {
            let kind = classify_target(&self.store, &authority.target)?;
            authorities.push(ClassifiedAuthority {
                target: authority.target,
                kind,
            });
        }
        Ok(UserAccess {
            user,
            authorities,
        })
    }

    /// Lists every target a user can be granted: `ALL`, then studies, then
    /// groups.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when the study query fails.
    pub fn authority_choices(&self) -> Result<Vec<AuthorityChoice>, PortalError> {
        let studies = self.store.list_studies()?;
        let groups: BTreeSet<GroupName> =
            studies.iter().flat_map(|study| study.groups.iter().cloned()).collect();
        let mut choices = Vec::with_capacity(1 + studies.len() + groups.len());
        choices.push(AuthorityChoice {
            value: ALL_TARGET.to_string(),
            label: format!("{ALL_TARGET} [special] -- Access to all studies!"),
            kind: AuthorityKind::All,
        });
        choices.extend(studies.iter().map(|study| AuthorityChoice {
            value: study.identifier.as_str().to_uppercase(),
            label: format!("{} [study] ({})", study.identifier, study.name),
            kind: AuthorityKind::Study,
        }));
        choices.extend(groups.iter().map(|group| AuthorityChoice {
            value: group.as_str().to_uppercase(),
            label: format!("{group} [group]"),
            kind: AuthorityKind::Group,
        }));
        Ok(choices)
    }

    /// Resolves whether a user can see a study.
    ///
    /// Disabled users see nothing. Otherwise an `ALL` grant, a grant on the
    /// study, or a grant on any of the study's groups gives access.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user or study does not exist.
    pub fn has_access(&self, email: &Email, identifier: &str) -> Result<bool, PortalError> {
        let user = self.store.get_user(email)?;
        let study = self.store.get_study(identifier)?;
        if !user.enabled {
            return Ok(false);
        }
        let granted: BTreeSet<String> = self
            .store
            .authorities_for_user(email)?
            .into_iter()
            .map(|authority| authority.target.to_uppercase())
            .collect();
        if granted.iter().any(|target| is_all_target(target)) {
            return Ok(true);
        }
        if granted.contains(&study.identifier.as_str().to_uppercase()) {
            return Ok(true);
        }
        Ok(study.groups.iter().any(|group| granted.contains(&group.as_str().to_uppercase())))
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::AlreadyExists`] when the email is taken.
    pub fn create_user(&self, user: &User) -> Result<(), PortalError> {
        let result = self.store.create_user(user);
        self.record(AuditAction::UserCreated, Some(user.email.to_string()), Vec::new(), &result);
        result
    }

    /// Overwrites a user's name and enabled flag.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist.
    pub fn update_user(&self, user: &User) -> Result<(), PortalError> {
        let result = self.store.update_user(user);
        self.record(AuditAction::UserUpdated, Some(user.email.to_string()), Vec::new(), &result);
        result
    }

    /// Deletes a user and the user's grants.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist.
    pub fn delete_user(&self, email: &Email) -> Result<(), PortalError> {
        let result = self.store.delete_user(email);
        self.record(AuditAction::UserDeleted, Some(email.to_string()), Vec::new(), &result);
        result
    }

    /// Replaces a registered user's grants.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the user does not exist and
    /// [`PortalError::InvalidInput`] for blank targets or targets that are not
    /// `ALL`, a study, or a group.
    pub fn set_user_authorities(&self, email: &Email, targets: &[String]) -> Result<(), PortalError> {
        let result = self.apply_user_authorities(email, targets);
        self.record(
            AuditAction::UserAuthoritiesReplaced,
            Some(email.to_string()),
            targets.to_vec(),
            &result,
        );
        result
    }

    /// Replaces the grantees of an existing study.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when the study does not exist and
    /// [`PortalError::InvalidInput`] when an email is not a registered user.
    pub fn set_study_users(&self, identifier: &str, emails: &[Email]) -> Result<(), PortalError> {
        let result = self.apply_study_users(identifier, emails);
        self.record(
            AuditAction::StudyUsersReplaced,
            Some(identifier.to_string()),
            emails.iter().map(ToString::to_string).collect(),
            &result,
        );
        result
    }

    /// Replaces the grantees of an existing group.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::NotFound`] when no study lists the group and
    /// [`PortalError::InvalidInput`] when an email is not a registered user.
    pub fn set_group_users(&self, name: &str, emails: &[Email]) -> Result<(), PortalError> {
        let result = self.apply_group_users(name, emails);
        self.record(
            AuditAction::GroupUsersReplaced,
            Some(name.to_string()),
            emails.iter().map(ToString::to_string).collect(),
            &result,
        );
        result
    }

    /// Exports every user and grant.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Storage`] when a query fails.
    pub fn export_all(&self) -> Result<String, PortalError> {
        let result = bulk::export_all(&self.store);
        self.record(AuditAction::SnapshotExported, None, Vec::new(), &result);
        result
    }

    /// Replaces every user and grant from a snapshot document.
    ///
    /// Returns the number of users and grants restored.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::InvalidInput`] when the document is rejected;
    /// the store is left untouched.
    pub fn import_all(&self, text: &str) -> Result<(usize, usize), PortalError> {
        let result = bulk::import_all(&self.store, text, self.max_import_bytes);
        let counts = match &result {
            Ok((users, authorities)) => {
                vec![format!("users={users}"), format!("authorities={authorities}")]
            }
            Err(_) => Vec::new(),
        };
        self.record(AuditAction::SnapshotImported, None, counts, &result);
        result
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Checks the user and every target, then replaces the user's grants.
    fn apply_user_authorities(&self, email: &Email, targets: &[String]) -> Result<(), PortalError> {
        if !self.store.user_exists(email)? {
            return Err(PortalError::NotFound(format!("user {email}")));
        }
        self.ensure_grantable(targets)?;
        self.store.replace_authorities_for_user(email, targets)
    }

    /// Rejects targets that are not `ALL`, a study, or a group.
    ///
    /// Blank targets are left for the ledger to reject.
    fn ensure_grantable(&self, targets: &[String]) -> Result<(), PortalError> {
        if targets.is_empty() {
            return Ok(());
        }
        let groups: BTreeSet<String> = self
            .store
            .list_groups()?
            .into_iter()
            .map(|group| group.name.as_str().to_uppercase())
            .collect();
        for target in targets {
            if target.trim().is_empty()
                || is_all_target(target)
                || groups.contains(&target.to_uppercase())
                || self.store.study_exists(target)?
            {
                continue;
            }
            return Err(PortalError::InvalidInput(format!("unknown authority target {target}")));
        }
        Ok(())
    }

    /// Checks the study and grantees and replaces the study's grants.
    fn apply_study_users(&self, identifier: &str, emails: &[Email]) -> Result<(), PortalError> {
        let study = self.store.get_study(identifier)?;
        self.ensure_registered(emails)?;
        self.store.replace_users_for_target(study.identifier.as_str(), emails)
    }

    /// Checks the group and grantees and replaces the group's grants.
    fn apply_group_users(&self, name: &str, emails: &[Email]) -> Result<(), PortalError> {
        if !self.store.group_exists(name)? {
            return Err(PortalError::NotFound(format!("group {name}")));
        }
        self.ensure_registered(emails)?;
        self.store.replace_users_for_group(name, emails)
    }

    /// Rejects emails that are not registered users.
    fn ensure_registered(&self, emails: &[Email]) -> Result<(), PortalError> {
        for email in emails {
            if !self.store.user_exists(email)? {
                return Err(PortalError::InvalidInput(format!("unknown user {email}")));
            }
        }
        Ok(())
    }

    /// Emits one audit event for a mutation result.
    fn record<T>(
        &self,
        action: AuditAction,
        subject: Option<String>,
        targets: Vec<String>,
        result: &Result<T, PortalError>,
    ) {
        let event = AccessAuditEvent::new(action, subject, targets);
        let event = match result {
            Ok(_) => event,
            Err(err) => event.failed(err.kind()),
        };
        self.audit.record(&event);
    }
}
