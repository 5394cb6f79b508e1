// crates/portal-access-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Portal Store
// Description: Portal catalog, registry, and ledger backed by SQLite.
// Purpose: Map portal tables to typed records with transactional mutations.
// Dependencies: portal-access-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SqlitePortalStore`] implements every portal access interface over three
//! tables: `cancer_study` (read-only), `users`, and `authorities`. Rows are
//! mapped into typed records per query. Replaces, creates, deletes, and
//! snapshot restores each run inside one transaction, so a failure leaves the
//! prior rows in place.
//!
//! The authority table has no foreign keys; existence checks belong to
//! [`portal_access_core::AccessAdmin`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use portal_access_core::Authority;
use portal_access_core::AuthorityLedger;
use portal_access_core::Email;
use portal_access_core::PortalError;
use portal_access_core::PortalSnapshot;
use portal_access_core::SnapshotStore;
use portal_access_core::Study;
use portal_access_core::StudyCatalog;
use portal_access_core::User;
use portal_access_core::UserRegistry;
use portal_access_core::encode_authority;
use portal_access_core::interfaces::email_set;
use portal_access_core::interfaces::encode_target_set;
use portal_access_core::interfaces::ensure_email;
use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Params;
use rusqlite::params;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Tables the store reads or writes.
const PORTAL_TABLES: [&str; 3] = ["users", "cancer_study", "authorities"];

/// DDL used when missing tables may be created.
const CREATE_TABLES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    email VARCHAR(128) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    enabled BOOLEAN NOT NULL
);
CREATE TABLE IF NOT EXISTS cancer_study (
    cancer_study_identifier VARCHAR(255) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    "groups" VARCHAR(200)
);
CREATE TABLE IF NOT EXISTS authorities (
    email VARCHAR(128) NOT NULL,
    authority VARCHAR(50) NOT NULL
);
CREATE INDEX IF NOT EXISTS authorities_email_idx ON authorities (email);
CREATE INDEX IF NOT EXISTS authorities_authority_idx ON authorities (authority);
"#;

/// Study columns in record order.
const STUDY_COLUMNS: &str = r#"cancer_study_identifier, name, "groups""#;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// How the store treats the portal schema at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSchemaMode {
    /// Require the portal tables to exist already.
    #[default]
    Verify,
    /// Create any missing portal table.
    CreateMissing,
}

/// Configuration for the `SQLite` portal store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Schema handling at open time.
    #[serde(default)]
    pub schema_mode: SqliteSchemaMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for everything but the path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            schema_mode: SqliteSchemaMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages never embed user display names.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A write violated a table constraint.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// Stored rows violate an assumption the store relies on.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Invalid configuration or schema.
    #[error("sqlite store invalid: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for PortalError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Db(message) => Self::Storage(message),
            SqliteStoreError::Conflict(message) => Self::AlreadyExists(message),
            SqliteStoreError::Corrupt(message) => Self::InternalInconsistency(message),
            SqliteStoreError::Invalid(message) => Self::InvalidInput(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed portal store.
///
/// # Invariants
/// - All access goes through one connection guarded by a mutex.
/// - Multi-statement mutations commit or roll back as a unit.
#[derive(Clone)]
pub struct SqlitePortalStore {
    /// Shared `SQLite` connection.
    connection: Arc<Mutex<Connection>>,
}

impl SqlitePortalStore {
    /// Opens the portal database.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is unusable, the database
    /// cannot be opened, or a required table is missing in verify mode.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        if config.schema_mode == SqliteSchemaMode::CreateMissing {
            ensure_parent_dir(&config.path)?;
        } else if !config.path.exists() {
            return Err(SqliteStoreError::Io(format!(
                "portal database not found: {}",
                config.path.display()
            )));
        }
        let mut connection = open_connection(config)?;
        match config.schema_mode {
            SqliteSchemaMode::Verify => verify_schema(&connection)?,
            SqliteSchemaMode::CreateMissing => create_schema(&mut connection)?,
        }
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard.query_row("SELECT 1", [], |_| Ok(())).map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("sqlite mutex poisoned".to_string()))
    }
}

impl StudyCatalog for SqlitePortalStore {
    fn list_studies(&self) -> Result<Vec<Study>, PortalError> {
        let guard = self.lock()?;
        let sql = format!(
            "SELECT {STUDY_COLUMNS} FROM cancer_study ORDER BY cancer_study_identifier"
        );
        Ok(query_studies(&guard, &sql, [])?)
    }

    fn get_study(&self, identifier: &str) -> Result<Study, PortalError> {
        let guard = self.lock()?;
        let sql = format!(
            "SELECT {STUDY_COLUMNS} FROM cancer_study WHERE UPPER(cancer_study_identifier) = \
             UPPER(?1)"
        );
        let studies = query_studies(&guard, &sql, params![identifier])?;
        drop(guard);
        single_row(studies, &format!("study {identifier}"))
    }

    fn study_exists(&self, identifier: &str) -> Result<bool, PortalError> {
        let guard = self.lock()?;
        let found: Option<i64> = guard
            .query_row(
                "SELECT 1 FROM cancer_study WHERE UPPER(cancer_study_identifier) = UPPER(?1) \
                 LIMIT 1",
                params![identifier],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        Ok(found.is_some())
    }

    fn count_studies(&self) -> Result<usize, PortalError> {
        let guard = self.lock()?;
        Ok(count_rows(&guard, "SELECT COUNT(*) FROM cancer_study")?)
    }
}

impl UserRegistry for SqlitePortalStore {
    fn list_users(&self) -> Result<Vec<User>, PortalError> {
        let guard = self.lock()?;
        Ok(query_users(&guard, "SELECT email, name, enabled FROM users ORDER BY email", [])?)
    }

    fn get_user(&self, email: &Email) -> Result<User, PortalError> {
        let guard = self.lock()?;
        let users = query_users(
            &guard,
            "SELECT email, name, enabled FROM users WHERE email = ?1",
            params![email.as_str()],
        )?;
        drop(guard);
        single_row(users, &format!("user {email}"))
    }

    fn user_exists(&self, email: &Email) -> Result<bool, PortalError> {
        let guard = self.lock()?;
        Ok(user_row_exists(&guard, email)?)
    }

    fn count_users(&self) -> Result<usize, PortalError> {
        let guard = self.lock()?;
        Ok(count_rows(&guard, "SELECT COUNT(*) FROM users")?)
    }

    fn create_user(&self, user: &User) -> Result<(), PortalError> {
        ensure_email(&user.email)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        if user_row_exists(&tx, &user.email)? {
            return Err(PortalError::AlreadyExists(format!("user {}", user.email)));
        }
        tx.execute(
            "INSERT INTO users (email, name, enabled) VALUES (?1, ?2, ?3)",
            params![user.email.as_str(), user.name, user.enabled],
        )
        .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    fn update_user(&self, user: &User) -> Result<(), PortalError> {
        let guard = self.lock()?;
        let changed = guard
            .execute(
                "UPDATE users SET name = ?2, enabled = ?3 WHERE email = ?1",
                params![user.email.as_str(), user.name, user.enabled],
            )
            .map_err(db_error)?;
        drop(guard);
        if changed == 0 {
            return Err(PortalError::NotFound(format!("user {}", user.email)));
        }
        Ok(())
    }

    fn delete_user(&self, email: &Email) -> Result<(), PortalError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let deleted = tx
            .execute("DELETE FROM users WHERE email = ?1", params![email.as_str()])
            .map_err(db_error)?;
        if deleted == 0 {
            return Err(PortalError::NotFound(format!("user {email}")));
        }
        tx.execute("DELETE FROM authorities WHERE email = ?1", params![email.as_str()])
            .map_err(db_error)?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    fn users_with_authority(&self, target: &str) -> Result<Vec<User>, PortalError> {
        let guard = self.lock()?;
        Ok(query_users(
            &guard,
            "SELECT DISTINCT u.email, u.name, u.enabled FROM users u JOIN authorities a ON \
             a.email = u.email WHERE a.authority = ?1 ORDER BY u.email",
            params![encode_authority(target)],
        )?)
    }
}

impl AuthorityLedger for SqlitePortalStore {
    fn authorities_for_user(&self, email: &Email) -> Result<Vec<Authority>, PortalError> {
        let guard = self.lock()?;
        let authorities = query_grants(
            &guard,
            "SELECT DISTINCT email, authority FROM authorities WHERE email = ?1",
            params![email.as_str()],
        )?;
        drop(guard);
        Ok(sort_by_email(authorities))
    }

    fn all_authorities(&self) -> Result<Vec<Authority>, PortalError> {
        let guard = self.lock()?;
        let authorities =
            query_grants(&guard, "SELECT DISTINCT email, authority FROM authorities", [])?;
        drop(guard);
        Ok(sort_by_email(authorities))
    }

    fn replace_authorities_for_user(
        &self,
        email: &Email,
        targets: &[String],
    ) -> Result<(), PortalError> {
        ensure_email(email)?;
        let encoded = encode_target_set(targets)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute("DELETE FROM authorities WHERE email = ?1", params![email.as_str()])
            .map_err(db_error)?;
        for stored in &encoded {
            insert_grant(&tx, email.as_str(), stored)?;
        }
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }

    fn replace_users_for_target(&self, target: &str, emails: &[Email]) -> Result<(), PortalError> {
        let stored = encode_target_set(&[target.to_string()])?
            .pop_first()
            .ok_or_else(|| PortalError::InvalidInput("authority target missing".to_string()))?;
        let emails = email_set(emails)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute("DELETE FROM authorities WHERE authority = ?1", params![stored])
            .map_err(db_error)?;
        for email in &emails {
            insert_grant(&tx, email.as_str(), &stored)?;
        }
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }
}

impl SnapshotStore for SqlitePortalStore {
    fn export_snapshot(&self) -> Result<PortalSnapshot, PortalError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        let users = query_users(&tx, "SELECT email, name, enabled FROM users ORDER BY email", [])?;
        let authorities =
            query_grants(&tx, "SELECT DISTINCT email, authority FROM authorities", [])?;
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(PortalSnapshot::from_records(users, sort_by_email(authorities)))
    }

    fn restore_snapshot(&self, snapshot: &PortalSnapshot) -> Result<(), PortalError> {
        let mut emails = BTreeSet::new();
        for user in &snapshot.users {
            ensure_email(&user.email)?;
            if !emails.insert(user.email.as_str()) {
                return Err(PortalError::InvalidInput("snapshot repeats a user email".to_string()));
            }
        }
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(db_error)?;
        tx.execute_batch("DELETE FROM authorities; DELETE FROM users;").map_err(db_error)?;
        for user in &snapshot.users {
            tx.execute(
                "INSERT INTO users (email, name, enabled) VALUES (?1, ?2, ?3)",
                params![user.email.as_str(), user.name, user.enabled],
            )
            .map_err(db_error)?;
        }
        for grant in &snapshot.authorities {
            insert_grant(&tx, grant.email.as_str(), &grant.authority)?;
        }
        tx.commit().map_err(db_error)?;
        drop(guard);
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Maps a `(email, name, enabled)` row.
fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let email: String = row.get(0)?;
    let name: String = row.get(1)?;
    let enabled: bool = row.get(2)?;
    Ok(User::new(email, name, enabled))
}

/// Maps a `(identifier, name, groups)` row; a null group column means none.
fn map_study_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Study> {
    let identifier: String = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    let groups: Option<String> = row.get(2)?;
    Ok(Study::from_columns(identifier, name.unwrap_or_default(), groups.as_deref().unwrap_or("")))
}

/// Maps an `(email, authority)` row, decoding the target.
fn map_grant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Authority> {
    let email: String = row.get(0)?;
    let stored: String = row.get(1)?;
    Ok(Authority::from_stored(&stored, email))
}

/// Runs a user query.
fn query_users<P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<User>, SqliteStoreError> {
    let mut statement = connection.prepare(sql).map_err(db_error)?;
    let rows = statement.query_map(params, map_user_row).map_err(db_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
}

/// Runs a study query.
fn query_studies<P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Study>, SqliteStoreError> {
    let mut statement = connection.prepare(sql).map_err(db_error)?;
    let rows = statement.query_map(params, map_study_row).map_err(db_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
}

/// Runs an authority query.
fn query_grants<P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Authority>, SqliteStoreError> {
    let mut statement = connection.prepare(sql).map_err(db_error)?;
    let rows = statement.query_map(params, map_grant_row).map_err(db_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(db_error)
}

/// Returns true when a user row exists for the email.
fn user_row_exists(connection: &Connection, email: &Email) -> Result<bool, SqliteStoreError> {
    let found: Option<i64> = connection
        .query_row("SELECT 1 FROM users WHERE email = ?1 LIMIT 1", params![email.as_str()], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db_error)?;
    Ok(found.is_some())
}

/// Inserts one authority row.
fn insert_grant(connection: &Connection, email: &str, stored: &str) -> Result<(), SqliteStoreError> {
    connection
        .execute("INSERT INTO authorities (email, authority) VALUES (?1, ?2)", params![email, stored])
        .map_err(db_error)?;
    Ok(())
}

/// Runs a `COUNT(*)` query.
fn count_rows(connection: &Connection, sql: &str) -> Result<usize, SqliteStoreError> {
    let count: i64 = connection.query_row(sql, [], |row| row.get(0)).map_err(db_error)?;
    usize::try_from(count)
        .map_err(|_| SqliteStoreError::Corrupt(format!("row count out of range: {count}")))
}

/// Returns the only row, failing for zero or several.
fn single_row<T>(mut rows: Vec<T>, subject: &str) -> Result<T, PortalError> {
    if rows.len() > 1 {
        return Err(PortalError::InternalInconsistency(format!(
            "{subject} matched {} rows",
            rows.len()
        )));
    }
    rows.pop().ok_or_else(|| PortalError::NotFound(subject.to_string()))
}

/// Sorts grants by email, then decoded target, dropping repeats.
///
/// A legacy bare row and its prefixed twin decode to the same grant.
fn sort_by_email(mut authorities: Vec<Authority>) -> Vec<Authority> {
    authorities.sort_by(|a, b| a.email.cmp(&b.email).then_with(|| a.target.cmp(&b.target)));
    authorities.dedup();
    authorities
}

/// Maps `SQLite` failures, keeping constraint violations distinct.
fn db_error(err: rusqlite::Error) -> SqliteStoreError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        SqliteStoreError::Conflict(err.to_string())
    } else {
        SqliteStoreError::Db(err.to_string())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    if config.schema_mode == SqliteSchemaMode::CreateMissing {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }
    let connection = Connection::open_with_flags(&config.path, flags).map_err(db_error)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(db_error)?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(db_error)?;
    connection.busy_timeout(Duration::from_millis(config.busy_timeout_ms)).map_err(db_error)?;
    Ok(())
}

/// Fails when any portal table is missing.
fn verify_schema(connection: &Connection) -> Result<(), SqliteStoreError> {
    for table in PORTAL_TABLES {
        let found: Option<String> = connection
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)?;
        if found.is_none() {
            return Err(SqliteStoreError::Invalid(format!("portal table missing: {table}")));
        }
    }
    Ok(())
}

/// Creates any missing portal table.
fn create_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(db_error)?;
    tx.execute_batch(CREATE_TABLES_SQL).map_err(db_error)?;
    tx.commit().map_err(db_error)
}
