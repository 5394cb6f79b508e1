// crates/portal-access-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Portal Store Tests
// Description: Schema handling, registry, ledger, and snapshot behavior.
// Purpose: Validate transactional mutations and typed row mapping on SQLite.
// ============================================================================

//! ## Overview
//! Exercises [`portal_access_store_sqlite::SqlitePortalStore`] against a
//! temporary database file:
//! - Schema verification and creation
//! - Case-insensitive study lookups and derived groups
//! - Registry CRUD with cascading deletes
//! - Ledger replaces and snapshot round trips

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::path::Path;
use std::sync::Arc;
use std::thread;

use portal_access_core::AccessAdmin;
use portal_access_core::AuthorityLedger;
use portal_access_core::DEFAULT_MAX_SNAPSHOT_BYTES;
use portal_access_core::Email;
use portal_access_core::Group;
use portal_access_core::NoopAuditSink;
use portal_access_core::PortalError;
use portal_access_core::SnapshotStore;
use portal_access_core::StudyCatalog;
use portal_access_core::User;
use portal_access_core::UserRegistry;
use portal_access_core::export_all;
use portal_access_core::import_all;
use portal_access_store_sqlite::SqlitePortalStore;
use portal_access_store_sqlite::SqliteSchemaMode;
use portal_access_store_sqlite::SqliteStoreConfig;
use portal_access_store_sqlite::SqliteStoreError;
use portal_access_store_sqlite::SqliteStoreMode;
use portal_access_store_sqlite::SqliteSyncMode;
use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn create_config(path: &Path) -> SqliteStoreConfig {
    SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Normal,
        schema_mode: SqliteSchemaMode::CreateMissing,
    }
}

fn seed_studies(path: &Path) {
    let connection = Connection::open(path).unwrap();
    for (identifier, name, groups) in [
        ("STUDY1", "First study", Some("G1;G2")),
        ("study2", "Second study", Some("G2")),
        ("STUDY3", "Third study", None),
    ] {
        connection
            .execute(
                "INSERT INTO cancer_study (cancer_study_identifier, name, \"groups\") VALUES (?1, \
                 ?2, ?3)",
                params![identifier, name, groups],
            )
            .unwrap();
    }
}

fn open_store(dir: &TempDir) -> SqlitePortalStore {
    let path = dir.path().join("portal.db");
    let store = SqlitePortalStore::new(&create_config(&path)).unwrap();
    seed_studies(&path);
    store
}

fn targets(store: &SqlitePortalStore, email: &str) -> Vec<String> {
    store
        .authorities_for_user(&Email::new(email))
        .unwrap()
        .into_iter()
        .map(|authority| authority.target)
        .collect()
}

fn emails(users: &[User]) -> Vec<&str> {
    users.iter().map(|user| user.email.as_str()).collect()
}

// ============================================================================
// SECTION: Schema
// ============================================================================

#[test]
fn verify_mode_rejects_missing_database() {
    let dir = TempDir::new().unwrap();
    let mut config = create_config(&dir.path().join("absent.db"));
    config.schema_mode = SqliteSchemaMode::Verify;
    let result = SqlitePortalStore::new(&config);
    assert!(matches!(result, Err(SqliteStoreError::Io(_))));
}

#[test]
fn verify_mode_rejects_missing_tables() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.db");
    let connection = Connection::open(&path).unwrap();
    connection
        .execute_batch("CREATE TABLE users (email TEXT PRIMARY KEY, name TEXT, enabled INTEGER);")
        .unwrap();
    drop(connection);
    let mut config = create_config(&path);
    config.schema_mode = SqliteSchemaMode::Verify;
    let err = SqlitePortalStore::new(&config).err().unwrap();
    assert!(matches!(err, SqliteStoreError::Invalid(_)));
    assert!(err.to_string().contains("cancer_study"));
}

#[test]
fn verify_mode_accepts_existing_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("portal.db");
    drop(SqlitePortalStore::new(&create_config(&path)).unwrap());
    let mut config = create_config(&path);
    config.schema_mode = SqliteSchemaMode::Verify;
    let store = SqlitePortalStore::new(&config).unwrap();
    store.check_connection().unwrap();
}

#[test]
fn directory_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = SqlitePortalStore::new(&create_config(dir.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

#[test]
fn catalog_reads_studies_and_derives_groups() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    assert_eq!(store.count_studies().unwrap(), 3);
    let study = store.get_study("STUDY2").unwrap();
    assert_eq!(study.identifier.as_str(), "study2");
    assert!(store.study_exists("Study1").unwrap());
    assert!(!store.study_exists("STUDY9").unwrap());
    assert!(store.get_study("STUDY3").unwrap().groups.is_empty());
    assert_eq!(store.list_groups().unwrap(), vec![Group::new("G1"), Group::new("G2")]);
    assert!(!store.group_exists("G3").unwrap());
    assert!(matches!(store.get_study("NOPE"), Err(PortalError::NotFound(_))));
}

// ============================================================================
// SECTION: Registry
// ============================================================================

#[test]
fn create_get_update_delete_round() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let email = Email::new("alice@example.org");
    store.create_user(&User::new(email.clone(), "Alice", true)).unwrap();
    assert_eq!(store.get_user(&email).unwrap(), User::new(email.clone(), "Alice", true));

    let duplicate = store.create_user(&User::new(email.clone(), "Other", false));
    assert!(matches!(duplicate, Err(PortalError::AlreadyExists(_))));
    assert_eq!(store.get_user(&email).unwrap().name, "Alice");

    store.update_user(&User::new(email.clone(), "Alice B", false)).unwrap();
    assert_eq!(store.get_user(&email).unwrap(), User::new(email.clone(), "Alice B", false));

    store.replace_authorities_for_user(&email, &["STUDY1".to_string()]).unwrap();
    store.delete_user(&email).unwrap();
    assert!(!store.user_exists(&email).unwrap());
    assert!(store.all_authorities().unwrap().is_empty());
    assert!(matches!(store.delete_user(&email), Err(PortalError::NotFound(_))));
    assert!(matches!(
        store.update_user(&User::new(email, "Ghost", true)),
        Err(PortalError::NotFound(_))
    ));
}

#[test]
fn duplicate_rows_in_shared_schema_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("loose.db");
    let connection = Connection::open(&path).unwrap();
    connection
        .execute_batch(
            "CREATE TABLE users (email TEXT, name TEXT, enabled INTEGER);
             CREATE TABLE cancer_study (cancer_study_identifier TEXT, name TEXT, \"groups\" TEXT);
             CREATE TABLE authorities (email TEXT, authority TEXT);
             INSERT INTO users VALUES ('dup@example.org', 'One', 1);
             INSERT INTO users VALUES ('dup@example.org', 'Two', 0);",
        )
        .unwrap();
    drop(connection);
    let mut config = create_config(&path);
    config.schema_mode = SqliteSchemaMode::Verify;
    let store = SqlitePortalStore::new(&config).unwrap();
    let result = store.get_user(&Email::new("dup@example.org"));
    assert!(matches!(result, Err(PortalError::InternalInconsistency(_))));
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

#[test]
fn replace_for_user_is_exact_and_decoded() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let email = Email::new("alice@example.org");
    store
        .replace_authorities_for_user(&email, &["study1".to_string(), "G2".to_string()])
        .unwrap();
    store
        .replace_authorities_for_user(&email, &["ALL".to_string(), "g1".to_string()])
        .unwrap();
    assert_eq!(targets(&store, "alice@example.org"), vec!["ALL", "G1"]);

    let connection = Connection::open(dir.path().join("portal.db")).unwrap();
    let stored: Vec<String> = connection
        .prepare("SELECT authority FROM authorities ORDER BY authority")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(stored, vec!["cbioportal:ALL", "cbioportal:G1"]);
}

#[test]
fn study_lookups_fold_ascii_case_only() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let connection = Connection::open(dir.path().join("portal.db")).unwrap();
    connection
        .execute(
            "INSERT INTO cancer_study (cancer_study_identifier, name, \"groups\") VALUES (?1, ?2, \
             ?3)",
            params!["ÉTUDE_a", "Accented", ""],
        )
        .unwrap();
    drop(connection);

    assert!(store.study_exists("ÉTUDE_A").unwrap());
    assert!(!store.study_exists("étude_a").unwrap());
}

#[test]
fn legacy_bare_and_prefixed_rows_decode_to_one_grant() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let connection = Connection::open(dir.path().join("portal.db")).unwrap();
    for stored in ["STUDY1", "cbioportal:STUDY1"] {
        connection
            .execute(
                "INSERT INTO authorities (email, authority) VALUES (?1, ?2)",
                params!["alice@example.org", stored],
            )
            .unwrap();
    }
    drop(connection);

    assert_eq!(targets(&store, "alice@example.org"), vec!["STUDY1"]);
    assert_eq!(store.all_authorities().unwrap().len(), 1);
    assert_eq!(store.export_snapshot().unwrap().authorities.len(), 1);
}

#[test]
fn replace_for_group_then_users_with_authority() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    for email in ["carol@example.org", "alice@example.org", "bob@example.org"] {
        store.create_user(&User::new(email, email, true)).unwrap();
    }
    store
        .replace_users_for_group(
            "G1",
            &[Email::new("carol@example.org"), Email::new("alice@example.org")],
        )
        .unwrap();
    let users = store.users_with_authority("g1").unwrap();
    assert_eq!(emails(&users), vec!["alice@example.org", "carol@example.org"]);
    assert!(store.users_with_authority("STUDY1").unwrap().is_empty());
}

#[test]
fn blank_input_leaves_prior_grants() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .replace_users_for_target("STUDY1", &[Email::new("alice@example.org")])
        .unwrap();
    let result = store.replace_users_for_target("STUDY1", &[Email::new(" ")]);
    assert!(matches!(result, Err(PortalError::InvalidInput(_))));
    assert_eq!(targets(&store, "alice@example.org"), vec!["STUDY1"]);
}

#[test]
fn admin_validation_runs_over_sqlite() {
    let dir = TempDir::new().unwrap();
    let admin = AccessAdmin::new(open_store(&dir), Arc::new(NoopAuditSink));
    admin.create_user(&User::new("alice@example.org", "Alice", true)).unwrap();
    admin.set_study_users("study2", &[Email::new("alice@example.org")]).unwrap();
    assert_eq!(targets(admin.store(), "alice@example.org"), vec!["STUDY2"]);
    assert!(admin.has_access(&Email::new("alice@example.org"), "STUDY2").unwrap());
    assert!(matches!(
        admin.set_group_users("G9", &[Email::new("alice@example.org")]),
        Err(PortalError::NotFound(_))
    ));
}

// ============================================================================
// SECTION: Snapshots
// ============================================================================

#[test]
fn export_import_round_trip_between_databases() {
    let source_dir = TempDir::new().unwrap();
    let source = open_store(&source_dir);
    source.create_user(&User::new("alice@example.org", "Alice", true)).unwrap();
    source.create_user(&User::new("bob@example.org", "Bob", false)).unwrap();
    source
        .replace_authorities_for_user(
            &Email::new("alice@example.org"),
            &["ALL".to_string(), "STUDY1".to_string()],
        )
        .unwrap();
    source.replace_users_for_group("G2", &[Email::new("bob@example.org")]).unwrap();
    let document = export_all(&source).unwrap();

    let target_dir = TempDir::new().unwrap();
    let target = open_store(&target_dir);
    target.create_user(&User::new("stale@example.org", "Stale", true)).unwrap();
    import_all(&target, &document, DEFAULT_MAX_SNAPSHOT_BYTES).unwrap();
    assert_eq!(target.list_users().unwrap(), source.list_users().unwrap());
    assert_eq!(target.all_authorities().unwrap(), source.all_authorities().unwrap());
    assert_eq!(target.export_snapshot().unwrap(), source.export_snapshot().unwrap());
}

#[test]
fn lower_case_prefixed_import_is_stable_across_round_trips() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let document = "users:\n- {email: a@example.org, name: A, enabled: 1}\nauthorities:\n- {email: a@example.org, authority: 'cbioportal:study1'}\n";
    import_all(&store, document, DEFAULT_MAX_SNAPSHOT_BYTES).unwrap();
    let before = store.all_authorities().unwrap();
    assert_eq!(targets(&store, "a@example.org"), vec!["STUDY1"]);

    let exported = export_all(&store).unwrap();
    import_all(&store, &exported, DEFAULT_MAX_SNAPSHOT_BYTES).unwrap();
    assert_eq!(store.all_authorities().unwrap(), before);
    assert_eq!(emails(&store.users_with_authority("study1").unwrap()), vec!["a@example.org"]);
}

#[test]
fn rejected_import_keeps_existing_rows() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.create_user(&User::new("alice@example.org", "Alice", true)).unwrap();
    let result = import_all(&store, "version: 7\nusers: []\n", DEFAULT_MAX_SNAPSHOT_BYTES);
    assert!(matches!(result, Err(PortalError::InvalidInput(_))));
    assert_eq!(emails(&store.list_users().unwrap()), vec!["alice@example.org"]);
}

#[test]
fn concurrent_replaces_leave_one_complete_set() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let handles: Vec<_> = (0 .. 8)
        .map(|index| {
            let store = store.clone();
            thread::spawn(move || {
                let emails: Vec<Email> =
                    (0 .. 3).map(|n| Email::new(format!("u{index}-{n}@example.org"))).collect();
                store.replace_users_for_target("STUDY1", &emails).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let grants = store.all_authorities().unwrap();
    assert_eq!(grants.len(), 3);
    let prefix = grants[0].email.as_str().split('-').next().unwrap().to_string();
    assert!(grants.iter().all(|grant| grant.email.as_str().starts_with(&prefix)));
}
