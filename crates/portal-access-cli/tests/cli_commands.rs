// crates/portal-access-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests running the portal-access binary end to end.
// Purpose: Ensure commands reach the database, audit, and fail closed.
// Dependencies: portal-access-cli binary, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Runs the `portal-access` binary against a seeded SQLite database and checks
//! config validation, grant editing, access checks, and snapshot transfer.
//!
//! Security posture: configuration and import files are untrusted; failures
//! must exit non-zero without changing stored data.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use rusqlite::Connection;
use rusqlite::params;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const PORTAL_SCHEMA: &str = r#"
CREATE TABLE users (
    email VARCHAR(128) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    enabled BOOLEAN NOT NULL
);
CREATE TABLE cancer_study (
    cancer_study_identifier VARCHAR(255) NOT NULL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    "groups" VARCHAR(200)
);
CREATE TABLE authorities (
    email VARCHAR(128) NOT NULL,
    authority VARCHAR(50) NOT NULL
);
"#;

fn portal_access_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_portal-access"))
}

struct Portal {
    dir: TempDir,
    config: PathBuf,
}

impl Portal {
    fn new(export_section: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("portal.db");
        let conn = Connection::open(&db_path).expect("open db");
        conn.execute_batch(PORTAL_SCHEMA).expect("create schema");
        for (identifier, name, groups) in
            [("STUDY1", "Study One", "G1;G2"), ("study2", "Study Two", "G2")]
        {
            conn.execute(
                "INSERT INTO cancer_study (cancer_study_identifier, name, \"groups\") VALUES (?1, \
                 ?2, ?3)",
                params![identifier, name, groups],
            )
            .expect("seed study");
        }
        drop(conn);

        let config = dir.path().join("portal-access.toml");
        let text = format!(
            "[database]\npath = \"{}\"\n\n[audit]\npath = \"{}\"\n\n{export_section}\n",
            db_path.display(),
            dir.path().join("audit.log").display()
        );
        fs::write(&config, text).expect("write config");
        Self {
            dir,
            config,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(portal_access_bin())
            .args(args)
            .arg("--config")
            .arg(&self.config)
            .current_dir(self.dir.path())
            .output()
            .expect("run portal-access")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    fn run_err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
        String::from_utf8_lossy(&output.stderr).into_owned()
    }

    fn audit_log(&self) -> String {
        fs::read_to_string(self.path("audit.log")).unwrap_or_default()
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// SECTION: Config
// ============================================================================

#[test]
fn config_validate_accepts_valid_config() {
    let portal = Portal::new("");
    let stdout = portal.run_ok(&["config", "validate"]);
    assert!(stdout.contains("Config valid."));
}

#[test]
fn config_validate_rejects_out_of_range_limit() {
    let portal = Portal::new("[export]\nmax_import_bytes = 0");
    let stderr = portal.run_err(&["config", "validate"]);
    assert!(stderr.contains("Failed to load config"), "stderr: {stderr}");
}

#[test]
fn version_flag_prints_version() {
    let output = Command::new(portal_access_bin()).arg("--version").output().expect("run");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("portal-access "));
}

// ============================================================================
// SECTION: Users and Grants
// ============================================================================

#[test]
fn user_lifecycle_is_audited() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "alice@example.org", "--name", "Alice"]);
    portal.run_ok(&["user", "grant", "alice@example.org", "STUDY1", "G2"]);

    let dashboard = portal.run_ok(&["dashboard"]);
    assert!(dashboard.contains("users: 1"));
    assert!(dashboard.contains("studies: 2"));
    assert!(dashboard.contains("groups: 2"));

    let shown = portal.run_ok(&["user", "show", "alice@example.org"]);
    assert!(shown.contains("\"study\""));
    assert!(shown.contains("\"group\""));

    let access = portal.run_ok(&["user", "access", "alice@example.org", "study2"]);
    assert!(access.contains("can access"));

    portal.run_ok(&["user", "update", "alice@example.org", "--disable"]);
    let denied = portal.run_ok(&["user", "access", "alice@example.org", "study2"]);
    assert!(denied.contains("cannot access"));

    portal.run_ok(&["user", "delete", "alice@example.org"]);
    let listed = portal.run_ok(&["user", "list"]);
    assert!(!listed.contains("alice@example.org"));

    let audit = portal.audit_log();
    for action in ["user_created", "user_authorities_replaced", "user_updated", "user_deleted"] {
        assert!(audit.contains(action), "missing {action} in {audit}");
    }
}

#[test]
fn duplicate_create_fails_and_is_audited() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "bob@example.org"]);
    let stderr = portal.run_err(&["user", "create", "bob@example.org"]);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");
    assert!(portal.audit_log().contains("\"already_exists\""));
}

#[test]
fn grant_of_unknown_target_is_rejected() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "gina@example.org"]);
    portal.run_ok(&["user", "grant", "gina@example.org", "g1"]);

    let stderr = portal.run_err(&["user", "grant", "gina@example.org", "NO_SUCH_THING"]);
    assert!(stderr.contains("unknown authority target"), "stderr: {stderr}");

    let shown = portal.run_ok(&["user", "show", "gina@example.org"]);
    assert!(shown.contains("\"G1\""));
    assert!(!shown.contains("NO_SUCH_THING"));
}

#[test]
fn update_without_changes_is_rejected() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "carol@example.org"]);
    let stderr = portal.run_err(&["user", "update", "carol@example.org"]);
    assert!(stderr.contains("Nothing to update"));
}

#[test]
fn study_and_group_users_replace_grants() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "a@example.org"]);
    portal.run_ok(&["user", "create", "b@example.org"]);

    portal.run_ok(&["study", "users", "study1", "a@example.org"]);
    portal.run_ok(&["group", "users", "G1", "b@example.org"]);

    let study = portal.run_ok(&["study", "show", "STUDY1"]);
    assert!(study.contains("a@example.org"));
    assert!(study.contains("b@example.org"));

    let group = portal.run_ok(&["group", "show", "G1"]);
    assert!(group.contains("STUDY1"));
    assert!(group.contains("b@example.org"));

    let stderr = portal.run_err(&["study", "users", "study1", "ghost@example.org"]);
    assert!(stderr.contains("unknown user"), "stderr: {stderr}");
    let study = portal.run_ok(&["study", "show", "STUDY1"]);
    assert!(study.contains("a@example.org"));
}

// ============================================================================
// SECTION: Transfer
// ============================================================================

#[test]
fn export_then_import_restores_users() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "dave@example.org", "--name", "Dave"]);
    portal.run_ok(&["user", "grant", "dave@example.org", "ALL"]);

    let export = portal.path("snapshot.yaml");
    portal.run_ok(&["export", "--output", &path_arg(&export)]);
    let document = fs::read_to_string(&export).expect("read export");
    assert!(document.contains("cbioportal:ALL"));

    portal.run_ok(&["user", "delete", "dave@example.org"]);
    let stdout = portal.run_ok(&["import", &path_arg(&export)]);
    assert!(stdout.contains("Imported 1 users and 1 authorities."));

    let shown = portal.run_ok(&["user", "show", "dave@example.org"]);
    assert!(shown.contains("\"all\""));
}

#[test]
fn export_defaults_to_timestamped_name() {
    let portal = Portal::new("[export]\nfilename_suffix = \"portal_users.yaml\"");
    let stdout = portal.run_ok(&["export"]);
    assert!(stdout.contains("_portal_users.yaml"));
    let written = fs::read_dir(portal.dir.path())
        .expect("list dir")
        .filter_map(Result::ok)
        .any(|entry| entry.file_name().to_string_lossy().ends_with("_portal_users.yaml"));
    assert!(written);
}

#[test]
fn oversized_import_fails_without_changes() {
    let portal = Portal::new("[export]\nmax_import_bytes = 16");
    portal.run_ok(&["user", "create", "erin@example.org"]);

    let snapshot = portal.path("big.yaml");
    fs::write(&snapshot, "users: []\nauthorities: []\n# padding padding padding\n")
        .expect("write snapshot");
    let stderr = portal.run_err(&["import", &path_arg(&snapshot)]);
    assert!(stderr.contains("limit is 16 bytes"), "stderr: {stderr}");

    let listed = portal.run_ok(&["user", "list"]);
    assert!(listed.contains("erin@example.org"));
}

#[test]
fn malformed_import_fails_without_changes() {
    let portal = Portal::new("");
    portal.run_ok(&["user", "create", "frank@example.org"]);

    let snapshot = portal.path("bad.yaml");
    fs::write(&snapshot, "users:\n  - email: x@example.org\n    enabled: 2\n")
        .expect("write snapshot");
    portal.run_err(&["import", &path_arg(&snapshot)]);

    let listed = portal.run_ok(&["user", "list"]);
    assert!(listed.contains("frank@example.org"));
    assert!(!listed.contains("x@example.org"));
}
