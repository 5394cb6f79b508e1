//! Config defaults and validation tests for portal-access-config.
// crates/portal-access-config/tests/config_validation.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate defaults, section parsing, and field limits.
// Purpose: Ensure minimal config is valid and invalid values fail closed.
// =============================================================================

use std::path::PathBuf;

use portal_access_config::ConfigError;
use portal_access_config::MAX_IMPORT_BYTES_LIMIT;
use portal_access_config::PortalAccessConfig;
use portal_access_core::DEFAULT_MAX_SNAPSHOT_BYTES;
use portal_access_core::EXPORT_FILENAME_SUFFIX;
use portal_access_store_sqlite::SqliteSchemaMode;
use portal_access_store_sqlite::SqliteStoreMode;
use portal_access_store_sqlite::SqliteSyncMode;
use tempfile::TempDir;

mod common;

use common::TestResult;
use common::assert_invalid;

#[test]
fn minimal_config_is_valid_with_defaults() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    if config.database.path != PathBuf::from("portal.db") {
        return Err("unexpected default database path".to_string());
    }
    if config.database.schema_mode != SqliteSchemaMode::Verify {
        return Err("schema_mode must default to verify".to_string());
    }
    if !config.audit.enabled || config.audit.path.is_some() {
        return Err("audit must default to stderr".to_string());
    }
    if config.export.max_import_bytes != DEFAULT_MAX_SNAPSHOT_BYTES
        || config.export.filename_suffix != EXPORT_FILENAME_SUFFIX
    {
        return Err("unexpected export defaults".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses_every_section() -> TestResult {
    let config = common::config_from_toml(
        r#"
[database]
path = "/var/lib/portal/portal.db"
busy_timeout_ms = 2500
journal_mode = "delete"
sync_mode = "normal"
schema_mode = "create_missing"

[audit]
enabled = true
path = "/var/log/portal-access.jsonl"

[export]
filename_suffix = "users.yaml"
max_import_bytes = 1048576
"#,
    )
    .map_err(|err| err.to_string())?;
    config.validate().map_err(|err| err.to_string())?;
    let store = config.database.to_store_config();
    if store.journal_mode != SqliteStoreMode::Delete
        || store.sync_mode != SqliteSyncMode::Normal
        || store.schema_mode != SqliteSchemaMode::CreateMissing
        || store.busy_timeout_ms != 2_500
    {
        return Err("database section not mapped to store config".to_string());
    }
    if config.export.max_import_bytes != 1_048_576 {
        return Err("export.max_import_bytes not parsed".to_string());
    }
    Ok(())
}

#[test]
fn unknown_schema_mode_fails_to_parse() {
    let result = common::config_from_toml("[database]\nschema_mode = \"drop_all\"\n");
    assert!(result.is_err());
}

#[test]
fn busy_timeout_must_be_positive() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.busy_timeout_ms = 0;
    assert_invalid(config.validate(), "database.busy_timeout_ms")
}

#[test]
fn database_path_must_be_set() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.database.path = PathBuf::from("  ");
    assert_invalid(config.validate(), "database.path must be non-empty")
}

#[test]
fn audit_path_requires_audit_enabled() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.audit.enabled = false;
    config.audit.path = Some(PathBuf::from("audit.jsonl"));
    assert_invalid(config.validate(), "audit.path must not be set")
}

#[test]
fn filename_suffix_rejects_separators() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.export.filename_suffix = "../users.yaml".to_string();
    assert_invalid(config.validate(), "must not contain path separators")
}

#[test]
fn import_limit_is_bounded() -> TestResult {
    let mut config = common::minimal_config().map_err(|err| err.to_string())?;
    config.export.max_import_bytes = 0;
    assert_invalid(config.validate(), "export.max_import_bytes")?;
    config.export.max_import_bytes = MAX_IMPORT_BYTES_LIMIT + 1;
    assert_invalid(config.validate(), "export.max_import_bytes")
}

#[test]
fn load_reads_and_validates_file() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let path = dir.path().join("portal-access.toml");
    std::fs::write(&path, "[export]\nmax_import_bytes = 0\n").map_err(|err| err.to_string())?;
    match PortalAccessConfig::load(Some(&path)) {
        Err(ConfigError::Invalid(message)) if message.contains("max_import_bytes") => {}
        Err(other) => return Err(format!("expected invalid max_import_bytes, got {other}")),
        Ok(_) => return Err("expected invalid config".to_string()),
    }
    std::fs::write(&path, "[database]\npath = \"other.db\"\n").map_err(|err| err.to_string())?;
    let config = PortalAccessConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.database.path != PathBuf::from("other.db") {
        return Err("database.path not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_reports_missing_file_as_io() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    match PortalAccessConfig::load(Some(&dir.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("expected io error, got {other}")),
        Ok(_) => Err("expected missing config to fail".to_string()),
    }
}
