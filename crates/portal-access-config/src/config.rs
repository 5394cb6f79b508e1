// crates/portal-access-config/src/config.rs
// ============================================================================
// Module: Portal Access Configuration
// Description: Configuration loading and validation for portal access tools.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: portal-access-core, portal-access-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with size and path limits. Every
//! section is optional; an empty file selects `portal.db` in verify mode,
//! stderr auditing, and the default export settings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use portal_access_core::DEFAULT_MAX_SNAPSHOT_BYTES;
use portal_access_core::EXPORT_FILENAME_SUFFIX;
use portal_access_store_sqlite::SqliteSchemaMode;
use portal_access_store_sqlite::SqliteStoreConfig;
use portal_access_store_sqlite::SqliteStoreMode;
use portal_access_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "portal-access.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PORTAL_ACCESS_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default portal database path.
const DEFAULT_DATABASE_PATH: &str = "portal.db";
/// Default busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum busy timeout in milliseconds.
const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Hard upper bound for `export.max_import_bytes`.
pub const MAX_IMPORT_BYTES_LIMIT: usize = 256 * 1024 * 1024;
/// Maximum length of the export filename suffix.
const MAX_FILENAME_SUFFIX_LENGTH: usize = 128;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Portal access tool configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortalAccessConfig {
    /// Portal database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Export/import configuration.
    #[serde(default)]
    pub export: ExportConfig,
}

impl PortalAccessConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit path, then `PORTAL_ACCESS_CONFIG`, then
    /// `portal-access.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.audit.validate()?;
        self.export.validate()
    }
}

/// Portal database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` database path.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Whether missing portal tables are created or reported.
    #[serde(default)]
    pub schema_mode: SqliteSchemaMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            schema_mode: SqliteSchemaMode::default(),
        }
    }
}

impl DatabaseConfig {
    /// Validates database configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_field("database.path", &self.path)?;
        if self.busy_timeout_ms == 0 || self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "database.busy_timeout_ms must be between 1 and {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Builds the `SQLite` store configuration.
    #[must_use]
    pub fn to_store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.path.clone(),
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode,
            sync_mode: self.sync_mode,
            schema_mode: self.schema_mode,
        }
    }
}

/// Audit logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Whether mutations are audited.
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
    /// Optional JSON-lines log file; stderr when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            path: None,
        }
    }
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if !self.enabled {
                return Err(ConfigError::Invalid(
                    "audit.path must not be set when audit is disabled".to_string(),
                ));
            }
            validate_path_field("audit.path", path)?;
        }
        Ok(())
    }
}

/// Export/import configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Suffix appended to the timestamp in export filenames.
    #[serde(default = "default_filename_suffix")]
    pub filename_suffix: String,
    /// Maximum accepted size of an import document in bytes.
    #[serde(default = "default_max_import_bytes")]
    pub max_import_bytes: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename_suffix: default_filename_suffix(),
            max_import_bytes: DEFAULT_MAX_SNAPSHOT_BYTES,
        }
    }
}

impl ExportConfig {
    /// Validates export configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let suffix = self.filename_suffix.trim();
        if suffix.is_empty() {
            return Err(ConfigError::Invalid("export.filename_suffix must be non-empty".to_string()));
        }
        if suffix != self.filename_suffix {
            return Err(ConfigError::Invalid("export.filename_suffix must be trimmed".to_string()));
        }
        if suffix.len() > MAX_FILENAME_SUFFIX_LENGTH {
            return Err(ConfigError::Invalid("export.filename_suffix exceeds max length".to_string()));
        }
        if suffix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(
                "export.filename_suffix must not contain path separators".to_string(),
            ));
        }
        if self.max_import_bytes == 0 || self.max_import_bytes > MAX_IMPORT_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "export.max_import_bytes must be between 1 and {MAX_IMPORT_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Returns the default database path.
fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default audit switch.
const fn default_audit_enabled() -> bool {
    true
}

/// Returns the default export filename suffix.
fn default_filename_suffix() -> String {
    EXPORT_FILENAME_SUFFIX.to_string()
}

/// Returns the default import size limit.
const fn default_max_import_bytes() -> usize {
    DEFAULT_MAX_SNAPSHOT_BYTES
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path field against length constraints.
fn validate_path_field(field: &str, path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
