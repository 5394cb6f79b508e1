// crates/portal-access-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for CLI output.
// Purpose: Keep every user-facing string of the CLI in one table.
// Dependencies: Standard library collections
// ============================================================================

//! ## Overview
//! The CLI stores user-facing strings in a static catalog keyed by dotted
//! names. Output is produced with the [`t!`](crate::t) macro, which looks up
//! the template and substitutes `{name}` placeholders.
//!
//! ## Invariants
//! - The catalog is built once and read-only thereafter.
//! - Unknown keys render as the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A named value substituted into a message template.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (e.g., `"email"`).
    pub key: &'static str,
    /// Rendered value.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "portal-access {version}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config valid."),
    ("store.open_failed", "Failed to open portal database: {error}"),
    ("audit.open_failed", "Failed to open audit log {path}: {error}"),
    (
        "dashboard.summary",
        "users: {users}\nstudies: {studies}\ngroups: {groups}",
    ),
    ("user.created", "Created user {email}."),
    ("user.updated", "Updated user {email}."),
    ("user.deleted", "Deleted user {email}."),
    ("user.granted", "Set {count} authorities for {email}."),
    ("user.access.allowed", "{email} can access {study}."),
    ("user.access.denied", "{email} cannot access {study}."),
    ("user.update.nothing", "Nothing to update; pass --name, --enable, or --disable."),
    ("study.users.set", "Set {count} users on study {study}."),
    ("group.users.set", "Set {count} users on group {group}."),
    ("export.written", "Exported portal users to {path}."),
    ("export.write_failed", "Failed to write export {path}: {error}"),
    ("import.read_failed", "Failed to read import {path}: {error}"),
    ("import.too_large", "Import {path} is {size} bytes; limit is {limit} bytes."),
    ("import.not_utf8", "Import {path} is not valid UTF-8."),
    ("import.done", "Imported {users} users and {authorities} authorities."),
    ("command.failed", "{error}"),
    ("output.json_failed", "Failed to render output: {error}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Looks up `key` and substitutes `args` into its placeholders.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns `true` when `key` has a catalog entry.
#[must_use]
pub fn has_key(key: &str) -> bool {
    catalog().contains_key(key)
}

/// Returns the static catalog.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
