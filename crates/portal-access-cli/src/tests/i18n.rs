// crates/portal-access-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Unit tests for catalog lookup and placeholder substitution.
// Purpose: Ensure CLI messages render deterministically.
// Dependencies: portal-access-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies catalog lookup, placeholder substitution, and key fallback.

use crate::i18n::MessageArg;
use crate::i18n::has_key;
use crate::i18n::translate;

#[test]
fn translate_substitutes_placeholders() {
    let output = translate(
        "import.done",
        vec![MessageArg::new("users", "3"), MessageArg::new("authorities", "7")],
    );
    assert_eq!(output, "Imported 3 users and 7 authorities.");
}

#[test]
fn translate_leaves_missing_placeholder_in_place() {
    let output = translate("user.created", Vec::new());
    assert_eq!(output, "Created user {email}.");
}

#[test]
fn translate_unknown_key_falls_back_to_key() {
    assert!(!has_key("no.such.key"));
    assert_eq!(translate("no.such.key", Vec::new()), "no.such.key");
}

#[test]
fn macro_formats_named_arguments() {
    let output = crate::t!("study.users.set", count = 2, study = "acc_tcga");
    assert_eq!(output, "Set 2 users on study acc_tcga.");
}

#[test]
fn output_stream_keys_exist() {
    for key in ["output.stream.stdout", "output.stream.stderr", "output.stream.unknown"] {
        assert!(has_key(key), "missing {key}");
    }
}
