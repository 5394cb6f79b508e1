// crates/portal-access-cli/src/lib.rs
// ============================================================================
// Module: Portal Access CLI Library
// Description: Shared helpers for the portal-access command-line binary.
// Purpose: Expose the message catalog to the binary and its tests.
// Dependencies: Standard library
// ============================================================================

//! ## Overview
//! Library half of the `portal-access` CLI. The binary routes all user-facing
//! output through [`i18n`] so messages stay in one catalog.

/// Message catalog and the [`t!`] formatting macro.
pub mod i18n;
