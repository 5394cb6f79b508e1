// crates/portal-access-config/src/lib.rs
// ============================================================================
// Module: Portal Access Config Library
// Description: Configuration model and validation for portal access tools.
// Purpose: Single source of truth for portal-access.toml semantics.
// Dependencies: portal-access-core, portal-access-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `portal-access-config` defines the configuration model for the portal
//! access tools. Loading is size-limited and validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
