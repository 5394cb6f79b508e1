// crates/portal-access-store-sqlite/src/lib.rs
// ============================================================================
// Module: Portal Access SQLite Store
// Description: Portal store backend over a SQLite database.
// Purpose: Read studies and manage users and grants in the portal tables.
// Dependencies: portal-access-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed implementation of every portal access
//! interface. It reads the portal's `cancer_study` table and writes the
//! `users` and `authorities` tables, running each multi-statement mutation in
//! a single transaction. The database schema belongs to the portal; the store
//! only verifies it unless asked to create missing tables.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqlitePortalStore;
pub use store::SqliteSchemaMode;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
