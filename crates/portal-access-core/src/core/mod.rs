// crates/portal-access-core/src/core/mod.rs
// ============================================================================
// Module: Portal Access Core Types
// Description: Identifiers, records, authority codec, and transfer documents.
// Purpose: Group the data model shared by every store and consumer.
// Dependencies: serde, serde_yaml, time
// ============================================================================

//! ## Overview
//! Pure data types with no storage dependencies. Stores translate rows into
//! these records at their boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authority;
pub mod identifiers;
pub mod records;
pub mod transfer;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authority::ALL_TARGET;
pub use authority::AUTHORITY_PREFIX;
pub use authority::AuthorityKind;
pub use authority::decode_authority;
pub use authority::encode_authority;
pub use authority::is_all_target;
pub use identifiers::Email;
pub use identifiers::GroupName;
pub use identifiers::StudyId;
pub use records::Authority;
pub use records::GROUP_FIELD_DELIMITER;
pub use records::Group;
pub use records::Study;
pub use records::User;
pub use records::parse_group_field;
pub use transfer::DEFAULT_MAX_SNAPSHOT_BYTES;
pub use transfer::EXPORT_FILENAME_SUFFIX;
pub use transfer::PortalSnapshot;
pub use transfer::SNAPSHOT_FORMAT_VERSION;
pub use transfer::SnapshotError;
pub use transfer::SnapshotAuthority;
pub use transfer::SnapshotUser;
pub use transfer::export_filename;
pub use transfer::export_filename_with_suffix;
