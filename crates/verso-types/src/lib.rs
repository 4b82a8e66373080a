//! Foundation types for Verso.
//!
//! Every other Verso crate depends on `verso-types`.
//!
//! # Key Types
//!
//! - [`FileIdentity`] -- bucket key derived from a path string
//! - [`ContentHash`] -- BLAKE3 integrity hash of version content
//! - [`VersionId`] / [`VersionClock`] -- time-ordered unique version ids
//! - [`VersionRecord`] -- immutable metadata of one stored version

pub mod content;
pub mod error;
pub mod hasher;
pub mod identity;
pub mod record;
pub mod version;

pub use content::ContentHash;
pub use error::TypeError;
pub use hasher::DomainHasher;
pub use identity::FileIdentity;
pub use record::VersionRecord;
pub use version::{wall_clock_ms, VersionClock, VersionId, VersionStamp};
