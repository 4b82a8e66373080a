//! On-disk version store for Verso.
//!
//! Versions of one file live together in a bucket named after the file's
//! [`FileIdentity`](verso_types::FileIdentity). Each version is an
//! immutable pair of a JSON metadata record and a raw content blob; the
//! store never rewrites either after creation.

pub mod config;
pub mod error;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::{VersionComparison, VersionStore, RESTORE_BACKUP_COMMENT};
