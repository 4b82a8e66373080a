//! High-level SDK for Verso.
//!
//! [`VersionManager`] is the main entry point for applications: it
//! snapshots files, lists and restores their versions, and diffs versions
//! or live files, with eligibility gates applied first.

pub mod config;
pub mod error;
pub mod manager;

pub use config::{default_versions_root, SdkConfig};
pub use error::{SdkError, SdkResult};
pub use manager::{FileComparison, FileInfo, VersionManager};

// Re-export key types
pub use verso_classify::{ClassifierConfig, Eligibility};
pub use verso_diff::{DiffAlgorithm, DiffEntry, DiffResult, DiffStats, LineRef};
pub use verso_fs::{FileSystem, InMemoryFileSystem, LocalFileSystem};
pub use verso_store::{VersionComparison, RESTORE_BACKUP_COMMENT};
pub use verso_types::{ContentHash, FileIdentity, VersionId, VersionRecord};
