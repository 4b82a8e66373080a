use std::path::PathBuf;

use verso_fs::FsError;
use verso_types::VersionId;

/// Errors from version store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The live file does not exist (or is a directory).
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// No version with this id exists for the file.
    #[error("version {id} not found for {path}")]
    VersionNotFound { path: String, id: VersionId },

    /// Stored content no longer matches its recorded hash.
    #[error("hash mismatch for version {id}: expected {expected}, computed {computed}")]
    HashMismatch {
        id: VersionId,
        expected: String,
        computed: String,
    },

    /// A metadata record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The file-system collaborator failed.
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
