use std::path::PathBuf;

use thiserror::Error;
use verso_fs::FsError;
use verso_store::StoreError;
use verso_types::VersionId;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("version {id} not found for {path}")]
    VersionNotFound { path: String, id: VersionId },

    #[error("{} cannot be compared: {reason}", path.display())]
    NotComparable { path: PathBuf, reason: String },

    #[error("{} cannot be versioned: {reason}", path.display())]
    NotVersionable { path: PathBuf, reason: String },

    #[error("corrupt version data: {0}")]
    Corrupt(String),

    #[error("I/O error: {0}")]
    Io(#[from] FsError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<StoreError> for SdkError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(path) => Self::NotFound(path),
            StoreError::VersionNotFound { path, id } => Self::VersionNotFound { path, id },
            e @ (StoreError::HashMismatch { .. } | StoreError::Serialization(_)) => {
                Self::Corrupt(e.to_string())
            }
            StoreError::Fs(e) => Self::Io(e),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
