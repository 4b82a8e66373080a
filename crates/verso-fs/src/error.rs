use std::io;
use std::path::{Path, PathBuf};

/// Errors from file-system collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A file operation was attempted on a directory.
    #[error("is a directory: {}", .0.display())]
    IsADirectory(PathBuf),

    /// A directory operation was attempted on a file.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The backend refused the operation.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an `io::Error` raised while touching `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Returns `true` for [`FsError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result alias for file-system operations.
pub type FsResult<T> = Result<T, FsError>;
