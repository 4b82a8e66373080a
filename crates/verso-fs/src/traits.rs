use std::path::Path;

use crate::error::FsResult;

/// The only boundary the versioning core depends on.
///
/// Implementations must satisfy these rules:
/// - `write` replaces the whole file or nothing; a failed write leaves the
///   previous content in place.
/// - `write` requires the parent directory to exist.
/// - `delete`/`delete_dir` report whether something was removed and treat a
///   missing target as `Ok(false)`, not as an error.
/// - All other failures are propagated, never silently ignored.
pub trait FileSystem: Send + Sync {
    /// Whether anything (file or directory) exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Read the whole file.
    fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Replace the file's content, creating it if needed.
    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()>;

    /// Delete a file. Returns `true` if it existed.
    fn delete(&self, path: &Path) -> FsResult<bool>;

    /// File size in bytes.
    fn size(&self, path: &Path) -> FsResult<u64>;

    /// Last modification time, milliseconds since the UNIX epoch.
    fn last_modified(&self, path: &Path) -> FsResult<u64>;

    /// Create a directory; with `recursive`, create missing ancestors too.
    /// Succeeds if the directory already exists.
    fn make_dir(&self, path: &Path, recursive: bool) -> FsResult<()>;

    /// Delete a directory and everything below it. Returns `true` if it
    /// existed.
    fn delete_dir(&self, path: &Path) -> FsResult<bool>;

    /// Names of the direct children of a directory, sorted.
    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>>;

    /// Whether `path` is an existing non-directory.
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path) && !self.is_dir(path)
    }

    /// Read at most `limit` bytes from the start of the file.
    ///
    /// The default reads the whole file; backends that can stop early
    /// should override it.
    fn read_prefix(&self, path: &Path, limit: usize) -> FsResult<Vec<u8>> {
        let mut data = self.read(path)?;
        data.truncate(limit);
        Ok(data)
    }
}
