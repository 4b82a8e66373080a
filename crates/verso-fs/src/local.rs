use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

use tempfile::NamedTempFile;
use tracing::trace;

use crate::error::{FsError, FsResult};
use crate::traits::FileSystem;

/// [`FileSystem`] backed by the host file system.
///
/// Writes go to a temporary file in the target's directory and are renamed
/// into place, so readers see either the old or the new content, never a
/// torn file.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        if path.is_dir() {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        fs::read(path).map_err(|e| FsError::io(path, e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()> {
        if path.is_dir() {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        // Writing through a symlink replaces its target, not the link.
        let resolved;
        let path = match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                resolved = fs::canonicalize(path).map_err(|e| FsError::io(path, e))?;
                resolved.as_path()
            }
            _ => path,
        };
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(FsError::NotFound(parent.to_path_buf()));
        }

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| FsError::io(parent, e))?;
        tmp.write_all(data).map_err(|e| FsError::io(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| FsError::io(tmp.path(), e))?;

        // Keep the mode of a file being replaced; temp files start as 0600.
        if let Ok(meta) = fs::metadata(path) {
            fs::set_permissions(tmp.path(), meta.permissions())
                .map_err(|e| FsError::io(tmp.path(), e))?;
        }

        tmp.persist(path).map_err(|e| FsError::io(path, e.error))?;
        trace!(path = %path.display(), bytes = data.len(), "wrote file");
        Ok(())
    }

    fn delete(&self, path: &Path) -> FsResult<bool> {
        if path.is_dir() {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FsError::io(path, e)),
        }
    }

    fn size(&self, path: &Path) -> FsResult<u64> {
        let meta = fs::metadata(path).map_err(|e| FsError::io(path, e))?;
        Ok(meta.len())
    }

    fn last_modified(&self, path: &Path) -> FsResult<u64> {
        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| FsError::io(path, e))?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64)
    }

    fn make_dir(&self, path: &Path, recursive: bool) -> FsResult<()> {
        if path.is_dir() {
            return Ok(());
        }
        let result = if recursive {
            fs::create_dir_all(path)
        } else {
            fs::create_dir(path)
        };
        result.map_err(|e| FsError::io(path, e))
    }

    fn delete_dir(&self, path: &Path) -> FsResult<bool> {
        if !path.exists() {
            return Ok(false);
        }
        if !path.is_dir() {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }
        fs::remove_dir_all(path).map_err(|e| FsError::io(path, e))?;
        Ok(true)
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        if path.exists() && !path.is_dir() {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| FsError::io(path, e))? {
            let entry = entry.map_err(|e| FsError::io(path, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn read_prefix(&self, path: &Path, limit: usize) -> FsResult<Vec<u8>> {
        let file = File::open(path).map_err(|e| FsError::io(path, e))?;
        let mut data = Vec::with_capacity(limit.min(64 * 1024));
        file.take(limit as u64)
            .read_to_end(&mut data)
            .map_err(|e| FsError::io(path, e))?;
        Ok(data)
    }
}
