use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FsError, FsResult};
use crate::traits::FileSystem;

#[derive(Clone, Debug)]
enum Node {
    File { data: Vec<u8>, modified_ms: u64 },
    Dir,
}

/// In-memory [`FileSystem`], for tests and embedding.
///
/// Paths are compared component-wise exactly as given; no normalisation is
/// performed. The filesystem root and the empty path always exist as
/// directories.
///
/// [`deny_writes`](Self::deny_writes) makes every mutation under a prefix
/// fail with [`FsError::PermissionDenied`], which lets tests inject failures
/// at precise points.
pub struct InMemoryFileSystem {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
    denied: RwLock<Vec<PathBuf>>,
}

impl InMemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(BTreeMap::new()),
            denied: RwLock::new(Vec::new()),
        }
    }

    /// Insert a file, creating any missing ancestor directories.
    ///
    /// Ignores write denials; this is a fixture helper.
    pub fn insert_file(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.write().expect("lock poisoned");
        for ancestor in path.ancestors().skip(1) {
            if is_implicit_dir(ancestor) {
                break;
            }
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Dir);
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                data: data.into(),
                modified_ms: now_ms(),
            },
        );
    }

    /// Fail every write, delete and mkdir at or below `prefix`.
    pub fn deny_writes(&self, prefix: impl Into<PathBuf>) {
        self.denied
            .write()
            .expect("lock poisoned")
            .push(prefix.into());
    }

    /// Lift all denials.
    pub fn allow_writes(&self) {
        self.denied.write().expect("lock poisoned").clear();
    }

    /// Number of files (not directories) currently held.
    pub fn file_count(&self) -> usize {
        self.nodes
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|n| matches!(n, Node::File { .. }))
            .count()
    }

    fn check_writable(&self, path: &Path) -> FsResult<()> {
        let denied = self.denied.read().expect("lock poisoned");
        if denied.iter().any(|prefix| path.starts_with(prefix)) {
            return Err(FsError::PermissionDenied(path.to_path_buf()));
        }
        Ok(())
    }

    fn parent_exists(nodes: &BTreeMap<PathBuf, Node>, path: &Path) -> bool {
        match path.parent() {
            None => true,
            Some(parent) if is_implicit_dir(parent) => true,
            Some(parent) => matches!(nodes.get(parent), Some(Node::Dir)),
        }
    }

    fn file_meta(&self, path: &Path) -> FsResult<(u64, u64)> {
        let nodes = self.nodes.read().expect("lock poisoned");
        match nodes.get(path) {
            Some(Node::File { data, modified_ms }) => Ok((data.len() as u64, *modified_ms)),
            Some(Node::Dir) => Err(FsError::IsADirectory(path.to_path_buf())),
            None if is_implicit_dir(path) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn is_implicit_dir(path: &Path) -> bool {
    path.as_os_str().is_empty() || path.parent().is_none()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

impl FileSystem for InMemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        is_implicit_dir(path) || self.nodes.read().expect("lock poisoned").contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        is_implicit_dir(path)
            || matches!(
                self.nodes.read().expect("lock poisoned").get(path),
                Some(Node::Dir)
            )
    }

    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        let nodes = self.nodes.read().expect("lock poisoned");
        match nodes.get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir) => Err(FsError::IsADirectory(path.to_path_buf())),
            None if is_implicit_dir(path) => Err(FsError::IsADirectory(path.to_path_buf())),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()> {
        self.check_writable(path)?;
        if is_implicit_dir(path) {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        let mut nodes = self.nodes.write().expect("lock poisoned");
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        if !Self::parent_exists(&nodes, path) {
            let parent = path.parent().unwrap_or(path);
            return Err(FsError::NotFound(parent.to_path_buf()));
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File {
                data: data.to_vec(),
                modified_ms: now_ms(),
            },
        );
        Ok(())
    }

    fn delete(&self, path: &Path) -> FsResult<bool> {
        self.check_writable(path)?;
        let mut nodes = self.nodes.write().expect("lock poisoned");
        if matches!(nodes.get(path), Some(Node::Dir)) {
            return Err(FsError::IsADirectory(path.to_path_buf()));
        }
        Ok(nodes.remove(path).is_some())
    }

    fn size(&self, path: &Path) -> FsResult<u64> {
        self.file_meta(path).map(|(size, _)| size)
    }

    fn last_modified(&self, path: &Path) -> FsResult<u64> {
        self.file_meta(path).map(|(_, modified)| modified)
    }

    fn make_dir(&self, path: &Path, recursive: bool) -> FsResult<()> {
        if is_implicit_dir(path) {
            return Ok(());
        }
        self.check_writable(path)?;
        let mut nodes = self.nodes.write().expect("lock poisoned");
        match nodes.get(path) {
            Some(Node::Dir) => return Ok(()),
            Some(Node::File { .. }) => return Err(FsError::NotADirectory(path.to_path_buf())),
            None => {}
        }

        let missing: Vec<PathBuf> = path
            .ancestors()
            .take_while(|p| !is_implicit_dir(p) && !nodes.contains_key(*p))
            .map(Path::to_path_buf)
            .collect();

        if missing.len() > 1 && !recursive {
            let parent = path.parent().unwrap_or(path);
            return Err(FsError::NotFound(parent.to_path_buf()));
        }
        // The first existing ancestor must be a directory.
        if let Some(existing) = path.ancestors().nth(missing.len()) {
            if matches!(nodes.get(existing), Some(Node::File { .. })) {
                return Err(FsError::NotADirectory(existing.to_path_buf()));
            }
        }
        for dir in missing {
            nodes.insert(dir, Node::Dir);
        }
        Ok(())
    }

    fn delete_dir(&self, path: &Path) -> FsResult<bool> {
        self.check_writable(path)?;
        let mut nodes = self.nodes.write().expect("lock poisoned");
        match nodes.get(path) {
            None => return Ok(false),
            Some(Node::File { .. }) => return Err(FsError::NotADirectory(path.to_path_buf())),
            Some(Node::Dir) => {}
        }
        nodes.retain(|p, _| !p.starts_with(path));
        Ok(true)
    }

    fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
        let nodes = self.nodes.read().expect("lock poisoned");
        if !is_implicit_dir(path) {
            match nodes.get(path) {
                None => return Err(FsError::NotFound(path.to_path_buf())),
                Some(Node::File { .. }) => {
                    return Err(FsError::NotADirectory(path.to_path_buf()))
                }
                Some(Node::Dir) => {}
            }
        }
        // BTreeMap iteration is ordered, so the names come out sorted.
        let names = nodes
            .keys()
            .filter(|p| p.parent() == Some(path))
            .filter_map(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_creates_ancestors() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/work/docs/a.txt", "hello");

        assert!(fs.is_dir(Path::new("/work")));
        assert!(fs.is_dir(Path::new("/work/docs")));
        assert!(fs.is_file(Path::new("/work/docs/a.txt")));
        assert_eq!(fs.read(Path::new("/work/docs/a.txt")).unwrap(), b"hello");
        assert_eq!(fs.size(Path::new("/work/docs/a.txt")).unwrap(), 5);
        assert_eq!(fs.file_count(), 1);
    }

    #[test]
    fn write_requires_parent_dir() {
        let fs = InMemoryFileSystem::new();
        let err = fs.write(Path::new("/nope/a.txt"), b"x").unwrap_err();
        assert!(err.is_not_found());

        fs.make_dir(Path::new("/nope"), false).unwrap();
        fs.write(Path::new("/nope/a.txt"), b"x").unwrap();
        assert_eq!(fs.read(Path::new("/nope/a.txt")).unwrap(), b"x");
    }

    #[test]
    fn top_level_files_need_no_parent() {
        let fs = InMemoryFileSystem::new();
        fs.write(Path::new("/a.txt"), b"root").unwrap();
        fs.write(Path::new("b.txt"), b"relative").unwrap();
        assert!(fs.exists(Path::new("/a.txt")));
        assert!(fs.exists(Path::new("b.txt")));
    }

    #[test]
    fn write_over_directory_fails() {
        let fs = InMemoryFileSystem::new();
        fs.make_dir(Path::new("/d"), false).unwrap();
        assert!(matches!(
            fs.write(Path::new("/d"), b"x"),
            Err(FsError::IsADirectory(_))
        ));
        assert!(matches!(fs.read(Path::new("/d")), Err(FsError::IsADirectory(_))));
    }

    #[test]
    fn non_recursive_mkdir_needs_parent() {
        let fs = InMemoryFileSystem::new();
        assert!(fs.make_dir(Path::new("/a/b/c"), false).is_err());
        fs.make_dir(Path::new("/a/b/c"), true).unwrap();
        assert!(fs.is_dir(Path::new("/a")));
        assert!(fs.is_dir(Path::new("/a/b")));
        assert!(fs.is_dir(Path::new("/a/b/c")));
        fs.make_dir(Path::new("/a/b/c"), false).unwrap();
    }

    #[test]
    fn mkdir_under_a_file_fails() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/f", "x");
        assert!(matches!(
            fs.make_dir(Path::new("/f"), true),
            Err(FsError::NotADirectory(_))
        ));
        assert!(matches!(
            fs.make_dir(Path::new("/f/sub"), true),
            Err(FsError::NotADirectory(_))
        ));
    }

    #[test]
    fn delete_reports_presence() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/a.txt", "x");
        assert!(fs.delete(Path::new("/a.txt")).unwrap());
        assert!(!fs.delete(Path::new("/a.txt")).unwrap());
        assert!(!fs.exists(Path::new("/a.txt")));
    }

    #[test]
    fn delete_dir_removes_subtree_only() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/v/b1/x.json", "{}");
        fs.insert_file("/v/b1/x.content", "x");
        fs.insert_file("/v/b10/y.json", "{}");

        assert!(fs.delete_dir(Path::new("/v/b1")).unwrap());
        assert!(!fs.exists(Path::new("/v/b1")));
        assert!(!fs.exists(Path::new("/v/b1/x.json")));
        // A sibling sharing the name prefix survives.
        assert!(fs.exists(Path::new("/v/b10/y.json")));
        assert!(!fs.delete_dir(Path::new("/v/b1")).unwrap());
    }

    #[test]
    fn list_dir_returns_direct_children_sorted() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/d/b.txt", "");
        fs.insert_file("/d/a.txt", "");
        fs.insert_file("/d/sub/c.txt", "");

        assert_eq!(
            fs.list_dir(Path::new("/d")).unwrap(),
            vec!["a.txt".to_string(), "b.txt".to_string(), "sub".to_string()]
        );
        assert!(fs.list_dir(Path::new("/missing")).unwrap_err().is_not_found());
    }

    #[test]
    fn denied_prefix_blocks_mutations() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/v/a.json", "{}");
        fs.deny_writes("/v");

        assert!(matches!(
            fs.write(Path::new("/v/b.json"), b"x"),
            Err(FsError::PermissionDenied(_))
        ));
        assert!(matches!(
            fs.delete(Path::new("/v/a.json")),
            Err(FsError::PermissionDenied(_))
        ));
        assert!(matches!(
            fs.make_dir(Path::new("/v/sub"), true),
            Err(FsError::PermissionDenied(_))
        ));
        // Reads still work, and paths outside the prefix are unaffected.
        assert_eq!(fs.read(Path::new("/v/a.json")).unwrap(), b"{}");
        fs.write(Path::new("/other.txt"), b"ok").unwrap();

        fs.allow_writes();
        fs.write(Path::new("/v/b.json"), b"x").unwrap();
    }

    #[test]
    fn read_prefix_uses_default() {
        let fs = InMemoryFileSystem::new();
        fs.insert_file("/a", vec![7u8; 50]);
        assert_eq!(fs.read_prefix(Path::new("/a"), 8).unwrap(), vec![7u8; 8]);
    }
}
