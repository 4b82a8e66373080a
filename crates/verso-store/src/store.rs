use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};
use verso_diff::{DiffEngine, DiffResult};
use verso_fs::{FileSystem, FsError};
use verso_types::{ContentHash, FileIdentity, VersionClock, VersionId, VersionRecord};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Comment attached to the version `restore` takes of the pre-restore state.
pub const RESTORE_BACKUP_COMMENT: &str = "automatic backup before restore";

const METADATA_EXT: &str = "json";
const CONTENT_EXT: &str = "content";

/// Two stored versions of one file and the diff between them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionComparison {
    pub left: VersionRecord,
    pub right: VersionRecord,
    pub diff: DiffResult,
}

/// Content-addressed store of file versions.
///
/// Layout under the root, one bucket per [`FileIdentity`]:
///
/// ```text
/// <root>/<identity>/<version-id>.json     metadata record
/// <root>/<identity>/<version-id>.content  raw bytes
/// ```
///
/// Content is always written before its record and deleted after it, so a
/// visible record always has its blob.
pub struct VersionStore {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    clock: VersionClock,
    engine: DiffEngine,
}

impl VersionStore {
    /// Open a store, creating its root directory if needed.
    pub fn open(fs: Arc<dyn FileSystem>, config: StoreConfig) -> StoreResult<Self> {
        fs.make_dir(&config.root, true)?;
        debug!(root = %config.root.display(), algorithm = ?config.diff_algorithm, "opened version store");
        Ok(Self {
            root: config.root,
            fs,
            clock: VersionClock::new(),
            engine: DiffEngine::new(config.diff_algorithm),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn engine(&self) -> &DiffEngine {
        &self.engine
    }

    /// Bucket key for a path. Depends only on the path's raw bytes.
    pub fn file_identity(&self, path: &Path) -> FileIdentity {
        FileIdentity::derive_bytes(path.as_os_str().as_encoded_bytes())
    }

    /// Snapshot the current content of `path`.
    pub fn create_version(&self, path: &Path, comment: &str) -> StoreResult<VersionRecord> {
        if !self.fs.is_file(path) {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let data = self.fs.read(path).map_err(|e| live_file_error(path, e))?;

        let bucket = self.bucket_dir(path);
        self.fs.make_dir(&bucket, true)?;

        let (id, stamp) = self.clock.next_id();
        let record = VersionRecord {
            id,
            path: path_string(path),
            content_hash: ContentHash::of(&data),
            size: data.len() as u64,
            created_at: stamp.physical_ms,
            comment: comment.to_string(),
        };

        let content_path = artifact(&bucket, &record.id, CONTENT_EXT);
        let metadata_path = artifact(&bucket, &record.id, METADATA_EXT);
        let metadata = serde_json::to_vec_pretty(&record)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.fs.write(&content_path, &data)?;
        if let Err(e) = self.fs.write(&metadata_path, &metadata) {
            // Without its record the blob is unreachable.
            if let Err(cleanup) = self.fs.delete(&content_path) {
                debug!(path = %content_path.display(), error = %cleanup, "orphaned content blob");
            }
            return Err(e.into());
        }

        debug!(
            path = %record.path,
            id = %record.id,
            size = record.size,
            hash = %record.content_hash.short_hex(),
            "created version"
        );
        Ok(record)
    }

    /// All versions of `path`, newest first. Unreadable records are skipped.
    pub fn list_versions(&self, path: &Path) -> StoreResult<Vec<VersionRecord>> {
        let bucket = self.bucket_dir(path);
        if !self.fs.is_dir(&bucket) {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for name in self.fs.list_dir(&bucket)? {
            let entry = bucket.join(&name);
            if entry.extension().map_or(true, |ext| ext != METADATA_EXT) {
                continue;
            }
            match self.read_record(&entry) {
                Ok(record) => records.push(record),
                Err(e) => debug!(path = %entry.display(), error = %e, "skipping unreadable version record"),
            }
        }

        records.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()));
        trace!(path = %path.display(), count = records.len(), "listed versions");
        Ok(records)
    }

    /// Metadata of one version.
    pub fn get_version(&self, path: &Path, id: &VersionId) -> StoreResult<VersionRecord> {
        let metadata_path = artifact(&self.bucket_dir(path), id, METADATA_EXT);
        self.read_record(&metadata_path)
            .map_err(|e| version_error(path, id, e))
    }

    /// Raw bytes of one version.
    pub fn get_content(&self, path: &Path, id: &VersionId) -> StoreResult<Vec<u8>> {
        let content_path = artifact(&self.bucket_dir(path), id, CONTENT_EXT);
        self.fs
            .read(&content_path)
            .map_err(|e| version_error(path, id, e.into()))
    }

    /// Re-hash a version's content and compare with its record.
    pub fn verify_version(&self, path: &Path, id: &VersionId) -> StoreResult<VersionRecord> {
        let record = self.get_version(path, id)?;
        let data = self.get_content(path, id)?;
        check_integrity(&record, &data)?;
        Ok(record)
    }

    /// Replace the live file with version `id`.
    ///
    /// The current content is first saved as a new version; if that fails
    /// the live file is not touched. Returns the backup record.
    pub fn restore(&self, path: &Path, id: &VersionId) -> StoreResult<VersionRecord> {
        let target = self.get_version(path, id)?;
        let data = self.get_content(path, id)?;
        check_integrity(&target, &data)?;

        let backup = self.create_version(path, RESTORE_BACKUP_COMMENT)?;
        self.fs.write(path, &data)?;

        debug!(path = %path.display(), restored = %id, backup = %backup.id, "restored version");
        Ok(backup)
    }

    /// Remove one version. Both its record and blob must exist.
    pub fn delete_version(&self, path: &Path, id: &VersionId) -> StoreResult<()> {
        let bucket = self.bucket_dir(path);
        let metadata_path = artifact(&bucket, id, METADATA_EXT);
        let content_path = artifact(&bucket, id, CONTENT_EXT);
        if !self.fs.is_file(&metadata_path) || !self.fs.is_file(&content_path) {
            return Err(StoreError::VersionNotFound {
                path: path_string(path),
                id: id.clone(),
            });
        }

        self.fs.delete(&metadata_path)?;
        if let Err(e) = self.fs.delete(&content_path) {
            // The record is gone, so only clear_versions can reach the blob now.
            debug!(path = %content_path.display(), error = %e, "orphaned content blob");
            return Err(e.into());
        }
        debug!(path = %path.display(), id = %id, "deleted version");
        Ok(())
    }

    /// Remove every version of `path`. Returns `false` if there were none.
    pub fn clear_versions(&self, path: &Path) -> StoreResult<bool> {
        let removed = self.fs.delete_dir(&self.bucket_dir(path))?;
        debug!(path = %path.display(), removed, "cleared versions");
        Ok(removed)
    }

    /// Diff version `left` against version `right`.
    pub fn compare_versions(
        &self,
        path: &Path,
        left: &VersionId,
        right: &VersionId,
    ) -> StoreResult<VersionComparison> {
        let left_record = self.get_version(path, left)?;
        let right_record = self.get_version(path, right)?;
        let left_data = self.get_content(path, left)?;
        let right_data = self.get_content(path, right)?;

        Ok(VersionComparison {
            diff: self.engine.diff_bytes(&left_data, &right_data),
            left: left_record,
            right: right_record,
        })
    }

    fn bucket_dir(&self, path: &Path) -> PathBuf {
        self.root.join(self.file_identity(path).to_hex())
    }

    fn read_record(&self, metadata_path: &Path) -> StoreResult<VersionRecord> {
        let bytes = self.fs.read(metadata_path)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

fn artifact(bucket: &Path, id: &VersionId, ext: &str) -> PathBuf {
    bucket.join(format!("{}.{ext}", id.as_str()))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn check_integrity(record: &VersionRecord, data: &[u8]) -> StoreResult<()> {
    if record.describes(data) {
        return Ok(());
    }
    Err(StoreError::HashMismatch {
        id: record.id.clone(),
        expected: record.content_hash.to_hex(),
        computed: ContentHash::of(data).to_hex(),
    })
}

/// A missing or directory live file is `NotFound`; anything else propagates.
fn live_file_error(path: &Path, err: FsError) -> StoreError {
    match err {
        FsError::NotFound(_) | FsError::IsADirectory(_) => StoreError::NotFound(path.to_path_buf()),
        other => other.into(),
    }
}

/// A missing artifact means the version does not exist.
fn version_error(path: &Path, id: &VersionId, err: StoreError) -> StoreError {
    match err {
        StoreError::Fs(FsError::NotFound(_)) => StoreError::VersionNotFound {
            path: path_string(path),
            id: id.clone(),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verso_diff::DiffEntry;
    use verso_fs::{FsResult, InMemoryFileSystem, LocalFileSystem};

    const LIVE: &str = "/work/a.txt";
    const ROOT: &str = "/versions";

    fn setup() -> (Arc<InMemoryFileSystem>, VersionStore) {
        let fs = Arc::new(InMemoryFileSystem::new());
        fs.insert_file(LIVE, "line1\nline2\nline3");
        let store = VersionStore::open(fs.clone(), StoreConfig::new(ROOT)).unwrap();
        (fs, store)
    }

    fn live() -> &'static Path {
        Path::new(LIVE)
    }

    fn id(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    /// Fails every write of a metadata record.
    struct FailingMetadataWrites(InMemoryFileSystem);

    impl FileSystem for FailingMetadataWrites {
        fn exists(&self, path: &Path) -> bool {
            self.0.exists(path)
        }
        fn is_dir(&self, path: &Path) -> bool {
            self.0.is_dir(path)
        }
        fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
            self.0.read(path)
        }
        fn write(&self, path: &Path, data: &[u8]) -> FsResult<()> {
            if path.extension().is_some_and(|ext| ext == METADATA_EXT) {
                return Err(FsError::PermissionDenied(path.to_path_buf()));
            }
            self.0.write(path, data)
        }
        fn delete(&self, path: &Path) -> FsResult<bool> {
            self.0.delete(path)
        }
        fn size(&self, path: &Path) -> FsResult<u64> {
            self.0.size(path)
        }
        fn last_modified(&self, path: &Path) -> FsResult<u64> {
            self.0.last_modified(path)
        }
        fn make_dir(&self, path: &Path, recursive: bool) -> FsResult<()> {
            self.0.make_dir(path, recursive)
        }
        fn delete_dir(&self, path: &Path) -> FsResult<bool> {
            self.0.delete_dir(path)
        }
        fn list_dir(&self, path: &Path) -> FsResult<Vec<String>> {
            self.0.list_dir(path)
        }
    }

    // -----------------------------------------------------------------------
    // 1. Create / list / get
    // -----------------------------------------------------------------------

    #[test]
    fn open_creates_root() {
        let (fs, store) = setup();
        assert!(fs.is_dir(Path::new(ROOT)));
        assert_eq!(store.root(), Path::new(ROOT));
    }

    #[test]
    fn create_writes_record_and_blob() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "first").unwrap();

        assert_eq!(v1.path, LIVE);
        assert_eq!(v1.size, 17);
        assert_eq!(v1.comment, "first");
        assert_eq!(v1.content_hash, ContentHash::of(b"line1\nline2\nline3"));

        let bucket = Path::new(ROOT).join(store.file_identity(live()).to_hex());
        let names = fs.list_dir(&bucket).unwrap();
        assert_eq!(
            names,
            vec![format!("{}.content", v1.id), format!("{}.json", v1.id)]
        );
        assert_eq!(store.get_version(live(), &v1.id).unwrap(), v1);
        assert_eq!(
            store.get_content(live(), &v1.id).unwrap(),
            b"line1\nline2\nline3"
        );
    }

    #[test]
    fn create_on_missing_path_is_not_found() {
        let (fs, store) = setup();
        let err = store.create_version(Path::new("/work/nope.txt"), "").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        fs.make_dir(Path::new("/work/dir"), false).unwrap();
        let err = store.create_version(Path::new("/work/dir"), "").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn list_is_newest_first() {
        let (_fs, store) = setup();
        let ids: Vec<VersionId> = (0..5)
            .map(|i| store.create_version(live(), &format!("v{i}")).unwrap().id)
            .collect();

        let listed: Vec<VersionId> = store
            .list_versions(live())
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut expected = ids;
        expected.reverse();
        assert_eq!(listed, expected);
    }

    #[test]
    fn list_without_bucket_is_empty() {
        let (_fs, store) = setup();
        assert!(store.list_versions(Path::new("/never.txt")).unwrap().is_empty());
    }

    #[test]
    fn list_skips_unreadable_records() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        let bucket = Path::new(ROOT).join(store.file_identity(live()).to_hex());
        fs.insert_file(bucket.join("garbage.json"), "{not json");
        fs.insert_file(bucket.join("notes.txt"), "ignored");

        let listed = store.list_versions(live()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, v1.id);
    }

    #[test]
    fn buckets_are_per_path() {
        let (fs, store) = setup();
        fs.insert_file("/work/b.txt", "other");
        store.create_version(live(), "").unwrap();
        store.create_version(Path::new("/work/b.txt"), "").unwrap();
        assert_eq!(store.list_versions(live()).unwrap().len(), 1);
        assert_ne!(
            store.file_identity(live()),
            store.file_identity(Path::new("/work/b.txt"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_get_separate_buckets() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_fs, store) = setup();
        let a = Path::new(OsStr::from_bytes(b"/work/\xff.txt"));
        let b = Path::new(OsStr::from_bytes(b"/work/\xfe.txt"));
        assert_eq!(a.to_string_lossy(), b.to_string_lossy());
        assert_ne!(store.file_identity(a), store.file_identity(b));
        // UTF-8 paths keep the identity of their string form.
        assert_eq!(store.file_identity(live()), FileIdentity::derive(LIVE));
    }

    #[test]
    fn unknown_version_is_version_not_found() {
        let (_fs, store) = setup();
        store.create_version(live(), "").unwrap();
        let missing = id("1700000000000-00000-00000000");
        assert!(matches!(
            store.get_version(live(), &missing),
            Err(StoreError::VersionNotFound { .. })
        ));
        assert!(matches!(
            store.get_content(live(), &missing),
            Err(StoreError::VersionNotFound { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 2. Immutability and failure handling
    // -----------------------------------------------------------------------

    #[test]
    fn versions_survive_live_edits() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        fs.write(live(), b"completely different").unwrap();
        store.create_version(live(), "").unwrap();

        assert_eq!(
            store.get_content(live(), &v1.id).unwrap(),
            b"line1\nline2\nline3"
        );
        assert_eq!(store.verify_version(live(), &v1.id).unwrap(), v1);
    }

    #[test]
    fn failed_metadata_write_removes_blob() {
        let inner = InMemoryFileSystem::new();
        inner.insert_file(LIVE, "data");
        let fs = Arc::new(FailingMetadataWrites(inner));
        let store = VersionStore::open(fs.clone(), StoreConfig::new(ROOT)).unwrap();

        let err = store.create_version(live(), "").unwrap_err();
        assert!(matches!(err, StoreError::Fs(FsError::PermissionDenied(_))));
        assert!(store.list_versions(live()).unwrap().is_empty());
        // Only the live file remains.
        assert_eq!(fs.0.file_count(), 1);
    }

    #[test]
    fn corruption_is_detected() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        let blob = Path::new(ROOT)
            .join(store.file_identity(live()).to_hex())
            .join(format!("{}.content", v1.id));
        fs.write(&blob, b"tampered").unwrap();

        assert!(matches!(
            store.verify_version(live(), &v1.id),
            Err(StoreError::HashMismatch { .. })
        ));
        // Restore refuses corrupt content and leaves the live file alone.
        assert!(store.restore(live(), &v1.id).is_err());
        assert_eq!(fs.read(live()).unwrap(), b"line1\nline2\nline3");
    }

    // -----------------------------------------------------------------------
    // 3. Restore
    // -----------------------------------------------------------------------

    #[test]
    fn restore_backs_up_then_overwrites() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        fs.write(live(), b"edited").unwrap();

        let before = store.list_versions(live()).unwrap().len();
        let backup = store.restore(live(), &v1.id).unwrap();

        assert_eq!(store.list_versions(live()).unwrap().len(), before + 1);
        assert_eq!(backup.comment, RESTORE_BACKUP_COMMENT);
        assert_eq!(store.get_content(live(), &backup.id).unwrap(), b"edited");
        assert_eq!(fs.read(live()).unwrap(), b"line1\nline2\nline3");
        // The restored version itself is untouched.
        assert_eq!(store.get_version(live(), &v1.id).unwrap(), v1);
    }

    #[test]
    fn restore_fails_closed_when_backup_cannot_be_written() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        fs.write(live(), b"edited").unwrap();
        fs.deny_writes(ROOT);

        assert!(store.restore(live(), &v1.id).is_err());
        assert_eq!(fs.read(live()).unwrap(), b"edited");

        fs.allow_writes();
        assert_eq!(store.list_versions(live()).unwrap().len(), 1);
    }

    #[test]
    fn restore_unknown_version_leaves_file_alone() {
        let (fs, store) = setup();
        let err = store
            .restore(live(), &id("1700000000000-00000-00000000"))
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionNotFound { .. }));
        assert_eq!(fs.read(live()).unwrap(), b"line1\nline2\nline3");
        assert!(store.list_versions(live()).unwrap().is_empty());
    }

    #[test]
    fn restore_with_missing_live_file_is_not_found() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        fs.delete(live()).unwrap();

        let err = store.restore(live(), &v1.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!fs.exists(live()));
    }

    #[cfg(unix)]
    #[test]
    fn restore_through_symlink_updates_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("real.txt");
        let link = dir.path().join("a.txt");
        std::fs::write(&target, "v1\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let store = VersionStore::open(
            Arc::new(LocalFileSystem::new()),
            StoreConfig::new(dir.path().join("versions")),
        )
        .unwrap();
        let v1 = store.create_version(&link, "").unwrap();
        std::fs::write(&target, "v2\n").unwrap();

        let backup = store.restore(&link, &v1.id).unwrap();
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "v1\n");
        assert_eq!(store.get_content(&link, &backup.id).unwrap(), b"v2\n");
    }

    // -----------------------------------------------------------------------
    // 4. Delete / clear
    // -----------------------------------------------------------------------

    #[test]
    fn delete_removes_one_version() {
        let (_fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        let v2 = store.create_version(live(), "").unwrap();

        store.delete_version(live(), &v1.id).unwrap();
        let listed = store.list_versions(live()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, v2.id);

        assert!(matches!(
            store.delete_version(live(), &v1.id),
            Err(StoreError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn delete_requires_both_artifacts() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        let blob = Path::new(ROOT)
            .join(store.file_identity(live()).to_hex())
            .join(format!("{}.content", v1.id));
        fs.delete(&blob).unwrap();

        assert!(matches!(
            store.delete_version(live(), &v1.id),
            Err(StoreError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn failed_blob_delete_hides_version_until_clear() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        let blob = Path::new(ROOT)
            .join(store.file_identity(live()).to_hex())
            .join(format!("{}.content", v1.id));
        fs.deny_writes(blob.clone());

        assert!(matches!(
            store.delete_version(live(), &v1.id),
            Err(StoreError::Fs(FsError::PermissionDenied(_)))
        ));
        assert!(store.list_versions(live()).unwrap().is_empty());
        assert!(fs.exists(&blob));

        fs.allow_writes();
        assert!(store.clear_versions(live()).unwrap());
        assert!(!fs.exists(&blob));
    }

    #[test]
    fn clear_is_idempotent() {
        let (_fs, store) = setup();
        store.create_version(live(), "").unwrap();
        store.create_version(live(), "").unwrap();

        assert!(store.clear_versions(live()).unwrap());
        assert!(store.list_versions(live()).unwrap().is_empty());
        assert!(!store.clear_versions(live()).unwrap());
    }

    // -----------------------------------------------------------------------
    // 5. Compare
    // -----------------------------------------------------------------------

    #[test]
    fn compare_versions_diffs_stored_content() {
        let (fs, store) = setup();
        let v1 = store.create_version(live(), "").unwrap();
        fs.write(live(), b"line1\nline2-modified\nline3\nline4").unwrap();
        let v2 = store.create_version(live(), "").unwrap();

        let cmp = store.compare_versions(live(), &v1.id, &v2.id).unwrap();
        assert_eq!(cmp.left, v1);
        assert_eq!(cmp.right, v2);
        assert_eq!(cmp.diff.stats.changed, 1);
        assert_eq!(cmp.diff.stats.added, 1);
        assert!(matches!(
            cmp.diff.entries.last(),
            Some(DiffEntry::Added { line2: 4, .. })
        ));

        let missing = id("1700000000000-00000-00000000");
        assert!(matches!(
            store.compare_versions(live(), &v1.id, &missing),
            Err(StoreError::VersionNotFound { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // 6. Host file system
    // -----------------------------------------------------------------------

    #[test]
    fn local_file_system_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("a.txt");
        std::fs::write(&live, "one\ntwo\n").unwrap();

        let store = VersionStore::open(
            Arc::new(LocalFileSystem::new()),
            StoreConfig::new(dir.path().join("versions")),
        )
        .unwrap();

        let v1 = store.create_version(&live, "first").unwrap();
        std::fs::write(&live, "one\nthree\n").unwrap();
        store.restore(&live, &v1.id).unwrap();

        assert_eq!(std::fs::read_to_string(&live).unwrap(), "one\ntwo\n");
        assert_eq!(store.list_versions(&live).unwrap().len(), 2);
        assert!(store.clear_versions(&live).unwrap());
    }
}
