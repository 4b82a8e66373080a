use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;
use verso_classify::{ComparabilityClassifier, Eligibility};
use verso_diff::DiffResult;
use verso_fs::{FileSystem, LocalFileSystem};
use verso_store::{VersionComparison, VersionStore};
use verso_types::{VersionId, VersionRecord};

use crate::config::SdkConfig;
use crate::error::{SdkError, SdkResult};

/// Basic facts about one side of a file comparison.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub path: String,
    pub name: String,
    pub size: u64,
    /// Milliseconds since the UNIX epoch.
    pub last_modified: u64,
}

/// Two live files and the diff between them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileComparison {
    pub left: FileInfo,
    pub right: FileInfo,
    pub diff: DiffResult,
}

/// High-level Verso API.
///
/// Gates operations through the classifier and delegates storage to the
/// [`VersionStore`].
pub struct VersionManager {
    fs: Arc<dyn FileSystem>,
    classifier: ComparabilityClassifier,
    store: VersionStore,
}

impl VersionManager {
    /// Open a manager on the host file system.
    pub fn open(config: SdkConfig) -> SdkResult<Self> {
        Self::with_file_system(Arc::new(LocalFileSystem::new()), config)
    }

    /// Open a manager on any file-system backend.
    pub fn with_file_system(fs: Arc<dyn FileSystem>, config: SdkConfig) -> SdkResult<Self> {
        let store = VersionStore::open(fs.clone(), config.store_config())?;
        let classifier = ComparabilityClassifier::new(fs.clone(), config.classifier);
        Ok(Self {
            fs,
            classifier,
            store,
        })
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    // ---- Gates ----

    pub fn can_create_version(&self, path: &Path) -> bool {
        self.classifier.can_create_version(path)
    }

    pub fn is_comparable(&self, path: &Path) -> bool {
        self.classifier.is_comparable(path)
    }

    pub fn check_versionable(&self, path: &Path) -> Eligibility {
        self.classifier.check_versionable(path)
    }

    pub fn check_comparable(&self, path: &Path) -> Eligibility {
        self.classifier.check_comparable(path)
    }

    // ---- Versions ----

    /// Snapshot `path` if the classifier allows it.
    pub fn create_version(&self, path: &Path, comment: &str) -> SdkResult<VersionRecord> {
        if !self.fs.is_file(path) {
            return Err(SdkError::NotFound(path.to_path_buf()));
        }
        if let Eligibility::Ineligible { reason } = self.classifier.check_versionable(path) {
            debug!(path = %path.display(), %reason, "refused to version");
            return Err(SdkError::NotVersionable {
                path: path.to_path_buf(),
                reason,
            });
        }
        Ok(self.store.create_version(path, comment)?)
    }

    pub fn list_versions(&self, path: &Path) -> SdkResult<Vec<VersionRecord>> {
        Ok(self.store.list_versions(path)?)
    }

    pub fn get_version(&self, path: &Path, id: &VersionId) -> SdkResult<VersionRecord> {
        Ok(self.store.get_version(path, id)?)
    }

    pub fn get_content(&self, path: &Path, id: &VersionId) -> SdkResult<Vec<u8>> {
        Ok(self.store.get_content(path, id)?)
    }

    pub fn verify_version(&self, path: &Path, id: &VersionId) -> SdkResult<VersionRecord> {
        Ok(self.store.verify_version(path, id)?)
    }

    /// Restore version `id`; returns the backup taken of the current state.
    pub fn restore(&self, path: &Path, id: &VersionId) -> SdkResult<VersionRecord> {
        Ok(self.store.restore(path, id)?)
    }

    pub fn delete_version(&self, path: &Path, id: &VersionId) -> SdkResult<()> {
        Ok(self.store.delete_version(path, id)?)
    }

    /// Returns `false` if the file had no versions.
    pub fn clear_versions(&self, path: &Path) -> SdkResult<bool> {
        Ok(self.store.clear_versions(path)?)
    }

    /// Diff two stored versions. Both must fit under the compare cap.
    pub fn compare_versions(
        &self,
        path: &Path,
        left: &VersionId,
        right: &VersionId,
    ) -> SdkResult<VersionComparison> {
        let cap = self.classifier.config().compare_max_bytes;
        for id in [left, right] {
            let record = self.store.get_version(path, id)?;
            if record.size > cap {
                let reason = format!("version {id} is {} bytes, limit is {cap}", record.size);
                debug!(path = %path.display(), %reason, "refused to compare");
                return Err(SdkError::NotComparable {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
        Ok(self.store.compare_versions(path, left, right)?)
    }

    // ---- Ad hoc diffs ----

    /// Diff two live files. Both must pass the comparability gate.
    pub fn compare_files(&self, left: &Path, right: &Path) -> SdkResult<FileComparison> {
        let left_info = self.comparable_file(left)?;
        let right_info = self.comparable_file(right)?;
        let left_data = self.fs.read(left)?;
        let right_data = self.fs.read(right)?;

        Ok(FileComparison {
            left: left_info,
            right: right_info,
            diff: self.store.engine().diff_bytes(&left_data, &right_data),
        })
    }

    /// Diff two in-memory texts.
    pub fn diff_texts(&self, left: &str, right: &str) -> DiffResult {
        self.store.engine().diff_text(left, right)
    }

    fn comparable_file(&self, path: &Path) -> SdkResult<FileInfo> {
        if !self.fs.is_file(path) {
            return Err(SdkError::NotFound(path.to_path_buf()));
        }
        if let Eligibility::Ineligible { reason } = self.classifier.check_comparable(path) {
            return Err(SdkError::NotComparable {
                path: path.to_path_buf(),
                reason,
            });
        }
        Ok(FileInfo {
            path: path.to_string_lossy().into_owned(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: self.fs.size(path)?,
            last_modified: self.fs.last_modified(path)?,
        })
    }
}
