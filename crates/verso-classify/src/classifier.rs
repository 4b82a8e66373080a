use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::trace;
use verso_fs::FileSystem;

use crate::config::{ClassifierConfig, BINARY_EXTENSIONS, TEXT_EXTENSIONS};
use crate::mime;

/// The outcome of an eligibility check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Eligibility {
    /// The operation may proceed.
    Eligible,
    /// The operation is refused.
    Ineligible { reason: String },
}

impl Eligibility {
    /// Returns `true` if the decision is `Eligible`.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    /// The refusal reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Eligible => None,
            Self::Ineligible { reason } => Some(reason),
        }
    }

    fn no(reason: impl Into<String>) -> Self {
        Self::Ineligible {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eligible => f.write_str("eligible"),
            Self::Ineligible { reason } => write!(f, "ineligible: {reason}"),
        }
    }
}

/// Decides whether a file may be diffed or versioned.
///
/// Both checks are pure functions of the file's size, extension and (for
/// comparability) leading content. Missing paths and directories are never
/// eligible.
pub struct ComparabilityClassifier {
    fs: Arc<dyn FileSystem>,
    config: ClassifierConfig,
}

impl ComparabilityClassifier {
    pub fn new(fs: Arc<dyn FileSystem>, config: ClassifierConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Whether `path` is text small enough to diff.
    pub fn is_comparable(&self, path: &Path) -> bool {
        self.check_comparable(path).is_eligible()
    }

    /// Whether `path` may be snapshotted.
    pub fn can_create_version(&self, path: &Path) -> bool {
        self.check_versionable(path).is_eligible()
    }

    /// Comparability decision with its reason.
    pub fn check_comparable(&self, path: &Path) -> Eligibility {
        let decision = self.comparable(path);
        trace!(path = %path.display(), %decision, "comparability");
        decision
    }

    /// Versionability decision with its reason.
    pub fn check_versionable(&self, path: &Path) -> Eligibility {
        let decision = self.versionable(path);
        trace!(path = %path.display(), %decision, "versionability");
        decision
    }

    fn comparable(&self, path: &Path) -> Eligibility {
        if let Some(refusal) = self.size_gate(path, self.config.compare_max_bytes) {
            return refusal;
        }
        if let Some(ext) = extension(path) {
            if TEXT_EXTENSIONS.contains(&ext.as_str()) {
                return Eligibility::Eligible;
            }
        }
        match mime::detect(self.fs.as_ref(), path) {
            Ok(mime) if mime::is_textual(&mime) => Eligibility::Eligible,
            Ok(mime) => Eligibility::no(format!("content type {mime} is not text")),
            Err(e) => Eligibility::no(format!("cannot inspect content: {e}")),
        }
    }

    fn versionable(&self, path: &Path) -> Eligibility {
        if let Some(refusal) = self.size_gate(path, self.config.version_max_bytes) {
            return refusal;
        }
        match extension(path) {
            Some(ext) if BINARY_EXTENSIONS.contains(&ext.as_str()) => {
                Eligibility::no(format!("binary file type .{ext}"))
            }
            _ => Eligibility::Eligible,
        }
    }

    /// Refuses missing paths, directories, and files over `cap` bytes.
    fn size_gate(&self, path: &Path, cap: u64) -> Option<Eligibility> {
        if !self.fs.exists(path) {
            return Some(Eligibility::no("file does not exist"));
        }
        if self.fs.is_dir(path) {
            return Some(Eligibility::no("path is a directory"));
        }
        match self.fs.size(path) {
            Ok(size) if size > cap => Some(Eligibility::no(format!(
                "file is {size} bytes, limit is {cap}"
            ))),
            Ok(_) => None,
            Err(e) => Some(Eligibility::no(format!("cannot read size: {e}"))),
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
