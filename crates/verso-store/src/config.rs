use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use verso_diff::DiffAlgorithm;

/// Configuration for a [`VersionStore`](crate::VersionStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one bucket per versioned file.
    pub root: PathBuf,
    /// Algorithm used by `compare_versions`.
    #[serde(default)]
    pub diff_algorithm: DiffAlgorithm,
}

impl StoreConfig {
    /// A config rooted at `root` with the default diff algorithm.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            diff_algorithm: DiffAlgorithm::default(),
        }
    }

    pub fn with_diff_algorithm(mut self, algorithm: DiffAlgorithm) -> Self {
        self.diff_algorithm = algorithm;
        self
    }
}
