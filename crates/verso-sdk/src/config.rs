use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use verso_classify::ClassifierConfig;
use verso_diff::DiffAlgorithm;
use verso_store::StoreConfig;

use crate::error::{SdkError, SdkResult};

/// Top-level configuration, usually read from a TOML file.
///
/// ```toml
/// versions_root = "/home/me/.verso/versions"
/// diff_algorithm = "lcs"
///
/// [classifier]
/// compare_max_bytes = 5242880
/// version_max_bytes = 10485760
/// ```
///
/// Every field is optional.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    pub versions_root: PathBuf,
    pub diff_algorithm: DiffAlgorithm,
    pub classifier: ClassifierConfig,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            versions_root: default_versions_root(),
            diff_algorithm: DiffAlgorithm::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

impl SdkConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn with_versions_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.versions_root = root.into();
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.versions_root).with_diff_algorithm(self.diff_algorithm)
    }
}

/// `$HOME/.verso/versions`, or `.verso/versions` when `HOME` is unset.
pub fn default_versions_root() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".verso").join("versions")
}
