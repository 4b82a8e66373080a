use serde::{Deserialize, Serialize};

/// Largest file (bytes) that may be diffed: 5 MiB.
pub const COMPARE_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Largest file (bytes) that may be snapshotted: 10 MiB.
pub const VERSION_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Extensions that are always treated as comparable text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "html", "htm", "xml", "json", "csv", "log", "php", "js", "css", "py", "java",
    "c", "cpp", "h", "cs", "go", "rb", "ini", "conf", "yml", "yaml", "toml", "bat", "sh", "ps1",
];

/// Extensions that are never versioned.
pub const BINARY_EXTENSIONS: &[&str] = &[
    "exe", "dll", "so", "dylib", "bin", "dat", "db", "sqlite", "mdb", "jpg", "jpeg", "png", "gif",
    "bmp", "ico", "tif", "tiff", "webp", "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "avi",
    "mov", "wmv", "flv", "mkv", "webm", "zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "pdf",
    "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Size caps applied by the classifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Files larger than this are not comparable.
    pub compare_max_bytes: u64,
    /// Files larger than this cannot be versioned.
    pub version_max_bytes: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            compare_max_bytes: COMPARE_MAX_BYTES,
            version_max_bytes: VERSION_MAX_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_caps() {
        let config = ClassifierConfig::default();
        assert_eq!(config.compare_max_bytes, 5_242_880);
        assert_eq!(config.version_max_bytes, 10_485_760);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"compare_max_bytes": 1024}"#).unwrap();
        assert_eq!(config.compare_max_bytes, 1024);
        assert_eq!(config.version_max_bytes, VERSION_MAX_BYTES);
    }

    #[test]
    fn extension_lists_are_disjoint_and_lowercase() {
        for ext in TEXT_EXTENSIONS.iter().chain(BINARY_EXTENSIONS) {
            assert_eq!(*ext, ext.to_ascii_lowercase());
        }
        for ext in TEXT_EXTENSIONS {
            assert!(!BINARY_EXTENSIONS.contains(ext), "{ext} in both lists");
        }
    }
}
