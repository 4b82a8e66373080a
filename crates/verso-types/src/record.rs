use serde::{Deserialize, Serialize};

use crate::content::ContentHash;
use crate::version::VersionId;

/// Metadata of one stored version.
///
/// Written once next to the content blob and never rewritten. The on-disk
/// JSON uses the short field names `hash` and `created`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Unique, time-ordered id within the bucket.
    pub id: VersionId,
    /// Path string the version was taken from.
    pub path: String,
    /// BLAKE3 of the stored content.
    #[serde(rename = "hash")]
    pub content_hash: ContentHash,
    /// Content length in bytes.
    pub size: u64,
    /// Creation time, milliseconds since the UNIX epoch.
    #[serde(rename = "created")]
    pub created_at: u64,
    /// Free-form note supplied by the caller.
    #[serde(default)]
    pub comment: String,
}

impl VersionRecord {
    /// Returns `true` if `data` is exactly the content this record describes.
    pub fn describes(&self, data: &[u8]) -> bool {
        data.len() as u64 == self.size && self.content_hash.matches(data)
    }

    /// Ordering key for listings: newest first means descending by this key.
    pub fn sort_key(&self) -> (u64, &VersionId) {
        (self.created_at, &self.id)
    }
}
