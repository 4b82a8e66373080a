use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::hasher::DomainHasher;

/// Number of hash bytes kept in a [`FileIdentity`].
const IDENTITY_LEN: usize = 16;

/// Bucket key grouping every version of one logical file.
///
/// Derived from the path *string*, never from content: renaming a file
/// starts a new history, editing it does not. The key is a bucketing aid
/// only and carries no integrity guarantee (see [`crate::ContentHash`]).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FileIdentity([u8; IDENTITY_LEN]);

impl FileIdentity {
    /// Derive the identity of a path string. The string is hashed as given.
    pub fn derive(path: &str) -> Self {
        Self::derive_bytes(path.as_bytes())
    }

    /// Derive from raw path bytes, for paths that are not valid UTF-8.
    /// Agrees with [`FileIdentity::derive`] on UTF-8 input.
    pub fn derive_bytes(path: &[u8]) -> Self {
        let digest = DomainHasher::PATH.hash(path);
        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[..IDENTITY_LEN]);
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; IDENTITY_LEN] {
        &self.0
    }

    /// Lowercase hex form, used as the bucket directory name.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from the 32-character hex form.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != IDENTITY_LEN {
            return Err(TypeError::InvalidLength {
                expected: IDENTITY_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; IDENTITY_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileIdentity({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<FileIdentity> for String {
    fn from(id: FileIdentity) -> Self {
        id.to_hex()
    }
}

impl TryFrom<String> for FileIdentity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}
