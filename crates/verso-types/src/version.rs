use std::fmt;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest accepted textual version id.
const MAX_ID_LEN: usize = 128;

/// Identifier of one stored version.
///
/// Generated ids have the form `<ms:013>-<logical:05>-<random:08x>`, so the
/// lexicographic order of ids issued by one [`VersionClock`] is their
/// creation order. Parsed ids may only contain ASCII alphanumerics, `_` and
/// `-`: an id is used verbatim as a file stem inside a bucket and must never
/// name a path outside it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct VersionId(String);

impl VersionId {
    /// Build the id for a clock stamp.
    pub fn from_stamp(stamp: VersionStamp, nonce: u32) -> Self {
        Self(format!(
            "{:013}-{:05}-{:08x}",
            stamp.physical_ms, stamp.logical, nonce
        ))
    }

    /// Validate and wrap a textual id.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let valid = !s.is_empty()
            && s.len() <= MAX_ID_LEN
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(TypeError::InvalidVersionId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionId({})", self.0)
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VersionId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<VersionId> for String {
    fn from(id: VersionId) -> Self {
        id.0
    }
}

impl TryFrom<String> for VersionId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

/// A point on a [`VersionClock`]: wall-clock milliseconds plus a logical
/// counter for versions created within the same millisecond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp {
    pub physical_ms: u64,
    pub logical: u32,
}

struct ClockState {
    physical_ms: u64,
    logical: u32,
}

/// Monotonic source of version stamps.
///
/// - `physical = max(wall_clock, last.physical)`
/// - if physical advanced, `logical = 0`; otherwise `logical += 1`
///
/// Every stamp is strictly greater than the previous one, even when the
/// wall clock stalls or steps backwards.
pub struct VersionClock {
    state: Mutex<ClockState>,
}

impl VersionClock {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ClockState {
                physical_ms: 0,
                logical: 0,
            }),
        }
    }

    /// Next stamp, strictly after every stamp issued before.
    pub fn tick(&self) -> VersionStamp {
        let wall = wall_clock_ms();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let physical_ms = wall.max(state.physical_ms);
        let logical = if physical_ms > state.physical_ms {
            0
        } else {
            state.logical + 1
        };

        state.physical_ms = physical_ms;
        state.logical = logical;

        VersionStamp {
            physical_ms,
            logical,
        }
    }

    /// Issue a fresh id together with its stamp.
    pub fn next_id(&self) -> (VersionId, VersionStamp) {
        let stamp = self.tick();
        (VersionId::from_stamp(stamp, rand::random()), stamp)
    }
}

impl Default for VersionClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
