use serde::{Deserialize, Serialize};

use crate::error::DiffError;

/// One line of a [`DiffEntry::Changed`] run, with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRef {
    pub line: usize,
    pub content: String,
}

/// A single entry of a line diff.
///
/// `line1` numbers refer to the old sequence, `line2` to the new one; both
/// are 1-based and non-decreasing across the entries of one result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiffEntry {
    /// A line present on both sides.
    Unchanged {
        line1: usize,
        line2: usize,
        content: String,
    },
    /// A line only in the new sequence.
    Added { line2: usize, content: String },
    /// A line only in the old sequence.
    Removed { line1: usize, content: String },
    /// A run of old lines replaced by a run of new lines.
    Changed {
        removed: Vec<LineRef>,
        added: Vec<LineRef>,
    },
}

impl DiffEntry {
    /// The same entry seen from the other direction.
    pub fn invert(&self) -> Self {
        match self {
            Self::Unchanged {
                line1,
                line2,
                content,
            } => Self::Unchanged {
                line1: *line2,
                line2: *line1,
                content: content.clone(),
            },
            Self::Added { line2, content } => Self::Removed {
                line1: *line2,
                content: content.clone(),
            },
            Self::Removed { line1, content } => Self::Added {
                line2: *line1,
                content: content.clone(),
            },
            Self::Changed { removed, added } => Self::Changed {
                removed: added.clone(),
                added: removed.clone(),
            },
        }
    }
}

/// Per-kind entry counts.
///
/// Lines inside a `Changed` entry count once towards `changed` and never
/// towards `added` or `removed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffStats {
    fn of(entries: &[DiffEntry]) -> Self {
        let mut stats = Self::default();
        for entry in entries {
            match entry {
                DiffEntry::Unchanged { .. } => {}
                DiffEntry::Added { .. } => stats.added += 1,
                DiffEntry::Removed { .. } => stats.removed += 1,
                DiffEntry::Changed { .. } => stats.changed += 1,
            }
        }
        stats
    }
}

/// An ordered line diff with its statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub entries: Vec<DiffEntry>,
    pub stats: DiffStats,
}

impl DiffResult {
    /// Wrap entries and compute their stats.
    pub fn from_entries(entries: Vec<DiffEntry>) -> Self {
        let stats = DiffStats::of(&entries);
        Self { entries, stats }
    }

    /// Returns `true` if both sides were identical.
    pub fn is_identical(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(e, DiffEntry::Unchanged { .. }))
    }

    /// The diff from new to old.
    pub fn invert(&self) -> Self {
        Self::from_entries(self.entries.iter().map(DiffEntry::invert).collect())
    }

    /// Rebuild the new sequence from the old one.
    ///
    /// Every unchanged and removed line is checked against `old`, in order,
    /// and the diff must account for all of `old`.
    pub fn apply<S: AsRef<str>>(&self, old: &[S]) -> Result<Vec<String>, DiffError> {
        let mut out = Vec::with_capacity(old.len());
        let mut cursor = 0usize;

        for entry in &self.entries {
            match entry {
                DiffEntry::Unchanged { line1, content, .. } => {
                    consume(old, &mut cursor, *line1, content)?;
                    out.push(content.clone());
                }
                DiffEntry::Removed { line1, content } => {
                    consume(old, &mut cursor, *line1, content)?;
                }
                DiffEntry::Added { content, .. } => out.push(content.clone()),
                DiffEntry::Changed { removed, added } => {
                    for r in removed {
                        consume(old, &mut cursor, r.line, &r.content)?;
                    }
                    out.extend(added.iter().map(|a| a.content.clone()));
                }
            }
        }

        if cursor != old.len() {
            return Err(DiffError::Incomplete {
                consumed: cursor,
                total: old.len(),
            });
        }
        Ok(out)
    }
}

/// Check that old line `line` (1-based) is next and equals `expected`.
fn consume<S: AsRef<str>>(
    old: &[S],
    cursor: &mut usize,
    line: usize,
    expected: &str,
) -> Result<(), DiffError> {
    if line != *cursor + 1 {
        return Err(DiffError::OutOfOrder {
            expected: *cursor + 1,
            found: line,
        });
    }
    let found = old.get(*cursor).ok_or(DiffError::OutOfRange {
        line,
        len: old.len(),
    })?;
    if found.as_ref() != expected {
        return Err(DiffError::Mismatch {
            line,
            expected: expected.to_string(),
            found: found.as_ref().to_string(),
        });
    }
    *cursor += 1;
    Ok(())
}
