use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::lcs::{lcs_anchors, myers_anchors, Anchor};
use crate::lines::{split_bytes, split_lines};
use crate::result::{DiffEntry, DiffResult, LineRef};

/// How anchors (matched line pairs) are found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithm {
    /// Full dynamic-programming LCS. Minimal, O(n·m) time and space.
    #[default]
    Lcs,
    /// Myers O(ND). Much faster on large, similar inputs; not always minimal.
    Myers,
}

impl std::str::FromStr for DiffAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lcs" => Ok(Self::Lcs),
            "myers" => Ok(Self::Myers),
            other => Err(format!("unknown diff algorithm: {other}")),
        }
    }
}

/// Line-level diff engine.
///
/// Anchors are always computed with the lexicographically smaller sequence
/// first and mapped back, so `diff(b, a)` is exactly `diff(a, b).invert()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffEngine {
    algorithm: DiffAlgorithm,
}

impl DiffEngine {
    pub fn new(algorithm: DiffAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DiffAlgorithm {
        self.algorithm
    }

    /// Diff two line sequences.
    pub fn diff(&self, a: &[String], b: &[String]) -> DiffResult {
        let anchors = if a <= b {
            self.anchors(a, b)
        } else {
            self.anchors(b, a).into_iter().map(|(j, i)| (i, j)).collect()
        };
        trace!(
            old = a.len(),
            new = b.len(),
            anchors = anchors.len(),
            algorithm = ?self.algorithm,
            "diff"
        );
        DiffResult::from_entries(reconcile(a, b, &anchors))
    }

    /// Diff two texts split with [`split_lines`].
    pub fn diff_text(&self, a: &str, b: &str) -> DiffResult {
        self.diff(&split_lines(a), &split_lines(b))
    }

    /// Diff two byte buffers, decoding invalid UTF-8 lossily.
    pub fn diff_bytes(&self, a: &[u8], b: &[u8]) -> DiffResult {
        self.diff(&split_bytes(a), &split_bytes(b))
    }

    fn anchors(&self, a: &[String], b: &[String]) -> Vec<Anchor> {
        match self.algorithm {
            DiffAlgorithm::Lcs => lcs_anchors(a, b),
            DiffAlgorithm::Myers => myers_anchors(a, b),
        }
    }
}

/// Turn anchors into entries.
///
/// Each anchor is one `Unchanged`. The lines between consecutive anchors
/// form a gap: both sides non-empty gives one `Changed`, otherwise each line
/// is its own `Removed` or `Added`. The tail is the gap before `(n, m)`.
fn reconcile(a: &[String], b: &[String], anchors: &[Anchor]) -> Vec<DiffEntry> {
    let mut entries = Vec::with_capacity(a.len().max(b.len()));
    let (mut i, mut j) = (0, 0);

    for &(ai, bj) in anchors {
        push_gap(&mut entries, a, i..ai, b, j..bj);
        entries.push(DiffEntry::Unchanged {
            line1: ai + 1,
            line2: bj + 1,
            content: a[ai].clone(),
        });
        i = ai + 1;
        j = bj + 1;
    }
    push_gap(&mut entries, a, i..a.len(), b, j..b.len());
    entries
}

fn push_gap(
    entries: &mut Vec<DiffEntry>,
    a: &[String],
    old: Range<usize>,
    b: &[String],
    new: Range<usize>,
) {
    match (old.is_empty(), new.is_empty()) {
        (true, true) => {}
        (false, false) => entries.push(DiffEntry::Changed {
            removed: line_refs(a, old),
            added: line_refs(b, new),
        }),
        (false, true) => entries.extend(old.map(|k| DiffEntry::Removed {
            line1: k + 1,
            content: a[k].clone(),
        })),
        (true, false) => entries.extend(new.map(|k| DiffEntry::Added {
            line2: k + 1,
            content: b[k].clone(),
        })),
    }
}

fn line_refs(lines: &[String], range: Range<usize>) -> Vec<LineRef> {
    range
        .map(|k| LineRef {
            line: k + 1,
            content: lines[k].clone(),
        })
        .collect()
}
