//! Error types for the diff crate.

/// Errors raised when a diff does not fit the sequence it is applied to.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DiffError {
    /// An unchanged or removed line refers past the end of the old sequence.
    #[error("line {line} is out of range (old sequence has {len} lines)")]
    OutOfRange { line: usize, len: usize },

    /// Entries skip or revisit old lines.
    #[error("expected old line {expected}, diff refers to line {found}")]
    OutOfOrder { expected: usize, found: usize },

    /// The old sequence has a different line where the diff expects `expected`.
    #[error("line {line} differs: diff expects {expected:?}, found {found:?}")]
    Mismatch {
        line: usize,
        expected: String,
        found: String,
    },

    /// The diff ended before covering the whole old sequence.
    #[error("diff covers {consumed} of {total} old lines")]
    Incomplete { consumed: usize, total: usize },
}
