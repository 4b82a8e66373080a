//! Line-level diff engine for Verso.
//!
//! Texts are split into lines, matched by a longest-common-subsequence
//! table (or Myers, on request), and the matches are reconciled into an
//! ordered list of [`DiffEntry`] values.
//!
//! # Key Types
//!
//! - [`DiffEngine`] / [`DiffAlgorithm`] -- computes diffs
//! - [`DiffResult`] / [`DiffEntry`] / [`DiffStats`] -- the diff and its counts
//! - [`split_lines`] -- the line-splitting rule shared by every caller

pub mod engine;
pub mod error;
pub mod lcs;
pub mod lines;
pub mod result;

pub use engine::{DiffAlgorithm, DiffEngine};
pub use error::DiffError;
pub use lines::{join_lines, split_bytes, split_lines};
pub use result::{DiffEntry, DiffResult, DiffStats, LineRef};
