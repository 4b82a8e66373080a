//! Eligibility gates for Verso.
//!
//! Before a file is snapshotted or diffed, the [`ComparabilityClassifier`]
//! decides whether the operation makes sense: size caps keep the O(n·m) diff
//! bounded, and extension lists plus content sniffing keep binary data out.

pub mod classifier;
pub mod config;
pub mod mime;

pub use classifier::{ComparabilityClassifier, Eligibility};
pub use config::{
    ClassifierConfig, BINARY_EXTENSIONS, COMPARE_MAX_BYTES, TEXT_EXTENSIONS, VERSION_MAX_BYTES,
};
