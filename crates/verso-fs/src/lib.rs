//! File-system collaborator contract for Verso.
//!
//! The versioning core never touches `std::fs` directly; it goes through
//! the [`FileSystem`] trait. Two backends ship with the crate:
//!
//! - [`LocalFileSystem`]: host file system with atomic replace-on-write
//! - [`InMemoryFileSystem`]: test double with write-failure injection

pub mod error;
pub mod local;
pub mod memory;
pub mod traits;

pub use error::{FsError, FsResult};
pub use local::LocalFileSystem;
pub use memory::InMemoryFileSystem;
pub use traits::FileSystem;
