//! Filesystem-backed blob store
//!
//! Provides:
//! - Atomic writes via temp file + rename
//! - Keys mapped 1:1 onto relative paths under a root directory

mod atomic;
mod fs_store;

pub use fs_store::FsBlobStore;
