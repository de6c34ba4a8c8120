//! KubeVC Store - blob storage for snapshot artifacts and metadata
//!
//! Provides:
//! - The `BlobStore` trait: put / get / list-by-prefix plus public locators
//! - `S3BlobStore`: AWS S3 (or S3-compatible) over signed HTTP requests
//! - `FsBlobStore`: local directory with atomic writes
//! - `MemoryBlobStore`: in-process store with a write log, for tests and demos

pub mod blob;
pub mod errors;
pub mod fs;
pub mod memory;
pub mod s3;

pub use blob::{common_prefixes, content_type_for, validate_key, BlobStore};
pub use errors::Result;
pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, WriteRecord};
pub use s3::{S3BlobStore, S3Config};
