//! S3 (and S3-compatible) blob store over signed HTTP requests
//!
//! Provides:
//! - AWS Signature Version 4 request signing
//! - ListObjectsV2 parsing with continuation-token pagination
//! - Virtual-hosted addressing for AWS, path-style for custom endpoints

mod list;
mod s3_store;
pub(crate) mod sigv4;

pub use s3_store::{S3BlobStore, S3Config};
