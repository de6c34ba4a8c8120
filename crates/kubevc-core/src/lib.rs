//! KubeVC Core - domain model and pure logic for cluster snapshots
//!
//! This crate provides:
//! - The webhook payload model with explicit defaulting rules
//! - Change detection (which manifest files a push touched)
//! - Snapshot data model: metadata, storage keys, dashboard entries
//! - The `Renderer` capability used to produce topology diagrams
//! - Canonical error and logging facilities shared by every crate

pub mod detect;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod render;
pub mod webhook;

pub use kubevc_core_types::schema;

// Re-export commonly used types
pub use detect::{detect, is_manifest_path, DetectedChange};
pub use errors::{ExError, ExErrorKind, Result};
pub use model::{
    CommitEvent, DashboardEntry, ManifestChangeSet, SnapshotIdentity, SnapshotKeys,
    SnapshotMetadata,
};
pub use render::{RenderFailure, Renderer, SnapshotArtifact};
pub use webhook::WebhookPayload;
