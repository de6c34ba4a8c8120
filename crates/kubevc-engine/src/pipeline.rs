//! Snapshot pipeline orchestration
//!
//! ## Steps (in order):
//! 1. Empty change set short-circuits to `NoChange` (no render, no I/O)
//! 2. Render; any failure ends the run as `RenderFailed` with nothing written
//! 3. Write the artifact, then the metadata; a failed artifact write skips metadata
//! 4. Return the artifact locator with the write timestamp as a cache buster
//!
//! Re-running for the same `(repository, commit)` overwrites both objects.
//! Failures are outcomes, not errors: the caller always gets a result.

use chrono::{DateTime, Utc};
use kubevc_core::errors::ExError;
use kubevc_core::model::keys::{ARTIFACT_CONTENT_TYPE, METADATA_CONTENT_TYPE};
use kubevc_core::{
    log_op_end, log_op_error, log_op_start, CommitEvent, ManifestChangeSet, Renderer,
    SnapshotArtifact, SnapshotIdentity, SnapshotKeys, SnapshotMetadata,
};
use kubevc_core_types::RequestContext;
use kubevc_store::BlobStore;
use std::sync::Arc;
use std::time::Instant;

/// Source of the metadata timestamp
pub type Clock = fn() -> DateTime<Utc>;

/// A snapshot that reached the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub keys: SnapshotKeys,
    pub metadata: SnapshotMetadata,
    /// Public artifact URL with `?ts=<timestamp>` appended
    pub locator: String,
}

/// How one pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// No manifest file changed; nothing rendered or written
    NoChange,
    /// Renderer failed or timed out; nothing written
    RenderFailed { reason: String },
    /// A store write failed; the run was aborted
    StorageFailed { reason: String },
    /// The run died before finishing (task panic); store state is unknown
    Aborted { reason: String },
    Stored(StoredSnapshot),
}

impl PipelineOutcome {
    /// Stable outcome name used in logs and response bodies
    pub fn name(&self) -> &'static str {
        match self {
            PipelineOutcome::NoChange => "no_change",
            PipelineOutcome::RenderFailed { .. } => "render_failed",
            PipelineOutcome::StorageFailed { .. } => "storage_failed",
            PipelineOutcome::Aborted { .. } => "aborted",
            PipelineOutcome::Stored(_) => "stored",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::NoChange | PipelineOutcome::Stored(_))
    }
}

/// Result descriptor for one delivery
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Identity the snapshot is (or would have been) stored under
    pub identity: SnapshotIdentity,
    pub changes: ManifestChangeSet,
    pub outcome: PipelineOutcome,
}

/// Renders and persists cluster snapshots
#[derive(Clone)]
pub struct SnapshotPipeline {
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn BlobStore>,
    clock: Clock,
}

impl SnapshotPipeline {
    pub fn new(renderer: Arc<dyn Renderer>, store: Arc<dyn BlobStore>) -> Self {
        Self {
            renderer,
            store,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock (tests pin timestamps with this)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run one delivery through the pipeline
    pub async fn process(
        &self,
        ctx: &RequestContext,
        event: &CommitEvent,
        changes: &ManifestChangeSet,
    ) -> PipelineResult {
        let identity = SnapshotIdentity::resolve(event, &ctx.request_id);

        if changes.is_empty() {
            tracing::debug!(
                repository = %identity.repository,
                commit_id = %identity.commit_id,
                "no manifest changes; skipping render"
            );
            return PipelineResult {
                identity,
                changes: changes.clone(),
                outcome: PipelineOutcome::NoChange,
            };
        }

        log_op_start!(
            "snapshot_process",
            request_id = %ctx.request_id,
            repository = %identity.repository,
            commit_id = %identity.commit_id,
            manifest_count = changes.len()
        );
        let start = Instant::now();

        let outcome = match self.renderer.render(changes).await {
            Ok(artifact) => match self.store_snapshot(&identity, changes, artifact).await {
                Ok(stored) => PipelineOutcome::Stored(stored),
                Err(err) => {
                    let err = err.with_request_id(ctx.request_id.clone());
                    log_op_error!(
                        "snapshot_process",
                        err,
                        duration_ms = start.elapsed().as_millis() as u64
                    );
                    PipelineOutcome::StorageFailed {
                        reason: err.to_string(),
                    }
                }
            },
            Err(failure) => {
                let err = ExError::from(failure.clone()).with_request_id(ctx.request_id.clone());
                log_op_error!(
                    "snapshot_process",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                PipelineOutcome::RenderFailed {
                    reason: failure.to_string(),
                }
            }
        };

        if let PipelineOutcome::Stored(stored) = &outcome {
            log_op_end!(
                "snapshot_process",
                duration_ms = start.elapsed().as_millis() as u64,
                key = %stored.keys.artifact
            );
        }

        PipelineResult {
            identity,
            changes: changes.clone(),
            outcome,
        }
    }

    /// Artifact first, metadata second; stops at the first failed write
    async fn store_snapshot(
        &self,
        identity: &SnapshotIdentity,
        changes: &ManifestChangeSet,
        artifact: SnapshotArtifact,
    ) -> Result<StoredSnapshot, ExError> {
        let keys = identity.keys();
        let mut metadata = SnapshotMetadata::new(identity, changes, (self.clock)());
        if let Some(fields) = artifact.metadata {
            metadata = metadata.with_renderer_fields(fields);
        }
        let metadata_bytes = metadata.to_json_bytes().map_err(|e| {
            ExError::from(e)
                .with_op("snapshot_metadata")
                .with_entity_id(keys.metadata.clone())
        })?;

        self.store
            .put(&keys.artifact, artifact.png, ARTIFACT_CONTENT_TYPE)
            .await?;
        self.store
            .put(&keys.metadata, metadata_bytes, METADATA_CONTENT_TYPE)
            .await?;

        let locator = format!(
            "{}?ts={}",
            self.store.public_url(&keys.artifact),
            metadata.timestamp
        );
        Ok(StoredSnapshot {
            keys,
            metadata,
            locator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_names() {
        assert_eq!(PipelineOutcome::NoChange.name(), "no_change");
        assert_eq!(
            PipelineOutcome::RenderFailed {
                reason: "x".into()
            }
            .name(),
            "render_failed"
        );
        assert!(!PipelineOutcome::StorageFailed {
            reason: "x".into()
        }
        .is_success());
        assert!(PipelineOutcome::NoChange.is_success());
    }
}
