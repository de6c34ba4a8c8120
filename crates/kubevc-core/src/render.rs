//! Renderer capability
//!
//! A renderer turns the live cluster topology into one PNG artifact. The
//! change set is an advisory hint only; renderers query the cluster
//! themselves and must not use it as a filter.

use crate::errors::{ExError, ExErrorKind};
use crate::model::ManifestChangeSet;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// One rendered topology diagram
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotArtifact {
    pub png: Vec<u8>,
    /// Extra metadata the renderer reported alongside the image
    pub metadata: Option<Map<String, Value>>,
}

impl SnapshotArtifact {
    pub fn new(png: Vec<u8>) -> Self {
        Self {
            png,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Why a render attempt produced no artifact
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderFailure {
    #[error("renderer could not be started: {0}")]
    Spawn(String),

    #[error("renderer exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("renderer produced no artifact at {0}")]
    MissingArtifact(String),

    #[error("renderer timed out after {0:?}")]
    Timeout(Duration),

    #[error("renderer I/O failed: {0}")]
    Io(String),

    /// Cluster credentials missing, API unreachable, or similar
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

impl From<RenderFailure> for ExError {
    fn from(err: RenderFailure) -> Self {
        let kind = match err {
            RenderFailure::Timeout(_) => ExErrorKind::Timeout,
            _ => ExErrorKind::ExternalService,
        };
        ExError::new(kind)
            .with_op("render")
            .with_message(err.to_string())
    }
}

/// Produces a topology artifact for the cluster's current state
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, hint: &ManifestChangeSet) -> Result<SnapshotArtifact, RenderFailure>;
}

#[async_trait]
impl<R: Renderer + ?Sized> Renderer for Arc<R> {
    async fn render(&self, hint: &ManifestChangeSet) -> Result<SnapshotArtifact, RenderFailure> {
        (**self).render(hint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRenderer;

    #[async_trait]
    impl Renderer for FixedRenderer {
        async fn render(
            &self,
            hint: &ManifestChangeSet,
        ) -> Result<SnapshotArtifact, RenderFailure> {
            Ok(SnapshotArtifact::new(vec![hint.len() as u8]))
        }
    }

    #[tokio::test]
    async fn test_arc_renderer_delegates() {
        let renderer: Arc<dyn Renderer> = Arc::new(FixedRenderer);
        let hint: ManifestChangeSet = ["a.yaml", "b.yaml"].into_iter().collect();
        let artifact = renderer.render(&hint).await.unwrap();
        assert_eq!(artifact.png, vec![2]);
    }

    #[test]
    fn test_timeout_maps_to_timeout_kind() {
        let err: ExError = RenderFailure::Timeout(Duration::from_secs(60)).into();
        assert_eq!(err.kind(), ExErrorKind::Timeout);
        assert_eq!(err.op(), Some("render"));
    }

    #[test]
    fn test_exit_maps_to_external_service() {
        let err: ExError = RenderFailure::Exited {
            status: "exit status: 1".into(),
            stderr: "kubeconfig not found".into(),
        }
        .into();
        assert_eq!(err.code(), "ERR_EXTERNAL_SERVICE");
        assert!(err.message().contains("kubeconfig not found"));
    }
}
