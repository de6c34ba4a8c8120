use async_trait::async_trait;
use kubevc_core::{ManifestChangeSet, RenderFailure, Renderer, SnapshotArtifact};
use std::time::Duration;

/// Bounds any renderer's run time; elapsed maps to `RenderFailure::Timeout`
///
/// The inner future is dropped on timeout, so a `CommandRenderer` child
/// process is killed with it.
pub struct TimeoutRenderer<R> {
    inner: R,
    limit: Duration,
}

impl<R: Renderer> TimeoutRenderer<R> {
    pub fn new(inner: R, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<R: Renderer> Renderer for TimeoutRenderer<R> {
    async fn render(&self, hint: &ManifestChangeSet) -> Result<SnapshotArtifact, RenderFailure> {
        match tokio::time::timeout(self.limit, self.inner.render(hint)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(limit_ms = self.limit.as_millis() as u64, "render timed out");
                Err(RenderFailure::Timeout(self.limit))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SlowRenderer(Duration);

    #[async_trait]
    impl Renderer for SlowRenderer {
        async fn render(
            &self,
            _hint: &ManifestChangeSet,
        ) -> Result<SnapshotArtifact, RenderFailure> {
            tokio::time::sleep(self.0).await;
            Ok(SnapshotArtifact::new(vec![1]))
        }
    }

    #[tokio::test]
    async fn test_slow_render_times_out() {
        let renderer = TimeoutRenderer::new(
            SlowRenderer(Duration::from_secs(5)),
            Duration::from_millis(20),
        );
        let err = renderer.render(&ManifestChangeSet::new()).await.unwrap_err();
        assert_eq!(err, RenderFailure::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_fast_render_passes_through() {
        let renderer = TimeoutRenderer::new(SlowRenderer(Duration::ZERO), Duration::from_secs(5));
        let artifact = renderer.render(&ManifestChangeSet::new()).await.unwrap();
        assert_eq!(artifact.png, vec![1]);
    }
}
