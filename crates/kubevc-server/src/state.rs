use crate::diagnostics::LastSeenCommit;
use crate::renderer::TimeoutRenderer;
use kubevc_core::Renderer;
use kubevc_engine::{EntryOrdering, SnapshotPipeline, StateReconstructor};
use kubevc_store::BlobStore;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Boundary settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// Upper bound on one render; exceeding it is a render failure
    pub render_timeout: Duration,
    pub dashboard_order: EntryOrdering,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            dashboard_order: EntryOrdering::default(),
        }
    }
}

/// Shared handler state; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SnapshotPipeline,
    pub reconstructor: StateReconstructor,
    pub store: Arc<dyn BlobStore>,
    pub last_seen: Arc<LastSeenCommit>,
}

impl AppState {
    /// Wire collaborators; the renderer is wrapped with the render timeout
    pub fn new(
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn BlobStore>,
        options: ServerOptions,
    ) -> Self {
        let renderer: Arc<dyn Renderer> =
            Arc::new(TimeoutRenderer::new(renderer, options.render_timeout));
        Self {
            pipeline: SnapshotPipeline::new(renderer, store.clone()),
            reconstructor: StateReconstructor::new(store.clone())
                .with_ordering(options.dashboard_order),
            store,
            last_seen: Arc::new(LastSeenCommit::new()),
        }
    }
}
