//! KubeVC Server - HTTP boundary
//!
//! Routes:
//! - `POST /webhook`: change detection and the snapshot pipeline; always 200
//! - `GET /dashboard`, `GET /api/snapshots`: reconstructed snapshot history
//! - `GET /`: landing page
//! - `GET /healthz`: liveness plus the advisory last-seen commit
//! - `GET /artifacts/{*key}`: stored objects, for backends without public URLs
//!
//! Also hosts the renderer adapters the binary wires in: the subprocess
//! renderer and the boundary-imposed render timeout.

pub mod diagnostics;
pub mod handlers;
pub mod html;
pub mod renderer;
pub mod routes;
pub mod state;

pub use diagnostics::{LastSeenCommit, LastSeenSnapshot};
pub use handlers::WebhookResponse;
pub use renderer::{CommandRenderer, TimeoutRenderer};
pub use routes::{build_router, serve};
pub use state::{AppState, ServerOptions};
