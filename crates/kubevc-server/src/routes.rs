use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/dashboard", get(handlers::dashboard))
        .route("/webhook", post(handlers::webhook))
        .route("/healthz", get(handlers::healthz))
        .route("/api/snapshots", get(handlers::api_snapshots))
        .route("/artifacts/*key", get(handlers::artifact))
        .with_state(state)
}

/// Serve until Ctrl-C; in-flight requests finish first
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, backend = state.store.backend(), "kubevc listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
