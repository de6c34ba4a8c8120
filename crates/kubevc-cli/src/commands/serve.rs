//! Start the HTTP server

use crate::settings::Settings;
use crate::wiring::{build_renderer, build_store};
use anyhow::Context;
use clap::Args;
use kubevc_server::{serve, AppState, ServerOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file (default: ./KubeVc.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address, overriding `server.bind`
    #[arg(long)]
    pub bind: Option<String>,
}

pub async fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }
    settings.validate()?;

    let store = build_store(&settings)?;
    let renderer = Arc::new(build_renderer(&settings));
    tracing::info!(
        backend = store.backend(),
        renderer = ?renderer.argv(),
        kubeconfig = %settings.kube.resolved_path().display(),
        "configuration loaded"
    );

    let state = AppState::new(
        renderer,
        store,
        ServerOptions {
            render_timeout: settings.server.render_timeout(),
            dashboard_order: settings.server.dashboard_order,
        },
    );

    let addr = settings.server.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    serve(listener, state).await.context("server terminated")?;
    Ok(())
}
