//! Validate configuration and reach the store once

use crate::settings::Settings;
use crate::wiring::build_store;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Configuration file (default: ./KubeVc.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub async fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    settings.validate()?;

    let store = build_store(&settings)?;
    let repositories = store.list_common_prefixes("").await?;

    println!(
        "configuration OK: {} backend reachable, {} repositories with snapshots",
        store.backend(),
        repositories.len()
    );
    println!("kubeconfig: {}", settings.kube.resolved_path().display());
    Ok(())
}
