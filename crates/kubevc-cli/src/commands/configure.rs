//! Write a configuration file from flags

use crate::settings::{ConfigError, Settings, StorageBackend, DEFAULT_CONFIG_FILE};
use clap::Args;
use kubevc_core_types::Sensitive;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConfigureArgs {
    #[arg(long, value_enum, default_value_t = StorageBackend::S3)]
    pub backend: StorageBackend,

    #[arg(long)]
    pub bucket: Option<String>,

    #[arg(long, default_value = "ap-south-1")]
    pub region: String,

    #[arg(long)]
    pub access_key_id: Option<String>,

    #[arg(long)]
    pub secret_access_key: Option<String>,

    /// S3-compatible endpoint (path-style)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Directory for the local backend
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    #[arg(long, default_value = "~/.kube/config")]
    pub kubeconfig: String,

    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(args: ConfigureArgs) -> anyhow::Result<()> {
    let settings = settings_from_args(&args)?;

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            args.output.display()
        );
    }

    let yaml = settings.to_yaml()?;
    std::fs::write(&args.output, yaml).map_err(|e| ConfigError::Write {
        path: args.output.clone(),
        reason: e.to_string(),
    })?;

    println!("Configuration saved to {}", args.output.display());
    Ok(())
}

fn settings_from_args(args: &ConfigureArgs) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();
    settings.storage.backend = args.backend;
    settings.kube.config_path = args.kubeconfig.clone();
    settings.s3.region = args.region.clone();
    settings.s3.endpoint = args.endpoint.clone();

    match args.backend {
        StorageBackend::S3 => {
            settings.s3.bucket = required(&args.bucket, "s3.bucket")?;
            settings.s3.access_key_id = required(&args.access_key_id, "s3.access_key_id")?;
            settings.s3.secret_access_key =
                Sensitive::new(required(&args.secret_access_key, "s3.secret_access_key")?);
        }
        StorageBackend::Local => {
            if let Some(root) = &args.local_root {
                settings.storage.local_root = root.clone();
            }
        }
    }
    Ok(settings)
}

fn required(value: &Option<String>, option: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::Missing(option))
}
