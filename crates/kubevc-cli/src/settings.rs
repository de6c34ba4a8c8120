//! Process configuration
//!
//! Sources, lowest precedence first:
//! 1. `KubeVc.yaml` (or the file given with `--config`)
//! 2. `KUBEVC__SECTION__KEY` environment variables (`.env` is loaded first)
//!
//! Read once at startup; collaborators are built from it and the core
//! never sees it again.

use kubevc_core::errors::{ExError, ExErrorKind};
use kubevc_core_types::Sensitive;
use kubevc_engine::EntryOrdering;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "KubeVc.yaml";
pub const ENV_PREFIX: &str = "KUBEVC";
pub const ENV_SEPARATOR: &str = "__";

/// Configuration failures; all of them stop the process before it serves
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("missing required option `{0}`")]
    Missing(&'static str),

    #[error("kubeconfig not found at {0}")]
    KubeconfigNotFound(PathBuf),

    #[error("invalid value for `{option}`: {reason}")]
    InvalidValue { option: &'static str, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to write configuration to {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

impl From<ConfigError> for ExError {
    fn from(err: ConfigError) -> Self {
        let kind = match &err {
            ConfigError::FileNotFound(_)
            | ConfigError::Missing(_)
            | ConfigError::KubeconfigNotFound(_) => ExErrorKind::ConfigurationMissing,
            ConfigError::InvalidValue { .. } | ConfigError::Load(_) => {
                ExErrorKind::InvalidConfiguration
            }
            ConfigError::Write { .. } => ExErrorKind::Io,
        };
        ExError::new(kind)
            .with_op("load_config")
            .with_message(err.to_string())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub s3: S3Settings,
    #[serde(alias = "kubeconfig")]
    pub kube: KubeSettings,
    pub storage: StorageSettings,
    pub renderer: RendererSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    #[serde(alias = "access_key")]
    pub access_key_id: String,
    #[serde(alias = "secret_key")]
    pub secret_access_key: Sensitive<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: "ap-south-1".to_string(),
            access_key_id: String::new(),
            secret_access_key: Sensitive::default(),
            endpoint: None,
            public_base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KubeSettings {
    #[serde(alias = "path")]
    pub config_path: String,
}

impl Default for KubeSettings {
    fn default() -> Self {
        Self {
            config_path: "~/.kube/config".to_string(),
        }
    }
}

impl KubeSettings {
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.config_path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub local_root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::S3,
            local_root: PathBuf::from("./snapshots"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Program and leading arguments; changed manifest paths are appended
    pub command: Vec<String>,
    pub artifact_file: String,
    pub metadata_file: String,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            command: vec!["python3".to_string(), "cluster_diagram.py".to_string()],
            artifact_file: "cluster.png".to_string(),
            metadata_file: "metadata.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
    pub render_timeout_secs: u64,
    pub dashboard_order: EntryOrdering,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            render_timeout_secs: 60,
            dashboard_order: EntryOrdering::Timestamp,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
            option: "server.bind",
            reason: e.to_string(),
        })
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }
}

impl Settings {
    /// Load from the file (if present) layered under `KUBEVC__*` variables
    ///
    /// An explicit path must exist; the default `KubeVc.yaml` may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, Self::environment())
    }

    /// `KUBEVC__*` source; `KUBEVC__RENDERER__COMMAND` is split on spaces into argv
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .list_separator(" ")
            .with_list_parse_key("renderer.command")
    }

    pub fn load_with_env(
        path: Option<&Path>,
        env: config::Environment,
    ) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if !p.exists() => return Err(ConfigError::FileNotFound(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let raw = config::Config::builder()
            .add_source(
                config::File::from(file.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(env)
            .build()?;
        Ok(raw.try_deserialize()?)
    }

    /// Startup checks; any failure is fatal
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.storage.backend {
            StorageBackend::S3 => {
                require("s3.bucket", &self.s3.bucket)?;
                require("s3.region", &self.s3.region)?;
                require("s3.access_key_id", &self.s3.access_key_id)?;
                require("s3.secret_access_key", self.s3.secret_access_key.expose())?;
            }
            StorageBackend::Local => {
                if self.storage.local_root.as_os_str().is_empty() {
                    return Err(ConfigError::Missing("storage.local_root"));
                }
            }
        }

        if self.renderer.command.iter().all(|arg| arg.trim().is_empty()) {
            return Err(ConfigError::Missing("renderer.command"));
        }
        require("renderer.artifact_file", &self.renderer.artifact_file)?;

        self.server.bind_addr()?;
        if self.server.render_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                option: "server.render_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }

        let kubeconfig = self.kube.resolved_path();
        if !kubeconfig.exists() {
            return Err(ConfigError::KubeconfigNotFound(kubeconfig));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Write {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            reason: e.to_string(),
        })
    }
}

fn require(option: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Missing(option))
    } else {
        Ok(())
    }
}

/// Expand a leading `~` using `HOME`
pub fn expand_home(raw: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    match (raw, home) {
        ("~", Some(home)) => home,
        (r, Some(home)) if r.starts_with("~/") => home.join(&r[2..]),
        (r, _) => PathBuf::from(r),
    }
}
