//! Subprocess renderer
//!
//! Runs the configured command once per render, in a fresh temporary
//! working directory, with the changed manifest paths appended as
//! arguments. The command is expected to leave the diagram (and optionally
//! a metadata JSON object) in that directory.

use async_trait::async_trait;
use kubevc_core::{ManifestChangeSet, RenderFailure, Renderer, SnapshotArtifact};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const STDERR_TAIL_CHARS: usize = 2000;

pub const DEFAULT_ARTIFACT_FILE: &str = "cluster.png";
pub const DEFAULT_METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Clone)]
pub struct CommandRenderer {
    argv: Vec<String>,
    kubeconfig: Option<PathBuf>,
    artifact_file: String,
    metadata_file: String,
}

impl CommandRenderer {
    /// Build from an argv; arguments naming existing relative files are
    /// anchored to the current directory so they survive the per-run cwd
    pub fn new(argv: Vec<String>) -> Self {
        let base = std::env::current_dir().unwrap_or_default();
        Self {
            argv: anchor_relative_files(argv, &base),
            kubeconfig: None,
            artifact_file: DEFAULT_ARTIFACT_FILE.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
        }
    }

    /// Exported to the child as `KUBECONFIG`
    pub fn with_kubeconfig(mut self, path: impl Into<PathBuf>) -> Self {
        self.kubeconfig = Some(path.into());
        self
    }

    pub fn with_output_files(
        mut self,
        artifact_file: impl Into<String>,
        metadata_file: impl Into<String>,
    ) -> Self {
        self.artifact_file = artifact_file.into();
        self.metadata_file = metadata_file.into();
        self
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

#[async_trait]
impl Renderer for CommandRenderer {
    async fn render(&self, hint: &ManifestChangeSet) -> Result<SnapshotArtifact, RenderFailure> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| RenderFailure::Spawn("renderer command is empty".to_string()))?;

        let workdir = tempfile::Builder::new()
            .prefix("kubevc-render-")
            .tempdir()
            .map_err(|e| RenderFailure::Io(e.to_string()))?;

        let mut command = Command::new(program);
        command
            .args(args)
            .args(hint.iter())
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(kubeconfig) = &self.kubeconfig {
            command.env("KUBECONFIG", kubeconfig);
        }

        tracing::debug!(program = %program, manifests = hint.len(), "starting renderer");
        let output = command
            .output()
            .await
            .map_err(|e| RenderFailure::Spawn(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            return Err(RenderFailure::Exited {
                status: output.status.to_string(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let artifact_path = workdir.path().join(&self.artifact_file);
        let png = match tokio::fs::read(&artifact_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RenderFailure::MissingArtifact(self.artifact_file.clone()))
            }
            Err(e) => return Err(RenderFailure::Io(e.to_string())),
        };

        let artifact = SnapshotArtifact::new(png);
        Ok(match read_metadata(&workdir.path().join(&self.metadata_file)).await {
            Some(fields) => artifact.with_metadata(fields),
            None => artifact,
        })
    }
}

/// Renderer metadata is optional; anything but a JSON object is ignored
async fn read_metadata(path: &Path) -> Option<Map<String, Value>> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "renderer metadata is not a JSON object; ignoring");
            None
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "renderer metadata unparseable; ignoring");
            None
        }
    }
}

fn anchor_relative_files(argv: Vec<String>, base: &Path) -> Vec<String> {
    argv.into_iter()
        .map(|arg| {
            let candidate = Path::new(&arg);
            if candidate.is_relative() && base.join(candidate).is_file() {
                base.join(candidate).to_string_lossy().into_owned()
            } else {
                arg
            }
        })
        .collect()
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let skip = text.chars().count().saturating_sub(STDERR_TAIL_CHARS);
    text.chars().skip(skip).collect()
}
