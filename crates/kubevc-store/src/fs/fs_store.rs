//! Local directory blob store
//!
//! Key `a/b/c` lives at `<root>/a/b/c`. Locators point at the server's
//! `/artifacts/` route, which streams objects back out of this store.

use crate::blob::{validate_key, BlobStore};
use crate::errors::{io_error, task_failed, Result};
use crate::fs::atomic::{atomic_write, TEMP_SUFFIX};
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DEFAULT_PUBLIC_BASE: &str = "/artifacts";

/// Filesystem-based blob store
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    /// Create a store rooted at the given directory (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            public_base: DEFAULT_PUBLIC_BASE.to_string(),
        }
    }

    /// Override the base used by `public_url`
    pub fn with_public_base(mut self, base: impl Into<String>) -> Self {
        self.public_base = base.into().trim_end_matches('/').to_string();
        self
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn backend(&self) -> &'static str {
        "fs"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.path_for(key);
        let owned_key = key.to_string();
        tokio::task::spawn_blocking(move || {
            atomic_write(&path, &bytes).map_err(|e| io_error("fs_put", &owned_key, e))
        })
        .await
        .map_err(|e| task_failed("fs_put", e))?
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        let path = self.path_for(key);
        let owned_key = key.to_string();
        tokio::task::spawn_blocking(move || {
            fs::read(&path).map_err(|e| io_error("fs_get", &owned_key, e))
        })
        .await
        .map_err(|e| task_failed("fs_get", e))?
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.root.clone();
        let prefix = prefix.to_string();
        tokio::task::spawn_blocking(move || list_keys(&root, &prefix))
            .await
            .map_err(|e| task_failed("fs_list", e))?
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }
}

fn list_keys(root: &Path, prefix: &str) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut keys = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let key = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            io_error("fs_list", &key, std::io::Error::other(e.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if key.starts_with(prefix) {
            keys.push(key);
        }
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubevc_core::errors::ExErrorKind;
    use tempfile::TempDir;

    fn setup_store() -> (FsBlobStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FsBlobStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_put_get() {
        let (store, _dir) = setup_store();

        store
            .put("infra/abc/cluster.png", b"png".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(store.get("infra/abc/cluster.png").await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (store, _dir) = setup_store();

        let err = store.get("infra/abc/metadata.json").await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_missing_root_is_empty() {
        let store = FsBlobStore::new("/nonexistent/kubevc/root");
        assert!(store.list_by_prefix("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (store, _dir) = setup_store();
        let err = store.get("../outside").await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    }

    #[test]
    fn test_public_url() {
        let store = FsBlobStore::new("/tmp/x");
        assert_eq!(
            store.public_url("infra/abc/cluster.png"),
            "/artifacts/infra/abc/cluster.png"
        );
        let store = store.with_public_base("http://localhost:5000/artifacts/");
        assert_eq!(
            store.public_url("infra/abc/cluster.png"),
            "http://localhost:5000/artifacts/infra/abc/cluster.png"
        );
    }
}
