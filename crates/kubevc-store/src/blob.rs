//! The blob store abstraction shared by every backend

use crate::errors::{invalid_key, Result};
use async_trait::async_trait;

/// Generic key/value object storage with prefix listing
///
/// Keys are `/`-separated. Writes to an existing key overwrite it
/// (last write wins). Implementations never cache across calls.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Short backend name for logs ("s3", "fs", "memory")
    fn backend(&self) -> &'static str;

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// All keys starting with `prefix`, in listing order
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Distinct next-level segment names below `prefix` (no trailing `/`)
    ///
    /// `prefix` is either empty or ends with `/`.
    async fn list_common_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let keys = self.list_by_prefix(prefix).await?;
        Ok(common_prefixes(prefix, &keys))
    }

    /// Publicly resolvable location of `key` (URL or server-relative path)
    fn public_url(&self, key: &str) -> String;
}

/// Collapse listed keys into their distinct child segments below `prefix`
///
/// Keys sitting directly at the prefix level (no further `/`) are not
/// prefixes and are skipped. First-seen order is kept.
pub fn common_prefixes(prefix: &str, keys: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for key in keys {
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        let Some((segment, _)) = rest.split_once('/') else {
            continue;
        };
        if !segment.is_empty() && seen.insert(segment.to_string()) {
            out.push(segment.to_string());
        }
    }
    out
}

/// Reject keys that could escape a backend's namespace
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid_key(key, "key is empty"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(invalid_key(key, "key must be a relative '/'-separated path"));
    }
    if key
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid_key(key, "key contains an empty or relative segment"));
    }
    Ok(())
}

/// Content type inferred from a key's extension
pub fn content_type_for(key: &str) -> &'static str {
    let lower = key.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".json") {
        "application/json"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_common_prefixes_top_level() {
        let listed = keys(&[
            "repoA/c1/cluster.png",
            "repoA/c1/metadata.json",
            "repoB/c9/metadata.json",
            "stray.txt",
        ]);
        assert_eq!(common_prefixes("", &listed), vec!["repoA", "repoB"]);
    }

    #[test]
    fn test_common_prefixes_nested() {
        let listed = keys(&["repoA/c1/cluster.png", "repoA/c2/metadata.json"]);
        assert_eq!(common_prefixes("repoA/", &listed), vec!["c1", "c2"]);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("infra/abc123/cluster.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("infra/../../etc").is_err());
        assert!(validate_key("infra//cluster.png").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a/b/cluster.png"), "image/png");
        assert_eq!(content_type_for("a/b/metadata.json"), "application/json");
        assert_eq!(content_type_for("a/b/blob"), "application/octet-stream");
    }
}
