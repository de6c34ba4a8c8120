//! Deterministic storage keys for one snapshot
//!
//! Layout: `{repository}/{commit}/cluster.png` and
//! `{repository}/{commit}/metadata.json`. Re-processing the same pair
//! overwrites in place.

use crate::model::event::{CommitEvent, UNKNOWN_REPOSITORY};
use kubevc_core_types::RequestId;
use serde::Serialize;

pub const ARTIFACT_OBJECT: &str = "cluster.png";
pub const METADATA_OBJECT: &str = "metadata.json";
pub const ARTIFACT_CONTENT_TYPE: &str = "image/png";
pub const METADATA_CONTENT_TYPE: &str = "application/json";

/// Prefix for commit ids synthesized when a payload carries none
pub const UNKNOWN_COMMIT_PREFIX: &str = "unknown-commit";

/// The `(repository, commit)` pair a snapshot is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SnapshotIdentity {
    pub repository: String,
    pub commit_id: String,
}

impl SnapshotIdentity {
    /// Build an identity from already-trusted segments (e.g. parsed from a listed key)
    pub fn new(repository: impl Into<String>, commit_id: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            commit_id: commit_id.into(),
        }
    }

    /// Resolve the identity a delivery is stored under
    ///
    /// Segments are sanitized so the key keeps its three-part shape. A
    /// missing commit id is namespaced by the request id so two unrelated
    /// malformed deliveries never share a key.
    pub fn resolve(event: &CommitEvent, request_id: &RequestId) -> Self {
        let repository = sanitize_segment(&event.repository)
            .unwrap_or_else(|| UNKNOWN_REPOSITORY.to_string());
        let commit_id = event
            .commit_id
            .as_deref()
            .and_then(sanitize_segment)
            .unwrap_or_else(|| format!("{}-{}", UNKNOWN_COMMIT_PREFIX, request_id.as_str()));
        Self {
            repository,
            commit_id,
        }
    }

    pub fn keys(&self) -> SnapshotKeys {
        SnapshotKeys::new(self)
    }
}

/// Both object keys of one snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotKeys {
    pub prefix: String,
    pub artifact: String,
    pub metadata: String,
}

impl SnapshotKeys {
    pub fn new(identity: &SnapshotIdentity) -> Self {
        let prefix = format!("{}/{}", identity.repository, identity.commit_id);
        Self {
            artifact: format!("{}/{}", prefix, ARTIFACT_OBJECT),
            metadata: format!("{}/{}", prefix, METADATA_OBJECT),
            prefix,
        }
    }
}

/// Make a value usable as a single key segment
///
/// Returns `None` when nothing usable is left (empty, `.` or `..`).
pub fn sanitize_segment(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => None,
        _ => Some(cleaned),
    }
}

/// Split a listed key into `(repository, commit)` if it has the snapshot shape
pub fn parse_snapshot_key(key: &str) -> Option<SnapshotIdentity> {
    let mut parts = key.split('/');
    let repository = parts.next().filter(|s| !s.is_empty())?;
    let commit_id = parts.next().filter(|s| !s.is_empty())?;
    parts.next().filter(|s| !s.is_empty())?;
    Some(SnapshotIdentity::new(repository, commit_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(repo: &str, commit: Option<&str>) -> CommitEvent {
        CommitEvent::new(repo, commit.map(str::to_string), vec![])
    }

    #[test]
    fn test_keys_layout() {
        let identity = SnapshotIdentity::new("infra", "abc123");
        let keys = identity.keys();
        assert_eq!(keys.artifact, "infra/abc123/cluster.png");
        assert_eq!(keys.metadata, "infra/abc123/metadata.json");
        assert_eq!(keys.prefix, "infra/abc123");
    }

    #[test]
    fn test_resolve_is_stable_for_known_commit() {
        let e = event("infra", Some("abc123"));
        let a = SnapshotIdentity::resolve(&e, &RequestId::new());
        let b = SnapshotIdentity::resolve(&e, &RequestId::new());
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_commit_is_request_scoped() {
        let e = event("infra", None);
        let a = SnapshotIdentity::resolve(&e, &RequestId::from_string("r1".into()));
        let b = SnapshotIdentity::resolve(&e, &RequestId::from_string("r2".into()));
        assert_eq!(a.commit_id, "unknown-commit-r1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_commit_treated_as_missing() {
        let e = event("infra", Some("  "));
        let id = SnapshotIdentity::resolve(&e, &RequestId::from_string("r1".into()));
        assert_eq!(id.commit_id, "unknown-commit-r1");
    }

    #[test]
    fn test_slashes_cannot_change_key_shape() {
        let e = event("org/infra", Some("../x"));
        let id = SnapshotIdentity::resolve(&e, &RequestId::new());
        assert_eq!(id.repository, "org_infra");
        assert_eq!(id.commit_id, ".._x");
        assert_eq!(id.keys().artifact.split('/').count(), 3);
    }

    #[test]
    fn test_parse_snapshot_key() {
        assert_eq!(
            parse_snapshot_key("repoA/c1/metadata.json"),
            Some(SnapshotIdentity::new("repoA", "c1"))
        );
        assert_eq!(parse_snapshot_key("repoA/loose-file"), None);
        assert_eq!(parse_snapshot_key("repoA//metadata.json"), None);
    }
}
