//! Change detection: which manifest files did a push touch?
//!
//! Pure and infallible. Missing or malformed fields degrade to placeholders
//! and empty collections.

use crate::model::event::UNKNOWN_REPOSITORY;
use crate::model::{CommitEvent, ManifestChangeSet};
use crate::webhook::WebhookPayload;

const MANIFEST_EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Output of change detection for one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedChange {
    pub event: CommitEvent,
    pub manifests: ManifestChangeSet,
}

/// Extract the commit event and the manifest change set from a payload
pub fn detect(payload: &WebhookPayload) -> DetectedChange {
    let repository = payload
        .repository
        .as_ref()
        .and_then(|r| r.name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_REPOSITORY)
        .to_string();

    let commit_id = non_blank(payload.after.as_deref())
        .or_else(|| non_blank(payload.head_commit.as_ref().and_then(|h| h.id.as_deref())))
        .map(str::to_string);

    let changed_paths: Vec<String> = payload
        .commits
        .iter()
        .flat_map(|c| c.touched_paths())
        .map(str::to_string)
        .collect();

    let mut manifests = ManifestChangeSet::new();
    for path in changed_paths.iter().filter(|p| is_manifest_path(p)) {
        manifests.insert(path.clone());
    }

    DetectedChange {
        event: CommitEvent::new(repository, commit_id, changed_paths),
        manifests,
    }
}

/// Case-insensitive `.yaml` / `.yml` suffix check
pub fn is_manifest_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    MANIFEST_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_extensions() {
        assert!(is_manifest_path("deploy.yaml"));
        assert!(is_manifest_path("k8s/Service.YML"));
        assert!(!is_manifest_path("README.md"));
        assert!(!is_manifest_path("yaml"));
        assert!(!is_manifest_path("values.yaml.bak"));
    }

    #[test]
    fn test_empty_payload() {
        let detected = detect(&WebhookPayload::default());
        assert_eq!(detected.event.repository, "unknown-repo");
        assert_eq!(detected.event.commit_id, None);
        assert!(detected.manifests.is_empty());
    }
}
