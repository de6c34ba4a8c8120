//! Change detection scenarios and properties

use kubevc_core::webhook::WebhookPayload;
use kubevc_core::{detect, is_manifest_path};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn test_single_added_manifest() {
    // Given: a push adding deploy.yaml to infra at abc123
    let payload = WebhookPayload::from_value(json!({
        "after": "abc123",
        "repository": {"name": "infra"},
        "commits": [{"added": ["deploy.yaml"], "modified": [], "removed": []}]
    }));

    // When
    let detected = detect(&payload);

    // Then
    assert_eq!(detected.event.repository, "infra");
    assert_eq!(detected.event.commit_id.as_deref(), Some("abc123"));
    assert_eq!(detected.manifests.to_vec(), vec!["deploy.yaml"]);
}

#[test]
fn test_no_commits_yields_empty_change_set() {
    let payload = WebhookPayload::from_value(json!({
        "after": "abc123",
        "repository": {"name": "infra"},
        "commits": []
    }));

    assert!(detect(&payload).manifests.is_empty());
}

#[test]
fn test_non_manifest_changes_yield_empty_change_set() {
    let payload = WebhookPayload::from_value(json!({
        "after": "abc123",
        "commits": [
            {"added": ["src/main.rs"], "modified": ["README.md"], "removed": ["Dockerfile"]}
        ]
    }));

    let detected = detect(&payload);
    assert!(detected.manifests.is_empty());
    assert_eq!(detected.event.changed_paths.len(), 3);
}

#[test]
fn test_commit_id_falls_back_to_head_commit() {
    let payload = WebhookPayload::from_value(json!({
        "after": "",
        "head_commit": {"id": "def456"},
        "commits": []
    }));

    assert_eq!(detect(&payload).event.commit_id.as_deref(), Some("def456"));
}

#[test]
fn test_after_wins_over_head_commit() {
    let payload = WebhookPayload::from_value(json!({
        "after": "abc123",
        "head_commit": {"id": "def456"}
    }));

    assert_eq!(detect(&payload).event.commit_id.as_deref(), Some("abc123"));
}

#[test]
fn test_union_across_added_modified_removed_and_commits() {
    let payload = WebhookPayload::from_value(json!({
        "commits": [
            {"added": ["a.yaml"], "modified": ["b.yml"], "removed": ["notes.txt"]},
            {"added": [], "modified": ["a.yaml"], "removed": ["C.YAML"]}
        ]
    }));

    let detected = detect(&payload);
    assert_eq!(detected.manifests.to_vec(), vec!["C.YAML", "a.yaml", "b.yml"]);
}

fn path_strategy() -> impl Strategy<Value = String> {
    (
        "[a-z]{1,6}",
        prop::sample::select(vec![".yaml", ".yml", ".YAML", ".json", ".md", ""]),
    )
        .prop_map(|(stem, ext)| format!("{stem}{ext}"))
}

fn commit_strategy() -> impl Strategy<Value = (Vec<String>, Vec<String>, Vec<String>)> {
    (
        prop::collection::vec(path_strategy(), 0..4),
        prop::collection::vec(path_strategy(), 0..4),
        prop::collection::vec(path_strategy(), 0..4),
    )
}

fn payload_for(commits: &[(Vec<String>, Vec<String>, Vec<String>)]) -> WebhookPayload {
    let commits: Vec<_> = commits
        .iter()
        .map(|(a, m, r)| json!({"added": a, "modified": m, "removed": r}))
        .collect();
    WebhookPayload::from_value(json!({"after": "c1", "commits": commits}))
}

proptest! {
    #[test]
    fn prop_change_set_is_deduplicated_union(commits in prop::collection::vec(commit_strategy(), 0..5)) {
        let detected = detect(&payload_for(&commits));

        let expected: BTreeSet<String> = commits
            .iter()
            .flat_map(|(a, m, r)| a.iter().chain(m).chain(r))
            .filter(|p| is_manifest_path(p))
            .cloned()
            .collect();

        let actual: BTreeSet<String> = detected.manifests.iter().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(detected.manifests.len(), detected.manifests.iter().count());
    }

    #[test]
    fn prop_commit_order_does_not_matter(commits in prop::collection::vec(commit_strategy(), 0..5)) {
        let mut reversed = commits.clone();
        reversed.reverse();

        prop_assert_eq!(
            detect(&payload_for(&commits)).manifests,
            detect(&payload_for(&reversed)).manifests
        );
    }

    #[test]
    fn prop_detect_never_panics_on_arbitrary_json(body in ".{0,64}") {
        let payload = WebhookPayload::from_slice(body.as_bytes());
        let _ = detect(&payload);
    }
}
