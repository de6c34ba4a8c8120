//! State reconstruction from store listings

use kubevc_core::model::dashboard::DEGRADED_TIMESTAMP;
use kubevc_engine::{EntryOrdering, StateReconstructor};
use kubevc_store::{BlobStore, MemoryBlobStore};
use std::sync::Arc;

fn metadata(repo: &str, commit: &str, timestamp: &str, paths: &[&str]) -> String {
    serde_json::json!({
        "commit_hash": commit,
        "repo_name": repo,
        "changed_yaml": paths,
        "timestamp": timestamp,
    })
    .to_string()
}

#[tokio::test]
async fn test_corrupt_metadata_yields_degraded_entry() {
    // Given one valid and one corrupt metadata object
    let store = Arc::new(MemoryBlobStore::new());
    store.insert(
        "repoA/c1/metadata.json",
        metadata("repoA", "c1", "2024-05-01T10:00:00.000000Z", &["deploy.yaml"]),
    );
    store.insert("repoA/c2/metadata.json", "{not json");

    // When the dashboard is rebuilt
    let entries = StateReconstructor::new(store.clone())
        .list_snapshots()
        .await
        .unwrap();

    // Then both commits appear, the broken one degraded and last
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].commit_id, "c1");
    assert_eq!(entries[0].changed_manifest_paths, vec!["deploy.yaml"]);
    assert!(!entries[0].degraded);
    assert_eq!(entries[1].commit_id, "c2");
    assert_eq!(entries[1].timestamp, DEGRADED_TIMESTAMP);
    assert!(entries[1].changed_manifest_paths.is_empty());
    assert!(entries[1].degraded);
}

#[tokio::test]
async fn test_artifact_without_metadata_is_still_listed() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("infra/abc123/cluster.png", vec![1u8, 2, 3]);

    let entries = StateReconstructor::new(store.clone())
        .list_snapshots()
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert!(entries[0].degraded);
    assert_eq!(
        entries[0].image_locator,
        "memory://infra/abc123/cluster.png?ts=N/A"
    );
}

#[tokio::test]
async fn test_orders_by_timestamp_within_repository() {
    // Given commit ids whose string order disagrees with recency
    let store = Arc::new(MemoryBlobStore::new());
    store.insert(
        "infra/aaa/metadata.json",
        metadata("infra", "aaa", "2024-05-03T00:00:00.000000Z", &[]),
    );
    store.insert(
        "infra/zzz/metadata.json",
        metadata("infra", "zzz", "2024-05-01T00:00:00.000000Z", &[]),
    );
    store.insert(
        "payments/p1/metadata.json",
        metadata("payments", "p1", "2024-05-02T00:00:00.000000Z", &[]),
    );

    // When listed with each ordering
    let by_time = StateReconstructor::new(store.clone())
        .list_snapshots()
        .await
        .unwrap();
    let by_id = StateReconstructor::new(store.clone())
        .with_ordering(EntryOrdering::CommitId)
        .list_snapshots()
        .await
        .unwrap();

    // Then repositories stay grouped in listing order
    let ids = |entries: &[kubevc_core::DashboardEntry]| {
        entries
            .iter()
            .map(|e| format!("{}/{}", e.repository, e.commit_id))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&by_time), vec!["infra/aaa", "infra/zzz", "payments/p1"]);
    assert_eq!(ids(&by_id), vec!["infra/zzz", "infra/aaa", "payments/p1"]);
}

#[tokio::test]
async fn test_every_call_relists_the_store() {
    let store = Arc::new(MemoryBlobStore::new());
    let reconstructor = StateReconstructor::new(store.clone());
    assert!(reconstructor.list_snapshots().await.unwrap().is_empty());

    store
        .put(
            "infra/abc123/metadata.json",
            metadata("infra", "abc123", "2024-05-01T10:00:00.000000Z", &[]).into_bytes(),
            "application/json",
        )
        .await
        .unwrap();

    assert_eq!(reconstructor.list_snapshots().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_top_level_listing_failure_is_an_error() {
    let store = Arc::new(MemoryBlobStore::new());
    store.fail_listing();

    let result = StateReconstructor::new(store.clone()).list_snapshots().await;

    assert!(result.is_err());
}
