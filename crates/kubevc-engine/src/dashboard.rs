//! Dashboard state reconstruction
//!
//! The store is the only source of truth: every call lists repositories,
//! then the keys under each, and reads each commit's metadata. Nothing is
//! cached between calls.

use chrono::{DateTime, Utc};
use kubevc_core::errors::{ExError, ExErrorKind, Result};
use kubevc_core::model::dashboard::DEGRADED_TIMESTAMP;
use kubevc_core::model::keys::{parse_snapshot_key, SnapshotIdentity};
use kubevc_core::{log_op_end, log_op_error, log_op_start, DashboardEntry, SnapshotMetadata};
use kubevc_store::BlobStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

/// Order of commits within one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrdering {
    /// Newest metadata timestamp first; degraded entries last
    #[default]
    Timestamp,
    /// Commit id descending. Only meaningful when ids sort by recency.
    CommitId,
}

impl FromStr for EntryOrdering {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timestamp" => Ok(EntryOrdering::Timestamp),
            "commit_id" | "commit-id" => Ok(EntryOrdering::CommitId),
            other => Err(ExError::new(ExErrorKind::InvalidConfiguration)
                .with_op("parse_dashboard_order")
                .with_entity_id(other)
                .with_message("expected 'timestamp' or 'commit_id'")),
        }
    }
}

/// Rebuilds the snapshot history from store listings
#[derive(Clone)]
pub struct StateReconstructor {
    store: Arc<dyn BlobStore>,
    ordering: EntryOrdering,
}

impl StateReconstructor {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            ordering: EntryOrdering::default(),
        }
    }

    pub fn with_ordering(mut self, ordering: EntryOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// All known snapshots, grouped by repository in listing order
    ///
    /// Fails only when the top-level repository listing fails. A repository
    /// whose keys cannot be listed is skipped; a commit whose metadata cannot
    /// be read or parsed becomes a degraded entry.
    pub async fn list_snapshots(&self) -> Result<Vec<DashboardEntry>> {
        log_op_start!("dashboard_list", backend = self.store.backend());
        let start = Instant::now();

        let repositories = match self.store.list_common_prefixes("").await {
            Ok(repositories) => repositories,
            Err(err) => {
                log_op_error!(
                    "dashboard_list",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                return Err(err);
            }
        };

        let mut entries = Vec::new();
        for repository in repositories {
            entries.extend(self.repository_entries(&repository).await);
        }

        log_op_end!(
            "dashboard_list",
            duration_ms = start.elapsed().as_millis() as u64,
            entry_count = entries.len()
        );
        Ok(entries)
    }

    async fn repository_entries(&self, repository: &str) -> Vec<DashboardEntry> {
        let keys = match self.store.list_by_prefix(&format!("{}/", repository)).await {
            Ok(keys) => keys,
            Err(err) => {
                tracing::warn!(
                    repository,
                    err.code = err.code(),
                    error = %err,
                    "skipping repository; listing failed"
                );
                return Vec::new();
            }
        };

        let commits: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| parse_snapshot_key(key))
            .filter(|identity| identity.repository == repository)
            .map(|identity| identity.commit_id)
            .collect();

        let mut entries = Vec::with_capacity(commits.len());
        for commit_id in commits {
            let identity = SnapshotIdentity::new(repository, commit_id);
            entries.push(self.entry_for(&identity).await);
        }
        sort_entries(&mut entries, self.ordering);
        entries
    }

    async fn entry_for(&self, identity: &SnapshotIdentity) -> DashboardEntry {
        let keys = identity.keys();
        let metadata = match self.store.get(&keys.metadata).await {
            Ok(bytes) => SnapshotMetadata::from_json_bytes(&bytes).map_err(ExError::from),
            Err(err) => Err(err),
        };

        let (timestamp, changed_manifest_paths, degraded) = match metadata {
            Ok(meta) => (meta.timestamp, meta.changed_yaml, false),
            Err(err) => {
                tracing::warn!(
                    key = %keys.metadata,
                    err.code = err.code(),
                    error = %err,
                    "metadata unreadable; showing degraded entry"
                );
                (DEGRADED_TIMESTAMP.to_string(), Vec::new(), true)
            }
        };

        DashboardEntry {
            image_locator: format!("{}?ts={}", self.store.public_url(&keys.artifact), timestamp),
            repository: identity.repository.clone(),
            commit_id: identity.commit_id.clone(),
            timestamp,
            changed_manifest_paths,
            degraded,
        }
    }
}

fn sort_entries(entries: &mut [DashboardEntry], ordering: EntryOrdering) {
    match ordering {
        EntryOrdering::CommitId => entries.sort_by(|a, b| b.commit_id.cmp(&a.commit_id)),
        EntryOrdering::Timestamp => entries.sort_by(|a, b| {
            // None sorts below Some, so reversing puts unparseable timestamps last
            sort_key(b)
                .cmp(&sort_key(a))
                .then_with(|| b.commit_id.cmp(&a.commit_id))
        }),
    }
}

fn sort_key(entry: &DashboardEntry) -> Option<DateTime<Utc>> {
    if entry.degraded {
        return None;
    }
    kubevc_core::model::metadata::parse_timestamp(&entry.timestamp)
}
