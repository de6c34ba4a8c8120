//! Advisory delivery diagnostics
//!
//! Shared across requests but never read by pipeline logic. Concurrent
//! writers may race; the last one wins.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Last commit id seen on `/webhook` and a delivery counter
#[derive(Debug, Default)]
pub struct LastSeenCommit {
    commit_id: Mutex<Option<String>>,
    deliveries: AtomicU64,
}

/// Point-in-time copy for `/healthz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastSeenSnapshot {
    pub commit_id: Option<String>,
    pub deliveries: u64,
}

impl LastSeenCommit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, commit_id: Option<&str>) {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.commit_id.lock().unwrap_or_else(|p| p.into_inner());
        *slot = commit_id.map(str::to_string);
    }

    pub fn snapshot(&self) -> LastSeenSnapshot {
        LastSeenSnapshot {
            commit_id: self
                .commit_id
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .clone(),
            deliveries: self.deliveries.load(Ordering::Relaxed),
        }
    }
}
