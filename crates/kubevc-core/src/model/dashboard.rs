use serde::Serialize;

/// Timestamp shown for snapshots whose metadata could not be read
pub const DEGRADED_TIMESTAMP: &str = "N/A";

/// One reconstructed `(repository, commit)` snapshot for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardEntry {
    pub repository: String,
    pub commit_id: String,
    pub timestamp: String,
    pub changed_manifest_paths: Vec<String>,
    pub image_locator: String,
    /// True when metadata was missing or unparseable
    pub degraded: bool,
}
