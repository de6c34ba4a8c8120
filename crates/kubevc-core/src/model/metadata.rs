//! Persisted snapshot metadata (`metadata.json`)

use crate::model::change_set::ManifestChangeSet;
use crate::model::keys::SnapshotIdentity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const CORE_FIELDS: [&str; 4] = ["commit_hash", "repo_name", "changed_yaml", "timestamp"];

/// Metadata written next to each artifact
///
/// Wire format: `{commit_hash, repo_name, changed_yaml, timestamp}` plus any
/// extra fields the renderer reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default)]
    pub commit_hash: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub changed_yaml: Vec<String>,
    /// ISO-8601 UTC instant with a `Z` suffix
    pub timestamp: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SnapshotMetadata {
    pub fn new(
        identity: &SnapshotIdentity,
        changes: &ManifestChangeSet,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            commit_hash: identity.commit_id.clone(),
            repo_name: identity.repository.clone(),
            changed_yaml: changes.to_vec(),
            timestamp: format_timestamp(recorded_at),
            extra: BTreeMap::new(),
        }
    }

    /// Merge renderer-reported fields; the core fields always win
    pub fn with_renderer_fields(mut self, fields: Map<String, Value>) -> Self {
        for (key, value) in fields {
            if !CORE_FIELDS.contains(&key.as_str()) {
                self.extra.insert(key, value);
            }
        }
        self
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }

    pub fn from_json_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}

/// `2024-05-01T10:00:00.000000Z`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample() -> SnapshotMetadata {
        let changes: ManifestChangeSet = ["deploy.yaml"].into_iter().collect();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        SnapshotMetadata::new(&SnapshotIdentity::new("infra", "abc123"), &changes, at)
    }

    #[test]
    fn test_wire_format() {
        let value: Value = serde_json::from_slice(&sample().to_json_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "commit_hash": "abc123",
                "repo_name": "infra",
                "changed_yaml": ["deploy.yaml"],
                "timestamp": "2024-05-01T10:00:00.000000Z"
            })
        );
    }

    #[test]
    fn test_renderer_fields_cannot_override_core() {
        let mut fields = Map::new();
        fields.insert("commit_hash".into(), json!("forged"));
        fields.insert("pods".into(), json!(12));

        let meta = sample().with_renderer_fields(fields);
        assert_eq!(meta.commit_hash, "abc123");
        assert_eq!(meta.extra.get("pods"), Some(&json!(12)));
    }

    #[test]
    fn test_timestamp_parses_back() {
        let meta = sample();
        assert_eq!(
            meta.parsed_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_missing_timestamp_is_rejected() {
        assert!(SnapshotMetadata::from_json_bytes(br#"{"commit_hash": "c1"}"#).is_err());
    }
}
