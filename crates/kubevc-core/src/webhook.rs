//! Inbound push-webhook payload
//!
//! Only the fields change detection needs are modelled. Every field is
//! optional and tolerant of the wrong JSON type: a value that does not fit
//! degrades to its default instead of failing the whole payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WebhookPayload {
    /// Commit the ref points to after the push
    #[serde(default, deserialize_with = "lenient")]
    pub after: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub head_commit: Option<HeadCommit>,
    #[serde(default, deserialize_with = "lenient")]
    pub repository: Option<RepositoryRef>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub commits: Vec<CommitEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HeadCommit {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepositoryRef {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitEntry {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub added: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub modified: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub removed: Vec<String>,
}

impl CommitEntry {
    /// added, then modified, then removed
    pub fn touched_paths(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .chain(self.removed.iter())
            .map(String::as_str)
    }
}

impl WebhookPayload {
    /// Parse a raw request body
    ///
    /// Bodies that are not a JSON object yield an empty payload.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => Self::from_value(value),
            Ok(_) => {
                tracing::warn!("webhook body is not a JSON object; treating as empty payload");
                Self::default()
            }
            Err(err) => {
                tracing::warn!(error = %err, "webhook body is not valid JSON; treating as empty payload");
                Self::default()
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the well-typed elements of an array; anything else becomes empty
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let payload = WebhookPayload::from_value(json!({
            "after": "abc123",
            "head_commit": {"id": "abc123"},
            "repository": {"name": "infra", "full_name": "acme/infra"},
            "commits": [{"added": ["deploy.yaml"], "modified": [], "removed": []}]
        }));

        assert_eq!(payload.after.as_deref(), Some("abc123"));
        assert_eq!(payload.repository.unwrap().name.as_deref(), Some("infra"));
        assert_eq!(payload.commits.len(), 1);
    }

    #[test]
    fn test_wrong_types_degrade_to_defaults() {
        let payload = WebhookPayload::from_value(json!({
            "after": 42,
            "repository": "infra",
            "commits": [{"added": ["a.yaml", 7, null]}, "garbage"]
        }));

        assert_eq!(payload.after, None);
        assert_eq!(payload.repository, None);
        assert_eq!(payload.commits.len(), 1);
        assert_eq!(payload.commits[0].added, vec!["a.yaml"]);
    }

    #[test]
    fn test_null_fields() {
        let payload = WebhookPayload::from_value(json!({"after": null, "head_commit": null}));
        assert_eq!(payload, WebhookPayload::default());
    }

    #[test]
    fn test_non_json_body() {
        assert_eq!(WebhookPayload::from_slice(b"not json"), WebhookPayload::default());
        assert_eq!(WebhookPayload::from_slice(b"[1,2]"), WebhookPayload::default());
        assert_eq!(WebhookPayload::from_slice(b""), WebhookPayload::default());
    }

    #[test]
    fn test_touched_paths_order() {
        let entry = CommitEntry {
            added: vec!["a".into()],
            modified: vec!["m".into()],
            removed: vec!["r".into()],
        };
        assert_eq!(entry.touched_paths().collect::<Vec<_>>(), vec!["a", "m", "r"]);
    }
}
