use serde::Serialize;

/// Placeholder repository name for payloads without `repository.name`
pub const UNKNOWN_REPOSITORY: &str = "unknown-repo";

/// One webhook delivery, reduced to what the pipeline needs
///
/// Request-scoped; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitEvent {
    pub repository: String,
    /// `None` when neither `after` nor `head_commit.id` carried a value
    pub commit_id: Option<String>,
    /// Every path from every commit's added/modified/removed lists, in payload order
    pub changed_paths: Vec<String>,
}

impl CommitEvent {
    pub fn new(
        repository: impl Into<String>,
        commit_id: Option<String>,
        changed_paths: Vec<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            commit_id,
            changed_paths,
        }
    }
}
