use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The manifest-like paths touched by one push
///
/// Paths are de-duplicated and kept in sorted order, so two deliveries that
/// touch the same files produce equal change sets regardless of commit order.
/// An empty set is a valid outcome: nothing to snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestChangeSet {
    paths: BTreeSet<String>,
}

impl ManifestChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.paths.iter().cloned().collect()
    }

    pub(crate) fn insert(&mut self, path: String) {
        self.paths.insert(path);
    }
}

impl<S: Into<String>> FromIterator<S> for ManifestChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_sorted() {
        let set: ManifestChangeSet = ["b.yaml", "a.yml", "b.yaml"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_vec(), vec!["a.yml", "b.yaml"]);
    }

    #[test]
    fn test_serializes_as_array() {
        let set: ManifestChangeSet = ["deploy.yaml"].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["deploy.yaml"]"#);
    }
}
