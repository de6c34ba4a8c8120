//! Correlation types for request tracking
//!
//! Every inbound webhook delivery gets a `RequestContext` so that log lines,
//! error values and sentinel storage keys can be tied back to one request.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new RequestId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization or tests)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through one webhook delivery
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    /// Upstream delivery identifier (e.g. `X-GitHub-Delivery`), if the sender supplied one
    pub delivery_id: Option<String>,
}

impl RequestContext {
    /// Create a new context with a fresh RequestId
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            delivery_id: None,
        }
    }

    /// Create a context with an existing RequestId
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            delivery_id: None,
        }
    }

    /// Attach the upstream delivery id; blank values are ignored
    pub fn with_delivery_id(mut self, delivery_id: impl Into<String>) -> Self {
        let delivery_id = delivery_id.into();
        if !delivery_id.trim().is_empty() {
            self.delivery_id = Some(delivery_id);
        }
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();

        assert_ne!(id1, id2);
        assert!(!id1.as_str().is_empty());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId::new();
        assert_eq!(format!("{}", id), id.as_str());
    }

    #[test]
    fn test_request_context_delivery_id() {
        let ctx = RequestContext::new().with_delivery_id("72d3162e-cc78-11e3-81ab-4c9367dc0958");
        assert_eq!(
            ctx.delivery_id.as_deref(),
            Some("72d3162e-cc78-11e3-81ab-4c9367dc0958")
        );
    }

    #[test]
    fn test_blank_delivery_id_ignored() {
        let ctx = RequestContext::new().with_delivery_id("   ");
        assert!(ctx.delivery_id.is_none());
    }

    #[test]
    fn test_serialization() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
