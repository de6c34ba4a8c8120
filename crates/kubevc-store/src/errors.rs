//! Error helpers for kubevc-store
//!
//! Wraps kubevc-core ExError with storage-specific constructors

use kubevc_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Object missing from the store
pub fn not_found(op: &str, key: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message("object not found")
}

/// Key rejected before touching the backend
pub fn invalid_key(key: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op("validate_key")
        .with_entity_id(key.to_string())
        .with_message(reason.to_string())
}

/// Local I/O failure; `NotFound` is preserved as its own kind
pub fn io_error(op: &str, key: &str, err: std::io::Error) -> ExError {
    if err.kind() == std::io::ErrorKind::NotFound {
        return not_found(op, key);
    }
    ExError::new(ExErrorKind::Io)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message(err.to_string())
}

/// Transport failure talking to a remote backend
pub fn network_error(op: &str, key: &str, err: reqwest::Error) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::Persistence
    };
    ExError::new(kind)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message(err.to_string())
}

/// Remote backend answered with a non-success status
pub fn backend_status(op: &str, key: &str, status: reqwest::StatusCode, body: &str) -> ExError {
    let snippet: String = body.chars().take(256).collect();
    ExError::new(ExErrorKind::Persistence)
        .with_op(op.to_string())
        .with_entity_id(key.to_string())
        .with_message(format!("backend returned {}: {}", status, snippet))
}

/// Blocking storage task panicked or was cancelled
pub fn task_failed(op: &str, err: tokio::task::JoinError) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op.to_string())
        .with_message(err.to_string())
}
