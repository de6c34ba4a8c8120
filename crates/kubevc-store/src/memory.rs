//! In-memory blob store
//!
//! Keeps a log of every successful write so callers can assert on write
//! order and on "nothing was written". Failures can be injected per key
//! suffix to exercise partial-failure paths.

use crate::blob::{validate_key, BlobStore};
use crate::errors::{not_found, Result};
use async_trait::async_trait;
use kubevc_core::errors::{ExError, ExErrorKind};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// One successful `put`, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub key: String,
    pub content_type: String,
    pub len: usize,
}

#[derive(Debug, Default)]
struct Inner {
    objects: BTreeMap<String, StoredObject>,
    writes: Vec<WriteRecord>,
    failing_put_suffixes: Vec<String>,
    failing_list: bool,
}

/// In-process blob store; listing order is lexicographic
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    inner: Mutex<Inner>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a poisoned lock only means a test thread panicked mid-write
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Seed an object without recording a write
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let key = key.into();
        let content_type = crate::blob::content_type_for(&key).to_string();
        self.lock().objects.insert(
            key,
            StoredObject {
                bytes: bytes.into(),
                content_type,
            },
        );
    }

    /// Make every `put` whose key ends with `suffix` fail
    pub fn fail_puts_ending_with(&self, suffix: impl Into<String>) {
        self.lock().failing_put_suffixes.push(suffix.into());
    }

    /// Make every listing call fail
    pub fn fail_listing(&self) {
        self.lock().failing_list = true;
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).map(|o| o.bytes.clone())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.lock().objects.get(key).map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        validate_key(key)?;
        let mut inner = self.lock();
        if inner
            .failing_put_suffixes
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()))
        {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("memory_put")
                .with_entity_id(key)
                .with_message("injected write failure"));
        }
        inner.writes.push(WriteRecord {
            key: key.to_string(),
            content_type: content_type.to_string(),
            len: bytes.len(),
        });
        inner.objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        self.lock()
            .objects
            .get(key)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| not_found("memory_get", key))
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.lock();
        if inner.failing_list {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("memory_list")
                .with_entity_id(prefix)
                .with_message("injected listing failure"));
        }
        Ok(inner
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}
