//! Scriptable blob store for exercising pipeline failure paths.

use bytes::Bytes;
use fresco_core::ObjectKey;
use fresco_error::{StorageError, StorageErrorKind};
use fresco_storage::{BlobObject, BlobStore, MemoryBlobStore, Visibility};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Memory-backed store that can fail or stall selected calls and counts
/// every call it receives.
#[derive(Debug, Default)]
pub struct MockBlobStore {
    inner: MemoryBlobStore,
    failing_put_suffixes: Vec<String>,
    unreachable_delete_suffixes: Vec<String>,
    failing_delete_suffixes: Vec<String>,
    put_delay: Option<Duration>,
    puts: AtomicUsize,
    gets: AtomicUsize,
    deletes: AtomicUsize,
}

#[allow(dead_code)]
impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail puts whose key ends with `suffix` with a write error.
    pub fn fail_puts_ending_with(mut self, suffix: &str) -> Self {
        self.failing_put_suffixes.push(suffix.to_string());
        self
    }

    /// Report the store unreachable for deletes whose key ends with `suffix`.
    pub fn unreachable_deletes_ending_with(mut self, suffix: &str) -> Self {
        self.unreachable_delete_suffixes.push(suffix.to_string());
        self
    }

    /// Fail deletes whose key ends with `suffix` with a non-connectivity error.
    pub fn fail_deletes_ending_with(mut self, suffix: &str) -> Self {
        self.failing_delete_suffixes.push(suffix.to_string());
        self
    }

    /// Sleep before every put.
    pub fn with_put_delay(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    pub fn inner(&self) -> &MemoryBlobStore {
        &self.inner
    }

    pub fn put_calls(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.put_calls() + self.get_calls() + self.delete_calls()
    }

    fn matches(suffixes: &[String], key: &ObjectKey) -> bool {
        suffixes.iter().any(|s| key.as_str().ends_with(s.as_str()))
    }
}

#[async_trait::async_trait]
impl BlobStore for MockBlobStore {
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if Self::matches(&self.failing_put_suffixes, key) {
            return Err(StorageError::new(StorageErrorKind::Write(format!(
                "injected failure for {}",
                key
            ))));
        }
        self.inner.put(key, bytes, content_type, visibility).await
    }

    async fn get(&self, key: &ObjectKey) -> Result<BlobObject, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if Self::matches(&self.unreachable_delete_suffixes, key) {
            return Err(StorageError::new(StorageErrorKind::Unavailable(
                "connection refused".to_string(),
            )));
        }
        if Self::matches(&self.failing_delete_suffixes, key) {
            return Err(StorageError::new(StorageErrorKind::Delete(format!(
                "injected failure for {}",
                key
            ))));
        }
        self.inner.delete(key).await
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
