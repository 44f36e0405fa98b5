//! In-memory blob store.

use crate::{BlobObject, BlobStore, StoredObject, Visibility};
use bytes::Bytes;
use fresco_core::ObjectKey;
use fresco_error::{StorageError, StorageErrorKind};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Process-local blob store.
///
/// Contents live for the lifetime of the process and are shared between
/// clones. Reads hand back a single-chunk stream.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<BTreeMap<ObjectKey, StoredObject>>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, in sorted order.
    pub async fn keys(&self) -> Vec<ObjectKey> {
        self.objects.read().await.keys().cloned().collect()
    }

    /// Copy of the object under `key`, if any.
    pub async fn object(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    /// Number of objects held.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether the store holds no objects.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    #[instrument(skip(self, bytes), fields(key = %key, size = bytes.len()))]
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let object = StoredObject {
            key: key.clone(),
            content_type: content_type.to_string(),
            visibility,
            bytes,
        };
        self.objects.write().await.insert(key.clone(), object);
        debug!("Stored object in memory");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ObjectKey) -> Result<BlobObject, StorageError> {
        let objects = self.objects.read().await;
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(key.to_string())))?;
        Ok(BlobObject::from_bytes(
            object.content_type.clone(),
            object.bytes.clone(),
        ))
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &ObjectKey) -> Result<(), StorageError> {
        let removed = self.objects.write().await.remove(key).is_some();
        debug!(removed, "Deleted object from memory");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
