//! Blob store trait definition.

use crate::{BlobObject, Visibility};
use bytes::Bytes;
use fresco_core::ObjectKey;
use fresco_error::StorageError;

/// Trait for pluggable blob store backends.
///
/// Implementations hold opaque bytes under string keys. They know nothing
/// about assets or variants; the key layout is owned by the caller.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any existing object.
    ///
    /// # Arguments
    ///
    /// * `key` - Object key
    /// * `bytes` - Object body
    /// * `content_type` - MIME type served back on read
    /// * `visibility` - Access level of the stored object
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError>;

    /// Open the object under `key` for reading.
    ///
    /// # Errors
    ///
    /// Returns `StorageErrorKind::NotFound` if no object exists under the key.
    async fn get(&self, key: &ObjectKey) -> Result<BlobObject, StorageError>;

    /// Delete the object under `key`.
    ///
    /// Deleting a key that does not exist succeeds.
    async fn delete(&self, key: &ObjectKey) -> Result<(), StorageError>;

    /// Short backend name for logs (e.g. "memory", "filesystem").
    fn backend_name(&self) -> &'static str;
}
