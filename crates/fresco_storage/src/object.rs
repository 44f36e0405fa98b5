//! Stored object types.

use bytes::{Bytes, BytesMut};
use fresco_core::ObjectKey;
use fresco_error::StorageError;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Body of an object being read back, delivered chunk by chunk.
pub type ByteStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// Access level of a stored object.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Readable by anyone holding the public URL
    #[display("public-read")]
    PublicRead,
    /// Readable only through the service
    #[default]
    #[display("private")]
    Private,
}

/// An object held by a blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object key
    pub key: ObjectKey,
    /// MIME type served back on read
    pub content_type: String,
    /// Access level
    pub visibility: Visibility,
    /// Object body
    pub bytes: Bytes,
}

/// An object opened for reading.
pub struct BlobObject {
    /// MIME type recorded at write time
    pub content_type: String,
    /// Body length, when the backend knows it up front
    pub content_length: Option<u64>,
    /// Object body
    pub body: ByteStream,
}

impl BlobObject {
    /// Wrap an in-memory body.
    pub fn from_bytes(content_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            content_type: content_type.into(),
            content_length: Some(bytes.len() as u64),
            body: futures::stream::once(async move { Ok(bytes) }).boxed(),
        }
    }

    /// Drain the body into a single buffer.
    pub async fn into_bytes(mut self) -> Result<Bytes, StorageError> {
        let mut buf = BytesMut::with_capacity(self.content_length.unwrap_or(0) as usize);
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }
}

impl std::fmt::Debug for BlobObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobObject")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
