//! Blob store adapters for Fresco.
//!
//! This crate provides a uniform put/get/delete interface over a key-addressed
//! object namespace. The asset pipeline only ever talks to the [`BlobStore`]
//! trait; which backend sits behind it is a deployment decision.
//!
//! # Backends
//!
//! - **[`MemoryBlobStore`]**: process-local map, used by tests and the `memory` backend
//! - **[`FileSystemBlobStore`]**: one file per key under a base directory, streamed on read
//! - **[`S3BlobStore`]**: S3-compatible bucket (AWS, DigitalOcean Spaces, MinIO) with canned ACLs
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use fresco_core::ObjectKey;
//! use fresco_storage::{BlobStore, MemoryBlobStore, Visibility};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryBlobStore::new();
//! let key = ObjectKey::from_raw("demo/original");
//!
//! store
//!     .put(&key, Bytes::from_static(b"png bytes"), "image/png", Visibility::PublicRead)
//!     .await?;
//!
//! let object = store.get(&key).await?;
//! assert_eq!(object.content_type, "image/png");
//! assert_eq!(object.into_bytes().await?, Bytes::from_static(b"png bytes"));
//!
//! store.delete(&key).await?;
//! store.delete(&key).await?; // idempotent
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod object;
mod s3;
mod storage;

pub use filesystem::FileSystemBlobStore;
pub use fresco_error::{StorageError, StorageErrorKind};
pub use memory::MemoryBlobStore;
pub use object::{BlobObject, ByteStream, StoredObject, Visibility};
pub use s3::{S3BlobStore, S3Config};
pub use storage::BlobStore;
