//! Filesystem-based blob store implementation.
//!
//! This backend mirrors the object namespace onto a directory tree, one file
//! per key, with a small JSON sidecar holding the content type and visibility.

use crate::{BlobObject, BlobStore, Visibility};
use bytes::Bytes;
use fresco_core::ObjectKey;
use fresco_error::{StorageError, StorageErrorKind};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio_util::io::ReaderStream;

const SIDECAR_SUFFIX: &str = ".meta.json";

/// Filesystem blob store backend.
///
/// Stores objects in a structure that follows the key layout:
/// `{base_path}/{key}` plus `{base_path}/{key}.meta.json`
///
/// # Example Structure
///
/// ```text
/// /var/fresco/objects/
/// └── 0f8e6a52-3c1b-4a8e-9a57-0e3a3f1c2b4d/
///     ├── original
///     ├── original.meta.json
///     ├── thumbnail.jpg
///     ├── thumbnail.jpg.meta.json
///     └── ...
/// ```
///
/// # Features
///
/// - **Streaming reads**: bodies are streamed from disk, never buffered whole
/// - **Atomic writes**: temp file + rename, so readers never see partial objects
/// - **Idempotent deletes**: removing a missing key succeeds
pub struct FileSystemBlobStore {
    base_path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    content_type: String,
    visibility: Visibility,
}

impl FileSystemBlobStore {
    /// Create a new filesystem blob store.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Root directory for stored objects
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or accessed.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::Unavailable(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem blob store");
        Ok(Self { base_path })
    }

    /// Root directory of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a key to its object path, rejecting keys that would escape the base.
    fn object_path(&self, key: &ObjectKey) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key.as_str());
        let escapes = key.as_str().contains('\\')
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if key.as_str().is_empty() || escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(
                key.to_string(),
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(SIDECAR_SUFFIX);
        PathBuf::from(name)
    }

    /// Fail with `Unavailable` when the base directory has gone away
    /// (unmounted volume, removed data directory).
    async fn ensure_available(&self) -> Result<(), StorageError> {
        match tokio::fs::metadata(&self.base_path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::new(StorageErrorKind::Unavailable(format!(
                "{} is not a directory",
                self.base_path.display()
            )))),
            Err(e) => Err(StorageError::new(StorageErrorKind::Unavailable(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))),
        }
    }

    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })
    }

    async fn remove_if_present(path: &Path) -> Result<bool, StorageError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::new(StorageErrorKind::Delete(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for FileSystemBlobStore {
    #[tracing::instrument(skip(self, bytes), fields(key = %key, size = bytes.len(), %visibility))]
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        self.ensure_available().await?;
        let path = self.object_path(key)?;

        // Create parent directories
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::Write(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let sidecar = Sidecar {
            content_type: content_type.to_string(),
            visibility,
        };
        let sidecar_json = serde_json::to_vec(&sidecar).map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!("sidecar for {}: {}", key, e)))
        })?;

        // Sidecar first: an object file is only ever visible with its metadata
        Self::write_atomic(&Self::sidecar_path(&path), &sidecar_json).await?;
        Self::write_atomic(&path, &bytes).await?;

        tracing::info!(
            key = %key,
            path = %path.display(),
            size = bytes.len(),
            content_type,
            "Stored object file"
        );
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ObjectKey) -> Result<BlobObject, StorageError> {
        let path = self.object_path(key)?;

        let file = tokio::fs::File::open(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(key.to_string()))
            } else {
                StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        let content_length = file.metadata().await.ok().map(|m| m.len());

        let sidecar_bytes = tokio::fs::read(Self::sidecar_path(&path))
            .await
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Read(format!(
                    "sidecar for {}: {}",
                    key, e
                )))
            })?;
        let sidecar: Sidecar = serde_json::from_slice(&sidecar_bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Read(format!("sidecar for {}: {}", key, e)))
        })?;

        tracing::debug!(
            key = %key,
            path = %path.display(),
            content_length,
            "Opened object file"
        );

        let display_path = path.display().to_string();
        let body = ReaderStream::new(file)
            .map_err(move |e| {
                StorageError::new(StorageErrorKind::Read(format!("{}: {}", display_path, e)))
            });

        Ok(BlobObject {
            content_type: sidecar.content_type,
            content_length,
            body: Box::pin(body),
        })
    }

    #[tracing::instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &ObjectKey) -> Result<(), StorageError> {
        self.ensure_available().await?;
        let path = self.object_path(key)?;

        let removed = Self::remove_if_present(&path).await?;
        Self::remove_if_present(&Self::sidecar_path(&path)).await?;

        // Drop the asset directory once its last object is gone; a non-empty
        // directory simply stays.
        if let Some(parent) = path.parent()
            && parent != self.base_path.as_path()
        {
            let _ = tokio::fs::remove_dir(parent).await;
        }

        tracing::info!(key = %key, removed, "Deleted object file");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
