//! The asset pipeline.

use crate::{DeletedAsset, UploadOutcome, UploadRequest, VariantFailure};
use bytes::Bytes;
use chrono::Utc;
use fresco_core::{
    AssetId, ImageMime, ObjectKey, UploadRecord, Variant, VariantPlan, VariantSpec,
};
use fresco_error::{
    AssetError, AssetErrorKind, ConfigError, FrescoResult, RenderError, RenderErrorKind,
    StorageError, StorageErrorKind,
};
use fresco_ledger::{MetricsLog, RetentionLedger};
use fresco_render::Renderer;
use fresco_storage::{BlobObject, BlobStore, Visibility};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Largest accepted upload when none is configured (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Bound on a single blob store call when none is configured.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrates uploads, reads and deletes of image assets.
///
/// Every upload stores the original bytes plus one JPEG rendition per entry
/// of the [`VariantPlan`], records an upload metric, and returns public URLs.
/// Deletes remove every object of the asset and leave a tombstone in the
/// retention ledger.
///
/// Cheap to clone; clones share stores and ledgers.
///
/// # Example
///
/// ```rust,no_run
/// use fresco_pipeline::AssetPipelineBuilder;
/// use fresco_render::ImageRenderer;
/// use fresco_storage::MemoryBlobStore;
/// use std::sync::Arc;
///
/// # fn example() -> fresco_error::FrescoResult<()> {
/// let pipeline = AssetPipelineBuilder::default()
///     .store(Arc::new(MemoryBlobStore::new()))
///     .renderer(Arc::new(ImageRenderer::default()))
///     .cdn_base_url("https://cdn.example.com")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, derive_builder::Builder)]
#[builder(build_fn(private, name = "build_internal"))]
pub struct AssetPipeline {
    /// Object storage for originals and renditions
    store: Arc<dyn BlobStore>,
    /// Rendition renderer
    renderer: Arc<dyn Renderer>,
    /// Upload metrics
    #[builder(default)]
    metrics: MetricsLog,
    /// Deletion tombstones
    #[builder(default)]
    retention: RetentionLedger,
    /// Base of the public URLs handed back on upload
    #[builder(setter(into))]
    cdn_base_url: String,
    /// Largest accepted upload in bytes
    #[builder(default = "DEFAULT_MAX_UPLOAD_BYTES")]
    max_upload_bytes: u64,
    /// Bound on each blob store call
    #[builder(default = "DEFAULT_STORE_TIMEOUT")]
    store_timeout: Duration,
}

impl AssetPipelineBuilder {
    /// Build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the store, renderer or CDN base URL
    /// is missing.
    pub fn build(&self) -> Result<AssetPipeline, ConfigError> {
        self.build_internal()
            .map_err(|e| ConfigError::new(format!("Asset pipeline: {}", e)))
    }
}

impl std::fmt::Debug for AssetPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetPipeline")
            .field("store", &self.store.backend_name())
            .field("cdn_base_url", &self.cdn_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("store_timeout", &self.store_timeout)
            .finish_non_exhaustive()
    }
}

impl AssetPipeline {
    /// Upload metrics handle.
    pub fn metrics_log(&self) -> &MetricsLog {
        &self.metrics
    }

    /// Retention ledger handle.
    pub fn retention(&self) -> &RetentionLedger {
        &self.retention
    }

    /// Largest accepted upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Store an uploaded image and all of its renditions.
    ///
    /// Variants are attempted independently: a render or store failure is
    /// reported in [`UploadOutcome::failures`] and never aborts the others.
    /// At most one render runs at a time per upload; stores overlap.
    ///
    /// # Errors
    ///
    /// - `AssetErrorKind::UnsupportedMediaType`, `MissingFile` or `TooLarge`
    ///   if validation fails; nothing is stored
    /// - `AssetErrorKind::Cancelled` if `cancel` fires before the fan-out
    ///   settles; no upload is recorded
    /// - `AssetErrorKind::UploadFailed` if not a single variant was stored;
    ///   no upload is recorded
    #[instrument(
        skip(self, request, cancel),
        fields(
            mime_type = %request.mime_type(),
            size = request.bytes().len(),
            uploaded_by = %request.uploaded_by(),
            asset_id = tracing::field::Empty
        )
    )]
    pub async fn upload(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> FrescoResult<UploadOutcome> {
        let mime = self.validate(&request)?;
        let id = AssetId::generate();
        tracing::Span::current().record("asset_id", tracing::field::display(&id));

        let source = request.bytes().clone();
        let render_slot = Semaphore::new(1);
        let fan_out = join_all(
            VariantPlan::plan()
                .iter()
                .map(|spec| self.store_variant(&id, &source, mime, spec, &render_slot)),
        );

        let results = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Upload cancelled before all variants settled");
                return Err(AssetError::new(AssetErrorKind::Cancelled(format!(
                    "upload of {}",
                    id
                )))
                .into());
            }
            results = fan_out => results,
        };

        let mut urls = BTreeMap::new();
        let mut failures = Vec::new();
        for (spec, result) in VariantPlan::plan().iter().zip(results) {
            match result {
                Ok(key) => {
                    urls.insert(spec.variant, key.public_url(&self.cdn_base_url));
                }
                Err(failure) => failures.push(failure),
            }
        }

        if urls.is_empty() {
            warn!(failed = failures.len(), "No variant stored");
            let reasons: Vec<String> = failures
                .iter()
                .map(|f| format!("{}: {}", f.variant(), f.reason()))
                .collect();
            return Err(AssetError::new(AssetErrorKind::UploadFailed(format!(
                "{} ({})",
                id,
                reasons.join("; ")
            )))
            .into());
        }

        self.metrics.record(UploadRecord::new(
            id,
            source.len() as u64,
            request.uploaded_by().clone(),
            mime.as_str(),
            Utc::now(),
        ));

        if failures.is_empty() {
            info!(variants = urls.len(), "Stored asset");
        } else {
            warn!(
                stored = urls.len(),
                failed = failures.len(),
                "Asset partially stored"
            );
        }

        Ok(UploadOutcome::new(id, urls, failures))
    }

    /// Open a variant of an asset for reading.
    ///
    /// No variant, or `"original"`, reads the original; any other name reads
    /// `{id}/{name}.jpg`.
    ///
    /// # Errors
    ///
    /// - `AssetErrorKind::NotFound` if no object exists under the resolved key
    ///   or the variant name is not a valid key segment
    /// - `AssetErrorKind::Cancelled` if `cancel` fires first
    /// - Storage errors other than a missing key are passed through
    #[instrument(skip(self, cancel), fields(asset_id = %id))]
    pub async fn read(
        &self,
        id: &AssetId,
        variant: Option<&str>,
        cancel: &CancellationToken,
    ) -> FrescoResult<BlobObject> {
        let Some(key) = ObjectKey::for_request(id, variant) else {
            debug!("Variant name is not a valid key segment");
            return Err(AssetError::new(AssetErrorKind::NotFound(format!(
                "{}/{}",
                id,
                variant.unwrap_or_default()
            )))
            .into());
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(AssetError::new(AssetErrorKind::Cancelled(format!("read of {}", key))).into());
            }
            result = self.bounded(&key, self.store.get(&key)) => result,
        };

        match result {
            Ok(object) => {
                debug!(key = %key, content_type = %object.content_type, "Opened object");
                Ok(object)
            }
            Err(e) if matches!(e.kind, StorageErrorKind::NotFound(_)) => {
                debug!(key = %key, "Object not found");
                Err(AssetError::new(AssetErrorKind::NotFound(key.to_string())).into())
            }
            Err(e) => {
                warn!(key = %key, error = %e.kind, "Read failed");
                Err(e.into())
            }
        }
    }

    /// Delete every object of an asset and tombstone it.
    ///
    /// Deleting an asset that does not exist succeeds and still records a
    /// tombstone. Per-key failures other than the store being unreachable
    /// are logged and do not fail the call.
    ///
    /// # Errors
    ///
    /// - `AssetErrorKind::DeleteFailed` if any delete found the store
    ///   unreachable or timed out; no tombstone is recorded
    /// - `AssetErrorKind::Cancelled` if `cancel` fires first
    #[instrument(skip(self, cancel), fields(asset_id = %id))]
    pub async fn delete(
        &self,
        id: AssetId,
        cancel: &CancellationToken,
    ) -> FrescoResult<DeletedAsset> {
        let deletes = join_all(ObjectKey::all(&id).into_iter().map(|key| async move {
            let result = self.bounded(&key, self.store.delete(&key)).await;
            (key, result)
        }));

        let results = tokio::select! {
            _ = cancel.cancelled() => {
                warn!("Delete cancelled before all keys settled");
                return Err(AssetError::new(AssetErrorKind::Cancelled(format!("delete of {}", id))).into());
            }
            results = deletes => results,
        };

        let mut unreachable = Vec::new();
        for (key, result) in results {
            match result {
                Ok(()) => debug!(key = %key, "Deleted object"),
                Err(e) if e.kind.is_connectivity() => {
                    warn!(key = %key, error = %e.kind, "Store unreachable during delete");
                    unreachable.push(format!("{}: {}", key, e.kind));
                }
                Err(e) => warn!(key = %key, error = %e.kind, "Failed to delete object"),
            }
        }

        if !unreachable.is_empty() {
            return Err(AssetError::new(AssetErrorKind::DeleteFailed(unreachable.join("; "))).into());
        }

        self.retention.tombstone(id, Utc::now());
        info!("Deleted asset");
        Ok(DeletedAsset::new(id))
    }

    /// Point-in-time copy of the upload metrics.
    pub fn metrics(&self) -> Vec<UploadRecord> {
        self.metrics.snapshot()
    }

    fn validate(&self, request: &UploadRequest) -> Result<ImageMime, AssetError> {
        let mime = ImageMime::from_declared(request.mime_type()).ok_or_else(|| {
            AssetError::new(AssetErrorKind::UnsupportedMediaType(
                request.mime_type().clone(),
            ))
        })?;

        let size = request.bytes().len() as u64;
        if size == 0 {
            return Err(AssetError::new(AssetErrorKind::MissingFile));
        }
        if size > self.max_upload_bytes {
            return Err(AssetError::new(AssetErrorKind::TooLarge {
                size,
                limit: self.max_upload_bytes,
            }));
        }
        Ok(mime)
    }

    /// Render (if needed) and store one variant, returning its key.
    #[instrument(skip(self, source, mime, render_slot), fields(variant = %spec.variant))]
    async fn store_variant(
        &self,
        id: &AssetId,
        source: &Bytes,
        mime: ImageMime,
        spec: &VariantSpec,
        render_slot: &Semaphore,
    ) -> Result<ObjectKey, VariantFailure> {
        let key = ObjectKey::new(id, spec.variant);

        let (bytes, content_type) = if spec.variant.is_original() {
            (source.clone(), mime.as_str().to_string())
        } else {
            let rendered = self
                .render(source, mime, spec, render_slot)
                .await
                .map_err(|e| failure(spec.variant, &e.kind))?;
            let content_type = rendered.content_type().clone();
            (rendered.into_bytes(), content_type)
        };

        self.bounded(
            &key,
            self.store
                .put(&key, bytes, &content_type, Visibility::PublicRead),
        )
        .await
        .map_err(|e| failure(spec.variant, &e.kind))?;

        debug!(key = %key, "Stored variant");
        Ok(key)
    }

    async fn render(
        &self,
        source: &Bytes,
        mime: ImageMime,
        spec: &VariantSpec,
        render_slot: &Semaphore,
    ) -> Result<fresco_render::RenderedImage, RenderError> {
        let _permit = render_slot
            .acquire()
            .await
            .map_err(|e| RenderError::new(RenderErrorKind::Task(e.to_string())))?;

        let renderer = Arc::clone(&self.renderer);
        let source = source.clone();
        let spec = *spec;
        tokio::task::spawn_blocking(move || renderer.render(&source, mime.as_str(), &spec))
            .await
            .map_err(|e| RenderError::new(RenderErrorKind::Task(e.to_string())))?
    }

    /// Bound a blob store call by the configured timeout.
    async fn bounded<T>(
        &self,
        key: &ObjectKey,
        call: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::new(StorageErrorKind::Timeout(format!(
                "{} after {:?}",
                key, self.store_timeout
            )))),
        }
    }
}

fn failure(variant: Variant, reason: &impl std::fmt::Display) -> VariantFailure {
    warn!(%variant, reason = %reason, "Variant failed");
    VariantFailure::new(variant, reason.to_string())
}
