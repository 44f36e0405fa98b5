//! Asset lifecycle orchestration for Fresco.
//!
//! The [`AssetPipeline`] is the façade the HTTP layer talks to. It owns the
//! write path (validate, allocate an id, render and store every variant,
//! record a metric), the read path (resolve a variant to its object key and
//! stream it back), and the delete path (remove every object, tombstone the
//! asset for later purge).
//!
//! Callers authenticate with an [`Authenticator`] before reaching the
//! pipeline; the pipeline itself only records who uploaded what.
//!
//! # Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use fresco_core::Identity;
//! use fresco_pipeline::{AssetPipelineBuilder, UploadRequest};
//! use fresco_render::ImageRenderer;
//! use fresco_storage::MemoryBlobStore;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(png: Bytes) -> fresco_error::FrescoResult<()> {
//! let pipeline = AssetPipelineBuilder::default()
//!     .store(Arc::new(MemoryBlobStore::new()))
//!     .renderer(Arc::new(ImageRenderer::default()))
//!     .cdn_base_url("https://cdn.example.com")
//!     .build()?;
//!
//! let cancel = CancellationToken::new();
//! let request = UploadRequest::new(png, "image/png", Identity::new("ops@example.com"));
//! let outcome = pipeline.upload(request, &cancel).await?;
//!
//! let thumbnail = pipeline.read(outcome.id(), Some("thumbnail"), &cancel).await?;
//! assert_eq!(thumbnail.content_type, "image/jpeg");
//!
//! pipeline.delete(*outcome.id(), &cancel).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod outcome;
mod pipeline;

pub use auth::{
    Authenticator, AuthenticatorChain, JwtAuthenticator, StaticTokenAuthenticator, bearer_token,
};
pub use outcome::{
    DeletedAsset, UploadOutcome, UploadRequest, UploadRequestBuilder, VariantFailure,
};
pub use pipeline::{
    AssetPipeline, AssetPipelineBuilder, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_STORE_TIMEOUT,
};
