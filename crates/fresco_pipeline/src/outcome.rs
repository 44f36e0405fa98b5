//! Request and result types of pipeline operations.

use bytes::Bytes;
use derive_getters::Getters;
use fresco_core::{AssetId, Identity, Variant};
use serde::Serialize;
use std::collections::BTreeMap;

/// An image handed over for storage.
#[derive(Debug, Clone, derive_builder::Builder, Getters)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct UploadRequest {
    /// Uploaded file contents
    bytes: Bytes,
    /// MIME type declared by the uploader
    mime_type: String,
    /// Authenticated uploader
    uploaded_by: Identity,
}

impl UploadRequestBuilder {
    /// Build the request.
    ///
    /// # Errors
    ///
    /// Returns error if a field is missing.
    pub fn build(&self) -> Result<UploadRequest, String> {
        self.build_internal().map_err(|e| e.to_string())
    }
}

impl UploadRequest {
    /// Create a request.
    pub fn new(bytes: Bytes, mime_type: impl Into<String>, uploaded_by: Identity) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            uploaded_by,
        }
    }
}

/// A variant that could not be rendered or stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct VariantFailure {
    /// The variant that failed
    variant: Variant,
    /// Why it failed
    reason: String,
}

impl VariantFailure {
    /// Create a failure entry.
    pub fn new(variant: Variant, reason: impl Into<String>) -> Self {
        Self {
            variant,
            reason: reason.into(),
        }
    }
}

/// Result of an upload.
///
/// `urls` holds only variants that were confirmed stored. A non-empty
/// `failures` list marks the asset as partially stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct UploadOutcome {
    /// Identifier allocated for the asset
    id: AssetId,
    /// Public URL of every stored variant
    urls: BTreeMap<Variant, String>,
    /// Variants that failed, in plan order
    #[serde(rename = "failed", skip_serializing_if = "Vec::is_empty")]
    failures: Vec<VariantFailure>,
}

impl UploadOutcome {
    /// Create an outcome.
    pub fn new(
        id: AssetId,
        urls: BTreeMap<Variant, String>,
        failures: Vec<VariantFailure>,
    ) -> Self {
        Self { id, urls, failures }
    }

    /// Whether every planned variant was stored.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct DeletedAsset {
    /// Identifier of the deleted asset
    id: AssetId,
}

impl DeletedAsset {
    /// Create a delete result.
    pub fn new(id: AssetId) -> Self {
        Self { id }
    }
}
