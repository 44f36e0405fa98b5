//! Renderer trait and output type.

use bytes::Bytes;
use derive_getters::Getters;
use fresco_core::VariantSpec;
use fresco_error::RenderError;

/// One rendered variant, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RenderedImage {
    /// Encoded image bytes
    bytes: Bytes,
    /// MIME type of `bytes`
    content_type: String,
    /// Pixel width, zero when the source was passed through undecoded
    width: u32,
    /// Pixel height, zero when the source was passed through undecoded
    height: u32,
}

impl RenderedImage {
    /// Create a rendered image.
    pub fn new(bytes: Bytes, content_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
            width,
            height,
        }
    }

    /// Take the encoded bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Produces the stored bytes for one variant of a source image.
///
/// Failures are scoped to the variant being rendered; callers render each
/// variant independently.
pub trait Renderer: Send + Sync {
    /// Render `source` according to `spec`.
    ///
    /// # Arguments
    ///
    /// * `source` - Uploaded image bytes
    /// * `declared_type` - MIME type the uploader declared for `source`
    /// * `spec` - Variant to produce
    ///
    /// # Errors
    ///
    /// Returns `RenderErrorKind::Decode` if the source cannot be decoded and
    /// `RenderErrorKind::Encode` if the rendition cannot be encoded.
    fn render(
        &self,
        source: &[u8],
        declared_type: &str,
        spec: &VariantSpec,
    ) -> Result<RenderedImage, RenderError>;
}
