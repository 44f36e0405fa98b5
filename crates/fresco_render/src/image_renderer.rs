//! Renderer backed by the `image` crate.

use crate::{RenderedImage, Renderer};
use bytes::Bytes;
use fresco_core::{JPEG_CONTENT_TYPE, VariantSpec};
use fresco_error::{RenderError, RenderErrorKind};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Decodes JPEG, PNG and GIF sources and renders JPEG renditions.
///
/// Images are shrunk with Lanczos3 resampling to the target width, keeping
/// the aspect ratio. Sources already at or below the target width keep their
/// resolution. Alpha is dropped.
#[derive(Debug, Clone, Copy)]
pub struct ImageRenderer {
    jpeg_quality: u8,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageRenderer {
    /// Create a renderer encoding at `jpeg_quality` (clamped to 1..=100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    fn encode_jpeg(&self, image: &DynamicImage) -> Result<Bytes, RenderError> {
        let rgb = image.to_rgb8();
        let mut buf = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.jpeg_quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| RenderError::new(RenderErrorKind::Encode(e.to_string())))?;
        Ok(Bytes::from(buf))
    }
}

/// Height that keeps the aspect ratio at `target_width`, never below one pixel.
fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let scaled = (f64::from(height) * f64::from(target_width) / f64::from(width)).round();
    (scaled as u32).max(1)
}

impl Renderer for ImageRenderer {
    #[tracing::instrument(
        skip(self, source),
        fields(variant = %spec.variant, source_size = source.len())
    )]
    fn render(
        &self,
        source: &[u8],
        declared_type: &str,
        spec: &VariantSpec,
    ) -> Result<RenderedImage, RenderError> {
        let Some(target_width) = spec.target_width else {
            return Ok(RenderedImage::new(
                Bytes::copy_from_slice(source),
                declared_type,
                0,
                0,
            ));
        };

        let decoded = image::load_from_memory(source)
            .map_err(|e| RenderError::new(RenderErrorKind::Decode(e.to_string())))?;

        let (width, height) = (decoded.width(), decoded.height());
        let resized = if width > target_width {
            let new_height = scaled_height(width, height, target_width);
            decoded.resize_exact(target_width, new_height, FilterType::Lanczos3)
        } else {
            decoded
        };

        let bytes = self.encode_jpeg(&resized)?;
        tracing::debug!(
            source_width = width,
            source_height = height,
            width = resized.width(),
            height = resized.height(),
            size = bytes.len(),
            "Rendered variant"
        );

        Ok(RenderedImage::new(
            bytes,
            JPEG_CONTENT_TYPE,
            resized.width(),
            resized.height(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_height_keeps_aspect_ratio() {
        assert_eq!(scaled_height(2000, 1000, 100), 50);
        assert_eq!(scaled_height(1000, 333, 300), 100);
    }

    #[test]
    fn scaled_height_never_reaches_zero() {
        assert_eq!(scaled_height(5000, 1, 100), 1);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(ImageRenderer::new(0).jpeg_quality(), 1);
        assert_eq!(ImageRenderer::new(200).jpeg_quality(), 100);
    }
}
