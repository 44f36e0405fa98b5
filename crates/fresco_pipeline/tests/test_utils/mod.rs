//! Test utilities for pipeline tests.
//!
//! This module provides a scriptable blob store and image fixtures.

pub mod mock_store;

#[allow(unused_imports)]
pub use mock_store::MockBlobStore;

use bytes::Bytes;
use fresco_pipeline::{AssetPipeline, AssetPipelineBuilder};
use fresco_render::ImageRenderer;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// CDN base used by every test pipeline.
#[allow(dead_code)]
pub const CDN: &str = "https://cdn.test";

/// Encode a gradient JPEG of the given size.
#[allow(dead_code)]
pub fn jpeg_fixture(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .expect("Failed to encode JPEG fixture");
    Bytes::from(buf)
}

/// Encode a translucent PNG of the given size.
#[allow(dead_code)]
pub fn png_fixture(width: u32, height: u32) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, 100]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png)
        .expect("Failed to encode PNG fixture");
    Bytes::from(cursor.into_inner())
}

/// Pipeline over `store` with the image renderer.
#[allow(dead_code)]
pub fn pipeline_with(store: Arc<MockBlobStore>) -> AssetPipeline {
    AssetPipelineBuilder::default()
        .store(store)
        .renderer(Arc::new(ImageRenderer::default()))
        .cdn_base_url(format!("{}/", CDN))
        .build()
        .expect("Failed to build test pipeline")
}
