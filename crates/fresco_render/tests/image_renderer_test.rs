//! Tests for the image-crate renderer.

use fresco_core::{Variant, VariantPlan};
use fresco_render::{ImageRenderer, RenderErrorKind, Renderer};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn jpeg_source(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut buf = Vec::new();
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 90))
        .unwrap();
    buf
}

fn png_source(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 128]));
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, ImageFormat::Png).unwrap();
    cursor.into_inner()
}

#[test]
fn test_large_jpeg_renders_every_width() {
    let source = jpeg_source(2000, 1000);
    let renderer = ImageRenderer::default();

    for spec in VariantPlan::renditions() {
        let rendered = renderer.render(&source, "image/jpeg", spec).unwrap();
        let target = spec.target_width.unwrap();

        assert_eq!(*rendered.width(), target, "width of {}", spec.variant);
        assert_eq!(*rendered.height(), target / 2, "height of {}", spec.variant);
        assert_eq!(rendered.content_type(), "image/jpeg");

        let decoded = image::load_from_memory(rendered.bytes()).unwrap();
        assert_eq!(decoded.width(), target);
    }
}

#[test]
fn test_small_png_is_never_upscaled() {
    let source = png_source(50, 40);
    let renderer = ImageRenderer::default();

    for spec in VariantPlan::renditions() {
        let rendered = renderer.render(&source, "image/png", spec).unwrap();
        assert_eq!(*rendered.width(), 50);
        assert_eq!(*rendered.height(), 40);
        // Re-encoded as JPEG regardless of source format
        assert_eq!(rendered.content_type(), "image/jpeg");
        let format = image::guess_format(rendered.bytes()).unwrap();
        assert_eq!(format, ImageFormat::Jpeg);
    }
}

#[test]
fn test_original_passes_through_unchanged() {
    let source = png_source(20, 20);
    let renderer = ImageRenderer::default();

    let rendered = renderer
        .render(&source, "image/png", &VariantPlan::spec(Variant::Original))
        .unwrap();

    assert_eq!(rendered.bytes().as_ref(), source.as_slice());
    assert_eq!(rendered.content_type(), "image/png");
}

#[test]
fn test_undecodable_source_is_decode_error() {
    let renderer = ImageRenderer::default();
    let err = renderer
        .render(
            b"definitely not an image",
            "image/jpeg",
            &VariantPlan::spec(Variant::Small),
        )
        .unwrap_err();

    assert!(matches!(err.kind, RenderErrorKind::Decode(_)));
}

#[test]
fn test_undecodable_original_still_passes_through() {
    let renderer = ImageRenderer::default();
    let rendered = renderer
        .render(b"opaque", "image/gif", &VariantPlan::spec(Variant::Original))
        .unwrap();
    assert_eq!(rendered.into_bytes().as_ref(), b"opaque");
}
