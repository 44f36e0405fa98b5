//! Rendition rendering for Fresco.
//!
//! A [`Renderer`] turns an uploaded source image into the bytes stored for one
//! entry of the variant plan. The original passes through untouched; every
//! other variant is decoded, shrunk to its target width, and re-encoded as JPEG.
//!
//! Rendering is CPU-bound and synchronous. Async callers are expected to move
//! it onto a blocking thread.
//!
//! # Example
//!
//! ```rust,no_run
//! use fresco_core::{Variant, VariantPlan};
//! use fresco_render::{ImageRenderer, Renderer};
//!
//! # fn example(source: &[u8]) -> Result<(), fresco_error::RenderError> {
//! let renderer = ImageRenderer::default();
//! let thumbnail = renderer.render(source, "image/png", &VariantPlan::spec(Variant::Thumbnail))?;
//! assert!(*thumbnail.width() <= 100);
//! assert_eq!(thumbnail.content_type(), "image/jpeg");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod image_renderer;
mod renderer;

pub use fresco_error::{RenderError, RenderErrorKind};
pub use image_renderer::{DEFAULT_JPEG_QUALITY, ImageRenderer};
pub use renderer::{RenderedImage, Renderer};
