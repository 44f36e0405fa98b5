//! Accepted upload media types.

/// Content type of every resized rendition.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Image MIME types accepted for upload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumString, strum::IntoStaticStr, strum::Display,
)]
pub enum ImageMime {
    /// JPEG image
    #[strum(serialize = "image/jpeg")]
    Jpeg,
    /// PNG image
    #[strum(serialize = "image/png")]
    Png,
    /// GIF image
    #[strum(serialize = "image/gif")]
    Gif,
}

impl ImageMime {
    /// Parse a declared content type, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use fresco_core::ImageMime;
    ///
    /// assert_eq!(ImageMime::from_declared("image/PNG"), Some(ImageMime::Png));
    /// assert_eq!(ImageMime::from_declared("text/plain"), None);
    /// ```
    pub fn from_declared(declared: &str) -> Option<Self> {
        declared.trim().to_ascii_lowercase().parse().ok()
    }

    /// Canonical MIME string.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}
