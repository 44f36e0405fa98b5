//! Rendition error types.

/// Kinds of rendition errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum RenderErrorKind {
    /// Source bytes are not a valid image of a supported format
    #[display("Failed to decode source image: {}", _0)]
    Decode(String),
    /// Re-encoding the resized image failed
    #[display("Failed to encode rendition: {}", _0)]
    Encode(String),
    /// The blocking render task panicked or was cancelled
    #[display("Render task failed: {}", _0)]
    Task(String),
}

/// Rendition error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Render Error: {} at line {} in {}", kind, line, file)]
pub struct RenderError {
    /// The kind of error that occurred
    pub kind: RenderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RenderError {
    /// Create a new render error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RenderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &RenderErrorKind {
        &self.kind
    }
}
