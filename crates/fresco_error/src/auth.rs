//! Authentication error types.

/// Kinds of authentication errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// No bearer token was presented
    #[display("No token provided")]
    MissingCredential,
    /// The presented token was rejected by the verifier
    #[display("Invalid token")]
    InvalidToken,
}

/// Authentication error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of error that occurred
    pub kind: AuthErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuthError {
    /// Create a new auth error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
