//! Bearer-token authentication.

use fresco_core::Identity;
use fresco_error::{AuthError, AuthErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Resolves a bearer token to the identity it was issued to.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Verify `token`.
    ///
    /// # Errors
    ///
    /// Returns `AuthErrorKind::InvalidToken` if the token is not recognized.
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Authenticator over a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenAuthenticator {
    /// Create an authenticator accepting the given token → identity pairs.
    pub fn new<I, T, N>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (T, N)>,
        T: Into<String>,
        N: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|(token, name)| (token.into(), Identity::new(name)))
                .collect(),
        }
    }

    /// Number of accepted tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether no token is accepted.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticTokenAuthenticator {
    #[instrument(skip_all)]
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match self.tokens.get(token) {
            Some(identity) => {
                debug!(identity = %identity, "Token verified");
                Ok(identity.clone())
            }
            None => Err(AuthError::new(AuthErrorKind::InvalidToken)),
        }
    }
}

/// Claims read from a verified JWT.
#[derive(Debug, Deserialize)]
struct Claims {
    email: String,
}

/// Authenticator for HS256-signed JWTs.
///
/// The token's `email` claim becomes the caller's identity. An `exp` claim,
/// when present, must lie in the future; tokens without one never expire.
#[derive(Clone)]
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    /// Create an authenticator verifying signatures with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl Authenticator for JwtAuthenticator {
    #[instrument(skip_all)]
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        match jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation) {
            Ok(data) => {
                let identity = Identity::new(data.claims.email);
                debug!(identity = %identity, "JWT verified");
                Ok(identity)
            }
            Err(e) => {
                debug!(reason = ?e.kind(), "JWT rejected");
                Err(AuthError::new(AuthErrorKind::InvalidToken))
            }
        }
    }
}

/// Tries several authenticators in order; the first to accept wins.
#[derive(Clone, Default)]
pub struct AuthenticatorChain {
    links: Vec<Arc<dyn Authenticator>>,
}

impl AuthenticatorChain {
    /// Create an empty chain, which rejects every token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an authenticator to the chain.
    pub fn with(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.links.push(authenticator);
        self
    }

    /// Number of authenticators in the chain.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the chain rejects every token.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl std::fmt::Debug for AuthenticatorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorChain")
            .field("links", &self.links.len())
            .finish()
    }
}

#[async_trait::async_trait]
impl Authenticator for AuthenticatorChain {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        for link in &self.links {
            if let Ok(identity) = link.verify(token).await {
                return Ok(identity);
            }
        }
        Err(AuthError::new(AuthErrorKind::InvalidToken))
    }
}

/// Extract the token from an `Authorization` header value.
///
/// # Errors
///
/// Returns `AuthErrorKind::MissingCredential` when the header is absent, is
/// not a `Bearer` credential, or carries an empty token.
///
/// # Examples
///
/// ```
/// use fresco_pipeline::bearer_token;
///
/// assert_eq!(bearer_token(Some("Bearer abc123")).unwrap(), "abc123");
/// assert!(bearer_token(None).is_err());
/// assert!(bearer_token(Some("Bearer ")).is_err());
/// ```
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let missing = || AuthError::new(AuthErrorKind::MissingCredential);
    let header = header.ok_or_else(missing)?.trim();
    let (scheme, token) = header.split_once(' ').ok_or_else(missing)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(missing());
    }
    Ok(token)
}
