//! Configuration management for the Fresco server.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use fresco_error::{ConfigError, FrescoError, FrescoResult};
use fresco_storage::S3Config;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../fresco.toml");

/// Prefix of environment variable overrides (`FRESCO__SECTION__KEY`).
const ENV_PREFIX: &str = "FRESCO";

/// HTTP listener and logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct ServerSection {
    /// Address to listen on
    bind: SocketAddr,
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    log_level: String,
    /// Emit JSON-formatted logs
    #[serde(default)]
    json_logs: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which blob store backend holds objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local, lost on restart
    #[display("memory")]
    Memory,
    /// One file per object under `storage.path`
    #[display("filesystem")]
    Filesystem,
    /// S3-compatible bucket described by `storage.s3`
    #[display("s3")]
    S3,
}

/// Blob store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct StorageSection {
    /// Backend to use
    backend: StorageBackend,
    /// Base directory of the filesystem backend
    path: PathBuf,
    /// Base of public object URLs
    cdn_base_url: String,
    /// Bucket settings of the S3 backend
    #[serde(default)]
    s3: S3Config,
}

/// Upload handling settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct UploadSection {
    /// Largest accepted upload in bytes
    max_bytes: u64,
    /// JPEG quality of renditions (1-100)
    jpeg_quality: u8,
    /// Bound on each blob store call, in seconds
    store_timeout_secs: u64,
}

impl UploadSection {
    /// Store timeout as a duration.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

/// Tombstone retention settings.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct RetentionSection {
    /// How long tombstones are kept, in seconds
    window_secs: u64,
    /// How often expired tombstones are purged, in seconds
    purge_interval_secs: u64,
}

impl RetentionSection {
    /// Retention window as a duration.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Purge tick as a duration.
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }
}

/// Bearer token verification.
///
/// Tokens are checked against the static table first, then as HS256 JWTs
/// when a secret is configured.
#[derive(Clone, Default, Serialize, Deserialize, Getters)]
pub struct AuthSection {
    /// Accepted bearer tokens mapped to the identity they authenticate
    #[serde(default)]
    tokens: HashMap<String, String>,
    /// Shared secret of HS256 JWTs; the `email` claim names the caller
    #[serde(default)]
    jwt_secret: Option<String>,
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSection")
            .field("tokens", &self.tokens.len())
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Complete Fresco configuration.
///
/// # Example TOML
///
/// ```toml
/// [server]
/// bind = "0.0.0.0:8080"
///
/// [storage]
/// backend = "filesystem"
/// path = "/var/lib/fresco"
/// cdn_base_url = "https://cdn.example.com"
///
/// [auth]
/// jwt_secret = "change-me"
///
/// [auth.tokens]
/// "s3cr3t" = "ops@example.com"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct FrescoConfig {
    /// Listener and logging
    server: ServerSection,
    /// Blob store
    storage: StorageSection,
    /// Upload handling
    upload: UploadSection,
    /// Tombstone retention
    retention: RetentionSection,
    /// Authentication
    #[serde(default)]
    auth: AuthSection,
}

impl FrescoConfig {
    /// Load configuration with precedence: environment > explicit file >
    /// `./fresco.toml` > bundled defaults.
    ///
    /// `./fresco.toml` is optional and silently skipped if absent. A file
    /// passed explicitly must exist.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a source cannot be read or the merged
    /// result does not deserialize.
    #[instrument]
    pub fn load(path: Option<&Path>) -> FrescoResult<Self> {
        debug!("Loading configuration: env > explicit file > current dir > bundled defaults");

        let mut builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::with_name("fresco").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        Self::deserialize_from(builder)
    }

    /// Parse configuration from a TOML string layered over the bundled
    /// defaults, ignoring files and environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the result does not deserialize.
    pub fn from_toml_str(toml: &str) -> FrescoResult<Self> {
        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(toml, FileFormat::Toml));
        Self::deserialize_from(builder)
    }

    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bundled file is malformed.
    pub fn bundled() -> FrescoResult<Self> {
        Self::from_toml_str("")
    }

    /// Replace the listen address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.server.bind = bind;
        self
    }

    /// Replace the log level.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.server.log_level = level.into();
        self
    }

    fn deserialize_from(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> FrescoResult<Self> {
        builder
            .build()
            .map_err(|e| {
                FrescoError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                FrescoError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_parse() {
        let config = FrescoConfig::bundled().unwrap();
        assert_eq!(config.server().bind().port(), 8080);
        assert_eq!(*config.storage().backend(), StorageBackend::Memory);
        assert_eq!(*config.upload().max_bytes(), 10 * 1024 * 1024);
        assert_eq!(*config.upload().jpeg_quality(), 85);
        assert_eq!(config.upload().store_timeout(), Duration::from_secs(30));
        assert_eq!(config.retention().window(), Duration::from_secs(7 * 24 * 3600));
        assert_eq!(config.retention().purge_interval(), Duration::from_secs(3600));
        assert!(config.auth().tokens().is_empty());
        assert!(config.auth().jwt_secret().is_none());
        assert_eq!(config.storage().s3().region, "us-east-1");
        assert!(config.storage().s3().bucket.is_empty());
    }

    #[test]
    fn s3_backend_and_jwt_secret_parse() {
        let config = FrescoConfig::from_toml_str(
            r#"
            [storage]
            backend = "s3"
            cdn_base_url = "https://assets.nyc3.cdn.digitaloceanspaces.com"

            [storage.s3]
            endpoint = "https://nyc3.digitaloceanspaces.com"
            region = "nyc3"
            bucket = "assets"
            access_key = "AKIA"
            secret_key = "shh"

            [auth]
            jwt_secret = "jwt-shh"
            "#,
        )
        .unwrap();

        assert_eq!(*config.storage().backend(), StorageBackend::S3);
        let s3 = config.storage().s3();
        assert_eq!(s3.endpoint.as_deref(), Some("https://nyc3.digitaloceanspaces.com"));
        assert_eq!(s3.bucket, "assets");
        assert_eq!(s3.max_attempts, 3);
        assert_eq!(config.auth().jwt_secret().as_deref(), Some("jwt-shh"));
        assert!(!format!("{:?}", config.auth()).contains("jwt-shh"));
    }

    #[test]
    fn overrides_layer_over_defaults() {
        let config = FrescoConfig::from_toml_str(
            r#"
            [storage]
            backend = "filesystem"
            path = "/tmp/fresco"

            [auth.tokens]
            "abc" = "ops@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(*config.storage().backend(), StorageBackend::Filesystem);
        assert_eq!(config.storage().path(), Path::new("/tmp/fresco"));
        // Untouched keys keep their defaults
        assert_eq!(config.storage().cdn_base_url(), "https://cdn.example.com");
        assert_eq!(
            config.auth().tokens().get("abc").map(String::as_str),
            Some("ops@example.com")
        );
    }

    #[test]
    fn unknown_backend_is_config_error() {
        let err = FrescoConfig::from_toml_str("[storage]\nbackend = \"ftp\"").unwrap_err();
        assert!(matches!(
            err.kind(),
            fresco_error::FrescoErrorKind::Config(_)
        ));
    }
}
