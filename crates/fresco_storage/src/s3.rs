//! S3-compatible blob store implementation.
//!
//! Works against AWS S3 and S3-compatible services (DigitalOcean Spaces,
//! MinIO). Objects are written with a canned ACL derived from their
//! [`Visibility`], so public-read objects are served directly by the bucket's
//! CDN.

use crate::{BlobObject, BlobStore, Visibility};
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::{Client, Config};
use bytes::Bytes;
use fresco_core::ObjectKey;
use fresco_error::{ConfigError, StorageError, StorageErrorKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Connection settings for an S3-compatible bucket.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Config {
    /// Endpoint URL; `None` uses the AWS endpoint of the region
    pub endpoint: Option<String>,
    /// Signing region
    pub region: String,
    /// Bucket holding every object
    pub bucket: String,
    /// Access key id
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Optional prefix prepended to every key
    pub prefix: Option<String>,
    /// Address the bucket in the path rather than the host name (MinIO)
    pub force_path_style: bool,
    /// Attempts per request, including the first
    pub max_attempts: u32,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: DEFAULT_REGION.to_string(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            prefix: None,
            force_path_style: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl S3Config {
    /// Settings for `bucket` signed with the given static credentials.
    pub fn new(
        bucket: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Set the endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Use path-style bucket addressing.
    pub fn with_path_style(mut self, force_path_style: bool) -> Self {
        self.force_path_style = force_path_style;
        self
    }

    /// Set the attempts per request.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .field("force_path_style", &self.force_path_style)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

/// S3 blob store backend.
///
/// Keys map one to one onto object keys in the bucket, under the optional
/// prefix. Reads stream the response body.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3BlobStore {
    /// Create a client for the configured bucket.
    ///
    /// No request is made until the first call.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the bucket or credentials are missing.
    #[instrument(fields(bucket = %config.bucket))]
    pub fn new(config: &S3Config) -> Result<Self, ConfigError> {
        if config.bucket.is_empty() {
            return Err(ConfigError::new("S3 bucket cannot be empty"));
        }
        if config.access_key.is_empty() || config.secret_key.is_empty() {
            return Err(ConfigError::new("S3 access key and secret key are required"));
        }

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "fresco-static",
        );

        let mut builder = Config::builder()
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .region(Region::new(config.region.clone()))
            .force_path_style(config.force_path_style)
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts.max(1)))
            .behavior_version_latest();
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(endpoint = ?config.endpoint, "Created S3 blob store");
        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            prefix: config
                .prefix
                .as_deref()
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    /// Bucket objects are stored in.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key in the bucket for `key`.
    pub fn bucket_key(&self, key: &ObjectKey) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key.to_string(),
        }
    }
}

fn canned_acl(visibility: Visibility) -> ObjectCannedAcl {
    match visibility {
        Visibility::PublicRead => ObjectCannedAcl::PublicRead,
        Visibility::Private => ObjectCannedAcl::Private,
    }
}

/// Map an SDK failure onto a storage error.
///
/// Requests that never reached the service are connectivity failures;
/// everything else is reported as `kind`.
fn sdk_error<E, R>(
    err: SdkError<E, R>,
    key: &str,
    kind: fn(String) -> StorageErrorKind,
) -> StorageError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let detail = format!("{}: {}", key, DisplayErrorContext(&err));
    let kind = match err {
        SdkError::DispatchFailure(_) => StorageErrorKind::Unavailable(detail),
        SdkError::TimeoutError(_) => StorageErrorKind::Timeout(detail),
        _ => kind(detail),
    };
    StorageError::new(kind)
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, bytes), fields(key = %key, size = bytes.len()))]
    async fn put(
        &self,
        key: &ObjectKey,
        bytes: Bytes,
        content_type: &str,
        visibility: Visibility,
    ) -> Result<(), StorageError> {
        let bucket_key = self.bucket_key(key);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&bucket_key)
            .content_type(content_type)
            .acl(canned_acl(visibility))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| sdk_error(e, &bucket_key, StorageErrorKind::Write))?;

        debug!(bucket = %self.bucket, "Stored object");
        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &ObjectKey) -> Result<BlobObject, StorageError> {
        let bucket_key = self.bucket_key(key);
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&bucket_key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let missing = e.as_service_error().is_some_and(|s| s.is_no_such_key())
                    || e.raw_response().is_some_and(|r| r.status().as_u16() == 404);
                if missing {
                    return Err(StorageError::new(StorageErrorKind::NotFound(bucket_key)));
                }
                return Err(sdk_error(e, &bucket_key, StorageErrorKind::Read));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content_length = output.content_length().and_then(|l| u64::try_from(l).ok());

        let body = futures::stream::try_unfold(output.body, move |mut body| {
            let bucket_key = bucket_key.clone();
            async move {
                match body.try_next().await {
                    Ok(Some(chunk)) => Ok(Some((chunk, body))),
                    Ok(None) => Ok(None),
                    Err(e) => Err(StorageError::new(StorageErrorKind::Read(format!(
                        "{}: {}",
                        bucket_key, e
                    )))),
                }
            }
        });

        Ok(BlobObject {
            content_type,
            content_length,
            body: Box::pin(body),
        })
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn delete(&self, key: &ObjectKey) -> Result<(), StorageError> {
        let bucket_key = self.bucket_key(key);
        // S3 reports success for keys that do not exist
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&bucket_key)
            .send()
            .await
            .map_err(|e| sdk_error(e, &bucket_key, StorageErrorKind::Delete))?;

        debug!(bucket = %self.bucket, "Deleted object");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prefix_is_prepended_once() {
        let store = S3BlobStore::new(
            &S3Config::new("assets", "key", "secret").with_prefix("/images/"),
        )
        .unwrap();
        let key = ObjectKey::from_raw("abc/original");
        assert_eq!(store.bucket_key(&key), "images/abc/original");

        let bare = S3BlobStore::new(&S3Config::new("assets", "key", "secret")).unwrap();
        assert_eq!(bare.bucket_key(&key), "abc/original");
        assert_eq!(bare.backend_name(), "s3");
    }

    #[test]
    fn visibility_maps_to_canned_acl() {
        assert_eq!(canned_acl(Visibility::PublicRead), ObjectCannedAcl::PublicRead);
        assert_eq!(canned_acl(Visibility::Private), ObjectCannedAcl::Private);
    }

    #[tokio::test]
    async fn missing_bucket_or_credentials_rejected() {
        assert!(S3BlobStore::new(&S3Config::new("", "key", "secret")).is_err());
        assert!(S3BlobStore::new(&S3Config::new("assets", "", "")).is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let config = S3Config::new("assets", "key", "very-secret");
        assert!(!format!("{:?}", config).contains("very-secret"));
    }
}
