//! Storage reference resolution
//!
//! Stored media fields hold either an absolute URL or a `bucket/object/path`
//! reference into private storage. The resolver turns a reference into a
//! time-limited signed URL. Resolution is best-effort per reference: a
//! signing failure degrades that one field to `None` and is never propagated.

use crate::config::StorageConfig;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Signing failure for a single reference
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Signing service returned {0}: {1}")]
    Service(u16, String),

    #[error("Invalid signing response: {0}")]
    InvalidResponse(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(String),
}

/// Produces signed URLs for private objects
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Signed URL for `object_path` inside `bucket`, valid for `expires_in_secs`
    async fn sign(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> Result<String, SignError>;
}

/// True for `http://` and `https://` URLs (case-insensitive scheme)
pub fn is_absolute_url(value: &str) -> bool {
    let lower = value.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ============================================================================
// Bucket layout
// ============================================================================

/// Known storage buckets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    known: Vec<String>,
    default_bucket: String,
    video_bucket: String,
}

/// A reference split into bucket and object path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub object_path: String,
}

impl BucketConfig {
    pub fn new(
        known: impl IntoIterator<Item = String>,
        default_bucket: impl Into<String>,
        video_bucket: impl Into<String>,
    ) -> Self {
        Self {
            known: known.into_iter().collect(),
            default_bucket: default_bucket.into(),
            video_bucket: video_bucket.into(),
        }
    }

    pub fn is_known(&self, bucket: &str) -> bool {
        self.known.iter().any(|b| b == bucket)
    }

    pub fn default_bucket(&self) -> &str {
        &self.default_bucket
    }

    pub fn video_bucket(&self) -> &str {
        &self.video_bucket
    }

    /// Split a stored reference into bucket and object path
    ///
    /// Empty segments are dropped. When the first segment is not a known
    /// bucket, the default bucket is used and the whole path (first segment
    /// included) becomes the object path. Returns `None` when nothing is left
    /// to sign.
    pub fn split_reference(&self, reference: &str) -> Option<ObjectRef> {
        let segments: Vec<&str> = reference
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let (first, rest) = segments.split_first()?;

        if self.is_known(first) {
            if rest.is_empty() {
                return None;
            }
            Some(ObjectRef {
                bucket: first.to_string(),
                object_path: rest.join("/"),
            })
        } else {
            Some(ObjectRef {
                bucket: self.default_bucket.clone(),
                object_path: segments.join("/"),
            })
        }
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        StorageConfig::default().buckets()
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves stored media references to usable URLs
#[derive(Clone)]
pub struct StorageResolver {
    signer: Arc<dyn UrlSigner>,
    buckets: BucketConfig,
    expiry_secs: u64,
}

impl StorageResolver {
    pub fn new(signer: Arc<dyn UrlSigner>, buckets: BucketConfig, expiry_secs: u64) -> Self {
        Self {
            signer,
            buckets,
            expiry_secs,
        }
    }

    /// Build a resolver with the signer selected by configuration
    pub fn from_config(config: &StorageConfig) -> crate::Result<Self> {
        Ok(Self::new(
            build_signer(config)?,
            config.buckets(),
            config.signed_url_expiry_secs,
        ))
    }

    pub fn buckets(&self) -> &BucketConfig {
        &self.buckets
    }

    /// Resolve one reference
    ///
    /// `None`/empty input and signing failures both yield `None`.
    /// Absolute URLs pass through unchanged.
    pub async fn resolve(&self, reference: Option<&str>) -> Option<String> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;

        if is_absolute_url(reference) {
            return Some(reference.to_string());
        }

        let object = match self.buckets.split_reference(reference) {
            Some(object) => object,
            None => {
                debug!(reference = %reference, "Reference has no object path");
                return None;
            }
        };

        match self
            .signer
            .sign(&object.bucket, &object.object_path, self.expiry_secs)
            .await
        {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(
                    bucket = %object.bucket,
                    object_path = %object.object_path,
                    error = %e,
                    "Signing failed, field left unresolved"
                );
                None
            }
        }
    }

    /// Resolve a batch concurrently; output order matches input order
    pub async fn resolve_many<S: AsRef<str>>(&self, references: &[Option<S>]) -> Vec<Option<String>> {
        join_all(
            references
                .iter()
                .map(|r| self.resolve(r.as_ref().map(|s| s.as_ref()))),
        )
        .await
    }
}

/// Select the signer: remote HTTP signer when configured, local otherwise
pub fn build_signer(config: &StorageConfig) -> crate::Result<Arc<dyn UrlSigner>> {
    if config.uses_remote_signer() {
        let (Some(base_url), Some(key)) = (&config.base_url, &config.service_key) else {
            return Err(crate::Error::Config("Remote signer settings incomplete".to_string()));
        };
        let signer = HttpUrlSigner::new(base_url, key)
            .map_err(|e| crate::Error::Config(format!("HTTP signer: {}", e)))?;
        Ok(Arc::new(signer))
    } else {
        let signer = LocalUrlSigner::new(&config.public_base_url, &config.signing_secret)
            .map_err(|e| crate::Error::Config(format!("Local signer: {}", e)))?;
        Ok(Arc::new(signer))
    }
}

// ============================================================================
// Local signer
// ============================================================================

/// Signs URLs with a SHA-256 token over secret, object and expiry
///
/// URL shape: `{base}/{bucket}/{object_path}?expires={unix}&token={hex}`
#[derive(Debug, Clone)]
pub struct LocalUrlSigner {
    base: Url,
    secret: String,
}

impl LocalUrlSigner {
    pub fn new(public_base_url: &str, secret: &str) -> Result<Self, SignError> {
        let base = Url::parse(public_base_url)
            .map_err(|e| SignError::InvalidReference(format!("{}: {}", public_base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(SignError::InvalidReference(public_base_url.to_string()));
        }
        Ok(Self {
            base,
            secret: secret.to_string(),
        })
    }

    /// Token for an object and expiry timestamp
    pub fn token(&self, bucket: &str, object_path: &str, expires: i64) -> String {
        let payload = format!("{}:{}/{}:{}", self.secret, bucket, object_path, expires);
        format!("{:x}", Sha256::digest(payload.as_bytes()))
    }

    /// Check a token and its expiry against `now` (unix seconds)
    pub fn verify(&self, bucket: &str, object_path: &str, expires: i64, token: &str, now: i64) -> bool {
        expires >= now && self.token(bucket, object_path, expires) == token
    }

    fn signed_url(&self, bucket: &str, object_path: &str, expires: i64) -> Result<String, SignError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SignError::InvalidReference(self.base.to_string()))?;
            segments.pop_if_empty();
            segments.push(bucket);
            segments.extend(object_path.split('/').filter(|s| !s.is_empty()));
        }
        url.query_pairs_mut()
            .append_pair("expires", &expires.to_string())
            .append_pair("token", &self.token(bucket, object_path, expires));
        Ok(url.to_string())
    }
}

#[async_trait]
impl UrlSigner for LocalUrlSigner {
    async fn sign(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> Result<String, SignError> {
        if object_path.is_empty() {
            return Err(SignError::InvalidReference(bucket.to_string()));
        }
        let expires = chrono::Utc::now().timestamp() + expires_in_secs as i64;
        self.signed_url(bucket, object_path, expires)
    }
}

// ============================================================================
// Remote signer
// ============================================================================

#[derive(Debug, Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: Option<String>,
}

/// Calls the storage service's object signing endpoint
///
/// `POST {base}/storage/v1/object/sign/{bucket}/{object_path}`
pub struct HttpUrlSigner {
    http_client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl HttpUrlSigner {
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, SignError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SignError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn api_root(&self) -> String {
        format!("{}/storage/v1", self.base_url)
    }

    fn sign_endpoint(&self, bucket: &str, object_path: &str) -> Result<Url, SignError> {
        let mut url = Url::parse(&format!("{}/object/sign", self.api_root()))
            .map_err(|e| SignError::InvalidReference(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SignError::InvalidReference(self.base_url.clone()))?
            .push(bucket)
            .extend(object_path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl UrlSigner for HttpUrlSigner {
    async fn sign(
        &self,
        bucket: &str,
        object_path: &str,
        expires_in_secs: u64,
    ) -> Result<String, SignError> {
        let url = self.sign_endpoint(bucket, object_path)?;
        debug!(bucket = %bucket, object_path = %object_path, "Requesting signed URL");

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&SignRequest {
                expires_in: expires_in_secs,
            })
            .send()
            .await
            .map_err(|e| SignError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SignError::Service(status.as_u16(), error_text));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| SignError::InvalidResponse(e.to_string()))?;

        let signed = body
            .signed_url
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SignError::InvalidResponse("missing signedURL".to_string()))?;

        if is_absolute_url(&signed) {
            Ok(signed)
        } else if signed.starts_with('/') {
            Ok(format!("{}{}", self.api_root(), signed))
        } else {
            Ok(format!("{}/{}", self.api_root(), signed))
        }
    }
}
