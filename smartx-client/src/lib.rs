//! Dual-path public profile client
//!
//! Fetches a [`PublicProfile`] from the primary aggregation endpoint and,
//! when the endpoint cannot give an answer at all, falls back to running
//! the shared [`ProfileAggregator`] directly against the data platform.
//!
//! Failure handling:
//! - Network failure, non-JSON body: eligible for fallback
//! - JSON error body with an error status: final, returned as-is
//! - Fallback failure: annotated and final, never retried
//!
//! Nothing is cached; every call hits the endpoint again.

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::Deserialize;
use smartx_common::config::ClientConfig;
use smartx_common::model::PublicProfile;
use smartx_common::ProfileAggregator;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

const USER_AGENT: &str = concat!("smartx-client/", env!("CARGO_PKG_VERSION"));

/// Profile fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// Endpoint answered with something other than JSON (e.g. an HTML shell)
    #[error("Non-JSON response (status {status}, content type '{content_type}')")]
    NonJsonResponse { status: u16, content_type: String },

    /// Endpoint answered with a JSON error and a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// No response at all
    #[error("Network error: {0}")]
    Network(String),

    /// JSON content type but the body is not a profile
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// Aggregation over the data platform failed after the primary path did
    #[error("fallback failed: {0}")]
    Fallback(smartx_common::Error),

    /// Base URL cannot carry the profile path
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl FetchError {
    /// Primary path gave no usable answer, so the fallback may run
    pub fn is_fallback_eligible(&self) -> bool {
        matches!(
            self,
            FetchError::NonJsonResponse { .. } | FetchError::Network(_) | FetchError::MalformedBody(_)
        )
    }

    /// Artist does not exist, by the endpoint's answer or the fallback's
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::Http { status, .. } => *status == 404,
            FetchError::Fallback(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Only transport failures are transient
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

/// Caller-side retry bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first failed attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 2 }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
        }
    }

    /// Whether to try again after `failures` failed attempts ending in `err`
    pub fn should_retry(&self, failures: u32, err: &FetchError) -> bool {
        failures <= self.max_retries && err.is_retryable()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Public profile client with optional data-platform fallback
pub struct ProfileClient {
    http_client: reqwest::Client,
    api_base: Url,
    fallback: Option<ProfileAggregator>,
}

impl ProfileClient {
    /// Create a client for the endpoint rooted at `api_base_url`
    pub fn new(api_base_url: &str, fallback: Option<ProfileAggregator>) -> Result<Self, FetchError> {
        let api_base = Url::parse(api_base_url)
            .map_err(|e| FetchError::InvalidBaseUrl(format!("{}: {}", api_base_url, e)))?;
        if api_base.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl(api_base_url.to_string()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_base,
            fallback,
        })
    }

    pub fn from_config(config: &ClientConfig, fallback: Option<ProfileAggregator>) -> Result<Self, FetchError> {
        Self::new(&config.api_base_url, fallback)
    }

    /// `{base}/api/public/artist/{identifier}`, identifier percent-encoded
    pub fn profile_url(&self, identifier: &str) -> Result<Url, FetchError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidBaseUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["api", "public", "artist", identifier]);
        Ok(url)
    }

    /// One attempt: primary endpoint, then fallback on an eligible failure
    pub async fn fetch_profile(&self, identifier: &str) -> Result<PublicProfile, FetchError> {
        let err = match self.fetch_primary(identifier).await {
            Ok(profile) => return Ok(profile),
            Err(e) => e,
        };

        let aggregator = match (&self.fallback, err.is_fallback_eligible()) {
            (Some(aggregator), true) => aggregator,
            _ => return Err(err),
        };

        warn!(
            identifier = %identifier,
            error = %err,
            "Primary profile endpoint unusable, aggregating directly"
        );

        aggregator
            .aggregate(identifier)
            .await
            .map_err(FetchError::Fallback)
    }

    /// [`fetch_profile`](Self::fetch_profile) repeated while the policy allows
    pub async fn fetch_profile_with_retry(
        &self,
        identifier: &str,
        policy: &RetryPolicy,
    ) -> Result<PublicProfile, FetchError> {
        let mut failures = 0;
        loop {
            match self.fetch_profile(identifier).await {
                Ok(profile) => return Ok(profile),
                Err(e) => {
                    failures += 1;
                    if !policy.should_retry(failures, &e) {
                        return Err(e);
                    }
                    info!(
                        identifier = %identifier,
                        attempt = failures + 1,
                        error = %e,
                        "Retrying profile fetch"
                    );
                }
            }
        }
    }

    /// Primary endpoint only
    pub async fn fetch_primary(&self, identifier: &str) -> Result<PublicProfile, FetchError> {
        let url = self.profile_url(identifier)?;
        debug!(url = %url, "Requesting public profile");

        let response = self
            .http_client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !content_type.to_ascii_lowercase().contains("application/json") {
            return Err(FetchError::NonJsonResponse {
                status: status.as_u16(),
                content_type,
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(text);
            return Err(FetchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<PublicProfile>()
            .await
            .map_err(|e| FetchError::MalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_eligibility() {
        let non_json = FetchError::NonJsonResponse {
            status: 200,
            content_type: "text/html".to_string(),
        };
        assert!(non_json.is_fallback_eligible());
        assert!(FetchError::Network("refused".to_string()).is_fallback_eligible());

        let http = FetchError::Http {
            status: 404,
            message: "not_found".to_string(),
        };
        assert!(!http.is_fallback_eligible());
        assert!(http.is_not_found());
    }

    #[test]
    fn test_retry_policy_never_retries_final_errors() {
        let policy = RetryPolicy::default();

        let non_json = FetchError::NonJsonResponse {
            status: 200,
            content_type: "text/html".to_string(),
        };
        assert!(!policy.should_retry(1, &non_json));

        let fallback = FetchError::Fallback(smartx_common::Error::Internal("down".to_string()));
        assert!(!policy.should_retry(1, &fallback));

        let http = FetchError::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!policy.should_retry(1, &http));
    }

    #[test]
    fn test_retry_policy_bounds_network_retries() {
        let policy = RetryPolicy { max_retries: 2 };
        let err = FetchError::Network("refused".to_string());

        assert!(policy.should_retry(1, &err));
        assert!(policy.should_retry(2, &err));
        assert!(!policy.should_retry(3, &err));

        assert!(!RetryPolicy { max_retries: 0 }.should_retry(1, &err));
    }

    #[test]
    fn test_fallback_message_is_annotated() {
        let err = FetchError::Fallback(smartx_common::Error::NotFound("artist 'x'".to_string()));
        assert!(err.to_string().starts_with("fallback failed:"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_profile_url_encodes_identifier() {
        let client = ProfileClient::new("http://127.0.0.1:5780/", None).unwrap();
        assert_eq!(
            client.profile_url("ana lua").unwrap().as_str(),
            "http://127.0.0.1:5780/api/public/artist/ana%20lua"
        );

        let client = ProfileClient::new("https://smartx.test/site", None).unwrap();
        assert_eq!(
            client.profile_url("ana").unwrap().as_str(),
            "https://smartx.test/site/api/public/artist/ana"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            ProfileClient::new("not a url", None),
            Err(FetchError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ProfileClient::new("mailto:ops@smartx.test", None),
            Err(FetchError::InvalidBaseUrl(_))
        ));
    }
}
