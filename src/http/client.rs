//! HTTP client with retry and rate limiting
//!
//! Blocking transport for the Orchestrate REST API. It handles:
//! - Basic auth with the API key as username
//! - Optional retries with configurable backoff
//! - Optional client-side rate limiting
//! - Classification of error statuses into [`Error`] variants

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Seconds to report when a rate limited response has no usable Retry-After
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Configuration for the HTTP client
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Versioned API root every request path is joined onto
    pub base_url: String,
    /// API key, sent as the basic auth username
    pub auth_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries; 0 disables retrying
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_token: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(30),
            backoff_type: BackoffType::Exponential,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("orchestrate-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("backoff_type", &self.backoff_type)
            .field("rate_limit", &self.rate_limit)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API key
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Blocking HTTP client bound to one API root.
///
/// Cheap to clone; clones share the connection pool and rate limiter.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base: Url,
    config: Arc<HttpClientConfig>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client for the default API root with the given key
    pub fn new(auth_token: impl Into<String>) -> Result<Self> {
        Self::with_config(HttpClientConfig::builder().auth_token(auth_token).build())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let base = parse_base_url(&config.base_url)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            base,
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// API root requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request for a JSON document
    pub fn get(&self, path: &str) -> Result<Response> {
        let config = RequestConfig::new().header(ACCEPT.as_str(), "application/json");
        self.request(Method::GET, path, config)
    }

    /// Make a HEAD request
    pub fn head(&self, path: &str) -> Result<Response> {
        self.request(Method::HEAD, path, RequestConfig::default())
    }

    /// Make a request, returning the response only for 2xx statuses.
    ///
    /// Error statuses are classified with [`classify_status`]. Retryable
    /// failures are retried up to `max_retries` times on the calling thread.
    pub fn request(&self, method: Method, path: &str, config: RequestConfig) -> Result<Response> {
        let url = self.build_url(path)?;
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);

        let mut attempt = 0;
        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait();
            }

            let req = self.prepare(method.clone(), url.clone(), &config, timeout);

            let (err, delay) = match req.send() {
                Ok(response) if response.status().is_success() => {
                    debug!(method = %method, url = %url, status = response.status().as_u16(), "request succeeded");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let retry_after = extract_retry_after(&response);
                    let body = response.text().unwrap_or_default();
                    let err = classify_status(status, retry_after, &body);
                    let delay = match retry_after {
                        Some(secs) => Duration::from_secs(secs).min(self.config.max_backoff),
                        None => self.calculate_backoff(attempt),
                    };
                    (err, delay)
                }
                Err(e) if e.is_timeout() => (
                    Error::Timeout {
                        timeout_ms: timeout.as_millis() as u64,
                    },
                    self.calculate_backoff(attempt),
                ),
                Err(e) => (Error::from(e), self.calculate_backoff(attempt)),
            };

            if attempt >= max_retries || !err.is_retryable() {
                return Err(err);
            }

            warn!(
                "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                url,
                err,
                attempt + 1,
                max_retries + 1,
                delay
            );
            thread::sleep(delay);
            attempt += 1;
        }
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Resolve a request path against the API root.
    ///
    /// Paths are relative to the versioned root, with or without a leading
    /// slash. Absolute `http(s)://` URLs are accepted only on the root's
    /// origin, since every request carries the API key.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let url = Url::parse(path)?;
            if url.origin() != self.base.origin() {
                return Err(Error::config(format!(
                    "refusing to send credentials to '{}', outside {}",
                    url.origin().ascii_serialization(),
                    self.base.origin().ascii_serialization()
                )));
            }
            return Ok(url);
        }
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }

    fn prepare(
        &self,
        method: Method,
        url: Url,
        config: &RequestConfig,
        timeout: Duration,
    ) -> RequestBuilder {
        let mut req = self.client.request(method, url).timeout(timeout);

        if let Some(ref token) = self.config.auth_token {
            req = req.basic_auth(token, None::<&str>);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &config.headers {
            req = req.header(key.as_str(), value.as_str());
        }

        req
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &self.base.as_str())
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Error body the API sends with most failures
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Map an error status and its body to an [`Error`]
pub fn classify_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> Error {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (message, code) = match parsed {
        Some(ApiErrorBody {
            message: Some(message),
            code,
        }) => (message, code),
        Some(ApiErrorBody { code, .. }) => (fallback_message(status, body), code),
        None => (fallback_message(status, body), None),
    };

    match status.as_u16() {
        404 => Error::NotFound { message },
        409 => Error::Conflict { message },
        412 => Error::PreconditionFailed { message },
        419 | 429 => Error::RateLimited {
            retry_after_seconds: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        },
        code_num => Error::HttpStatus {
            status: code_num,
            message,
            code,
        },
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

/// Extract retry-after header value in seconds
fn extract_retry_after(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Parse the API root, making sure relative joins land under it
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(Error::config(format!("base URL '{raw}' cannot be a base")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
