//! Client configuration
//!
//! Defaults for the hosted service and loading of [`HttpClientConfig`] from
//! the environment.

use crate::error::{Error, Result};
use crate::http::HttpClientConfig;
use std::time::Duration;

/// Host of the hosted Orchestrate API
pub const DEFAULT_API_HOST: &str = "api.orchestrate.io";

/// Path prefix of the API version this client speaks
pub const API_VERSION_PREFIX: &str = "/v0/";

/// Versioned API root used when no host is configured
pub const DEFAULT_BASE_URL: &str = "https://api.orchestrate.io/v0/";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "ORCHESTRATE_API_KEY";

/// Environment variable overriding the API host
pub const ENV_API_HOST: &str = "ORCHESTRATE_API_HOST";

/// Versioned API root for a host.
///
/// A bare host name gets `https://`; a value that already carries a scheme
/// (for a local or proxied endpoint) keeps it.
pub fn base_url_for_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}{API_VERSION_PREFIX}")
    } else {
        format!("https://{host}{API_VERSION_PREFIX}")
    }
}

impl HttpClientConfig {
    /// Build a config from `ORCHESTRATE_API_KEY` and `ORCHESTRATE_API_HOST`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::missing_field(ENV_API_KEY))?;

        let mut builder = Self::builder().auth_token(api_key);
        if let Some(host) = lookup(ENV_API_HOST).filter(|host| !host.trim().is_empty()) {
            builder = builder.base_url(base_url_for_host(&host));
        }
        Ok(builder.build())
    }
}
