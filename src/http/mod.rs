//! HTTP client module
//!
//! Blocking transport with basic auth, retry, rate limiting, and status
//! classification.
//!
//! # Features
//!
//! - **Retries**: Opt-in retry logic with constant, linear, or exponential backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Status Classification**: 404/409/412/419/429 map to dedicated errors

mod client;
mod rate_limit;

pub use client::{
    classify_status, HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
