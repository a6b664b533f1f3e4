//! Error types for the Orchestrate client
//!
//! This module defines the error hierarchy for the entire client.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! `Error` is `Clone` so that a result iterator can keep its terminal error
//! and hand it back from every later accessor call. Sources that are not
//! `Clone` themselves are held behind an `Arc`.

use std::sync::Arc;
use thiserror::Error;

use crate::records::ResultKind;

/// The main error type for the Orchestrate client
#[derive(Error, Debug, Clone)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[source] Arc<reqwest::Error>),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // HTTP Status Errors
    // ============================================================================
    #[error("404: Not found: {message}")]
    NotFound { message: String },

    #[error("409: Conflict: {message}")]
    Conflict { message: String },

    #[error("412: Precondition failed: {message}")]
    PreconditionFailed { message: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("Failed to decode page from '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("Failed to decode value of '{key}': {source}")]
    Payload {
        key: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    // ============================================================================
    // Iterator Errors
    // ============================================================================
    #[error("Wrong iterator kind: expected {expected}, iterating {actual}")]
    WrongIteratorKind {
        expected: ResultKind,
        actual: ResultKind,
    },

    #[error("No current entry; call advance() first")]
    NoCurrentEntry,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a page decode error
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a payload decode error
    pub fn payload(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Payload {
            key: key.into(),
            source: Arc::new(source),
        }
    }

    /// Create an error for a status the client does not classify further
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// The HTTP status behind this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Conflict { .. } => Some(409),
            Error::PreconditionFailed { .. } => Some(412),
            Error::RateLimited { .. } => Some(429),
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check for a 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check for a rate limit rejection
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// Check if the transport may retry this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        419 | 429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for the Orchestrate client
pub type Result<T> = std::result::Result<T, Error>;
