//! Tests for the HTTP client module

use super::*;
use crate::config::DEFAULT_BASE_URL;
use crate::error::Error;
use crate::pagination::PageFetcher;
use crate::types::BackoffType;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use test_case::test_case;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock server plus the runtime driving it; the client under test blocks
/// on the test thread.
struct TestServer {
    server: MockServer,
    rt: Runtime,
}

impl TestServer {
    fn start() -> Self {
        let rt = Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        Self { server, rt }
    }

    fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    fn verify(&self) {
        self.rt.block_on(self.server.verify());
    }

    fn base_url(&self) -> String {
        format!("{}/v0/", self.server.uri())
    }

    fn config(&self) -> HttpClientConfigBuilder {
        HttpClientConfig::builder()
            .base_url(self.base_url())
            .auth_token("key")
    }

    fn client(&self) -> HttpClient {
        HttpClient::with_config(self.config().build()).unwrap()
    }
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.timeout, Duration::from_secs(3));
    assert_eq!(config.max_retries, 0);
    assert!(config.auth_token.is_none());
    assert!(config.rate_limit.is_none());
    assert!(config.user_agent.starts_with("orchestrate-client/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/v0/")
        .auth_token("secret")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .rate_limit(RateLimiterConfig::per_second(4))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://api.example.com/v0/");
    assert_eq!(config.auth_token.as_deref(), Some("secret"));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(config.max_backoff, Duration::from_secs(30));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(4, 4)));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_config_debug_redacts_token() {
    let config = HttpClientConfig::builder().auth_token("super-secret").build();
    let debug = format!("{config:?}");
    assert!(!debug.contains("super-secret"));
    assert!(debug.contains("[REDACTED]"));
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .header("X-Request-Id", "abc123")
        .header("Accept", "application/json");

    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert_eq!(config.headers.len(), 2);
    assert_eq!(config.timeout, None);
    assert_eq!(config.max_retries, None);
}

// ============================================================================
// URL Tests
// ============================================================================

#[test]
fn test_build_url() {
    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url("http://localhost:9000/v0")
            .build(),
    )
    .unwrap();

    assert_eq!(client.base_url().as_str(), "http://localhost:9000/v0/");
    assert_eq!(
        client.build_url("users?limit=2").unwrap().as_str(),
        "http://localhost:9000/v0/users?limit=2"
    );
    assert_eq!(
        client.build_url("/users/alice/refs?offset=10").unwrap().as_str(),
        "http://localhost:9000/v0/users/alice/refs?offset=10"
    );
    assert_eq!(
        client.build_url("").unwrap().as_str(),
        "http://localhost:9000/v0/"
    );
    assert_eq!(
        client
            .build_url("http://localhost:9000/v0/users?offset=20")
            .unwrap()
            .as_str(),
        "http://localhost:9000/v0/users?offset=20"
    );
}

#[test_case("https://other.example.com/v0/users" ; "other host")]
#[test_case("https://localhost:9000/v0/users" ; "other scheme")]
#[test_case("http://localhost:9001/v0/users" ; "other port")]
fn test_build_url_rejects_foreign_origin(url: &str) {
    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url("http://localhost:9000/v0")
            .auth_token("key")
            .build(),
    )
    .unwrap();

    assert!(matches!(client.build_url(url), Err(Error::Config { .. })));
}

#[test]
fn test_invalid_base_url() {
    let result = HttpClient::with_config(HttpClientConfig::builder().base_url("not a url").build());
    assert!(matches!(result, Err(Error::InvalidUrl(_))));

    let result = HttpClient::with_config(HttpClientConfig::builder().base_url("mailto:x@y").build());
    assert!(matches!(result, Err(Error::Config { .. })));
}

#[test_case(BackoffType::Constant, 3 => Duration::from_millis(100); "constant")]
#[test_case(BackoffType::Linear, 0 => Duration::from_millis(100); "linear first")]
#[test_case(BackoffType::Linear, 2 => Duration::from_millis(300); "linear third")]
#[test_case(BackoffType::Exponential, 0 => Duration::from_millis(100); "exponential first")]
#[test_case(BackoffType::Exponential, 3 => Duration::from_millis(800); "exponential fourth")]
#[test_case(BackoffType::Exponential, 20 => Duration::from_secs(1); "exponential capped")]
fn test_calculate_backoff(backoff_type: BackoffType, attempt: u32) -> Duration {
    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .backoff(backoff_type, Duration::from_millis(100), Duration::from_secs(1))
            .build(),
    )
    .unwrap();
    client.calculate_backoff(attempt)
}

// ============================================================================
// Status Classification Tests
// ============================================================================

#[test]
fn test_classify_not_found_with_api_body() {
    let body = r#"{"message": "The requested items could not be found.", "code": "items_not_found"}"#;
    match classify_status(StatusCode::NOT_FOUND, None, body) {
        Error::NotFound { message } => {
            assert_eq!(message, "The requested items could not be found.");
        }
        other => panic!("Expected NotFound, got {other:?}"),
    }
}

#[test_case(409 => Some(409); "conflict")]
#[test_case(412 => Some(412); "precondition failed")]
#[test_case(419 => Some(429); "orchestrate rate limit")]
#[test_case(429 => Some(429); "too many requests")]
#[test_case(400 => Some(400); "bad request")]
#[test_case(503 => Some(503); "unavailable")]
fn test_classify_status_code(status: u16) -> Option<u16> {
    let status = StatusCode::from_u16(status).unwrap();
    classify_status(status, None, "").status()
}

#[test]
fn test_classify_rate_limited_uses_retry_after() {
    match classify_status(StatusCode::TOO_MANY_REQUESTS, Some(7), "") {
        Error::RateLimited {
            retry_after_seconds,
        } => assert_eq!(retry_after_seconds, 7),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
    match classify_status(StatusCode::TOO_MANY_REQUESTS, None, "") {
        Error::RateLimited {
            retry_after_seconds,
        } => assert_eq!(retry_after_seconds, 60),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

#[test]
fn test_classify_unknown_status_keeps_code() {
    let body = r#"{"message": "Invalid search query.", "code": "search_query_malformed"}"#;
    match classify_status(StatusCode::BAD_REQUEST, None, body) {
        Error::HttpStatus {
            status,
            message,
            code,
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid search query.");
            assert_eq!(code.as_deref(), Some("search_query_malformed"));
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[test]
fn test_classify_non_json_body() {
    match classify_status(StatusCode::BAD_GATEWAY, None, "  upstream gone \n") {
        Error::HttpStatus { message, code, .. } => {
            assert_eq!(message, "upstream gone");
            assert!(code.is_none());
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }

    match classify_status(StatusCode::BAD_GATEWAY, None, "") {
        Error::HttpStatus { message, .. } => assert_eq!(message, "502 Bad Gateway"),
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

// ============================================================================
// Request Tests
// ============================================================================

#[test]
fn test_get_sends_basic_auth_and_user_agent() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .and(header("authorization", "Basic a2V5Og=="))
            .and(header("user-agent", "test-agent/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1),
    );

    let client =
        HttpClient::with_config(server.config().user_agent("test-agent/1.0").build()).unwrap();
    let response = client.get("users").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.verify();
}

#[test]
fn test_get_accepts_json() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    server.client().get("users").unwrap();
    server.verify();
}

#[test]
fn test_request_with_query_and_headers() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .and(query_param("limit", "10"))
            .and(header("X-Request-Id", "abc"))
            .and(header("X-Default", "on"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    let client = HttpClient::with_config(server.config().header("X-Default", "on").build()).unwrap();
    client
        .request(
            Method::GET,
            "users?limit=10",
            RequestConfig::new().header("X-Request-Id", "abc"),
        )
        .unwrap();
    server.verify();
}

#[test]
fn test_head_request() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("HEAD"))
            .and(path("/v0/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    let response = server.client().head("").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.verify();
}

#[test]
fn test_error_status_is_classified() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "The requested collection could not be found.",
                "code": "items_not_found"
            }))),
    );

    let err = server.client().get("missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        "404: Not found: The requested collection could not be found."
    );
}

#[test]
fn test_rate_limited_reads_retry_after() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7")),
    );

    match server.client().get("users") {
        Err(Error::RateLimited {
            retry_after_seconds,
        }) => assert_eq!(retry_after_seconds, 7),
        other => panic!("Expected RateLimited, got {other:?}"),
    }
}

// ============================================================================
// Retry Tests
// ============================================================================

#[test]
fn test_no_retry_by_default() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1),
    );

    let err = server.client().get("users").unwrap_err();
    assert_eq!(err.status(), Some(503));
    server.verify();
}

#[test]
fn test_retries_retryable_status() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2),
    );
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1),
    );

    let client = HttpClient::with_config(
        server
            .config()
            .max_retries(2)
            .backoff(BackoffType::Constant, Duration::from_millis(1), Duration::from_millis(5))
            .build(),
    )
    .unwrap();

    let response = client.get("users").unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    server.verify();
}

#[test]
fn test_retries_exhausted_returns_last_error() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3),
    );

    let client = HttpClient::with_config(
        server
            .config()
            .backoff(BackoffType::Constant, Duration::from_millis(1), Duration::from_millis(5))
            .build(),
    )
    .unwrap();

    let config = RequestConfig {
        max_retries: Some(2),
        ..Default::default()
    };
    let err = client.request(Method::GET, "users", config).unwrap_err();
    assert_eq!(err.status(), Some(500));
    server.verify();
}

#[test]
fn test_client_errors_are_not_retried() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users/bob"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1),
    );

    let client = HttpClient::with_config(server.config().max_retries(3).build()).unwrap();
    assert!(client.get("users/bob").unwrap_err().is_not_found());
    server.verify();
}

#[test]
fn test_timeout() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500))),
    );

    let client = HttpClient::with_config(
        server.config().timeout(Duration::from_millis(50)).build(),
    )
    .unwrap();

    match client.get("slow") {
        Err(Error::Timeout { timeout_ms }) => assert_eq!(timeout_ms, 50),
        other => panic!("Expected Timeout, got {other:?}"),
    }
}

#[test]
fn test_rate_limited_client() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(200))
            .expect(3),
    );

    let client = HttpClient::with_config(
        server.config().rate_limit(RateLimiterConfig::new(100, 3)).build(),
    )
    .unwrap();
    assert!(client.has_rate_limiter());

    for _ in 0..3 {
        client.get("users").unwrap();
    }
    server.verify();
}

// ============================================================================
// Page fetching Tests
// ============================================================================

#[test]
fn test_fetch_page() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 2,
                "next": "/v0/users?limit=2&afterKey=bob",
                "results": [
                    {"path": {"collection": "users", "key": "alice", "ref": "r1"}, "value": {}},
                    {"path": {"collection": "users", "key": "bob", "ref": "r2"}, "value": {}}
                ]
            }))),
    );

    let page = server.client().fetch_page("users?limit=2").unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.results[1].path.key, "bob");
    assert_eq!(page.next_token().as_deref(), Some("users?limit=2&afterKey=bob"));
}

#[test]
fn test_fetch_page_malformed_body() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>")),
    );

    match server.client().fetch_page("users") {
        Err(Error::Decode { path, .. }) => assert_eq!(path, "users"),
        other => panic!("Expected Decode, got {other:?}"),
    }
}

#[test]
fn test_fetch_page_rejects_other_success_status() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .respond_with(ResponseTemplate::new(204)),
    );

    let err = server.client().fetch_page("users").unwrap_err();
    assert_eq!(err.status(), Some(204));
}

#[test]
fn test_fetch_page_keeps_credentials_on_api_origin() {
    let server = TestServer::start();
    let elsewhere = TestServer::start();
    elsewhere.mount(
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0),
    );

    let next = format!("{}users?offset=10", elsewhere.base_url());
    let err = server.client().fetch_page(&next).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
    elsewhere.verify();
}

#[test]
fn test_fetch_page_follows_absolute_link_on_api_origin() {
    let server = TestServer::start();
    server.mount(
        Mock::given(method("GET"))
            .and(path("/v0/users"))
            .and(query_param("offset", "10"))
            .and(header("authorization", "Basic a2V5Og=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 0,
                "results": []
            })))
            .expect(1),
    );

    let next = format!("{}users?offset=10", server.base_url());
    let page = server.client().fetch_page(&next).unwrap();
    assert_eq!(page.count, 0);
    server.verify();
}
