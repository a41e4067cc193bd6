//! Resilient HTTP client
//!
//! Executes `reqwest` requests with bounded retry and exponential backoff.
//! Retryable: connection/timeout failures, HTTP 429 (honoring `Retry-After`)
//! and HTTP >= 500. Everything else maps straight to a domain error, so
//! callers see `AuthenticationFailure` for a 401 and `NotFound` for a 404
//! instead of raw status codes. Exhausted retries surface as
//! `UpstreamUnavailable` with the attempt count.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use syncbridge_common::resilience::{Backoff, RetryDecision};
use syncbridge_domain::{Result, SyncError};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with built-in retry and timeout support.
#[derive(Clone)]
pub struct ResilientClient {
    client: ReqwestClient,
    max_attempts: u32,
    backoff: Backoff,
}

impl ResilientClient {
    /// Start building a new client.
    pub fn builder() -> ResilientClientBuilder {
        ResilientClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Only success statuses come back as `Ok`; error statuses are mapped by
    /// [`error_for_status`] once retries are settled.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let attempts = self.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                SyncError::Internal(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| {
                let infra: InfraError = err.into();
                SyncError::from(infra)
            })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if status.is_success() {
                        return Ok(response);
                    }

                    match classify_status(status, retry_after(response.headers())) {
                        RetryDecision::Stop => return Err(error_for_status(status, url.as_str())),
                        decision => {
                            last_error = format!("HTTP {status} from {url}");
                            if attempt + 1 < attempts {
                                let delay = match decision {
                                    RetryDecision::RetryAfter(delay) => delay,
                                    _ => self.backoff.delay(attempt),
                                };
                                sleep(delay).await;
                            }
                        }
                    }
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if !should_retry_error(&err) {
                        let infra: InfraError = err.into();
                        return Err(infra.into());
                    }

                    last_error = err.to_string();
                    if attempt + 1 < attempts {
                        sleep(self.backoff.delay(attempt)).await;
                    }
                }
            }
        }

        Err(SyncError::UpstreamUnavailable { attempts, last_error })
    }
}

/// Builder for [`ResilientClient`].
#[derive(Debug)]
pub struct ResilientClientBuilder {
    timeout: Duration,
    max_attempts: u32,
    base_backoff: Duration,
    max_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for ResilientClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl ResilientClientBuilder {
    /// Per-request timeout; a timed-out attempt counts as a retryable
    /// network failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    pub fn max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<ResilientClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            SyncError::from(infra)
        })?;

        Ok(ResilientClient {
            client,
            max_attempts: self.max_attempts.max(1),
            backoff: Backoff::new(self.base_backoff, self.max_backoff),
        })
    }
}

/// Classify a non-success status for retry purposes.
///
/// Pure so the policy can be tested without a transport: 429 retries after
/// the server-provided delay when present, 5xx retries with backoff, every
/// other status stops.
#[must_use]
pub fn classify_status(status: StatusCode, retry_after: Option<Duration>) -> RetryDecision {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return retry_after.map_or(RetryDecision::Retry, RetryDecision::RetryAfter);
    }
    if status.is_server_error() {
        RetryDecision::Retry
    } else {
        RetryDecision::Stop
    }
}

/// Map a terminal non-success status to its domain error.
#[must_use]
pub fn error_for_status(status: StatusCode, url: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED => {
            SyncError::AuthenticationFailure(format!("upstream rejected credentials: {url}"))
        }
        StatusCode::FORBIDDEN => SyncError::Unauthorized(format!("upstream denied access: {url}")),
        StatusCode::NOT_FOUND => SyncError::NotFound(url.to_string()),
        s if s.is_client_error() => {
            SyncError::ValidationFailure(format!("upstream rejected request with {status}: {url}"))
        }
        _ => SyncError::Network(format!("unexpected HTTP {status} from {url}")),
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

async fn sleep(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_defaults() -> ResilientClient {
        ResilientClient::builder()
            .base_backoff(Duration::from_millis(10))
            .max_attempts(3)
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(503)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_report_attempt_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let err = client.send(client.request(Method::GET, server.uri())).await.unwrap_err();

        match err {
            SyncError::UpstreamUnavailable { attempts, last_error } => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("500"));
            }
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let err = client.send(client.request(Method::GET, server.uri())).await.unwrap_err();

        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn unauthorized_status_surfaces_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let err = client.send(client.request(Method::GET, server.uri())).await.unwrap_err();

        assert!(matches!(err, SyncError::AuthenticationFailure(_)));
    }

    #[tokio::test]
    async fn rate_limit_honors_retry_after_header() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                if attempts_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(429).insert_header("Retry-After", "0")
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let client = client_with_defaults();
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn network_failures_retry_then_surface() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{addr}");

        let client = ResilientClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(2)
            .build()
            .expect("http client");

        let err = client.send(client.request(Method::GET, &url)).await.unwrap_err();
        match err {
            SyncError::UpstreamUnavailable { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("expected UpstreamUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn classification_is_status_driven() {
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(2))),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(classify_status(StatusCode::TOO_MANY_REQUESTS, None), RetryDecision::Retry);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY, None), RetryDecision::Retry);
        assert_eq!(classify_status(StatusCode::BAD_REQUEST, None), RetryDecision::Stop);
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED, None), RetryDecision::Stop);
    }

    #[test]
    fn terminal_statuses_map_to_domain_errors() {
        let url = "https://crm.example.com/accounts/1";
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, url),
            SyncError::AuthenticationFailure(_)
        ));
        assert!(matches!(error_for_status(StatusCode::FORBIDDEN, url), SyncError::Unauthorized(_)));
        assert!(matches!(error_for_status(StatusCode::NOT_FOUND, url), SyncError::NotFound(_)));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, url),
            SyncError::ValidationFailure(_)
        ));
    }
}
