//! Mock implementations for testing.
//!
//! Provides a scripted transport and a client builder wired to it.

use crate::client::MetaBusinessClient;
use crate::config::{MetaConfig, MetaConfigBuilder};
use crate::errors::{MetaError, MetaResult, TransportError};
use crate::resilience::RetryConfig;
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Failure injected instead of a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// The call timed out
    Timeout,
    /// The connection could not be made
    ConnectionFailed(String),
}

impl MockFailure {
    fn to_error(&self) -> MetaError {
        match self {
            Self::Timeout => MetaError::Transport(TransportError::Timeout),
            Self::ConnectionFailed(message) => MetaError::Transport(TransportError::ConnectionFailed {
                message: message.clone(),
            }),
        }
    }
}

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Response body
    pub body: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Delay before response
    pub delay_ms: Option<u64>,
    /// Failure to return instead
    pub failure: Option<MockFailure>,
}

impl MockResponse {
    /// Create a successful JSON response
    pub fn json(data: Value) -> Self {
        Self::status(200, data.to_string())
    }

    /// Create a successful response with raw body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    /// Create a response with any status
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status,
            headers: Vec::new(),
            delay_ms: None,
            failure: None,
        }
    }

    /// Create a Graph error response: `{"error":{"message","type","code"}}`
    pub fn graph_error(status: u16, message: &str, code: i64) -> Self {
        let body = serde_json::json!({
            "error": {
                "message": message,
                "type": "OAuthException",
                "code": code,
                "fbtrace_id": "AbCdEf123",
            }
        });
        Self::status(status, body.to_string())
    }

    /// Fail with a transport error instead of responding
    pub fn failure(failure: MockFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::status(0, "")
        }
    }

    /// Add a response header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add delay to response
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }

    fn header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                name.parse::<HeaderName>(),
                HeaderValue::from_str(value),
            ) {
                map.append(name, value);
            }
        }
        map
    }
}

/// Recorded request for verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request method
    pub method: String,
    /// Encoded request body
    pub body: Option<String>,
    /// Content type of the body
    pub content_type: Option<String>,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Decoded query parameter
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = url::Url::parse(&self.url).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Decoded form field of a form body
    pub fn form_field(&self, name: &str) -> Option<String> {
        let body = self.body.as_deref()?;
        url::form_urlencoded::parse(body.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// JSON body, if the body was JSON
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_str(self.body.as_deref()?).ok()
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock HTTP transport for testing
pub struct MockHttpTransport {
    /// Queue of responses to return
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Recorded requests
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Default response if queue is empty
    default_response: Option<MockResponse>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_response: None,
        }
    }

    /// Add a response to the queue
    pub fn add_response(self, response: MockResponse) -> Self {
        self.push_response(response);
        self
    }

    /// Add multiple responses
    pub fn add_responses(self, responses: impl IntoIterator<Item = MockResponse>) -> Self {
        self.responses.lock().extend(responses);
        self
    }

    /// Add a JSON response
    pub fn add_json_response(self, data: Value) -> Self {
        self.add_response(MockResponse::json(data))
    }

    /// Queue a response on a shared transport
    pub fn push_response(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    /// Set default response when queue is empty
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests that reached the transport
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Clear recorded requests
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    /// Get remaining response count
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn record_request(&self, request: &TransportRequest) {
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let encoded = request.body.encode();

        self.requests.lock().push(RecordedRequest {
            url: request.url.clone(),
            method: request.method.to_string(),
            content_type: encoded.as_ref().map(|(ct, _)| ct.to_string()),
            body: encoded.map(|(_, body)| body),
            headers,
        });
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut queue = self.responses.lock();
        queue.pop_front().or_else(|| self.default_response.clone())
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: TransportRequest) -> MetaResult<TransportResponse> {
        self.record_request(&request);

        let response = self.next_response().ok_or_else(|| MetaError::Unexpected {
            status: None,
            message: "No mock response configured".to_string(),
        })?;

        if let Some(delay) = response.delay_ms {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if let Some(failure) = &response.failure {
            return Err(failure.to_error());
        }

        Ok(TransportResponse::new(
            response.status,
            response.header_map(),
            response.body.clone(),
        ))
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("pending_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

/// Builder for a client wired to a [`MockHttpTransport`]
pub struct MockClientBuilder {
    transport: MockHttpTransport,
    config: MetaConfig,
    token: Option<String>,
}

impl MockClientBuilder {
    /// Create a new builder with a test app configuration
    pub fn new() -> Self {
        Self {
            transport: MockHttpTransport::new(),
            config: test_config().build_unchecked(),
            token: None,
        }
    }

    /// Replace the configuration
    pub fn config(mut self, config: MetaConfig) -> Self {
        self.config = config;
        self
    }

    /// Store an access token before returning the client
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Add a response
    pub fn with_response(mut self, response: MockResponse) -> Self {
        self.transport = self.transport.add_response(response);
        self
    }

    /// Add a JSON response
    pub fn with_json_response(self, data: Value) -> Self {
        self.with_response(MockResponse::json(data))
    }

    /// Response returned once the queue is empty
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.transport = self.transport.with_default_response(response);
        self
    }

    /// Build and return the transport
    pub fn build_transport(self) -> Arc<MockHttpTransport> {
        Arc::new(self.transport)
    }

    /// Build the client and keep a handle on its transport
    pub fn build(self) -> MetaResult<(MetaBusinessClient, Arc<MockHttpTransport>)> {
        let transport = Arc::new(self.transport);
        let client = MetaBusinessClient::builder(self.config)
            .transport(transport.clone())
            .retry(
                RetryConfig::new()
                    .initial_delay(Duration::from_millis(1))
                    .with_jitter(false),
            )
            .build()?;
        if let Some(token) = self.token {
            client.set_access_token(token);
        }
        Ok((client, transport))
    }
}

impl Default for MockClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration builder for a test app
pub fn test_config() -> MetaConfigBuilder {
    MetaConfigBuilder::new()
        .app_id("123456789")
        .app_secret("test-app-secret")
        .redirect_uri("https://example.com/auth/callback")
}
