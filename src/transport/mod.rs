//! HTTP transport layer for the Meta Business client.
//!
//! Provides low-level HTTP communication with the Graph API and the
//! classification of raw responses into [`MetaError`].

use crate::errors::{MetaError, MetaResult, TransportError};
use crate::observability::redact_url;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_TYPE, RETRY_AFTER};
use http::{HeaderMap, HeaderValue, Method};
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// HTTP transport trait for making API requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a request and return the raw response, whatever its status
    async fn send(&self, request: TransportRequest) -> MetaResult<TransportResponse>;
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// `application/json`
    Json(Value),
    /// `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

impl RequestBody {
    /// Encoded body and its content type
    pub fn encode(&self) -> Option<(&'static str, String)> {
        match self {
            RequestBody::None => None,
            RequestBody::Json(value) => Some(("application/json", value.to_string())),
            RequestBody::Form(fields) => Some((
                "application/x-www-form-urlencoded",
                fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&"),
            )),
        }
    }
}

/// Transport request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including query string
    pub url: String,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// Create a new request with no body
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            headers,
            body: RequestBody::None,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self::new(Method::GET, url, headers)
    }

    /// Create a new form POST request
    pub fn form(url: impl Into<String>, headers: HeaderMap, fields: Vec<(String, String)>) -> Self {
        Self {
            body: RequestBody::Form(fields),
            ..Self::new(Method::POST, url, headers)
        }
    }

    /// Attach a JSON body
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Raw transport response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status
    pub status: u16,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `Retry-After` in seconds, if sent
    pub fn retry_after(&self) -> Option<Duration> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Classify the response: JSON for 2xx, a typed error otherwise
    pub fn into_json(self) -> MetaResult<Value> {
        let text = self.text();

        if !self.is_success() {
            let error = MetaError::from_response(self.status, &text, self.retry_after());
            warn!(status = self.status, error_code = error.error_code(), error = %error, "Graph API error");
            return Err(error);
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| MetaError::Unexpected {
            status: Some(self.status),
            message: format!("Failed to parse response: {}. Body: {}", e, truncate(&text, 512)),
        })
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a new transport with the given timeout
    pub fn new(timeout: Duration) -> MetaResult<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| MetaError::Transport(TransportError::Http(e.to_string())))?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Create a new transport with a pre-built client
    pub fn with_client(client: Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %redact_url(&request.url)))]
    async fn send(&self, request: TransportRequest) -> MetaResult<TransportResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut headers = request.headers;
        let mut req_builder = self
            .client
            .request(request.method, &request.url)
            .timeout(timeout);

        if let Some((content_type, body)) = request.body.encode() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| MetaError::Transport(TransportError::from(e)))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| MetaError::Transport(TransportError::from(e)))?;

        debug!(status, bytes = body.len(), "Received response");

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
