//! Tracing utilities for Graph requests.

use crate::errors::MetaError;
use crate::resilience::UsageReport;
use tracing::{span, Level, Span};

/// Create a request span with common attributes
pub fn create_request_span(trace: &RequestTrace) -> Span {
    span!(
        Level::INFO,
        "meta_request",
        method = %trace.method,
        endpoint = %trace.endpoint,
        request_id = %trace.request_id,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        error.code = tracing::field::Empty,
        error.message = tracing::field::Empty,
        meta.cache_hit = tracing::field::Empty,
        meta.usage_pct = tracing::field::Empty,
    )
}

/// Record success on a span
pub fn record_success(span: &Span) {
    span.record("otel.status_code", "OK");
}

/// Record error on a span
pub fn record_error(span: &Span, error: &MetaError) {
    span.record("otel.status_code", "ERROR");
    span.record("error.code", error.error_code());
    span.record("error.message", tracing::field::display(error));
}

/// Record whether the response came from the cache
pub fn record_cache_hit(span: &Span, hit: bool) {
    span.record("meta.cache_hit", hit);
}

/// Record the highest usage percentage Meta reported
pub fn record_usage(span: &Span, usage: &UsageReport) {
    span.record("meta.usage_pct", usage.max_pct());
}

/// Request-scoped trace info
#[derive(Debug, Clone)]
pub struct RequestTrace {
    /// Start time
    pub start_time: std::time::Instant,
    /// Request ID
    pub request_id: String,
    /// HTTP method
    pub method: String,
    /// Graph path, used as the metrics key
    pub endpoint: String,
}

impl RequestTrace {
    /// Create a new request trace
    pub fn new(method: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            start_time: std::time::Instant::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            method: method.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Get elapsed milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}

/// Normalize a Graph path into a metrics key.
///
/// Numeric IDs and `act_` IDs are replaced so per-object calls share a key.
pub fn endpoint_key(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let segments: Vec<&str> = path
        .trim_matches('/')
        .split('/')
        .map(|segment| {
            if segment.starts_with("act_") {
                "{account}"
            } else if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()) {
                "{id}"
            } else {
                segment
            }
        })
        .collect();
    format!("/{}", segments.join("/"))
}
