//! Query parameters and per-request options.

use http::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Ordered query parameters for a Graph call.
///
/// Keys are kept sorted so the same parameters always encode to the same
/// query string, which doubles as the cache signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    /// Create empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Insert a parameter when a value is present
    pub fn insert_opt<V: Into<Value>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Number of parameters, including null ones
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encoded `(key, value)` pairs in key order.
    ///
    /// Null values are dropped and arrays are comma-joined.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| encode_value(value).map(|v| (key.clone(), v)))
            .collect()
    }

    /// Percent-encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        self.to_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(encode_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Options for a single Graph call
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method; `GET` by default
    pub method: Method,
    /// Query parameters
    pub params: Params,
    /// JSON body for POST requests
    pub data: Option<Value>,
    /// Bypass the response cache for this call
    pub skip_cache: bool,
    /// Override the configured timeout
    pub timeout: Option<Duration>,
    /// Abort the call when this token is cancelled
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    /// A GET request
    pub fn get() -> Self {
        Self::default()
    }

    /// A POST request with a JSON body
    pub fn post(data: Value) -> Self {
        Self {
            method: Method::POST,
            data: Some(data),
            ..Default::default()
        }
    }

    /// A DELETE request
    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Default::default()
        }
    }

    /// Replace the query parameters
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Add one query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key, value);
        self
    }

    /// Bypass the response cache
    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }

    /// Set a timeout for this call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Abort the call when `token` is cancelled
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Whether the response may be served from or stored in the cache
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET && !self.skip_cache
    }
}
