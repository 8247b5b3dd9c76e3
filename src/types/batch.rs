//! Graph batch request types.

use crate::errors::{MetaError, MetaResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Maximum number of operations Meta accepts in one batch
pub const MAX_BATCH_SIZE: usize = 50;

/// One operation inside a `batch=` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequestItem {
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// Path relative to the versioned Graph root, with query string
    pub relative_url: String,
    /// Form-encoded body for POST operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Name other operations can reference in JSONPath expressions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BatchRequestItem {
    /// A GET operation
    pub fn get(relative_url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            relative_url: relative_url.into(),
            body: None,
            name: None,
        }
    }

    /// A POST operation with a form-encoded body
    pub fn post(relative_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            relative_url: relative_url.into(),
            body: Some(body.into()),
            name: None,
        }
    }

    /// A DELETE operation
    pub fn delete(relative_url: impl Into<String>) -> Self {
        Self {
            method: "DELETE".to_string(),
            relative_url: relative_url.into(),
            body: None,
            name: None,
        }
    }

    /// Name this operation
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Header returned for one batch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    /// Header name
    pub name: String,
    /// Header value
    pub value: String,
}

/// Result of one batch operation.
///
/// `body` is the raw JSON text Meta returned for the operation. An operation
/// that did not complete server-side comes back as `code == 0` with no body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponseItem {
    /// HTTP status of the operation
    #[serde(default)]
    pub code: u16,
    /// Response headers of the operation
    #[serde(default)]
    pub headers: Vec<BatchHeader>,
    /// Raw response body
    #[serde(default)]
    pub body: Option<String>,
}

impl BatchResponseItem {
    /// Whether the operation returned 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Whether Meta skipped or timed out the operation
    pub fn is_incomplete(&self) -> bool {
        self.code == 0
    }

    /// Parse the body into `T`
    pub fn json<T: DeserializeOwned>(&self) -> MetaResult<T> {
        let body = self.body.as_deref().ok_or_else(|| MetaError::Unexpected {
            status: Some(self.code),
            message: "Batch item has no body".to_string(),
        })?;
        serde_json::from_str(body).map_err(|e| MetaError::Unexpected {
            status: Some(self.code),
            message: format!("Failed to parse batch item body: {}", e),
        })
    }

    /// The classified error for a failed operation
    pub fn error(&self) -> Option<MetaError> {
        if self.is_success() {
            return None;
        }
        if self.is_incomplete() {
            return Some(MetaError::Unexpected {
                status: None,
                message: "Batch operation did not complete".to_string(),
            });
        }
        Some(MetaError::from_response(
            self.code,
            self.body.as_deref().unwrap_or_default(),
            None,
        ))
    }
}

/// Parse Meta's batch response array, keeping `null` entries in place
pub(crate) fn parse_batch_response(value: serde_json::Value) -> MetaResult<Vec<BatchResponseItem>> {
    let items: Vec<Option<BatchResponseItem>> =
        serde_json::from_value(value).map_err(|e| MetaError::Unexpected {
            status: None,
            message: format!("Failed to parse batch response: {}", e),
        })?;
    Ok(items.into_iter().map(Option::unwrap_or_default).collect())
}
