//! Error types for the Meta Business client.
//!
//! Maps Graph API failures (HTTP status plus the `error` object Meta returns)
//! onto a closed error taxonomy with retry support.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Result type for Meta Business operations
pub type MetaResult<T> = Result<T, MetaError>;

/// Default message when no upstream message is available for a class.
pub(crate) mod messages {
    pub const AUTHENTICATION_FAILED: &str = "Authentication failed";
    pub const PERMISSION_DENIED: &str = "Permission denied";
    pub const NOT_FOUND: &str = "Resource not found";
    pub const RATE_LIMIT_EXCEEDED: &str = "Rate limit exceeded";
    pub const SERVER_ERROR: &str = "Server error";
    pub const UNEXPECTED: &str = "An unexpected error occurred";
}

/// Root error type for the Meta Business integration.
///
/// `Display` renders the bare message so callers can match on the text Meta
/// returned (for example `"Invalid authorization code"`).
#[derive(Error, Debug)]
pub enum MetaError {
    /// Configuration error
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// Missing, expired or rejected credentials (401, code 190)
    #[error("{0}")]
    Authentication(#[from] AuthenticationError),

    /// The token is valid but lacks a permission (403, codes 10/200-299)
    #[error("{message}")]
    Permission {
        /// Error message
        message: String,
        /// Graph API error code
        code: Option<i64>,
    },

    /// Object does not exist or is not visible (404)
    #[error("{message}")]
    NotFound {
        /// Error message
        message: String,
    },

    /// Local budget exhausted or upstream throttling
    #[error("{0}")]
    RateLimit(#[from] RateLimitError),

    /// Local input validation failure; never reaches the network
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Upstream 5xx after retries were exhausted
    #[error("{0}")]
    Server(#[from] ServerError),

    /// Unclassified 4xx or a malformed body
    #[error("{message}")]
    Unexpected {
        /// HTTP status, when a response was received
        status: Option<u16>,
        /// Error message
        message: String,
    },

    /// Network failure, timeout or cancellation
    #[error("{0}")]
    Transport(#[from] TransportError),
}

impl MetaError {
    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "META_CONFIG",
            Self::Authentication(_) => "META_AUTH",
            Self::Permission { .. } => "META_PERMISSION",
            Self::NotFound { .. } => "META_NOT_FOUND",
            Self::RateLimit(_) => "META_RATE_LIMIT",
            Self::Validation(_) => "META_VALIDATION",
            Self::Server(_) => "META_SERVER",
            Self::Unexpected { .. } => "META_UNEXPECTED",
            Self::Transport(_) => "META_TRANSPORT",
        }
    }

    /// Check if this error is transient and eligible for retry.
    ///
    /// Only upstream 5xx responses and I/O timeouts qualify.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Transport(TransportError::Timeout))
    }

    /// Get retry-after duration if applicable
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit(RateLimitError::Exceeded { retry_after, .. }) => *retry_after,
            Self::RateLimit(RateLimitError::Throttled { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }

    /// Get the HTTP status associated with this error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Authentication(AuthenticationError::Rejected { .. }) => Some(401),
            Self::Permission { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimit(RateLimitError::Throttled { .. }) => Some(429),
            Self::Server(err) => Some(err.status()),
            Self::Unexpected { status, .. } => *status,
            _ => None,
        }
    }

    /// Get the Graph API error code, if the upstream body carried one
    pub fn graph_code(&self) -> Option<i64> {
        match self {
            Self::Authentication(AuthenticationError::Rejected { code, .. })
            | Self::Authentication(AuthenticationError::OAuth { code, .. })
            | Self::Permission { code, .. }
            | Self::RateLimit(RateLimitError::Throttled { code, .. }) => *code,
            _ => None,
        }
    }

    /// Whether this error means the stored token can no longer be used
    pub fn invalidates_token(&self) -> bool {
        matches!(
            self,
            Self::Authentication(AuthenticationError::Rejected { .. })
                | Self::Authentication(AuthenticationError::OAuth { .. })
        )
    }

    /// Classify a non-success HTTP response.
    ///
    /// Graph error codes refine the status for 4xx responses, since Meta
    /// reports expired tokens and throttling as plain 400s.
    pub fn from_response(status: u16, body: &str, retry_after: Option<Duration>) -> Self {
        let api = GraphApiError::from_body(body);
        let message = api.as_ref().and_then(|e| e.message.clone());
        let code = api.as_ref().and_then(|e| e.code);

        if (400..500).contains(&status) {
            if let Some(c) = code {
                if is_auth_code(c) {
                    return Self::Authentication(AuthenticationError::Rejected {
                        message: message.unwrap_or_else(|| messages::AUTHENTICATION_FAILED.into()),
                        code,
                    });
                }
                if is_throttle_code(c) {
                    return Self::RateLimit(RateLimitError::Throttled {
                        message: message.unwrap_or_else(|| messages::RATE_LIMIT_EXCEEDED.into()),
                        retry_after,
                        code,
                    });
                }
                if is_permission_code(c) && status != 404 {
                    return Self::Permission {
                        message: message.unwrap_or_else(|| messages::PERMISSION_DENIED.into()),
                        code,
                    };
                }
            }
        }

        match status {
            401 => Self::Authentication(AuthenticationError::Rejected {
                message: message.unwrap_or_else(|| messages::AUTHENTICATION_FAILED.into()),
                code,
            }),
            403 => Self::Permission {
                message: message.unwrap_or_else(|| messages::PERMISSION_DENIED.into()),
                code,
            },
            404 => Self::NotFound {
                message: message.unwrap_or_else(|| messages::NOT_FOUND.into()),
            },
            429 => Self::RateLimit(RateLimitError::Throttled {
                message: message.unwrap_or_else(|| messages::RATE_LIMIT_EXCEEDED.into()),
                retry_after,
                code,
            }),
            500..=599 => Self::Server(ServerError::from_status(
                status,
                message.unwrap_or_else(|| messages::SERVER_ERROR.into()),
            )),
            _ => Self::Unexpected {
                status: Some(status),
                message: message.unwrap_or_else(|| messages::UNEXPECTED.into()),
            },
        }
    }
}

fn is_auth_code(code: i64) -> bool {
    matches!(code, 102 | 190 | 463 | 467)
}

fn is_throttle_code(code: i64) -> bool {
    matches!(code, 4 | 17 | 32 | 613 | 80000..=80014)
}

fn is_permission_code(code: i64) -> bool {
    matches!(code, 10 | 200..=299)
}

/// Error object as returned by the Graph API.
///
/// Meta sends `{"error": {...}}` for most failures; some OAuth endpoints send
/// `{"error": "..."}` with an optional `error_description`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphApiError {
    /// Human readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Error type, e.g. `OAuthException`
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Graph error code
    #[serde(default)]
    pub code: Option<i64>,
    /// Graph error subcode
    #[serde(default)]
    pub error_subcode: Option<i64>,
    /// Trace identifier for Meta support
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl GraphApiError {
    /// Extract the error object from a raw response body
    pub fn from_body(body: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("error")? {
            serde_json::Value::String(s) => {
                let message = value
                    .get("error_description")
                    .and_then(|d| d.as_str())
                    .unwrap_or(s);
                Some(Self {
                    message: Some(message.to_string()),
                    ..Default::default()
                })
            }
            obj @ serde_json::Value::Object(_) => serde_json::from_value(obj.clone()).ok(),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Missing app ID
    #[error("App ID is missing")]
    MissingAppId,

    /// Missing app secret
    #[error("App secret is missing")]
    MissingAppSecret,

    /// Redirect URI is not an absolute URL
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// API version does not look like `v19.0`
    #[error("Invalid API version: {0}")]
    InvalidApiVersion(String),

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(String),
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// No access token is stored
    #[error("Access token required")]
    MissingToken,

    /// Meta rejected the token on an API call
    #[error("{message}")]
    Rejected {
        /// Error message
        message: String,
        /// Graph API error code
        code: Option<i64>,
    },

    /// A token exchange or refresh was refused
    #[error("{message}")]
    OAuth {
        /// Error message
        message: String,
        /// Graph API error code
        code: Option<i64>,
    },
}

/// Rate limit errors
#[derive(Error, Debug)]
pub enum RateLimitError {
    /// Local request budget exhausted
    #[error("Rate limit exceeded")]
    Exceeded {
        /// Bucket that ran out
        bucket: String,
        /// Time until the bucket window resets
        retry_after: Option<Duration>,
    },

    /// Meta throttled the request (429 or a throttling error code)
    #[error("{message}")]
    Throttled {
        /// Error message
        message: String,
        /// Value of `Retry-After`, if sent
        retry_after: Option<Duration>,
        /// Graph API error code
        code: Option<i64>,
    },
}

/// Local validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Ad account ID is not `act_<digits>` or digits
    #[error("Invalid ad account ID: {id}")]
    InvalidAccountId {
        /// Offending ID
        id: String,
    },

    /// Object ID is not a numeric Graph ID
    #[error("Invalid {kind} ID: {id}")]
    InvalidObjectId {
        /// Object kind, e.g. `campaign`
        kind: &'static str,
        /// Offending ID
        id: String,
    },

    /// Required field is absent
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// Value is not a member of the allowed enum
    #[error("Invalid {field}: {value}")]
    InvalidEnum {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Budget fields must be non-negative
    #[error("{field} must not be negative")]
    NegativeBudget {
        /// Field name
        field: &'static str,
    },

    /// Date bounds are inconsistent
    #[error("Invalid date range: {message}")]
    InvalidDateRange {
        /// Error message
        message: String,
    },

    /// Batch request shape is not acceptable
    #[error("Invalid batch request: {message}")]
    InvalidBatch {
        /// Error message
        message: String,
    },

    /// Generic parameter failure
    #[error("Invalid {name}: {message}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Error message
        message: String,
    },

    /// Token endpoint answered 2xx without a usable token
    #[error("Invalid token response: {message}")]
    MalformedTokenResponse {
        /// Error message
        message: String,
    },
}

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// 500 and other 5xx
    #[error("{message}")]
    Internal {
        /// HTTP status
        status: u16,
        /// Error message
        message: String,
    },

    /// 502, 503, 504
    #[error("{message}")]
    Unavailable {
        /// HTTP status
        status: u16,
        /// Error message
        message: String,
    },
}

impl ServerError {
    /// Build from a 5xx status
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            502..=504 => Self::Unavailable { status, message },
            _ => Self::Internal { status, message },
        }
    }

    /// HTTP status
    pub fn status(&self) -> u16 {
        match self {
            Self::Internal { status, .. } | Self::Unavailable { status, .. } => *status,
        }
    }
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    /// Request timed out
    #[error("Request timed out")]
    Timeout,

    /// Connection failed
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Caller cancelled the request
    #[error("Request aborted")]
    Aborted,

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::ConnectionFailed {
                message: err.to_string(),
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_is_retryable() {
        assert!(MetaError::Transport(TransportError::Timeout).is_retryable());
        assert!(MetaError::Server(ServerError::from_status(503, "down".into())).is_retryable());

        assert!(!MetaError::Authentication(AuthenticationError::MissingToken).is_retryable());
        assert!(!MetaError::NotFound {
            message: "gone".into()
        }
        .is_retryable());
        assert!(!MetaError::Transport(TransportError::Aborted).is_retryable());
        assert!(!MetaError::Validation(ValidationError::MissingField { field: "name" })
            .is_retryable());
    }

    #[test_case(401, "META_AUTH" ; "unauthorized")]
    #[test_case(403, "META_PERMISSION" ; "forbidden")]
    #[test_case(404, "META_NOT_FOUND" ; "not found")]
    #[test_case(429, "META_RATE_LIMIT" ; "too many requests")]
    #[test_case(500, "META_SERVER" ; "internal")]
    #[test_case(503, "META_SERVER" ; "unavailable")]
    #[test_case(400, "META_UNEXPECTED" ; "bad request")]
    fn test_status_classification(status: u16, expected: &str) {
        let err = MetaError::from_response(status, "{}", None);
        assert_eq!(err.error_code(), expected);
    }

    #[test]
    fn test_upstream_message_preferred() {
        let body = r#"{"error":{"message":"Campaign has active ads","type":"OAuthException","code":100}}"#;
        let err = MetaError::from_response(400, body, None);
        assert_eq!(err.to_string(), "Campaign has active ads");
        assert_eq!(err.http_status(), Some(400));
    }

    #[test]
    fn test_string_error_field() {
        let err = MetaError::from_response(400, r#"{"error":"bad things"}"#, None);
        assert_eq!(err.to_string(), "bad things");
    }

    #[test]
    fn test_default_messages() {
        assert_eq!(
            MetaError::from_response(404, "not json", None).to_string(),
            "Resource not found"
        );
        assert_eq!(
            MetaError::from_response(418, "", None).to_string(),
            "An unexpected error occurred"
        );
        assert_eq!(
            MetaError::from_response(429, "", None).to_string(),
            "Rate limit exceeded"
        );
    }

    #[test]
    fn test_expired_token_code_is_authentication() {
        let body = r#"{"error":{"message":"Error validating access token","type":"OAuthException","code":190,"error_subcode":463}}"#;
        let err = MetaError::from_response(400, body, None);
        assert!(matches!(
            err,
            MetaError::Authentication(AuthenticationError::Rejected { code: Some(190), .. })
        ));
        assert!(err.invalidates_token());
    }

    #[test]
    fn test_throttle_code_is_rate_limit() {
        let body = r#"{"error":{"message":"User request limit reached","code":17}}"#;
        let err = MetaError::from_response(400, body, Some(Duration::from_secs(60)));
        assert_eq!(err.error_code(), "META_RATE_LIMIT");
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));
        assert_eq!(err.graph_code(), Some(17));
    }

    #[test]
    fn test_permission_code() {
        let body = r#"{"error":{"message":"Requires ads_management permission","code":200}}"#;
        let err = MetaError::from_response(400, body, None);
        assert!(matches!(err, MetaError::Permission { code: Some(200), .. }));
    }

    #[test]
    fn test_server_error_ignores_graph_code() {
        let body = r#"{"error":{"message":"An unknown error occurred","code":1}}"#;
        let err = MetaError::from_response(500, body, None);
        assert!(matches!(err, MetaError::Server(ServerError::Internal { status: 500, .. })));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_local_messages() {
        assert_eq!(
            MetaError::from(AuthenticationError::MissingToken).to_string(),
            "Access token required"
        );
        assert_eq!(
            MetaError::from(RateLimitError::Exceeded {
                bucket: "act_1".into(),
                retry_after: None
            })
            .to_string(),
            "Rate limit exceeded"
        );
    }
}
