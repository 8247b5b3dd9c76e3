//! Access token storage.

use crate::errors::ValidationError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

/// Tokens obtained from the OAuth endpoint
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Access token
    pub access_token: SecretString,
    /// Token type, normally `bearer`
    pub token_type: String,
    /// Lifetime in seconds from `obtained_at`; `None` never expires locally
    pub expires_in: Option<u64>,
    /// Refresh token, if the grant returned one
    pub refresh_token: Option<SecretString>,
    /// When the token was obtained
    pub obtained_at: DateTime<Utc>,
}

impl TokenSet {
    /// Wrap a bare access token with no known expiry
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: SecretString::new(access_token.into()),
            token_type: "bearer".to_string(),
            expires_in: None,
            refresh_token: None,
            obtained_at: Utc::now(),
        }
    }

    /// Set the lifetime in seconds
    pub fn with_expires_in(mut self, seconds: u64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    /// Set the refresh token
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(SecretString::new(token.into()));
        self
    }

    /// Override when the token was obtained
    pub fn obtained_at(mut self, at: DateTime<Utc>) -> Self {
        self.obtained_at = at;
        self
    }

    /// Parse the body of a successful `/oauth/access_token` response.
    ///
    /// A body without a non-empty `access_token` is rejected rather than
    /// producing a partial token.
    pub fn from_response(body: &Value) -> Result<Self, ValidationError> {
        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ValidationError::MalformedTokenResponse {
                message: "missing access_token".to_string(),
            })?;

        let token_type = body
            .get("token_type")
            .and_then(Value::as_str)
            .unwrap_or("bearer")
            .to_string();

        let expires_in = match body.get("expires_in") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.parse().ok(),
            Some(_) => None,
        };

        let refresh_token = body
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(|t| SecretString::new(t.to_string()));

        Ok(Self {
            access_token: SecretString::new(access_token.to_string()),
            token_type,
            expires_in,
            refresh_token,
            obtained_at: Utc::now(),
        })
    }

    /// Expiry instant, if known.
    ///
    /// A lifetime too large to represent is treated as never expiring.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.expires_in.filter(|secs| *secs > 0)?;
        let lifetime = i64::try_from(secs).ok().and_then(ChronoDuration::try_seconds)?;
        self.obtained_at.checked_add_signed(lifetime)
    }

    /// Whether the token is past its expiry
    pub fn is_expired(&self) -> bool {
        self.expires_at().is_some_and(|at| Utc::now() >= at)
    }

    /// Expose the access token
    pub fn expose(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Holder of the current token set.
///
/// Host applications can back this with any secure storage.
pub trait TokenStore: Send + Sync {
    /// Current tokens
    fn get(&self) -> Option<TokenSet>;

    /// Replace the stored tokens
    fn set(&self, tokens: TokenSet);

    /// Remove the stored tokens
    fn clear(&self);

    /// Remove the stored tokens only if they still hold `access_token`.
    ///
    /// Returns whether anything was removed. Stores shared across tasks
    /// should override this to compare and clear under one lock.
    fn clear_if_current(&self, access_token: &str) -> bool {
        match self.get() {
            Some(current) if current.expose() == access_token => {
                self.clear();
                true
            }
            _ => false,
        }
    }
}

/// In-process token store
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: RwLock<Option<TokenSet>>,
}

impl InMemoryTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn get(&self) -> Option<TokenSet> {
        self.tokens.read().clone()
    }

    fn set(&self, tokens: TokenSet) {
        *self.tokens.write() = Some(tokens);
    }

    fn clear(&self) {
        *self.tokens.write() = None;
    }

    fn clear_if_current(&self, access_token: &str) -> bool {
        let mut tokens = self.tokens.write();
        if tokens.as_ref().is_some_and(|t| t.expose() == access_token) {
            *tokens = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response() {
        let tokens = TokenSet::from_response(&json!({
            "access_token": "EAAB123",
            "token_type": "bearer",
            "expires_in": 5183944
        }))
        .unwrap();

        assert_eq!(tokens.expose(), "EAAB123");
        assert_eq!(tokens.expires_in, Some(5183944));
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_from_response_missing_token() {
        let err = TokenSet::from_response(&json!({"token_type": "bearer"})).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedTokenResponse { .. }));

        assert!(TokenSet::from_response(&json!({"access_token": ""})).is_err());
    }

    #[test]
    fn test_expiry() {
        let stale = TokenSet::new("t")
            .with_expires_in(60)
            .obtained_at(Utc::now() - ChronoDuration::seconds(120));
        assert!(stale.is_expired());

        assert!(!TokenSet::new("t").is_expired());
    }

    #[test]
    fn test_oversized_lifetime_never_expires() {
        let huge = TokenSet::from_response(&json!({
            "access_token": "EAAB",
            "expires_in": 100_000_000_000_000_000u64
        }))
        .unwrap();
        assert!(huge.expires_at().is_none());
        assert!(!huge.is_expired());

        let max = TokenSet::new("EAAB").with_expires_in(u64::MAX);
        assert!(max.expires_at().is_none());
        assert!(!max.is_expired());

        let ordinary = TokenSet::new("EAAB").with_expires_in(3600);
        assert!(ordinary.expires_at().is_some());
    }

    #[test]
    fn test_debug_hides_token() {
        let tokens = TokenSet::new("super-secret").with_refresh_token("also-secret");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryTokenStore::new();
        assert!(store.get().is_none());

        store.set(TokenSet::new("abc"));
        assert_eq!(store.get().unwrap().expose(), "abc");

        store.clear();
        assert!(store.get().is_none());
    }

    #[test]
    fn test_clear_if_current() {
        let store = InMemoryTokenStore::new();
        store.set(TokenSet::new("fresh"));

        assert!(!store.clear_if_current("stale"));
        assert_eq!(store.get().unwrap().expose(), "fresh");

        assert!(store.clear_if_current("fresh"));
        assert!(store.get().is_none());
        assert!(!store.clear_if_current("fresh"));
    }
}
