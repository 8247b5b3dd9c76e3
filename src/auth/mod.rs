//! Authentication management for the Meta Business client.
//!
//! Handles token storage, OAuth flows, and authorization headers.

mod oauth;
mod token;

pub use oauth::{OAuthHelper, TOKEN_PATH};
pub use token::{InMemoryTokenStore, TokenSet, TokenStore};

use crate::config::MetaConfig;
use crate::errors::{AuthenticationError, ConfigurationError, MetaError, MetaResult};
use hmac::{Hmac, Mac};
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use sha2::Sha256;
use std::sync::Arc;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Authentication manager for Graph API requests
#[derive(Clone)]
pub struct AuthManager {
    config: Arc<MetaConfig>,
    store: Arc<dyn TokenStore>,
}

impl AuthManager {
    /// Create a new authentication manager
    pub fn new(config: Arc<MetaConfig>, store: Arc<dyn TokenStore>) -> Self {
        Self { config, store }
    }

    /// The underlying token store
    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// The stored token, if present and not expired.
    ///
    /// An expired token is cleared so later calls fail as missing.
    pub fn valid_token(&self) -> MetaResult<TokenSet> {
        let tokens = self
            .store
            .get()
            .ok_or(MetaError::Authentication(AuthenticationError::MissingToken))?;

        if tokens.is_expired() {
            debug!("Stored access token expired; clearing");
            self.store.clear_if_current(tokens.expose());
            return Err(MetaError::Authentication(AuthenticationError::MissingToken));
        }

        Ok(tokens)
    }

    /// Whether a usable token is stored
    pub fn has_valid_token(&self) -> bool {
        self.store.get().is_some_and(|t| !t.is_expired())
    }

    /// Build headers for an authenticated call
    pub fn build_headers(&self, tokens: &TokenSet) -> MetaResult<HeaderMap> {
        let mut headers = self.config.default_headers.clone();

        let auth_value = format!("Bearer {}", tokens.expose());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|_| {
                MetaError::Authentication(AuthenticationError::Rejected {
                    message: "Access token contains invalid header characters".to_string(),
                    code: None,
                })
            })?,
        );

        Ok(headers)
    }

    /// Headers for unauthenticated calls (token exchange)
    pub fn base_headers(&self) -> HeaderMap {
        self.config.default_headers.clone()
    }

    /// `appsecret_proof` for a token, when enabled in config
    pub fn appsecret_proof(&self, tokens: &TokenSet) -> MetaResult<Option<String>> {
        if !self.config.appsecret_proof {
            return Ok(None);
        }
        compute_appsecret_proof(self.config.expose_app_secret(), tokens.expose()).map(Some)
    }
}

/// Hex HMAC-SHA256 of the access token keyed by the app secret
pub fn compute_appsecret_proof(app_secret: &str, access_token: &str) -> MetaResult<String> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes()).map_err(|e| {
        MetaError::Configuration(ConfigurationError::InvalidConfiguration {
            message: format!("Invalid app secret: {}", e),
        })
    })?;
    mac.update(access_token.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("has_token", &self.store.get().is_some())
            .field("appsecret_proof", &self.config.appsecret_proof)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetaConfigBuilder;
    use chrono::{Duration as ChronoDuration, Utc};

    fn manager(proof: bool) -> AuthManager {
        let config = MetaConfigBuilder::new()
            .app_id("1")
            .app_secret("app-secret")
            .appsecret_proof(proof)
            .default_header("x-client", "dashboard")
            .build_unchecked();
        AuthManager::new(Arc::new(config), Arc::new(InMemoryTokenStore::new()))
    }

    #[test]
    fn test_missing_token() {
        let auth = manager(false);
        let err = auth.valid_token().unwrap_err();
        assert_eq!(err.to_string(), "Access token required");
        assert!(!auth.has_valid_token());
    }

    #[test]
    fn test_expired_token_is_cleared() {
        let auth = manager(false);
        auth.store().set(
            TokenSet::new("old")
                .with_expires_in(10)
                .obtained_at(Utc::now() - ChronoDuration::seconds(60)),
        );

        let err = auth.valid_token().unwrap_err();
        assert_eq!(err.to_string(), "Access token required");
        assert!(auth.store().get().is_none());
    }

    #[test]
    fn test_build_headers() {
        let auth = manager(false);
        let headers = auth.build_headers(&TokenSet::new("EAAB")).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer EAAB");
        assert_eq!(headers.get("x-client").unwrap(), "dashboard");
    }

    #[test]
    fn test_appsecret_proof() {
        let tokens = TokenSet::new("token");
        assert!(manager(false).appsecret_proof(&tokens).unwrap().is_none());

        let proof = manager(true).appsecret_proof(&tokens).unwrap().unwrap();
        assert_eq!(proof.len(), 64);
        assert_eq!(proof, compute_appsecret_proof("app-secret", "token").unwrap());
        assert_ne!(proof, compute_appsecret_proof("other", "token").unwrap());
    }
}
