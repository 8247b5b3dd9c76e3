//! OAuth helper for Facebook Login flows.

use crate::config::MetaConfig;
use std::sync::Arc;

/// Path of the token endpoint, relative to the versioned Graph root
pub const TOKEN_PATH: &str = "oauth/access_token";

/// OAuth helper: dialog URL and token grant forms
#[derive(Clone)]
pub struct OAuthHelper {
    config: Arc<MetaConfig>,
}

impl OAuthHelper {
    /// Create a new OAuth helper
    pub fn new(config: Arc<MetaConfig>) -> Self {
        Self { config }
    }

    /// Build the login dialog URL.
    ///
    /// Every parameter is always present; an empty scope list yields `scope=`.
    pub fn authorization_url(&self, scopes: &[&str], state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.dialog_url(),
            urlencoding::encode(self.config.app_id()),
            urlencoding::encode(self.config.redirect_uri()),
            urlencoding::encode(&scopes.join(",")),
            urlencoding::encode(state),
        )
    }

    /// Absolute URL of the token endpoint
    pub fn token_url(&self) -> String {
        self.config.build_url(TOKEN_PATH)
    }

    /// Form for exchanging an authorization code
    pub fn code_exchange_form(&self, code: &str) -> Vec<(String, String)> {
        vec![
            ("client_id".into(), self.config.app_id().to_string()),
            ("client_secret".into(), self.config.expose_app_secret().to_string()),
            ("redirect_uri".into(), self.config.redirect_uri().to_string()),
            ("code".into(), code.to_string()),
        ]
    }

    /// Form for the refresh grant
    pub fn refresh_form(&self, refresh_token: &str) -> Vec<(String, String)> {
        vec![
            ("grant_type".into(), "refresh_token".into()),
            ("client_id".into(), self.config.app_id().to_string()),
            ("client_secret".into(), self.config.expose_app_secret().to_string()),
            ("refresh_token".into(), refresh_token.to_string()),
        ]
    }

    /// Form for exchanging a short-lived token for a long-lived one
    pub fn long_lived_form(&self, short_lived_token: &str) -> Vec<(String, String)> {
        vec![
            ("grant_type".into(), "fb_exchange_token".into()),
            ("client_id".into(), self.config.app_id().to_string()),
            ("client_secret".into(), self.config.expose_app_secret().to_string()),
            ("fb_exchange_token".into(), short_lived_token.to_string()),
        ]
    }
}

impl std::fmt::Debug for OAuthHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthHelper")
            .field("client_id", &self.config.app_id())
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.config.redirect_uri())
            .finish()
    }
}
