//! Configuration management for the Meta Business client.
//!
//! Supports configuration via:
//! - Explicit values
//! - Environment variables
//! - Builder pattern

use crate::errors::{ConfigurationError, MetaError, MetaResult};
use crate::resilience::RateLimiterConfig;
use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Configuration for the Meta Business client
#[derive(Clone)]
pub struct MetaConfig {
    /// Meta app ID (`client_id` in OAuth)
    pub(crate) app_id: String,
    /// Meta app secret (`client_secret` in OAuth)
    pub(crate) app_secret: SecretString,
    /// OAuth redirect URI registered with the app
    pub(crate) redirect_uri: String,
    /// Graph API version, e.g. `v19.0`
    pub api_version: String,
    /// Base URL for Graph API calls
    pub graph_base_url: Url,
    /// Base URL for the OAuth dialog
    pub auth_base_url: Url,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retries for transient failures
    pub max_retries: u32,
    /// Lifetime of cached GET responses
    pub cache_ttl: Duration,
    /// Per-bucket request budget
    pub rate_limit: RateLimiterConfig,
    /// Send `appsecret_proof` with every authenticated call
    pub appsecret_proof: bool,
    /// Default headers
    pub default_headers: HeaderMap,
}

impl std::fmt::Debug for MetaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaConfig")
            .field("app_id", &self.app_id)
            .field("app_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("api_version", &self.api_version)
            .field("graph_base_url", &self.graph_base_url)
            .field("auth_base_url", &self.auth_base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("cache_ttl", &self.cache_ttl)
            .field("rate_limit", &self.rate_limit)
            .field("appsecret_proof", &self.appsecret_proof)
            .finish()
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: SecretString::new(String::new()),
            redirect_uri: String::new(),
            api_version: crate::DEFAULT_API_VERSION.to_string(),
            graph_base_url: Url::parse(crate::DEFAULT_GRAPH_URL)
                .expect("default graph URL is valid"),
            auth_base_url: Url::parse(crate::DEFAULT_AUTH_URL)
                .expect("default auth URL is valid"),
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            max_retries: crate::DEFAULT_MAX_RETRIES,
            cache_ttl: Duration::from_secs(crate::DEFAULT_CACHE_TTL_SECS),
            rate_limit: RateLimiterConfig::default(),
            appsecret_proof: false,
            default_headers: HeaderMap::new(),
        }
    }
}

impl MetaConfig {
    /// Create a new configuration builder
    pub fn builder() -> MetaConfigBuilder {
        MetaConfigBuilder::new()
    }

    /// Create configuration from environment variables
    pub fn from_env() -> MetaResult<Self> {
        let mut builder = MetaConfigBuilder::new();

        let app_id = std::env::var("META_APP_ID")
            .map_err(|_| ConfigurationError::EnvVar("META_APP_ID is not set".to_string()))?;
        builder = builder.app_id(&app_id);

        let app_secret = std::env::var("META_APP_SECRET")
            .map_err(|_| ConfigurationError::EnvVar("META_APP_SECRET is not set".to_string()))?;
        builder = builder.app_secret(&app_secret);

        if let Ok(uri) = std::env::var("META_REDIRECT_URI") {
            builder = builder.redirect_uri(&uri);
        }

        if let Ok(version) = std::env::var("META_API_VERSION") {
            builder = builder.api_version(&version);
        }

        if let Ok(url) = std::env::var("META_GRAPH_URL") {
            builder = builder.graph_base_url(&url)?;
        }

        if let Ok(timeout) = std::env::var("META_TIMEOUT") {
            if let Ok(secs) = timeout.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(secs));
            }
        }

        if let Ok(retries) = std::env::var("META_MAX_RETRIES") {
            if let Ok(n) = retries.parse::<u32>() {
                builder = builder.max_retries(n);
            }
        }

        if let Ok(ttl) = std::env::var("META_CACHE_TTL") {
            if let Ok(secs) = ttl.parse::<u64>() {
                builder = builder.cache_ttl(Duration::from_secs(secs));
            }
        }

        if let Ok(limit) = std::env::var("META_RATE_LIMIT") {
            if let Ok(n) = limit.parse::<u32>() {
                builder = builder.rate_limit(RateLimiterConfig::default().max_requests(n));
            }
        }

        if let Ok(flag) = std::env::var("META_APPSECRET_PROOF") {
            builder = builder.appsecret_proof(matches!(flag.as_str(), "1" | "true" | "yes"));
        }

        builder.build()
    }

    /// Get the app ID
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Get the redirect URI
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Expose the app secret for token exchange and proof signing
    pub(crate) fn expose_app_secret(&self) -> &str {
        self.app_secret.expose_secret()
    }

    /// Build the versioned Graph URL for a path such as `/me/adaccounts`
    pub fn build_url(&self, path: &str) -> String {
        let base = self.graph_base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/{}", base, self.api_version)
        } else {
            format!("{}/{}/{}", base, self.api_version, path)
        }
    }

    /// Build the versioned OAuth dialog URL (without query)
    pub fn dialog_url(&self) -> String {
        format!(
            "{}/{}/dialog/oauth",
            self.auth_base_url.as_str().trim_end_matches('/'),
            self.api_version
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> MetaResult<()> {
        if self.app_id.trim().is_empty() {
            return Err(MetaError::Configuration(ConfigurationError::MissingAppId));
        }

        if self.app_secret.expose_secret().trim().is_empty() {
            return Err(MetaError::Configuration(ConfigurationError::MissingAppSecret));
        }

        if !self.redirect_uri.is_empty() && Url::parse(&self.redirect_uri).is_err() {
            return Err(MetaError::Configuration(
                ConfigurationError::InvalidRedirectUri(self.redirect_uri.clone()),
            ));
        }

        if !is_valid_api_version(&self.api_version) {
            return Err(MetaError::Configuration(
                ConfigurationError::InvalidApiVersion(self.api_version.clone()),
            ));
        }

        if self.rate_limit.max_requests == 0 || self.rate_limit.window.is_zero() {
            return Err(MetaError::Configuration(
                ConfigurationError::InvalidConfiguration {
                    message: "rate limit must allow at least one request per window".to_string(),
                },
            ));
        }

        Ok(())
    }
}

/// `v<major>.<minor>`
fn is_valid_api_version(version: &str) -> bool {
    let Some(rest) = version.strip_prefix('v') else {
        return false;
    };
    let mut parts = rest.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(major), Some(minor), None) => {
            !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

/// Builder for MetaConfig
#[derive(Default)]
pub struct MetaConfigBuilder {
    config: MetaConfig,
}

impl MetaConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: MetaConfig::default(),
        }
    }

    /// Set the app ID
    pub fn app_id(mut self, id: &str) -> Self {
        self.config.app_id = id.to_string();
        self
    }

    /// Set the app secret
    pub fn app_secret(mut self, secret: &str) -> Self {
        self.config.app_secret = SecretString::new(secret.to_string());
        self
    }

    /// Set the OAuth redirect URI
    pub fn redirect_uri(mut self, uri: &str) -> Self {
        self.config.redirect_uri = uri.to_string();
        self
    }

    /// Set the Graph API version
    pub fn api_version(mut self, version: &str) -> Self {
        self.config.api_version = version.to_string();
        self
    }

    /// Set the Graph API base URL
    pub fn graph_base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.config.graph_base_url =
            Url::parse(url).map_err(|e| ConfigurationError::InvalidConfiguration {
                message: format!("Invalid URL: {}", e),
            })?;
        Ok(self)
    }

    /// Set the OAuth dialog base URL
    pub fn auth_base_url(mut self, url: &str) -> Result<Self, ConfigurationError> {
        self.config.auth_base_url =
            Url::parse(url).map_err(|e| ConfigurationError::InvalidConfiguration {
                message: format!("Invalid URL: {}", e),
            })?;
        Ok(self)
    }

    /// Set the timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    /// Set the rate limit budget
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = config;
        self
    }

    /// Enable or disable `appsecret_proof`
    pub fn appsecret_proof(mut self, enabled: bool) -> Self {
        self.config.appsecret_proof = enabled;
        self
    }

    /// Add a default header
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        if let Ok(header_name) = name.parse::<http::header::HeaderName>() {
            if let Ok(header_value) = value.parse::<http::header::HeaderValue>() {
                self.config.default_headers.insert(header_name, header_value);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> MetaResult<MetaConfig> {
        self.config.validate()?;
        Ok(self.config)
    }

    /// Build the configuration without validation (for testing)
    pub fn build_unchecked(self) -> MetaConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> MetaConfigBuilder {
        MetaConfigBuilder::new()
            .app_id("123456")
            .app_secret("shhh")
            .redirect_uri("https://example.com/callback")
    }

    #[test]
    fn test_config_builder() {
        let config = builder()
            .timeout(Duration::from_secs(60))
            .max_retries(0)
            .cache_ttl(Duration::from_secs(10))
            .build()
            .unwrap();

        assert_eq!(config.app_id(), "123456");
        assert_eq!(config.api_version, "v19.0");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.cache_ttl, Duration::from_secs(10));
    }

    #[test]
    fn test_build_url() {
        let config = builder().build().unwrap();

        assert_eq!(
            config.build_url("/me/adaccounts"),
            "https://graph.facebook.com/v19.0/me/adaccounts"
        );
        assert_eq!(
            config.build_url("act_1/campaigns"),
            "https://graph.facebook.com/v19.0/act_1/campaigns"
        );
        assert_eq!(config.build_url("/"), "https://graph.facebook.com/v19.0");
    }

    #[test]
    fn test_dialog_url() {
        let config = builder().api_version("v18.0").build().unwrap();
        assert_eq!(
            config.dialog_url(),
            "https://www.facebook.com/v18.0/dialog/oauth"
        );
    }

    #[test]
    fn test_validation_missing_app_id() {
        let result = MetaConfigBuilder::new().app_secret("s").build();
        assert!(matches!(
            result,
            Err(MetaError::Configuration(ConfigurationError::MissingAppId))
        ));
    }

    #[test]
    fn test_validation_missing_secret() {
        let result = MetaConfigBuilder::new().app_id("1").build();
        assert!(matches!(
            result,
            Err(MetaError::Configuration(ConfigurationError::MissingAppSecret))
        ));
    }

    #[test]
    fn test_validation_api_version() {
        assert!(is_valid_api_version("v19.0"));
        assert!(is_valid_api_version("v2.12"));
        assert!(!is_valid_api_version("19.0"));
        assert!(!is_valid_api_version("v19"));
        assert!(!is_valid_api_version("vX.0"));
        assert!(builder().api_version("latest").build().is_err());
    }

    #[test]
    fn test_validation_redirect_uri() {
        assert!(builder().redirect_uri("not a url").build().is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shhh"));
    }
}
