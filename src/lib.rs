//! Meta Business API Client
//!
//! Client for the Meta Graph and Marketing APIs with:
//! - Facebook Login OAuth (code exchange, refresh, long-lived tokens)
//! - Typed ad account, campaign and insights operations
//! - Batch requests with positional results
//! - Response caching, per-account rate budgets and a bounded retry
//! - Observability (tracing, metrics, log redaction)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meta_business_client::services::ad_accounts::ListAdAccountsRequest;
//! use meta_business_client::MetaEndpoints;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create client from environment
//!     let client = meta_business_client::create_client_from_env()?;
//!     client.set_access_token("EAAB...");
//!
//!     let endpoints = MetaEndpoints::new(client);
//!     let accounts = endpoints
//!         .get_ad_accounts(ListAdAccountsRequest::new().limit(50))
//!         .await?;
//!
//!     for account in accounts.data {
//!         println!("{} {:?}", account.id, account.name);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Core modules
pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod transport;
pub mod types;

// Services
pub mod services;

// Resilience
pub mod resilience;

// Observability
pub mod observability;

// Testing utilities
pub mod fixtures;
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use auth::{InMemoryTokenStore, TokenSet, TokenStore};
pub use cache::{InMemoryCache, ResponseCache};
pub use client::{MetaBusinessClient, MetaBusinessClientBuilder};
pub use config::{MetaConfig, MetaConfigBuilder};
pub use errors::{MetaError, MetaResult};
pub use services::MetaEndpoints;
pub use types::{BatchRequestItem, BatchResponseItem, Params, RequestOptions};

/// Default base URL for the Graph API
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Default base URL for the OAuth dialog
pub const DEFAULT_AUTH_URL: &str = "https://www.facebook.com";

/// Default Graph API version
pub const DEFAULT_API_VERSION: &str = "v19.0";

/// Default timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum retries
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default lifetime of cached GET responses in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Create a Meta Business client with the given configuration
pub fn create_client(config: MetaConfig) -> MetaResult<MetaBusinessClient> {
    MetaBusinessClient::new(config)
}

/// Create a Meta Business client from environment variables
///
/// Reads:
/// - `META_APP_ID` - App ID
/// - `META_APP_SECRET` - App secret
/// - `META_REDIRECT_URI` - OAuth redirect URI
/// - `META_API_VERSION` - Graph API version (default `v19.0`)
/// - `META_GRAPH_URL`, `META_TIMEOUT`, `META_MAX_RETRIES`, `META_CACHE_TTL`,
///   `META_RATE_LIMIT`, `META_APPSECRET_PROOF`
pub fn create_client_from_env() -> MetaResult<MetaBusinessClient> {
    let config = MetaConfig::from_env()?;
    create_client(config)
}
