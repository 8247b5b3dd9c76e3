//! Meta Business client implementation.
//!
//! Owns the token store, response cache, rate limiter and transport, and
//! routes every Graph call through them.

use crate::auth::{AuthManager, InMemoryTokenStore, OAuthHelper, TokenSet, TokenStore};
use crate::cache::{CacheKey, InMemoryCache, ResponseCache};
use crate::config::MetaConfig;
use crate::errors::{AuthenticationError, MetaError, MetaResult, TransportError, ValidationError};
use crate::observability::{
    create_metrics_collector, create_request_span, endpoint_key, record_cache_hit, record_error,
    record_success, record_usage, redact_token, redact_url, MetricsCollector, RequestTrace,
};
use crate::resilience::usage::USAGE_WARN_PCT;
use crate::resilience::{
    with_retry, DefaultRetryPolicy, RateLimiter, RetryConfig, UsageReport, APP_BUCKET,
};
use crate::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
use crate::types::batch::parse_batch_response;
use crate::types::{BatchRequestItem, BatchResponseItem, RequestOptions, MAX_BATCH_SIZE};
use http::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn, Instrument, Span};

/// Client for the Meta Graph and Marketing APIs
#[derive(Clone)]
pub struct MetaBusinessClient {
    config: Arc<MetaConfig>,
    auth: AuthManager,
    oauth: OAuthHelper,
    transport: Arc<dyn HttpTransport>,
    cache: Arc<dyn ResponseCache>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryConfig,
    metrics: Arc<MetricsCollector>,
}

impl MetaBusinessClient {
    /// Create a new client with the given configuration
    pub fn new(config: MetaConfig) -> MetaResult<Self> {
        MetaBusinessClientBuilder::new(config).build()
    }

    /// Create a new client with a custom transport
    pub fn with_transport(config: MetaConfig, transport: Arc<dyn HttpTransport>) -> MetaResult<Self> {
        MetaBusinessClientBuilder::new(config)
            .transport(transport)
            .build()
    }

    /// Start a builder to swap in custom collaborators
    pub fn builder(config: MetaConfig) -> MetaBusinessClientBuilder {
        MetaBusinessClientBuilder::new(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    /// Get the authentication manager
    pub fn auth_manager(&self) -> &AuthManager {
        &self.auth
    }

    /// Get the rate limiter
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Get the response cache
    pub fn cache(&self) -> &Arc<dyn ResponseCache> {
        &self.cache
    }

    /// Get the metrics collector
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    // ---- OAuth -----------------------------------------------------------

    /// Build the login dialog URL the user is redirected to
    pub fn get_auth_url(&self, scopes: &[&str], state: &str) -> String {
        self.oauth.authorization_url(scopes, state)
    }

    /// Exchange an authorization code for tokens and store them
    #[instrument(skip(self, code))]
    pub async fn exchange_code_for_token(&self, code: &str) -> MetaResult<TokenSet> {
        let form = self.oauth.code_exchange_form(code);
        self.token_grant("authorization_code", form, false).await
    }

    /// Use a refresh token to obtain new tokens.
    ///
    /// A rejected refresh clears the stored token.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> MetaResult<TokenSet> {
        let form = self.oauth.refresh_form(refresh_token);
        self.token_grant("refresh_token", form, true).await
    }

    /// Exchange a short-lived user token for a long-lived one.
    ///
    /// A rejected exchange clears the stored token.
    #[instrument(skip(self, short_lived_token))]
    pub async fn exchange_for_long_lived_token(&self, short_lived_token: &str) -> MetaResult<TokenSet> {
        let form = self.oauth.long_lived_form(short_lived_token);
        self.token_grant("fb_exchange_token", form, true).await
    }

    async fn token_grant(
        &self,
        grant: &'static str,
        form: Vec<(String, String)>,
        clear_on_reject: bool,
    ) -> MetaResult<TokenSet> {
        let request = TransportRequest::form(self.oauth.token_url(), self.auth.base_headers(), form)
            .with_timeout(self.config.timeout);

        let result = with_retry(&self.retry, &DefaultRetryPolicy, |attempt| {
            let request = request.clone();
            async move {
                if attempt > 1 {
                    self.metrics.record_retry();
                }
                let response = self.send_with_timeout(request).await?;
                if response.is_success() {
                    return response.into_json();
                }
                Err(oauth_error(response))
            }
        })
        .await;

        let body = match result {
            Ok(body) => body,
            Err(error) => {
                warn!(grant, error = %error, "Token request failed");
                if clear_on_reject && matches!(error, MetaError::Authentication(_)) {
                    self.auth.store().clear();
                }
                return Err(error);
            }
        };

        let tokens = TokenSet::from_response(&body)?;
        self.auth.store().set(tokens.clone());
        info!(
            grant,
            token = %redact_token(tokens.expose()),
            expires_in = ?tokens.expires_in,
            "Access token obtained"
        );
        Ok(tokens)
    }

    // ---- Token store accessors -------------------------------------------

    /// Store a bare access token with no known expiry
    pub fn set_access_token(&self, token: impl Into<String>) {
        self.auth.store().set(TokenSet::new(token));
    }

    /// The stored access token
    pub fn access_token(&self) -> Option<SecretString> {
        self.auth.store().get().map(|t| t.access_token)
    }

    /// Forget the stored tokens; later requests fail fast
    pub fn clear_access_token(&self) {
        self.auth.store().clear();
    }

    /// Store a full token set
    pub fn set_token_set(&self, tokens: TokenSet) {
        self.auth.store().set(tokens);
    }

    /// The stored token set
    pub fn token_set(&self) -> Option<TokenSet> {
        self.auth.store().get()
    }

    /// Whether a non-expired token is stored
    pub fn is_authenticated(&self) -> bool {
        self.auth.has_valid_token()
    }

    // ---- Dispatch --------------------------------------------------------

    /// Execute a Graph call and return the JSON body.
    ///
    /// Preflight token check, cache lookup, rate check, dispatch with a
    /// single retry on transient failure, then cache store.
    pub async fn make_request(&self, path: &str, options: RequestOptions) -> MetaResult<Value> {
        let trace = RequestTrace::new(options.method.as_str(), endpoint_key(path));
        let span = create_request_span(&trace);

        let result = self
            .execute(path, options, &trace, &span)
            .instrument(span.clone())
            .await;

        match &result {
            Ok(_) => record_success(&span),
            Err(error) => record_error(&span, error),
        }
        result
    }

    /// Execute a Graph call and deserialize the body into `T`
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> MetaResult<T> {
        let value = self.make_request(path, options).await?;
        serde_json::from_value(value).map_err(|e| MetaError::Unexpected {
            status: None,
            message: format!("Failed to deserialize response: {}", e),
        })
    }

    async fn execute(
        &self,
        path: &str,
        options: RequestOptions,
        trace: &RequestTrace,
        span: &Span,
    ) -> MetaResult<Value> {
        let tokens = self.auth.valid_token()?;

        let cacheable = options.is_cacheable();
        let key = CacheKey::new(&options.method, path, &options.params).for_token(tokens.expose());
        if cacheable {
            let cached = self.cache.get(&key).await;
            self.metrics.record_cache_lookup(cached.is_some());
            record_cache_hit(span, cached.is_some());
            if let Some(value) = cached {
                debug!(key = %key, "Cache hit");
                return Ok(value);
            }
        }

        check_cancelled(options.cancel.as_ref())?;

        let bucket = RateLimiter::bucket_for_path(path);
        if let Err(error) = self.rate_limiter.check(&bucket) {
            self.metrics.record_rate_limit();
            return Err(error);
        }

        let mut params = options.params.clone();
        params.insert_opt("appsecret_proof", self.auth.appsecret_proof(&tokens)?);
        let query = params.to_query_string();
        let url = if query.is_empty() {
            self.config.build_url(path)
        } else {
            format!("{}?{}", self.config.build_url(path), query)
        };

        let mut request = TransportRequest::new(
            options.method.clone(),
            url,
            self.auth.build_headers(&tokens)?,
        )
        .with_timeout(options.timeout.unwrap_or(self.config.timeout));
        if let Some(data) = options.data.clone() {
            request = request.with_json(data);
        }

        debug!(url = %redact_url(&request.url), "Dispatching request");
        let value = self
            .dispatch(request, &tokens, &bucket, trace, span, options.cancel.as_ref())
            .await?;

        if cacheable {
            self.cache.set(key, value.clone(), self.config.cache_ttl).await;
        } else if options.method != Method::GET {
            self.cache.clear().await;
        }

        Ok(value)
    }

    /// Send with bounded retry, usage tracking and cancellation
    async fn dispatch(
        &self,
        request: TransportRequest,
        sent: &TokenSet,
        bucket: &str,
        trace: &RequestTrace,
        span: &Span,
        cancel: Option<&CancellationToken>,
    ) -> MetaResult<Value> {
        self.metrics.record_request_start(&trace.endpoint);

        let send = with_retry(&self.retry, &DefaultRetryPolicy, |attempt| {
            let request = request.clone();
            async move {
                if attempt > 1 {
                    self.metrics.record_retry();
                }
                let response = self.send_with_timeout(request).await?;
                if let Some(usage) = UsageReport::from_headers(&response.headers) {
                    record_usage(span, &usage);
                    self.apply_usage(bucket, &usage);
                }
                response.into_json()
            }
        });

        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(MetaError::Transport(TransportError::Aborted)),
                result = send => result,
            },
            None => send.await,
        };

        self.metrics
            .record_request_end(&trace.endpoint, trace.elapsed_ms(), result.is_ok());

        if let Err(error) = &result {
            if matches!(error, MetaError::RateLimit(_)) {
                self.metrics.record_rate_limit();
            }
            if error.invalidates_token() && self.auth.store().clear_if_current(sent.expose()) {
                warn!(
                    token = %redact_token(sent.expose()),
                    error = %error,
                    "Access token rejected; cleared stored token"
                );
                self.cache.clear().await;
            }
        }

        result
    }

    async fn send_with_timeout(&self, request: TransportRequest) -> MetaResult<TransportResponse> {
        let timeout = request.timeout.unwrap_or(self.config.timeout);
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(MetaError::Transport(TransportError::Timeout)),
        }
    }

    fn apply_usage(&self, bucket: &str, usage: &UsageReport) {
        let pct = usage.max_pct();
        self.metrics.record_usage(pct);
        if pct >= USAGE_WARN_PCT {
            warn!(
                bucket,
                usage_pct = pct,
                regain_access_secs = usage.regain_access_after.map(|d| d.as_secs()),
                "Meta usage is high"
            );
        }
        if usage.is_exhausted() {
            self.rate_limiter.exhaust(bucket);
            if usage.app_pct.is_some_and(|p| p >= 100.0) {
                self.rate_limiter.exhaust(APP_BUCKET);
            }
        }
    }

    /// Execute a Graph batch call.
    ///
    /// The result has the same length and order as `items`. Per-item
    /// failures are returned in place; only a failure of the batch call
    /// itself is an error.
    pub async fn batch_request(&self, items: &[BatchRequestItem]) -> MetaResult<Vec<BatchResponseItem>> {
        self.batch_request_with(items, None).await
    }

    /// [`batch_request`](Self::batch_request) with a cancellation token
    #[instrument(skip(self, items, cancel), fields(items = items.len()))]
    pub async fn batch_request_with(
        &self,
        items: &[BatchRequestItem],
        cancel: Option<CancellationToken>,
    ) -> MetaResult<Vec<BatchResponseItem>> {
        if items.is_empty() || items.len() > MAX_BATCH_SIZE {
            return Err(ValidationError::InvalidBatch {
                message: format!(
                    "batch must contain between 1 and {} requests, got {}",
                    MAX_BATCH_SIZE,
                    items.len()
                ),
            }
            .into());
        }

        let tokens = self.auth.valid_token()?;
        check_cancelled(cancel.as_ref())?;

        if let Err(error) = self.rate_limiter.check_n(APP_BUCKET, items.len() as u32) {
            self.metrics.record_rate_limit();
            return Err(error);
        }

        let batch = serde_json::to_string(items).map_err(|e| MetaError::Unexpected {
            status: None,
            message: format!("Failed to encode batch: {}", e),
        })?;
        let mut form = vec![
            ("batch".to_string(), batch),
            ("include_headers".to_string(), "false".to_string()),
        ];
        if let Some(proof) = self.auth.appsecret_proof(&tokens)? {
            form.push(("appsecret_proof".to_string(), proof));
        }

        let request = TransportRequest::form(
            self.config.build_url(""),
            self.auth.build_headers(&tokens)?,
            form,
        )
        .with_timeout(self.config.timeout);

        let trace = RequestTrace::new("POST", "/batch");
        let span = create_request_span(&trace);
        let result = self
            .dispatch(request, &tokens, APP_BUCKET, &trace, &span, cancel.as_ref())
            .instrument(span.clone())
            .await;

        let value = match result {
            Ok(value) => {
                record_success(&span);
                value
            }
            Err(error) => {
                record_error(&span, &error);
                return Err(error);
            }
        };

        let responses = parse_batch_response(value)?;
        if responses.len() != items.len() {
            return Err(MetaError::Unexpected {
                status: None,
                message: format!(
                    "Batch response has {} items for {} requests",
                    responses.len(),
                    items.len()
                ),
            });
        }

        if items.iter().any(|item| !item.method.eq_ignore_ascii_case("GET")) {
            self.cache.clear().await;
        }

        Ok(responses)
    }
}

fn check_cancelled(cancel: Option<&CancellationToken>) -> MetaResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(MetaError::Transport(TransportError::Aborted)),
        _ => Ok(()),
    }
}

/// Classify a failed token endpoint response.
///
/// Any 4xx from the token endpoint is an authentication failure carrying
/// Meta's message; 5xx keeps its server classification so it is retried.
fn oauth_error(response: TransportResponse) -> MetaError {
    let status = response.status;
    let error = MetaError::from_response(status, &response.text(), response.retry_after());
    if !(400..500).contains(&status) || matches!(error, MetaError::RateLimit(_)) {
        return error;
    }
    let code = error.graph_code();
    MetaError::Authentication(AuthenticationError::OAuth {
        message: error.to_string(),
        code,
    })
}

impl std::fmt::Debug for MetaBusinessClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaBusinessClient")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .field("rate_limiter", &self.rate_limiter)
            .finish()
    }
}

/// Builder for [`MetaBusinessClient`]
pub struct MetaBusinessClientBuilder {
    config: MetaConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    token_store: Option<Arc<dyn TokenStore>>,
    cache: Option<Arc<dyn ResponseCache>>,
    retry: Option<RetryConfig>,
}

impl MetaBusinessClientBuilder {
    /// Create a builder
    pub fn new(config: MetaConfig) -> Self {
        Self {
            config,
            transport: None,
            token_store: None,
            cache: None,
            retry: None,
        }
    }

    /// Use a custom transport
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom token store
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Use a custom response cache
    pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Override retry backoff
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Build the client
    pub fn build(self) -> MetaResult<MetaBusinessClient> {
        let config = Arc::new(self.config);

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(config.timeout)?),
        };
        let store = self
            .token_store
            .unwrap_or_else(|| Arc::new(InMemoryTokenStore::new()));
        let cache = self.cache.unwrap_or_else(|| Arc::new(InMemoryCache::new()));
        let retry = self
            .retry
            .unwrap_or_default()
            .max_retries(config.max_retries);

        Ok(MetaBusinessClient {
            auth: AuthManager::new(config.clone(), store),
            oauth: OAuthHelper::new(config.clone()),
            transport,
            cache,
            rate_limiter: Arc::new(RateLimiter::with_config(config.rate_limit.clone())),
            retry,
            metrics: create_metrics_collector(),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetaConfigBuilder;
    use crate::mocks::MockHttpTransport;

    fn test_client() -> MetaBusinessClient {
        let config = MetaConfigBuilder::new()
            .app_id("1")
            .app_secret("s")
            .build_unchecked();
        MetaBusinessClient::with_transport(config, Arc::new(MockHttpTransport::new())).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let config = MetaConfigBuilder::new()
            .app_id("1")
            .app_secret("s")
            .build()
            .unwrap();
        let client = MetaBusinessClient::new(config).unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(
            client.config().timeout,
            std::time::Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_token_accessors() {
        let client = test_client();
        client.set_access_token("EAAB");
        assert!(client.is_authenticated());
        assert!(client.access_token().is_some());

        let cloned = client.clone();
        cloned.clear_access_token();
        assert!(!client.is_authenticated());
        assert!(client.token_set().is_none());
    }

    #[test]
    fn test_retry_clamped_from_config() {
        let config = MetaConfigBuilder::new()
            .app_id("1")
            .app_secret("s")
            .max_retries(0)
            .build_unchecked();
        let client = MetaBusinessClient::with_transport(config, Arc::new(MockHttpTransport::new()))
            .unwrap();
        assert_eq!(client.retry.effective_max_retries(), 0);
    }
}
