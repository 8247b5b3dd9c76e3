//! Fixed-window request budgets per ad account.
//!
//! Requests are denied, not queued, once a bucket's budget for the current
//! window is spent.

use crate::errors::{MetaResult, RateLimitError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Bucket used for calls that are not scoped to an ad account.
pub const APP_BUCKET: &str = "app";

/// Configuration for rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests allowed per bucket per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
    /// Whether budgets are enforced at all
    pub enabled: bool,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 200,
            window: Duration::from_secs(3600),
            enabled: true,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-window budget
    pub fn max_requests(mut self, n: u32) -> Self {
        self.max_requests = n;
        self
    }

    /// Set the window length
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Enable or disable enforcement
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Meta's development-tier ads management budget
    pub fn development_tier() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(300),
            enabled: true,
        }
    }
}

/// Budget state for one bucket
#[derive(Debug, Clone)]
struct RateBudget {
    window_start: Instant,
    count: u32,
    limit: u32,
}

impl RateBudget {
    fn new(limit: u32) -> Self {
        Self {
            window_start: Instant::now(),
            count: 0,
            limit,
        }
    }

    fn roll(&mut self, window: Duration) {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= window {
            self.window_start = now;
            self.count = 0;
        }
    }

    fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.count)
    }

    fn time_until_reset(&self, window: Duration) -> Duration {
        window.saturating_sub(Instant::now().duration_since(self.window_start))
    }
}

/// Rate limiter implementation
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, RateBudget>>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    /// Create a new rate limiter with default configuration
    pub fn new() -> Self {
        Self::with_config(RateLimiterConfig::default())
    }

    /// Create a new rate limiter with custom configuration
    pub fn with_config(config: RateLimiterConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Derive the bucket for a Graph path: the ad account it targets, or the
    /// app-wide bucket.
    pub fn bucket_for_path(path: &str) -> String {
        path.split(['/', '?'])
            .find(|segment| segment.starts_with("act_"))
            .map(str::to_string)
            .unwrap_or_else(|| APP_BUCKET.to_string())
    }

    /// Consume one unit of budget from a bucket
    pub fn check(&self, bucket: &str) -> MetaResult<()> {
        self.check_n(bucket, 1)
    }

    /// Consume `n` units of budget from a bucket, or deny
    pub fn check_n(&self, bucket: &str, n: u32) -> MetaResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let mut buckets = self.buckets.lock();
        let budget = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| RateBudget::new(self.config.max_requests));
        budget.roll(self.config.window);

        if budget.count.saturating_add(n) > budget.limit {
            let retry_after = budget.time_until_reset(self.config.window);
            warn!(
                bucket,
                used = budget.count,
                limit = budget.limit,
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            return Err(RateLimitError::Exceeded {
                bucket: bucket.to_string(),
                retry_after: Some(retry_after),
            }
            .into());
        }

        budget.count += n;
        Ok(())
    }

    /// Spend the rest of a bucket's window, e.g. after Meta reports 100% usage
    pub fn exhaust(&self, bucket: &str) {
        let mut buckets = self.buckets.lock();
        let budget = buckets
            .entry(bucket.to_string())
            .or_insert_with(|| RateBudget::new(self.config.max_requests));
        budget.roll(self.config.window);
        budget.count = budget.limit;
        debug!(bucket, "Bucket exhausted from usage headers");
    }

    /// Set a custom limit for a specific bucket
    pub fn configure_bucket(&self, bucket: &str, limit: u32) {
        let mut buckets = self.buckets.lock();
        buckets.insert(bucket.to_string(), RateBudget::new(limit));
    }

    /// Remaining budget for a bucket in the current window
    pub fn remaining(&self, bucket: &str) -> u32 {
        let mut buckets = self.buckets.lock();
        match buckets.get_mut(bucket) {
            Some(budget) => {
                budget.roll(self.config.window);
                budget.remaining()
            }
            None => self.config.max_requests,
        }
    }

    /// Reset all budgets
    pub fn reset(&self) {
        let mut buckets = self.buckets.lock();
        for budget in buckets.values_mut() {
            budget.count = 0;
            budget.window_start = Instant::now();
        }
        debug!("Rate limits reset");
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("buckets", &self.buckets.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MetaError;

    #[test]
    fn test_bucket_for_path() {
        assert_eq!(RateLimiter::bucket_for_path("/act_123/campaigns"), "act_123");
        assert_eq!(RateLimiter::bucket_for_path("act_9"), "act_9");
        assert_eq!(RateLimiter::bucket_for_path("/me/adaccounts"), APP_BUCKET);
        assert_eq!(RateLimiter::bucket_for_path("/12345/insights"), APP_BUCKET);
    }

    #[test]
    fn test_check_success() {
        let limiter = RateLimiter::with_config(RateLimiterConfig::new().max_requests(10));

        for _ in 0..5 {
            assert!(limiter.check("act_1").is_ok());
        }
        assert_eq!(limiter.remaining("act_1"), 5);
    }

    #[test]
    fn test_check_exhausted() {
        let limiter = RateLimiter::with_config(RateLimiterConfig::new().max_requests(2));

        assert!(limiter.check("act_1").is_ok());
        assert!(limiter.check("act_1").is_ok());

        let err = limiter.check("act_1").unwrap_err();
        assert_eq!(err.to_string(), "Rate limit exceeded");
        assert!(matches!(
            err,
            MetaError::RateLimit(RateLimitError::Exceeded { ref bucket, .. }) if bucket == "act_1"
        ));

        // Other buckets are independent
        assert!(limiter.check("act_2").is_ok());
    }

    #[test]
    fn test_check_n_is_all_or_nothing() {
        let limiter = RateLimiter::with_config(RateLimiterConfig::new().max_requests(5));

        assert!(limiter.check_n(APP_BUCKET, 4).is_ok());
        assert!(limiter.check_n(APP_BUCKET, 2).is_err());
        assert_eq!(limiter.remaining(APP_BUCKET), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::with_config(
            RateLimiterConfig::new()
                .max_requests(1)
                .window(Duration::from_secs(60)),
        );

        assert!(limiter.check("act_1").is_ok());
        let err = limiter.check("act_1").unwrap_err();
        assert!(err.retry_after().unwrap() <= Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(limiter.check("act_1").is_ok());
    }

    #[test]
    fn test_disabled_never_denies() {
        let limiter = RateLimiter::with_config(
            RateLimiterConfig::new().max_requests(1).enabled(false),
        );
        for _ in 0..10 {
            assert!(limiter.check("act_1").is_ok());
        }
    }

    #[test]
    fn test_exhaust_and_reset() {
        let limiter = RateLimiter::with_config(RateLimiterConfig::new().max_requests(10));

        limiter.exhaust("act_1");
        assert_eq!(limiter.remaining("act_1"), 0);
        assert!(limiter.check("act_1").is_err());

        limiter.reset();
        assert_eq!(limiter.remaining("act_1"), 10);
    }

    #[test]
    fn test_configure_bucket() {
        let limiter = RateLimiter::new();
        limiter.configure_bucket("act_1", 3);
        assert_eq!(limiter.remaining("act_1"), 3);
        assert_eq!(limiter.remaining("act_2"), 200);
    }
}
