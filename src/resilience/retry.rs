//! Bounded retry with exponential backoff for transient failures.
//!
//! At most one retry is ever attempted; Meta throttles aggressively and a
//! second retry mostly burns budget.

use crate::errors::{MetaError, MetaResult};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound on retries regardless of configuration.
pub const MAX_RETRIES_CAP: u32 = 1;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (clamped to [`MAX_RETRIES_CAP`])
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
    /// Whether to add jitter to delays
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum retries
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set initial delay
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub fn multiplier(mut self, m: f64) -> Self {
        self.multiplier = m;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Retries that will actually be attempted
    pub fn effective_max_retries(&self) -> u32 {
        self.max_retries.min(MAX_RETRIES_CAP)
    }

    /// Calculate delay for a given attempt number (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.with_jitter {
            capped_delay * rand::thread_rng().gen_range(0.5..1.5)
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Retry policy for determining if an error should be retried
pub trait RetryPolicy: Send + Sync {
    /// Check if an error is retryable
    fn is_retryable(&self, error: &MetaError) -> bool;

    /// Get the retry delay for an error (may override calculated delay)
    fn get_retry_delay(&self, error: &MetaError) -> Option<Duration>;
}

/// Default retry policy: 5xx and timeouts only
#[derive(Debug, Clone, Default)]
pub struct DefaultRetryPolicy;

impl RetryPolicy for DefaultRetryPolicy {
    fn is_retryable(&self, error: &MetaError) -> bool {
        error.is_retryable()
    }

    fn get_retry_delay(&self, _error: &MetaError) -> Option<Duration> {
        None
    }
}

/// Execute an operation with bounded retry.
///
/// `operation` receives the 1-based attempt number.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    policy: &dyn RetryPolicy,
    operation: F,
) -> MetaResult<T>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = MetaResult<T>>,
{
    let max_retries = config.effective_max_retries();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) => {
                let retryable = policy.is_retryable(&error);
                if attempt > max_retries || !retryable {
                    if retryable {
                        warn!(
                            attempt,
                            max_retries,
                            error = %error,
                            "Operation failed after retries"
                        );
                    }
                    return Err(error);
                }

                let delay = policy
                    .get_retry_delay(&error)
                    .unwrap_or_else(|| config.delay_for_attempt(attempt));

                debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying after transient error"
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
