//! Resilience patterns for the Meta Business client.
//!
//! Provides bounded retry, per-account request budgets and usage-header
//! tracking.

pub mod rate_limiter;
pub mod retry;
pub mod usage;

pub use rate_limiter::{RateLimiter, RateLimiterConfig, APP_BUCKET};
pub use retry::{with_retry, DefaultRetryPolicy, RetryConfig, RetryPolicy, MAX_RETRIES_CAP};
pub use usage::UsageReport;
