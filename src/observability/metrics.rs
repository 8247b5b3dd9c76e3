//! Counters for Graph calls.
//!
//! Per-endpoint figures are keyed by the endpoint template produced by
//! [`endpoint_key`](super::endpoint_key), so `/act_1/campaigns` and
//! `/act_2/campaigns` share one entry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Request figures for one endpoint template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointStats {
    /// Calls dispatched, retries included once
    pub requests: u64,
    /// Calls that ended in an error
    pub errors: u64,
    /// Summed wall time in milliseconds
    pub total_ms: u64,
    /// Slowest call in milliseconds
    pub max_ms: u64,
}

impl EndpointStats {
    /// Mean latency of completed calls
    pub fn avg_ms(&self) -> u64 {
        if self.requests == 0 {
            0
        } else {
            self.total_ms / self.requests
        }
    }

    /// Share of calls that failed
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.errors as f64 / self.requests as f64
        }
    }
}

/// Metrics collector shared by clones of a client
#[derive(Debug, Default)]
pub struct MetricsCollector {
    endpoints: RwLock<HashMap<String, EndpointStats>>,
    rate_limit_hits: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    retries: AtomicU64,
    in_flight: AtomicU64,
    peak_usage_pct: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dispatched call
    pub fn record_request_start(&self, endpoint: &str) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        self.endpoints
            .write()
            .entry(endpoint.to_string())
            .or_default()
            .requests += 1;
    }

    /// Record the outcome of a dispatched call
    pub fn record_request_end(&self, endpoint: &str, duration_ms: u64, success: bool) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);

        let mut endpoints = self.endpoints.write();
        let stats = endpoints.entry(endpoint.to_string()).or_default();
        stats.total_ms += duration_ms;
        stats.max_ms = stats.max_ms.max(duration_ms);
        if !success {
            stats.errors += 1;
        }
    }

    /// Record a local denial or an upstream throttle
    pub fn record_rate_limit(&self) {
        self.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache lookup
    pub fn record_cache_lookup(&self, hit: bool) {
        let counter = if hit { &self.cache_hits } else { &self.cache_misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a retry attempt
    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a usage percentage reported by Meta's usage headers
    pub fn record_usage(&self, pct: f64) {
        let pct = pct.clamp(0.0, u64::MAX as f64).round() as u64;
        self.peak_usage_pct.fetch_max(pct, Ordering::Relaxed);
    }

    /// Figures for one endpoint template
    pub fn endpoint(&self, endpoint: &str) -> Option<EndpointStats> {
        self.endpoints.read().get(endpoint).cloned()
    }

    /// Calls dispatched to an endpoint template
    pub fn request_count(&self, endpoint: &str) -> u64 {
        self.endpoint(endpoint).map_or(0, |s| s.requests)
    }

    /// Failed calls to an endpoint template
    pub fn error_count(&self, endpoint: &str) -> u64 {
        self.endpoint(endpoint).map_or(0, |s| s.errors)
    }

    /// Rate limit hits
    pub fn rate_limit_hits(&self) -> u64 {
        self.rate_limit_hits.load(Ordering::Relaxed)
    }

    /// Responses served from the cache
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    /// Cacheable lookups that went to the network
    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    /// Retry attempts
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    /// Calls currently awaiting a response
    pub fn in_flight(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Highest usage percentage Meta has reported
    pub fn peak_usage_pct(&self) -> u64 {
        self.peak_usage_pct.load(Ordering::Relaxed)
    }

    /// Copy every figure at once
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            endpoints: self.endpoints.read().clone(),
            rate_limit_hits: self.rate_limit_hits(),
            cache_hits: self.cache_hits(),
            cache_misses: self.cache_misses(),
            retries: self.retries(),
            in_flight: self.in_flight(),
            peak_usage_pct: self.peak_usage_pct(),
        }
    }

    /// Reset all counters except the in-flight gauge
    pub fn reset(&self) {
        self.endpoints.write().clear();
        for counter in [
            &self.rate_limit_hits,
            &self.cache_hits,
            &self.cache_misses,
            &self.retries,
            &self.peak_usage_pct,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of a [`MetricsCollector`]
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Figures per endpoint template
    pub endpoints: HashMap<String, EndpointStats>,
    /// Rate limit hits
    pub rate_limit_hits: u64,
    /// Cache hits
    pub cache_hits: u64,
    /// Cache misses
    pub cache_misses: u64,
    /// Retry attempts
    pub retries: u64,
    /// Calls awaiting a response
    pub in_flight: u64,
    /// Highest reported usage percentage
    pub peak_usage_pct: u64,
}

impl MetricsSnapshot {
    /// Share of cacheable lookups served from the cache
    pub fn cache_hit_ratio(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// Create a shared metrics collector
pub fn create_metrics_collector() -> Arc<MetricsCollector> {
    Arc::new(MetricsCollector::new())
}
