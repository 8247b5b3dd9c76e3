//! Response cache for Graph API reads.
//!
//! Entries are keyed by a normalized request signature (method, path and
//! sorted query parameters) scoped to the access token that fetched them,
//! and expire after a fixed TTL. There is no size bound; the working set of
//! a campaign dashboard is small.

use crate::types::Params;
use async_trait::async_trait;
use http::Method;
use parking_lot::RwLock;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Normalized request signature
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from a request.
    ///
    /// `Params` is ordered, so two requests with the same parameters in a
    /// different insertion order share a key.
    pub fn new(method: &Method, path: &str, params: &Params) -> Self {
        let path = format!("/{}", path.trim_start_matches('/'));
        let query = params.to_query_string();
        if query.is_empty() {
            Self(format!("{} {}", method, path))
        } else {
            Self(format!("{} {}?{}", method, path, query))
        }
    }

    /// Scope the key to an access token.
    ///
    /// Responses fetched for one user never answer requests made with
    /// another user's token.
    pub fn for_token(self, access_token: &str) -> Self {
        let digest = Sha256::digest(access_token.as_bytes());
        Self(format!("{} #{}", self.0, hex::encode(&digest[..8])))
    }

    /// The key as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key/value store with TTL used by the client.
///
/// Implementations may be in-process or backed by an external store.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Get a live entry
    async fn get(&self, key: &CacheKey) -> Option<Value>;

    /// Store an entry for `ttl`
    async fn set(&self, key: CacheKey, value: Value, ttl: Duration);

    /// Remove one entry
    async fn invalidate(&self, key: &CacheKey);

    /// Remove every entry
    async fn clear(&self);
}

/// A cached response
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Entry key
    pub key: CacheKey,
    /// Cached response body
    pub value: Value,
    /// When the entry was stored
    pub stored_at: Instant,
    /// How long the entry stays valid
    pub ttl: Duration,
}

impl CacheEntry {
    /// Whether the entry is past its TTL
    pub fn is_expired(&self) -> bool {
        self.stored_at.elapsed() >= self.ttl
    }
}

/// In-memory TTL cache
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }
}

#[async_trait]
impl ResponseCache for InMemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Value> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        debug!(key = %key, "Evicting expired cache entry");
        self.entries.write().remove(key);
        None
    }

    async fn set(&self, key: CacheKey, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at: Instant::now(),
            ttl,
        };
        self.entries.write().insert(key, entry);
    }

    async fn invalidate(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    async fn clear(&self) {
        self.entries.write().clear();
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entries", &self.len())
            .finish()
    }
}
