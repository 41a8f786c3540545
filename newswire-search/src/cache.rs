//! In-memory TTL cache for aggregate responses.
//!
//! Keyed by the trimmed, lowercased query plus the per-source cap. Uses
//! [`moka`] for async-friendly concurrent storage. Freshness is judged
//! against [`tokio::time::Instant`] on every read, so an entry is served
//! for exactly `ttl` after insertion and tests can drive expiry with a
//! paused clock.
//!
//! The cache is unbounded and nothing is evicted in the background: a stale
//! entry stays until it is read again, replaced or cleared.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::time::Instant;

use crate::types::AggregateResponse;

/// Composite cache key: normalised query + result cap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Lowercased, trimmed query string.
    query: String,
    max_results: usize,
}

impl CacheKey {
    /// Build a deterministic cache key.
    ///
    /// `"Apple "` and `"apple"` share an entry; different caps do not.
    pub fn new(query: &str, max_results: usize) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            max_results,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: Arc<AggregateResponse>,
    inserted_at: Instant,
}

/// Per-service response cache. Entries are immutable snapshots.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Cache<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl QueryCache {
    /// Cache whose entries stay fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().build(),
            ttl,
        }
    }

    /// Look up a fresh response. Stale entries are evicted and reported as misses.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<AggregateResponse>> {
        let entry = self.entries.get(key).await?;
        if entry.inserted_at.elapsed() < self.ttl {
            return Some(entry.response);
        }
        self.entries.invalidate(key).await;
        None
    }

    /// Store a response, replacing any previous entry for `key`.
    pub async fn insert(&self, key: CacheKey, response: Arc<AggregateResponse>) {
        let entry = CacheEntry {
            response,
            inserted_at: Instant::now(),
        };
        self.entries.insert(key, entry).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
