//! Time-bounded result cache.
//!
//! Caches the final result cards keyed by the normalised request
//! `(query, vibe, tier, total_k)`. Storage is pluggable through
//! [`CacheStore`] (a bounded [`moka`] cache by default) and time comes from
//! an injectable [`Clock`], so expiry is checked by [`ResultCache`] itself
//! and tests can move time forward with [`ManualClock`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;

use crate::types::{PreferTier, ResultCard};

/// Maximum number of cached result lists in the default store.
const MAX_CACHE_ENTRIES: u64 = 256;

/// Composite cache key: normalised query and vibe plus the request shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    vibe: String,
    tier: PreferTier,
    total_k: usize,
}

impl CacheKey {
    /// Build a key. Query and vibe are trimmed and lowercased.
    pub fn new(query: &str, vibe: &str, tier: PreferTier, total_k: usize) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            vibe: vibe.trim().to_lowercase(),
            tier,
            total_k,
        }
    }
}

/// A stored result list and when it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub cards: Vec<ResultCard>,
    pub stored_at: Instant,
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.start + offset
    }
}

/// Whole-entry key/value storage behind [`ResultCache`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;
    async fn insert(&self, key: CacheKey, entry: CacheEntry);
    async fn invalidate(&self, key: &CacheKey);
}

/// Bounded in-memory store backed by [`moka::future::Cache`].
#[derive(Clone)]
pub struct MokaStore {
    inner: Cache<CacheKey, CacheEntry>,
}

impl MokaStore {
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_entries).build(),
        }
    }
}

impl Default for MokaStore {
    fn default() -> Self {
        Self::new(MAX_CACHE_ENTRIES)
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner.get(key).await
    }

    async fn insert(&self, key: CacheKey, entry: CacheEntry) {
        self.inner.insert(key, entry).await;
    }

    async fn invalidate(&self, key: &CacheKey) {
        self.inner.invalidate(key).await;
    }
}

/// Result cache with TTL enforced against an injectable clock.
///
/// A TTL of zero disables the cache: lookups always miss and nothing is
/// stored.
#[derive(Clone)]
pub struct ResultCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    store: Arc<dyn CacheStore>,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>, store: Arc<dyn CacheStore>) -> Self {
        Self { ttl, clock, store }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Look up a fresh entry. An expired entry is removed and reported as a
    /// miss.
    pub async fn get(&self, key: &CacheKey) -> Option<Vec<ResultCard>> {
        if !self.is_enabled() {
            return None;
        }
        let entry = self.store.get(key).await?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        if age > self.ttl {
            tracing::trace!(?age, "cache entry expired");
            self.store.invalidate(key).await;
            return None;
        }
        Some(entry.cards)
    }

    /// Store a result list stamped with the current time.
    pub async fn insert(&self, key: CacheKey, cards: Vec<ResultCard>) {
        if !self.is_enabled() {
            return;
        }
        let entry = CacheEntry {
            cards,
            stored_at: self.clock.now(),
        };
        self.store.insert(key, entry).await;
    }
}
