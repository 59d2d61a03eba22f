//! Capacity- and time-bounded memoization of rewrite results.

use super::key::CacheKey;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 500,
            ttl: Duration::from_secs(600),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub expirations: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Never mutated after insertion; replaced wholesale on `set`.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    inserted_at: Instant,
    /// `None` when `inserted_at + ttl` is past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: now,
            expires_at: now.checked_add(ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// LRU cache whose entries also expire a fixed TTL after insertion.
///
/// Reads refresh recency but never the TTL.
pub struct CacheStore {
    entries: LruCache<CacheKey, CacheEntry>,
    ttl: Duration,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl: config.ttl,
            stats: CacheStats::default(),
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    pub fn set(&mut self, key: CacheKey, value: impl Into<String>) {
        self.set_at(key, value, Instant::now())
    }

    /// `get` against an explicit clock reading.
    pub fn get_at(&mut self, key: &CacheKey, now: Instant) -> Option<String> {
        let expired = match self.entries.peek(key) {
            None => {
                self.stats.misses += 1;
                return None;
            }
            Some(entry) => entry.is_expired(now),
        };
        if expired {
            self.entries.pop(key);
            self.stats.expirations += 1;
            self.stats.misses += 1;
            return None;
        }
        self.stats.hits += 1;
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// `set` against an explicit clock reading.
    pub fn set_at(&mut self, key: CacheKey, value: impl Into<String>, now: Instant) {
        if !self.entries.contains(&key) && self.entries.len() >= self.entries.cap().get() {
            self.purge_expired(now);
        }
        let entry = CacheEntry::new(value.into(), now, self.ttl);
        if let Some((old_key, _)) = self.entries.push(key.clone(), entry) {
            if old_key != key {
                self.stats.evictions += 1;
            }
        }
        self.stats.sets += 1;
    }

    fn purge_expired(&mut self, now: Instant) {
        let stale: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for k in stale {
            self.entries.pop(&k);
            self.stats.expirations += 1;
        }
    }

    /// Age of a live entry, without touching recency.
    pub fn age_of(&self, key: &CacheKey, now: Instant) -> Option<Duration> {
        self.entries
            .peek(key)
            .filter(|e| !e.is_expired(now))
            .map(|e| now.saturating_duration_since(e.inserted_at))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
