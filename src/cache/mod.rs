//! # Response Caching Module
//!
//! Memoizes successful rewrites so identical `(text, axes)` requests skip the
//! upstream call.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | LRU store with per-entry TTL measured from insertion |
//! | [`CacheConfig`] | Capacity and TTL |
//! | [`CacheKey`] | Canonical SHA-256 fingerprint of text and normalized axes |
//! | [`CacheStats`] | Hit/miss/eviction counters |
//!
//! ## Example
//!
//! ```rust
//! use tone_grid::cache::{CacheConfig, CacheKey, CacheStore};
//! use tone_grid::types::ToneAxes;
//! use std::time::Duration;
//!
//! let mut cache = CacheStore::new(CacheConfig::new().with_capacity(500).with_ttl(Duration::from_secs(600)));
//! let key = CacheKey::fingerprint("Hello.", &ToneAxes::default());
//! cache.set(key.clone(), "Hi.");
//! assert_eq!(cache.get(&key).as_deref(), Some("Hi."));
//! ```

mod key;
mod store;

pub use key::CacheKey;
pub use store::{CacheConfig, CacheStats, CacheStore};
