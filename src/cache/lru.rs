//! LRU cache of feed analyses.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::matching::{normalize, FeedAnalysis};
use crate::types::config::CacheConfig;

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

#[derive(Debug, Clone)]
struct CachedAnalysis {
    analysis: FeedAnalysis,
    cached_at: Instant,
}

impl CachedAnalysis {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() >= ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Recently computed analyses, keyed by normalised feed and snapshot version.
///
/// Entries from an older snapshot are never returned because the version is
/// part of the key; they age out through LRU eviction or TTL.
pub struct AnalysisCache {
    cache: LruCache<String, CachedAnalysis>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl AnalysisCache {
    /// A zero capacity falls back to 256 entries.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            cache: LruCache::new(cap),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Cache described by configuration, or `None` when disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.capacity, Duration::from_secs(config.ttl_secs)))
    }

    /// SHA-256 of the normalised feed plus the snapshot version.
    pub fn cache_key(feed: &str, snapshot_version: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(normalize(feed).as_bytes());
        hasher.update([0u8]);
        hasher.update(snapshot_version.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns a live entry, dropping it if expired.
    pub fn get(&mut self, key: &str) -> Option<&FeedAnalysis> {
        match self.cache.peek(key).map(|c| c.is_expired(self.ttl)) {
            Some(true) => {
                self.cache.pop(key);
                self.misses += 1;
                None
            }
            Some(false) => {
                self.hits += 1;
                self.cache.get(key).map(|c| &c.analysis)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: String, analysis: FeedAnalysis) {
        self.cache.put(
            key,
            CachedAnalysis {
                analysis,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
