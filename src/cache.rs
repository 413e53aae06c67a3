//! Route resolution caching
//!
//! Memoizes which route a path resolved to (or that none did), with LRU
//! eviction. The route table clears it whenever a route is registered.

use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub invalidations: usize,
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

/// Path to route-index cache
///
/// Default capacity: 1000 entries.
#[derive(Debug)]
pub struct RouteCache {
    entries: LruCache<String, Option<usize>>,
    stats: CacheStats,
}

impl RouteCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(cap) => cap,
        None => NonZeroUsize::MIN,
    };

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn clear(&mut self) {
        trace_log!("Clearing route cache");
        self.entries.clear();
        self.stats.invalidations += 1;
    }

    /// Cached resolution for `path`
    ///
    /// The outer `Option` is the cache lookup, the inner one the resolution
    /// (`Some(None)` means the path is known to match nothing).
    pub fn get(&mut self, path: &str) -> Option<Option<usize>> {
        match self.entries.get(path) {
            Some(index) => {
                self.stats.hits += 1;
                trace_log!("Route cache hit for path: '{}'", path);
                Some(*index)
            }
            None => {
                self.stats.misses += 1;
                trace_log!("Route cache miss for path: '{}'", path);
                None
            }
        }
    }

    pub fn insert(&mut self, path: String, index: Option<usize>) {
        self.entries.push(path, index);
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}
