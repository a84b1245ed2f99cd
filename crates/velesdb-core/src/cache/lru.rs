//! Thread-safe LRU cache with O(1) operations, backed by an `IndexMap`.

#![allow(clippy::cast_precision_loss)]


use indexmap::IndexMap;
use parking_lot::RwLock;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate in `[0.0, 1.0]`.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe LRU cache with O(1) amortized insert/get/remove.
///
/// `IndexMap` preserves insertion order (front = least recently used, back =
/// most recently used), so eviction is a `shift_remove_index(0)` and a
/// recency bump is a remove-then-reinsert at the back.
pub struct LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    capacity: usize,
    inner: RwLock<IndexMap<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a new cache with the given capacity. A capacity of `0` means
    /// every insert immediately evicts itself.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(IndexMap::with_capacity(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Inserts a key-value pair, evicting the least recently used entry if at capacity.
    pub fn insert(&self, key: K, value: V) {
        let mut inner = self.inner.write();

        if inner.shift_remove(&key).is_some() {
            inner.insert(key, value);
            return;
        }

        if inner.len() >= self.capacity {
            if inner.shift_remove_index(0).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        inner.insert(key, value);
    }

    /// Gets a value by key, bumping it to most-recently-used on a hit.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let value = {
            let inner = self.inner.read();
            inner.get(key).cloned()
        };

        match value {
            Some(v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.move_to_back(key, &v);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Gets a value without affecting recency or hit/miss counters.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        let inner = self.inner.read();
        inner.get(key).cloned()
    }

    /// Removes a key from the cache, if present.
    pub fn remove(&self, key: &K) {
        let mut inner = self.inner.write();
        inner.swap_remove(key);
    }

    /// Removes every entry for which `predicate` returns true. Used by the
    /// result cache to sweep expired entries.
    pub fn retain(&self, mut predicate: impl FnMut(&K, &V) -> bool) {
        let mut inner = self.inner.write();
        inner.retain(|k, v| predicate(k, v));
    }

    /// Clears all entries and resets eviction bookkeeping; hit/miss counters survive.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.clear();
    }

    /// Current hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn move_to_back(&self, key: &K, value: &V) {
        let mut inner = self.inner.write();
        inner.shift_remove(key);
        inner.insert(key.clone(), value.clone());
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(10_000)
    }
}
