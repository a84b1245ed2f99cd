//! Result cache: caches whole search result sets keyed by a fingerprint of
//! the query, so a repeated identical query skips the index walk entirely.
//!
//! Entries carry the collection's write generation at insert time. A mutating
//! operation (insert/delete) bumps the generation; a lookup whose stored
//! generation doesn't match the current one is treated as a miss and evicted,
//! which is cheaper than walking the whole cache on every write.

#[cfg(test)]
mod result_cache_tests;

use crate::filter::Filter;
use crate::point::SearchHit;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use super::lru::LruCache;

/// Fingerprint of a search request, used as the cache key.
pub type Fingerprint = u64;

/// Default number of significant digits a query vector's components are
/// rounded to before hashing, so two floating-point-equal-but-bit-different
/// query vectors (e.g. produced by different call paths) fingerprint the same.
const DEFAULT_SIGNIFICANT_DIGITS: i32 = 6;

/// Rounds `x` to `digits` significant decimal digits. `0.0`, subnormals, and
/// non-finite values pass through unchanged.
fn round_to_significant_digits(x: f32, digits: i32) -> f32 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let magnitude = x.abs().log10().floor();
    let factor = 10f32.powi(digits - 1 - magnitude as i32);
    (x * factor).round() / factor
}

#[derive(Clone)]
struct Entry {
    hits: Vec<SearchHit>,
    generation: u64,
    inserted_at: Instant,
}

/// TTL + LRU cache of search result sets.
pub struct ResultCache {
    inner: LruCache<Fingerprint, Entry>,
    ttl: Duration,
}

impl ResultCache {
    /// Creates a cache holding at most `max_entries`, each valid for `ttl`.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner: LruCache::new(max_entries),
            ttl,
        }
    }

    /// Computes the fingerprint for a query. Query components are rounded to
    /// [`DEFAULT_SIGNIFICANT_DIGITS`] significant digits first, so two calls
    /// whose vectors are equal up to that precision always produce the same
    /// fingerprint even if their bit patterns differ.
    #[must_use]
    pub fn fingerprint(
        query: &[f32],
        k: usize,
        ef_search: Option<usize>,
        filter: Option<&Filter>,
        with_vectors: bool,
        with_metadata: bool,
        with_content: bool,
    ) -> Fingerprint {
        let mut hasher = rustc_hash::FxHasher::default();
        for component in query {
            round_to_significant_digits(*component, DEFAULT_SIGNIFICANT_DIGITS).to_bits().hash(&mut hasher);
        }
        k.hash(&mut hasher);
        ef_search.hash(&mut hasher);
        if let Some(f) = filter {
            f.canonical().hash(&mut hasher);
        }
        with_vectors.hash(&mut hasher);
        with_metadata.hash(&mut hasher);
        with_content.hash(&mut hasher);
        hasher.finish()
    }

    /// Looks up a cached result set for `fingerprint`, valid only if it was
    /// inserted at the current `generation` and hasn't exceeded its TTL.
    #[must_use]
    pub fn get(&self, fingerprint: Fingerprint, generation: u64) -> Option<Vec<SearchHit>> {
        let entry = self.inner.get(&fingerprint)?;
        if entry.generation != generation || entry.inserted_at.elapsed() > self.ttl {
            self.inner.remove(&fingerprint);
            return None;
        }
        Some(entry.hits)
    }

    /// Stores a result set under `fingerprint`, tagged with the collection's
    /// current write generation.
    pub fn put(&self, fingerprint: Fingerprint, generation: u64, hits: Vec<SearchHit>) {
        self.inner.insert(
            fingerprint,
            Entry {
                hits,
                generation,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops every entry whose TTL has elapsed. Intended to be called on the
    /// periodic sweep interval (`SEARCH_CACHE_CLEANUP_INTERVAL`) rather than
    /// on every lookup, so a burst of cold queries isn't also a burst of sweeps.
    pub fn sweep_expired(&self) {
        let ttl = self.ttl;
        self.inner.retain(|_, entry| entry.inserted_at.elapsed() <= ttl);
    }

    /// Number of entries currently cached (including ones due to be evicted as stale).
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// True if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Current hit/miss/eviction counters.
    #[must_use]
    pub fn stats(&self) -> super::lru::CacheStats {
        self.inner.stats()
    }
}
