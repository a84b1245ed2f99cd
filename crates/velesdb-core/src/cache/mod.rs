//! Generic LRU cache (backs the page cache and the search result cache) and
//! the result cache built on top of it.

pub mod lru;
pub mod result_cache;

pub use lru::{CacheStats, LruCache};
pub use result_cache::ResultCache;
