//! Configuration for `VelesDB`.
//!
//! # Priority (highest to lowest)
//!
//! 1. Explicit overrides passed to [`Database::open`](crate::Database::open)
//! 2. Environment variables (bare names, e.g. `STORAGE_PAGE_SIZE`)
//! 3. `<data_dir>/config.toml`, if present
//! 4. Defaults


use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default index kind assigned to a new collection when the caller doesn't pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Brute-force exact search over all stored vectors.
    Flat,
    /// Approximate search via a multi-layer proximity graph.
    Hnsw,
}

impl std::str::FromStr for IndexKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "flat" => Ok(Self::Flat),
            "hnsw" => Ok(Self::Hnsw),
            other => Err(Error::Config(format!("unknown index kind '{other}'"))),
        }
    }
}

/// WAL durability policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Fsync after every write. Safest, slowest.
    PerOp,
    /// Fsync on a fixed interval; bounded data loss on crash.
    Interval,
    /// Never fsync explicitly; rely on OS flush on close.
    Off,
}

/// Flat top-level configuration struct. Every field maps 1:1 onto an
/// environment variable of the same name, uppercased, so `figment`'s raw
/// (non-prefixed, non-nested) `Env` provider applies directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VelesConfig {
    /// Root directory for all collections and their page/WAL files.
    pub data_dir: String,
    /// Page size in bytes. Must be a power of two, minimum 512.
    pub storage_page_size: u32,
    /// Number of pages kept in the in-memory LRU cache.
    pub storage_cache_size: usize,
    /// Fsync after every page write, bypassing the WAL's own sync policy.
    pub storage_sync_writes: bool,

    /// Whether the write-ahead log is active. Disabling it trades durability
    /// for throughput; a crash loses any write not yet checkpointed.
    pub wal_enabled: bool,
    /// Fsync interval in milliseconds. `0` means fsync after every record (per-op).
    pub wal_sync_interval: u64,
    /// WAL size, in bytes, that triggers a checkpoint and truncation.
    pub wal_max_size: u64,

    /// Enables the parallel search executor for eligible queries.
    pub search_parallel_enabled: bool,
    /// Number of worker threads in the executor's pool.
    pub search_parallel_max_workers: usize,
    /// Vectors per batch handed to a single worker.
    pub search_parallel_batch_size: usize,
    /// Minimum candidate-set size before a query is worth parallelizing.
    pub search_parallel_min_vectors: usize,

    /// Enables the result cache.
    pub search_cache_enabled: bool,
    /// Maximum number of cached result sets.
    pub search_cache_max_entries: usize,
    /// Cache entry time-to-live in seconds.
    pub search_cache_ttl: u64,
    /// Interval, in seconds, between expired-entry sweeps.
    pub search_cache_cleanup_interval: u64,

    /// Index kind assigned to new collections that don't specify one.
    pub index_default_type: IndexKind,
    /// Distance metric assigned to new collections that don't specify one.
    pub index_default_metric: DistanceMetric,

    /// HNSW: max bidirectional connections per node above layer 0.
    pub hnsw_m: usize,
    /// HNSW: max connections per node above layer 0 after pruning (usually `hnsw_m`).
    pub hnsw_max_m: usize,
    /// HNSW: max connections per node at layer 0 (usually `2 * hnsw_m`).
    pub hnsw_max_m0: usize,
    /// HNSW: level-sampling normalization constant.
    pub hnsw_ml: f64,
    /// HNSW: candidate list size used during insertion.
    pub hnsw_ef_construction: usize,
    /// HNSW: candidate list size used during search.
    pub hnsw_ef_search: usize,
    /// HNSW: seed for the level-sampling PRNG. `0` means seed from entropy.
    pub hnsw_seed: u64,

    /// Upper bound on executor worker threads, regardless of `search_parallel_max_workers`.
    pub perf_max_concurrency: usize,
    /// Enables the unrolled distance-kernel fast path.
    pub perf_enable_simd: bool,
    /// Soft advisory cap, in bytes, logged against when the page cache exceeds it. Not enforced.
    pub perf_memory_limit: u64,
    /// Max retry attempts, with exponential backoff, for transient IO ops (fsync, append).
    pub perf_io_max_retries: u32,
}

impl Default for VelesConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
        Self {
            data_dir: "./velesdb_data".to_string(),
            storage_page_size: 4096,
            storage_cache_size: 1000,
            storage_sync_writes: false,

            wal_enabled: true,
            wal_sync_interval: 1000,
            wal_max_size: 64 * 1024 * 1024,

            search_parallel_enabled: true,
            search_parallel_max_workers: workers,
            search_parallel_batch_size: 256,
            search_parallel_min_vectors: workers * 100,

            search_cache_enabled: true,
            search_cache_max_entries: 1000,
            search_cache_ttl: 300,
            search_cache_cleanup_interval: 60,

            index_default_type: IndexKind::Hnsw,
            index_default_metric: DistanceMetric::Cosine,

            hnsw_m: 16,
            hnsw_max_m: 16,
            hnsw_max_m0: 32,
            hnsw_ml: 1.0 / std::f64::consts::LN_2,
            hnsw_ef_construction: 200,
            hnsw_ef_search: 50,
            hnsw_seed: 0,

            perf_max_concurrency: workers,
            perf_enable_simd: true,
            perf_memory_limit: 0,
            perf_io_max_retries: 3,
        }
    }
}

impl VelesConfig {
    /// Loads configuration from `<data_dir>/config.toml` (if present) layered
    /// under environment variables, on top of [`VelesConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file exists but fails to parse, or if
    /// an environment variable holds a value of the wrong type.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self> {
        let config_path = data_dir.as_ref().join("config.toml");
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if config_path.exists() {
            figment = figment.merge(Toml::file(&config_path));
        }
        figment = figment.merge(Env::raw());
        Ok(figment.extract()?)
    }

    /// Parses configuration from a TOML string, layered over defaults. Used by tests
    /// and by adapters that accept an inline config blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `toml_str` fails to parse.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));
        Ok(figment.extract()?)
    }

    /// Validates that values are internally consistent and within sane ranges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        if !self.storage_page_size.is_power_of_two() || self.storage_page_size < 512 {
            return Err(Error::Config(format!(
                "storage_page_size must be a power of two >= 512, got {}",
                self.storage_page_size
            )));
        }
        if self.hnsw_m == 0 {
            return Err(Error::Config("hnsw_m must be >= 1".into()));
        }
        if self.hnsw_max_m0 < self.hnsw_m {
            return Err(Error::Config("hnsw_max_m0 must be >= hnsw_m".into()));
        }
        if self.hnsw_ef_construction == 0 || self.hnsw_ef_search == 0 {
            return Err(Error::Config("hnsw ef parameters must be >= 1".into()));
        }
        if self.search_parallel_max_workers == 0 {
            return Err(Error::Config("search_parallel_max_workers must be >= 1".into()));
        }
        Ok(())
    }

    /// The WAL's effective durability policy, derived from `wal_enabled` and `wal_sync_interval`.
    #[must_use]
    pub const fn wal_sync_policy(&self) -> SyncPolicy {
        if !self.wal_enabled {
            SyncPolicy::Off
        } else if self.wal_sync_interval == 0 {
            SyncPolicy::PerOp
        } else {
            SyncPolicy::Interval
        }
    }

    /// The executor worker count, capped by `perf_max_concurrency`.
    #[must_use]
    pub fn effective_worker_count(&self) -> usize {
        self.search_parallel_max_workers.min(self.perf_max_concurrency).max(1)
    }
}
