//! Data types exchanged with a [`super::Collection`]: the on-disk descriptor,
//! the search request/response shapes, and the batch-insert outcome.

use crate::config::IndexKind;
use crate::distance::DistanceMetric;
use crate::filter::Filter;
use crate::point::SearchHit;
use serde::{Deserialize, Serialize};

/// The schema version of [`CollectionDescriptor`]'s on-disk encoding.
pub const DESCRIPTOR_SCHEMA_VERSION: u32 = 1;

/// A collection's persisted identity: everything needed to reopen it the
/// same way it was created. Written once at `create`, read once at `open`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionDescriptor {
    /// Collection name (also its directory name under `data_dir`).
    pub name: String,
    /// Vector dimensionality; every point must match this exactly.
    pub dimensions: usize,
    /// Distance metric used to score candidates.
    pub metric: DistanceMetric,
    /// Which index backs this collection.
    pub index_kind: IndexKind,
    /// HNSW construction parameters (ignored for a flat collection).
    pub hnsw_m: usize,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_max_m: usize,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_max_m0: usize,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_ml: f64,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_ef_construction: usize,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_ef_search: usize,
    /// See [`crate::index::hnsw::HnswParams`].
    pub hnsw_seed: u64,
    /// Unix timestamp (seconds) the collection was created at.
    pub created_at: u64,
    /// Schema version of this descriptor's own encoding.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    DESCRIPTOR_SCHEMA_VERSION
}

/// A search request accepted by [`super::Collection::search`]. Either
/// `vector` or `text` must be set; `text` requires a bound [`crate::embedder::Embedder`].
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Query embedding, used directly if present.
    pub vector: Option<Vec<f32>>,
    /// Query text, embedded via the collection's bound embedder if `vector` is absent.
    pub text: Option<String>,
    /// Number of results to return.
    pub k: usize,
    /// Overrides the index's default search breadth (HNSW only).
    pub ef_search: Option<usize>,
    /// Metadata predicate results must satisfy.
    pub filter: Option<Filter>,
    /// Include the stored vector in each hit.
    pub with_vectors: bool,
    /// Include the stored metadata in each hit.
    pub with_metadata: bool,
    /// Include the stored content in each hit.
    pub with_content: bool,
    /// Wall-clock point past which the search returns its best-so-far.
    pub deadline: Option<std::time::Instant>,
    /// Cooperative cancellation token.
    pub cancel: Option<crate::index::CancellationToken>,
}

/// The outcome of [`super::Collection::search`]: ranked hits plus whether the
/// search was cut short by a deadline or cancellation.
#[derive(Debug, Clone, Default)]
pub struct SearchResponse {
    /// Hits in ascending-score order, capped at the request's `k`.
    pub hits: Vec<SearchHit>,
    /// True if a deadline or cancellation interrupted the search.
    pub partial: bool,
}

/// The outcome of [`super::Collection::insert_batch`]: per spec §4.H, a batch
/// stops at the first validation failure, and everything before it persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertBatchOutcome {
    /// Number of points successfully inserted before any failure.
    pub inserted: usize,
    /// Index of the first point that failed validation, if any.
    pub failed_at: Option<usize>,
}

impl InsertBatchOutcome {
    /// True if every point in the batch was inserted.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.failed_at.is_none()
    }
}

/// Snapshot of a collection's runtime state, per spec §4.H's implied parity
/// with [`crate::Database::stats`].
#[derive(Debug, Clone)]
pub struct CollectionStats {
    /// Number of live vectors.
    pub vector_count: usize,
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Distance metric.
    pub metric: DistanceMetric,
    /// Index kind backing this collection.
    pub index_kind: IndexKind,
    /// On-disk size of the page store file, in bytes.
    pub storage_bytes: u64,
    /// Result cache hit/miss/eviction counters.
    pub cache_stats: crate::cache::lru::CacheStats,
}
