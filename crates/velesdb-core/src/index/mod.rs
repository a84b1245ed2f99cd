//! Vector index layer: a shared contract over the flat (exact) index and
//! the approximate HNSW index.

pub mod flat;
pub mod hnsw;

use crate::error::Result;
use crate::point::Point;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation handle, checked at the granularity each index
/// documents (per neighbor expansion for HNSW, per batch for the flat index).
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a fresh, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; observers see this on their next poll.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`CancellationToken::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-call search controls: an optional `ef_search` override, deadline, and
/// cancellation token. All fields are optional so callers that don't need
/// them can use [`SearchOptions::default`].
#[derive(Clone, Default)]
pub struct SearchOptions {
    /// Overrides the index's default search breadth (HNSW only; ignored by the flat index).
    pub ef_search: Option<usize>,
    /// Wall-clock point past which the search returns its best-so-far.
    pub deadline: Option<Instant>,
    /// Cooperative cancellation token.
    pub cancel: Option<CancellationToken>,
}

impl SearchOptions {
    fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// True if the search should stop now and return whatever it has.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.deadline_exceeded() || self.cancelled()
    }
}

/// A single scored candidate from an index search.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    /// The vector's external id.
    pub id: String,
    /// Distance score; smaller is closer, per the collection's metric.
    pub score: f32,
}

/// The outcome of an index search: the ranked hits plus whether the search
/// was cut short by a deadline or cancellation before exhausting its budget.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Hits in ascending-score order, capped at `k`.
    pub hits: Vec<IndexHit>,
    /// True if a deadline or cancellation interrupted the search before completion.
    pub partial: bool,
}

/// Shared contract implemented by both the flat and HNSW indexes.
pub trait VectorIndex: Send + Sync {
    /// Inserts a point. Rejects an id already present; replacement is the
    /// collection's responsibility (delete, then insert).
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the vector's length doesn't
    /// match the index's, or [`Error::AlreadyExists`] if `point.id` is present.
    fn insert(&self, point: &Point) -> Result<()>;

    /// Removes a vector by id. Returns `false` if the id wasn't present;
    /// per §4.H this is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only on an internal consistency failure.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Finds the `k` nearest neighbors of `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if `query`'s length doesn't match the index's.
    fn search(&self, query: &[f32], k: usize, opts: &SearchOptions) -> Result<SearchOutcome>;

    /// Searches only shard `shard_index` of `shard_count` roughly-equal
    /// partitions of the candidate space, for the parallel executor.
    ///
    /// Indexes with no natural partition (a single connected proximity
    /// graph, for instance) may treat every shard as the whole collection;
    /// the default does exactly that, so only `shard_index == 0` does real
    /// work and the rest return empty, redundant-search-free results.
    ///
    /// # Errors
    ///
    /// Same as [`VectorIndex::search`].
    fn search_shard(
        &self,
        query: &[f32],
        k: usize,
        opts: &SearchOptions,
        shard_index: usize,
        shard_count: usize,
    ) -> Result<SearchOutcome> {
        let _ = shard_count;
        if shard_index == 0 {
            self.search(query, k, opts)
        } else {
            Ok(SearchOutcome::default())
        }
    }

    /// Returns a persistable snapshot of this index's node map, for indexes
    /// that support one. The default returns `None`: the flat index's pages
    /// in the page store already are its persisted form, so only HNSW
    /// overrides this.
    fn snapshot(&self) -> Option<hnsw::persistence::IndexSnapshot> {
        None
    }

    /// Number of live (non-deleted) vectors in the index.
    fn len(&self) -> usize;

    /// True if the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
