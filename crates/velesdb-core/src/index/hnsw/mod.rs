//! HNSW (Hierarchical Navigable Small World) approximate nearest-neighbor index.

mod graph;
pub mod params;
pub mod persistence;

#[cfg(test)]
mod hnsw_tests;

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::{SearchOptions, SearchOutcome, VectorIndex};
use crate::point::Point;
use graph::HnswGraph;
pub use params::HnswParams;

/// HNSW index: a multi-layer proximity graph over string-keyed vectors.
pub struct HnswIndex {
    graph: HnswGraph,
    dimensions: usize,
    metric: DistanceMetric,
    params: HnswParams,
}

impl HnswIndex {
    /// Creates an empty HNSW index for `dimensions`-wide vectors under `metric`.
    #[must_use]
    pub fn new(dimensions: usize, metric: DistanceMetric, params: HnswParams) -> Self {
        Self {
            graph: HnswGraph::new(dimensions, metric, params),
            dimensions,
            metric,
            params,
        }
    }

    /// Rebuilds an index from a persisted snapshot (see [`persistence`]),
    /// verifying dimensions and metric against the caller's expectations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if the snapshot's dimensions or metric
    /// don't match what the caller expects.
    pub fn from_snapshot(
        snapshot: persistence::IndexSnapshot,
        expected_dimensions: usize,
        expected_metric: DistanceMetric,
        params: HnswParams,
    ) -> Result<Self> {
        if snapshot.dimensions != expected_dimensions {
            return Err(Error::Corruption(format!(
                "HNSW index file dimensions {} do not match collection dimensions {expected_dimensions}",
                snapshot.dimensions
            )));
        }
        if snapshot.metric != expected_metric {
            return Err(Error::Corruption(
                "HNSW index file metric does not match collection metric".into(),
            ));
        }
        Ok(Self {
            graph: HnswGraph::from_snapshot(expected_dimensions, expected_metric, params, snapshot.nodes),
            dimensions: expected_dimensions,
            metric: expected_metric,
            params,
        })
    }

    /// Produces a persistable snapshot of the current graph state.
    #[must_use]
    pub fn snapshot(&self) -> persistence::IndexSnapshot {
        persistence::IndexSnapshot {
            dimensions: self.dimensions,
            metric: self.metric,
            nodes: self.graph.snapshot(),
        }
    }

    /// The parameters this index was constructed with.
    #[must_use]
    pub fn params(&self) -> HnswParams {
        self.params
    }
}

impl VectorIndex for HnswIndex {
    fn insert(&self, point: &Point) -> Result<()> {
        self.graph.insert(&point.id, &point.vector)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.graph.delete(id)
    }

    fn search(&self, query: &[f32], k: usize, opts: &SearchOptions) -> Result<SearchOutcome> {
        self.graph.search(query, k, opts)
    }

    fn snapshot(&self) -> Option<persistence::IndexSnapshot> {
        Some(HnswIndex::snapshot(self))
    }

    fn len(&self) -> usize {
        self.graph.len()
    }
}
