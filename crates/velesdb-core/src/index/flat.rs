//! Exact (brute-force) index: an ordered sequence of `(id, values)` plus an
//! id to position map, searched by scanning every entry.

#[cfg(test)]
mod flat_tests;

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::{IndexHit, SearchOptions, SearchOutcome, VectorIndex};
use crate::point::Point;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry {
    id: String,
    values: Vec<f32>,
}

struct Inner {
    entries: Vec<Option<Entry>>,
    positions: FxHashMap<String, usize>,
    live_count: usize,
}

/// Exact nearest-neighbor index. `delete` tombstones the slot rather than
/// shifting later entries, so positions stay stable across deletes.
pub struct FlatIndex {
    dimensions: usize,
    metric: DistanceMetric,
    inner: RwLock<Inner>,
}

impl FlatIndex {
    /// Creates an empty flat index for vectors of `dimensions` scored by `metric`.
    #[must_use]
    pub fn new(dimensions: usize, metric: DistanceMetric) -> Self {
        Self {
            dimensions,
            metric,
            inner: RwLock::new(Inner {
                entries: Vec::new(),
                positions: FxHashMap::default(),
                live_count: 0,
            }),
        }
    }
}

#[derive(PartialEq)]
struct ScoredId {
    score: f32,
    id: String,
}

impl Eq for ScoredId {}

impl PartialOrd for ScoredId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredId {
    // Max-heap by score (farthest first); on a tie, the larger id sorts as
    // "worse" so `BinaryHeap::pop` evicts it first, leaving ascending-id
    // ordering among equal-score survivors as §3 requires.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl VectorIndex for FlatIndex {
    fn insert(&self, point: &Point) -> Result<()> {
        if point.vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: point.vector.len(),
            });
        }
        let mut inner = self.inner.write();
        if inner.positions.contains_key(&point.id) {
            return Err(Error::AlreadyExists(point.id.clone()));
        }
        let position = inner.entries.len();
        inner.entries.push(Some(Entry {
            id: point.id.clone(),
            values: point.vector.clone(),
        }));
        inner.positions.insert(point.id.clone(), position);
        inner.live_count += 1;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut inner = self.inner.write();
        let Some(position) = inner.positions.remove(id) else {
            return Ok(false);
        };
        inner.entries[position] = None;
        inner.live_count -= 1;
        Ok(true)
    }

    fn search(&self, query: &[f32], k: usize, opts: &SearchOptions) -> Result<SearchOutcome> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(SearchOutcome::default());
        }

        let inner = self.inner.read();
        let mut heap: BinaryHeap<ScoredId> = BinaryHeap::with_capacity(k + 1);
        let mut partial = false;

        // Batch granularity matches the cancellation-polling contract for the flat index.
        const BATCH_SIZE: usize = 256;
        for batch in inner.entries.chunks(BATCH_SIZE) {
            if opts.should_stop() {
                partial = true;
                break;
            }
            for entry in batch.iter().flatten() {
                let score = self.metric.distance(query, &entry.values)?;
                if heap.len() < k {
                    heap.push(ScoredId {
                        score,
                        id: entry.id.clone(),
                    });
                } else if let Some(worst) = heap.peek() {
                    if score < worst.score || (score == worst.score && entry.id < worst.id) {
                        heap.pop();
                        heap.push(ScoredId {
                            score,
                            id: entry.id.clone(),
                        });
                    }
                }
            }
        }

        // `into_sorted_vec` yields ascending `Ord` order, which for this type
        // is nearest-score-first with ascending-id ties already.
        let hits: Vec<IndexHit> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|s| IndexHit { id: s.id, score: s.score })
            .collect();

        Ok(SearchOutcome { hits, partial })
    }

    fn search_shard(
        &self,
        query: &[f32],
        k: usize,
        opts: &SearchOptions,
        shard_index: usize,
        shard_count: usize,
    ) -> Result<SearchOutcome> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 || shard_count == 0 {
            return Ok(SearchOutcome::default());
        }

        let inner = self.inner.read();
        let mut heap: BinaryHeap<ScoredId> = BinaryHeap::with_capacity(k + 1);
        let mut partial = false;

        const BATCH_SIZE: usize = 256;
        let shard: Vec<&Entry> = inner
            .entries
            .iter()
            .enumerate()
            .filter(|(position, _)| position % shard_count == shard_index)
            .filter_map(|(_, entry)| entry.as_ref())
            .collect();

        for batch in shard.chunks(BATCH_SIZE) {
            if opts.should_stop() {
                partial = true;
                break;
            }
            for entry in batch {
                let score = self.metric.distance(query, &entry.values)?;
                if heap.len() < k {
                    heap.push(ScoredId {
                        score,
                        id: entry.id.clone(),
                    });
                } else if let Some(worst) = heap.peek() {
                    if score < worst.score || (score == worst.score && entry.id < worst.id) {
                        heap.pop();
                        heap.push(ScoredId {
                            score,
                            id: entry.id.clone(),
                        });
                    }
                }
            }
        }

        let hits: Vec<IndexHit> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|s| IndexHit { id: s.id, score: s.score })
            .collect();

        Ok(SearchOutcome { hits, partial })
    }

    fn len(&self) -> usize {
        self.inner.read().live_count
    }
}
