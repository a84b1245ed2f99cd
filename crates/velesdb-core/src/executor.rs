//! Parallel search executor: a fixed worker pool that shards a search across
//! threads when a collection is large enough to make that worthwhile.
//!
//! The flat index's candidate space is an ordinary `Vec`, so it partitions
//! cleanly by position modulo the shard count. The HNSW graph has a single
//! connected structure and a single entry point, so there is no analogous
//! partition; a query against it is still routed through the pool (so the
//! caller's thread is freed and the executor's queuing/timeout machinery
//! stays uniform across index kinds), but runs as one shard.


use crate::config::VelesConfig;
use crate::error::{Error, Result};
use crate::index::{IndexHit, SearchOptions, SearchOutcome, VectorIndex};
use crossbeam_channel::{bounded, Sender};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send>;

struct WorkerPool {
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    fn new(workers: usize) -> Self {
        let worker_count = workers.max(1);
        let (sender, receiver) = bounded::<Job>(worker_count * 4);
        let handles = (0..worker_count)
            .map(|_| {
                let receiver = receiver.clone();
                std::thread::spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
            })
            .collect();
        Self {
            sender: Some(sender),
            handles,
        }
    }

    fn submit(&self, job: Job) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(job);
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Dropping the sender closes the channel, which unblocks every
        // worker's `recv` so they can exit before we join them.
        self.sender.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Fixed-size worker pool that shards eligible searches across threads and
/// merges their results into a single bounded top-k.
pub struct Executor {
    pool: WorkerPool,
    enabled: bool,
    min_vectors_for_parallel: usize,
}

#[derive(PartialEq)]
struct MergeItem {
    score: f32,
    id: String,
}

impl Eq for MergeItem {}

impl PartialOrd for MergeItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeItem {
    // Max-heap by score; on a tie, the larger id sorts "worse" so it is
    // evicted first, leaving ascending-id order among equal-score survivors.
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score).then_with(|| self.id.cmp(&other.id))
    }
}

impl Executor {
    /// Builds an executor with a worker pool sized per `config`.
    #[must_use]
    pub fn new(config: &VelesConfig) -> Self {
        Self {
            pool: WorkerPool::new(config.effective_worker_count()),
            enabled: config.search_parallel_enabled,
            min_vectors_for_parallel: config.search_parallel_min_vectors,
        }
    }

    /// Runs `query` against `index`, sharding across the worker pool when
    /// `index.len()` exceeds `min_vectors_for_parallel`; otherwise runs
    /// inline on the caller's thread.
    ///
    /// # Errors
    ///
    /// Propagates the index's own errors, plus [`Error::Timeout`] if the
    /// search's deadline elapsed with zero merged hits.
    pub fn search(
        &self,
        index: Arc<dyn VectorIndex>,
        query: &[f32],
        k: usize,
        opts: &SearchOptions,
    ) -> Result<SearchOutcome> {
        let total_vectors = index.len();
        if !self.enabled || total_vectors < self.min_vectors_for_parallel {
            return index.search(query, k, opts);
        }

        let shard_count = self.pool.handles.len().max(1);
        let (results_tx, results_rx) = bounded::<Result<SearchOutcome>>(shard_count);

        for shard_index in 0..shard_count {
            let index = Arc::clone(&index);
            let query = query.to_vec();
            let opts = opts.clone();
            let results_tx = results_tx.clone();
            self.pool.submit(Box::new(move || {
                let outcome = index.search_shard(&query, k, &opts, shard_index, shard_count);
                let _ = results_tx.send(outcome);
            }));
        }
        drop(results_tx);

        let mut partial = false;
        let mut heap: BinaryHeap<MergeItem> = BinaryHeap::with_capacity(k + 1);
        for _ in 0..shard_count {
            let outcome = results_rx.recv().map_err(|_| {
                Error::Corruption("search executor worker dropped its reply channel".into())
            })??;
            partial |= outcome.partial;
            for hit in outcome.hits {
                push_bounded(&mut heap, hit, k);
            }
        }

        let hits: Vec<IndexHit> = heap
            .into_sorted_vec()
            .into_iter()
            .map(|m| IndexHit { id: m.id, score: m.score })
            .collect();

        if hits.is_empty() && partial {
            return Err(Error::Timeout);
        }

        Ok(SearchOutcome { hits, partial })
    }
}

fn push_bounded(heap: &mut BinaryHeap<MergeItem>, hit: IndexHit, k: usize) {
    let item = MergeItem { score: hit.score, id: hit.id };
    if heap.len() < k {
        heap.push(item);
    } else if let Some(worst) = heap.peek() {
        if item < *worst {
            heap.pop();
            heap.push(item);
        }
    }
}
