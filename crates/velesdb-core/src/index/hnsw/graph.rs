//! The in-memory HNSW graph: an arena of nodes keyed by a stable `u32`
//! index, with an external-id ↔ index map held alongside it so neighbor
//! lists never need to carry the (larger, variable-length) string id.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::hnsw::params::HnswParams;
use crate::index::{IndexHit, SearchOptions, SearchOutcome};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Stable index into the node arena. Never reused while a node is live;
/// freed slots are recycled via the same free-list idiom the page store uses.
pub type NodeIndex = u32;

pub(super) struct Node {
    pub(super) external_id: String,
    pub(super) vector: Vec<f32>,
    pub(super) layer: usize,
    pub(super) neighbors: Vec<Vec<NodeIndex>>,
}

struct GraphState {
    nodes: Vec<Option<Node>>,
    id_to_index: FxHashMap<String, NodeIndex>,
    free_list: Vec<NodeIndex>,
    entry_point: Option<NodeIndex>,
    max_layer: usize,
    live_count: usize,
}

/// A Hierarchical Navigable Small World graph over string-keyed vectors.
pub struct HnswGraph {
    dimensions: usize,
    metric: DistanceMetric,
    params: HnswParams,
    state: RwLock<GraphState>,
    rng_state: AtomicU64,
}

#[derive(PartialEq)]
struct ScoredNode {
    score: f32,
    index: NodeIndex,
}

impl Eq for ScoredNode {}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score).then_with(|| self.index.cmp(&other.index))
    }
}

impl HnswGraph {
    /// Creates an empty graph for `dimensions`-wide vectors under `metric`.
    #[must_use]
    pub fn new(dimensions: usize, metric: DistanceMetric, params: HnswParams) -> Self {
        let seed = if params.seed == 0 { 0x5DEE_CE66_D1A4_B5B5 } else { params.seed };
        Self {
            dimensions,
            metric,
            params,
            state: RwLock::new(GraphState {
                nodes: Vec::new(),
                id_to_index: FxHashMap::default(),
                free_list: Vec::new(),
                entry_point: None,
                max_layer: 0,
                live_count: 0,
            }),
            rng_state: AtomicU64::new(seed),
        }
    }

    /// Returns the graph's configured parameters.
    #[must_use]
    pub fn params(&self) -> HnswParams {
        self.params
    }

    /// Number of live vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().live_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Samples a layer via `floor(-ln(U(0,1]) * ml)`, capped at 16.
    fn sample_layer(&self) -> usize {
        let mut x = self.rng_state.load(AtomicOrdering::Relaxed);
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state.store(x, AtomicOrdering::Relaxed);
        // Map to (0, 1] rather than [0, 1) so ln() never sees zero.
        let uniform = ((x >> 11) as f64 + 1.0) / ((1u64 << 53) as f64 + 1.0);
        let level = (-uniform.ln() * self.params.ml).floor();
        if level.is_finite() {
            (level as usize).min(16)
        } else {
            0
        }
    }

    fn distance(&self, a: &[f32], b: &[f32]) -> Result<f32> {
        self.metric.distance(a, b)
    }

    /// Inserts a vector, rejecting an id already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] on a length mismatch and
    /// [`Error::AlreadyExists`] if `id` is already in the graph.
    pub fn insert(&self, id: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }

        let mut state = self.state.write();
        if state.id_to_index.contains_key(id) {
            return Err(Error::AlreadyExists(id.to_string()));
        }

        let layer = self.sample_layer();
        let node = Node {
            external_id: id.to_string(),
            vector: vector.to_vec(),
            layer,
            neighbors: vec![Vec::new(); layer + 1],
        };

        let index = if let Some(free) = state.free_list.pop() {
            state.nodes[free as usize] = Some(node);
            free
        } else {
            let index = u32::try_from(state.nodes.len())
                .map_err(|_| Error::IndexFull("HNSW graph exceeded u32 node capacity".into()))?;
            state.nodes.push(Some(node));
            index
        };
        state.id_to_index.insert(id.to_string(), index);
        state.live_count += 1;

        let Some(entry_point) = state.entry_point else {
            state.entry_point = Some(index);
            state.max_layer = layer;
            return Ok(());
        };

        let max_layer = state.max_layer;
        let mut current_ep = entry_point;

        if layer < max_layer {
            for probe_layer in (layer + 1..=max_layer).rev() {
                current_ep = Self::greedy_descend(&state, vector, current_ep, probe_layer, &self.metric)?;
            }
        }

        for probe_layer in (0..=layer.min(max_layer)).rev() {
            let candidates = Self::search_layer(
                &state,
                vector,
                &[current_ep],
                self.params.ef_construction,
                probe_layer,
                &self.metric,
            )?;
            let cap = self.params.max_neighbors(probe_layer);
            let selected: Vec<NodeIndex> = candidates.iter().take(cap).map(|c| c.index).collect();

            if let Some(node) = state.nodes[index as usize].as_mut() {
                node.neighbors[probe_layer] = selected.clone();
            }

            for &neighbor in &selected {
                Self::add_bidirectional(&mut state, index, neighbor, probe_layer, cap, &self.metric)?;
            }

            if let Some(best) = candidates.first() {
                current_ep = best.index;
            }
        }

        if layer > state.max_layer {
            state.max_layer = layer;
            state.entry_point = Some(index);
        }

        Ok(())
    }

    fn greedy_descend(
        state: &GraphState,
        query: &[f32],
        entry: NodeIndex,
        layer: usize,
        metric: &DistanceMetric,
    ) -> Result<NodeIndex> {
        let mut best = entry;
        let mut best_dist = metric.distance(query, &state.nodes[entry as usize].as_ref().unwrap().vector)?;
        loop {
            let mut improved = false;
            let neighbors = &state.nodes[best as usize].as_ref().unwrap().neighbors;
            let candidates: Vec<NodeIndex> = neighbors.get(layer).cloned().unwrap_or_default();
            for candidate in candidates {
                let dist = metric.distance(query, &state.nodes[candidate as usize].as_ref().unwrap().vector)?;
                if dist < best_dist {
                    best = candidate;
                    best_dist = dist;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }
        Ok(best)
    }

    /// Expands candidates at `layer` starting from `entry_points`, returning
    /// up to `ef` results sorted nearest-first.
    fn search_layer(
        state: &GraphState,
        query: &[f32],
        entry_points: &[NodeIndex],
        ef: usize,
        layer: usize,
        metric: &DistanceMetric,
    ) -> Result<Vec<ScoredNode>> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut candidates: BinaryHeap<std::cmp::Reverse<ScoredNode>> = BinaryHeap::new();
        let mut results: BinaryHeap<ScoredNode> = BinaryHeap::new();

        for &ep in entry_points {
            let Some(node) = state.nodes[ep as usize].as_ref() else { continue };
            let dist = metric.distance(query, &node.vector)?;
            visited.insert(ep);
            candidates.push(std::cmp::Reverse(ScoredNode { score: dist, index: ep }));
            results.push(ScoredNode { score: dist, index: ep });
        }

        while let Some(std::cmp::Reverse(current)) = candidates.pop() {
            let worst = results.peek().map_or(f32::MAX, |r| r.score);
            if current.score > worst && results.len() >= ef {
                break;
            }

            let Some(node) = state.nodes[current.index as usize].as_ref() else { continue };
            let Some(neighbors) = node.neighbors.get(layer) else { continue };
            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                let Some(neighbor_node) = state.nodes[neighbor as usize].as_ref() else { continue };
                let dist = metric.distance(query, &neighbor_node.vector)?;
                let worst = results.peek().map_or(f32::MAX, |r| r.score);
                if results.len() < ef || dist < worst {
                    candidates.push(std::cmp::Reverse(ScoredNode { score: dist, index: neighbor }));
                    results.push(ScoredNode { score: dist, index: neighbor });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<ScoredNode> = results.into_vec();
        out.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.index.cmp(&b.index)));
        Ok(out)
    }

    fn add_bidirectional(
        state: &mut GraphState,
        new_node: NodeIndex,
        neighbor: NodeIndex,
        layer: usize,
        cap: usize,
        metric: &DistanceMetric,
    ) -> Result<()> {
        let Some(neighbor_node) = state.nodes[neighbor as usize].as_mut() else {
            return Ok(());
        };
        if neighbor_node.neighbors.len() <= layer {
            neighbor_node.neighbors.resize(layer + 1, Vec::new());
        }
        neighbor_node.neighbors[layer].push(new_node);

        if neighbor_node.neighbors[layer].len() <= cap {
            return Ok(());
        }

        let neighbor_vector = neighbor_node.vector.clone();
        let candidates = neighbor_node.neighbors[layer].clone();
        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(candidate_node) = state.nodes[candidate as usize].as_ref() else { continue };
            let dist = metric.distance(&neighbor_vector, &candidate_node.vector)?;
            scored.push(ScoredNode { score: dist, index: candidate });
        }
        scored.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.index.cmp(&b.index)));
        let pruned: Vec<NodeIndex> = scored.into_iter().take(cap).map(|s| s.index).collect();

        if let Some(neighbor_node) = state.nodes[neighbor as usize].as_mut() {
            neighbor_node.neighbors[layer] = pruned;
        }
        Ok(())
    }

    /// Finds the `k` nearest neighbors of `query`, honoring `opts`'s
    /// `ef_search` override, deadline, and cancellation token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] on a length mismatch.
    pub fn search(&self, query: &[f32], k: usize, opts: &SearchOptions) -> Result<SearchOutcome> {
        if query.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(SearchOutcome::default());
        }

        let state = self.state.read();
        let Some(entry_point) = state.entry_point else {
            return Ok(SearchOutcome::default());
        };

        let ef = opts.ef_search.unwrap_or(self.params.ef_search).max(k);
        let mut current_ep = entry_point;
        let mut partial = false;

        for layer in (1..=state.max_layer).rev() {
            if opts.should_stop() {
                partial = true;
                break;
            }
            current_ep = Self::greedy_descend(&state, query, current_ep, layer, &self.metric)?;
        }

        let candidates = if partial {
            vec![ScoredNode {
                score: self.distance(query, &state.nodes[current_ep as usize].as_ref().unwrap().vector)?,
                index: current_ep,
            }]
        } else {
            Self::search_layer_with_cancellation(&state, query, current_ep, ef, &self.metric, opts, &mut partial)?
        };

        let hits = candidates
            .into_iter()
            .take(k)
            .map(|c| IndexHit {
                id: state.nodes[c.index as usize].as_ref().unwrap().external_id.clone(),
                score: c.score,
            })
            .collect();

        Ok(SearchOutcome { hits, partial })
    }

    /// Layer-0 expansion that polls `opts` at each neighbor expansion, per
    /// the cancellation-granularity contract HNSW search documents.
    fn search_layer_with_cancellation(
        state: &GraphState,
        query: &[f32],
        entry: NodeIndex,
        ef: usize,
        metric: &DistanceMetric,
        opts: &SearchOptions,
        partial: &mut bool,
    ) -> Result<Vec<ScoredNode>> {
        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut candidates: BinaryHeap<std::cmp::Reverse<ScoredNode>> = BinaryHeap::new();
        let mut results: BinaryHeap<ScoredNode> = BinaryHeap::new();

        let Some(entry_node) = state.nodes[entry as usize].as_ref() else {
            return Ok(Vec::new());
        };
        let dist = metric.distance(query, &entry_node.vector)?;
        visited.insert(entry);
        candidates.push(std::cmp::Reverse(ScoredNode { score: dist, index: entry }));
        results.push(ScoredNode { score: dist, index: entry });

        while let Some(std::cmp::Reverse(current)) = candidates.pop() {
            if opts.should_stop() {
                *partial = true;
                break;
            }

            let worst = results.peek().map_or(f32::MAX, |r| r.score);
            if current.score > worst && results.len() >= ef {
                break;
            }

            let Some(node) = state.nodes[current.index as usize].as_ref() else { continue };
            let Some(neighbors) = node.neighbors.first() else { continue };
            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                let Some(neighbor_node) = state.nodes[neighbor as usize].as_ref() else { continue };
                let dist = metric.distance(query, &neighbor_node.vector)?;
                let worst = results.peek().map_or(f32::MAX, |r| r.score);
                if results.len() < ef || dist < worst {
                    candidates.push(std::cmp::Reverse(ScoredNode { score: dist, index: neighbor }));
                    results.push(ScoredNode { score: dist, index: neighbor });
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        let mut out: Vec<ScoredNode> = results.into_vec();
        out.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.index.cmp(&b.index)));
        Ok(out)
    }

    /// Removes a node by id, unlinking it from every layer it participated
    /// in. Reassigns the entry point (highest remaining layer, ties broken
    /// by lowest id) if the deleted node held it.
    ///
    /// # Errors
    ///
    /// Never errors; returns `false` if `id` wasn't present.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write();
        let Some(index) = state.id_to_index.remove(id) else {
            return Ok(false);
        };
        let Some(node) = state.nodes[index as usize].take() else {
            return Ok(false);
        };

        for (layer, neighbors) in node.neighbors.iter().enumerate() {
            for &neighbor in neighbors {
                if let Some(neighbor_node) = state.nodes[neighbor as usize].as_mut() {
                    if let Some(list) = neighbor_node.neighbors.get_mut(layer) {
                        list.retain(|&n| n != index);
                    }
                }
            }
        }

        state.free_list.push(index);
        state.live_count -= 1;

        if state.entry_point == Some(index) {
            state.entry_point = None;
            state.max_layer = 0;
            let mut best: Option<(usize, &str, NodeIndex)> = None;
            for (i, slot) in state.nodes.iter().enumerate() {
                if let Some(n) = slot {
                    let candidate = (n.layer, n.external_id.as_str(), i as NodeIndex);
                    best = Some(match best {
                        None => candidate,
                        Some(b) if candidate.0 > b.0 || (candidate.0 == b.0 && candidate.1 < b.1) => candidate,
                        Some(b) => b,
                    });
                }
            }
            if let Some((layer, _, idx)) = best {
                state.entry_point = Some(idx);
                state.max_layer = layer;
            }
        }

        Ok(true)
    }

    /// Snapshots every live node for persistence: `(id, layer, neighbor lists by layer)`.
    #[must_use]
    pub(super) fn snapshot(&self) -> Vec<(String, Vec<f32>, usize, Vec<Vec<String>>)> {
        let state = self.state.read();
        let mut out = Vec::with_capacity(state.live_count);
        for slot in &state.nodes {
            let Some(node) = slot else { continue };
            let neighbor_ids: Vec<Vec<String>> = node
                .neighbors
                .iter()
                .map(|layer_neighbors| {
                    layer_neighbors
                        .iter()
                        .filter_map(|&n| state.nodes[n as usize].as_ref().map(|nn| nn.external_id.clone()))
                        .collect()
                })
                .collect();
            out.push((node.external_id.clone(), node.vector.clone(), node.layer, neighbor_ids));
        }
        out
    }

    /// Rebuilds the graph from a persisted snapshot, restoring arena slots,
    /// the id↔index map, the entry point, and `max_layer`.
    #[must_use]
    pub(super) fn from_snapshot(
        dimensions: usize,
        metric: DistanceMetric,
        params: HnswParams,
        nodes: Vec<(String, Vec<f32>, usize, Vec<Vec<String>>)>,
    ) -> Self {
        let graph = Self::new(dimensions, metric, params);
        {
            let mut state = graph.state.write();
            for (id, vector, layer, _) in &nodes {
                let index = u32::try_from(state.nodes.len()).expect("snapshot node count exceeds u32");
                state.nodes.push(Some(Node {
                    external_id: id.clone(),
                    vector: vector.clone(),
                    layer: *layer,
                    neighbors: vec![Vec::new(); layer + 1],
                }));
                state.id_to_index.insert(id.clone(), index);
            }
            for (id, _, _, neighbor_ids) in &nodes {
                let index = state.id_to_index[id];
                let resolved: Vec<Vec<NodeIndex>> = neighbor_ids
                    .iter()
                    .map(|layer_ids| layer_ids.iter().filter_map(|nid| state.id_to_index.get(nid).copied()).collect())
                    .collect();
                if let Some(node) = state.nodes[index as usize].as_mut() {
                    node.neighbors = resolved;
                }
            }
            state.live_count = nodes.len();
            let mut best: Option<(usize, &str, NodeIndex)> = None;
            for slot in &state.nodes {
                if let Some(n) = slot {
                    let index = state.id_to_index[&n.external_id];
                    let candidate = (n.layer, n.external_id.as_str(), index);
                    best = Some(match best {
                        None => candidate,
                        Some(b) if candidate.0 > b.0 || (candidate.0 == b.0 && candidate.1 < b.1) => candidate,
                        Some(b) => b,
                    });
                }
            }
            if let Some((layer, _, idx)) = best {
                state.entry_point = Some(idx);
                state.max_layer = layer;
            }
        }
        graph
    }
}
