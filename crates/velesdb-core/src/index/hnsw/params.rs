//! HNSW construction and search parameters.

use crate::config::VelesConfig;

/// Tuning parameters for an [`super::HnswIndex`]. Defaults match the
/// reference parameter set for graphs in the low-millions range.
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    /// Max neighbors per node at layers above 0.
    pub m: usize,
    /// Max neighbors per node at layers above 0 (mirrors `m` unless overridden).
    pub max_m: usize,
    /// Max neighbors per node at layer 0.
    pub max_m0: usize,
    /// Level-selection multiplier, typically `1 / ln(m)`.
    pub ml: f64,
    /// Candidate breadth used while linking a new node during insert.
    pub ef_construction: usize,
    /// Default candidate breadth used during search, absent a per-call override.
    pub ef_search: usize,
    /// Seed for the deterministic layer-sampling PRNG.
    pub seed: u64,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            max_m: 16,
            max_m0: 32,
            ml: 1.0 / 2.0_f64.ln(),
            ef_construction: 200,
            ef_search: 50,
            seed: 0x5DEE_CE66_D1A4_B5B5,
        }
    }
}

impl HnswParams {
    /// Builds parameters from the collection-wide config, applying the
    /// `HNSW_*` environment-configurable fields.
    #[must_use]
    pub fn from_config(config: &VelesConfig) -> Self {
        Self {
            m: config.hnsw_m,
            max_m: config.hnsw_max_m,
            max_m0: config.hnsw_max_m0,
            ml: config.hnsw_ml,
            ef_construction: config.hnsw_ef_construction,
            ef_search: config.hnsw_ef_search,
            seed: config.hnsw_seed,
        }
    }

    /// Max neighbors for `layer`: `max_m0` at layer 0, `max_m` above it.
    #[must_use]
    pub fn max_neighbors(&self, layer: usize) -> usize {
        if layer == 0 {
            self.max_m0
        } else {
            self.max_m
        }
    }
}
