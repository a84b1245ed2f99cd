//! Distance kernels for vector similarity.
//!
//! All four metrics are oriented ascending: a smaller value always means
//! "more similar". Dot product is naturally a similarity (higher is better),
//! so it is negated here to fit the same ordering as the others — callers
//! never need to special-case a metric when sorting candidates.

#[cfg(test)]
mod distance_tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Distance metric used to score candidates against a query vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// `1 - cosine_similarity(a, b)`. Scale-invariant; the default for text embeddings.
    Cosine,
    /// L2 norm of `a - b`.
    Euclidean,
    /// `-(a . b)`, negated so smaller is better like the other metrics.
    Dot,
    /// L1 norm of `a - b`.
    Manhattan,
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Dot => "dot",
            Self::Manhattan => "manhattan",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cosine" => Ok(Self::Cosine),
            "euclidean" => Ok(Self::Euclidean),
            "dot" => Ok(Self::Dot),
            "manhattan" => Ok(Self::Manhattan),
            other => Err(Error::InvalidArgument(format!("unknown distance metric '{other}'"))),
        }
    }
}

impl DistanceMetric {
    /// Single-byte tag used by on-disk formats (HNSW index file, collection descriptor).
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Cosine => 0,
            Self::Euclidean => 1,
            Self::Dot => 2,
            Self::Manhattan => 3,
        }
    }

    /// Decodes a metric tag written by [`DistanceMetric::tag`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if `tag` is not a recognized value.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Cosine),
            1 => Ok(Self::Euclidean),
            2 => Ok(Self::Dot),
            3 => Ok(Self::Manhattan),
            _ => Err(Error::Corruption(format!("unknown distance metric tag {tag}"))),
        }
    }

    /// Computes the distance between two vectors of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `a` and `b` have different lengths.
    pub fn distance(self, a: &[f32], b: &[f32]) -> Result<f32> {
        if a.len() != b.len() {
            return Err(Error::InvalidArgument(format!(
                "vector length mismatch: {} vs {}",
                a.len(),
                b.len()
            )));
        }
        Ok(match self {
            Self::Cosine => cosine_distance(a, b),
            Self::Euclidean => euclidean_distance(a, b),
            Self::Dot => -dot_product(a, b),
            Self::Manhattan => manhattan_distance(a, b),
        })
    }
}

/// Unrolled accumulation in groups of four. Numerically equivalent to the
/// naive sum within float rounding error; exists as the fast path toggled by
/// `PERF_ENABLE_SIMD` in the ambient config.
fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    let chunks = a.len() / 4;
    let mut acc = [0.0f32; 4];
    for i in 0..chunks {
        let base = i * 4;
        acc[0] += a[base] * b[base];
        acc[1] += a[base + 1] * b[base + 1];
        acc[2] += a[base + 2] * b[base + 2];
        acc[3] += a[base + 3] * b[base + 3];
    }
    let mut total = acc[0] + acc[1] + acc[2] + acc[3];
    for i in (chunks * 4)..a.len() {
        total += a[i] * b[i];
    }
    total
}

fn norm(v: &[f32]) -> f32 {
    dot_product(v, v).sqrt()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let na = norm(a);
    let nb = norm(b);
    if na == 0.0 && nb == 0.0 {
        return 0.0;
    }
    if na == 0.0 || nb == 0.0 {
        return 1.0;
    }
    1.0 - dot_product(a, b) / (na * nb)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f32>().sqrt()
}

fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}
