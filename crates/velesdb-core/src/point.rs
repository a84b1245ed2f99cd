//! The vector record and search-result data model.

#[cfg(test)]
mod point_tests;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Maximum encoded length, in bytes, of a vector id.
pub const MAX_ID_BYTES: usize = 256;

/// A single stored vector: an id, its embedding, optional metadata, and
/// optional source content (e.g. the text the embedding was computed from).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Caller-assigned identifier, unique within a collection.
    pub id: String,
    /// The embedding. Length must equal the owning collection's dimension.
    pub vector: Vec<f32>,
    /// Self-describing metadata tree (object, array, string, number, bool, null).
    #[serde(default = "default_metadata")]
    pub metadata: JsonValue,
    /// Optional source content carried alongside the embedding.
    #[serde(default)]
    pub content: Option<String>,
}

fn default_metadata() -> JsonValue {
    JsonValue::Object(serde_json::Map::new())
}

impl Point {
    /// Creates a new point with empty metadata and no content.
    #[must_use]
    pub fn new(id: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: default_metadata(),
            content: None,
        }
    }

    /// Attaches metadata, replacing whatever was set before.
    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attaches source content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Returns the embedding's dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Validates id shape and vector dimension ahead of a storage operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the id is empty or exceeds
    /// [`MAX_ID_BYTES`], or [`Error::DimensionMismatch`] if `vector.len()`
    /// does not equal `expected_dim`.
    pub fn validate(&self, expected_dim: usize) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::InvalidArgument("vector id must not be empty".into()));
        }
        if self.id.len() > MAX_ID_BYTES {
            return Err(Error::InvalidArgument(format!(
                "vector id exceeds {MAX_ID_BYTES} bytes"
            )));
        }
        if self.vector.len() != expected_dim {
            return Err(Error::DimensionMismatch {
                expected: expected_dim,
                actual: self.vector.len(),
            });
        }
        if self.vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidArgument("vector contains NaN or infinite component".into()));
        }
        Ok(())
    }
}

/// A single match returned by a search, carrying only what the caller asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matched point.
    pub id: String,
    /// Distance score under the collection's configured metric (ascending: smaller is closer).
    pub score: f32,
    /// The stored embedding, included when the caller requested `with_vectors`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    /// The stored metadata, included when the caller requested `with_metadata`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    /// The stored content, included when the caller requested `with_content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SearchHit {
    /// Creates a bare hit carrying only an id and score.
    #[must_use]
    pub const fn new(id: String, score: f32) -> Self {
        Self {
            id,
            score,
            vector: None,
            metadata: None,
            content: None,
        }
    }
}
