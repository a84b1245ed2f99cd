//! Request/response bodies for the REST API. These are deliberately separate
//! from `velesdb-core`'s own types: the wire format is allowed to evolve
//! independently of the storage-level representation.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use velesdb_core::{CollectionStats, DistanceMetric};

fn default_metric() -> String {
    "cosine".to_string()
}

fn default_index_kind() -> String {
    "flat".to_string()
}

/// Body of `POST /collections`.
#[derive(Debug, Deserialize)]
pub struct CreateCollectionRequest {
    /// Collection name.
    pub name: String,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Distance metric: `cosine`, `euclidean`, `dot`, or `manhattan`.
    #[serde(default = "default_metric")]
    pub metric: String,
    /// Index kind: `flat` or `hnsw`.
    #[serde(default = "default_index_kind")]
    pub index_kind: String,
}

/// Body of the `GET /collections/{name}` response.
#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    /// Collection name.
    pub name: String,
    /// Vector dimensionality.
    pub dimension: usize,
    /// Distance metric, lower-cased.
    pub metric: String,
    /// Index kind, lower-cased.
    pub index_kind: String,
    /// Number of live vectors.
    pub point_count: usize,
}

impl CollectionResponse {
    pub(crate) fn from_stats(name: String, stats: &CollectionStats) -> Self {
        Self {
            name,
            dimension: stats.dimensions,
            metric: stats.metric.to_string(),
            index_kind: format!("{:?}", stats.index_kind).to_lowercase(),
            point_count: stats.vector_count,
        }
    }
}

/// A single point in a `POST /collections/{name}/points` request body.
#[derive(Debug, Deserialize)]
pub struct PointRequest {
    /// Caller-assigned id.
    pub id: String,
    /// The embedding.
    pub vector: Vec<f32>,
    /// Metadata to attach.
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    /// Source content to attach.
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `POST /collections/{name}/points`.
#[derive(Debug, Deserialize)]
pub struct UpsertPointsRequest {
    /// Points to insert or overwrite.
    pub points: Vec<PointRequest>,
}

/// Response to a successful `POST /collections/{name}/points`.
#[derive(Debug, Serialize)]
pub struct UpsertPointsResponse {
    /// Number of points accepted before any validation failure.
    pub inserted: usize,
    /// Index of the first rejected point, if the batch did not complete.
    pub failed_at: Option<usize>,
}

/// Body of `POST /collections/{name}/search`.
#[derive(Debug, Deserialize, Default)]
pub struct SearchRequestBody {
    /// Query embedding.
    #[serde(default)]
    pub vector: Option<Vec<f32>>,
    /// Query text, embedded via the collection's bound embedder.
    #[serde(default)]
    pub text: Option<String>,
    /// Number of results to return.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Overrides the index's default search breadth (HNSW only).
    #[serde(default)]
    pub ef_search: Option<usize>,
    /// Metadata predicate, deserialized as a [`velesdb_core::Filter`].
    #[serde(default)]
    pub filter: Option<JsonValue>,
    /// Include each hit's stored vector.
    #[serde(default)]
    pub with_vectors: bool,
    /// Include each hit's stored metadata.
    #[serde(default)]
    pub with_metadata: bool,
    /// Include each hit's stored content.
    #[serde(default)]
    pub with_content: bool,
}

fn default_k() -> usize {
    10
}

/// A single ranked match in a search response.
#[derive(Debug, Serialize)]
pub struct SearchHitResponse {
    /// Id of the matched point.
    pub id: String,
    /// Distance score; smaller is closer.
    pub score: f32,
    /// Stored vector, present only if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<f32>>,
    /// Stored metadata, present only if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonValue>,
    /// Stored content, present only if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Response to a search request.
#[derive(Debug, Serialize)]
pub struct SearchResponseBody {
    /// Ranked hits.
    pub hits: Vec<SearchHitResponse>,
    /// True if a deadline or cancellation cut the search short.
    pub partial: bool,
}

/// Response to `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"degraded"`.
    pub status: &'static str,
    /// Number of collections currently open.
    pub collection_count: usize,
    /// Crate version, for quick client-side sanity checks.
    pub version: &'static str,
    /// Present only when `status` is `"degraded"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Parses a metric name from a request body the way `CreateCollectionRequest` spells it.
pub fn parse_metric(s: &str) -> Result<DistanceMetric, String> {
    s.to_lowercase()
        .parse()
        .map_err(|_| format!("invalid metric '{s}': expected cosine, euclidean, dot, or manhattan"))
}
