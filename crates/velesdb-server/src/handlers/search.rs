//! Similarity search handler.

use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::types::{SearchHitResponse, SearchRequestBody, SearchResponseBody};
use crate::AppState;
use velesdb_core::{Condition, Error, Filter, SearchRequest};

/// `POST /collections/{name}/search` — vector or text similarity search.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<SearchRequestBody>,
) -> ApiResult<Json<SearchResponseBody>> {
    let collection = state
        .db
        .get_collection(&name)
        .ok_or_else(|| ApiError(Error::NotFound(format!("collection '{name}' not found"))))?;

    let filter = match req.filter {
        Some(value) => Some(Filter::new(
            serde_json::from_value::<Condition>(value)
                .map_err(|e| ApiError(Error::InvalidArgument(format!("invalid filter: {e}"))))?,
        )),
        None => None,
    };

    let request = SearchRequest {
        vector: req.vector,
        text: req.text,
        k: req.k,
        ef_search: req.ef_search,
        filter,
        with_vectors: req.with_vectors,
        with_metadata: req.with_metadata,
        with_content: req.with_content,
        deadline: None,
        cancel: None,
    };

    let response = collection.search(&request)?;
    let hits = response
        .hits
        .into_iter()
        .map(|hit| SearchHitResponse {
            id: hit.id,
            score: hit.score,
            vector: hit.vector,
            metadata: hit.metadata,
            content: hit.content,
        })
        .collect();

    Ok(Json(SearchResponseBody { hits, partial: response.partial }))
}
