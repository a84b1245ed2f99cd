//! Collection lifecycle handlers: list, create, inspect, drop.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::types::{parse_metric, CollectionResponse, CreateCollectionRequest};
use crate::AppState;
use velesdb_core::config::IndexKind;
use velesdb_core::{CollectionOptions, Error};

/// `GET /collections` — names of every open collection.
pub async fn list_collections(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "collections": state.db.list_collections() }))
}

/// `POST /collections` — creates a new collection.
pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCollectionRequest>,
) -> ApiResult<(StatusCode, Json<CollectionResponse>)> {
    let metric = parse_metric(&req.metric).map_err(|e| ApiError(Error::InvalidArgument(e)))?;
    let index_kind = IndexKind::from_str(&req.index_kind.to_lowercase())?;

    let options = CollectionOptions {
        dimensions: req.dimension,
        metric: Some(metric),
        index_kind: Some(index_kind),
    };
    let collection = state.db.create_collection(&req.name, options)?;
    let response = CollectionResponse::from_stats(req.name, &collection.stats());
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /collections/{name}` — collection metadata and vector count.
pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<CollectionResponse>> {
    let collection = state
        .db
        .get_collection(&name)
        .ok_or_else(|| ApiError(Error::NotFound(format!("collection '{name}' not found"))))?;
    Ok(Json(CollectionResponse::from_stats(name, &collection.stats())))
}

/// `DELETE /collections/{name}` — drops a collection and its on-disk files.
pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.drop_collection(&name)?;
    Ok(StatusCode::NO_CONTENT)
}
