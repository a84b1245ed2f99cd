//! Point CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::types::{PointRequest, UpsertPointsRequest, UpsertPointsResponse};
use crate::AppState;
use velesdb_core::{Error, Point};

fn to_point(req: PointRequest) -> Point {
    let mut point = Point::new(req.id, req.vector);
    if let Some(metadata) = req.metadata {
        point = point.with_metadata(metadata);
    }
    if let Some(content) = req.content {
        point = point.with_content(content);
    }
    point
}

/// `POST /collections/{name}/points` — inserts or overwrites a batch of points.
///
/// Per the underlying [`velesdb_core::Collection::insert_batch`] contract, the
/// batch stops at the first invalid point; everything before it is durable.
pub async fn upsert_points(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(req): Json<UpsertPointsRequest>,
) -> ApiResult<Json<UpsertPointsResponse>> {
    let collection = state
        .db
        .get_collection(&name)
        .ok_or_else(|| ApiError(Error::NotFound(format!("collection '{name}' not found"))))?;

    let points: Vec<Point> = req.points.into_iter().map(to_point).collect();
    let outcome = collection.insert_batch(&points);
    Ok(Json(UpsertPointsResponse { inserted: outcome.inserted, failed_at: outcome.failed_at }))
}

/// `GET /collections/{name}/points/{id}` — fetches a point by id.
pub async fn get_point(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<Json<Point>> {
    let collection = state
        .db
        .get_collection(&name)
        .ok_or_else(|| ApiError(Error::NotFound(format!("collection '{name}' not found"))))?;
    let point = collection
        .get(&id)?
        .ok_or_else(|| ApiError(Error::NotFound(format!("point '{id}' not found"))))?;
    Ok(Json(point))
}

/// `DELETE /collections/{name}/points/{id}` — deletes a point by id.
pub async fn delete_point(
    State(state): State<Arc<AppState>>,
    Path((name, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let collection = state
        .db
        .get_collection(&name)
        .ok_or_else(|| ApiError(Error::NotFound(format!("collection '{name}' not found"))))?;
    let removed = collection.delete(&id)?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError(Error::NotFound(format!("point '{id}' not found"))))
    }
}
