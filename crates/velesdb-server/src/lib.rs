//! `VelesDB` Server — a thin axum REST surface over `velesdb-core`.
//!
//! Every handler here does argument parsing and status-code mapping only;
//! all storage, indexing, and search logic lives in [`velesdb_core`].

mod error;
mod handlers;
mod types;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use handlers::{
    create_collection, delete_collection, delete_point, get_collection, get_point, health_check,
    list_collections, search, upsert_points,
};
pub use types::{
    CollectionResponse, CreateCollectionRequest, HealthResponse, PointRequest,
    SearchHitResponse, SearchRequestBody, SearchResponseBody, UpsertPointsRequest,
    UpsertPointsResponse,
};

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use velesdb_core::Database;

/// Application state shared across handlers.
pub struct AppState {
    /// The `VelesDB` database instance.
    pub db: Database,
}

/// Builds the full request router over a shared [`AppState`].
///
/// 100MB body limit on the points endpoint: 1000 vectors at 1536 dimensions
/// (f32) is already ~6MB, so this comfortably covers realistic batch sizes.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/collections", get(list_collections).post(create_collection))
        .route(
            "/collections/{name}",
            get(get_collection).delete(delete_collection),
        )
        .route(
            "/collections/{name}/points",
            post(upsert_points).layer(DefaultBodyLimit::max(100 * 1024 * 1024)),
        )
        .route(
            "/collections/{name}/points/{id}",
            get(get_point).delete(delete_point),
        )
        .route("/collections/{name}/search", post(search))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        let router = router(Arc::new(AppState { db }));
        (router, dir)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_healthy_with_no_collections() {
        // Arrange
        let (app, _dir) = test_app();

        // Act
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_create_collection_then_get_returns_its_metadata() {
        // Arrange
        let (app, _dir) = test_app();
        let create = Request::builder()
            .method("POST")
            .uri("/collections")
            .header("content-type", "application/json")
            .body(Body::from(json!({"name": "docs", "dimension": 3}).to_string()))
            .unwrap();

        // Act
        let created = app.clone().oneshot(create).await.unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);

        let get = Request::builder().uri("/collections/docs").body(Body::empty()).unwrap();
        let response = app.oneshot(get).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["dimension"], 3);
        assert_eq!(body["point_count"], 0);
    }

    #[tokio::test]
    async fn test_get_missing_collection_is_not_found() {
        // Arrange
        let (app, _dir) = test_app();

        // Act
        let response = app
            .oneshot(Request::builder().uri("/collections/ghost").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["code"], "VELES-002");
    }

    #[tokio::test]
    async fn test_upsert_then_search_finds_the_nearest_point() {
        // Arrange
        let (app, _dir) = test_app();
        let create = Request::builder()
            .method("POST")
            .uri("/collections")
            .header("content-type", "application/json")
            .body(Body::from(json!({"name": "docs", "dimension": 2}).to_string()))
            .unwrap();
        app.clone().oneshot(create).await.unwrap();

        let upsert = Request::builder()
            .method("POST")
            .uri("/collections/docs/points")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"points": [{"id": "a", "vector": [1.0, 0.0]}]}).to_string(),
            ))
            .unwrap();
        app.clone().oneshot(upsert).await.unwrap();

        // Act
        let search = Request::builder()
            .method("POST")
            .uri("/collections/docs/search")
            .header("content-type", "application/json")
            .body(Body::from(json!({"vector": [1.0, 0.1], "k": 1}).to_string()))
            .unwrap();
        let response = app.oneshot(search).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["hits"][0]["id"], "a");
    }

    #[tokio::test]
    async fn test_delete_point_then_get_is_not_found() {
        // Arrange
        let (app, _dir) = test_app();
        let create = Request::builder()
            .method("POST")
            .uri("/collections")
            .header("content-type", "application/json")
            .body(Body::from(json!({"name": "docs", "dimension": 2}).to_string()))
            .unwrap();
        app.clone().oneshot(create).await.unwrap();
        let upsert = Request::builder()
            .method("POST")
            .uri("/collections/docs/points")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"points": [{"id": "a", "vector": [1.0, 0.0]}]}).to_string(),
            ))
            .unwrap();
        app.clone().oneshot(upsert).await.unwrap();

        // Act
        let delete = Request::builder()
            .method("DELETE")
            .uri("/collections/docs/points/a")
            .body(Body::empty())
            .unwrap();
        let deleted = app.clone().oneshot(delete).await.unwrap();

        // Assert
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);
        let get = Request::builder()
            .uri("/collections/docs/points/a")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(get).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
