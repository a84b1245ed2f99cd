//! End-to-end tests against the router, exercising the full collection and
//! point lifecycle through HTTP requests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use velesdb_core::Database;
use velesdb_server::{router, AppState};

fn test_app() -> (axum::Router, TempDir) {
    let dir = TempDir::new().unwrap();
    let db = Database::open(dir.path()).unwrap();
    (router(Arc::new(AppState { db })), dir)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            builder.body(Body::from(value.to_string())).unwrap()
        }
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn test_full_collection_and_point_lifecycle() {
    // Arrange
    let (app, _dir) = test_app();

    // Act: create
    let (status, body) = send(&app, "POST", "/collections", Some(json!({"name": "docs", "dimension": 3}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "docs");

    // Act: insert two points
    let (status, _) = send(
        &app,
        "POST",
        "/collections/docs/points",
        Some(json!({"points": [
            {"id": "a", "vector": [1.0, 0.0, 0.0]},
            {"id": "b", "vector": [0.0, 1.0, 0.0]}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Act: search
    let (status, body) =
        send(&app, "POST", "/collections/docs/search", Some(json!({"vector": [0.9, 0.1, 0.0], "k": 1}))).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hits"][0]["id"], "a");

    // Act: get, then delete, then get again
    let (status, body) = send(&app, "GET", "/collections/docs/points/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "a");

    let (status, _) = send(&app, "DELETE", "/collections/docs/points/a", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", "/collections/docs/points/a", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_with_unknown_metric_is_bad_request() {
    // Arrange
    let (app, _dir) = test_app();

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/collections",
        Some(json!({"name": "docs", "dimension": 3, "metric": "not-a-metric"})),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not-a-metric"));
}

#[tokio::test]
async fn test_creating_same_collection_twice_conflicts() {
    // Arrange
    let (app, _dir) = test_app();
    send(&app, "POST", "/collections", Some(json!({"name": "docs", "dimension": 3}))).await;

    // Act
    let (status, _) = send(&app, "POST", "/collections", Some(json!({"name": "docs", "dimension": 3}))).await;

    // Assert
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_search_with_metadata_filter_narrows_results() {
    // Arrange
    let (app, _dir) = test_app();
    send(&app, "POST", "/collections", Some(json!({"name": "docs", "dimension": 2}))).await;
    send(
        &app,
        "POST",
        "/collections/docs/points",
        Some(json!({"points": [
            {"id": "a", "vector": [1.0, 0.0], "metadata": {"category": "tech"}},
            {"id": "b", "vector": [1.0, 0.1], "metadata": {"category": "sports"}}
        ]})),
    )
    .await;

    // Act
    let (status, body) = send(
        &app,
        "POST",
        "/collections/docs/search",
        Some(json!({
            "vector": [1.0, 0.0],
            "k": 5,
            "with_metadata": true,
            "filter": {"type": "eq", "field": "category", "value": "sports"}
        })),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hits"].as_array().unwrap().len(), 1);
    assert_eq!(body["hits"][0]["id"], "b");
}

#[tokio::test]
async fn test_drop_collection_then_list_is_empty() {
    // Arrange
    let (app, _dir) = test_app();
    send(&app, "POST", "/collections", Some(json!({"name": "docs", "dimension": 2}))).await;

    // Act
    let (status, _) = send(&app, "DELETE", "/collections/docs", None).await;

    // Assert
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/collections", None).await;
    assert!(body["collections"].as_array().unwrap().is_empty());
}
