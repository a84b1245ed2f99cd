//! Integration tests for the HNSW index.

use super::*;
use crate::index::CancellationToken;

fn params() -> HnswParams {
    HnswParams {
        m: 8,
        max_m: 8,
        max_m0: 16,
        ml: 1.0 / (2.0f64).ln(),
        ef_construction: 64,
        ef_search: 16,
        seed: 42,
    }
}

fn point(id: &str, vector: Vec<f32>) -> Point {
    Point::new(id, vector)
}

fn prng(seed: &mut u64) -> f32 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    ((*seed >> 40) as f32) / (1u64 << 24) as f32
}

#[test]
fn test_insert_and_search_returns_nearest() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    index.insert(&point("a", vec![0.0, 0.0])).unwrap();
    index.insert(&point("b", vec![10.0, 10.0])).unwrap();

    // Act
    let outcome = index.search(&[0.1, 0.1], 1, &SearchOptions::default()).unwrap();

    // Assert
    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].id, "a");
    assert!(!outcome.partial);
}

#[test]
fn test_insert_rejects_duplicate_id() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Cosine, params());
    index.insert(&point("a", vec![1.0, 0.0])).unwrap();

    // Act
    let result = index.insert(&point("a", vec![0.0, 1.0]));

    // Assert
    assert!(matches!(result, Err(Error::AlreadyExists(_))));
}

#[test]
fn test_insert_rejects_dimension_mismatch() {
    // Arrange
    let index = HnswIndex::new(3, DistanceMetric::Cosine, params());

    // Act
    let result = index.insert(&point("a", vec![1.0, 0.0]));

    // Assert
    assert!(matches!(result, Err(Error::DimensionMismatch { expected: 3, actual: 2 })));
}

#[test]
fn test_delete_removes_node_and_updates_len() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    index.insert(&point("a", vec![0.0, 0.0])).unwrap();
    index.insert(&point("b", vec![1.0, 1.0])).unwrap();

    // Act
    let removed = index.delete("a").unwrap();

    // Assert
    assert!(removed);
    assert_eq!(index.len(), 1);
    let outcome = index.search(&[0.0, 0.0], 2, &SearchOptions::default()).unwrap();
    assert!(outcome.hits.iter().all(|h| h.id != "a"));
}

#[test]
fn test_delete_missing_id_returns_false() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());

    // Act
    let removed = index.delete("missing").unwrap();

    // Assert
    assert!(!removed);
}

#[test]
fn test_delete_reassigns_entry_point() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    for i in 0..20 {
        index.insert(&point(&format!("v{i}"), vec![i as f32, 0.0])).unwrap();
    }
    let entry_id = {
        let snapshot = index.snapshot();
        snapshot.nodes[0].0.clone()
    };

    // Act
    index.delete(&entry_id).unwrap();
    let outcome = index.search(&[5.0, 0.0], 1, &SearchOptions::default());

    // Assert: graph is still searchable after its entry point is removed.
    assert!(outcome.is_ok());
    assert_eq!(index.len(), 19);
}

#[test]
fn test_search_on_empty_graph_returns_no_hits() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());

    // Act
    let outcome = index.search(&[0.0, 0.0], 5, &SearchOptions::default()).unwrap();

    // Assert
    assert!(outcome.hits.is_empty());
    assert!(!outcome.partial);
}

#[test]
fn test_search_k_zero_returns_no_hits() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    index.insert(&point("a", vec![0.0, 0.0])).unwrap();

    // Act
    let outcome = index.search(&[0.0, 0.0], 0, &SearchOptions::default()).unwrap();

    // Assert
    assert!(outcome.hits.is_empty());
}

#[test]
fn test_search_already_cancelled_returns_partial() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    for i in 0..10 {
        index.insert(&point(&format!("v{i}"), vec![i as f32, 0.0])).unwrap();
    }
    let token = CancellationToken::new();
    token.cancel();
    let opts = SearchOptions {
        cancel: Some(token),
        ..SearchOptions::default()
    };

    // Act
    let outcome = index.search(&[0.0, 0.0], 3, &opts).unwrap();

    // Assert
    assert!(outcome.partial);
}

#[test]
fn test_snapshot_roundtrip_preserves_search_results() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    for i in 0..30 {
        index.insert(&point(&format!("v{i}"), vec![i as f32, (i % 5) as f32])).unwrap();
    }
    let snapshot = index.snapshot();

    // Act
    let restored = HnswIndex::from_snapshot(snapshot, 2, DistanceMetric::Euclidean, params()).unwrap();

    // Assert
    assert_eq!(restored.len(), 30);
    let outcome = restored.search(&[15.0, 0.0], 1, &SearchOptions::default()).unwrap();
    assert_eq!(outcome.hits.len(), 1);
}

#[test]
fn test_from_snapshot_rejects_dimension_mismatch() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    index.insert(&point("a", vec![0.0, 0.0])).unwrap();
    let snapshot = index.snapshot();

    // Act
    let result = HnswIndex::from_snapshot(snapshot, 3, DistanceMetric::Euclidean, params());

    // Assert
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_from_snapshot_rejects_metric_mismatch() {
    // Arrange
    let index = HnswIndex::new(2, DistanceMetric::Euclidean, params());
    index.insert(&point("a", vec![0.0, 0.0])).unwrap();
    let snapshot = index.snapshot();

    // Act
    let result = HnswIndex::from_snapshot(snapshot, 2, DistanceMetric::Cosine, params());

    // Assert
    assert!(matches!(result, Err(Error::Corruption(_))));
}

#[test]
fn test_large_insert_exact_match_recall() {
    // Arrange: 500 vectors from a fixed PRNG seed; query equal to an inserted vector.
    let dims = 8;
    let index = HnswIndex::new(
        dims,
        DistanceMetric::Euclidean,
        HnswParams {
            m: 8,
            max_m: 8,
            max_m0: 16,
            ml: 1.0 / (2.0f64).ln(),
            ef_construction: 64,
            ef_search: 16,
            seed: 1234,
        },
    );
    let mut seed = 0x9E37_79B9_7F4A_7C15u64;
    let mut vectors = Vec::with_capacity(500);
    for i in 0..500 {
        let v: Vec<f32> = (0..dims).map(|_| prng(&mut seed)).collect();
        index.insert(&point(&format!("v{i}"), v.clone())).unwrap();
        vectors.push(v);
    }

    // Act
    let query = vectors[123].clone();
    let outcome = index.search(&query, 1, &SearchOptions::default()).unwrap();

    // Assert
    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].id, "v123");
    assert!(outcome.hits[0].score.abs() < 1e-4);
}
