//! Tests for the `flat` index

use super::*;
use crate::distance::DistanceMetric;

fn point(id: &str, values: Vec<f32>) -> Point {
    Point::new(id, values)
}

#[test]
fn test_insert_then_search_returns_nearest_first() {
    // Arrange
    let index = FlatIndex::new(2, DistanceMetric::Euclidean);
    index.insert(&point("far", vec![10.0, 10.0])).unwrap();
    index.insert(&point("near", vec![0.1, 0.0])).unwrap();
    index.insert(&point("mid", vec![1.0, 1.0])).unwrap();

    // Act
    let outcome = index.search(&[0.0, 0.0], 2, &SearchOptions::default()).unwrap();

    // Assert
    assert_eq!(outcome.hits.len(), 2);
    assert_eq!(outcome.hits[0].id, "near");
    assert_eq!(outcome.hits[1].id, "mid");
    assert!(!outcome.partial);
}

#[test]
fn test_insert_rejects_duplicate_id() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    index.insert(&point("a", vec![1.0])).unwrap();

    // Act
    let result = index.insert(&point("a", vec![2.0]));

    // Assert
    assert!(matches!(result, Err(crate::error::Error::AlreadyExists(_))));
}

#[test]
fn test_insert_rejects_dimension_mismatch() {
    // Arrange
    let index = FlatIndex::new(3, DistanceMetric::Euclidean);

    // Act
    let result = index.insert(&point("a", vec![1.0, 2.0]));

    // Assert
    assert!(matches!(result, Err(crate::error::Error::DimensionMismatch { .. })));
}

#[test]
fn test_delete_removes_from_search_results() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    index.insert(&point("a", vec![1.0])).unwrap();
    index.insert(&point("b", vec![2.0])).unwrap();

    // Act
    let deleted = index.delete("a").unwrap();
    let outcome = index.search(&[1.0], 10, &SearchOptions::default()).unwrap();

    // Assert
    assert!(deleted);
    assert_eq!(outcome.hits.len(), 1);
    assert_eq!(outcome.hits[0].id, "b");
}

#[test]
fn test_delete_missing_id_returns_false() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);

    // Act
    let deleted = index.delete("missing").unwrap();

    // Assert
    assert!(!deleted);
}

#[test]
fn test_len_tracks_live_count_across_inserts_and_deletes() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    index.insert(&point("a", vec![1.0])).unwrap();
    index.insert(&point("b", vec![2.0])).unwrap();

    // Act
    index.delete("a").unwrap();

    // Assert
    assert_eq!(index.len(), 1);
}

#[test]
fn test_search_respects_k_even_with_more_candidates() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    for i in 0..10 {
        index.insert(&point(&format!("p{i}"), vec![i as f32])).unwrap();
    }

    // Act
    let outcome = index.search(&[0.0], 3, &SearchOptions::default()).unwrap();

    // Assert
    assert_eq!(outcome.hits.len(), 3);
    assert_eq!(outcome.hits[0].id, "p0");
}

#[test]
fn test_search_breaks_ties_by_ascending_id() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    index.insert(&point("z", vec![0.0])).unwrap();
    index.insert(&point("a", vec![0.0])).unwrap();

    // Act
    let outcome = index.search(&[0.0], 2, &SearchOptions::default()).unwrap();

    // Assert
    assert_eq!(outcome.hits[0].id, "a");
    assert_eq!(outcome.hits[1].id, "z");
}

#[test]
fn test_search_rejects_dimension_mismatch() {
    // Arrange
    let index = FlatIndex::new(3, DistanceMetric::Euclidean);

    // Act
    let result = index.search(&[1.0], 1, &SearchOptions::default());

    // Assert
    assert!(matches!(result, Err(crate::error::Error::DimensionMismatch { .. })));
}

#[test]
fn test_search_already_cancelled_returns_partial() {
    // Arrange
    let index = FlatIndex::new(1, DistanceMetric::Euclidean);
    index.insert(&point("a", vec![1.0])).unwrap();
    let token = crate::index::CancellationToken::new();
    token.cancel();
    let opts = SearchOptions {
        cancel: Some(token),
        ..Default::default()
    };

    // Act
    let outcome = index.search(&[1.0], 1, &opts).unwrap();

    // Assert
    assert!(outcome.partial);
}
