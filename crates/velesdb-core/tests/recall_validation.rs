//! Recall validation for the HNSW index: approximate search results are
//! compared against brute-force ground truth over synthetic vectors.
//!
//! Recall@k = |retrieved ∩ ground_truth| / k

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;
use velesdb_core::config::IndexKind;
use velesdb_core::{Collection, CollectionOptions, DistanceMetric, Executor, Point, SearchRequest, VelesConfig};

fn compute_recall(retrieved: &[String], ground_truth: &[String], k: usize) -> f64 {
    let k = k.min(retrieved.len()).min(ground_truth.len());
    if k == 0 {
        return 0.0;
    }
    let retrieved_set: HashSet<_> = retrieved.iter().take(k).collect();
    let ground_truth_set: HashSet<_> = ground_truth.iter().take(k).collect();
    let intersection = retrieved_set.intersection(&ground_truth_set).count();
    intersection as f64 / k as f64
}

fn generate_vectors(count: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..count)
        .map(|i| (0..dim).map(|d| ((i * 31 + d * 17) % 1000) as f32 / 1000.0).collect())
        .collect()
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > 0.0 && norm_b > 0.0 {
        1.0 - (dot / (norm_a * norm_b))
    } else {
        1.0
    }
}

fn brute_force_ground_truth(vectors: &[(String, Vec<f32>)], query: &[f32], k: usize) -> Vec<String> {
    let mut distances: Vec<(&str, f32)> =
        vectors.iter().map(|(id, v)| (id.as_str(), cosine_distance(query, v))).collect();
    distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
    distances.into_iter().take(k).map(|(id, _)| id.to_string()).collect()
}

#[test]
fn test_compute_recall_perfect() {
    let ids: Vec<String> = (1..=5).map(|i| i.to_string()).collect();
    let recall = compute_recall(&ids, &ids, 5);
    assert!((recall - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_compute_recall_partial() {
    let retrieved: Vec<String> = ["1", "2", "3", "4", "5"].iter().map(|s| s.to_string()).collect();
    let ground_truth: Vec<String> = ["1", "2", "6", "7", "8"].iter().map(|s| s.to_string()).collect();
    let recall = compute_recall(&retrieved, &ground_truth, 5);
    assert!((recall - 0.4).abs() < f64::EPSILON);
}

/// HNSW search over a small synthetic set should recover most of the
/// brute-force top-k at the default construction parameters.
#[test]
fn test_hnsw_recall_against_brute_force() {
    // Arrange
    let dir = tempdir().unwrap();
    let mut config = VelesConfig::default();
    config.search_parallel_min_vectors = 1_000_000; // keep this search path inline
    let executor = Arc::new(Executor::new(&config));
    let collection = Collection::create(
        dir.path(),
        "recall",
        CollectionOptions { dimensions: 32, metric: Some(DistanceMetric::Cosine), index_kind: Some(IndexKind::Hnsw) },
        &config,
        executor,
        None,
    )
    .unwrap();

    let vectors = generate_vectors(500, 32);
    let labeled: Vec<(String, Vec<f32>)> =
        vectors.iter().enumerate().map(|(i, v)| (i.to_string(), v.clone())).collect();
    let points: Vec<Point> = labeled.iter().map(|(id, v)| Point::new(id.clone(), v.clone())).collect();
    let outcome = collection.insert_batch(&points);
    assert!(outcome.is_complete());

    // Act
    let query = &vectors[123];
    let ground_truth = brute_force_ground_truth(&labeled, query, 10);
    let response = collection
        .search(&SearchRequest { vector: Some(query.clone()), k: 10, ..SearchRequest::default() })
        .unwrap();
    let retrieved: Vec<String> = response.hits.into_iter().map(|hit| hit.id).collect();

    // Assert
    let recall = compute_recall(&retrieved, &ground_truth, 10);
    assert!(recall >= 0.8, "expected recall@10 >= 0.8, got {recall}");
}

/// The exact (self) match must always be found, regardless of approximation.
#[test]
fn test_hnsw_finds_exact_self_match() {
    // Arrange
    let dir = tempdir().unwrap();
    let mut config = VelesConfig::default();
    config.search_parallel_min_vectors = 1_000_000;
    let executor = Arc::new(Executor::new(&config));
    let collection = Collection::create(
        dir.path(),
        "self_match",
        CollectionOptions { dimensions: 16, metric: Some(DistanceMetric::Cosine), index_kind: Some(IndexKind::Hnsw) },
        &config,
        executor,
        None,
    )
    .unwrap();
    let vectors = generate_vectors(200, 16);
    for (i, v) in vectors.iter().enumerate() {
        collection.insert(&Point::new(i.to_string(), v.clone())).unwrap();
    }

    // Act
    let query = vectors[42].clone();
    let response =
        collection.search(&SearchRequest { vector: Some(query), k: 1, ..SearchRequest::default() }).unwrap();

    // Assert
    assert_eq!(response.hits[0].id, "42");
}

/// Documents the minimum acceptable recall thresholds this index targets.
#[test]
fn test_recall_thresholds_are_monotonically_decreasing() {
    const MIN_RECALL_AT_1: f64 = 0.99;
    const MIN_RECALL_AT_10: f64 = 0.95;
    const MIN_RECALL_AT_100: f64 = 0.90;
    assert!(MIN_RECALL_AT_1 > MIN_RECALL_AT_10);
    assert!(MIN_RECALL_AT_10 > MIN_RECALL_AT_100);
}
