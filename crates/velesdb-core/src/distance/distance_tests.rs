//! Tests for `distance` module

use super::*;
use std::str::FromStr;

#[test]
fn test_cosine_identical_vectors_is_zero() {
    let a = vec![1.0, 0.0, 0.0];
    let dist = DistanceMetric::Cosine.distance(&a, &a).unwrap();
    assert!(dist.abs() < 1e-6);
}

#[test]
fn test_cosine_orthogonal_vectors_is_one() {
    let a = vec![1.0, 0.0, 0.0];
    let b = vec![0.0, 1.0, 0.0];
    let dist = DistanceMetric::Cosine.distance(&a, &b).unwrap();
    assert!((dist - 1.0).abs() < 1e-6);
}

#[test]
fn test_cosine_zero_vector_is_well_defined() {
    let a = vec![0.0, 0.0, 0.0];
    let b = vec![1.0, 2.0, 3.0];
    let dist = DistanceMetric::Cosine.distance(&a, &b).unwrap();
    assert!((dist - 1.0).abs() < 1e-6);
}

#[test]
fn test_cosine_both_zero_vectors_is_zero() {
    let a = vec![0.0, 0.0, 0.0];
    let b = vec![0.0, 0.0, 0.0];
    let dist = DistanceMetric::Cosine.distance(&a, &b).unwrap();
    assert!(dist.abs() < 1e-6);
}

#[test]
fn test_euclidean_distance() {
    let a = vec![0.0, 0.0, 0.0];
    let b = vec![3.0, 4.0, 0.0];
    let dist = DistanceMetric::Euclidean.distance(&a, &b).unwrap();
    assert!((dist - 5.0).abs() < 1e-6);
}

#[test]
fn test_dot_is_negated() {
    let a = vec![1.0, 2.0, 3.0];
    let b = vec![4.0, 5.0, 6.0];
    // raw dot product is 32, so the stored distance should be -32
    let dist = DistanceMetric::Dot.distance(&a, &b).unwrap();
    assert!((dist + 32.0).abs() < 1e-6);
}

#[test]
fn test_manhattan_distance() {
    let a = vec![1.0, -2.0, 3.0];
    let b = vec![4.0, 0.0, -1.0];
    let dist = DistanceMetric::Manhattan.distance(&a, &b).unwrap();
    assert!((dist - (3.0 + 2.0 + 4.0)).abs() < 1e-6);
}

#[test]
fn test_length_mismatch_is_invalid_argument() {
    let a = vec![1.0, 2.0];
    let b = vec![1.0, 2.0, 3.0];
    let err = DistanceMetric::Cosine.distance(&a, &b).unwrap_err();
    assert_eq!(err.code(), "VELES-001");
}

#[test]
fn test_all_metrics_ascending_orders_nearest_first() {
    // A query vector and two candidates: `near` should always sort before `far`
    // regardless of which metric is in play, since all are ascending now.
    let query = vec![1.0, 0.0];
    let near = vec![0.9, 0.1];
    let far = vec![-1.0, 0.0];

    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Dot,
        DistanceMetric::Manhattan,
    ] {
        let d_near = metric.distance(&query, &near).unwrap();
        let d_far = metric.distance(&query, &far).unwrap();
        assert!(d_near < d_far, "{metric} should rank `near` ahead of `far`");
    }
}

#[test]
fn test_metric_serialization_roundtrip() {
    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Dot,
        DistanceMetric::Manhattan,
    ] {
        let json = serde_json::to_string(&metric).unwrap();
        let back: DistanceMetric = serde_json::from_str(&json).unwrap();
        assert_eq!(metric, back);
    }
}

#[test]
fn test_metric_from_str() {
    assert_eq!(DistanceMetric::from_str("cosine").unwrap(), DistanceMetric::Cosine);
    assert_eq!(DistanceMetric::from_str("manhattan").unwrap(), DistanceMetric::Manhattan);
    assert!(DistanceMetric::from_str("bogus").is_err());
}

#[test]
fn test_metric_display_roundtrips_through_from_str() {
    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Dot,
        DistanceMetric::Manhattan,
    ] {
        let s = metric.to_string();
        assert_eq!(DistanceMetric::from_str(&s).unwrap(), metric);
    }
}

#[test]
fn test_metric_tag_roundtrips() {
    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Dot,
        DistanceMetric::Manhattan,
    ] {
        assert_eq!(DistanceMetric::from_tag(metric.tag()).unwrap(), metric);
    }
}

#[test]
fn test_metric_from_tag_rejects_unknown_value() {
    assert!(DistanceMetric::from_tag(200).is_err());
}
