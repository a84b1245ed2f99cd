//! Tests for the result cache

use super::*;
use crate::filter::Condition;
use crate::point::SearchHit;
use std::time::Duration;

#[test]
fn test_put_then_get_roundtrip() {
    // Arrange
    let cache = ResultCache::new(10, Duration::from_secs(60));
    let fp = ResultCache::fingerprint(&[1.0, 2.0], 10, None, None, false, false, false);
    let hits = vec![SearchHit::new("a".into(), 0.1)];

    // Act
    cache.put(fp, 0, hits.clone());
    let found = cache.get(fp, 0);

    // Assert
    assert_eq!(found.map(|h| h.len()), Some(1));
}

#[test]
fn test_stale_generation_is_treated_as_miss() {
    // Arrange
    let cache = ResultCache::new(10, Duration::from_secs(60));
    let fp = ResultCache::fingerprint(&[1.0], 5, None, None, false, false, false);
    cache.put(fp, 1, vec![SearchHit::new("a".into(), 0.1)]);

    // Act - a write bumped the generation to 2 since the entry was cached
    let found = cache.get(fp, 2);

    // Assert
    assert!(found.is_none());
    assert_eq!(cache.len(), 0, "stale entry should be evicted on lookup");
}

#[test]
fn test_expired_ttl_is_treated_as_miss() {
    // Arrange
    let cache = ResultCache::new(10, Duration::from_millis(0));
    let fp = ResultCache::fingerprint(&[1.0], 5, None, None, false, false, false);
    cache.put(fp, 0, vec![SearchHit::new("a".into(), 0.1)]);

    // Act
    std::thread::sleep(Duration::from_millis(5));
    let found = cache.get(fp, 0);

    // Assert
    assert!(found.is_none());
}

#[test]
fn test_fingerprint_is_deterministic() {
    // Arrange & Act
    let a = ResultCache::fingerprint(&[1.0, 2.0], 10, Some(64), None, true, false, false);
    let b = ResultCache::fingerprint(&[1.0, 2.0], 10, Some(64), None, true, false, false);

    // Assert
    assert_eq!(a, b);
}

#[test]
fn test_fingerprint_differs_on_filter() {
    // Arrange
    let filter_a = Filter::new(Condition::eq("category", "tech"));
    let filter_b = Filter::new(Condition::eq("category", "science"));

    // Act
    let fp_a = ResultCache::fingerprint(&[1.0], 10, None, Some(&filter_a), false, false, false);
    let fp_b = ResultCache::fingerprint(&[1.0], 10, None, Some(&filter_b), false, false, false);

    // Assert
    assert_ne!(fp_a, fp_b);
}

#[test]
fn test_fingerprint_differs_on_projection_flags() {
    // Arrange & Act
    let fp_a = ResultCache::fingerprint(&[1.0], 10, None, None, true, false, false);
    let fp_b = ResultCache::fingerprint(&[1.0], 10, None, None, false, false, false);

    // Assert
    assert_ne!(fp_a, fp_b);
}

#[test]
fn test_fingerprint_rounds_components_to_significant_digits() {
    // Arrange - two bit-distinct floats that agree to 6 significant digits
    let a = 1.234_567_f32;
    let b = 1.234_568_f32;

    // Act
    let fp_a = ResultCache::fingerprint(&[a], 10, None, None, false, false, false);
    let fp_b = ResultCache::fingerprint(&[b], 10, None, None, false, false, false);

    // Assert
    assert_eq!(fp_a, fp_b);
}

#[test]
fn test_fingerprint_still_differs_beyond_significant_digits() {
    // Arrange
    let a = 0.1_f32;
    let b = 0.2_f32;

    // Act
    let fp_a = ResultCache::fingerprint(&[a], 10, None, None, false, false, false);
    let fp_b = ResultCache::fingerprint(&[b], 10, None, None, false, false, false);

    // Assert
    assert_ne!(fp_a, fp_b);
}

#[test]
fn test_round_to_significant_digits_preserves_zero_and_sign() {
    // Arrange & Act & Assert
    assert_eq!(round_to_significant_digits(0.0, 6), 0.0);
    assert_eq!(round_to_significant_digits(-1.0, 6), -1.0);
}

#[test]
fn test_sweep_expired_removes_only_stale_entries() {
    // Arrange
    let cache = ResultCache::new(10, Duration::from_millis(0));
    let fp = ResultCache::fingerprint(&[1.0], 5, None, None, false, false, false);
    cache.put(fp, 0, vec![SearchHit::new("a".into(), 0.1)]);
    std::thread::sleep(Duration::from_millis(5));

    // Act
    cache.sweep_expired();

    // Assert
    assert!(cache.is_empty());
}
