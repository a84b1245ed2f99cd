//! Tests for the `point` module

use super::*;
use serde_json::json;

#[test]
fn test_new_point_has_empty_metadata_and_no_content() {
    // Arrange & Act
    let p = Point::new("a", vec![1.0, 2.0]);

    // Assert
    assert_eq!(p.metadata, serde_json::Value::Object(serde_json::Map::new()));
    assert!(p.content.is_none());
    assert_eq!(p.dimension(), 2);
}

#[test]
fn test_with_metadata_and_content_builders() {
    // Arrange & Act
    let p = Point::new("a", vec![1.0])
        .with_metadata(json!({"title": "hello"}))
        .with_content("hello world");

    // Assert
    assert_eq!(p.metadata["title"], "hello");
    assert_eq!(p.content.as_deref(), Some("hello world"));
}

#[test]
fn test_validate_rejects_empty_id() {
    // Arrange
    let p = Point::new("", vec![1.0, 2.0]);

    // Act
    let result = p.validate(2);

    // Assert
    assert!(result.is_err());
    assert_eq!(result.unwrap_err().code(), "VELES-001");
}

#[test]
fn test_validate_rejects_oversized_id() {
    // Arrange
    let long_id = "x".repeat(MAX_ID_BYTES + 1);
    let p = Point::new(long_id, vec![1.0]);

    // Act
    let result = p.validate(1);

    // Assert
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_dimension_mismatch() {
    // Arrange
    let p = Point::new("a", vec![1.0, 2.0, 3.0]);

    // Act
    let result = p.validate(4);

    // Assert
    match result.unwrap_err() {
        crate::error::Error::DimensionMismatch { expected, actual } => {
            assert_eq!(expected, 4);
            assert_eq!(actual, 3);
        }
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
}

#[test]
fn test_validate_rejects_non_finite_components() {
    // Arrange
    let p = Point::new("a", vec![1.0, f32::NAN]);

    // Act
    let result = p.validate(2);

    // Assert
    assert!(result.is_err());
}

#[test]
fn test_validate_accepts_well_formed_point() {
    // Arrange
    let p = Point::new("a", vec![1.0, 2.0]);

    // Act & Assert
    assert!(p.validate(2).is_ok());
}

#[test]
fn test_search_hit_new_has_no_optional_fields() {
    // Arrange & Act
    let hit = SearchHit::new("a".to_string(), 0.1);

    // Assert
    assert!(hit.vector.is_none());
    assert!(hit.metadata.is_none());
    assert!(hit.content.is_none());
}

#[test]
fn test_point_serde_roundtrip_preserves_optional_fields() {
    // Arrange
    let p = Point::new("a", vec![1.0, 2.0]).with_content("hi");

    // Act
    let json = serde_json::to_string(&p).unwrap();
    let back: Point = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(back, p);
}
