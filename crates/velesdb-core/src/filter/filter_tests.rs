//! Tests for the `filter` module

use super::*;
use serde_json::json;

#[test]
fn test_eq_matches_same_value() {
    // Arrange
    let filter = Filter::new(Condition::eq("category", "tech"));
    let metadata = json!({"category": "tech"});

    // Act & Assert
    assert!(filter.matches(&metadata));
}

#[test]
fn test_eq_rejects_missing_field() {
    // Arrange
    let filter = Filter::new(Condition::eq("category", "tech"));
    let metadata = json!({"other": "tech"});

    // Act & Assert
    assert!(!filter.matches(&metadata));
}

#[test]
fn test_dot_notation_reaches_nested_field() {
    // Arrange
    let filter = Filter::new(Condition::eq("user.age", 30));
    let metadata = json!({"user": {"age": 30}});

    // Act & Assert
    assert!(filter.matches(&metadata));
}

#[test]
fn test_neq_treats_missing_field_as_satisfied() {
    // Arrange
    let filter = Filter::new(Condition::neq("category", "tech"));
    let metadata = json!({});

    // Act & Assert
    assert!(filter.matches(&metadata));
}

#[test]
fn test_range_comparisons() {
    // Arrange
    let metadata = json!({"price": 150});

    // Act & Assert
    assert!(Condition::gt("price", 100).matches(&metadata));
    assert!(Condition::gte("price", 150).matches(&metadata));
    assert!(Condition::lt("price", 200).matches(&metadata));
    assert!(Condition::lte("price", 150).matches(&metadata));
    assert!(!Condition::gt("price", 150).matches(&metadata));
}

#[test]
fn test_in_matches_one_of_values() {
    // Arrange
    let filter = Filter::new(Condition::is_in("tag", vec![json!("a"), json!("b")]));

    // Act & Assert
    assert!(filter.matches(&json!({"tag": "b"})));
    assert!(!filter.matches(&json!({"tag": "c"})));
}

#[test]
fn test_and_requires_all_conditions() {
    // Arrange
    let filter = Filter::new(Condition::and(vec![
        Condition::eq("category", "tech"),
        Condition::gt("price", 100),
    ]));

    // Act & Assert
    assert!(filter.matches(&json!({"category": "tech", "price": 150})));
    assert!(!filter.matches(&json!({"category": "tech", "price": 50})));
}

#[test]
fn test_or_requires_any_condition() {
    // Arrange
    let filter = Filter::new(Condition::or(vec![
        Condition::eq("category", "tech"),
        Condition::eq("category", "science"),
    ]));

    // Act & Assert
    assert!(filter.matches(&json!({"category": "science"})));
    assert!(!filter.matches(&json!({"category": "art"})));
}

#[test]
fn test_not_negates_inner_condition() {
    // Arrange
    let filter = Filter::new(Condition::not(Condition::eq("category", "tech")));

    // Act & Assert
    assert!(filter.matches(&json!({"category": "science"})));
    assert!(!filter.matches(&json!({"category": "tech"})));
}

#[test]
fn test_canonical_form_is_independent_of_object_key_order() {
    // Arrange
    let a = Condition::eq("tags", json!({"a": 1, "b": 2}));
    let b = Condition::eq("tags", json!({"b": 2, "a": 1}));

    // Act & Assert
    assert_eq!(a.canonical(), b.canonical());
}

#[test]
fn test_canonical_form_is_independent_of_and_or_branch_order() {
    // Arrange
    let a = Condition::and(vec![Condition::eq("x", 1), Condition::eq("y", 2)]);
    let b = Condition::and(vec![Condition::eq("y", 2), Condition::eq("x", 1)]);

    // Act & Assert
    assert_eq!(a.canonical(), b.canonical());
}

#[test]
fn test_canonical_form_distinguishes_different_conditions() {
    // Arrange
    let a = Condition::eq("x", 1);
    let b = Condition::eq("x", 2);

    // Act & Assert
    assert_ne!(a.canonical(), b.canonical());
}

#[test]
fn test_filter_serde_roundtrip() {
    // Arrange
    let filter = Filter::new(Condition::and(vec![
        Condition::eq("category", "tech"),
        Condition::not(Condition::is_in("tag", vec![json!("x")])),
    ]));

    // Act
    let json = serde_json::to_string(&filter).unwrap();
    let back: Filter = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(filter.canonical(), back.canonical());
}
