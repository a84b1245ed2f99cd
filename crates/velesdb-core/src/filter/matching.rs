//! Condition matching logic.

use super::Condition;
use serde_json::Value;

impl Condition {
    /// Evaluates the condition against a point's metadata.
    #[must_use]
    pub fn matches(&self, metadata: &Value) -> bool {
        match self {
            Self::Eq { field, value } => {
                get_field(metadata, field).is_some_and(|v| values_equal(v, value))
            }
            Self::Neq { field, value } => {
                get_field(metadata, field).is_none_or(|v| !values_equal(v, value))
            }
            Self::Gt { field, value } => {
                get_field(metadata, field).is_some_and(|v| compare_values(v, value) > 0)
            }
            Self::Gte { field, value } => {
                get_field(metadata, field).is_some_and(|v| compare_values(v, value) >= 0)
            }
            Self::Lt { field, value } => {
                get_field(metadata, field).is_some_and(|v| compare_values(v, value) < 0)
            }
            Self::Lte { field, value } => {
                get_field(metadata, field).is_some_and(|v| compare_values(v, value) <= 0)
            }
            Self::In { field, values } => get_field(metadata, field)
                .is_some_and(|v| values.iter().any(|val| values_equal(v, val))),
            Self::And { conditions } => conditions.iter().all(|c| c.matches(metadata)),
            Self::Or { conditions } => conditions.iter().any(|c| c.matches(metadata)),
            Self::Not { condition } => !condition.matches(metadata),
        }
    }
}

/// Looks up a field in a metadata tree, following dot-separated path segments
/// through nested objects.
fn get_field<'a>(metadata: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = metadata;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

/// Compares two JSON values for equality, treating numbers as `f64`.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a
            .as_f64()
            .zip(b.as_f64())
            .is_some_and(|(a, b)| (a - b).abs() < f64::EPSILON),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => a == b,
        (Value::Object(a), Value::Object(b)) => a == b,
        _ => false,
    }
}

/// Compares two JSON values, returning -1, 0, or 1. Non-comparable pairs (e.g.
/// a number against a string) return 0, which makes ordering comparisons fail
/// safe rather than panic.
fn compare_values(a: &Value, b: &Value) -> i32 {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).map_or(0, |ord| ord as i32),
            _ => 0,
        },
        (Value::String(a), Value::String(b)) => a.cmp(b) as i32,
        _ => 0,
    }
}
