//! Canonical-form encoding, used to fingerprint a filter for the result cache.
//!
//! Two `Condition` trees that are structurally identical but were built in a
//! different order (e.g. `And([a, b])` vs a JSON payload with keys in a
//! different order) must hash identically, so the encoding below sorts `Value`
//! object keys and writes a fully-parenthesized, type-tagged string rather
//! than relying on `serde_json`'s key order.

use super::Condition;
use serde_json::Value;

impl Condition {
    /// Renders a canonical string form suitable for hashing into a cache key.
    #[must_use]
    pub fn canonical(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("eq({field},{})", canonical_value(value)),
            Self::Neq { field, value } => format!("neq({field},{})", canonical_value(value)),
            Self::Gt { field, value } => format!("gt({field},{})", canonical_value(value)),
            Self::Gte { field, value } => format!("gte({field},{})", canonical_value(value)),
            Self::Lt { field, value } => format!("lt({field},{})", canonical_value(value)),
            Self::Lte { field, value } => format!("lte({field},{})", canonical_value(value)),
            Self::In { field, values } => {
                let mut rendered: Vec<String> = values.iter().map(canonical_value).collect();
                rendered.sort_unstable();
                format!("in({field},[{}])", rendered.join(","))
            }
            Self::And { conditions } => join_sorted("and", conditions),
            Self::Or { conditions } => join_sorted("or", conditions),
            Self::Not { condition } => format!("not({})", condition.canonical()),
        }
    }
}

fn join_sorted(op: &str, conditions: &[Condition]) -> String {
    let mut rendered: Vec<String> = conditions.iter().map(Condition::canonical).collect();
    rendered.sort_unstable();
    format!("{op}([{}])", rendered.join(","))
}

fn canonical_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        Value::Array(items) => {
            let rendered: Vec<String> = items.iter().map(canonical_value).collect();
            format!("[{}]", rendered.join(","))
        }
        Value::Object(map) => {
            let mut entries: Vec<(String, String)> =
                map.iter().map(|(k, v)| (k.clone(), canonical_value(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rendered: Vec<String> =
                entries.into_iter().map(|(k, v)| format!("\"{k}\":{v}")).collect();
            format!("{{{}}}", rendered.join(","))
        }
    }
}
