//! Metadata filtering for vector search.
//!
//! ```rust,ignore
//! use velesdb_core::filter::{Filter, Condition};
//!
//! let filter = Filter::new(Condition::and(vec![
//!     Condition::eq("category", "tech"),
//!     Condition::gt("price", 100),
//! ]));
//! ```

mod builders;
pub mod conversion;
mod matching;

#[cfg(test)]
mod filter_tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A filter for metadata-based search refinement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    /// The root condition of the filter.
    pub condition: Condition,
}

impl Filter {
    /// Creates a new filter with the given root condition.
    #[must_use]
    pub const fn new(condition: Condition) -> Self {
        Self { condition }
    }

    /// Evaluates the filter against a point's metadata.
    #[must_use]
    pub fn matches(&self, metadata: &Value) -> bool {
        self.condition.matches(metadata)
    }

    /// Canonical string form, used to fingerprint a query for the result cache.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.condition.canonical()
    }
}

/// A condition for filtering metadata, evaluated against a point's metadata tree.
///
/// Field names support dot notation for nested object access (`"user.age"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// `field == value`
    Eq {
        /// Field name, dot-notation for nested access.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field != value`
    Neq {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field > value` (numbers and strings only)
    Gt {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field >= value`
    Gte {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field < value`
    Lt {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field <= value`
    Lte {
        /// Field name.
        field: String,
        /// Value to compare against.
        value: Value,
    },
    /// `field` is one of `values`.
    In {
        /// Field name.
        field: String,
        /// Candidate values.
        values: Vec<Value>,
    },
    /// All of `conditions` must match.
    And {
        /// Sub-conditions.
        conditions: Vec<Condition>,
    },
    /// At least one of `conditions` must match.
    Or {
        /// Sub-conditions.
        conditions: Vec<Condition>,
    },
    /// `condition` must not match.
    Not {
        /// Negated sub-condition.
        condition: Box<Condition>,
    },
}
