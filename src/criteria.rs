//! Externally supplied filters for `[?]` placeholders
//!
//! A path may contain `[?]` tokens, each of which consumes one caller
//! supplied [`Filter`] from the evaluation's queue, in order. Filters are
//! usually built from [`Criteria`], but any `Fn(&Value) -> bool` closure
//! works as well.

use serde_json::Value;

use crate::config::Configuration;
use crate::error::Error;
use crate::eval::{evaluate, Operator};
use crate::filter::predicate::RelativePath;

/// A predicate applied to each element of an array by a `[?]` token
///
/// Implemented by [`CriteriaFilter`] and by any `Fn(&Value) -> bool` closure:
///
/// ```rust
/// use std::sync::Arc;
/// use json_path::{Filter, JsonPath};
/// use serde_json::json;
///
/// # fn main() -> Result<(), json_path::Error> {
/// let value = json!({"items": [1, 12, 3, 25]});
/// let big: Arc<dyn Filter> =
///     Arc::new(|v: &serde_json::Value| v.as_i64().is_some_and(|n| n > 10));
/// let path = JsonPath::compile_with_filters("$.items[?]", vec![big])?;
/// assert_eq!(path.read(&value)?, json!([12, 25]));
/// # Ok(())
/// # }
/// ```
pub trait Filter: Send + Sync {
    /// Check whether this filter accepts the given element
    fn accept(&self, value: &Value, config: &Configuration) -> bool;
}

impl<F> Filter for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn accept(&self, value: &Value, _config: &Configuration) -> bool {
        self(value)
    }
}

/// A key path plus a list of constraints that a candidate element must all
/// satisfy
///
/// # Example
/// ```rust
/// use json_path::Criteria;
/// use serde_json::json;
///
/// # fn main() -> Result<(), json_path::Error> {
/// let criteria = Criteria::where_("name")?.is("john");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    key: RelativePath,
    constraints: Vec<(Operator, String)>,
}

impl Criteria {
    /// Start building criteria against the given key path
    ///
    /// The key is a relative sub-path: `name`, `name.first`, `@.items[0]`.
    pub fn where_(key: &str) -> Result<Self, Error> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(String::from(
                "criteria key can not be empty",
            )));
        }
        Ok(Self {
            key: RelativePath::compile(trimmed)?,
            constraints: Vec::new(),
        })
    }

    /// Constrain the key to equal the expected value
    pub fn is(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::Equal, expected)
    }

    /// Constrain the key to differ from the expected value
    pub fn ne(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::NotEqual, expected)
    }

    /// Constrain the key to be greater than the expected value
    pub fn gt(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::GreaterThan, expected)
    }

    /// Constrain the key to be greater than or equal to the expected value
    pub fn gte(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::GreaterThanOrEqual, expected)
    }

    /// Constrain the key to be less than the expected value
    pub fn lt(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::LessThan, expected)
    }

    /// Constrain the key to be less than or equal to the expected value
    pub fn lte(self, expected: impl Into<Value>) -> Self {
        self.constrain(Operator::LessThanOrEqual, expected)
    }

    fn constrain(mut self, op: Operator, expected: impl Into<Value>) -> Self {
        self.constraints.push((op, literal_of(expected.into())));
        self
    }

    /// Check the candidate element against every constraint
    pub fn matches(&self, candidate: &Value, config: &Configuration) -> bool {
        let Some(actual) = self.key.resolve(candidate, config) else {
            return false;
        };
        self.constraints
            .iter()
            .all(|(op, literal)| evaluate(&actual, *op, literal))
    }
}

/// Render an expected value as the literal text the expression evaluator
/// compares against
fn literal_of(expected: Value) -> String {
    match expected {
        Value::String(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// A conjunction of [`Criteria`] usable as an external [`Filter`]
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use json_path::{Criteria, CriteriaFilter, JsonPath};
/// use serde_json::json;
///
/// # fn main() -> Result<(), json_path::Error> {
/// let value = json!({"items": [{"name": "john"}, {"name": "bob"}]});
/// let filter = CriteriaFilter::new(Criteria::where_("name")?.is("john"));
/// let path = JsonPath::compile_with_filters("$.items[?].name", vec![Arc::new(filter)])?;
/// assert_eq!(path.read(&value)?, json!(["john"]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaFilter {
    criteria: Vec<Criteria>,
}

impl CriteriaFilter {
    /// Create a filter from initial criteria
    pub fn new(criteria: Criteria) -> Self {
        Self {
            criteria: vec![criteria],
        }
    }

    /// Add further criteria; all of them must match
    pub fn and(mut self, criteria: Criteria) -> Self {
        self.criteria.push(criteria);
        self
    }
}

impl Filter for CriteriaFilter {
    fn accept(&self, value: &Value, config: &Configuration) -> bool {
        self.criteria.iter().all(|c| c.matches(value, config))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::config::Configuration;

    use super::{Criteria, CriteriaFilter, Filter};

    #[test]
    fn string_criteria() {
        let config = Configuration::default();
        let criteria = Criteria::where_("name").unwrap().is("john");
        assert!(criteria.matches(&json!({"name": "john"}), &config));
        assert!(!criteria.matches(&json!({"name": "bob"}), &config));
        assert!(!criteria.matches(&json!({"other": 1}), &config));
    }

    #[test]
    fn numeric_criteria() {
        let config = Configuration::default();
        let criteria = Criteria::where_("price").unwrap().lt(10);
        assert!(criteria.matches(&json!({"price": 8}), &config));
        assert!(criteria.matches(&json!({"price": 8.95}), &config));
        assert!(!criteria.matches(&json!({"price": 12}), &config));
    }

    #[test]
    fn chained_constraints_are_conjoined() {
        let config = Configuration::default();
        let criteria = Criteria::where_("price").unwrap().gt(5).lt(10);
        assert!(criteria.matches(&json!({"price": 8}), &config));
        assert!(!criteria.matches(&json!({"price": 3}), &config));
        assert!(!criteria.matches(&json!({"price": 12}), &config));
    }

    #[test]
    fn nested_keys() {
        let config = Configuration::default();
        let criteria = Criteria::where_("name.first").unwrap().is("kalle");
        assert!(criteria.matches(&json!({"name": {"first": "kalle"}}), &config));
        assert!(!criteria.matches(&json!({"name": {"first": "bob"}}), &config));
    }

    #[test]
    fn null_expectations() {
        let config = Configuration::default();
        let criteria = Criteria::where_("a").unwrap().is(json!(null));
        assert!(criteria.matches(&json!({"a": null}), &config));
        assert!(!criteria.matches(&json!({"a": 1}), &config));
    }

    #[test]
    fn filter_conjunction() {
        let config = Configuration::default();
        let filter = CriteriaFilter::new(Criteria::where_("category").unwrap().is("fiction"))
            .and(Criteria::where_("price").unwrap().lt(10));
        assert!(filter.accept(&json!({"category": "fiction", "price": 9}), &config));
        assert!(!filter.accept(&json!({"category": "fiction", "price": 22}), &config));
    }

    #[test]
    fn closures_are_filters() {
        let config = Configuration::default();
        let filter = |v: &serde_json::Value| v.is_number();
        assert!(Filter::accept(&filter, &json!(1), &config));
        assert!(!Filter::accept(&filter, &json!("a"), &config));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(Criteria::where_("").is_err());
        assert!(Criteria::where_("  ").is_err());
    }
}
