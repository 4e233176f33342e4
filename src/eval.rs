//! Comparison of a document value against an expected literal
//!
//! This is the terminal step of predicate and criteria matching: given the
//! value a sub-path resolved to, a comparison operator, and the raw literal
//! text from the expression, decide the truth of `actual <op> literal` with
//! type-aware coercion.

use std::cmp::Ordering;

use serde_json::{Number, Value};

const NULL_LITERAL: &str = "null";

/// A comparison operator in a predicate expression or criteria constraint
///
/// `<>` is accepted by the parser as an alias of `!=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Operator {
    fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThan
                | Operator::LessThanOrEqual
        )
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operator::Equal => write!(f, "=="),
            Operator::NotEqual => write!(f, "!="),
            Operator::GreaterThan => write!(f, ">"),
            Operator::GreaterThanOrEqual => write!(f, ">="),
            Operator::LessThan => write!(f, "<"),
            Operator::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// Decide the truth of `actual <op> expected`
///
/// `expected` is the raw literal text: a single-quoted string, an integer or
/// decimal number, `true`, `false`, or the bareword `null`. There is no
/// implicit cross-type coercion; combinations not covered below are false.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret))]
pub(crate) fn evaluate(actual: &Value, op: Operator, expected: &str) -> bool {
    let expected = expected.trim();
    match actual {
        Value::Null => match op {
            Operator::Equal => expected == NULL_LITERAL,
            Operator::NotEqual => expected != NULL_LITERAL,
            _ => false,
        },
        _ if expected == NULL_LITERAL => matches!(op, Operator::NotEqual),
        Value::Number(n) => compare_number(n, op, expected),
        Value::String(s) => compare_string(s, op, expected),
        Value::Bool(b) => compare_bool(*b, op, expected),
        _ => false,
    }
}

fn compare_number(actual: &Number, op: Operator, expected: &str) -> bool {
    if let (Some(a), Some(e)) = (actual.as_i64(), expected.parse::<i64>().ok()) {
        compare_ordering(op, a.cmp(&e))
    } else if let (Some(a), Some(e)) = (actual.as_u64(), expected.parse::<u64>().ok()) {
        compare_ordering(op, a.cmp(&e))
    } else if let (Some(a), Some(e)) = (actual.as_f64(), expected.parse::<f64>().ok()) {
        // == on floats is exact, not approximate
        match op {
            Operator::Equal => a == e,
            Operator::NotEqual => a != e,
            Operator::GreaterThan => a > e,
            Operator::GreaterThanOrEqual => a >= e,
            Operator::LessThan => a < e,
            Operator::LessThanOrEqual => a <= e,
        }
    } else {
        false
    }
}

fn compare_ordering(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Equal => ord == Ordering::Equal,
        Operator::NotEqual => ord != Ordering::Equal,
        Operator::GreaterThan => ord == Ordering::Greater,
        Operator::GreaterThanOrEqual => ord != Ordering::Less,
        Operator::LessThan => ord == Ordering::Less,
        Operator::LessThanOrEqual => ord != Ordering::Greater,
    }
}

fn compare_string(actual: &str, op: Operator, expected: &str) -> bool {
    // ordering comparisons are not defined on strings
    if op.is_ordering() {
        return false;
    }
    let expected = unquote(expected);
    match op {
        Operator::Equal => actual == expected,
        Operator::NotEqual => actual != expected,
        _ => false,
    }
}

fn compare_bool(actual: bool, op: Operator, expected: &str) -> bool {
    let expected = match expected {
        "true" => true,
        "false" => false,
        _ => return false,
    };
    match op {
        Operator::Equal => actual == expected,
        Operator::NotEqual => actual != expected,
        _ => false,
    }
}

/// Strip exactly one leading and one trailing single quote, when both are
/// present; any other shape is left untouched
fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal)
}
