//! This crate evaluates JSONPath expressions against [`serde_json::Value`]s —
//! the XPath-for-JSON mini-language of dotted member access, bracketed
//! selectors, recursive descent, and inline predicates.
//!
//! # Features
//!
//! The crate provides three key abstractions:
//!
//! * The [`JsonPath`] struct, a query string compiled once and evaluated many
//!   times with [`read`][JsonPath::read] and the reference-returning
//!   [`read_ref`][JsonPath::read_ref].
//! * The [`Criteria`] and [`CriteriaFilter`] types, which build externally
//!   supplied filters for `[?]` placeholders in a path.
//! * The [`ReadContext`] returned by [`parse`], for fluent parse-then-read
//!   usage over a JSON string.
//!
//! In addition, the [`JsonPathExt`] trait extends [`serde_json::Value`] with
//! a [`read_path`][JsonPathExt::read_path] method.
//!
//! # Usage
//!
//! ## Member access and array selection
//!
//! ```rust
//! use json_path::JsonPath;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), json_path::Error> {
//! let value = json!({
//!     "store": {
//!         "book": [
//!             {"author": "Nigel Rees", "price": 8.95},
//!             {"author": "Evelyn Waugh", "price": 12.99},
//!             {"author": "Herman Melville", "price": 8.99}
//!         ]
//!     }
//! });
//! let path = JsonPath::compile("$.store.book[*].author")?;
//! assert_eq!(
//!     path.read(&value)?,
//!     json!(["Nigel Rees", "Evelyn Waugh", "Herman Melville"])
//! );
//!
//! // negative indexes count from the end; slices clamp instead of raising
//! assert_eq!(json_path::read(&value, "$.store.book[-1].author")?, json!("Herman Melville"));
//! assert_eq!(
//!     json_path::read(&value, "$.store.book[:2].price")?,
//!     json!([8.95, 12.99])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Recursive descent
//!
//! The `..` operator scans all sub-values, preserving document order:
//!
//! ```rust
//! # use serde_json::json;
//! # fn main() -> Result<(), json_path::Error> {
//! let value = json!({"a": {"b": {"c": 1}}, "x": {"c": 2}});
//! assert_eq!(json_path::read(&value, "$..c")?, json!([1, 2]));
//! # Ok(())
//! # }
//! ```
//!
//! ## Inline predicates
//!
//! `[?(<expr>)]` keeps the array elements for which the expression holds.
//! Expressions compare `@`-rooted sub-paths against literals and combine with
//! `&&`, `||`, and parentheses:
//!
//! ```rust
//! # use serde_json::json;
//! # fn main() -> Result<(), json_path::Error> {
//! let value = json!({"book": [
//!     {"title": "Sword of Honour", "price": 12.99},
//!     {"title": "Moby Dick", "isbn": "0-553-21311-3", "price": 8.99}
//! ]});
//! assert_eq!(
//!     json_path::read(&value, "$.book[?(@.price < 10)].title")?,
//!     json!(["Moby Dick"])
//! );
//! // a body without a comparator tests existence
//! assert_eq!(
//!     json_path::read(&value, "$.book[?(@.isbn)].title")?,
//!     json!(["Moby Dick"])
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## External filters
//!
//! Each `[?]` placeholder consumes one caller supplied filter, usually built
//! from [`Criteria`]:
//!
//! ```rust
//! use std::sync::Arc;
//! use json_path::{Criteria, CriteriaFilter};
//! # use serde_json::json;
//!
//! # fn main() -> Result<(), json_path::Error> {
//! let value = json!({"items": [{"name": "john"}, {"name": "bob"}]});
//! let filter = CriteriaFilter::new(Criteria::where_("name")?.is("john"));
//! assert_eq!(
//!     json_path::read_with_filters(&value, "$.items[?].name", vec![Arc::new(filter)])?,
//!     json!(["john"])
//! );
//! # Ok(())
//! # }
//! ```

mod config;
mod criteria;
mod error;
mod eval;
mod ext;
mod filter;
mod path;
mod reader;
mod tokenizer;

pub use config::{Configuration, ReadOption};
pub use criteria::{Criteria, CriteriaFilter, Filter};
pub use error::Error;
pub use ext::JsonPathExt;
pub use path::JsonPath;
pub use reader::{parse, ReadContext};

use std::sync::Arc;

use serde_json::Value;

/// Compile `path` and read it against `value` in one call
///
/// For repeated evaluation, compile once with [`JsonPath::compile`] instead.
pub fn read(value: &Value, path: &str) -> Result<Value, Error> {
    JsonPath::compile(path)?.read(value)
}

/// Compile `path` with external filters and read it against `value` in one
/// call
pub fn read_with_filters(
    value: &Value,
    path: &str,
    filters: Vec<Arc<dyn Filter>>,
) -> Result<Value, Error> {
    JsonPath::compile_with_filters(path, filters)?.read(value)
}
