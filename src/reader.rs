//! Fluent parse-then-read entry points

use std::sync::Arc;

use serde_json::Value;

use crate::config::Configuration;
use crate::criteria::Filter;
use crate::error::Error;
use crate::path::JsonPath;

/// A parsed document bound to a configuration, ready for repeated reads
///
/// # Example
/// ```rust
/// use serde_json::json;
///
/// # fn main() -> Result<(), json_path::Error> {
/// let context = json_path::parse(r#"{"store": {"book": [{"price": 8.95}]}}"#)?;
/// assert_eq!(context.read("$.store.book[0].price")?, json!(8.95));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReadContext {
    value: Value,
    config: Configuration,
}

impl ReadContext {
    /// Wrap an already parsed document with the default configuration
    pub fn new(value: Value) -> Self {
        Self::with_configuration(value, Configuration::default())
    }

    /// Wrap an already parsed document with the given configuration
    pub fn with_configuration(value: Value, config: Configuration) -> Self {
        Self { value, config }
    }

    /// The underlying document
    pub fn json(&self) -> &Value {
        &self.value
    }

    /// Compile `path` and read it against the document
    pub fn read(&self, path: &str) -> Result<Value, Error> {
        JsonPath::compile(path)?.read_with(&self.value, &self.config)
    }

    /// Compile `path` with external filters and read it against the document
    pub fn read_with_filters(
        &self,
        path: &str,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Result<Value, Error> {
        JsonPath::compile_with_filters(path, filters)?.read_with(&self.value, &self.config)
    }
}

/// Parse a JSON document string into a [`ReadContext`]
pub fn parse(json: &str) -> Result<ReadContext, Error> {
    let value = serde_json::from_str(json)
        .map_err(|err| Error::InvalidArgument(format!("failed to parse JSON document: {err}")))?;
    Ok(ReadContext::new(value))
}
