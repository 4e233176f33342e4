use serde_json::Value;

use crate::error::Error;
use crate::path::JsonPath;

/// Extension trait that adds JSONPath reads to [`serde_json::Value`]
pub trait JsonPathExt {
    /// Compile `path` and read it against this value
    ///
    /// # Example
    /// ```rust
    /// use json_path::JsonPathExt;
    /// use serde_json::json;
    ///
    /// # fn main() -> Result<(), json_path::Error> {
    /// let value = json!({"foo": {"bar": 42}});
    /// assert_eq!(value.read_path("$.foo.bar")?, json!(42));
    /// # Ok(())
    /// # }
    /// ```
    fn read_path(&self, path: &str) -> Result<Value, Error>;
}

impl JsonPathExt for Value {
    fn read_path(&self, path: &str) -> Result<Value, Error> {
        JsonPath::compile(path)?.read(self)
    }
}
