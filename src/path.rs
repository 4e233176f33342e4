use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{de::Visitor, Deserialize};
use serde_json::Value;

use crate::config::Configuration;
use crate::criteria::Filter;
use crate::error::Error;
use crate::filter::{evaluate_tokens, evaluate_tokens_ref, FilterQueue};
use crate::tokenizer::{tokenize, PathToken};

/// A compiled JSONPath
///
/// A `JsonPath` is compiled once from a query string and may be evaluated
/// many times. Compiled paths are immutable; each evaluation copies the
/// external filter queue, so a compiled path may be shared freely between
/// threads.
///
/// # Usage
///
/// A `JsonPath` is compiled from an `&str` with [`compile`][JsonPath::compile]:
/// ```rust
/// # use json_path::JsonPath;
/// # fn main() -> Result<(), json_path::Error> {
/// let path = JsonPath::compile("$.store.book[0].title")?;
/// # Ok(())
/// # }
/// ```
/// It is then used to read [`serde_json::Value`]s with [`read`][JsonPath::read]:
/// ```rust
/// # use serde_json::json;
/// # use json_path::JsonPath;
/// # fn main() -> Result<(), json_path::Error> {
/// let value = json!({"store": {"book": [{"title": "Moby Dick"}]}});
/// let path = JsonPath::compile("$.store.book[0].title")?;
/// assert_eq!(path.read(&value)?, json!("Moby Dick"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JsonPath {
    path: String,
    tokens: Vec<PathToken>,
    filters: Vec<Arc<dyn Filter>>,
    definite: bool,
}

impl JsonPath {
    /// Compile a path with no external filters
    ///
    /// # Example
    /// ```rust
    /// # use json_path::JsonPath;
    /// # fn main() {
    /// let path = JsonPath::compile("$.store.book[?(@.price < 10)]").expect("valid path");
    /// # }
    /// ```
    pub fn compile(path: &str) -> Result<Self, Error> {
        Self::compile_with_filters(path, Vec::new())
    }

    /// Compile a path, binding one external filter to each `[?]` placeholder
    ///
    /// The number of `[?]` tokens in the path must equal `filters.len()`;
    /// placeholders consume filters positionally, left to right.
    pub fn compile_with_filters(
        path: &str,
        filters: Vec<Arc<dyn Filter>>,
    ) -> Result<Self, Error> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(String::from("path can not be empty")));
        }
        let placeholders = trimmed.matches("[?]").count();
        if placeholders != filters.len() {
            let position = trimmed.find("[?]").map(|i| i + 1).unwrap_or(1);
            return Err(Error::invalid_path(
                position,
                format!(
                    "path contains {placeholders} filter placeholder(s) but {} filter(s) were supplied",
                    filters.len()
                ),
            ));
        }
        let tokens = tokenize(trimmed)?;
        Ok(Self {
            definite: is_definite_path(trimmed),
            path: trimmed.to_owned(),
            tokens,
            filters,
        })
    }

    /// The trimmed path string this `JsonPath` was compiled from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this path is syntactically guaranteed to resolve to at most
    /// one location
    ///
    /// A path is *indefinite* when it contains, outside quoted strings, a
    /// scan (`..`), a wildcard, or a bracket with a comma, colon, `?`, or
    /// comparator characters.
    ///
    /// # Example
    /// ```rust
    /// # use json_path::JsonPath;
    /// # fn main() -> Result<(), json_path::Error> {
    /// assert!(JsonPath::compile("$.store.book[1].title")?.is_definite());
    /// assert!(!JsonPath::compile("$..book")?.is_definite());
    /// assert!(!JsonPath::compile("$.store.book[1,2]")?.is_definite());
    /// # Ok(())
    /// # }
    /// ```
    pub fn is_definite(&self) -> bool {
        self.definite
    }

    /// Read this path against a document with the default configuration
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use json_path::JsonPath;
    /// # fn main() -> Result<(), json_path::Error> {
    /// let value = json!({"books": [{"price": 8}, {"price": 22}]});
    /// let path = JsonPath::compile("$.books[*].price")?;
    /// assert_eq!(path.read(&value)?, json!([8, 22]));
    /// # Ok(())
    /// # }
    /// ```
    pub fn read(&self, value: &Value) -> Result<Value, Error> {
        self.read_with(value, &Configuration::default())
    }

    /// Read this path against a document
    ///
    /// The document must be a container (object or array). A terminal token
    /// that matches nothing yields JSON null; a non-terminal one raises
    /// [`Error::PathNotFound`].
    #[cfg_attr(
        feature = "trace",
        tracing::instrument(level = "trace", parent = None, skip(self), fields(path = %self.path), ret, err)
    )]
    pub fn read_with(&self, value: &Value, config: &Configuration) -> Result<Value, Error> {
        if self.path == "$" {
            // the path references the whole document
            return Ok(value.clone());
        }
        check_container(value)?;
        let mut queue: FilterQueue = self.filters.iter().cloned().collect();
        match evaluate_tokens(&self.tokens, Cow::Borrowed(value), config, &mut queue)? {
            Some(result) => Ok(result.into_owned()),
            None => Ok(Value::Null),
        }
    }

    /// Read this path as a reference into the document, with the default
    /// configuration
    pub fn read_ref<'a>(&self, value: &'a Value) -> Result<Option<&'a Value>, Error> {
        self.read_ref_with(value, &Configuration::default())
    }

    /// Read this path as a reference into the document
    ///
    /// Only definite paths support this; fan-out tokens would have to
    /// construct new values. Returns `None` when the terminal token matches
    /// nothing.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use json_path::JsonPath;
    /// # fn main() -> Result<(), json_path::Error> {
    /// let value = json!({"books": [{"price": 8}]});
    /// let path = JsonPath::compile("$.books[0].price")?;
    /// assert_eq!(path.read_ref(&value)?, Some(&json!(8)));
    /// # Ok(())
    /// # }
    /// ```
    pub fn read_ref_with<'a>(
        &self,
        value: &'a Value,
        config: &Configuration,
    ) -> Result<Option<&'a Value>, Error> {
        if !self.definite {
            return Err(Error::Unsupported(format!(
                "cannot return references for the indefinite path '{}'",
                self.path
            )));
        }
        check_container(value)?;
        evaluate_tokens_ref(&self.tokens, value, config)
    }
}

fn check_container(value: &Value) -> Result<(), Error> {
    if value.is_object() || value.is_array() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(String::from(
            "document must be a JSON object or array",
        )))
    }
}

/// The syntactic definiteness check behind [`JsonPath::is_definite`]
fn is_definite_path(path: &str) -> bool {
    let mut in_quote = false;
    let mut escaped = false;
    let mut previous = '\0';
    for c in path.chars() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '\'' => in_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            '\'' => in_quote = true,
            '*' | '?' | ',' | ':' | '<' | '>' | '=' | '(' => return false,
            '.' if previous == '.' => return false,
            _ => {}
        }
        previous = c;
    }
    true
}

impl fmt::Debug for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPath")
            .field("path", &self.path)
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl FromStr for JsonPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::compile(s)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPathVisitor;

        impl<'de> Visitor<'de> for JsonPathVisitor {
            type Value = JsonPath;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a string representing a JSONPath query")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPath::compile(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPathVisitor)
    }
}
