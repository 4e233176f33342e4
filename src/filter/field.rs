//! Named property access, including the multi-key subset form

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::config::{Configuration, ReadOption};
use crate::error::Error;
use crate::tokenizer::PathToken;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldFilter {
    keys: Vec<String>,
}

impl FieldFilter {
    pub(crate) fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub(crate) fn apply<'a>(
        &self,
        value: Cow<'a, Value>,
        token: &PathToken,
        config: &Configuration,
        in_array: bool,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        if in_array {
            if let Some(items) = value.as_array() {
                return self.apply_elementwise(items, token, config);
            }
        }
        match value {
            Cow::Borrowed(Value::Object(map)) => match self.keys.as_slice() {
                [key] => match map.get(key) {
                    Some(v) => Ok(Some(Cow::Borrowed(v))),
                    None => self.missing(token, config),
                },
                _ => self
                    .subset(map, token, config)
                    .map(|v| Some(Cow::Owned(v))),
            },
            Cow::Owned(Value::Object(mut map)) => match self.keys.as_slice() {
                [key] => match map.remove(key) {
                    Some(v) => Ok(Some(Cow::Owned(v))),
                    None => self.missing(token, config),
                },
                _ => self
                    .subset(&map, token, config)
                    .map(|v| Some(Cow::Owned(v))),
            },
            _ => Err(Error::path_not_found(&token.fragment, &token.upstream)),
        }
    }

    pub(crate) fn apply_ref<'a>(
        &self,
        value: &'a Value,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<&'a Value>, Error> {
        let [key] = self.keys.as_slice() else {
            return Err(Error::Unsupported(format!(
                "cannot take a reference through the path fragment '{}'",
                token.fragment
            )));
        };
        let Some(map) = value.as_object() else {
            return Err(Error::path_not_found(&token.fragment, &token.upstream));
        };
        match map.get(key) {
            Some(v) => Ok(Some(v)),
            None if config.has_option(ReadOption::ThrowOnMissingProperty) => {
                Err(Error::path_not_found(&token.fragment, &token.upstream))
            }
            None => Ok(None),
        }
    }

    /// Element-wise lookup over an array working value; elements lacking the
    /// key are skipped unless `ThrowOnMissingProperty` forbids it
    fn apply_elementwise<'a>(
        &self,
        items: &[Value],
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        let throw = config.has_option(ReadOption::ThrowOnMissingProperty);
        let mut out = Vec::new();
        for item in items {
            match self.extract(item, token, config)? {
                Some(v) => out.push(v),
                None if throw => {
                    return Err(Error::path_not_found(&token.fragment, &token.upstream));
                }
                None => {}
            }
        }
        Ok(Some(Cow::Owned(Value::Array(out))))
    }

    fn extract(
        &self,
        item: &Value,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<Value>, Error> {
        let Some(map) = item.as_object() else {
            return Ok(None);
        };
        match self.keys.as_slice() {
            [key] => Ok(map.get(key).cloned()),
            _ => self.subset(map, token, config).map(Some),
        }
    }

    /// The object holding the present subset of the requested keys
    fn subset(
        &self,
        map: &Map<String, Value>,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Value, Error> {
        let mut out = Map::new();
        for key in &self.keys {
            match map.get(key) {
                Some(v) => {
                    out.insert(key.clone(), v.clone());
                }
                None if config.has_option(ReadOption::ThrowOnMissingProperty) => {
                    return Err(Error::path_not_found(&token.fragment, &token.upstream));
                }
                None => {}
            }
        }
        Ok(Value::Object(out))
    }

    fn missing<'a>(
        &self,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        if config.has_option(ReadOption::ThrowOnMissingProperty) {
            Err(Error::path_not_found(&token.fragment, &token.upstream))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::json;

    use crate::config::{Configuration, ReadOption};
    use crate::error::Error;
    use crate::filter::TokenFilter;
    use crate::tokenizer::PathToken;

    use super::FieldFilter;

    fn token(keys: &[&str]) -> PathToken {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_owned()).collect();
        PathToken {
            fragment: keys.join(","),
            upstream: format!("$.{}", keys.join(",")),
            filter: TokenFilter::Field(FieldFilter::new(keys)),
        }
    }

    fn field(token: &PathToken) -> &FieldFilter {
        match &token.filter {
            TokenFilter::Field(f) => f,
            _ => unreachable!(),
        }
    }

    #[test]
    fn single_key_lookup() {
        let value = json!({"a": 1, "b": 2});
        let token = token(&["a"]);
        let result = field(&token)
            .apply(Cow::Borrowed(&value), &token, &Configuration::default(), false)
            .unwrap();
        assert_eq!(result.unwrap().into_owned(), json!(1));
    }

    #[test]
    fn missing_key_yields_none() {
        let value = json!({"a": 1});
        let token = token(&["missing"]);
        let result = field(&token)
            .apply(Cow::Borrowed(&value), &token, &Configuration::default(), false)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn missing_key_throws_when_option_set() {
        let value = json!({"a": 1});
        let token = token(&["missing"]);
        let config = Configuration::default().with_option(ReadOption::ThrowOnMissingProperty);
        let result = field(&token).apply(Cow::Borrowed(&value), &token, &config, false);
        assert!(matches!(result, Err(Error::PathNotFound { .. })));
    }

    #[test]
    fn non_object_is_path_not_found() {
        let value = json!([1, 2]);
        let token = token(&["a"]);
        let result = field(&token).apply(
            Cow::Borrowed(&value),
            &token,
            &Configuration::default(),
            false,
        );
        assert!(matches!(result, Err(Error::PathNotFound { .. })));
    }

    #[test]
    fn multi_key_returns_present_subset() {
        let value = json!({"a": 1, "b": 2, "c": 3});
        let token = token(&["a", "c", "missing"]);
        let result = field(&token)
            .apply(Cow::Borrowed(&value), &token, &Configuration::default(), false)
            .unwrap();
        assert_eq!(result.unwrap().into_owned(), json!({"a": 1, "c": 3}));
    }

    #[test]
    fn elementwise_skips_missing() {
        let value = json!([{"a": 1}, {"b": 2}, {"a": 3}, 7]);
        let token = token(&["a"]);
        let result = field(&token)
            .apply(Cow::Borrowed(&value), &token, &Configuration::default(), true)
            .unwrap();
        assert_eq!(result.unwrap().into_owned(), json!([1, 3]));
    }

    #[test]
    fn elementwise_throws_when_option_set() {
        let value = json!([{"a": 1}, {"b": 2}]);
        let token = token(&["a"]);
        let config = Configuration::default().with_option(ReadOption::ThrowOnMissingProperty);
        let result = field(&token).apply(Cow::Borrowed(&value), &token, &config, true);
        assert!(matches!(result, Err(Error::PathNotFound { .. })));
    }

    #[test]
    fn elementwise_keeps_explicit_nulls() {
        let value = json!([{"a": null}, {"a": 1}]);
        let token = token(&["a"]);
        let result = field(&token)
            .apply(Cow::Borrowed(&value), &token, &Configuration::default(), true)
            .unwrap();
        assert_eq!(result.unwrap().into_owned(), json!([null, 1]));
    }
}
