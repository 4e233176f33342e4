//! Token filters: one evaluation step per path token
//!
//! Each compiled token carries a [`TokenFilter`] that transforms the current
//! working value into the next one. Fan-out filters switch the evaluation
//! into array context, after which field lookups operate element-wise.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Configuration;
use crate::criteria::Filter;
use crate::error::Error;
use crate::tokenizer::{Fragment, PathToken};

pub(crate) mod array_index;
pub(crate) mod field;
pub(crate) mod predicate;

use self::array_index::IndexFilter;
use self::field::FieldFilter;
use self::predicate::{HasPathFilter, PredicateFilter};

/// The external filter queue for one evaluation; each `[?]` token pops the head
pub(crate) type FilterQueue = VecDeque<Arc<dyn Filter>>;

/// The evaluation step compiled from a single path fragment
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenFilter {
    /// `$`
    Root,
    /// `[*]`
    AllArrayItems,
    /// `*`
    Wildcard,
    /// `..`
    Scan,
    /// `.name` / `['name']` / `['a','b']`
    Field(FieldFilter),
    /// `[0]` / `[0,1]` / `[:n]` / `[-n:]` / `[a:b]`
    ArrayIndex(IndexFilter),
    /// `[?(<expr>)]` with at least one comparator
    ArrayEval(PredicateFilter),
    /// `[?(@.sub)]` without a comparator
    HasPath(HasPathFilter),
    /// `[?]`, consuming one externally supplied filter
    ArrayQuery,
}

impl TokenFilter {
    pub(crate) fn compile(fragment: &Fragment, position: usize) -> Result<Self, Error> {
        match fragment {
            Fragment::Root => Ok(Self::Root),
            Fragment::Scan => Ok(Self::Scan),
            Fragment::Wildcard => Ok(Self::Wildcard),
            Fragment::Field(keys) => Ok(Self::Field(FieldFilter::new(keys.clone()))),
            Fragment::Bracket(raw) => Self::compile_bracket(raw, position),
        }
    }

    fn compile_bracket(raw: &str, position: usize) -> Result<Self, Error> {
        let body = raw[1..raw.len() - 1].trim();
        if body == "*" {
            return Ok(Self::AllArrayItems);
        }
        if body == "?" {
            return Ok(Self::ArrayQuery);
        }
        if let Some(inner) = body.strip_prefix("?(") {
            let inner = inner.strip_suffix(')').ok_or_else(|| {
                Error::invalid_path(
                    position + 1,
                    format!("expected ')' to close the expression in '{raw}'"),
                )
            })?;
            return if contains_comparator(inner) {
                PredicateFilter::compile(inner, position).map(Self::ArrayEval)
            } else {
                HasPathFilter::compile(inner, position).map(Self::HasPath)
            };
        }
        if body.starts_with('?') {
            return Err(Error::invalid_path(
                position + 1,
                format!("unrecognized filter form '{raw}'"),
            ));
        }
        IndexFilter::compile(body, position).map(Self::ArrayIndex)
    }

    /// Whether a match from this filter switches evaluation into array context
    pub(crate) fn is_array_filter(&self) -> bool {
        match self {
            TokenFilter::Root | TokenFilter::Field(_) => false,
            TokenFilter::AllArrayItems
            | TokenFilter::Wildcard
            | TokenFilter::Scan
            | TokenFilter::ArrayEval(_)
            | TokenFilter::HasPath(_)
            | TokenFilter::ArrayQuery => true,
            TokenFilter::ArrayIndex(f) => f.is_array_filter(),
        }
    }

    /// Apply this filter to the current working value
    ///
    /// Returns `None` when the token did not match; the caller decides whether
    /// that is a terminal null or a [`Error::PathNotFound`].
    pub(crate) fn apply<'a>(
        &self,
        value: Cow<'a, Value>,
        token: &PathToken,
        config: &Configuration,
        filters: &mut FilterQueue,
        in_array: bool,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        match self {
            TokenFilter::Root | TokenFilter::AllArrayItems => Ok(Some(value)),
            TokenFilter::Wildcard => Ok(wildcard(value)),
            TokenFilter::Scan => Ok(Some(Cow::Owned(Value::Array(scan(&value))))),
            TokenFilter::Field(f) => f.apply(value, token, config, in_array),
            TokenFilter::ArrayIndex(f) => f.apply(value, token),
            TokenFilter::ArrayEval(f) => f.apply(value, token, config),
            TokenFilter::HasPath(f) => f.apply(value, token, config),
            TokenFilter::ArrayQuery => array_query(value, token, config, filters),
        }
    }

    /// The reference-returning variant, available for definite tokens only
    pub(crate) fn apply_ref<'a>(
        &self,
        value: &'a Value,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<&'a Value>, Error> {
        match self {
            TokenFilter::Root => Ok(Some(value)),
            TokenFilter::Field(f) => f.apply_ref(value, token, config),
            TokenFilter::ArrayIndex(f) => f.apply_ref(value, token),
            _ => Err(Error::Unsupported(format!(
                "cannot take a reference through the path fragment '{}'",
                token.fragment
            ))),
        }
    }
}

/// Walk a token list over a value, threading the array-context flag
#[cfg_attr(
    feature = "trace",
    tracing::instrument(level = "trace", parent = None, skip(filters), ret, err)
)]
pub(crate) fn evaluate_tokens<'a>(
    tokens: &[PathToken],
    value: Cow<'a, Value>,
    config: &Configuration,
    filters: &mut FilterQueue,
) -> Result<Option<Cow<'a, Value>>, Error> {
    let mut current = value;
    let mut in_array = false;
    for (i, token) in tokens.iter().enumerate() {
        match token.filter.apply(current, token, config, filters, in_array)? {
            Some(next) => current = next,
            None => {
                if i + 1 < tokens.len() {
                    return Err(Error::path_not_found(&token.fragment, &token.upstream));
                }
                return Ok(None);
            }
        }
        if !in_array {
            in_array = token.filter.is_array_filter();
        }
    }
    Ok(Some(current))
}

/// Walk a token list by reference; every token must support `apply_ref`
pub(crate) fn evaluate_tokens_ref<'a>(
    tokens: &[PathToken],
    value: &'a Value,
    config: &Configuration,
) -> Result<Option<&'a Value>, Error> {
    let mut current = value;
    for (i, token) in tokens.iter().enumerate() {
        match token.filter.apply_ref(current, token, config)? {
            Some(next) => current = next,
            None => {
                if i + 1 < tokens.len() {
                    return Err(Error::path_not_found(&token.fragment, &token.upstream));
                }
                return Ok(None);
            }
        }
    }
    Ok(Some(current))
}

fn wildcard(value: Cow<'_, Value>) -> Option<Cow<'_, Value>> {
    if value.is_array() {
        return Some(value);
    }
    match value {
        Cow::Borrowed(Value::Object(map)) => {
            Some(Cow::Owned(Value::Array(map.values().cloned().collect())))
        }
        Cow::Owned(Value::Object(map)) => Some(Cow::Owned(Value::Array(
            map.into_iter().map(|(_, v)| v).collect(),
        ))),
        _ => None,
    }
}

/// Pre-order depth-first flatten of all sub-values, in document order
fn scan(value: &Value) -> Vec<Value> {
    let mut out = Vec::new();
    collect(value, &mut out);
    out
}

fn collect(value: &Value, out: &mut Vec<Value>) {
    out.push(value.clone());
    match value {
        Value::Object(map) => {
            for v in map.values() {
                collect(v, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect(v, out);
            }
        }
        _ => {}
    }
}

/// True when the body holds at least one comparator character outside quotes
fn contains_comparator(body: &str) -> bool {
    let mut in_quote = false;
    let mut escaped = false;
    for c in body.chars() {
        if in_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '\'' => in_quote = false,
                _ => {}
            }
        } else {
            match c {
                '\'' => in_quote = true,
                '=' | '<' | '>' => return true,
                _ => {}
            }
        }
    }
    false
}

fn array_query<'a>(
    value: Cow<'a, Value>,
    token: &PathToken,
    config: &Configuration,
    filters: &mut FilterQueue,
) -> Result<Option<Cow<'a, Value>>, Error> {
    let filter = filters.pop_front().ok_or_else(|| {
        Error::InvalidArgument(format!(
            "no external filter supplied for '{}'",
            token.upstream
        ))
    })?;
    let kept: Vec<Value> = match value {
        Cow::Borrowed(Value::Array(items)) => items
            .iter()
            .filter(|item| filter.accept(item, config))
            .cloned()
            .collect(),
        Cow::Owned(Value::Array(items)) => items
            .into_iter()
            .filter(|item| filter.accept(item, config))
            .collect(),
        _ => return Err(Error::path_not_found(&token.fragment, &token.upstream)),
    };
    Ok(Some(Cow::Owned(Value::Array(kept))))
}
