//! Array index, index list, and slice selection
//!
//! The bracket body is parsed once at compile time into an [`IndexOp`].
//! Slice and list forms never raise on out-of-range positions; they clamp or
//! skip.

use std::borrow::Cow;

use nom::branch::alt;
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, separated_pair};
use serde_json::Value;

use crate::error::Error;
use crate::tokenizer::{PResult, PathToken};

/// The parsed form of an array-index bracket
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum IndexOp {
    /// `[i]`; negative counts from the end
    Single(i64),
    /// `[i,j,k]`
    List(Vec<i64>),
    /// `[:n]`
    HeadSlice(i64),
    /// `[-n:]`, holding the element count taken from the tail
    TailSlice(i64),
    /// `[a:b]`, `[a:]`, `[:]`
    Range(i64, Option<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexFilter {
    op: IndexOp,
}

enum Resolved {
    Index(Option<usize>),
    Indices(Vec<usize>),
    Span(usize, usize),
}

impl IndexFilter {
    pub(crate) fn compile(body: &str, position: usize) -> Result<Self, Error> {
        let (_, op) = all_consuming(parse_index_op)(body).map_err(|_: nom::Err<_>| {
            Error::invalid_path(
                position + 1,
                format!("unrecognized array index form '[{body}]'"),
            )
        })?;
        Ok(Self { op })
    }

    /// Single-index selection leaves the working value scalar; every other
    /// form produces an array and switches evaluation into array context
    pub(crate) fn is_array_filter(&self) -> bool {
        !matches!(self.op, IndexOp::Single(_))
    }

    pub(crate) fn apply<'a>(
        &self,
        value: Cow<'a, Value>,
        token: &PathToken,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        match value {
            Cow::Borrowed(Value::Array(items)) => Ok(self.select_borrowed(items)),
            Cow::Owned(Value::Array(items)) => Ok(self.select_owned(items)),
            _ => Err(Error::path_not_found(&token.fragment, &token.upstream)),
        }
    }

    pub(crate) fn apply_ref<'a>(
        &self,
        value: &'a Value,
        token: &PathToken,
    ) -> Result<Option<&'a Value>, Error> {
        let IndexOp::Single(i) = &self.op else {
            return Err(Error::Unsupported(format!(
                "cannot take a reference through the path fragment '{}'",
                token.fragment
            )));
        };
        let Some(items) = value.as_array() else {
            return Err(Error::path_not_found(&token.fragment, &token.upstream));
        };
        Ok(normalize(*i, items.len()).map(|i| &items[i]))
    }

    fn select_borrowed<'a>(&self, items: &'a [Value]) -> Option<Cow<'a, Value>> {
        match self.resolve(items.len()) {
            Resolved::Index(i) => i.map(|i| Cow::Borrowed(&items[i])),
            Resolved::Indices(indices) => Some(Cow::Owned(Value::Array(
                indices.into_iter().map(|i| items[i].clone()).collect(),
            ))),
            Resolved::Span(lo, hi) => Some(Cow::Owned(Value::Array(items[lo..hi].to_vec()))),
        }
    }

    fn select_owned<'a>(&self, mut items: Vec<Value>) -> Option<Cow<'a, Value>> {
        match self.resolve(items.len()) {
            Resolved::Index(i) => i.map(|i| Cow::Owned(items.swap_remove(i))),
            Resolved::Indices(indices) => Some(Cow::Owned(Value::Array(
                indices.into_iter().map(|i| items[i].clone()).collect(),
            ))),
            Resolved::Span(lo, hi) => {
                items.truncate(hi);
                items.drain(..lo);
                Some(Cow::Owned(Value::Array(items)))
            }
        }
    }

    fn resolve(&self, len: usize) -> Resolved {
        match &self.op {
            IndexOp::Single(i) => Resolved::Index(normalize(*i, len)),
            IndexOp::List(indices) => {
                Resolved::Indices(indices.iter().filter_map(|i| normalize(*i, len)).collect())
            }
            IndexOp::HeadSlice(n) => {
                let n = usize::try_from(*n).unwrap_or(0);
                Resolved::Span(0, n.min(len))
            }
            IndexOp::TailSlice(n) => {
                let n = usize::try_from(*n).unwrap_or(0);
                Resolved::Span(len.saturating_sub(n), len)
            }
            IndexOp::Range(a, b) => {
                let signed_len = len as i64;
                let lo = if *a < 0 {
                    (signed_len + a).clamp(0, signed_len) as usize
                } else {
                    (*a).min(signed_len) as usize
                };
                let hi = match b {
                    Some(b) => (*b).clamp(0, signed_len) as usize,
                    None => len,
                };
                if lo >= hi {
                    Resolved::Span(0, 0)
                } else {
                    Resolved::Span(lo, hi)
                }
            }
        }
    }
}

fn normalize(i: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if i < 0 { len + i } else { i };
    (0..len).contains(&idx).then(|| idx as usize)
}

fn parse_index_op(input: &str) -> PResult<IndexOp> {
    alt((parse_slice, parse_list))(input)
}

fn parse_slice(input: &str) -> PResult<IndexOp> {
    map(
        separated_pair(
            opt(parse_int),
            delimited(space0, char(':'), space0),
            opt(parse_int),
        ),
        |(start, end)| match (start, end) {
            (None, Some(n)) => IndexOp::HeadSlice(n),
            (Some(a), None) if a < 0 => IndexOp::TailSlice(-a),
            (Some(a), end) => IndexOp::Range(a, end),
            (None, None) => IndexOp::Range(0, None),
        },
    )(input)
}

fn parse_list(input: &str) -> PResult<IndexOp> {
    map(
        separated_list1(delimited(space0, char(','), space0), parse_int),
        |mut indices| {
            if indices.len() == 1 {
                IndexOp::Single(indices.remove(0))
            } else {
                IndexOp::List(indices)
            }
        },
    )(input)
}

fn parse_int(input: &str) -> PResult<i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse)(input)
}
