//! Inline predicate expressions and existence filters
//!
//! A `[?(<expr>)]` body compiles once into a tree of AND/OR criteria whose
//! leaves compare a `@`-rooted sub-path against a literal, or test that the
//! sub-path exists. A `[?(@.sub)]` body without any comparator compiles into
//! a [`HasPathFilter`], which keeps elements for which the sub-path resolves,
//! even to an explicit null.

use std::borrow::Cow;
use std::collections::VecDeque;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, space0};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, tuple};
use serde_json::Value;

use crate::config::Configuration;
use crate::error::Error;
use crate::eval::{evaluate, Operator};
use crate::filter::evaluate_tokens;
use crate::tokenizer::{
    build_tokens_at, parse_at_path, recognize_quoted, tokenize_relative, Fragment, PResult,
    PathToken,
};

/// A sub-path evaluated against the current candidate element
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RelativePath {
    tokens: Vec<PathToken>,
}

impl RelativePath {
    /// Compile from a string key: `@.a.b`, `a.b`, or `items[0]`
    pub(crate) fn compile(input: &str) -> Result<Self, Error> {
        Ok(Self {
            tokens: tokenize_relative(input)?,
        })
    }

    fn from_fragments(fragments: Vec<Fragment>, position: usize) -> Result<Self, Error> {
        Ok(Self {
            tokens: build_tokens_at(fragments, position)?,
        })
    }

    /// Resolve against a candidate element
    ///
    /// Returns `None` when the path does not reach a value; an explicit JSON
    /// null resolves to `Some(Value::Null)`.
    pub(crate) fn resolve(&self, candidate: &Value, config: &Configuration) -> Option<Value> {
        let mut queue = VecDeque::new();
        evaluate_tokens(&self.tokens, Cow::Borrowed(candidate), config, &mut queue)
            .ok()
            .flatten()
            .map(Cow::into_owned)
    }
}

/// The compiled form of a `[?(<expr>)]` predicate
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PredicateFilter {
    expr: LogicalOrExpr,
}

impl PredicateFilter {
    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
    pub(crate) fn compile(body: &str, position: usize) -> Result<Self, Error> {
        let (_, expr) = all_consuming(delimited(space0, parse_logical_or_expr, space0))(body)
            .map_err(|_: nom::Err<_>| {
                Error::invalid_path(position + 1, format!("invalid filter expression '?({body})'"))
            })?;
        Ok(Self { expr })
    }

    pub(crate) fn accept(&self, candidate: &Value, config: &Configuration) -> bool {
        self.expr.test(candidate, config)
    }

    pub(crate) fn apply<'a>(
        &self,
        value: Cow<'a, Value>,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        filter_array(value, token, |item| self.accept(item, config))
    }
}

/// The compiled form of a `[?(@.sub)]` existence filter
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HasPathFilter {
    path: RelativePath,
}

impl HasPathFilter {
    pub(crate) fn compile(body: &str, position: usize) -> Result<Self, Error> {
        let (_, fragments) = all_consuming(delimited(space0, parse_at_path, space0))(body)
            .map_err(|_: nom::Err<_>| {
                Error::invalid_path(position + 1, format!("invalid existence filter '?({body})'"))
            })?;
        Ok(Self {
            path: RelativePath::from_fragments(fragments, position)?,
        })
    }

    pub(crate) fn apply<'a>(
        &self,
        value: Cow<'a, Value>,
        token: &PathToken,
        config: &Configuration,
    ) -> Result<Option<Cow<'a, Value>>, Error> {
        filter_array(value, token, |item| {
            self.path.resolve(item, config).is_some()
        })
    }
}

/// Keep the elements of an array working value accepted by `keep`
fn filter_array<'a>(
    value: Cow<'a, Value>,
    token: &PathToken,
    mut keep: impl FnMut(&Value) -> bool,
) -> Result<Option<Cow<'a, Value>>, Error> {
    let kept: Vec<Value> = match value {
        Cow::Borrowed(Value::Array(items)) => {
            items.iter().filter(|v| keep(v)).cloned().collect()
        }
        Cow::Owned(Value::Array(items)) => items.into_iter().filter(|v| keep(v)).collect(),
        _ => return Err(Error::path_not_found(&token.fragment, &token.upstream)),
    };
    Ok(Some(Cow::Owned(Value::Array(kept))))
}

/// The top level boolean expression type, representing the logical OR
#[derive(Debug, Clone, PartialEq)]
struct LogicalOrExpr(Vec<LogicalAndExpr>);

impl LogicalOrExpr {
    fn test(&self, candidate: &Value, config: &Configuration) -> bool {
        self.0.iter().any(|expr| expr.test(candidate, config))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct LogicalAndExpr(Vec<BasicExpr>);

impl LogicalAndExpr {
    fn test(&self, candidate: &Value, config: &Configuration) -> bool {
        self.0.iter().all(|expr| expr.test(candidate, config))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BasicExpr {
    Paren(LogicalOrExpr),
    Relation(ConditionExpr),
    Exist(RelativePath),
}

impl BasicExpr {
    fn test(&self, candidate: &Value, config: &Configuration) -> bool {
        match self {
            BasicExpr::Paren(expr) => expr.test(candidate, config),
            BasicExpr::Relation(cond) => cond.test(candidate, config),
            BasicExpr::Exist(path) => path.resolve(candidate, config).is_some(),
        }
    }
}

/// A single `sub_path <op> literal` comparison
#[derive(Debug, Clone, PartialEq)]
struct ConditionExpr {
    path: RelativePath,
    op: Operator,
    literal: String,
}

impl ConditionExpr {
    fn test(&self, candidate: &Value, config: &Configuration) -> bool {
        match self.path.resolve(candidate, config) {
            Some(actual) => evaluate(&actual, self.op, &self.literal),
            None => false,
        }
    }
}

fn parse_logical_or_expr(input: &str) -> PResult<LogicalOrExpr> {
    map(
        separated_list1(delimited(space0, tag("||"), space0), parse_logical_and_expr),
        LogicalOrExpr,
    )(input)
}

fn parse_logical_and_expr(input: &str) -> PResult<LogicalAndExpr> {
    map(
        separated_list1(delimited(space0, tag("&&"), space0), parse_basic_expr),
        LogicalAndExpr,
    )(input)
}

fn parse_basic_expr(input: &str) -> PResult<BasicExpr> {
    alt((parse_paren_expr, parse_relation_expr, parse_exist_expr))(input)
}

fn parse_paren_expr(input: &str) -> PResult<BasicExpr> {
    map(
        delimited(
            pair(char('('), space0),
            parse_logical_or_expr,
            pair(space0, char(')')),
        ),
        BasicExpr::Paren,
    )(input)
}

fn parse_relation_expr(input: &str) -> PResult<BasicExpr> {
    map(
        tuple((
            parse_sub_path,
            delimited(space0, parse_operator, space0),
            parse_literal,
        )),
        |(path, op, literal)| BasicExpr::Relation(ConditionExpr { path, op, literal }),
    )(input)
}

fn parse_exist_expr(input: &str) -> PResult<BasicExpr> {
    map(parse_sub_path, BasicExpr::Exist)(input)
}

fn parse_sub_path(input: &str) -> PResult<RelativePath> {
    map_res(parse_at_path, |fragments| {
        RelativePath::from_fragments(fragments, 0)
    })(input)
}

fn parse_operator(input: &str) -> PResult<Operator> {
    alt((
        value(Operator::Equal, tag("==")),
        value(Operator::NotEqual, tag("!=")),
        value(Operator::NotEqual, tag("<>")),
        value(Operator::GreaterThanOrEqual, tag(">=")),
        value(Operator::LessThanOrEqual, tag("<=")),
        value(Operator::GreaterThan, char('>')),
        value(Operator::LessThan, char('<')),
    ))(input)
}

/// The raw literal text: quoted string, number, `true`, `false`, or `null`
fn parse_literal(input: &str) -> PResult<String> {
    map(
        alt((
            recognize_quoted,
            recognize_number,
            tag("true"),
            tag("false"),
            tag("null"),
        )),
        ToOwned::to_owned,
    )(input)
}

fn recognize_number(input: &str) -> PResult<&str> {
    recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1)))))(input)
}
