//! Path tokenizer
//!
//! Lexes a JSONPath string into an ordered sequence of [`PathToken`]s.
//! Bracket scanning is quote-aware: inside `'…'` every character is literal,
//! including `[`, `]`, `.`, and escaped quotes `\'`.

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while};
use nom::character::complete::{anychar, char, satisfy, space0};
use nom::combinator::{map, opt, recognize, value};
use nom::error::{context, VerboseError};
use nom::multi::{fold_many0, many0, many0_count, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::IResult;

use crate::error::Error;
use crate::filter::TokenFilter;

pub(crate) type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// A single step of a compiled path
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathToken {
    /// The normalized literal fragment that produced this token
    pub(crate) fragment: String,
    /// The accumulated path up to and including this token, for error messages
    pub(crate) upstream: String,
    /// The compiled evaluation step
    pub(crate) filter: TokenFilter,
}

/// A lexed path fragment, prior to filter compilation
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment {
    /// `$`
    Root,
    /// `..`
    Scan,
    /// `*` or `.*`
    Wildcard,
    /// `.name`, `['name']`, or `['a','b']`, holding the unquoted key(s)
    Field(Vec<String>),
    /// Any other bracketed segment, kept raw: `[*]`, `[0]`, `[0:3]`, `[?]`, `[?(…)]`
    Bracket(String),
}

impl Fragment {
    fn fragment_string(&self) -> String {
        match self {
            Fragment::Root => String::from("$"),
            Fragment::Scan => String::from(".."),
            Fragment::Wildcard => String::from("*"),
            Fragment::Field(keys) if keys.len() == 1 => keys[0].clone(),
            Fragment::Field(keys) => {
                let quoted: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
                format!("[{}]", quoted.join(","))
            }
            Fragment::Bracket(raw) => raw.clone(),
        }
    }
}

/// Tokenize an absolute path, which must begin with `$`
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn tokenize(path: &str) -> Result<Vec<PathToken>, Error> {
    let rest = path
        .strip_prefix('$')
        .ok_or_else(|| Error::invalid_path(1, "path must begin with '$'"))?;
    let mut fragments = vec![(0, Fragment::Root)];
    collect_segments(path, rest, &mut fragments)?;
    build_tokens(fragments)
}

/// Tokenize a relative path: a predicate sub-path (`@.a.b`) or a criteria
/// key (`name`, `name.first`, `items[0]`)
pub(crate) fn tokenize_relative(input: &str) -> Result<Vec<PathToken>, Error> {
    if input.is_empty() {
        return Err(Error::invalid_path(1, "path can not be empty"));
    }
    let mut fragments = Vec::new();
    let mut rest = input.strip_prefix('@').unwrap_or(input);
    if !input.starts_with('@') {
        // criteria keys may lead with a bare member name
        if let Ok((r, name)) = parse_name(rest) {
            fragments.push((0, Fragment::Field(vec![name.to_owned()])));
            rest = r;
        }
    }
    collect_segments(input, rest, &mut fragments)?;
    build_tokens(fragments)
}

/// Parse a `@`-rooted sub-path inside a predicate expression, stopping at the
/// first character that does not continue a segment
pub(crate) fn parse_at_path(input: &str) -> PResult<Vec<Fragment>> {
    map(preceded(char('@'), many0(parse_segment)), |segments| {
        segments.into_iter().flatten().collect()
    })(input)
}

/// Compile lexed fragments into tokens, all reported at the given position
pub(crate) fn build_tokens_at(
    fragments: Vec<Fragment>,
    position: usize,
) -> Result<Vec<PathToken>, Error> {
    build_tokens(fragments.into_iter().map(|f| (position, f)).collect())
}

fn collect_segments(
    source: &str,
    mut rest: &str,
    out: &mut Vec<(usize, Fragment)>,
) -> Result<(), Error> {
    while !rest.is_empty() {
        let offset = source.len() - rest.len();
        let (remaining, fragments) =
            parse_segment(rest).map_err(|err| Error::from((source, err)))?;
        for fragment in fragments {
            out.push((offset, fragment));
        }
        rest = remaining;
    }
    Ok(())
}

fn build_tokens(fragments: Vec<(usize, Fragment)>) -> Result<Vec<PathToken>, Error> {
    let mut tokens = Vec::with_capacity(fragments.len());
    let mut upstream = String::new();
    for (offset, fragment) in fragments {
        append_upstream(&mut upstream, &fragment, tokens.is_empty());
        let filter = TokenFilter::compile(&fragment, offset)?;
        tokens.push(PathToken {
            fragment: fragment.fragment_string(),
            upstream: upstream.clone(),
            filter,
        });
    }
    Ok(tokens)
}

fn append_upstream(upstream: &mut String, fragment: &Fragment, is_first: bool) {
    let needs_dot = !is_first && !upstream.ends_with('.');
    match fragment {
        Fragment::Root => upstream.push('$'),
        Fragment::Scan => upstream.push_str(".."),
        Fragment::Wildcard => {
            if needs_dot {
                upstream.push('.');
            }
            upstream.push('*');
        }
        Fragment::Field(keys) if keys.len() == 1 => {
            if needs_dot {
                upstream.push('.');
            }
            upstream.push_str(&keys[0]);
        }
        Fragment::Field(_) | Fragment::Bracket(_) => {
            upstream.push_str(&fragment.fragment_string());
        }
    }
}

fn parse_segment(input: &str) -> PResult<Vec<Fragment>> {
    alt((
        parse_scan_segment,
        map(parse_dot_segment, |f| vec![f]),
        map(parse_bracket_segment, |f| vec![f]),
    ))(input)
}

fn parse_scan_segment(input: &str) -> PResult<Vec<Fragment>> {
    map(
        preceded(
            tag(".."),
            opt(alt((
                value(Fragment::Wildcard, char('*')),
                map(parse_name, |n| Fragment::Field(vec![n.to_owned()])),
                parse_bracket_segment,
            ))),
        ),
        |tail| {
            let mut fragments = vec![Fragment::Scan];
            fragments.extend(tail);
            fragments
        },
    )(input)
}

fn parse_dot_segment(input: &str) -> PResult<Fragment> {
    preceded(
        char('.'),
        context(
            "member name or '*' after '.'",
            alt((
                value(Fragment::Wildcard, char('*')),
                map(parse_name, |n| Fragment::Field(vec![n.to_owned()])),
            )),
        ),
    )(input)
}

fn parse_bracket_segment(input: &str) -> PResult<Fragment> {
    alt((parse_quoted_field_bracket, parse_raw_bracket))(input)
}

fn parse_quoted_field_bracket(input: &str) -> PResult<Fragment> {
    map(
        delimited(
            pair(char('['), space0),
            separated_list1(delimited(space0, char(','), space0), parse_quoted_name),
            pair(space0, char(']')),
        ),
        Fragment::Field,
    )(input)
}

fn parse_raw_bracket(input: &str) -> PResult<Fragment> {
    map(
        recognize(delimited(
            char('['),
            many0_count(alt((recognize_quoted, is_not("]'")))),
            context("closing ']'", char(']')),
        )),
        |raw: &str| Fragment::Bracket(raw.to_owned()),
    )(input)
}

fn is_name_first(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= '\u{0080}'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c >= '\u{0080}'
}

pub(crate) fn parse_name(input: &str) -> PResult<&str> {
    recognize(pair(satisfy(is_name_first), take_while(is_name_char)))(input)
}

enum QuotedFragment<'a> {
    Literal(&'a str),
    Escaped(char),
}

fn parse_escaped(input: &str) -> PResult<char> {
    preceded(
        char('\\'),
        alt((
            value('\'', char('\'')),
            value('\\', char('\\')),
            value('\n', char('n')),
            value('\t', char('t')),
            value('\r', char('r')),
        )),
    )(input)
}

/// The unescaped content of a single-quoted string
pub(crate) fn parse_quoted_name(input: &str) -> PResult<String> {
    delimited(char('\''), quoted_content, context("closing quote", char('\'')))(input)
}

fn quoted_content(input: &str) -> PResult<String> {
    fold_many0(
        alt((
            map(is_not("'\\"), QuotedFragment::Literal),
            map(parse_escaped, QuotedFragment::Escaped),
        )),
        String::new,
        |mut out, fragment| {
            match fragment {
                QuotedFragment::Literal(s) => out.push_str(s),
                QuotedFragment::Escaped(c) => out.push(c),
            }
            out
        },
    )(input)
}

/// The raw span of a single-quoted string, quotes included
pub(crate) fn recognize_quoted(input: &str) -> PResult<&str> {
    recognize(delimited(
        char('\''),
        many0_count(alt((is_not("'\\"), recognize(pair(char('\\'), anychar))))),
        char('\''),
    ))(input)
}

#[cfg(test)]
mod tests {
    use crate::error::Error;

    use super::{parse_quoted_name, tokenize, tokenize_relative};

    fn fragments(path: &str) -> Vec<String> {
        tokenize(path)
            .unwrap()
            .into_iter()
            .map(|t| t.fragment)
            .collect()
    }

    #[test]
    fn dot_notation() {
        assert_eq!(fragments("$.store.book"), vec!["$", "store", "book"]);
    }

    #[test]
    fn bracket_notation_normalizes_to_field() {
        assert_eq!(fragments("$['store']['book']"), vec!["$", "store", "book"]);
        assert_eq!(fragments("$.store['book']"), vec!["$", "store", "book"]);
    }

    #[test]
    fn multi_key_field_keeps_bracket_form() {
        assert_eq!(fragments("$['a','b']"), vec!["$", "['a','b']"]);
        assert_eq!(fragments("$[ 'a' , 'b' ]"), vec!["$", "['a','b']"]);
    }

    #[test]
    fn scan_fragments() {
        assert_eq!(fragments("$..book"), vec!["$", "..", "book"]);
        assert_eq!(fragments("$.."), vec!["$", ".."]);
        assert_eq!(fragments("$..*"), vec!["$", "..", "*"]);
        assert_eq!(fragments("$..[0]"), vec!["$", "..", "[0]"]);
    }

    #[test]
    fn wildcard_and_array_fragments() {
        assert_eq!(fragments("$.store.*"), vec!["$", "store", "*"]);
        assert_eq!(fragments("$.book[*]"), vec!["$", "book", "[*]"]);
        assert_eq!(fragments("$.book[0:3]"), vec!["$", "book", "[0:3]"]);
        assert_eq!(fragments("$.book[-3:]"), vec!["$", "book", "[-3:]"]);
    }

    #[test]
    fn predicate_fragments() {
        assert_eq!(
            fragments("$.book[?(@.price<10)].title"),
            vec!["$", "book", "[?(@.price<10)]", "title"]
        );
        assert_eq!(fragments("$.book[?]"), vec!["$", "book", "[?]"]);
    }

    #[test]
    fn quotes_protect_bracket_characters() {
        assert_eq!(
            fragments("$.book[?(@.title=='[a,b]')]"),
            vec!["$", "book", "[?(@.title=='[a,b]')]"]
        );
        assert_eq!(fragments("$['a.b']"), vec!["$", "a.b"]);
    }

    #[test]
    fn upstream_accumulates() {
        let tokens = tokenize("$.store.book[0].title").unwrap();
        let upstream: Vec<&str> = tokens.iter().map(|t| t.upstream.as_str()).collect();
        assert_eq!(
            upstream,
            vec![
                "$",
                "$.store",
                "$.store.book",
                "$.store.book[0]",
                "$.store.book[0].title"
            ]
        );
    }

    #[test]
    fn upstream_through_scan() {
        let tokens = tokenize("$..book").unwrap();
        assert_eq!(tokens.last().unwrap().upstream, "$..book");
    }

    #[test]
    fn relative_paths() {
        let tokens = tokenize_relative("@.price").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].fragment, "price");

        let tokens = tokenize_relative("name.first").unwrap();
        let frags: Vec<&str> = tokens.iter().map(|t| t.fragment.as_str()).collect();
        assert_eq!(frags, vec!["name", "first"]);

        assert!(tokenize_relative("@").unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_rejected() {
        assert!(matches!(
            tokenize("store.book"),
            Err(Error::InvalidPath { position: 1, .. })
        ));
    }

    #[test]
    fn double_root_is_rejected() {
        assert!(matches!(tokenize("$$"), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn trailing_dot_is_rejected() {
        assert!(matches!(tokenize("$.store."), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn unmatched_bracket_is_rejected() {
        assert!(matches!(tokenize("$.store[0"), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn unmatched_quote_is_rejected() {
        assert!(matches!(tokenize("$['store]"), Err(Error::InvalidPath { .. })));
    }

    #[test]
    fn error_positions_are_one_indexed() {
        match tokenize("$.store.") {
            Err(Error::InvalidPath { position, .. }) => assert_eq!(position, 8),
            other => panic!("expected InvalidPath, got {other:?}"),
        }
    }

    #[test]
    fn quoted_name_escapes() {
        assert_eq!(parse_quoted_name("'a'"), Ok(("", String::from("a"))));
        assert_eq!(parse_quoted_name(r"'a\'b'"), Ok(("", String::from("a'b"))));
        assert_eq!(parse_quoted_name(r"'a\\b'"), Ok(("", String::from("a\\b"))));
    }
}
