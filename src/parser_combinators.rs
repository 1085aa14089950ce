//! A small parser-combinator toolkit over a text cursor.
//!
//! A parser is anything implementing [`Parser`]: a function from the
//! remaining input to either `Some((value, remaining_input))` or `None` on
//! failure. Plain functions and closures with the right signature are parsers
//! already, so grammars can be written as ordinary recursive `fn`s that glue
//! the combinators below together.

use regex::Regex;

/// A position inside a source string. Cheap to copy, so every combinator
/// passes it by value and backtracking is just reusing an old cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    source: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Cursor { source, offset: 0 }
    }

    /// The input that has not been consumed yet.
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// 1-based line number of the cursor position.
    pub fn line_num(&self) -> usize {
        self.source[..self.offset].matches('\n').count() + 1
    }

    /// Splits off the next character.
    pub fn next_char(&self) -> Option<(char, Cursor<'a>)> {
        let next = self.rest().chars().next()?;

        Some((
            next,
            Cursor {
                source: self.source,
                offset: self.offset + next.len_utf8(),
            },
        ))
    }

    fn advance(&self, byte_count: usize) -> Cursor<'a> {
        Cursor {
            source: self.source,
            offset: self.offset + byte_count,
        }
    }
}

/// Result of running a parser: the parsed value and the input left over.
pub type ParseResult<'a, T> = Option<(T, Cursor<'a>)>;

pub trait Parser<'a, T> {
    fn parse(&self, input: Cursor<'a>) -> ParseResult<'a, T>;
}

impl<'a, T, F> Parser<'a, T> for F
where
    F: Fn(Cursor<'a>) -> ParseResult<'a, T>,
{
    fn parse(&self, input: Cursor<'a>) -> ParseResult<'a, T> {
        self(input)
    }
}

/// Runs `parser`, then feeds its value to `f` to build the parser for the
/// rest of the input. Fails if either stage fails.
pub fn sequence<'a, A, B, P, Q, F>(parser: P, f: F) -> impl Parser<'a, B>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
    F: Fn(A) -> Q,
{
    move |input: Cursor<'a>| {
        let (value, rest) = parser.parse(input)?;
        f(value).parse(rest)
    }
}

/// Tries `first`; if it fails, tries `second` from the same input.
pub fn or_else<'a, T, P, Q>(first: P, second: Q) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
    Q: Parser<'a, T>,
{
    move |input: Cursor<'a>| first.parse(input).or_else(|| second.parse(input))
}

/// Always succeeds with `value` without consuming anything.
pub fn identity<'a, T: Clone>(value: T) -> impl Parser<'a, T> {
    move |input: Cursor<'a>| Some((value.clone(), input))
}

/// Always fails.
pub fn failure<'a, T>() -> impl Parser<'a, T> {
    |_: Cursor<'a>| -> ParseResult<'a, T> { None }
}

pub fn map<'a, A, B, P, F>(parser: P, f: F) -> impl Parser<'a, B>
where
    P: Parser<'a, A>,
    F: Fn(A) -> B,
{
    move |input: Cursor<'a>| {
        let (value, rest) = parser.parse(input)?;
        Some((f(value), rest))
    }
}

/// Runs `first` then `second`, keeping only the value of `second`.
pub fn preceded<'a, A, B, P, Q>(first: P, second: Q) -> impl Parser<'a, B>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
{
    move |input: Cursor<'a>| {
        let (_, rest) = first.parse(input)?;
        second.parse(rest)
    }
}

/// Runs `first` then `second`, keeping only the value of `first`.
pub fn terminated<'a, A, B, P, Q>(first: P, second: Q) -> impl Parser<'a, A>
where
    P: Parser<'a, A>,
    Q: Parser<'a, B>,
{
    move |input: Cursor<'a>| {
        let (value, rest) = first.parse(input)?;
        let (_, rest) = second.parse(rest)?;
        Some((value, rest))
    }
}

/// Consumes exactly one character for which `predicate` holds.
pub fn satisfy<'a, F>(predicate: F) -> impl Parser<'a, char>
where
    F: Fn(char) -> bool,
{
    move |input: Cursor<'a>| input.next_char().filter(|&(next, _)| predicate(next))
}

pub fn character<'a>(expected: char) -> impl Parser<'a, char> {
    satisfy(move |next| next == expected)
}

pub fn digit<'a>() -> impl Parser<'a, char> {
    satisfy(|next| next.is_ascii_digit())
}

pub fn letter<'a>() -> impl Parser<'a, char> {
    satisfy(char::is_alphabetic)
}

/// Matches the literal `text`.
pub fn literal<'a>(text: &'static str) -> impl Parser<'a, &'a str> {
    move |input: Cursor<'a>| {
        let rest = input.rest();

        match rest.starts_with(text) {
            true => Some((&rest[..text.len()], input.advance(text.len()))),
            false => None,
        }
    }
}

/// Matches `regex` at the cursor. The pattern must be anchored with `^`.
pub fn pattern<'a>(regex: &'static Regex) -> impl Parser<'a, &'a str> {
    move |input: Cursor<'a>| {
        let rest = input.rest();
        let found = regex.find(rest).filter(|found| found.start() == 0)?;

        Some((&rest[..found.end()], input.advance(found.end())))
    }
}

/// Applies `parser` as many times as it succeeds (possibly zero). Stops early
/// if `parser` succeeds without consuming input.
pub fn many<'a, T, P>(parser: P) -> impl Parser<'a, Vec<T>>
where
    P: Parser<'a, T>,
{
    move |mut input: Cursor<'a>| {
        let mut values = Vec::new();

        while let Some((value, rest)) = parser.parse(input) {
            values.push(value);

            if rest.offset() == input.offset() {
                break;
            }
            input = rest;
        }

        Some((values, input))
    }
}

/// Like [`many`], but requires at least one match.
pub fn many1<'a, T, P>(parser: P) -> impl Parser<'a, Vec<T>>
where
    P: Parser<'a, T>,
{
    let repeated = many(parser);

    move |input: Cursor<'a>| repeated.parse(input).filter(|(values, _)| !values.is_empty())
}

/// Skips any whitespace, newlines included.
pub fn skip_whitespace<'a>() -> impl Parser<'a, ()> {
    map(many(satisfy(char::is_whitespace)), |_| ())
}

/// Skips spaces and tabs only.
pub fn skip_inline_whitespace<'a>() -> impl Parser<'a, ()> {
    map(many(satisfy(|next| next == ' ' || next == '\t')), |_| ())
}

/// Runs `parser` after skipping inline whitespace.
pub fn token<'a, T, P>(parser: P) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
{
    let skip = skip_inline_whitespace();

    move |input: Cursor<'a>| {
        let (_, input) = skip.parse(input)?;
        parser.parse(input)
    }
}

/// Runs `parser` after skipping all whitespace.
pub fn ignore_whitespace<'a, T, P>(parser: P) -> impl Parser<'a, T>
where
    P: Parser<'a, T>,
{
    let skip = skip_whitespace();

    move |input: Cursor<'a>| {
        let (_, input) = skip.parse(input)?;
        parser.parse(input)
    }
}
