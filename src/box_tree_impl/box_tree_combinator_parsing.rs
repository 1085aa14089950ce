//! Lambda-calculus grammar built from the combinators in
//! `parser_combinators`, producing programs in the box-tree representation.
//!
//! ```text
//! expr             ::= term | lambda abstraction_body [expr]
//! term             ::= variable | constant
//!                    | "(" lambda abstraction_body [expr] ")"
//!                    | "(" expr expr ")"
//!                    | lambda abstraction_body
//! abstraction_body ::= variable "." term
//! lambda           ::= "\" | "λ"
//! variable         ::= any single char except . \ λ ( ) digits whitespace
//! constant         ::= digit+
//!
//! program          ::= line+
//! line             ::= "let" identifier "=" expr | expr
//! identifier       ::= (letter | digit)+
//! ```
//!
//! An expression following an abstraction is always its argument, so
//! `λx.λy.x a` is `(λx.λy.x)` applied to `a`. This is the reading the inline
//! rendering `(λx.λy.x a)` relies on.
//!
//! Spaces and tabs may appear before any token. Inside parentheses newlines
//! may too; outside of them a newline ends the line of the program.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

use crate::box_tree_impl::box_tree_ast::{ExprNode, Line, Program};
use crate::parser_combinators::{
    character, identity, ignore_whitespace, many, map, or_else, pattern, preceded, satisfy,
    sequence, skip_inline_whitespace, skip_whitespace, terminated, token, Cursor, ParseResult,
    Parser,
};

lazy_static! {
    static ref CONSTANT: Regex = Regex::new(r"^[0-9]+").expect("Unable to compile constant regex.");
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[\pL\pN]+").expect("Unable to compile identifier regex.");
    static ref LET_KEYWORD: Regex =
        Regex::new(r"^let[ \t]").expect("Unable to compile let keyword regex.");
}

/// Represents a parsing error.
#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedInput { found: String, line_num: usize },
    EmptyInput,
}

/// Display trait implementation for ParseError.
impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedInput { found, line_num } => {
                return write!(f, "Unable to parse input at line {}: {:?}.", line_num, found);
            }

            Self::EmptyInput => {
                return write!(f, "Nothing to parse.");
            }
        }
    }
}

impl std::error::Error for ParseError {}

fn is_variable_char(next: char) -> bool {
    !matches!(next, '.' | '\\' | 'λ' | '(' | ')') && !next.is_ascii_digit() && !next.is_whitespace()
}

// Skips the whitespace allowed before a token. On the top level of a line
// that is spaces and tabs; inside parentheses newlines are skipped too.
fn layout<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ()> {
    match NESTED {
        true => skip_whitespace().parse(input),
        false => skip_inline_whitespace().parse(input),
    }
}

fn symbol<'a, const NESTED: bool>(expected: char) -> impl Parser<'a, char> {
    preceded(layout::<NESTED>, character(expected))
}

fn lambda<'a, const NESTED: bool>() -> impl Parser<'a, char> {
    preceded(layout::<NESTED>, or_else(character('\\'), character('λ')))
}

fn variable_name<'a, const NESTED: bool>() -> impl Parser<'a, String> {
    map(preceded(layout::<NESTED>, satisfy(is_variable_char)), |var_char| {
        var_char.to_string()
    })
}

/// Tries to parse a single-character variable.
fn variable<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    map(variable_name::<NESTED>(), |var_name| ExprNode::Var { var_name }).parse(input)
}

/// Tries to parse a run of digits as a floating point constant.
fn constant<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    let (digits, rest) = preceded(layout::<NESTED>, pattern(&CONSTANT)).parse(input)?;
    let value = digits.parse::<f64>().ok()?;

    Some((ExprNode::Constant { value }, rest))
}

/// Tries to parse `[VARIABLE].[TERM]`, the part of an abstraction after the
/// lambda. The body never extends into a following expression; that
/// expression is an argument of the whole abstraction.
fn abstraction_body<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    sequence(variable_name::<NESTED>(), |formal_param| {
        preceded(
            symbol::<NESTED>('.'),
            map(term::<NESTED>, move |fn_body| ExprNode::FnDef {
                formal_param: formal_param.clone(),
                fn_body: Box::new(fn_body),
            }),
        )
    })
    .parse(input)
}

/// Tries to parse an abstraction. If another expression follows it, the
/// abstraction is applied to that expression.
fn abstraction<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    sequence(preceded(lambda::<NESTED>(), abstraction_body::<NESTED>), |fn_def| {
        let applied = fn_def.clone();

        or_else(
            map(expression::<NESTED>, move |actual_arg| ExprNode::FnApp {
                fn_body: Box::new(applied.clone()),
                actual_arg: Box::new(actual_arg),
            }),
            identity(fn_def),
        )
    })
    .parse(input)
}

/// Tries to parse `[EXPR] [EXPR]` inside parentheses.
fn application(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    sequence(expression::<true>, |fn_body| {
        map(expression::<true>, move |actual_arg| ExprNode::FnApp {
            fn_body: Box::new(fn_body.clone()),
            actual_arg: Box::new(actual_arg),
        })
    })
    .parse(input)
}

/// Tries to parse an expression that starts with `(`: either a parenthesized
/// abstraction, possibly applied, or an application.
fn parenthesized<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    let closing = || symbol::<true>(')');

    preceded(
        symbol::<NESTED>('('),
        or_else(
            terminated(abstraction::<true>, closing()),
            terminated(application, closing()),
        ),
    )
    .parse(input)
}

/// Tries to parse according to the production
/// `term -> variable | constant | parenthesized | lambda abstraction_body`.
fn term<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    or_else(
        or_else(variable::<NESTED>, constant::<NESTED>),
        or_else(
            parenthesized::<NESTED>,
            preceded(lambda::<NESTED>(), abstraction_body::<NESTED>),
        ),
    )
    .parse(input)
}

/// Tries to parse according to the production
/// `expr -> variable | constant | parenthesized | abstraction`.
fn expression<const NESTED: bool>(input: Cursor<'_>) -> ParseResult<'_, ExprNode> {
    or_else(
        or_else(variable::<NESTED>, constant::<NESTED>),
        or_else(parenthesized::<NESTED>, abstraction::<NESTED>),
    )
    .parse(input)
}

/// Tries to parse a `let` binding.
fn binding_line(input: Cursor<'_>) -> ParseResult<'_, Line> {
    sequence(
        preceded(pattern(&LET_KEYWORD), token(pattern(&IDENTIFIER))),
        |binding_name| {
            preceded(
                token(character('=')),
                map(expression::<false>, move |binding_body| Line::Binding {
                    binding_name: String::from(binding_name),
                    binding_body: Box::new(binding_body),
                }),
            )
        },
    )
    .parse(input)
}

/// Tries to parse a bare expression to execute.
fn execute_line(input: Cursor<'_>) -> ParseResult<'_, Line> {
    map(expression::<false>, |execute_body| Line::Execute {
        execute_body: Box::new(execute_body),
    })
    .parse(input)
}

fn program_line(input: Cursor<'_>) -> ParseResult<'_, Line> {
    ignore_whitespace(or_else(binding_line, execute_line)).parse(input)
}

// Turns the unconsumed input into an error pointing at the line it starts on.
fn unexpected_input(rest: Cursor<'_>) -> ParseError {
    let found = rest.rest().lines().next().unwrap_or_default();

    ParseError::UnexpectedInput {
        found: String::from(found),
        line_num: rest.line_num(),
    }
}

// Runs `parser` over the whole of `text`. Trailing whitespace is allowed,
// anything else left over is an error.
fn parse_all<'a, T>(parser: impl Parser<'a, T>, text: &'a str) -> Result<T, ParseError> {
    let start = Cursor::new(text);

    let (_, content) = skip_whitespace().parse(start).ok_or(ParseError::EmptyInput)?;
    if content.is_at_end() {
        return Err(ParseError::EmptyInput);
    }

    let (value, rest) = parser.parse(content).ok_or_else(|| unexpected_input(content))?;
    let (_, rest) = skip_whitespace().parse(rest).ok_or_else(|| unexpected_input(rest))?;

    match rest.is_at_end() {
        true => Ok(value),
        false => Err(unexpected_input(rest)),
    }
}

/// Parses a single lambda expression. The whole input must match.
pub fn parse_expression(text: &str) -> Result<ExprNode, ParseError> {
    parse_all(expression::<false>, text)
}

/// Parses a program: a sequence of `let` bindings and bare expressions
/// separated by whitespace. The whole input must match.
pub fn parse_program(text: &str) -> Result<Program, ParseError> {
    let lines = parse_all(many(program_line), text)?;

    log::debug!("Parsed {} program lines.", lines.len());

    return Ok(lines);
}
