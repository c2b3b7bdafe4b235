//! Lexer for PPL
//!
//! Produces a lazy, forward-only stream of [`Token`]s. Matching follows the
//! usual max-munch rule: the longest candidate wins and, on a tie, operators
//! and keywords win over identifiers. Characters that start no token are
//! grouped into a single `ERROR_RECOGNITION` token so nothing is dropped.

use winnow::ascii::{digit0, digit1, multispace0};
use winnow::combinator::{alt, opt, repeat};
use winnow::prelude::*;
use winnow::token::{any, none_of, one_of, take_till, take_while};

use crate::token::{Span, Token, TokenKind};

type PResult<T> = winnow::ModalResult<T>;

/// Lazy tokenizer over a single query.
///
/// Yields exactly one `EOF` token as its last item, then `None`.
pub struct Lexer<'a> {
    source: &'a str,
    rest: &'a str,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn offset(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    fn advance(&mut self, consumed: &str) {
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        let before = self.rest;
        let mut input = self.rest;
        if multispace0::<_, winnow::error::ContextError>(&mut input).is_ok() {
            let consumed = &before[..before.len() - input.len()];
            self.rest = input;
            self.advance(consumed);
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        self.skip_whitespace();

        let start = self.offset();
        let (line, column) = (self.line, self.column);

        if self.rest.is_empty() {
            self.finished = true;
            return Some(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::at(start),
                line,
                column,
            });
        }

        let before = self.rest;
        let mut input = self.rest;
        let kind = match token(&mut input) {
            Ok(kind) => kind,
            Err(_) => {
                let width = before.chars().next().map_or(before.len(), char::len_utf8);
                input = &before[width..];
                TokenKind::ErrorRecognition
            }
        };
        let consumed_len = before.len() - input.len();
        let text = &before[..consumed_len];
        self.rest = &before[consumed_len..];
        self.advance(text);

        log::trace!("lexed {} {:?} at {}", kind.name(), text, start);
        Some(Token {
            kind,
            text: text.to_string(),
            span: Span::new(start, start + consumed_len),
            line,
            column,
        })
    }
}

/// Tokenize a whole query, `EOF` included.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input).collect()
}

// ============ Token rules ============

fn token(input: &mut &str) -> PResult<TokenKind> {
    alt((
        quoted_string,
        number,
        word,
        symbol,
        unrecognized.value(TokenKind::ErrorRecognition),
    ))
    .parse_next(input)
}

fn quoted_string(input: &mut &str) -> PResult<TokenKind> {
    alt((
        escaped_quoted('"').value(TokenKind::DquotaString),
        escaped_quoted('\'').value(TokenKind::SquotaString),
        backtick_quoted.value(TokenKind::BquotaString),
    ))
    .parse_next(input)
}

/// `"..."` / `'...'` with backslash escapes and doubled quotes.
fn escaped_quoted<'a>(quote: char) -> impl FnMut(&mut &'a str) -> PResult<&'a str> {
    move |input: &mut &'a str| {
        (
            quote,
            repeat::<_, _, (), _, _>(
                0..,
                alt((
                    ('\\', any).void(),
                    (quote, quote).void(),
                    none_of([quote, '\\']).void(),
                )),
            ),
            quote,
        )
            .take()
            .parse_next(input)
    }
}

/// `` `...` ``, no escapes. Backticks only quote identifiers.
fn backtick_quoted<'a>(input: &mut &'a str) -> PResult<&'a str> {
    ('`', take_till(0.., '`'), '`').take().parse_next(input)
}

fn number(input: &mut &str) -> PResult<TokenKind> {
    alt((
        (digit0, '.', digit1).value(TokenKind::DecimalLiteral),
        digit1.value(TokenKind::IntegerLiteral),
    ))
    .parse_next(input)
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '@' | '*' | '_')
}

fn is_word_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '*' | '_' | '-')
}

fn word_literal<'a>(input: &mut &'a str) -> PResult<&'a str> {
    (one_of(is_word_start), take_while(0.., is_word_continue))
        .take()
        .parse_next(input)
}

/// `([.-][*0-9]+)+` following an identifier, as in `logs-2021.01.*`.
fn date_suffix<'a>(input: &mut &'a str) -> PResult<&'a str> {
    repeat::<_, _, (), _, _>(
        1..,
        (
            one_of(['.', '-']),
            take_while(1.., |c: char| c.is_ascii_digit() || c == '*'),
        ),
    )
    .take()
    .parse_next(input)
}

fn cluster_colon(input: &mut &str) -> PResult<char> {
    ':'.parse_next(input)
}

fn word(input: &mut &str) -> PResult<TokenKind> {
    let text = word_literal.parse_next(input)?;
    if opt(cluster_colon).parse_next(input)?.is_some() {
        return Ok(TokenKind::Cluster);
    }
    if opt(date_suffix).parse_next(input)?.is_some() {
        return Ok(TokenKind::IdDateSuffix);
    }
    if text == "*" {
        return Ok(TokenKind::Star);
    }
    Ok(TokenKind::keyword(text).unwrap_or(TokenKind::Id))
}

fn symbol(input: &mut &str) -> PResult<TokenKind> {
    let text = alt((
        alt(("<=", ">=", "!=", "<>")),
        one_of([
            '|', ',', '.', '=', '>', '<', '+', '-', '*', '/', '%', '!', ':', '(', ')', '[', ']',
            '\'', '"', '`', '~', '&', '^',
        ])
        .take(),
    ))
    .parse_next(input)?;
    match text {
        "<>" => Ok(TokenKind::NotEqual),
        other => TokenKind::symbol(other).ok_or_else(|| {
            winnow::error::ErrMode::Backtrack(winnow::error::ContextError::new())
        }),
    }
}

fn starts_token(c: char) -> bool {
    c.is_ascii_whitespace()
        || c.is_ascii_digit()
        || is_word_start(c)
        || "|,.=><+-*/%!:()[]'\"`~&^".contains(c)
}

fn unrecognized<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| !starts_token(c)).parse_next(input)
}

// ============ Tests ============
