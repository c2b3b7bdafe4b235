//! Literal values
//!
//! Constructors validate the lexeme, so a literal node never holds text its
//! token class could not have produced.

use serde::Serialize;
use thiserror::Error;

use super::expr::ValueExpr;
use crate::token::{Span, TokenKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("malformed integer literal {0:?}")]
    Integer(String),
    #[error("malformed decimal literal {0:?}")]
    Decimal(String),
    #[error("malformed string literal {0:?}")]
    String(String),
    #[error("integer literal {0} does not fit in 64 bits")]
    OutOfRange(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Sign::Plus),
            TokenKind::Minus => Some(Sign::Minus),
            _ => None,
        }
    }
}

/// `(+|-)? [0-9]+`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegerLiteral {
    sign: Option<Sign>,
    digits: String,
}

impl IntegerLiteral {
    pub fn new(sign: Option<Sign>, digits: impl Into<String>) -> Result<Self, LiteralError> {
        let digits = digits.into();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LiteralError::Integer(digits));
        }
        Ok(Self { sign, digits })
    }

    pub fn sign(&self) -> Option<Sign> {
        self.sign
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn to_i64(&self) -> Result<i64, LiteralError> {
        let text = match self.sign {
            Some(Sign::Minus) => format!("-{}", self.digits),
            _ => self.digits.clone(),
        };
        text.parse()
            .map_err(|_| LiteralError::OutOfRange(text))
    }
}

/// `(+|-)? [0-9]* '.' [0-9]+`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecimalLiteral {
    sign: Option<Sign>,
    lexeme: String,
}

impl DecimalLiteral {
    pub fn new(sign: Option<Sign>, lexeme: impl Into<String>) -> Result<Self, LiteralError> {
        let lexeme = lexeme.into();
        let valid = match lexeme.split_once('.') {
            Some((whole, frac)) => {
                whole.bytes().all(|b| b.is_ascii_digit())
                    && !frac.is_empty()
                    && frac.bytes().all(|b| b.is_ascii_digit())
            }
            None => false,
        };
        if !valid {
            return Err(LiteralError::Decimal(lexeme));
        }
        Ok(Self { sign, lexeme })
    }

    pub fn sign(&self) -> Option<Sign> {
        self.sign
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn to_f64(&self) -> f64 {
        // Validated digits always parse.
        let magnitude: f64 = self.lexeme.parse().unwrap_or_default();
        match self.sign {
            Some(Sign::Minus) => -magnitude,
            _ => magnitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

/// Double or single quoted string. `value` is the unescaped content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    quote: Quote,
    raw: String,
    value: String,
}

impl StringLiteral {
    /// Build from the raw token text, quotes included.
    pub fn from_raw(raw: impl Into<String>) -> Result<Self, LiteralError> {
        let raw = raw.into();
        let quote = match raw.chars().next() {
            Some('"') => Quote::Double,
            Some('\'') => Quote::Single,
            _ => return Err(LiteralError::String(raw)),
        };
        if raw.len() < 2 || !raw.ends_with(quote.char()) {
            return Err(LiteralError::String(raw));
        }
        let value = unquote(&raw[1..raw.len() - 1], quote.char())
            .ok_or_else(|| LiteralError::String(raw.clone()))?;
        Ok(Self { quote, raw, value })
    }

    /// Double-quoted literal for `value`, escaping as needed.
    pub fn double_quoted(value: &str) -> Self {
        Self {
            quote: Quote::Double,
            raw: quote_double(value),
            value: value.to_string(),
        }
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Undo backslash escapes and doubled quotes. `None` when a quote character
/// appears unescaped in the body.
pub(crate) fn unquote(body: &str, quote: char) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\'' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else if c == quote {
            if chars.next_if_eq(&quote).is_none() {
                return None;
            }
            out.push(quote);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

pub(crate) fn quote_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatetimeKind {
    Date,
    Time,
    Timestamp,
}

impl DatetimeKind {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Date => Some(DatetimeKind::Date),
            TokenKind::Time => Some(DatetimeKind::Time),
            TokenKind::Timestamp => Some(DatetimeKind::Timestamp),
            _ => None,
        }
    }
}

/// `INTERVAL expr unit`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalLiteral {
    pub value: Box<ValueExpr>,
    pub unit: TokenKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    Interval(IntervalLiteral),
    String(StringLiteral),
    Integer(IntegerLiteral),
    Decimal(DecimalLiteral),
    Boolean(bool),
    Datetime(DatetimeKind, StringLiteral),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

impl Literal {
    pub fn new(value: LiteralValue, span: Span) -> Self {
        Self { value, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_validation() {
        assert!(IntegerLiteral::new(None, "042").is_ok());
        assert_eq!(
            IntegerLiteral::new(None, "4a"),
            Err(LiteralError::Integer("4a".into()))
        );
        assert!(IntegerLiteral::new(Some(Sign::Minus), "").is_err());

        let n = IntegerLiteral::new(Some(Sign::Minus), "17").unwrap();
        assert_eq!(n.to_i64(), Ok(-17));
        let huge = IntegerLiteral::new(None, "99999999999999999999").unwrap();
        assert!(matches!(huge.to_i64(), Err(LiteralError::OutOfRange(_))));
    }

    #[test]
    fn decimal_validation() {
        assert!(DecimalLiteral::new(None, ".5").is_ok());
        assert!(DecimalLiteral::new(None, "1.").is_err());
        assert!(DecimalLiteral::new(None, "12").is_err());
        assert!(DecimalLiteral::new(None, "1.2.3").is_err());
        let d = DecimalLiteral::new(Some(Sign::Minus), "2.5").unwrap();
        assert_eq!(d.to_f64(), -2.5);
    }

    #[test]
    fn string_unescaping() {
        let s = StringLiteral::from_raw(r#""a\"b""#).unwrap();
        assert_eq!(s.value(), "a\"b");
        assert_eq!(s.quote(), Quote::Double);

        let s = StringLiteral::from_raw("'it''s'").unwrap();
        assert_eq!(s.value(), "it's");

        let s = StringLiteral::from_raw(r"'\d+'").unwrap();
        assert_eq!(s.value(), r"\d+");

        assert!(StringLiteral::from_raw("abc").is_err());
        assert!(StringLiteral::from_raw("\"").is_err());
        assert!(StringLiteral::from_raw("'a'b'").is_err());
    }

    #[test]
    fn double_quoted_escapes() {
        let s = StringLiteral::double_quoted(r#"say "hi" \o/"#);
        assert_eq!(s.raw(), r#""say \"hi\" \\o/""#);
        let back = StringLiteral::from_raw(s.raw()).unwrap();
        assert_eq!(back.value(), s.value());
    }
}
