//! PPL - Pipe Processing Language front end
//!
//! Tokenizes and parses piped log queries such as
//! `search source=logs | where status >= 500 | stats count() by host` into a
//! typed syntax tree plus diagnostics. Nothing is executed.
//!
//! ## Quick Start
//!
//! ```
//! use ppl::ast::{Command, PplStatement};
//!
//! let root = ppl::parse("source=logs | where status >= 500 | head 10")?;
//! let Some(PplStatement::Query(query)) = root.statement else {
//!     unreachable!("non-empty input");
//! };
//! assert!(matches!(query.commands[0].node, Command::Where(_)));
//!
//! // Display gives back canonical PPL
//! assert_eq!(
//!     query.to_string(),
//!     "search source=logs | where status >= 500 | head 10"
//! );
//! # Ok::<(), ppl::ParseError>(())
//! ```
//!
//! ## Recovery
//!
//! [`parse`] stops at the first error. [`parse_with`] can keep going: a
//! broken pipe stage becomes an error node and every problem is reported as
//! a [`ParseDiagnostic`].
//!
//! ```
//! use ppl::ParseOptions;
//!
//! let input = "source=logs | stats cnt(";
//! let outcome = ppl::parse_with(input, &ParseOptions::new())?;
//! assert!(!outcome.is_valid());
//! assert_eq!(outcome.diagnostics.len(), 1);
//! assert_eq!(outcome.diagnostics[0].offset, input.len());
//! # Ok::<(), ppl::ParseError>(())
//! ```

pub mod ast;
mod diagnostic;
mod lex;
mod options;
mod parse;
mod pretty;
mod token;

use thiserror::Error;

// ============ Primary Public API ============

pub use diagnostic::ParseDiagnostic;
pub use lex::{Lexer, tokenize};
pub use options::ParseOptions;
pub use parse::{ParseError, ParseOutcome, parse, parse_with};
pub use pretty::pretty;
pub use token::{Span, Token, TokenKind};

/// Parse a query that must contain at least one stage.
pub fn parse_query(input: &str) -> Result<ast::QueryStatement, PplError> {
    match parse(input)?.statement {
        Some(ast::PplStatement::Query(query)) => Ok(query),
        None => Err(PplError::EmptyQuery),
    }
}

// ============ Errors ============

#[derive(Error, Debug)]
pub enum PplError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Literal error: {0}")]
    Literal(#[from] ast::LiteralError),
    #[error("empty query")]
    EmptyQuery,
}

pub use ast::LiteralError;
