//! Parser for PPL queries
//!
//! A hand-written recursive-descent parser over the lexer's token vector, one
//! method per grammar rule. Most decisions are made from one or two tokens of
//! lookahead. The few genuinely ambiguous rules go through [`Decision`], which
//! tries alternatives in grammar order with the cursor rolled back between
//! attempts.
//!
//! With recovery enabled, a mismatched token is first repaired by deleting or
//! inserting a single token. If that is not enough the whole pipe stage is
//! replaced by an [`ErrorNode`] and parsing resumes at the next `|`.

mod command;
mod expr;
mod name;

use indexmap::IndexSet;
use log::{debug, trace};
use std::collections::HashMap;
use thiserror::Error;

use crate::ast::{Command, ErrorNode, Expression, PplStatement, QueryStatement, Root, Spanned};
use crate::diagnostic::{ParseDiagnostic, format_expected};
use crate::lex::Lexer;
use crate::options::ParseOptions;
use crate::token::{Span, Token, TokenKind};

// ============ Public API ============

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{}", summarize(.0))]
    Syntax(Vec<ParseDiagnostic>),
    #[error("query is {len} bytes long, the limit is {limit}")]
    InputTooLong { len: usize, limit: usize },
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

fn summarize(diagnostics: &[ParseDiagnostic]) -> String {
    match diagnostics {
        [] => "syntax error".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

/// Result of a recovering parse.
///
/// `root` is present unless parsing failed outright; any diagnostic makes the
/// query invalid for execution even when a tree was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub root: Option<Root>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseOutcome {
    pub fn is_valid(&self) -> bool {
        self.root.is_some() && self.diagnostics.is_empty()
    }
}

/// Parse a PPL query, failing on the first error.
pub fn parse(input: &str) -> Result<Root, ParseError> {
    let outcome = parse_with(input, &ParseOptions::strict())?;
    outcome
        .root
        .ok_or(ParseError::Syntax(outcome.diagnostics))
}

/// Parse a PPL query with explicit options.
///
/// Only fatal problems (oversized input, excessive nesting, and any error in
/// strict mode) are returned as `Err`.
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    if input.len() > options.max_input_len() {
        return Err(ParseError::InputTooLong {
            len: input.len(),
            limit: options.max_input_len(),
        });
    }

    let mut lexical = Vec::new();
    let mut tokens = Vec::new();
    for token in Lexer::new(input) {
        if token.is(TokenKind::ErrorRecognition) {
            debug!("token recognition error at offset {}", token.span.start);
            lexical.push(ParseDiagnostic::new(
                input,
                token.span.start,
                format!("token recognition error at: '{}'", token.text),
                IndexSet::new(),
            ));
        } else {
            tokens.push(token);
        }
    }
    if !options.recovery() && !lexical.is_empty() {
        return Err(ParseError::Syntax(lexical));
    }

    let mut parser = Parser::new(input, tokens, options);
    let result = parser.root();
    if let Some(fatal) = parser.fatal.take() {
        return Err(fatal);
    }

    let mut diagnostics = lexical;
    diagnostics.append(&mut parser.diagnostics);
    let root = match result {
        Ok(root) => Some(root),
        Err(err) => {
            let diagnostic = parser.diagnostic(err);
            if !options.recovery() {
                return Err(ParseError::Syntax(vec![diagnostic]));
            }
            diagnostics.push(diagnostic);
            None
        }
    };
    diagnostics.sort_by_key(|d| d.offset);
    Ok(ParseOutcome { root, diagnostics })
}

// ============ Parser state ============

/// Internal failure of a grammar rule. Becomes a [`ParseDiagnostic`] once it
/// escapes speculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub offset: usize,
    pub message: String,
    pub expected: IndexSet<TokenKind>,
}

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// The three `expression` alternatives, used as a memo key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ExprShape {
    Logical,
    Comparison,
    Value,
}

struct Memo {
    result: PResult<Expression>,
    pos: usize,
    last_end: usize,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    last_end: usize,
    diagnostics: usize,
    sync: usize,
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    eof: Token,
    pos: usize,
    last_end: usize,
    options: &'a ParseOptions,
    diagnostics: Vec<ParseDiagnostic>,
    speculating: usize,
    depth: usize,
    in_search_filter: bool,
    sync: Vec<&'static [TokenKind]>,
    memo: HashMap<(usize, ExprShape), Memo>,
    fatal: Option<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>, options: &'a ParseOptions) -> Self {
        let eof = tokens.last().cloned().unwrap_or_else(|| Token {
            kind: TokenKind::Eof,
            text: String::new(),
            span: Span::at(source.len()),
            line: 1,
            column: 1,
        });
        Self {
            source,
            tokens,
            eof,
            pos: 0,
            last_end: 0,
            options,
            diagnostics: Vec::new(),
            speculating: 0,
            depth: 0,
            in_search_filter: false,
            sync: Vec::new(),
            memo: HashMap::new(),
            fatal: None,
        }
    }

    // ============ Cursor ============

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek_kind())
    }

    fn offset(&self) -> usize {
        self.peek().span.start
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is(TokenKind::Eof) {
            trace!("consume {} {:?}", token.kind.name(), token.text);
            self.pos += 1;
            self.last_end = token.span.end;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.last_end.max(start))
    }

    fn at_boundary(&self) -> bool {
        self.at_any(&[TokenKind::Pipe, TokenKind::Eof])
    }

    fn expect_boundary(&self) -> PResult<()> {
        if self.at_boundary() {
            Ok(())
        } else {
            Err(self.unexpected(&[TokenKind::Pipe, TokenKind::Eof]))
        }
    }

    // ============ Errors and recovery ============

    fn recovering(&self) -> bool {
        self.options.recovery() && self.speculating == 0
    }

    fn describe(token: &Token) -> String {
        if token.is(TokenKind::Eof) {
            "'<EOF>'".to_string()
        } else {
            format!("'{}'", token.text)
        }
    }

    fn error_at(&self, offset: usize, message: impl Into<String>, expected: &[TokenKind]) -> SyntaxError {
        SyntaxError {
            offset,
            message: message.into(),
            expected: expected.iter().copied().collect(),
        }
    }

    /// `mismatched input 'x' expecting {...}` at the current token.
    fn unexpected(&self, expected: &[TokenKind]) -> SyntaxError {
        let token = self.peek();
        let expected: IndexSet<TokenKind> = expected.iter().copied().collect();
        let message = if expected.is_empty() {
            format!("mismatched input {}", Self::describe(token))
        } else {
            format!(
                "mismatched input {} expecting {}",
                Self::describe(token),
                format_expected(&expected)
            )
        };
        SyntaxError {
            offset: token.span.start,
            message,
            expected,
        }
    }

    fn diagnostic(&self, err: SyntaxError) -> ParseDiagnostic {
        ParseDiagnostic::new(self.source, err.offset, err.message, err.expected)
    }

    fn record(&mut self, err: SyntaxError) {
        debug!("syntax error at offset {}: {}", err.offset, err.message);
        let diagnostic = self.diagnostic(err);
        self.diagnostics.push(diagnostic);
    }

    fn at_sync_point(&self) -> bool {
        self.at_boundary()
            || self
                .sync
                .last()
                .is_some_and(|set| set.contains(&self.peek_kind()))
    }

    /// Run `f` with `set` as the innermost synchronization set.
    fn with_sync<T>(
        &mut self,
        set: &'static [TokenKind],
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        self.sync.push(set);
        let result = f(self);
        self.sync.pop();
        result
    }

    /// Match a fixed token, repairing single-token errors when recovering.
    ///
    /// An inserted token only exists as a diagnostic; the returned span is
    /// empty and nothing is added to the tree.
    fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.at(kind) {
            return Ok(self.bump().span);
        }
        if self.recovering() {
            if self.nth_kind(1) == kind && !self.at_boundary() {
                let extra = self.bump();
                let message = format!(
                    "extraneous input {} expecting {}",
                    Self::describe(&extra),
                    kind.display()
                );
                let err = self.error_at(extra.span.start, message, &[kind]);
                self.record(err);
                return Ok(self.bump().span);
            }
            if self.at_sync_point() {
                let message = format!("missing {} at {}", kind.display(), Self::describe(self.peek()));
                let offset = self.offset();
                let err = self.error_at(offset, message, &[kind]);
                self.record(err);
                return Ok(Span::at(offset));
            }
        }
        Err(self.unexpected(&[kind]))
    }

    /// Discard tokens up to the next `|` or the end of input.
    fn skip_to_boundary(&mut self) {
        let mut skipped = 0usize;
        while !self.at_boundary() {
            self.bump();
            skipped += 1;
        }
        if skipped > 0 {
            debug!("skipped {skipped} tokens to resynchronize");
        }
    }

    // ============ Speculation ============

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            last_end: self.last_end,
            diagnostics: self.diagnostics.len(),
            sync: self.sync.len(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.pos;
        self.last_end = checkpoint.last_end;
        self.diagnostics.truncate(checkpoint.diagnostics);
        self.sync.truncate(checkpoint.sync);
    }

    /// Run `f` with recovery off, rolling back everything it did on failure.
    fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        let checkpoint = self.checkpoint();
        self.speculating += 1;
        let result = f(self);
        self.speculating -= 1;
        if result.is_err() {
            self.restore(checkpoint);
        }
        result
    }

    fn decision(&self, name: &'static str) -> Decision {
        Decision {
            name,
            start: self.offset(),
            attempts: 0,
            furthest: None,
        }
    }

    /// Try one alternative of `decision`.
    ///
    /// `Ok(None)` means the alternative failed and was rolled back; `Err` is
    /// only returned for fatal errors, which must not be retried.
    fn attempt<T>(
        &mut self,
        decision: &mut Decision,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<Option<T>> {
        let index = decision.attempts;
        decision.attempts += 1;
        match self.speculate(f) {
            Ok(node) => {
                if index > 0 {
                    debug!(
                        "{}: alternative {} matched at offset {}",
                        decision.name, index, decision.start
                    );
                }
                Ok(Some(node))
            }
            Err(err) if self.fatal.is_some() => Err(err),
            Err(err) => {
                trace!(
                    "{}: alternative {} failed at offset {}: {}",
                    decision.name, index, err.offset, err.message
                );
                decision.note(err);
                Ok(None)
            }
        }
    }

    /// Memoized `expression` alternative. Results only depend on the start
    /// position while speculating, so nested `cast(...)` chains stay linear.
    fn memoized(
        &mut self,
        shape: ExprShape,
        f: impl FnOnce(&mut Self) -> PResult<Expression>,
    ) -> PResult<Expression> {
        let key = (self.pos, shape);
        if self.speculating > 0 {
            if let Some(memo) = self.memo.get(&key) {
                let result = memo.result.clone();
                if result.is_ok() {
                    self.pos = memo.pos;
                    self.last_end = memo.last_end;
                }
                return result;
            }
        }
        let result = f(self);
        if self.speculating > 0 && self.fatal.is_none() {
            self.memo.insert(
                key,
                Memo {
                    result: result.clone(),
                    pos: self.pos,
                    last_end: self.last_end,
                },
            );
        }
        result
    }

    /// Enter a nested construct (parentheses, function arguments).
    ///
    /// Exceeding the depth limit is fatal. Search-filter juxtaposition rules
    /// do not apply inside the nesting.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= self.options.max_depth() {
            let offset = self.offset();
            debug!("nesting limit {} reached at offset {offset}", self.options.max_depth());
            self.fatal.get_or_insert(ParseError::NestingTooDeep {
                limit: self.options.max_depth(),
                offset,
            });
            return Err(self.error_at(offset, "nesting too deep", &[]));
        }
        self.depth += 1;
        let in_search_filter = std::mem::replace(&mut self.in_search_filter, false);
        let result = f(self);
        self.in_search_filter = in_search_filter;
        self.depth -= 1;
        result
    }

    // ============ Statements ============

    /// `root : pplStatement? EOF`
    fn root(&mut self) -> PResult<Root> {
        if self.at(TokenKind::Eof) {
            return Ok(Root { statement: None });
        }
        let query = self.query_statement()?;
        self.expect(TokenKind::Eof)?;
        Ok(Root {
            statement: Some(PplStatement::Query(query)),
        })
    }

    /// `queryStatement : pplCommands (PIPE commands)*`
    fn query_statement(&mut self) -> PResult<QueryStatement> {
        let start = self.offset();
        let head = self.stage(Self::ppl_command, crate::ast::PplCommand::Error)?;
        let mut commands = Vec::new();
        while self.eat(TokenKind::Pipe) {
            commands.push(self.stage(Self::command, Command::Error)?);
        }
        Ok(QueryStatement {
            head,
            commands,
            span: self.span_from(start),
        })
    }

    /// One pipe stage. A stage that fails to parse becomes an error node when
    /// recovering; leftover tokens after a good stage are reported and skipped.
    fn stage<T>(
        &mut self,
        parse: fn(&mut Self) -> PResult<T>,
        error: fn(ErrorNode) -> T,
    ) -> PResult<Spanned<T>> {
        let start = self.offset();
        match parse(self) {
            Ok(node) => {
                let span = self.span_from(start);
                if !self.at_boundary() {
                    let token = self.peek();
                    let message = format!(
                        "extraneous input {} expecting {}",
                        Self::describe(token),
                        format_expected(&IndexSet::from([TokenKind::Pipe, TokenKind::Eof]))
                    );
                    let err = self.error_at(token.span.start, message, &[TokenKind::Pipe, TokenKind::Eof]);
                    if !self.recovering() {
                        return Err(err);
                    }
                    self.record(err);
                    self.skip_to_boundary();
                }
                Ok(Spanned::new(node, span))
            }
            Err(err) => {
                if !self.recovering() || self.fatal.is_some() {
                    return Err(err);
                }
                self.record(err);
                self.skip_to_boundary();
                let span = self.span_from(start);
                let text = self
                    .source
                    .get(span.start..span.end)
                    .unwrap_or_default()
                    .to_string();
                Ok(Spanned::new(error(ErrorNode { text, span }), span))
            }
        }
    }
}

/// Bookkeeping for one ordered-alternative decision point.
pub(crate) struct Decision {
    name: &'static str,
    start: usize,
    attempts: usize,
    furthest: Option<SyntaxError>,
}

impl Decision {
    /// Keep the failure that got furthest; merge expected sets on ties.
    fn note(&mut self, err: SyntaxError) {
        self.furthest = Some(match self.furthest.take() {
            Some(mut best) if best.offset == err.offset => {
                best.expected.extend(err.expected);
                best
            }
            Some(best) if best.offset > err.offset => best,
            _ => err,
        });
    }

    /// Every alternative failed: report at the decision's start offset.
    fn exhausted(self) -> SyntaxError {
        match self.furthest {
            Some(furthest) => SyntaxError {
                offset: self.start,
                message: format!("no viable alternative for {}: {}", self.name, furthest.message),
                expected: furthest.expected,
            },
            None => SyntaxError {
                offset: self.start,
                message: format!("no viable alternative for {}", self.name),
                expected: IndexSet::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PplCommand, SearchCommand};

    fn query(input: &str) -> QueryStatement {
        match parse(input).unwrap().statement {
            Some(PplStatement::Query(q)) => q,
            None => panic!("expected a statement"),
        }
    }

    #[test]
    fn empty_input_has_no_statement() {
        assert_eq!(parse("").unwrap(), Root { statement: None });
        assert_eq!(parse("  \n ").unwrap(), Root { statement: None });
    }

    #[test]
    fn stage_spans_cover_their_text() {
        let input = "source=t | head 5";
        let q = query(input);
        assert_eq!(q.head.span, Span::new(0, 8));
        assert_eq!(q.commands[0].span, Span::new(11, 17));
        assert_eq!(q.span, Span::new(0, 17));
    }

    #[test]
    fn strict_mode_stops_at_first_error() {
        let err = parse("source=t | where | head").unwrap_err();
        let ParseError::Syntax(diags) = err else {
            panic!("expected syntax error");
        };
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].offset, 17);
    }

    #[test]
    fn recovery_replaces_failed_stage() {
        let input = "source=t | where | head 3";
        let outcome = parse_with(input, &ParseOptions::new()).unwrap();
        assert!(!outcome.is_valid());
        let Some(Root {
            statement: Some(PplStatement::Query(q)),
        }) = outcome.root
        else {
            panic!("expected a tree");
        };
        assert!(matches!(q.commands[0].node, Command::Error(_)));
        assert!(matches!(q.commands[1].node, Command::Head(_)));
        assert!(matches!(
            q.head.node,
            PplCommand::Search(SearchCommand::From(_))
        ));
    }

    #[test]
    fn input_limit_is_fatal() {
        let opts = ParseOptions::new().with_max_input_len(4);
        assert_eq!(
            parse_with("source=t", &opts),
            Err(ParseError::InputTooLong { len: 8, limit: 4 })
        );
    }

    #[test]
    fn nesting_limit_is_fatal() {
        let input = format!("source=t | eval x = {}1{}", "(".repeat(50), ")".repeat(50));
        let opts = ParseOptions::new().with_max_depth(10);
        assert!(matches!(
            parse_with(&input, &opts),
            Err(ParseError::NestingTooDeep { limit: 10, .. })
        ));
        assert!(parse_with(&input, &ParseOptions::new()).unwrap().is_valid());
    }

    #[test]
    fn lexical_errors_become_diagnostics() {
        let outcome = parse_with("source=t # | head", &ParseOptions::new()).unwrap();
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].offset, 9);
        assert!(outcome.diagnostics[0].message.contains("token recognition"));
        assert!(outcome.root.is_some());
    }
}
