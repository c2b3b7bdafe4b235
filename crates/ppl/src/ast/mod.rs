//! Syntax tree for PPL
//!
//! Split into:
//! - `command`: pipeline stages (`where`, `stats`, `sort`, ...)
//! - `expr`: logical, comparison and value expressions
//! - `literal`: validated literal values
//!
//! Every node is exclusively owned by its parent. Nodes are built bottom-up in
//! a single parse pass and never mutated afterwards.

pub mod command;
pub mod expr;
pub mod literal;

use serde::Serialize;

use crate::token::Span;

pub use command::*;
pub use expr::*;
pub use literal::*;

/// Top of the tree. `statement` is `None` for an empty query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Root {
    pub statement: Option<PplStatement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PplStatement {
    Query(QueryStatement),
}

/// `pplCommands (| commands)*`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryStatement {
    pub head: Spanned<PplCommand>,
    pub commands: Vec<Spanned<Command>>,
    pub span: Span,
}

impl QueryStatement {
    /// Number of pipeline stages, head included.
    pub fn len(&self) -> usize {
        self.commands.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when some stage failed to parse and was replaced by an [`ErrorNode`].
    pub fn has_errors(&self) -> bool {
        matches!(self.head.node, PplCommand::Error(_))
            || self
                .commands
                .iter()
                .any(|c| matches!(c.node, Command::Error(_)))
    }
}

/// A node plus the byte range it was parsed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Placeholder for a pipeline stage that could not be parsed.
///
/// Keeps the skipped source text so tooling can still point at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorNode {
    pub text: String,
    pub span: Span,
}

// ============ Names ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IdentStyle {
    /// `field`
    Bare,
    /// `.field`
    DotPrefixed,
    /// `` `field.name` ``
    Backtick,
    /// `"field.name"` in wildcard field positions
    Quoted,
    /// A keyword standing in for an identifier: `source`, `count`, `span`
    Keyword,
}

/// One name segment. `text` is unquoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Ident {
    pub text: String,
    pub style: IdentStyle,
}

impl Ident {
    pub fn new(text: impl Into<String>, style: IdentStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn bare(text: impl Into<String>) -> Self {
        Self::new(text, IdentStyle::Bare)
    }

    /// `*` and `%` mark pattern segments (`a*`, `a%b`).
    pub fn is_wildcard(&self) -> bool {
        self.text.contains(['*', '%'])
    }
}

/// Dot-separated field reference. Always has at least one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualifiedName {
    first: Ident,
    rest: Vec<Ident>,
    pub span: Span,
}

impl QualifiedName {
    pub fn new(first: Ident, rest: Vec<Ident>, span: Span) -> Self {
        Self { first, rest, span }
    }

    pub fn single(ident: Ident, span: Span) -> Self {
        Self::new(ident, Vec::new(), span)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Ident> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    pub fn first(&self) -> &Ident {
        &self.first
    }

    pub fn len(&self) -> usize {
        self.rest.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pattern field reference such as `a*` or `request.*`.
    pub fn is_wildcard(&self) -> bool {
        self.segments().any(Ident::is_wildcard)
    }

    /// Segments joined with `.`, quoting dropped.
    pub fn joined(&self) -> String {
        self.segments()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Index name with an optional cross-cluster prefix: `remote:logs-*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableQualifiedName {
    /// Cluster name without the trailing colon.
    pub cluster: Option<String>,
    pub name: QualifiedName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TableSource {
    Name(TableQualifiedName),
    /// Date-suffixed index pattern lexed as one token: `logs-2021.01.*`
    DateSuffix { text: String, span: Span },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(parts: &[&str]) -> QualifiedName {
        let mut idents = parts.iter().map(|p| Ident::bare(*p));
        let first = idents.next().unwrap();
        QualifiedName::new(first, idents.collect(), Span::default())
    }

    #[test]
    fn qualified_name_helpers() {
        let n = name(&["request", "headers", "host"]);
        assert_eq!(n.len(), 3);
        assert_eq!(n.joined(), "request.headers.host");
        assert!(!n.is_wildcard());
        assert!(name(&["request", "*"]).is_wildcard());
        assert!(name(&["a%b"]).is_wildcard());
    }
}
