//! Parse diagnostics

use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;

use crate::token::TokenKind;

/// One problem found while lexing or parsing.
///
/// `offset` is a byte offset into the query; `line` and `column` are 1-based,
/// with columns counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// Token kinds that would have been accepted here, in grammar order.
    pub expected: IndexSet<TokenKind>,
}

impl ParseDiagnostic {
    pub(crate) fn new(
        source: &str,
        offset: usize,
        message: impl Into<String>,
        expected: IndexSet<TokenKind>,
    ) -> Self {
        let (line, column) = offset_to_line_column(source, offset);
        Self {
            offset,
            line,
            column,
            message: message.into(),
            expected,
        }
    }

    /// Caret-style rendering against the query text:
    ///
    /// ```text
    /// 1:22: missing ')' at '<EOF>'
    ///   | source=t | stats cnt(
    ///   |                      ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let line_text = source.lines().nth(self.line - 1).unwrap_or("");
        let pad = " ".repeat(self.column.saturating_sub(1));
        format!(
            "{}:{}: {}\n  | {}\n  | {}^",
            self.line, self.column, self.message, line_text, pad
        )
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {}, offset {})",
            self.message, self.line, self.column, self.offset
        )
    }
}

pub(crate) fn offset_to_line_column(input: &str, offset: usize) -> (usize, usize) {
    let mut bounded = offset.min(input.len());
    while !input.is_char_boundary(bounded) {
        bounded -= 1;
    }
    let mut line = 1usize;
    let mut column = 1usize;

    for ch in input[..bounded].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// `{'(', ID}` / `')'`
pub(crate) fn format_expected(expected: &IndexSet<TokenKind>) -> String {
    if expected.len() == 1 {
        if let Some(kind) = expected.first() {
            return kind.display();
        }
    }
    let items: Vec<String> = expected.iter().map(|k| k.display()).collect();
    format!("{{{}}}", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_and_column() {
        assert_eq!(offset_to_line_column("abc", 0), (1, 1));
        assert_eq!(offset_to_line_column("abc", 3), (1, 4));
        assert_eq!(offset_to_line_column("a\nbc", 3), (2, 2));
        assert_eq!(offset_to_line_column("é|", 2), (1, 2));
    }

    #[test]
    fn render_points_at_offset() {
        let source = "source=t | stats cnt(";
        let diag = ParseDiagnostic::new(
            source,
            source.len(),
            "missing ')' at '<EOF>'",
            IndexSet::from([TokenKind::RtPrths]),
        );
        let rendered = diag.render(source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "1:22: missing ')' at '<EOF>'");
        assert_eq!(lines[1], "  | source=t | stats cnt(");
        assert_eq!(lines[2].find('^'), Some(4 + source.len()));
    }

    #[test]
    fn expected_formatting() {
        assert_eq!(format_expected(&IndexSet::from([TokenKind::RtPrths])), "')'");
        assert_eq!(
            format_expected(&IndexSet::from([TokenKind::LtPrths, TokenKind::Id])),
            "{'(', ID}"
        );
    }
}
