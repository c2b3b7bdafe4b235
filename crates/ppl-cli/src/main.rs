//! PPL command line front end
//!
//! Parses a query and prints its canonical form, syntax tree or tokens.
//! Nothing is executed.

use std::io::Read;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ppl::ast::Root;
use ppl::{ParseDiagnostic, ParseError, ParseOptions, ParseOutcome, parse_with, tokenize};
use serde::Serialize;

// ============ CLI ============

#[derive(Parser)]
#[command(name = "ppl")]
#[command(about = "Parse and check PPL queries")]
#[command(after_help = "\
EXAMPLES:
    # Canonical form
    ppl 'source=logs | where status >= 500 | stats count() by host'

    # Read the query from stdin, print the tree as JSON
    echo 'source=logs | head 5' | ppl --format json

    # Show the token stream
    ppl --tokens 'source=logs | fields a, b'
")]
struct Args {
    /// Query text. Read from stdin when omitted or `-`.
    query: Option<String>,

    /// Stop at the first syntax error instead of recovering
    #[arg(long)]
    strict: bool,

    /// Output format for the parsed query
    #[arg(short, long, value_enum, default_value_t = Format::Canonical)]
    format: Format,

    /// Line width for `--format pretty`
    #[arg(long, default_value = "80")]
    width: usize,

    /// Deepest allowed nesting of parentheses and function calls
    #[arg(long, default_value = "200")]
    max_depth: usize,

    /// Print tokens instead of parsing
    #[arg(long)]
    tokens: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Single-line canonical PPL
    Canonical,
    /// Canonical PPL, one stage per line when long
    Pretty,
    /// Rust debug dump of the tree
    Debug,
    /// Tree and diagnostics as JSON
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    valid: bool,
    root: Option<&'a Root>,
    diagnostics: &'a [ParseDiagnostic],
}

// ============ Main ============

fn read_query(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(query) if query != "-" => Ok(query),
        _ => {
            let mut query = String::new();
            std::io::stdin()
                .read_to_string(&mut query)
                .context("failed to read query from stdin")?;
            Ok(query)
        }
    }
}

/// Parse `query`, turning a strict-mode syntax error into an outcome
/// without a tree so its diagnostics render like recovered ones.
fn run_parse(query: &str, options: &ParseOptions) -> Result<ParseOutcome, ParseError> {
    match parse_with(query, options) {
        Err(ParseError::Syntax(diagnostics)) => Ok(ParseOutcome {
            root: None,
            diagnostics,
        }),
        other => other,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let query = read_query(args.query)?;

    if args.tokens {
        for token in tokenize(&query) {
            println!(
                "{}:{}\t{}\t{:?}",
                token.line,
                token.column,
                token.kind.name(),
                token.text
            );
        }
        return Ok(());
    }

    let options = ParseOptions::new()
        .with_recovery(!args.strict)
        .with_max_depth(args.max_depth);
    let outcome = run_parse(&query, &options)?;
    log::debug!(
        "parsed {} bytes with {} diagnostics",
        query.len(),
        outcome.diagnostics.len()
    );

    match (args.format, &outcome.root) {
        (Format::Json, root) => {
            let report = Report {
                valid: outcome.is_valid(),
                root: root.as_ref(),
                diagnostics: &outcome.diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        (Format::Canonical, Some(root)) => println!("{root}"),
        (Format::Pretty, Some(root)) => println!("{}", root.pretty(args.width)),
        (Format::Debug, Some(root)) => println!("{root:#?}"),
        (_, None) => {}
    }

    if !matches!(args.format, Format::Json) {
        for diagnostic in &outcome.diagnostics {
            eprintln!("{}", diagnostic.render(&query));
        }
    }

    if !outcome.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_errors_keep_their_diagnostics() {
        let query = "source=t | where | head 3";
        let outcome = run_parse(query, &ParseOptions::strict()).unwrap();
        assert!(!outcome.is_valid());
        assert!(outcome.root.is_none());
        assert_eq!(outcome.diagnostics.len(), 1);
        let rendered = outcome.diagnostics[0].render(query);
        assert!(rendered.starts_with("1:18: "), "{rendered}");
        assert!(rendered.ends_with('^'));
    }

    #[test]
    fn fatal_errors_still_fail() {
        let options = ParseOptions::strict().with_max_depth(2);
        let err = run_parse("source=t | eval x = ((((1))))", &options).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 2, .. }));
    }

    #[test]
    fn recovered_queries_pass_through() {
        let outcome = run_parse("source=t | head 3", &ParseOptions::new()).unwrap();
        assert!(outcome.is_valid());
    }
}
