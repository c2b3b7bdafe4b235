//! Black-box integration tests for the PPL front end
//!
//! These tests go through the public API only: text in, tree and
//! diagnostics out.

use ppl::ast::{
    ArithOp, Command, Expression, IdentStyle, LogicalExpr, LogicalOp, PplCommand, PplStatement,
    QueryStatement, SearchCommand, StatsFunction, ValueExpr,
};
use ppl::{ParseError, ParseOptions, PplError, TokenKind, parse, parse_query, parse_with, tokenize};

fn query(input: &str) -> QueryStatement {
    parse_query(input).unwrap_or_else(|err| panic!("{input:?} failed to parse: {err}"))
}

fn canonical(input: &str) -> String {
    parse(input).unwrap().to_string()
}

fn stages(input: &str) -> Vec<Command> {
    query(input).commands.into_iter().map(|c| c.node).collect()
}

// ============ Pipelines ============

#[test]
fn every_command_parses() {
    let input = "search source=logs status>=500 \
        | where host != 'db' \
        | fields + host, status \
        | rename host as server \
        | eval latency = end - start \
        | stats avg(latency) as avg_latency by server \
        | dedup server \
        | sort - avg_latency \
        | head 10 \
        | top 3 server \
        | rare server \
        | parse server '(?<dc>[a-z]+)-.*' \
        | grok server '%{WORD:name}' \
        | patterns server \
        | kmeans centroids=2 \
        | ad shingle_size=8 \
        | ml action='train'";
    let keywords: Vec<TokenKind> = stages(input).iter().filter_map(Command::keyword).collect();
    assert_eq!(
        keywords,
        vec![
            TokenKind::Where,
            TokenKind::Fields,
            TokenKind::Rename,
            TokenKind::Eval,
            TokenKind::Stats,
            TokenKind::Dedup,
            TokenKind::Sort,
            TokenKind::Head,
            TokenKind::Top,
            TokenKind::Rare,
            TokenKind::Parse,
            TokenKind::Grok,
            TokenKind::Patterns,
            TokenKind::Kmeans,
            TokenKind::Ad,
            TokenKind::Ml,
        ]
    );
}

#[test]
fn stage_count_includes_head() {
    let q = query("source=t | where a > 1 | head 5");
    assert_eq!(q.len(), 3);
    assert!(!q.has_errors());
}

#[test]
fn describe_and_show_datasources() {
    assert!(matches!(query("describe logs").head.node, PplCommand::Describe(_)));
    assert!(matches!(
        query("SHOW DATASOURCES").head.node,
        PplCommand::ShowDataSources
    ));
}

// ============ Search ============

#[test]
fn search_prefix_is_optional() {
    assert_eq!(canonical("source=t"), canonical("search source=t"));
}

#[test]
fn search_resolution_order() {
    let shape = |input: &str| match query(input).head.node {
        PplCommand::Search(search) => search,
        other => panic!("expected search, got {other:?}"),
    };
    assert!(matches!(shape("search a=1 source=t"), SearchCommand::FilterFrom { .. }));
    assert!(matches!(shape("search source=t a=1"), SearchCommand::FromFilter { .. }));
    assert!(matches!(shape("search source=t"), SearchCommand::From(_)));
    assert!(matches!(shape("search a=1"), SearchCommand::Filter(_)));
    assert!(matches!(shape("search"), SearchCommand::Empty));

    assert_eq!(canonical("search a=1 source=t"), "search a = 1 source=t");
    assert_eq!(canonical("search source=t a=1"), "search source=t a = 1");
}

// ============ Expressions ============

#[test]
fn arithmetic_precedence() {
    let Command::Eval(clauses) = stages("source=t | eval x = 1 + 2 * 3").remove(0) else {
        panic!("expected eval");
    };
    let Expression::Value(ValueExpr::Binary(lhs, ArithOp::Add, rhs)) = &clauses[0].value else {
        panic!("expected addition at the top, got {:?}", clauses[0].value);
    };
    assert!(matches!(**lhs, ValueExpr::Literal(_)));
    assert!(matches!(**rhs, ValueExpr::Binary(_, ArithOp::Mul, _)));
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(
        canonical("source=t | eval x = a - b - c, y = a - (b - c)"),
        "search source=t | eval x = a - b - c, y = a - (b - c)"
    );
}

#[test]
fn logical_precedence() {
    let Command::Where(expr) = stages("source=t | where a=1 or b=2 and c=3").remove(0) else {
        panic!("expected where");
    };
    let LogicalExpr::Binary(_, LogicalOp::Or, rhs) = expr else {
        panic!("expected OR at the top");
    };
    assert!(matches!(*rhs, LogicalExpr::Binary(_, LogicalOp::And, _)));
}

#[test]
fn juxtaposition_means_and() {
    assert_eq!(
        canonical("source=t | where a=1 b=2"),
        canonical("source=t | where a=1 AND b=2")
    );
    assert_eq!(
        canonical("source=t | where a=1 b=2"),
        "search source=t | where a = 1 AND b = 2"
    );
}

#[test]
fn deeply_nested_position_calls() {
    let depth = 30;
    let input = format!(
        "source=t | eval x = {}a{}",
        "position(".repeat(depth),
        " IN b)".repeat(depth)
    );
    let root = parse(&input).unwrap();
    assert_eq!(parse(&root.to_string()).unwrap().to_string(), root.to_string());
}

#[test]
fn condition_functions() {
    assert_eq!(
        canonical("source=t | where isnull(a) and not like(b, 'x%')"),
        "search source=t | where isnull(a) AND NOT like(b, 'x%')"
    );
}

// ============ Names ============

#[test]
fn quoted_names_are_one_segment() {
    let Command::Fields(fields) = stages(r#"source=t | fields `field.name`, "field.name""#).remove(0)
    else {
        panic!("expected fields");
    };
    for (name, style) in fields.fields.iter().zip([IdentStyle::Backtick, IdentStyle::Quoted]) {
        assert_eq!(name.len(), 1);
        assert_eq!(name.first().text, "field.name");
        assert_eq!(name.first().style, style);
    }
}

#[test]
fn dotted_names_split_into_segments() {
    let Command::Fields(fields) = stages("source=t | fields request.headers.host").remove(0) else {
        panic!("expected fields");
    };
    assert_eq!(fields.fields[0].len(), 3);
}

#[test]
fn wildcard_fields() {
    let Command::Fields(fields) = stages("source=t | fields a*, b").remove(0) else {
        panic!("expected fields");
    };
    assert!(fields.fields[0].is_wildcard());
    assert!(!fields.fields[1].is_wildcard());
}

#[test]
fn star_after_dot_is_a_wildcard_segment() {
    let Command::Fields(fields) = stages("source=t | fields request.*").remove(0) else {
        panic!("expected fields");
    };
    let segments: Vec<&str> = fields.fields[0].segments().map(|s| s.text.as_str()).collect();
    assert_eq!(segments, ["request", "*"]);
    assert!(fields.fields[0].is_wildcard());

    let Command::Rename(clauses) = stages("source=t | rename request.* as r*").remove(0) else {
        panic!("expected rename");
    };
    assert_eq!(clauses[0].from.joined(), "request.*");
    assert!(clauses[0].to.is_wildcard());

    assert_eq!(
        canonical("source=t | fields request.*, a.b.*"),
        "search source=t | fields request.*, a.b.*"
    );
}

#[test]
fn keywords_usable_as_field_names() {
    let Command::Stats(stats) = stages("source=t | stats avg(count) by source").remove(0) else {
        panic!("expected stats");
    };
    assert!(matches!(stats.aggregations[0].function, StatsFunction::Call { .. }));
    assert_eq!(stats.by.unwrap().fields[0].joined(), "source");
}

// ============ Recovery ============

#[test]
fn missing_paren_reported_at_end() {
    let input = "source=t | stats cnt(";
    let outcome = parse_with(input, &ParseOptions::new()).unwrap();
    assert!(!outcome.is_valid());
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].offset, input.len());
    assert_eq!(outcome.diagnostics[0].line, 1);
    assert_eq!(outcome.diagnostics[0].column, input.len() + 1);
}

#[test]
fn each_bad_stage_gets_a_diagnostic() {
    let input = "source=t | where | sort | head 3";
    let outcome = parse_with(input, &ParseOptions::new()).unwrap();
    let offsets: Vec<usize> = outcome.diagnostics.iter().map(|d| d.offset).collect();
    assert_eq!(offsets, vec![17, 24]);

    let Some(root) = outcome.root else {
        panic!("expected a tree");
    };
    let Some(PplStatement::Query(q)) = root.statement else {
        panic!("expected a statement");
    };
    assert!(q.has_errors());
    assert!(matches!(q.commands[0].node, Command::Error(_)));
    assert!(matches!(q.commands[1].node, Command::Error(_)));
    assert!(matches!(q.commands[2].node, Command::Head(_)));
}

#[test]
fn strict_parse_returns_first_error() {
    let err = parse("source=t | where | sort | head 3").unwrap_err();
    let ParseError::Syntax(diagnostics) = err else {
        panic!("expected a syntax error");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].offset, 17);
}

#[test]
fn diagnostics_on_later_lines() {
    let input = "source=t\n| where\n| head 3";
    let outcome = parse_with(input, &ParseOptions::new()).unwrap();
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].line, 3);
    assert_eq!(outcome.diagnostics[0].column, 1);
    let rendered = outcome.diagnostics[0].render(input);
    assert!(rendered.starts_with("3:1: "));
}

#[test]
fn recovery_is_deterministic() {
    let inputs = [
        "source=t | stats cnt(",
        "source=t | where a = | eval x = (1 + | head",
        "source=t | frobnicate | fields a,, b",
        "search a=1 b=2 index=t | sort - x",
    ];
    for input in inputs {
        let first = parse_with(input, &ParseOptions::new()).unwrap();
        let second = parse_with(input, &ParseOptions::new()).unwrap();
        assert_eq!(first, second, "nondeterministic result for {input:?}");
    }
}

// ============ Errors ============

fn head_count(input: &str) -> Result<i64, PplError> {
    let query = parse_query(input)?;
    match query.commands.first().map(|c| &c.node) {
        Some(Command::Head(head)) => match &head.count {
            Some(count) => Ok(count.to_i64()?),
            None => Ok(10),
        },
        _ => Ok(0),
    }
}

#[test]
fn error_conversions() {
    assert_eq!(head_count("source=t | head 7").unwrap(), 7);
    assert_eq!(head_count("source=t | head").unwrap(), 10);
    assert!(matches!(
        head_count("source=t | head 99999999999999999999"),
        Err(PplError::Literal(_))
    ));
    assert!(matches!(head_count("source=t | head x"), Err(PplError::Parse(_))));
    assert!(matches!(parse_query(""), Err(PplError::EmptyQuery)));
}

#[test]
fn error_messages() {
    let err = parse_query("source=t |").unwrap_err();
    assert!(err.to_string().starts_with("Parse error: "));
    assert_eq!(PplError::EmptyQuery.to_string(), "empty query");
}

// ============ Tokens and serialization ============

#[test]
fn token_stream_ends_with_eof() {
    let tokens = tokenize("source=t | head 5");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Source,
            TokenKind::Equal,
            TokenKind::Id,
            TokenKind::Pipe,
            TokenKind::Head,
            TokenKind::IntegerLiteral,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn tree_serializes_to_json() {
    let root = parse("source=t | where a > 1").unwrap();
    let json = serde_json::to_value(&root).unwrap();
    let commands = &json["statement"]["Query"]["commands"];
    assert!(commands[0]["node"].get("Where").is_some());
    assert!(json["statement"]["Query"]["head"]["node"]["Search"].get("From").is_some());
}
