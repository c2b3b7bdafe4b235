use ppl::{ParseOptions, parse, parse_with};
use proptest::prelude::*;

fn arb_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("status".to_string()),
        Just("latency".to_string()),
        Just("`req.path`".to_string()),
    ]
}

fn arb_atom() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_field(),
        (0i64..1000).prop_map(|n| n.to_string()),
        (0i64..1000).prop_map(|n| format!("-{n}")),
        (0u32..100, 1u32..100).prop_map(|(w, f)| format!("{w}.{f}")),
        Just("'text'".to_string()),
    ]
}

fn arb_value(depth: u32) -> BoxedStrategy<String> {
    if depth == 0 {
        return arb_atom().boxed();
    }

    let leaf = arb_atom();
    let nested = (
        arb_value(depth - 1),
        prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("%")],
        arb_value(depth - 1),
    )
        .prop_map(|(lhs, op, rhs)| format!("({lhs} {op} {rhs})"));
    let call = arb_value(depth - 1).prop_map(|arg| format!("abs({arg})"));
    let cast = (
        arb_value(depth - 1),
        prop_oneof![Just("int"), Just("double"), Just("string")],
    )
        .prop_map(|(value, ty)| format!("cast({value} as {ty})"));
    let position = (arb_value(depth - 1), arb_field())
        .prop_map(|(needle, field)| format!("position({needle} IN {field})"));
    prop_oneof![leaf, nested, call, cast, position].boxed()
}

fn arb_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (0i64..1000).prop_map(|n| n.to_string()),
        (0i64..1000).prop_map(|n| format!("-{n}")),
        Just("'text'".to_string()),
        Just("true".to_string()),
    ]
}

fn arb_comparison() -> impl Strategy<Value = String> {
    let compare = (
        arb_field(),
        prop_oneof![Just("="), Just("!="), Just("<"), Just("<="), Just(">"), Just(">=")],
        arb_value(1),
    )
        .prop_map(|(field, op, value)| format!("{field} {op} {value}"));
    let membership = (arb_field(), prop::collection::vec(arb_literal(), 1..4))
        .prop_map(|(field, values)| format!("{field} in ({})", values.join(", ")));
    prop_oneof![3 => compare, 1 => membership]
}

fn arb_wc_field() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => arb_field(),
        1 => Just("request.*".to_string()),
        1 => Just("lat*".to_string()),
        1 => Just("\"quoted name\"".to_string()),
    ]
}

fn arb_logical(depth: u32) -> BoxedStrategy<String> {
    if depth == 0 {
        return arb_comparison().boxed();
    }

    let leaf = arb_comparison();
    let nested = (
        arb_logical(depth - 1),
        prop_oneof![Just(" AND "), Just(" or "), Just(" XOR "), Just(" ")],
        arb_logical(depth - 1),
    )
        .prop_map(|(lhs, op, rhs)| format!("({lhs}{op}{rhs})"));
    let negated = arb_logical(depth - 1).prop_map(|inner| format!("NOT {inner}"));
    prop_oneof![leaf, nested, negated].boxed()
}

fn arb_stage() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_logical(2).prop_map(|e| format!("where {e}")),
        (arb_field(), arb_value(2)).prop_map(|(f, v)| format!("eval {f} = {v}")),
        (prop_oneof![Just(""), Just("+ "), Just("- ")], arb_field())
            .prop_map(|(dir, f)| format!("sort {dir}{f}")),
        (0u32..100).prop_map(|n| format!("head {n}")),
        prop::collection::vec(arb_wc_field(), 1..4)
            .prop_map(|fs| format!("fields {}", fs.join(", "))),
        (prop_oneof![Just("avg"), Just("sum"), Just("max")], arb_field(), arb_field())
            .prop_map(|(func, v, by)| format!("stats {func}({v}) by {by}")),
    ]
}

fn arb_head() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("source=logs".to_string()),
        arb_comparison().prop_map(|filter| format!("search source=logs {filter}")),
        arb_logical(1).prop_map(|filter| format!("search {filter} source=logs")),
    ]
}

fn arb_query() -> impl Strategy<Value = String> {
    (arb_head(), prop::collection::vec(arb_stage(), 0..5)).prop_map(|(head, stages)| {
        let mut query = head;
        for stage in stages {
            query.push_str(" | ");
            query.push_str(&stage);
        }
        query
    })
}

/// Token soup for the recovering parser.
fn arb_fragments() -> impl Strategy<Value = String> {
    let fragment = prop_oneof![
        Just("|"),
        Just("("),
        Just(")"),
        Just(","),
        Just("="),
        Just("+"),
        Just("source"),
        Just("where"),
        Just("stats"),
        Just("count"),
        Just("by"),
        Just("not"),
        Just("and"),
        Just("a"),
        Just("1"),
        Just("'x'"),
        Just("#"),
    ];
    prop::collection::vec(fragment, 0..16).prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn display_is_a_fixed_point(query in arb_query()) {
        let first = parse(&query).expect("generated query should parse").to_string();
        let reparsed = parse(&first).expect("canonical text should reparse");
        let second = reparsed.to_string();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(reparsed, parse(&second).expect("canonical text should reparse"));
    }

    #[test]
    fn parsing_is_deterministic(query in arb_query()) {
        prop_assert_eq!(parse(&query), parse(&query));
    }

    #[test]
    fn recovery_never_panics(input in arb_fragments()) {
        let opts = ParseOptions::new();
        let first = parse_with(&input, &opts).expect("short input is never fatal");
        let second = parse_with(&input, &opts).expect("short input is never fatal");
        prop_assert!(first.diagnostics.iter().all(|d| d.offset <= input.len()));
        prop_assert_eq!(first, second);
    }
}
