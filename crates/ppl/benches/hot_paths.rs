use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ppl::{ParseOptions, parse, parse_with, tokenize};

const DASHBOARD_QUERY: &str = "search source=logs-* status>=500 \
    | where host != 'db' and (latency > 250 or match(message, 'timeout')) \
    | eval latency_s = latency / 1000, bucket = cast(ts as date) \
    | stats count() as errors, avg(latency_s) as avg_latency by span(ts, 5m) as window, host \
    | sort - errors \
    | head 20";

fn nested_casts(depth: usize) -> String {
    let mut expr = "x".to_string();
    for _ in 0..depth {
        expr = format!("cast({expr} as string)");
    }
    format!("source=t | eval y = {expr}")
}

fn long_pipeline(stages: usize) -> String {
    let mut query = "source=t".to_string();
    for i in 0..stages {
        query.push_str(&format!(" | where f{i} > {i} | eval g{i} = f{i} * 2 + 1"));
    }
    query
}

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_dashboard_query", |b| {
        b.iter(|| tokenize(black_box(DASHBOARD_QUERY)))
    });
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_dashboard_query", |b| {
        b.iter(|| parse(black_box(DASHBOARD_QUERY)).unwrap())
    });

    let query = long_pipeline(50);
    c.bench_function("parse_long_pipeline", |b| {
        b.iter(|| parse(black_box(&query)).unwrap())
    });
}

fn bench_speculation(c: &mut Criterion) {
    let query = nested_casts(40);
    c.bench_function("parse_nested_casts", |b| {
        b.iter(|| parse(black_box(&query)).unwrap())
    });
}

fn bench_recovery(c: &mut Criterion) {
    let opts = ParseOptions::new();
    let query = "source=t | where a = | stats cnt( | eval x = (1 + | frobnicate | head 5";
    c.bench_function("parse_with_recovery", |b| {
        b.iter(|| parse_with(black_box(query), black_box(&opts)).unwrap())
    });
}

fn bench_display(c: &mut Criterion) {
    let root = parse(DASHBOARD_QUERY).unwrap();
    c.bench_function("display_dashboard_query", |b| {
        b.iter(|| black_box(&root).to_string())
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_parse,
    bench_speculation,
    bench_recovery,
    bench_display
);
criterion_main!(benches);
