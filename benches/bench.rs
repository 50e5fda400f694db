//! Criterion benchmarks for sarissa-highlight.
//!
//! - Pattern matching, forward-only vs two-pass, on leading-wildcard patterns
//! - Tokenizing and weighing text
//! - The full highlighting pipeline

use std::hint::black_box;

use ahash::AHashMap;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sarissa_highlight::config::HighlightConfig;
use sarissa_highlight::highlighter::Highlighter;
use sarissa_highlight::hit_enum::{TokenStreamHitEnum, collect_hits};
use sarissa_highlight::matcher::{MatchStrategy, Pattern};
use sarissa_highlight::weight::{ExactMatchTermWeigher, HashingTermSourceFinder};

const WORDS: &[&str] = &[
    "search", "engine", "snippet", "highlight", "text", "index", "query", "document", "field",
    "term", "phrase", "lazy", "dog", "brown", "fox", "wildcard", "automaton", "segment",
];

/// Generate random text from a small vocabulary.
fn generate_text(words: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = Vec::with_capacity(words);
    for _ in 0..words {
        text.push(WORDS[rng.random_range(0..WORDS.len())]);
    }
    text.join(" ")
}

/// Random letters with a sparse target character, the worst case for a
/// forward-only scan of `.*x`.
fn generate_letters(len: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            if rng.random_bool(0.01) {
                'x'
            } else {
                rng.random_range('a'..='w')
            }
        })
        .collect()
}

/// Benchmark forward-only vs two-pass pattern matching.
fn bench_pattern_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_matching");

    for len in [1_000usize, 10_000] {
        let text = generate_letters(len, 42);
        group.throughput(Throughput::Bytes(len as u64));

        for (name, strategy) in [
            ("forward_only", MatchStrategy::ForwardOnly),
            ("two_pass", MatchStrategy::TwoPass),
        ] {
            let pattern = Pattern::regex(".*x")
                .and_then(|p| p.with_strategy(strategy))
                .unwrap();
            group.bench_function(format!("{name}_{len}"), |b| {
                b.iter(|| {
                    let mut hits = pattern.hits(black_box(&text));
                    black_box(collect_hits(&mut hits).unwrap())
                })
            });
        }
    }

    group.finish();
}

/// Benchmark tokenizing and weighing.
fn bench_token_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("token_stream");

    let text = generate_text(5_000, 7);
    let weigher = ExactMatchTermWeigher::new(AHashMap::new(), 0.0)
        .with_term("lazy", 2.0)
        .with_term("fox", 1.0);
    let finder = HashingTermSourceFinder;

    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("tokenize_and_weigh", |b| {
        b.iter(|| {
            let mut hits = TokenStreamHitEnum::new(black_box(&text), &weigher, &finder);
            black_box(collect_hits(&mut hits).unwrap())
        })
    });

    group.finish();
}

/// Benchmark the whole pipeline.
fn bench_highlighter(c: &mut Criterion) {
    let mut group = c.benchmark_group("highlighter");

    let values: Vec<String> = (0..10).map(|i| generate_text(500, i)).collect();
    let terms = [("lazy", 2.0), ("fox", 1.0), ("automaton", 1.5)];

    let highlighter = Highlighter::new(HighlightConfig::new().max_snippets(3));
    group.throughput(Throughput::Elements(values.len() as u64));
    group.bench_function("highlight_terms", |b| {
        b.iter(|| {
            black_box(
                highlighter
                    .highlight_terms(black_box(values.as_slice()), &terms)
                    .unwrap(),
            )
        })
    });

    let patterns = [(Pattern::wildcard("*tomaton").unwrap(), 1.0)];
    group.bench_function("highlight_patterns", |b| {
        b.iter(|| {
            black_box(
                highlighter
                    .highlight_patterns(black_box(values.as_slice()), &patterns)
                    .unwrap(),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pattern_matching,
    bench_token_stream,
    bench_highlighter
);
criterion_main!(benches);
