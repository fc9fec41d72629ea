//! Benchmarks for ignore pattern parsing and resolution.
//!
//! These benchmarks measure compiling pattern lists and resolving them
//! against many config names, the hot path of listing ignored items.

use config_distro::ignore::{ConfigIgnoreConfig, Direction, IgnorePattern, SyncOperation};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const PATTERNS: &[&str] = &[
    "system.site:mail",
    "webform.*",
    "~webform.webform.contact",
    "views.view.*:display.*.cache",
    "language.*|views.view.*",
    "*.settings",
    "~core.extension",
    "block.block.*_local",
];

fn config_names(count: usize) -> Vec<String> {
    let prefixes = ["views.view", "webform.webform", "block.block", "system", "field.field"];
    (0..count)
        .map(|index| format!("{}.item_{}", prefixes[index % prefixes.len()], index))
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_patterns", |b| {
        b.iter(|| IgnorePattern::parse_all(black_box(PATTERNS)))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_ignored_configs");
    let ignore = ConfigIgnoreConfig::simple(PATTERNS);

    for count in [100, 1000, 10000] {
        let names = config_names(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &names, |b, names| {
            b.iter(|| {
                ignore.get_ignored_configs(
                    black_box("language.fr"),
                    names,
                    Direction::Import,
                    SyncOperation::Update,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_resolve);
criterion_main!(benches);
