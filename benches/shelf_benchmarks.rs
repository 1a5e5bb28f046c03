#![allow(missing_docs)]
//! Benchmarks for shelfkey encoding, outline lookup and browse windows.
//!
//! Uses Criterion.rs over synthetic call numbers so no fixtures are needed.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vshelf::browse::{BrowseEngine, BrowseRequest, OffsetSpec};
use vshelf::config::{BrowseConfig, StatusConfig};
use vshelf::document::CatalogDocument;
use vshelf::holdings::{HoldingsSnapshot, ItemCopy};
use vshelf::lcc::LccTree;
use vshelf::range_display::describe_window;
use vshelf::shelfkey::encode;
use vshelf::status::StatusEngine;
use vshelf::store::InMemoryStore;

/// Deterministic spread of call numbers across a few subclasses.
fn synthetic_call_numbers(count: usize) -> Vec<String> {
    const LETTERS: &[&str] = &["E", "F", "KF", "LB", "PS", "QA", "QB", "QC"];
    (0..count)
        .map(|i| {
            let letters = LETTERS[i % LETTERS.len()];
            let integer = 1 + (i * 37) % 3000;
            let decimal = (i * 7) % 100;
            let cutter = char::from(b'A' + (i % 26) as u8);
            format!("{letters}{integer}.{decimal} .{cutter}{} {}", 1 + i % 89, 1950 + i % 70)
        })
        .collect()
}

fn synthetic_store(count: usize) -> InMemoryStore {
    let mut store = InMemoryStore::from_documents(
        synthetic_call_numbers(count)
            .iter()
            .enumerate()
            .map(|(i, cn)| CatalogDocument::new(&format!("d{i}"), cn)),
    );
    for i in (0..count).step_by(3) {
        store.set_holdings(
            &format!("d{i}"),
            HoldingsSnapshot::builder()
                .copy(ItemCopy::new("ALDERMAN", "STACKS"))
                .copy(ItemCopy::new("LAW", "RESERVE").reserve(true))
                .language("French")
                .build(),
        );
    }
    store
}

fn benchmark_encode(c: &mut Criterion) {
    let call_numbers = synthetic_call_numbers(1_000);

    c.bench_function("encode_1k_call_numbers", |b| {
        b.iter(|| {
            call_numbers
                .iter()
                .filter_map(|cn| encode(black_box(cn)))
                .count()
        });
    });
}

fn benchmark_outline(c: &mut Criterion) {
    c.bench_function("load_bundled_outline", |b| {
        b.iter(|| LccTree::bundled().map(|tree| tree.len()));
    });

    let tree = LccTree::bundled().expect("bundled outline loads");
    let call_numbers = synthetic_call_numbers(1_000);
    c.bench_function("lookup_1k_call_numbers", |b| {
        b.iter(|| {
            call_numbers
                .iter()
                .map(|cn| tree.lookup(black_box(cn)).len())
                .sum::<usize>()
        });
    });
}

fn benchmark_browse(c: &mut Criterion) {
    let engine = BrowseEngine::new(synthetic_store(10_000), BrowseConfig::default())
        .expect("default config is valid");
    let tree = LccTree::bundled().expect("bundled outline loads");
    let status = StatusEngine::new(&StatusConfig::default()).expect("default config is valid");

    let mut group = c.benchmark_group("browse_window");
    for width in [5usize, 15, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            let request = BrowseRequest::document("d5000")
                .width(width)
                .offset(OffsetSpec::Middle);
            b.iter(|| engine.browse(black_box(&request)).map(|w| w.len()));
        });
    }
    group.finish();

    let request = BrowseRequest::document("d5000").width(15).page(-2);
    let window = engine.browse(&request).expect("window");
    c.bench_function("annotate_window_15", |b| {
        b.iter(|| status.annotate_window(black_box(&window), engine.store(), Some("d5000")));
    });
    c.bench_function("describe_window_15", |b| {
        b.iter(|| describe_window(black_box(&window), &tree));
    });
}

criterion_group!(benches, benchmark_encode, benchmark_outline, benchmark_browse);
criterion_main!(benches);
