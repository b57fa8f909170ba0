// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Benchmarks for the Python3Subset lexer, parser and sample listeners.
//!
//! Run with:
//! ```bash
//! cargo bench -p schemagram-python
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use schemagram_python::{parse_file, tokenize, DefinitionCollector, NameCollector, SuiteTracker};
use std::hint::black_box;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Model classes with fields, templates and conditional suites.
fn generate_model_code(num_classes: usize) -> String {
    let mut code = String::new();
    for i in 0..num_classes {
        code.push_str(&format!(
            r#"@model(sql=f"SELECT * FROM schema_{i}.orders WHERE id > {{min_id}}")
class Orders{i}:
    amount = measure(type="sum", sql=f'{{CUBE}}.amount * {i}')
    if owner:
        status = dimension(sql="status", values=[1, 2, 3])
    else:
        status = None

    def total(self, rows, *, scale=1.0):
        return sum(row.amount * scale for row in rows if row.valid)

"#
        ));
    }
    code
}

/// Expressions nested `depth` parentheses deep.
fn generate_nested_code(depth: usize) -> String {
    format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth))
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    for size in [10, 100, 500] {
        let code = generate_model_code(size);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("models", size), &code, |b, code| {
            b.iter(|| tokenize(black_box(code)))
        });
    }
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_file");
    for size in [10, 100, 500] {
        let code = generate_model_code(size);
        group.throughput(Throughput::Bytes(code.len() as u64));
        group.bench_with_input(BenchmarkId::new("models", size), &code, |b, code| {
            b.iter(|| parse_file(black_box(code)))
        });
    }
    for depth in [10, 50] {
        let code = generate_nested_code(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &code, |b, code| {
            b.iter(|| parse_file(black_box(code)))
        });
    }
    group.finish();
}

fn bench_listeners(c: &mut Criterion) {
    let mut group = c.benchmark_group("listeners");
    let code = generate_model_code(100);
    let Ok(tree) = parse_file(&code) else {
        return;
    };
    group.throughput(Throughput::Elements(tree.node_count() as u64));
    group.bench_function("names", |b| b.iter(|| NameCollector::collect(black_box(&tree))));
    group.bench_function("definitions", |b| {
        b.iter(|| DefinitionCollector::collect(black_box(&tree)))
    });
    group.bench_function("suites", |b| b.iter(|| SuiteTracker::collect(black_box(&tree))));
    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_parse, bench_listeners);
criterion_main!(benches);
