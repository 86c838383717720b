// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Completion pipeline benchmarks
//!
//! Measures schema parsing, buffer scanning and end-to-end requests against
//! a warm cache.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;

use mssql_complete::{CompletionEngine, CompletionRequest, EngineConfig};
use mssql_complete_catalog::{QueryVersion, SchemaSnapshot, rows::parse_output};
use mssql_complete_context::{BufferScan, VariableScope, classify};
use mssql_complete_test_utils::MockFetcher;

const TABLES: usize = 200;
const COLUMNS: usize = 12;

fn synthetic_output() -> String {
    let mut out = String::new();
    for t in 0..TABLES {
        for c in 0..COLUMNS {
            out.push_str(&format!("TABLE_{t},table,COLUMN_{c},NVARCHAR,1,{}\n", 10 + c));
        }
    }
    out
}

fn synthetic_buffer() -> Vec<String> {
    let mut lines = vec!["DECLARE @id INT".to_string(), "DECLARE @name NVARCHAR(50)".to_string()];
    lines.push("SELECT t0.COLUMN_1, t1.".to_string());
    lines.push("FROM table_0 t0".to_string());
    for t in 1..20 {
        lines.push(format!("JOIN table_{t} t{t} ON t{t}.COLUMN_0 = t0.COLUMN_0"));
    }
    lines.push("WHERE t0.COLUMN_2 = @id".to_string());
    lines
}

fn bench_parse_output(c: &mut Criterion) {
    let output = synthetic_output();

    c.bench_function("catalog/parse_output", |b| {
        b.iter(|| {
            let rows = parse_output(black_box(&output), QueryVersion::V5);
            black_box(rows)
        });
    });

    let rows = parse_output(&output, QueryVersion::V5).unwrap_or_default();
    c.bench_function("catalog/snapshot_from_rows", |b| {
        b.iter(|| black_box(SchemaSnapshot::from_rows(rows.clone())));
    });
}

fn bench_buffer_scan(c: &mut Criterion) {
    let buffer = synthetic_buffer();

    c.bench_function("context/buffer_scan", |b| {
        b.iter(|| black_box(BufferScan::scan(black_box(&buffer), VariableScope::Buffer)));
    });

    c.bench_function("context/classify", |b| {
        b.iter(|| black_box(classify(black_box("SELECT t0.COLUMN_1, t1."), 23)));
    });
}

fn bench_warm_completion(c: &mut Criterion) {
    let Ok(runtime) = tokio::runtime::Runtime::new() else {
        return;
    };
    let fetcher = MockFetcher::with_output(&synthetic_output(), QueryVersion::V5);
    let mut engine = CompletionEngine::with_fetcher(EngineConfig::default(), Arc::new(fetcher));

    let column = CompletionRequest::at(synthetic_buffer(), 2, 23);
    let tables = CompletionRequest::new("SELECT * FROM ", 14).with_buffer(synthetic_buffer());

    c.bench_function("completion/column_warm", |b| {
        b.iter(|| black_box(runtime.block_on(engine.complete(&column))));
    });

    c.bench_function("completion/tables_warm", |b| {
        b.iter(|| black_box(runtime.block_on(engine.complete(&tables))));
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_parse_output, bench_buffer_scan, bench_warm_completion
);

criterion_main!(benches);
