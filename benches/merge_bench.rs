// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use request_promise::merge::deep_merge;
use request_promise::RequestOptions;
use serde_json::json;

fn deep_merge_benchmark(c: &mut Criterion) {
    let defaults = json!({
        "baseUrl": "http://localhost:4000",
        "headers": {"accept": "application/json", "user-agent": "bench"},
        "qs": {"page": 1, "limit": 50},
        "pool": {"maxSockets": 10},
        "simple": false
    });
    let call = json!({
        "uri": "/items",
        "headers": {"accept": "text/plain", "x-trace": "abc"},
        "qs": {"page": 2},
        "json": true
    });

    c.bench_function("deep_merge", |b| {
        b.iter(|| black_box(deep_merge(black_box(&defaults), black_box(&call))))
    });
}

fn options_merge_benchmark(c: &mut Criterion) {
    let layers: Vec<RequestOptions> = (0..4)
        .map(|i| {
            RequestOptions::new()
                .header(format!("x-layer-{}", i), "1")
                .query("layer", i)
                .simple(i % 2 == 0)
        })
        .collect();

    c.bench_function("options_merge_chain", |b| {
        b.iter(|| {
            layers
                .iter()
                .try_fold(RequestOptions::new(), |acc, layer| acc.merged(layer))
                .map(black_box)
        })
    });
}

criterion_group!(benches, deep_merge_benchmark, options_merge_benchmark);
criterion_main!(benches);
