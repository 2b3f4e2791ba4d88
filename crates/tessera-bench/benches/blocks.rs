//! Block tree benchmarks.
//!
//! Measures flattening block forests into records and rebuilding them.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_bench::fixtures::{generate_blocks, services};
use tessera_core::record::{blocks_from_bytes, blocks_to_bytes};
use tokio::runtime::Runtime;

const SHAPES: [(usize, usize); 3] = [(4, 4), (16, 16), (64, 32)];

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks/flatten");
    let (_, mapper) = services();

    for (groups, children) in SHAPES {
        let blocks = generate_blocks(groups, children);
        let name = format!("{groups}x{children}");

        group.bench_with_input(BenchmarkId::from_parameter(name), &blocks, |b, blocks| {
            b.iter(|| black_box(mapper.flatten_blocks(blocks).unwrap()));
        });
    }

    group.finish();
}

fn bench_unflatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks/unflatten");
    let rt = Runtime::new().unwrap();
    let (_, mapper) = services();

    for (groups, children) in SHAPES {
        let records = mapper
            .flatten_blocks(&generate_blocks(groups, children))
            .unwrap();
        let name = format!("{groups}x{children}");

        group.bench_with_input(BenchmarkId::from_parameter(name), &records, |b, records| {
            b.to_async(&rt)
                .iter(|| async { black_box(mapper.unflatten_blocks(records).await.unwrap()) });
        });
    }

    group.finish();
}

fn bench_archive(c: &mut Criterion) {
    let mut group = c.benchmark_group("blocks/archive");
    let (_, mapper) = services();
    let records = mapper.flatten_blocks(&generate_blocks(16, 16)).unwrap();
    let bytes = blocks_to_bytes(&records).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(blocks_to_bytes(&records).unwrap()));
    });

    group.bench_function("decode", |b| {
        b.iter(|| black_box(blocks_from_bytes(&bytes).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_flatten, bench_unflatten, bench_archive);
criterion_main!(benches);
