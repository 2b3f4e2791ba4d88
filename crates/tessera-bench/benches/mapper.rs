//! Mapper benchmarks.
//!
//! Measures saving models to field rows, loading rows back into dynamic
//! models, and the cost of archiving rows with rkyv versus JSON.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_bench::fixtures::{generate_page, landing_page_type, services, Scale};
use tessera_core::{ContentEntity, StoredContent};
use tokio::runtime::Runtime;

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper/save");
    let (_, mapper) = services();
    let content_type = landing_page_type();

    for scale in Scale::all() {
        let model = generate_page(scale.count());
        let name = format!("{:?}", scale);

        group.bench_with_input(BenchmarkId::new("fresh", &name), &model, |b, model| {
            b.iter(|| black_box(mapper.to_entity(model, &content_type, None).unwrap()));
        });

        let existing = mapper.to_entity(&model, &content_type, None).unwrap().entity;
        group.bench_with_input(BenchmarkId::new("update", &name), &model, |b, model| {
            b.iter(|| {
                black_box(
                    mapper
                        .to_entity(model, &content_type, Some(&existing))
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper/load");
    let rt = Runtime::new().unwrap();
    let (_, mapper) = services();
    let content_type = landing_page_type();

    for scale in Scale::all() {
        let entity = mapper
            .to_entity(&generate_page(scale.count()), &content_type, None)
            .unwrap()
            .entity;

        group.bench_with_input(
            BenchmarkId::new("dynamic", format!("{:?}", scale)),
            &entity,
            |b, entity| {
                b.to_async(&rt).iter(|| async {
                    black_box(mapper.to_dynamic(entity, &content_type).await.unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_create(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let (factory, _) = services();
    let content_type = landing_page_type();

    c.bench_function("mapper/create_dynamic", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(factory.create_dynamic(&content_type).await.unwrap()) });
    });
}

fn bench_archive(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper/archive");
    let (_, mapper) = services();
    let content_type = landing_page_type();

    let entity = mapper
        .to_entity(&generate_page(Scale::Medium.count()), &content_type, None)
        .unwrap()
        .entity;
    let stored = StoredContent::with_timestamp(&entity, 0);
    let archived = stored.to_bytes().unwrap();
    let json = serde_json::to_vec(&entity).unwrap();

    group.bench_function("rkyv_encode", |b| {
        b.iter(|| black_box(stored.to_bytes().unwrap()));
    });

    group.bench_function("rkyv_decode", |b| {
        b.iter(|| black_box(StoredContent::from_bytes(&archived).unwrap().into_entity()));
    });

    group.bench_function("json_encode", |b| {
        b.iter(|| black_box(serde_json::to_vec(&entity).unwrap()));
    });

    group.bench_function("json_decode", |b| {
        b.iter(|| black_box(serde_json::from_slice::<ContentEntity>(&json).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_save, bench_load, bench_create, bench_archive);
criterion_main!(benches);
