//! # Aegis Fabric Benchmarks
//!
//! | Subsystem | Operation | Target |
//! |-----------|-----------|--------|
//! | af-02 Batch Validation | Phase A, 10k records | scales with cores |
//! | af-03 Shard Routing | route, 16 shards x 128 vnodes | < 1us |
//! | af-04 Ingestion Pipeline | validate + route + commit, 1k records | < 10ms |

use std::sync::Arc;
use std::time::Duration;

use af_01_dag_ledger::{LedgerConfig, SharedLedger};
use af_02_batch_validation::{run_structural_phase, BatchValidator, BatchValidatorConfig};
use af_03_shard_routing::{RouterConfig, ShardRouter, ShardRoutingApi};
use af_04_ingestion_pipeline::{CancellationFlag, IngestionApi, IngestionPipeline, PipelineConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_types::TransactionRecord;

fn random_batch(size: usize) -> Vec<TransactionRecord> {
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|i| {
            TransactionRecord::genesis(
                format!("sender-{}", rng.gen::<u32>()),
                format!("receiver-{i}"),
                rng.gen_range(0.01..1_000.0),
                1.0 + i as f64,
            )
            .unwrap()
        })
        .collect()
}

// ============================================================================
// AF-02: Structural validation
// ============================================================================

fn bench_structural_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("af-02-structural-phase");
    group.measurement_time(Duration::from_secs(5));

    for size in [100, 1_000, 10_000] {
        let batch = random_batch(size);
        group.throughput(Throughput::Elements(size as u64));

        for workers in [1, 0] {
            let label = if workers == 0 { "all-cores" } else { "single" };
            group.bench_with_input(BenchmarkId::new(label, size), &batch, |b, batch| {
                b.iter_batched(
                    || batch.clone(),
                    |mut records| black_box(run_structural_phase(&mut records, workers, 1)),
                    criterion::BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

// ============================================================================
// AF-03: Routing
// ============================================================================

fn bench_route(c: &mut Criterion) {
    let mut group = c.benchmark_group("af-03-routing");
    let router = ShardRouter::with_shards(RouterConfig::default(), 0..16).unwrap();
    let keys: Vec<String> = (0..1_024).map(|i| format!("account-{i}")).collect();

    group.throughput(Throughput::Elements(keys.len() as u64));
    group.bench_function("route_1024", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(router.route(key.as_bytes()).unwrap());
            }
        })
    });
    group.bench_function("route_load_aware_1024", |b| {
        b.iter(|| {
            for key in &keys {
                black_box(router.route_load_aware(key.as_bytes(), 5).unwrap());
            }
        })
    });
    group.bench_function("add_remove_shard", |b| {
        b.iter(|| {
            router.add_shard(99).unwrap();
            router.remove_shard(99).unwrap();
        })
    });
    group.finish();
}

// ============================================================================
// AF-04: Full pipeline
// ============================================================================

fn bench_pipeline_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("af-04-pipeline");
    group.measurement_time(Duration::from_secs(5));
    let size = 1_000;
    group.throughput(Throughput::Elements(size as u64));

    group.bench_function("submit_1000", |b| {
        b.iter_batched(
            || {
                let router = ShardRouter::with_shards(RouterConfig::default(), 0..8).unwrap();
                let pipeline = IngestionPipeline::new(
                    PipelineConfig::default(),
                    SharedLedger::new(LedgerConfig::default()),
                    BatchValidator::new(BatchValidatorConfig::default()),
                    Arc::new(router),
                );
                (pipeline, random_batch(size))
            },
            |(pipeline, batch)| {
                black_box(pipeline.submit(batch, &CancellationFlag::new()).unwrap())
            },
            criterion::BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_structural_phase,
    bench_route,
    bench_pipeline_submit
);
criterion_main!(benches);
