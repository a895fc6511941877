//! Benchmark for weighted reward selection.
//!
//! Run with: cargo bench --package playcrates_core --bench selector_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use playcrates_core::{choose_weighted, run_statistics, ItemStack, RewardDefinition};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn create_test_pool(size: usize) -> Vec<RewardDefinition<ItemStack>> {
    (0..size)
        .map(|i| {
            RewardDefinition::new(ItemStack::new(format!("minecraft:item_{i}"), 1))
                .with_weight(((i % 7) + 1) as f64)
                .unwrap()
        })
        .collect()
}

fn benchmark_single_selection(c: &mut Criterion) {
    let pool = create_test_pool(8);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("single_selection_8", |b| {
        b.iter(|| black_box(choose_weighted(black_box(&pool), &mut rng)));
    });
}

fn benchmark_large_pool(c: &mut Criterion) {
    let pool = create_test_pool(512);
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let mut group = c.benchmark_group("large_pool");
    group.throughput(Throughput::Elements(1));

    group.bench_function("single_selection_512", |b| {
        b.iter(|| black_box(choose_weighted(black_box(&pool), &mut rng)));
    });

    group.finish();
}

fn benchmark_statistics(c: &mut Criterion) {
    let pool = create_test_pool(8);
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    c.bench_function("statistics_100k", |b| {
        b.iter(|| black_box(run_statistics(black_box(&pool), black_box(100_000), &mut rng)));
    });
}

criterion_group!(
    benches,
    benchmark_single_selection,
    benchmark_large_pool,
    benchmark_statistics
);
criterion_main!(benches);
