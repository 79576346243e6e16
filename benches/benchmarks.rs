//! Benchmarks for Cartograph operations.

use cartograph::kernel::{svd, Matrix, PcaEngine, SvdOptions};
use cartograph::store::{EmbeddingRecord, VectorStore};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_rows(rows: usize, cols: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..rows)
        .map(|_| (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

fn benchmark_svd(c: &mut Criterion) {
    let a = Matrix::from_rows(&random_rows(64, 32, 42)).unwrap();
    let opts = SvdOptions::default().with_qr_iters(30);

    c.bench_function("svd_64x32", |b| b.iter(|| svd(black_box(&a), &opts)));

    let values_only = opts.clone().with_u(false).with_v(false);
    c.bench_function("svd_64x32_values_only", |b| {
        b.iter(|| svd(black_box(&a), &values_only))
    });
}

fn benchmark_pca(c: &mut Criterion) {
    let data = Matrix::from_rows(&random_rows(200, 64, 7)).unwrap();
    let engine = PcaEngine::new(SvdOptions::default().with_qr_iters(30));

    c.bench_function("pca_fit_200x64", |b| b.iter(|| engine.fit(black_box(&data))));
}

fn benchmark_search(c: &mut Criterion) {
    let mut store = VectorStore::new("bench.json");
    for (i, row) in random_rows(1000, 384, 99).into_iter().enumerate() {
        store.add(EmbeddingRecord::from_full(format!("doc-{}", i), row));
    }
    let query = random_rows(1, 384, 100).remove(0);

    c.bench_function("search_1000x384_top10", |b| {
        b.iter(|| store.search(black_box(&query), Some(10)))
    });
}

fn benchmark_serialize(c: &mut Criterion) {
    let mut store = VectorStore::new("bench.json");
    for (i, row) in random_rows(200, 384, 5).into_iter().enumerate() {
        store.add(EmbeddingRecord::from_full(format!("doc-{}", i), row));
    }

    c.bench_function("serialize_200x384", |b| b.iter(|| store.serialize()));
}

criterion_group!(
    benches,
    benchmark_svd,
    benchmark_pca,
    benchmark_search,
    benchmark_serialize
);
criterion_main!(benches);
