//! KNN query benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geoknn::{Geometry, KnnQuery, KnnTableAdapter, MemoryEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;
use std::sync::Arc;

fn populated_adapter(rows: i64) -> KnnTableAdapter {
    let engine = Arc::new(MemoryEngine::new());
    engine.register_spatial_column(None, "points", "geom");
    let mut rng = StdRng::seed_from_u64(42);
    for id in 0..rows {
        let x: f64 = rng.gen_range(0.0..1000.0);
        let y: f64 = rng.gen_range(0.0..1000.0);
        engine
            .insert(None, "points", "geom", id, Geometry::point(x, y))
            .unwrap();
    }
    KnnTableAdapter::new(engine)
}

fn bench_knn_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("KNN Query");

    let adapter = populated_adapter(10_000);
    let reference = Geometry::point(500.0, 500.0).to_blob().unwrap();

    for k in [3i64, 16, 128].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, &k| {
            b.iter(|| {
                let query =
                    KnnQuery::new("points", None, reference.clone(), Some(k)).unwrap();
                black_box(adapter.execute(query).count())
            });
        });
    }

    group.finish();
}

fn bench_knn_query_sparse(c: &mut Criterion) {
    let mut group = c.benchmark_group("KNN Query Sparse");

    let adapter = populated_adapter(500);
    // A reference far outside the populated area forces several
    // radius-expansion iterations.
    let reference = Geometry::point(-5000.0, -5000.0).to_blob().unwrap();

    group.bench_function("far_reference_500", |b| {
        b.iter(|| {
            let query = KnnQuery::new("points", None, reference.clone(), Some(8)).unwrap();
            black_box(adapter.execute(query).count())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_knn_query, bench_knn_query_sparse);
criterion_main!(benches);
