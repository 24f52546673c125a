use criterion::{black_box, criterion_group, criterion_main, Criterion};
use observer_core::connections::build_connections;
use observer_core::spatial_hash::SpatialHash;
use observer_data::Particle;

fn lattice(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| ((i % 100) as f64 * 8.0, (i / 100) as f64 * 6.0))
        .collect()
}

fn bench_spatial_hash_build(c: &mut Criterion) {
    let positions = lattice(1000);

    c.bench_function("spatial_hash_build_1000", |b| {
        b.iter(|| {
            let mut spatial = SpatialHash::new(50.0);
            spatial.build(black_box(&positions));
            black_box(spatial)
        })
    });
}

fn bench_spatial_hash_query(c: &mut Criterion) {
    let positions = lattice(1000);
    let mut spatial = SpatialHash::new(50.0);
    spatial.build(&positions);

    c.bench_function("spatial_hash_query_3x3", |b| {
        let mut results = Vec::new();
        b.iter(|| {
            results.clear();
            spatial.query_into(400.0, 30.0, &mut results);
            black_box(results.len())
        })
    });
}

fn bench_spatial_hash_count_nearby(c: &mut Criterion) {
    let positions = lattice(1000);
    let mut spatial = SpatialHash::new(50.0);
    spatial.build(&positions);

    c.bench_function("spatial_hash_count_nearby", |b| {
        b.iter(|| black_box(spatial.count_nearby(400.0, 30.0)))
    });
}

fn bench_connection_builder(c: &mut Criterion) {
    let particles: Vec<Particle> = lattice(1000)
        .into_iter()
        .enumerate()
        .map(|(i, (x, y))| Particle::new(i as u32, x, y))
        .collect();
    let mut grid = SpatialHash::default();

    c.bench_function("build_connections_1000", |b| {
        b.iter(|| {
            let edges = build_connections(black_box(&particles), 100.0, 2000, &mut grid);
            black_box(edges.len())
        })
    });
}

criterion_group!(
    benches,
    bench_spatial_hash_build,
    bench_spatial_hash_query,
    bench_spatial_hash_count_nearby,
    bench_connection_builder
);
criterion_main!(benches);
