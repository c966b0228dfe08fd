use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use tui_cluster::prelude::*;

#[derive(Clone)]
struct Pin([f64; 2]);

impl GeoPoint for Pin {
    fn position(&self) -> Option<[f64; 2]> {
        Some(self.0)
    }
}

/// Deterministic [0, 1) sequence (splitmix64)
fn unit(seed: u64) -> f64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    (x >> 11) as f64 / 9007199254740992.0
}

fn positions(count: usize) -> Vec<[f64; 2]> {
    (0..count as u64)
        .map(|i| [unit(2 * i) * 360.0 - 180.0, unit(2 * i + 1) * 170.0 - 85.0])
        .collect()
}

fn features(count: usize) -> Vec<Feature<u32>> {
    positions(count)
        .into_iter()
        .enumerate()
        .map(|(i, p)| Feature::point(p, i as u32))
        .collect()
}

fn index_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("index/load");
    for &n in &[1_000usize, 10_000, 100_000] {
        let points = features(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter_batched(
                || points.clone(),
                |points| {
                    let mut index: GridCluster<u32> = GridCluster::new(ClusterOptions::default());
                    index.load(points);
                    black_box(index);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();

    let mut group = c.benchmark_group("index/get_clusters");
    let mut index: GridCluster<u32> = GridCluster::new(ClusterOptions::default());
    index.load(features(100_000));
    for &z in &[0i32, 4, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(z), &z, |b, &z| {
            b.iter(|| black_box(index.get_clusters(WORLD_BOUNDS, z)));
        });
    }
    group.finish();
}

fn layer_benches(c: &mut Criterion) {
    let data: Arc<Vec<Pin>> = Arc::new(positions(10_000).into_iter().map(Pin).collect());
    let props = LayerProps {
        data,
        ..LayerProps::default()
    };

    let mut group = c.benchmark_group("layer/update");
    group.bench_function("rebuild", |b| {
        b.iter(|| {
            let mut layer: SuperClusterLayer<Pin> = SuperClusterLayer::new(props.clone());
            black_box(layer.update_state(props.clone(), 3.0).ok());
        });
    });

    let mut layer: SuperClusterLayer<Pin> = SuperClusterLayer::new(props.clone());
    layer.update_state(props.clone(), 0.0).ok();
    let mut zoom = 0.0;
    group.bench_function("zoom_step", |b| {
        b.iter(|| {
            zoom = (zoom + 1.0) % 11.0;
            black_box(layer.update_zoom(zoom).ok());
        });
    });
    group.bench_function("render_layers", |b| {
        b.iter(|| {
            let layers = layer.render_layers();
            black_box((layers.icon.instances(), layers.node.instances()));
        });
    });
    group.finish();
}

criterion_group!(benches, index_benches, layer_benches);
criterion_main!(benches);
