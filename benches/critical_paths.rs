//! Criterion benchmarks for Edgekit critical paths
//!
//! Benchmarks the per-pass SMAA cost and the distance transform on
//! synthetic images with realistic edge density.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use edgekit::{
    blending_weights, distance_transform, edge_detection, neighborhood_blending,
    AntiAliasingConfig, DistanceTransformConfig, EdgeDetectMode, PixelBuffer,
};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Staircase image: white below the anti-diagonal, repeated every 8 px.
fn make_staircase(size: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let v = if (x + y) % 16 >= 8 { 1.0 } else { 0.0 };
            buf.set(x, y, [v, v, v, 1.0]);
        }
    }
    buf
}

/// Mask with a centered circular hole.
fn make_circle_mask(size: u32) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(size, size, [1.0, 1.0, 1.0, 1.0]);
    let c = size as f32 / 2.0;
    let r = size as f32 / 6.0;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - c;
            let dy = y as f32 - c;
            if (dx * dx + dy * dy).sqrt() < r {
                buf.set(x, y, [0.0, 0.0, 0.0, 1.0]);
            }
        }
    }
    buf
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_smaa_passes(c: &mut Criterion) {
    let mut group = c.benchmark_group("smaa");
    let cfg = AntiAliasingConfig { detect: EdgeDetectMode::Luma, ..Default::default() };

    for size in [128u32, 256] {
        let image = make_staircase(size);
        let edges = edge_detection::<_, PixelBuffer>(&cfg, &image, None);
        let weights = blending_weights(&cfg, &edges);

        group.throughput(Throughput::Elements(size as u64 * size as u64));
        group.bench_with_input(BenchmarkId::new("edge_detection", size), &image, |b, image| {
            b.iter(|| edge_detection::<_, PixelBuffer>(black_box(&cfg), black_box(image), None))
        });
        group.bench_with_input(BenchmarkId::new("blending_weights", size), &edges, |b, edges| {
            b.iter(|| blending_weights(black_box(&cfg), black_box(edges)))
        });
        group.bench_with_input(
            BenchmarkId::new("neighborhood_blending", size),
            &(&image, &weights),
            |b, (image, weights)| {
                b.iter(|| neighborhood_blending(black_box(*image), black_box(*weights)))
            },
        );
    }
    group.finish();
}

fn bench_distance_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");
    let cfg = DistanceTransformConfig::default();

    for size in [128u32, 256] {
        let mask = make_circle_mask(size);
        group.throughput(Throughput::Elements(size as u64 * size as u64));
        group.bench_with_input(BenchmarkId::new("transform", size), &mask, |b, mask| {
            b.iter(|| distance_transform(black_box(&cfg), black_box(mask)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_smaa_passes, bench_distance_transform);
criterion_main!(benches);
