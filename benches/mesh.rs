//! Benchmarks for frame parsing and mesh building.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use fluid_replay::{
    animation::{parse_snapshot, to_snapshot_text},
    compute::{WallMask, build_frame},
    schema::{BuilderConfig, Grid, WallBox},
};

/// Sloshing surface with a wall across the middle.
fn test_frame(size: usize) -> (Grid, WallMask) {
    let n = size * size;
    let heights: Vec<f32> = (0..n)
        .map(|i| {
            let x = (i % size) as f32 / size as f32;
            let y = (i / size) as f32 / size as f32;
            0.5 + 0.25 * (x * 6.0).sin() * (y * 4.0).cos()
        })
        .collect();
    let qx = vec![0.1; n];
    let qy = vec![-0.1; n];
    let grid = Grid::from_fields(size, size, &heights, &qx, &qy);

    let builder = BuilderConfig {
        wall: vec![WallBox {
            top_left: [size / 2, 0],
            bottom_right: [size / 2, size * 3 / 4],
            height: 1.0,
        }],
    };
    let static_grid = builder.build_static_grid(size, size).unwrap();

    (grid, WallMask::from_static_grid(&static_grid))
}

fn bench_build_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_frame");

    for size in [32, 64, 128, 256] {
        let (grid, walls) = test_frame(size);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| build_frame(black_box(&grid), black_box(&walls)));
            },
        );
    }

    group.finish();
}

fn bench_parse_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_snapshot");

    for size in [32, 128] {
        let (grid, _) = test_frame(size);
        let text = to_snapshot_text(&grid);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| parse_snapshot(black_box(&text)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_build_frame, bench_parse_snapshot);
criterion_main!(benches);
