//! Collision and occlusion benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench collision
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench collision -- kd_tree

use collision_bench::*;
use collision_core::{KdTriTree, OcclusionBaker, OcclusionConfig, Ray};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::{Mat4, Vec3};

// ---------------------------------------------------------------------------
// Collision shapes
// ---------------------------------------------------------------------------

fn bench_shapes(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("shape/all_pairs");
        for &n in &[50, 100, 200] {
            let shapes = setup_moving_spheres(n);
            group.bench_with_input(BenchmarkId::new("collides", n), &n, |b, _| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for (i, a) in shapes.iter().enumerate() {
                        hits += shapes[i + 1..].iter().filter(|other| a.collides(other)).count();
                    }
                    hits
                });
            });
            group.bench_with_input(BenchmarkId::new("collides_over_time", n), &n, |b, _| {
                b.iter(|| {
                    let mut hits = 0usize;
                    for (i, a) in shapes.iter().enumerate() {
                        hits += shapes[i + 1..]
                            .iter()
                            .filter(|other| a.collides_over_time(other))
                            .count();
                    }
                    hits
                });
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("shape/compound");
        for &spheres in &[1, 8, 32] {
            let a = setup_compound(spheres, Vec3::ZERO);
            let b_far = setup_compound(spheres, Vec3::new(0.0, 10.0, 0.0));
            group.bench_with_input(BenchmarkId::new("separated", spheres), &spheres, |b, _| {
                b.iter(|| a.collides_over_time(&b_far));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("shape/update_matrices");
        let mut shape = setup_compound(16, Vec3::ZERO);
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let inv = m.inverse();
        group.bench_function("16_spheres_1_box", |b| {
            b.iter(|| shape.update_matrices(m, inv));
        });
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Kd-tree
// ---------------------------------------------------------------------------

fn bench_kd_tree(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("kd_tree/optimize");
        group.sample_size(20);
        for &grid in &[16u16, 32, 64] {
            group.bench_with_input(BenchmarkId::from_parameter(grid), &grid, |b, &grid| {
                b.iter_batched(
                    || setup_tree(grid, 4),
                    |mut tree| tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE),
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("kd_tree/is_occluded");
        for &grid in &[16u16, 32, 64] {
            let mut tree = setup_tree(grid, 4);
            tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE);
            let centre = f32::from(grid) * 0.5 + 0.25;

            let hit = Ray::new(Vec3::new(centre, centre, 20.0), Vec3::NEG_Z);
            group.bench_with_input(BenchmarkId::new("hit", grid), &grid, |b, _| {
                b.iter(|| tree.is_occluded(&hit));
            });

            let miss = Ray::new(Vec3::new(centre, centre, 20.0), Vec3::Z);
            group.bench_with_input(BenchmarkId::new("miss", grid), &grid, |b, _| {
                b.iter(|| tree.is_occluded(&miss));
            });

            let grazing = Ray::new(Vec3::new(-1.0, centre, 1.0), Vec3::X);
            group.bench_with_input(BenchmarkId::new("grazing", grid), &grid, |b, _| {
                b.iter(|| tree.is_occluded(&grazing));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Occlusion
// ---------------------------------------------------------------------------

fn bench_occlusion(c: &mut Criterion) {
    let mut group = c.benchmark_group("occlusion/bake");
    group.sample_size(10);
    for &grid in &[8u16, 16] {
        let mesh = grid_mesh(grid);
        let mut tree = setup_tree(grid, 2);
        tree.optimize(KdTriTree::DEFAULT_ITEMS_PER_NODE);
        let baker = OcclusionBaker::new(&tree, OcclusionConfig::default());

        group.bench_with_input(BenchmarkId::from_parameter(grid), &grid, |b, _| {
            b.iter(|| baker.bake(&Mat4::IDENTITY, &mesh));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_shapes, bench_kd_tree, bench_occlusion);
criterion_main!(benches);
