// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use aabb_tree::{Aabb, Tree2, TreeConfig};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn gen_grid_boxes(n: usize, cell: f64) -> Vec<Aabb<2>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb::new([x0, y0], [x0 + cell, y0 + cell]));
        }
    }
    out
}

fn to_rstar_rects(v: &[Aabb<2>]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|b| Rectangle::from_corners(b.lower, b.upper))
        .collect()
}

fn bench_rstar_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_compare");
    for &n in &[64usize, 128] {
        let boxes = gen_grid_boxes(n, 10.0);
        let probe = Aabb::new([100.0, 100.0], [500.0, 500.0]);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("aabb_tree_build_query_n{}", n), |b| {
            b.iter_batched(
                || {
                    Tree2::<u32>::new(TreeConfig::default().with_particle_capacity(n * n))
                        .expect("valid configuration")
                },
                |mut tree| {
                    for (i, bound) in boxes.iter().copied().enumerate() {
                        let _ = tree.insert_particle_aabb(i as u32, bound);
                    }
                    black_box(tree.query(&probe).len());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&boxes),
                |rectangles| {
                    let mut tree = RTree::new();
                    for r in rectangles {
                        tree.insert(r);
                    }
                    let envelope = AABB::from_corners(probe.lower, probe.upper);
                    black_box(tree.locate_in_envelope_intersecting(&envelope).count());
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&boxes),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let envelope = AABB::from_corners(probe.lower, probe.upper);
                    black_box(tree.locate_in_envelope_intersecting(&envelope).count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_compare);
criterion_main!(benches);
