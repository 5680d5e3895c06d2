// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use aabb_tree::{Aabb, Margin, Periodicity, Tree2, TreeConfig};
use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

const RADIUS: f64 = 0.5;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Side length of a periodic box holding `count` discs of `RADIUS` at roughly 40% area fraction.
fn box_length(count: usize) -> f64 {
    let disc_area = core::f64::consts::PI * RADIUS * RADIUS;
    (count as f64 * disc_area / 0.4).sqrt()
}

fn gen_random_centres(count: usize, length: f64, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| [rng.next_f64() * length, rng.next_f64() * length])
        .collect()
}

fn periodic_tree(length: f64, count: usize) -> Tree2<u32> {
    Tree2::new(
        TreeConfig::default()
            .with_margin(Margin::Absolute(0.2))
            .with_periodic_box(Periodicity::all_axes(2), [length, length])
            .with_particle_capacity(count),
    )
    .expect("valid configuration")
}

fn filled_tree(centres: &[[f64; 2]], length: f64) -> Tree2<u32> {
    let mut tree = periodic_tree(length, centres.len());
    for (i, c) in centres.iter().enumerate() {
        tree.insert_particle(i as u32, *c, RADIUS)
            .expect("fresh identifier");
    }
    tree
}

fn wrap(x: f64, length: f64) -> f64 {
    if x < 0.0 {
        x + length
    } else if x >= length {
        x - length
    } else {
        x
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[1_000usize, 10_000, 50_000] {
        let length = box_length(n);
        let centres = gen_random_centres(n, length, 0xCAFE_F00D_DEAD_BEEF);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("random_discs_n{}", n), |b| {
            b.iter_batched(
                || periodic_tree(length, n),
                |mut tree| {
                    for (i, c) in centres.iter().enumerate() {
                        let _ = tree.insert_particle(i as u32, *c, RADIUS);
                    }
                    black_box(tree.height());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    for &(name, step) in &[("small_moves", 0.05), ("large_moves", 0.5)] {
        let n = 10_000usize;
        let length = box_length(n);
        let centres = gen_random_centres(n, length, 0xBADC_F00D_1234_5678);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("{}_n{}", name, n), |b| {
            b.iter_batched(
                || (filled_tree(&centres, length), centres.clone(), Rng::new(7)),
                |(mut tree, mut positions, mut rng)| {
                    let mut refits = 0usize;
                    for (i, p) in positions.iter_mut().enumerate() {
                        p[0] = wrap(p[0] + (rng.next_f64() - 0.5) * 2.0 * step, length);
                        p[1] = wrap(p[1] + (rng.next_f64() - 0.5) * 2.0 * step, length);
                        if tree.update_particle(i as u32, *p, RADIUS).unwrap_or(false) {
                            refits += 1;
                        }
                    }
                    black_box(refits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    for &n in &[1_000usize, 10_000] {
        let length = box_length(n);
        let centres = gen_random_centres(n, length, 0xC1A5_7E55_9999_ABCD);
        let tree = filled_tree(&centres, length);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("query_particle_all_n{}", n), |b| {
            b.iter(|| {
                let mut pairs = 0usize;
                for i in 0..n as u32 {
                    pairs += tree.query_particle(i).map_or(0, |hits| hits.len());
                }
                black_box(pairs)
            })
        });
        group.bench_function(format!("query_into_reused_n{}", n), |b| {
            let mut out = Vec::new();
            b.iter(|| {
                let mut pairs = 0usize;
                for c in &centres {
                    out.clear();
                    tree.query_into(&Aabb::from_centre_radius(*c, RADIUS), &mut out);
                    pairs += out.len();
                }
                black_box(pairs)
            })
        });
    }
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let n = 10_000usize;
    let length = box_length(n);
    let centres = gen_random_centres(n, length, 0xFACE_FEED_CAFE_BABE);
    group.throughput(Throughput::Elements(n as u64));
    group.bench_function(format!("remove_reinsert_half_n{}", n), |b| {
        b.iter_batched(
            || filled_tree(&centres, length),
            |mut tree| {
                for i in (0..n as u32).step_by(2) {
                    let _ = tree.remove_particle(i);
                }
                for i in (0..n).step_by(2) {
                    let _ = tree.insert_particle(i as u32, centres[i], RADIUS);
                }
                black_box(tree.surface_area_ratio());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_update, bench_query, bench_churn);
criterion_main!(benches);
