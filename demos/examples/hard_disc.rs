// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary hard-disc Monte Carlo in a periodic box.
//!
//! Two species of disc share a square box that wraps on both axes. Each species
//! has its own tree. A trial move displaces one disc; the trees supply the
//! candidates it might hit, and an exact minimum-image distance test decides.
//! Accepted moves are pushed into the tree, which only restructures once a disc
//! leaves its fattened bound.
//!
//! Run:
//! - `cargo run -p aabb_tree_demos --example hard_disc`
//! - `RUST_LOG=aabb_tree=debug cargo run -p aabb_tree_demos --example hard_disc`
//!   also reports node pool growth.

use std::error::Error;
use std::ops::ControlFlow;

use aabb_tree::{Aabb, Margin, PeriodicBox, Periodicity, Tree2, TreeConfig, TreeResult};
use kurbo::{Circle, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Monte Carlo sweeps; one sweep is one trial move per disc.
const SWEEPS: usize = 500;
/// Sweeps between log lines.
const SAMPLE_INTERVAL: usize = 50;
const N_SMALL: usize = 1000;
const N_LARGE: usize = 100;
const DIAMETER_SMALL: f64 = 1.0;
const DIAMETER_LARGE: f64 = 10.0;
/// Area fraction covered by discs.
const DENSITY: f64 = 0.1;
/// Largest trial displacement per axis, in units of the disc diameter.
const MAX_DISP: f64 = 0.1;
const SEED: u64 = 42;

struct Species {
    name: &'static str,
    radius: f64,
    positions: Vec<Point>,
    tree: Tree2<u32>,
}

impl Species {
    fn new(
        name: &'static str,
        diameter: f64,
        count: usize,
        domain: &PeriodicBox<2>,
    ) -> TreeResult<Self> {
        // A skin as wide as the largest displacement keeps most accepted moves
        // inside the fat bound.
        let tree = Tree2::new(
            TreeConfig::default()
                .with_margin(Margin::Absolute(MAX_DISP * diameter))
                .with_periodic_box(domain.periodicity(), domain.lengths())
                .with_particle_capacity(count),
        )?;
        Ok(Self {
            name,
            radius: 0.5 * diameter,
            positions: Vec::with_capacity(count),
            tree,
        })
    }

    fn disc(&self, centre: Point) -> Aabb<2> {
        Aabb::from_circle(Circle::new(centre, self.radius))
    }
}

struct Simulation {
    domain: PeriodicBox<2>,
    species: [Species; 2],
    rng: StdRng,
    attempts: u64,
    accepted: u64,
    refits: u64,
}

/// Exact test: are two disc centres closer than `cutoff` under the minimum image?
fn overlaps(domain: &PeriodicBox<2>, a: Point, b: Point, cutoff: f64) -> bool {
    let mut separation = [a.x - b.x, a.y - b.y];
    domain.minimum_image(&mut separation);
    separation[0] * separation[0] + separation[1] * separation[1] < cutoff * cutoff
}

impl Simulation {
    fn new(domain: PeriodicBox<2>) -> TreeResult<Self> {
        Ok(Self {
            species: [
                Species::new("large", DIAMETER_LARGE, N_LARGE, &domain)?,
                Species::new("small", DIAMETER_SMALL, N_SMALL, &domain)?,
            ],
            domain,
            rng: StdRng::seed_from_u64(SEED),
            attempts: 0,
            accepted: 0,
            refits: 0,
        })
    }

    /// Whether a disc of `radius` at `centre` hits any disc other than `skip`.
    fn collides(&self, centre: Point, radius: f64, skip: Option<(usize, u32)>) -> bool {
        let probe = Aabb::from_circle(Circle::new(centre, radius));
        self.species.iter().enumerate().any(|(s, species)| {
            let cutoff = radius + species.radius;
            species
                .tree
                .for_each_overlap(&probe, |j| {
                    let hit = skip != Some((s, j))
                        && overlaps(&self.domain, centre, species.positions[j as usize], cutoff);
                    if hit {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                })
                .is_break()
        })
    }

    fn random_point(&mut self) -> Point {
        let [lx, ly] = self.domain.lengths();
        Point::new(self.rng.r#gen::<f64>() * lx, self.rng.r#gen::<f64>() * ly)
    }

    /// Random sequential insertion, large discs first.
    fn populate(&mut self, counts: [usize; 2]) -> TreeResult<()> {
        for (s, &count) in counts.iter().enumerate() {
            info!(species = self.species[s].name, count, "inserting discs");
            let radius = self.species[s].radius;
            for i in 0..count {
                let mut tries = 0_u32;
                let centre = loop {
                    tries += 1;
                    let candidate = self.random_point();
                    if !self.collides(candidate, radius, None) {
                        break candidate;
                    }
                };
                debug!(species = self.species[s].name, i, tries, "placed disc");
                let species = &mut self.species[s];
                let id = u32::try_from(i).unwrap_or(u32::MAX);
                let bound = species.disc(centre);
                species.tree.insert_particle_aabb(id, bound)?;
                species.positions.push(centre);
            }
        }
        Ok(())
    }

    /// One trial move of a uniformly chosen disc.
    fn trial_move(&mut self) -> TreeResult<()> {
        let total = self.species[0].positions.len() + self.species[1].positions.len();
        let pick = self.rng.gen_range(0..total);
        let (s, i) = if pick < self.species[0].positions.len() {
            (0, pick)
        } else {
            (1, pick - self.species[0].positions.len())
        };
        let radius = self.species[s].radius;
        let step = MAX_DISP * 2.0 * radius;
        let old = self.species[s].positions[i];

        let mut position = [
            old.x + step * (2.0 * self.rng.r#gen::<f64>() - 1.0),
            old.y + step * (2.0 * self.rng.r#gen::<f64>() - 1.0),
        ];
        let _ = self.domain.wrap_position(&mut position);
        let candidate = Point::new(position[0], position[1]);

        self.attempts += 1;
        let id = u32::try_from(i).unwrap_or(u32::MAX);
        if self.collides(candidate, radius, Some((s, id))) {
            return Ok(());
        }

        self.accepted += 1;
        let species = &mut self.species[s];
        species.positions[i] = candidate;
        let bound = species.disc(candidate);
        if species.tree.update_particle_aabb(id, bound)? {
            self.refits += 1;
        }
        Ok(())
    }

    /// Count overlapping pairs by brute force. Should always be zero.
    fn brute_force_overlaps(&self) -> usize {
        let discs: Vec<(Point, f64)> = self
            .species
            .iter()
            .flat_map(|s| s.positions.iter().map(move |&p| (p, s.radius)))
            .collect();
        let mut count = 0;
        for (k, &(a, ra)) in discs.iter().enumerate() {
            for &(b, rb) in &discs[k + 1..] {
                if overlaps(&self.domain, a, b, ra + rb) {
                    count += 1;
                }
            }
        }
        count
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let covered = std::f64::consts::PI
        * (N_SMALL as f64 * DIAMETER_SMALL * DIAMETER_SMALL
            + N_LARGE as f64 * DIAMETER_LARGE * DIAMETER_LARGE)
        / 4.0;
    let length = (covered / DENSITY).sqrt();
    let domain = PeriodicBox::new(Periodicity::all_axes(2), [length, length])?;
    info!(length, "periodic box");

    let mut sim = Simulation::new(domain)?;
    sim.populate([N_LARGE, N_SMALL])?;
    for species in &sim.species {
        species.tree.validate()?;
        info!(
            species = species.name,
            height = species.tree.height(),
            nodes = species.tree.node_count(),
            sah_ratio = species.tree.surface_area_ratio(),
            "tree built"
        );
    }

    let moves_per_sweep = N_SMALL + N_LARGE;
    for sweep in 1..=SWEEPS {
        for _ in 0..moves_per_sweep {
            sim.trial_move()?;
        }
        if sweep % SAMPLE_INTERVAL == 0 {
            info!(
                sweep,
                acceptance = sim.accepted as f64 / sim.attempts as f64,
                refit_rate = sim.refits as f64 / sim.accepted.max(1) as f64,
                height_large = sim.species[0].tree.height(),
                height_small = sim.species[1].tree.height(),
                "sample"
            );
        }
    }

    for species in &sim.species {
        species.tree.validate()?;
    }
    let overlapping = sim.brute_force_overlaps();
    info!(overlapping, "done");
    assert_eq!(overlapping, 0, "hard discs must never overlap");
    Ok(())
}
