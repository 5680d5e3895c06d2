// Copyright 2025 the AABB Tree Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree basics.
//!
//! Insert a few discs into a periodic box, query across the boundary, move a
//! disc a little and then a lot, and remove one.
//!
//! Run:
//! - `cargo run -p aabb_tree_demos --example tree_basics`

use aabb_tree::{Aabb, Margin, Periodicity, Tree2, TreeConfig, TreeError};
use kurbo::{Circle, Point, Rect};

fn main() -> Result<(), TreeError> {
    // A 10 x 10 box, periodic on both axes, with a skin of 0.2 around each disc.
    let mut tree: Tree2<&str> = Tree2::new(
        TreeConfig::default()
            .with_margin(Margin::Absolute(0.2))
            .with_periodic_box(Periodicity::X | Periodicity::Y, [10.0, 10.0]),
    )?;

    tree.insert_particle_aabb("a", Aabb::from_circle(Circle::new((9.9, 5.0), 0.5)))?;
    tree.insert_particle_aabb("b", Aabb::from_circle(Circle::new((0.1, 5.0), 0.5)))?;
    tree.insert_particle_aabb("c", Aabb::from_circle(Circle::new((5.0, 5.0), 0.5)))?;
    println!("{tree:?}");

    // "a" and "b" sit on opposite faces but are 0.2 apart through the wrap.
    let near_a = tree.query_particle("a")?;
    println!("neighbours of a: {near_a:?}");
    assert_eq!(near_a, vec!["b"]);

    // Queries take any box; Kurbo rects convert directly.
    let probe: Aabb<2> = Rect::from_center_size(Point::new(5.0, 5.0), (2.0, 2.0)).into();
    println!("hits around the centre: {:?}", tree.query(&probe));

    // A nudge stays inside the fat bound, so the hierarchy is left alone.
    let moved = tree.update_particle("c", [5.1, 5.0], 0.5)?;
    println!("nudge restructured the tree: {moved}");
    assert!(!moved);

    // A jump does not.
    let moved = tree.update_particle("c", [2.0, 8.0], 0.5)?;
    println!("jump restructured the tree: {moved}");
    assert!(moved);
    if let Some(fat) = tree.fat_aabb("c") {
        println!("fat bound of c: {:?}", Rect::from(fat));
    }

    // Identifiers are unique.
    let err = tree.insert_particle("c", [1.0, 1.0], 0.5).unwrap_err();
    println!("error: {err}");

    tree.remove_particle("b")?;
    assert!(tree.query_particle("a")?.is_empty());
    tree.validate()?;
    println!(
        "height {}, {} nodes, {} free slots",
        tree.height(),
        tree.node_count(),
        tree.free_len()
    );
    Ok(())
}
