// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radius locator basics.
//!
//! Index a handful of snap anchors, find the anchors near the cursor, and
//! remove one.
//!
//! Run:
//! - `cargo run -p understory_demos --example radius_basics`

use kurbo::{Point, Rect};
use understory_locator::{RadiusLocator, SplitPolicy};

fn main() {
    let anchors = [
        ("origin", Point::new(0.0, 0.0)),
        ("corner", Point::new(100.0, 100.0)),
        ("left", Point::new(48.0, 50.0)),
        ("right", Point::new(53.0, 50.0)),
        ("below", Point::new(50.0, 58.0)),
        ("far", Point::new(90.0, 10.0)),
    ];
    let policy = SplitPolicy {
        threshold: 2,
        min_size: 5.0,
    };
    let mut snaps = RadiusLocator::with_policy(
        Rect::new(0.0, 0.0, 100.0, 100.0),
        policy,
        |i: &usize| anchors[*i].1,
    );
    for i in 0..anchors.len() {
        snaps.add(i);
    }
    println!("{snaps:?}");

    let cursor = Point::new(50.0, 50.0);
    let mut near: Vec<&str> = snaps
        .query_radius(cursor, 5.0)
        .into_iter()
        .map(|i| anchors[i].0)
        .collect();
    near.sort_unstable();
    println!("within 5 of {cursor:?}: {near:?}");
    assert_eq!(near, ["left", "right"]);

    // Adding again is a no-op.
    assert!(!snaps.add(2));

    assert!(snaps.remove(&2));
    let near: Vec<&str> = snaps
        .query_radius(cursor, 8.0)
        .into_iter()
        .map(|i| anchors[i].0)
        .collect();
    println!("within 8 after removing left: {near:?}");
    assert_eq!(near.len(), 2);
    assert_eq!(snaps.len(), 5);
}
