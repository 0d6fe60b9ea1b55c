// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containment locator basics.
//!
//! Batch a set of widget boxes, hit-test a point, then grow and shrink the
//! set between queries.
//!
//! Run:
//! - `cargo run -p understory_demos --example containment_basics`

use kurbo::{Point, Rect};
use understory_locator::ContainmentLocator;

fn main() {
    let widgets = [
        Rect::new(0.0, 0.0, 400.0, 300.0),
        Rect::new(10.0, 10.0, 110.0, 40.0),
        Rect::new(120.0, 10.0, 220.0, 40.0),
        Rect::new(10.0, 50.0, 390.0, 290.0),
        Rect::new(600.0, 600.0, 700.0, 650.0),
    ];
    let mut hits = ContainmentLocator::with_threshold(2, |i: &usize| widgets[*i]);
    for i in 0..4 {
        hits.add(i);
    }
    println!("pending before first query: {}", hits.has_pending());

    let mut under = hits.query_point(Point::new(50.0, 20.0));
    under.sort_unstable();
    println!("under (50, 20): {under:?}");
    assert_eq!(under, [0, 1]);
    println!("hull: {:?}", hits.hull());

    // Edges are inclusive.
    let mut under = hits.query_point(Point::new(110.0, 40.0));
    under.sort_unstable();
    assert_eq!(under, [0, 1]);

    // Far-away additions grow the hull; the next query rebuilds.
    hits.add(4);
    assert_eq!(hits.query_point(Point::new(650.0, 625.0)), [4]);
    println!("hull after growth: {:?}", hits.hull());
    assert_eq!(hits.hull(), Some(Rect::new(0.0, 0.0, 700.0, 650.0)));

    // Adding and removing before a flush cancels out.
    hits.remove(&4);
    hits.add(4);
    hits.remove(&1);
    hits.flush();
    let mut under = hits.query_point(Point::new(50.0, 20.0));
    under.sort_unstable();
    println!("under (50, 20) after removal: {under:?}");
    assert_eq!(under, [0]);
    assert_eq!(hits.len(), 4);
    println!("{hits:?}");
}
