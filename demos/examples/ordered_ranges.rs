// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered index ranges.
//!
//! Keep a timeline of keyframes ordered by time, look up the neighbors of a
//! playhead, and scan open and closed windows.
//!
//! Run:
//! - `cargo run -p understory_demos --example ordered_ranges`

use std::cmp::Ordering;

use understory_ordered_index::OrderedIndex;

#[derive(Clone, Debug)]
struct Keyframe {
    time: f64,
    value: f32,
}

fn at(time: f64) -> Keyframe {
    Keyframe { time, value: 0.0 }
}

fn main() {
    let by_time = |a: &Keyframe, b: &Keyframe| a.time.total_cmp(&b.time);
    let mut frames = OrderedIndex::new(by_time);
    for (time, value) in [(0.0, 0.0), (0.5, 0.2), (1.0, 1.0), (2.0, 0.4), (3.5, 0.9)] {
        let _ = frames.insert(Keyframe { time, value });
    }

    // Interpolate at the playhead from the surrounding keyframes.
    let playhead = at(1.4);
    let before = frames.find_before(&playhead).unwrap();
    let after = frames.find_after(&playhead).unwrap();
    let t = ((playhead.time - before.time) / (after.time - before.time)) as f32;
    let value = before.value + (after.value - before.value) * t;
    println!(
        "playhead {:.1}: between {:.1} and {:.1}, value {value:.2}",
        playhead.time, before.time, after.time
    );
    assert!((value - 0.76).abs() < 1e-5);

    // Keyframes strictly inside the selection.
    let inner: Vec<f64> = frames
        .inside(Some(&at(0.5)), Some(&at(2.0)))
        .map(|k| k.time)
        .collect();
    println!("inside (0.5, 2.0): {inner:?}");
    assert_eq!(inner, [1.0]);

    // Closed window, widened to the keyframes enclosing its ends.
    let span: Vec<f64> = frames
        .including(Some(&at(0.7)), Some(&at(2.5)))
        .map(|k| k.time)
        .collect();
    println!("including [0.7, 2.5]: {span:?}");
    assert_eq!(span, [0.5, 1.0, 2.0, 3.5]);

    // Reinserting an equal key replaces the stored keyframe.
    let old = frames.insert(Keyframe {
        time: 2.0,
        value: 0.6,
    });
    println!("replaced: {old:?}");
    assert!(matches!(old, Some(k) if k.value == 0.4));

    // Snapshots are independent of later edits.
    let snapshot = frames.duplicate();
    let _ = frames.remove(&at(0.0));
    println!("live {} keyframes, snapshot {}", frames.len(), snapshot.len());
    assert_eq!(
        frames.comparator()(&at(1.0), &at(2.0)),
        Ordering::Less,
        "comparator orders by time"
    );
}
