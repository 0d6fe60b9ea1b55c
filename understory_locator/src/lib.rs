// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_locator --heading-base-level=0

//! Understory Locator: Kurbo-native adaptive spatial locators.
//!
//! Understory Locator provides two small spatial indices for interactive editors, where
//! collision, snapping, and hit-testing logic asks "what is near here?" and "what is under
//! this point?" many times per frame.
//!
//! - [`RadiusLocator`]: indexes elements by a [`Point`](kurbo::Point) inside a fixed universe
//!   and answers "every element within distance `r` of `(x, y)`". Sectors split into
//!   quadrants as they fill and merge back as they empty.
//! - [`ContainmentLocator`]: indexes elements by a [`Rect`](kurbo::Rect) and answers "every
//!   element whose box contains `(x, y)`". Additions and removals are batched and applied by
//!   an explicit [`ContainmentLocator::flush`] (query methods flush first).
//!
//! Both locators read geometry through an injected strategy ([`PointSource`],
//! [`BoundsSource`]); closures work out of the box. Positions and boxes are sampled when an
//! element is realized, so moving an element means removing and re-adding it.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect};
//! use understory_locator::{ContainmentLocator, RadiusLocator, SplitPolicy};
//!
//! // Proximity over points.
//! let pts = [Point::new(10.0, 10.0), Point::new(90.0, 90.0), Point::new(50.0, 50.0), Point::new(51.0, 51.0)];
//! let mut near = RadiusLocator::with_policy(
//!     Rect::new(0.0, 0.0, 100.0, 100.0),
//!     SplitPolicy { threshold: 4, min_size: 10.0 },
//!     |i: &usize| pts[*i],
//! );
//! for i in 0..pts.len() {
//!     near.add(i);
//! }
//! let mut hits = near.query_radius(Point::new(50.0, 50.0), 2.0);
//! hits.sort();
//! assert_eq!(hits, [2, 3]);
//!
//! // Point containment over boxes.
//! let boxes = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(5.0, 5.0, 15.0, 15.0)];
//! let mut under = ContainmentLocator::new(|i: &usize| boxes[*i]);
//! under.add(0);
//! under.add(1);
//! assert_eq!(under.query_point(Point::new(2.0, 2.0)), [0]);
//! ```
//!
//! ## Tuning
//!
//! - [`SplitPolicy::threshold`] and [`SplitPolicy::min_size`] bound bucket sizes and depth
//!   of the radius locator; both are fixed at construction.
//! - [`ContainmentLocator::with_threshold`] sets the containment bucket size. Batching many
//!   changes before a query costs at most one hull recomputation and one rebuild.
//!
//! ### Float semantics
//!
//! Coordinates are assumed finite (no NaNs). Range and containment tests include
//! boundaries.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod containment;
pub mod radius;
pub mod types;

pub use containment::ContainmentLocator;
pub use radius::RadiusLocator;
pub use types::{BoundsSource, PointSource, Sides, SplitPolicy};
