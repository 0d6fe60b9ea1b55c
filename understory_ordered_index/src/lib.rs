// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_ordered_index --heading-base-level=0

//! Understory Ordered Index: a balanced, comparator-driven ordered index.
//!
//! Understory Ordered Index keeps a totally ordered set of values in an AVL tree.
//!
//! - Insert, remove, and find values under a pluggable [`Comparator`].
//! - Values comparing equal are the same key: inserting one overwrites the stored value.
//! - Look up the nearest neighbors of a probe with [`OrderedIndex::find_before`] and
//!   [`OrderedIndex::find_after`], without requiring an exact match.
//! - Scan ranges lazily with [`OrderedIndex::inside`] (open interval) and
//!   [`OrderedIndex::including`] (closed, widened to the enclosing boundary nodes).
//! - Take an independent deep copy with [`OrderedIndex::duplicate`].
//!
//! Nodes are kept in an arena and linked by index, with parent back-links for O(1)
//! amortized in-order stepping. Every insert and remove rebalances with single or double
//! rotations, so the height stays within roughly `1.44 * log2(n + 2)`.
//!
//! # Example
//!
//! ```rust
//! use understory_ordered_index::OrderedIndex;
//!
//! let idx: OrderedIndex<i32> = [5, 3, 8, 1, 4, 7, 9, 2, 6].into_iter().collect();
//!
//! assert_eq!(idx.find_before(&0), None);
//! assert_eq!(idx.find_after(&4), Some(&4));
//!
//! let closed: Vec<_> = idx.including(Some(&3), Some(&7)).copied().collect();
//! assert_eq!(closed, [3, 4, 5, 6, 7]);
//!
//! let open: Vec<_> = idx.inside(Some(&3), Some(&7)).copied().collect();
//! assert_eq!(open, [4, 5, 6]);
//! ```
//!
//! ## Comparators
//!
//! [`NaturalOrder`] (the default) uses the value's [`Ord`]. Any `Fn(&T, &T) -> Ordering`
//! can be used instead, and [`Reverse`] flips an existing comparator.
//! Comparators must be deterministic; inconsistent results leave the index in an
//! unspecified (but memory-safe) order.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod compare;
pub mod range;
pub mod tree;

pub use compare::{Comparator, NaturalOrder, Reverse};
pub use range::Range;
pub use tree::OrderedIndex;
