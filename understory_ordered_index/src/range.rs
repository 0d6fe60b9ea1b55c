// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy in-order scans over an [`OrderedIndex`].

use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::tree::{NodeIdx, OrderedIndex};

/// Ascending scan between two boundary nodes, produced by [`OrderedIndex::iter`],
/// [`OrderedIndex::inside`], and [`OrderedIndex::including`].
///
/// The scan is lazy and one-shot: each step follows the in-order successor link, and
/// once exhausted it stays exhausted. It borrows the index, so the index cannot be
/// mutated while a scan is alive.
pub struct Range<'a, T, C> {
    tree: &'a OrderedIndex<T, C>,
    next: Option<NodeIdx>,
    last: Option<NodeIdx>,
}

impl<'a, T, C> Range<'a, T, C> {
    pub(crate) fn new(tree: &'a OrderedIndex<T, C>, first: NodeIdx, last: NodeIdx) -> Self {
        Self {
            tree,
            next: Some(first),
            last: Some(last),
        }
    }

    pub(crate) fn empty(tree: &'a OrderedIndex<T, C>) -> Self {
        Self {
            tree,
            next: None,
            last: None,
        }
    }
}

impl<T, C> Debug for Range<'_, T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Range")
            .field("exhausted", &self.next.is_none())
            .finish_non_exhaustive()
    }
}

impl<'a, T, C> Iterator for Range<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next?;
        self.next = if Some(cur) == self.last {
            None
        } else {
            self.tree.successor(cur)
        };
        Some(self.tree.value(cur))
    }
}

impl<T, C> FusedIterator for Range<'_, T, C> {}
