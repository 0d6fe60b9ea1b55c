// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordering strategies used by [`OrderedIndex`](crate::OrderedIndex).

use core::cmp::Ordering;

/// Total ordering strategy over values of type `T`.
///
/// The result must be deterministic and consistent across calls for the same pair:
/// the index relies on it to place, find, and overwrite values. Values comparing
/// [`Ordering::Equal`] are treated as the same key.
///
/// Any `Fn(&T, &T) -> Ordering` is a comparator, so ad hoc orderings can be passed
/// as closures:
///
/// ```rust
/// use understory_ordered_index::OrderedIndex;
///
/// // Order by the first tuple field only.
/// let mut idx = OrderedIndex::new(|a: &(u32, &str), b: &(u32, &str)| a.0.cmp(&b.0));
/// idx.insert((2, "two"));
/// idx.insert((2, "deux"));
/// assert_eq!(idx.len(), 1);
/// assert_eq!(idx.find(&(2, "")), Some(&(2, "deux")));
/// ```
pub trait Comparator<T> {
    /// Compare `a` to `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// Comparator using the value's own [`Ord`] implementation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Comparator reversing another comparator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reverse<C>(pub C);

impl<T, C: Comparator<T>> Comparator<T> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self.0.compare(b, a)
    }
}
