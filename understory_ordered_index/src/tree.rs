// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-backed AVL tree: structure, rebalancing, lookups.

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::compare::{Comparator, NaturalOrder};
use crate::range::Range;

/// Index of a node slot in the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    left: Option<NodeIdx>,
    right: Option<NodeIdx>,
    parent: Option<NodeIdx>, // navigation only
    height: u32,
}

/// A totally ordered set of values kept balanced as an AVL tree.
///
/// Values are ordered by a [`Comparator`]. Values that compare equal are the same key:
/// inserting one overwrites the stored value instead of adding a node, which makes the
/// index behave like a sorted map keyed by comparator equivalence.
///
/// Nodes live in an arena and refer to each other by index, including a parent
/// back-link used for in-order stepping.
pub struct OrderedIndex<T, C = NaturalOrder> {
    nodes: Vec<Option<Node<T>>>,
    free_list: Vec<usize>,
    root: Option<NodeIdx>,
    len: usize,
    cmp: C,
}

impl<T, C> Debug for OrderedIndex<T, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OrderedIndex")
            .field("len", &self.len)
            .field("height", &self.height_of(self.root))
            .field("total_slots", &self.nodes.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<T: Ord> Default for OrderedIndex<T, NaturalOrder> {
    fn default() -> Self {
        Self::new(NaturalOrder)
    }
}

impl<T: Ord> FromIterator<T> for OrderedIndex<T, NaturalOrder> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut idx = Self::default();
        idx.extend(iter);
        idx
    }
}

impl<T, C: Comparator<T>> Extend<T> for OrderedIndex<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}

impl<T, C: Comparator<T>> OrderedIndex<T, C> {
    /// Create an empty index ordered by `cmp`.
    pub fn new(cmp: C) -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: None,
            len: 0,
            cmp,
        }
    }

    /// Number of values in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Height of the tree; `0` when empty, `1` for a single node.
    pub fn height(&self) -> u32 {
        self.height_of(self.root)
    }

    /// The comparator ordering this index.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.root = None;
        self.len = 0;
    }

    /// Insert `value`.
    ///
    /// If a stored value compares equal, it is overwritten in place and returned;
    /// the node count does not change.
    pub fn insert(&mut self, value: T) -> Option<T> {
        let mut replaced = None;
        let root = self.insert_at(self.root, value, &mut replaced);
        self.set_root(Some(root));
        if replaced.is_none() {
            self.len += 1;
        }
        replaced
    }

    /// Remove the value comparing equal to `value`, returning it. No-op if absent.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        let mut removed = None;
        let root = self.remove_at(self.root, value, &mut removed);
        self.set_root(root);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// The stored value comparing equal to `value`.
    pub fn find(&self, value: &T) -> Option<&T> {
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = self.node(n);
            cur = match self.cmp.compare(value, &node.value) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(&node.value),
            };
        }
        None
    }

    /// Whether a value comparing equal to `value` is stored.
    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// The greatest stored value less than or equal to `value`.
    pub fn find_before(&self, value: &T) -> Option<&T> {
        self.floor(value, true).map(|n| &self.node(n).value)
    }

    /// The least stored value greater than or equal to `value`.
    pub fn find_after(&self, value: &T) -> Option<&T> {
        self.ceiling(value, true).map(|n| &self.node(n).value)
    }

    /// The smallest value.
    pub fn first(&self) -> Option<&T> {
        self.root.map(|r| &self.node(self.leftmost(r)).value)
    }

    /// The largest value.
    pub fn last(&self) -> Option<&T> {
        self.root.map(|r| &self.node(self.rightmost(r)).value)
    }

    /// All values in ascending order.
    pub fn iter(&self) -> Range<'_, T, C> {
        let first = self.root.map(|r| self.leftmost(r));
        let last = self.root.map(|r| self.rightmost(r));
        self.span(first, last)
    }

    /// Values strictly between `start` and `end`, ascending.
    ///
    /// A `None` bound is unbounded on that side. The sequence is empty when both
    /// bounds are given and `start` orders after `end`.
    ///
    /// The returned iterator borrows the index; scanning again needs a new call.
    pub fn inside(&self, start: Option<&T>, end: Option<&T>) -> Range<'_, T, C> {
        if self.out_of_order(start, end) {
            return Range::empty(self);
        }
        let first = match start {
            Some(s) => self.ceiling(s, false),
            None => self.root.map(|r| self.leftmost(r)),
        };
        let last = match end {
            Some(e) => self.floor(e, false),
            None => self.root.map(|r| self.rightmost(r)),
        };
        self.span(first, last)
    }

    /// Values from the boundary node at or before `start` through the boundary node
    /// at or after `end`, ascending.
    ///
    /// Exact matches of the bounds are included. When a bound has no exact match the
    /// nearest enclosing value ([`find_before`](Self::find_before) for `start`,
    /// [`find_after`](Self::find_after) for `end`) is included as well, or the first
    /// (last) value when there is none. A `None` bound is unbounded on that side.
    /// The sequence is empty when both bounds are given and `start` orders after `end`.
    pub fn including(&self, start: Option<&T>, end: Option<&T>) -> Range<'_, T, C> {
        if self.out_of_order(start, end) {
            return Range::empty(self);
        }
        let first = start
            .and_then(|s| self.floor(s, true))
            .or_else(|| self.root.map(|r| self.leftmost(r)));
        let last = end
            .and_then(|e| self.ceiling(e, true))
            .or_else(|| self.root.map(|r| self.rightmost(r)));
        self.span(first, last)
    }

    /// A structurally independent copy with a compacted arena.
    ///
    /// The copy has the same shape and cloned values; mutating either index never
    /// affects the other.
    #[must_use]
    pub fn duplicate(&self) -> Self
    where
        T: Clone,
        C: Clone,
    {
        let mut nodes = Vec::with_capacity(self.len);
        let root = self.root.map(|r| self.copy_subtree(r, None, &mut nodes));
        Self {
            nodes,
            free_list: Vec::new(),
            root,
            len: self.len,
            cmp: self.cmp.clone(),
        }
    }

    /// Range from node `first` through node `last`, empty unless both exist in order.
    fn span(&self, first: Option<NodeIdx>, last: Option<NodeIdx>) -> Range<'_, T, C> {
        match (first, last) {
            (Some(f), Some(l))
                if self.cmp.compare(self.value(f), self.value(l)) != Ordering::Greater =>
            {
                Range::new(self, f, l)
            }
            _ => Range::empty(self),
        }
    }

    fn out_of_order(&self, start: Option<&T>, end: Option<&T>) -> bool {
        match (start, end) {
            (Some(s), Some(e)) => self.cmp.compare(s, e) == Ordering::Greater,
            _ => false,
        }
    }

    /// Greatest node `<= value` (or `< value` when not `inclusive`).
    fn floor(&self, value: &T, inclusive: bool) -> Option<NodeIdx> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = self.node(n);
            cur = match self.cmp.compare(value, &node.value) {
                Ordering::Equal if inclusive => return Some(n),
                Ordering::Greater => {
                    best = Some(n);
                    node.right
                }
                _ => node.left,
            };
        }
        best
    }

    /// Least node `>= value` (or `> value` when not `inclusive`).
    fn ceiling(&self, value: &T, inclusive: bool) -> Option<NodeIdx> {
        let mut best = None;
        let mut cur = self.root;
        while let Some(n) = cur {
            let node = self.node(n);
            cur = match self.cmp.compare(value, &node.value) {
                Ordering::Equal if inclusive => return Some(n),
                Ordering::Less => {
                    best = Some(n);
                    node.left
                }
                _ => node.right,
            };
        }
        best
    }

    fn insert_at(&mut self, at: Option<NodeIdx>, value: T, replaced: &mut Option<T>) -> NodeIdx {
        let Some(at) = at else {
            return self.alloc(value);
        };
        match self.cmp.compare(&value, &self.node(at).value) {
            Ordering::Less => {
                let child = self.insert_at(self.node(at).left, value, replaced);
                self.set_left(at, Some(child));
            }
            Ordering::Greater => {
                let child = self.insert_at(self.node(at).right, value, replaced);
                self.set_right(at, Some(child));
            }
            Ordering::Equal => {
                *replaced = Some(core::mem::replace(&mut self.node_mut(at).value, value));
                return at;
            }
        }
        self.rebalance(at)
    }

    fn remove_at(
        &mut self,
        at: Option<NodeIdx>,
        value: &T,
        removed: &mut Option<T>,
    ) -> Option<NodeIdx> {
        let at = at?;
        match self.cmp.compare(value, &self.node(at).value) {
            Ordering::Less => {
                let child = self.remove_at(self.node(at).left, value, removed);
                self.set_left(at, child);
            }
            Ordering::Greater => {
                let child = self.remove_at(self.node(at).right, value, removed);
                self.set_right(at, child);
            }
            Ordering::Equal => {
                let (left, right) = (self.node(at).left, self.node(at).right);
                *removed = Some(self.free(at));
                return match (left, right) {
                    (None, None) => None,
                    (Some(only), None) | (None, Some(only)) => Some(only),
                    (Some(left), Some(right)) => {
                        // The successor takes the removed node's place.
                        let (rest, successor) = self.detach_min(right);
                        self.set_left(successor, Some(left));
                        self.set_right(successor, rest);
                        Some(self.rebalance(successor))
                    }
                };
            }
        }
        Some(self.rebalance(at))
    }

    /// Unlink the minimum of the subtree at `at`. Returns the new subtree root and
    /// the detached node.
    fn detach_min(&mut self, at: NodeIdx) -> (Option<NodeIdx>, NodeIdx) {
        match self.node(at).left {
            None => (self.node(at).right, at),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.set_left(at, rest);
                (Some(self.rebalance(at)), min)
            }
        }
    }

    fn copy_subtree(
        &self,
        at: NodeIdx,
        parent: Option<NodeIdx>,
        out: &mut Vec<Option<Node<T>>>,
    ) -> NodeIdx
    where
        T: Clone,
    {
        let src = self.node(at);
        let idx = NodeIdx(out.len());
        out.push(Some(Node {
            value: src.value.clone(),
            left: None,
            right: None,
            parent,
            height: src.height,
        }));
        let left = src.left.map(|l| self.copy_subtree(l, Some(idx), out));
        let right = src.right.map(|r| self.copy_subtree(r, Some(idx), out));
        if let Some(node) = out[idx.get()].as_mut() {
            node.left = left;
            node.right = right;
        }
        idx
    }
}

// Structural helpers that never consult the comparator.
impl<T, C> OrderedIndex<T, C> {
    fn node(&self, idx: NodeIdx) -> &Node<T> {
        self.nodes[idx.get()].as_ref().expect("dangling NodeIdx")
    }

    fn node_mut(&mut self, idx: NodeIdx) -> &mut Node<T> {
        self.nodes[idx.get()].as_mut().expect("dangling NodeIdx")
    }

    pub(crate) fn value(&self, idx: NodeIdx) -> &T {
        &self.node(idx).value
    }

    fn alloc(&mut self, value: T) -> NodeIdx {
        let node = Node {
            value,
            left: None,
            right: None,
            parent: None,
            height: 1,
        };
        if let Some(i) = self.free_list.pop() {
            self.nodes[i] = Some(node);
            NodeIdx(i)
        } else {
            self.nodes.push(Some(node));
            NodeIdx(self.nodes.len() - 1)
        }
    }

    fn free(&mut self, idx: NodeIdx) -> T {
        let node = self.nodes[idx.get()].take().expect("dangling NodeIdx");
        self.free_list.push(idx.get());
        node.value
    }

    fn set_root(&mut self, root: Option<NodeIdx>) {
        self.root = root;
        if let Some(r) = root {
            self.node_mut(r).parent = None;
        }
    }

    fn set_left(&mut self, parent: NodeIdx, child: Option<NodeIdx>) {
        self.node_mut(parent).left = child;
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
    }

    fn set_right(&mut self, parent: NodeIdx, child: Option<NodeIdx>) {
        self.node_mut(parent).right = child;
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
    }

    fn height_of(&self, idx: Option<NodeIdx>) -> u32 {
        idx.map_or(0, |i| self.node(i).height)
    }

    fn balance_factor(&self, idx: NodeIdx) -> i64 {
        let node = self.node(idx);
        i64::from(self.height_of(node.left)) - i64::from(self.height_of(node.right))
    }

    fn update_height(&mut self, idx: NodeIdx) {
        let node = self.node(idx);
        let h = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(idx).height = h;
    }

    /// Restore the balance invariant at `idx` and return the subtree's new root.
    fn rebalance(&mut self, idx: NodeIdx) -> NodeIdx {
        self.update_height(idx);
        let bf = self.balance_factor(idx);
        if bf > 1 {
            let left = self.node(idx).left.expect("left-heavy node has a left child");
            if self.balance_factor(left) < 0 {
                let pivot = self.rotate_left(left);
                self.set_left(idx, Some(pivot));
            }
            return self.rotate_right(idx);
        }
        if bf < -1 {
            let right = self.node(idx).right.expect("right-heavy node has a right child");
            if self.balance_factor(right) > 0 {
                let pivot = self.rotate_right(right);
                self.set_right(idx, Some(pivot));
            }
            return self.rotate_left(idx);
        }
        idx
    }

    fn rotate_right(&mut self, idx: NodeIdx) -> NodeIdx {
        let pivot = self.node(idx).left.expect("rotate_right needs a left child");
        let parent = self.node(idx).parent;
        let inner = self.node(pivot).right;
        self.set_left(idx, inner);
        self.set_right(pivot, Some(idx));
        self.node_mut(pivot).parent = parent;
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn rotate_left(&mut self, idx: NodeIdx) -> NodeIdx {
        let pivot = self.node(idx).right.expect("rotate_left needs a right child");
        let parent = self.node(idx).parent;
        let inner = self.node(pivot).left;
        self.set_right(idx, inner);
        self.set_left(pivot, Some(idx));
        self.node_mut(pivot).parent = parent;
        self.update_height(idx);
        self.update_height(pivot);
        pivot
    }

    fn leftmost(&self, mut idx: NodeIdx) -> NodeIdx {
        while let Some(l) = self.node(idx).left {
            idx = l;
        }
        idx
    }

    fn rightmost(&self, mut idx: NodeIdx) -> NodeIdx {
        while let Some(r) = self.node(idx).right {
            idx = r;
        }
        idx
    }

    /// In-order successor: leftmost node of the right subtree, else the first
    /// ancestor reached from a left child.
    pub(crate) fn successor(&self, idx: NodeIdx) -> Option<NodeIdx> {
        if let Some(r) = self.node(idx).right {
            return Some(self.leftmost(r));
        }
        let mut child = idx;
        let mut parent = self.node(idx).parent;
        while let Some(p) = parent {
            if self.node(p).left == Some(child) {
                return Some(p);
            }
            child = p;
            parent = self.node(p).parent;
        }
        None
    }

    /// Check parent links, heights, and balance factors of every node.
    #[cfg(test)]
    pub(crate) fn check_structure(&self) {
        fn walk<T, C>(t: &OrderedIndex<T, C>, idx: NodeIdx, parent: Option<NodeIdx>) -> u32 {
            let node = t.node(idx);
            assert_eq!(node.parent, parent, "parent back-link is stale");
            let lh = node.left.map_or(0, |l| walk(t, l, Some(idx)));
            let rh = node.right.map_or(0, |r| walk(t, r, Some(idx)));
            assert_eq!(node.height, 1 + lh.max(rh), "cached height is stale");
            assert!(lh.abs_diff(rh) <= 1, "balance factor out of range");
            node.height
        }
        if let Some(r) = self.root {
            let _ = walk(self, r, None);
        }
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        assert_eq!(alive, self.len, "arena liveness disagrees with len");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Clone)]
    struct Rng(u64);

    impl Rng {
        fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }
    }

    fn max_avl_height(n: usize) -> u32 {
        // 1.44 * log2(n + 2), rounded up.
        let mut bits = 0_u32;
        let mut m = n + 2;
        while m > 1 {
            m >>= 1;
            bits += 1;
        }
        // log2(n + 2) < bits + 1
        (144 * (bits + 1)).div_ceil(100)
    }

    #[test]
    fn empty_lookups_return_none() {
        let idx: OrderedIndex<i32> = OrderedIndex::default();
        assert!(idx.find(&1).is_none());
        assert!(idx.find_before(&1).is_none());
        assert!(idx.find_after(&1).is_none());
        assert!(idx.first().is_none());
        assert_eq!(idx.iter().count(), 0);
        assert_eq!(idx.height(), 0);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut idx: OrderedIndex<i32> = OrderedIndex::default();
        for i in 0..1000 {
            assert!(idx.insert(i).is_none());
        }
        idx.check_structure();
        assert_eq!(idx.len(), 1000);
        assert!(idx.height() <= max_avl_height(1000));
        let seen: Vec<_> = idx.iter().copied().collect();
        assert_eq!(seen, (0..1000).collect::<Vec<_>>());
    }

    #[test]
    fn random_churn_keeps_balance_and_order() {
        let mut rng = Rng(0x9E37_79B9_7F4A_7C15);
        let mut idx: OrderedIndex<i64> = OrderedIndex::default();
        let mut model = alloc::collections::BTreeSet::new();
        for step in 0..4000 {
            let v = (rng.next_u64() % 512) as i64;
            if rng.next_u64() % 3 == 0 {
                assert_eq!(idx.remove(&v), model.take(&v));
            } else {
                let _ = idx.insert(v);
                let _ = model.insert(v);
            }
            if step % 97 == 0 {
                idx.check_structure();
            }
        }
        idx.check_structure();
        assert_eq!(idx.len(), model.len());
        assert!(idx.height() <= max_avl_height(idx.len()));
        assert!(idx.iter().copied().eq(model.iter().copied()));
    }

    #[test]
    fn equal_insert_overwrites_without_growing() {
        let mut idx = OrderedIndex::new(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        let _ = idx.insert((1, 'a'));
        let _ = idx.insert((2, 'b'));
        assert_eq!(idx.insert((1, 'z')), Some((1, 'a')));
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.find(&(1, '?')), Some(&(1, 'z')));
        idx.check_structure();
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut idx: OrderedIndex<i32> = [1, 2, 3].into_iter().collect();
        assert!(idx.remove(&7).is_none());
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.remove(&2), Some(2));
        assert!(idx.iter().copied().eq([1, 3]));
        idx.check_structure();
    }

    #[test]
    fn neighbor_lookups() {
        let idx: OrderedIndex<i32> = [10, 20, 30, 40].into_iter().collect();
        assert_eq!(idx.find_before(&25), Some(&20));
        assert_eq!(idx.find_before(&20), Some(&20));
        assert_eq!(idx.find_before(&5), None);
        assert_eq!(idx.find_after(&25), Some(&30));
        assert_eq!(idx.find_after(&40), Some(&40));
        assert_eq!(idx.find_after(&45), None);
        assert_eq!(idx.first(), Some(&10));
        assert_eq!(idx.last(), Some(&40));
    }

    #[test]
    fn successor_walks_through_parents() {
        let idx: OrderedIndex<i32> = (0..64).rev().collect();
        let mut cur = idx.root.map(|r| idx.leftmost(r));
        let mut out = vec![];
        while let Some(n) = cur {
            out.push(*idx.value(n));
            cur = idx.successor(n);
        }
        assert_eq!(out, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_is_independent() {
        let mut original: OrderedIndex<i32> = [5, 3, 8, 1, 4, 7, 9, 2, 6].into_iter().collect();
        let _ = original.remove(&4);
        let mut copy = original.duplicate();
        copy.check_structure();
        assert_eq!(copy.height(), original.height());
        let _ = copy.insert(100);
        let _ = copy.remove(&5);
        assert!(original.iter().copied().eq([1, 2, 3, 5, 6, 7, 8, 9]));
        assert!(copy.iter().copied().eq([1, 2, 3, 6, 7, 8, 9, 100]));
        let _ = original.insert(0);
        assert!(!copy.contains(&0));
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut idx: OrderedIndex<i32> = (0..8).collect();
        let _ = idx.remove(&3);
        let _ = idx.remove(&4);
        let _ = idx.insert(30);
        let _ = idx.insert(40);
        assert_eq!(idx.nodes.len(), 8);
        idx.check_structure();
    }
}
