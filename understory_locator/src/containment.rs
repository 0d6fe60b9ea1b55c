// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Containment locator: an adaptive half-space index over boxes with batched updates.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::types::{BoundsSource, Sides, contains_inclusive, touches_edge};

/// Sectors at this depth keep everything in their bucket.
const MAX_DEPTH: u16 = 32;

/// Default bucket size at which a sector splits.
pub const DEFAULT_THRESHOLD: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct SectorIdx(usize);

impl SectorIdx {
    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug)]
enum Layout {
    Flat,
    /// Half-space children in [`Sides::ORDER`]; missing sides are `None`.
    Split([Option<SectorIdx>; 4]),
}

#[derive(Clone, Debug)]
struct Sector<E> {
    bounds: Rect,
    pivot: Point,
    depth: u16,
    count: usize, // elements in the whole subtree
    // When split, only boxes straddling the pivot on both axes.
    bucket: Vec<(E, Rect)>,
    layout: Layout,
}

impl<E> Sector<E> {
    fn new(bounds: Rect, depth: u16) -> Self {
        Self {
            bounds,
            pivot: bounds.center(),
            depth,
            count: 0,
            bucket: Vec::new(),
            layout: Layout::Flat,
        }
    }
}

/// Point-containment index over elements bounded by a [`BoundsSource`].
///
/// [`add`](Self::add) and [`remove`](Self::remove) only record intent. Pending changes are
/// applied together by [`flush`](Self::flush), which query-side operations
/// ([`query_point`](Self::query_point), [`len`](Self::len)) call first:
///
/// - Removals shrink and additions extend the hull of all realized boxes.
/// - When the hull changes, the sector tree (whose pivots derive from the hull) is rebuilt.
/// - Otherwise pending changes are routed into the existing tree incrementally.
///
/// A box moves into a half-space child only when it lies strictly on one side of the
/// sector's pivot, testing left, right, top, then bottom. Boxes straddling the pivot stay in
/// the sector's bucket, so a point query scans every bucket on its path and descends only
/// into children on the point's side of each axis.
///
/// Element identity is `Ord` equality. Boxes are read once when an addition is realized
/// and cached until removal.
pub struct ContainmentLocator<E, S> {
    source: S,
    threshold: usize,
    pending_add: BTreeSet<E>,
    pending_remove: BTreeSet<E>,
    boxes: BTreeMap<E, Rect>,
    hull: Option<Rect>,
    root: Option<SectorIdx>,
    sectors: Vec<Option<Sector<E>>>,
    free_list: Vec<usize>,
}

impl<E, S> Debug for ContainmentLocator<E, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sectors = self.sectors.iter().filter(|s| s.is_some()).count();
        f.debug_struct("ContainmentLocator")
            .field("threshold", &self.threshold)
            .field("realized", &self.boxes.len())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove.len())
            .field("hull", &self.hull)
            .field("sectors", &sectors)
            .finish_non_exhaustive()
    }
}

impl<E, S> ContainmentLocator<E, S>
where
    E: Clone + Ord,
    S: BoundsSource<E>,
{
    /// Create an empty locator with [`DEFAULT_THRESHOLD`].
    pub fn new(source: S) -> Self {
        Self::with_threshold(DEFAULT_THRESHOLD, source)
    }

    /// Create an empty locator whose sectors split at `threshold` bucket entries.
    ///
    /// # Panics
    ///
    /// Panics if `threshold` is zero.
    pub fn with_threshold(threshold: usize, source: S) -> Self {
        assert!(threshold > 0, "split threshold must be positive");
        Self {
            source,
            threshold,
            pending_add: BTreeSet::new(),
            pending_remove: BTreeSet::new(),
            boxes: BTreeMap::new(),
            hull: None,
            root: None,
            sectors: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Queue `element` for insertion.
    ///
    /// Cancels a pending removal of the same element. Adding an element that is already
    /// realized or pending is a no-op.
    pub fn add(&mut self, element: E) {
        if self.pending_remove.remove(&element) || self.boxes.contains_key(&element) {
            return;
        }
        let _ = self.pending_add.insert(element);
    }

    /// Queue `element` for removal.
    ///
    /// Cancels a pending insertion of the same element. Removing an unknown element is a
    /// no-op.
    pub fn remove(&mut self, element: &E) {
        if self.pending_add.remove(element) {
            return;
        }
        if self.boxes.contains_key(element) {
            let _ = self.pending_remove.insert(element.clone());
        }
    }

    /// Whether `element` is a member once pending changes are applied.
    pub fn contains(&self, element: &E) -> bool {
        self.pending_add.contains(element)
            || (self.boxes.contains_key(element) && !self.pending_remove.contains(element))
    }

    /// Whether any additions or removals are waiting for [`flush`](Self::flush).
    pub fn has_pending(&self) -> bool {
        !self.pending_add.is_empty() || !self.pending_remove.is_empty()
    }

    /// Cached box of a realized element.
    pub fn bbox(&self, element: &E) -> Option<Rect> {
        self.boxes.get(element).copied()
    }

    /// Hull of all realized boxes, as of the last flush.
    pub fn hull(&self) -> Option<Rect> {
        self.hull
    }

    /// Realized elements, in `Ord` order.
    pub fn elements(&self) -> impl Iterator<Item = &E> + '_ {
        self.boxes.keys()
    }

    /// Number of elements, after applying pending changes.
    pub fn len(&mut self) -> usize {
        self.flush();
        self.boxes.len()
    }

    /// Whether the locator is empty, after applying pending changes.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Remove every element, realized or pending.
    pub fn clear(&mut self) {
        self.pending_add.clear();
        self.pending_remove.clear();
        self.boxes.clear();
        self.hull = None;
        self.root = None;
        self.sectors.clear();
        self.free_list.clear();
    }

    /// Elements whose box contains `pt` (edges included), after applying pending changes.
    pub fn query_point(&mut self, pt: Point) -> Vec<E> {
        self.flush();
        let mut out = Vec::new();
        let (Some(root), Some(hull)) = (self.root, self.hull) else {
            return out;
        };
        if !contains_inclusive(&hull, pt) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let sector = self.sector(idx);
            out.extend(
                sector
                    .bucket
                    .iter()
                    .filter(|(_, b)| contains_inclusive(b, pt))
                    .map(|(e, _)| e.clone()),
            );
            if let Layout::Split(children) = sector.layout {
                let sides = Sides::of_point(pt, sector.pivot);
                for (slot, side) in Sides::ORDER.iter().enumerate() {
                    if sides.contains(*side)
                        && let Some(child) = children[slot]
                    {
                        stack.push(child);
                    }
                }
            }
        }
        out
    }

    /// Apply all pending additions and removals to the sector tree.
    pub fn flush(&mut self) {
        if !self.has_pending() {
            return;
        }
        let old_hull = self.hull;

        let mut hull_stale = false;
        let mut removed = Vec::with_capacity(self.pending_remove.len());
        for e in core::mem::take(&mut self.pending_remove) {
            if let Some(b) = self.boxes.remove(&e) {
                hull_stale |= old_hull.is_some_and(|h| touches_edge(&b, &h));
                removed.push((e, b));
            }
        }

        let mut added = Vec::with_capacity(self.pending_add.len());
        for e in core::mem::take(&mut self.pending_add) {
            let b = self.source.bounds(&e);
            debug_assert!(b.x0 <= b.x1 && b.y0 <= b.y1, "malformed box {b:?}");
            let _ = self.boxes.insert(e.clone(), b);
            added.push((e, b));
        }

        let new_hull = if hull_stale {
            self.boxes.values().copied().reduce(|a, b| a.union(b))
        } else {
            added
                .iter()
                .map(|(_, b)| *b)
                .fold(old_hull, |acc, b| Some(acc.map_or(b, |h| h.union(b))))
        };

        if new_hull != old_hull {
            self.hull = new_hull;
            self.rebuild();
            return;
        }
        let Some(root) = self.root else {
            return;
        };
        for (e, b) in &removed {
            let found = self.remove_from(root, e, b);
            debug_assert!(found, "realized element missing from the sector tree");
        }
        for (e, b) in added {
            self.insert_into(root, e, b);
        }
    }

    fn rebuild(&mut self) {
        self.sectors.clear();
        self.free_list.clear();
        self.root = None;
        let Some(hull) = self.hull else {
            return;
        };
        let root = self.alloc(Sector::new(hull, 0));
        self.root = Some(root);
        let entries: Vec<(E, Rect)> = self.boxes.iter().map(|(e, b)| (e.clone(), *b)).collect();
        for (e, b) in entries {
            self.insert_into(root, e, b);
        }
    }

    fn insert_into(&mut self, mut idx: SectorIdx, element: E, b: Rect) {
        loop {
            let threshold = self.threshold;
            let sector = self.sector_mut(idx);
            sector.count += 1;
            let slot = match sector.layout {
                Layout::Flat => {
                    sector.bucket.push((element, b));
                    if sector.bucket.len() >= threshold && sector.depth < MAX_DEPTH {
                        self.split(idx);
                    }
                    return;
                }
                Layout::Split(children) => {
                    let Some(slot) = Sides::of_rect(&b, sector.pivot).first_slot() else {
                        sector.bucket.push((element, b));
                        return;
                    };
                    if let Some(child) = children[slot] {
                        idx = child;
                        continue;
                    }
                    slot
                }
            };
            let (bounds, pivot, depth) = (sector.bounds, sector.pivot, sector.depth);
            let child = self.alloc(Sector::new(Sides::region(slot, bounds, pivot), depth + 1));
            self.set_child(idx, slot, Some(child));
            idx = child;
        }
    }

    /// Switch a flat sector to half-space children and re-route its bucket.
    fn split(&mut self, idx: SectorIdx) {
        let sector = self.sector_mut(idx);
        if matches!(sector.layout, Layout::Split(_)) {
            return;
        }
        sector.layout = Layout::Split([None; 4]);
        sector.count = 0;
        let entries = core::mem::take(&mut sector.bucket);
        for (e, b) in entries {
            self.insert_into(idx, e, b);
        }
    }

    fn remove_from(&mut self, idx: SectorIdx, element: &E, b: &Rect) -> bool {
        let sector = self.sector(idx);
        let route = match sector.layout {
            Layout::Split(children) => Sides::of_rect(b, sector.pivot)
                .first_slot()
                .map(|slot| (slot, children[slot])),
            Layout::Flat => None,
        };
        match route {
            Some((_, None)) => return false,
            Some((slot, Some(child))) => {
                if !self.remove_from(child, element, b) {
                    return false;
                }
                if self.sector(child).count == 0 {
                    let mut orphans = Vec::new();
                    self.drain_subtree(child, &mut orphans);
                    debug_assert!(orphans.is_empty(), "empty sector still held elements");
                    self.set_child(idx, slot, None);
                }
            }
            None => {
                let sector = self.sector_mut(idx);
                let Some(pos) = sector.bucket.iter().position(|(e, _)| e == element) else {
                    return false;
                };
                let _ = sector.bucket.swap_remove(pos);
            }
        }
        let threshold = self.threshold;
        let sector = self.sector_mut(idx);
        sector.count -= 1;
        if matches!(sector.layout, Layout::Split(_)) && sector.count <= threshold {
            self.shrink(idx);
        }
        true
    }

    /// Merge a split sector's subtree back into its bucket.
    fn shrink(&mut self, idx: SectorIdx) {
        let sector = self.sector_mut(idx);
        let Layout::Split(children) = core::mem::replace(&mut sector.layout, Layout::Flat) else {
            return;
        };
        let mut entries = core::mem::take(&mut sector.bucket);
        for child in children.into_iter().flatten() {
            self.drain_subtree(child, &mut entries);
        }
        self.sector_mut(idx).bucket = entries;
    }
}

impl<E, S> ContainmentLocator<E, S> {
    fn sector(&self, idx: SectorIdx) -> &Sector<E> {
        self.sectors[idx.get()].as_ref().expect("dangling SectorIdx")
    }

    fn sector_mut(&mut self, idx: SectorIdx) -> &mut Sector<E> {
        self.sectors[idx.get()].as_mut().expect("dangling SectorIdx")
    }

    fn set_child(&mut self, idx: SectorIdx, slot: usize, child: Option<SectorIdx>) {
        if let Layout::Split(children) = &mut self.sector_mut(idx).layout {
            children[slot] = child;
        }
    }

    fn alloc(&mut self, sector: Sector<E>) -> SectorIdx {
        if let Some(i) = self.free_list.pop() {
            self.sectors[i] = Some(sector);
            SectorIdx(i)
        } else {
            self.sectors.push(Some(sector));
            SectorIdx(self.sectors.len() - 1)
        }
    }

    /// Free `idx` and its descendants, moving their entries into `out`.
    fn drain_subtree(&mut self, idx: SectorIdx, out: &mut Vec<(E, Rect)>) {
        let sector = self.sectors[idx.get()].take().expect("dangling SectorIdx");
        self.free_list.push(idx.get());
        out.extend(sector.bucket);
        if let Layout::Split(children) = sector.layout {
            for child in children.into_iter().flatten() {
                self.drain_subtree(child, out);
            }
        }
    }
}
