// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radius locator: an adaptive quadrant index over point-like elements.

use alloc::collections::BTreeSet;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::types::{PointSource, SplitPolicy, contains_inclusive, distance_sq_to_rect};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct SectorIdx(usize);

impl SectorIdx {
    const ROOT: Self = Self(0);

    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
enum SectorState<E> {
    /// Unsorted elements of a small or unsplittable sector.
    Bucket(Vec<E>),
    /// Quadrant children, indexed by [`quadrant`]; empty quadrants are `None`.
    Split([Option<SectorIdx>; 4]),
}

#[derive(Clone, Debug)]
struct Sector<E> {
    bounds: Rect,
    count: usize, // elements in the whole subtree
    state: SectorState<E>,
}

impl<E> Sector<E> {
    fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            count: 0,
            state: SectorState::Bucket(Vec::new()),
        }
    }
}

/// Quadrant slot of `p` relative to `center`; ties go right and down.
#[inline]
fn quadrant(center: Point, p: Point) -> usize {
    usize::from(p.x >= center.x) | (usize::from(p.y >= center.y) << 1)
}

fn quadrant_bounds(bounds: Rect, slot: usize) -> Rect {
    let c = bounds.center();
    let (x0, x1) = if slot & 1 == 0 {
        (bounds.x0, c.x)
    } else {
        (c.x, bounds.x1)
    };
    let (y0, y1) = if slot & 2 == 0 {
        (bounds.y0, c.y)
    } else {
        (c.y, bounds.y1)
    };
    Rect::new(x0, y0, x1, y1)
}

/// Proximity index over elements positioned by a [`PointSource`].
///
/// The locator covers a fixed universe rectangle. Each sector keeps a flat bucket until
/// it holds [`SplitPolicy::threshold`] elements, then distributes them into quadrant
/// children (as long as its cell is larger than [`SplitPolicy::min_size`]). When removals
/// bring a split sector back down to the threshold, its subtree merges into a bucket
/// again.
///
/// Element identity is `Ord` equality; adding an element twice is a no-op. Positions are
/// read once, at insertion and removal, so they must not change while indexed.
pub struct RadiusLocator<E, S> {
    bounds: Rect,
    policy: SplitPolicy,
    source: S,
    sectors: Vec<Option<Sector<E>>>,
    free_list: Vec<usize>,
    members: BTreeSet<E>,
}

impl<E, S> Debug for RadiusLocator<E, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sectors = self.sectors.iter().filter(|s| s.is_some()).count();
        f.debug_struct("RadiusLocator")
            .field("bounds", &self.bounds)
            .field("policy", &self.policy)
            .field("len", &self.members.len())
            .field("sectors", &sectors)
            .finish_non_exhaustive()
    }
}

impl<E, S> RadiusLocator<E, S>
where
    E: Clone + Ord,
    S: PointSource<E>,
{
    /// Create an empty locator over `bounds` with the default [`SplitPolicy`].
    pub fn new(bounds: Rect, source: S) -> Self {
        Self::with_policy(bounds, SplitPolicy::default(), source)
    }

    /// Create an empty locator over `bounds` with an explicit split policy.
    ///
    /// # Panics
    ///
    /// Panics if `policy.threshold` is zero, `policy.min_size` is not positive, or
    /// `bounds` is inverted.
    pub fn with_policy(bounds: Rect, policy: SplitPolicy, source: S) -> Self {
        assert!(policy.threshold > 0, "split threshold must be positive");
        assert!(policy.min_size > 0.0, "minimum sector size must be positive");
        assert!(
            bounds.x0 <= bounds.x1 && bounds.y0 <= bounds.y1,
            "locator bounds must not be inverted"
        );
        Self {
            bounds,
            policy,
            source,
            sectors: vec![Some(Sector::new(bounds))],
            free_list: Vec::new(),
            members: BTreeSet::new(),
        }
    }

    /// The universe covered by this locator.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The split policy fixed at construction.
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Number of indexed elements.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether no elements are indexed.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `element` is indexed.
    pub fn contains(&self, element: &E) -> bool {
        self.members.contains(element)
    }

    /// All indexed elements, in `Ord` order.
    pub fn elements(&self) -> impl Iterator<Item = &E> + '_ {
        self.members.iter()
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.members.clear();
        self.sectors.clear();
        self.free_list.clear();
        self.sectors.push(Some(Sector::new(self.bounds)));
    }

    /// Index `element`. Returns `false` (and does nothing) if it is already indexed.
    ///
    /// # Panics
    ///
    /// Panics if the element's point lies outside [`bounds`](Self::bounds). Callers are
    /// expected to validate positions before adding.
    pub fn add(&mut self, element: E) -> bool {
        if self.members.contains(&element) {
            return false;
        }
        let p = self.source.point(&element);
        assert!(
            contains_inclusive(&self.bounds, p),
            "point {p:?} lies outside the locator bounds {:?}",
            self.bounds
        );
        let _ = self.members.insert(element.clone());
        self.insert_into(SectorIdx::ROOT, element, p);
        true
    }

    /// Remove `element`. Returns `false` if it was not indexed.
    pub fn remove(&mut self, element: &E) -> bool {
        if !self.members.remove(element) {
            return false;
        }
        let p = self.source.point(element);
        let found = self.remove_from(SectorIdx::ROOT, element, p);
        debug_assert!(found, "indexed element missing from its sector; was its point changed?");
        true
    }

    /// Elements whose point lies within Euclidean distance `range` of `center`
    /// (boundary included). A negative or NaN range matches nothing.
    pub fn query_radius(&self, center: Point, range: f64) -> Vec<E> {
        let mut out = Vec::new();
        if range.is_nan() || range < 0.0 {
            return out;
        }
        let r2 = range * range;
        let mut stack = vec![SectorIdx::ROOT];
        while let Some(idx) = stack.pop() {
            let sector = self.sector(idx);
            if distance_sq_to_rect(&sector.bounds, center) > r2 {
                continue;
            }
            match &sector.state {
                SectorState::Bucket(items) => {
                    for e in items {
                        if (self.source.point(e) - center).hypot2() <= r2 {
                            out.push(e.clone());
                        }
                    }
                }
                SectorState::Split(children) => stack.extend(children.iter().flatten()),
            }
        }
        out
    }

    fn can_split(&self, bounds: &Rect) -> bool {
        bounds.width().min(bounds.height()) > self.policy.min_size
    }

    fn insert_into(&mut self, mut idx: SectorIdx, element: E, p: Point) {
        loop {
            let threshold = self.policy.threshold;
            let sector = self.sector_mut(idx);
            sector.count += 1;
            let bounds = sector.bounds;
            let count = sector.count;
            let slot = quadrant(bounds.center(), p);
            match &mut sector.state {
                SectorState::Bucket(items) => {
                    items.push(element);
                    if count >= threshold && self.can_split(&bounds) {
                        self.split(idx);
                    }
                    return;
                }
                SectorState::Split(children) => {
                    if let Some(child) = children[slot] {
                        idx = child;
                        continue;
                    }
                }
            }
            let child = self.alloc(Sector::new(quadrant_bounds(bounds, slot)));
            if let SectorState::Split(children) = &mut self.sector_mut(idx).state {
                children[slot] = Some(child);
            }
            idx = child;
        }
    }

    /// Turn a bucket into quadrants and re-route its elements.
    fn split(&mut self, idx: SectorIdx) {
        let sector = self.sector_mut(idx);
        let items = match &mut sector.state {
            SectorState::Bucket(items) => core::mem::take(items),
            SectorState::Split(_) => return,
        };
        sector.state = SectorState::Split([None; 4]);
        sector.count = 0;
        for e in items {
            let p = self.source.point(&e);
            self.insert_into(idx, e, p);
        }
    }

    fn remove_from(&mut self, idx: SectorIdx, element: &E, p: Point) -> bool {
        let sector = self.sector_mut(idx);
        let slot = quadrant(sector.bounds.center(), p);
        let child = match &mut sector.state {
            SectorState::Bucket(items) => {
                let Some(pos) = items.iter().position(|e| e == element) else {
                    return false;
                };
                let _ = items.swap_remove(pos);
                sector.count -= 1;
                return true;
            }
            SectorState::Split(children) => match children[slot] {
                Some(child) => child,
                None => return false,
            },
        };
        if !self.remove_from(child, element, p) {
            return false;
        }
        if self.sector(child).count == 0 {
            let mut orphans = Vec::new();
            self.drain_subtree(child, &mut orphans);
            debug_assert!(orphans.is_empty(), "empty sector still held elements");
            if let SectorState::Split(children) = &mut self.sector_mut(idx).state {
                children[slot] = None;
            }
        }
        let threshold = self.policy.threshold;
        let sector = self.sector_mut(idx);
        sector.count -= 1;
        if sector.count <= threshold {
            self.shrink(idx);
        }
        true
    }

    /// Merge a split sector's subtree back into a single bucket.
    fn shrink(&mut self, idx: SectorIdx) {
        let sector = self.sector_mut(idx);
        let mut items = Vec::with_capacity(sector.count);
        let state = core::mem::replace(&mut sector.state, SectorState::Bucket(Vec::new()));
        if let SectorState::Split(children) = state {
            for child in children.into_iter().flatten() {
                self.drain_subtree(child, &mut items);
            }
        }
        self.sector_mut(idx).state = SectorState::Bucket(items);
    }

    /// Free `idx` and all its descendants, moving their elements into `out`.
    fn drain_subtree(&mut self, idx: SectorIdx, out: &mut Vec<E>) {
        let sector = self.sectors[idx.get()].take().expect("dangling SectorIdx");
        self.free_list.push(idx.get());
        match sector.state {
            SectorState::Bucket(items) => out.extend(items),
            SectorState::Split(children) => {
                for child in children.into_iter().flatten() {
                    self.drain_subtree(child, out);
                }
            }
        }
    }
}

impl<E, S> RadiusLocator<E, S> {
    fn sector(&self, idx: SectorIdx) -> &Sector<E> {
        self.sectors[idx.get()].as_ref().expect("dangling SectorIdx")
    }

    fn sector_mut(&mut self, idx: SectorIdx) -> &mut Sector<E> {
        self.sectors[idx.get()].as_mut().expect("dangling SectorIdx")
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
}
