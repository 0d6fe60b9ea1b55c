// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared types: geometry extractors, split policy, and small geometry helpers.

use kurbo::{Point, Rect};

/// Extracts the indexed position of an element.
///
/// The result must stay stable while the element is indexed: locators do not observe
/// coordinate changes, so relocating an element means removing and re-adding it.
/// Any `Fn(&E) -> Point` is a point source.
pub trait PointSource<E> {
    /// Position of `element`.
    fn point(&self, element: &E) -> Point;
}

impl<E, F> PointSource<E> for F
where
    F: Fn(&E) -> Point,
{
    #[inline]
    fn point(&self, element: &E) -> Point {
        self(element)
    }
}

/// Extracts the axis-aligned bounding box of an element.
///
/// Boxes must be well-formed (`x0 <= x1`, `y0 <= y1`) and stay stable while the element
/// is indexed. Any `Fn(&E) -> Rect` is a bounds source.
pub trait BoundsSource<E> {
    /// Bounding box of `element`.
    fn bounds(&self, element: &E) -> Rect;
}

impl<E, F> BoundsSource<E> for F
where
    F: Fn(&E) -> Rect,
{
    #[inline]
    fn bounds(&self, element: &E) -> Rect {
        self(element)
    }
}

/// When a [`RadiusLocator`](crate::RadiusLocator) sector trades its bucket for quadrants.
///
/// Fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitPolicy {
    /// Bucket size at which a sector splits into quadrants.
    pub threshold: usize,
    /// Sectors whose smaller side is at most this size never split.
    pub min_size: f64,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            threshold: 8,
            min_size: 1.0,
        }
    }
}

bitflags::bitflags! {
    /// Half-spaces around a pivot that wholly contain a box or point.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Sides: u8 {
        /// Strictly left of the pivot.
        const LEFT   = 0b0000_0001;
        /// Strictly right of the pivot.
        const RIGHT  = 0b0000_0010;
        /// Strictly above the pivot (smaller `y`).
        const TOP    = 0b0000_0100;
        /// Strictly below the pivot (larger `y`).
        const BOTTOM = 0b0000_1000;
    }
}

impl Sides {
    /// Test order for placing a box into a child.
    pub const ORDER: [Self; 4] = [Self::LEFT, Self::RIGHT, Self::TOP, Self::BOTTOM];

    /// Half-spaces of `pivot` that wholly contain `rect`.
    pub fn of_rect(rect: &Rect, pivot: Point) -> Self {
        let mut sides = Self::empty();
        sides.set(Self::LEFT, rect.x1 < pivot.x);
        sides.set(Self::RIGHT, rect.x0 > pivot.x);
        sides.set(Self::TOP, rect.y1 < pivot.y);
        sides.set(Self::BOTTOM, rect.y0 > pivot.y);
        sides
    }

    /// Half-spaces of `pivot` that contain `pt`.
    pub fn of_point(pt: Point, pivot: Point) -> Self {
        Self::of_rect(&Rect::from_points(pt, pt), pivot)
    }

    /// The first side in [`Sides::ORDER`] present in `self`, as a child slot.
    pub fn first_slot(self) -> Option<usize> {
        Self::ORDER.iter().position(|s| self.contains(*s))
    }

    /// Sub-region of `bounds` on side `slot` of `pivot`.
    pub(crate) fn region(slot: usize, bounds: Rect, pivot: Point) -> Rect {
        match slot {
            0 => Rect::new(bounds.x0, bounds.y0, pivot.x, bounds.y1),
            1 => Rect::new(pivot.x, bounds.y0, bounds.x1, bounds.y1),
            2 => Rect::new(bounds.x0, bounds.y0, bounds.x1, pivot.y),
            _ => Rect::new(bounds.x0, pivot.y, bounds.x1, bounds.y1),
        }
    }
}

/// Whether `rect` contains `pt`, edges included.
#[inline]
pub fn contains_inclusive(rect: &Rect, pt: Point) -> bool {
    rect.x0 <= pt.x && pt.x <= rect.x1 && rect.y0 <= pt.y && pt.y <= rect.y1
}

/// Squared distance from `pt` to the nearest point of `rect` (zero inside).
#[inline]
pub fn distance_sq_to_rect(rect: &Rect, pt: Point) -> f64 {
    let dx = (rect.x0 - pt.x).max(pt.x - rect.x1).max(0.0);
    let dy = (rect.y0 - pt.y).max(pt.y - rect.y1).max(0.0);
    dx * dx + dy * dy
}

/// Whether `inner` touches or crosses an edge of `outer`.
#[inline]
pub(crate) fn touches_edge(inner: &Rect, outer: &Rect) -> bool {
    inner.x0 <= outer.x0 || inner.y0 <= outer.y0 || inner.x1 >= outer.x1 || inner.y1 >= outer.y1
}
