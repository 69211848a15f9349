use core::iter::FusedIterator;
use core::ops::Range;

use crate::{Axis, IVec3};

/// Half-open integer box `[low, high)`.
///
/// Every flat index produced by [`Boundary::linearize`] and every point order
/// produced by [`Boundary::iter_yzx`] is Y-major, then Z, then X. Chunk storage
/// and the bulk copy paths rely on this ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Boundary {
    low: IVec3,
    high: IVec3,
}

impl Boundary {
    /// Builds a box from two arbitrary corners; they are normalized to min/max.
    #[inline]
    pub fn new(a: IVec3, b: IVec3) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// The far corner saturates at the `i32` limits; use
    /// [`IVec3::checked_add`] first where that must be an error.
    #[inline]
    pub fn from_origin_dims(origin: IVec3, dims: IVec3) -> Self {
        Self::new(origin, origin.saturating_add(dims))
    }

    #[inline]
    pub fn low(&self) -> IVec3 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> IVec3 {
        self.high
    }

    /// Extent per axis, saturating at `i32::MAX` for boxes wider than that.
    #[inline]
    pub fn dims(&self) -> IVec3 {
        let [x, y, z] = self.spans();
        let narrow = |s: i64| s.min(i64::from(i32::MAX)) as i32;
        IVec3::new(narrow(x), narrow(y), narrow(z))
    }

    /// Number of points in the box, saturating at `i64::MAX`.
    #[inline]
    pub fn volume(&self) -> i64 {
        let [x, y, z] = self.spans();
        x.saturating_mul(y).saturating_mul(z)
    }

    /// Exact per-axis extents; a span can reach `2^32 - 1`.
    #[inline]
    fn spans(&self) -> [i64; 3] {
        let span = |a: Axis| i64::from(self.high.get(a)) - i64::from(self.low.get(a));
        [span(Axis::X), span(Axis::Y), span(Axis::Z)]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        let d = self.dims();
        d.x <= 0 || d.y <= 0 || d.z <= 0
    }

    #[inline]
    pub fn range(&self, axis: Axis) -> Range<i32> {
        self.low.get(axis)..self.high.get(axis)
    }

    #[inline]
    pub fn contains(&self, p: IVec3) -> bool {
        p.all_ge(self.low) && p.x < self.high.x && p.y < self.high.y && p.z < self.high.z
    }

    pub fn intersects(&self, other: &Boundary) -> bool {
        Axis::ALL.into_iter().all(|a| {
            self.low.get(a) < other.high.get(a) && self.high.get(a) > other.low.get(a)
        })
    }

    /// True when every point of `self` is also inside `container`.
    #[inline]
    pub fn fully_inside(&self, container: &Boundary) -> bool {
        self.low.all_ge(container.low) && self.high.all_le(container.high)
    }

    /// Flat Y-major/Z/X index of a contained point.
    #[inline]
    pub fn linearize(&self, p: IVec3) -> usize {
        debug_assert!(self.contains(p), "{p} outside {self:?}");
        let l = p - self.low;
        let d = self.dims();
        let (dx, dz) = (d.x as usize, d.z as usize);
        l.x as usize + l.z as usize * dx + l.y as usize * dx * dz
    }

    /// Inverse of [`Boundary::linearize`].
    #[inline]
    pub fn delinearize(&self, idx: usize) -> IVec3 {
        let d = self.dims();
        let (dx, dz) = (d.x as usize, d.z as usize);
        let x = idx % dx;
        let z = (idx / dx) % dz;
        let y = idx / (dx * dz);
        self.low + IVec3::new(x as i32, y as i32, z as i32)
    }

    /// Intersection with `container`, built from clamped corners. Boxes that
    /// don't overlap come back with zero extent on at least one axis.
    pub fn clamp_into(&self, container: &Boundary) -> Boundary {
        Boundary::new(
            self.low.clamp(container.low, container.high),
            self.high.clamp(container.low, container.high),
        )
    }

    /// Nearest point of the box to `p`.
    #[inline]
    pub fn clamp_point(&self, p: IVec3) -> IVec3 {
        p.clamp(self.low, self.high - IVec3::ONE)
    }

    #[inline]
    pub fn shift(&self, v: IVec3) -> Boundary {
        Boundary {
            low: self.low + v,
            high: self.high + v,
        }
    }

    #[inline]
    pub fn expand(&self, margin: IVec3) -> Boundary {
        Boundary::new(self.low - margin, self.high + margin)
    }

    /// Same dimensions, recentered on `point`.
    pub fn with_midpoint(&self, point: IVec3) -> Boundary {
        let d = self.dims();
        let low = point - IVec3::new(d.x / 2, d.y / 2, d.z / 2);
        Boundary::new(low, low + d)
    }

    #[inline]
    pub fn on_min_border(&self, p: IVec3) -> bool {
        p.x == self.low.x || p.y == self.low.y || p.z == self.low.z
    }

    #[inline]
    pub fn on_max_border(&self, p: IVec3) -> bool {
        p.x == self.high.x - 1 || p.y == self.high.y - 1 || p.z == self.high.z - 1
    }

    #[inline]
    pub fn on_border(&self, p: IVec3) -> bool {
        self.on_min_border(p) || self.on_max_border(p)
    }

    /// Every point of the box, Y outermost and X innermost. Restart by calling again.
    pub fn iter_yzx(&self) -> BoundaryIter {
        BoundaryIter {
            bound: *self,
            next: if self.is_empty() { None } else { Some(self.low) },
            remaining: if self.is_empty() { 0 } else { self.volume() as usize },
        }
    }
}

impl core::fmt::Display for Boundary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{} .. {})", self.low, self.high)
    }
}

#[derive(Clone, Debug)]
pub struct BoundaryIter {
    bound: Boundary,
    next: Option<IVec3>,
    remaining: usize,
}

impl Iterator for BoundaryIter {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        let cur = self.next?;
        let (low, high) = (self.bound.low, self.bound.high);
        let mut n = cur;
        n.x += 1;
        if n.x >= high.x {
            n.x = low.x;
            n.z += 1;
            if n.z >= high.z {
                n.z = low.z;
                n.y += 1;
            }
        }
        self.next = (n.y < high.y).then_some(n);
        self.remaining -= 1;
        Some(cur)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for BoundaryIter {}
impl FusedIterator for BoundaryIter {}
