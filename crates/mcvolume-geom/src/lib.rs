//! Integer vectors and half-open boxes used for volume addressing.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, BitAnd, Index, Mul, Neg, Shl, Shr, Sub, SubAssign};

mod boundary;

pub use boundary::{Boundary, BoundaryIter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3 { x: 0, y: 0, z: 0 };
    pub const ONE: IVec3 = IVec3 { x: 1, y: 1, z: 1 };
    pub const MIN: IVec3 = IVec3::splat(i32::MIN);
    pub const MAX: IVec3 = IVec3::splat(i32::MAX);

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn splat(v: i32) -> Self {
        Self { x: v, y: v, z: v }
    }

    #[inline]
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn with(self, axis: Axis, v: i32) -> Self {
        match axis {
            Axis::X => Self { x: v, ..self },
            Axis::Y => Self { y: v, ..self },
            Axis::Z => Self { z: v, ..self },
        }
    }

    #[inline]
    pub fn min(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x.min(rhs.x), self.y.min(rhs.y), self.z.min(rhs.z))
    }

    #[inline]
    pub fn max(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x.max(rhs.x), self.y.max(rhs.y), self.z.max(rhs.z))
    }

    /// Component-wise clamp into `[lo, hi]` (inclusive on both ends).
    #[inline]
    pub fn clamp(self, lo: IVec3, hi: IVec3) -> IVec3 {
        self.max(lo).min(hi)
    }

    /// Product of the components, widened to `i64` and saturating at its limits.
    #[inline]
    pub fn product(self) -> i64 {
        i64::from(self.x)
            .saturating_mul(i64::from(self.y))
            .saturating_mul(i64::from(self.z))
    }

    #[inline]
    pub fn checked_add(self, rhs: IVec3) -> Option<IVec3> {
        Some(IVec3::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
            self.z.checked_add(rhs.z)?,
        ))
    }

    #[inline]
    pub fn checked_sub(self, rhs: IVec3) -> Option<IVec3> {
        Some(IVec3::new(
            self.x.checked_sub(rhs.x)?,
            self.y.checked_sub(rhs.y)?,
            self.z.checked_sub(rhs.z)?,
        ))
    }

    #[inline]
    pub fn checked_mul(self, rhs: i32) -> Option<IVec3> {
        Some(IVec3::new(
            self.x.checked_mul(rhs)?,
            self.y.checked_mul(rhs)?,
            self.z.checked_mul(rhs)?,
        ))
    }

    #[inline]
    pub fn saturating_add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }

    /// Axis holding the largest component. Ties resolve to the earliest axis (X, then Y, then Z).
    pub fn longest_axis(self) -> Axis {
        let mut best = Axis::X;
        for axis in [Axis::Y, Axis::Z] {
            if self.get(axis) > self.get(best) {
                best = axis;
            }
        }
        best
    }

    #[inline]
    pub fn all_ge(self, rhs: IVec3) -> bool {
        self.x >= rhs.x && self.y >= rhs.y && self.z >= rhs.z
    }

    #[inline]
    pub fn all_le(self, rhs: IVec3) -> bool {
        self.x <= rhs.x && self.y <= rhs.y && self.z <= rhs.z
    }
}

impl Index<Axis> for IVec3 {
    type Output = i32;
    #[inline]
    fn index(&self, axis: Axis) -> &i32 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    #[inline]
    fn add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for IVec3 {
    #[inline]
    fn add_assign(&mut self, rhs: IVec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    #[inline]
    fn sub(self, rhs: IVec3) -> IVec3 {
        IVec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for IVec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: IVec3) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Neg for IVec3 {
    type Output = IVec3;
    #[inline]
    fn neg(self) -> IVec3 {
        IVec3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<i32> for IVec3 {
    type Output = IVec3;
    #[inline]
    fn mul(self, rhs: i32) -> IVec3 {
        IVec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

// Arithmetic shift: floors toward negative infinity, so chunk addressing stays
// consistent on the negative side of the origin.
impl Shr<u32> for IVec3 {
    type Output = IVec3;
    #[inline]
    fn shr(self, rhs: u32) -> IVec3 {
        IVec3::new(self.x >> rhs, self.y >> rhs, self.z >> rhs)
    }
}

impl Shl<u32> for IVec3 {
    type Output = IVec3;
    #[inline]
    fn shl(self, rhs: u32) -> IVec3 {
        IVec3::new(self.x << rhs, self.y << rhs, self.z << rhs)
    }
}

impl BitAnd<i32> for IVec3 {
    type Output = IVec3;
    #[inline]
    fn bitand(self, rhs: i32) -> IVec3 {
        IVec3::new(self.x & rhs, self.y & rhs, self.z & rhs)
    }
}

impl From<(i32, i32, i32)> for IVec3 {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<IVec3> for (i32, i32, i32) {
    fn from(value: IVec3) -> Self {
        (value.x, value.y, value.z)
    }
}

impl core::fmt::Display for IVec3 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
