//! Axis-aligned space constraints for searches and agent requests.

use glam::Vec3;

use crate::{CoreError, CoreResult};

/// An axis-aligned box limiting where searches may expand.
///
/// Two membership tests exist because the two call sites disagree on the
/// boundary itself:
///
/// | Method             | Boundary  | Used by                               |
/// |--------------------|-----------|---------------------------------------|
/// | [`contains`]       | inclusive | search neighbour filtering            |
/// | [`contains_strict`]| exclusive | agent start/target validation         |
///
/// [`contains`]: SpaceConstraints::contains
/// [`contains_strict`]: SpaceConstraints::contains_strict
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpaceConstraints {
    min: Vec3,
    max: Vec3,
}

impl SpaceConstraints {
    /// Build a constraint box.
    ///
    /// Fails with [`CoreError::InvalidConstraints`] if `min >= max` on any axis.
    pub fn new(min: Vec3, max: Vec3) -> CoreResult<Self> {
        for (axis, lo, hi) in [('x', min.x, max.x), ('y', min.y, max.y), ('z', min.z, max.z)] {
            if lo.is_nan() || hi.is_nan() || lo >= hi {
                return Err(CoreError::InvalidConstraints { axis, min: lo, max: hi });
            }
        }
        Ok(Self { min, max })
    }

    /// A cube of half-width `half_extent` centered on `center`.
    pub fn around(center: Vec3, half_extent: f32) -> CoreResult<Self> {
        let half = Vec3::splat(half_extent);
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// `true` if `p` lies inside the box or on its surface.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// `true` if `p` lies strictly inside the box.
    #[inline]
    pub fn contains_strict(&self, p: Vec3) -> bool {
        p.cmpgt(self.min).all() && p.cmplt(self.max).all()
    }
}
