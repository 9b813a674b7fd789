//! Axis-aligned bounding boxes.
//!
//! Boxes are stored in an entity's local space and translated by the
//! entity's world position at query time. Rotation and scale are never
//! applied to a box; the narrow phase relies on that.
//!
//! Two overlap predicates exist on purpose:
//!
//! - [`Aabb::intersects_box`] / [`Aabb::contains_point`] are inclusive. Boxes
//!   sharing a face intersect. Used for trigger volumes.
//! - [`Aabb::overlaps_box`] is exclusive. Boxes sharing only a face do not
//!   overlap. Used by collision resolution, so resting contact is not
//!   treated as penetration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// The empty box: expanding it by any point yields that point.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a box from its corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box centered on `center`.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Create a box of the given full size centered on the origin.
    pub fn from_size(size: Vec3) -> Self {
        Self::from_center_half_extents(Vec3::ZERO, size * 0.5)
    }

    /// Reset to the empty box.
    pub fn make_empty(&mut self) -> &mut Self {
        *self = Self::EMPTY;
        self
    }

    /// True if no point has been added (any max below its min).
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow to include `point`.
    pub fn expand_by_point(&mut self, point: Vec3) -> &mut Self {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
        self
    }

    /// Reset, then grow to include every point.
    pub fn set_from_points<I>(&mut self, points: I) -> &mut Self
    where
        I: IntoIterator<Item = Vec3>,
    {
        self.make_empty();
        for point in points {
            self.expand_by_point(point);
        }
        self
    }

    /// Shift both corners by `offset`.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.min += offset;
        self.max += offset;
        self
    }

    /// A copy shifted by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self::new(self.min + offset, self.max + offset)
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Inclusive on all six faces.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.x <= point.x
            && point.x <= self.max.x
            && self.min.y <= point.y
            && point.y <= self.max.y
            && self.min.z <= point.z
            && point.z <= self.max.z
    }

    /// Inclusive: boxes sharing a boundary face intersect.
    #[inline]
    pub fn intersects_box(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    /// Exclusive: boxes only sharing a boundary face do not overlap.
    #[inline]
    pub fn overlaps_box(&self, other: &Aabb) -> bool {
        !(self.max.x <= other.min.x
            || self.min.x >= other.max.x
            || self.max.y <= other.min.y
            || self.min.y >= other.max.y
            || self.max.z <= other.min.z
            || self.min.z >= other.max.z)
    }
}
