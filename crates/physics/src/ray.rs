//! Ray queries against boxes, triangles and scene meshes.
//!
//! Used to aim the tether: the controller casts one ray per fire attempt
//! and keeps the nearest hit.

use glam::{Mat4, Vec3};

use crate::aabb::Aabb;
use crate::math::Vec3Ext;
use crate::scene::{EntityId, Scene};

/// A half-line from `origin` along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Need not be unit length for box tests; must be for triangle tests.
    pub direction: Vec3,
}

/// One ray/mesh intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: Vec3,
    /// Entity whose mesh was hit.
    pub entity: EntityId,
    /// Index of the triangle in the entity's mesh.
    pub face_index: usize,
    /// World-space distance from the ray origin.
    pub distance: f32,
}

/// Larger of two slab bounds. A NaN `current` never constrains the interval.
#[inline]
fn nan_max(candidate: f32, current: f32) -> f32 {
    if candidate > current || current.is_nan() { candidate } else { current }
}

#[inline]
fn nan_min(candidate: f32, current: f32) -> f32 {
    if candidate < current || current.is_nan() { candidate } else { current }
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform origin as a point and direction as a unit direction.
    pub fn apply_matrix4(&mut self, matrix: &Mat4) -> &mut Self {
        self.origin.apply_mat4(matrix);
        self.direction.transform_direction(matrix);
        self
    }

    /// Slab test. Returns the entry point, or the exit point when the origin
    /// is inside the box.
    ///
    /// Divisions by a zero direction component yield infinities or NaN; NaN
    /// bounds never narrow the running interval.
    pub fn intersect_box(&self, aabb: &Aabb) -> Option<Vec3> {
        let slab = |min: f32, max: f32, origin: f32, direction: f32| {
            let t0 = (min - origin) / direction;
            let t1 = (max - origin) / direction;
            if t0 > t1 { (t1, t0) } else { (t0, t1) }
        };

        let (txmin, txmax) = slab(aabb.min.x, aabb.max.x, self.origin.x, self.direction.x);
        let (tymin, tymax) = slab(aabb.min.y, aabb.max.y, self.origin.y, self.direction.y);

        if txmin > tymax || tymin > txmax {
            return None;
        }

        let mut tmin = nan_max(tymin, txmin);
        let mut tmax = nan_min(tymax, txmax);

        let (tzmin, tzmax) = slab(aabb.min.z, aabb.max.z, self.origin.z, self.direction.z);

        if tmin > tzmax || tzmin > tmax {
            return None;
        }

        tmin = nan_max(tzmin, tmin);
        tmax = nan_min(tzmax, tmax);

        if tmax < 0.0 {
            return None;
        }

        Some(self.at(if tmin >= 0.0 { tmin } else { tmax }))
    }

    /// Möller–Trumbore, single-sided.
    ///
    /// Only front faces (counter-clockwise as seen by the ray) are hit. Rays
    /// parallel to the triangle plane miss.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(edge2);

        // Front faces have a negative determinant; flip signs so the
        // barycentric tests below compare against a positive one.
        let ddn = self.direction.dot(normal);
        if ddn >= 0.0 || ddn.is_nan() {
            return None;
        }
        let det = -ddn;

        let diff = self.origin - a;
        let b1 = -self.direction.dot(diff.cross(edge2));
        if b1 < 0.0 {
            return None;
        }

        let b2 = -self.direction.dot(edge1.cross(diff));
        if b2 < 0.0 {
            return None;
        }

        if b1 + b2 > det {
            return None;
        }

        let qdn = diff.dot(normal);
        if qdn < 0.0 {
            return None;
        }

        Some(self.at(qdn / det))
    }

    /// Intersect every triangle of an entity's mesh.
    ///
    /// The ray is carried into the entity's local space through the inverse
    /// world matrix; hits are returned in world space. Meshes whose local
    /// bounds the ray misses are skipped without testing triangles.
    pub fn intersect_mesh(&self, scene: &Scene, entity: EntityId, hits: &mut Vec<RayHit>) {
        let Some(node) = scene.get(entity) else {
            return;
        };
        let Some(mesh) = node.mesh.as_ref() else {
            return;
        };

        let world = *node.matrix_world();
        let inverse = world.inverse();
        if !inverse.is_finite() {
            return;
        }

        let mut local = *self;
        local.apply_matrix4(&inverse);

        if local.intersect_box(&mesh.bounds()).is_none() {
            return;
        }

        for (face_index, [a, b, c]) in mesh.triangles() {
            if let Some(mut point) = local.intersect_triangle(a, b, c) {
                point.apply_mat4(&world);
                hits.push(RayHit {
                    point,
                    entity,
                    face_index,
                    distance: self.origin.distance(point),
                });
            }
        }
    }

    /// Intersect the meshes of every candidate, nearest hit first.
    pub fn intersect_objects(&self, scene: &Scene, candidates: impl IntoIterator<Item = EntityId>) -> Vec<RayHit> {
        let mut hits = Vec::new();
        for entity in candidates {
            self.intersect_mesh(scene, entity, &mut hits);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
