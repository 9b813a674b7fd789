//! In-place vector and quaternion helpers.
//!
//! `glam` types are plain `Copy` values, so nothing here allocates. The
//! extension traits let hot paths mutate a caller-owned temporary and chain
//! further operations on it:
//!
//! ```
//! use glam::Vec3;
//! use tether_physics::Vec3Ext;
//!
//! let mut wish = Vec3::ZERO;
//! wish.add_scaled(Vec3::Z, 2.0).add_scaled(Vec3::X, 1.0).normalize_safe();
//! assert!((wish.length() - 1.0).abs() < 1e-6);
//! ```

use glam::{Mat4, Quat, Vec3};

/// Chainable in-place operations on a 3D vector.
pub trait Vec3Ext {
    /// Overwrite all three components.
    fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self;

    /// `self += v * scale`.
    fn add_scaled(&mut self, v: Vec3, scale: f32) -> &mut Self;

    /// `self *= scale`.
    fn scale(&mut self, scale: f32) -> &mut Self;

    /// Scale to unit length. A zero-length vector is left unchanged.
    fn normalize_safe(&mut self) -> &mut Self;

    /// Remove the component running into `normal`, see [`clip_velocity`].
    fn clip(&mut self, normal: Vec3, overbounce: f32) -> &mut Self;

    /// Rotate by a quaternion.
    fn apply_quat(&mut self, rotation: Quat) -> &mut Self;

    /// Transform as a point, including the perspective divide.
    fn apply_mat4(&mut self, matrix: &Mat4) -> &mut Self;

    /// Transform as a direction (upper 3x3 only) and normalize.
    fn transform_direction(&mut self, matrix: &Mat4) -> &mut Self;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        *self = Vec3::new(x, y, z);
        self
    }

    #[inline]
    fn add_scaled(&mut self, v: Vec3, scale: f32) -> &mut Self {
        *self += v * scale;
        self
    }

    #[inline]
    fn scale(&mut self, scale: f32) -> &mut Self {
        *self *= scale;
        self
    }

    #[inline]
    fn normalize_safe(&mut self) -> &mut Self {
        *self = safe_normalize(*self);
        self
    }

    #[inline]
    fn clip(&mut self, normal: Vec3, overbounce: f32) -> &mut Self {
        *self = clip_velocity(*self, normal, overbounce);
        self
    }

    #[inline]
    fn apply_quat(&mut self, rotation: Quat) -> &mut Self {
        *self = rotation * *self;
        self
    }

    #[inline]
    fn apply_mat4(&mut self, matrix: &Mat4) -> &mut Self {
        *self = matrix.project_point3(*self);
        self
    }

    #[inline]
    fn transform_direction(&mut self, matrix: &Mat4) -> &mut Self {
        *self = safe_normalize(matrix.transform_vector3(*self));
        self
    }
}

/// Chainable in-place operations on a rotation quaternion.
///
/// Every operation that could drift away from unit length renormalizes.
pub trait QuatExt {
    /// `self = self * rhs`, renormalized.
    fn multiply(&mut self, rhs: Quat) -> &mut Self;

    /// `self = lhs * self`, renormalized.
    fn premultiply(&mut self, lhs: Quat) -> &mut Self;

    /// Replace with a rotation of `angle` radians about `axis`.
    fn set_from_axis_angle(&mut self, axis: Vec3, angle: f32) -> &mut Self;
}

impl QuatExt for Quat {
    #[inline]
    fn multiply(&mut self, rhs: Quat) -> &mut Self {
        *self = safe_normalize_quat(*self * rhs);
        self
    }

    #[inline]
    fn premultiply(&mut self, lhs: Quat) -> &mut Self {
        *self = safe_normalize_quat(lhs * *self);
        self
    }

    #[inline]
    fn set_from_axis_angle(&mut self, axis: Vec3, angle: f32) -> &mut Self {
        *self = Quat::from_axis_angle(safe_normalize(axis), angle);
        self
    }
}

/// Normalize, treating a zero length as one (returns the input unchanged).
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let length = v.length();
    if length > 0.0 && length.is_finite() {
        v / length
    } else {
        v
    }
}

/// Normalize a quaternion, falling back to identity when degenerate.
#[inline]
pub fn safe_normalize_quat(q: Quat) -> Quat {
    let length = q.length();
    if length > 0.0 && length.is_finite() {
        q * (1.0 / length)
    } else {
        Quat::IDENTITY
    }
}

/// Clip velocity against a surface normal.
///
/// Removes the component of `velocity` along `normal`. An `overbounce`
/// above one pushes slightly away from the surface; exactly one leaves the
/// normal component at zero.
#[inline]
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal);

    let adjusted_backoff = if backoff < 0.0 {
        backoff * overbounce
    } else {
        backoff / overbounce
    };

    velocity - normal * adjusted_backoff
}

/// Compose a local matrix from position, orientation and scale.
#[inline]
pub fn compose(position: Vec3, orientation: Quat, scale: Vec3) -> Mat4 {
    Mat4::from_scale_rotation_translation(scale, orientation, position)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_vector_stays_finite() {
        let mut v = Vec3::ZERO;
        v.normalize_safe();
        assert_eq!(v, Vec3::ZERO);
        assert!(v.is_finite());
    }

    #[test]
    fn test_normalize_never_produces_nan() {
        let samples = [
            Vec3::ZERO,
            Vec3::new(1e-30, 0.0, 0.0),
            Vec3::new(3.0, -4.0, 12.0),
            Vec3::new(f32::MAX, f32::MAX, 0.0),
            Vec3::new(-0.0, 0.0, -0.0),
        ];
        for sample in samples {
            let n = safe_normalize(sample);
            assert!(!n.x.is_nan() && !n.y.is_nan() && !n.z.is_nan(), "{sample:?} -> {n:?}");
        }
        let n = safe_normalize(Vec3::new(3.0, -4.0, 12.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_chained_operations_mutate_target() {
        let mut v = Vec3::new(1.0, 2.0, 3.0);
        v.scale(2.0).add_scaled(Vec3::X, -2.0).add_scaled(Vec3::Y, -2.0);
        assert_eq!(v, Vec3::new(0.0, 2.0, 6.0));
    }

    #[test]
    fn test_clip_velocity_removes_normal_component() {
        let clipped = clip_velocity(Vec3::new(5.0, -10.0, 0.0), Vec3::Y, 1.0);
        assert_eq!(clipped, Vec3::new(5.0, 0.0, 0.0));

        // Overbounce pushes slightly away from the surface.
        let bounced = clip_velocity(Vec3::new(0.0, -10.0, 0.0), Vec3::Y, 1.001);
        assert!(bounced.y > 0.0 && bounced.y < 0.1);
    }

    #[test]
    fn test_quat_stays_normalized() {
        let mut q = Quat::IDENTITY;
        for _ in 0..1000 {
            q.multiply(Quat::from_rotation_y(0.01)).premultiply(Quat::from_rotation_x(0.003));
        }
        assert!((q.length() - 1.0).abs() < 1e-5);

        let mut r = Quat::IDENTITY;
        r.set_from_axis_angle(Vec3::ZERO, 1.0);
        assert!(r.is_finite());
    }

    #[test]
    fn test_transform_direction_is_unit() {
        let m = compose(Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY, Vec3::splat(4.0));
        let mut d = Vec3::new(0.0, 0.0, -1.0);
        d.transform_direction(&m);
        assert!((d - Vec3::NEG_Z).length() < 1e-6);

        let mut p = Vec3::new(1.0, 0.0, 0.0);
        p.apply_mat4(&m);
        assert!((p - Vec3::new(14.0, 0.0, 0.0)).length() < 1e-5);
    }
}
