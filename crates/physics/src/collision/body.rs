//! Physics component payload.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::mesh::Mesh;
use crate::scene::Transform;

/// Whether a body can be moved by collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable level geometry.
    Static,
    /// Pushed out of static geometry and apart from other dynamic bodies.
    Dynamic,
}

/// A collidable box attached to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub kind: BodyKind,
    /// Box relative to the owner's position. Never rotated or scaled.
    pub bounding_box: Aabb,
    /// Units per second.
    pub velocity: Vec3,
}

impl PhysicsBody {
    /// Create a body at rest.
    pub fn new(kind: BodyKind, bounding_box: Aabb) -> Self {
        Self {
            kind,
            bounding_box,
            velocity: Vec3::ZERO,
        }
    }

    /// Create a body whose box encloses `mesh` under the owner's transform.
    ///
    /// The mesh is rotated and scaled by the transform, then the box is taken
    /// relative to the transform's position.
    pub fn from_mesh(kind: BodyKind, mesh: &Mesh, transform: &Transform) -> Self {
        let matrix = transform.matrix();
        let mut bounding_box = Aabb::EMPTY;
        bounding_box.set_from_points(mesh.vertices.iter().map(|&v| matrix.transform_point3(v) - transform.position));
        Self::new(kind, bounding_box)
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    /// Move the owner by `velocity * dt`.
    pub fn integrate(&self, transform: &mut Transform, dt: f32) {
        transform.position += self.velocity * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_box_from_rotated_mesh() {
        let mesh = Mesh::cuboid(2.0, 4.0, 6.0);
        let transform = Transform {
            position: Vec3::new(100.0, 0.0, 0.0),
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            scale: Vec3::ONE,
        };

        let body = PhysicsBody::from_mesh(BodyKind::Static, &mesh, &transform);
        let size = body.bounding_box.size();
        assert!((size - Vec3::new(6.0, 4.0, 2.0)).length() < 1e-4, "size {size:?}");
        assert!(body.bounding_box.center().length() < 1e-4);
    }

    #[test]
    fn test_integrate() {
        let mut body = PhysicsBody::new(BodyKind::Dynamic, Aabb::from_size(Vec3::ONE));
        body.velocity = Vec3::new(0.0, -120.0, 0.0);

        let mut transform = Transform::default();
        body.integrate(&mut transform, 0.5);
        assert_eq!(transform.position, Vec3::new(0.0, -60.0, 0.0));
    }
}
