//! Triangle meshes supplied by the geometry provider.
//!
//! The core never builds level geometry itself beyond [`Mesh::cuboid`]; it
//! only reads vertex positions and index triples for ray casts and bounds.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;

/// Indexed triangle list in an entity's local space.
///
/// Faces wind counter-clockwise when seen from outside (front faces).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Vertex index triples.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    /// Create a mesh from raw parts.
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// An axis-aligned box centered on the origin with outward-facing triangles.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        let hd = depth / 2.0;

        let vertices = vec![
            // +X side
            Vec3::new(hw, hh, hd),
            Vec3::new(hw, hh, -hd),
            Vec3::new(hw, -hh, hd),
            Vec3::new(hw, -hh, -hd),
            // -X side, z order reversed
            Vec3::new(-hw, hh, -hd),
            Vec3::new(-hw, hh, hd),
            Vec3::new(-hw, -hh, -hd),
            Vec3::new(-hw, -hh, hd),
        ];

        let faces = vec![
            [0, 2, 1],
            [2, 3, 1],
            [4, 6, 5],
            [6, 7, 5],
            [4, 5, 1],
            [5, 0, 1],
            [7, 6, 2],
            [6, 3, 2],
            [5, 7, 0],
            [7, 2, 0],
            [1, 3, 4],
            [3, 6, 4],
        ];

        Self { vertices, faces }
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
        self
    }

    /// Local-space bounds of all vertices.
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::EMPTY;
        bounds.set_from_points(self.vertices.iter().copied());
        bounds
    }

    /// Iterate triangles as `(face_index, [a, b, c])`.
    ///
    /// Faces referencing missing vertices are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, [Vec3; 3])> + '_ {
        self.faces.iter().enumerate().filter_map(|(index, face)| {
            let a = *self.vertices.get(face[0] as usize)?;
            let b = *self.vertices.get(face[1] as usize)?;
            let c = *self.vertices.get(face[2] as usize)?;
            Some((index, [a, b, c]))
        })
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}
