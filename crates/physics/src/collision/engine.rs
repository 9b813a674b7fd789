//! All-pairs broad phase and minimum-axis box resolution.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::body::BodyKind;
use crate::aabb::Aabb;
use crate::math::{self, Vec3Ext};
use crate::scene::{BodyHandle, Scene};

/// Collision resolution tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Fraction of the penetration applied when pushing out of static geometry.
    pub overclip: f32,
    /// Overbounce for the velocity clip against the push normal.
    pub velocity_overbounce: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            overclip: 0.999,
            velocity_overbounce: 1.0,
        }
    }
}

/// Counters from one resolve pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub pairs_tested: usize,
    pub pairs_resolved: usize,
    pub static_pairs_skipped: usize,
}

/// Separation vector that moves `a` out of `b` along the shallowest axis.
///
/// An axis only counts as penetrating when both its sides overlap. On ties
/// the later axis wins (z over y over x). Boxes that merely touch produce a
/// zero component on the touching axis.
pub fn penetration(a: &Aabb, b: &Aabb) -> Vec3 {
    // d0 is the overlap on a's negative side, d1 on its positive side.
    let axis = |a_min: f32, a_max: f32, b_min: f32, b_max: f32| {
        let d0 = b_max - a_min;
        let d1 = a_max - b_min;
        if d0 > 0.0 && d1 > 0.0 {
            if d0 < d1 { d0 } else { -d1 }
        } else {
            0.0
        }
    };

    let dx = axis(a.min.x, a.max.x, b.min.x, b.max.x);
    let dy = axis(a.min.y, a.max.y, b.min.y, b.max.y);
    let dz = axis(a.min.z, a.max.z, b.min.z, b.max.z);

    let (adx, ady, adz) = (dx.abs(), dy.abs(), dz.abs());

    if adx < ady && adx < adz {
        Vec3::new(dx, 0.0, 0.0)
    } else if ady < adz {
        Vec3::new(0.0, dy, 0.0)
    } else {
        Vec3::new(0.0, 0.0, dz)
    }
}

/// Resolves overlaps between scene bodies.
#[derive(Debug, Clone, Default)]
pub struct CollisionEngine {
    pub config: CollisionConfig,
}

impl CollisionEngine {
    pub fn new(config: CollisionConfig) -> Self {
        Self { config }
    }

    /// Run one resolution pass over `bodies`.
    ///
    /// Pairs are visited in order `(i, j)` with `i < j`, and each resolution
    /// is visible to the pairs after it. Static/static pairs are skipped and
    /// the scan continues.
    pub fn resolve(&self, scene: &mut Scene, bodies: &[BodyHandle]) -> CollisionStats {
        let mut stats = CollisionStats::default();

        for (i, &handle_a) in bodies.iter().enumerate() {
            for &handle_b in &bodies[i + 1..] {
                let (Some(kind_a), Some(kind_b)) = (
                    scene.body(handle_a).map(|b| b.kind),
                    scene.body(handle_b).map(|b| b.kind),
                ) else {
                    continue;
                };

                if kind_a == BodyKind::Static && kind_b == BodyKind::Static {
                    stats.static_pairs_skipped += 1;
                    continue;
                }

                let (Some(box_a), Some(box_b)) = (scene.world_box(handle_a), scene.world_box(handle_b)) else {
                    continue;
                };

                stats.pairs_tested += 1;
                if !box_a.overlaps_box(&box_b) {
                    continue;
                }

                let pen = penetration(&box_a, &box_b);
                log::trace!(
                    "resolve {:?} vs {:?}: penetration {:?}",
                    handle_a.entity,
                    handle_b.entity,
                    pen
                );

                match (kind_a, kind_b) {
                    (BodyKind::Static, _) => self.push_out(scene, handle_b, -pen),
                    (_, BodyKind::Static) => self.push_out(scene, handle_a, pen),
                    _ => {
                        let half = pen * 0.5;
                        Self::shift(scene, handle_a, half);
                        Self::shift(scene, handle_b, -half);
                    }
                }

                stats.pairs_resolved += 1;
            }
        }

        stats
    }

    /// Push a dynamic body out of static geometry and clip its velocity.
    fn push_out(&self, scene: &mut Scene, handle: BodyHandle, pen: Vec3) {
        Self::shift(scene, handle, pen * self.config.overclip);

        let normal = math::safe_normalize(pen);
        if let Some(body) = scene.body_mut(handle) {
            body.velocity.clip(normal, self.config.velocity_overbounce);
        }
    }

    fn shift(scene: &mut Scene, handle: BodyHandle, offset: Vec3) {
        if let Some(entity) = scene.get_mut(handle.entity) {
            entity.transform.position += offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::PhysicsBody;
    use crate::scene::{ComponentKind, Transform};

    fn add_body(scene: &mut Scene, kind: BodyKind, position: Vec3, size: Vec3) -> BodyHandle {
        let entity = scene.spawn(scene.root(), Transform::from_position(position)).unwrap();
        scene.add_component(entity, ComponentKind::Physics(PhysicsBody::new(kind, Aabb::from_size(size))));
        scene.body_handle(entity).unwrap()
    }

    #[test]
    fn test_penetration_picks_minimum_axis() {
        let a = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));
        let b = Aabb::new(Vec3::new(4.0, -5.0, -5.0), Vec3::new(14.0, 5.0, 5.0));
        assert_eq!(penetration(&a, &b), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(penetration(&b, &a), Vec3::new(1.0, 0.0, 0.0));

        let above = Aabb::new(Vec3::new(-5.0, 4.5, -5.0), Vec3::new(5.0, 20.0, 5.0));
        assert_eq!(penetration(&a, &above), Vec3::new(0.0, -0.5, 0.0));
    }

    #[test]
    fn test_penetration_degenerate_box() {
        let a = Aabb::new(Vec3::splat(-5.0), Vec3::splat(5.0));
        let flat = Aabb::new(Vec3::new(0.0, -1.0, -1.0), Vec3::new(0.0, 1.0, 1.0));
        let pen = penetration(&a, &flat);
        assert!(pen.is_finite());
    }

    #[test]
    fn test_dynamic_pushed_out_of_static() {
        for static_first in [true, false] {
            let mut scene = Scene::new();
            let (player, wall) = if static_first {
                let wall = add_body(&mut scene, BodyKind::Static, Vec3::new(9.0, 0.0, 0.0), Vec3::splat(10.0));
                (add_body(&mut scene, BodyKind::Dynamic, Vec3::ZERO, Vec3::splat(10.0)), wall)
            } else {
                let player = add_body(&mut scene, BodyKind::Dynamic, Vec3::ZERO, Vec3::splat(10.0));
                (player, add_body(&mut scene, BodyKind::Static, Vec3::new(9.0, 0.0, 0.0), Vec3::splat(10.0)))
            };
            scene.body_mut(player).unwrap().velocity = Vec3::new(50.0, 7.0, -3.0);

            let mut bodies = Vec::new();
            scene.collect_bodies(scene.root(), &mut bodies);
            let stats = CollisionEngine::default().resolve(&mut scene, &bodies);
            assert_eq!(stats.pairs_resolved, 1);

            let position = scene.position(player.entity).unwrap();
            assert!((position.x + 0.999).abs() < 1e-4, "static_first={static_first} x={}", position.x);
            assert_eq!(position.y, 0.0);
            assert_eq!(position.z, 0.0);

            let velocity = scene.body(player).unwrap().velocity;
            assert!(velocity.x.abs() < 1e-5, "velocity {velocity:?}");
            assert_eq!(velocity.y, 7.0);
            assert_eq!(velocity.z, -3.0);

            assert_eq!(scene.position(wall.entity).unwrap(), Vec3::new(9.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_dynamic_pair_splits_push() {
        let mut scene = Scene::new();
        let a = add_body(&mut scene, BodyKind::Dynamic, Vec3::ZERO, Vec3::splat(10.0));
        let b = add_body(&mut scene, BodyKind::Dynamic, Vec3::new(8.0, 0.0, 0.0), Vec3::splat(10.0));
        scene.body_mut(a).unwrap().velocity = Vec3::X * 10.0;

        CollisionEngine::default().resolve(&mut scene, &[a, b]);

        assert!((scene.position(a.entity).unwrap().x + 1.0).abs() < 1e-5);
        assert!((scene.position(b.entity).unwrap().x - 9.0).abs() < 1e-5);
        assert_eq!(scene.body(a).unwrap().velocity, Vec3::X * 10.0);
    }

    #[test]
    fn test_touching_boxes_are_left_alone() {
        let mut scene = Scene::new();
        let floor = add_body(&mut scene, BodyKind::Static, Vec3::ZERO, Vec3::splat(10.0));
        let player = add_body(&mut scene, BodyKind::Dynamic, Vec3::new(0.0, 10.0, 0.0), Vec3::splat(10.0));

        let stats = CollisionEngine::default().resolve(&mut scene, &[floor, player]);
        assert_eq!(stats.pairs_tested, 1);
        assert_eq!(stats.pairs_resolved, 0);
        assert_eq!(scene.position(player.entity).unwrap(), Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_static_pair_skips_only_that_pair() {
        let mut scene = Scene::new();
        let floor = add_body(&mut scene, BodyKind::Static, Vec3::ZERO, Vec3::new(100.0, 10.0, 100.0));
        let wall = add_body(&mut scene, BodyKind::Static, Vec3::new(0.0, 5.0, 0.0), Vec3::splat(10.0));
        let player = add_body(&mut scene, BodyKind::Dynamic, Vec3::new(40.0, 9.0, 0.0), Vec3::splat(10.0));

        let stats = CollisionEngine::default().resolve(&mut scene, &[floor, wall, player]);
        assert_eq!(stats.static_pairs_skipped, 1);
        assert_eq!(stats.pairs_resolved, 1);

        // Player sinks 1 unit into the floor and is pushed back up.
        let position = scene.position(player.entity).unwrap();
        assert!((position.y - (9.0 + 0.999)).abs() < 1e-4, "y={}", position.y);
    }
}
