//! Level construction.
//!
//! A level is a scene graph of static boxes, checkpoint triggers and one
//! dynamic player body, all hanging directly under the scene root.

use glam::Vec3;
use tether_physics::{Aabb, BodyHandle, BodyKind, ComponentKind, EntityId, Mesh, PhysicsBody, Scene, Transform, TriggerVolume};

/// Player box size (width, height, depth).
pub const PLAYER_SIZE: Vec3 = Vec3::new(30.0, 56.0, 30.0);

/// Errors raised while building a level.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("Failed to spawn {0} into the scene")]
    Spawn(&'static str),

    #[error("Level `{0}` has no player")]
    MissingPlayer(String),
}

/// A playable level.
#[derive(Debug)]
pub struct Level {
    /// Display name.
    pub name: String,

    /// All geometry, triggers and the player.
    pub scene: Scene,

    /// The player entity.
    pub player: EntityId,

    /// The player's physics body.
    pub player_body: BodyHandle,

    /// Where the player starts, and respawns until a checkpoint is reached.
    pub spawn: Vec3,

    /// Number of checkpoints; tags run from zero.
    pub checkpoint_count: u32,
}

/// Incrementally assembles a [`Level`].
#[derive(Debug)]
pub struct LevelBuilder {
    name: String,
    scene: Scene,
    player: Option<(EntityId, BodyHandle, Vec3)>,
    checkpoint_count: u32,
}

impl LevelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            scene: Scene::new(),
            player: None,
            checkpoint_count: 0,
        }
    }

    /// Add a visible, static box of full `size` centered on `position`.
    pub fn static_box(&mut self, size: Vec3, position: Vec3) -> Result<EntityId, LevelError> {
        self.spawn_box(size, position, BodyKind::Static, true, "static box")
    }

    /// Add a checkpoint trigger of full `size` centered on `center`.
    ///
    /// Returns the checkpoint's tag.
    pub fn checkpoint(&mut self, center: Vec3, size: Vec3) -> Result<u32, LevelError> {
        let root = self.scene.root();
        let entity = self
            .scene
            .spawn(root, Transform::from_position(center))
            .ok_or(LevelError::Spawn("checkpoint"))?;

        let tag = self.checkpoint_count;
        let trigger = TriggerVolume {
            bounds: Aabb::from_size(size),
            tag,
        };
        self.scene
            .add_component(entity, ComponentKind::Trigger(trigger))
            .ok_or(LevelError::Spawn("checkpoint"))?;

        self.checkpoint_count += 1;
        Ok(tag)
    }

    /// Add the player, standing with its box centered on `spawn`.
    ///
    /// Replaces any player added before.
    pub fn player(&mut self, spawn: Vec3) -> Result<EntityId, LevelError> {
        if let Some((previous, _, _)) = self.player.take() {
            self.scene.destroy(previous);
        }

        let entity = self.spawn_box(PLAYER_SIZE, spawn, BodyKind::Dynamic, false, "player")?;
        let body = self.scene.body_handle(entity).ok_or(LevelError::Spawn("player"))?;
        self.player = Some((entity, body, spawn));
        Ok(entity)
    }

    pub fn build(mut self) -> Result<Level, LevelError> {
        let (player, player_body, spawn) = self.player.ok_or_else(|| LevelError::MissingPlayer(self.name.clone()))?;
        self.scene.update_world_matrices();

        log::debug!(
            "Built level `{}`: {} entities, {} checkpoints",
            self.name,
            self.scene.entity_count(),
            self.checkpoint_count
        );

        Ok(Level {
            name: self.name,
            scene: self.scene,
            player,
            player_body,
            spawn,
            checkpoint_count: self.checkpoint_count,
        })
    }

    fn spawn_box(
        &mut self,
        size: Vec3,
        position: Vec3,
        kind: BodyKind,
        visible: bool,
        what: &'static str,
    ) -> Result<EntityId, LevelError> {
        let root = self.scene.root();
        let transform = Transform::from_position(position);
        let entity = self.scene.spawn(root, transform).ok_or(LevelError::Spawn(what))?;

        let mesh = Mesh::cuboid(size.x, size.y, size.z);
        let body = PhysicsBody::from_mesh(kind, &mesh, &transform);

        let node = self.scene.get_mut(entity).ok_or(LevelError::Spawn(what))?;
        node.mesh = Some(mesh);
        node.visible = visible;

        self.scene
            .add_component(entity, ComponentKind::Physics(body))
            .ok_or(LevelError::Spawn(what))?;
        Ok(entity)
    }
}

impl Level {
    /// The grapple test course: a floor, low walls, a walkway, three towers
    /// and a staircase of floating platforms leading up to a tall pillar.
    pub fn test_course() -> Result<Self, LevelError> {
        let mut builder = LevelBuilder::new("Test Course");

        // (size, position)
        let boxes = [
            // Floor
            ([512.0, 4.0, 512.0], [0.0, -2.0, 0.0]),
            // Low walls
            ([32.0, 56.0, 1.0], [0.0, 28.0, -128.0]),
            ([32.0, 28.0, 1.0], [-64.0, 14.0, -128.0]),
            // Walkway
            ([640.0, 8.0, 128.0], [-448.0, 28.0, 0.0]),
            // Sunken block
            ([384.0, 320.0, 512.0], [0.0, -136.0, -512.0]),
            // Crate
            ([64.0, 64.0, 64.0], [160.0, 32.0, 160.0]),
            // Towers
            ([512.0, 512.0, 512.0], [-480.0, 260.0, -512.0]),
            ([512.0, 512.0, 512.0], [480.0, 260.0, -1024.0]),
            ([512.0, 640.0, 512.0], [-480.0, 324.0, -1536.0]),
            // Pillar
            ([768.0, 2048.0, 320.0], [384.0, 1028.0, -1920.0]),
            // Steps
            ([128.0, 8.0, 128.0], [260.0, 24.0, -192.0]),
            ([128.0, 8.0, 128.0], [292.0, 40.0, -320.0]),
            ([128.0, 8.0, 128.0], [324.0, 56.0, -448.0]),
        ];
        for (size, position) in boxes {
            builder.static_box(Vec3::from_array(size), Vec3::from_array(position))?;
        }

        // Top of the steps, top of the crate, top of the pillar
        builder.checkpoint(Vec3::new(324.0, 88.0, -448.0), Vec3::new(128.0, 56.0, 128.0))?;
        builder.checkpoint(Vec3::new(160.0, 92.0, 160.0), Vec3::new(64.0, 56.0, 64.0))?;
        builder.checkpoint(Vec3::new(384.0, 2080.0, -1920.0), Vec3::new(256.0, 56.0, 256.0))?;

        builder.player(Vec3::new(0.0, 28.0, 0.0))?;
        builder.build()
    }

    /// Every checkpoint with its world-space bounds.
    pub fn checkpoints(&self, out: &mut Vec<(u32, Aabb)>) {
        out.clear();
        let mut triggers = Vec::new();
        self.scene.collect_triggers(self.scene.root(), &mut triggers);
        out.extend(triggers.into_iter().filter_map(|(entity, trigger)| {
            let position = self.scene.world_position(entity)?;
            Some((trigger.tag, trigger.bounds.translated(position)))
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_requires_player() {
        let mut builder = LevelBuilder::new("Empty");
        builder.static_box(Vec3::splat(10.0), Vec3::ZERO).unwrap();
        let err = builder.build().unwrap_err();
        assert!(matches!(err, LevelError::MissingPlayer(ref name) if name == "Empty"));
    }

    #[test]
    fn test_static_box_bounds_and_mesh() {
        let mut builder = LevelBuilder::new("Box");
        let entity = builder.static_box(Vec3::new(4.0, 2.0, 6.0), Vec3::new(10.0, 1.0, 0.0)).unwrap();
        builder.player(Vec3::new(0.0, 28.0, 0.0)).unwrap();
        let level = builder.build().unwrap();

        let handle = level.scene.body_handle(entity).unwrap();
        let body = level.scene.body(handle).unwrap();
        assert!(body.is_static());

        let world = level.scene.world_box(handle).unwrap();
        assert!((world.min - Vec3::new(8.0, 0.0, -3.0)).length() < 1e-5);
        assert!((world.max - Vec3::new(12.0, 2.0, 3.0)).length() < 1e-5);

        let node = level.scene.get(entity).unwrap();
        assert!(node.visible);
        assert_eq!(node.mesh.as_ref().map(Mesh::triangle_count), Some(12));
    }

    #[test]
    fn test_player_replaced() {
        let mut builder = LevelBuilder::new("Twice");
        let first = builder.player(Vec3::ZERO).unwrap();
        let second = builder.player(Vec3::Y).unwrap();
        let level = builder.build().unwrap();

        assert_ne!(first, second);
        assert!(level.scene.get(first).is_none());
        assert_eq!(level.player, second);
        assert_eq!(level.spawn, Vec3::Y);
    }

    #[test]
    fn test_test_course() {
        let level = Level::test_course().unwrap();
        assert_eq!(level.checkpoint_count, 3);

        let mut bodies = Vec::new();
        level.scene.collect_bodies(level.scene.root(), &mut bodies);
        // 13 static boxes plus the player
        assert_eq!(bodies.len(), 14);

        let player = level.scene.body(level.player_body).unwrap();
        assert!(player.is_dynamic());
        assert!(!level.scene.get(level.player).unwrap().visible);

        // Player stands exactly on the floor: touching, not penetrating.
        let player_box = level.scene.world_box(level.player_body).unwrap();
        assert!(player_box.min.y.abs() < 1e-4);
        let floor = level.scene.world_box(bodies[0]).unwrap();
        assert!(player_box.intersects_box(&floor));
        assert!(!player_box.overlaps_box(&floor));
    }

    #[test]
    fn test_checkpoints_in_world_space() {
        let level = Level::test_course().unwrap();
        let mut checkpoints = Vec::new();
        level.checkpoints(&mut checkpoints);

        assert_eq!(checkpoints.len(), 3);
        let (tag, bounds) = checkpoints[0];
        assert_eq!(tag, 0);
        // Sits on top of the highest step.
        assert!((bounds.min.y - 60.0).abs() < 1e-4);
        assert!(bounds.contains_point(Vec3::new(324.0, 88.0, -448.0)));
    }
}
