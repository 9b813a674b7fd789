//! Entity hierarchy and component composition.
//!
//! A [`Scene`] owns every [`Entity`] in an arena. Parents own their children:
//! destroying an entity destroys its whole subtree. Behavior is attached as
//! [`Component`]s; there is no entity type hierarchy.
//!
//! World matrices are computed by [`Scene::update_world_matrices`], a
//! deterministic pre-pass that runs once per tick before collision and
//! movement read them.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::collision::PhysicsBody;
use crate::math;
use crate::mesh::Mesh;

/// Index of an entity in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Scene-unique component identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

/// Reference to one physics component: its owner and slot in the owner's list.
///
/// Handles are collected once per tick and are not stable across
/// component removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub entity: EntityId,
    pub slot: usize,
}

/// Local transform of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// A transform at `position` with no rotation and unit scale.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        math::compose(self.position, self.orientation, self.scale)
    }
}

/// A box volume that reports overlap but never collides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TriggerVolume {
    /// Bounds relative to the owner's position.
    pub bounds: Aabb,
    /// Caller-defined tag (checkpoint index, hazard id...).
    pub tag: u32,
}

/// The capabilities a component can carry.
#[derive(Debug, Clone)]
pub enum ComponentKind {
    /// A collidable body; integrates velocity into the owner's position.
    Physics(PhysicsBody),
    /// A trigger volume; no per-tick update.
    Trigger(TriggerVolume),
}

impl ComponentKind {
    /// Advance this component by `dt` seconds.
    fn update(&mut self, transform: &mut Transform, dt: f32) {
        match self {
            ComponentKind::Physics(body) => body.integrate(transform, dt),
            ComponentKind::Trigger(_) => {}
        }
    }
}

/// A behavior attached to at most one entity.
#[derive(Debug, Clone)]
pub struct Component {
    id: ComponentId,
    owner: Option<EntityId>,
    pub kind: ComponentKind,
}

impl Component {
    /// Identity used for duplicate detection.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// The entity this component is attached to, if any.
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// The physics body, if this is a physics component.
    pub fn as_physics(&self) -> Option<&PhysicsBody> {
        match &self.kind {
            ComponentKind::Physics(body) => Some(body),
            _ => None,
        }
    }

    /// The physics body, if this is a physics component.
    pub fn as_physics_mut(&mut self) -> Option<&mut PhysicsBody> {
        match &mut self.kind {
            ComponentKind::Physics(body) => Some(body),
            _ => None,
        }
    }

    /// The trigger volume, if this is a trigger component.
    pub fn as_trigger(&self) -> Option<&TriggerVolume> {
        match &self.kind {
            ComponentKind::Trigger(trigger) => Some(trigger),
            _ => None,
        }
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Local transform relative to the parent.
    pub transform: Transform,
    /// Optional triangle mesh for ray casts (and the renderer).
    pub mesh: Option<Mesh>,
    /// Whether the renderer should draw this entity.
    pub visible: bool,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    components: Vec<Component>,
    matrix_world: Mat4,
}

impl Entity {
    fn new(transform: Transform, parent: Option<EntityId>) -> Self {
        Self {
            transform,
            mesh: None,
            visible: true,
            parent,
            children: Vec::new(),
            components: Vec::new(),
            matrix_world: transform.matrix(),
        }
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// World matrix as of the last [`Scene::update_world_matrices`].
    pub fn matrix_world(&self) -> &Mat4 {
        &self.matrix_world
    }

    /// Check whether a component with this identity is attached.
    pub fn has_component(&self, id: ComponentId) -> bool {
        self.components.iter().any(|c| c.id == id)
    }

    /// First physics body attached to this entity.
    pub fn physics(&self) -> Option<&PhysicsBody> {
        self.components.iter().find_map(Component::as_physics)
    }

    /// Slot of the first physics body attached to this entity.
    pub fn physics_slot(&self) -> Option<usize> {
        self.components.iter().position(|c| c.as_physics().is_some())
    }
}

/// Arena of entities rooted at a single root node.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: Vec<Option<Entity>>,
    root: EntityId,
    next_component_id: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene containing only the root entity.
    pub fn new() -> Self {
        Self {
            entities: vec![Some(Entity::new(Transform::default(), None))],
            root: EntityId(0),
            next_component_id: 0,
        }
    }

    /// The root entity.
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Number of live entities, root included.
    pub fn entity_count(&self) -> usize {
        self.entities.iter().filter(|e| e.is_some()).count()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0 as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id.0 as usize)?.as_mut()
    }

    /// Add an entity under `parent`. Returns `None` if the parent is gone.
    pub fn spawn(&mut self, parent: EntityId, transform: Transform) -> Option<EntityId> {
        self.get(parent)?;

        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Some(Entity::new(transform, Some(parent))));

        if let Some(parent_entity) = self.get_mut(parent) {
            parent_entity.children.push(id);
        }

        Some(id)
    }

    /// Destroy an entity and its whole subtree. The root cannot be destroyed.
    ///
    /// Returns the number of entities removed.
    pub fn destroy(&mut self, id: EntityId) -> usize {
        if id == self.root {
            return 0;
        }

        let Some(entity) = self.get(id) else {
            return 0;
        };

        if let Some(parent) = entity.parent {
            if let Some(parent_entity) = self.get_mut(parent) {
                parent_entity.children.retain(|&child| child != id);
            }
        }

        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(entity) = self.entities.get_mut(next.0 as usize).and_then(Option::take) {
                pending.extend(entity.children);
                removed += 1;
            }
        }
        removed
    }

    /// Create an unattached component with a fresh identity.
    pub fn create_component(&mut self, kind: ComponentKind) -> Component {
        let id = ComponentId(self.next_component_id);
        self.next_component_id += 1;
        Component {
            id,
            owner: None,
            kind,
        }
    }

    /// Attach a component. Attaching one already present is a no-op.
    ///
    /// Returns the component's identity, or `None` if the entity is gone.
    pub fn attach(&mut self, entity: EntityId, mut component: Component) -> Option<ComponentId> {
        let target = self.get_mut(entity)?;
        let id = component.id;

        if !target.has_component(id) {
            component.owner = Some(entity);
            target.components.push(component);
        }

        Some(id)
    }

    /// Create and attach a component in one step.
    pub fn add_component(&mut self, entity: EntityId, kind: ComponentKind) -> Option<ComponentId> {
        let component = self.create_component(kind);
        self.attach(entity, component)
    }

    /// Detach a component, clearing its back-reference to the owner.
    pub fn detach(&mut self, entity: EntityId, id: ComponentId) -> Option<Component> {
        let target = self.get_mut(entity)?;
        let index = target.components.iter().position(|c| c.id == id)?;
        let mut component = target.components.remove(index);
        component.owner = None;
        Some(component)
    }

    /// Run every component's update on every entity, parents before children.
    pub fn update(&mut self, dt: f32) {
        for slot in &mut self.entities {
            let Some(entity) = slot else {
                continue;
            };
            let Entity {
                transform,
                components,
                ..
            } = entity;
            for component in components.iter_mut() {
                component.kind.update(transform, dt);
            }
        }
    }

    /// Recompute every world matrix from local transforms.
    pub fn update_world_matrices(&mut self) {
        let mut pending = vec![(self.root, Mat4::IDENTITY)];

        while let Some((id, parent_world)) = pending.pop() {
            let Some(entity) = self.get_mut(id) else {
                continue;
            };
            entity.matrix_world = parent_world * entity.transform.matrix();
            let world = entity.matrix_world;
            pending.extend(entity.children.iter().rev().map(|&child| (child, world)));
        }
    }

    /// Visit `start` and its descendants depth-first, parents before children.
    pub fn traverse(&self, start: EntityId, mut visit: impl FnMut(EntityId, &Entity)) {
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            if let Some(entity) = self.get(id) {
                visit(id, entity);
                pending.extend(entity.children.iter().rev().copied());
            }
        }
    }

    /// Collect every physics component under `start` into `out` (cleared first).
    pub fn collect_bodies(&self, start: EntityId, out: &mut Vec<BodyHandle>) {
        out.clear();
        self.traverse(start, |entity, node| {
            for (slot, component) in node.components.iter().enumerate() {
                if component.as_physics().is_some() {
                    out.push(BodyHandle { entity, slot });
                }
            }
        });
    }

    /// Collect every trigger under `start` into `out` (cleared first).
    pub fn collect_triggers(&self, start: EntityId, out: &mut Vec<(EntityId, TriggerVolume)>) {
        out.clear();
        self.traverse(start, |entity, node| {
            out.extend(node.components.iter().filter_map(Component::as_trigger).map(|t| (entity, *t)));
        });
    }

    /// Physics body behind a handle.
    pub fn body(&self, handle: BodyHandle) -> Option<&PhysicsBody> {
        self.get(handle.entity)?.components.get(handle.slot)?.as_physics()
    }

    /// Physics body behind a handle.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut PhysicsBody> {
        self.get_mut(handle.entity)?.components.get_mut(handle.slot)?.as_physics_mut()
    }

    /// Handle of an entity's first physics body.
    pub fn body_handle(&self, entity: EntityId) -> Option<BodyHandle> {
        let slot = self.get(entity)?.physics_slot()?;
        Some(BodyHandle { entity, slot })
    }

    /// Local position of an entity.
    pub fn position(&self, id: EntityId) -> Option<Vec3> {
        self.get(id).map(|e| e.transform.position)
    }

    /// Set the local position of an entity.
    pub fn set_position(&mut self, id: EntityId, position: Vec3) {
        if let Some(entity) = self.get_mut(id) {
            entity.transform.position = position;
        }
    }

    /// World position: the local position carried through the parent's world matrix.
    ///
    /// Bodies are expected to hang under unrotated, unscaled parents, so
    /// pushing the local position moves the world position by the same amount.
    pub fn world_position(&self, id: EntityId) -> Option<Vec3> {
        let entity = self.get(id)?;
        let local = entity.transform.position;
        Some(match entity.parent.and_then(|p| self.get(p)) {
            Some(parent) => parent.matrix_world.transform_point3(local),
            None => local,
        })
    }

    /// A body's local box translated to its owner's world position.
    pub fn world_box(&self, handle: BodyHandle) -> Option<Aabb> {
        let body = self.body(handle)?;
        let position = self.world_position(handle.entity)?;
        Some(body.bounding_box.translated(position))
    }
}
