//! Tether Physics
//!
//! Real-time movement and collision for a grapple-tether sandbox. Everything
//! here runs inside a single fixed-length simulation tick and never fails:
//! degenerate numeric input falls back to a physically plausible value.
//!
//! # Architecture
//!
//! - **Math**: in-place, chainable helpers over `glam` vectors and quaternions
//! - **AABB**: box construction plus inclusive and exclusive overlap predicates
//! - **Scene**: entity hierarchy with composable components (physics bodies,
//!   trigger volumes) and a world-matrix pre-pass
//! - **Collision**: all-pairs AABB broad phase and minimum-axis box resolution
//! - **Ray**: slab, Möller–Trumbore and mesh queries used to aim the tether
//! - **Movement**: Quake-style player controller with a grapple state machine
//!
//! # Tick data flow
//!
//! ```text
//! scene (world matrices) ──► collect bodies ──► collision resolve
//!                                                    │
//!            ray casts ◄── player controller ◄───────┘
//!                               │
//!                               └──► component updates (integration)
//! ```

pub mod aabb;
pub mod collision;
pub mod math;
pub mod mesh;
pub mod movement;
pub mod ray;
pub mod scene;

// Re-export commonly used types
pub use aabb::Aabb;
pub use collision::{BodyKind, CollisionConfig, CollisionEngine, CollisionStats, PhysicsBody};
pub use math::{QuatExt, Vec3Ext};
pub use mesh::Mesh;
pub use movement::{
    GrappleConfig, GrappleState, MovementConfig, MovementEvent, MovementFlags, MovementMode,
    PlayerCommand, PlayerController, PlayerState,
};
pub use ray::{Ray, RayHit};
pub use scene::{BodyHandle, Component, ComponentId, ComponentKind, Entity, EntityId, Scene, Transform, TriggerVolume};
