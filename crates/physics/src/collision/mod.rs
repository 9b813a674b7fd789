//! Box-vs-box collision for scene bodies.
//!
//! Resolution is purely positional and runs once per tick: there is no
//! contact manifold, no impulse solver and no swept test. Fast bodies can
//! tunnel through thin geometry.
//!
//! # Key Types
//!
//! - [`PhysicsBody`]: the physics component payload (kind, local box, velocity)
//! - [`CollisionEngine`]: all-pairs broad phase plus minimum-axis resolution
//! - [`CollisionStats`]: counters from one [`CollisionEngine::resolve`] pass
//!
//! # Resolution policy
//!
//! | Pair              | Positions                          | Velocities            |
//! |-------------------|------------------------------------|-----------------------|
//! | static / static   | skipped                            | skipped               |
//! | static / dynamic  | dynamic pushed by `overclip * pen` | dynamic clipped       |
//! | dynamic / dynamic | each pushed by half                | unchanged             |

mod body;
mod engine;

pub use body::{BodyKind, PhysicsBody};
pub use engine::{penetration, CollisionConfig, CollisionEngine, CollisionStats};
