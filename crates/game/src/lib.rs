//! Tether Game Logic
//!
//! This crate wires the physics crate into a playable loop:
//!
//! - Level construction (static boxes, checkpoints, the player)
//! - Input mapping and mouse-look
//! - Fixed-timestep clock with pause and resume
//! - Gameplay feedback events (tether, checkpoints, death)
//! - JSON configuration loading
//!
//! # Architecture
//!
//! The simulation is deterministic: the same inputs and frame times always
//! produce the same state. Rendering and audio only observe it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Game Simulation                        │
//! │  ┌─────────┐    ┌───────────┐    ┌───────────────────────┐  │
//! │  │ Frame   │───►│ Fixed     │───►│ Tick                  │  │
//! │  │ input   │    │ timestep  │    │ (collision, movement, │  │
//! │  └─────────┘    └───────────┘    │  checkpoints)         │  │
//! │                                  └──────────┬────────────┘  │
//! │                                             ▼               │
//! │                                      Feedback sink          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod events;
pub mod input;
pub mod level;
pub mod simulation;

// Re-export main types
pub use clock::FixedTimestep;
pub use config::{ConfigError, GameConfig, LoopConfig};
pub use events::{FeedbackSink, GameEvent, LogSink};
pub use input::{PlayerInput, ViewControls};
pub use level::{Level, LevelBuilder, LevelError};
pub use simulation::Simulation;

// Re-export physics types for convenience
pub use tether_physics::{GrappleConfig, MovementConfig, MovementMode, PlayerCommand};
