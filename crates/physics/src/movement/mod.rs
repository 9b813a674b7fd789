//! Player movement physics system.
//!
//! This module implements Quake-style movement with:
//!
//! - Ground and air movement with different acceleration
//! - Friction that only scales velocity, never flips it
//! - Edge-triggered jumping
//! - A grapple tether: fire, tip flight, pull, release and a draining resource
//!
//! # Design
//!
//! Movement is controlled by the [`PlayerController`] which takes the tick's
//! [`PlayerCommand`] and updates the player's [`PlayerState`] and the velocity
//! of its physics body. The controller never moves the body itself; the
//! body's component update integrates position afterwards.
//!
//! The mode is derived, not stored: see [`PlayerState::mode`]. The tether is
//! a [`GrappleState`] enum, so flying and pulling are mutually exclusive.

mod config;
mod controller;
mod state;

pub use config::{GrappleConfig, MovementConfig};
pub use controller::{accelerate, apply_friction, PlayerController};
pub use state::{GrappleState, MovementEvent, MovementFlags, MovementMode, PlayerCommand, PlayerState};
