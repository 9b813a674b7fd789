//! Player movement controller.
//!
//! This is the main entry point for player movement. It reads the tick's
//! command, updates the player's velocity on its physics body and runs the
//! tether state machine. Position is integrated later by the body's
//! component update.

use glam::Vec3;

use crate::math::{self, Vec3Ext};
use crate::ray::Ray;
use crate::scene::{BodyHandle, Scene};

use super::config::{GrappleConfig, MovementConfig};
use super::state::{GrappleState, MovementEvent, MovementFlags, PlayerState};

/// Player movement controller.
///
/// Handles:
/// - Ground detection against every other body
/// - Friction, ground and air acceleration, gravity
/// - Edge-triggered jumping
/// - Tether fire, flight, pull, release and resource
///
/// # Example
///
/// ```ignore
/// let controller = PlayerController::new(MovementConfig::default(), GrappleConfig::default());
/// let mut events = Vec::new();
///
/// // Each tick, after collision resolution:
/// controller.update(&mut player, &mut scene, &bodies, dt, &mut events);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    /// Movement configuration.
    pub config: MovementConfig,
    /// Tether configuration.
    pub grapple: GrappleConfig,
}

impl PlayerController {
    /// Create a new player controller with the given configuration.
    pub fn new(config: MovementConfig, grapple: GrappleConfig) -> Self {
        Self { config, grapple }
    }

    /// Update player movement for one tick.
    ///
    /// # Arguments
    ///
    /// * `player` - The player's movement state (will be modified)
    /// * `scene` - World matrices must be current
    /// * `bodies` - Every body in the world, the player's included
    /// * `dt` - Tick length in seconds
    /// * `events` - Tether notifications are appended here
    pub fn update(
        &self,
        player: &mut PlayerState,
        scene: &mut Scene,
        bodies: &[BodyHandle],
        dt: f32,
        events: &mut Vec<MovementEvent>,
    ) {
        let Some(mut velocity) = scene.body(player.body).map(|b| b.velocity) else {
            log::warn!("player body {:?} missing, skipping movement", player.body);
            return;
        };

        // Not holding jump
        if player.command.up < self.config.jump_threshold {
            player.flags.set(MovementFlags::JUMP_HELD, false);
        }

        let view = player.view;
        player.set_view(view);

        self.check_ground(player, scene, bodies);

        if player.grapple == GrappleState::Pull {
            self.grapple_move(player, scene, &mut velocity);
            // Limited wiggle on top of the pull
            self.air_move(player, &mut velocity, dt);
        } else if player.on_ground {
            self.walk_move(player, &mut velocity, dt);
        } else {
            self.air_move(player, &mut velocity, dt);
        }

        self.check_ground(player, scene, bodies);

        if let Some(body) = scene.body_mut(player.body) {
            body.velocity = velocity;
        }

        self.update_grapple(player, scene, bodies, dt, events);
    }

    // ========================================================================
    // Ground Detection
    // ========================================================================

    /// Probe a box just below the player's box against every other body.
    fn check_ground(&self, player: &mut PlayerState, scene: &Scene, bodies: &[BodyHandle]) {
        player.on_ground = false;
        player.ground_normal = Vec3::Y;

        // Pulling never counts as grounded.
        if player.grapple == GrappleState::Pull {
            return;
        }

        let Some(mut probe) = scene.world_box(player.body) else {
            return;
        };
        probe.translate(Vec3::new(0.0, -self.config.ground_probe, 0.0));

        player.on_ground = bodies
            .iter()
            .filter(|&&handle| handle != player.body)
            .filter_map(|&handle| scene.world_box(handle))
            .any(|other| probe.overlaps_box(&other));
    }

    // ========================================================================
    // Ground Movement
    // ========================================================================

    fn walk_move(&self, player: &mut PlayerState, velocity: &mut Vec3, dt: f32) {
        if self.check_jump(player, velocity) {
            self.air_move(player, velocity, dt);
            return;
        }

        apply_friction(velocity, true, self.config.stop_speed, self.config.friction, dt);

        // Project the view onto the ground plane
        let normal = player.ground_normal;
        let overbounce = self.config.ground_overbounce;
        let mut forward = player.view_forward;
        forward.y = 0.0;
        forward.clip(normal, overbounce).normalize_safe();
        let mut right = player.view_right;
        right.y = 0.0;
        right.clip(normal, overbounce).normalize_safe();

        let (wish_direction, wish_speed) = self.wish_velocity(player, forward, right);
        accelerate(velocity, wish_direction, wish_speed, self.config.ground_acceleration, dt);

        velocity.clip(normal, overbounce);
    }

    /// Jump only on the tick the button goes down.
    fn check_jump(&self, player: &mut PlayerState, velocity: &mut Vec3) -> bool {
        if player.command.up < self.config.jump_threshold {
            return false;
        }

        if player.flags.has(MovementFlags::JUMP_HELD) {
            player.command.up = 0.0;
            return false;
        }

        player.on_ground = false;
        player.flags.set(MovementFlags::JUMP_HELD, true);
        velocity.y = self.config.jump_velocity;

        log::trace!("jump");
        true
    }

    // ========================================================================
    // Air Movement
    // ========================================================================

    fn air_move(&self, player: &PlayerState, velocity: &mut Vec3, dt: f32) {
        apply_friction(velocity, false, self.config.stop_speed, self.config.friction, dt);

        let mut forward = player.view_forward;
        forward.y = 0.0;
        forward.normalize_safe();
        let mut right = player.view_right;
        right.y = 0.0;
        right.normalize_safe();

        let (wish_direction, wish_speed) = self.wish_velocity(player, forward, right);
        accelerate(velocity, wish_direction, wish_speed, self.config.air_acceleration, dt);

        velocity.y -= self.config.gravity * dt;
    }

    // ========================================================================
    // Shared Movement Helpers
    // ========================================================================

    /// Wish direction (unit) and wish speed for this tick.
    fn wish_velocity(&self, player: &PlayerState, forward: Vec3, right: Vec3) -> (Vec3, f32) {
        let command = &player.command;
        let scale = command.scale(self.config.speed);

        let mut wish = Vec3::ZERO;
        wish.add_scaled(forward, command.forward).add_scaled(right, command.right);

        let wish_speed = wish.length() * scale;
        (math::safe_normalize(wish), wish_speed)
    }

    // ========================================================================
    // Grapple
    // ========================================================================

    /// Steer straight at a point just short of the anchor.
    fn grapple_move(&self, player: &PlayerState, scene: &Scene, velocity: &mut Vec3) {
        let Some(position) = scene.world_position(player.body.entity) else {
            return;
        };

        let mut target = player.anchor;
        target.add_scaled(player.view_forward, -self.grapple.anchor_backoff);

        let offset = target - position;
        let distance = offset.length();
        let speed = if distance <= self.grapple.slowdown_radius {
            self.grapple.pull_gain * distance
        } else {
            self.grapple.pull_speed
        };

        *velocity = math::safe_normalize(offset) * speed;
    }

    /// Where the tether leaves the player.
    pub fn tether_start(&self, player: &PlayerState, scene: &Scene) -> Option<Vec3> {
        let position = scene.world_position(player.body.entity)?;
        let mut offset = self.grapple.tip_offset;
        offset.apply_quat(player.view);
        Some(position + offset)
    }

    fn update_grapple(
        &self,
        player: &mut PlayerState,
        scene: &Scene,
        bodies: &[BodyHandle],
        dt: f32,
        events: &mut Vec<MovementEvent>,
    ) {
        let hook_down = player.command.hook_down();
        let hook_edge = hook_down && !player.flags.has(MovementFlags::HOOK_HELD);
        player.flags.set(MovementFlags::HOOK_HELD, hook_down);

        if !hook_down {
            if player.grapple.is_active() {
                player.release_grapple();
                log::debug!("tether released");
                events.push(MovementEvent::TetherReleased { exhausted: false });
            }
        } else if hook_edge && !player.grapple.is_active() && player.grapple_resource > 0.0 {
            self.fire(player, scene, bodies, events);
        }

        if let GrappleState::Fly { tip } = player.grapple {
            let step = self.grapple.tip_speed * dt;
            let remaining = player.anchor - tip;

            if remaining.length() <= step {
                player.grapple = GrappleState::Pull;
                player.on_ground = false;
                log::debug!("tether connected at {:?}", player.anchor);
                events.push(MovementEvent::TetherConnected { anchor: player.anchor });
            } else {
                let mut tip = tip;
                tip.add_scaled(math::safe_normalize(remaining), step);
                player.grapple = GrappleState::Fly { tip };
            }
        }

        self.update_resource(player, dt, events);
    }

    /// Cast along the view and latch onto the nearest hit, if any.
    fn fire(&self, player: &mut PlayerState, scene: &Scene, bodies: &[BodyHandle], events: &mut Vec<MovementEvent>) {
        let (Some(origin), Some(start)) = (
            scene.world_position(player.body.entity),
            self.tether_start(player, scene),
        ) else {
            return;
        };

        let ray = Ray::new(origin, player.view_forward);
        let candidates = bodies
            .iter()
            .map(|handle| handle.entity)
            .filter(|&entity| entity != player.body.entity);

        let Some(hit) = ray.intersect_objects(scene, candidates).into_iter().next() else {
            log::trace!("tether missed");
            return;
        };

        player.anchor = hit.point;
        player.grapple = GrappleState::Fly { tip: start };
        log::debug!("tether fired at {:?} ({:.1} units)", hit.point, hit.distance);
        events.push(MovementEvent::TetherFired { anchor: hit.point });
    }

    /// Drain while the tether is out, regenerate while idle.
    fn update_resource(&self, player: &mut PlayerState, dt: f32, events: &mut Vec<MovementEvent>) {
        let max = self.grapple.resource_max;

        if player.grapple.is_active() {
            player.grapple_resource -= self.grapple.resource_drain * dt;
            if player.grapple_resource <= 0.0 {
                player.grapple_resource = 0.0;
                player.release_grapple();
                log::debug!("tether cut, resource exhausted");
                events.push(MovementEvent::TetherReleased { exhausted: true });
            }
        } else {
            player.grapple_resource += self.grapple.resource_regen * dt;
        }

        player.grapple_resource = player.grapple_resource.clamp(0.0, max);
    }
}

/// Quake friction.
///
/// Scales the whole velocity uniformly, so direction never flips. When
/// walking, vertical speed is ignored for the speed measurement. Nearly
/// stopped bodies have their horizontal velocity zeroed, in the air too;
/// otherwise only walking bodies lose speed.
pub fn apply_friction(velocity: &mut Vec3, walking: bool, stop_speed: f32, friction: f32, dt: f32) {
    let mut measured = *velocity;
    if walking {
        measured.y = 0.0;
    }

    let speed = measured.length();
    if speed < 1.0 {
        velocity.x = 0.0;
        velocity.z = 0.0;
        return;
    }

    if !walking {
        return;
    }

    let control = speed.max(stop_speed);
    let drop = control * friction * dt;

    let new_speed = (speed - drop).max(0.0);
    velocity.scale(new_speed / speed);
}

/// Quake acceleration toward `wish_direction`.
///
/// Never pushes the speed along `wish_direction` past `wish_speed`.
pub fn accelerate(velocity: &mut Vec3, wish_direction: Vec3, wish_speed: f32, acceleration: f32, dt: f32) {
    let current_speed = velocity.dot(wish_direction);
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return;
    }

    let accel_speed = (acceleration * dt * wish_speed).min(add_speed);
    velocity.add_scaled(wish_direction, accel_speed);
}

// ============================================================================
// Tests
// ============================================================================
