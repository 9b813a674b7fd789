//! Movement state and input structures.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::{self, Vec3Ext};
use crate::scene::BodyHandle;

/// Edge-detection flags carried between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFlags(pub u16);

impl MovementFlags {
    /// Jump was held last tick; a new jump needs a release first.
    pub const JUMP_HELD: u16 = 1 << 1;

    /// Hook was held last tick; a new fire needs a release first.
    pub const HOOK_HELD: u16 = 1 << 2;

    /// Check if a flag is set.
    #[inline]
    pub fn has(self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// Set or clear a flag.
    #[inline]
    pub fn set(&mut self, flag: u16, value: bool) {
        if value {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

/// Tether state. Flying and pulling cannot both be active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum GrappleState {
    #[default]
    Idle,
    /// Tip travelling from the player toward the anchor.
    Fly { tip: Vec3 },
    /// Connected; the player is pulled toward the anchor.
    Pull,
}

impl GrappleState {
    #[inline]
    pub fn is_active(&self) -> bool {
        !matches!(self, GrappleState::Idle)
    }
}

/// Locomotion mode derived from ground contact and tether state.
///
/// Tether modes take precedence over ground contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    Walking,
    Airborne,
    GrappleFly,
    GrapplePull,
}

/// One tick of player input.
///
/// Axes are in `[-1, 1]`. `up` is the jump axis; `hook` is positive while
/// the tether button is down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    pub forward: f32,
    pub right: f32,
    pub up: f32,
    pub hook: f32,
}

impl PlayerCommand {
    #[inline]
    pub fn hook_down(&self) -> bool {
        self.hook > 0.0
    }

    /// Quake `cmdScale`: keeps diagonal input from moving faster than
    /// straight input, and scales with analog deflection.
    pub fn scale(&self, speed: f32) -> f32 {
        let max = self.forward.abs().max(self.right.abs()).max(self.up.abs());
        if max == 0.0 {
            return 0.0;
        }

        let total = (self.forward * self.forward + self.right * self.right + self.up * self.up).sqrt();
        speed * max / total
    }
}

/// Notifications raised by the controller during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    /// The tether left the player toward `anchor`.
    TetherFired { anchor: Vec3 },
    /// The tip reached `anchor`; pulling starts.
    TetherConnected { anchor: Vec3 },
    /// The tether was let go, or cut because the resource ran out.
    TetherReleased { exhausted: bool },
}

/// Complete movement state for the player.
///
/// Position and velocity live on the player's physics body in the scene;
/// this holds everything else the controller carries between ticks.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// The player's physics body.
    pub body: BodyHandle,

    /// Input for the current tick.
    pub command: PlayerCommand,

    pub flags: MovementFlags,

    /// Set by the ground probe. Always false while pulling.
    pub on_ground: bool,

    pub ground_normal: Vec3,

    pub grapple: GrappleState,

    /// World-space tether anchor, valid while the tether is out.
    pub anchor: Vec3,

    /// View orientation (camera quaternion).
    pub view: Quat,

    /// `view * -Z`.
    pub view_forward: Vec3,

    /// Unit vector to the right of `view_forward`, horizontal.
    pub view_right: Vec3,

    /// Grapple resource, in `[0, GrappleConfig::resource_max]`.
    pub grapple_resource: f32,
}

impl PlayerState {
    pub fn new(body: BodyHandle, grapple_resource: f32) -> Self {
        let mut state = Self {
            body,
            command: PlayerCommand::default(),
            flags: MovementFlags::default(),
            on_ground: false,
            ground_normal: Vec3::Y,
            grapple: GrappleState::Idle,
            anchor: Vec3::ZERO,
            view: Quat::IDENTITY,
            view_forward: Vec3::NEG_Z,
            view_right: Vec3::X,
            grapple_resource,
        };
        state.set_view(Quat::IDENTITY);
        state
    }

    /// Set the view orientation and derive the forward and right vectors.
    pub fn set_view(&mut self, view: Quat) {
        self.view = math::safe_normalize_quat(view);
        self.view_forward.set(0.0, 0.0, -1.0).apply_quat(self.view);
        self.view_right = Vec3::NEG_Y.cross(self.view_forward);
        self.view_right.normalize_safe();
    }

    pub fn mode(&self) -> MovementMode {
        match self.grapple {
            GrappleState::Pull => MovementMode::GrapplePull,
            GrappleState::Fly { .. } => MovementMode::GrappleFly,
            GrappleState::Idle if self.on_ground => MovementMode::Walking,
            GrappleState::Idle => MovementMode::Airborne,
        }
    }

    /// Current tether tip, if the tether is out.
    pub fn tether_tip(&self) -> Option<Vec3> {
        match self.grapple {
            GrappleState::Idle => None,
            GrappleState::Fly { tip } => Some(tip),
            GrappleState::Pull => Some(self.anchor),
        }
    }

    /// Drop the tether without touching the resource.
    pub fn release_grapple(&mut self) {
        self.grapple = GrappleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::EntityId;

    fn handle() -> BodyHandle {
        BodyHandle { entity: EntityId(1), slot: 0 }
    }

    #[test]
    fn test_flags() {
        let mut flags = MovementFlags::default();
        flags.set(MovementFlags::JUMP_HELD, true);
        assert!(flags.has(MovementFlags::JUMP_HELD));
        assert!(!flags.has(MovementFlags::HOOK_HELD));

        flags.set(MovementFlags::HOOK_HELD, true);
        flags.set(MovementFlags::JUMP_HELD, false);
        assert_eq!(flags.0, MovementFlags::HOOK_HELD);
    }

    #[test]
    fn test_view_vectors() {
        let mut state = PlayerState::new(handle(), 100.0);
        assert!((state.view_forward - Vec3::NEG_Z).length() < 1e-6);
        assert!((state.view_right - Vec3::X).length() < 1e-6);

        // Turn left a quarter.
        state.set_view(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((state.view_forward - Vec3::NEG_X).length() < 1e-5);
        assert!((state.view_right - Vec3::NEG_Z).length() < 1e-5);

        // Looking straight down keeps vectors finite.
        state.set_view(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2));
        assert!(state.view_forward.is_finite());
        assert!(state.view_right.is_finite());
    }

    #[test]
    fn test_mode_prefers_tether() {
        let mut state = PlayerState::new(handle(), 100.0);
        state.on_ground = true;
        assert_eq!(state.mode(), MovementMode::Walking);

        state.grapple = GrappleState::Fly { tip: Vec3::ONE };
        assert_eq!(state.mode(), MovementMode::GrappleFly);
        assert_eq!(state.tether_tip(), Some(Vec3::ONE));

        state.anchor = Vec3::Y;
        state.grapple = GrappleState::Pull;
        assert_eq!(state.mode(), MovementMode::GrapplePull);
        assert_eq!(state.tether_tip(), Some(Vec3::Y));

        state.release_grapple();
        state.on_ground = false;
        assert_eq!(state.mode(), MovementMode::Airborne);
        assert_eq!(state.tether_tip(), None);
    }

    #[test]
    fn test_command_scale() {
        let speed = 320.0;
        let straight = PlayerCommand { forward: 1.0, ..Default::default() };
        assert!((straight.scale(speed) - 320.0).abs() < 1e-4);

        // Diagonal wish velocity has length sqrt(2); the scale brings it back.
        let diagonal = PlayerCommand { forward: 1.0, right: 1.0, ..Default::default() };
        let wish_length = 2.0_f32.sqrt();
        assert!((diagonal.scale(speed) * wish_length - 320.0).abs() < 1e-3);

        let half = PlayerCommand { forward: 0.5, ..Default::default() };
        assert!((half.scale(speed) * 0.5 - 160.0).abs() < 1e-4);

        assert_eq!(PlayerCommand::default().scale(speed), 0.0);
    }
}
