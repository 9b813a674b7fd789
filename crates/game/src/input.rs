//! Player input handling.
//!
//! This module converts raw input (keyboard, mouse) into commands for the
//! physics system and rotates the view from mouse motion.

use glam::Quat;
use serde::{Deserialize, Serialize};
use tether_physics::{PlayerCommand, QuatExt};

/// Raw player input for a single frame.
///
/// This is the input format received from the host's input system.
/// It gets converted to [`PlayerCommand`] for the physics system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Movement keys pressed.
    pub movement: MovementInput,

    /// Mouse delta this frame (counts).
    pub mouse_delta: (f32, f32),

    /// Action buttons pressed.
    pub actions: ActionInput,
}

/// Movement key states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Action button states.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionInput {
    pub jump: bool,
    /// Fire the tether; hold to keep pulling.
    pub hook: bool,
}

impl PlayerInput {
    /// Convert to a physics command.
    ///
    /// Diagonals are left unnormalized; the controller's command scaling
    /// keeps them at the straight-line speed.
    pub fn to_command(&self) -> PlayerCommand {
        let mut cmd = PlayerCommand::default();

        if self.movement.forward {
            cmd.forward += 1.0;
        }
        if self.movement.backward {
            cmd.forward -= 1.0;
        }
        if self.movement.right {
            cmd.right += 1.0;
        }
        if self.movement.left {
            cmd.right -= 1.0;
        }

        if self.actions.jump {
            cmd.up = 1.0;
        }
        if self.actions.hook {
            cmd.hook = 1.0;
        }

        cmd
    }
}

/// Mouse-look.
#[derive(Debug, Clone, Copy)]
pub struct ViewControls {
    /// Radians per mouse count.
    pub sensitivity: f32,
}

impl ViewControls {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    /// Rotate `view` by a mouse delta.
    ///
    /// Yaw turns about world up, pitch about the view's own right axis, so
    /// the result is `yaw * view * pitch`. Moving the mouse right turns
    /// right; moving it down looks down.
    pub fn apply(&self, view: Quat, mouse_delta: (f32, f32)) -> Quat {
        let (dx, dy) = mouse_delta;
        if dx == 0.0 && dy == 0.0 {
            return view;
        }

        let yaw = Quat::from_xyzw(0.0, -dx * self.sensitivity, 0.0, 1.0).normalize();
        let pitch = Quat::from_xyzw(-dy * self.sensitivity, 0.0, 0.0, 1.0).normalize();

        let mut view = view;
        view.multiply(pitch).premultiply(yaw);
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_input_to_command() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;

        let cmd = input.to_command();

        // Diagonal stays raw; scaling brings it back to full speed.
        assert_eq!(cmd.forward, 1.0);
        assert_eq!(cmd.right, 1.0);
        assert_eq!(cmd.up, 0.0);
        assert!((cmd.scale(320.0) * 2.0_f32.sqrt() - 320.0).abs() < 1e-3);
        assert!(!cmd.hook_down());
    }

    #[test]
    fn test_jump_maps_to_up_axis() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.right = true;
        input.actions.jump = true;

        let cmd = input.to_command();
        assert_eq!(cmd.up, 1.0);

        // Jump counts toward the command scale like any other axis.
        let expected = 320.0 / 3.0_f32.sqrt();
        assert!((cmd.scale(320.0) - expected).abs() < 1e-3);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = PlayerInput::default();
        input.movement.forward = true;
        input.movement.backward = true;
        input.movement.left = true;
        input.actions.hook = true;

        let cmd = input.to_command();

        assert_eq!(cmd.forward, 0.0);
        assert_eq!(cmd.right, -1.0);
        assert!(cmd.hook_down());
    }

    #[test]
    fn test_mouse_right_turns_right() {
        let controls = ViewControls::new(0.002);
        let view = controls.apply(Quat::IDENTITY, (100.0, 0.0));

        let forward = view * Vec3::NEG_Z;
        assert!(forward.x > 0.1, "forward {forward:?}");
        assert!(forward.y.abs() < 1e-5);
        assert!((view.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_mouse_down_looks_down_and_keeps_horizon() {
        let controls = ViewControls::new(0.002);
        let mut view = controls.apply(Quat::IDENTITY, (300.0, 0.0));
        view = controls.apply(view, (0.0, 200.0));

        let forward = view * Vec3::NEG_Z;
        let right = view * Vec3::X;
        assert!(forward.y < -0.1, "forward {forward:?}");
        // Pitching about the local right axis never rolls the view.
        assert!(right.y.abs() < 1e-5, "right {right:?}");
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let controls = ViewControls::new(0.002);
        let view = Quat::from_rotation_y(0.3);
        assert_eq!(controls.apply(view, (0.0, 0.0)), view);
    }
}
