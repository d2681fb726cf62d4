//! Movement state and input structures.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::PlayerCapsule;

use super::config::MovementConfig;

/// Complete movement state for the player.
///
/// Owned by whoever drives the [`super::PlayerController`]; nothing else
/// writes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Collision volume. Translated every substep, never rebuilt.
    pub capsule: PlayerCapsule,

    /// Velocity in world space (units/second).
    pub velocity: Vec3,

    /// Whether the latest contact normal pointed upwards.
    pub on_floor: bool,
}

impl MovementState {
    /// Create a standing, airborne-until-proven-otherwise state at `foot`.
    pub fn new(foot: Vec3, config: &MovementConfig) -> Self {
        Self {
            capsule: PlayerCapsule::standing(foot, config.player_radius, config.eye_height),
            velocity: Vec3::ZERO,
            on_floor: false,
        }
    }

    /// Eye position: the upper end of the capsule.
    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.capsule.end()
    }

    /// Lowest point of the capsule.
    #[inline]
    pub fn foot_position(&self) -> Vec3 {
        self.capsule.foot()
    }
}

/// Input command from the player for a single substep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Sum of forward (+1) and backward (-1) keys.
    pub forward_move: f32,

    /// Sum of right (+1) and left (-1) keys.
    pub right_move: f32,

    /// Button states.
    pub buttons: CommandButtons,
}

/// Button state flags for player commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandButtons(pub u8);

impl CommandButtons {
    /// Jump button.
    pub const JUMP: u8 = 1 << 0;

    /// Large vertical launch (debug).
    pub const BOOST: u8 = 1 << 1;

    /// Sprint modifier.
    pub const SPRINT: u8 = 1 << 2;

    /// Check if a button is pressed.
    #[inline]
    pub fn pressed(self, button: u8) -> bool {
        (self.0 & button) != 0
    }

    /// Press a button.
    #[inline]
    pub fn press(&mut self, button: u8) {
        self.0 |= button;
    }
}

impl PlayerCommand {
    #[inline]
    pub fn wants_jump(&self) -> bool {
        self.buttons.pressed(CommandButtons::JUMP)
    }

    #[inline]
    pub fn wants_boost(&self) -> bool {
        self.buttons.pressed(CommandButtons::BOOST)
    }

    #[inline]
    pub fn wants_sprint(&self) -> bool {
        self.buttons.pressed(CommandButtons::SPRINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_layout() {
        let config = MovementConfig::default();
        let state = MovementState::new(Vec3::new(4.0, 0.0, 27.0), &config);

        assert_eq!(state.eye_position(), Vec3::new(4.0, 1.7, 27.0));
        assert_eq!(state.foot_position(), Vec3::new(4.0, 0.0, 27.0));
        assert!(!state.on_floor);
        assert_eq!(state.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_player_command_buttons() {
        let mut cmd = PlayerCommand::default();
        assert!(!cmd.wants_jump());

        cmd.buttons.press(CommandButtons::JUMP);
        cmd.buttons.press(CommandButtons::SPRINT);
        assert!(cmd.wants_jump());
        assert!(cmd.wants_sprint());
        assert!(!cmd.wants_boost());
    }
}
