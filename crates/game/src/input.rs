//! Player input handling.
//!
//! The input collaborator delivers discrete [`InputEvent`]s. Key events land
//! in [`InputState`], which the simulation turns into a [`PlayerCommand`]
//! for the physics system every substep.

use std::collections::HashMap;

use atelier_physics::movement::{CommandButtons, PlayerCommand};
use serde::{Deserialize, Serialize};

/// Physical key codes the simulation knows about.
///
/// Names follow the DOM `KeyboardEvent.code` values hosts usually receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    KeyW,
    KeyA,
    KeyS,
    KeyD,
    KeyB,
    KeyE,
    KeyQ,
    Space,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// Discrete events from the input collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    /// Primary button pressed. Requests pointer lock.
    MouseDown,
    /// Primary button released. Interacts while the pointer is locked.
    MouseUp,
    /// Relative pointer motion in pixels.
    MouseMove { dx: f32, dy: f32 },
    /// The host granted or revoked pointer lock (e.g. Escape pressed).
    PointerLockChanged(bool),
}

/// Which key drives which action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub sprint: KeyCode,
    pub jump: KeyCode,
    pub boost: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::KeyW,
            backward: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            sprint: KeyCode::ShiftLeft,
            jump: KeyCode::Space,
            boost: KeyCode::KeyB,
        }
    }
}

/// Current key and pointer state.
///
/// Keys that were never reported count as released.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys: HashMap<KeyCode, bool>,

    /// Whether the pointer is captured by the view.
    pub pointer_locked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    /// Check whether a key is currently held.
    #[inline]
    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Convert to a physics command.
    ///
    /// Opposing keys cancel; diagonal input is not normalised because the
    /// impulses from each key add up.
    pub fn to_command(&self, bindings: &KeyBindings) -> PlayerCommand {
        let mut cmd = PlayerCommand::default();

        if self.is_pressed(bindings.forward) {
            cmd.forward_move += 1.0;
        }
        if self.is_pressed(bindings.backward) {
            cmd.forward_move -= 1.0;
        }
        if self.is_pressed(bindings.right) {
            cmd.right_move += 1.0;
        }
        if self.is_pressed(bindings.left) {
            cmd.right_move -= 1.0;
        }

        if self.is_pressed(bindings.sprint) {
            cmd.buttons.press(CommandButtons::SPRINT);
        }
        if self.is_pressed(bindings.jump) {
            cmd.buttons.press(CommandButtons::JUMP);
        }
        if self.is_pressed(bindings.boost) {
            cmd.buttons.press(CommandButtons::BOOST);
        }

        cmd
    }
}
