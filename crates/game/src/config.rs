//! Simulation configuration.
//!
//! Every section has defaults matching the studio, so a config file only
//! needs the values it changes:
//!
//! ```ron
//! (
//!     substeps: 8,
//!     zone: (enter_radius: 4.0),
//!     movement: (gravity: 25.0),
//! )
//! ```

use std::path::Path;

use atelier_physics::MovementConfig;
use serde::{Deserialize, Serialize};

use crate::effects::EffectsConfig;
use crate::error::ConfigError;
use crate::input::KeyBindings;
use crate::interaction::InteractionConfig;
use crate::notify::DialogueConfig;
use crate::zone::ZoneConfig;

/// Game simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics substeps per rendered frame.
    pub substeps: u32,

    /// Longest frame time simulated in one frame (seconds). Longer frames
    /// are clamped so a hitch cannot tunnel the player through walls.
    pub max_frame_time: f32,

    /// Radians of rotation per pixel of pointer motion.
    pub mouse_sensitivity: f32,

    pub movement: MovementConfig,
    pub bindings: KeyBindings,
    pub interaction: InteractionConfig,
    pub zone: ZoneConfig,
    pub dialogue: DialogueConfig,
    pub effects: EffectsConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            substeps: 5,
            max_frame_time: 0.05,
            mouse_sensitivity: 1.0 / 500.0,
            movement: MovementConfig::default(),
            bindings: KeyBindings::default(),
            interaction: InteractionConfig::default(),
            zone: ZoneConfig::default(),
            dialogue: DialogueConfig::default(),
            effects: EffectsConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Read and validate a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Parse and validate RON text. `origin` names the source in errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.substeps == 0 {
            return Err(ConfigError::Invalid("substeps must be at least 1".into()));
        }
        if !self.max_frame_time.is_finite() || self.max_frame_time <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "max_frame_time must be positive and finite, got {}",
                self.max_frame_time
            )));
        }
        if !self.mouse_sensitivity.is_finite() {
            return Err(ConfigError::Invalid("mouse_sensitivity must be finite".into()));
        }
        if !(self.zone.enter_radius > 0.0) || !(self.zone.exit_radius > self.zone.enter_radius) {
            return Err(ConfigError::Invalid(format!(
                "zone radii must satisfy 0 < enter ({}) < exit ({})",
                self.zone.enter_radius, self.zone.exit_radius
            )));
        }

        let movement = &self.movement;
        if !(movement.player_radius > 0.0) || !(movement.eye_height > movement.player_radius) {
            return Err(ConfigError::Invalid(format!(
                "player capsule needs 0 < radius ({}) < eye_height ({})",
                movement.player_radius, movement.eye_height
            )));
        }
        if !(movement.damping_rate >= 0.0) || !(movement.gravity >= 0.0) {
            return Err(ConfigError::Invalid(
                "gravity and damping_rate must not be negative".into(),
            ));
        }

        let durations = [
            self.effects.flash.duration,
            self.effects.notice_duration,
            self.effects.feed.interval,
        ];
        if durations.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(ConfigError::Invalid(
                "effect durations must be finite and not negative".into(),
            ));
        }

        Ok(())
    }

    /// Simulated time for a frame of `elapsed` seconds.
    pub fn frame_time(&self, elapsed: f32) -> f32 {
        if elapsed.is_nan() {
            return 0.0;
        }
        elapsed.clamp(0.0, self.max_frame_time)
    }

    /// Length of one physics substep for a frame of `elapsed` seconds.
    pub fn substep_time(&self, elapsed: f32) -> f32 {
        self.frame_time(elapsed) / self.substeps as f32
    }
}
