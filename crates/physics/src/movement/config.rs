//! Movement configuration constants.
//!
//! All movement parameters are grouped here for easy tuning. Units are world
//! units and seconds.

use serde::{Deserialize, Serialize};

/// Configuration for player movement physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Player Dimensions
    // ========================================================================
    /// Capsule radius.
    pub player_radius: f32,

    /// Height of the upper cap centre above the feet. The camera sits here.
    pub eye_height: f32,

    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration applied while airborne (units/second²).
    pub gravity: f32,

    /// Exponential velocity decay rate (1/second).
    pub damping_rate: f32,

    /// Fraction of the damping kept while airborne.
    pub air_damping_scale: f32,

    /// Penetrations shallower than this are left uncorrected.
    pub min_correction_depth: f32,

    // ========================================================================
    // Controls
    // ========================================================================
    /// Movement acceleration on the floor (units/second²).
    pub ground_acceleration: f32,

    /// Movement acceleration in the air (units/second²).
    pub air_acceleration: f32,

    /// Acceleration multiplier while sprint is held.
    pub sprint_multiplier: f32,

    /// Vertical velocity assigned by the jump key.
    pub jump_velocity: f32,

    /// Vertical velocity assigned by the boost key.
    pub boost_velocity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            player_radius: 0.35,
            eye_height: 1.7,

            gravity: 30.0,
            damping_rate: 4.0,
            air_damping_scale: 0.1,
            min_correction_depth: 1e-10,

            ground_acceleration: 20.0,
            air_acceleration: 4.0, // a bit of air control
            sprint_multiplier: 2.0,
            jump_velocity: 10.0,
            boost_velocity: 100.0,
        }
    }
}

impl MovementConfig {
    /// Acceleration for the current floor/sprint state.
    pub fn acceleration(&self, on_floor: bool, sprinting: bool) -> f32 {
        let base = if on_floor {
            self.ground_acceleration
        } else {
            self.air_acceleration
        };

        if sprinting {
            base * self.sprint_multiplier
        } else {
            base
        }
    }
}
