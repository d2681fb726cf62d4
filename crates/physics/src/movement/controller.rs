//! Player movement controller.
//!
//! This is the main entry point for player movement. Each substep the driver
//! calls [`PlayerController::apply_controls`] and then
//! [`PlayerController::integrate`], always with the substep length and never
//! with raw frame time.

use glam::Vec3;

use crate::collision::{CollisionQuery, Contact};

use super::config::MovementConfig;
use super::state::{MovementState, PlayerCommand};

/// Player movement controller.
///
/// # Example
///
/// ```ignore
/// let controller = PlayerController::new(MovementConfig::default());
/// let mut state = controller.spawn(spawn_position);
///
/// // Each substep:
/// controller.apply_controls(&mut state, &command, camera.forward(), Vec3::Y, dt);
/// controller.integrate(&mut state, &world, dt);
/// ```
#[derive(Debug, Clone)]
pub struct PlayerController {
    /// Movement configuration.
    pub config: MovementConfig,
}

impl PlayerController {
    /// Create a new player controller with the given configuration.
    pub fn new(config: MovementConfig) -> Self {
        Self { config }
    }

    /// Create a controller with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    /// Build a fresh movement state with the capsule standing on `foot`.
    pub fn spawn(&self, foot: Vec3) -> MovementState {
        MovementState::new(foot, &self.config)
    }

    /// Add movement impulses for this substep.
    ///
    /// `view_direction` is the camera's world direction; only its horizontal
    /// part steers movement. Impulses from several keys add up. Jump and boost
    /// assign the vertical velocity and only work on the floor.
    pub fn apply_controls(
        &self,
        state: &mut MovementState,
        command: &PlayerCommand,
        view_direction: Vec3,
        up: Vec3,
        delta_time: f32,
    ) {
        let speed_delta =
            delta_time * self.config.acceleration(state.on_floor, command.wants_sprint());

        let forward = Vec3::new(view_direction.x, 0.0, view_direction.z).normalize_or_zero();
        let side = forward.cross(up);

        state.velocity += forward * (command.forward_move * speed_delta);
        state.velocity += side * (command.right_move * speed_delta);

        if state.on_floor {
            if command.wants_jump() {
                state.velocity.y = self.config.jump_velocity;
            }
            if command.wants_boost() {
                state.velocity.y = self.config.boost_velocity;
            }
        }
    }

    /// Advance the player by exactly `delta_time` and resolve collisions.
    pub fn integrate<Q>(&self, state: &mut MovementState, world: &Q, delta_time: f32)
    where
        Q: CollisionQuery + ?Sized,
    {
        self.apply_damping(state, delta_time);

        let delta_position = state.velocity * delta_time;
        state.capsule.translate(delta_position);

        let contact = world.query_capsule(&state.capsule);
        self.resolve_contact(state, contact);
    }

    /// Camera position for the current state.
    #[inline]
    pub fn eye_position(&self, state: &MovementState) -> Vec3 {
        state.eye_position()
    }

    // ========================================================================
    // Integration steps
    // ========================================================================

    fn apply_damping(&self, state: &mut MovementState, delta_time: f32) {
        let mut damping = (-self.config.damping_rate * delta_time).exp() - 1.0;

        if !state.on_floor {
            state.velocity.y -= self.config.gravity * delta_time;

            // small air resistance
            damping *= self.config.air_damping_scale;
        }

        state.velocity += state.velocity * damping;
    }

    fn resolve_contact(&self, state: &mut MovementState, contact: Option<Contact>) {
        let Some(Contact { normal, depth }) = contact else {
            state.on_floor = false;
            return;
        };

        state.on_floor = normal.y > 0.0;

        if !state.on_floor {
            // Slide: drop the into-surface component, keep the tangential one
            state.velocity -= normal * normal.dot(state.velocity);
        }

        if depth >= self.config.min_correction_depth {
            state.capsule.translate(normal * depth);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
