//! First-person camera.
//!
//! The camera pose is the shared resource of the simulation: the driver
//! writes its position from the player capsule, mouse look writes its
//! angles, and interaction, zone and the renderer read it.

use glam::Vec3;

/// Pitch is kept just short of straight up/down.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// First-person camera state.
///
/// Angles follow a yaw-then-pitch order. With both at zero the camera looks
/// down -Z; positive yaw turns left, positive pitch looks up.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    /// Eye position in world space.
    pub position: Vec3,

    /// Rotation about the world up axis (radians).
    pub yaw: f32,

    /// Rotation about the camera's right axis (radians).
    pub pitch: f32,

    /// World up vector.
    pub up: Vec3,
}

impl Default for FirstPersonCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            up: Vec3::Y,
        }
    }
}

impl FirstPersonCamera {
    /// Create a new camera at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Get the world-space view direction.
    pub fn forward(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();

        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// View direction flattened onto the ground plane.
    pub fn horizontal_forward(&self) -> Vec3 {
        let forward = self.forward();
        Vec3::new(forward.x, 0.0, forward.z).normalize_or_zero()
    }

    /// Get the strafe-right direction (horizontal forward × up).
    pub fn side(&self) -> Vec3 {
        self.horizontal_forward().cross(self.up)
    }

    /// Apply relative pointer motion.
    pub fn rotate_by_mouse(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Point the camera at a world position.
    pub fn look_at(&mut self, target: Vec3) {
        let dir = target - self.position;
        if dir.length_squared() < 1e-12 {
            return;
        }
        let dir = dir.normalize();
        self.yaw = (-dir.x).atan2(-dir.z);
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }
}
