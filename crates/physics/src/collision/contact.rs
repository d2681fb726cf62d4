//! Capsule shape and the contact it reports against the world.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The player's collision volume: a segment swept by a sphere.
///
/// Only [`PlayerCapsule::translate`] moves it, so the radius and the
/// `start -> end` offset never change after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerCapsule {
    /// Centre of the lower cap sphere.
    start: Vec3,
    /// Centre of the upper cap sphere (the eye point).
    end: Vec3,
    /// Radius of both caps and the cylinder.
    radius: f32,
}

impl PlayerCapsule {
    /// Create a capsule from its two cap centres and radius.
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Build an upright capsule standing on `foot`.
    ///
    /// The lower cap touches `foot.y`, the upper cap centre sits at
    /// `foot.y + eye_height`.
    pub fn standing(foot: Vec3, radius: f32, eye_height: f32) -> Self {
        Self {
            start: foot + Vec3::new(0.0, radius, 0.0),
            end: foot + Vec3::new(0.0, eye_height, 0.0),
            radius,
        }
    }

    #[inline]
    pub fn start(&self) -> Vec3 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Vec3 {
        self.end
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Lowest point of the capsule.
    pub fn foot(&self) -> Vec3 {
        self.start - Vec3::new(0.0, self.radius, 0.0)
    }

    /// Move both end points by `delta`.
    #[inline]
    pub fn translate(&mut self, delta: Vec3) {
        self.start += delta;
        self.end += delta;
    }

    /// Axis-aligned bounds `(min, max)` of the whole capsule.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let r = Vec3::splat(self.radius);
        (self.start.min(self.end) - r, self.start.max(self.end) + r)
    }
}

/// Resolved penetration of the capsule into static geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Unit vector pointing out of the geometry, towards the capsule.
    pub normal: Vec3,
    /// Penetration depth along `normal`; `0.0` for a resting contact.
    pub depth: f32,
}

/// Collision Query Service used by the player controller once per substep.
///
/// Implementations return at most one contact per query. When several
/// surfaces overlap the capsule they must be merged into a single resolved
/// contact (see [`crate::CollisionWorld`] for the policy used here).
pub trait CollisionQuery {
    fn query_capsule(&self, capsule: &PlayerCapsule) -> Option<Contact>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_keeps_shape() {
        let mut capsule = PlayerCapsule::standing(Vec3::new(4.0, 0.0, 27.0), 0.35, 1.7);
        let offset = capsule.end() - capsule.start();

        capsule.translate(Vec3::new(1.5, -0.25, 3.0));
        capsule.translate(Vec3::new(-7.0, 2.0, 0.5));

        assert!((capsule.end() - capsule.start() - offset).length() < 1e-5);
        assert_eq!(capsule.radius(), 0.35);
    }

    #[test]
    fn test_standing_layout() {
        let capsule = PlayerCapsule::standing(Vec3::ZERO, 0.35, 1.7);
        assert_eq!(capsule.start(), Vec3::new(0.0, 0.35, 0.0));
        assert_eq!(capsule.end(), Vec3::new(0.0, 1.7, 0.0));
        assert_eq!(capsule.foot(), Vec3::ZERO);

        let (min, max) = capsule.bounds();
        assert_eq!(min, Vec3::new(-0.35, 0.0, -0.35));
        assert!((max.y - 2.05).abs() < 1e-6);
    }
}
