//! Proximity trigger around a point of interest.
//!
//! Two radii give hysteresis: the trigger fires when the camera comes
//! within `enter_radius` and only re-arms once it has gone beyond
//! `exit_radius`.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub enter_radius: f32,
    pub exit_radius: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            enter_radius: 5.0,
            exit_radius: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTransition {
    /// The camera came within the enter radius. Fire the on-enter action.
    Entered,
    /// The camera left the exit radius; the next approach fires again.
    Rearmed,
}

#[derive(Debug, Clone)]
pub struct ZoneTrigger {
    center: Vec3,
    enter_radius: f32,
    exit_radius: f32,
    inside: bool,
}

impl ZoneTrigger {
    pub fn new(center: Vec3, config: &ZoneConfig) -> Self {
        Self {
            center,
            enter_radius: config.enter_radius,
            exit_radius: config.exit_radius,
            inside: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Whether the trigger has fired and not yet re-armed.
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.inside
    }

    /// Feed the current camera position. Called every substep.
    pub fn update(&mut self, position: Vec3) -> Option<ZoneTransition> {
        let distance = position.distance(self.center);

        if !self.inside && distance < self.enter_radius {
            self.inside = true;
            debug!("zone entered at distance {distance:.2}");
            Some(ZoneTransition::Entered)
        } else if self.inside && distance > self.exit_radius {
            self.inside = false;
            debug!("zone re-armed at distance {distance:.2}");
            Some(ZoneTransition::Rearmed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(distances: &[f32]) -> usize {
        let mut zone = ZoneTrigger::new(Vec3::ZERO, &ZoneConfig::default());
        distances
            .iter()
            .filter(|d| zone.update(Vec3::new(**d, 0.0, 0.0)) == Some(ZoneTransition::Entered))
            .count()
    }

    #[test]
    fn test_fires_once_between_radii() {
        assert_eq!(entries(&[12.0, 4.0, 7.0, 4.0]), 1);
    }

    #[test]
    fn test_rearms_beyond_exit_radius() {
        assert_eq!(entries(&[12.0, 4.0, 11.0, 4.0]), 2);
    }

    #[test]
    fn test_boundaries_are_strict() {
        // Exactly on the radius is not inside; exactly on the exit radius does not re-arm
        assert_eq!(entries(&[5.0]), 0);
        assert_eq!(entries(&[4.9, 10.0, 4.9]), 1);
    }

    #[test]
    fn test_transitions() {
        let mut zone = ZoneTrigger::new(Vec3::new(0.0, 0.9, -8.0), &ZoneConfig::default());

        assert_eq!(zone.update(Vec3::new(0.0, 1.7, 12.0)), None);
        assert_eq!(zone.update(Vec3::new(0.0, 1.7, -4.0)), Some(ZoneTransition::Entered));
        assert!(zone.is_inside());
        assert_eq!(zone.update(Vec3::new(0.0, 1.7, -3.0)), None);
        assert_eq!(zone.update(Vec3::new(0.0, 1.7, 5.0)), Some(ZoneTransition::Rearmed));
        assert!(!zone.is_inside());
    }
}
