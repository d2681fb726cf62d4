//! Scripted walk through a level.
//!
//! The tour plays the part of a visitor at the keyboard: it turns with mouse
//! motion, walks with the forward key and clicks to interact. Each step
//! produces the input events for one frame.

use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

use atelier_game::{InputEvent, Level, Simulation, Tag};
use glam::Vec3;
use log::warn;

/// Give up on a walk after this many frames.
const WALK_TIMEOUT_FRAMES: u32 = 900;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Press and release the primary button.
    Click,
    /// Turn to face a point.
    LookAt(Vec3),
    /// Walk towards a point until within `within` horizontally.
    WalkTo { target: Vec3, within: f32 },
    /// Do nothing for some frames.
    Wait(u32),
}

#[derive(Debug, Clone)]
pub struct Tour {
    steps: VecDeque<Step>,
    walking: bool,
    frames_on_step: u32,
}

impl Tour {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            walking: false,
            frames_on_step: 0,
        }
    }

    /// Fetch the cart, deliver it to the model, walk away and back, then
    /// take a picture. Steps needing a node the level lacks are left out.
    pub fn through(level: &Level) -> Self {
        let scene = &level.scene;
        let first_tagged = |tag: Tag| {
            scene
                .attached()
                .find(|id| scene.node(*id).tag == tag)
                .map(|id| scene.world_position(id))
        };

        let model = level.point_of_interest;
        let spawn = level.spawn.position;
        let mut steps = vec![Step::Click];

        if let Some(cart) = first_tagged(Tag::Cart) {
            steps.extend([
                Step::WalkTo {
                    target: cart,
                    within: 3.0,
                },
                Step::Wait(45),
                Step::LookAt(cart),
                Step::Click,
            ]);
        }

        steps.extend([
            Step::WalkTo {
                target: model,
                within: 3.5,
            },
            Step::Wait(60),
            Step::Click,
            Step::WalkTo {
                target: spawn,
                within: 1.5,
            },
            Step::Wait(30),
            Step::WalkTo {
                target: model,
                within: 3.5,
            },
            Step::Wait(60),
        ]);

        if let Some(photo_camera) = first_tagged(Tag::PhotoCamera) {
            steps.extend([Step::LookAt(photo_camera), Step::Click]);
        }

        steps.push(Step::Wait(150));
        Self::new(steps)
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// Input events for the coming frame.
    pub fn next_inputs(&mut self, sim: &Simulation) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let Some(step) = self.steps.front().cloned() else {
            return events;
        };
        self.frames_on_step += 1;

        let done = match step {
            Step::Click => {
                events.push(InputEvent::MouseDown);
                events.push(InputEvent::MouseUp);
                true
            }
            Step::LookAt(target) => {
                events.push(turn_towards(sim, target, true));
                true
            }
            Step::WalkTo { target, within } => {
                let forward = sim.config.bindings.forward;
                let offset = target - sim.camera.position;
                let distance = Vec3::new(offset.x, 0.0, offset.z).length();

                if distance < within || self.frames_on_step > WALK_TIMEOUT_FRAMES {
                    if distance >= within {
                        warn!("tour: gave up walking to {target}, {distance:.2} away");
                    }
                    events.push(InputEvent::KeyUp(forward));
                    self.walking = false;
                    true
                } else {
                    events.push(turn_towards(sim, target, false));
                    if !self.walking {
                        events.push(InputEvent::KeyDown(forward));
                        self.walking = true;
                    }
                    false
                }
            }
            Step::Wait(frames) => self.frames_on_step >= frames,
        };

        if done {
            self.steps.pop_front();
            self.frames_on_step = 0;
        }
        events
    }
}

/// Mouse motion that turns the camera to face `target`. Without `with_pitch`
/// the view levels out instead.
fn turn_towards(sim: &Simulation, target: Vec3, with_pitch: bool) -> InputEvent {
    let camera = &sim.camera;
    let sensitivity = sim.config.mouse_sensitivity;
    let dir = (target - camera.position).normalize_or_zero();

    let yaw = (-dir.x).atan2(-dir.z);
    let pitch = if with_pitch { dir.y.clamp(-1.0, 1.0).asin() } else { 0.0 };

    let yaw_change = wrap_angle(camera.yaw - yaw);
    InputEvent::MouseMove {
        dx: yaw_change / sensitivity,
        dy: (camera.pitch - pitch) / sensitivity,
    }
}

/// Wrap to (-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-5);
        assert!((wrap_angle(-PI - 0.5) - (PI - 0.5)).abs() < 1e-5);
    }

    #[test]
    fn test_look_at_step_faces_target() {
        let mut sim = Simulation::studio(7).unwrap();
        let target = Vec3::new(2.0, 0.5, 6.0);
        let mut tour = Tour::new([Step::Click, Step::LookAt(target)]);

        for _ in 0..2 {
            for event in tour.next_inputs(&sim) {
                sim.handle_input(event);
            }
        }

        let expected = (target - sim.camera.position).normalize();
        assert!((sim.camera.forward() - expected).length() < 1e-3);
        assert!(tour.is_finished());
    }

    #[test]
    fn test_walk_step_arrives() {
        let mut sim = Simulation::studio(7).unwrap();
        let target = Vec3::new(4.0, 0.0, 4.0);
        let walk = Step::WalkTo {
            target,
            within: 2.0,
        };
        let mut tour = Tour::new([Step::Click, walk]);

        for _ in 0..600 {
            if tour.is_finished() {
                break;
            }
            for event in tour.next_inputs(&sim) {
                sim.handle_input(event);
            }
            sim.frame(1.0 / 60.0);
        }

        assert!(tour.is_finished());
        let offset = target - sim.camera.position;
        assert!(Vec3::new(offset.x, 0.0, offset.z).length() < 2.0);
    }

    #[test]
    fn test_studio_tour_delivers_outfit() {
        let mut sim = Simulation::studio(7).unwrap();
        let mut tour = Tour::through(&sim.level);

        for _ in 0..4000 {
            if tour.is_finished() {
                break;
            }
            for event in tour.next_inputs(&sim) {
                sim.handle_input(event);
            }
            sim.frame(1.0 / 60.0);
        }

        assert!(tour.is_finished());
        assert!(sim.is_outfit_visible());
        assert!(sim.carried().is_none());
    }
}
