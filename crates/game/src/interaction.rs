//! Pick up, carry and release scene objects.

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::camera::FirstPersonCamera;
use crate::scene::{NodeId, SceneGraph, Tag};

/// Interaction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Tags that can be picked up and carried.
    pub carryable: Vec<Tag>,

    /// Tags that trigger a camera flash instead of a pick-up.
    pub flash: Vec<Tag>,

    /// Maximum pick distance.
    pub reach: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            carryable: vec![Tag::Chair, Tag::Cart],
            flash: vec![Tag::PhotoCamera],
            reach: 1000.0,
        }
    }
}

/// An object currently held by the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carried {
    pub node: NodeId,
    pub tag: Tag,

    /// Camera position minus object position. The horizontal part follows
    /// the view; the vertical part is fixed at pick-up.
    pub offset: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CarryState {
    #[default]
    Empty,
    Carrying(Carried),
}

/// What a single interact request did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractOutcome {
    /// The pick ray hit nothing.
    Missed,
    /// The hit object has no interaction.
    Ignored { node: NodeId, tag: Tag },
    /// A flash-type object was clicked; `position` is its world position.
    Flash { node: NodeId, position: Vec3 },
    PickedUp { node: NodeId, tag: Tag },
    Released { node: NodeId },
}

/// Tracks which object, if any, the player is carrying.
#[derive(Debug, Clone)]
pub struct InteractionManager {
    state: CarryState,
    config: InteractionConfig,
}

impl InteractionManager {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: CarryState::Empty,
            config,
        }
    }

    #[inline]
    pub fn state(&self) -> CarryState {
        self.state
    }

    pub fn carried(&self) -> Option<&Carried> {
        match &self.state {
            CarryState::Carrying(carried) => Some(carried),
            CarryState::Empty => None,
        }
    }

    #[inline]
    pub fn is_carrying(&self) -> bool {
        matches!(self.state, CarryState::Carrying(_))
    }

    pub fn is_carryable(&self, tag: Tag) -> bool {
        self.config.carryable.contains(&tag)
    }

    /// Handle one interact request.
    ///
    /// While carrying, any request releases the object where it is. Otherwise
    /// the view ray picks the nearest object and acts on its top-level
    /// ancestor.
    pub fn interact(&mut self, scene: &SceneGraph, camera: &FirstPersonCamera) -> InteractOutcome {
        if let CarryState::Carrying(carried) = self.state {
            self.state = CarryState::Empty;
            debug!("released {:?}", scene.node(carried.node).name);
            return InteractOutcome::Released { node: carried.node };
        }

        let Some(hit) = scene.cast_ray(camera.position, camera.forward(), self.config.reach) else {
            return InteractOutcome::Missed;
        };

        let node = scene.top_level_ancestor(hit.node);
        let tag = scene.node(node).tag;

        if self.is_carryable(tag) {
            let position = scene.world_position(node);
            let mut offset = camera.position - position;
            offset.y = 0.0;
            offset = offset.normalize_or_zero();
            offset.y = camera.position.y - position.y;

            self.state = CarryState::Carrying(Carried { node, tag, offset });
            debug!(
                "picked up {:?} at {:.2} distance",
                scene.node(node).name,
                hit.distance
            );
            InteractOutcome::PickedUp { node, tag }
        } else if self.config.flash.contains(&tag) {
            InteractOutcome::Flash {
                node,
                position: scene.world_position(node),
            }
        } else {
            InteractOutcome::Ignored { node, tag }
        }
    }

    /// Keep the carried object in front of the camera.
    ///
    /// Runs once per frame after the physics substeps.
    pub fn drag_carried(&mut self, scene: &mut SceneGraph, camera: &FirstPersonCamera) {
        let CarryState::Carrying(carried) = &mut self.state else {
            return;
        };

        let direction = camera.forward();
        carried.offset.x = -direction.x;
        carried.offset.z = -direction.z;

        scene.set_world_position(carried.node, camera.position - carried.offset);
    }

    /// Detach the first immediate child tagged `wanted` from the carried
    /// object, provided the carried object is tagged `carrier`.
    ///
    /// Returns the detached node, which keeps its material but is no longer
    /// part of the scene.
    pub fn take_from_carried(
        &self,
        scene: &mut SceneGraph,
        carrier: Tag,
        wanted: Tag,
    ) -> Option<NodeId> {
        let carried = self.carried().filter(|carried| carried.tag == carrier)?;

        let child = scene
            .node(carried.node)
            .children()
            .iter()
            .copied()
            .find(|child| scene.node(*child).tag == wanted)?;

        scene.detach(child);
        debug!(
            "took {:?} from {:?}",
            scene.node(child).name,
            scene.node(carried.node).name
        );
        Some(child)
    }
}
