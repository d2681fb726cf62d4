//! Outfit station: the model swaps into clothes brought on the cart.

use log::debug;

use crate::interaction::InteractionManager;
use crate::scene::{NodeId, SceneGraph, Tag};

/// Result of a zone visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// A wearable was taken off the cart and put on the model.
    Dressed { item: NodeId },
    /// Nothing new brought; the model already wears something.
    AskForAnother,
    /// Nothing brought and the model has nothing on.
    AskForClothes,
}

#[derive(Debug, Clone)]
pub struct OutfitStation {
    target: NodeId,
    carrier: Tag,
    wearable: Tag,
}

impl OutfitStation {
    /// Station dressing `target` from a carried [`Tag::Cart`].
    pub fn new(target: NodeId) -> Self {
        Self {
            target,
            carrier: Tag::Cart,
            wearable: Tag::Wearable,
        }
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Whether the model currently wears something.
    pub fn is_dressed(&self, scene: &SceneGraph) -> bool {
        scene.node(self.target).visible
    }

    /// React to the player arriving at the model.
    pub fn on_visit(
        &self,
        scene: &mut SceneGraph,
        interaction: &InteractionManager,
    ) -> VisitOutcome {
        match interaction.take_from_carried(scene, self.carrier, self.wearable) {
            Some(item) => {
                let material = scene.node(item).material.clone();
                let target = scene.node_mut(self.target);
                target.material = material;
                target.visible = true;
                debug!("model dressed in {:?}", scene.node(item).name);
                VisitOutcome::Dressed { item }
            }
            None if self.is_dressed(scene) => VisitOutcome::AskForAnother,
            None => VisitOutcome::AskForClothes,
        }
    }
}
