//! Scene graph.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. Parent links are
//! stored both ways so that reparenting (detaching an outfit from the cart)
//! is a constant amount of bookkeeping. Only nodes reachable from the root
//! are part of the rendered scene and can be picked.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Vector};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::Cuboid;
use serde::{Deserialize, Serialize};

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle to a point light in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(u32);

/// Semantic tag of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Chair,
    Cart,
    PhotoCamera,
    Wearable,
    Model,
    Screen,
    Ceiling,
    Structure,
    Prop,
}

impl Tag {
    /// Derive a tag from a node name.
    ///
    /// Exported scenes number duplicates (`Chair001`, `TShirt.002`), so the
    /// trailing digits and separators are ignored.
    pub fn from_name(name: &str) -> Tag {
        let base = name.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '_');

        match base {
            "Chair" => Tag::Chair,
            "Cart" => Tag::Cart,
            "PhotoCamera" => Tag::PhotoCamera,
            "TShirt" => Tag::Wearable,
            "MaleModel" | "Model" => Tag::Model,
            "TV" | "Monitor" | "Thinkpad" => Tag::Screen,
            "Ceiling" => Tag::Ceiling,
            "Floor" | "Wall" | "GridWall" => Tag::Structure,
            _ => Tag::Prop,
        }
    }

    /// Name used in speech ("I'm taking Cart").
    pub fn label(self) -> &'static str {
        match self {
            Tag::Chair => "Chair",
            Tag::Cart => "Cart",
            Tag::PhotoCamera => "PhotoCamera",
            Tag::Wearable => "TShirt",
            Tag::Model => "Model",
            Tag::Screen => "Screen",
            Tag::Ceiling => "Ceiling",
            Tag::Structure => "Structure",
            Tag::Prop => "Prop",
        }
    }

    /// Whether geometry with this tag blocks the player when the level does
    /// not say otherwise.
    pub fn collides_by_default(self) -> bool {
        !matches!(
            self,
            Tag::Chair | Tag::Cart | Tag::Wearable | Tag::Ceiling | Tag::Screen
        )
    }
}

/// Surface appearance of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Material {
    /// Flat colour, 0xRRGGBB.
    Color(u32),
    /// Texture asset path.
    Texture(String),
}

/// A single object in the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub tag: Tag,

    /// Position relative to the parent.
    pub position: Vec3,

    pub visible: bool,
    pub material: Option<Material>,

    /// Half extents of the box used for pointer picking, centred on the node.
    /// Nodes without extents cannot be picked.
    pub pick_extents: Option<Vec3>,

    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Omnidirectional light with distance falloff.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    /// 0xRRGGBB.
    pub color: u32,
    pub intensity: f32,
    pub range: f32,
    pub decay: f32,
}

/// Result of a pick ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Arena-backed scene graph with a single root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    lights: Vec<(LightId, PointLight)>,
    next_light: u32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root node.
    pub fn new() -> Self {
        let root = SceneNode {
            name: "Scene".to_string(),
            tag: Tag::Structure,
            position: Vec3::ZERO,
            visible: true,
            material: None,
            pick_extents: None,
            parent: None,
            children: Vec::new(),
        };

        Self {
            nodes: vec![root],
            lights: Vec::new(),
            next_light: 0,
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Add a node under `parent` at a local position.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        tag: Tag,
        position: Vec3,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            tag,
            position,
            visible: true,
            material: None,
            pick_extents: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Get a node.
    ///
    /// Ids are only handed out by this graph and nodes are never freed, so
    /// every id is valid for the graph that produced it.
    #[inline]
    pub fn node(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut SceneNode {
        &mut self.nodes[id.0]
    }

    /// Number of nodes, including the root and detached nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find a node by exact name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeId)
    }

    /// World-space position of a node.
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let mut position = Vec3::ZERO;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            position += node.position;
            current = node.parent;
        }
        position
    }

    /// Move a node so that its world position becomes `position`.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) {
        let parent_position = self.nodes[id.0]
            .parent
            .map(|parent| self.world_position(parent))
            .unwrap_or(Vec3::ZERO);
        self.nodes[id.0].position = position - parent_position;
    }

    /// Walk up the parent chain to the node directly under the root.
    ///
    /// The root and detached subtrees return their own topmost node.
    pub fn top_level_ancestor(&self, id: NodeId) -> NodeId {
        let root = self.root();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            if parent == root {
                break;
            }
            current = parent;
        }
        current
    }

    /// Check whether the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.root();
        let mut current = id;
        loop {
            if current == root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Remove a node from its parent. The node and its subtree stay in the
    /// arena but are no longer part of the scene.
    ///
    /// Returns `false` if the node had no parent.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        true
    }

    /// Depth-first iterator over attached nodes, root included.
    pub fn attached(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
            Some(id)
        })
    }

    /// Cast a ray against the pick boxes of visible attached nodes.
    ///
    /// Returns the nearest hit within `max_distance`. Hidden nodes are
    /// skipped but their children are still tested.
    pub fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<PickHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            Point::new(origin.x, origin.y, origin.z),
            Vector::new(direction.x, direction.y, direction.z),
        );

        let mut best: Option<PickHit> = None;
        for id in self.attached() {
            let node = &self.nodes[id.0];
            let Some(extents) = node.pick_extents else {
                continue;
            };
            if !node.visible {
                continue;
            }

            let center = self.world_position(id);
            let cuboid = Cuboid::new(Vector::new(extents.x, extents.y, extents.z));
            let iso = Isometry::translation(center.x, center.y, center.z);

            if let Some(toi) = cuboid.cast_ray(&iso, &ray, max_distance, true) {
                if best.map_or(true, |hit| toi < hit.distance) {
                    best = Some(PickHit {
                        node: id,
                        distance: toi,
                        point: origin + direction * toi,
                    });
                }
            }
        }

        best
    }

    /// Add a point light to the scene.
    pub fn add_light(&mut self, light: PointLight) -> LightId {
        let id = LightId(self.next_light);
        self.next_light = self.next_light.wrapping_add(1);
        self.lights.push((id, light));
        id
    }

    /// Remove a light. Returns `false` if it was already gone.
    pub fn remove_light(&mut self, id: LightId) -> bool {
        let before = self.lights.len();
        self.lights.retain(|(light_id, _)| *light_id != id);
        self.lights.len() != before
    }

    pub fn light(&self, id: LightId) -> Option<&PointLight> {
        self.lights
            .iter()
            .find(|(light_id, _)| *light_id == id)
            .map(|(_, light)| light)
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}
