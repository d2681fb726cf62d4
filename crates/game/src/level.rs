//! Level loading and management.
//!
//! A level is described by a [`LevelDesc`] (usually a RON file) and built
//! once into a scene graph plus the collision world the player moves in.
//! The collision world is read-only afterwards.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use atelier_physics::{CollisionWorld, ContentFlags};
use glam::Vec3;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::scene::{Material, NodeId, SceneGraph, Tag};

/// Where the player starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    /// Foot position in world space.
    pub position: Vec3,

    /// Initial facing direction (yaw in radians, 0 looks down -Z).
    pub facing: f32,
}

/// How a node's geometry takes part in player collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionKind {
    None,
    Solid,
    /// Blocks the player but nothing else.
    PlayerClip,
}

impl CollisionKind {
    fn contents(self) -> Option<ContentFlags> {
        match self {
            CollisionKind::None => None,
            CollisionKind::Solid => Some(ContentFlags::SOLID),
            CollisionKind::PlayerClip => Some(ContentFlags::PLAYER_CLIP),
        }
    }
}

fn default_visible() -> bool {
    true
}

/// One scene node in a level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDesc {
    /// Unique node name.
    pub name: String,

    /// Semantic tag. Derived from the name when absent.
    #[serde(default)]
    pub tag: Option<Tag>,

    /// Name of a node defined earlier in the list. Top level when absent.
    #[serde(default)]
    pub parent: Option<String>,

    /// Position relative to the parent.
    #[serde(default)]
    pub position: Vec3,

    /// Half extents of the node's box. Used for picking and, if the node
    /// collides, as a collision box.
    #[serde(default)]
    pub extents: Option<Vec3>,

    /// Collision behaviour. Defaults by tag; always none below a
    /// non-colliding ancestor.
    #[serde(default)]
    pub collision: Option<CollisionKind>,

    /// Extra collision triangles relative to the node, counter-clockwise
    /// front faces.
    #[serde(default)]
    pub triangles: Vec<[Vec3; 3]>,

    /// Collide with the triangles from both sides.
    #[serde(default)]
    pub two_sided: bool,

    #[serde(default)]
    pub material: Option<Material>,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl NodeDesc {
    pub fn new(name: impl Into<String>, position: Vec3) -> Self {
        Self {
            name: name.into(),
            tag: None,
            parent: None,
            position,
            extents: None,
            collision: None,
            triangles: Vec::new(),
            two_sided: false,
            material: None,
            visible: true,
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_extents(mut self, extents: Vec3) -> Self {
        self.extents = Some(extents);
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_collision(mut self, collision: CollisionKind) -> Self {
        self.collision = Some(collision);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }
}

/// Serializable level description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDesc {
    pub id: String,
    pub name: String,
    pub spawn: SpawnPoint,
    pub nodes: Vec<NodeDesc>,

    /// Node whose position centres the proximity zone.
    pub point_of_interest: String,

    /// Node that shows the outfit the model wears. Hidden until dressed.
    pub outfit_target: String,

    /// Node that shows the ambient picture feed.
    #[serde(default)]
    pub feed_screen: Option<String>,
}

impl LevelDesc {
    /// Read a RON level description.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self, LevelError> {
        ron::from_str(text).map_err(|source| LevelError::Parse {
            origin: origin.to_string(),
            source,
        })
    }

    /// The photo studio: a walled room with a model at the far end, a cart
    /// of clothes and a chair near the entrance, a photo camera and a TV.
    pub fn studio() -> Self {
        let room = 20.0;
        let wall_height = 5.0;
        let wall = 0.5;

        let mut nodes = vec![
            NodeDesc::new("Floor", Vec3::new(0.0, -0.5, 0.0))
                .with_extents(Vec3::new(room, 0.5, room))
                .with_material(Material::Color(0x808080)),
            NodeDesc::new("Ceiling", Vec3::new(0.0, wall_height + 0.5, 0.0))
                .with_extents(Vec3::new(room, 0.5, room)),
            NodeDesc::new("Wall001", Vec3::new(0.0, wall_height / 2.0, -room - wall))
                .with_extents(Vec3::new(room, wall_height / 2.0, wall)),
            NodeDesc::new("Wall002", Vec3::new(0.0, wall_height / 2.0, room + wall))
                .with_extents(Vec3::new(room, wall_height / 2.0, wall)),
            NodeDesc::new("Wall003", Vec3::new(room + wall, wall_height / 2.0, 0.0))
                .with_extents(Vec3::new(wall, wall_height / 2.0, room)),
            NodeDesc::new("Wall004", Vec3::new(-room - wall, wall_height / 2.0, 0.0))
                .with_extents(Vec3::new(wall, wall_height / 2.0, room)),
        ];

        // Thin backdrop partition, blocking from either side
        let mut grid = NodeDesc::new("GridWall001", Vec3::new(-8.0, 0.0, 0.0));
        grid.triangles = vec![
            [
                Vec3::new(0.0, 0.0, -4.0),
                Vec3::new(0.0, 0.0, 4.0),
                Vec3::new(0.0, 3.0, 4.0),
            ],
            [
                Vec3::new(0.0, 0.0, -4.0),
                Vec3::new(0.0, 3.0, 4.0),
                Vec3::new(0.0, 3.0, -4.0),
            ],
        ];
        grid.two_sided = true;
        nodes.push(grid);

        nodes.extend([
            NodeDesc::new("MaleModel", Vec3::new(0.0, 0.9, -8.0))
                .with_extents(Vec3::new(0.3, 0.9, 0.2)),
            NodeDesc::new("TShirt", Vec3::new(0.0, 0.5, 0.0))
                .with_parent("MaleModel")
                .with_extents(Vec3::new(0.3, 0.3, 0.15)),
            NodeDesc::new("Cart001", Vec3::new(2.0, 0.5, 6.0))
                .with_extents(Vec3::new(0.6, 0.5, 0.4)),
            NodeDesc::new("TShirt001", Vec3::new(-0.2, 0.6, 0.0))
                .with_parent("Cart001")
                .with_extents(Vec3::new(0.25, 0.1, 0.2)),
            NodeDesc::new("TShirt002", Vec3::new(0.2, 0.6, 0.0))
                .with_parent("Cart001")
                .with_extents(Vec3::new(0.25, 0.1, 0.2)),
            NodeDesc::new("Chair001", Vec3::new(-3.0, 0.45, 5.0))
                .with_extents(Vec3::new(0.3, 0.45, 0.3)),
            NodeDesc::new("PhotoCamera001", Vec3::new(-5.0, 1.2, -4.0))
                .with_extents(Vec3::new(0.15, 0.15, 0.2))
                .with_collision(CollisionKind::None),
            NodeDesc::new("Tripod", Vec3::new(-5.0, 0.55, -4.0))
                .with_extents(Vec3::new(0.2, 0.55, 0.2))
                .with_collision(CollisionKind::PlayerClip),
            NodeDesc::new("TV001", Vec3::new(0.0, 2.5, -room + 0.2))
                .with_extents(Vec3::new(1.6, 0.9, 0.1)),
            NodeDesc::new("TVScreen", Vec3::new(0.0, 0.0, 0.11))
                .with_parent("TV001")
                .with_tag(Tag::Screen)
                .with_extents(Vec3::new(1.5, 0.8, 0.01)),
        ]);

        Self {
            id: "studio".to_string(),
            name: "Photo Studio".to_string(),
            spawn: SpawnPoint {
                position: Vec3::new(0.0, 0.0, 12.0),
                facing: 0.0,
            },
            nodes,
            point_of_interest: "MaleModel".to_string(),
            outfit_target: "TShirt".to_string(),
            feed_screen: Some("TVScreen".to_string()),
        }
    }
}

/// A built level: scene graph, collision world and the special nodes the
/// simulation hooks into.
#[derive(Debug)]
pub struct Level {
    /// Level identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    pub scene: SceneGraph,

    /// Collision world for physics.
    pub collision: CollisionWorld,

    pub spawn: SpawnPoint,

    /// Centre of the proximity zone.
    pub point_of_interest: Vec3,

    pub outfit_target: NodeId,

    pub feed_screen: Option<NodeId>,
}

impl Level {
    /// Build a level from its description.
    ///
    /// `seed` drives the random tint given to wearables without a material.
    pub fn build(desc: &LevelDesc, seed: u64) -> Result<Self, LevelError> {
        let mut scene = SceneGraph::new();
        let mut collision = CollisionWorld::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let root = scene.root();
        let mut ids: HashMap<&str, NodeId> = HashMap::new();
        let mut colliding: HashSet<NodeId> = HashSet::new();

        for node in &desc.nodes {
            if ids.contains_key(node.name.as_str()) {
                return Err(LevelError::DuplicateNode(node.name.clone()));
            }

            let parent = match &node.parent {
                Some(name) => *ids.get(name.as_str()).ok_or_else(|| LevelError::UnknownParent {
                    node: node.name.clone(),
                    parent: name.clone(),
                })?,
                None => root,
            };

            let tag = node.tag.unwrap_or_else(|| Tag::from_name(&node.name));
            let id = scene.add_node(parent, node.name.as_str(), tag, node.position);

            let material = match (&node.material, tag) {
                (Some(material), _) => Some(material.clone()),
                (None, Tag::Wearable) => Some(Material::Color(rng.gen_range(0..=0xffffff))),
                (None, _) => None,
            };

            let scene_node = scene.node_mut(id);
            scene_node.visible = node.visible;
            scene_node.material = material;
            scene_node.pick_extents = node.extents;

            let kind = if parent == root || colliding.contains(&parent) {
                node.collision.unwrap_or(if tag.collides_by_default() {
                    CollisionKind::Solid
                } else {
                    CollisionKind::None
                })
            } else {
                CollisionKind::None
            };

            if let Some(contents) = kind.contents() {
                colliding.insert(id);
                Self::add_geometry(&mut collision, &scene, id, node, contents)?;
            }

            ids.insert(node.name.as_str(), id);
        }

        let point_of_interest = ids
            .get(desc.point_of_interest.as_str())
            .map(|id| scene.world_position(*id))
            .ok_or_else(|| LevelError::MissingNode {
                role: "point of interest",
                name: desc.point_of_interest.clone(),
            })?;

        let outfit_target = *ids.get(desc.outfit_target.as_str()).ok_or_else(|| {
            LevelError::MissingNode {
                role: "outfit target",
                name: desc.outfit_target.clone(),
            }
        })?;
        scene.node_mut(outfit_target).visible = false;

        let feed_screen = match &desc.feed_screen {
            Some(name) => Some(*ids.get(name.as_str()).ok_or_else(|| LevelError::MissingNode {
                role: "feed screen",
                name: name.clone(),
            })?),
            None => None,
        };

        info!(
            "built level {:?}: {} nodes, {} collision brushes",
            desc.name,
            scene.node_count() - 1,
            collision.brush_count()
        );

        Ok(Self {
            id: desc.id.clone(),
            name: desc.name.clone(),
            scene,
            collision,
            spawn: desc.spawn.clone(),
            point_of_interest,
            outfit_target,
            feed_screen,
        })
    }

    /// Build the built-in studio.
    pub fn studio(seed: u64) -> Result<Self, LevelError> {
        Self::build(&LevelDesc::studio(), seed)
    }

    fn add_geometry(
        collision: &mut CollisionWorld,
        scene: &SceneGraph,
        id: NodeId,
        node: &NodeDesc,
        contents: ContentFlags,
    ) -> Result<(), LevelError> {
        let origin = scene.world_position(id);
        let to_error = |source| LevelError::Collision {
            node: node.name.clone(),
            source,
        };

        if let Some(extents) = node.extents {
            collision
                .add_box(origin, extents, contents)
                .map_err(to_error)?;
        }

        if !node.triangles.is_empty() {
            let triangles: Vec<[Vec3; 3]> = node
                .triangles
                .iter()
                .map(|tri| tri.map(|vertex| vertex + origin))
                .collect();
            let added = collision
                .add_triangles(&triangles, node.two_sided, contents)
                .map_err(to_error)?;
            debug!("{:?}: {added} collision triangles", node.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_physics::{CollisionQuery, PlayerCapsule};

    /// Capsule floating just above the floor at (x, z).
    fn probe(x: f32, z: f32) -> PlayerCapsule {
        PlayerCapsule::standing(Vec3::new(x, 0.3, z), 0.35, 1.7)
    }

    fn minimal() -> LevelDesc {
        LevelDesc {
            id: "minimal".to_string(),
            name: "Minimal".to_string(),
            spawn: SpawnPoint {
                position: Vec3::ZERO,
                facing: 0.0,
            },
            nodes: vec![
                NodeDesc::new("Model", Vec3::new(0.0, 0.9, -5.0)),
                NodeDesc::new("Outfit", Vec3::ZERO)
                    .with_parent("Model")
                    .with_tag(Tag::Wearable),
            ],
            point_of_interest: "Model".to_string(),
            outfit_target: "Outfit".to_string(),
            feed_screen: None,
        }
    }

    #[test]
    fn test_studio_builds() {
        let level = Level::studio(7).unwrap();

        assert_eq!(level.spawn.position, Vec3::new(0.0, 0.0, 12.0));
        assert_eq!(level.point_of_interest, Vec3::new(0.0, 0.9, -8.0));
        assert!(!level.scene.node(level.outfit_target).visible);
        assert!(level.feed_screen.is_some());

        let cart = level.scene.find("Cart001").unwrap();
        assert_eq!(level.scene.node(cart).tag, Tag::Cart);
        assert_eq!(level.scene.node(cart).children().len(), 2);
    }

    #[test]
    fn test_carryables_do_not_collide() {
        let level = Level::studio(7).unwrap();

        assert!(level.collision.query_capsule(&probe(2.0, 6.0)).is_none());
        assert!(level.collision.query_capsule(&probe(-3.0, 5.0)).is_none());
        assert!(level.collision.query_capsule(&probe(0.0, -8.0)).is_some());
        assert!(level.collision.query_capsule(&probe(-5.0, -4.0)).is_some());
    }

    #[test]
    fn test_two_sided_partition() {
        let level = Level::studio(7).unwrap();

        let east = level.collision.query_capsule(&probe(-7.8, 0.0)).unwrap();
        assert!(east.normal.x > 0.9);
        let west = level.collision.query_capsule(&probe(-8.2, 0.0)).unwrap();
        assert!(west.normal.x < -0.9);
    }

    #[test]
    fn test_ceiling_does_not_collide() {
        let level = Level::studio(7).unwrap();
        let capsule = PlayerCapsule::standing(Vec3::new(0.0, 3.5, 0.0), 0.35, 1.7);
        assert!(level.collision.query_capsule(&capsule).is_none());
    }

    #[test]
    fn test_wearables_are_tinted() {
        let a = Level::studio(3).unwrap();
        let b = Level::studio(3).unwrap();

        for name in ["TShirt001", "TShirt002"] {
            let id = a.scene.find(name).unwrap();
            let material = a.scene.node(id).material.clone();
            assert!(matches!(material, Some(Material::Color(c)) if c <= 0xffffff));
            assert_eq!(material, b.scene.node(b.scene.find(name).unwrap()).material);
        }
    }

    #[test]
    fn test_children_of_carryables_never_collide() {
        let mut desc = minimal();
        desc.nodes.push(NodeDesc::new("Cart", Vec3::new(3.0, 0.5, 0.0)));
        desc.nodes.push(
            NodeDesc::new("Box", Vec3::ZERO)
                .with_parent("Cart")
                .with_extents(Vec3::splat(0.5))
                .with_collision(CollisionKind::Solid),
        );

        let level = Level::build(&desc, 0).unwrap();
        assert_eq!(level.collision.brush_count(), 0);
    }

    #[test]
    fn test_missing_nodes() {
        let mut desc = minimal();
        desc.outfit_target = "Shirt".to_string();
        assert!(matches!(
            Level::build(&desc, 0),
            Err(LevelError::MissingNode { role: "outfit target", .. })
        ));

        let mut desc = minimal();
        desc.point_of_interest = "Nobody".to_string();
        assert!(matches!(
            Level::build(&desc, 0),
            Err(LevelError::MissingNode { role: "point of interest", .. })
        ));

        let mut desc = minimal();
        desc.feed_screen = Some("TV".to_string());
        assert!(matches!(
            Level::build(&desc, 0),
            Err(LevelError::MissingNode { role: "feed screen", .. })
        ));
    }

    #[test]
    fn test_invalid_structure() {
        let mut desc = minimal();
        desc.nodes.push(NodeDesc::new("Model", Vec3::ZERO));
        assert!(matches!(
            Level::build(&desc, 0),
            Err(LevelError::DuplicateNode(name)) if name == "Model"
        ));

        let mut desc = minimal();
        desc.nodes.push(NodeDesc::new("Orphan", Vec3::ZERO).with_parent("Nowhere"));
        assert!(matches!(Level::build(&desc, 0), Err(LevelError::UnknownParent { .. })));

        let mut desc = minimal();
        desc.nodes
            .push(NodeDesc::new("Crate", Vec3::ZERO).with_extents(Vec3::new(1.0, 0.0, 1.0)));
        assert!(matches!(Level::build(&desc, 0), Err(LevelError::Collision { .. })));
    }

    #[test]
    fn test_ron_round_trip() {
        let desc = LevelDesc::studio();
        let text = ron::ser::to_string_pretty(&desc, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(LevelDesc::parse(&text, "studio").unwrap(), desc);
    }

    #[test]
    fn test_parse_hand_written() {
        let text = r#"(
            id: "tiny",
            name: "Tiny",
            spawn: (position: (0.0, 0.0, 3.0), facing: 0.0),
            nodes: [
                (name: "Floor", position: (0.0, -0.5, 0.0), extents: Some((5.0, 0.5, 5.0))),
                (name: "Model", position: (0.0, 0.9, -2.0)),
                (name: "Outfit", parent: Some("Model"), tag: Some(Wearable)),
            ],
            point_of_interest: "Model",
            outfit_target: "Outfit",
        )"#;

        let desc = LevelDesc::parse(text, "tiny").unwrap();
        let level = Level::build(&desc, 0).unwrap();
        assert_eq!(level.collision.brush_count(), 1);
        assert!(level.feed_screen.is_none());
        assert!(matches!(LevelDesc::parse("(id: ", "bad"), Err(LevelError::Parse { .. })));
    }
}
