//! Collision world containing all static geometry.
//!
//! The world is filled once by the level loader and is read-only afterwards.
//! It answers one question each substep: where does the player capsule
//! overlap solid geometry, and how far must it move to get out.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real};
use parry3d::query::{contact, PointQuery};
use parry3d::shape::{Ball, Capsule, SharedShape};

use super::contact::{CollisionQuery, Contact, PlayerCapsule};
use super::flags::ContentFlags;
use crate::error::CollisionError;

/// Default distance under which a separated capsule still counts as touching.
pub const DEFAULT_CONTACT_SKIN: f32 = 1e-4;

/// Ternary search steps when looking for the capsule point deepest in a box.
const SEGMENT_SEARCH_STEPS: usize = 32;

/// A piece of collision geometry in the world.
#[derive(Debug, Clone)]
pub struct CollisionBrush {
    /// Unique identifier for this brush.
    pub id: u32,
    /// The collision shape.
    pub shape: SharedShape,
    /// Position and orientation in world space.
    pub transform: Isometry<Real>,
    /// Content flags used for mask filtering.
    pub contents: ContentFlags,
    /// Face normal of a one-sided triangle. Contacts from behind the face are
    /// ignored. `None` for solids and two-sided triangles.
    pub facing: Option<Vec3>,
    /// World-space bounds used to skip far-away brushes.
    min: Vec3,
    max: Vec3,
}

/// The collision world containing all static geometry.
///
/// Supports axis-aligned boxes and triangle soups. Capsule queries visit every
/// brush whose bounds overlap the capsule.
///
/// # Resolution policy
///
/// When the capsule overlaps several brushes, a probe copy of the capsule is
/// pushed out of each one in insertion order and the pushes are summed. The
/// reported contact normal is the direction of the total push and the depth is
/// its length. Brushes that only touch the capsule (within the contact skin)
/// contribute their normal but no depth.
#[derive(Debug)]
pub struct CollisionWorld {
    brushes: Vec<CollisionBrush>,
    next_id: u32,
    mask: ContentFlags,
    contact_skin: f32,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            brushes: Vec::new(),
            next_id: 0,
            mask: ContentFlags::MASK_PLAYER_SOLID,
            contact_skin: DEFAULT_CONTACT_SKIN,
        }
    }

    /// Add an axis-aligned box to the world.
    ///
    /// # Arguments
    ///
    /// * `center` - Center position of the box in world space
    /// * `half_extents` - Half-size in each axis (x, y, z)
    /// * `contents` - Content flags for collision filtering
    pub fn add_box(
        &mut self,
        center: Vec3,
        half_extents: Vec3,
        contents: ContentFlags,
    ) -> Result<u32, CollisionError> {
        if !center.is_finite() || !half_extents.is_finite() {
            return Err(CollisionError::NonFinite);
        }
        if half_extents.min_element() <= 0.0 {
            return Err(CollisionError::InvalidExtents(half_extents));
        }

        let id = self.next_id();
        self.brushes.push(CollisionBrush {
            id,
            shape: SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z),
            transform: Isometry::translation(center.x, center.y, center.z),
            contents,
            facing: None,
            min: center - half_extents,
            max: center + half_extents,
        });

        Ok(id)
    }

    /// Add a triangle soup in world space.
    ///
    /// One-sided triangles only push the capsule out along their winding
    /// normal (counter-clockwise front). Degenerate triangles are skipped.
    ///
    /// Returns the number of triangles added.
    pub fn add_triangles(
        &mut self,
        triangles: &[[Vec3; 3]],
        two_sided: bool,
        contents: ContentFlags,
    ) -> Result<usize, CollisionError> {
        if triangles
            .iter()
            .flatten()
            .any(|vertex| !vertex.is_finite())
        {
            return Err(CollisionError::NonFinite);
        }

        let mut added = 0;
        for &[a, b, c] in triangles {
            let face = (b - a).cross(c - a);
            if face.length_squared() <= f32::EPSILON * f32::EPSILON {
                log::trace!("skipping degenerate triangle {a:?} {b:?} {c:?}");
                continue;
            }

            let id = self.next_id();
            self.brushes.push(CollisionBrush {
                id,
                shape: SharedShape::triangle(to_point(a), to_point(b), to_point(c)),
                transform: Isometry::identity(),
                contents,
                facing: (!two_sided).then(|| face.normalize()),
                min: a.min(b).min(c),
                max: a.max(b).max(c),
            });
            added += 1;
        }

        Ok(added)
    }

    /// Get the number of collision brushes.
    pub fn brush_count(&self) -> usize {
        self.brushes.len()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Contact between one brush and the capsule, if they touch or overlap.
    fn brush_contact(&self, brush: &CollisionBrush, capsule: &PlayerCapsule) -> Option<Contact> {
        let (min, max) = capsule.bounds();
        let skin = Vec3::splat(self.contact_skin);
        if (min - skin).cmpgt(brush.max).any() || (max + skin).cmplt(brush.min).any() {
            return None;
        }

        // Brush first, so `normal1` points out of the geometry towards the capsule.
        let result = if brush.shape.as_cuboid().is_some() {
            // Capsule-cuboid contact loses its normal with the axis over the
            // box centre. A ball at the deepest segment point does not.
            let deepest = deepest_segment_point(brush, capsule.start(), capsule.end());
            contact(
                &brush.transform,
                brush.shape.as_ref(),
                &Isometry::translation(deepest.x, deepest.y, deepest.z),
                &Ball::new(capsule.radius()),
                self.contact_skin,
            )
        } else {
            let shape = Capsule::new(
                to_point(capsule.start()),
                to_point(capsule.end()),
                capsule.radius(),
            );
            contact(
                &brush.transform,
                brush.shape.as_ref(),
                &Isometry::identity(),
                &shape,
                self.contact_skin,
            )
        };

        let found = match result {
            Ok(found) => found?,
            Err(unsupported) => {
                log::warn!("brush {} skipped: {unsupported:?}", brush.id);
                return None;
            }
        };

        let normal = Vec3::new(found.normal1.x, found.normal1.y, found.normal1.z);
        if let Some(facing) = brush.facing {
            if normal.dot(facing) < 0.0 {
                return None;
            }
        }

        Some(Contact {
            normal,
            depth: (-found.dist).max(0.0),
        })
    }
}

impl CollisionQuery for CollisionWorld {
    fn query_capsule(&self, capsule: &PlayerCapsule) -> Option<Contact> {
        let mut probe = *capsule;
        let mut push = Vec3::ZERO;
        let mut touching = Vec3::ZERO;
        let mut hits = 0usize;

        for brush in &self.brushes {
            if !self.mask.intersects(brush.contents) {
                continue;
            }

            let Some(contact) = self.brush_contact(brush, &probe) else {
                continue;
            };

            hits += 1;
            touching += contact.normal;
            if contact.depth > 0.0 {
                let correction = contact.normal * contact.depth;
                push += correction;
                probe.translate(correction);
            }
        }

        if hits == 0 {
            return None;
        }

        let depth = push.length();
        let normal = if depth > 0.0 {
            push / depth
        } else {
            touching.normalize_or_zero()
        };

        if normal == Vec3::ZERO {
            return None;
        }

        log::trace!("capsule contact: {hits} brushes, normal={normal:?} depth={depth}");
        Some(Contact { normal, depth })
    }
}

/// Signed distance from `point` to a brush; negative inside.
fn signed_distance(brush: &CollisionBrush, point: Vec3) -> f32 {
    let point = to_point(point);
    let projection =
        PointQuery::project_point(brush.shape.as_ref(), &brush.transform, &point, false);
    let distance = (projection.point - point).norm();
    if projection.is_inside {
        -distance
    } else {
        distance
    }
}

/// Point of the segment `start..end` with the smallest signed distance to a
/// convex brush. The distance is convex along the segment, so a ternary
/// search finds the minimum. Endpoints are checked exactly.
fn deepest_segment_point(brush: &CollisionBrush, start: Vec3, end: Vec3) -> Vec3 {
    let at = |t: f32| signed_distance(brush, start.lerp(end, t));

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    for _ in 0..SEGMENT_SEARCH_STEPS {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        if at(m1) <= at(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }

    [0.0, 1.0, (lo + hi) * 0.5]
        .into_iter()
        .map(|t| (t, at(t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(start, |(t, _)| start.lerp(end, t))
}

#[inline]
fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

// ============================================================================
// Tests
// ============================================================================
