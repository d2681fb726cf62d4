//! Collision detection against static world geometry.
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: static boxes and triangles, filled once at load time
//! - [`PlayerCapsule`]: the swept-sphere volume of the player
//! - [`Contact`]: resolved penetration normal and depth
//! - [`CollisionQuery`]: the capsule query the movement code depends on

mod contact;
mod flags;
mod world;

pub use contact::{CollisionQuery, Contact, PlayerCapsule};
pub use flags::ContentFlags;
pub use world::{CollisionBrush, CollisionWorld, DEFAULT_CONTACT_SKIN};
