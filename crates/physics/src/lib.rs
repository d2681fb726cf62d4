//! Atelier Physics
//!
//! Kinematic physics for a single first-person walker. There is exactly one
//! simulated body, the player capsule; everything else is static geometry.
//!
//! # Architecture
//!
//! - **Collision**: answers "where does this capsule overlap the world" with a
//!   single resolved [`Contact`]
//! - **Movement**: turns commands into velocity, integrates it, and uses the
//!   contact to push the capsule back out
//!
//! The movement code only depends on the [`CollisionQuery`] trait, so tests
//! and alternative world representations can stand in for [`CollisionWorld`].

pub mod collision;
pub mod error;
pub mod movement;

// Re-export commonly used types
pub use collision::{CollisionQuery, CollisionWorld, Contact, ContentFlags, PlayerCapsule};
pub use error::CollisionError;
pub use movement::{
    CommandButtons, MovementConfig, MovementState, PlayerCommand, PlayerController,
};
