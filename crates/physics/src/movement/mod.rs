//! Player movement physics.
//!
//! - Exponential velocity damping, reduced while airborne
//! - Gravity while airborne
//! - Ground and air control impulses, sprint, jump and boost
//! - Positional push-out from the single resolved contact per substep
//!
//! Movement is controlled by the [`PlayerController`] which takes input
//! commands and updates the player's [`MovementState`] through any
//! [`crate::CollisionQuery`].

mod config;
mod controller;
mod state;

pub use config::MovementConfig;
pub use controller::PlayerController;
pub use state::{CommandButtons, MovementState, PlayerCommand};
