//! Errors raised while building collision geometry.

use glam::Vec3;
use thiserror::Error;

/// Errors that can occur while filling a [`crate::CollisionWorld`].
#[derive(Debug, Error)]
pub enum CollisionError {
    #[error("collision geometry contains NaN or infinite coordinates")]
    NonFinite,

    #[error("box half extents must be positive, got {0}")]
    InvalidExtents(Vec3),
}
