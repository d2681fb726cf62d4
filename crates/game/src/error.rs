//! Errors surfaced by configuration and level loading.
//!
//! The simulation itself never fails at runtime; everything here is raised
//! before the first frame runs.

use std::path::PathBuf;

use atelier_physics::CollisionError;
use thiserror::Error;

/// Errors that can occur while loading or validating a [`crate::SimulationConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur while building a [`crate::Level`].
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("node name {0:?} is used more than once")]
    DuplicateNode(String),

    #[error("node {node:?} refers to parent {parent:?} which is not defined before it")]
    UnknownParent { node: String, parent: String },

    #[error("{role} node {name:?} does not exist")]
    MissingNode { role: &'static str, name: String },

    #[error("collision geometry of node {node:?}: {source}")]
    Collision {
        node: String,
        #[source]
        source: CollisionError,
    },
}
