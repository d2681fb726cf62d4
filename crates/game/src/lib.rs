//! Atelier studio logic
//!
//! This crate contains everything above raw physics:
//!
//! - Input state and key bindings
//! - The first-person camera
//! - A small scene graph with ray picking
//! - Carrying props, the proximity zone and the outfit station
//! - Timed effects (flash, notices, screen feed)
//! - Level descriptions and the frame driver
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Simulation::frame                      │
//! │  ┌─────────┐   ┌──────────────┐   ┌───────────────────────┐   │
//! │  │ Input   │──►│ Physics      │──►│ Camera ─► Zone ─►      │   │
//! │  │ state   │   │ (substeps)   │   │ Outfit station         │   │
//! │  └─────────┘   └──────────────┘   └───────────────────────┘   │
//! │        then: drag carried prop, run due deferred tasks        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod camera;
pub mod config;
pub mod effects;
pub mod error;
pub mod input;
pub mod interaction;
pub mod level;
pub mod notify;
pub mod outfit;
pub mod scene;
pub mod simulation;
pub mod zone;

pub use camera::FirstPersonCamera;
pub use config::SimulationConfig;
pub use error::{ConfigError, LevelError};
pub use input::{InputEvent, InputState, KeyBindings, KeyCode};
pub use interaction::{InteractOutcome, InteractionManager};
pub use level::{Level, LevelDesc};
pub use notify::{Announcer, LogAnnouncer, NoticeBoard, RecordingAnnouncer};
pub use outfit::{OutfitStation, VisitOutcome};
pub use scene::{Material, NodeId, SceneGraph, Tag};
pub use simulation::{SimEvent, Simulation};
pub use zone::{ZoneTransition, ZoneTrigger};

// Re-export physics types for convenience
pub use atelier_physics::{
    CollisionQuery, CollisionWorld, ContentFlags, MovementConfig, MovementState, PlayerCommand,
    PlayerController,
};
