//! Mob simulation core for a top-down survival shooter
//!
//! This crate provides:
//! - A* pathfinding on an 8-connected tile grid
//! - Steering and flocking behaviors (seek, arrive, wander, pursue,
//!   separation, alignment, cohesion, obstacle avoidance, path following)
//! - A motion state machine and per-mob update loop
//! - A tick-driven simulation context over a hecs registry
//!
//! Rendering, audio, input and asset loading live in the surrounding game.

pub mod ai;
pub mod core;
pub mod ecs;
pub mod physics;
pub mod sim;

// Re-exports for convenience
pub use glam;
pub use hecs;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{Behaviour, Mob, OccupancyGrid, Path, find_path};
    pub use crate::core::{
        ConfigError, EventQueue, Loot, MobArchetype, RandomSource, SeededRandom, SimConfig,
        SimEvent,
    };
    pub use crate::ecs::{Kinematics, MobRegistry};
    pub use crate::physics::{Obstacle, Rect};
    pub use crate::sim::{Camera, Simulation, Target};
    pub use glam::{IVec2, Vec2};
    pub use hecs::Entity;
}
