//! Simulation context
//!
//! Ties the grid, the walls, the mobs and the target together and advances
//! them one tick at a time.

mod camera;
mod simulation;

pub use camera::Camera;
pub use simulation::{Simulation, Target};
