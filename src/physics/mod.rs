//! Collision geometry
//!
//! Hit regions, static obstacles and axis-separated collision resolution.

mod collision;
mod rect;

pub use collision::{Axis, Blocked, Obstacle, Occluder, resolve_axis, resolve_collisions};
pub use rect::Rect;
