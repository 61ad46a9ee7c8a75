//! Static obstacles and axis-separated collision resolution

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// Anything that can block line of sight for obstacle avoidance.
///
/// Avoidance only needs a center and a bounding radius, so walls (and any
/// other blocker a game wants to add) are consumed through this trait.
pub trait Occluder {
    /// Center of the blocker in world space
    fn position(&self) -> Vec2;

    /// Radius of the circle that encloses the blocker
    fn bounding_radius(&self) -> f32;
}

/// A static axis-aligned wall
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// World-space bounds
    pub bounds: Rect,
}

impl Obstacle {
    /// Create an obstacle from its top-left corner and size
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            bounds: Rect::new(x, y, width, height),
        }
    }
}

impl Occluder for Obstacle {
    fn position(&self) -> Vec2 {
        self.bounds.center()
    }

    fn bounding_radius(&self) -> f32 {
        // Full diagonal, not half
        self.bounds.diagonal()
    }
}

/// Movement axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal
    X,
    /// Vertical
    Y,
}

/// Which axes were blocked during a resolution pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    /// Horizontal movement was stopped
    pub x: bool,
    /// Vertical movement was stopped
    pub y: bool,
}

/// Resolve a single axis against the obstacle set.
///
/// `hit` must already be centered on the candidate position along `axis`.
/// On contact the position is snapped flush to the first overlapping
/// obstacle, the velocity component along `axis` is zeroed and `hit` is
/// re-centered. Returns whether a contact happened.
pub fn resolve_axis(
    hit: &mut Rect,
    position: &mut Vec2,
    velocity: &mut Vec2,
    obstacles: &[Obstacle],
    axis: Axis,
) -> bool {
    let Some(wall) = obstacles.iter().find(|o| o.bounds.intersects(hit)) else {
        return false;
    };

    let wall_center = wall.bounds.center();
    let hit_center = hit.center();
    match axis {
        Axis::X => {
            if wall_center.x > hit_center.x {
                position.x = wall.bounds.left() - hit.size.x / 2.0;
            } else if wall_center.x < hit_center.x {
                position.x = wall.bounds.right() + hit.size.x / 2.0;
            }
            velocity.x = 0.0;
            hit.set_center(Vec2::new(position.x, hit_center.y));
        }
        Axis::Y => {
            if wall_center.y < hit_center.y {
                position.y = wall.bounds.bottom() + hit.size.y / 2.0;
            } else if wall_center.y > hit_center.y {
                position.y = wall.bounds.top() - hit.size.y / 2.0;
            }
            velocity.y = 0.0;
            hit.set_center(Vec2::new(hit_center.x, position.y));
        }
    }
    true
}

/// Move `hit` to `position` one axis at a time, resolving each against the
/// obstacle set.
///
/// X is resolved first with the previous vertical position, then Y. A body
/// sliding diagonally into a wall keeps moving along the free axis.
pub fn resolve_collisions(
    hit: &mut Rect,
    position: &mut Vec2,
    velocity: &mut Vec2,
    obstacles: &[Obstacle],
) -> Blocked {
    let previous = hit.center();

    hit.set_center(Vec2::new(position.x, previous.y));
    let x = resolve_axis(hit, position, velocity, obstacles, Axis::X);

    hit.set_center(Vec2::new(hit.center().x, position.y));
    let y = resolve_axis(hit, position, velocity, obstacles, Axis::Y);

    Blocked { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mob_hit(center: Vec2) -> Rect {
        Rect::from_center(center, Vec2::splat(20.0))
    }

    #[test]
    fn test_obstacle_radius_is_diagonal() {
        let wall = Obstacle::new(0.0, 0.0, 30.0, 40.0);
        assert!((wall.bounding_radius() - 50.0).abs() < 0.001);
        assert!((wall.position() - Vec2::new(15.0, 20.0)).length() < 0.001);
    }

    #[test]
    fn test_blocked_moving_right() {
        let walls = [Obstacle::new(100.0, 0.0, 64.0, 200.0)];
        let mut hit = mob_hit(Vec2::new(85.0, 50.0));
        let mut position = Vec2::new(95.0, 50.0);
        let mut velocity = Vec2::new(60.0, 0.0);

        let blocked = resolve_collisions(&mut hit, &mut position, &mut velocity, &walls);

        assert!(blocked.x);
        assert!(!blocked.y);
        assert!((position.x - 90.0).abs() < 0.001);
        assert_eq!(velocity.x, 0.0);
        assert!((hit.center() - position).length() < 0.001);
    }

    #[test]
    fn test_blocked_moving_up() {
        let walls = [Obstacle::new(0.0, 0.0, 200.0, 64.0)];
        let mut hit = mob_hit(Vec2::new(50.0, 80.0));
        let mut position = Vec2::new(50.0, 70.0);
        let mut velocity = Vec2::new(0.0, -60.0);

        let blocked = resolve_collisions(&mut hit, &mut position, &mut velocity, &walls);

        assert!(!blocked.x);
        assert!(blocked.y);
        assert!((position.y - 74.0).abs() < 0.001);
        assert_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_diagonal_slide_keeps_free_axis() {
        // Wall to the right; moving down-right should keep sliding down
        let walls = [Obstacle::new(100.0, 0.0, 64.0, 400.0)];
        let mut hit = mob_hit(Vec2::new(89.0, 100.0));
        let mut position = Vec2::new(95.0, 106.0);
        let mut velocity = Vec2::new(50.0, 50.0);

        let blocked = resolve_collisions(&mut hit, &mut position, &mut velocity, &walls);

        assert!(blocked.x);
        assert!(!blocked.y);
        assert!((position.x - 90.0).abs() < 0.001);
        assert!((position.y - 106.0).abs() < 0.001);
        assert_eq!(velocity, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_free_movement_untouched() {
        let walls = [Obstacle::new(500.0, 500.0, 64.0, 64.0)];
        let mut hit = mob_hit(Vec2::new(10.0, 10.0));
        let mut position = Vec2::new(14.0, 12.0);
        let mut velocity = Vec2::new(4.0, 2.0);

        let blocked = resolve_collisions(&mut hit, &mut position, &mut velocity, &walls);

        assert_eq!(blocked, Blocked::default());
        assert_eq!(position, Vec2::new(14.0, 12.0));
        assert_eq!(velocity, Vec2::new(4.0, 2.0));
    }
}
