//! Axis-aligned rectangle primitive
//!
//! Used for hit regions, obstacle bounds and the camera view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in world space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub position: Vec2,
    /// Size (width, height)
    pub size: Vec2,
}

impl Rect {
    /// Create a new rectangle from its top-left corner and size
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Create a rectangle of the given size centered on `center`
    #[must_use]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            position: center - size * 0.5,
            size,
        }
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Move the rectangle so its center lands on `center`
    pub fn set_center(&mut self, center: Vec2) {
        self.position = center - self.size * 0.5;
    }

    /// Left edge
    #[must_use]
    pub fn left(&self) -> f32 {
        self.position.x
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    /// Top edge
    #[must_use]
    pub fn top(&self) -> f32 {
        self.position.y
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Length of the diagonal
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        self.size.length()
    }

    /// Check if a point is inside the rectangle
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Check whether two rectangles overlap. Touching edges do not count.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 10.0, 100.0, 50.0);

        assert!(rect.contains(Vec2::new(50.0, 30.0)));
        assert!(!rect.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_rect_from_center() {
        let rect = Rect::from_center(Vec2::new(100.0, 100.0), Vec2::new(80.0, 40.0));

        assert!((rect.left() - 60.0).abs() < 0.01);
        assert!((rect.top() - 80.0).abs() < 0.01);
        assert!((rect.center() - Vec2::new(100.0, 100.0)).length() < 0.01);
    }

    #[test]
    fn test_rect_intersects_excludes_touching() {
        let a = Rect::new(0.0, 0.0, 64.0, 64.0);
        let b = Rect::new(64.0, 0.0, 64.0, 64.0);
        let c = Rect::new(63.0, 10.0, 64.0, 64.0);

        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }
}
