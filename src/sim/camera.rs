//! Top-down camera that follows the target

use glam::Vec2;

use crate::physics::Rect;

/// Axis-aligned view onto the map, kept inside the map bounds
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    /// Visible region in world space
    view: Rect,
    /// Map size in world units
    world_size: Vec2,
}

impl Camera {
    /// Create a camera showing `view_size` of a `world_size` map, anchored
    /// at the top-left corner
    #[must_use]
    pub fn new(view_size: Vec2, world_size: Vec2) -> Self {
        Self {
            view: Rect::new(0.0, 0.0, view_size.x, view_size.y),
            world_size,
        }
    }

    /// Center the view on `target`, clamped so it never shows past the
    /// map edges. A map smaller than the view pins the view to the origin.
    pub fn follow(&mut self, target: Vec2) {
        let max = (self.world_size - self.view.size).max(Vec2::ZERO);
        self.view.position = (target - self.view.size / 2.0).clamp(Vec2::ZERO, max);
    }

    /// Visible region
    #[must_use]
    pub fn view(&self) -> Rect {
        self.view
    }

    /// Whether `bounds` counts as on screen.
    ///
    /// Only the far edges are tested: a region is seen when its top-left
    /// corner, in view coordinates, lies no further right or down than the
    /// view size plus `margin`. Everything above and left of the view
    /// counts as seen, which keeps distant mobs on that side active.
    #[must_use]
    pub fn sees(&self, bounds: &Rect, margin: f32) -> bool {
        let corner = self.to_screen(bounds.position);
        corner.x <= self.view.size.x + margin && corner.y <= self.view.size.y + margin
    }

    /// Convert a world position to view-relative coordinates
    #[must_use]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world - self.view.position
    }
}
