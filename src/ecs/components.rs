//! Common ECS components

use glam::Vec2;

/// Continuous motion state of a mob
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematics {
    /// Center position in world space
    pub position: Vec2,
    /// Velocity in world units per second
    pub velocity: Vec2,
    /// Acceleration applied during the last tick
    pub acceleration: Vec2,
    /// Facing in radians, measured from the +X axis
    pub rotation: f32,
}

impl Kinematics {
    /// Create a resting body at a position
    #[must_use]
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Unit vector along the facing
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        Vec2::from_angle(self.rotation)
    }

    /// Face along `direction`. A zero direction keeps the current facing.
    pub fn face(&mut self, direction: Vec2) {
        if let Some(dir) = direction.try_normalize() {
            self.rotation = dir.y.atan2(dir.x);
        }
    }

    /// Displace by a delta
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}
