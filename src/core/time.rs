//! Frame timing
//!
//! The simulation advances one tick per rendered frame. Long frames (window
//! drags, debugger pauses) are capped so a single tick cannot teleport mobs
//! through walls.

use std::time::Duration;

/// Turns wall-clock frame durations into capped tick deltas
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    /// Largest delta handed to the simulation, in seconds
    max_delta: f32,
}

impl FrameClock {
    /// Create a clock with the given cap in seconds
    #[must_use]
    pub fn new(max_delta: f32) -> Self {
        Self {
            max_delta: max_delta.max(0.0),
        }
    }

    /// Delta for a frame that took `elapsed`
    #[must_use]
    pub fn delta(&self, elapsed: Duration) -> f32 {
        self.clamp(elapsed.as_secs_f32())
    }

    /// Clamp a raw delta in seconds to `[0, max_delta]`
    #[must_use]
    pub fn clamp(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_delta)
        } else {
            0.0
        }
    }

    /// The cap in seconds
    #[must_use]
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

/// Elapsed simulation time and tick count
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    elapsed: f64,
    ticks: u64,
}

impl SimClock {
    /// Start at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.elapsed += f64::from(dt);
        self.ticks += 1;
    }

    /// Seconds since the simulation started
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of ticks run
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
