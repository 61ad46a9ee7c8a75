//! Timers gating path requests and contact attacks

use crate::core::{PathingConfig, RandomSource};

/// Decides when a mob may ask for a new path and when its current one goes stale
#[derive(Debug, Clone, Copy, Default)]
pub struct RepathSchedule {
    /// Simulation time at which the next request is allowed
    next_request: f64,
    /// Simulation time at which the held path expires
    expires_at: Option<f64>,
}

impl RepathSchedule {
    /// A schedule that allows a request immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the refresh interval has passed since the last request
    #[must_use]
    pub fn is_due(&self, now: f64) -> bool {
        now >= self.next_request
    }

    /// Full request gate: off-screen mobs and mobs near the target never
    /// search, and eligible mobs only search with the configured probability.
    ///
    /// A rejected roll still waits out a full interval.
    pub fn should_request(
        &mut self,
        now: f64,
        on_screen: bool,
        target_distance: f32,
        config: &PathingConfig,
        rng: &mut dyn RandomSource,
    ) -> bool {
        if !on_screen || target_distance <= config.min_request_distance || !self.is_due(now) {
            return false;
        }
        if rng.chance(config.request_probability) {
            true
        } else {
            self.next_request = now + f64::from(config.refresh_interval);
            false
        }
    }

    /// Record a finished search; a found path lives for one interval
    pub fn record_search(&mut self, now: f64, found: bool, config: &PathingConfig) {
        let interval = f64::from(config.refresh_interval);
        self.next_request = now + interval;
        self.expires_at = found.then_some(now + interval);
    }

    /// Whether the held path has outlived its interval. Clears the expiry
    /// when it fires.
    pub fn take_expired(&mut self, now: f64) -> bool {
        match self.expires_at {
            Some(at) if now >= at => {
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }

    /// Forget any expiry, used when the path is dropped for other reasons
    pub fn clear_expiry(&mut self) {
        self.expires_at = None;
    }
}

/// Contact attack cooldown. While cooling down the mob holds still.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttackCooldown {
    remaining: f32,
}

impl AttackCooldown {
    /// A ready cooldown
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an attack can land now
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Start the cooldown after an attack
    pub fn trigger(&mut self, duration: f32) {
        self.remaining = duration.max(0.0);
    }

    /// Count the cooldown down
    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    /// Seconds until the next attack is allowed
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SequenceRandom;

    #[test]
    fn test_request_requires_screen_and_distance() {
        let config = PathingConfig::default();
        let mut schedule = RepathSchedule::new();
        let mut rng = SequenceRandom::constant(0.0);

        assert!(!schedule.should_request(0.0, false, 2000.0, &config, &mut rng));
        assert!(!schedule.should_request(0.0, true, 500.0, &config, &mut rng));
        assert!(schedule.should_request(0.0, true, 2000.0, &config, &mut rng));
    }

    #[test]
    fn test_failed_roll_waits_an_interval() {
        let config = PathingConfig::default();
        let mut schedule = RepathSchedule::new();
        let mut rng = SequenceRandom::new(vec![0.9, 0.1]);

        assert!(!schedule.should_request(1.0, true, 2000.0, &config, &mut rng));
        assert!(!schedule.is_due(5.9));
        assert!(schedule.should_request(6.0, true, 2000.0, &config, &mut rng));
    }

    #[test]
    fn test_found_path_expires() {
        let config = PathingConfig::default();
        let mut schedule = RepathSchedule::new();

        schedule.record_search(2.0, true, &config);

        assert!(!schedule.take_expired(6.5));
        assert!(schedule.take_expired(7.0));
        assert!(!schedule.take_expired(8.0), "Expiry fires once");
        assert!(schedule.is_due(7.0));
    }

    #[test]
    fn test_failed_search_has_no_expiry() {
        let config = PathingConfig::default();
        let mut schedule = RepathSchedule::new();

        schedule.record_search(0.0, false, &config);

        assert!(!schedule.take_expired(100.0));
        assert!(!schedule.is_due(4.0));
    }

    #[test]
    fn test_attack_cooldown() {
        let mut cooldown = AttackCooldown::new();
        assert!(cooldown.can_attack());

        cooldown.trigger(0.5);
        assert!(!cooldown.can_attack());

        cooldown.tick(0.25);
        assert!(!cooldown.can_attack());
        cooldown.tick(0.25);
        assert!(cooldown.can_attack());
        assert_eq!(cooldown.remaining(), 0.0);
    }
}
