//! Simulation event queue
//!
//! The simulation core never talks to audio, HUD or item spawning directly.
//! It records what happened during a tick as [`SimEvent`]s; the surrounding
//! game reads them after the tick.
//!
//! The queue is double-buffered: events pushed during tick N become readable
//! once `swap()` runs at the end of tick N, and stay readable until the end
//! of tick N+1.
//!
//! # Example
//!
//! ```ignore
//! sim.tick(dt);
//! for event in sim.events().iter() {
//!     if let SimEvent::LootDropped { position, loot } = event {
//!         spawn_item(*position, *loot);
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;
use serde::{Deserialize, Serialize};

// ============================================================================
// Event Types
// ============================================================================

/// Item left behind by a dead mob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loot {
    /// Rifle pickup
    Rifle,
    /// Shotgun pickup
    Shotgun,
    /// Handgun pickup
    Handgun,
    /// Health pack
    Health,
    /// Ammunition
    Ammo,
    /// Armour
    Armour,
}

impl Loot {
    /// Weapon drops
    pub const WEAPONS: [Self; 3] = [Self::Rifle, Self::Shotgun, Self::Handgun];

    /// Supply drops
    pub const SUPPLIES: [Self; 3] = [Self::Health, Self::Ammo, Self::Armour];
}

/// Things that happened during a simulation tick.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SimEvent {
    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------
    /// A mob was added.
    MobSpawned {
        /// The new mob
        mob: Entity,
        /// Spawn position
        position: Vec2,
    },

    /// A mob took damage.
    MobDamaged {
        /// The damaged mob
        mob: Entity,
        /// Damage dealt
        amount: f32,
        /// Health left
        remaining: f32,
    },

    /// A mob died and was removed.
    MobKilled {
        /// The removed mob
        mob: Entity,
        /// Where it died
        position: Vec2,
    },

    /// A dead mob dropped an item.
    LootDropped {
        /// Where to place the item
        position: Vec2,
        /// What to place
        loot: Loot,
    },

    // -------------------------------------------------------------------------
    // Combat
    // -------------------------------------------------------------------------
    /// A mob touched the target while its attack was ready.
    TargetAttacked {
        /// The attacker
        mob: Entity,
        /// Damage to apply to the target
        damage: f32,
        /// Attacker facing, in radians
        rotation: f32,
        /// Distance to shove the target along the attacker's facing
        knockback: f32,
    },

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------
    /// A path search succeeded.
    PathFound {
        /// The mob that requested it
        mob: Entity,
        /// Number of waypoints
        waypoints: usize,
        /// Total edge cost
        cost: u32,
    },

    /// A path search found no route.
    PathFailed {
        /// The mob that requested it
        mob: Entity,
    },

    /// A mob switched motion state.
    MotionChanged {
        /// The mob
        mob: Entity,
        /// Name of the new state
        state: &'static str,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for tick-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this tick
    pending: VecDeque<SimEvent>,
    /// Events from the last completed tick
    processing: VecDeque<SimEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Record an event for the current tick.
    #[inline]
    pub fn push(&mut self, event: SimEvent) {
        self.pending.push_back(event);
    }

    /// Publish this tick's events and start collecting the next tick's.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the last completed tick.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.processing.iter()
    }

    /// Drain all events from the last completed tick.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = SimEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any published events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Number of published events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Number of events recorded for the current tick.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and published).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
