//! Core simulation services
//!
//! Configuration, events, randomness and timing shared by every other module

mod config;
mod events;
mod random;
mod time;

pub use config::{
    BehaviourWeights, ConfigError, MobArchetype, PathingConfig, SimConfig, SpawnTable,
    SteeringConfig,
};
pub use events::{EventQueue, Loot, SimEvent};
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use time::{FrameClock, SimClock};
