//! Simulation configuration
//!
//! All tuning values live here and can be loaded from RON or JSON. Missing
//! fields fall back to the defaults below, so a config file only needs to
//! list what it changes.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::random::RandomSource;

/// Top-level simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for the simulation's random source
    pub seed: u64,
    /// Tile size in world units
    pub tile_size: f32,
    /// Grid width in tiles
    pub grid_width: u32,
    /// Grid height in tiles
    pub grid_height: u32,
    /// Camera view width in world units
    pub view_width: f32,
    /// Camera view height in world units
    pub view_height: f32,
    /// Longest tick delta in seconds
    pub max_frame_delta: f32,
    /// Steering tuning
    pub steering: SteeringConfig,
    /// Path request tuning
    pub pathing: PathingConfig,
    /// Mob stat rolls
    pub spawn: SpawnTable,
}

impl Default for SimConfig {
    fn default() -> Self {
        let tile_size = 64.0;
        Self {
            seed: 0x5eed,
            tile_size,
            grid_width: 32,
            grid_height: 24,
            view_width: 896.0,
            view_height: 512.0,
            max_frame_delta: 0.1,
            steering: SteeringConfig::for_tile_size(tile_size),
            pathing: PathingConfig::default(),
            spawn: SpawnTable::for_tile_size(tile_size),
        }
    }
}

impl SimConfig {
    /// World size in world units
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.grid_width as f32 * self.tile_size,
            self.grid_height as f32 * self.tile_size,
        )
    }

    /// Check the settings for values the simulation cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.tile_size > 0.0) {
            return invalid("tile_size must be positive");
        }
        if self.grid_width == 0 || self.grid_height == 0 {
            return invalid("grid dimensions must be non-zero");
        }
        if !(self.max_frame_delta > 0.0) {
            return invalid("max_frame_delta must be positive");
        }
        if !(0.0..=1.0).contains(&self.pathing.request_probability) {
            return invalid("pathing.request_probability must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.spawn.loot_drop_chance) {
            return invalid("spawn.loot_drop_chance must be within [0, 1]");
        }
        let spawn = &self.spawn;
        if spawn.speeds.is_empty()
            || spawn.healths.is_empty()
            || spawn.damages.is_empty()
            || spawn.seek_force_factors.is_empty()
            || spawn.wander_radii.is_empty()
        {
            return invalid("spawn lists must not be empty");
        }
        if spawn.speeds.iter().any(|&s| !(s > 0.0)) {
            return invalid("spawn.speeds must be positive");
        }
        Ok(())
    }

    /// Parse a config from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the config as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load a config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = self.to_ron_string()?;
        fs::write(path, ron_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load a config, picking the format from the file extension
    /// (`.json` is JSON, anything else is RON)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }
}

/// Weights for one steering blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourWeights {
    /// Pursue, follow-path or wander force, depending on the blend
    pub primary: f32,
    /// Obstacle avoidance
    pub avoidance: f32,
    /// Separation
    pub separation: f32,
    /// Alignment
    pub alignment: f32,
    /// Cohesion
    pub cohesion: f32,
}

impl BehaviourWeights {
    /// Blend used while chasing the target
    #[must_use]
    pub const fn pursuing() -> Self {
        Self {
            primary: 2.75,
            avoidance: 2.5,
            separation: 2.6,
            alignment: 1.0,
            cohesion: 1.0,
        }
    }

    /// Blend used while walking a path
    #[must_use]
    pub const fn following() -> Self {
        Self {
            primary: 1.0,
            avoidance: 1.75,
            separation: 2.0,
            alignment: 1.0,
            cohesion: 1.0,
        }
    }

    /// Blend used while wandering
    #[must_use]
    pub const fn wandering() -> Self {
        Self::following()
    }
}

impl Default for BehaviourWeights {
    fn default() -> Self {
        Self::following()
    }
}

/// Steering radii, distances and blend weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance inside which arrival slows the mob
    pub approach_radius: f32,
    /// Distance ahead of the mob of the wander ring
    pub wander_ring_distance: f32,
    /// Neighborhood radius for alignment and cohesion
    pub flock_radius: f32,
    /// Separation radius as a multiple of the mob's bounding radius
    pub separation_factor: f32,
    /// Look-ahead distance for obstacle avoidance
    pub line_of_sight: f32,
    /// Distance at which a waypoint counts as reached
    pub waypoint_radius: f32,
    /// Cap the blended force at the mob's seek force
    pub clamp_total_force: bool,
    /// Blend while chasing
    pub pursuing: BehaviourWeights,
    /// Blend while walking a path
    pub following: BehaviourWeights,
    /// Blend while wandering
    pub wandering: BehaviourWeights,
}

impl SteeringConfig {
    /// Defaults scaled to a tile size
    #[must_use]
    pub fn for_tile_size(tile_size: f32) -> Self {
        Self {
            approach_radius: 150.0,
            wander_ring_distance: 100.0,
            flock_radius: 10.0,
            separation_factor: 1.5,
            line_of_sight: tile_size / 2.75,
            waypoint_radius: tile_size / 2.0,
            clamp_total_force: true,
            pursuing: BehaviourWeights::pursuing(),
            following: BehaviourWeights::following(),
            wandering: BehaviourWeights::wandering(),
        }
    }
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self::for_tile_size(64.0)
    }
}

/// When and how often mobs ask for paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Minimum seconds between searches for one mob, and lifetime of a path
    pub refresh_interval: f32,
    /// Chance that an eligible mob actually searches
    pub request_probability: f32,
    /// Only mobs at least this far from the target search
    pub min_request_distance: f32,
    /// Searches allowed per tick across all mobs
    pub max_searches_per_tick: usize,
    /// Treat other mobs' tiles as blocked while searching
    pub avoid_other_mobs: bool,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 5.0,
            request_probability: 0.75,
            min_request_distance: 800.0,
            max_searches_per_tick: 2,
            avoid_other_mobs: false,
        }
    }
}

/// Stat pools a mob's archetype is rolled from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTable {
    /// Speed caps
    pub speeds: Vec<f32>,
    /// Starting health values
    pub healths: Vec<f32>,
    /// Contact damage values
    pub damages: Vec<f32>,
    /// Seek force as a fraction of speed
    pub seek_force_factors: Vec<f32>,
    /// Wander ring radii
    pub wander_radii: Vec<f32>,
    /// Detection radius
    pub detect_radius: f32,
    /// Hit region edge length
    pub hit_size: f32,
    /// Seconds between contact attacks
    pub attack_cooldown: f32,
    /// Chance of dropping loot on death
    pub loot_drop_chance: f32,
    /// Distance the target is shoved by a contact attack
    pub attack_knockback: f32,
}

impl SpawnTable {
    /// Defaults scaled to a tile size
    #[must_use]
    pub fn for_tile_size(tile_size: f32) -> Self {
        Self {
            speeds: (7..15).map(|s| s as f32 * 10.0).collect(),
            healths: (5..10).map(|h| h as f32 * 100.0).collect(),
            damages: (50..75).map(|d| d as f32).collect(),
            seek_force_factors: (1..10).map(|f| f as f32 / 10.0).collect(),
            wander_radii: (4..10).map(|r| r as f32 * 10.0).collect(),
            detect_radius: 400.0,
            hit_size: tile_size + 16.0,
            attack_cooldown: 0.5,
            loot_drop_chance: 0.015,
            attack_knockback: 10.0,
        }
    }

    /// Roll a concrete archetype
    pub fn roll(&self, rng: &mut dyn RandomSource) -> MobArchetype {
        let fallback = MobArchetype::default();
        let speed = pick(rng, &self.speeds, fallback.speed);
        let health = pick(rng, &self.healths, fallback.health);
        let damage = pick(rng, &self.damages, fallback.damage);
        let seek_factor = pick(rng, &self.seek_force_factors, 0.5);
        let wander_radius = pick(rng, &self.wander_radii, fallback.wander_radius);

        MobArchetype {
            speed,
            health,
            damage,
            seek_force: seek_factor * speed,
            wander_radius,
            detect_radius: self.detect_radius,
            hit_size: self.hit_size,
            attack_cooldown: self.attack_cooldown,
            loot_drop_chance: self.loot_drop_chance,
            attack_knockback: self.attack_knockback,
        }
    }
}

fn pick(rng: &mut dyn RandomSource, values: &[f32], fallback: f32) -> f32 {
    rng.pick_index(values.len())
        .and_then(|i| values.get(i))
        .copied()
        .unwrap_or(fallback)
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self::for_tile_size(64.0)
    }
}

/// Resolved, fixed stats of one mob
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MobArchetype {
    /// Speed cap
    pub speed: f32,
    /// Starting health
    pub health: f32,
    /// Contact damage
    pub damage: f32,
    /// Steering force cap
    pub seek_force: f32,
    /// Wander ring radius
    pub wander_radius: f32,
    /// Distance at which the target is noticed
    pub detect_radius: f32,
    /// Hit region edge length
    pub hit_size: f32,
    /// Seconds between contact attacks
    pub attack_cooldown: f32,
    /// Chance of dropping loot on death
    pub loot_drop_chance: f32,
    /// Distance the target is shoved by a contact attack
    pub attack_knockback: f32,
}

impl MobArchetype {
    /// Radius of the circle enclosing the hit region
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.hit_size * std::f32::consts::SQRT_2 / 2.0
    }
}

impl Default for MobArchetype {
    fn default() -> Self {
        Self {
            speed: 100.0,
            health: 500.0,
            damage: 50.0,
            seek_force: 50.0,
            wander_radius: 60.0,
            detect_radius: 400.0,
            hit_size: 80.0,
            attack_cooldown: 0.5,
            loot_drop_chance: 0.015,
            attack_knockback: 10.0,
        }
    }
}

/// Errors that can occur while loading or saving a config
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// Parsed but unusable values
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Serialize(e) => write!(f, "Serialization error: {e}"),
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::random::SequenceRandom;

    #[test]
    fn test_defaults_validate() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world_size(), Vec2::new(2048.0, 1536.0));
        assert_eq!(config.spawn.speeds.first(), Some(&70.0));
        assert_eq!(config.spawn.speeds.last(), Some(&140.0));
        assert_eq!(config.spawn.wander_radii.len(), 6);
    }

    #[test]
    fn test_config_serialization_ron() {
        let mut config = SimConfig::default();
        config.pathing.avoid_other_mobs = true;
        config.steering.pursuing.primary = 3.0;

        let ron_str = config.to_ron_string().unwrap();
        assert!(ron_str.contains("avoid_other_mobs"));

        let loaded = SimConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let loaded = SimConfig::from_ron_str("(seed: 42, pathing: (max_searches_per_tick: 9))").unwrap();

        assert_eq!(loaded.seed, 42);
        assert_eq!(loaded.pathing.max_searches_per_tick, 9);
        assert_eq!(loaded.pathing.refresh_interval, 5.0);
        assert_eq!(loaded.tile_size, 64.0);
    }

    #[test]
    fn test_config_serialization_json() {
        let config = SimConfig::default();

        let json_str = serde_json::to_string(&config).unwrap();
        let loaded: SimConfig = serde_json::from_str(&json_str).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = SimConfig::default();
        config.tile_size = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.pathing.request_probability = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SimConfig::default();
        config.spawn.speeds.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            SimConfig::from_ron_str("(tile_size: -1.0)"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SimConfig::from_ron_str("(tile_size: "),
            Err(ConfigError::Deserialize(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = SimConfig::load("/definitely/not/here/horde.ron");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = std::env::temp_dir();
        let ron_path = dir.join(format!("horde_config_{}.ron", std::process::id()));
        let json_path = dir.join(format!("horde_config_{}.json", std::process::id()));

        let mut config = SimConfig::default();
        config.seed = 99;
        config.save_ron(&ron_path).unwrap();
        config.save_json(&json_path).unwrap();

        assert_eq!(SimConfig::load(&ron_path).unwrap().seed, 99);
        assert_eq!(SimConfig::load(&json_path).unwrap().seed, 99);

        let _ = fs::remove_file(ron_path);
        let _ = fs::remove_file(json_path);
    }

    #[test]
    fn test_roll_archetype() {
        let table = SpawnTable::default();
        let mut rng = SequenceRandom::new(vec![0.0, 0.99, 0.5, 0.99, 0.0]);

        let archetype = table.roll(&mut rng);

        assert_eq!(archetype.speed, 70.0);
        assert_eq!(archetype.health, 900.0);
        assert_eq!(archetype.damage, 62.0);
        assert!((archetype.seek_force - 0.9 * 70.0).abs() < 0.001);
        assert_eq!(archetype.wander_radius, 40.0);
        assert_eq!(archetype.hit_size, 80.0);
    }

    #[test]
    fn test_bounding_radius() {
        let archetype = MobArchetype {
            hit_size: 80.0,
            ..Default::default()
        };
        assert!((archetype.bounding_radius() - 56.568_54).abs() < 0.001);
    }
}
