//! Simulation context
//!
//! [`Simulation`] owns the level geometry, the occupancy grid, every mob and
//! the target snapshot, and advances them together one tick at a time.
//!
//! A tick is compute-then-commit: every mob reads the positions its
//! neighbors committed on the previous tick, and all new positions are
//! written back only after every mob has been updated.

use glam::{IVec2, Vec2};
use hecs::Entity;

use super::camera::Camera;
use crate::ai::{Mob, MobStep, Neighbor, OccupancyGrid, Path, Surroundings, find_path};
use crate::core::{
    ConfigError, EventQueue, FrameClock, Loot, MobArchetype, RandomSource, SeededRandom, SimClock,
    SimConfig, SimEvent,
};
use crate::ecs::{Kinematics, MobRegistry};
use crate::physics::{Obstacle, Rect};

/// The entity the mobs hunt, as seen this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    /// Center position
    pub position: Vec2,
    /// Velocity
    pub velocity: Vec2,
    /// Hit region edge length
    pub hit_size: f32,
}

impl Target {
    /// Hit region centered on the target
    #[must_use]
    pub fn hit_rect(&self) -> Rect {
        Rect::from_center(self.position, Vec2::splat(self.hit_size))
    }
}

impl Default for Target {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            hit_size: 50.0,
        }
    }
}

/// Committed state of one mob at the start of a tick
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    entity: Entity,
    kinematics: Kinematics,
    on_screen: bool,
}

/// Owns and advances the whole mob simulation
pub struct Simulation {
    config: SimConfig,
    grid: OccupancyGrid,
    obstacles: Vec<Obstacle>,
    occluders: Vec<Obstacle>,
    mobs: MobRegistry,
    target: Target,
    camera: Camera,
    rng: Box<dyn RandomSource>,
    events: EventQueue,
    frame_clock: FrameClock,
    clock: SimClock,
}

impl Simulation {
    /// Create an empty simulation seeded from the config
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self::with_random(config, rng)
    }

    /// Create an empty simulation drawing from a custom random source
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate
    pub fn with_random(
        config: SimConfig,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = OccupancyGrid::new(config.grid_width, config.grid_height, config.tile_size);
        let camera = Camera::new(
            Vec2::new(config.view_width, config.view_height),
            config.world_size(),
        );
        log::info!(
            "Simulation ready: {}x{} tiles of {}, view {}x{}",
            config.grid_width,
            config.grid_height,
            config.tile_size,
            config.view_width,
            config.view_height
        );

        Ok(Self {
            frame_clock: FrameClock::new(config.max_frame_delta),
            config,
            grid,
            obstacles: Vec::new(),
            occluders: Vec::new(),
            mobs: MobRegistry::new(),
            target: Target::default(),
            camera,
            rng,
            events: EventQueue::new(),
            clock: SimClock::new(),
        })
    }

    // ========================================================================
    // Level
    // ========================================================================

    /// Add one wall rectangle, blocking every tile it overlaps.
    ///
    /// The whole rectangle is used for collision. Avoidance sees each newly
    /// blocked tile as its own one-tile occluder.
    pub fn add_obstacle(&mut self, bounds: Rect) {
        let tiles = self.grid.add_obstacle(&bounds);
        log::trace!("Obstacle at {:?} blocks {} tiles", bounds.position, tiles.len());
        self.occluders.extend(tiles.into_iter().map(|tile| Obstacle {
            bounds: self.grid.tile_rect(tile),
        }));
        self.obstacles.push(Obstacle { bounds });
    }

    /// Replace the level geometry
    pub fn load_obstacles(&mut self, obstacles: impl IntoIterator<Item = Rect>) {
        self.obstacles.clear();
        self.occluders.clear();
        self.grid.clear_walls();
        for bounds in obstacles {
            self.add_obstacle(bounds);
        }
        log::info!(
            "Loaded {} obstacles covering {} tiles",
            self.obstacles.len(),
            self.grid.wall_count()
        );
    }

    /// Static walls
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// One-tile wall cells steered around by obstacle avoidance
    #[must_use]
    pub fn occluders(&self) -> &[Obstacle] {
        &self.occluders
    }

    /// Navigation grid
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    // ========================================================================
    // Mobs
    // ========================================================================

    /// Spawn a mob with stats rolled from the spawn table
    pub fn spawn_mob(&mut self, position: Vec2) -> Entity {
        let archetype = self.config.spawn.roll(self.rng.as_mut());
        self.spawn_mob_with(position, archetype)
    }

    /// Spawn a mob with fixed stats
    pub fn spawn_mob_with(&mut self, position: Vec2, archetype: MobArchetype) -> Entity {
        let entity = self.mobs.spawn(Kinematics::at(position), Mob::new(archetype));
        log::debug!(
            "Spawned mob {entity:?} at {position} (speed {}, health {})",
            archetype.speed,
            archetype.health
        );
        self.events.push(SimEvent::MobSpawned {
            mob: entity,
            position,
        });
        entity
    }

    /// Deal damage to a mob and shove it by `knockback`.
    ///
    /// Returns the health left, or `None` if the mob does not exist. Mobs
    /// brought to zero are removed at the end of the next tick.
    pub fn damage_mob(&mut self, entity: Entity, amount: f32, knockback: Vec2) -> Option<f32> {
        let remaining = self.mobs.get_mut::<Mob>(entity).ok()?.take_damage(amount);
        if let Ok(mut kinematics) = self.mobs.get_mut::<Kinematics>(entity) {
            kinematics.translate(knockback);
        }
        self.events.push(SimEvent::MobDamaged {
            mob: entity,
            amount,
            remaining,
        });
        Some(remaining)
    }

    /// Mob registry
    #[must_use]
    pub fn mobs(&self) -> &MobRegistry {
        &self.mobs
    }

    /// Number of live mobs
    #[must_use]
    pub fn mob_count(&self) -> u32 {
        self.mobs.len()
    }

    // ========================================================================
    // Target, camera, events
    // ========================================================================

    /// Update the target snapshot for the next tick
    pub fn set_target(&mut self, position: Vec2, velocity: Vec2) {
        self.target.position = position;
        self.target.velocity = velocity;
    }

    /// Current target snapshot
    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Mutable target snapshot
    pub fn target_mut(&mut self) -> &mut Target {
        &mut self.target
    }

    /// Camera
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Events published by the last tick
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Mutable event queue, for draining
    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }

    /// Elapsed time and tick count
    #[must_use]
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // ========================================================================
    // Pathfinding
    // ========================================================================

    /// Find a route between two world positions.
    ///
    /// `searcher` is the mob asking, if any. With `avoid_other_mobs` set the
    /// tiles of every other mob are treated as blocked for this search; the
    /// occupant set is rebuilt from scratch each time.
    pub fn find_path(&mut self, start: Vec2, goal: Vec2, searcher: Option<Entity>) -> Option<Path> {
        let start_tile = self.grid.world_to_grid(start);
        let goal_tile = self.grid.world_to_grid(goal);

        if self.config.pathing.avoid_other_mobs {
            let occupants: Vec<IVec2> = self
                .mobs
                .query::<&Kinematics>()
                .iter()
                .filter(|(entity, _)| Some(*entity) != searcher)
                .map(|(_, kinematics)| self.grid.world_to_grid(kinematics.position))
                .filter(|&tile| tile != start_tile && tile != goal_tile)
                .collect();
            self.grid.set_occupants(occupants);
        } else {
            self.grid.clear_occupants();
        }

        find_path(&self.grid, start_tile, goal_tile)
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let dt = self.frame_clock.clamp(dt);
        self.clock.advance(dt);
        let now = self.clock.elapsed();

        self.camera.follow(self.target.position);
        let snapshot = self.snapshot();

        let neighbors: Vec<(Entity, Neighbor)> = snapshot
            .iter()
            .filter(|s| s.on_screen)
            .map(|s| {
                (
                    s.entity,
                    Neighbor {
                        position: s.kinematics.position,
                        velocity: s.kinematics.velocity,
                    },
                )
            })
            .collect();

        let mut steps: Vec<(Entity, MobStep)> = Vec::with_capacity(snapshot.len());
        let mut others: Vec<Neighbor> = Vec::with_capacity(neighbors.len());
        let mut searches = 0usize;

        for current in snapshot.iter().filter(|s| s.on_screen) {
            if searches < self.config.pathing.max_searches_per_tick
                && self.request_path(current, now)
            {
                searches += 1;
            }

            others.clear();
            others.extend(
                neighbors
                    .iter()
                    .filter(|(entity, _)| *entity != current.entity)
                    .map(|(_, neighbor)| *neighbor),
            );

            let surroundings = Surroundings {
                now,
                target_position: self.target.position,
                target_velocity: self.target.velocity,
                neighbors: &others,
                obstacles: &self.obstacles,
                occluders: &self.occluders,
                config: &self.config.steering,
            };

            let Ok(mut mob) = self.mobs.get_mut::<Mob>(current.entity) else {
                continue;
            };
            let step = mob.update(current.kinematics, &surroundings, self.rng.as_mut(), dt);
            drop(mob);

            if let Some(state) = step.state_changed {
                log::debug!("Mob {:?} -> {state}", current.entity);
                self.events.push(SimEvent::MotionChanged {
                    mob: current.entity,
                    state,
                });
            }
            steps.push((current.entity, step));
        }

        log::trace!(
            "Tick {}: {} of {} mobs updated, {searches} searches",
            self.clock.ticks(),
            steps.len(),
            snapshot.len()
        );

        self.commit(steps);
        self.resolve_attacks();
        self.remove_dead();
        self.events.swap();
    }

    /// Record committed state and refresh on-screen flags
    fn snapshot(&mut self) -> Vec<Snapshot> {
        let margin = self.config.tile_size;
        let camera = &self.camera;

        self.mobs
            .query_mut::<(&Kinematics, &mut Mob)>()
            .into_iter()
            .map(|(entity, (kinematics, mob))| {
                let on_screen = camera.sees(&mob.hit_rect(kinematics.position), margin);
                mob.set_on_screen(on_screen);
                Snapshot {
                    entity,
                    kinematics: *kinematics,
                    on_screen,
                }
            })
            .collect()
    }

    /// Run a search for one mob if its schedule allows. Returns whether a
    /// search ran.
    fn request_path(&mut self, current: &Snapshot, now: f64) -> bool {
        let target_distance = current.kinematics.position.distance(self.target.position);
        let wants = match self.mobs.get_mut::<Mob>(current.entity) {
            Ok(mut mob) => mob.wants_path(
                now,
                target_distance,
                &self.config.pathing,
                self.rng.as_mut(),
            ),
            Err(_) => false,
        };
        if !wants {
            return false;
        }

        let path = self.find_path(
            current.kinematics.position,
            self.target.position,
            Some(current.entity),
        );
        match &path {
            Some(found) => self.events.push(SimEvent::PathFound {
                mob: current.entity,
                waypoints: found.len(),
                cost: found.cost(),
            }),
            None => self.events.push(SimEvent::PathFailed {
                mob: current.entity,
            }),
        }

        if let Ok(mut mob) = self.mobs.get_mut::<Mob>(current.entity) {
            mob.receive_path(now, path, &self.config.pathing);
        }
        true
    }

    fn commit(&mut self, steps: Vec<(Entity, MobStep)>) {
        for (entity, step) in steps {
            if let Ok(mut kinematics) = self.mobs.get_mut::<Kinematics>(entity) {
                *kinematics = step.kinematics;
            }
        }
    }

    /// Mobs touching the target with their attack ready strike and pause
    fn resolve_attacks(&mut self) {
        let target_hit = self.target.hit_rect();

        for (entity, (kinematics, mob)) in self.mobs.query_mut::<(&Kinematics, &mut Mob)>() {
            if !mob.can_attack() || !mob.hit_rect(kinematics.position).intersects(&target_hit) {
                continue;
            }
            mob.trigger_attack();
            let archetype = mob.archetype();
            self.events.push(SimEvent::TargetAttacked {
                mob: entity,
                damage: archetype.damage,
                rotation: kinematics.rotation,
                knockback: archetype.attack_knockback,
            });
        }
    }

    /// Remove mobs with no health left, rolling for loot
    fn remove_dead(&mut self) {
        let dead: Vec<(Entity, Vec2, f32)> = self
            .mobs
            .query::<(&Kinematics, &Mob)>()
            .iter()
            .filter(|(_, (_, mob))| mob.is_dead())
            .map(|(entity, (kinematics, mob))| {
                (entity, kinematics.position, mob.archetype().loot_drop_chance)
            })
            .collect();

        for (entity, position, drop_chance) in dead {
            if self.mobs.despawn(entity).is_err() {
                continue;
            }
            log::debug!("Mob {entity:?} died at {position}");
            self.events.push(SimEvent::MobKilled {
                mob: entity,
                position,
            });

            if self.rng.chance(drop_chance) {
                let table = if self.rng.chance(0.5) {
                    &Loot::WEAPONS
                } else {
                    &Loot::SUPPLIES
                };
                if let Some(&loot) = self.rng.pick_index(table.len()).and_then(|i| table.get(i)) {
                    self.events.push(SimEvent::LootDropped { position, loot });
                }
            }
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("mobs", &self.mobs.len())
            .field("obstacles", &self.obstacles.len())
            .field("target", &self.target)
            .field("ticks", &self.clock.ticks())
            .finish()
    }
}
