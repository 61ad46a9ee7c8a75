//! Mob component and per-tick update
//!
//! A [`Mob`] owns everything about one zombie that other mobs never read:
//! its rolled stats, health, held path, motion state and timers. Its
//! continuous state lives next to it in a [`Kinematics`] component so
//! the flocking snapshot can be taken without touching the rest.
//!
//! One update runs the motion state machine, blends the steering forces for
//! the chosen behaviour, integrates, and slides the hit region against the
//! walls one axis at a time.

use std::f32::consts::TAU;

use glam::Vec2;

use super::fsm::{Behaviour, MotionContext, StateMachine, Wandering};
use super::pathfinding::Path;
use super::schedule::{AttackCooldown, RepathSchedule};
use super::steering::{
    Alignment, Cohesion, Neighbor, ObstacleAvoidance, PathFollower, Pursue, Separation,
    SteeringAgent, SteeringBehavior, SteeringOutput, Wander, move_from_rest,
};
use crate::core::{BehaviourWeights, MobArchetype, PathingConfig, RandomSource, SteeringConfig};
use crate::ecs::Kinematics;
use crate::physics::{Obstacle, Rect, resolve_collisions};

/// Everything outside the mob that one update reads
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// Simulation time in seconds
    pub now: f64,
    /// Target position
    pub target_position: Vec2,
    /// Target velocity
    pub target_velocity: Vec2,
    /// Other on-screen mobs, as committed last tick
    pub neighbors: &'a [Neighbor],
    /// Static walls, for collision
    pub obstacles: &'a [Obstacle],
    /// Tile-sized wall cells, for obstacle avoidance
    pub occluders: &'a [Obstacle],
    /// Steering tuning
    pub config: &'a SteeringConfig,
}

/// Result of one mob update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MobStep {
    /// Motion state to commit
    pub kinematics: Kinematics,
    /// Name of the newly entered motion state, if it changed
    pub state_changed: Option<&'static str>,
    /// The held path was used up this tick
    pub path_finished: bool,
}

/// Advance one body by `dt`: `v += a*dt`, cap `|v|` at `speed`, then
/// `p += v*dt + a*dt²/2`. Returns `(position, velocity)`.
#[must_use]
pub fn integrate(position: Vec2, velocity: Vec2, acceleration: Vec2, speed: f32, dt: f32) -> (Vec2, Vec2) {
    let velocity = (velocity + acceleration * dt).clamp_length_max(speed);
    let position = position + velocity * dt + 0.5 * acceleration * dt * dt;
    (position, velocity)
}

/// Per-mob state
#[derive(Debug)]
pub struct Mob {
    archetype: MobArchetype,
    health: f32,
    follower: PathFollower,
    motion: StateMachine<MotionContext>,
    behaviour: Behaviour,
    schedule: RepathSchedule,
    cooldown: AttackCooldown,
    on_screen: bool,
}

impl Mob {
    /// Create a mob at full health, wandering
    #[must_use]
    pub fn new(archetype: MobArchetype) -> Self {
        Self {
            archetype,
            health: archetype.health,
            follower: PathFollower::new(),
            motion: StateMachine::new(Wandering),
            behaviour: Behaviour::Wander,
            schedule: RepathSchedule::new(),
            cooldown: AttackCooldown::new(),
            on_screen: false,
        }
    }

    /// Rolled stats
    #[must_use]
    pub fn archetype(&self) -> &MobArchetype {
        &self.archetype
    }

    /// Current health
    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether health has run out
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Lower health by `amount`, returning what is left
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health -= amount.max(0.0);
        self.health
    }

    /// Hit region centered on `position`
    #[must_use]
    pub fn hit_rect(&self, position: Vec2) -> Rect {
        Rect::from_center(position, Vec2::splat(self.archetype.hit_size))
    }

    /// Radius enclosing the hit region
    #[must_use]
    pub fn bounding_radius(&self) -> f32 {
        self.archetype.bounding_radius()
    }

    /// Whether the camera sees this mob
    #[must_use]
    pub fn is_on_screen(&self) -> bool {
        self.on_screen
    }

    /// Record camera visibility for this tick
    pub fn set_on_screen(&mut self, on_screen: bool) {
        self.on_screen = on_screen;
    }

    /// Name of the active motion state
    #[must_use]
    pub fn motion_state(&self) -> &'static str {
        self.motion.current_state_name()
    }

    /// Steering blend chosen on the last update
    #[must_use]
    pub fn behaviour(&self) -> Behaviour {
        self.behaviour
    }

    /// Held path follower
    #[must_use]
    pub fn follower(&self) -> &PathFollower {
        &self.follower
    }

    /// Whether this mob wants a path search now. Mobs already holding a
    /// path never ask.
    pub fn wants_path(
        &mut self,
        now: f64,
        target_distance: f32,
        config: &PathingConfig,
        rng: &mut dyn RandomSource,
    ) -> bool {
        !self.follower.has_path()
            && self
                .schedule
                .should_request(now, self.on_screen, target_distance, config, rng)
    }

    /// Store the result of a search. `None` keeps any path already held.
    pub fn receive_path(&mut self, now: f64, path: Option<Path>, config: &PathingConfig) {
        self.schedule.record_search(now, path.is_some(), config);
        if let Some(path) = path {
            self.follower.assign(path);
        }
    }

    /// Whether a contact attack can land
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.cooldown.can_attack()
    }

    /// Start the attack cooldown. The mob holds still until it ends.
    pub fn trigger_attack(&mut self) {
        self.cooldown.trigger(self.archetype.attack_cooldown);
    }

    /// Run one tick from the committed `kinematics`
    pub fn update(
        &mut self,
        kinematics: Kinematics,
        surroundings: &Surroundings<'_>,
        rng: &mut dyn RandomSource,
        dt: f32,
    ) -> MobStep {
        let config = surroundings.config;
        let had_path = self.follower.has_path();
        if self.schedule.take_expired(surroundings.now) {
            log::trace!("path expired after {}s", surroundings.now);
            self.follower.clear();
        }

        let previous_state = self.motion.current_state_name();
        let mut ctx = MotionContext::new(
            kinematics.position.distance(surroundings.target_position),
            self.archetype.detect_radius,
            self.follower.has_path(),
        );
        self.motion.update(&mut ctx);
        self.behaviour = ctx.behaviour;
        let state_changed = (!self.motion.is_in_state(previous_state))
            .then(|| self.motion.current_state_name());

        let mut agent = SteeringAgent {
            position: kinematics.position,
            velocity: kinematics.velocity,
            speed: self.archetype.speed,
            seek_force: self.archetype.seek_force,
        };

        let (primary, weights, facing) = match self.behaviour {
            Behaviour::Pursue => {
                let pursue = Pursue::new(surroundings.target_position, surroundings.target_velocity);
                (
                    pursue.calculate(&agent),
                    &config.pursuing,
                    Some(surroundings.target_position - kinematics.position),
                )
            }
            Behaviour::FollowPath => {
                let waypoint = self.follower.current_waypoint();
                (
                    self.follower.follow(&agent, config.waypoint_radius, config.approach_radius),
                    &config.following,
                    waypoint.map(|w| w - kinematics.position),
                )
            }
            Behaviour::Wander => {
                if agent.velocity.length_squared() < f32::EPSILON {
                    agent.velocity =
                        move_from_rest(agent.velocity, kinematics.acceleration, agent.speed, dt);
                }
                let wander = Wander::new(
                    config.wander_ring_distance,
                    self.archetype.wander_radius,
                    rng.range(0.0, TAU),
                );
                (wander.calculate(&agent), &config.wandering, None)
            }
        };

        let mut force = self.blend(&agent, primary, weights, surroundings);
        if config.clamp_total_force {
            force = force.clamp_length_max(agent.seek_force);
        }

        let mut next = kinematics;
        next.acceleration = force.linear;
        let (mut position, mut velocity) =
            integrate(kinematics.position, agent.velocity, force.linear, agent.speed, dt);

        if self.cooldown.can_attack() {
            let mut hit = self.hit_rect(kinematics.position);
            resolve_collisions(&mut hit, &mut position, &mut velocity, surroundings.obstacles);
            next.position = position;
        }
        next.velocity = velocity;
        next.face(facing.unwrap_or(velocity));

        self.cooldown.tick(dt);

        let path_finished = had_path && !self.follower.has_path();
        if path_finished {
            self.schedule.clear_expiry();
        }

        MobStep {
            kinematics: next,
            state_changed,
            path_finished,
        }
    }

    /// Weighted sum of the primary force, obstacle avoidance and the three
    /// flocking terms
    fn blend(
        &self,
        agent: &SteeringAgent,
        primary: SteeringOutput,
        weights: &BehaviourWeights,
        surroundings: &Surroundings<'_>,
    ) -> SteeringOutput {
        let config = surroundings.config;
        let neighbors = surroundings.neighbors;

        let avoidance = ObstacleAvoidance {
            obstacles: surroundings.occluders,
            line_of_sight: config.line_of_sight,
        };
        let separation = Separation {
            neighbors,
            radius: self.bounding_radius() * config.separation_factor,
        };
        let alignment = Alignment {
            neighbors,
            radius: config.flock_radius,
        };
        let cohesion = Cohesion {
            neighbors,
            radius: config.flock_radius,
        };

        primary
            .scale(weights.primary)
            .combine(avoidance.calculate(agent).scale(weights.avoidance))
            .combine(separation.calculate(agent).scale(weights.separation))
            .combine(alignment.calculate(agent).scale(weights.alignment))
            .combine(cohesion.calculate(agent).scale(weights.cohesion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::grid::OccupancyGrid;
    use crate::ai::pathfinding::find_path;
    use crate::core::SequenceRandom;
    use glam::IVec2;

    const DT: f32 = 1.0 / 60.0;

    fn archetype() -> MobArchetype {
        MobArchetype {
            speed: 100.0,
            seek_force: 20.0,
            ..Default::default()
        }
    }

    fn surroundings<'a>(target: Vec2, config: &'a SteeringConfig) -> Surroundings<'a> {
        Surroundings {
            now: 0.0,
            target_position: target,
            target_velocity: Vec2::ZERO,
            neighbors: &[],
            obstacles: &[],
            occluders: &[],
            config,
        }
    }

    #[test]
    fn test_integrate_at_rest_stays_put() {
        let mut position = Vec2::new(12.0, -3.0);
        let mut velocity = Vec2::ZERO;

        for _ in 0..100 {
            (position, velocity) = integrate(position, velocity, Vec2::ZERO, 100.0, DT);
        }

        assert_eq!(position, Vec2::new(12.0, -3.0));
        assert_eq!(velocity, Vec2::ZERO);
    }

    #[test]
    fn test_integrate_caps_speed() {
        let (_, velocity) = integrate(Vec2::ZERO, Vec2::new(95.0, 0.0), Vec2::new(1000.0, 0.0), 100.0, DT);
        assert!((velocity.length() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_pursuit_from_rest_heads_east() {
        let config = SteeringConfig::default();
        let mut mob = Mob::new(archetype());
        let mut rng = SequenceRandom::constant(0.5);
        let start = Kinematics::at(Vec2::ZERO);

        let step = mob.update(start, &surroundings(Vec2::new(300.0, 0.0), &config), &mut rng, DT);

        assert_eq!(mob.behaviour(), Behaviour::Pursue);
        assert_eq!(step.state_changed, Some("Pursuing"));
        let velocity = step.kinematics.velocity;
        assert!(velocity.length() <= 20.0 * DT + 1e-5);
        assert!(velocity.x > 0.0);
        assert!(velocity.y.abs() < 1e-6);
        assert!(step.kinematics.rotation.abs() < 1e-6);
        assert!(step.kinematics.position.x > 0.0);
    }

    #[test]
    fn test_out_of_range_wanders() {
        let config = SteeringConfig::default();
        let mut mob = Mob::new(archetype());
        let mut rng = SequenceRandom::constant(0.25);

        let step = mob.update(
            Kinematics::at(Vec2::ZERO),
            &surroundings(Vec2::new(5000.0, 0.0), &config),
            &mut rng,
            DT,
        );

        assert_eq!(mob.behaviour(), Behaviour::Wander);
        assert_eq!(step.state_changed, None);
        assert!(step.kinematics.velocity.is_finite());
        assert!(step.kinematics.velocity.length() <= 100.0 + 1e-3);
    }

    #[test]
    fn test_cooldown_pauses_integration() {
        let config = SteeringConfig::default();
        let mut mob = Mob::new(archetype());
        let mut rng = SequenceRandom::constant(0.5);
        mob.trigger_attack();
        assert!(!mob.can_attack());

        let start = Kinematics::at(Vec2::new(50.0, 50.0));
        let step = mob.update(start, &surroundings(Vec2::new(100.0, 50.0), &config), &mut rng, DT);

        assert_eq!(step.kinematics.position, start.position);
    }

    #[test]
    fn test_walls_stop_motion() {
        let mut config = SteeringConfig::default();
        config.pursuing.avoidance = 0.0;
        let mut mob = Mob::new(archetype());
        let mut rng = SequenceRandom::constant(0.5);
        let wall = [Obstacle::new(141.0, -100.0, 64.0, 200.0)];

        let mut kin = Kinematics::at(Vec2::ZERO);
        kin.velocity = Vec2::new(100.0, 0.0);
        let mut env = surroundings(Vec2::new(300.0, 0.0), &config);
        env.obstacles = &wall;

        for _ in 0..120 {
            kin = mob.update(kin, &env, &mut rng, DT).kinematics;
        }

        assert!((kin.position.x - 101.0).abs() < 1e-3, "Hit region rests flush with the wall");
        assert!(kin.position.y.abs() < 1e-3);
    }

    #[test]
    fn test_follows_assigned_path_then_drops_it() {
        let config = SteeringConfig::default();
        let pathing = PathingConfig::default();
        let grid = OccupancyGrid::new(10, 10, 64.0);
        let path = find_path(&grid, IVec2::new(0, 0), IVec2::new(2, 0));

        let mut mob = Mob::new(MobArchetype {
            speed: 150.0,
            seek_force: 135.0,
            ..Default::default()
        });
        mob.receive_path(0.0, path, &pathing);
        assert!(mob.follower().has_path());

        let mut rng = SequenceRandom::constant(0.5);
        let mut kin = Kinematics::at(Vec2::new(32.0, 32.0));
        let env = surroundings(Vec2::new(5000.0, 5000.0), &config);

        let mut finished = false;
        for _ in 0..600 {
            let step = mob.update(kin, &env, &mut rng, DT);
            kin = step.kinematics;
            if step.path_finished {
                finished = true;
                break;
            }
        }

        assert!(finished, "Path should be consumed");
        assert!(!mob.follower().has_path());
        assert!(kin.position.x > 100.0);
    }

    #[test]
    fn test_path_holder_does_not_request() {
        let pathing = PathingConfig::default();
        let grid = OccupancyGrid::new(4, 4, 64.0);
        let mut rng = SequenceRandom::constant(0.0);
        let mut mob = Mob::new(archetype());
        mob.set_on_screen(true);

        assert!(mob.wants_path(0.0, 2000.0, &pathing, &mut rng));

        mob.receive_path(0.0, find_path(&grid, IVec2::ZERO, IVec2::new(3, 3)), &pathing);
        assert!(!mob.wants_path(10.0, 2000.0, &pathing, &mut rng));
    }

    #[test]
    fn test_failed_search_keeps_wandering() {
        let pathing = PathingConfig::default();
        let mut mob = Mob::new(archetype());

        mob.receive_path(0.0, None, &pathing);

        assert!(!mob.follower().has_path());
        assert_eq!(mob.motion_state(), "Wandering");
    }

    #[test]
    fn test_damage_and_death() {
        let mut mob = Mob::new(MobArchetype {
            health: 100.0,
            ..Default::default()
        });

        assert_eq!(mob.take_damage(60.0), 40.0);
        assert!(!mob.is_dead());
        mob.take_damage(40.0);
        assert!(mob.is_dead());
    }

    #[test]
    fn test_hit_rect_centered() {
        let mob = Mob::new(archetype());
        let hit = mob.hit_rect(Vec2::new(100.0, 100.0));

        assert_eq!(hit.center(), Vec2::new(100.0, 100.0));
        assert_eq!(hit.size, Vec2::splat(80.0));
    }
}
