//! Steering behaviors for mob movement
//!
//! Each behavior turns an agent's kinematic state into a linear steering
//! force. The mob update blends several of them every tick.

use glam::Vec2;

use super::pathfinding::Path;
use crate::physics::Occluder;

/// Kinematic state a behavior needs from its agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringAgent {
    /// Current position
    pub position: Vec2,
    /// Current velocity
    pub velocity: Vec2,
    /// Speed cap
    pub speed: f32,
    /// Steering force cap
    pub seek_force: f32,
}

/// Another mob as seen by the flocking behaviors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Committed position from the previous tick
    pub position: Vec2,
    /// Committed velocity from the previous tick
    pub velocity: Vec2,
}

/// Output from a steering behavior
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteeringOutput {
    /// Linear acceleration
    pub linear: Vec2,
}

impl SteeringOutput {
    /// Zero steering
    pub const ZERO: Self = Self { linear: Vec2::ZERO };

    /// Wrap a force vector
    #[must_use]
    pub const fn new(linear: Vec2) -> Self {
        Self { linear }
    }

    /// Combine with another steering output
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
        }
    }

    /// Scale the output
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            linear: self.linear * factor,
        }
    }

    /// Limit the magnitude
    #[must_use]
    pub fn clamp_length_max(self, max: f32) -> Self {
        Self {
            linear: self.linear.clamp_length_max(max),
        }
    }

    /// Check if the output is the zero vector
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.linear == Vec2::ZERO
    }
}

/// Trait for steering behaviors
pub trait SteeringBehavior {
    /// Calculate steering based on agent state
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput;
}

/// Steer straight at `target` at full speed, capped by the agent's seek force.
#[must_use]
pub fn seek(agent: &SteeringAgent, target: Vec2) -> SteeringOutput {
    let desired = (target - agent.position).normalize_or_zero() * agent.speed;
    SteeringOutput::new((desired - agent.velocity).clamp_length_max(agent.seek_force))
}

/// Steer so the velocity matches `desired_heading` at full speed, with the
/// force scaled to exactly the seek force. Zero heading gives zero force.
fn steer_towards_heading(agent: &SteeringAgent, desired_heading: Vec2) -> SteeringOutput {
    let Some(heading) = desired_heading.try_normalize() else {
        return SteeringOutput::ZERO;
    };
    let steer = heading * agent.speed - agent.velocity;
    SteeringOutput::new(steer.normalize_or_zero() * agent.seek_force)
}

/// Kick a resting agent into motion.
///
/// Applies one step of `acceleration` and rescales the result to full
/// speed. Returns zero when both inputs are zero.
#[must_use]
pub fn move_from_rest(velocity: Vec2, acceleration: Vec2, speed: f32, dt: f32) -> Vec2 {
    (velocity + acceleration * dt).normalize_or_zero() * speed
}

/// Seek behavior - move towards target
#[derive(Debug, Clone, Copy)]
pub struct Seek {
    /// Target position
    pub target: Vec2,
}

impl Seek {
    /// Create a new seek behavior
    #[must_use]
    pub fn new(target: Vec2) -> Self {
        Self { target }
    }
}

impl SteeringBehavior for Seek {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        seek(agent, self.target)
    }
}

/// Arrive behavior - seek, slowing down linearly inside the approach radius
#[derive(Debug, Clone, Copy)]
pub struct Arrive {
    /// Target position
    pub target: Vec2,
    /// Distance at which the agent starts braking
    pub approach_radius: f32,
}

impl Arrive {
    /// Create a new arrive behavior
    #[must_use]
    pub fn new(target: Vec2, approach_radius: f32) -> Self {
        Self {
            target,
            approach_radius,
        }
    }
}

impl SteeringBehavior for Arrive {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        let to_target = self.target - agent.position;
        let distance = to_target.length();

        let target_speed = if distance < self.approach_radius && self.approach_radius > 0.0 {
            distance / self.approach_radius * agent.speed
        } else {
            agent.speed
        };

        let desired = to_target.normalize_or_zero() * target_speed;
        SteeringOutput::new((desired - agent.velocity).clamp_length_max(agent.seek_force))
    }
}

/// Wander behavior - seek a point jittering on a ring ahead of the agent
#[derive(Debug, Clone, Copy)]
pub struct Wander {
    /// Distance from the agent to the ring center
    pub ring_distance: f32,
    /// Ring radius
    pub ring_radius: f32,
    /// Angle of the target on the ring, in radians
    pub angle: f32,
}

impl Wander {
    /// Create a new wander behavior
    #[must_use]
    pub fn new(ring_distance: f32, ring_radius: f32, angle: f32) -> Self {
        Self {
            ring_distance,
            ring_radius,
            angle,
        }
    }

    /// Point on the ring the agent is currently heading for
    #[must_use]
    pub fn target(&self, agent: &SteeringAgent) -> Vec2 {
        let center = agent.position + agent.velocity.normalize_or_zero() * self.ring_distance;
        center + Vec2::from_angle(self.angle) * self.ring_radius
    }
}

impl SteeringBehavior for Wander {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        seek(agent, self.target(agent))
    }
}

/// Pursue behavior - seek where the prey is about to be
#[derive(Debug, Clone, Copy)]
pub struct Pursue {
    /// Prey position
    pub target_position: Vec2,
    /// Prey velocity
    pub target_velocity: Vec2,
}

impl Pursue {
    /// Create a new pursue behavior
    #[must_use]
    pub fn new(target_position: Vec2, target_velocity: Vec2) -> Self {
        Self {
            target_position,
            target_velocity,
        }
    }

    /// One-step look-ahead of the prey position
    #[must_use]
    pub fn predicted(&self) -> Vec2 {
        self.target_position + self.target_velocity.normalize_or_zero()
    }
}

impl SteeringBehavior for Pursue {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        seek(agent, self.predicted())
    }
}

/// Iterate neighbors strictly inside `radius`, skipping coincident ones
fn within<'a>(
    agent: &'a SteeringAgent,
    neighbors: &'a [Neighbor],
    radius: f32,
) -> impl Iterator<Item = (&'a Neighbor, f32)> + 'a {
    neighbors.iter().filter_map(move |n| {
        let distance = agent.position.distance(n.position);
        (distance > 0.0 && distance < radius).then_some((n, distance))
    })
}

/// Separation behavior - push away from crowding neighbors
#[derive(Debug, Clone, Copy)]
pub struct Separation<'a> {
    /// Nearby mobs
    pub neighbors: &'a [Neighbor],
    /// Avoidance radius
    pub radius: f32,
}

impl SteeringBehavior for Separation<'_> {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;

        for (neighbor, distance) in within(agent, self.neighbors, self.radius) {
            sum += (agent.position - neighbor.position).normalize_or_zero() / distance;
            count += 1;
        }

        if count == 0 {
            return SteeringOutput::ZERO;
        }
        steer_towards_heading(agent, sum / count as f32)
    }
}

/// Alignment behavior - match the average heading of neighbors
#[derive(Debug, Clone, Copy)]
pub struct Alignment<'a> {
    /// Nearby mobs
    pub neighbors: &'a [Neighbor],
    /// Neighborhood radius
    pub radius: f32,
}

impl SteeringBehavior for Alignment<'_> {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;

        for (neighbor, _) in within(agent, self.neighbors, self.radius) {
            sum += neighbor.velocity;
            count += 1;
        }

        if count == 0 {
            return SteeringOutput::ZERO;
        }
        steer_towards_heading(agent, sum / count as f32)
    }
}

/// Cohesion behavior - seek the center of nearby neighbors
#[derive(Debug, Clone, Copy)]
pub struct Cohesion<'a> {
    /// Nearby mobs
    pub neighbors: &'a [Neighbor],
    /// Neighborhood radius
    pub radius: f32,
}

impl SteeringBehavior for Cohesion<'_> {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        let mut sum = Vec2::ZERO;
        let mut count = 0u32;

        for (neighbor, _) in within(agent, self.neighbors, self.radius) {
            sum += neighbor.position;
            count += 1;
        }

        if count == 0 {
            return SteeringOutput::ZERO;
        }
        seek(agent, sum / count as f32)
    }
}

/// Obstacle avoidance - look ahead along the heading and steer away from
/// the nearest blocker in the way
#[derive(Debug, Clone, Copy)]
pub struct ObstacleAvoidance<'a, O> {
    /// Blockers to test
    pub obstacles: &'a [O],
    /// Look-ahead distance
    pub line_of_sight: f32,
}

impl<O: Occluder> ObstacleAvoidance<'_, O> {
    /// The nearest blocker whose radius covers the agent or either
    /// look-ahead point
    #[must_use]
    pub fn most_threatening(&self, agent: &SteeringAgent) -> Option<&O> {
        let heading = agent.velocity.try_normalize()?;
        let further_ahead = agent.position + heading * self.line_of_sight;
        let ahead = agent.position + heading * self.line_of_sight * 0.5;

        self.obstacles
            .iter()
            .filter(|o| {
                let center = o.position();
                let radius = o.bounding_radius();
                center.distance(ahead) <= radius
                    || center.distance(further_ahead) <= radius
                    || center.distance(agent.position) <= radius
            })
            .min_by(|a, b| {
                let da = agent.position.distance_squared(a.position());
                let db = agent.position.distance_squared(b.position());
                da.total_cmp(&db)
            })
    }
}

impl<O: Occluder> SteeringBehavior for ObstacleAvoidance<'_, O> {
    fn calculate(&self, agent: &SteeringAgent) -> SteeringOutput {
        let Some(threat) = self.most_threatening(agent) else {
            return SteeringOutput::ZERO;
        };
        let heading = agent.velocity.normalize_or_zero();
        let further_ahead = agent.position + heading * self.line_of_sight;
        SteeringOutput::new((further_ahead - threat.position()).normalize_or_zero() * agent.speed)
    }
}

/// Holds a path and walks it waypoint by waypoint
#[derive(Debug, Clone, Default)]
pub struct PathFollower {
    /// Held path, if any
    path: Option<Path>,
    /// Waypoints still to visit; the next one is at `remaining - 1`
    remaining: usize,
}

impl PathFollower {
    /// Create a follower with no path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a new path. The start waypoint is skipped since the agent is
    /// already there.
    pub fn assign(&mut self, path: Path) {
        self.remaining = path.len().saturating_sub(1);
        self.path = Some(path);
    }

    /// Drop the held path
    pub fn clear(&mut self) {
        self.path = None;
        self.remaining = 0;
    }

    /// Whether a path is held
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.path.is_some()
    }

    /// The held path
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Number of waypoints left to visit
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The waypoint currently being sought
    #[must_use]
    pub fn current_waypoint(&self) -> Option<Vec2> {
        let index = self.remaining.checked_sub(1)?;
        self.path.as_ref()?.get(index)
    }

    /// Seek the current waypoint, advancing once within `waypoint_radius`.
    /// The goal waypoint is approached with [`Arrive`] so the agent brakes
    /// inside `approach_radius` instead of overshooting.
    ///
    /// Clears the path and returns zero once every waypoint is consumed.
    pub fn follow(
        &mut self,
        agent: &SteeringAgent,
        waypoint_radius: f32,
        approach_radius: f32,
    ) -> SteeringOutput {
        let Some(target) = self.current_waypoint() else {
            self.clear();
            return SteeringOutput::ZERO;
        };

        let is_goal = self.remaining == 1;
        if agent.position.distance(target) <= waypoint_radius {
            self.remaining -= 1;
        }
        if is_goal {
            Arrive::new(target, approach_radius).calculate(agent)
        } else {
            seek(agent, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::grid::OccupancyGrid;
    use crate::physics::Obstacle;
    use glam::IVec2;

    fn agent(position: Vec2, velocity: Vec2) -> SteeringAgent {
        SteeringAgent {
            position,
            velocity,
            speed: 100.0,
            seek_force: 20.0,
        }
    }

    fn neighbor(x: f32, y: f32) -> Neighbor {
        Neighbor {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn test_seek_from_rest_points_east() {
        let me = agent(Vec2::ZERO, Vec2::ZERO);
        let output = Seek::new(Vec2::new(500.0, 0.0)).calculate(&me);

        assert!((output.linear.length() - 20.0).abs() < 0.001);
        assert_eq!(output.linear.y, 0.0);
        assert!(output.linear.x > 0.0);
    }

    #[test]
    fn test_seek_at_target_brakes() {
        let me = agent(Vec2::new(5.0, 5.0), Vec2::new(3.0, 4.0));
        let output = seek(&me, Vec2::new(5.0, 5.0));

        assert!((output.linear - Vec2::new(-3.0, -4.0)).length() < 0.001);
        assert!(!output.linear.is_nan());
    }

    #[test]
    fn test_arrive_slowing() {
        let me = agent(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let far = Arrive::new(Vec2::new(1000.0, 0.0), 150.0).calculate(&me);
        let near = Arrive::new(Vec2::new(15.0, 0.0), 150.0).calculate(&me);

        // At full speed heading straight at a far target there is nothing to fix
        assert!(far.linear.length() < 0.001);
        // Close by the agent should brake
        assert!(near.linear.x < 0.0);
        assert!((near.linear.length() - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_wander() {
        let me = agent(Vec2::ZERO, Vec2::X * 50.0);
        let first = Wander::new(100.0, 40.0, 0.0);
        let second = Wander::new(100.0, 40.0, std::f32::consts::FRAC_PI_2);

        assert_eq!(first.target(&me), Vec2::new(140.0, 0.0));
        assert!((second.target(&me) - Vec2::new(100.0, 40.0)).length() < 0.001);

        let a = first.calculate(&me);
        let b = second.calculate(&me);
        assert!(a.linear.length() > 0.0);
        assert!((a.linear - b.linear).length() > 0.001);
    }

    #[test]
    fn test_wander_at_rest_is_finite() {
        let me = agent(Vec2::new(10.0, 10.0), Vec2::ZERO);
        let output = Wander::new(100.0, 40.0, 1.0).calculate(&me);
        assert!(output.linear.is_finite());
    }

    #[test]
    fn test_pursue_leads_target() {
        let pursue = Pursue::new(Vec2::new(100.0, 0.0), Vec2::new(0.0, 30.0));
        assert_eq!(pursue.predicted(), Vec2::new(100.0, 1.0));

        let resting = Pursue::new(Vec2::new(100.0, 0.0), Vec2::ZERO);
        assert_eq!(resting.predicted(), Vec2::new(100.0, 0.0));

        let output = pursue.calculate(&agent(Vec2::ZERO, Vec2::ZERO));
        assert!(output.linear.y > 0.0);
    }

    #[test]
    fn test_move_from_rest() {
        let v = move_from_rest(Vec2::ZERO, Vec2::new(0.0, 70.0), 90.0, 1.0 / 60.0);
        assert!((v - Vec2::new(0.0, 90.0)).length() < 0.001);

        assert_eq!(move_from_rest(Vec2::ZERO, Vec2::ZERO, 90.0, 0.016), Vec2::ZERO);
    }

    #[test]
    fn test_separation_no_neighbors_is_zero() {
        let me = agent(Vec2::ZERO, Vec2::new(10.0, 0.0));
        let far = [neighbor(500.0, 0.0)];

        assert_eq!(
            Separation { neighbors: &[], radius: 60.0 }.calculate(&me),
            SteeringOutput::ZERO
        );
        assert_eq!(
            Separation { neighbors: &far, radius: 60.0 }.calculate(&me),
            SteeringOutput::ZERO
        );
    }

    #[test]
    fn test_separation_coincident_neighbor_is_zero() {
        let me = agent(Vec2::new(5.0, 5.0), Vec2::ZERO);
        let same = [neighbor(5.0, 5.0)];

        let output = Separation { neighbors: &same, radius: 60.0 }.calculate(&me);
        assert_eq!(output, SteeringOutput::ZERO);
    }

    #[test]
    fn test_separation_pushes_away() {
        let me = agent(Vec2::ZERO, Vec2::ZERO);
        let close = [neighbor(10.0, 0.0)];

        let output = Separation { neighbors: &close, radius: 60.0 }.calculate(&me);
        assert!(output.linear.x < 0.0);
        assert!((output.linear.length() - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_alignment_matches_heading() {
        let me = agent(Vec2::ZERO, Vec2::ZERO);
        let flock = [
            Neighbor {
                position: Vec2::new(3.0, 0.0),
                velocity: Vec2::new(0.0, 50.0),
            },
            Neighbor {
                position: Vec2::new(0.0, 3.0),
                velocity: Vec2::new(0.0, 30.0),
            },
        ];

        let output = Alignment { neighbors: &flock, radius: 10.0 }.calculate(&me);
        assert!((output.linear - Vec2::new(0.0, 20.0)).length() < 0.001);

        let still = [neighbor(3.0, 0.0)];
        assert_eq!(
            Alignment { neighbors: &still, radius: 10.0 }.calculate(&me),
            SteeringOutput::ZERO
        );
    }

    #[test]
    fn test_cohesion_seeks_centroid() {
        let me = agent(Vec2::ZERO, Vec2::ZERO);
        let flock = [neighbor(4.0, 4.0), neighbor(4.0, -4.0)];

        let output = Cohesion { neighbors: &flock, radius: 10.0 }.calculate(&me);
        assert!(output.linear.x > 0.0);
        assert!(output.linear.y.abs() < 0.001);
    }

    #[test]
    fn test_obstacle_avoidance_steers_away() {
        let me = agent(Vec2::new(0.0, 32.0), Vec2::new(50.0, 0.0));
        let walls = [Obstacle::new(20.0, 0.0, 10.0, 40.0)];

        let avoid = ObstacleAvoidance {
            obstacles: &walls,
            line_of_sight: 23.0,
        };
        assert!(avoid.most_threatening(&me).is_some());

        let output = avoid.calculate(&me);
        // Wall center sits above the look-ahead point so the push is downwards
        assert!(output.linear.y > 0.0);
        assert!((output.linear.length() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_obstacle_avoidance_picks_nearest() {
        let me = agent(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let walls = [
            Obstacle::new(40.0, -5.0, 10.0, 10.0),
            Obstacle::new(10.0, -5.0, 10.0, 10.0),
        ];

        let avoid = ObstacleAvoidance {
            obstacles: &walls,
            line_of_sight: 30.0,
        };
        let threat = avoid.most_threatening(&me).unwrap();
        assert_eq!(threat.bounds.position.x, 10.0);
    }

    #[test]
    fn test_obstacle_avoidance_clear_or_resting() {
        let walls = [Obstacle::new(500.0, 500.0, 64.0, 64.0)];
        let avoid = ObstacleAvoidance {
            obstacles: &walls,
            line_of_sight: 23.0,
        };

        let moving = agent(Vec2::ZERO, Vec2::new(10.0, 0.0));
        assert_eq!(avoid.calculate(&moving), SteeringOutput::ZERO);

        let resting = agent(Vec2::new(532.0, 532.0), Vec2::ZERO);
        assert_eq!(avoid.calculate(&resting), SteeringOutput::ZERO);
    }

    #[test]
    fn test_path_follower_walks_and_clears() {
        let grid = OccupancyGrid::new(4, 1, 10.0);
        let tiles = vec![IVec2::new(2, 0), IVec2::new(1, 0), IVec2::new(0, 0)];
        let path = Path::from_tiles(&grid, tiles, 20);

        let mut follower = PathFollower::new();
        follower.assign(path);
        assert_eq!(follower.remaining(), 2);
        assert_eq!(follower.current_waypoint(), Some(Vec2::new(15.0, 5.0)));

        // Far from the first waypoint: seek without advancing
        let far = agent(Vec2::new(-100.0, 5.0), Vec2::ZERO);
        assert!(follower.follow(&far, 2.0, 0.0).linear.x > 0.0);
        assert_eq!(follower.remaining(), 2);

        // Reach each waypoint in turn
        let at_first = agent(Vec2::new(15.0, 5.0), Vec2::ZERO);
        follower.follow(&at_first, 2.0, 0.0);
        assert_eq!(follower.current_waypoint(), Some(Vec2::new(25.0, 5.0)));

        let at_goal = agent(Vec2::new(25.0, 5.0), Vec2::ZERO);
        follower.follow(&at_goal, 2.0, 0.0);
        assert_eq!(follower.remaining(), 0);
        assert!(follower.has_path());

        assert_eq!(follower.follow(&at_goal, 2.0, 0.0), SteeringOutput::ZERO);
        assert!(!follower.has_path());
    }

    #[test]
    fn test_path_follower_brakes_at_goal() {
        let grid = OccupancyGrid::new(4, 1, 10.0);
        let tiles = vec![IVec2::new(3, 0), IVec2::new(0, 0)];
        let path = Path::from_tiles(&grid, tiles, 30);

        let mut follower = PathFollower::new();
        follower.assign(path);

        // 10 units short of the goal, moving at full speed
        let closing = agent(Vec2::new(25.0, 5.0), Vec2::new(100.0, 0.0));
        let force = follower.follow(&closing, 2.0, 50.0);

        assert!(force.linear.x < 0.0, "Should brake near the goal");
        assert_eq!(follower.remaining(), 1);
    }

    #[test]
    fn test_steering_output_combine_scale() {
        let a = SteeringOutput::new(Vec2::X);
        let b = SteeringOutput::new(Vec2::Y * 2.0);

        let combined = a.combine(b).scale(0.5);
        assert!((combined.linear - Vec2::new(0.5, 1.0)).length() < 0.001);

        let clamped = SteeringOutput::new(Vec2::new(30.0, 40.0)).clamp_length_max(5.0);
        assert!((clamped.linear.length() - 5.0).abs() < 0.001);
    }
}
