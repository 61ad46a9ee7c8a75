//! AI and navigation module
//!
//! Grid pathfinding, steering behaviors, the motion state machine and the
//! per-mob update that ties them together.

mod fsm;
mod grid;
mod heap;
mod mob;
mod pathfinding;
mod queue;
mod schedule;
mod steering;

pub use fsm::{
    Behaviour, FollowingPath, MotionContext, Pursuing, State, StateMachine, Transition, Wandering,
};
pub use grid::{CONNECTIONS, DIAGONAL_COST, Neighbors, ORTHOGONAL_COST, OccupancyGrid};
pub use heap::EmptyHeapError;
pub use mob::{Mob, MobStep, Surroundings, integrate};
pub use pathfinding::{Path, find_path, find_path_world, heuristic};
pub use schedule::{AttackCooldown, RepathSchedule};
pub use steering::{
    Alignment, Arrive, Cohesion, Neighbor, ObstacleAvoidance, PathFollower, Pursue, Seek,
    Separation, SteeringAgent, SteeringBehavior, SteeringOutput, Wander, move_from_rest, seek,
};
