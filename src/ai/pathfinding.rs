//! A* pathfinding on the occupancy grid
//!
//! Costs are integers (10 orthogonal, 14 diagonal) and the heuristic is the
//! Manhattan distance scaled by 10. That heuristic overestimates diagonal
//! moves, so the search favours fewer expansions over strict optimality.

use glam::{IVec2, Vec2};
use rustc_hash::FxHashMap;

use super::grid::{ORTHOGONAL_COST, OccupancyGrid};
use super::queue::PriorityQueue;

/// A route through the grid.
///
/// Waypoints run from the goal (index 0) back to the start (last index);
/// followers consume them back to front.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Tile coordinates, goal first
    tiles: Vec<IVec2>,
    /// Tile centers in world space, goal first
    waypoints: Vec<Vec2>,
    /// Total edge cost from start to goal
    cost: u32,
}

impl Path {
    /// Build a path from goal-first tiles
    #[must_use]
    pub fn from_tiles(grid: &OccupancyGrid, tiles: Vec<IVec2>, cost: u32) -> Self {
        let waypoints = tiles.iter().map(|&t| grid.grid_to_world(t)).collect();
        Self {
            tiles,
            waypoints,
            cost,
        }
    }

    /// World-space waypoints, goal first
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Tile coordinates, goal first
    #[must_use]
    pub fn tiles(&self) -> &[IVec2] {
        &self.tiles
    }

    /// Total edge cost
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Check if the path has no waypoints
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.waypoints.get(index).copied()
    }

    /// Total euclidean length in world units
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }
}

/// Manhattan distance scaled to edge-cost units, saturating at `u32::MAX`
#[must_use]
pub fn heuristic(a: IVec2, b: IVec2) -> u32 {
    let dx = (i64::from(a.x) - i64::from(b.x)).unsigned_abs();
    let dy = (i64::from(a.y) - i64::from(b.y)).unsigned_abs();
    let scaled = (dx + dy).saturating_mul(u64::from(ORTHOGONAL_COST));
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// Find a path from `start` to `goal` using A*.
///
/// Returns `None` when the goal cannot be reached. The search always
/// terminates because the grid is finite.
#[must_use]
pub fn find_path(grid: &OccupancyGrid, start: IVec2, goal: IVec2) -> Option<Path> {
    let mut frontier = PriorityQueue::new();
    let mut came_from: FxHashMap<IVec2, Option<IVec2>> = FxHashMap::default();
    let mut cost_so_far: FxHashMap<IVec2, u32> = FxHashMap::default();

    frontier.insert(start, 0);
    came_from.insert(start, None);
    cost_so_far.insert(start, 0);

    let mut expanded = 0usize;
    let mut peak_frontier = 1usize;

    while !frontier.is_empty() {
        let Ok(current) = frontier.retrieve() else {
            break;
        };
        expanded += 1;

        if current == goal {
            break;
        }

        let current_cost = cost_so_far.get(&current).copied().unwrap_or(0);
        for next in grid.neighbors(current) {
            let new_cost = current_cost + grid.cost(current, next);
            let improved = cost_so_far.get(&next).is_none_or(|&known| new_cost < known);
            if improved {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, Some(current));
                frontier.insert(next, new_cost.saturating_add(heuristic(goal, next)));
            }
        }
        peak_frontier = peak_frontier.max(frontier.len());
    }

    if !came_from.contains_key(&goal) {
        log::debug!(
            "No path {start} -> {goal} ({expanded} nodes expanded)"
        );
        return None;
    }

    let mut tiles = vec![goal];
    let mut current = goal;
    while let Some(&Some(previous)) = came_from.get(&current) {
        tiles.push(previous);
        current = previous;
    }

    let cost = cost_so_far.get(&goal).copied().unwrap_or(0);
    log::debug!(
        "Path {start} -> {goal}: {} tiles, cost {cost}, {expanded} expanded, peak frontier {peak_frontier}",
        tiles.len()
    );

    Some(Path::from_tiles(grid, tiles, cost))
}

/// Find a path between two world positions.
///
/// Positions are snapped to the tiles that contain them.
#[must_use]
pub fn find_path_world(grid: &OccupancyGrid, start: Vec2, goal: Vec2) -> Option<Path> {
    find_path(grid, grid.world_to_grid(start), grid.world_to_grid(goal))
}
