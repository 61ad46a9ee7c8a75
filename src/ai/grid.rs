//! Occupancy grid used as the A* search graph
//!
//! Tiles are addressed by integer coordinates. A tile is walkable when it
//! lies inside the grid, is not a wall and is not claimed by another mob.

use glam::{IVec2, Vec2};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::physics::Rect;

/// Cost of a horizontal or vertical step
pub const ORTHOGONAL_COST: u32 = 10;

/// Cost of a diagonal step (√2 scaled by 10, truncated)
pub const DIAGONAL_COST: u32 = 14;

/// Neighbor offsets in the order they are visited
pub const CONNECTIONS: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, -1),
];

/// Up to eight neighbors, kept inline
pub type Neighbors = SmallVec<[IVec2; 8]>;

/// A bounded tile grid with walls, transient occupants and per-tile weights
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    /// Width in tiles
    width: i32,
    /// Height in tiles
    height: i32,
    /// Tile size in world units
    tile_size: f32,
    /// Impassable tiles
    walls: FxHashSet<IVec2>,
    /// Tiles held by other mobs for the current search
    occupants: FxHashSet<IVec2>,
    /// Extra cost for entering a tile
    weights: FxHashMap<IVec2, u32>,
}

impl OccupancyGrid {
    /// Create an empty grid
    #[must_use]
    pub fn new(width: u32, height: u32, tile_size: f32) -> Self {
        Self {
            width: i32::try_from(width).unwrap_or(i32::MAX),
            height: i32::try_from(height).unwrap_or(i32::MAX),
            tile_size,
            walls: FxHashSet::default(),
            occupants: FxHashSet::default(),
            weights: FxHashMap::default(),
        }
    }

    /// Width in tiles
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Tile size in world units
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Check that a tile lies inside the grid
    #[must_use]
    pub fn in_bounds(&self, node: IVec2) -> bool {
        (0..self.width).contains(&node.x) && (0..self.height).contains(&node.y)
    }

    /// Check that a tile is neither a wall nor occupied
    #[must_use]
    pub fn passable(&self, node: IVec2) -> bool {
        !self.walls.contains(&node) && !self.occupants.contains(&node)
    }

    /// In bounds and passable
    #[must_use]
    pub fn is_walkable(&self, node: IVec2) -> bool {
        self.in_bounds(node) && self.passable(node)
    }

    /// Walkable neighbors of a tile, in [`CONNECTIONS`] order
    #[must_use]
    pub fn neighbors(&self, node: IVec2) -> Neighbors {
        CONNECTIONS
            .iter()
            .map(|&offset| node + offset)
            .filter(|&n| self.in_bounds(n))
            .filter(|&n| self.passable(n))
            .collect()
    }

    /// Cost of stepping from `from` to the adjacent tile `to`
    #[must_use]
    pub fn cost(&self, from: IVec2, to: IVec2) -> u32 {
        let step = if (to - from).length_squared() == 1 {
            ORTHOGONAL_COST
        } else {
            DIAGONAL_COST
        };
        step + self.weights.get(&to).copied().unwrap_or(0)
    }

    /// Mark a tile as a wall
    pub fn add_wall(&mut self, node: IVec2) {
        self.walls.insert(node);
    }

    /// Clear a wall
    pub fn remove_wall(&mut self, node: IVec2) {
        self.walls.remove(&node);
    }

    /// Check whether a tile is a wall
    #[must_use]
    pub fn is_wall(&self, node: IVec2) -> bool {
        self.walls.contains(&node)
    }

    /// Number of wall tiles
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Remove every wall
    pub fn clear_walls(&mut self) {
        self.walls.clear();
    }

    /// In-bounds tiles a world-space rectangle overlaps, row by row
    pub fn tiles_overlapping(&self, bounds: &Rect) -> impl Iterator<Item = IVec2> + '_ {
        let min = (bounds.position / self.tile_size).floor().as_ivec2();
        let max = ((bounds.position + bounds.size) / self.tile_size).ceil().as_ivec2() - IVec2::ONE;

        (min.y..=max.y.max(min.y))
            .flat_map(move |y| (min.x..=max.x.max(min.x)).map(move |x| IVec2::new(x, y)))
            .filter(|&node| self.in_bounds(node))
    }

    /// Rasterize a world-space rectangle into one-tile walls.
    ///
    /// Every in-bounds tile the rectangle overlaps becomes a wall. Returns
    /// the tiles that were not walls before.
    pub fn add_obstacle(&mut self, bounds: &Rect) -> Vec<IVec2> {
        let added: Vec<IVec2> = self
            .tiles_overlapping(bounds)
            .filter(|node| !self.walls.contains(node))
            .collect();
        self.walls.extend(added.iter().copied());
        added
    }

    /// World-space square covered by a tile
    #[must_use]
    pub fn tile_rect(&self, node: IVec2) -> Rect {
        let origin = node.as_vec2() * self.tile_size;
        Rect::new(origin.x, origin.y, self.tile_size, self.tile_size)
    }

    /// Replace the occupant set.
    ///
    /// Occupants are recomputed from scratch before each search rather than
    /// tracked incrementally.
    pub fn set_occupants(&mut self, occupants: impl IntoIterator<Item = IVec2>) {
        self.occupants.clear();
        self.occupants.extend(occupants);
    }

    /// Forget every occupant
    pub fn clear_occupants(&mut self) {
        self.occupants.clear();
    }

    /// Check whether a tile is held by a mob
    #[must_use]
    pub fn is_occupied(&self, node: IVec2) -> bool {
        self.occupants.contains(&node)
    }

    /// Set the extra cost of entering a tile (0 removes the override)
    pub fn set_weight(&mut self, node: IVec2, weight: u32) {
        if weight == 0 {
            self.weights.remove(&node);
        } else {
            self.weights.insert(node, weight);
        }
    }

    /// Convert world position to grid coordinates
    #[must_use]
    pub fn world_to_grid(&self, pos: Vec2) -> IVec2 {
        (pos / self.tile_size).floor().as_ivec2()
    }

    /// Convert grid coordinates to world position (center of tile)
    #[must_use]
    pub fn grid_to_world(&self, node: IVec2) -> Vec2 {
        (node.as_vec2() + Vec2::splat(0.5)) * self.tile_size
    }
}
