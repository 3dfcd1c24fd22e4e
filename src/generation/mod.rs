//! # Generation Module
//!
//! Procedural content generation for dungeon floors, their inhabitants and loot.
//!
//! This module provides the room-and-corridor floor generator, monster and
//! item population, and the connectivity utilities every floor is checked
//! against. All randomness comes from a caller-supplied `StdRng`.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::game::{DungeonMap, Position};
use crate::{config, RunehackError, RunehackResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::ops::Range;

/// Configuration for procedural generation.
///
/// Controls grid size, room counts and the densities of the decorative and
/// hazardous features sprinkled over a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Maximum number of rooms per floor, main room included
    pub max_rooms: u32,
    /// Minimum side of a normal room
    pub min_room_size: u32,
    /// Upper bound (exclusive) on the side of a normal room
    pub max_room_size: u32,
    /// Attempts to find a placement for each extra room slot
    pub placement_attempts: u32,
    /// Random positions tried per placement attempt
    pub positions_per_attempt: u32,
    /// Probability of a door on each eligible room edge tile (0.0 to 1.0)
    pub door_chance: f64,
    /// Hazard patches per room
    pub hazard_ratio: f64,
    /// Traps per room
    pub trap_ratio: f64,
    /// Probability of a pillar at the center of a large room (0.0 to 1.0)
    pub pillar_chance: f64,
}

impl GenerationConfig {
    /// Creates the standard configuration for full-size floors.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.width, 80);
    /// assert_eq!(config.height, 24);
    /// assert!(config.max_room_size > config.min_room_size);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DUNGEON_WIDTH,
            height: config::DUNGEON_HEIGHT,
            max_rooms: 12,
            min_room_size: 4,
            max_room_size: 15,
            placement_attempts: 50,
            positions_per_attempt: 100,
            door_chance: 0.3,
            hazard_ratio: 0.2,
            trap_ratio: 0.3,
            pillar_chance: 0.4,
        }
    }

    /// Creates a configuration for testing with a smaller grid.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 48,
            height: 20,
            max_rooms: 8,
            ..Self::new(seed)
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Different kinds of room, each with its own size band and decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    /// Standard room with no special properties
    Normal,
    /// Holds a chest at its center
    Treasure,
    /// Large hall with four pillars; hosts the stairs when present
    Boss,
    /// Bookshelves along the top wall
    Library,
    /// Grid of cell bars
    Prison,
    /// Altar at its center
    Shrine,
}

impl RoomKind {
    /// Floor tint used when carving the room.
    pub fn floor_color(self) -> &'static str {
        match self {
            RoomKind::Normal => "#8B7355",
            RoomKind::Treasure => "#FFD700",
            RoomKind::Boss => "#8B0000",
            RoomKind::Library => "#DEB887",
            RoomKind::Prison => "#2F4F4F",
            RoomKind::Shrine => "#E6E6FA",
        }
    }
}

/// Represents a rectangular room in the dungeon.
///
/// The whole rectangle is carved to floor; the surrounding wall belongs to the
/// grid, not the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Index of this room in generation order (0 is the main room)
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room
    pub width: u32,
    /// Height of the room
    pub height: u32,
    /// Type/purpose of this room
    pub kind: RoomKind,
    /// Whether the room is known to be reachable from the main room
    pub connected: bool,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{Position, Room, RoomKind};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8, RoomKind::Normal);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// assert!(room.contains(Position::new(14, 12)));
    /// assert!(!room.contains(Position::new(15, 12)));
    /// ```
    pub fn new(id: u32, top_left: Position, width: u32, height: u32, kind: RoomKind) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
            kind,
            connected: false,
        }
    }

    /// Column range covered by the room.
    fn xs(&self) -> Range<i32> {
        self.top_left.x..self.top_left.x + self.width as i32
    }

    /// Row range covered by the room.
    fn ys(&self) -> Range<i32> {
        self.top_left.y..self.top_left.y + self.height as i32
    }

    /// Last floor tile of the room, inclusive.
    pub fn bottom_right(&self) -> Position {
        Position::new(self.xs().end - 1, self.ys().end - 1)
    }

    pub fn center(&self) -> Position {
        self.top_left + Position::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.xs().contains(&pos.x) && self.ys().contains(&pos.y)
    }

    /// Whether `pos` lies on the outermost ring of floor tiles.
    pub fn is_edge(&self, pos: Position) -> bool {
        let corner = self.bottom_right();
        self.contains(pos)
            && (pos.x == self.top_left.x
                || pos.x == corner.x
                || pos.y == self.top_left.y
                || pos.y == corner.y)
    }

    /// True when the rooms overlap or sit with no wall tile between them.
    pub fn overlaps_with_margin(&self, other: &Room) -> bool {
        let spans_meet = |a: Range<i32>, b: Range<i32>| a.start <= b.end && b.start <= a.end;
        spans_meet(self.xs(), other.xs()) && spans_meet(self.ys(), other.ys())
    }

    /// Every tile of the room in row-major order.
    pub fn all_positions(&self) -> Vec<Position> {
        self.ys()
            .flat_map(|y| self.xs().map(move |x| Position::new(x, y)))
            .collect()
    }

    /// Gets the positions inside the outermost ring.
    pub fn interior_positions(&self) -> Vec<Position> {
        self.all_positions()
            .into_iter()
            .filter(|&pos| !self.is_edge(pos))
            .collect()
    }

    /// Gets the outermost ring of the room.
    pub fn edge_positions(&self) -> Vec<Position> {
        self.all_positions()
            .into_iter()
            .filter(|&pos| self.is_edge(pos))
            .collect()
    }

    /// Whether the room plus its one-tile wall lies inside a grid.
    pub fn fits_in(&self, width: u32, height: u32) -> bool {
        self.top_left.x >= 1
            && self.top_left.y >= 1
            && self.top_left.x + self.width as i32 <= width as i32 - 1
            && self.top_left.y + self.height as i32 <= height as i32 - 1
    }
}

/// Trait for procedural generators.
///
/// Generators are stateless between calls: all randomness comes from the rng
/// argument, so a seeded rng reproduces the same content.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> RunehackResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> RunehackResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Every passable position reachable from `start` by 4-directional steps.
    ///
    /// Returns an empty set if `start` itself is not passable.
    pub fn flood_fill(map: &DungeonMap, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if !map.is_passable(start) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in pos.cardinal_adjacent_positions() {
                if !visited.contains(&next) && map.is_passable(next) {
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    /// Passable positions not reachable from `start`.
    pub fn unreachable_positions(map: &DungeonMap, start: Position) -> Vec<Position> {
        let reached = flood_fill(map, start);
        map.passable_positions()
            .into_iter()
            .filter(|pos| !reached.contains(pos))
            .collect()
    }

    /// Whether every passable tile can reach every other one.
    pub fn is_fully_connected(map: &DungeonMap) -> bool {
        let passable = map.passable_positions();
        match passable.first() {
            Some(&start) => flood_fill(map, start).len() == passable.len(),
            None => true,
        }
    }

    /// Validates that a floor meets basic requirements.
    pub fn validate_dungeon(map: &DungeonMap) -> RunehackResult<()> {
        if map.passable_positions().is_empty() {
            return Err(RunehackError::GenerationFailed(
                "Dungeon has no floor tiles".to_string(),
            ));
        }

        if !is_fully_connected(map) {
            return Err(RunehackError::GenerationFailed(
                "Dungeon has unreachable floor".to_string(),
            ));
        }

        if map.stairs_position().is_none() {
            return Err(RunehackError::GenerationFailed(
                "Dungeon has no stairs".to_string(),
            ));
        }

        Ok(())
    }
}
