//! # Game Module
//!
//! Core game state, world representation and the turn-resolution engine.
//!
//! This module contains the fundamental building blocks of Runehack:
//! - Grid coordinates, directions and entity identifiers
//! - The tile grid produced by dungeon generation
//! - Player, monster and item models
//! - Combat formulas and the [`GameEngine`] that owns the live state

pub mod autoexplore;
pub mod combat;
pub mod engine;
pub mod entities;
pub mod inventory;
pub mod state;
pub mod world;

pub use autoexplore::*;
pub use combat::*;
pub use engine::*;
pub use entities::*;
pub use inventory::*;
pub use state::*;
pub use world::*;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use uuid::Uuid;

/// A cell on the dungeon grid. `x` grows east, `y` grows south.
///
/// Positions order row-major (`y`, then `x`), so a `BTreeMap` keyed by
/// position walks the floor top to bottom the way it is drawn.
///
/// ```
/// use runehack::{Direction, Position};
///
/// let here = Position::new(10, 5);
/// assert_eq!(here + Direction::Southwest.to_delta(), Position::new(9, 6));
/// assert_eq!(here.adjacent_positions().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Taxicab distance, used for spell ranges and monster aggro.
    ///
    /// ```
    /// use runehack::Position;
    ///
    /// assert_eq!(Position::new(0, 0).manhattan_distance(Position::new(3, -4)), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Number of king moves between two cells.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// The eight neighbours, in [`Direction::all`] order.
    pub fn adjacent_positions(self) -> Vec<Position> {
        Direction::all()
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }

    /// The four orthogonal neighbours: north, west, east, south.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        [Direction::North, Direction::West, Direction::East, Direction::South]
            .into_iter()
            .map(|direction| self + direction.to_delta())
            .collect()
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Compass directions for a single step, diagonals included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
    Northeast,
    Northwest,
    Southeast,
    Southwest,
}

/// Every direction with its `(dx, dy)` step.
const STEPS: [(Direction, i32, i32); 8] = [
    (Direction::North, 0, -1),
    (Direction::South, 0, 1),
    (Direction::East, 1, 0),
    (Direction::West, -1, 0),
    (Direction::Northeast, 1, -1),
    (Direction::Northwest, -1, -1),
    (Direction::Southeast, 1, 1),
    (Direction::Southwest, -1, 1),
];

impl Direction {
    /// The offset one step in this direction moves by.
    ///
    /// ```
    /// use runehack::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        STEPS
            .iter()
            .find(|(direction, _, _)| *direction == self)
            .map_or_else(Position::default, |&(_, dx, dy)| Position::new(dx, dy))
    }

    /// The direction of a single-step offset, or `None` for anything else.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        STEPS
            .iter()
            .find(|&&(_, dx, dy)| dx == delta.x && dy == delta.y)
            .map(|&(direction, _, _)| direction)
    }

    pub fn all() -> [Direction; 8] {
        STEPS.map(|(direction, _, _)| direction)
    }
}

/// Unique identifier for monsters.
pub type EntityId = Uuid;

/// Creates a new unique entity ID drawn from the session RNG.
///
/// Drawing from the caller's RNG keeps seeded sessions reproducible.
pub fn new_entity_id(rng: &mut StdRng) -> EntityId {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_distances() {
        let origin = Position::new(0, 0);
        let far = Position::new(3, 4);
        assert_eq!(origin.manhattan_distance(far), 7);
        assert_eq!(origin.chebyshev_distance(far), 4);
        assert_eq!(far.manhattan_distance(origin), 7);
    }

    #[test]
    fn test_neighbours() {
        let centre = Position::new(5, 5);
        let all = centre.adjacent_positions();
        assert_eq!(all.len(), 8);
        assert!(all.contains(&Position::new(4, 4)));
        assert!(!all.contains(&centre));

        let cardinal = centre.cardinal_adjacent_positions();
        assert_eq!(
            cardinal,
            vec![
                Position::new(5, 4),
                Position::new(4, 5),
                Position::new(6, 5),
                Position::new(5, 6),
            ]
        );
    }

    #[test]
    fn test_row_major_order() {
        let mut cells = vec![Position::new(3, 1), Position::new(0, 2), Position::new(1, 1)];
        cells.sort();
        assert_eq!(cells, vec![Position::new(1, 1), Position::new(3, 1), Position::new(0, 2)]);
    }

    #[test]
    fn test_offsets_add_and_subtract() {
        let a = Position::new(5, 10);
        let b = Position::new(3, 2);
        assert_eq!(a + b, Position::new(8, 12));
        assert_eq!(a - b, Position::new(2, 8));
        assert_eq!(a.to_string(), "5,10");
    }

    #[test]
    fn test_every_direction_is_one_step() {
        for direction in Direction::all() {
            let delta = direction.to_delta();
            assert_eq!(Position::default().chebyshev_distance(delta), 1);
            assert_eq!(Direction::from_delta(delta), Some(direction));
        }
        assert_eq!(Direction::from_delta(Position::new(2, 0)), None);
        assert_eq!(Direction::from_delta(Position::default()), None);
    }

    #[test]
    fn test_entity_ids_follow_the_rng() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = new_entity_id(&mut rng);
        assert_ne!(first, new_entity_id(&mut rng));

        let mut replay = StdRng::seed_from_u64(7);
        assert_eq!(new_entity_id(&mut replay), first);
    }
}
