//! # Pathfinding
//!
//! Grid searches over passable tiles on top of the `pathfinding` crate.
//! Movement is 8-directional with unit cost per step.

use crate::game::{DungeonMap, Position};
use ::pathfinding::prelude::{astar, bfs};

/// Passable 8-neighbours of a position.
pub fn walkable_neighbours(map: &DungeonMap, position: Position) -> Vec<Position> {
    position
        .adjacent_positions()
        .into_iter()
        .filter(|&neighbour| map.is_passable(neighbour))
        .collect()
}

/// Shortest path from `start` to `goal`, both included.
///
/// Returns `None` when the goal is unreachable or either end is impassable.
///
/// # Examples
///
/// ```
/// use runehack::{find_path, DungeonMap, Position, Tile};
///
/// let mut map = DungeonMap::new(10, 3);
/// for x in 1..9 {
///     map.set_tile(Position::new(x, 1), Tile::floor()).unwrap();
/// }
/// let path = find_path(&map, Position::new(1, 1), Position::new(8, 1)).unwrap();
/// assert_eq!(path.len(), 8);
/// assert_eq!(path.last(), Some(&Position::new(8, 1)));
/// ```
pub fn find_path(map: &DungeonMap, start: Position, goal: Position) -> Option<Vec<Position>> {
    if !map.is_passable(start) || !map.is_passable(goal) {
        return None;
    }

    astar(
        &start,
        |&position| {
            walkable_neighbours(map, position)
                .into_iter()
                .map(|neighbour| (neighbour, 1u32))
        },
        |&position| position.chebyshev_distance(goal),
        |&position| position == goal,
    )
    .map(|(path, _cost)| path)
}

/// Shortest path from `start` to the closest position accepted by `is_goal`.
pub fn find_path_to_nearest<F>(map: &DungeonMap, start: Position, is_goal: F) -> Option<Vec<Position>>
where
    F: Fn(Position) -> bool,
{
    if !map.is_passable(start) {
        return None;
    }

    bfs(
        &start,
        |&position| walkable_neighbours(map, position),
        |&position| is_goal(position),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Tile;

    fn room_with_wall() -> DungeonMap {
        let mut map = DungeonMap::new(9, 7);
        for y in 1..6 {
            for x in 1..8 {
                map.set_tile(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        // wall across x = 4 with a gap at the bottom
        for y in 1..5 {
            map.set_tile(Position::new(4, y), Tile::wall()).unwrap();
        }
        map
    }

    #[test]
    fn test_path_goes_around_wall() {
        let map = room_with_wall();
        let path = find_path(&map, Position::new(2, 1), Position::new(6, 1)).unwrap();
        assert_eq!(path.first(), Some(&Position::new(2, 1)));
        assert_eq!(path.last(), Some(&Position::new(6, 1)));
        assert!(path.contains(&Position::new(4, 5)));
        assert!(path.iter().all(|&pos| map.is_passable(pos)));
        for pair in path.windows(2) {
            assert_eq!(pair[0].chebyshev_distance(pair[1]), 1);
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let mut map = room_with_wall();
        map.set_tile(Position::new(4, 5), Tile::wall()).unwrap();
        assert!(find_path(&map, Position::new(2, 1), Position::new(6, 1)).is_none());
        assert!(find_path(&map, Position::new(0, 0), Position::new(2, 2)).is_none());
    }

    #[test]
    fn test_nearest_goal() {
        let map = room_with_wall();
        let targets = [Position::new(3, 3), Position::new(7, 5)];
        let path = find_path_to_nearest(&map, Position::new(1, 3), |pos| targets.contains(&pos)).unwrap();
        assert_eq!(path.last(), Some(&Position::new(3, 3)));
        assert_eq!(path.len(), 3);
    }
}
