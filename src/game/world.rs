//! # World Module
//!
//! Tile definitions and the 2-D dungeon grid.
//!
//! A [`DungeonMap`] is produced once per floor by the generator and is only
//! read afterwards; the engine replaces it wholesale on descent.

use crate::{Position, RunehackError, RunehackResult};
use serde::{Deserialize, Serialize};

/// The different kinds of tile a floor is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileKind {
    Wall,
    Floor,
    Door,
    Stairs,
    Water,
    Lava,
    Pillar,
    Chest,
    Trap,
}

impl TileKind {
    /// Whether creatures can stand on this kind of tile.
    pub fn is_passable(self) -> bool {
        !matches!(self, TileKind::Wall | TileKind::Lava | TileKind::Pillar)
    }
}

/// A single grid cell.
///
/// `special` marks tiles that corridor carving must not overwrite (chests,
/// altars) and traps, which keep the plain floor glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub glyph: char,
    pub color: String,
    pub passable: bool,
    #[serde(default)]
    pub special: bool,
}

impl Tile {
    /// Creates a tile of the given kind with its default glyph and color.
    pub fn new(kind: TileKind) -> Self {
        let (glyph, color) = match kind {
            TileKind::Wall => ('#', "#666666"),
            TileKind::Floor => ('.', "#696969"),
            TileKind::Door => ('+', "#8B4513"),
            TileKind::Stairs => ('>', "#FFFF00"),
            TileKind::Water => ('~', "#4169E1"),
            TileKind::Lava => ('^', "#FF4500"),
            TileKind::Pillar => ('O', "#A9A9A9"),
            TileKind::Chest => ('□', "#FFD700"),
            TileKind::Trap => ('.', "#8B7355"),
        };

        Self {
            kind,
            glyph,
            color: color.to_string(),
            passable: kind.is_passable(),
            special: matches!(kind, TileKind::Chest | TileKind::Trap),
        }
    }

    /// Solid rock.
    pub fn wall() -> Self {
        Self::new(TileKind::Wall)
    }

    /// Plain corridor floor.
    pub fn floor() -> Self {
        Self::new(TileKind::Floor)
    }

    /// Floor tinted for a particular room.
    pub fn floor_colored(color: &str) -> Self {
        Self {
            color: color.to_string(),
            ..Self::floor()
        }
    }

    /// A hidden trap that takes on the look of the floor it replaces.
    pub fn trap_on(floor: &Tile) -> Self {
        Self {
            glyph: floor.glyph,
            color: floor.color.clone(),
            ..Self::new(TileKind::Trap)
        }
    }

    /// An impassable decoration with a custom glyph.
    pub fn pillar(glyph: char, color: &str) -> Self {
        Self {
            glyph,
            color: color.to_string(),
            ..Self::new(TileKind::Pillar)
        }
    }

    /// Marks the tile as protected from corridor carving.
    pub fn with_special(mut self) -> Self {
        self.special = true;
        self
    }

    /// Plain floor that carving may freely replace.
    pub fn is_plain_floor(&self) -> bool {
        self.kind == TileKind::Floor && !self.special
    }
}

/// The tile grid of one dungeon floor, indexed `tiles[y][x]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonMap {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Vec<Tile>>,
}

impl DungeonMap {
    /// Creates a grid filled with walls.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{DungeonMap, Position};
    ///
    /// let map = DungeonMap::new(10, 5);
    /// assert!(!map.is_passable(Position::new(3, 3)));
    /// assert!(!map.is_valid_position(Position::new(10, 0)));
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![Tile::wall(); width as usize]; height as usize],
        }
    }

    /// Checks whether a position lies inside the grid.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Gets the tile at a position, if it is inside the grid.
    pub fn get_tile(&self, pos: Position) -> Option<&Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
    }

    /// Gets a mutable tile at a position, if it is inside the grid.
    pub fn get_tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        if !self.is_valid_position(pos) {
            return None;
        }
        self.tiles
            .get_mut(pos.y as usize)
            .and_then(|row| row.get_mut(pos.x as usize))
    }

    /// Replaces the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> RunehackResult<()> {
        let slot = self.get_tile_mut(pos).ok_or_else(|| {
            RunehackError::InvalidAction(format!("Position {} is outside the map", pos))
        })?;
        *slot = tile;
        Ok(())
    }

    /// Whether a position is inside the grid and walkable.
    pub fn is_passable(&self, pos: Position) -> bool {
        self.get_tile(pos).map(|tile| tile.passable).unwrap_or(false)
    }

    /// Iterates over every position of the grid in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| Position::new(x, y)))
    }

    /// All walkable positions in row-major order.
    pub fn passable_positions(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.is_passable(pos)).collect()
    }

    /// Counts tiles of the given kind.
    pub fn count_kind(&self, kind: TileKind) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.kind == kind)
            .count()
    }

    /// Position of the first staircase, if the floor has one.
    pub fn stairs_position(&self) -> Option<Position> {
        self.positions()
            .find(|&pos| matches!(self.get_tile(pos), Some(tile) if tile.kind == TileKind::Stairs))
    }

    /// Renders the bare grid as text, one line per row.
    pub fn to_ascii(&self) -> String {
        self.tiles
            .iter()
            .map(|row| row.iter().map(|tile| tile.glyph).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_passability() {
        assert!(!Tile::wall().passable);
        assert!(Tile::floor().passable);
        assert!(Tile::new(TileKind::Door).passable);
        assert!(Tile::new(TileKind::Water).passable);
        assert!(!Tile::new(TileKind::Lava).passable);
        assert!(!Tile::pillar('♦', "#8B4513").passable);
        assert!(Tile::new(TileKind::Chest).passable);
    }

    #[test]
    fn test_trap_keeps_room_tint() {
        let shrine = Tile::floor_colored("#E6E6FA");
        let trap = Tile::trap_on(&shrine);
        assert_eq!(trap.kind, TileKind::Trap);
        assert_eq!(trap.glyph, shrine.glyph);
        assert_eq!(trap.color, shrine.color);
        assert!(trap.special);
        assert!(trap.passable);

        let corridor = Tile::trap_on(&Tile::floor());
        assert_eq!(corridor.color, Tile::floor().color);
    }

    #[test]
    fn test_trap_looks_like_floor() {
        let trap = Tile::new(TileKind::Trap);
        assert_eq!(trap.glyph, Tile::floor().glyph);
        assert!(trap.special);
        assert!(trap.passable);
        assert!(!trap.is_plain_floor());
    }

    #[test]
    fn test_map_bounds() {
        let mut map = DungeonMap::new(8, 4);
        assert!(map.is_valid_position(Position::new(0, 0)));
        assert!(map.is_valid_position(Position::new(7, 3)));
        assert!(!map.is_valid_position(Position::new(8, 3)));
        assert!(!map.is_valid_position(Position::new(-1, 0)));
        assert!(map.set_tile(Position::new(9, 9), Tile::floor()).is_err());
        assert!(map.get_tile(Position::new(0, 4)).is_none());
    }

    #[test]
    fn test_passable_positions_and_stairs() {
        let mut map = DungeonMap::new(5, 5);
        map.set_tile(Position::new(1, 1), Tile::floor()).unwrap();
        map.set_tile(Position::new(2, 1), Tile::new(TileKind::Stairs)).unwrap();

        assert_eq!(
            map.passable_positions(),
            vec![Position::new(1, 1), Position::new(2, 1)]
        );
        assert_eq!(map.stairs_position(), Some(Position::new(2, 1)));
        assert_eq!(map.count_kind(TileKind::Wall), 23);
    }

    #[test]
    fn test_ascii_rendering() {
        let mut map = DungeonMap::new(3, 2);
        map.set_tile(Position::new(1, 0), Tile::floor()).unwrap();
        assert_eq!(map.to_ascii(), "#.#\n###");
    }
}
