//! # Dungeon Generation
//!
//! Room-and-corridor floor generation with a guaranteed-connectivity pass.
//!
//! The generator carves a central main room plus up to eleven themed rooms,
//! chains them together with L-shaped corridors, then sprinkles hazards,
//! traps, pillars and doors. Decorations can cut corridors, so the last step
//! sweeps the grid and carves a path back to the main room from anything the
//! flood fill did not reach. A floor with unreachable tiles is never returned.

use crate::game::{DungeonMap, Position, Tile, TileKind};
use crate::generation::{utils, GenerationConfig, Generator, Room, RoomKind};
use crate::{RunehackError, RunehackResult};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// A finished floor together with the rooms it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLevel {
    pub map: DungeonMap,
    pub rooms: Vec<Room>,
}

impl GeneratedLevel {
    /// The central room every other room is connected to.
    pub fn main_room(&self) -> Option<&Room> {
        self.rooms.first()
    }
}

/// Primary dungeon generator using the room-and-corridor algorithm.
///
/// This generator creates floors by:
/// 1. Placing a main room and themed rooms with collision detection
/// 2. Connecting rooms in a cycle with L-shaped corridors
/// 3. Repairing any room the corridors failed to reach
/// 4. Adding hazards, traps, pillars, doors and stairs
/// 5. Force-carving paths to anything the decorations cut off
#[derive(Debug, Clone, Default)]
pub struct DungeonGenerator;

impl DungeonGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use runehack::{DungeonGenerator, GenerationConfig, Generator};
    ///
    /// let config = GenerationConfig::new(3);
    /// let mut rng = StdRng::seed_from_u64(config.seed);
    /// let level = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(level.map.stairs_position().is_some());
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Generates a floor and returns only its tile grid.
    pub fn generate_map(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> RunehackResult<DungeonMap> {
        self.generate(config, rng).map(|level| level.map)
    }

    /// Picks a random passable tile that is not the staircase.
    pub fn random_floor_position(map: &DungeonMap, rng: &mut StdRng) -> Option<Position> {
        let candidates: Vec<Position> = map
            .positions()
            .filter(|&pos| {
                matches!(map.get_tile(pos), Some(tile) if tile.passable && tile.kind != TileKind::Stairs)
            })
            .collect();
        candidates.choose(rng).copied()
    }

    /// A single room with stairs in its corner, used when generation cannot
    /// produce a valid floor.
    pub fn fallback_level(config: &GenerationConfig) -> GeneratedLevel {
        let width = config.width.saturating_sub(4).clamp(3, 12);
        let height = config.height.saturating_sub(4).clamp(3, 8);
        let room = Room::new(
            0,
            Position::new(
                (config.width.saturating_sub(width) / 2) as i32,
                (config.height.saturating_sub(height) / 2) as i32,
            ),
            width,
            height,
            RoomKind::Normal,
        );

        let mut map = DungeonMap::new(config.width, config.height);
        for pos in room.all_positions() {
            if let Some(tile) = map.get_tile_mut(pos) {
                *tile = Tile::floor_colored(RoomKind::Normal.floor_color());
            }
        }
        let stairs = room.bottom_right();
        if let Some(tile) = map.get_tile_mut(stairs) {
            *tile = Tile::new(TileKind::Stairs);
        }

        GeneratedLevel {
            map,
            rooms: vec![Room {
                connected: true,
                ..room
            }],
        }
    }

    /// Creates the oversized room at the center of the grid.
    fn create_main_room(&self, config: &GenerationConfig, rng: &mut StdRng) -> Room {
        let width = rng
            .gen_range(8..16)
            .min(config.width.saturating_sub(4))
            .max(3);
        let height = rng
            .gen_range(6..12)
            .min(config.height.saturating_sub(4))
            .max(3);
        let x = (config.width.saturating_sub(width) / 2) as i32;
        let y = (config.height.saturating_sub(height) / 2) as i32;

        Room {
            connected: true,
            ..Room::new(0, Position::new(x, y), width, height, RoomKind::Normal)
        }
    }

    /// Rolls the kind of the next room. Special kinds are capped per floor.
    fn select_room_kind(&self, rooms: &[Room], rng: &mut StdRng) -> RoomKind {
        let count = |kind: RoomKind| rooms.iter().filter(|room| room.kind == kind).count();

        if count(RoomKind::Boss) == 0 && rng.gen_bool(0.15) {
            RoomKind::Boss
        } else if count(RoomKind::Treasure) < 2 && rng.gen_bool(0.25) {
            RoomKind::Treasure
        } else if count(RoomKind::Library) < 2 && rng.gen_bool(0.2) {
            RoomKind::Library
        } else if count(RoomKind::Shrine) < 1 && rng.gen_bool(0.1) {
            RoomKind::Shrine
        } else if count(RoomKind::Prison) < 2 && rng.gen_bool(0.15) {
            RoomKind::Prison
        } else {
            RoomKind::Normal
        }
    }

    /// Picks dimensions from the size band of a room kind.
    fn room_dimensions(
        &self,
        kind: RoomKind,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> (u32, u32) {
        match kind {
            RoomKind::Boss => (rng.gen_range(10..16), rng.gen_range(8..12)),
            RoomKind::Treasure => (rng.gen_range(6..10), rng.gen_range(5..8)),
            RoomKind::Library => (rng.gen_range(8..13), rng.gen_range(6..9)),
            _ => {
                let max = config.max_room_size.max(config.min_room_size + 1);
                (
                    rng.gen_range(config.min_room_size..max),
                    rng.gen_range(config.min_room_size..max),
                )
            }
        }
    }

    /// Searches random positions for a spot that keeps a wall between rooms.
    fn find_room_position(
        &self,
        width: u32,
        height: u32,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Option<Position> {
        if config.width < width + 3 || config.height < height + 3 {
            return None;
        }

        for _ in 0..config.positions_per_attempt {
            let x = rng.gen_range(1..(config.width - width - 1)) as i32;
            let y = rng.gen_range(1..(config.height - height - 1)) as i32;
            let candidate = Room::new(0, Position::new(x, y), width, height, RoomKind::Normal);

            if !rooms.iter().any(|room| candidate.overlaps_with_margin(room)) {
                return Some(candidate.top_left);
            }
        }

        None
    }

    /// Places the main room and as many extra rooms as fit.
    fn place_rooms(&self, config: &GenerationConfig, rng: &mut StdRng) -> Vec<Room> {
        let mut rooms = vec![self.create_main_room(config, rng)];

        for _ in 1..config.max_rooms {
            for _ in 0..config.placement_attempts {
                let kind = self.select_room_kind(&rooms, rng);
                let (width, height) = self.room_dimensions(kind, config, rng);

                if let Some(top_left) = self.find_room_position(width, height, &rooms, config, rng)
                {
                    let id = rooms.len() as u32;
                    rooms.push(Room::new(id, top_left, width, height, kind));
                    break;
                }
            }
        }

        debug!("Placed {} rooms", rooms.len());
        rooms
    }

    /// Carves a room to tinted floor and adds its kind-specific decoration.
    fn carve_room(&self, map: &mut DungeonMap, room: &Room, rng: &mut StdRng) {
        for pos in room.all_positions() {
            if let Some(tile) = map.get_tile_mut(pos) {
                *tile = Tile::floor_colored(room.kind.floor_color());
            }
        }

        let left = room.top_left.x;
        let top = room.top_left.y;
        let right = left + room.width as i32;
        let bottom = top + room.height as i32;

        let decorate = |map: &mut DungeonMap, pos: Position, tile: Tile| {
            if room.contains(pos) {
                if let Some(slot) = map.get_tile_mut(pos) {
                    *slot = tile;
                }
            }
        };

        match room.kind {
            RoomKind::Library => {
                for x in (left + 1)..(right - 1) {
                    if rng.gen_bool(0.4) {
                        decorate(map, Position::new(x, top + 1), Tile::pillar('♦', "#8B4513"));
                    }
                }
            }
            RoomKind::Treasure => {
                decorate(map, room.center(), Tile::new(TileKind::Chest));
            }
            RoomKind::Boss => {
                for (x, y) in [
                    (left + 2, top + 2),
                    (right - 3, top + 2),
                    (left + 2, bottom - 3),
                    (right - 3, bottom - 3),
                ] {
                    decorate(map, Position::new(x, y), Tile::pillar('♠', "#8B0000"));
                }
            }
            RoomKind::Shrine => {
                decorate(map, room.center(), Tile::pillar('†', "#E6E6FA").with_special());
            }
            RoomKind::Prison => {
                for x in ((left + 2)..(right - 2)).step_by(2) {
                    for y in ((top + 2)..(bottom - 2)).step_by(2) {
                        if rng.gen_bool(0.3) {
                            decorate(map, Position::new(x, y), Tile::pillar('‡', "#2F4F4F"));
                        }
                    }
                }
            }
            RoomKind::Normal => {}
        }
    }

    /// Turns a wall or plain floor tile into corridor floor. Anything else is left alone.
    fn carve_corridor_tile(map: &mut DungeonMap, pos: Position) {
        if let Some(tile) = map.get_tile_mut(pos) {
            if tile.kind == TileKind::Wall || tile.is_plain_floor() {
                *tile = Tile::floor();
            }
        }
    }

    /// Positions of an L-shaped path: horizontal first, then vertical.
    fn l_path(start: Position, end: Position) -> Vec<Position> {
        let mut path = Vec::new();
        let mut current = start;

        while current.x != end.x {
            path.push(current);
            current.x += if current.x < end.x { 1 } else { -1 };
        }
        while current.y != end.y {
            path.push(current);
            current.y += if current.y < end.y { 1 } else { -1 };
        }
        path.push(current);

        path
    }

    /// Carves an L-shaped corridor between two points.
    fn carve_l_corridor(map: &mut DungeonMap, start: Position, end: Position) {
        for pos in Self::l_path(start, end) {
            Self::carve_corridor_tile(map, pos);
        }
    }

    /// The tile of a room that connectivity is measured from.
    fn room_anchor(map: &DungeonMap, room: &Room) -> Option<Position> {
        let center = room.center();
        if map.is_passable(center) {
            return Some(center);
        }
        room.all_positions()
            .into_iter()
            .find(|&pos| map.is_passable(pos))
    }

    /// Chains rooms in order and closes the cycle back to the main room.
    fn connect_rooms(&self, map: &mut DungeonMap, rooms: &mut [Room]) {
        if rooms.len() < 2 {
            return;
        }

        for i in 0..(rooms.len() - 1) {
            Self::carve_l_corridor(map, rooms[i].center(), rooms[i + 1].center());
        }

        if rooms.len() > 2 {
            let last = rooms[rooms.len() - 1].center();
            Self::carve_l_corridor(map, last, rooms[0].center());
        }

        self.ensure_rooms_connected(map, rooms);
    }

    /// Force-connects every room whose anchor the main room cannot reach.
    fn ensure_rooms_connected(&self, map: &mut DungeonMap, rooms: &mut [Room]) {
        let Some(main_anchor) = rooms.first().and_then(|room| Self::room_anchor(map, room)) else {
            return;
        };
        let reached = utils::flood_fill(map, main_anchor);

        for room in rooms.iter_mut() {
            match Self::room_anchor(map, room) {
                Some(anchor) if reached.contains(&anchor) => room.connected = true,
                Some(anchor) => {
                    debug!("Force-connecting room {} ({:?})", room.id, room.kind);
                    Self::carve_l_corridor(map, main_anchor, anchor);
                    room.connected = true;
                }
                None => {}
            }
        }
    }

    /// Drops small water or lava patches inside random rooms.
    fn add_hazards(
        &self,
        map: &mut DungeonMap,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let count = (rooms.len() as f64 * config.hazard_ratio) as usize;

        for _ in 0..count {
            let Some(room) = rooms.choose(rng) else {
                return;
            };
            let kind = if rng.gen_bool(0.5) {
                TileKind::Water
            } else {
                TileKind::Lava
            };
            if room.width < 3 || room.height < 3 {
                continue;
            }

            let start_x = room.top_left.x + 1 + rng.gen_range(0..(room.width - 2)) as i32;
            let start_y = room.top_left.y + 1 + rng.gen_range(0..(room.height - 2)) as i32;
            let size = rng.gen_range(1..=3);
            let max_x = (start_x + size).min(room.top_left.x + room.width as i32 - 1);
            let max_y = (start_y + size).min(room.top_left.y + room.height as i32 - 1);

            for y in start_y..max_y {
                for x in start_x..max_x {
                    if let Some(tile) = map.get_tile_mut(Position::new(x, y)) {
                        if !tile.special {
                            *tile = Tile::new(kind);
                        }
                    }
                }
            }
        }
    }

    /// Hides traps on random plain floor tiles.
    fn add_traps(
        &self,
        map: &mut DungeonMap,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let count = (rooms.len() as f64 * config.trap_ratio) as usize;

        for _ in 0..count {
            for _ in 0..50 {
                let pos = Position::new(
                    rng.gen_range(0..config.width) as i32,
                    rng.gen_range(0..config.height) as i32,
                );
                let eligible = map.get_tile(pos).map(Tile::is_plain_floor).unwrap_or(false);
                if eligible && rng.gen_bool(0.1) {
                    if let Some(tile) = map.get_tile_mut(pos) {
                        *tile = Tile::trap_on(tile);
                    }
                    break;
                }
            }
        }
    }

    /// Puts a pillar in the middle of some large rooms.
    fn add_pillars(
        &self,
        map: &mut DungeonMap,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        for room in rooms {
            if room.width > 8 && room.height > 6 && rng.gen_bool(config.pillar_chance) {
                if let Some(tile) = map.get_tile_mut(room.center()) {
                    if !tile.special {
                        *tile = Tile::new(TileKind::Pillar);
                    }
                }
            }
        }
    }

    /// Edge tiles of a room whose outside neighbour is corridor floor.
    fn door_candidates(map: &DungeonMap, room: &Room) -> Vec<Position> {
        let is_floor = |pos: Position| {
            matches!(map.get_tile(pos), Some(tile) if tile.kind == TileKind::Floor)
        };
        let left = room.top_left.x;
        let top = room.top_left.y;
        let right = left + room.width as i32 - 1;
        let bottom = top + room.height as i32 - 1;
        let mut candidates = Vec::new();

        for x in left..=right {
            if is_floor(Position::new(x, top - 1)) {
                candidates.push(Position::new(x, top));
            }
            if is_floor(Position::new(x, bottom + 1)) {
                candidates.push(Position::new(x, bottom));
            }
        }
        for y in top..=bottom {
            if is_floor(Position::new(left - 1, y)) {
                candidates.push(Position::new(left, y));
            }
            if is_floor(Position::new(right + 1, y)) {
                candidates.push(Position::new(right, y));
            }
        }

        candidates
    }

    /// Places doors where corridors meet room edges.
    fn add_doors(
        &self,
        map: &mut DungeonMap,
        rooms: &[Room],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        for room in rooms {
            for pos in Self::door_candidates(map, room) {
                if rng.gen_bool(config.door_chance) {
                    if let Some(tile) = map.get_tile_mut(pos) {
                        if tile.is_plain_floor() {
                            *tile = Tile::new(TileKind::Door);
                        }
                    }
                }
            }
        }
    }

    /// Puts the stairs in the boss room, else a random non-main room.
    fn add_stairs(&self, map: &mut DungeonMap, rooms: &[Room], rng: &mut StdRng) -> RunehackResult<()> {
        let stairs_room = match rooms.iter().find(|room| room.kind == RoomKind::Boss) {
            Some(room) => room,
            None => rooms
                .get(1..)
                .and_then(|others| others.choose(rng))
                .or_else(|| rooms.first())
                .ok_or_else(|| RunehackError::GenerationFailed("No rooms for stairs".to_string()))?,
        };

        let pos = Position::new(
            stairs_room.top_left.x + stairs_room.width as i32 - 2,
            stairs_room.top_left.y + stairs_room.height as i32 - 2,
        );
        map.set_tile(pos, Tile::new(TileKind::Stairs))
    }

    /// Carves a path to the main room from every passable tile it cannot reach.
    ///
    /// Unlike corridor carving this converts any impassable tile on the path.
    fn repair_connectivity(&self, map: &mut DungeonMap, rooms: &[Room]) -> RunehackResult<()> {
        let anchor = rooms
            .first()
            .and_then(|room| Self::room_anchor(map, room))
            .ok_or_else(|| {
                RunehackError::GenerationFailed("Main room has no passable tile".to_string())
            })?;

        let mut repairs = 0;
        let limit = (map.width * map.height) as usize;

        while let Some(&stranded) = utils::unreachable_positions(map, anchor).first() {
            if repairs >= limit {
                return Err(RunehackError::GenerationFailed(
                    "Connectivity repair did not converge".to_string(),
                ));
            }
            for pos in Self::l_path(stranded, anchor) {
                if let Some(tile) = map.get_tile_mut(pos) {
                    if !tile.passable {
                        *tile = Tile::floor();
                    }
                }
            }
            repairs += 1;
        }

        if repairs > 0 {
            debug!("Repaired {} disconnected regions", repairs);
        }
        Ok(())
    }
}

impl Generator<GeneratedLevel> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> RunehackResult<GeneratedLevel> {
        // Create empty level (all walls)
        let mut map = DungeonMap::new(config.width, config.height);

        let mut rooms = self.place_rooms(config, rng);
        for room in &rooms {
            self.carve_room(&mut map, room, rng);
        }

        self.connect_rooms(&mut map, &mut rooms);

        self.add_hazards(&mut map, &rooms, config, rng);
        self.add_traps(&mut map, &rooms, config, rng);
        self.add_pillars(&mut map, &rooms, config, rng);
        self.add_doors(&mut map, &rooms, config, rng);
        self.add_stairs(&mut map, &rooms, rng)?;

        self.repair_connectivity(&mut map, &rooms)?;

        let level = GeneratedLevel { map, rooms };
        self.validate(&level, config)?;
        Ok(level)
    }

    fn validate(&self, level: &GeneratedLevel, config: &GenerationConfig) -> RunehackResult<()> {
        for (i, room) in level.rooms.iter().enumerate() {
            if !room.fits_in(config.width, config.height) {
                return Err(RunehackError::GenerationFailed(format!(
                    "Room {} lies outside the grid",
                    room.id
                )));
            }
            if level.rooms[i + 1..]
                .iter()
                .any(|other| room.overlaps_with_margin(other))
            {
                return Err(RunehackError::GenerationFailed(format!(
                    "Room {} overlaps another room",
                    room.id
                )));
            }
        }

        utils::validate_dungeon(&level.map)
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn generate(seed: u64) -> GeneratedLevel {
        let config = GenerationConfig::new(seed);
        let mut rng = utils::create_rng(&config);
        DungeonGenerator::new().generate(&config, &mut rng).unwrap()
    }

    #[test]
    fn test_generation_produces_valid_floor() {
        let level = generate(12345);
        assert_eq!(level.map.width, 80);
        assert_eq!(level.map.height, 24);
        assert!(!level.rooms.is_empty());
        assert!(level.rooms.len() <= 12);
        assert!(utils::is_fully_connected(&level.map));
        assert_eq!(level.map.count_kind(TileKind::Stairs), 1);
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(generate(77), generate(77));
    }

    #[test]
    fn test_main_room_is_centered() {
        let level = generate(5);
        let main = level.main_room().unwrap();
        assert_eq!(main.id, 0);
        assert_eq!(main.kind, RoomKind::Normal);
        assert!(main.connected);
        assert!((8..16).contains(&main.width));
        assert!((6..12).contains(&main.height));
        let center = main.center();
        assert!((center.x - 40).abs() <= 1);
        assert!((center.y - 12).abs() <= 1);
    }

    #[test]
    fn test_special_room_caps() {
        for seed in 0..20 {
            let level = generate(seed);
            let count = |kind| level.rooms.iter().filter(|room| room.kind == kind).count();
            assert!(count(RoomKind::Boss) <= 1);
            assert!(count(RoomKind::Treasure) <= 2);
            assert!(count(RoomKind::Library) <= 2);
            assert!(count(RoomKind::Shrine) <= 1);
            assert!(count(RoomKind::Prison) <= 2);
        }
    }

    #[test]
    fn test_stairs_in_boss_room_when_present() {
        for seed in 0..30 {
            let level = generate(seed);
            let stairs = level.map.stairs_position().unwrap();
            if let Some(boss) = level.rooms.iter().find(|room| room.kind == RoomKind::Boss) {
                assert_eq!(
                    stairs,
                    Position::new(
                        boss.top_left.x + boss.width as i32 - 2,
                        boss.top_left.y + boss.height as i32 - 2
                    )
                );
            }
        }
    }

    #[test]
    fn test_traps_blend_into_surrounding_floor() {
        let palette: Vec<String> = [
            RoomKind::Normal,
            RoomKind::Treasure,
            RoomKind::Boss,
            RoomKind::Library,
            RoomKind::Prison,
            RoomKind::Shrine,
        ]
        .iter()
        .map(|kind| kind.floor_color().to_string())
        .chain(std::iter::once(Tile::floor().color))
        .collect();

        let mut traps = 0;
        for seed in 0..20 {
            let level = generate(seed);
            for pos in level.map.positions() {
                let tile = level.map.get_tile(pos).unwrap();
                if tile.kind == TileKind::Trap {
                    traps += 1;
                    assert_eq!(tile.glyph, Tile::floor().glyph);
                    assert!(palette.contains(&tile.color), "trap color {}", tile.color);
                }
            }
        }
        assert!(traps > 0);
    }

    #[test]
    fn test_l_path_shape() {
        let path = DungeonGenerator::l_path(Position::new(1, 1), Position::new(4, 3));
        assert_eq!(path.first(), Some(&Position::new(1, 1)));
        assert_eq!(path.last(), Some(&Position::new(4, 3)));
        assert!(path.contains(&Position::new(4, 1)));
        assert_eq!(path.len(), 6);
    }

    #[test]
    fn test_corridor_carving_protects_special_tiles() {
        let mut map = DungeonMap::new(10, 3);
        map.set_tile(Position::new(4, 1), Tile::new(TileKind::Chest)).unwrap();
        map.set_tile(Position::new(6, 1), Tile::pillar('O', "#A9A9A9")).unwrap();

        DungeonGenerator::carve_l_corridor(&mut map, Position::new(1, 1), Position::new(8, 1));

        assert_eq!(map.get_tile(Position::new(4, 1)).unwrap().kind, TileKind::Chest);
        assert_eq!(map.get_tile(Position::new(6, 1)).unwrap().kind, TileKind::Pillar);
        assert_eq!(map.get_tile(Position::new(2, 1)).unwrap().kind, TileKind::Floor);
    }

    #[test]
    fn test_repair_reconnects_cut_regions() {
        let generator = DungeonGenerator::new();
        let room = Room::new(0, Position::new(1, 1), 3, 3, RoomKind::Normal);
        let mut map = DungeonMap::new(14, 6);
        for pos in room.all_positions() {
            map.set_tile(pos, Tile::floor()).unwrap();
        }
        map.set_tile(Position::new(10, 2), Tile::floor()).unwrap();
        map.set_tile(Position::new(11, 2), Tile::new(TileKind::Stairs)).unwrap();
        map.set_tile(Position::new(6, 2), Tile::new(TileKind::Lava)).unwrap();

        assert!(!utils::is_fully_connected(&map));
        generator.repair_connectivity(&mut map, &[room]).unwrap();
        assert!(utils::is_fully_connected(&map));
        assert_eq!(map.get_tile(Position::new(11, 2)).unwrap().kind, TileKind::Stairs);
    }

    #[test]
    fn test_random_floor_position_avoids_stairs() {
        let mut map = DungeonMap::new(4, 3);
        map.set_tile(Position::new(1, 1), Tile::new(TileKind::Stairs)).unwrap();
        map.set_tile(Position::new(2, 1), Tile::floor()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(
                DungeonGenerator::random_floor_position(&map, &mut rng),
                Some(Position::new(2, 1))
            );
        }
        assert_eq!(
            DungeonGenerator::random_floor_position(&DungeonMap::new(3, 3), &mut rng),
            None
        );
    }

    #[test]
    fn test_fallback_level_is_valid() {
        let config = GenerationConfig::new(1);
        let level = DungeonGenerator::fallback_level(&config);
        assert!(DungeonGenerator::new().validate(&level, &config).is_ok());
    }

    #[test]
    fn test_testing_config_generates() {
        let config = GenerationConfig::for_testing(9);
        let mut rng = utils::create_rng(&config);
        let map = DungeonGenerator::new().generate_map(&config, &mut rng).unwrap();
        assert_eq!((map.width, map.height), (48, 20));
        assert!(utils::validate_dungeon(&map).is_ok());
    }
}
