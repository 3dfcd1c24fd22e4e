//! # Game State Module
//!
//! The aggregate root of a session: phase, floor, player, monsters, floor
//! items and the rolling message log.
//!
//! [`GameState`] is plain data. All rules live in the engine; the state only
//! offers lookups and small consistency-preserving mutations (placing and
//! removing floor items keeps the id map and the position index in step).

use crate::game::{DungeonMap, Item, Monster, Player, Position};
use crate::persistence::pairs;
use crate::{config, RunehackError, RunehackResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Top-level game mode gating which commands are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Menu,
    Playing,
    Inventory,
    Dead,
}

/// Rolling log holding the most recent [`config::MESSAGE_LOG_CAPACITY`] lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageLog {
    entries: VecDeque<String>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line, dropping the oldest when full.
    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push_back(message.into());
        while self.entries.len() > config::MESSAGE_LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    /// Whether any retained line contains the given text.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Complete state of one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Current phase
    pub phase: Phase,
    /// Tile grid of the current floor
    pub dungeon: DungeonMap,
    /// The player character
    pub player: Player,
    /// Live monsters in AI order
    pub monsters: Vec<Monster>,
    /// Floor items by instance id
    #[serde(with = "pairs")]
    pub items: BTreeMap<String, Item>,
    /// Floor item id by position
    #[serde(with = "pairs")]
    pub item_positions: BTreeMap<Position, String>,
    /// Current depth, starting at 1
    pub dungeon_level: u32,
    /// Turns elapsed this session
    pub turn_count: u64,
    /// Recent feedback lines
    pub messages: MessageLog,
    /// Set when the player dies
    pub game_over: bool,
}

impl GameState {
    /// Creates a playing state on the given floor.
    pub fn new(dungeon: DungeonMap, player: Player) -> Self {
        Self {
            phase: Phase::Playing,
            dungeon,
            player,
            monsters: Vec::new(),
            items: BTreeMap::new(),
            item_positions: BTreeMap::new(),
            dungeon_level: 1,
            turn_count: 0,
            messages: MessageLog::new(),
            game_over: false,
        }
    }

    /// The pre-game state shown before the first new game.
    pub fn menu() -> Self {
        Self {
            phase: Phase::Menu,
            ..Self::new(
                DungeonMap::new(config::DUNGEON_WIDTH, config::DUNGEON_HEIGHT),
                Player::default(),
            )
        }
    }

    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message);
    }

    /// Index of the monster standing on a position.
    pub fn monster_index_at(&self, position: Position) -> Option<usize> {
        self.monsters
            .iter()
            .position(|monster| monster.position == position)
    }

    pub fn monster_at(&self, position: Position) -> Option<&Monster> {
        self.monster_index_at(position).map(|index| &self.monsters[index])
    }

    /// The floor item lying on a position.
    pub fn item_at(&self, position: Position) -> Option<&Item> {
        self.item_positions
            .get(&position)
            .and_then(|id| self.items.get(id))
    }

    /// Places an item on the floor. Fails if the tile already holds one.
    pub fn place_item(&mut self, position: Position, item: Item) -> RunehackResult<()> {
        if self.item_positions.contains_key(&position) {
            return Err(RunehackError::InvalidAction(format!(
                "Position {} already holds an item",
                position
            )));
        }
        self.item_positions.insert(position, item.id.clone());
        self.items.insert(item.id.clone(), item);
        Ok(())
    }

    /// Removes and returns the floor item on a position.
    pub fn take_item_at(&mut self, position: Position) -> Option<Item> {
        let id = self.item_positions.remove(&position)?;
        self.items.remove(&id)
    }

    /// Whether the player, a monster or a floor item already occupies a tile.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.player.position == position
            || self.monster_index_at(position).is_some()
            || self.item_positions.contains_key(&position)
    }

    /// Drops every monster and floor item, e.g. before populating a new floor.
    pub fn clear_floor_contents(&mut self) {
        self.monsters.clear();
        self.items.clear();
        self.item_positions.clear();
    }

    /// Serializes the state to JSON.
    pub fn save_to_json(&self) -> RunehackResult<String> {
        serde_json::to_string(self).map_err(RunehackError::from)
    }

    /// Loads a state from JSON.
    pub fn load_from_json(json: &str) -> RunehackResult<Self> {
        serde_json::from_str(json).map_err(RunehackError::from)
    }

    /// Renders the floor with the player, monsters and items drawn over it.
    pub fn render_ascii(&self) -> String {
        let mut rows: Vec<Vec<char>> = self
            .dungeon
            .tiles
            .iter()
            .map(|row| row.iter().map(|tile| tile.glyph).collect())
            .collect();

        let mut draw = |position: Position, glyph: char| {
            if let Some(cell) = rows
                .get_mut(position.y as usize)
                .and_then(|row| row.get_mut(position.x as usize))
            {
                *cell = glyph;
            }
        };

        for (position, id) in &self.item_positions {
            if let Some(item) = self.items.get(id) {
                draw(*position, item.glyph);
            }
        }
        for monster in &self.monsters {
            draw(monster.position, monster.glyph);
        }
        draw(self.player.position, '@');

        rows.into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::menu()
    }
}
