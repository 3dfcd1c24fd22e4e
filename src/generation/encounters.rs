//! # Encounter Generation
//!
//! Populates a fresh floor with monsters and loot scaled to its depth.

use crate::game::{GameState, Monster, Position};
use crate::generation::{DungeonGenerator, ItemGenerator};
use log::warn;
use rand::rngs::StdRng;

/// Counts of what a population pass actually placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationReport {
    pub monsters: usize,
    pub items: usize,
}

/// Places monsters and floor items on empty tiles.
#[derive(Debug, Clone)]
pub struct EncounterGenerator {
    items: ItemGenerator,
    /// Random tiles tried per placement before giving up on it
    pub max_attempts: u32,
}

impl EncounterGenerator {
    pub fn new() -> Self {
        Self {
            items: ItemGenerator::new(),
            max_attempts: 100,
        }
    }

    /// Monsters spawned on a floor at this depth.
    pub fn monster_count(depth: u32) -> usize {
        5 + 2 * depth as usize
    }

    /// Items spawned on a floor at this depth.
    pub fn item_count(depth: u32) -> usize {
        3 + depth as usize
    }

    /// A passable tile that is not the stairs and holds no player, monster or item.
    pub fn find_spawn_position(&self, state: &GameState, rng: &mut StdRng) -> Option<Position> {
        (0..self.max_attempts)
            .filter_map(|_| DungeonGenerator::random_floor_position(&state.dungeon, rng))
            .find(|&pos| !state.is_occupied(pos))
    }

    /// Fills the floor for `state.dungeon_level`.
    ///
    /// Placements that find no empty tile are skipped with a warning.
    pub fn populate(&self, state: &mut GameState, rng: &mut StdRng) -> PopulationReport {
        let depth = state.dungeon_level;
        let mut report = PopulationReport::default();

        let monster_target = Self::monster_count(depth);
        for i in 0..monster_target {
            match self.find_spawn_position(state, rng) {
                Some(pos) => {
                    state.monsters.push(Monster::spawn_random(pos, depth, rng));
                    report.monsters += 1;
                }
                None => warn!(
                    "Could not find empty position for monster {}/{}",
                    i + 1,
                    monster_target
                ),
            }
        }

        let item_target = Self::item_count(depth);
        for i in 0..item_target {
            let Some(pos) = self.find_spawn_position(state, rng) else {
                warn!("Could not find empty position for item {}/{}", i + 1, item_target);
                continue;
            };
            if let Some(item) = self.items.random_floor_item(rng) {
                if state.place_item(pos, item).is_ok() {
                    report.items += 1;
                }
            }
        }

        report
    }
}

impl Default for EncounterGenerator {
    fn default() -> Self {
        Self::new()
    }
}
