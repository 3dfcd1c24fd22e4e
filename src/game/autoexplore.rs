//! # Autoexplore Module
//!
//! A simple driver that walks the player toward the stairs, used by the
//! headless runner and by tests that need a session to make progress.

use crate::game::{Direction, GameState, Phase, Position};
use crate::utils::{find_path, find_path_to_nearest};

/// Picks the next step for an unattended player.
#[derive(Debug, Clone, Default)]
pub struct Autoexplore {
    /// Where the last chosen path led
    pub target: Option<Position>,
}

impl Autoexplore {
    pub fn new() -> Self {
        Self::default()
    }

    /// First step of the shortest path to the stairs, or to the nearest floor
    /// item when the stairs cannot be reached.
    ///
    /// Monsters are not obstacles; stepping into one attacks it. Returns
    /// `None` outside the playing phase or when nothing is reachable.
    pub fn next_direction(&mut self, state: &GameState) -> Option<Direction> {
        if state.phase != Phase::Playing {
            return None;
        }

        let here = state.player.position;
        let path = state
            .dungeon
            .stairs_position()
            .and_then(|stairs| find_path(&state.dungeon, here, stairs))
            .or_else(|| {
                find_path_to_nearest(&state.dungeon, here, |pos| {
                    pos != here && state.item_positions.contains_key(&pos)
                })
            })?;

        self.target = path.last().copied();
        let next = *path.get(1)?;
        Self::direction_to(here, next)
    }

    /// Direction from one position to an adjacent one.
    fn direction_to(from: Position, to: Position) -> Option<Direction> {
        Direction::from_delta(to - from)
    }
}
