//! # Command Definitions
//!
//! The engine's command surface as a serializable enum, so commands can be
//! scripted, logged or sent over a wire.

use crate::game::{Direction, GameEngine, GameState, Position};
use crate::{RunehackError, RunehackResult};
use serde::{Deserialize, Serialize};

/// One player command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Start a new session
    NewGame,
    /// Step, attack or descend in a direction
    Move { direction: Direction },
    /// Cast a spell, at the player's own tile when no target is given
    Cast {
        spell_id: String,
        #[serde(default)]
        target: Option<Position>,
    },
    /// Open or close the inventory
    ToggleInventory,
    /// Drink a potion
    UseItem { item_id: String },
    /// Wield a weapon or wear armor
    EquipItem { item_id: String },
    /// Craft a recipe
    Craft { recipe_id: String },
    AcceptQuest { quest_id: String },
    ClaimRewards { quest_id: String },
    /// Write the save slot
    Save,
    /// Restore the save slot
    Load,
}

impl Command {
    /// Runs the command and returns the resulting snapshot.
    ///
    /// Rejected casts, failed saves and a missing save surface as errors.
    /// Every other failure is reported in the message log of the snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{Command, Direction, GameEngine, Phase};
    ///
    /// let mut engine = GameEngine::new(3);
    /// let state = Command::NewGame.execute(&mut engine).unwrap();
    /// assert_eq!(state.phase, Phase::Playing);
    ///
    /// let state = Command::ToggleInventory.execute(&mut engine).unwrap();
    /// assert_eq!(state.phase, Phase::Inventory);
    /// ```
    pub fn execute(&self, engine: &mut GameEngine) -> RunehackResult<GameState> {
        match self {
            Command::NewGame => Ok(engine.start_new_game()),
            Command::Move { direction } => Ok(engine.move_player(*direction)),
            Command::Cast { spell_id, target } => engine
                .cast_spell(spell_id, *target)
                .map_err(RunehackError::from),
            Command::ToggleInventory => Ok(engine.toggle_inventory()),
            Command::UseItem { item_id } => Ok(engine.use_item(item_id)),
            Command::EquipItem { item_id } => Ok(engine.equip_item(item_id)),
            Command::Craft { recipe_id } => Ok(engine.craft_item(recipe_id)),
            Command::AcceptQuest { quest_id } => {
                engine.accept_quest(quest_id);
                Ok(engine.game_state())
            }
            Command::ClaimRewards { quest_id } => Ok(engine.claim_quest_rewards(quest_id)),
            Command::Save => {
                engine.save_game()?;
                Ok(engine.game_state())
            }
            Command::Load => engine
                .load_game()
                .ok_or_else(|| RunehackError::Persistence("No usable save data".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::SpellError;

    #[test]
    fn test_command_json_shape() {
        let command = Command::Move {
            direction: Direction::Northeast,
        };
        let json = serde_json::to_string(&command).unwrap();
        assert_eq!(json, r#"{"command":"move","direction":"northeast"}"#);

        let cast: Command =
            serde_json::from_str(r#"{"command":"cast","spell_id":"heal"}"#).unwrap();
        assert_eq!(
            cast,
            Command::Cast {
                spell_id: "heal".to_string(),
                target: None
            }
        );
    }

    #[test]
    fn test_cast_errors_propagate() {
        let mut engine = GameEngine::new(9);
        Command::NewGame.execute(&mut engine).unwrap();
        let result = Command::Cast {
            spell_id: "meteor".to_string(),
            target: None,
        }
        .execute(&mut engine);
        assert!(matches!(
            result,
            Err(RunehackError::Spell(SpellError::NotLearned(_)))
        ));
    }

    #[test]
    fn test_save_then_load() {
        let mut engine = GameEngine::new(4);
        assert!(matches!(
            Command::Load.execute(&mut engine),
            Err(RunehackError::Persistence(_))
        ));

        Command::NewGame.execute(&mut engine).unwrap();
        let saved = Command::Save.execute(&mut engine).unwrap();
        let loaded = Command::Load.execute(&mut engine).unwrap();
        assert_eq!(loaded.player, saved.player);
        assert_eq!(loaded.dungeon, saved.dungeon);
    }

    #[test]
    fn test_quest_commands() {
        let mut engine = GameEngine::new(6);
        Command::NewGame.execute(&mut engine).unwrap();
        let state = Command::AcceptQuest {
            quest_id: "tutorial_kill".to_string(),
        }
        .execute(&mut engine)
        .unwrap();
        assert!(state.messages.contains("Quest started"));

        let state = Command::ClaimRewards {
            quest_id: "tutorial_kill".to_string(),
        }
        .execute(&mut engine)
        .unwrap();
        assert_eq!(state.player.exp, 0);
    }
}
