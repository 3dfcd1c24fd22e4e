//! # Runehack
//!
//! A turn-based ASCII dungeon crawler engine: procedurally generated floors,
//! melee combat, spellcasting, crafting and quests.
//!
//! ## Architecture Overview
//!
//! The crate is the simulation core only. Rendering and key bindings belong to
//! whatever front end drives it.
//!
//! - **Generation**: room-and-corridor floors with a guaranteed-connectivity pass
//! - **Systems**: static spell, recipe and quest catalogs with their rules
//! - **Engine**: the single owner of [`GameState`], resolving commands into turns
//! - **Persistence**: one JSON save slot behind a small key-value store trait
//!
//! Every command returns a fresh snapshot of the state; callers re-render from it.

pub mod game;
pub mod generation;
pub mod input;
pub mod persistence;
pub mod systems;
pub mod utils;

pub use game::*;
pub use generation::*;
pub use input::*;
pub use persistence::*;
pub use systems::*;
pub use utils::*;

/// Errors surfaced by the engine and its stores.
///
/// Rule violations inside a subsystem use that subsystem's own error
/// ([`SpellError`], [`CraftError`], [`QuestError`]); this type covers the
/// plumbing around them.
#[derive(thiserror::Error, Debug)]
pub enum RunehackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A grid write or placement outside what the floor allows
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// The generator could not produce a valid floor
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// A spell could not be cast
    #[error("Spell failed: {0}")]
    Spell(#[from] systems::SpellError),

    /// Save slot could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Shorthand for results carrying a [`RunehackError`].
pub type RunehackResult<T> = Result<T, RunehackError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tuning constants shared across modules.
pub mod config {
    /// Default dungeon width in tiles
    pub const DUNGEON_WIDTH: u32 = 80;

    /// Default dungeon height in tiles
    pub const DUNGEON_HEIGHT: u32 = 24;

    /// Maximum number of items the player can carry
    pub const INVENTORY_CAPACITY: usize = 20;

    /// Number of messages kept in the rolling log
    pub const MESSAGE_LOG_CAPACITY: usize = 10;

    /// Manhattan distance at which monsters start chasing the player
    pub const MONSTER_AGGRO_RADIUS: u32 = 5;

    /// Manhattan radius of area-of-effect spells
    pub const AREA_SPELL_RADIUS: u32 = 2;

    /// Key of the single save slot
    pub const SAVE_SLOT: &str = "runehack_save";

    /// Highest crafting level reachable
    pub const MAX_CRAFTING_LEVEL: u32 = 10;

    /// Starting player health
    pub const DEFAULT_PLAYER_HEALTH: i32 = 100;

    /// Starting player mana
    pub const DEFAULT_PLAYER_MANA: i32 = 50;
}
