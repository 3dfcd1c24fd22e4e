//! # Game Systems
//!
//! Rule catalogs the engine delegates to: spells, crafting and quests.
//!
//! None of these hold on to game state between calls. They receive the
//! player or a state snapshot, and return results for the engine to merge.

pub mod crafting;
pub mod quests;
pub mod spells;

pub use crafting::*;
pub use quests::*;
pub use spells::*;
