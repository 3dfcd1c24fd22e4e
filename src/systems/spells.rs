//! # Spell System
//!
//! The spell catalog and cast resolution.
//!
//! Casting never touches the live state: [`SpellSystem::cast`] validates the
//! request, then applies every effect to a clone and hands the clone back for
//! the engine to adopt.

use crate::config;
use crate::game::{spell_damage, Buff, EffectKind, GameState, ItemEffect, Monster, MonsterKind, Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Broad school of a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellKind {
    Offensive,
    Defensive,
    Utility,
    Healing,
}

/// What a spell effect does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpellEffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
    Teleport,
    Summon,
}

/// Who a spell effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    #[serde(rename = "self")]
    Caster,
    Enemy,
    Area,
    AllEnemies,
}

/// One step of a spell's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellEffect {
    pub kind: SpellEffectKind,
    pub target: EffectTarget,
    pub value: i32,
    /// Turns the effect lasts, for buffs and debuffs
    #[serde(default)]
    pub duration: Option<u32>,
}

impl SpellEffect {
    fn new(kind: SpellEffectKind, target: EffectTarget, value: i32) -> Self {
        Self {
            kind,
            target,
            value,
            duration: None,
        }
    }

    fn lasting(mut self, turns: u32) -> Self {
        self.duration = Some(turns);
        self
    }
}

/// A castable spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    pub kind: SpellKind,
    pub mana_cost: i32,
    /// Maximum Manhattan distance to the target; 0 means self only
    pub range: u32,
    /// Character level needed to learn it
    pub level: u32,
    pub description: String,
    pub glyph: char,
    pub color: String,
    pub effects: Vec<SpellEffect>,
}

/// Value of a heal effect meaning "restore everything".
pub const FULL_HEAL: i32 = 9999;

/// Why a cast was rejected. No state changes when a cast fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SpellError {
    #[error("Unknown spell: {0}")]
    UnknownSpell(String),

    #[error("You have not learned {0}")]
    NotLearned(String),

    #[error("Not enough MP for {spell}: {required} needed, {available} available")]
    InsufficientMana {
        spell: String,
        required: i32,
        available: i32,
    },

    #[error("Target is out of range for {spell}: distance {distance}, range {range}")]
    OutOfRange {
        spell: String,
        distance: u32,
        range: u32,
    },

    #[error("Invalid target {0}")]
    InvalidTarget(Position),

    #[error("Spells can only be cast while playing")]
    NotPlaying,
}

/// Result of a successful cast.
#[derive(Debug, Clone)]
pub struct CastOutcome {
    /// The state with every effect applied and mana spent
    pub state: GameState,
    /// Headline for the message log
    pub message: String,
    /// Kinds of the monsters the spell killed, in kill order
    pub kills: Vec<MonsterKind>,
}

/// Registry of every spell in the game.
#[derive(Debug, Clone)]
pub struct SpellSystem {
    spells: BTreeMap<String, Spell>,
}

impl SpellSystem {
    /// Builds the spell catalog.
    pub fn new() -> Self {
        use EffectTarget::*;
        use SpellEffectKind::*;

        let entries = [
            ("heal", "Heal", SpellKind::Healing, 10, 0, 1, '♥', "#00FF00",
                "Restores a little health",
                vec![SpellEffect::new(Heal, Caster, 15)]),
            ("fireball", "Fireball", SpellKind::Offensive, 15, 3, 1, '●', "#FF4500",
                "Hurls a ball of fire at one enemy",
                vec![SpellEffect::new(Damage, Enemy, 20)]),
            ("magic_missile", "Magic Missile", SpellKind::Offensive, 8, 4, 1, '→', "#00FFFF",
                "A cheap bolt of force",
                vec![SpellEffect::new(Damage, Enemy, 12)]),
            ("ice_lance", "Ice Lance", SpellKind::Offensive, 20, 2, 4, '▲', "#87CEEB",
                "Pierces and freezes one enemy",
                vec![
                    SpellEffect::new(Damage, Enemy, 25),
                    SpellEffect::new(Debuff, Enemy, -5).lasting(3),
                ]),
            ("lightning_bolt", "Lightning Bolt", SpellKind::Offensive, 25, 5, 5, '⚡', "#FFFF00",
                "Long range lightning strike",
                vec![SpellEffect::new(Damage, Enemy, 30)]),
            ("greater_heal", "Greater Heal", SpellKind::Healing, 25, 0, 4, '♥', "#32CD32",
                "Restores a lot of health",
                vec![SpellEffect::new(Heal, Caster, 40)]),
            ("shield", "Magic Shield", SpellKind::Defensive, 20, 0, 3, '◊', "#4169E1",
                "Raises defense for a few turns",
                vec![SpellEffect::new(Buff, Caster, 10).lasting(5)]),
            ("meteor", "Meteor", SpellKind::Offensive, 50, 3, 8, '☄', "#FF6347",
                "Strikes everything near the target",
                vec![SpellEffect::new(Damage, Area, 60)]),
            ("teleport", "Teleport", SpellKind::Utility, 30, 10, 6, '◎', "#9400D3",
                "Moves instantly to a visible tile",
                vec![SpellEffect::new(Teleport, Caster, 0)]),
            ("time_stop", "Time Stop", SpellKind::Utility, 40, 0, 9, '⧖', "#FFD700",
                "Freezes every enemy on the floor",
                vec![SpellEffect::new(Debuff, AllEnemies, 0).lasting(3)]),
            ("resurrection", "Resurrection", SpellKind::Healing, 80, 0, 10, '✚', "#FFFFFF",
                "Restores all health",
                vec![SpellEffect::new(Heal, Caster, FULL_HEAL)]),
        ];

        let spells = entries
            .into_iter()
            .map(
                |(id, name, kind, mana_cost, range, level, glyph, color, description, effects)| {
                    let spell = Spell {
                        id: id.to_string(),
                        name: name.to_string(),
                        kind,
                        mana_cost,
                        range,
                        level,
                        description: description.to_string(),
                        glyph,
                        color: color.to_string(),
                        effects,
                    };
                    (spell.id.clone(), spell)
                },
            )
            .collect();

        Self { spells }
    }

    pub fn get_spell(&self, id: &str) -> Option<&Spell> {
        self.spells.get(id)
    }

    /// Spells a character of the given level may know.
    pub fn available_spells(&self, level: u32) -> Vec<&Spell> {
        self.spells
            .values()
            .filter(|spell| spell.level <= level)
            .collect()
    }

    /// Catalog entries for the given ids; unknown ids are skipped.
    pub fn known_spells<'a, I, S>(&self, ids: I) -> Vec<&Spell>
    where
        I: IntoIterator<Item = &'a S>,
        S: AsRef<str> + ?Sized + 'a,
    {
        ids.into_iter()
            .filter_map(|id| self.spells.get(id.as_ref()))
            .collect()
    }

    /// Teaches a spell. Fails for unknown spells, too low a level, or one already known.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{Player, SpellSystem};
    ///
    /// let spells = SpellSystem::new();
    /// let mut player = Player::default();
    /// assert!(!spells.learn_spell(&mut player, "heal"));
    /// assert!(!spells.learn_spell(&mut player, "meteor"));
    /// player.level = 8;
    /// assert!(spells.learn_spell(&mut player, "meteor"));
    /// ```
    pub fn learn_spell(&self, player: &mut Player, spell_id: &str) -> bool {
        match self.spells.get(spell_id) {
            Some(spell) if player.level >= spell.level && !player.knows_spell(spell_id) => {
                player.known_spells.insert(spell_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Learns every spell the player's level now allows. Returns the names learned.
    pub fn learn_available(&self, player: &mut Player) -> Vec<String> {
        let ids: Vec<String> = self
            .available_spells(player.level)
            .into_iter()
            .map(|spell| spell.id.clone())
            .collect();

        ids.into_iter()
            .filter(|id| self.learn_spell(player, id))
            .filter_map(|id| self.spells.get(&id).map(|spell| spell.name.clone()))
            .collect()
    }

    /// Checks everything a cast needs before any mana is spent.
    fn check_cast(&self, spell_id: &str, player: &Player, target: Position, state: &GameState) -> Result<&Spell, SpellError> {
        let spell = self
            .spells
            .get(spell_id)
            .ok_or_else(|| SpellError::UnknownSpell(spell_id.to_string()))?;

        if !player.knows_spell(spell_id) {
            return Err(SpellError::NotLearned(spell.name.clone()));
        }

        if player.mp < spell.mana_cost {
            return Err(SpellError::InsufficientMana {
                spell: spell.name.clone(),
                required: spell.mana_cost,
                available: player.mp,
            });
        }

        let distance = player.position.manhattan_distance(target);
        if spell.range > 0 && distance > spell.range {
            return Err(SpellError::OutOfRange {
                spell: spell.name.clone(),
                distance,
                range: spell.range,
            });
        }

        if !state.dungeon.is_valid_position(target) {
            return Err(SpellError::InvalidTarget(target));
        }

        Ok(spell)
    }

    /// Casts a spell from the player at `target`.
    ///
    /// Validation order: the spell exists, the player knows it, has the mana,
    /// and the target is in range (range 0 spells skip the range check). On
    /// success mana is spent and each effect is applied in order.
    pub fn cast(&self, spell_id: &str, state: &GameState, target: Position) -> Result<CastOutcome, SpellError> {
        let spell = self.check_cast(spell_id, &state.player, target, state)?;

        let mut next = state.clone();
        next.player.mp -= spell.mana_cost;
        let mut kills = Vec::new();

        for effect in &spell.effects {
            self.apply_effect(spell, effect, target, &mut next, &mut kills);
        }

        Ok(CastOutcome {
            state: next,
            message: format!("You cast {}!", spell.name),
            kills,
        })
    }

    fn apply_effect(
        &self,
        spell: &Spell,
        effect: &SpellEffect,
        target: Position,
        state: &mut GameState,
        kills: &mut Vec<MonsterKind>,
    ) {
        let power = effect.value + state.player.effective_magic_power();

        match (effect.kind, effect.target) {
            (SpellEffectKind::Heal, EffectTarget::Caster) => {
                let amount = if effect.value == FULL_HEAL {
                    state.player.max_hp
                } else {
                    effect.value
                };
                let healed = state.player.heal(amount);
                state.add_message(format!("Recovered {} HP!", healed));
            }
            (SpellEffectKind::Damage, EffectTarget::Enemy) => {
                if let Some(index) = state.monster_index_at(target) {
                    Self::hit_monster(state, index, power);
                }
            }
            (SpellEffectKind::Damage, EffectTarget::Area) => {
                for index in 0..state.monsters.len() {
                    if state.monsters[index].position.manhattan_distance(target)
                        <= config::AREA_SPELL_RADIUS
                    {
                        Self::hit_monster(state, index, power);
                    }
                }
            }
            (SpellEffectKind::Damage, EffectTarget::AllEnemies) => {
                for index in 0..state.monsters.len() {
                    Self::hit_monster(state, index, power);
                }
            }
            (SpellEffectKind::Teleport, EffectTarget::Caster) => {
                if state.dungeon.is_passable(target) && state.monster_at(target).is_none() {
                    state.player.position = target;
                    state.add_message("You teleport!");
                } else {
                    state.add_message("The teleport fizzles.");
                }
            }
            (SpellEffectKind::Buff, EffectTarget::Caster) => {
                state.player.buffs.push(Buff {
                    source: spell.id.clone(),
                    effect: ItemEffect::new(EffectKind::Defense, effect.value),
                    remaining_turns: effect.duration,
                });
                state.add_message(format!("Defense rises by {}!", effect.value));
            }
            (SpellEffectKind::Debuff, EffectTarget::Enemy) => {
                let turns = effect.duration.unwrap_or(1);
                if let Some(index) = state.monster_index_at(target) {
                    let monster = &mut state.monsters[index];
                    monster.held_turns = monster.held_turns.max(turns);
                    let name = monster.name.clone();
                    state.add_message(format!("The {} is frozen in place!", name));
                }
            }
            (SpellEffectKind::Debuff, EffectTarget::AllEnemies) => {
                let turns = effect.duration.unwrap_or(1);
                for monster in &mut state.monsters {
                    monster.held_turns = monster.held_turns.max(turns);
                }
                state.add_message("Time stands still!");
            }
            (SpellEffectKind::Summon, _) => {
                state.add_message("Nothing answers the summons.");
            }
            _ => {}
        }

        Self::remove_dead(state, kills);
    }

    fn hit_monster(state: &mut GameState, index: usize, power: i32) {
        let monster = &mut state.monsters[index];
        if !monster.is_alive() {
            return;
        }
        let damage = monster.take_damage(spell_damage(power, monster.defense));
        let name = monster.name.clone();
        state.add_message(format!("The {} takes {} damage!", name, damage));
    }

    /// Removes slain monsters, granting their experience.
    fn remove_dead(state: &mut GameState, kills: &mut Vec<MonsterKind>) {
        let (dead, alive): (Vec<Monster>, Vec<Monster>) = std::mem::take(&mut state.monsters)
            .into_iter()
            .partition(|monster| !monster.is_alive());
        state.monsters = alive;

        for monster in dead {
            state.player.exp += monster.exp;
            state.add_message(format!("The {} is destroyed! Gained {} experience.", monster.name, monster.exp));
            kills.push(monster.kind);
        }
    }
}

impl Default for SpellSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{DungeonMap, Tile};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn arena() -> GameState {
        let mut map = DungeonMap::new(20, 9);
        for y in 1..8 {
            for x in 1..19 {
                map.set_tile(Position::new(x, y), Tile::floor()).unwrap();
            }
        }
        map.set_tile(Position::new(10, 6), Tile::wall()).unwrap();
        GameState::new(map, Player::new(Position::new(5, 4)))
    }

    fn add_monster(state: &mut GameState, kind: MonsterKind, pos: Position) {
        let mut rng = StdRng::seed_from_u64(state.monsters.len() as u64);
        state.monsters.push(Monster::spawn(kind, pos, 1, &mut rng));
    }

    #[test]
    fn test_catalog_contents() {
        let spells = SpellSystem::new();
        assert_eq!(spells.available_spells(1).len(), 3);
        assert_eq!(spells.available_spells(10).len(), 11);

        let heal = spells.get_spell("heal").unwrap();
        assert_eq!((heal.mana_cost, heal.range, heal.level), (10, 0, 1));
        let meteor = spells.get_spell("meteor").unwrap();
        assert_eq!(meteor.effects[0].target, EffectTarget::Area);
        assert!(spells.get_spell("wish").is_none());
    }

    #[test]
    fn test_known_spells_skips_unknown_ids() {
        let spells = SpellSystem::new();
        let ids = vec!["fireball".to_string(), "wish".to_string()];
        let known = spells.known_spells(&ids);
        assert_eq!(known.len(), 1);
        assert_eq!(known[0].id, "fireball");
    }

    #[test]
    fn test_heal_spends_mana_and_clamps() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.mp = 20;
        state.player.hp = 90;
        let target = state.player.position;

        let outcome = spells.cast("heal", &state, target).unwrap();
        assert_eq!(outcome.state.player.mp, 10);
        assert_eq!(outcome.state.player.hp, 100);
        assert!(outcome.state.messages.contains("Recovered 10 HP"));
        assert_eq!(state.player.mp, 20);
    }

    #[test]
    fn test_rejections_leave_state_alone() {
        let spells = SpellSystem::new();
        let mut state = arena();
        let here = state.player.position;

        assert_eq!(
            spells.cast("wish", &state, here).unwrap_err(),
            SpellError::UnknownSpell("wish".to_string())
        );
        assert!(matches!(spells.cast("meteor", &state, here), Err(SpellError::NotLearned(_))));

        state.player.mp = 5;
        assert!(matches!(
            spells.cast("fireball", &state, here),
            Err(SpellError::InsufficientMana { required: 15, available: 5, .. })
        ));

        state.player.mp = 50;
        assert!(matches!(
            spells.cast("fireball", &state, Position::new(9, 4)),
            Err(SpellError::OutOfRange { distance: 4, range: 3, .. })
        ));
    }

    #[test]
    fn test_fireball_damage_and_kill() {
        let spells = SpellSystem::new();
        let mut state = arena();
        add_monster(&mut state, MonsterKind::Orc, Position::new(7, 4));

        // 20 + 8 magic power - 5 defense
        let outcome = spells.cast("fireball", &state, Position::new(7, 4)).unwrap();
        assert_eq!(outcome.state.monsters[0].hp, 50 - 23);
        assert!(outcome.kills.is_empty());

        let mut weak = arena();
        add_monster(&mut weak, MonsterKind::Slime, Position::new(6, 4));
        let outcome = spells.cast("fireball", &weak, Position::new(6, 4)).unwrap();
        assert!(outcome.state.monsters.is_empty());
        assert_eq!(outcome.kills, vec![MonsterKind::Slime]);
        assert_eq!(outcome.state.player.exp, 10);
        assert_eq!(outcome.state.player.gold, 0);
    }

    #[test]
    fn test_single_target_damage_floor() {
        let spells = SpellSystem::new();
        let mut state = arena();
        add_monster(&mut state, MonsterKind::Orc, Position::new(6, 4));
        state.monsters[0].defense = 500;
        let outcome = spells.cast("magic_missile", &state, Position::new(6, 4)).unwrap();
        assert_eq!(outcome.state.monsters[0].hp, 49);
    }

    #[test]
    fn test_meteor_hits_area_only() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.level = 8;
        state.player.known_spells.insert("meteor".to_string());
        add_monster(&mut state, MonsterKind::Orc, Position::new(7, 4));
        add_monster(&mut state, MonsterKind::Orc, Position::new(8, 5));
        add_monster(&mut state, MonsterKind::Orc, Position::new(12, 4));

        let outcome = spells.cast("meteor", &state, Position::new(7, 4)).unwrap();
        assert_eq!(outcome.kills.len(), 2);
        assert_eq!(outcome.state.monsters.len(), 1);
        assert_eq!(outcome.state.monsters[0].position, Position::new(12, 4));
        assert_eq!(outcome.state.player.mp, 0);
    }

    #[test]
    fn test_teleport_requires_open_floor() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.known_spells.insert("teleport".to_string());

        let outcome = spells.cast("teleport", &state, Position::new(10, 6)).unwrap();
        assert_eq!(outcome.state.player.position, Position::new(5, 4));
        assert!(outcome.state.messages.contains("fizzles"));

        let outcome = spells.cast("teleport", &state, Position::new(11, 6)).unwrap();
        assert_eq!(outcome.state.player.position, Position::new(11, 6));
    }

    #[test]
    fn test_shield_is_timed() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.known_spells.insert("shield".to_string());
        let here = state.player.position;

        let outcome = spells.cast("shield", &state, here).unwrap();
        let player = &outcome.state.player;
        assert_eq!(player.defense, 5);
        assert_eq!(player.effective_defense(), 15);
        assert_eq!(player.buffs[0].remaining_turns, Some(5));
    }

    #[test]
    fn test_ice_lance_freezes_survivor() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.known_spells.insert("ice_lance".to_string());
        add_monster(&mut state, MonsterKind::Orc, Position::new(6, 4));
        state.monsters[0].hp = 200;

        let outcome = spells.cast("ice_lance", &state, Position::new(6, 4)).unwrap();
        assert_eq!(outcome.state.monsters[0].held_turns, 3);
    }

    #[test]
    fn test_resurrection_full_heal() {
        let spells = SpellSystem::new();
        let mut state = arena();
        state.player.known_spells.insert("resurrection".to_string());
        state.player.mp = 80;
        state.player.hp = 3;
        let here = state.player.position;

        let outcome = spells.cast("resurrection", &state, here).unwrap();
        assert_eq!(outcome.state.player.hp, outcome.state.player.max_hp);
    }

    #[test]
    fn test_learn_available_on_level_up() {
        let spells = SpellSystem::new();
        let mut player = Player::default();
        player.level = 4;
        let mut learned = spells.learn_available(&mut player);
        learned.sort();
        assert_eq!(learned, vec!["Greater Heal", "Ice Lance", "Magic Shield"]);
        assert!(spells.learn_available(&mut player).is_empty());
    }
}
