//! # Entities Module
//!
//! The player character, monsters and the bestiary monsters are drawn from.

use crate::config;
use crate::game::{new_entity_id, EffectKind, EntityId, Item, ItemCategory, ItemEffect, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weapon and armor slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
}

impl Equipment {
    /// Total bonus of an effect kind across both slots.
    pub fn bonus(&self, kind: EffectKind) -> i32 {
        self.weapon
            .iter()
            .chain(self.armor.iter())
            .map(|item| item.effect_total(kind))
            .sum()
    }

    /// Puts an item into its slot, returning whatever was there before.
    ///
    /// Returns the item back as `Err` if it is neither weapon nor armor.
    pub fn equip(&mut self, item: Item) -> Result<Option<Item>, Item> {
        match item.category {
            ItemCategory::Weapon => Ok(self.weapon.replace(item)),
            ItemCategory::Armor => Ok(self.armor.replace(item)),
            _ => Err(item),
        }
    }
}

/// A stat modifier applied to the player by a spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    /// Spell that granted the buff
    pub source: String,
    /// Stat and amount
    pub effect: ItemEffect,
    /// Turns left; `None` lasts forever
    pub remaining_turns: Option<u32>,
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub level: u32,
    pub exp: u32,
    pub exp_to_next: u32,
    /// Base attack before equipment and buffs
    pub attack: i32,
    /// Base defense before equipment and buffs
    pub defense: i32,
    /// Base magic power before equipment and buffs
    pub magic_power: i32,
    pub gold: u32,
    pub crafting_level: u32,
    /// Carried items, at most [`config::INVENTORY_CAPACITY`]
    pub inventory: Vec<Item>,
    pub equipment: Equipment,
    pub known_spells: BTreeSet<String>,
    #[serde(default)]
    pub buffs: Vec<Buff>,
}

impl Player {
    /// Creates a level 1 character at the given position.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{Player, Position};
    ///
    /// let player = Player::new(Position::new(3, 4));
    /// assert_eq!(player.hp, 100);
    /// assert_eq!(player.mp, 50);
    /// assert!(player.knows_spell("heal"));
    /// ```
    pub fn new(position: Position) -> Self {
        Self {
            position,
            hp: config::DEFAULT_PLAYER_HEALTH,
            max_hp: config::DEFAULT_PLAYER_HEALTH,
            mp: config::DEFAULT_PLAYER_MANA,
            max_mp: config::DEFAULT_PLAYER_MANA,
            level: 1,
            exp: 0,
            exp_to_next: 100,
            attack: 10,
            defense: 5,
            magic_power: 8,
            gold: 0,
            crafting_level: 1,
            inventory: Vec::new(),
            equipment: Equipment::default(),
            known_spells: ["heal", "fireball", "magic_missile"]
                .iter()
                .map(|id| id.to_string())
                .collect(),
            buffs: Vec::new(),
        }
    }

    fn buff_bonus(&self, kind: EffectKind) -> i32 {
        self.buffs
            .iter()
            .filter(|buff| buff.effect.kind == kind)
            .map(|buff| buff.effect.magnitude)
            .sum()
    }

    /// Attack including equipment and buffs.
    pub fn effective_attack(&self) -> i32 {
        self.attack + self.equipment.bonus(EffectKind::Attack) + self.buff_bonus(EffectKind::Attack)
    }

    /// Defense including equipment and buffs.
    pub fn effective_defense(&self) -> i32 {
        self.defense
            + self.equipment.bonus(EffectKind::Defense)
            + self.buff_bonus(EffectKind::Defense)
    }

    /// Magic power including equipment and buffs.
    pub fn effective_magic_power(&self) -> i32 {
        self.magic_power
            + self.equipment.bonus(EffectKind::MagicPower)
            + self.buff_bonus(EffectKind::MagicPower)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn knows_spell(&self, spell_id: &str) -> bool {
        self.known_spells.contains(spell_id)
    }

    pub fn inventory_full(&self) -> bool {
        self.inventory.len() >= config::INVENTORY_CAPACITY
    }

    /// Adds an item unless the inventory is full, handing it back on failure.
    pub fn add_item(&mut self, item: Item) -> Result<(), Item> {
        if self.inventory_full() {
            return Err(item);
        }
        self.inventory.push(item);
        Ok(())
    }

    /// Removes and returns the inventory item with the given instance id.
    pub fn take_item(&mut self, item_id: &str) -> Option<Item> {
        let index = self.inventory.iter().position(|item| item.id == item_id)?;
        Some(self.inventory.remove(index))
    }

    /// Restores hp up to the maximum, returning the amount actually healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let healed = amount.min(self.max_hp - self.hp).max(0);
        self.hp += healed;
        healed
    }

    /// Restores mp up to the maximum, returning the amount actually restored.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        let restored = amount.min(self.max_mp - self.mp).max(0);
        self.mp += restored;
        restored
    }

    /// Applies damage, clamping hp at zero. Returns the damage dealt.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        let dealt = damage.max(0);
        self.hp = (self.hp - dealt).max(0);
        dealt
    }

    /// Counts down timed buffs by one turn and returns the ones that expired.
    pub fn tick_buffs(&mut self) -> Vec<Buff> {
        let mut expired = Vec::new();
        let mut active = Vec::with_capacity(self.buffs.len());

        for mut buff in self.buffs.drain(..) {
            match buff.remaining_turns {
                Some(turns) if turns <= 1 => expired.push(buff),
                Some(turns) => {
                    buff.remaining_turns = Some(turns - 1);
                    active.push(buff);
                }
                None => active.push(buff),
            }
        }

        self.buffs = active;
        expired
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(Position::default())
    }
}

/// The kinds of monster found in the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonsterKind {
    Slime,
    Goblin,
    Orc,
    Skeleton,
    Dragon,
}

/// Base stats of a monster kind at depth 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterTemplate {
    pub kind: MonsterKind,
    pub glyph: char,
    pub color: &'static str,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp: u32,
    pub gold: u32,
    /// Shallowest depth the kind appears on
    pub min_depth: u32,
}

impl MonsterKind {
    /// Bestiary entry for this kind.
    pub fn template(self) -> MonsterTemplate {
        let (glyph, color, hp, attack, defense, exp, gold, min_depth) = match self {
            MonsterKind::Slime => ('s', "#00ff00", 20, 5, 2, 10, 5, 1),
            MonsterKind::Goblin => ('g', "#ffff00", 30, 8, 3, 15, 10, 1),
            MonsterKind::Orc => ('o', "#ff8800", 50, 12, 5, 25, 20, 1),
            MonsterKind::Skeleton => ('S', "#ffffff", 40, 10, 4, 20, 15, 1),
            MonsterKind::Dragon => ('D', "#ff0000", 120, 22, 10, 100, 100, 8),
        };

        MonsterTemplate {
            kind: self,
            glyph,
            color,
            hp,
            attack,
            defense,
            exp,
            gold,
            min_depth,
        }
    }

    /// Lowercase name used in messages and quest targets.
    pub fn name(self) -> &'static str {
        match self {
            MonsterKind::Slime => "slime",
            MonsterKind::Goblin => "goblin",
            MonsterKind::Orc => "orc",
            MonsterKind::Skeleton => "skeleton",
            MonsterKind::Dragon => "dragon",
        }
    }

    /// Every kind in bestiary order.
    pub fn all() -> [MonsterKind; 5] {
        [
            MonsterKind::Slime,
            MonsterKind::Goblin,
            MonsterKind::Orc,
            MonsterKind::Skeleton,
            MonsterKind::Dragon,
        ]
    }

    /// Kinds allowed to spawn at a depth.
    pub fn available_at(depth: u32) -> Vec<MonsterKind> {
        Self::all()
            .into_iter()
            .filter(|kind| kind.template().min_depth <= depth)
            .collect()
    }
}

impl std::fmt::Display for MonsterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A hostile creature on the current floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub kind: MonsterKind,
    pub name: String,
    pub glyph: char,
    pub color: String,
    pub position: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub exp: u32,
    pub gold: u32,
    pub level: u32,
    /// Turns the monster stays frozen in place
    #[serde(default)]
    pub held_turns: u32,
}

impl Monster {
    /// Creates a monster of a kind scaled to the given depth.
    ///
    /// Every depth below the first adds 5 hp, 2 attack, 1 defense, 5 exp and
    /// 3 gold to the base stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use runehack::{Monster, MonsterKind, Position};
    ///
    /// let mut rng = StdRng::seed_from_u64(5);
    /// let orc = Monster::spawn(MonsterKind::Orc, Position::new(1, 1), 3, &mut rng);
    /// assert_eq!(orc.max_hp, 60);
    /// assert_eq!(orc.attack, 16);
    /// assert_eq!(orc.level, 3);
    /// ```
    pub fn spawn(kind: MonsterKind, position: Position, depth: u32, rng: &mut StdRng) -> Self {
        let template = kind.template();
        let bonus = depth.saturating_sub(1);
        let hp = template.hp + bonus as i32 * 5;

        Self {
            id: new_entity_id(rng),
            kind,
            name: kind.name().to_string(),
            glyph: template.glyph,
            color: template.color.to_string(),
            position,
            hp,
            max_hp: hp,
            attack: template.attack + bonus as i32 * 2,
            defense: template.defense + bonus as i32,
            exp: template.exp + bonus * 5,
            gold: template.gold + bonus * 3,
            level: depth.max(1),
            held_turns: 0,
        }
    }

    /// Spawns a random kind that may appear at the given depth.
    pub fn spawn_random(position: Position, depth: u32, rng: &mut StdRng) -> Self {
        let kinds = MonsterKind::available_at(depth);
        let kind = kinds.choose(rng).copied().unwrap_or(MonsterKind::Slime);
        Self::spawn(kind, position, depth, rng)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Applies damage and returns the damage dealt.
    pub fn take_damage(&mut self, damage: i32) -> i32 {
        let dealt = damage.max(0);
        self.hp -= dealt;
        dealt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn item(id: &str, category: ItemCategory) -> Item {
        Item::template(id, id, category, '?', "#ffffff", 1)
    }

    #[test]
    fn test_new_player_stats() {
        let player = Player::new(Position::new(1, 1));
        assert_eq!((player.hp, player.max_hp), (100, 100));
        assert_eq!((player.mp, player.max_mp), (50, 50));
        assert_eq!(player.level, 1);
        assert_eq!(player.exp_to_next, 100);
        assert_eq!(player.gold, 0);
        assert_eq!(player.crafting_level, 1);
        assert_eq!(player.known_spells.len(), 3);
        assert!(player.knows_spell("magic_missile"));
    }

    #[test]
    fn test_inventory_capacity() {
        let mut player = Player::default();
        for i in 0..config::INVENTORY_CAPACITY {
            assert!(player.add_item(item(&format!("rock{}", i), ItemCategory::Misc)).is_ok());
        }
        assert!(player.inventory_full());
        let rejected = player.add_item(item("extra", ItemCategory::Misc));
        assert_eq!(rejected.map_err(|item| item.id), Err("extra".to_string()));
        assert_eq!(player.inventory.len(), config::INVENTORY_CAPACITY);
    }

    #[test]
    fn test_heal_and_mana_clamp() {
        let mut player = Player::default();
        player.hp = 95;
        assert_eq!(player.heal(15), 5);
        assert_eq!(player.hp, 100);

        player.mp = 10;
        assert_eq!(player.restore_mana(30), 30);
        assert_eq!(player.restore_mana(30), 10);
        assert_eq!(player.mp, 50);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut player = Player::default();
        player.take_damage(250);
        assert_eq!(player.hp, 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_equipment_bonuses() {
        let mut player = Player::default();
        let sword = item("sword", ItemCategory::Weapon).with_effect(EffectKind::Attack, 5);
        let armor = item("armor", ItemCategory::Armor)
            .with_effect(EffectKind::Defense, 12)
            .with_effect(EffectKind::MagicPower, 2);

        assert_eq!(player.equipment.equip(sword), Ok(None));
        assert_eq!(player.equipment.equip(armor), Ok(None));
        assert_eq!(player.effective_attack(), 15);
        assert_eq!(player.effective_defense(), 17);
        assert_eq!(player.effective_magic_power(), 10);

        let potion = item("potion", ItemCategory::Potion);
        assert!(player.equipment.equip(potion).is_err());
    }

    #[test]
    fn test_buffs_expire() {
        let mut player = Player::default();
        player.buffs.push(Buff {
            source: "shield".to_string(),
            effect: ItemEffect::new(EffectKind::Defense, 10),
            remaining_turns: Some(2),
        });
        assert_eq!(player.effective_defense(), 15);

        assert!(player.tick_buffs().is_empty());
        assert_eq!(player.effective_defense(), 15);

        let expired = player.tick_buffs();
        assert_eq!(expired.len(), 1);
        assert_eq!(player.effective_defense(), 5);
    }

    #[test]
    fn test_monster_scaling() {
        let mut rng = StdRng::seed_from_u64(1);
        let slime = Monster::spawn(MonsterKind::Slime, Position::new(0, 0), 1, &mut rng);
        assert_eq!((slime.hp, slime.attack, slime.defense), (20, 5, 2));
        assert_eq!((slime.exp, slime.gold), (10, 5));

        let deep = Monster::spawn(MonsterKind::Goblin, Position::new(0, 0), 4, &mut rng);
        assert_eq!(deep.max_hp, 45);
        assert_eq!(deep.attack, 14);
        assert_eq!(deep.defense, 6);
        assert_eq!(deep.exp, 30);
        assert_eq!(deep.gold, 19);
    }

    #[test]
    fn test_dragons_only_deep() {
        assert!(!MonsterKind::available_at(1).contains(&MonsterKind::Dragon));
        assert!(!MonsterKind::available_at(7).contains(&MonsterKind::Dragon));
        assert!(MonsterKind::available_at(8).contains(&MonsterKind::Dragon));

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let monster = Monster::spawn_random(Position::new(0, 0), 2, &mut rng);
            assert_ne!(monster.kind, MonsterKind::Dragon);
        }
    }
}
