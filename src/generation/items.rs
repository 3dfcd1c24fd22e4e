//! # Item Generation
//!
//! Floor loot and the reward-only items handed out by quests.

use crate::game::{EffectKind, Item, ItemCategory, Rarity};
use crate::{GenerationConfig, Generator, RunehackError, RunehackResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Rolls floor loot and builds item templates that are not crafting outputs.
#[derive(Debug, Clone)]
pub struct ItemGenerator {
    floor_loot: Vec<Item>,
    rewards: Vec<Item>,
}

impl ItemGenerator {
    /// Creates the generator with its built-in loot tables.
    pub fn new() -> Self {
        Self {
            floor_loot: vec![
                Item::template("sword", "Sword", ItemCategory::Weapon, '/', "#cccccc", 50)
                    .with_effect(EffectKind::Attack, 5),
                Item::template("dagger", "Dagger", ItemCategory::Weapon, '-', "#cccccc", 30)
                    .with_effect(EffectKind::Attack, 3),
                Item::template("leather_armor", "Leather Armor", ItemCategory::Armor, '[', "#8b4513", 40)
                    .with_effect(EffectKind::Defense, 3),
                Item::template("healing_potion", "Healing Potion", ItemCategory::Potion, '!', "#ff0000", 20)
                    .with_effect(EffectKind::Heal, 30),
                Item::template("mana_vial", "Mana Vial", ItemCategory::Potion, '!', "#0000ff", 25)
                    .with_effect(EffectKind::Mana, 20),
            ],
            rewards: vec![
                Item::template("steel_sword", "Steel Sword", ItemCategory::Weapon, '†', "#B0C4DE", 200)
                    .with_effect(EffectKind::Attack, 20)
                    .with_rarity(Rarity::Uncommon)
                    .with_description("A well balanced blade of tempered steel"),
                Item::template("orc_slayer_sword", "Orc Slayer", ItemCategory::Weapon, '†', "#FF8800", 600)
                    .with_effect(EffectKind::Attack, 35)
                    .with_rarity(Rarity::Rare)
                    .with_description("Notched from a hundred orc skulls"),
                Item::template("dragon_scale_armor", "Dragon Scale Armor", ItemCategory::Armor, '◘', "#8B0000", 1200)
                    .with_effect(EffectKind::Defense, 45)
                    .with_effect(EffectKind::MagicPower, 10)
                    .with_rarity(Rarity::Legendary)
                    .with_description("Still warm to the touch"),
            ],
        }
    }

    /// Templates that can appear on the floor.
    pub fn floor_loot(&self) -> &[Item] {
        &self.floor_loot
    }

    /// Looks up a floor or reward template by id.
    pub fn template(&self, template_id: &str) -> Option<&Item> {
        self.floor_loot
            .iter()
            .chain(self.rewards.iter())
            .find(|item| item.template_id == template_id)
    }

    /// Rolls one floor item with a fresh instance id.
    pub fn random_floor_item(&self, rng: &mut StdRng) -> Option<Item> {
        self.floor_loot
            .choose(rng)
            .map(|template| template.instantiate(rng))
    }
}

impl Default for ItemGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<Item> for ItemGenerator {
    fn generate(&self, _config: &GenerationConfig, rng: &mut StdRng) -> RunehackResult<Item> {
        self.random_floor_item(rng)
            .ok_or_else(|| RunehackError::GenerationFailed("Loot table is empty".to_string()))
    }

    fn validate(&self, content: &Item, _config: &GenerationConfig) -> RunehackResult<()> {
        if self.template(&content.template_id).is_none() {
            return Err(RunehackError::GenerationFailed(format!(
                "Unknown item template {}",
                content.template_id
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "ItemGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_floor_loot_table() {
        let generator = ItemGenerator::new();
        assert_eq!(generator.floor_loot().len(), 5);
        let sword = generator.template("sword").unwrap();
        assert_eq!(sword.effect_total(EffectKind::Attack), 5);
        assert_eq!(sword.value, 50);
        let potion = generator.template("healing_potion").unwrap();
        assert_eq!(potion.effect_total(EffectKind::Heal), 30);
    }

    #[test]
    fn test_reward_items_are_not_floor_loot() {
        let generator = ItemGenerator::new();
        for id in ["steel_sword", "orc_slayer_sword", "dragon_scale_armor"] {
            assert!(generator.template(id).is_some());
            assert!(generator.floor_loot().iter().all(|item| item.template_id != id));
        }
        assert!(generator.template("excalibur").is_none());
    }

    #[test]
    fn test_generated_items_validate() {
        let generator = ItemGenerator::new();
        let config = GenerationConfig::default();
        let mut rng = StdRng::seed_from_u64(8);

        let first = generator.generate(&config, &mut rng).unwrap();
        let second = generator.generate(&config, &mut rng).unwrap();
        assert!(generator.validate(&first, &config).is_ok());
        assert_ne!(first.id, second.id);
    }
}
