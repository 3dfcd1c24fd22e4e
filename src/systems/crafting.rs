//! # Crafting System
//!
//! Material and recipe catalogs, feasibility checks, crafting and the
//! material drops monsters leave behind.

use crate::config;
use crate::game::{count_template, EffectKind, Item, ItemCategory, Player, Rarity};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Chance that a slain monster drops a crafting material.
pub const MATERIAL_DROP_CHANCE: f64 = 0.3;

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    /// Template of the crafted item
    pub result: Item,
    /// Material template ids; repeated ids mean more than one is needed
    pub materials: Vec<String>,
    pub required_level: u32,
    pub category: ItemCategory,
}

impl Recipe {
    /// Required quantity per material id.
    pub fn material_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for material in &self.materials {
            *counts.entry(material.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// One reason a recipe cannot be crafted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shortfall {
    /// Crafting level below the recipe's requirement
    LevelInsufficient { required: u32, current: u32 },
    /// Not enough of a material
    Material { id: String, name: String, deficit: usize },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::LevelInsufficient { required, current } => {
                write!(f, "crafting level {} required (have {})", required, current)
            }
            Shortfall::Material { name, deficit, .. } => write!(f, "{} x{} missing", name, deficit),
        }
    }
}

/// Feasibility of a recipe for a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftCheck {
    pub can_craft: bool,
    pub missing: Vec<Shortfall>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CraftError {
    #[error("Unknown recipe: {0}")]
    UnknownRecipe(String),

    #[error("Cannot craft: {}", join_shortfalls(.0))]
    Infeasible(Vec<Shortfall>),
}

fn join_shortfalls(missing: &[Shortfall]) -> String {
    missing
        .iter()
        .map(|shortfall| shortfall.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A finished craft.
#[derive(Debug, Clone)]
pub struct CraftOutcome {
    pub item: Item,
    pub message: String,
    /// Player experience granted
    pub exp_gained: u32,
    /// Whether the crafting level went up
    pub leveled_up: bool,
}

/// Catalog of materials and recipes.
#[derive(Debug, Clone)]
pub struct CraftingSystem {
    materials: BTreeMap<String, Item>,
    recipes: BTreeMap<String, Recipe>,
}

impl CraftingSystem {
    pub fn new() -> Self {
        let materials = [
            material("iron_ore", "Iron Ore", '◆', "#708090", 10, Rarity::Common, "Basic weapon material"),
            material("mithril_ore", "Mithril Ore", '◆', "#C0C0C0", 50, Rarity::Rare, "Light and strong metal"),
            material("dragon_scale", "Dragon Scale", '◇', "#8B0000", 100, Rarity::Epic, "Prized armor material"),
            material("magic_crystal", "Magic Crystal", '♦', "#9400D3", 30, Rarity::Uncommon, "Focus for enchanted gear"),
            material("healing_herb", "Healing Herb", '♠', "#228B22", 5, Rarity::Common, "Base for potions"),
            material("phoenix_feather", "Phoenix Feather", '♧', "#FFD700", 200, Rarity::Legendary, "Smoulders forever"),
            gem("ruby", "Ruby", "#DC143C", 80, Rarity::Rare, "Sharpens a blade"),
            gem("sapphire", "Sapphire", "#4169E1", 80, Rarity::Rare, "Channels magic"),
            gem("emerald", "Emerald", "#50C878", 80, Rarity::Rare, "Hardens armor"),
            gem("diamond", "Diamond", "#B9F2FF", 150, Rarity::Epic, "Flawless and priceless"),
        ];

        let recipes = [
            recipe(
                "iron_sword",
                Item::template("iron_sword", "Iron Sword", ItemCategory::Weapon, '†', "#708090", 100)
                    .with_effect(EffectKind::Attack, 15)
                    .with_rarity(Rarity::Common),
                &["iron_ore", "iron_ore", "iron_ore"],
                1,
            ),
            recipe(
                "mithril_sword",
                Item::template("mithril_sword", "Mithril Sword", ItemCategory::Weapon, '†', "#C0C0C0", 500)
                    .with_effect(EffectKind::Attack, 30)
                    .with_rarity(Rarity::Rare),
                &["mithril_ore", "mithril_ore", "magic_crystal"],
                5,
            ),
            recipe(
                "ruby_sword",
                Item::template("ruby_sword", "Ruby Sword", ItemCategory::Weapon, '†', "#DC143C", 800)
                    .with_effect(EffectKind::Attack, 40)
                    .with_effect(EffectKind::MagicPower, 10)
                    .with_rarity(Rarity::Epic),
                &["mithril_ore", "mithril_ore", "ruby", "magic_crystal"],
                8,
            ),
            recipe(
                "iron_armor",
                Item::template("iron_armor", "Iron Armor", ItemCategory::Armor, '◘', "#708090", 150)
                    .with_effect(EffectKind::Defense, 12)
                    .with_rarity(Rarity::Common),
                &["iron_ore", "iron_ore", "iron_ore", "iron_ore"],
                2,
            ),
            recipe(
                "dragon_armor",
                Item::template("dragon_armor", "Dragon Armor", ItemCategory::Armor, '◘', "#8B0000", 1000)
                    .with_effect(EffectKind::Defense, 50)
                    .with_effect(EffectKind::MagicPower, 20)
                    .with_rarity(Rarity::Legendary),
                &["dragon_scale", "dragon_scale", "mithril_ore", "diamond"],
                10,
            ),
            recipe(
                "health_potion",
                Item::template("health_potion", "Health Potion", ItemCategory::Potion, '!', "#FF69B4", 50)
                    .with_effect(EffectKind::Heal, 50)
                    .with_rarity(Rarity::Common),
                &["healing_herb", "healing_herb"],
                1,
            ),
            recipe(
                "mana_potion",
                Item::template("mana_potion", "Mana Potion", ItemCategory::Potion, '!', "#4169E1", 60)
                    .with_effect(EffectKind::Mana, 30)
                    .with_rarity(Rarity::Common),
                &["magic_crystal", "healing_herb"],
                2,
            ),
            recipe(
                "phoenix_elixir",
                Item::template("phoenix_elixir", "Phoenix Elixir", ItemCategory::Potion, '!', "#FFD700", 1000)
                    .with_effect(EffectKind::Heal, 999)
                    .with_effect(EffectKind::Mana, 999)
                    .with_rarity(Rarity::Legendary),
                &["phoenix_feather", "healing_herb", "magic_crystal", "diamond"],
                10,
            ),
            recipe(
                "magic_staff",
                Item::template("magic_staff", "Magic Staff", ItemCategory::Weapon, '♪', "#9400D3", 300)
                    .with_effect(EffectKind::Attack, 8)
                    .with_effect(EffectKind::MagicPower, 25)
                    .with_rarity(Rarity::Uncommon),
                &["magic_crystal", "magic_crystal", "sapphire"],
                4,
            ),
        ];

        Self {
            materials: materials
                .into_iter()
                .map(|item| (item.template_id.clone(), item))
                .collect(),
            recipes: recipes
                .into_iter()
                .map(|recipe| (recipe.id.clone(), recipe))
                .collect(),
        }
    }

    pub fn get_material(&self, id: &str) -> Option<&Item> {
        self.materials.get(id)
    }

    pub fn get_recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.get(id)
    }

    /// Recipes unlocked at a crafting level.
    pub fn available_recipes(&self, crafting_level: u32) -> Vec<&Recipe> {
        self.recipes
            .values()
            .filter(|recipe| recipe.required_level <= crafting_level)
            .collect()
    }

    pub fn recipes_by_category(&self, category: ItemCategory, crafting_level: u32) -> Vec<&Recipe> {
        self.available_recipes(crafting_level)
            .into_iter()
            .filter(|recipe| recipe.category == category)
            .collect()
    }

    /// Looks up a template among materials and recipe results.
    pub fn template(&self, template_id: &str) -> Option<&Item> {
        self.materials.get(template_id).or_else(|| {
            self.recipes
                .values()
                .map(|recipe| &recipe.result)
                .find(|item| item.template_id == template_id)
        })
    }

    /// Checks whether the player can craft a recipe.
    ///
    /// A missing crafting level is reported on its own; otherwise every
    /// material the inventory is short of is listed with its deficit.
    pub fn can_craft(&self, recipe_id: &str, player: &Player) -> Result<CraftCheck, CraftError> {
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| CraftError::UnknownRecipe(recipe_id.to_string()))?;

        if player.crafting_level < recipe.required_level {
            return Ok(CraftCheck {
                can_craft: false,
                missing: vec![Shortfall::LevelInsufficient {
                    required: recipe.required_level,
                    current: player.crafting_level,
                }],
            });
        }

        let missing: Vec<Shortfall> = recipe
            .material_counts()
            .into_iter()
            .filter_map(|(id, needed)| {
                let available = Self::material_count(player, id);
                (available < needed).then(|| Shortfall::Material {
                    id: id.to_string(),
                    name: self
                        .materials
                        .get(id)
                        .map_or_else(|| id.to_string(), |item| item.name.clone()),
                    deficit: needed - available,
                })
            })
            .collect();

        Ok(CraftCheck {
            can_craft: missing.is_empty(),
            missing,
        })
    }

    fn material_count(player: &Player, template_id: &str) -> usize {
        player
            .inventory
            .iter()
            .filter(|item| item.category.is_crafting_input() && item.template_id == template_id)
            .count()
    }

    /// Crafts a recipe into the player's inventory.
    ///
    /// Consumes the materials from the back of the inventory, adds a fresh
    /// instance of the result and grants `required_level * 10` experience.
    /// The crafting level rises by one when experience reaches
    /// `crafting_level * 100`, up to the cap.
    pub fn craft(&self, recipe_id: &str, player: &mut Player, rng: &mut StdRng) -> Result<CraftOutcome, CraftError> {
        let check = self.can_craft(recipe_id, player)?;
        if !check.can_craft {
            return Err(CraftError::Infeasible(check.missing));
        }
        let recipe = self
            .recipes
            .get(recipe_id)
            .ok_or_else(|| CraftError::UnknownRecipe(recipe_id.to_string()))?;

        for (id, needed) in recipe.material_counts() {
            let mut remaining = needed;
            let mut index = player.inventory.len();
            while index > 0 && remaining > 0 {
                index -= 1;
                let item = &player.inventory[index];
                if item.category.is_crafting_input() && item.template_id == id {
                    player.inventory.remove(index);
                    remaining -= 1;
                }
            }
        }

        let item = recipe.result.instantiate(rng);
        player.inventory.push(item.clone());

        let exp_gained = recipe.required_level * 10;
        player.exp += exp_gained;
        let leveled_up = player.exp >= player.crafting_level * 100
            && player.crafting_level < config::MAX_CRAFTING_LEVEL;
        if leveled_up {
            player.crafting_level += 1;
        }

        Ok(CraftOutcome {
            message: format!("Crafted {}!", item.name),
            item,
            exp_gained,
            leveled_up,
        })
    }

    /// Rolls the material drop of a slain monster.
    ///
    /// Drops 30% of the time, chosen uniformly among materials whose rarity
    /// the monster's level allows.
    pub fn material_drop(&self, monster_level: u32, rng: &mut StdRng) -> Option<Item> {
        if !rng.gen_bool(MATERIAL_DROP_CHANCE) {
            return None;
        }

        let eligible: Vec<&Item> = self
            .materials
            .values()
            .filter(|item| {
                item.rarity
                    .map_or(true, |rarity| monster_level >= rarity.min_monster_level())
            })
            .collect();

        eligible.choose(rng).map(|template| template.instantiate(rng))
    }

    /// How many of a material template the player carries.
    pub fn owned(&self, player: &Player, template_id: &str) -> usize {
        count_template(&player.inventory, template_id)
    }
}

impl Default for CraftingSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn material(id: &str, name: &str, glyph: char, color: &str, value: u32, rarity: Rarity, description: &str) -> Item {
    Item::template(id, name, ItemCategory::Material, glyph, color, value)
        .with_rarity(rarity)
        .with_description(description)
}

fn gem(id: &str, name: &str, color: &str, value: u32, rarity: Rarity, description: &str) -> Item {
    Item::template(id, name, ItemCategory::Gem, '●', color, value)
        .with_rarity(rarity)
        .with_description(description)
}

fn recipe(id: &str, result: Item, materials: &[&str], required_level: u32) -> Recipe {
    Recipe {
        id: id.to_string(),
        category: result.category,
        result,
        materials: materials.iter().map(|m| m.to_string()).collect(),
        required_level,
    }
}
