//! # Items
//!
//! Item instances, their categories, effects and rarity.
//!
//! Every item carries two identifiers: `id` is unique per instance and is how
//! commands address an item, while `template_id` names the catalog entry it was
//! created from and is what recipes and quest objectives match against.

use crate::game::new_entity_id;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Broad item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Weapon,
    Armor,
    Potion,
    Scroll,
    Misc,
    Material,
    Gem,
}

impl ItemCategory {
    /// Materials and gems are what recipes consume.
    pub fn is_crafting_input(self) -> bool {
        matches!(self, ItemCategory::Material | ItemCategory::Gem)
    }

    /// Weapons and armor can be equipped.
    pub fn is_equippable(self) -> bool {
        matches!(self, ItemCategory::Weapon | ItemCategory::Armor)
    }
}

/// What an item effect modifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Heal,
    Mana,
    Attack,
    Defense,
    Speed,
    Luck,
    MagicPower,
}

/// A single typed effect with its magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub kind: EffectKind,
    pub magnitude: i32,
}

impl ItemEffect {
    pub fn new(kind: EffectKind, magnitude: i32) -> Self {
        Self { kind, magnitude }
    }
}

/// Item rarity, which also gates material drops by monster level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Lowest monster level that can drop a material of this rarity.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::Rarity;
    ///
    /// assert_eq!(Rarity::Common.min_monster_level(), 1);
    /// assert_eq!(Rarity::Legendary.min_monster_level(), 10);
    /// ```
    pub fn min_monster_level(self) -> u32 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 3,
            Rarity::Rare => 5,
            Rarity::Epic => 8,
            Rarity::Legendary => 10,
        }
    }
}

/// An item instance, either lying on the floor or held by the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub template_id: String,
    pub name: String,
    pub category: ItemCategory,
    pub glyph: char,
    pub color: String,
    pub value: u32,
    #[serde(default)]
    pub effects: Vec<ItemEffect>,
    #[serde(default)]
    pub rarity: Option<Rarity>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Item {
    /// Creates a catalog template. Templates use their template id as instance id.
    pub fn template(
        template_id: &str,
        name: &str,
        category: ItemCategory,
        glyph: char,
        color: &str,
        value: u32,
    ) -> Self {
        Self {
            id: template_id.to_string(),
            template_id: template_id.to_string(),
            name: name.to_string(),
            category,
            glyph,
            color: color.to_string(),
            value,
            effects: Vec::new(),
            rarity: None,
            description: None,
        }
    }

    /// Adds an effect (builder style).
    pub fn with_effect(mut self, kind: EffectKind, magnitude: i32) -> Self {
        self.effects.push(ItemEffect::new(kind, magnitude));
        self
    }

    /// Sets the rarity (builder style).
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = Some(rarity);
        self
    }

    /// Sets the description (builder style).
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Clones this template into a new instance with a fresh unique id.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use runehack::{Item, ItemCategory};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let template = Item::template("dagger", "Dagger", ItemCategory::Weapon, '-', "#cccccc", 30);
    /// let a = template.instantiate(&mut rng);
    /// let b = template.instantiate(&mut rng);
    /// assert_ne!(a.id, b.id);
    /// assert_eq!(a.template_id, "dagger");
    /// ```
    pub fn instantiate(&self, rng: &mut StdRng) -> Item {
        let mut item = self.clone();
        item.id = format!("{}_{}", self.template_id, new_entity_id(rng).simple());
        item
    }

    /// Sum of all effects of the given kind.
    pub fn effect_total(&self, kind: EffectKind) -> i32 {
        self.effects
            .iter()
            .filter(|effect| effect.kind == kind)
            .map(|effect| effect.magnitude)
            .sum()
    }
}

/// Counts the items in a slice instantiated from a given template.
pub fn count_template(items: &[Item], template_id: &str) -> usize {
    items
        .iter()
        .filter(|item| item.template_id == template_id)
        .count()
}
