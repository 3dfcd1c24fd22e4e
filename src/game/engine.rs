//! # Game Engine
//!
//! The single owner of the [`GameState`]. Every player command enters here,
//! is resolved against the rules, and leaves a snapshot behind.
//!
//! A command resolves in a fixed order: the player's action first, then one
//! turn in which every monster acts in list order. All randomness comes from
//! one seeded generator, so a seed and a command sequence replay exactly.

use crate::config;
use crate::game::{
    monster_contact_damage, monster_retaliation_damage, player_melee_damage, try_level_up,
    Direction, EffectKind, EntityId, GameState, ItemCategory, MonsterKind, Phase, Player,
    Position, TileKind,
};
use crate::generation::{
    DungeonGenerator, EncounterGenerator, GeneratedLevel, GenerationConfig, Generator,
    ItemGenerator, Room,
};
use crate::persistence::{MemoryStore, SaveRecord, SaveStore};
use crate::systems::{
    CraftingSystem, Quest, QuestEvent, QuestSystem, Recipe, Spell, SpellError, SpellSystem,
};
use crate::{RunehackError, RunehackResult};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Drives one game session.
pub struct GameEngine {
    state: GameState,
    rng: StdRng,
    seed: u64,
    generation: GenerationConfig,
    dungeon_generator: DungeonGenerator,
    encounters: EncounterGenerator,
    items: ItemGenerator,
    spells: SpellSystem,
    crafting: CraftingSystem,
    quests: QuestSystem,
    store: Box<dyn SaveStore>,
}

impl GameEngine {
    /// Creates an engine in the menu phase with an in-memory save slot.
    ///
    /// # Examples
    ///
    /// ```
    /// use runehack::{GameEngine, Phase};
    ///
    /// let mut engine = GameEngine::new(7);
    /// assert_eq!(engine.state().phase, Phase::Menu);
    /// let state = engine.start_new_game();
    /// assert_eq!(state.phase, Phase::Playing);
    /// assert_eq!(state.player.hp, 100);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self::with_store(seed, Box::new(MemoryStore::new()))
    }

    /// Creates an engine saving through the given store.
    pub fn with_store(seed: u64, store: Box<dyn SaveStore>) -> Self {
        Self::with_config(GenerationConfig::new(seed), store)
    }

    /// Creates an engine with explicit generation settings. The session seed is `config.seed`.
    pub fn with_config(config: GenerationConfig, store: Box<dyn SaveStore>) -> Self {
        Self {
            state: GameState::menu(),
            rng: StdRng::seed_from_u64(config.seed),
            seed: config.seed,
            generation: config,
            dungeon_generator: DungeonGenerator::new(),
            encounters: EncounterGenerator::new(),
            items: ItemGenerator::new(),
            spells: SpellSystem::new(),
            crafting: CraftingSystem::new(),
            quests: QuestSystem::new(),
            store,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Borrow of the live state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access to the live state for test scenario setup only.
    /// Writes through it skip the engine's rule checks.
    #[doc(hidden)]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Snapshot of the current state.
    pub fn game_state(&self) -> GameState {
        self.state.clone()
    }

    pub fn spells(&self) -> &SpellSystem {
        &self.spells
    }

    pub fn crafting(&self) -> &CraftingSystem {
        &self.crafting
    }

    pub fn quests(&self) -> &QuestSystem {
        &self.quests
    }

    /// Generates a floor, falling back to a single room if generation fails.
    fn generate_floor(&mut self) -> GeneratedLevel {
        match self.dungeon_generator.generate(&self.generation, &mut self.rng) {
            Ok(level) => level,
            Err(e) => {
                error!("Dungeon generation failed, using fallback floor: {}", e);
                DungeonGenerator::fallback_level(&self.generation)
            }
        }
    }

    /// A free starting tile on a freshly generated floor.
    fn starting_position(&mut self, level: &GeneratedLevel) -> Position {
        DungeonGenerator::random_floor_position(&level.map, &mut self.rng)
            .or_else(|| level.main_room().map(Room::center))
            .unwrap_or_default()
    }

    /// Starts a fresh session on floor 1. Allowed from any phase.
    pub fn start_new_game(&mut self) -> GameState {
        let level = self.generate_floor();
        let start = self.starting_position(&level);

        let mut state = GameState::new(level.map, Player::new(start));
        self.quests.reset();
        let report = self.encounters.populate(&mut state, &mut self.rng);
        state.add_message("Welcome to the dungeon! Find the stairs to go deeper.");

        info!(
            "New game (seed {}): {} rooms, {} monsters, {} items",
            self.seed,
            level.rooms.len(),
            report.monsters,
            report.items
        );

        self.state = state;
        self.game_state()
    }

    /// Moves the player one step, attacking, descending or picking up as the
    /// destination demands. Ignored outside the playing phase.
    pub fn move_player(&mut self, direction: Direction) -> GameState {
        if self.state.phase != Phase::Playing {
            return self.game_state();
        }

        let destination = self.state.player.position + direction.to_delta();
        if !self.state.dungeon.is_passable(destination) {
            self.state.add_message("You cannot move there.");
            return self.game_state();
        }

        if let Some(index) = self.state.monster_index_at(destination) {
            self.combat(index);
            return self.game_state();
        }

        let on_stairs = self
            .state
            .dungeon
            .get_tile(destination)
            .map_or(false, |tile| tile.kind == TileKind::Stairs);
        if on_stairs {
            self.descend();
            return self.game_state();
        }

        if self.state.item_positions.contains_key(&destination) {
            self.pick_up(destination);
        }

        self.state.player.position = destination;
        self.process_turn(None);
        self.game_state()
    }

    fn pick_up(&mut self, position: Position) {
        if self.state.player.inventory_full() {
            self.state.add_message("Your inventory is full.");
            return;
        }

        let Some(item) = self.state.take_item_at(position) else {
            return;
        };
        let name = item.name.clone();
        let template_id = item.template_id.clone();
        let is_material = item.category.is_crafting_input();

        if let Err(item) = self.state.player.add_item(item) {
            if let Err(e) = self.state.place_item(position, item) {
                warn!("Lost item {} while returning it to the floor: {}", name, e);
            }
            return;
        }

        self.state.add_message(format!("You pick up the {}.", name));
        if is_material {
            self.advance_quests(QuestEvent::ItemCollected(template_id));
        }
    }

    /// Melee exchange with the monster at `index`. The player always strikes first.
    fn combat(&mut self, index: usize) {
        let attack = self.state.player.effective_attack();
        let monster = &mut self.state.monsters[index];
        let damage = player_melee_damage(attack, monster.defense, &mut self.rng);
        monster.take_damage(damage);
        let name = monster.name.clone();
        let alive = monster.is_alive();
        self.state
            .add_message(format!("You hit the {} for {} damage.", name, damage));

        if !alive {
            let monster = self.state.monsters.remove(index);
            self.state.player.exp += monster.exp;
            self.state.player.gold += monster.gold;
            self.state.add_message(format!(
                "You defeat the {}! +{} exp, +{} gold.",
                name, monster.exp, monster.gold
            ));
            self.advance_quests(QuestEvent::MonsterKilled(monster.kind.name().to_string()));
            self.check_level_up();
            self.roll_material_drop(monster.level, monster.position);
            self.process_turn(None);
            return;
        }

        let defense = self.state.player.effective_defense();
        let (monster_attack, monster_id) = {
            let monster = &self.state.monsters[index];
            (monster.attack, monster.id)
        };
        let damage = monster_retaliation_damage(monster_attack, defense, &mut self.rng);
        self.state.player.take_damage(damage);
        self.state
            .add_message(format!("The {} hits you for {} damage.", name, damage));

        if !self.state.player.is_alive() {
            self.die(&name);
            return;
        }

        self.process_turn(Some(monster_id));
    }

    fn roll_material_drop(&mut self, monster_level: u32, position: Position) {
        let Some(material) = self.crafting.material_drop(monster_level, &mut self.rng) else {
            return;
        };
        let name = material.name.clone();
        let template_id = material.template_id.clone();

        match self.state.player.add_item(material) {
            Ok(()) => {
                self.state.add_message(format!("You obtain {}!", name));
                self.advance_quests(QuestEvent::ItemCollected(template_id));
            }
            Err(material) => match self.state.place_item(position, material) {
                Ok(()) => self
                    .state
                    .add_message(format!("The {} falls to the floor.", name)),
                Err(e) => debug!("Dropped material {} vanished: {}", name, e),
            },
        }
    }

    fn die(&mut self, killer: &str) {
        self.state.phase = Phase::Dead;
        self.state.game_over = true;
        self.state.add_message("You died...");
        info!(
            "Player killed by {} on floor {} at turn {}",
            killer, self.state.dungeon_level, self.state.turn_count
        );
    }

    /// Applies at most one level-up and learns any spells it unlocks.
    fn check_level_up(&mut self) {
        let Some(gains) = try_level_up(&mut self.state.player) else {
            return;
        };
        self.state
            .add_message(format!("Welcome to level {}!", gains.new_level));
        info!("Player reached level {}", gains.new_level);

        for name in self.spells.learn_available(&mut self.state.player) {
            self.state.add_message(format!("You learned {}!", name));
        }
    }

    fn advance_quests(&mut self, event: QuestEvent) {
        for message in self.quests.update_progress(&event, 1) {
            self.state.add_message(message);
        }
    }

    /// One turn: timed effects tick, then every monster acts in order.
    ///
    /// `skip` is a monster that already acted this turn.
    fn process_turn(&mut self, skip: Option<EntityId>) {
        self.state.turn_count += 1;

        for buff in self.state.player.tick_buffs() {
            self.state
                .add_message(format!("The effect of {} wears off.", buff.source));
        }

        for index in 0..self.state.monsters.len() {
            if !self.state.player.is_alive() {
                break;
            }
            if Some(self.state.monsters[index].id) == skip {
                continue;
            }
            self.move_monster(index);
        }
    }

    /// Greedy chase: one step along the longer axis toward a nearby player.
    fn move_monster(&mut self, index: usize) {
        let player_pos = self.state.player.position;
        let monster = &mut self.state.monsters[index];

        if monster.held_turns > 0 {
            monster.held_turns -= 1;
            return;
        }

        let from = monster.position;
        if from.manhattan_distance(player_pos) > config::MONSTER_AGGRO_RADIUS {
            return;
        }

        let delta = player_pos - from;
        let step = if delta.x.abs() > delta.y.abs() {
            Position::new(delta.x.signum(), 0)
        } else {
            Position::new(0, delta.y.signum())
        };
        let destination = from + step;

        if !self.state.dungeon.is_passable(destination) {
            return;
        }

        if destination == player_pos {
            let (attack, name) = (monster.attack, monster.name.clone());
            let damage = monster_contact_damage(attack, self.state.player.effective_defense());
            self.state.player.take_damage(damage);
            self.state
                .add_message(format!("The {} attacks you for {} damage.", name, damage));
            if !self.state.player.is_alive() {
                self.die(&name);
            }
        } else if self.state.monster_index_at(destination).is_none() {
            self.state.monsters[index].position = destination;
        }
    }

    /// Takes the stairs to a newly generated, repopulated floor.
    fn descend(&mut self) {
        self.state.dungeon_level += 1;
        let depth = self.state.dungeon_level;
        self.state
            .add_message(format!("You descend to floor {}.", depth));
        self.advance_quests(QuestEvent::FloorReached(depth));

        let level = self.generate_floor();
        let start = self.starting_position(&level);
        self.state.dungeon = level.map;
        self.state.clear_floor_contents();
        self.state.player.position = start;
        let report = self.encounters.populate(&mut self.state, &mut self.rng);

        let player = &mut self.state.player;
        player.heal(player.max_hp / 10);
        player.restore_mana(player.max_mp / 10);
        self.state.add_message("A new floor awaits.");

        info!(
            "Descended to floor {}: {} monsters, {} items",
            depth, report.monsters, report.items
        );
    }

    /// Casts a known spell at `target`, or at the player when no target is given.
    ///
    /// A rejected cast is logged and returned as an error without spending a
    /// turn. A successful one advances quests, checks for a level-up and runs
    /// a turn.
    pub fn cast_spell(&mut self, spell_id: &str, target: Option<Position>) -> Result<GameState, SpellError> {
        if self.state.phase != Phase::Playing {
            return Err(SpellError::NotPlaying);
        }

        let target = target.unwrap_or(self.state.player.position);
        let outcome = match self.spells.cast(spell_id, &self.state, target) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("Cast of {} rejected: {}", spell_id, e);
                self.state.add_message(e.to_string());
                return Err(e);
            }
        };

        self.state = outcome.state;
        self.advance_quests(QuestEvent::SpellUsed(spell_id.to_string()));
        for kind in outcome.kills {
            self.advance_quests(QuestEvent::MonsterKilled(kind.name().to_string()));
        }
        self.state.add_message(outcome.message);
        self.check_level_up();
        self.process_turn(None);
        Ok(self.game_state())
    }

    pub fn cast_heal(&mut self) -> Result<GameState, SpellError> {
        self.cast_spell("heal", None)
    }

    /// Fireball at the nearest monster in range, or at the player's own tile.
    pub fn cast_fireball(&mut self) -> Result<GameState, SpellError> {
        let range = self.spells.get_spell("fireball").map_or(0, |spell| spell.range);
        let here = self.state.player.position;
        let target = self
            .state
            .monsters
            .iter()
            .map(|monster| monster.position)
            .filter(|pos| pos.manhattan_distance(here) <= range)
            .min_by_key(|pos| pos.manhattan_distance(here));
        self.cast_spell("fireball", target)
    }

    /// Switches between the playing and inventory phases.
    pub fn toggle_inventory(&mut self) -> GameState {
        self.state.phase = match self.state.phase {
            Phase::Playing => Phase::Inventory,
            Phase::Inventory => Phase::Playing,
            other => other,
        };
        self.game_state()
    }

    fn can_manage_inventory(&self) -> bool {
        matches!(self.state.phase, Phase::Playing | Phase::Inventory)
    }

    /// Drinks a potion from the inventory. Other items are left alone.
    pub fn use_item(&mut self, item_id: &str) -> GameState {
        if !self.can_manage_inventory() {
            return self.game_state();
        }

        let Some(item) = self
            .state
            .player
            .inventory
            .iter()
            .find(|item| item.id == item_id)
        else {
            self.state.add_message("You don't have that.");
            return self.game_state();
        };

        if item.category != ItemCategory::Potion {
            let message = format!("You can't use the {}.", item.name);
            self.state.add_message(message);
            return self.game_state();
        }

        let (heal, mana, name) = (
            item.effect_total(EffectKind::Heal),
            item.effect_total(EffectKind::Mana),
            item.name.clone(),
        );
        self.state.player.take_item(item_id);
        let healed = self.state.player.heal(heal);
        let restored = self.state.player.restore_mana(mana);
        self.state.add_message(format!(
            "You drink the {}. (+{} HP, +{} MP)",
            name, healed, restored
        ));
        self.game_state()
    }

    /// Equips a weapon or armor, returning the previous one to the inventory.
    pub fn equip_item(&mut self, item_id: &str) -> GameState {
        if !self.can_manage_inventory() {
            return self.game_state();
        }

        let equippable = self
            .state
            .player
            .inventory
            .iter()
            .find(|item| item.id == item_id)
            .map(|item| (item.category.is_equippable(), item.name.clone()));

        match equippable {
            None => self.state.add_message("You don't have that."),
            Some((false, name)) => self
                .state
                .add_message(format!("You can't equip the {}.", name)),
            Some((true, name)) => {
                if let Some(item) = self.state.player.take_item(item_id) {
                    let player = &mut self.state.player;
                    match player.equipment.equip(item) {
                        Ok(Some(previous)) => player.inventory.push(previous),
                        Ok(None) => {}
                        Err(item) => player.inventory.push(item),
                    }
                    self.state.add_message(format!("You equip the {}.", name));
                }
            }
        }
        self.game_state()
    }

    /// Crafts a recipe from carried materials. Failures are only logged.
    pub fn craft_item(&mut self, recipe_id: &str) -> GameState {
        if !self.can_manage_inventory() {
            return self.game_state();
        }

        match self
            .crafting
            .craft(recipe_id, &mut self.state.player, &mut self.rng)
        {
            Ok(outcome) => {
                self.state.add_message(outcome.message);
                if outcome.leveled_up {
                    let level = self.state.player.crafting_level;
                    self.state
                        .add_message(format!("Crafting level {}!", level));
                }
                self.advance_quests(QuestEvent::ItemCrafted(outcome.item.template_id));
                self.check_level_up();
            }
            Err(e) => {
                debug!("Craft of {} failed: {}", recipe_id, e);
                self.state.add_message(e.to_string());
            }
        }
        self.game_state()
    }

    /// Spells the player knows.
    pub fn known_spells(&self) -> Vec<&Spell> {
        self.spells.known_spells(&self.state.player.known_spells)
    }

    /// Recipes unlocked at the player's crafting level.
    pub fn available_recipes(&self) -> Vec<&Recipe> {
        self.crafting
            .available_recipes(self.state.player.crafting_level)
    }

    pub fn can_craft_item(&self, recipe_id: &str) -> bool {
        self.crafting
            .can_craft(recipe_id, &self.state.player)
            .map_or(false, |check| check.can_craft)
    }

    pub fn available_quests(&self) -> Vec<&Quest> {
        self.quests.available_quests(self.state.player.level)
    }

    pub fn active_quests(&self) -> Vec<&Quest> {
        self.quests.active_quests()
    }

    pub fn completed_quests(&self) -> Vec<&Quest> {
        self.quests.completed_quests()
    }

    pub fn accept_quest(&mut self, quest_id: &str) -> bool {
        if !self.can_manage_inventory() {
            debug!("Quest {} not accepted in phase {:?}", quest_id, self.state.phase);
            self.state.add_message("You cannot take on quests right now.");
            return false;
        }

        match self.quests.accept_quest(quest_id) {
            Ok(()) => {
                let title = self
                    .quests
                    .get_quest(quest_id)
                    .map_or_else(|| quest_id.to_string(), |quest| quest.title.clone());
                self.state
                    .add_message(format!("Quest started: {}", title));
                true
            }
            Err(e) => {
                debug!("Quest {} not accepted: {}", quest_id, e);
                self.state.add_message(e.to_string());
                false
            }
        }
    }

    /// Pays out a completed quest. Item rewards go to the inventory; any that
    /// do not fit are lost.
    pub fn claim_quest_rewards(&mut self, quest_id: &str) -> GameState {
        if !self.can_manage_inventory() {
            debug!("Rewards for {} not claimed in phase {:?}", quest_id, self.state.phase);
            self.state.add_message("You cannot claim rewards right now.");
            return self.game_state();
        }

        match self.quests.give_rewards(quest_id, &mut self.state.player) {
            Ok(grant) => {
                for message in grant.messages {
                    self.state.add_message(message);
                }
                for (template_id, quantity) in grant.items {
                    self.give_reward_item(&template_id, quantity);
                }
                self.check_level_up();
            }
            Err(e) => {
                debug!("Rewards for {} not claimed: {}", quest_id, e);
                self.state.add_message(e.to_string());
            }
        }
        self.game_state()
    }

    fn give_reward_item(&mut self, template_id: &str, quantity: u32) {
        let template = self
            .items
            .template(template_id)
            .or_else(|| self.crafting.template(template_id))
            .cloned();
        let Some(template) = template else {
            warn!("Quest reward references unknown item {}", template_id);
            return;
        };

        for _ in 0..quantity {
            let item = template.instantiate(&mut self.rng);
            match self.state.player.add_item(item) {
                Ok(()) => self
                    .state
                    .add_message(format!("You receive the {}.", template.name)),
                Err(_) => self.state.add_message(format!(
                    "No room for the {}; it is lost.",
                    template.name
                )),
            }
        }
    }

    /// Writes the state and quest progress to the save slot.
    ///
    /// Only a live session is saved; from the menu or after death the slot
    /// is left as it was and an error is returned.
    pub fn save_game(&mut self) -> RunehackResult<()> {
        if !self.can_manage_inventory() {
            self.state.add_message("There is no game in progress to save.");
            return Err(RunehackError::InvalidAction(format!(
                "Cannot save in phase {:?}",
                self.state.phase
            )));
        }

        let record = SaveRecord::new(self.state.clone(), self.quests.quest_data());
        let result = record
            .to_json()
            .and_then(|json| self.store.write(config::SAVE_SLOT, &json));

        match &result {
            Ok(()) => {
                info!("Game saved to {}", self.store.store_type());
                self.state.add_message("Game saved.");
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                self.state.add_message("Could not save the game.");
            }
        }
        result
    }

    /// Restores the saved session. Returns `None`, leaving the live state
    /// untouched, when there is no save or it cannot be read.
    pub fn load_game(&mut self) -> Option<GameState> {
        let json = match self.store.read(config::SAVE_SLOT) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read save slot: {}", e);
                return None;
            }
        };

        let record = match SaveRecord::from_json(&json) {
            Ok(record) => record,
            Err(e) => {
                warn!("Ignoring corrupt save data: {}", e);
                return None;
            }
        };

        self.quests.load_quest_data(&record.quest_data);
        self.state = record.state;
        info!(
            "Game loaded: floor {}, turn {}",
            self.state.dungeon_level, self.state.turn_count
        );
        Some(self.game_state())
    }

    /// Kinds of monster currently alive on the floor, for summaries.
    pub fn monster_census(&self) -> Vec<(MonsterKind, usize)> {
        MonsterKind::all()
            .into_iter()
            .map(|kind| {
                let count = self
                    .state
                    .monsters
                    .iter()
                    .filter(|monster| monster.kind == kind)
                    .count();
                (kind, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}
