//! End-to-end command scenarios driven through the public engine API.

use rand::rngs::StdRng;
use rand::SeedableRng;
use runehack::generation::utils;
use runehack::{
    config, Direction, DungeonMap, EffectKind, GameEngine, Item, ItemCategory, Monster,
    MonsterKind, Phase, Position, SpellError, Tile, TileKind,
};

/// A started engine moved onto an empty walled 20x9 hall.
/// The player stands at (3, 3) and the stairs at (17, 6).
fn hall_engine(seed: u64) -> GameEngine {
    let mut engine = GameEngine::new(seed);
    engine.start_new_game();

    let mut map = DungeonMap::new(20, 9);
    for y in 1..8 {
        for x in 1..19 {
            map.set_tile(Position::new(x, y), Tile::floor())
                .expect("hall tile in bounds");
        }
    }
    map.set_tile(Position::new(17, 6), Tile::new(TileKind::Stairs))
        .expect("stairs in bounds");

    let state = engine.state_mut();
    state.dungeon = map;
    state.clear_floor_contents();
    state.player.position = Position::new(3, 3);
    engine
}

fn place_monster(engine: &mut GameEngine, kind: MonsterKind, pos: Position) {
    let mut rng = StdRng::seed_from_u64(99);
    let monster = Monster::spawn(kind, pos, 1, &mut rng);
    engine.state_mut().monsters.push(monster);
}

fn trinket(n: usize) -> Item {
    let mut item = Item::template("iron_ore", "Iron Ore", ItemCategory::Material, '*', "#888888", 5);
    item.id = format!("ore-{}", n);
    item
}

#[test]
fn test_new_game_starting_character() {
    let mut engine = GameEngine::new(12345);
    let state = engine.start_new_game();

    assert_eq!(state.phase, Phase::Playing);
    assert_eq!(state.dungeon_level, 1);
    assert_eq!(state.turn_count, 0);
    assert_eq!((state.player.hp, state.player.max_hp), (100, 100));
    assert_eq!((state.player.mp, state.player.max_mp), (50, 50));
    assert_eq!(state.player.level, 1);
    assert!(state.player.inventory.is_empty());
    assert!(state.dungeon.is_passable(state.player.position));
    assert_eq!(state.dungeon.count_kind(TileKind::Stairs), 1);
    assert!(utils::is_fully_connected(&state.dungeon));
    assert!(state
        .monsters
        .iter()
        .all(|monster| monster.position != state.player.position));
}

#[test]
fn test_same_seed_same_session() {
    let mut first = GameEngine::new(777);
    let mut second = GameEngine::new(777);
    assert_eq!(first.start_new_game(), second.start_new_game());

    for direction in [Direction::East, Direction::South, Direction::West, Direction::North] {
        assert_eq!(first.move_player(direction), second.move_player(direction));
    }
}

#[test]
fn test_heal_costs_ten_mana() {
    let mut engine = hall_engine(5);
    {
        let player = &mut engine.state_mut().player;
        player.hp = 50;
        player.mp = 20;
    }

    let state = engine.cast_heal().expect("heal should succeed");
    assert_eq!(state.player.mp, 10);
    assert_eq!(state.player.hp, 65);
    assert!(state.messages.contains("Recovered 15 HP!"));
}

#[test]
fn test_fireball_without_mana_is_rejected() {
    let mut engine = hall_engine(6);
    engine.state_mut().player.mp = 5;
    place_monster(&mut engine, MonsterKind::Goblin, Position::new(5, 3));
    let turns = engine.state().turn_count;

    let result = engine.cast_fireball();
    assert!(matches!(
        result,
        Err(SpellError::InsufficientMana { required: 15, available: 5, .. })
    ));
    let state = engine.state();
    assert_eq!(state.player.mp, 5);
    assert_eq!(state.turn_count, turns);
    assert_eq!(state.monsters.len(), 1);
}

#[test]
fn test_bumping_a_monster_never_moves_the_player() {
    let mut engine = hall_engine(7);
    place_monster(&mut engine, MonsterKind::Orc, Position::new(4, 3));
    engine.state_mut().monsters[0].hp = 1000;

    let state = engine.move_player(Direction::East);
    assert_eq!(state.player.position, Position::new(3, 3));
    assert!(state.monsters[0].hp < 1000);
    assert!(state.messages.contains("You hit the orc"));
}

#[test]
fn test_stairs_lead_to_a_fresh_connected_floor() {
    let mut engine = hall_engine(8);
    engine.state_mut().player.position = Position::new(16, 6);
    place_monster(&mut engine, MonsterKind::Slime, Position::new(2, 7));
    let old_floor = engine.state().dungeon.clone();

    let state = engine.move_player(Direction::East);
    assert_eq!(state.dungeon_level, 2);
    assert_ne!(state.dungeon, old_floor);
    assert_eq!(state.dungeon.width, config::DUNGEON_WIDTH);
    assert!(utils::is_fully_connected(&state.dungeon));
    assert!(state.dungeon.is_passable(state.player.position));
    assert!(state.messages.contains("You descend to floor 2."));
}

#[test]
fn test_full_inventory_leaves_items_on_the_floor() {
    let mut engine = hall_engine(9);
    {
        let state = engine.state_mut();
        for n in 0..config::INVENTORY_CAPACITY {
            state.player.inventory.push(trinket(n));
        }
        let potion = Item::template("healing_potion", "Healing Potion", ItemCategory::Potion, '!', "#ff0000", 20)
            .with_effect(EffectKind::Heal, 30);
        state
            .place_item(Position::new(4, 3), potion)
            .expect("floor tile is free");
    }

    let state = engine.move_player(Direction::East);
    assert_eq!(state.player.inventory.len(), config::INVENTORY_CAPACITY);
    assert!(state.item_at(Position::new(4, 3)).is_some());
    assert!(state.messages.contains("Your inventory is full."));
}

#[test]
fn test_levels_only_go_up() {
    let mut engine = hall_engine(10);
    let mut last_level = engine.state().player.level;
    let mut last_max_hp = engine.state().player.max_hp;

    for round in 0..4 {
        let exp_to_next = engine.state().player.exp_to_next;
        engine.state_mut().player.exp = exp_to_next.saturating_sub(1);
        place_monster(&mut engine, MonsterKind::Slime, Position::new(4, 3));
        engine.state_mut().monsters[0].hp = 1;
        engine.state_mut().player.position = Position::new(3, 3);

        let state = engine.move_player(Direction::East);
        assert!(state.monsters.is_empty(), "round {} left the slime alive", round);
        assert_eq!(state.player.level, last_level + 1);
        assert!(state.player.max_hp > last_max_hp);
        assert!(state.player.exp < state.player.exp_to_next);

        last_level = state.player.level;
        last_max_hp = state.player.max_hp;
    }
}

#[test]
fn test_inventory_phase_freezes_the_floor() {
    let mut engine = hall_engine(11);
    let state = engine.toggle_inventory();
    assert_eq!(state.phase, Phase::Inventory);

    let moved = engine.move_player(Direction::East);
    assert_eq!(moved.player.position, Position::new(3, 3));
    assert_eq!(engine.cast_heal(), Err(SpellError::NotPlaying));
    assert_eq!(engine.toggle_inventory().phase, Phase::Playing);
}
