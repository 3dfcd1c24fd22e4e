//! Property tests for floor generation: connectivity, bounds and stairs.

use proptest::prelude::*;
use runehack::generation::utils;
use runehack::{DungeonGenerator, GenerationConfig, Generator, TileKind};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_every_floor_tile_is_reachable(seed in any::<u64>()) {
        let config = GenerationConfig::new(seed);
        let mut rng = utils::create_rng(&config);
        let level = DungeonGenerator::new().generate(&config, &mut rng).unwrap();

        let passable = level.map.passable_positions();
        prop_assert!(!passable.is_empty());
        let reached = utils::flood_fill(&level.map, passable[0]);
        prop_assert_eq!(reached.len(), passable.len(), "seed {} left islands", seed);
    }

    #[test]
    fn prop_rooms_stay_in_bounds_and_apart(seed in any::<u64>()) {
        let config = GenerationConfig::new(seed);
        let mut rng = utils::create_rng(&config);
        let level = DungeonGenerator::new().generate(&config, &mut rng).unwrap();

        for (i, room) in level.rooms.iter().enumerate() {
            prop_assert!(room.fits_in(config.width, config.height), "room {} out of bounds", room.id);
            for other in &level.rooms[i + 1..] {
                prop_assert!(!room.overlaps_with_margin(other));
            }
        }
    }

    #[test]
    fn prop_single_staircase_on_small_grids(seed in any::<u64>()) {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = utils::create_rng(&config);
        let generator = DungeonGenerator::new();
        let level = generator.generate(&config, &mut rng).unwrap();

        prop_assert_eq!(level.map.count_kind(TileKind::Stairs), 1);
        prop_assert!(generator.validate(&level, &config).is_ok());
        prop_assert_eq!(level.map.width, config.width);
        prop_assert_eq!(level.map.height, config.height);
    }
}

#[test]
fn test_same_seed_same_floor() {
    let config = GenerationConfig::new(2024);
    let generator = DungeonGenerator::new();
    let first = generator
        .generate_map(&config, &mut utils::create_rng(&config))
        .unwrap();
    let second = generator
        .generate_map(&config, &mut utils::create_rng(&config))
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_fallback_floor_is_valid() {
    let config = GenerationConfig::new(1);
    let level = DungeonGenerator::fallback_level(&config);
    assert!(utils::validate_dungeon(&level.map).is_ok());
    assert!(level.main_room().is_some());
}
