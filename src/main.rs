//! # Runehack Headless Runner
//!
//! Starts a session, lets the autoexplore driver play it for a number of
//! commands, and prints where the run ended up.

use clap::Parser;
use log::{debug, info};
use runehack::{
    Autoexplore, EffectKind, FileStore, GameEngine, GameState, ItemCategory, Phase,
    RunehackResult,
};
use std::path::PathBuf;

/// Command line arguments for the Runehack runner.
#[derive(Parser, Debug)]
#[command(name = "runehack")]
#[command(about = "A turn-based ASCII dungeon crawler engine")]
#[command(version)]
struct Args {
    /// Random seed for the session
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Maximum number of commands to play
    #[arg(short, long, default_value_t = 500)]
    turns: u32,

    /// Directory for the save slot; the run is saved there when it ends
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Continue from the save in --save-dir instead of starting fresh
    #[arg(long, requires = "save_dir")]
    resume: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the final floor as ASCII
    #[arg(long)]
    show_map: bool,
}

fn main() -> RunehackResult<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    info!("Starting Runehack v{}", runehack::VERSION);

    let mut engine = match &args.save_dir {
        Some(dir) => GameEngine::with_store(args.seed, Box::new(FileStore::new(dir))),
        None => GameEngine::new(args.seed),
    };

    let resumed = args.resume && engine.load_game().is_some();
    if !resumed {
        if args.resume {
            info!("No usable save found, starting a new game");
        }
        engine.start_new_game();
    }

    let commands = play(&mut engine, args.turns);

    if args.save_dir.is_some() {
        if engine.game_state().phase == Phase::Dead {
            info!("Player died, not saving");
        } else {
            engine.save_game()?;
        }
    }

    print_summary(&engine.game_state(), commands, args.show_map);
    Ok(())
}

/// Plays until the budget runs out, the player dies or nothing is reachable.
/// Returns the number of commands issued.
fn play(engine: &mut GameEngine, budget: u32) -> u32 {
    let mut explore = Autoexplore::new();
    let mut issued = 0;

    while issued < budget {
        let state = engine.state();
        if state.phase != Phase::Playing {
            break;
        }

        if let Some(potion_id) = healing_potion_when_low(state) {
            engine.use_item(&potion_id);
        } else if state.player.hp * 3 < state.player.max_hp && state.player.mp >= 10 {
            if let Err(e) = engine.cast_heal() {
                debug!("Emergency heal failed: {}", e);
            }
        } else {
            match explore.next_direction(state) {
                Some(direction) => {
                    engine.move_player(direction);
                }
                None => {
                    info!("Nothing left to explore on this floor");
                    break;
                }
            }
        }
        issued += 1;
    }

    issued
}

/// A healing potion worth drinking when below half health.
fn healing_potion_when_low(state: &GameState) -> Option<String> {
    if state.player.hp * 2 >= state.player.max_hp {
        return None;
    }
    state
        .player
        .inventory
        .iter()
        .find(|item| {
            item.category == ItemCategory::Potion && item.effect_total(EffectKind::Heal) > 0
        })
        .map(|item| item.id.clone())
}

fn print_summary(state: &GameState, commands: u32, show_map: bool) {
    let player = &state.player;
    println!("=== Runehack ===");
    println!(
        "Floor {} | Turn {} | Commands {} | {:?}",
        state.dungeon_level, state.turn_count, commands, state.phase
    );
    println!(
        "Level {} ({}/{} exp) | HP {}/{} | MP {}/{} | Gold {}",
        player.level,
        player.exp,
        player.exp_to_next,
        player.hp,
        player.max_hp,
        player.mp,
        player.max_mp,
        player.gold
    );
    println!(
        "Inventory {} items | Crafting level {} | Spells: {}",
        player.inventory.len(),
        player.crafting_level,
        player
            .known_spells
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("--- Messages ---");
    for message in state.messages.iter() {
        println!("{}", message);
    }

    if show_map {
        println!("--- Floor {} ---", state.dungeon_level);
        println!("{}", state.render_ascii());
    }
}
