//! # Combat
//!
//! Damage formulas and character progression.
//!
//! Melee rolls come from the session RNG; monster contact attacks and spell
//! damage are deterministic.

use crate::game::Player;
use rand::rngs::StdRng;
use rand::Rng;

/// Damage the player deals when walking into a monster.
///
/// `attack - defense + [0, 5)`, at least 1.
pub fn player_melee_damage(attack: i32, defense: i32, rng: &mut StdRng) -> i32 {
    let roll = rng.gen_range(0..5);
    (attack - defense + roll).max(1)
}

/// Damage a surviving monster deals back to the player.
///
/// `attack - defense + [0, 3)`, at least 1.
pub fn monster_retaliation_damage(attack: i32, defense: i32, rng: &mut StdRng) -> i32 {
    let roll = rng.gen_range(0..3);
    (attack - defense + roll).max(1)
}

/// Damage a monster deals when it steps into the player during its own turn.
pub fn monster_contact_damage(attack: i32, defense: i32) -> i32 {
    (attack - defense).max(1)
}

/// Spell damage against one target: always at least 1.
///
/// # Examples
///
/// ```
/// use runehack::spell_damage;
///
/// assert_eq!(spell_damage(28, 5), 23);
/// assert_eq!(spell_damage(3, 40), 1);
/// ```
pub fn spell_damage(power: i32, defense: i32) -> i32 {
    (power - defense).max(1)
}

/// Stat gains granted by one level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGains {
    pub new_level: u32,
    pub max_hp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub magic_power: i32,
}

/// Raises the player by one level if enough experience has accumulated.
///
/// Only one level is gained per call; leftover experience carries over and a
/// later call may level again.
///
/// # Examples
///
/// ```
/// use runehack::{try_level_up, Player};
///
/// let mut player = Player::default();
/// player.exp = 130;
/// let gains = try_level_up(&mut player).unwrap();
/// assert_eq!(gains.new_level, 2);
/// assert_eq!(player.exp, 30);
/// assert_eq!(player.exp_to_next, 200);
/// assert!(try_level_up(&mut player).is_none());
/// ```
pub fn try_level_up(player: &mut Player) -> Option<LevelGains> {
    if player.exp < player.exp_to_next {
        return None;
    }

    player.level += 1;
    player.exp -= player.exp_to_next;
    player.exp_to_next = player.level * 100;

    let gains = LevelGains {
        new_level: player.level,
        max_hp: 20,
        max_mp: 10,
        attack: 2,
        defense: 1,
        magic_power: 3,
    };

    player.max_hp += gains.max_hp;
    player.hp += gains.max_hp;
    player.max_mp += gains.max_mp;
    player.mp += gains.max_mp;
    player.attack += gains.attack;
    player.defense += gains.defense;
    player.magic_power += gains.magic_power;

    Some(gains)
}
