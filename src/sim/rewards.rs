//! Reward rolls tied to deterministic per-entity seeds
//!
//! An enemy group's gold check and coin check share one stream, drawn in
//! that order. Boss loot uses its own stream: one drop check, then at most
//! one loot-table roll.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::loot::{roll_item, LootItem, LootTable};
use super::rng::SimRng;
use super::seeds;
use crate::config::Tuning;

/// Everything granted when an enemy group is wiped out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReward {
    pub seed: i32,
    pub power: i32,
    pub gold: i64,
    pub coin: bool,
}

/// Power granted for a defeated group: `clamp(count * per_enemy, 0, max)`
pub fn power_reward(enemy_count: i32, power_per_enemy: i32, max_power_reward: i32) -> i32 {
    let raw = i64::from(enemy_count) * i64::from(power_per_enemy);
    raw.clamp(0, i64::from(max_power_reward.max(0))) as i32
}

/// Roll the gold and coin checks for a group from its gold seed
pub fn roll_group_reward(seed: i32, enemy_count: i32, tuning: &Tuning) -> GroupReward {
    let power = power_reward(enemy_count, tuning.power_per_enemy, tuning.max_power_reward);

    let mut rng = SimRng::new(seed);
    let gold_hit = rng.chance(tuning.gold_drop_chance);
    let coin = rng.chance(tuning.coin_drop_chance);
    let gold = if gold_hit { tuning.gold_reward.max(0) } else { 0 };

    log::debug!(
        "Group reward seed={} count={}: power={} gold={} coin={}",
        seed,
        enemy_count,
        power,
        gold,
        coin
    );

    GroupReward {
        seed,
        power,
        gold,
        coin,
    }
}

/// Reward for a group defeated at `position` during `level_index`
pub fn group_reward_at(
    run_seed: i32,
    level_index: i32,
    position: Vec3,
    enemy_count: i32,
    tuning: &Tuning,
) -> GroupReward {
    let seed = seeds::gold_seed_at(run_seed, level_index, position, enemy_count);
    roll_group_reward(seed, enemy_count, tuning)
}

/// Roll the boss loot for a level: one drop check, then one table roll
pub fn roll_boss_loot<'a>(
    table: &'a LootTable,
    base_seed: i32,
    level_index: i32,
    drop_chance: f64,
) -> Option<&'a LootItem> {
    let seed = seeds::boss_loot_seed(base_seed, level_index);
    let mut rng = SimRng::new(seed);
    if !rng.chance(drop_chance) {
        log::debug!("Boss loot seed={} level={}: no drop", seed, level_index);
        return None;
    }
    roll_item(table, &mut rng)
}
