//! Fixed timestep session tick
//!
//! Advances a [`RunSession`] by one discrete step. Elapsed time only feeds
//! accumulators (fire cadence, spike aura, boss attacks); nothing suspends.

use serde::{Deserialize, Serialize};

use super::boss::BossPhase;
use super::level::{Gate, GateSide};
use super::loot::{LootItem, Rarity};
use super::progression::shot_damage;
use super::rewards::{group_reward_at, roll_boss_loot};
use super::state::{RunPhase, RunSession};
use crate::consts::MAX_TICK_DT;
use crate::round_to_int;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Gate the army walks through (only read while choosing gates)
    pub gate: Option<GateSide>,
    /// Army touched the boss
    pub boss_contact: bool,
    /// Current distance between army and boss, if known
    pub boss_distance: Option<f64>,
}

/// Something that happened during a tick, for UI/audio/backend collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    GateCrossed { segment: usize, gate: Gate, power: i32 },
    GroupDefeated { segment: usize, seed: i32, power_reward: i32 },
    GoldAwarded { amount: i64, total: i64 },
    CoinSpawned { segment: usize },
    BossEngaged,
    BossAttacked { soldiers_lost: i32, power: i32 },
    BossDefeated { level_index: i32 },
    LootAwarded { item_id: String, rarity: Rarity },
    LevelComplete { level_index: i32 },
    ArmyWiped { level_index: i32 },
}

/// Advance the session by one fixed timestep.
///
/// `dt` is clamped to `[0, MAX_TICK_DT]`; non-finite values count as zero.
pub fn tick(session: &mut RunSession, input: &TickInput, dt: f64) {
    match session.phase {
        RunPhase::LevelComplete | RunPhase::Defeated => return,
        _ => {}
    }
    session.time_ticks += 1;
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_TICK_DT) } else { 0.0 };

    match session.phase {
        RunPhase::Gates { segment } => tick_gates(session, input, segment),
        RunPhase::Fighting { segment } => tick_fighting(session, dt, segment),
        RunPhase::Boss => tick_boss(session, input, dt),
        RunPhase::LevelComplete | RunPhase::Defeated => {}
    }
}

fn tick_gates(session: &mut RunSession, input: &TickInput, segment: usize) {
    let Some(side) = input.gate else {
        return;
    };
    let Some(gate) = session.level.segments.get(segment).map(|s| s.gate(side)) else {
        // No segments left to cross
        enter_boss(session);
        return;
    };

    let power = session.state.apply_gate(gate, &session.tuning);
    log::debug!("Segment {}: crossed {} -> power {}", segment, gate.label(), power);
    session.events.push(SimEvent::GateCrossed {
        segment,
        gate,
        power,
    });

    session.spawn_group(segment);
    session.phase = RunPhase::Fighting { segment };
}

fn tick_fighting(session: &mut RunSession, dt: f64, segment: usize) {
    let damage = outgoing_damage(session, dt);
    let Some(group) = session.group.as_mut() else {
        return;
    };
    group.apply_damage(damage);
    if !group.claim_rewards() {
        return;
    }

    let enemy_count = group.enemy_count;
    let position = group.position;
    let reward = group_reward_at(
        session.state.base_seed,
        session.state.level_index,
        position,
        enemy_count,
        &session.tuning,
    );

    session.state.add_power(reward.power, &session.tuning);
    session.events.push(SimEvent::GroupDefeated {
        segment,
        seed: reward.seed,
        power_reward: reward.power,
    });
    if reward.gold > 0 {
        award_gold(session, reward.gold);
    }
    if reward.coin {
        session.state.coins += 1;
        session.events.push(SimEvent::CoinSpawned { segment });
    }

    session.group = None;
    if segment + 1 < session.level.segments.len() {
        session.phase = RunPhase::Gates {
            segment: segment + 1,
        };
    } else {
        enter_boss(session);
    }
}

fn enter_boss(session: &mut RunSession) {
    session.group = None;
    session.fire_timer = 0.0;
    session.phase = RunPhase::Boss;
}

fn tick_boss(session: &mut RunSession, input: &TickInput, dt: f64) {
    let engage_distance = session.tuning.boss_engage_distance;
    let engaged = if input.boss_contact {
        session.boss.engage()
    } else if let Some(distance) = input.boss_distance {
        session.boss.check_proximity(distance, engage_distance)
    } else {
        false
    };
    if engaged {
        session.fire_timer = 0.0;
        session.events.push(SimEvent::BossEngaged);
    }
    if session.boss.phase != BossPhase::Engaged {
        return;
    }

    let damage = outgoing_damage(session, dt);
    session.boss.apply_damage(damage);
    if session.boss.is_defeated() {
        finish_boss(session);
        return;
    }

    let attack = session.boss.tick(dt);
    if attack.attacks == 0 {
        return;
    }
    let raw = session.state.add_power(-attack.soldiers_lost, &session.tuning);
    session.events.push(SimEvent::BossAttacked {
        soldiers_lost: attack.soldiers_lost,
        power: session.state.power,
    });
    let (min, _) = session.tuning.power_bounds();
    if raw < i64::from(min) {
        log::info!("Army wiped at level {}", session.state.level_index);
        session.phase = RunPhase::Defeated;
        session.events.push(SimEvent::ArmyWiped {
            level_index: session.state.level_index,
        });
    }
}

fn finish_boss(session: &mut RunSession) {
    if !session.boss.claim_rewards() {
        return;
    }
    let level_index = session.state.level_index;
    session.events.push(SimEvent::BossDefeated { level_index });

    let boss_gold = session.tuning.boss_gold_reward;
    if boss_gold > 0 {
        award_gold(session, boss_gold);
    }

    let drop: Option<LootItem> = roll_boss_loot(
        &session.content.boss,
        session.state.base_seed,
        level_index,
        session.tuning.boss_loot_drop_chance,
    )
    .cloned();
    if let Some(item) = drop {
        log::info!("Boss dropped {} ({})", item.id, item.rarity.as_str());
        session.grant_item(&item);
        session.events.push(SimEvent::LootAwarded {
            item_id: item.id.clone(),
            rarity: item.rarity,
        });
    }

    session.phase = RunPhase::LevelComplete;
    session.events.push(SimEvent::LevelComplete { level_index });
}

/// Whole damage points dealt this tick by shots and the spike aura
fn outgoing_damage(session: &mut RunSession, dt: f64) -> i32 {
    let interval = session.tuning.fire_interval(session.loadout.fire_rate_multiplier);
    session.fire_timer += dt.max(0.0);
    let shots = (session.fire_timer / interval).floor();
    let mut damage = 0i32;
    if shots >= 1.0 {
        session.fire_timer -= shots * interval;
        let per_shot = round_to_int(shot_damage(
            session.state.power,
            &session.tuning,
            session.loadout.damage_multiplier,
        ));
        damage = round_to_int(shots * f64::from(per_shot));
    }
    damage.saturating_add(session.spike.tick(session.loadout.spike_dps, dt))
}

fn award_gold(session: &mut RunSession, base: i64) {
    let amount = round_to_int(base as f64 * session.loadout.gold_multiplier.max(0.0));
    let amount = i64::from(amount.max(0));
    session.state.add_gold(amount);
    session.events.push(SimEvent::GoldAwarded {
        amount,
        total: session.state.gold,
    });
}
