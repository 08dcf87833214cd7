//! Boss encounter state machine
//!
//! `Idle -> Engaged` on proximity or contact, `Engaged -> Defeated` when HP
//! reaches zero. Attacks only happen while engaged, on an interval tracked by
//! a time accumulator. Boss damage is converted into lost soldiers through a
//! fractional accumulator.

use serde::{Deserialize, Serialize};

use super::level::BossSpec;
use super::progression::{DamageAccumulator, DifficultyCurve};
use crate::config::Tuning;
use crate::round_to_int;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    Idle,
    Engaged,
    Defeated,
}

/// Outcome of one encounter tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BossTick {
    pub attacks: u32,
    pub soldiers_lost: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossEncounter {
    pub spec: BossSpec,
    pub phase: BossPhase,
    pub hp: i32,
    pub max_hp: i32,
    attack_interval: f64,
    attack_timer: f64,
    /// Damage of one attack after the level's difficulty curve
    attack_damage: f64,
    damage_per_soldier: f64,
    soldier_loss: DamageAccumulator,
    rewards_rolled: bool,
}

impl BossEncounter {
    /// HP is the level's boss HP scaled by the global difficulty multiplier.
    /// Attack damage follows the difficulty curve's damage scale for `level_index`.
    pub fn new(spec: BossSpec, level_index: i32, tuning: &Tuning) -> Self {
        let max_hp = round_to_int(f64::from(spec.hp) * tuning.difficulty_multiplier()).max(1);
        let curve = DifficultyCurve::from_tuning(tuning);
        let attack_damage = f64::from(spec.damage.max(0)) * curve.damage_scale(level_index).max(0.0);
        Self {
            spec,
            phase: BossPhase::Idle,
            hp: max_hp,
            max_hp,
            attack_interval: tuning.boss_attack_interval(),
            attack_timer: 0.0,
            attack_damage,
            damage_per_soldier: tuning.boss_damage_per_soldier(),
            soldier_loss: DamageAccumulator::new(),
            rewards_rolled: false,
        }
    }

    pub fn attack_interval(&self) -> f64 {
        self.attack_interval
    }

    pub fn attack_damage(&self) -> f64 {
        self.attack_damage
    }

    /// Contact: engage if idle. Returns true on the transition.
    pub fn engage(&mut self) -> bool {
        if self.phase != BossPhase::Idle {
            return false;
        }
        self.phase = BossPhase::Engaged;
        self.attack_timer = 0.0;
        log::debug!("Boss {:?} engaged (hp {})", self.spec.pattern, self.hp);
        true
    }

    /// Engage when the army is within `engage_distance`
    pub fn check_proximity(&mut self, distance: f64, engage_distance: f64) -> bool {
        if distance <= engage_distance {
            self.engage()
        } else {
            false
        }
    }

    /// Advance the attack timer; attacks and soldier losses happen only while engaged
    pub fn tick(&mut self, dt: f64) -> BossTick {
        if self.phase != BossPhase::Engaged || !(dt > 0.0 && dt.is_finite()) {
            return BossTick::default();
        }

        self.attack_timer += dt;
        let due = (self.attack_timer / self.attack_interval).floor();
        if due < 1.0 {
            return BossTick::default();
        }
        self.attack_timer -= due * self.attack_interval;
        let attacks = due.min(f64::from(u32::MAX)) as u32;

        let soldiers_lost = self
            .soldier_loss
            .add(due * self.attack_damage / self.damage_per_soldier);

        BossTick {
            attacks,
            soldiers_lost,
        }
    }

    /// Apply damage. Returns true when this hit defeated the boss.
    ///
    /// Damage to an idle boss engages it first.
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.phase == BossPhase::Defeated || amount <= 0 {
            return false;
        }
        self.engage();
        self.hp = self.hp.saturating_sub(amount);
        if self.hp <= 0 {
            self.hp = 0;
            self.phase = BossPhase::Defeated;
            log::info!("Boss {:?} defeated", self.spec.pattern);
            return true;
        }
        false
    }

    /// Returns true exactly once, after the boss is defeated
    pub fn claim_rewards(&mut self) -> bool {
        if self.phase != BossPhase::Defeated || self.rewards_rolled {
            return false;
        }
        self.rewards_rolled = true;
        true
    }

    pub fn is_defeated(&self) -> bool {
        self.phase == BossPhase::Defeated
    }

    /// Remaining HP fraction (0-1)
    pub fn hp_fraction(&self) -> f64 {
        f64::from(self.hp) / f64::from(self.max_hp)
    }
}
