//! Army arithmetic, damage formulas and difficulty curves

use serde::{Deserialize, Serialize};

use super::level::Gate;
use crate::config::Tuning;
use crate::round_to_int;

/// Apply a gate to army power, clamped to `[min, max]`
pub fn apply_gate(power: i32, gate: Gate, min: i32, max: i32) -> i32 {
    let raw = match gate {
        Gate::Add(v) => i64::from(power) + i64::from(v),
        Gate::Subtract(v) => i64::from(power) - i64::from(v),
        Gate::Multiply2 => i64::from(power) * 2,
        Gate::Multiply3 => i64::from(power) * 3,
        Gate::MultiplyPercent(v) => {
            i64::from(round_to_int(f64::from(power) * f64::from(v) / 100.0))
        }
    };
    clamp_power(raw, min, max)
}

/// Clamp a wide intermediate power value into `[min, max]`
pub fn clamp_power(raw: i64, min: i32, max: i32) -> i32 {
    raw.clamp(i64::from(min), i64::from(max)) as i32
}

/// Damage of one shot for the given army power.
///
/// `(min(base, cap) + max(1, p)^exponent * power_multiplier * factor) * loot_multiplier`
pub fn shot_damage(power: i32, tuning: &Tuning, loot_damage_multiplier: f64) -> f64 {
    let base = tuning.base_damage.max(0.0).min(tuning.base_damage_cap);
    let scaled = f64::from(power.max(1)).powf(tuning.damage_exponent())
        * tuning.power_multiplier
        * tuning.damage_factor();
    ((base + scaled) * loot_damage_multiplier).max(0.0)
}

/// Level-dependent scaling of enemy HP and damage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyCurve {
    pub curve_exponent: f64,
    pub hp_per_level: f64,
    pub damage_per_level: f64,
    pub global_multiplier: f64,
}

impl DifficultyCurve {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            curve_exponent: tuning.curve_exponent,
            hp_per_level: tuning.hp_per_level,
            damage_per_level: tuning.damage_per_level,
            global_multiplier: tuning.difficulty_multiplier(),
        }
    }

    /// `max(0, level - 1)^curve_exponent`
    pub fn k(&self, level_index: i32) -> f64 {
        f64::from((level_index - 1).max(0)).powf(self.curve_exponent)
    }

    pub fn hp_scale(&self, level_index: i32) -> f64 {
        1.0 + self.hp_per_level * self.k(level_index)
    }

    pub fn damage_scale(&self, level_index: i32) -> f64 {
        1.0 + self.damage_per_level * self.k(level_index)
    }

    /// HP scale including the global difficulty multiplier
    pub fn hp_multiplier(&self, level_index: i32) -> f64 {
        self.hp_scale(level_index) * crate::floored(self.global_multiplier)
    }
}

/// Turns a continuous damage rate into whole damage points without losing
/// the fractional remainder between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageAccumulator {
    pending: f64,
}

impl DamageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate `rate * dt` and return the whole points now due
    pub fn tick(&mut self, rate: f64, dt: f64) -> i32 {
        if rate > 0.0 && dt > 0.0 {
            self.pending += rate * dt;
        }
        self.take_whole()
    }

    /// Add an arbitrary amount and return the whole points now due
    pub fn add(&mut self, amount: f64) -> i32 {
        if amount > 0.0 {
            self.pending += amount;
        }
        self.take_whole()
    }

    /// Fraction carried into the next tick
    pub fn remainder(&self) -> f64 {
        self.pending
    }

    pub fn reset(&mut self) {
        self.pending = 0.0;
    }

    fn take_whole(&mut self) -> i32 {
        let whole = self.pending.floor();
        if whole < 1.0 {
            return 0;
        }
        self.pending -= whole;
        whole.min(f64::from(i32::MAX)) as i32
    }
}
