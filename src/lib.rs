//! Horde Run - deterministic simulation core for a runner combat game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (PRNG, seeds, level generation, loot, progression, rewards)
//! - `config`: Data-driven game balance
//! - `persistence`: Cross-run progress store and backend sync payloads

pub mod config;
pub mod persistence;
pub mod sim;

pub use config::{ContentError, Tuning};
pub use persistence::{JsonFileStore, MemoryStore, PersistedProgress, ProgressStore};

/// Game configuration constants
pub mod consts {
    /// Seed used when no base seed was supplied
    pub const DEFAULT_SEED: i32 = 12345;

    /// Army power bounds (soldier count)
    pub const MIN_POWER: i32 = 1;
    pub const MAX_POWER: i32 = 500;

    /// Floor applied to every configured multiplier or divisor when read
    pub const MIN_MULTIPLIER: f64 = 0.05;

    /// Segment count bounds per level
    pub const MIN_SEGMENTS: i32 = 4;
    pub const MAX_SEGMENTS: i32 = 9;

    /// Boss base stats at level 1 (before pattern multipliers)
    pub const BOSS_BASE_HP: f64 = 300.0;
    pub const BOSS_BASE_DAMAGE: f64 = 15.0;
    /// Per-level linear growth of boss stats
    pub const BOSS_HP_GROWTH: f64 = 0.08;
    pub const BOSS_DAMAGE_GROWTH: f64 = 0.05;

    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;
    /// Maximum steps of catch-up a single tick integrates
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest `dt` a tick accepts; longer gaps (a resumed app) are dropped
    pub const MAX_TICK_DT: f64 = SIM_DT * MAX_SUBSTEPS as f64;
}

/// Round to the nearest integer, ties to even, saturating at the `i32` range.
///
/// Every float-to-int conversion in the simulation goes through here so that
/// independent implementations agree on half-way cases.
#[inline]
pub fn round_to_int(value: f64) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(i32::MIN as f64, i32::MAX as f64) as i32
}

/// Floor a configured multiplier at [`consts::MIN_MULTIPLIER`].
#[inline]
pub fn floored(value: f64) -> f64 {
    if value.is_nan() {
        return consts::MIN_MULTIPLIER;
    }
    value.max(consts::MIN_MULTIPLIER)
}
