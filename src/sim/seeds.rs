//! Sub-seed derivation
//!
//! Every derivation is a pure function of logged integers: XOR with fixed
//! constants and wrapping 32-bit multiplication by odd primes. All sub-seeds
//! are derived directly from the run's raw base seed (no intermediate mixing
//! step), so an auditor can reproduce any roll from the base seed and the
//! contextual integers alone.
//!
//! World positions are `f32`; they are widened to `f64` before the x100
//! quantization, so logged coordinates must be the stored `f32` values.

use glam::Vec3;

use crate::consts::DEFAULT_SEED;
use crate::round_to_int;

/// Multiplier applied to the level index
pub const LEVEL_PRIME: i32 = 19_349_663;
/// Multiplier applied to the quantized X coordinate
pub const X_PRIME: i32 = 83_492_791;
/// Multiplier applied to the quantized Z coordinate (also the boss-loot level multiplier)
pub const Z_PRIME: i32 = 73_856_093;
/// Multiplier applied to the enemy count of a group
pub const COUNT_PRIME: i32 = 297_121_507;
/// Golden-ratio constant
pub const GOLDEN: i32 = 0x9E37_79B9_u32 as i32;
/// Salt separating shop offers from other streams
pub const SHOP_SALT: i32 = 0x1234_ABCD;

/// Scale applied to world coordinates before rounding
pub const COORD_SCALE: f64 = 100.0;

/// Resolve an optional base seed, falling back to [`DEFAULT_SEED`].
pub fn resolve_base_seed(seed: Option<i32>) -> i32 {
    match seed {
        Some(seed) => seed,
        None => {
            log::warn!("No base seed supplied, using default {}", DEFAULT_SEED);
            DEFAULT_SEED
        }
    }
}

/// Seed of the level-content stream for `level_index`
#[inline]
pub fn level_seed(base_seed: i32, level_index: i32) -> i32 {
    base_seed ^ level_index.wrapping_mul(LEVEL_PRIME)
}

/// Seed of the shop-offer stream
#[inline]
pub fn shop_seed(base_seed: i32, level_index: i32, reroll_count: i32) -> i32 {
    base_seed
        ^ level_index.wrapping_mul(LEVEL_PRIME)
        ^ SHOP_SALT
        ^ reroll_count.wrapping_mul(GOLDEN)
}

/// Seed of the boss-loot stream
#[inline]
pub fn boss_loot_seed(base_seed: i32, level_index: i32) -> i32 {
    base_seed ^ level_index.wrapping_mul(Z_PRIME) ^ GOLDEN
}

/// World coordinate scaled by 100 and rounded half-to-even
#[inline]
pub fn quantize(coord: f64) -> i32 {
    round_to_int(coord * COORD_SCALE)
}

/// Quantized (x, z) of a world position.
///
/// Each `f32` component is widened to `f64` before scaling, so the result is
/// the exact stored value times 100, rounded. A client that multiplies in
/// `f32` can disagree near ties: `0.015f32` quantizes to 1 here, not 2.
#[inline]
pub fn quantize_position(position: Vec3) -> (i32, i32) {
    (quantize(f64::from(position.x)), quantize(f64::from(position.z)))
}

/// Seed of an enemy group's gold/coin stream
#[inline]
pub fn gold_seed(
    run_seed: i32,
    level_index: i32,
    quantized_x: i32,
    quantized_z: i32,
    enemy_count: i32,
) -> i32 {
    run_seed
        ^ level_index.wrapping_mul(LEVEL_PRIME)
        ^ quantized_x.wrapping_mul(X_PRIME)
        ^ quantized_z.wrapping_mul(Z_PRIME)
        ^ enemy_count.wrapping_mul(COUNT_PRIME)
}

/// Gold seed for a group at a world position
pub fn gold_seed_at(run_seed: i32, level_index: i32, position: Vec3, enemy_count: i32) -> i32 {
    let (qx, qz) = quantize_position(position);
    gold_seed(run_seed, level_index, qx, qz, enemy_count)
}
