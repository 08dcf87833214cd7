//! Seeded PRNG stream shared with external verifiers
//!
//! The generator is PCG-XSH-RR 64/32 (`rand_pcg::Pcg32`). Outcomes are audited
//! by tools outside this crate, so the full algorithm is pinned here:
//!
//! - multiplier `6364136223846793005`, increment `(STREAM << 1) | 1`
//! - seeding: `state = seed as u32` (zero-extended), `state += increment`,
//!   then one LCG step
//! - output: take the old state, step, emit
//!   `rotr32(((old >> 18) ^ old) >> 27, old >> 59)`
//! - [`SimRng::next_uniform`]: one output divided by 2^32
//! - [`SimRng::next_int`]: rejection sampling below
//!   `threshold = (2^32 - bound) % bound`, then `r % bound`

use rand::RngCore;
use rand_pcg::Pcg32;

/// Stream selector shared by every instance (the LCG increment is derived from it)
pub const STREAM: u64 = 0xda3e_39cb_94b9_5bdb;

const TWO_POW_32: f64 = 4_294_967_296.0;

/// A reproducible stream of uniform draws.
///
/// Two instances built from the same seed yield identical sequences forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRng {
    seed: i32,
    inner: Pcg32,
}

impl SimRng {
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            inner: Pcg32::new(u64::from(seed as u32), STREAM),
        }
    }

    /// The seed this stream was constructed from
    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Raw 32-bit output
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Uniform double in [0, 1)
    #[inline]
    pub fn next_uniform(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform integer in [0, bound). Returns 0 without drawing when `bound <= 0`.
    pub fn next_int(&mut self, bound: i32) -> i32 {
        if bound <= 0 {
            return 0;
        }
        let bound = bound as u32;
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.next_u32();
            if r >= threshold {
                return (r % bound) as i32;
            }
        }
    }

    /// Uniform integer in [min, max). Returns `min` when the range is empty.
    #[inline]
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        min + self.next_int(max.saturating_sub(min))
    }

    /// Bernoulli check: one uniform draw compared against `chance`
    #[inline]
    pub fn chance(&mut self, chance: f64) -> bool {
        self.next_uniform() < chance
    }
}
