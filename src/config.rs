//! Game balance tuning
//!
//! Every numeric constant the simulation reads lives here, with the shipped
//! defaults. Multipliers that end up as divisors or exponents are floored at
//! 0.05 by their accessors; the raw fields keep whatever was configured.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::floored;
use crate::sim::loot::Rarity;

/// Errors raised while reading content or tuning definitions
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed content: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shop price per rarity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityPrices {
    pub common: i64,
    pub uncommon: i64,
    pub rare: i64,
    pub epic: i64,
    pub legendary: i64,
    pub mythic: i64,
}

impl Default for RarityPrices {
    fn default() -> Self {
        Self {
            common: 20,
            uncommon: 45,
            rare: 90,
            epic: 180,
            legendary: 400,
            mythic: 900,
        }
    }
}

impl RarityPrices {
    pub fn price(&self, rarity: Rarity) -> i64 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
            Rarity::Mythic => self.mythic,
        }
    }
}

/// Numeric balance constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Army ===
    pub min_power: i32,
    pub max_power: i32,
    pub starting_power: i32,

    // === Shooting ===
    /// Flat per-shot damage (capped by `base_damage_cap`)
    pub base_damage: f64,
    pub base_damage_cap: f64,
    /// Exponent applied to army power in the shot formula
    pub damage_exponent: f64,
    pub damage_factor: f64,
    pub power_multiplier: f64,
    /// Seconds between shots at fire-rate multiplier 1.0
    pub fire_interval: f64,

    // === Difficulty ===
    pub curve_exponent: f64,
    pub hp_per_level: f64,
    pub damage_per_level: f64,
    /// Global difficulty knob (scales HP and boss attack speed)
    pub difficulty_multiplier: f64,
    pub enemy_hp_per_soldier: f64,

    // === Rewards ===
    pub power_per_enemy: i32,
    pub max_power_reward: i32,
    pub gold_reward: i64,
    pub gold_drop_chance: f64,
    pub coin_drop_chance: f64,
    pub boss_gold_reward: i64,
    pub boss_loot_drop_chance: f64,

    // === Boss ===
    /// Distance at which an idle boss engages
    pub boss_engage_distance: f64,
    /// Seconds between boss attacks at difficulty 1.0
    pub boss_attack_interval: f64,
    /// Boss damage points that cost the army one soldier
    pub boss_damage_per_soldier: f64,

    // === Shop ===
    pub shop_offer_count: usize,
    pub reroll_cost_base: i64,
    pub prices: RarityPrices,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            min_power: MIN_POWER,
            max_power: MAX_POWER,
            starting_power: 1,

            base_damage: 10.0,
            base_damage_cap: 50.0,
            damage_exponent: 0.4,
            damage_factor: 1.0,
            power_multiplier: 1.0,
            fire_interval: 0.25,

            curve_exponent: 1.0,
            hp_per_level: 0.15,
            damage_per_level: 0.1,
            difficulty_multiplier: 1.0,
            enemy_hp_per_soldier: 10.0,

            power_per_enemy: 1,
            max_power_reward: 20,
            gold_reward: 5,
            gold_drop_chance: 0.35,
            coin_drop_chance: 0.25,
            boss_gold_reward: 25,
            boss_loot_drop_chance: 0.5,

            boss_engage_distance: 6.0,
            boss_attack_interval: 1.5,
            boss_damage_per_soldier: 5.0,

            shop_offer_count: 3,
            reroll_cost_base: 10,
            prices: RarityPrices::default(),
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Using default tuning: {}", e);
                Self::default()
            }
        }
    }

    /// Power bounds as (min, max), tolerating a swapped configuration
    pub fn power_bounds(&self) -> (i32, i32) {
        let min = self.min_power.min(self.max_power);
        let max = self.min_power.max(self.max_power);
        (min, max)
    }

    pub fn damage_exponent(&self) -> f64 {
        floored(self.damage_exponent)
    }

    pub fn damage_factor(&self) -> f64 {
        floored(self.damage_factor)
    }

    pub fn difficulty_multiplier(&self) -> f64 {
        floored(self.difficulty_multiplier)
    }

    pub fn boss_damage_per_soldier(&self) -> f64 {
        floored(self.boss_damage_per_soldier)
    }

    /// Seconds between boss attacks, shortened by the difficulty multiplier
    pub fn boss_attack_interval(&self) -> f64 {
        floored(self.boss_attack_interval) / self.difficulty_multiplier()
    }

    /// Seconds between shots for a given fire-rate multiplier
    pub fn fire_interval(&self, fire_rate_multiplier: f64) -> f64 {
        floored(self.fire_interval) / floored(fire_rate_multiplier)
    }

    /// Gold cost of the next reroll
    pub fn reroll_cost(&self, reroll_count: i32) -> i64 {
        self.reroll_cost_base.max(0) * i64::from(reroll_count.max(0) + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let tuning = Tuning::default();
        assert_eq!(tuning.power_bounds(), (1, 500));
        assert_eq!(tuning.damage_exponent(), 0.4);
        assert_eq!(tuning.damage_factor(), 1.0);
        assert_eq!(tuning.prices.price(Rarity::Rare), 90);
    }

    #[test]
    fn test_floors_applied_on_read() {
        let tuning = Tuning {
            damage_exponent: 0.0,
            damage_factor: -2.0,
            difficulty_multiplier: 0.01,
            boss_damage_per_soldier: 0.0,
            ..Default::default()
        };
        assert_eq!(tuning.damage_exponent, 0.0);
        assert_eq!(tuning.damage_exponent(), 0.05);
        assert_eq!(tuning.damage_factor(), 0.05);
        assert_eq!(tuning.difficulty_multiplier(), 0.05);
        assert_eq!(tuning.boss_damage_per_soldier(), 0.05);
        assert!((tuning.boss_attack_interval() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{"damage_exponent": 0.5, "prices": {"rare": 100}}"#).unwrap();
        assert_eq!(tuning.damage_exponent, 0.5);
        assert_eq!(tuning.max_power, 500);
        assert_eq!(tuning.prices.rare, 100);
        assert_eq!(tuning.prices.common, 20);
    }

    #[test]
    fn test_swapped_power_bounds() {
        let tuning = Tuning {
            min_power: 50,
            max_power: 10,
            ..Default::default()
        };
        assert_eq!(tuning.power_bounds(), (10, 50));
    }

    #[test]
    fn test_reroll_cost_grows() {
        let tuning = Tuning::default();
        assert_eq!(tuning.reroll_cost(0), 10);
        assert_eq!(tuning.reroll_cost(2), 30);
        assert_eq!(tuning.reroll_cost(-4), 10);
    }

    #[test]
    fn test_load_from_file_and_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"gold_reward": 9}}"#).unwrap();
        let tuning = Tuning::load(file.path()).unwrap();
        assert_eq!(tuning.gold_reward, 9);

        let missing = file.path().with_extension("missing");
        assert!(matches!(Tuning::load(&missing), Err(ContentError::Read { .. })));
        assert_eq!(Tuning::load_or_default(&missing), Tuning::default());
    }
}
