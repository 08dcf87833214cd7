//! Weighted loot sampling
//!
//! Two-stage selection: a rarity tier is chosen by walking the table's
//! rarity-weight list in declaration order, then an item is picked uniformly
//! within that tier. Rarities with no eligible items contribute no weight.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::rng::SimRng;
use crate::config::ContentError;

/// Loot quality tier, declared in rank order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All tiers in rank order
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }
}

/// What an item does when equipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Adds `magnitude` percent to the per-shot damage multiplier
    DamagePercent,
    /// Damage per second dealt to whatever the army is fighting
    SpikeAura,
    /// Extra soldiers at run start
    StartingPower,
    /// Adds `magnitude` percent to gold rewards
    GoldPercent,
    /// Adds `magnitude` percent to fire rate
    FireRatePercent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub id: String,
    /// Groups the rarity variants of the same item
    pub family: String,
    pub rarity: Rarity,
    pub effect: EffectKind,
    pub magnitude: f64,
    /// Items with weight <= 0 are never sampled
    #[serde(default = "default_item_weight")]
    pub weight: f64,
    /// Discarded when the run ends
    #[serde(default)]
    pub run_only: bool,
}

fn default_item_weight() -> f64 {
    1.0
}

impl LootItem {
    pub fn is_droppable(&self) -> bool {
        self.weight > 0.0
    }
}

/// Relative weight of a rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeight {
    pub rarity: Rarity,
    pub weight: f64,
}

/// Items plus an ordered rarity-weight list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootTable {
    pub items: Vec<LootItem>,
    /// Walked in this order when sampling
    pub rarity_weights: Vec<RarityWeight>,
}

impl LootTable {
    pub fn new(items: Vec<LootItem>, rarity_weights: Vec<RarityWeight>) -> Self {
        Self {
            items,
            rarity_weights,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let table: LootTable = serde_json::from_str(json)?;
        for warning in table.validate() {
            log::warn!("Loot table: {}", warning);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ContentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded loot table with {} items from {}", table.items.len(), path.display());
        Ok(table)
    }

    pub fn find(&self, id: &str) -> Option<&LootItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Droppable items of one rarity, in table order
    pub fn items_of(&self, rarity: Rarity) -> Vec<&LootItem> {
        self.items
            .iter()
            .filter(|item| item.rarity == rarity && item.is_droppable())
            .collect()
    }

    /// Sum of configured rarity weights restricted to rarities that have droppable items
    pub fn total_weight(&self) -> f64 {
        self.eligible_weights().map(|w| w.weight).sum()
    }

    fn eligible_weights(&self) -> impl Iterator<Item = &RarityWeight> {
        self.rarity_weights.iter().filter(|w| {
            w.weight > 0.0
                && self
                    .items
                    .iter()
                    .any(|item| item.rarity == w.rarity && item.is_droppable())
        })
    }

    /// Content problems worth surfacing; none of them prevent sampling
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for (i, item) in self.items.iter().enumerate() {
            if self.items[..i].iter().any(|other| other.id == item.id) {
                warnings.push(format!("duplicate item id '{}'", item.id));
            }
            if item.weight < 0.0 {
                warnings.push(format!("item '{}' has negative weight {}", item.id, item.weight));
            }
        }

        for (i, entry) in self.rarity_weights.iter().enumerate() {
            if self.rarity_weights[..i].iter().any(|w| w.rarity == entry.rarity) {
                warnings.push(format!("rarity {} weighted more than once", entry.rarity.as_str()));
            }
            if entry.weight < 0.0 {
                warnings.push(format!(
                    "rarity {} has negative weight {}",
                    entry.rarity.as_str(),
                    entry.weight
                ));
            } else if entry.weight > 0.0 && self.items_of(entry.rarity).is_empty() {
                warnings.push(format!(
                    "rarity {} is weighted but has no droppable items",
                    entry.rarity.as_str()
                ));
            }
        }

        if self.total_weight() <= 0.0 {
            warnings.push("table can never drop an item".to_string());
        }

        warnings
    }
}

/// Roll one item from the table.
///
/// Consumes one uniform draw for the rarity and one bounded draw for the
/// item. Returns `None` without drawing when nothing can drop.
pub fn roll_item<'a>(table: &'a LootTable, rng: &mut SimRng) -> Option<&'a LootItem> {
    let total = table.total_weight();
    if total <= 0.0 {
        log::warn!(
            "Loot roll skipped: no weighted rarity has droppable items ({} items)",
            table.items.len()
        );
        return None;
    }

    let roll = rng.next_uniform() * total;
    let mut cumulative = 0.0;
    let mut selected = None;
    let mut last_eligible = None;
    for entry in table.eligible_weights() {
        cumulative += entry.weight;
        last_eligible = Some(entry.rarity);
        if cumulative >= roll {
            selected = Some(entry.rarity);
            break;
        }
    }

    // Only reachable through float accumulation error; the last eligible tier
    // is the one the roll narrowly missed.
    let rarity = selected.or(last_eligible)?;

    let candidates = table.items_of(rarity);
    let index = rng.next_int(candidates.len() as i32) as usize;
    let item = candidates.get(index).copied();
    if let Some(item) = item {
        log::debug!("Rolled {} ({}) from roll {:.4}/{:.4}", item.id, rarity.as_str(), roll, total);
    }
    item
}

/// Aggregate effect of a set of equipped items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadoutStats {
    /// Multiplies per-shot damage (1.0 = no bonus)
    pub damage_multiplier: f64,
    pub spike_dps: f64,
    pub bonus_power: i32,
    /// Multiplies gold rewards (1.0 = no bonus)
    pub gold_multiplier: f64,
    /// Multiplies fire rate (1.0 = no bonus)
    pub fire_rate_multiplier: f64,
}

impl Default for LoadoutStats {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            spike_dps: 0.0,
            bonus_power: 0,
            gold_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
        }
    }
}

impl LoadoutStats {
    /// Fold equipped items. Non-positive magnitudes have no effect.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a LootItem>) -> Self {
        let mut stats = Self::default();
        for item in items {
            let magnitude = item.magnitude.max(0.0);
            match item.effect {
                EffectKind::DamagePercent => stats.damage_multiplier += magnitude / 100.0,
                EffectKind::SpikeAura => stats.spike_dps += magnitude,
                EffectKind::StartingPower => stats.bonus_power += crate::round_to_int(magnitude),
                EffectKind::GoldPercent => stats.gold_multiplier += magnitude / 100.0,
                EffectKind::FireRatePercent => stats.fire_rate_multiplier += magnitude / 100.0,
            }
        }
        stats
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(id: &str, rarity: Rarity) -> LootItem {
        LootItem {
            id: id.to_string(),
            family: id.split('_').next().unwrap_or(id).to_string(),
            rarity,
            effect: EffectKind::DamagePercent,
            magnitude: 10.0,
            weight: 1.0,
            run_only: false,
        }
    }

    pub(crate) fn standard_weights() -> Vec<RarityWeight> {
        vec![
            RarityWeight { rarity: Rarity::Common, weight: 60.0 },
            RarityWeight { rarity: Rarity::Rare, weight: 25.0 },
            RarityWeight { rarity: Rarity::Epic, weight: 10.0 },
            RarityWeight { rarity: Rarity::Legendary, weight: 5.0 },
        ]
    }

    pub(crate) fn sample_table() -> LootTable {
        LootTable::new(
            vec![
                item("sword_common", Rarity::Common),
                item("shield_common", Rarity::Common),
                item("sword_rare", Rarity::Rare),
                item("spikes_epic", Rarity::Epic),
                item("crown_legendary", Rarity::Legendary),
            ],
            standard_weights(),
        )
    }

    #[test]
    fn test_absent_rarities_never_roll() {
        let table = LootTable::new(
            vec![
                item("sword_common", Rarity::Common),
                item("shield_common", Rarity::Common),
                item("sword_rare", Rarity::Rare),
            ],
            standard_weights(),
        );
        assert_eq!(table.total_weight(), 85.0);

        let mut rng = SimRng::new(2024);
        let mut seen_rare = false;
        for _ in 0..10_000 {
            let rolled = roll_item(&table, &mut rng).expect("table has items");
            assert!(matches!(rolled.rarity, Rarity::Common | Rarity::Rare));
            seen_rare |= rolled.rarity == Rarity::Rare;
        }
        assert!(seen_rare);
    }

    #[test]
    fn test_empty_and_zero_weight_tables_roll_nothing() {
        let mut rng = SimRng::new(1);
        assert!(roll_item(&LootTable::default(), &mut rng).is_none());

        let unweighted = LootTable::new(vec![item("sword_mythic", Rarity::Mythic)], standard_weights());
        assert!(roll_item(&unweighted, &mut rng).is_none());

        let mut zero = sample_table();
        for w in &mut zero.rarity_weights {
            w.weight = 0.0;
        }
        assert!(roll_item(&zero, &mut rng).is_none());

        // Nothing was drawn by the failed rolls
        let mut fresh = SimRng::new(1);
        assert_eq!(rng.next_u32(), fresh.next_u32());
    }

    #[test]
    fn test_zero_weight_items_excluded() {
        let mut ghost = item("ghost_common", Rarity::Common);
        ghost.weight = 0.0;
        let table = LootTable::new(
            vec![ghost, item("sword_rare", Rarity::Rare)],
            standard_weights(),
        );
        let mut rng = SimRng::new(5);
        for _ in 0..200 {
            assert_eq!(roll_item(&table, &mut rng).map(|i| i.id.as_str()), Some("sword_rare"));
        }
    }

    #[test]
    fn test_distribution_roughly_follows_weights() {
        let table = sample_table();
        let mut rng = SimRng::new(77);
        let mut counts = [0u32; 6];
        for _ in 0..20_000 {
            let rolled = roll_item(&table, &mut rng).expect("table has items");
            counts[rolled.rarity.rank() as usize] += 1;
        }
        let common = f64::from(counts[0]) / 20_000.0;
        let legendary = f64::from(counts[4]) / 20_000.0;
        assert!((common - 0.60).abs() < 0.03, "common share {}", common);
        assert!((legendary - 0.05).abs() < 0.015, "legendary share {}", legendary);
        assert_eq!(counts[1], 0);
        assert_eq!(counts[5], 0);
    }

    #[test]
    fn test_roll_is_deterministic() {
        let table = sample_table();
        let mut a = SimRng::new(-31337);
        let mut b = SimRng::new(-31337);
        for _ in 0..100 {
            assert_eq!(
                roll_item(&table, &mut a).map(|i| i.id.clone()),
                roll_item(&table, &mut b).map(|i| i.id.clone())
            );
        }
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut table = sample_table();
        table.items.push(item("sword_common", Rarity::Common));
        table.rarity_weights.push(RarityWeight { rarity: Rarity::Mythic, weight: 1.0 });
        let warnings = table.validate();
        assert!(warnings.iter().any(|w| w.contains("duplicate item id 'sword_common'")));
        assert!(warnings.iter().any(|w| w.contains("Mythic is weighted but has no droppable items")));
        assert!(sample_table().validate().is_empty());
    }

    #[test]
    fn test_from_json_defaults() {
        let json = r#"{
            "items": [
                {"id": "aura_rare", "family": "aura", "rarity": "Rare",
                 "effect": "SpikeAura", "magnitude": 4.5}
            ],
            "rarity_weights": [{"rarity": "Rare", "weight": 10}]
        }"#;
        let table = LootTable::from_json(json).unwrap();
        assert_eq!(table.items[0].weight, 1.0);
        assert!(!table.items[0].run_only);
        assert_eq!(table.total_weight(), 10.0);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            LootTable::from_json("{ not json"),
            Err(ContentError::Parse(_))
        ));
    }

    #[test]
    fn test_loadout_stats() {
        let mut spikes = item("spikes_epic", Rarity::Epic);
        spikes.effect = EffectKind::SpikeAura;
        spikes.magnitude = 3.5;
        let mut recruits = item("recruits_rare", Rarity::Rare);
        recruits.effect = EffectKind::StartingPower;
        recruits.magnitude = 5.0;
        let mut broken = item("broken_common", Rarity::Common);
        broken.magnitude = -40.0;

        let damage = item("sword_rare", Rarity::Rare);
        let stats = LoadoutStats::from_items([&damage, &spikes, &recruits, &broken]);
        assert!((stats.damage_multiplier - 1.1).abs() < 1e-12);
        assert_eq!(stats.spike_dps, 3.5);
        assert_eq!(stats.bonus_power, 5);
        assert_eq!(stats.gold_multiplier, 1.0);
    }

    #[test]
    fn test_rarity_rank_order() {
        assert!(Rarity::Common < Rarity::Mythic);
        let ranks: Vec<u8> = Rarity::ALL.iter().map(Rarity::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5]);
    }
}
