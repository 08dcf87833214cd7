//! Run state and the session that owns it
//!
//! A [`RunSession`] is the single writer of its [`RunState`]. Everything it
//! needs (tuning, loot content, saved progress) is handed in at construction.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::boss::BossEncounter;
use super::level::{generate_level, Gate, LevelData};
use super::loot::{LoadoutStats, LootItem, LootTable};
use super::progression::{apply_gate, clamp_power, DamageAccumulator, DifficultyCurve};
use super::seeds;
use super::shop::{roll_shop_offers, ShopOffer};
use crate::config::Tuning;
use crate::persistence::{PersistedProgress, ProgressStore, StoreError};
use crate::round_to_int;

/// Distance along the track between consecutive enemy groups
pub const SEGMENT_LENGTH: f32 = 30.0;

/// Mutable counters of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub base_seed: i32,
    pub level_index: i32,
    /// Carried over from previous runs
    pub gold: i64,
    /// Army power (soldier count)
    pub power: i32,
    /// Coins spawned this run (collected by the presentation layer)
    pub coins: u32,
}

impl RunState {
    /// Power is clamped into the configured bounds
    pub fn new(base_seed: i32, level_index: i32, gold: i64, power: i32, tuning: &Tuning) -> Self {
        let (min, max) = tuning.power_bounds();
        Self {
            base_seed,
            level_index: level_index.max(1),
            gold: gold.max(0),
            power: power.clamp(min, max),
            coins: 0,
        }
    }

    /// Cross a gate; power stays within the configured bounds
    pub fn apply_gate(&mut self, gate: Gate, tuning: &Tuning) -> i32 {
        let (min, max) = tuning.power_bounds();
        self.power = apply_gate(self.power, gate, min, max);
        self.power
    }

    /// Add (or remove) soldiers. Returns the unclamped result.
    pub fn add_power(&mut self, delta: i32, tuning: &Tuning) -> i64 {
        let (min, max) = tuning.power_bounds();
        let raw = i64::from(self.power) + i64::from(delta);
        self.power = clamp_power(raw, min, max);
        raw
    }

    pub fn add_gold(&mut self, amount: i64) {
        self.gold = self.gold.saturating_add(amount.max(0));
    }

    /// Spend gold if enough is available
    pub fn spend_gold(&mut self, amount: i64) -> bool {
        let amount = amount.max(0);
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }
}

/// An enemy group blocking the track after a gate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyGroup {
    pub segment: usize,
    pub enemy_count: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub position: Vec3,
    rewarded: bool,
}

impl EnemyGroup {
    pub fn new(segment: usize, enemy_count: i32, hp_multiplier: f64, hp_per_soldier: f64, position: Vec3) -> Self {
        let max_hp = round_to_int(f64::from(enemy_count.max(0)) * hp_per_soldier.max(0.0) * hp_multiplier).max(1);
        Self {
            segment,
            enemy_count: enemy_count.max(0),
            hp: max_hp,
            max_hp,
            position,
            rewarded: false,
        }
    }

    /// Returns true when this hit wiped the group out
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if self.hp <= 0 || amount <= 0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0);
        self.hp == 0
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Returns true exactly once, after the group is defeated
    pub fn claim_rewards(&mut self) -> bool {
        if !self.is_defeated() || self.rewarded {
            return false;
        }
        self.rewarded = true;
        true
    }
}

/// Where the run currently is within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the player to pick a gate
    Gates { segment: usize },
    /// Shooting the enemy group of a segment
    Fighting { segment: usize },
    Boss,
    LevelComplete,
    /// Army wiped out by the boss
    Defeated,
}

/// Loot content available to a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunContent {
    /// Items sold in the shop (also the equipment catalog)
    pub shop: LootTable,
    /// Items dropped by bosses
    pub boss: LootTable,
}

impl RunContent {
    pub fn find(&self, id: &str) -> Option<&LootItem> {
        self.shop.find(id).or_else(|| self.boss.find(id))
    }
}

/// Result of a shop action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    Rerolled,
    AlreadyOwned,
    InsufficientGold,
    /// The item is not among the current offers
    NotOffered,
}

/// One active game session
#[derive(Debug, Clone)]
pub struct RunSession {
    pub state: RunState,
    pub level: LevelData,
    pub phase: RunPhase,
    pub group: Option<EnemyGroup>,
    pub boss: BossEncounter,
    pub time_ticks: u64,
    pub(crate) tuning: Tuning,
    pub(crate) content: RunContent,
    pub(crate) progress: PersistedProgress,
    pub(crate) loadout: LoadoutStats,
    pub(crate) curve: DifficultyCurve,
    pub(crate) fire_timer: f64,
    pub(crate) spike: DamageAccumulator,
    pub(crate) reroll_count: i32,
    pub(crate) events: Vec<super::tick::SimEvent>,
}

impl RunSession {
    /// Start a run from saved progress. A missing seed falls back to the default seed.
    pub fn start(
        base_seed: Option<i32>,
        tuning: Tuning,
        content: RunContent,
        store: &dyn ProgressStore,
    ) -> Self {
        let base_seed = seeds::resolve_base_seed(base_seed);
        let progress = store.load_or_default();
        let loadout = loadout_for(&progress, &content);

        let (min, max) = tuning.power_bounds();
        let starting = i64::from(tuning.starting_power) + i64::from(loadout.bonus_power);
        let power = clamp_power(starting, min, max);

        let state = RunState::new(base_seed, progress.current_level, progress.gold, power, &tuning);
        let level = generate_level(state.level_index, seeds::level_seed(base_seed, state.level_index));
        let boss = BossEncounter::new(level.boss.clone(), state.level_index, &tuning);
        let curve = DifficultyCurve::from_tuning(&tuning);

        log::info!(
            "Run started: seed={} level={} gold={} power={}",
            base_seed,
            state.level_index,
            state.gold,
            state.power
        );

        Self {
            state,
            level,
            phase: RunPhase::Gates { segment: 0 },
            group: None,
            boss,
            time_ticks: 0,
            tuning,
            content,
            progress,
            loadout,
            curve,
            fire_timer: 0.0,
            spike: DamageAccumulator::new(),
            reroll_count: 0,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn loadout(&self) -> &LoadoutStats {
        &self.loadout
    }

    pub fn progress(&self) -> &PersistedProgress {
        &self.progress
    }

    pub fn reroll_count(&self) -> i32 {
        self.reroll_count
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<super::tick::SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Track position of a segment's enemy group
    pub fn group_position(segment: usize) -> Vec3 {
        Vec3::new(0.0, 0.0, SEGMENT_LENGTH * (segment as f32 + 1.0))
    }

    /// Override where the current group actually stands (the spawner decides)
    pub fn set_group_position(&mut self, position: Vec3) {
        if let Some(group) = self.group.as_mut() {
            group.position = position;
        }
    }

    pub(crate) fn spawn_group(&mut self, segment: usize) {
        let enemy_count = self.level.segments.get(segment).map_or(0, |s| s.enemy_count);
        let group = EnemyGroup::new(
            segment,
            enemy_count,
            self.curve.hp_multiplier(self.state.level_index),
            self.tuning.enemy_hp_per_soldier,
            Self::group_position(segment),
        );
        log::debug!("Segment {}: {} enemies, hp {}", segment, group.enemy_count, group.max_hp);
        self.group = Some(group);
        self.fire_timer = 0.0;
    }

    /// Move on to the next level after completing the current one
    pub fn advance_level(&mut self) -> bool {
        if self.phase != RunPhase::LevelComplete {
            return false;
        }
        self.state.level_index += 1;
        self.progress.current_level = self.state.level_index;
        self.level = generate_level(
            self.state.level_index,
            seeds::level_seed(self.state.base_seed, self.state.level_index),
        );
        self.boss = BossEncounter::new(self.level.boss.clone(), self.state.level_index, &self.tuning);
        self.phase = RunPhase::Gates { segment: 0 };
        self.group = None;
        self.fire_timer = 0.0;
        self.spike.reset();
        self.reroll_count = 0;
        log::info!("Level {} started", self.state.level_index);
        true
    }

    /// Current shop offers for this level and reroll count
    pub fn shop_offers(&self) -> Vec<ShopOffer> {
        roll_shop_offers(
            &self.content.shop,
            self.state.base_seed,
            self.state.level_index,
            self.reroll_count,
            self.tuning.shop_offer_count,
            &self.tuning,
        )
    }

    /// Pay for a new set of offers
    pub fn reroll_shop(&mut self) -> PurchaseOutcome {
        let cost = self.tuning.reroll_cost(self.reroll_count);
        if !self.state.spend_gold(cost) {
            return PurchaseOutcome::InsufficientGold;
        }
        self.reroll_count += 1;
        PurchaseOutcome::Rerolled
    }

    /// Buy one of the current offers. The offer list and its prices are
    /// re-derived from the shop seed, never taken from the caller.
    pub fn buy(&mut self, item_id: &str) -> PurchaseOutcome {
        let Some(offer) = self
            .shop_offers()
            .into_iter()
            .find(|offer| offer.item.id == item_id)
        else {
            log::warn!(
                "Refused purchase of '{}': not offered at level {} reroll {}",
                item_id,
                self.state.level_index,
                self.reroll_count
            );
            return PurchaseOutcome::NotOffered;
        };
        if self.progress.owns(&offer.item.id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        if !self.state.spend_gold(offer.price) {
            return PurchaseOutcome::InsufficientGold;
        }
        self.grant_item(&offer.item);
        log::info!("Bought {} for {} gold", offer.item.id, offer.price);
        PurchaseOutcome::Purchased
    }

    /// Equip an owned item and refresh the loadout
    pub fn equip(&mut self, id: &str) -> bool {
        let equipped = self.progress.equip(id);
        if equipped {
            self.loadout = loadout_for(&self.progress, &self.content);
        }
        equipped
    }

    pub fn unequip(&mut self, id: &str) {
        self.progress.unequip(id);
        self.loadout = loadout_for(&self.progress, &self.content);
    }

    /// Add an item to the collection; run-only items are equipped immediately
    pub(crate) fn grant_item(&mut self, item: &LootItem) {
        self.progress.grant(&item.id);
        if item.run_only {
            self.equip(&item.id);
        }
    }

    /// Persist gold, level and the permanent part of the collection
    pub fn end_run(&mut self, store: &mut dyn ProgressStore) -> Result<(), StoreError> {
        let content = &self.content;
        let is_run_only = |id: &String| content.find(id).is_some_and(|item| item.run_only);
        self.progress.owned_items.retain(|id| !is_run_only(id));
        self.progress.equipped_items.retain(|id| !is_run_only(id));
        self.progress.gold = self.state.gold;
        self.progress.current_level = self.state.level_index;

        store.save(&self.progress)?;
        log::info!(
            "Run ended at level {} with {} gold",
            self.state.level_index,
            self.state.gold
        );
        Ok(())
    }
}

fn loadout_for(progress: &PersistedProgress, content: &RunContent) -> LoadoutStats {
    let items: Vec<&LootItem> = progress
        .equipped_items
        .iter()
        .filter_map(|id| {
            let item = content.find(id);
            if item.is_none() {
                log::warn!("Equipped item '{}' is not in the loot content", id);
            }
            item
        })
        .collect();
    LoadoutStats::from_items(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::loot::tests::{item, sample_table};
    use crate::sim::loot::{EffectKind, Rarity};

    fn content() -> RunContent {
        RunContent {
            shop: sample_table(),
            boss: sample_table(),
        }
    }

    #[test]
    fn test_start_from_fresh_store() {
        let store = MemoryStore::new();
        let session = RunSession::start(None, Tuning::default(), content(), &store);
        assert_eq!(session.state.base_seed, 12345);
        assert_eq!(session.state.level_index, 1);
        assert_eq!(session.state.power, 1);
        assert_eq!(session.level, generate_level(1, seeds::level_seed(12345, 1)));
        assert_eq!(session.phase, RunPhase::Gates { segment: 0 });
    }

    #[test]
    fn test_start_applies_saved_progress_and_loadout() {
        let mut shop = sample_table();
        let mut recruits = item("recruits_rare", Rarity::Rare);
        recruits.effect = EffectKind::StartingPower;
        recruits.magnitude = 9.0;
        shop.items.push(recruits);

        let store = MemoryStore::with_progress(PersistedProgress {
            gold: 300,
            current_level: 5,
            owned_items: vec!["recruits_rare".into(), "sword_rare".into()],
            equipped_items: vec!["recruits_rare".into(), "sword_rare".into(), "missing".into()],
        });
        let session = RunSession::start(
            Some(77),
            Tuning::default(),
            RunContent { shop, boss: LootTable::default() },
            &store,
        );
        assert_eq!(session.state.gold, 300);
        assert_eq!(session.state.level_index, 5);
        assert_eq!(session.state.power, 10);
        assert!((session.loadout().damage_multiplier - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_run_state_power_and_gold() {
        let tuning = Tuning::default();
        let mut state = RunState::new(1, 1, 0, 1, &tuning);
        assert_eq!(state.apply_gate(Gate::Add(5), &tuning), 6);
        assert_eq!(state.add_power(-10, &tuning), -4);
        assert_eq!(state.power, 1);
        state.add_gold(15);
        state.add_gold(-5);
        assert_eq!(state.gold, 15);
        assert!(!state.spend_gold(20));
        assert!(state.spend_gold(15));
        assert_eq!(state.gold, 0);
    }

    #[test]
    fn test_enemy_group_rewards_once() {
        let mut group = EnemyGroup::new(0, 4, 1.0, 10.0, Vec3::ZERO);
        assert_eq!(group.max_hp, 40);
        assert!(!group.claim_rewards());
        assert!(!group.apply_damage(39));
        assert!(group.apply_damage(7));
        assert_eq!(group.hp, 0);
        assert!(!group.apply_damage(7));
        assert!(group.claim_rewards());
        assert!(!group.claim_rewards());
    }

    #[test]
    fn test_run_state_clamps_power_on_construction() {
        let tuning = Tuning::default();
        assert_eq!(RunState::new(1, 1, 0, 0, &tuning).power, 1);
        assert_eq!(RunState::new(1, 1, 0, 9_999, &tuning).power, 500);
        assert_eq!(RunState::new(1, 0, -5, 42, &tuning), RunState::new(1, 1, 0, 42, &tuning));
    }

    #[test]
    fn test_shop_purchase_and_reroll() {
        let store = MemoryStore::with_progress(PersistedProgress {
            gold: 100,
            ..Default::default()
        });
        let mut session = RunSession::start(Some(12345), Tuning::default(), content(), &store);
        let offers = session.shop_offers();
        assert_eq!(offers, roll_shop_offers(&session.content.shop, 12345, 1, 0, 3, &Tuning::default()));
        let ids: Vec<&str> = offers.iter().map(|o| o.item.id.as_str()).collect();
        assert_eq!(ids, vec!["sword_common", "shield_common", "spikes_epic"]);

        assert_eq!(session.buy("sword_common"), PurchaseOutcome::Purchased);
        assert_eq!(session.state.gold, 80);
        assert_eq!(session.buy("sword_common"), PurchaseOutcome::AlreadyOwned);

        assert_eq!(session.reroll_shop(), PurchaseOutcome::Rerolled);
        assert_eq!(session.reroll_count(), 1);
        assert_eq!(session.state.gold, 70);
        session.state.gold = 0;
        assert_eq!(session.reroll_shop(), PurchaseOutcome::InsufficientGold);
        assert_eq!(session.reroll_count(), 1);
    }

    #[test]
    fn test_buy_only_accepts_current_offers_at_shop_price() {
        let store = MemoryStore::with_progress(PersistedProgress {
            gold: 1_000,
            ..Default::default()
        });
        let mut session = RunSession::start(Some(12345), Tuning::default(), content(), &store);

        // In the table but not rolled for this level and reroll count
        assert_eq!(session.buy("crown_legendary"), PurchaseOutcome::NotOffered);
        assert_eq!(session.buy("not_in_content"), PurchaseOutcome::NotOffered);
        assert_eq!(session.state.gold, 1_000);
        assert!(session.progress().owned_items.is_empty());

        // Charged the configured epic price
        assert_eq!(session.buy("spikes_epic"), PurchaseOutcome::Purchased);
        assert_eq!(session.state.gold, 1_000 - Tuning::default().prices.price(Rarity::Epic));

        // shield_common was offered before the reroll but not after it
        assert_eq!(session.reroll_shop(), PurchaseOutcome::Rerolled);
        let ids: Vec<String> = session.shop_offers().into_iter().map(|o| o.item.id).collect();
        assert_eq!(ids, vec!["crown_legendary", "sword_common", "spikes_epic"]);
        assert_eq!(session.buy("shield_common"), PurchaseOutcome::NotOffered);
        assert_eq!(session.buy("crown_legendary"), PurchaseOutcome::Purchased);
        assert_eq!(
            session.progress().owned_items,
            vec!["spikes_epic".to_string(), "crown_legendary".to_string()]
        );
    }

    #[test]
    fn test_end_run_persists_and_drops_run_only_items() {
        let mut shop = sample_table();
        let mut potion = item("potion_common", Rarity::Common);
        potion.run_only = true;
        shop.items.push(potion.clone());

        let mut store = MemoryStore::new();
        let mut session = RunSession::start(
            Some(3),
            Tuning::default(),
            RunContent { shop, boss: LootTable::default() },
            &store,
        );
        session.grant_item(&potion);
        assert!(session.progress().equipped_items.contains(&"potion_common".to_string()));
        let sword = session.content.find("sword_rare").cloned().unwrap();
        session.grant_item(&sword);
        session.state.add_gold(55);

        session.end_run(&mut store).unwrap();
        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.gold, 55);
        assert_eq!(saved.owned_items, vec!["sword_rare".to_string()]);
        assert!(saved.equipped_items.is_empty());
    }
}
