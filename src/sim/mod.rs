//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, one stream per documented seed
//! - Fixed draw order within a stream
//! - Ordered lists wherever iteration order affects outcomes
//! - No rendering, platform or network dependencies

pub mod boss;
pub mod level;
pub mod loot;
pub mod progression;
pub mod rewards;
pub mod rng;
pub mod seeds;
pub mod shop;
pub mod state;
pub mod tick;

pub use boss::{BossEncounter, BossPhase, BossTick};
pub use level::{generate_level, BossPattern, BossSpec, Gate, GateSide, LevelData, Segment};
pub use loot::{roll_item, EffectKind, LoadoutStats, LootItem, LootTable, Rarity, RarityWeight};
pub use progression::{apply_gate, shot_damage, DamageAccumulator, DifficultyCurve};
pub use rewards::{group_reward_at, roll_boss_loot, roll_group_reward, GroupReward};
pub use rng::SimRng;
pub use shop::{roll_shop_offers, ShopOffer};
pub use state::{EnemyGroup, PurchaseOutcome, RunContent, RunPhase, RunSession, RunState};
pub use tick::{tick, SimEvent, TickInput};
