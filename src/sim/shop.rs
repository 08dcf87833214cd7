//! Between-level shop offers
//!
//! Offers for a (level, reroll) pair come from one stream seeded with the
//! shop-offer seed, so a reroll count fully determines what is on sale.

use serde::{Deserialize, Serialize};

use super::loot::{roll_item, LootItem, LootTable};
use super::rng::SimRng;
use super::seeds;
use crate::config::Tuning;

/// Roll attempts allowed per requested offer before giving up on variety
const ATTEMPTS_PER_OFFER: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopOffer {
    pub item: LootItem,
    pub price: i64,
}

/// Roll up to `count` offers, at most one per item family
pub fn roll_shop_offers(
    table: &LootTable,
    base_seed: i32,
    level_index: i32,
    reroll_count: i32,
    count: usize,
    tuning: &Tuning,
) -> Vec<ShopOffer> {
    let seed = seeds::shop_seed(base_seed, level_index, reroll_count);
    let mut rng = SimRng::new(seed);
    let mut offers: Vec<ShopOffer> = Vec::with_capacity(count);

    for _ in 0..count * ATTEMPTS_PER_OFFER {
        if offers.len() >= count {
            break;
        }
        let Some(item) = roll_item(table, &mut rng) else {
            break;
        };
        if offers.iter().any(|o| o.item.family == item.family) {
            continue;
        }
        offers.push(ShopOffer {
            item: item.clone(),
            price: tuning.prices.price(item.rarity).max(0),
        });
    }

    if offers.len() < count {
        log::debug!(
            "Shop seed={} filled {}/{} offers (not enough distinct families)",
            seed,
            offers.len(),
            count
        );
    }
    offers
}
