//! Payloads exchanged with the key-value backend
//!
//! The backend is a plain upsert API keyed by wallet address:
//! `GET /users/:wallet`, `PUT /users/:wallet/state`, `PUT /users/:wallet/loot`.
//! Transport lives outside this crate; these types fix the wire shape.

use serde::{Deserialize, Serialize};

use super::PersistedProgress;

/// Body of `PUT /users/:wallet/state` and response of `GET /users/:wallet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatePayload {
    pub wallet_address: String,
    #[serde(default)]
    pub owned_items: Vec<String>,
    #[serde(default)]
    pub equipped_items: Vec<String>,
    pub run_base_seed: i32,
    #[serde(default)]
    pub gold: i64,
}

impl UserStatePayload {
    pub fn from_progress(wallet_address: &str, run_base_seed: i32, progress: &PersistedProgress) -> Self {
        Self {
            wallet_address: wallet_address.to_string(),
            owned_items: progress.owned_items.clone(),
            equipped_items: progress.equipped_items.clone(),
            run_base_seed,
            gold: progress.gold,
        }
    }

    /// Merge into local progress (the backend is authoritative for items and gold)
    pub fn apply_to(&self, progress: &mut PersistedProgress) {
        progress.owned_items = self.owned_items.clone();
        progress.equipped_items = self.equipped_items.clone();
        progress.gold = self.gold;
        progress.normalize();
    }
}

/// Body of `PUT /users/:wallet/loot`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LootPayload {
    pub owned_items: Vec<String>,
    pub equipped_items: Vec<String>,
}

impl LootPayload {
    pub fn from_progress(progress: &PersistedProgress) -> Self {
        Self {
            owned_items: progress.owned_items.clone(),
            equipped_items: progress.equipped_items.clone(),
        }
    }
}

pub fn user_path(wallet: &str) -> String {
    format!("/users/{}", wallet)
}

pub fn state_path(wallet: &str) -> String {
    format!("/users/{}/state", wallet)
}

pub fn loot_path(wallet: &str) -> String {
    format!("/users/{}/loot", wallet)
}
