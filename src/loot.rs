//! Loot rolling.
//!
//! Each loot entry is an independent chance roll. Missing tables degrade to
//! the default table rather than failing the encounter; a missing default
//! simply yields no items.

use crate::constants::DEFAULT_LOOT_TABLE_ID;
use crate::data::{GameData, LootTable};
use crate::encounter::summary::RewardBundle;
use rand::Rng;
use tracing::warn;

/// Looks up a loot table, falling back to the default when absent.
pub fn resolve_loot_table<'a>(data: &'a GameData, table_id: &str) -> Option<&'a LootTable> {
    if let Some(table) = data.loot_table(table_id) {
        return Some(table);
    }
    if table_id != DEFAULT_LOOT_TABLE_ID {
        warn!(table = table_id, "loot table missing, using default");
    } else {
        warn!("default loot table missing, no item drops");
    }
    data.loot_table(DEFAULT_LOOT_TABLE_ID)
}

/// Rolls every entry of a table once.
pub fn roll_table(table: &LootTable, rng: &mut impl Rng) -> RewardBundle {
    let mut bundle = RewardBundle::default();
    for entry in &table.entries {
        if rng.gen::<f64>() >= entry.chance.clamp(0.0, 1.0) {
            continue;
        }
        let quantity = if entry.max_quantity > entry.min_quantity {
            rng.gen_range(entry.min_quantity..=entry.max_quantity)
        } else {
            entry.min_quantity
        };
        bundle.add_item(&entry.item_id, quantity);
    }
    bundle
}

/// Builds the reward bundle for a won encounter: flat experience and gold
/// plus one roll of the resolved loot table.
pub fn roll_rewards(
    data: &GameData,
    table_id: &str,
    experience: u64,
    gold: u64,
    rng: &mut impl Rng,
) -> RewardBundle {
    let mut bundle = RewardBundle {
        experience,
        gold,
        items: Vec::new(),
    };
    if let Some(table) = resolve_loot_table(data, table_id) {
        bundle.merge(&roll_table(table, rng));
    }
    bundle
}
