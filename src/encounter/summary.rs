//! Encounter results: the victor, the reward bundle and the final summary.

use serde::{Deserialize, Serialize};

/// Which side won, from the perspective of the side that started the
/// encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Victor {
    /// The initiating (hero) side.
    Source,
    /// The opposing side.
    Target,
    /// Still undecided.
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDrop {
    pub item_id: String,
    pub quantity: u32,
}

/// Rewards earned from one encounter. Empty by default; merged additively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RewardBundle {
    pub experience: u64,
    pub gold: u64,
    pub items: Vec<ItemDrop>,
}

impl RewardBundle {
    pub fn is_empty(&self) -> bool {
        self.experience == 0 && self.gold == 0 && self.items.is_empty()
    }

    /// Folds another bundle into this one, combining quantities for
    /// duplicate item ids.
    pub fn merge(&mut self, other: &RewardBundle) {
        self.experience = self.experience.saturating_add(other.experience);
        self.gold = self.gold.saturating_add(other.gold);
        for drop in &other.items {
            match self.items.iter_mut().find(|d| d.item_id == drop.item_id) {
                Some(existing) => existing.quantity += drop.quantity,
                None => self.items.push(drop.clone()),
            }
        }
    }

    pub fn add_item(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.merge(&RewardBundle {
            experience: 0,
            gold: 0,
            items: vec![ItemDrop {
                item_id: item_id.to_string(),
                quantity,
            }],
        });
    }
}

/// Snapshot of an encounter's progress, finalized once on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSummary {
    pub elapsed_seconds: f64,
    pub swings: u64,
    pub source_damage_dealt: f64,
    pub target_damage_dealt: f64,
    pub victor: Victor,
    pub running: bool,
    pub rewards: RewardBundle,
}

impl Default for EncounterSummary {
    fn default() -> Self {
        Self {
            elapsed_seconds: 0.0,
            swings: 0,
            source_damage_dealt: 0.0,
            target_damage_dealt: 0.0,
            victor: Victor::None,
            running: false,
            rewards: RewardBundle::default(),
        }
    }
}
