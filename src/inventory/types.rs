//! Inventory value types: owned items, mutation results and snapshots.

use crate::combatant::{Attributes, EquipmentSlot};
use crate::constants::UPGRADE_BONUS_PER_LEVEL;
use crate::data::{ItemCatalog, ItemKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One owned item instance. The definition id points into the catalog; the
/// instance carries the per-item state (upgrades, socketed augments).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedItem {
    pub instance_id: String,
    pub item_id: String,
    pub upgrade_level: u32,
    #[serde(default)]
    pub socketed: Vec<String>,
}

impl OwnedItem {
    pub fn new(item_id: &str) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            item_id: item_id.to_string(),
            upgrade_level: 0,
            socketed: Vec::new(),
        }
    }

    /// Stat contribution when equipped: definition bonuses scaled by upgrade
    /// level, plus any socketed augment bonuses. Unknown definitions
    /// contribute nothing.
    pub fn effective_bonuses(&self, catalog: &ItemCatalog) -> Attributes {
        let mut total = Attributes::zero();
        if let Some(def) = catalog.definition(&self.item_id) {
            if let ItemKind::Equipment { bonuses, .. } = def.kind {
                let mut scaled = bonuses;
                scaled.scale(1.0 + UPGRADE_BONUS_PER_LEVEL * self.upgrade_level as f64);
                total.add(&scaled);
            }
        }
        for augment_id in &self.socketed {
            if let Some(def) = catalog.definition(augment_id) {
                if let ItemKind::Augment { bonuses } = def.kind {
                    total.add(&bonuses);
                }
            }
        }
        total
    }
}

/// What a mutation changed, for the host to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MutationFlags {
    pub hero_needs_refresh: bool,
    pub inventory_changed: bool,
    pub materials_changed: bool,
    pub consumables_changed: bool,
    pub reset_encounter: bool,
}

/// Result object for every ledger mutation. Validation failures come back
/// as `success: false` with a message; they are never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub messages: Vec<String>,
    pub flags: MutationFlags,
}

impl MutationOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            messages: vec![message.into()],
            flags: MutationFlags::default(),
        }
    }

    pub fn succeeded(message: impl Into<String>, flags: MutationFlags) -> Self {
        Self {
            success: true,
            messages: vec![message.into()],
            flags,
        }
    }
}

/// Serializable view of the whole ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InventorySnapshot {
    pub equipped: BTreeMap<EquipmentSlot, Vec<OwnedItem>>,
    pub unequipped: Vec<OwnedItem>,
    pub materials: BTreeMap<String, u32>,
    pub consumables: BTreeMap<String, u32>,
    pub gold: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ItemDefinition, Rarity};
    use crate::combatant::AttributeType;

    fn catalog() -> ItemCatalog {
        let mut sword_bonus = Attributes::zero();
        sword_bonus.set(AttributeType::Strength, 10.0);
        let mut gem_bonus = Attributes::zero();
        gem_bonus.set(AttributeType::Luck, 3.0);

        ItemCatalog::new(vec![
            ItemDefinition {
                id: "sword".to_string(),
                name: "Sword".to_string(),
                rarity: Rarity::Common,
                kind: ItemKind::Equipment {
                    slot: EquipmentSlot::MainHand,
                    bonuses: sword_bonus,
                    socket_capacity: 1,
                    max_upgrade_level: 5,
                },
                material_id: "iron".to_string(),
                upgrade_cost_base: 5,
                salvage_base_yield: 2,
            },
            ItemDefinition {
                id: "gem".to_string(),
                name: "Gem".to_string(),
                rarity: Rarity::Rare,
                kind: ItemKind::Augment { bonuses: gem_bonus },
                material_id: "dust".to_string(),
                upgrade_cost_base: 0,
                salvage_base_yield: 0,
            },
        ])
    }

    #[test]
    fn test_effective_bonuses_scale_with_upgrades() {
        let catalog = catalog();
        let mut item = OwnedItem::new("sword");
        assert_eq!(
            item.effective_bonuses(&catalog).get(AttributeType::Strength),
            10.0
        );

        item.upgrade_level = 2;
        assert!(
            (item.effective_bonuses(&catalog).get(AttributeType::Strength) - 12.0).abs() < 1e-9
        );
    }

    #[test]
    fn test_effective_bonuses_include_sockets() {
        let catalog = catalog();
        let mut item = OwnedItem::new("sword");
        item.socketed.push("gem".to_string());

        let bonuses = item.effective_bonuses(&catalog);
        assert_eq!(bonuses.get(AttributeType::Strength), 10.0);
        assert_eq!(bonuses.get(AttributeType::Luck), 3.0);
    }

    #[test]
    fn test_unknown_definition_contributes_nothing() {
        let catalog = catalog();
        let item = OwnedItem::new("missing");
        assert_eq!(item.effective_bonuses(&catalog).total(), 0.0);
    }

    #[test]
    fn test_instance_ids_unique() {
        assert_ne!(OwnedItem::new("sword").instance_id, OwnedItem::new("sword").instance_id);
    }
}
