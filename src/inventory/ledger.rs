//! Transactional inventory ledger.
//!
//! Every mutation validates its full cost up front and only then touches
//! state, so a failed operation leaves the ledger exactly as it was. All
//! results are `MutationOutcome` objects; the ledger never returns errors
//! or panics on bad input.

use crate::combatant::{Combatant, EquipmentSlot};
use crate::data::{ConsumableEffect, ItemCatalog, ItemKind, Recipe};
use crate::encounter::summary::RewardBundle;
use crate::inventory::types::{InventorySnapshot, MutationFlags, MutationOutcome, OwnedItem};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryLedger {
    equipped: BTreeMap<EquipmentSlot, VecDeque<OwnedItem>>,
    unequipped: Vec<OwnedItem>,
    materials: BTreeMap<String, u32>,
    consumables: BTreeMap<String, u32>,
    gold: u64,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn gold(&self) -> u64 {
        self.gold
    }

    pub fn material_count(&self, id: &str) -> u32 {
        self.materials.get(id).copied().unwrap_or(0)
    }

    pub fn consumable_count(&self, id: &str) -> u32 {
        self.consumables.get(id).copied().unwrap_or(0)
    }

    pub fn unequipped_items(&self) -> &[OwnedItem] {
        &self.unequipped
    }

    pub fn equipped_items(&self) -> impl Iterator<Item = (EquipmentSlot, &OwnedItem)> {
        self.equipped
            .iter()
            .flat_map(|(slot, items)| items.iter().map(|item| (*slot, item)))
    }

    pub fn find_item(&self, instance_id: &str) -> Option<&OwnedItem> {
        self.unequipped
            .iter()
            .find(|i| i.instance_id == instance_id)
            .or_else(|| {
                self.equipped
                    .values()
                    .flatten()
                    .find(|i| i.instance_id == instance_id)
            })
    }

    // ── Acquisition ──────────────────────────────────────────────────────

    pub fn add_gold(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn add_material(&mut self, id: &str, quantity: u32) {
        *self.materials.entry(id.to_string()).or_insert(0) += quantity;
    }

    pub fn add_consumable(&mut self, id: &str, quantity: u32) {
        *self.consumables.entry(id.to_string()).or_insert(0) += quantity;
    }

    pub fn add_item(&mut self, item: OwnedItem) {
        self.unequipped.push(item);
    }

    /// Routes a reward bundle into the ledger by item kind. Drops whose
    /// definition is missing are skipped with a warning.
    pub fn collect_rewards(&mut self, rewards: &RewardBundle, catalog: &ItemCatalog) -> MutationFlags {
        let mut flags = MutationFlags::default();
        if rewards.gold > 0 {
            self.add_gold(rewards.gold);
        }
        for drop in &rewards.items {
            let Some(def) = catalog.definition(&drop.item_id) else {
                warn!(item = drop.item_id.as_str(), "dropped item has no definition, skipping");
                continue;
            };
            match def.kind {
                ItemKind::Equipment { .. } => {
                    for _ in 0..drop.quantity {
                        self.unequipped.push(OwnedItem::new(&drop.item_id));
                    }
                    flags.inventory_changed = true;
                }
                ItemKind::Material => {
                    self.add_material(&drop.item_id, drop.quantity);
                    flags.materials_changed = true;
                }
                ItemKind::Consumable { .. } | ItemKind::Augment { .. } => {
                    self.add_consumable(&drop.item_id, drop.quantity);
                    flags.consumables_changed = true;
                }
            }
        }
        flags
    }

    // ── Mutations ────────────────────────────────────────────────────────

    pub fn equip(&mut self, catalog: &ItemCatalog, instance_id: &str) -> MutationOutcome {
        let Some(index) = self
            .unequipped
            .iter()
            .position(|i| i.instance_id == instance_id)
        else {
            return MutationOutcome::failure("Item not found in inventory.");
        };
        let Some(def) = catalog.definition(&self.unequipped[index].item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };
        let Some(slot) = def.slot() else {
            return MutationOutcome::failure("Item cannot be equipped.");
        };

        let mut messages = vec![format!("Equipped {}.", def.name)];
        let item = self.unequipped.remove(index);
        let entries = self.equipped.entry(slot).or_default();
        entries.push_back(item);
        if entries.len() > slot.capacity() {
            if let Some(displaced) = entries.pop_front() {
                let name = catalog
                    .definition(&displaced.item_id)
                    .map(|d| d.name.clone())
                    .unwrap_or_else(|| displaced.item_id.clone());
                messages.push(format!("Unequipped {}.", name));
                self.unequipped.push(displaced);
            }
        }

        MutationOutcome {
            success: true,
            messages,
            flags: MutationFlags {
                hero_needs_refresh: true,
                inventory_changed: true,
                reset_encounter: true,
                ..MutationFlags::default()
            },
        }
    }

    pub fn unequip(&mut self, catalog: &ItemCatalog, instance_id: &str) -> MutationOutcome {
        let position = self.equipped.iter().find_map(|(slot, items)| {
            items
                .iter()
                .position(|i| i.instance_id == instance_id)
                .map(|index| (*slot, index))
        });
        let Some((slot, index)) = position else {
            return MutationOutcome::failure("Item is not equipped.");
        };

        let item = self
            .equipped
            .get_mut(&slot)
            .and_then(|items| items.remove(index));
        let Some(item) = item else {
            return MutationOutcome::failure("Item is not equipped.");
        };
        let name = catalog
            .definition(&item.item_id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| item.item_id.clone());
        self.unequipped.push(item);

        MutationOutcome::succeeded(
            format!("Unequipped {}.", name),
            MutationFlags {
                hero_needs_refresh: true,
                inventory_changed: true,
                reset_encounter: true,
                ..MutationFlags::default()
            },
        )
    }

    pub fn upgrade(&mut self, catalog: &ItemCatalog, instance_id: &str) -> MutationOutcome {
        let Some(item) = self.find_item(instance_id) else {
            return MutationOutcome::failure("Item not found in inventory.");
        };
        let Some(def) = catalog.definition(&item.item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };
        if !def.is_equipment() {
            return MutationOutcome::failure("Item cannot be upgraded.");
        }
        let level = item.upgrade_level;
        if level >= def.max_upgrade_level() {
            return MutationOutcome::failure("Item is already at maximum upgrade level.");
        }
        let cost = def.upgrade_cost(level);
        let material_id = def.material_id.clone();
        if self.material_count(&material_id) < cost {
            return MutationOutcome::failure(format!(
                "Not enough {} (need {}).",
                material_id, cost
            ));
        }
        let name = def.name.clone();
        let was_equipped = self.is_equipped(instance_id);

        *self.materials.entry(material_id).or_insert(0) -= cost;
        if let Some(item) = self.find_item_mut(instance_id) {
            item.upgrade_level += 1;
        }

        MutationOutcome::succeeded(
            format!("Upgraded {} to +{}.", name, level + 1),
            MutationFlags {
                hero_needs_refresh: was_equipped,
                inventory_changed: true,
                materials_changed: true,
                ..MutationFlags::default()
            },
        )
    }

    pub fn salvage(&mut self, catalog: &ItemCatalog, instance_id: &str) -> MutationOutcome {
        if self.is_equipped(instance_id) {
            return MutationOutcome::failure("Item must be unequipped before salvaging.");
        }
        let Some(index) = self
            .unequipped
            .iter()
            .position(|i| i.instance_id == instance_id)
        else {
            return MutationOutcome::failure("Item not found in inventory.");
        };
        let Some(def) = catalog.definition(&self.unequipped[index].item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };

        let item = self.unequipped.remove(index);
        let yielded = def.salvage_yield(item.upgrade_level);
        self.add_material(&def.material_id, yielded);

        MutationOutcome::succeeded(
            format!("Salvaged {} into {} {}.", def.name, yielded, def.material_id),
            MutationFlags {
                inventory_changed: true,
                materials_changed: true,
                ..MutationFlags::default()
            },
        )
    }

    pub fn socket(
        &mut self,
        catalog: &ItemCatalog,
        instance_id: &str,
        augment_id: &str,
    ) -> MutationOutcome {
        let Some(item) = self.find_item(instance_id) else {
            return MutationOutcome::failure("Item not found in inventory.");
        };
        let Some(def) = catalog.definition(&item.item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };
        let ItemKind::Equipment {
            socket_capacity, ..
        } = def.kind
        else {
            return MutationOutcome::failure("Item cannot be socketed.");
        };
        if item.socketed.len() as u32 >= socket_capacity {
            return MutationOutcome::failure("No open sockets.");
        }
        let augment_is_valid = matches!(
            catalog.definition(augment_id).map(|d| &d.kind),
            Some(ItemKind::Augment { .. })
        );
        if !augment_is_valid {
            return MutationOutcome::failure("Item is not an augment.");
        }
        if self.consumable_count(augment_id) == 0 {
            return MutationOutcome::failure("No augments available.");
        }
        let name = def.name.clone();
        let was_equipped = self.is_equipped(instance_id);

        *self.consumables.entry(augment_id.to_string()).or_insert(0) -= 1;
        if let Some(item) = self.find_item_mut(instance_id) {
            item.socketed.push(augment_id.to_string());
        }

        MutationOutcome::succeeded(
            format!("Socketed {} into {}.", augment_id, name),
            MutationFlags {
                hero_needs_refresh: was_equipped,
                inventory_changed: true,
                consumables_changed: true,
                ..MutationFlags::default()
            },
        )
    }

    pub fn craft(&mut self, catalog: &ItemCatalog, recipe: &Recipe) -> MutationOutcome {
        let Some(output) = catalog.definition(&recipe.output_item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };
        if self.gold < recipe.cost.gold {
            return MutationOutcome::failure(format!(
                "Not enough gold (need {}).",
                recipe.cost.gold
            ));
        }
        for (material_id, quantity) in &recipe.cost.materials {
            if self.material_count(material_id) < *quantity {
                return MutationOutcome::failure(format!(
                    "Not enough {} (need {}).",
                    material_id, quantity
                ));
            }
        }

        self.gold -= recipe.cost.gold;
        for (material_id, quantity) in &recipe.cost.materials {
            *self.materials.entry(material_id.clone()).or_insert(0) -= quantity;
        }

        let mut flags = MutationFlags {
            materials_changed: !recipe.cost.materials.is_empty(),
            ..MutationFlags::default()
        };
        match output.kind {
            ItemKind::Equipment { .. } => {
                for _ in 0..recipe.output_quantity {
                    self.unequipped.push(OwnedItem::new(&recipe.output_item_id));
                }
                flags.inventory_changed = true;
            }
            ItemKind::Consumable { .. } | ItemKind::Augment { .. } => {
                self.add_consumable(&recipe.output_item_id, recipe.output_quantity);
                flags.consumables_changed = true;
            }
            ItemKind::Material => {
                self.add_material(&recipe.output_item_id, recipe.output_quantity);
                flags.materials_changed = true;
            }
        }

        MutationOutcome::succeeded(
            format!("Crafted {} {}.", recipe.output_quantity, output.name),
            flags,
        )
    }

    pub fn use_consumable(
        &mut self,
        catalog: &ItemCatalog,
        item_id: &str,
        hero: &mut Combatant,
    ) -> MutationOutcome {
        let Some(def) = catalog.definition(item_id) else {
            return MutationOutcome::failure("Unknown item definition.");
        };
        let ItemKind::Consumable { effect } = def.kind else {
            return MutationOutcome::failure("Item cannot be used.");
        };
        if self.consumable_count(item_id) == 0 {
            return MutationOutcome::failure("No consumables available.");
        }

        *self.consumables.entry(item_id.to_string()).or_insert(0) -= 1;
        let mut flags = MutationFlags {
            consumables_changed: true,
            ..MutationFlags::default()
        };
        let message = match effect {
            ConsumableEffect::RestoreHealthPercent(percent) => {
                let healed = hero.heal_percent(percent);
                flags.hero_needs_refresh = true;
                format!("{} restored {:.0} health.", def.name, healed)
            }
            ConsumableEffect::RestoreManaPercent(percent) => {
                let restored = hero.restore_mana_percent(percent);
                flags.hero_needs_refresh = true;
                format!("{} restored {:.0} mana.", def.name, restored)
            }
            ConsumableEffect::GrantExperience(amount) => {
                let levels = hero.add_experience(amount);
                if levels > 0 {
                    flags.hero_needs_refresh = true;
                }
                format!("{} granted {} experience.", def.name, amount)
            }
        };

        MutationOutcome::succeeded(message, flags)
    }

    // ── Snapshots ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            equipped: self
                .equipped
                .iter()
                .map(|(slot, items)| (*slot, items.iter().cloned().collect()))
                .collect(),
            unequipped: self.unequipped.clone(),
            materials: self.materials.clone(),
            consumables: self.consumables.clone(),
            gold: self.gold,
        }
    }

    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        self.equipped = snapshot
            .equipped
            .iter()
            .map(|(slot, items)| (*slot, items.iter().cloned().collect()))
            .collect();
        self.unequipped = snapshot.unequipped.clone();
        self.materials = snapshot.materials.clone();
        self.consumables = snapshot.consumables.clone();
        self.gold = snapshot.gold;
    }

    fn is_equipped(&self, instance_id: &str) -> bool {
        self.equipped
            .values()
            .flatten()
            .any(|i| i.instance_id == instance_id)
    }

    fn find_item_mut(&mut self, instance_id: &str) -> Option<&mut OwnedItem> {
        if let Some(item) = self
            .unequipped
            .iter_mut()
            .find(|i| i.instance_id == instance_id)
        {
            return Some(item);
        }
        self.equipped
            .values_mut()
            .flatten()
            .find(|i| i.instance_id == instance_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{
        AttributeType, Attributes, DerivedStatFormulas, EvolutionProfile, LevelingProfile,
    };
    use crate::data::{CraftCost, ItemDefinition, Rarity};
    use crate::encounter::summary::ItemDrop;

    fn catalog() -> ItemCatalog {
        let mut sword_bonus = Attributes::zero();
        sword_bonus.set(AttributeType::Strength, 10.0);
        let mut gem_bonus = Attributes::zero();
        gem_bonus.set(AttributeType::Luck, 3.0);

        ItemCatalog::new(vec![
            ItemDefinition {
                id: "sword".to_string(),
                name: "Iron Sword".to_string(),
                rarity: Rarity::Common,
                kind: ItemKind::Equipment {
                    slot: EquipmentSlot::MainHand,
                    bonuses: sword_bonus,
                    socket_capacity: 1,
                    max_upgrade_level: 3,
                },
                material_id: "iron".to_string(),
                upgrade_cost_base: 5,
                salvage_base_yield: 2,
            },
            ItemDefinition {
                id: "ring".to_string(),
                name: "Plain Ring".to_string(),
                rarity: Rarity::Common,
                kind: ItemKind::Equipment {
                    slot: EquipmentSlot::Ring,
                    bonuses: Attributes::zero(),
                    socket_capacity: 0,
                    max_upgrade_level: 0,
                },
                material_id: "iron".to_string(),
                upgrade_cost_base: 1,
                salvage_base_yield: 1,
            },
            ItemDefinition {
                id: "gem".to_string(),
                name: "Lucky Gem".to_string(),
                rarity: Rarity::Rare,
                kind: ItemKind::Augment { bonuses: gem_bonus },
                material_id: "dust".to_string(),
                upgrade_cost_base: 0,
                salvage_base_yield: 0,
            },
            ItemDefinition {
                id: "potion".to_string(),
                name: "Healing Potion".to_string(),
                rarity: Rarity::Common,
                kind: ItemKind::Consumable {
                    effect: ConsumableEffect::RestoreHealthPercent(0.5),
                },
                material_id: "herb".to_string(),
                upgrade_cost_base: 0,
                salvage_base_yield: 0,
            },
            ItemDefinition {
                id: "iron".to_string(),
                name: "Iron".to_string(),
                rarity: Rarity::Common,
                kind: ItemKind::Material,
                material_id: "iron".to_string(),
                upgrade_cost_base: 0,
                salvage_base_yield: 0,
            },
        ])
    }

    fn hero() -> Combatant {
        Combatant::new(
            "hero".to_string(),
            "Hero".to_string(),
            Attributes::uniform(10.0),
            DerivedStatFormulas::default(),
            LevelingProfile::default(),
            EvolutionProfile::default(),
            None,
            None,
            vec![],
        )
    }

    fn ledger_with_sword() -> (InventoryLedger, String) {
        let mut ledger = InventoryLedger::new();
        let sword = OwnedItem::new("sword");
        let id = sword.instance_id.clone();
        ledger.add_item(sword);
        (ledger, id)
    }

    #[test]
    fn test_equip_and_unequip() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();

        let outcome = ledger.equip(&catalog, &id);
        assert!(outcome.success);
        assert!(outcome.flags.hero_needs_refresh);
        assert!(outcome.flags.reset_encounter);
        assert_eq!(ledger.unequipped_items().len(), 0);
        assert_eq!(ledger.equipped_items().count(), 1);

        let outcome = ledger.unequip(&catalog, &id);
        assert!(outcome.success);
        assert_eq!(ledger.unequipped_items().len(), 1);
    }

    #[test]
    fn test_equip_evicts_when_slot_full() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        let ids: Vec<String> = (0..3)
            .map(|_| {
                let ring = OwnedItem::new("ring");
                let id = ring.instance_id.clone();
                ledger.add_item(ring);
                id
            })
            .collect();

        for id in &ids {
            assert!(ledger.equip(&catalog, id).success);
        }
        // Ring slot holds two; the first equipped ring was displaced.
        assert_eq!(ledger.equipped_items().count(), 2);
        assert_eq!(ledger.unequipped_items().len(), 1);
        assert_eq!(ledger.unequipped_items()[0].instance_id, ids[0]);
    }

    #[test]
    fn test_failed_equip_leaves_state_unchanged() {
        let catalog = catalog();
        let (mut ledger, _) = ledger_with_sword();
        let before = ledger.snapshot();

        let outcome = ledger.equip(&catalog, "no-such-id");
        assert!(!outcome.success);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_upgrade_consumes_materials() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_material("iron", 20);

        let outcome = ledger.upgrade(&catalog, &id);
        assert!(outcome.success);
        assert_eq!(ledger.material_count("iron"), 15);
        assert_eq!(ledger.find_item(&id).unwrap().upgrade_level, 1);
    }

    #[test]
    fn test_upgrade_without_materials_fails_clean() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_material("iron", 2);
        let before = ledger.snapshot();

        let outcome = ledger.upgrade(&catalog, &id);
        assert!(!outcome.success);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_upgrade_respects_max_level() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_material("iron", 1_000);

        for _ in 0..3 {
            assert!(ledger.upgrade(&catalog, &id).success);
        }
        let outcome = ledger.upgrade(&catalog, &id);
        assert!(!outcome.success);
        assert_eq!(
            outcome.messages[0],
            "Item is already at maximum upgrade level."
        );
    }

    #[test]
    fn test_salvage_requires_unequipped() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.equip(&catalog, &id);
        let before = ledger.snapshot();

        let outcome = ledger.salvage(&catalog, &id);
        assert!(!outcome.success);
        assert_eq!(
            outcome.messages[0],
            "Item must be unequipped before salvaging."
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_salvage_yields_materials() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_material("iron", 10);
        ledger.upgrade(&catalog, &id);

        let outcome = ledger.salvage(&catalog, &id);
        assert!(outcome.success);
        assert!(ledger.find_item(&id).is_none());
        // Base yield 2 at common rarity, plus the invested upgrade level.
        assert_eq!(ledger.material_count("iron"), 5 + 3);
    }

    #[test]
    fn test_socket_consumes_augment() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_consumable("gem", 1);

        let outcome = ledger.socket(&catalog, &id, "gem");
        assert!(outcome.success);
        assert_eq!(ledger.consumable_count("gem"), 0);
        assert_eq!(ledger.find_item(&id).unwrap().socketed, vec!["gem".to_string()]);

        // Capacity is one; a second socket fails clean.
        ledger.add_consumable("gem", 1);
        let before = ledger.snapshot();
        let outcome = ledger.socket(&catalog, &id, "gem");
        assert!(!outcome.success);
        assert_eq!(outcome.messages[0], "No open sockets.");
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_craft_equipment() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        ledger.add_gold(100);
        ledger.add_material("iron", 10);
        let recipe = Recipe {
            id: "forge_sword".to_string(),
            name: "Forge Sword".to_string(),
            output_item_id: "sword".to_string(),
            output_quantity: 1,
            cost: CraftCost {
                gold: 25,
                materials: vec![("iron".to_string(), 4)],
            },
        };

        let outcome = ledger.craft(&catalog, &recipe);
        assert!(outcome.success);
        assert!(outcome.flags.inventory_changed);
        assert_eq!(ledger.gold(), 75);
        assert_eq!(ledger.material_count("iron"), 6);
        assert_eq!(ledger.unequipped_items().len(), 1);
    }

    #[test]
    fn test_craft_fails_without_gold() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        ledger.add_material("iron", 10);
        let recipe = Recipe {
            id: "forge_sword".to_string(),
            name: "Forge Sword".to_string(),
            output_item_id: "sword".to_string(),
            output_quantity: 1,
            cost: CraftCost {
                gold: 25,
                materials: vec![("iron".to_string(), 4)],
            },
        };
        let before = ledger.snapshot();

        let outcome = ledger.craft(&catalog, &recipe);
        assert!(!outcome.success);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_craft_material_output() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        let recipe = Recipe {
            id: "smelt".to_string(),
            name: "Smelt".to_string(),
            output_item_id: "iron".to_string(),
            output_quantity: 3,
            cost: CraftCost::default(),
        };

        let outcome = ledger.craft(&catalog, &recipe);
        assert!(outcome.success);
        assert!(outcome.flags.materials_changed);
        assert_eq!(ledger.material_count("iron"), 3);
    }

    #[test]
    fn test_use_consumable_heals_hero() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        ledger.add_consumable("potion", 2);
        let mut hero = hero();
        hero.apply_damage(hero.max_health() * 0.8);
        let hurt = hero.health();

        let outcome = ledger.use_consumable(&catalog, "potion", &mut hero);
        assert!(outcome.success);
        assert!(outcome.flags.hero_needs_refresh);
        assert!(outcome.flags.consumables_changed);
        assert!(hero.health() > hurt);
        assert_eq!(ledger.consumable_count("potion"), 1);
    }

    #[test]
    fn test_use_consumable_empty_fails_clean() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        let mut hero = hero();
        let before = ledger.snapshot();

        let outcome = ledger.use_consumable(&catalog, "potion", &mut hero);
        assert!(!outcome.success);
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn test_collect_rewards_routes_by_kind() {
        let catalog = catalog();
        let mut ledger = InventoryLedger::new();
        let rewards = RewardBundle {
            experience: 10,
            gold: 30,
            items: vec![
                ItemDrop {
                    item_id: "sword".to_string(),
                    quantity: 1,
                },
                ItemDrop {
                    item_id: "iron".to_string(),
                    quantity: 5,
                },
                ItemDrop {
                    item_id: "potion".to_string(),
                    quantity: 2,
                },
                ItemDrop {
                    item_id: "unknown".to_string(),
                    quantity: 9,
                },
            ],
        };

        let flags = ledger.collect_rewards(&rewards, &catalog);
        assert!(flags.inventory_changed);
        assert!(flags.materials_changed);
        assert!(flags.consumables_changed);
        assert_eq!(ledger.gold(), 30);
        assert_eq!(ledger.unequipped_items().len(), 1);
        assert_eq!(ledger.material_count("iron"), 5);
        assert_eq!(ledger.consumable_count("potion"), 2);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let catalog = catalog();
        let (mut ledger, id) = ledger_with_sword();
        ledger.add_gold(42);
        ledger.add_material("iron", 7);
        ledger.equip(&catalog, &id);

        let snapshot = ledger.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: InventorySnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = InventoryLedger::new();
        restored.restore(&decoded);
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.gold(), 42);
        assert_eq!(restored.equipped_items().count(), 1);
    }
}
