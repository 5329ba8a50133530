//! Data-ingestion boundary.
//!
//! Everything the engine consumes is handed over up front as plain data:
//! hero and enemy definitions, tuning curves, loot tables, the item catalog
//! and crafting recipes. The core performs no I/O; a host that loads data
//! asynchronously adapts outside this boundary and hands over the finished
//! bundle through [`DataSource`].

use crate::combatant::{
    Attributes, DerivedStatFormulas, EquipmentSlot, EvolutionProfile, HandProfile,
    LevelingProfile,
};
use crate::constants::SALVAGE_UPGRADE_BONUS_PER_LEVEL;
use crate::encounter::ability::AbilityDefinition;
use crate::stage::scaling::EnemyScalingConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no hero definitions provided")]
    NoHeroes,
    #[error("unknown hero definition: {0}")]
    UnknownHero(String),
    #[error("enemy pool for tier {0:?} is empty")]
    EmptyEnemyPool(EnemyTier),
    #[error("recipe {recipe} outputs unknown item: {item}")]
    UnknownRecipeOutput { recipe: String, item: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyTier {
    Small,
    Medium,
    Boss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDefinition {
    pub id: String,
    pub name: String,
    pub base: Attributes,
    pub formulas: DerivedStatFormulas,
    pub leveling: LevelingProfile,
    pub evolution: EvolutionProfile,
    pub main_hand: Option<HandProfile>,
    pub off_hand: Option<HandProfile>,
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

/// Enemy template. Stage generation overrides vitality, strength and defense
/// from the scaling curves; the remaining primaries come from `base`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyDefinition {
    pub id: String,
    pub name: String,
    pub base: Attributes,
    pub formulas: DerivedStatFormulas,
    #[serde(default)]
    pub abilities: Vec<AbilityDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnemyPools {
    pub small: Vec<EnemyDefinition>,
    pub medium: Vec<EnemyDefinition>,
    pub boss: Vec<EnemyDefinition>,
}

impl EnemyPools {
    pub fn pool(&self, tier: EnemyTier) -> &[EnemyDefinition] {
        match tier {
            EnemyTier::Small => &self.small,
            EnemyTier::Medium => &self.medium,
            EnemyTier::Boss => &self.boss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn salvage_multiplier(&self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 2.0,
            Rarity::Rare => 4.0,
            Rarity::Epic => 8.0,
            Rarity::Legendary => 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    RestoreHealthPercent(f64),
    RestoreManaPercent(f64),
    GrantExperience(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Equipment {
        slot: EquipmentSlot,
        bonuses: Attributes,
        socket_capacity: u32,
        max_upgrade_level: u32,
    },
    Consumable {
        effect: ConsumableEffect,
    },
    Material,
    /// Socketable gem consumed by the socket operation.
    Augment {
        bonuses: Attributes,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    pub kind: ItemKind,
    /// Material consumed by upgrades and returned by salvage.
    pub material_id: String,
    pub upgrade_cost_base: u32,
    pub salvage_base_yield: u32,
}

impl ItemDefinition {
    pub fn is_equipment(&self) -> bool {
        matches!(self.kind, ItemKind::Equipment { .. })
    }

    pub fn slot(&self) -> Option<EquipmentSlot> {
        match self.kind {
            ItemKind::Equipment { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn max_upgrade_level(&self) -> u32 {
        match self.kind {
            ItemKind::Equipment {
                max_upgrade_level, ..
            } => max_upgrade_level,
            _ => 0,
        }
    }

    /// Material cost to go from `level` to `level + 1`.
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        self.upgrade_cost_base.saturating_mul(level + 1)
    }

    /// Materials returned when salvaged at `upgrade_level`.
    pub fn salvage_yield(&self, upgrade_level: u32) -> u32 {
        let base = self.salvage_base_yield as f64 * self.rarity.salvage_multiplier();
        (base + upgrade_level as f64 * SALVAGE_UPGRADE_BONUS_PER_LEVEL).floor() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ItemCatalog {
    items: BTreeMap<String, ItemDefinition>,
}

impl ItemCatalog {
    pub fn new(definitions: Vec<ItemDefinition>) -> Self {
        Self {
            items: definitions
                .into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        }
    }

    pub fn definition(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CraftCost {
    pub gold: u64,
    pub materials: Vec<(String, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub output_item_id: String,
    pub output_quantity: u32,
    pub cost: CraftCost,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LootEntry {
    pub item_id: String,
    /// Independent drop chance in [0, 1].
    pub chance: f64,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LootTable {
    pub id: String,
    pub entries: Vec<LootEntry>,
}

/// Stage-structure tuning consumed by the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageGenConfig {
    pub waves_per_stage: u32,
    pub base_enemy_count: u32,
    /// Extra enemies per five stages cleared.
    pub count_per_five_stages: u32,
    /// Stage number -> loot table id. Stages without an entry use the
    /// default table.
    #[serde(default)]
    pub loot_table_overrides: BTreeMap<u32, String>,
}

impl Default for StageGenConfig {
    fn default() -> Self {
        Self {
            waves_per_stage: 5,
            base_enemy_count: 3,
            count_per_five_stages: 1,
            loot_table_overrides: BTreeMap::new(),
        }
    }
}

/// The full data bundle the engine runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub heroes: Vec<HeroDefinition>,
    pub enemy_pools: EnemyPools,
    pub scaling: EnemyScalingConfig,
    pub stage_config: StageGenConfig,
    pub loot_tables: Vec<LootTable>,
    pub catalog: ItemCatalog,
    pub recipes: Vec<Recipe>,
}

impl GameData {
    /// Structural checks run once at init. Loot-table gaps are deliberately
    /// not errors here; they degrade at roll time.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.heroes.is_empty() {
            return Err(DataError::NoHeroes);
        }
        for tier in [EnemyTier::Small, EnemyTier::Medium, EnemyTier::Boss] {
            if self.enemy_pools.pool(tier).is_empty() {
                return Err(DataError::EmptyEnemyPool(tier));
            }
        }
        for recipe in &self.recipes {
            if !self.catalog.contains(&recipe.output_item_id) {
                return Err(DataError::UnknownRecipeOutput {
                    recipe: recipe.id.clone(),
                    item: recipe.output_item_id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn hero(&self, id: &str) -> Result<&HeroDefinition, DataError> {
        self.heroes
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| DataError::UnknownHero(id.to_string()))
    }

    pub fn loot_table(&self, id: &str) -> Option<&LootTable> {
        self.loot_tables.iter().find(|t| t.id == id)
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }
}

/// Supplies the data bundle once at initialization.
pub trait DataSource {
    fn load(&self) -> Result<GameData, DataError>;
}

/// In-memory bundle, validated on load.
pub struct StaticDataSource {
    data: GameData,
}

impl StaticDataSource {
    pub fn new(data: GameData) -> Self {
        Self { data }
    }
}

impl DataSource for StaticDataSource {
    fn load(&self) -> Result<GameData, DataError> {
        self.data.validate()?;
        Ok(self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(id: &str) -> EnemyDefinition {
        EnemyDefinition {
            id: id.to_string(),
            name: id.to_string(),
            base: Attributes::uniform(5.0),
            formulas: DerivedStatFormulas::default(),
            abilities: vec![],
        }
    }

    fn bundle() -> GameData {
        GameData {
            heroes: vec![HeroDefinition {
                id: "hero".to_string(),
                name: "Hero".to_string(),
                base: Attributes::uniform(10.0),
                formulas: DerivedStatFormulas::default(),
                leveling: LevelingProfile::default(),
                evolution: EvolutionProfile::default(),
                main_hand: None,
                off_hand: None,
                abilities: vec![],
            }],
            enemy_pools: EnemyPools {
                small: vec![enemy("rat")],
                medium: vec![enemy("ogre")],
                boss: vec![enemy("dragon")],
            },
            scaling: EnemyScalingConfig::default(),
            stage_config: StageGenConfig::default(),
            loot_tables: vec![],
            catalog: ItemCatalog::default(),
            recipes: vec![],
        }
    }

    #[test]
    fn test_validate_accepts_complete_bundle() {
        assert!(bundle().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_pool() {
        let mut data = bundle();
        data.enemy_pools.boss.clear();
        assert!(matches!(
            data.validate(),
            Err(DataError::EmptyEnemyPool(EnemyTier::Boss))
        ));
    }

    #[test]
    fn test_validate_rejects_missing_heroes() {
        let mut data = bundle();
        data.heroes.clear();
        assert!(matches!(data.validate(), Err(DataError::NoHeroes)));
    }

    #[test]
    fn test_validate_rejects_dangling_recipe() {
        let mut data = bundle();
        data.recipes.push(Recipe {
            id: "bad".to_string(),
            name: "Bad".to_string(),
            output_item_id: "missing".to_string(),
            output_quantity: 1,
            cost: CraftCost::default(),
        });
        assert!(matches!(
            data.validate(),
            Err(DataError::UnknownRecipeOutput { .. })
        ));
    }

    #[test]
    fn test_hero_lookup() {
        let data = bundle();
        assert!(data.hero("hero").is_ok());
        assert!(matches!(data.hero("nobody"), Err(DataError::UnknownHero(_))));
    }

    #[test]
    fn test_upgrade_cost_grows_with_level() {
        let def = ItemDefinition {
            id: "sword".to_string(),
            name: "Sword".to_string(),
            rarity: Rarity::Rare,
            kind: ItemKind::Equipment {
                slot: EquipmentSlot::MainHand,
                bonuses: Attributes::zero(),
                socket_capacity: 1,
                max_upgrade_level: 5,
            },
            material_id: "iron".to_string(),
            upgrade_cost_base: 10,
            salvage_base_yield: 2,
        };
        assert_eq!(def.upgrade_cost(0), 10);
        assert_eq!(def.upgrade_cost(4), 50);
    }

    #[test]
    fn test_salvage_yield_scales_with_rarity_and_upgrades() {
        let def = ItemDefinition {
            id: "sword".to_string(),
            name: "Sword".to_string(),
            rarity: Rarity::Rare,
            kind: ItemKind::Equipment {
                slot: EquipmentSlot::MainHand,
                bonuses: Attributes::zero(),
                socket_capacity: 0,
                max_upgrade_level: 5,
            },
            material_id: "iron".to_string(),
            upgrade_cost_base: 10,
            salvage_base_yield: 2,
        };
        assert_eq!(def.salvage_yield(0), 8);
        assert!(def.salvage_yield(3) > def.salvage_yield(0));
    }

    #[test]
    fn test_static_source_validates_on_load() {
        let mut data = bundle();
        data.enemy_pools.small.clear();
        let source = StaticDataSource::new(data);
        assert!(source.load().is_err());

        let good = StaticDataSource::new(bundle());
        assert!(good.load().is_ok());
    }
}
