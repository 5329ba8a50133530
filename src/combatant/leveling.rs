//! Leveling curve, per-level growth and evolution tiers.

use super::attributes::Attributes;
use crate::constants::{XP_CURVE_BASE, XP_CURVE_EXPONENT};
use serde::{Deserialize, Serialize};

/// XP curve and per-level stat growth for a combatant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelingProfile {
    /// XP needed from level N to N+1 is `xp_base * N^xp_exponent`.
    pub xp_base: f64,
    pub xp_exponent: f64,
    /// Attribute points gained each level.
    pub growth_per_level: Attributes,
    /// Flat max-HP gained each level, on top of vitality growth.
    pub health_per_level: f64,
    /// Flat max-mana gained each level.
    pub mana_per_level: f64,
}

impl Default for LevelingProfile {
    fn default() -> Self {
        Self {
            xp_base: XP_CURVE_BASE,
            xp_exponent: XP_CURVE_EXPONENT,
            growth_per_level: Attributes::uniform(1.0),
            health_per_level: 5.0,
            mana_per_level: 2.0,
        }
    }
}

impl LevelingProfile {
    /// XP required to advance from `level` to `level + 1`.
    pub fn xp_to_next(&self, level: u32) -> u64 {
        (self.xp_base * (level.max(1) as f64).powf(self.xp_exponent)).ceil() as u64
    }
}

/// One evolution step: a permanent multiplicative upgrade gated by level.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvolutionTier {
    pub name: String,
    pub required_level: u32,
    /// Multiplier applied on top of all earlier tiers.
    pub stat_multiplier: f64,
    /// Ability ids granted when this tier is reached.
    pub unlocks: Vec<String>,
}

/// Ordered evolution tiers. Tier 0 is the unevolved form (multiplier 1.0);
/// tier N applies the product of the first N entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EvolutionProfile {
    pub tiers: Vec<EvolutionTier>,
}

impl EvolutionProfile {
    pub fn max_tier(&self) -> u32 {
        self.tiers.len() as u32
    }

    /// Cumulative multiplier for `tier` (product of entries 1..=tier).
    /// Multipliers at or below zero are clamped so a bad definition cannot
    /// zero out a combatant.
    pub fn cumulative_multiplier(&self, tier: u32) -> f64 {
        self.tiers
            .iter()
            .take(tier.min(self.max_tier()) as usize)
            .map(|t| t.stat_multiplier.max(crate::constants::MIN_STAT_MULTIPLIER))
            .product()
    }

    pub fn tier(&self, tier: u32) -> Option<&EvolutionTier> {
        if tier == 0 {
            return None;
        }
        self.tiers.get(tier as usize - 1)
    }
}
