//! Derived-stat formula block.
//!
//! Coefficients convert primary attributes into combat-facing numbers. The
//! block lives on each combatant so evolution scaling can rescale vitals and
//! damage without touching the shared definitions.

use super::attributes::{AttributeType, Attributes};
use serde::{Deserialize, Serialize};

/// Coefficients converting primary attributes into derived stats.
///
/// Percentages produced through this block are fractions (0.004 = 0.4% per
/// point) and are clamped to [0, 1] at point of use, not here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DerivedStatFormulas {
    pub base_health: f64,
    pub hp_per_vitality: f64,
    pub base_mana: f64,
    pub mana_per_energy: f64,
    pub attack_per_strength: f64,
    pub armor_per_defense: f64,
    pub armor_pen_per_strength: f64,
    pub accuracy_per_dexterity: f64,
    pub evasion_per_agility: f64,
    pub dodge_per_agility: f64,
    pub parry_per_dexterity: f64,
    pub base_crit: f64,
    pub crit_per_luck: f64,
    pub base_attack_delay: f64,
    pub delay_per_speed: f64,
}

impl Default for DerivedStatFormulas {
    fn default() -> Self {
        Self {
            base_health: 50.0,
            hp_per_vitality: 10.0,
            base_mana: 20.0,
            mana_per_energy: 5.0,
            attack_per_strength: 2.0,
            armor_per_defense: 1.5,
            armor_pen_per_strength: 0.5,
            accuracy_per_dexterity: 1.0,
            evasion_per_agility: 0.4,
            dodge_per_agility: 0.002,
            parry_per_dexterity: 0.002,
            base_crit: 0.05,
            crit_per_luck: 0.003,
            base_attack_delay: 2.0,
            delay_per_speed: 0.01,
        }
    }
}

impl DerivedStatFormulas {
    pub fn max_health(&self, attrs: &Attributes) -> f64 {
        (self.base_health + self.hp_per_vitality * attrs.get(AttributeType::Vitality)).max(1.0)
    }

    pub fn max_mana(&self, attrs: &Attributes) -> f64 {
        (self.base_mana + self.mana_per_energy * attrs.get(AttributeType::Energy)).max(0.0)
    }

    pub fn attack_power(&self, attrs: &Attributes) -> f64 {
        (self.attack_per_strength * attrs.get(AttributeType::Strength)).max(0.0)
    }

    pub fn armor(&self, attrs: &Attributes) -> f64 {
        (self.armor_per_defense * attrs.get(AttributeType::Defense)).max(0.0)
    }

    pub fn armor_penetration(&self, attrs: &Attributes) -> f64 {
        (self.armor_pen_per_strength * attrs.get(AttributeType::Strength)).max(0.0)
    }

    pub fn accuracy(&self, attrs: &Attributes) -> f64 {
        (self.accuracy_per_dexterity * attrs.get(AttributeType::Dexterity)).max(0.0)
    }

    pub fn evasion(&self, attrs: &Attributes) -> f64 {
        (self.evasion_per_agility * attrs.get(AttributeType::Agility)).max(0.0)
    }

    pub fn dodge_chance(&self, attrs: &Attributes) -> f64 {
        (self.dodge_per_agility * attrs.get(AttributeType::Agility)).clamp(0.0, 1.0)
    }

    pub fn parry_chance(&self, attrs: &Attributes) -> f64 {
        (self.parry_per_dexterity * attrs.get(AttributeType::Dexterity)).clamp(0.0, 1.0)
    }

    pub fn crit_chance(&self, attrs: &Attributes) -> f64 {
        (self.base_crit + self.crit_per_luck * attrs.get(AttributeType::Luck)).clamp(0.0, 1.0)
    }

    /// Attack delay in seconds, floored by the caller's minimum-delay rule.
    pub fn attack_delay(&self, attrs: &Attributes) -> f64 {
        self.base_attack_delay - self.delay_per_speed * attrs.get(AttributeType::Speed)
    }

    /// Scales the vital and damage coefficients by `ratio`. Used by evolution
    /// tier changes, which always pass the ratio of new-to-old multiplier so
    /// repeated calls never compound.
    pub fn scale_by_ratio(&mut self, ratio: f64) {
        self.base_health *= ratio;
        self.hp_per_vitality *= ratio;
        self.base_mana *= ratio;
        self.mana_per_energy *= ratio;
        self.attack_per_strength *= ratio;
        self.armor_per_defense *= ratio;
    }
}

/// Flat view of the derived block for snapshots and host display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DerivedStats {
    pub max_health: f64,
    pub max_mana: f64,
    pub attack_power: f64,
    pub armor: f64,
    pub armor_penetration: f64,
    pub accuracy: f64,
    pub evasion: f64,
    pub dodge_chance: f64,
    pub parry_chance: f64,
    pub crit_chance: f64,
    pub attack_delay: f64,
}

impl DerivedStats {
    pub fn calculate(formulas: &DerivedStatFormulas, attrs: &Attributes) -> Self {
        Self {
            max_health: formulas.max_health(attrs),
            max_mana: formulas.max_mana(attrs),
            attack_power: formulas.attack_power(attrs),
            armor: formulas.armor(attrs),
            armor_penetration: formulas.armor_penetration(attrs),
            accuracy: formulas.accuracy(attrs),
            evasion: formulas.evasion(attrs),
            dodge_chance: formulas.dodge_chance(attrs),
            parry_chance: formulas.parry_chance(attrs),
            crit_chance: formulas.crit_chance(attrs),
            attack_delay: formulas.attack_delay(attrs),
        }
    }
}
