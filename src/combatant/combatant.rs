//! The combatant stat model.
//!
//! A `Combatant` owns its base attributes, derived-stat formula block,
//! leveling and evolution profiles, equipment and buff bonus accumulators,
//! and current vitals. Derived stats are always computed from current
//! primaries; nothing downstream of an attribute is cached.

use super::attributes::{AttributeType, Attributes};
use super::derived::{DerivedStatFormulas, DerivedStats};
use super::leveling::{EvolutionProfile, LevelingProfile};
use crate::constants::{MIN_ATTACK_DELAY_SECONDS, MIN_STAT_MULTIPLIER, SNAPSHOT_VERSION};
use crate::encounter::ability::AbilityDefinition;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Equipment slots. Rings allow two simultaneous items; every other slot
/// holds one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EquipmentSlot {
    MainHand,
    OffHand,
    Head,
    Chest,
    Hands,
    Feet,
    Amulet,
    Ring,
}

impl EquipmentSlot {
    pub fn all() -> [EquipmentSlot; 8] {
        [
            EquipmentSlot::MainHand,
            EquipmentSlot::OffHand,
            EquipmentSlot::Head,
            EquipmentSlot::Chest,
            EquipmentSlot::Hands,
            EquipmentSlot::Feet,
            EquipmentSlot::Amulet,
            EquipmentSlot::Ring,
        ]
    }

    pub fn capacity(&self) -> usize {
        match self {
            EquipmentSlot::Ring => 2,
            _ => 1,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::MainHand => "Main Hand",
            EquipmentSlot::OffHand => "Off Hand",
            EquipmentSlot::Head => "Head",
            EquipmentSlot::Chest => "Chest",
            EquipmentSlot::Hands => "Hands",
            EquipmentSlot::Feet => "Feet",
            EquipmentSlot::Amulet => "Amulet",
            EquipmentSlot::Ring => "Ring",
        }
    }
}

/// Which of a combatant's two attack schedules a swing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Main,
    Off,
}

/// Base damage range and swing delay for one hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HandProfile {
    pub min_damage: f64,
    pub max_damage: f64,
    pub delay_seconds: f64,
}

/// One equipped item's contribution, in equip order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquippedBonus {
    pub instance_id: String,
    pub bonuses: Attributes,
}

/// Snapshot of persistent per-character progress. Round-trips level, XP,
/// base stats, the formula block (which carries per-level vital growth and
/// evolution rescaling), evolution tier and vitals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterProgressSnapshot {
    pub version: u32,
    pub id: String,
    pub level: u32,
    pub experience: u64,
    pub base: Attributes,
    pub formulas: DerivedStatFormulas,
    pub evolution_tier: u32,
    pub health: f64,
    pub mana: f64,
    pub saved_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    level: u32,
    experience: u64,
    base: Attributes,
    formulas: DerivedStatFormulas,
    leveling: LevelingProfile,
    evolution: EvolutionProfile,
    evolution_tier: u32,
    equipment: BTreeMap<EquipmentSlot, VecDeque<EquippedBonus>>,
    equipment_bonus: Attributes,
    buff_bonus: Attributes,
    health: f64,
    mana: f64,
    pub main_hand: Option<HandProfile>,
    pub off_hand: Option<HandProfile>,
    pub abilities: Vec<AbilityDefinition>,
}

impl Combatant {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: String,
        name: String,
        base: Attributes,
        formulas: DerivedStatFormulas,
        leveling: LevelingProfile,
        evolution: EvolutionProfile,
        main_hand: Option<HandProfile>,
        off_hand: Option<HandProfile>,
        abilities: Vec<AbilityDefinition>,
    ) -> Self {
        let health = formulas.max_health(&base);
        let mana = formulas.max_mana(&base);
        Self {
            id,
            name,
            level: 1,
            experience: 0,
            base,
            formulas,
            leveling,
            evolution,
            evolution_tier: 0,
            equipment: BTreeMap::new(),
            equipment_bonus: Attributes::zero(),
            buff_bonus: Attributes::zero(),
            health,
            mana,
            main_hand,
            off_hand,
            abilities,
        }
    }

    // ── Current stats ────────────────────────────────────────────────────

    /// Base + equipment + buff, the input to every derived stat.
    pub fn current_attributes(&self) -> Attributes {
        Attributes::sum(&[&self.base, &self.equipment_bonus, &self.buff_bonus])
    }

    pub fn attribute(&self, attr: AttributeType) -> f64 {
        self.current_attributes().get(attr)
    }

    pub fn base_attributes(&self) -> &Attributes {
        &self.base
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn experience(&self) -> u64 {
        self.experience
    }

    pub fn evolution_tier(&self) -> u32 {
        self.evolution_tier
    }

    pub fn evolution_profile(&self) -> &EvolutionProfile {
        &self.evolution
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn mana(&self) -> f64 {
        self.mana
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn max_health(&self) -> f64 {
        self.formulas.max_health(&self.current_attributes())
    }

    pub fn max_mana(&self) -> f64 {
        self.formulas.max_mana(&self.current_attributes())
    }

    pub fn attack_power(&self) -> f64 {
        self.formulas.attack_power(&self.current_attributes())
    }

    pub fn armor(&self) -> f64 {
        self.formulas.armor(&self.current_attributes())
    }

    pub fn armor_penetration(&self) -> f64 {
        self.formulas.armor_penetration(&self.current_attributes())
    }

    pub fn accuracy(&self) -> f64 {
        self.formulas.accuracy(&self.current_attributes())
    }

    pub fn evasion(&self) -> f64 {
        self.formulas.evasion(&self.current_attributes())
    }

    pub fn dodge_chance(&self) -> f64 {
        self.formulas.dodge_chance(&self.current_attributes())
    }

    pub fn parry_chance(&self) -> f64 {
        self.formulas.parry_chance(&self.current_attributes())
    }

    pub fn crit_chance(&self) -> f64 {
        self.formulas.crit_chance(&self.current_attributes())
    }

    pub fn derived_stats(&self) -> DerivedStats {
        DerivedStats::calculate(&self.formulas, &self.current_attributes())
    }

    pub fn hand(&self, hand: Hand) -> Option<&HandProfile> {
        match hand {
            Hand::Main => self.main_hand.as_ref(),
            Hand::Off => self.off_hand.as_ref(),
        }
    }

    pub fn has_main_hand_weapon(&self) -> bool {
        self.main_hand.is_some()
    }

    /// Effective swing delay for a hand: the hand's base delay reduced by
    /// speed, floored at the global minimum.
    pub fn attack_delay(&self, hand: Hand) -> f64 {
        let base = self
            .hand(hand)
            .map(|h| h.delay_seconds)
            .unwrap_or(self.formulas.base_attack_delay);
        let speed_cut =
            self.formulas.delay_per_speed * self.attribute(AttributeType::Speed).max(0.0);
        (base - speed_cut).max(MIN_ATTACK_DELAY_SECONDS)
    }

    /// Damage range for a hand: hand base range plus attack power.
    pub fn damage_range(&self, hand: Hand) -> (f64, f64) {
        let power = self.attack_power();
        match self.hand(hand) {
            Some(h) => {
                let min = (h.min_damage + power).max(0.0);
                let max = (h.max_damage + power).max(min);
                (min, max)
            }
            None => (power.max(0.0), power.max(0.0)),
        }
    }

    // ── Vitals ───────────────────────────────────────────────────────────

    /// Applies damage, clamping health at zero. Negative amounts are ignored.
    pub fn apply_damage(&mut self, amount: f64) {
        self.health = (self.health - amount.max(0.0)).max(0.0);
    }

    /// Heals a living combatant, clamping at max health. Returns the amount
    /// actually restored.
    pub fn heal(&mut self, amount: f64) -> f64 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount.max(0.0)).min(self.max_health());
        self.health - before
    }

    pub fn heal_percent(&mut self, percent: f64) -> f64 {
        self.heal(self.max_health() * percent.max(0.0))
    }

    /// Restores mana by a fraction of the maximum, clamped. Returns the
    /// amount actually restored.
    pub fn restore_mana_percent(&mut self, percent: f64) -> f64 {
        if !self.is_alive() {
            return 0.0;
        }
        let before = self.mana;
        self.mana = (self.mana + self.max_mana() * percent.max(0.0)).min(self.max_mana());
        self.mana - before
    }

    pub fn restore_vitals(&mut self) {
        self.health = self.max_health();
        self.mana = self.max_mana();
    }

    // ── Leveling ─────────────────────────────────────────────────────────

    pub fn xp_to_next_level(&self) -> u64 {
        self.leveling.xp_to_next(self.level)
    }

    /// Grants experience, consuming level thresholds while they are met and
    /// applying per-level growth each time. Any split of the same total XP
    /// across calls lands on the same final state. Returns levels gained;
    /// vitals are fully restored when at least one level was gained.
    pub fn add_experience(&mut self, amount: u64) -> u32 {
        self.experience = self.experience.saturating_add(amount);
        let mut gained = 0u32;
        while self.experience >= self.leveling.xp_to_next(self.level) {
            self.experience -= self.leveling.xp_to_next(self.level);
            self.level += 1;
            gained += 1;
            self.base.add(&self.leveling.growth_per_level.clone());
            self.formulas.base_health += self.leveling.health_per_level;
            self.formulas.base_mana += self.leveling.mana_per_level;
        }
        if gained > 0 {
            self.restore_vitals();
        }
        gained
    }

    // ── Equipment ────────────────────────────────────────────────────────

    /// Equips an item's stat deltas into a slot. When the slot is over
    /// capacity the least-recently-equipped entry is evicted (FIFO) and its
    /// instance id returned.
    pub fn equip_item(
        &mut self,
        slot: EquipmentSlot,
        instance_id: String,
        bonuses: Attributes,
    ) -> Option<String> {
        let entries = self.equipment.entry(slot).or_default();
        entries.push_back(EquippedBonus {
            instance_id,
            bonuses,
        });
        let evicted = if entries.len() > slot.capacity() {
            entries.pop_front().map(|e| e.instance_id)
        } else {
            None
        };
        self.rebuild_equipment_bonus();
        self.clamp_vitals();
        evicted
    }

    pub fn clear_equipment(&mut self) {
        self.equipment.clear();
        self.rebuild_equipment_bonus();
        self.clamp_vitals();
    }

    pub fn equipped_ids(&self) -> Vec<String> {
        self.equipment
            .values()
            .flat_map(|entries| entries.iter().map(|e| e.instance_id.clone()))
            .collect()
    }

    fn rebuild_equipment_bonus(&mut self) {
        let mut total = Attributes::zero();
        for entries in self.equipment.values() {
            for entry in entries {
                total.add(&entry.bonuses);
            }
        }
        self.equipment_bonus = total;
    }

    // ── Evolution and buffs ──────────────────────────────────────────────

    /// Sets the evolution tier, clamped to the profile's range. Base stats
    /// and the vital/attack coefficients are rescaled by the ratio of the
    /// new cumulative multiplier to the old one, so setting the same tier
    /// twice changes nothing. Returns ability ids newly unlocked.
    pub fn set_evolution_tier(&mut self, tier: u32) -> Vec<String> {
        let target = tier.min(self.evolution.max_tier());
        let old_mult = self.evolution.cumulative_multiplier(self.evolution_tier);
        let new_mult = self.evolution.cumulative_multiplier(target);

        let mut unlocked = Vec::new();
        if target > self.evolution_tier {
            for t in (self.evolution_tier + 1)..=target {
                if let Some(step) = self.evolution.tier(t) {
                    unlocked.extend(step.unlocks.iter().cloned());
                }
            }
        }

        if (new_mult - old_mult).abs() > f64::EPSILON {
            let ratio = new_mult / old_mult;
            self.base.scale(ratio);
            self.formulas.scale_by_ratio(ratio);
        }
        self.evolution_tier = target;
        self.clamp_vitals();
        unlocked
    }

    /// Folds the difference between `multiplier` and 1.0 of the current
    /// stats into the buff accumulator. Repeated calls compose
    /// multiplicatively without the caller tracking prior state.
    pub fn apply_global_stat_bonus(&mut self, multiplier: f64) {
        let m = multiplier.max(MIN_STAT_MULTIPLIER);
        let mut delta = self.current_attributes();
        delta.scale(m - 1.0);
        self.buff_bonus.add(&delta);
        self.clamp_vitals();
    }

    /// Like [`apply_global_stat_bonus`] but affecting only attack output
    /// (strength).
    ///
    /// [`apply_global_stat_bonus`]: Combatant::apply_global_stat_bonus
    pub fn apply_attack_multiplier(&mut self, multiplier: f64) {
        let m = multiplier.max(MIN_STAT_MULTIPLIER);
        let bonus = self.attribute(AttributeType::Strength) * (m - 1.0);
        let current = self.buff_bonus.get(AttributeType::Strength);
        self.buff_bonus.set(AttributeType::Strength, current + bonus);
    }

    fn clamp_vitals(&mut self) {
        self.health = self.health.min(self.max_health()).max(0.0);
        self.mana = self.mana.min(self.max_mana()).max(0.0);
    }

    // ── Persistence ──────────────────────────────────────────────────────

    pub fn serialize_progress(&self) -> CharacterProgressSnapshot {
        CharacterProgressSnapshot {
            version: SNAPSHOT_VERSION,
            id: self.id.clone(),
            level: self.level,
            experience: self.experience,
            base: self.base,
            formulas: self.formulas,
            evolution_tier: self.evolution_tier,
            health: self.health,
            mana: self.mana,
            saved_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Restores persistent progress. The snapshot's base stats and formula
    /// block already carry per-level growth and evolution scaling, so both
    /// are adopted as-is and the tier recorded without rescaling. Equipment
    /// and buff accumulators are reset; the owner re-applies both afterwards.
    /// Vitals are clamped to the recomputed maxima and experience to strictly
    /// below the next threshold.
    pub fn restore_progress(&mut self, snapshot: &CharacterProgressSnapshot) {
        self.level = snapshot.level.max(1);
        self.base = snapshot.base;
        self.formulas = snapshot.formulas;
        self.evolution_tier = snapshot.evolution_tier.min(self.evolution.max_tier());
        self.equipment.clear();
        self.equipment_bonus = Attributes::zero();
        self.buff_bonus = Attributes::zero();
        let cap = self.leveling.xp_to_next(self.level).saturating_sub(1);
        self.experience = snapshot.experience.min(cap);
        self.health = snapshot.health.clamp(0.0, self.max_health());
        self.mana = snapshot.mana.clamp(0.0, self.max_mana());
    }
}
