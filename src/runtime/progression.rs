//! Long-term progression: first-clear tracking and the permanent stat
//! multiplier.
//!
//! The multiplier is always applied to the hero by the ratio of the target
//! to whatever was last applied, so restores and repeated clears can never
//! stack the same bonus twice.

use crate::combatant::Combatant;
use crate::constants::{FIRST_CLEAR_STAT_BONUS, SNAPSHOT_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSnapshot {
    pub version: u32,
    pub highest_stage_cleared: u32,
    pub cleared_stages: Vec<u32>,
    pub permanent_multiplier: f64,
}

#[derive(Debug, Clone)]
pub struct Progression {
    highest_stage_cleared: u32,
    cleared_stages: BTreeSet<u32>,
    /// Target multiplier earned so far.
    permanent_multiplier: f64,
    /// Portion already folded into the hero's stats.
    applied_multiplier: f64,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            highest_stage_cleared: 0,
            cleared_stages: BTreeSet::new(),
            permanent_multiplier: 1.0,
            applied_multiplier: 1.0,
        }
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highest_stage_cleared(&self) -> u32 {
        self.highest_stage_cleared
    }

    pub fn is_cleared(&self, stage_number: u32) -> bool {
        self.cleared_stages.contains(&stage_number)
    }

    pub fn permanent_multiplier(&self) -> f64 {
        self.permanent_multiplier
    }

    /// Records a boss kill. The permanent bonus grows only on the first
    /// clear of each stage; repeats return false and change nothing.
    /// The multiplier is additive in the number of distinct clears:
    /// `1 + clears * FIRST_CLEAR_STAT_BONUS`.
    pub fn record_clear(&mut self, stage_number: u32) -> bool {
        self.highest_stage_cleared = self.highest_stage_cleared.max(stage_number);
        if !self.cleared_stages.insert(stage_number) {
            return false;
        }
        self.permanent_multiplier =
            1.0 + self.cleared_stages.len() as f64 * FIRST_CLEAR_STAT_BONUS;
        true
    }

    /// Folds any unapplied portion of the multiplier into the hero.
    pub fn apply_to(&mut self, hero: &mut Combatant) {
        if (self.permanent_multiplier - self.applied_multiplier).abs() <= f64::EPSILON {
            return;
        }
        let ratio = self.permanent_multiplier / self.applied_multiplier;
        hero.apply_global_stat_bonus(ratio);
        self.applied_multiplier = self.permanent_multiplier;
    }

    pub fn snapshot(&self) -> ProgressionSnapshot {
        ProgressionSnapshot {
            version: SNAPSHOT_VERSION,
            highest_stage_cleared: self.highest_stage_cleared,
            cleared_stages: self.cleared_stages.iter().copied().collect(),
            permanent_multiplier: self.permanent_multiplier,
        }
    }

    /// Restores the earned state. The caller restores the hero to an
    /// unbuffed baseline first; the next `apply_to` then folds the full
    /// multiplier back in.
    pub fn restore(&mut self, snapshot: &ProgressionSnapshot) {
        self.highest_stage_cleared = snapshot.highest_stage_cleared;
        self.cleared_stages = snapshot.cleared_stages.iter().copied().collect();
        self.permanent_multiplier = snapshot.permanent_multiplier.max(f64::MIN_POSITIVE);
        self.applied_multiplier = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{
        AttributeType, Attributes, DerivedStatFormulas, EvolutionProfile, LevelingProfile,
    };

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

    #[test]
    fn test_first_clear_grows_multiplier_once() {
        let mut progression = Progression::new();
        assert!(progression.record_clear(1));
        let after_first = progression.permanent_multiplier();

        assert!(!progression.record_clear(1));
        assert_eq!(progression.permanent_multiplier(), after_first);

        assert!(progression.record_clear(2));
        assert!(progression.permanent_multiplier() > after_first);
    }

    #[test]
    fn test_multiplier_is_additive_per_distinct_clear() {
        let mut progression = Progression::new();
        progression.record_clear(1);
        progression.record_clear(2);
        progression.record_clear(3);
        let expected = 1.0 + 3.0 * FIRST_CLEAR_STAT_BONUS;
        assert!((progression.permanent_multiplier() - expected).abs() < 1e-12);

        // A repeat clear leaves the bonus untouched.
        progression.record_clear(2);
        assert!((progression.permanent_multiplier() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_highest_stage_tracks_max() {
        let mut progression = Progression::new();
        progression.record_clear(3);
        progression.record_clear(1);
        assert_eq!(progression.highest_stage_cleared(), 3);
    }

    #[test]
    fn test_apply_to_is_idempotent() {
        let mut progression = Progression::new();
        let mut hero = hero();
        progression.record_clear(1);

        progression.apply_to(&mut hero);
        let strength = hero.attribute(AttributeType::Strength);

        // Re-applying with no new clears changes nothing.
        progression.apply_to(&mut hero);
        assert_eq!(hero.attribute(AttributeType::Strength), strength);
    }

    #[test]
    fn test_apply_to_closes_the_gap_by_ratio() {
        let mut progression = Progression::new();
        let mut hero = hero();
        let base_strength = hero.attribute(AttributeType::Strength);

        progression.record_clear(1);
        progression.apply_to(&mut hero);
        progression.record_clear(2);
        progression.apply_to(&mut hero);

        let expected = base_strength * progression.permanent_multiplier();
        assert!((hero.attribute(AttributeType::Strength) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_restore_reapplies_to_fresh_hero() {
        let mut progression = Progression::new();
        progression.record_clear(1);
        progression.record_clear(2);
        let snapshot = progression.snapshot();

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: ProgressionSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = Progression::new();
        restored.restore(&decoded);
        assert_eq!(restored.highest_stage_cleared(), 2);
        assert!(restored.is_cleared(1));

        let mut fresh = hero();
        let base_strength = fresh.attribute(AttributeType::Strength);
        restored.apply_to(&mut fresh);
        let expected = base_strength * restored.permanent_multiplier();
        assert!((fresh.attribute(AttributeType::Strength) - expected).abs() < 1e-9);
    }
}
