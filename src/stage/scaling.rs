//! Stage scaling formulas.
//!
//! Enemy strength is authored in player-facing numbers (target HP, attack,
//! defense per stage) and converted back into primary attributes through the
//! derived-stat formula block, so tuning lives in one place.

use crate::combatant::{AttributeType, Attributes, DerivedStatFormulas};
use serde::{Deserialize, Serialize};

/// `value(stage) = base * stage^exponent + per_stage * stage`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScalingFormula {
    pub base: f64,
    pub exponent: f64,
    pub per_stage: f64,
}

impl ScalingFormula {
    pub fn value(&self, stage: u32) -> f64 {
        let s = stage.max(1) as f64;
        self.base * s.powf(self.exponent) + self.per_stage * s
    }
}

/// Multipliers and fight parameters for the boss wave.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BossScaling {
    pub health_multiplier: f64,
    pub attack_multiplier: f64,
    pub reward_multiplier: f64,
    pub timer_seconds: f64,
    /// Health ratio at or below which the boss enrages.
    pub enrage_threshold: f64,
    pub enrage_attack_multiplier: f64,
}

impl Default for BossScaling {
    fn default() -> Self {
        Self {
            health_multiplier: 8.0,
            attack_multiplier: 2.0,
            reward_multiplier: 5.0,
            timer_seconds: 90.0,
            enrage_threshold: 0.25,
            enrage_attack_multiplier: 1.5,
        }
    }
}

/// Per-stage enemy tuning curves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnemyScalingConfig {
    pub health: ScalingFormula,
    pub attack: ScalingFormula,
    pub defense: ScalingFormula,
    /// Seconds between swings. Floored at the generator's minimum.
    pub attack_interval: ScalingFormula,
    pub xp: ScalingFormula,
    pub gold: ScalingFormula,
    /// Applied on top of the curves for medium-tier slots.
    pub medium_multiplier: f64,
    pub boss: BossScaling,
}

impl Default for EnemyScalingConfig {
    fn default() -> Self {
        Self {
            health: ScalingFormula {
                base: 30.0,
                exponent: 1.4,
                per_stage: 5.0,
            },
            attack: ScalingFormula {
                base: 4.0,
                exponent: 1.3,
                per_stage: 1.0,
            },
            defense: ScalingFormula {
                base: 2.0,
                exponent: 1.2,
                per_stage: 0.5,
            },
            attack_interval: ScalingFormula {
                base: 2.4,
                exponent: 0.0,
                per_stage: -0.01,
            },
            xp: ScalingFormula {
                base: 10.0,
                exponent: 1.2,
                per_stage: 2.0,
            },
            gold: ScalingFormula {
                base: 5.0,
                exponent: 1.1,
                per_stage: 1.0,
            },
            medium_multiplier: 2.0,
            boss: BossScaling::default(),
        }
    }
}

/// Solves the primary attributes that reproduce the target derived numbers
/// under `formulas`. Coefficients at or near zero yield a zero primary rather
/// than dividing by zero.
pub fn back_solve_primaries(
    formulas: &DerivedStatFormulas,
    target_health: f64,
    target_attack: f64,
    target_defense: f64,
) -> Attributes {
    let solve = |numerator: f64, coefficient: f64| {
        if coefficient.abs() < f64::EPSILON {
            0.0
        } else {
            (numerator / coefficient).max(0.0)
        }
    };

    let mut primaries = Attributes::zero();
    primaries.set(
        AttributeType::Vitality,
        solve(target_health - formulas.base_health, formulas.hp_per_vitality),
    );
    primaries.set(
        AttributeType::Strength,
        solve(target_attack, formulas.attack_per_strength),
    );
    primaries.set(
        AttributeType::Defense,
        solve(target_defense, formulas.armor_per_defense),
    );
    primaries
}
