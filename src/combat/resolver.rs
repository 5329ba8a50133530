//! Single-swing attack resolution.
//!
//! The pipeline checks avoidance in a fixed order (dodge, parry, accuracy),
//! then rolls damage and applies armor mitigation. All randomness comes from
//! the injected rng so resolution is reproducible under a seeded generator.

use crate::combatant::{Combatant, Hand};
use crate::constants::{ARMOR_MITIGATION_CONSTANT, CRIT_DAMAGE_MULTIPLIER, MIN_HIT_DAMAGE};
use crate::combat::outcome::{AttackOutcome, AttackResolution};
use rand::Rng;

/// Chance the attack lands the accuracy contest.
/// With zero accuracy and zero evasion the attack always connects.
pub fn hit_chance(accuracy: f64, evasion: f64) -> f64 {
    let acc = accuracy.max(0.0);
    let eva = evasion.max(0.0);
    if acc + eva <= 0.0 {
        return 1.0;
    }
    acc / (acc + eva)
}

/// Fraction of raw damage that survives armor. Penetration subtracts from
/// armor before mitigation and can at most zero it out.
pub fn mitigation_factor(armor: f64, penetration: f64) -> f64 {
    let effective = (armor - penetration.max(0.0)).max(0.0);
    ARMOR_MITIGATION_CONSTANT / (ARMOR_MITIGATION_CONSTANT + effective)
}

/// Resolves one swing of `hand` from attacker against defender, applying
/// damage to the defender.
pub fn resolve_attack(
    attacker: &Combatant,
    defender: &mut Combatant,
    hand: Hand,
    rng: &mut impl Rng,
) -> AttackResolution {
    let avoided = |outcome| AttackResolution {
        attacker_id: attacker.id.clone(),
        defender_id: defender.id.clone(),
        hand,
        outcome,
        damage: 0.0,
        raw_damage: 0.0,
        defender_health_after: defender.health(),
        defender_defeated: !defender.is_alive(),
    };

    if rng.gen::<f64>() < defender.dodge_chance() {
        return avoided(AttackOutcome::Dodge);
    }

    // Parrying requires a weapon to parry with.
    if defender.has_main_hand_weapon() && rng.gen::<f64>() < defender.parry_chance() {
        return avoided(AttackOutcome::Parry);
    }

    if rng.gen::<f64>() >= hit_chance(attacker.accuracy(), defender.evasion()) {
        return avoided(AttackOutcome::Miss);
    }

    let (min, max) = attacker.damage_range(hand);
    let mut raw = if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    };

    let outcome = if rng.gen::<f64>() < attacker.crit_chance() {
        raw *= CRIT_DAMAGE_MULTIPLIER;
        AttackOutcome::Critical
    } else {
        AttackOutcome::Hit
    };

    let damage =
        (raw * mitigation_factor(defender.armor(), attacker.armor_penetration())).max(MIN_HIT_DAMAGE);
    defender.apply_damage(damage);

    AttackResolution {
        attacker_id: attacker.id.clone(),
        defender_id: defender.id.clone(),
        hand,
        outcome,
        damage,
        raw_damage: raw,
        defender_health_after: defender.health(),
        defender_defeated: !defender.is_alive(),
    }
}
