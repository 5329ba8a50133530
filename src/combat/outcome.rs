//! Attack outcome classification.

use crate::combatant::Hand;
use serde::{Deserialize, Serialize};

/// What happened when one swing was resolved against a defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackOutcome {
    /// Defender avoided the attack entirely.
    Dodge,
    /// Defender deflected the attack with their main-hand weapon.
    Parry,
    /// Attacker failed the accuracy contest.
    Miss,
    /// Clean hit.
    Hit,
    /// Critical hit, damage multiplied.
    Critical,
}

impl AttackOutcome {
    pub fn landed(&self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::Critical)
    }
}

/// Full resolution of a single swing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResolution {
    pub attacker_id: String,
    pub defender_id: String,
    /// Which of the attacker's hands swung.
    pub hand: Hand,
    pub outcome: AttackOutcome,
    /// Damage actually applied to the defender. Zero unless the attack landed.
    pub damage: f64,
    /// Raw damage before armor mitigation.
    pub raw_damage: f64,
    pub defender_health_after: f64,
    pub defender_defeated: bool,
}
