//! Ability definitions and per-encounter ability state.
//!
//! The two ability kinds are a closed set and are dispatched exhaustively at
//! each trigger site rather than through trait objects.

use serde::{Deserialize, Serialize};

/// The closed set of ability behaviors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum AbilityKind {
    /// After a successful hit, splash a fraction of that hit's damage to up
    /// to `max_targets` additional living enemies.
    AreaDamage {
        splash_percent: f64,
        max_targets: usize,
        cooldown_seconds: f64,
    },
    /// Every `interval_seconds`, heal all living allies by a fraction of
    /// their max health.
    HealingAura {
        heal_percent: f64,
        interval_seconds: f64,
        cooldown_seconds: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbilityDefinition {
    pub id: String,
    pub name: String,
    pub kind: AbilityKind,
}

/// Binds an ability definition to one combatant for the duration of an
/// encounter, tracking cooldown and (for interval abilities) time until the
/// next firing.
#[derive(Debug, Clone)]
pub struct AbilityState {
    pub definition: AbilityDefinition,
    pub remaining_cooldown: f64,
    pub remaining_interval: f64,
}

impl AbilityState {
    pub fn new(definition: AbilityDefinition) -> Self {
        let remaining_interval = match definition.kind {
            AbilityKind::HealingAura {
                interval_seconds, ..
            } => interval_seconds,
            AbilityKind::AreaDamage { .. } => 0.0,
        };
        Self {
            definition,
            remaining_cooldown: 0.0,
            remaining_interval,
        }
    }

    /// Advances timers by one tick. Timers stop at zero; reset happens only
    /// when the ability fires.
    pub fn tick_down(&mut self, dt: f64) {
        self.remaining_cooldown = (self.remaining_cooldown - dt).max(0.0);
        self.remaining_interval = (self.remaining_interval - dt).max(0.0);
    }

    pub fn cooldown_clear(&self) -> bool {
        self.remaining_cooldown <= 0.0
    }

    /// True for an interval ability whose interval has elapsed and whose
    /// cooldown is clear.
    pub fn aura_ready(&self) -> bool {
        matches!(self.definition.kind, AbilityKind::HealingAura { .. })
            && self.remaining_interval <= 0.0
            && self.cooldown_clear()
    }

    /// Restarts interval and cooldown after firing.
    pub fn trigger(&mut self) {
        match self.definition.kind {
            AbilityKind::HealingAura {
                interval_seconds,
                cooldown_seconds,
                ..
            } => {
                self.remaining_interval = interval_seconds;
                self.remaining_cooldown = cooldown_seconds;
            }
            AbilityKind::AreaDamage {
                cooldown_seconds, ..
            } => {
                self.remaining_cooldown = cooldown_seconds;
            }
        }
    }
}
