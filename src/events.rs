//! Host-facing surface: observable state snapshots and hook callbacks.
//!
//! The engine pushes everything the host needs through [`EngineHooks`];
//! reads happen on cloned [`StateSnapshot`] values so the host never holds
//! references into live engine state.

use crate::encounter::engine::EncounterEvent;
use crate::encounter::summary::EncounterSummary;
use serde::{Deserialize, Serialize};

/// Where the current wave stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    Preparing,
    InProgress,
    Won,
    Lost,
    /// Boss wave cleared; waiting for an explicit resume.
    StageCleared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyStatus {
    pub name: String,
    pub health: f64,
    pub max_health: f64,
}

/// Cloned view of the orchestrator's externally relevant state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub stage_number: u32,
    pub wave_number: u32,
    pub waves_in_stage: u32,
    pub phase: WavePhase,
    pub is_boss_wave: bool,
    pub boss_timer_remaining: Option<f64>,
    pub hero_name: String,
    pub hero_level: u32,
    pub hero_health: f64,
    pub hero_max_health: f64,
    pub hero_mana: f64,
    pub hero_experience: u64,
    pub hero_xp_to_next: u64,
    pub gold: u64,
    pub highest_stage_cleared: u32,
    pub enemies: Vec<EnemyStatus>,
}

/// Callbacks the host implements to observe the engine. Every method has an
/// empty default so hosts only override what they care about.
pub trait EngineHooks {
    fn on_state_changed(&mut self, _snapshot: &StateSnapshot) {}

    /// Player-facing narration lines (level ups, rewards, wave results).
    fn on_log(&mut self, _line: &str) {}

    /// Buffered combat events drained from the running encounter.
    fn on_encounter_events(&mut self, _events: &[EncounterEvent]) {}

    fn on_encounter_complete(&mut self, _summary: &EncounterSummary) {}
}

/// Hook sink for hosts and tests that observe nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

impl EngineHooks for NullHooks {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_hooks_accept_everything() {
        let mut hooks = NullHooks;
        hooks.on_log("line");
        hooks.on_encounter_events(&[]);
    }
}
