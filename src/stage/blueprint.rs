//! Stage and wave blueprints.
//!
//! A blueprint is pure data describing what a stage contains. Combatant
//! instances are built from spawns on demand so the same blueprint can be
//! replayed after a defeat.

use crate::combatant::{
    Attributes, Combatant, DerivedStatFormulas, EvolutionProfile, HandProfile, LevelingProfile,
};
use crate::data::EnemyTier;
use crate::encounter::ability::AbilityDefinition;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat experience and gold granted when the carrying enemy dies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RewardScaling {
    pub experience: u64,
    pub gold: u64,
}

/// Boss-fight parameters attached to a boss wave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub timer_seconds: f64,
    /// Health ratio at or below which the boss enrages.
    pub enrage_threshold: f64,
    pub enrage_attack_multiplier: f64,
}

/// One fully resolved enemy slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub definition_id: String,
    pub name: String,
    pub tier: EnemyTier,
    pub primaries: Attributes,
    pub formulas: DerivedStatFormulas,
    pub hand: HandProfile,
    pub abilities: Vec<AbilityDefinition>,
    pub rewards: RewardScaling,
}

impl EnemySpawn {
    /// Builds a fresh combatant instance at full vitals.
    pub fn spawn(&self) -> Combatant {
        Combatant::new(
            Uuid::new_v4().to_string(),
            self.name.clone(),
            self.primaries,
            self.formulas,
            LevelingProfile::default(),
            EvolutionProfile::default(),
            Some(self.hand),
            None,
            self.abilities.clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveBlueprint {
    pub wave_number: u32,
    pub is_boss: bool,
    pub spawns: Vec<EnemySpawn>,
    pub boss: Option<BossConfig>,
}

impl WaveBlueprint {
    pub fn total_rewards(&self) -> RewardScaling {
        let mut total = RewardScaling::default();
        for spawn in &self.spawns {
            total.experience += spawn.rewards.experience;
            total.gold += spawn.rewards.gold;
        }
        total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageBlueprint {
    pub stage_number: u32,
    pub waves: Vec<WaveBlueprint>,
    /// Resolved loot table for every wave of this stage.
    pub loot_table_id: String,
}

impl StageBlueprint {
    pub fn wave(&self, wave_number: u32) -> Option<&WaveBlueprint> {
        self.waves.iter().find(|w| w.wave_number == wave_number)
    }

    pub fn boss_wave(&self) -> Option<&WaveBlueprint> {
        self.waves.iter().find(|w| w.is_boss)
    }

    pub fn wave_count(&self) -> u32 {
        self.waves.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_template() -> EnemySpawn {
        EnemySpawn {
            definition_id: "rat".to_string(),
            name: "Rat".to_string(),
            tier: EnemyTier::Small,
            primaries: Attributes::uniform(5.0),
            formulas: DerivedStatFormulas::default(),
            hand: HandProfile {
                min_damage: 1.0,
                max_damage: 3.0,
                delay_seconds: 2.0,
            },
            abilities: vec![],
            rewards: RewardScaling {
                experience: 10,
                gold: 4,
            },
        }
    }

    #[test]
    fn test_spawn_builds_fresh_instances() {
        let template = spawn_template();
        let a = template.spawn();
        let b = template.spawn();

        assert_ne!(a.id, b.id);
        assert_eq!(a.health(), a.max_health());
        assert!(a.has_main_hand_weapon());
    }

    #[test]
    fn test_wave_total_rewards() {
        let wave = WaveBlueprint {
            wave_number: 1,
            is_boss: false,
            spawns: vec![spawn_template(), spawn_template()],
            boss: None,
        };
        let total = wave.total_rewards();
        assert_eq!(total.experience, 20);
        assert_eq!(total.gold, 8);
    }
}
