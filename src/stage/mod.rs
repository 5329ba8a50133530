//! Stage generation: scaling curves, blueprints and the deterministic
//! generator.

pub mod blueprint;
pub mod generator;
pub mod scaling;

pub use blueprint::{BossConfig, EnemySpawn, RewardScaling, StageBlueprint, WaveBlueprint};
pub use generator::{enemy_count, generate_stage, medium_slots};
pub use scaling::{back_solve_primaries, BossScaling, EnemyScalingConfig, ScalingFormula};
