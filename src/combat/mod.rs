//! Attack resolution: outcome types and the swing pipeline.

pub mod outcome;
pub mod resolver;

pub use outcome::{AttackOutcome, AttackResolution};
pub use resolver::{hit_chance, mitigation_factor, resolve_attack};
