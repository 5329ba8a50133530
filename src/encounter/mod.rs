//! Encounter simulation: abilities, the fixed-tick loop and its summary.

pub mod ability;
pub mod engine;
pub mod summary;

pub use ability::{AbilityDefinition, AbilityKind, AbilityState};
pub use engine::{EncounterEvent, EncounterEventKind, EncounterLoop, EncounterState};
pub use summary::{EncounterSummary, ItemDrop, RewardBundle, Victor};
