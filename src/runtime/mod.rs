//! Runtime layer: long-term progression and the top-level orchestrator.

pub mod orchestrator;
pub mod progression;

pub use orchestrator::{RuntimeOrchestrator, SaveState};
pub use progression::{Progression, ProgressionSnapshot};
