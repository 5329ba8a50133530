//! Idlebound - Idle RPG Combat and Progression Engine
//!
//! A headless simulation core: stat models, deterministic stage generation,
//! fixed-tick encounters, a transactional inventory and the runtime state
//! machine that ties them together. The host supplies game data, a time
//! stream and an RNG, and observes the run through snapshots and hooks.

pub mod combat;
pub mod combatant;
pub mod constants;
pub mod data;
pub mod encounter;
pub mod events;
pub mod inventory;
pub mod loot;
pub mod runtime;
pub mod stage;

pub use combatant::{AttributeType, Attributes, Combatant};
pub use data::{DataError, DataSource, GameData, StaticDataSource};
pub use events::{EngineHooks, NullHooks, StateSnapshot, WavePhase};
pub use inventory::{InventoryLedger, MutationOutcome};
pub use runtime::{RuntimeOrchestrator, SaveState};
