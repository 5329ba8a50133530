//! Inventory: owned items, the transactional ledger and its snapshots.

pub mod ledger;
pub mod types;

pub use ledger::InventoryLedger;
pub use types::{InventorySnapshot, MutationFlags, MutationOutcome, OwnedItem};
