//! Combatant stat model: primary attributes, derived-stat formulas,
//! leveling, evolution and equipment aggregation.

pub mod attributes;
pub mod combatant;
pub mod derived;
pub mod leveling;

pub use attributes::{AttributeType, Attributes};
pub use combatant::{
    CharacterProgressSnapshot, Combatant, EquipmentSlot, Hand, HandProfile,
};
pub use derived::{DerivedStatFormulas, DerivedStats};
pub use leveling::{EvolutionProfile, EvolutionTier, LevelingProfile};
