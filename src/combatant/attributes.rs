use crate::constants::NUM_ATTRIBUTES;
use serde::{Deserialize, Serialize};

/// The eight primary attributes every combatant carries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttributeType {
    Strength,
    Defense,
    Vitality,
    Energy,
    Dexterity,
    Agility,
    Luck,
    Speed,
}

impl AttributeType {
    pub fn all() -> [AttributeType; NUM_ATTRIBUTES] {
        [
            AttributeType::Strength,
            AttributeType::Defense,
            AttributeType::Vitality,
            AttributeType::Energy,
            AttributeType::Dexterity,
            AttributeType::Agility,
            AttributeType::Luck,
            AttributeType::Speed,
        ]
    }

    pub fn abbrev(&self) -> &'static str {
        match self {
            AttributeType::Strength => "STR",
            AttributeType::Defense => "DEF",
            AttributeType::Vitality => "VIT",
            AttributeType::Energy => "ENE",
            AttributeType::Dexterity => "DEX",
            AttributeType::Agility => "AGI",
            AttributeType::Luck => "LCK",
            AttributeType::Speed => "SPD",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            AttributeType::Strength => 0,
            AttributeType::Defense => 1,
            AttributeType::Vitality => 2,
            AttributeType::Energy => 3,
            AttributeType::Dexterity => 4,
            AttributeType::Agility => 5,
            AttributeType::Luck => 6,
            AttributeType::Speed => 7,
        }
    }
}

/// Array-backed attribute block. Used for base stats, equipment deltas and
/// buff deltas alike; negative deltas are representable but totals are
/// clamped at read time by the owning combatant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Attributes {
    values: [f64; NUM_ATTRIBUTES],
}

impl Attributes {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn uniform(value: f64) -> Self {
        Self {
            values: [value; NUM_ATTRIBUTES],
        }
    }

    pub fn from_values(values: [f64; NUM_ATTRIBUTES]) -> Self {
        Self { values }
    }

    pub fn get(&self, attr: AttributeType) -> f64 {
        self.values[attr.index()]
    }

    pub fn set(&mut self, attr: AttributeType, value: f64) {
        self.values[attr.index()] = value;
    }

    /// Adds another block's values into this one (equipment/buff aggregation).
    pub fn add(&mut self, other: &Attributes) {
        for i in 0..NUM_ATTRIBUTES {
            self.values[i] += other.values[i];
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.values {
            *v *= factor;
        }
    }

    /// Component-wise sum of several blocks.
    pub fn sum(blocks: &[&Attributes]) -> Attributes {
        let mut out = Attributes::zero();
        for block in blocks {
            out.add(block);
        }
        out
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attributes() {
        let attrs = Attributes::zero();
        for attr in AttributeType::all() {
            assert_eq!(attrs.get(attr), 0.0);
        }
    }

    #[test]
    fn test_get_set() {
        let mut attrs = Attributes::zero();
        attrs.set(AttributeType::Strength, 16.0);
        assert_eq!(attrs.get(AttributeType::Strength), 16.0);
        assert_eq!(attrs.get(AttributeType::Dexterity), 0.0);
    }

    #[test]
    fn test_add_combines_blocks() {
        let mut base = Attributes::uniform(10.0);
        let mut bonus = Attributes::zero();
        bonus.set(AttributeType::Luck, 4.0);
        bonus.set(AttributeType::Speed, 2.0);
        base.add(&bonus);

        assert_eq!(base.get(AttributeType::Luck), 14.0);
        assert_eq!(base.get(AttributeType::Speed), 12.0);
        assert_eq!(base.get(AttributeType::Strength), 10.0);
    }

    #[test]
    fn test_scale() {
        let mut attrs = Attributes::uniform(10.0);
        attrs.scale(1.5);
        for attr in AttributeType::all() {
            assert_eq!(attrs.get(attr), 15.0);
        }
    }

    #[test]
    fn test_index_unique_and_ordered() {
        for (i, attr) in AttributeType::all().iter().enumerate() {
            assert_eq!(attr.index(), i);
        }
    }

    #[test]
    fn test_sum() {
        let a = Attributes::uniform(1.0);
        let b = Attributes::uniform(2.0);
        let c = Attributes::sum(&[&a, &b]);
        assert_eq!(c.get(AttributeType::Vitality), 3.0);
    }

    #[test]
    fn test_abbrev_covers_all() {
        for attr in AttributeType::all() {
            assert_eq!(attr.abbrev().len(), 3);
        }
    }
}
