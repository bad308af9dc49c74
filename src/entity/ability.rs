//! Ability scores and the combat statistics derived from them
//!
//! Derived stats are NOT stored - always recomputed from the seven base
//! scores, so they can never drift out of sync with the combatant.

use crate::core::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The seven base attributes
///
/// Every field is mandatory: there is no `Default`, and decoding a block
/// with a missing key fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbilityScores {
    #[serde(rename = "STR")]
    pub strength: i32,
    #[serde(rename = "DEX")]
    pub dexterity: i32,
    #[serde(rename = "CON")]
    pub constitution: i32,
    #[serde(rename = "INT")]
    pub intelligence: i32,
    #[serde(rename = "WIS")]
    pub wisdom: i32,
    #[serde(rename = "CHA")]
    pub charisma: i32,
    #[serde(rename = "LUC")]
    pub luck: i32,
}

impl AbilityScores {
    /// Conventional bounds for generated characters
    pub const MIN_SCORE: i32 = 1;
    pub const MAX_SCORE: i32 = 99;

    pub fn new(
        strength: i32,
        dexterity: i32,
        constitution: i32,
        intelligence: i32,
        wisdom: i32,
        charisma: i32,
        luck: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            constitution,
            intelligence,
            wisdom,
            charisma,
            luck,
        }
    }

    /// All scores with their abbreviations, in sheet order
    pub fn entries(&self) -> [(&'static str, i32); 7] {
        [
            ("STR", self.strength),
            ("DEX", self.dexterity),
            ("CON", self.constitution),
            ("INT", self.intelligence),
            ("WIS", self.wisdom),
            ("CHA", self.charisma),
            ("LUC", self.luck),
        ]
    }

    /// Check every score lies in [1, 99]
    pub fn validate_range(&self) -> Result<()> {
        for (name, value) in self.entries() {
            if !(Self::MIN_SCORE..=Self::MAX_SCORE).contains(&value) {
                return Err(ArenaError::Validation(format!(
                    "{} must be within {}..={}, got {}",
                    name,
                    Self::MIN_SCORE,
                    Self::MAX_SCORE,
                    value
                )));
            }
        }
        Ok(())
    }

    pub fn derive_combat_stats(&self) -> CombatStats {
        let st = self.strength as f32;
        let dex = self.dexterity as f32;
        let int = self.intelligence as f32;
        let wis = self.wisdom as f32;
        let cha = self.charisma as f32;

        CombatStats {
            hp_max: self.constitution * 10 + self.strength,
            mp_max: self.intelligence * 5 + self.charisma * 2,
            physical_attack: st * 2.0 + dex * 0.5,
            magical_attack: int * 2.0 + wis,
            speed: dex * 1.2 + int * 0.5,
            hit: dex * 1.5 + wis * 0.5,
            evasion: dex * 2.0,
            critical: dex * 0.5 + cha * 0.3,
        }
    }
}

/// Combat statistics derived from [`AbilityScores`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatStats {
    pub hp_max: i32,
    pub mp_max: i32,
    pub physical_attack: f32,
    pub magical_attack: f32,
    pub speed: f32,
    pub hit: f32,
    pub evasion: f32,
    pub critical: f32,
}

impl CombatStats {
    /// Non-resource stats with display labels, for prompt rendering
    pub fn ratings(&self) -> [(&'static str, f32); 6] {
        [
            ("Physical Attack", self.physical_attack),
            ("Magical Attack", self.magical_attack),
            ("Speed", self.speed),
            ("Hit", self.hit),
            ("Evasion", self.evasion),
            ("Critical", self.critical),
        ]
    }
}

/// Qualitative tier for a score or derived stat
///
/// Display and prompt context only, never used in resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbilityTier {
    E,
    D,
    C,
    B,
    A,
    S,
}

impl AbilityTier {
    /// Map a value to its tier; each boundary belongs to the lower tier
    pub fn from_value(value: f32) -> Self {
        if value <= 10.0 {
            AbilityTier::E
        } else if value <= 20.0 {
            AbilityTier::D
        } else if value <= 30.0 {
            AbilityTier::C
        } else if value <= 40.0 {
            AbilityTier::B
        } else if value <= 50.0 {
            AbilityTier::A
        } else {
            AbilityTier::S
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityTier::E => "E",
            AbilityTier::D => "D",
            AbilityTier::C => "C",
            AbilityTier::B => "B",
            AbilityTier::A => "A",
            AbilityTier::S => "S",
        }
    }
}

impl fmt::Display for AbilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn to_ability_level(value: f32) -> AbilityTier {
    AbilityTier::from_value(value)
}
