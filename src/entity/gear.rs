//! Skills and inventory items
//!
//! Both carry a non-negative cost/durability. Construction fails fast on a
//! negative value instead of clamping, and deserialization goes through the
//! same check.

use crate::core::error::{ArenaError, Result};
use serde::{Deserialize, Serialize};

/// A named ability with a mana cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SkillRecord")]
pub struct Skill {
    name: String,
    mana_cost: i32,
    description: String,
}

#[derive(Deserialize)]
struct SkillRecord {
    name: String,
    mana_cost: i32,
    description: String,
}

impl TryFrom<SkillRecord> for Skill {
    type Error = ArenaError;

    fn try_from(record: SkillRecord) -> Result<Self> {
        Skill::new(record.name, record.mana_cost, record.description)
    }
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        mana_cost: i32,
        description: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if mana_cost < 0 {
            return Err(ArenaError::Validation(format!(
                "Skill '{}' has negative mana cost {}",
                name, mana_cost
            )));
        }
        Ok(Self {
            name,
            mana_cost,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mana_cost(&self) -> i32 {
        self.mana_cost
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A carried item with remaining durability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ItemRecord")]
pub struct InventoryItem {
    name: String,
    durability: i32,
    description: String,
}

#[derive(Deserialize)]
struct ItemRecord {
    name: String,
    durability: i32,
    description: String,
}

impl TryFrom<ItemRecord> for InventoryItem {
    type Error = ArenaError;

    fn try_from(record: ItemRecord) -> Result<Self> {
        InventoryItem::new(record.name, record.durability, record.description)
    }
}

impl InventoryItem {
    pub fn new(
        name: impl Into<String>,
        durability: i32,
        description: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if durability < 0 {
            return Err(ArenaError::Validation(format!(
                "Item '{}' has negative durability {}",
                name, durability
            )));
        }
        Ok(Self {
            name,
            durability,
            description: description.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn durability(&self) -> i32 {
        self.durability
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
