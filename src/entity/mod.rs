//! Combatants and everything that describes them

pub mod ability;
pub mod alignment;
pub mod combatant;
pub mod gear;
pub mod generation;
pub mod summon;

pub use ability::{to_ability_level, AbilityScores, AbilityTier, CombatStats};
pub use alignment::{Alignment, AlignmentRegistry, UNALIGNED};
pub use combatant::Combatant;
pub use gear::{InventoryItem, Skill};
pub use generation::{create_from_description, CombatantSheet};
pub use summon::{summon, TemplateSource, TomlTemplates, DEFAULT_DESCRIPTION};
