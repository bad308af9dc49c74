//! Combatant - the mutable unit of battle state
//!
//! Ability scores are fixed at construction; HP and MP are the only values
//! a battle changes. Both are signed and unclamped: a combatant at or below
//! zero HP is defeated, and negative MP is an overextension the narration
//! owns (desperate all-out moves may spend more than is left).

use crate::core::types::CombatantId;
use crate::entity::ability::{AbilityScores, AbilityTier, CombatStats};
use crate::entity::alignment::Alignment;
use crate::entity::gear::{InventoryItem, Skill};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub description: String,
    pub alignment: Alignment,
    pub skills: Vec<Skill>,
    abilities: AbilityScores,
    pub inventory: Vec<InventoryItem>,
    pub hp: i32,
    pub mp: i32,
    /// Cosmetic; shown to the reasoning service only
    pub level: u32,
}

impl Combatant {
    /// Create a combatant with empty resources
    ///
    /// Call [`Combatant::initialize_resources`] before the first turn.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        alignment: Alignment,
        abilities: AbilityScores,
    ) -> Self {
        Self {
            id: CombatantId::new(),
            name: name.into(),
            description: description.into(),
            alignment,
            skills: Vec::new(),
            abilities,
            inventory: Vec::new(),
            hp: 0,
            mp: 0,
            level: 0,
        }
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn with_item(mut self, item: InventoryItem) -> Self {
        self.inventory.push(item);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn abilities(&self) -> &AbilityScores {
        &self.abilities
    }

    /// Derived stats, recomputed on every call
    pub fn combat_stats(&self) -> CombatStats {
        self.abilities.derive_combat_stats()
    }

    pub fn max_hp(&self) -> i32 {
        self.combat_stats().hp_max
    }

    pub fn max_mp(&self) -> i32 {
        self.combat_stats().mp_max
    }

    /// Set HP and MP to their derived maxima
    ///
    /// This is a full heal/reset, not a top-up: any damage taken so far is
    /// discarded. Call it once after construction. A running battle owns
    /// its combatants, so it cannot be triggered mid-fight.
    pub fn initialize_resources(&mut self) {
        let stats = self.combat_stats();
        self.hp = stats.hp_max;
        self.mp = stats.mp_max;
    }

    /// No floor: HP may go negative, saturating at `i32::MIN`
    pub fn apply_damage(&mut self, amount: i32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Not checked against current MP; overdraft is allowed and saturates
    /// at `i32::MIN`
    pub fn spend_mana(&mut self, amount: i32) {
        self.mp = self.mp.saturating_sub(amount);
    }

    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    pub fn find_skill(&self, name: &str) -> Option<&Skill> {
        self.skills
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Full character sheet for reasoning-service prompts
    ///
    /// Includes current and max resources plus every derived stat with its
    /// tier, so the model never has to work the numbers out itself. Output
    /// depends only on state.
    pub fn render_for_reasoning(&self) -> String {
        let stats = self.combat_stats();
        let mut s = String::new();

        s.push_str(&format!("Name: {}\n", self.name));
        s.push_str(&format!("Description: {}\n", self.description));
        s.push_str(&format!(
            "Alignment: {} ({}) - {}\n",
            self.alignment.name, self.alignment.abbreviation, self.alignment.description
        ));
        s.push_str(&format!("Level: {}\n", self.level));
        s.push_str(&format!("HP: {}/{}\n", self.hp, stats.hp_max));
        s.push_str(&format!("MP: {}/{}\n", self.mp, stats.mp_max));

        s.push_str("\nAbility Scores:\n");
        for (name, value) in self.abilities.entries() {
            s.push_str(&format!(
                "- {} {} [{}]\n",
                name,
                value,
                AbilityTier::from_value(value as f32)
            ));
        }

        s.push_str("\nCombat Ratings:\n");
        for (label, value) in stats.ratings() {
            s.push_str(&format!(
                "- {} {:.1} [{}]\n",
                label,
                value,
                AbilityTier::from_value(value)
            ));
        }

        s.push_str("\nSkills:\n");
        if self.skills.is_empty() {
            s.push_str("- none\n");
        }
        for skill in &self.skills {
            s.push_str(&format!(
                "- {} (MP {}): {}\n",
                skill.name(),
                skill.mana_cost(),
                skill.description()
            ));
        }

        s.push_str("\nInventory:\n");
        if self.inventory.is_empty() {
            s.push_str("- none\n");
        }
        for item in &self.inventory {
            s.push_str(&format!(
                "- {} (durability {}): {}\n",
                item.name(),
                item.durability(),
                item.description()
            ));
        }

        s
    }
}
