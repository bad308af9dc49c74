//! Generate a combatant from a free-text description
//!
//! Unlike turn decisions there is no fallback here: a combatant the
//! reasoning service could not describe validly never enters a battle, so
//! errors propagate.

use crate::core::error::{ArenaError, Result};
use crate::entity::ability::AbilityScores;
use crate::entity::alignment::AlignmentRegistry;
use crate::entity::combatant::Combatant;
use crate::entity::gear::{InventoryItem, Skill};
use crate::llm::service::{generate_structured, ReasoningService, ResponseSchema};
use serde::{Deserialize, Serialize};

/// Combatant as the reasoning service describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSheet {
    pub name: String,
    pub description: String,
    /// Alignment abbreviation, e.g. "NG"
    pub alignment: String,
    pub skills: Vec<Skill>,
    pub ability_scores: AbilityScores,
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub level: u32,
}

impl CombatantSheet {
    /// Build the combatant and initialize its resources
    ///
    /// Unknown alignments resolve to the unaligned catch-all.
    pub fn into_combatant(self, registry: &AlignmentRegistry) -> Combatant {
        if registry.lookup(&self.alignment).is_none() {
            tracing::warn!(
                name = %self.name,
                alignment = %self.alignment,
                "Unknown alignment, treating as unaligned"
            );
        }
        let alignment = registry.resolve_or_unaligned(&self.alignment);

        let mut combatant = Combatant::new(
            self.name,
            self.description,
            alignment,
            self.ability_scores,
        )
        .with_level(self.level);
        combatant.skills = self.skills;
        combatant.inventory = self.inventory;
        combatant.initialize_resources();
        combatant
    }
}

impl ResponseSchema for CombatantSheet {
    fn schema() -> serde_json::Value {
        let score = serde_json::json!({ "type": "integer", "minimum": 1, "maximum": 99 });
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "description": {
                    "type": "string",
                    "description": "Appearance, personality, fighting style and notable gear"
                },
                "alignment": {
                    "type": "string",
                    "description": "Alignment abbreviation from the provided list"
                },
                "skills": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "mana_cost": { "type": "integer", "minimum": 0 },
                            "description": { "type": "string" }
                        },
                        "required": ["name", "mana_cost", "description"]
                    }
                },
                "ability_scores": {
                    "type": "object",
                    "properties": {
                        "STR": score, "DEX": score, "CON": score, "INT": score,
                        "WIS": score, "CHA": score, "LUC": score
                    },
                    "required": ["STR", "DEX", "CON", "INT", "WIS", "CHA", "LUC"]
                },
                "inventory": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "durability": { "type": "integer", "minimum": 0 },
                            "description": { "type": "string" }
                        },
                        "required": ["name", "durability", "description"]
                    }
                },
                "level": { "type": "integer", "minimum": 0 }
            },
            "required": ["name", "description", "alignment", "skills", "ability_scores", "inventory"]
        })
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ArenaError::Validation("combatant name is empty".into()));
        }
        self.ability_scores.validate_range()
    }
}

/// Ask the reasoning service to turn a description into a combatant
pub async fn create_from_description<S: ReasoningService>(
    service: &S,
    registry: &AlignmentRegistry,
    description: &str,
) -> Result<Combatant> {
    let system = format!(
        "{}\n\nAVAILABLE ALIGNMENTS:\n{}",
        CREATE_SYSTEM_PROMPT,
        registry.catalogue()
    );
    let user = format!("CHARACTER DESCRIPTION:\n{}\n\nCreate this character as JSON:", description);

    let sheet: CombatantSheet = generate_structured(service, &system, &user).await?;
    let combatant = sheet.into_combatant(registry);
    tracing::info!(
        name = %combatant.name,
        hp = combatant.hp,
        mp = combatant.mp,
        "Combatant created"
    );
    Ok(combatant)
}

/// System prompt for combatant generation
const CREATE_SYSTEM_PROMPT: &str = r#"You are a game designer turning a character description into a combat-ready character sheet.

RULES:
1. Keep the name and personality from the description; invent a fitting name if none is given.
2. Ability scores (STR, DEX, CON, INT, WIS, CHA, LUC) range from 1 to 99. An ordinary adult scores around 10; legendary heroes reach 30 or more.
3. List only the character's unusual signature skills, each with a non-negative mana cost.
4. Inventory lists carried items with a non-negative durability.
5. Pick the alignment abbreviation that best fits; use U for creatures without moral agency."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::alignment::UNALIGNED;
    use crate::llm::service::Prompt;

    struct Fixed(String);

    impl ReasoningService for Fixed {
        async fn complete(&self, _prompt: &Prompt<'_>) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    fn sheet_json(alignment: &str, mana_cost: i32, luck: i32) -> String {
        format!(
            r#"{{
  "name": "R",
  "description": "An ice swordsman",
  "alignment": "{}",
  "skills": [{{"name": "Frost Blade", "mana_cost": {}, "description": "ice edge"}}],
  "ability_scores": {{"STR": 13, "DEX": 15, "CON": 16, "INT": 18, "WIS": 12, "CHA": 14, "LUC": {}}},
  "inventory": [{{"name": "Moonlight Longsword", "durability": 90, "description": "a crescent guard"}}],
  "level": 5
}}"#,
            alignment, mana_cost, luck
        )
    }

    #[tokio::test]
    async fn test_create_initializes_resources() {
        let registry = AlignmentRegistry::standard();
        let service = Fixed(format!("Here:\n{}", sheet_json("ng", 12, 10)));
        let combatant = create_from_description(&service, &registry, "an ice mage")
            .await
            .unwrap();

        assert_eq!(combatant.name, "R");
        assert_eq!(combatant.alignment.abbreviation, "NG");
        assert_eq!(combatant.hp, 163);
        assert_eq!(combatant.mp, 118);
        assert_eq!(combatant.level, 5);
        assert_eq!(combatant.skills.len(), 1);
        assert_eq!(combatant.inventory[0].durability(), 90);
    }

    #[tokio::test]
    async fn test_unknown_alignment_becomes_unaligned() {
        let registry = AlignmentRegistry::standard();
        let service = Fixed(sheet_json("XX", 12, 10));
        let combatant = create_from_description(&service, &registry, "?")
            .await
            .unwrap();
        assert_eq!(combatant.alignment.abbreviation, UNALIGNED);
    }

    #[tokio::test]
    async fn test_negative_skill_cost_propagates() {
        let registry = AlignmentRegistry::standard();
        let service = Fixed(sheet_json("NG", -3, 10));
        let result = create_from_description(&service, &registry, "?").await;
        assert!(matches!(result, Err(ArenaError::Generation(_))));
    }

    #[tokio::test]
    async fn test_out_of_range_scores_propagate() {
        let registry = AlignmentRegistry::standard();
        let service = Fixed(sheet_json("NG", 3, 0));
        assert!(create_from_description(&service, &registry, "?").await.is_err());
    }

    #[tokio::test]
    async fn test_garbage_propagates() {
        let registry = AlignmentRegistry::standard();
        let service = Fixed("I cannot help with that.".into());
        let result = create_from_description(&service, &registry, "?").await;
        assert!(result.unwrap_err().is_generation());
    }

    #[test]
    fn test_level_defaults_to_zero() {
        let json = sheet_json("N", 1, 10).replace(",\n  \"level\": 5", "");
        let sheet: CombatantSheet = serde_json::from_str(&json).unwrap();
        assert_eq!(sheet.level, 0);
    }
}
