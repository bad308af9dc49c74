//! Decision requests: observation and action
//!
//! Observation asks the reasoning service for a fresh first-person
//! impression (plain text). Action asks for a JSON object matching
//! [`ActionDecision`]. An action request never fails from the caller's
//! point of view: any transport, decode or validation problem becomes a
//! [`Decision::Failed`], which resolves to the fixed idle fallback.

use crate::core::error::{ArenaError, Result};
use crate::llm::context::TurnContext;
use crate::llm::service::{generate_structured, generate_text, ReasoningService, ResponseSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Label of the fallback action
pub const FALLBACK_ACTION: &str = "idle/stunned";

/// Action category. The four named kinds are the intended vocabulary;
/// anything else the model sends is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Attack,
    Cast,
    Defend,
    Other,
    Custom(String),
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "attack" => ActionKind::Attack,
            "cast" => ActionKind::Cast,
            "defend" => ActionKind::Defend,
            "other" => ActionKind::Other,
            _ => ActionKind::Custom(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Attack => f.write_str("attack"),
            ActionKind::Cast => f.write_str("cast"),
            ActionKind::Defend => f.write_str("defend"),
            ActionKind::Other => f.write_str("other"),
            ActionKind::Custom(s) => f.write_str(s),
        }
    }
}

/// The action JSON the reasoning service must produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecision {
    /// Short label, usually a skill name
    pub action: String,
    #[serde(rename = "type")]
    pub kind: ActionKind,
    /// Narration of the action
    pub description: String,
    /// Diagnostics only; never read by resolution
    pub thought: String,
    /// May exceed current MP for all-out moves
    pub mana_cost: i32,
    /// Predicted damage to the opponent
    pub power: i32,
}

impl ActionDecision {
    /// The fixed no-op substituted when a decision cannot be generated
    pub fn fallback(actor_name: &str, reason: &str) -> Self {
        Self {
            action: FALLBACK_ACTION.into(),
            kind: ActionKind::Other,
            description: format!(
                "{} freezes for some unknown reason, standing still and doing nothing.",
                actor_name
            ),
            thought: format!("Action generation failed, idling instead: {}", reason),
            mana_cost: 0,
            power: 0,
        }
    }

    /// Single history line for this action
    pub fn narrate(&self, round: u32, actor_name: &str) -> String {
        format!(
            "Round {}, {} uses {}: {}",
            round,
            actor_name,
            self.action,
            self.description.trim()
        )
    }
}

impl ResponseSchema for ActionDecision {
    fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "Short action name, usually a skill name or a descriptive phrase"
                },
                "type": {
                    "type": "string",
                    "description": "One of: attack, cast, defend, other"
                },
                "description": {
                    "type": "string",
                    "description": "Vivid narration of the action, true to the character's description"
                },
                "thought": {
                    "type": "string",
                    "description": "Why the character acts this way"
                },
                "mana_cost": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "MP spent; normally no more than current MP"
                },
                "power": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Damage dealt to the opponent; 0 for actions that deal none"
                }
            },
            "required": ["action", "type", "description", "thought", "mana_cost", "power"]
        })
    }

    fn validate(&self) -> Result<()> {
        if self.action.trim().is_empty() {
            return Err(ArenaError::Validation("action label is empty".into()));
        }
        if self.mana_cost < 0 {
            return Err(ArenaError::Validation(format!(
                "mana_cost must be non-negative, got {}",
                self.mana_cost
            )));
        }
        if self.power < 0 {
            return Err(ArenaError::Validation(format!(
                "power must be non-negative, got {}",
                self.power
            )));
        }
        Ok(())
    }
}

/// Why a decision could not be generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub reason: String,
}

/// Outcome of an action request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Action(ActionDecision),
    Failed(GenerationFailure),
}

impl Decision {
    pub fn from_result(result: Result<ActionDecision>) -> Self {
        match result {
            Ok(action) => Decision::Action(action),
            Err(e) => Decision::Failed(GenerationFailure {
                reason: e.to_string(),
            }),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Decision::Failed(_))
    }

    /// The action to apply, substituting the fallback for failures
    pub fn into_action(self, actor_name: &str) -> ActionDecision {
        match self {
            Decision::Action(action) => action,
            Decision::Failed(failure) => ActionDecision::fallback(actor_name, &failure.reason),
        }
    }
}

/// A combatant's current understanding of the fight
///
/// Single slot: each observation replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impression {
    pub summary: String,
    /// Damage the combatant detected this turn, if any
    pub incoming_damage: Option<i32>,
}

/// Ask for an updated impression
///
/// Plain text, no schema. Errors propagate so the engine can keep the
/// previous impression.
pub async fn observe<S: ReasoningService>(service: &S, ctx: &TurnContext<'_>) -> Result<Impression> {
    let user_prompt = format!(
        "{}\n# Your Task\nAs {}, state your updated impression of {} and the battlefield.",
        ctx.summary(),
        ctx.actor.name,
        ctx.opponent_name
    );
    let summary = generate_text(service, OBSERVE_SYSTEM_PROMPT, &user_prompt).await?;
    if summary.is_empty() {
        return Err(ArenaError::Generation("Empty observation".into()));
    }
    Ok(Impression {
        summary,
        incoming_damage: ctx.incoming_damage.filter(|d| *d > 0),
    })
}

/// Ask for the actor's next action. Never fails; see [`Decision`].
pub async fn decide<S: ReasoningService>(service: &S, ctx: &TurnContext<'_>) -> Decision {
    let user_prompt = format!(
        "{}\n# Your Task\nIt is now {}'s turn. Decide its action based on its description, skills and the current situation. Return JSON.",
        ctx.summary(),
        ctx.actor.name
    );
    let result =
        generate_structured::<ActionDecision, S>(service, ACTION_SYSTEM_PROMPT, &user_prompt).await;
    if let Err(e) = &result {
        tracing::warn!(actor = %ctx.actor.name, error = %e, "Action generation failed, using fallback");
    }
    Decision::from_result(result)
}

/// System prompt for observation requests
const OBSERVE_SYSTEM_PROMPT: &str = r#"You are an imaginative game referee. Think from the point of view of the character described below and observe the opponent and the environment, using the character's attributes, traits and the battle record.

Characters with higher INT and WIS understand an opponent's skills and magic faster; battle-hardened characters read tactics more easily.

Reply with ONE short first-person paragraph (plain text, not JSON) summarizing everything the character has understood so far about the opponent and the battlefield. It replaces the character's previous impression, so keep anything still relevant. If the character has just taken damage, acknowledge it."#;

/// System prompt for action requests
const ACTION_SYSTEM_PROMPT: &str = r#"You are an imaginative game referee deciding one character's action based on its profile and the current state of the battle.

RULES:
1. Study the acting character's description, skills and impression of the opponent.
2. Considering the environment and the opponent, choose the most plausible action.
3. Listed skills are only the character's unusual abilities. The character may use any other ability its description makes reasonable; infer a sensible MP cost for such abilities.
4. Attribute values are not absolute. Environment, description and luck can change how a fight goes.
5. mana_cost should not exceed the character's current MP. Only a desperate, all-out action may exceed it. A simple attack may cost 0.
6. power is the damage this action deals to the opponent. Use 0 for actions that deal no damage.
7. Output a single JSON object and nothing else."#;
