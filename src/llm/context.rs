//! Gather turn context for LLM prompts
//!
//! Everything a decision request knows about the current turn: the acting
//! combatant's sheet, who it faces, where, what happened recently and what
//! it currently believes. History arrives already bounded by the engine.

use crate::entity::combatant::Combatant;

/// Shown when a combatant has not formed an impression yet
pub const FIRST_ENCOUNTER: &str = "None yet. This is the first encounter.";

/// Shown when there is no history yet
pub const BATTLE_START: &str = "The battle has just begun.";

/// Turn context for LLM prompts
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub actor: &'a Combatant,
    pub opponent_name: &'a str,
    /// Full opponent state, when the caller has it
    pub opponent: Option<&'a Combatant>,
    pub environment: &'a str,
    /// Most recent history lines, oldest first
    pub recent_history: &'a [String],
    pub impression: Option<&'a str>,
    /// Damage from the opponent's last action the actor has not yet felt
    pub incoming_damage: Option<i32>,
}

impl<'a> TurnContext<'a> {
    pub fn new(actor: &'a Combatant, opponent_name: &'a str, environment: &'a str) -> Self {
        Self {
            actor,
            opponent_name,
            opponent: None,
            environment,
            recent_history: &[],
            impression: None,
            incoming_damage: None,
        }
    }

    /// Also sets the opponent's name
    pub fn with_opponent(mut self, opponent: &'a Combatant) -> Self {
        self.opponent_name = &opponent.name;
        self.opponent = Some(opponent);
        self
    }

    pub fn with_history(mut self, recent_history: &'a [String]) -> Self {
        self.recent_history = recent_history;
        self
    }

    pub fn with_impression(mut self, impression: Option<&'a str>) -> Self {
        self.impression = impression;
        self
    }

    pub fn with_incoming_damage(mut self, incoming_damage: Option<i32>) -> Self {
        self.incoming_damage = incoming_damage;
        self
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("# Environment\n{}\n", self.environment));

        s.push_str("\n# Battle History\n");
        if self.recent_history.is_empty() {
            s.push_str(BATTLE_START);
            s.push('\n');
        }
        for entry in self.recent_history {
            s.push_str(&format!("- {}\n", entry));
        }

        s.push_str(&format!("\n# Acting Character\n{}", self.actor.render_for_reasoning()));
        s.push_str(&format!("\n# Opponent\n{}\n", self.opponent_name));
        if let Some(opponent) = self.opponent {
            s.push_str(&opponent_outline(opponent));
        }

        s.push_str("\n# Current Impression\n");
        match self.impression {
            Some(text) if !text.trim().is_empty() => s.push_str(text.trim()),
            _ => s.push_str(FIRST_ENCOUNTER),
        }
        s.push('\n');

        if let Some(damage) = self.incoming_damage.filter(|d| *d > 0) {
            s.push_str(&format!(
                "\n# Incoming Damage\n{} has just taken {} damage from {}'s last action.\n",
                self.actor.name, damage, self.opponent_name
            ));
        }

        s
    }

    /// Number of history lines this context carries
    pub fn history_len(&self) -> usize {
        self.recent_history.len()
    }
}

/// What a combatant can see of its opponent: health as a share of the
/// maximum and skill names, never raw scores
fn opponent_outline(opponent: &Combatant) -> String {
    let max_hp = opponent.max_hp();
    let percent = if max_hp > 0 {
        (opponent.hp as f64 / max_hp as f64 * 100.0).round() as i64
    } else {
        0
    };
    let skills = if opponent.skills.is_empty() {
        "none".to_string()
    } else {
        opponent
            .skills
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("HP: {}% of maximum\nSkills: {}\n", percent, skills)
}
