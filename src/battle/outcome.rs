//! Health evaluation and the battle verdict
//!
//! The winner is always decided here from HP ratios, never by the engine,
//! whether the battle ended by knock-out or by the round cap.

use crate::battle::engine::RoundReport;
use crate::battle::history::BattleHistory;
use crate::core::types::{CombatantId, Round};
use crate::entity::combatant::Combatant;
use serde::{Deserialize, Serialize};

/// Remaining health relative to the derived maximum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// current / max; negative once HP is below zero
    pub hp_ratio: f64,
    pub hp_lost: i32,
}

/// Max HP is derived fresh from ability scores on every call
pub fn evaluate(combatant: &Combatant) -> HealthReport {
    let max_hp = combatant.max_hp();
    let hp_ratio = if max_hp > 0 {
        combatant.hp as f64 / max_hp as f64
    } else {
        0.0
    };
    HealthReport {
        hp_ratio,
        hp_lost: max_hp - combatant.hp,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Victory { winner: CombatantId, name: String },
    /// Identical HP ratios
    Draw,
}

/// Strictly higher HP ratio wins; equal ratios are a draw
pub fn judge(a: &Combatant, b: &Combatant) -> Verdict {
    let ra = evaluate(a).hp_ratio;
    let rb = evaluate(b).hp_ratio;
    if ra > rb {
        Verdict::Victory {
            winner: a.id,
            name: a.name.clone(),
        }
    } else if rb > ra {
        Verdict::Victory {
            winner: b.id,
            name: b.name.clone(),
        }
    } else {
        Verdict::Draw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A combatant's HP reached zero or below
    Knockout,
    /// The round cap was reached with both combatants standing
    RoundLimit,
}

/// Result of a finished battle
#[derive(Debug, Clone)]
pub struct Outcome {
    pub verdict: Verdict,
    pub reason: EndReason,
    pub rounds_played: Round,
    pub history: BattleHistory,
    pub reports: Vec<RoundReport>,
    /// Final state of both combatants, in starting order
    pub combatants: [Combatant; 2],
}

impl Outcome {
    /// Winner's name, or `None` for a draw
    pub fn winner(&self) -> Option<&str> {
        match &self.verdict {
            Verdict::Victory { name, .. } => Some(name.as_str()),
            Verdict::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self.verdict, Verdict::Draw)
    }

    pub fn health(&self) -> [HealthReport; 2] {
        [evaluate(&self.combatants[0]), evaluate(&self.combatants[1])]
    }

    /// How many rounds ended with the fallback action
    pub fn fallback_count(&self) -> usize {
        self.reports.iter().filter(|r| r.fallback).count()
    }
}
