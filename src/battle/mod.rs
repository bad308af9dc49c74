//! Turn-based duel between two combatants
//!
//! Each round one combatant observes, then acts. Damage from an action
//! lands when its target next observes.

pub mod decision;
pub mod engine;
pub mod history;
pub mod outcome;

pub use decision::{
    decide, observe, ActionDecision, ActionKind, Decision, GenerationFailure, Impression,
    FALLBACK_ACTION,
};
pub use engine::{run_battle, Battle, RoundReport};
pub use history::BattleHistory;
pub use outcome::{evaluate, judge, EndReason, HealthReport, Outcome, Verdict};
