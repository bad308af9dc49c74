//! Turn engine - observe, decide, apply, log
//!
//! Combatants alternate, one action per round. Each round the active
//! combatant:
//! 1. observes: its impression is replaced, and damage dealt by the
//!    opponent's last action lands now
//! 2. decides an action (fallback on any generation failure)
//! 3. pays the action's mana cost, overdraft allowed
//! 4. appends one narration line to history
//!
//! The battle ends on a knock-out or at the round cap. Either way the
//! winner comes from the health evaluator.

use crate::battle::decision::{decide, observe, ActionDecision, Impression};
use crate::battle::history::BattleHistory;
use crate::battle::outcome::{judge, EndReason, Outcome};
use crate::core::config::ArenaConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{CombatantId, Round};
use crate::entity::combatant::Combatant;
use crate::llm::context::TurnContext;
use crate::llm::service::ReasoningService;
use serde::{Deserialize, Serialize};

/// What happened in one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: Round,
    pub actor: CombatantId,
    pub actor_name: String,
    /// Impression held after observing (may be the previous one if the
    /// observation request failed)
    pub impression: Option<String>,
    /// Incoming damage applied during observation
    pub damage_taken: i32,
    /// `None` when the actor was knocked out before it could act
    pub action: Option<ActionDecision>,
    /// The action is the idle fallback
    pub fallback: bool,
    /// History lines included in this round's requests
    pub history_lines: usize,
    pub hp_after: i32,
    pub mp_after: i32,
}

/// A battle in progress
///
/// Owns both combatants for its whole lifetime and hands out only shared
/// references, so nothing can re-initialize them mid-fight.
#[derive(Debug, Clone)]
pub struct Battle {
    combatants: [Combatant; 2],
    impressions: [Option<Impression>; 2],
    /// Damage dealt to each combatant that it has not observed yet
    pending_damage: [i32; 2],
    environment: String,
    config: ArenaConfig,
    history: BattleHistory,
    reports: Vec<RoundReport>,
    round: Round,
    active: usize,
    ended: Option<EndReason>,
}

impl Battle {
    /// `first` acts in round 1. Both combatants must already have had
    /// their resources initialized.
    pub fn new(
        first: Combatant,
        second: Combatant,
        environment: impl Into<String>,
        config: ArenaConfig,
    ) -> Result<Self> {
        config.validate()?;
        for c in [&first, &second] {
            if c.is_defeated() {
                return Err(ArenaError::Validation(format!(
                    "{} enters the battle with {} HP; call initialize_resources() first",
                    c.name, c.hp
                )));
            }
        }

        Ok(Self {
            combatants: [first, second],
            impressions: [None, None],
            pending_damage: [0, 0],
            environment: environment.into(),
            config,
            history: BattleHistory::new(),
            reports: Vec::new(),
            round: 0,
            active: 0,
            ended: None,
        })
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn combatants(&self) -> &[Combatant; 2] {
        &self.combatants
    }

    pub fn impression(&self, index: usize) -> Option<&Impression> {
        self.impressions.get(index).and_then(|i| i.as_ref())
    }

    pub fn history(&self) -> &BattleHistory {
        &self.history
    }

    pub fn reports(&self) -> &[RoundReport] {
        &self.reports
    }

    pub fn is_over(&self) -> bool {
        self.ended.is_some()
    }

    /// Index of the combatant who acts next
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Play exactly one round. Returns `None` once the battle is over.
    pub async fn play_round<S: ReasoningService>(&mut self, service: &S) -> Option<RoundReport> {
        if self.ended.is_some() {
            return None;
        }

        self.round += 1;
        let actor = self.active;
        let opponent = 1 - actor;
        let window = self.config.history_window;

        let incoming = std::mem::take(&mut self.pending_damage[actor]);
        let incoming = (incoming > 0).then_some(incoming);

        // 1. Observe
        let history_lines = self.history.recent(window).len();
        let observed = {
            let ctx = TurnContext::new(
                &self.combatants[actor],
                &self.combatants[opponent].name,
                &self.environment,
            )
            .with_opponent(&self.combatants[opponent])
            .with_history(self.history.recent(window))
            .with_impression(self.impressions[actor].as_ref().map(|i| i.summary.as_str()))
            .with_incoming_damage(incoming);
            observe(service, &ctx).await
        };
        match observed {
            Ok(impression) => self.impressions[actor] = Some(impression),
            Err(e) => {
                tracing::warn!(
                    actor = %self.combatants[actor].name,
                    error = %e,
                    "Observation failed, keeping previous impression"
                );
                if let Some(kept) = self.impressions[actor].as_mut() {
                    kept.incoming_damage = incoming;
                }
            }
        }

        let damage_taken = incoming.unwrap_or(0);
        if damage_taken > 0 {
            self.combatants[actor].apply_damage(damage_taken);
        }

        let (action, fallback) = if self.combatants[actor].is_defeated() {
            let line = format!(
                "Round {}, {} collapses from its wounds.",
                self.round, self.combatants[actor].name
            );
            self.history.push(line);
            (None, false)
        } else {
            // 2. Decide
            let decision = {
                let ctx = TurnContext::new(
                    &self.combatants[actor],
                    &self.combatants[opponent].name,
                    &self.environment,
                )
                .with_opponent(&self.combatants[opponent])
                .with_history(self.history.recent(window))
                .with_impression(self.impressions[actor].as_ref().map(|i| i.summary.as_str()))
                .with_incoming_damage(incoming);
                decide(service, &ctx).await
            };
            let fallback = decision.is_failed();
            let action = decision.into_action(&self.combatants[actor].name);

            // 3. Apply
            self.combatants[actor].spend_mana(action.mana_cost);
            if action.power > 0 {
                self.pending_damage[opponent] =
                    self.pending_damage[opponent].saturating_add(action.power);
            }

            // 4. Log
            self.history
                .push(action.narrate(self.round, &self.combatants[actor].name));
            (Some(action), fallback)
        };

        let report = RoundReport {
            round: self.round,
            actor: self.combatants[actor].id,
            actor_name: self.combatants[actor].name.clone(),
            impression: self.impressions[actor].as_ref().map(|i| i.summary.clone()),
            damage_taken,
            action,
            fallback,
            history_lines,
            hp_after: self.combatants[actor].hp,
            mp_after: self.combatants[actor].mp,
        };
        tracing::debug!(
            round = report.round,
            actor = %report.actor_name,
            action = report.action.as_ref().map(|a| a.action.as_str()).unwrap_or("-"),
            hp = report.hp_after,
            mp = report.mp_after,
            fallback = report.fallback,
            "Round resolved"
        );
        self.reports.push(report.clone());

        // 5. Termination
        if self.combatants.iter().any(|c| c.is_defeated()) {
            self.ended = Some(EndReason::Knockout);
        } else if self.round >= self.config.max_rounds {
            self.ended = Some(EndReason::RoundLimit);
        }

        // 6. Swap
        self.active = opponent;

        Some(report)
    }

    /// Play until the battle ends and produce the outcome
    pub async fn run<S: ReasoningService>(mut self, service: &S) -> Outcome {
        tracing::info!(
            first = %self.combatants[0].name,
            second = %self.combatants[1].name,
            max_rounds = self.config.max_rounds,
            "Battle started"
        );
        while self.play_round(service).await.is_some() {}
        self.finish()
    }

    /// Close the battle and judge it
    ///
    /// Damage dealt in the last round was never observed by its target;
    /// it lands here so the final blow counts.
    pub fn finish(mut self) -> Outcome {
        for i in 0..2 {
            let pending = std::mem::take(&mut self.pending_damage[i]);
            if pending > 0 {
                self.combatants[i].apply_damage(pending);
            }
        }

        let reason = if self.combatants.iter().any(|c| c.is_defeated()) {
            EndReason::Knockout
        } else {
            self.ended.unwrap_or(EndReason::RoundLimit)
        };
        let verdict = judge(&self.combatants[0], &self.combatants[1]);
        tracing::info!(rounds = self.round, ?reason, ?verdict, "Battle ended");

        Outcome {
            verdict,
            reason,
            rounds_played: self.round,
            history: self.history,
            reports: self.reports,
            combatants: self.combatants,
        }
    }
}

/// Run a full battle between two initialized combatants
pub async fn run_battle<S: ReasoningService>(
    service: &S,
    first: Combatant,
    second: Combatant,
    environment: &str,
    config: &ArenaConfig,
) -> Result<Outcome> {
    let battle = Battle::new(first, second, environment, config.clone())?;
    Ok(battle.run(service).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::decision::FALLBACK_ACTION;
    use crate::entity::ability::AbilityScores;
    use crate::entity::alignment::Alignment;
    use crate::llm::service::Prompt;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers observations with a fixed line and actions from a queue
    struct Scripted {
        actions: Mutex<VecDeque<String>>,
    }

    impl Scripted {
        fn new(actions: &[&str]) -> Self {
            Self {
                actions: Mutex::new(actions.iter().map(|s| s.to_string()).collect()),
            }
        }
    }

    impl ReasoningService for Scripted {
        async fn complete(&self, prompt: &Prompt<'_>) -> Result<String> {
            if !prompt.expect_json {
                return Ok("I size up my opponent.".into());
            }
            self.actions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ArenaError::Generation("script exhausted".into()))
        }
    }

    /// Observations succeed until the history reaches round 2, then fail;
    /// actions come from a queue
    struct ForgetfulAfterRoundTwo {
        actions: Mutex<VecDeque<String>>,
    }

    impl ReasoningService for ForgetfulAfterRoundTwo {
        async fn complete(&self, prompt: &Prompt<'_>) -> Result<String> {
            if !prompt.expect_json {
                if prompt.user.contains("- Round 2,") {
                    return Err(ArenaError::Generation("observation timed out".into()));
                }
                return Ok("The opponent favors its left side.".into());
            }
            self.actions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ArenaError::Generation("script exhausted".into()))
        }
    }

    fn action(name: &str, mana: i32, power: i32) -> String {
        format!(
            r#"{{"action": "{}", "type": "attack", "description": "{} strikes", "thought": "t", "mana_cost": {}, "power": {}}}"#,
            name, name, mana, power
        )
    }

    fn fighter(name: &str) -> Combatant {
        let mut c = Combatant::new(
            name,
            "",
            Alignment::new("N", "True Neutral", ""),
            AbilityScores::new(10, 10, 10, 10, 10, 10, 10),
        );
        c.initialize_resources();
        c
    }

    #[test]
    fn test_uninitialized_combatant_rejected() {
        let raw = Combatant::new(
            "raw",
            "",
            Alignment::new("N", "True Neutral", ""),
            AbilityScores::new(10, 10, 10, 10, 10, 10, 10),
        );
        let result = Battle::new(fighter("a"), raw, "arena", ArenaConfig::default());
        assert!(matches!(result, Err(ArenaError::Validation(_))));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ArenaConfig::default().with_max_rounds(0);
        assert!(Battle::new(fighter("a"), fighter("b"), "arena", config).is_err());
    }

    #[tokio::test]
    async fn test_roles_alternate() {
        let service = Scripted::new(&[&action("Jab", 0, 0), &action("Cross", 0, 0)]);
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();

        let first = battle.play_round(&service).await.unwrap();
        assert_eq!(first.actor_name, "a");
        assert_eq!(battle.active_index(), 1);

        let second = battle.play_round(&service).await.unwrap();
        assert_eq!(second.actor_name, "b");
        assert_eq!(battle.round(), 2);
    }

    #[tokio::test]
    async fn test_damage_lands_at_next_observation() {
        let service = Scripted::new(&[&action("Magma Fist", 10, 25), &action("Dodge", 0, 0)]);
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();

        battle.play_round(&service).await;
        // b has not observed yet
        assert_eq!(battle.combatants()[1].hp, 110);
        assert_eq!(battle.combatants()[0].mp, 70 - 10);

        let report = battle.play_round(&service).await.unwrap();
        assert_eq!(report.damage_taken, 25);
        assert_eq!(report.hp_after, 85);
        assert_eq!(battle.impression(1).unwrap().incoming_damage, Some(25));
    }

    #[tokio::test]
    async fn test_mana_overdraft() {
        let service = Scripted::new(&[&action("All Out", 500, 0)]);
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();
        let report = battle.play_round(&service).await.unwrap();
        assert_eq!(report.mp_after, 70 - 500);
    }

    #[tokio::test]
    async fn test_extreme_mana_cost_saturates() {
        let all_out = action("All Out", i32::MAX, 0);
        let service = Scripted::new(&[&all_out, &all_out, &all_out]);
        let config = ArenaConfig::default().with_max_rounds(3);
        let outcome = run_battle(&service, fighter("a"), fighter("b"), "arena", &config)
            .await
            .unwrap();

        assert_eq!(outcome.rounds_played, 3);
        assert_eq!(outcome.fallback_count(), 0);
        assert_eq!(outcome.combatants[0].mp, i32::MIN);
        assert_eq!(outcome.combatants[1].mp, 70 - i32::MAX);
    }

    #[tokio::test]
    async fn test_extreme_power_saturates() {
        let huge = action("Cataclysm", 0, i32::MAX);
        let service = Scripted::new(&[&huge]);
        let config = ArenaConfig::default().with_max_rounds(1);
        let outcome = run_battle(&service, fighter("a"), fighter("b"), "arena", &config)
            .await
            .unwrap();

        assert_eq!(outcome.combatants[1].hp, 110 - i32::MAX);
        assert_eq!(outcome.reason, EndReason::Knockout);
        assert_eq!(outcome.winner(), Some("a"));
    }

    #[tokio::test]
    async fn test_failed_observation_keeps_impression_and_lands_damage() {
        let service = ForgetfulAfterRoundTwo {
            actions: Mutex::new(
                [action("Feint", 0, 0), action("Lunge", 0, 30), action("Parry", 0, 0)]
                    .into_iter()
                    .collect(),
            ),
        };
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();

        battle.play_round(&service).await;
        battle.play_round(&service).await;
        let report = battle.play_round(&service).await.unwrap();

        assert_eq!(report.actor_name, "a");
        assert_eq!(report.damage_taken, 30);
        assert_eq!(report.hp_after, 110 - 30);
        assert_eq!(battle.combatants()[0].hp, 80);
        assert!(!report.fallback);

        let kept = battle.impression(0).unwrap();
        assert_eq!(kept.summary, "The opponent favors its left side.");
        assert_eq!(kept.incoming_damage, Some(30));
        assert_eq!(
            report.impression.as_deref(),
            Some("The opponent favors its left side.")
        );
    }

    #[tokio::test]
    async fn test_prompts_describe_opponent() {
        struct Capture(Mutex<Vec<String>>);

        impl ReasoningService for Capture {
            async fn complete(&self, prompt: &Prompt<'_>) -> Result<String> {
                self.0.lock().unwrap().push(prompt.user.to_string());
                Err(ArenaError::Generation("offline".into()))
            }
        }

        let service = Capture(Mutex::new(Vec::new()));
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();
        battle.play_round(&service).await;

        let prompts = service.0.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts
            .iter()
            .all(|p| p.contains("# Opponent\nb\nHP: 100% of maximum\nSkills: none\n")));
    }

    #[tokio::test]
    async fn test_knockout_ends_battle() {
        let service = Scripted::new(&[&action("Blood Freeze", 20, 500)]);
        let outcome = run_battle(
            &service,
            fighter("a"),
            fighter("b"),
            "arena",
            &ArenaConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(outcome.rounds_played, 2);
        assert_eq!(outcome.reason, EndReason::Knockout);
        assert_eq!(outcome.winner(), Some("a"));
        assert!(outcome.reports[1].action.is_none());
        assert!(outcome.history.entries()[1].contains("collapses"));
    }

    #[tokio::test]
    async fn test_final_blow_lands_at_round_limit() {
        let service = Scripted::new(&[&action("Jab", 0, 5)]);
        let config = ArenaConfig::default().with_max_rounds(1);
        let outcome = run_battle(&service, fighter("a"), fighter("b"), "arena", &config)
            .await
            .unwrap();

        assert_eq!(outcome.rounds_played, 1);
        assert_eq!(outcome.reason, EndReason::RoundLimit);
        assert_eq!(outcome.combatants[1].hp, 105);
        assert_eq!(outcome.winner(), Some("a"));
    }

    #[tokio::test]
    async fn test_fallback_when_script_runs_out() {
        let service = Scripted::new(&[]);
        let mut battle =
            Battle::new(fighter("a"), fighter("b"), "arena", ArenaConfig::default()).unwrap();
        let report = battle.play_round(&service).await.unwrap();
        assert!(report.fallback);
        assert_eq!(report.action.unwrap().action, FALLBACK_ACTION);
        assert_eq!(battle.round(), 1);
    }

    #[tokio::test]
    async fn test_no_rounds_after_end() {
        let service = Scripted::new(&[]);
        let config = ArenaConfig::default().with_max_rounds(2);
        let mut battle = Battle::new(fighter("a"), fighter("b"), "arena", config).unwrap();
        assert!(battle.play_round(&service).await.is_some());
        assert!(battle.play_round(&service).await.is_some());
        assert!(battle.is_over());
        assert!(battle.play_round(&service).await.is_none());
        assert_eq!(battle.round(), 2);
    }
}
