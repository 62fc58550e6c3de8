//! Session - the public entry points for a playthrough.
//!
//! A [`Session`] owns the player, the progress tracker and the tuning
//! configuration, and routes every encounter through the combat engine or
//! quiz gate. Once the player dies without a totem the session is over and
//! refuses further encounters.

use crate::combat::{ActionSource, CombatEngine, EncounterOutcome};
use crate::error::EncounterError;
use crate::loot::{self, LootDrop, LootTier};
use crate::luck::Luck;
use crate::opponent::{Opponent, OpponentId};
use crate::player::{PlayerCharacter, PlayerStatus};
use crate::progress::{LocationId, Progress};
use crate::quiz::{AnswerSource, QuestionBank, QuizGate, QuizOutcome, QUIZ_LENGTH, QUIZ_REWARD};
use crate::regen::DEFAULT_REGEN_INTERVAL;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for a new session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Player character name.
    pub player_name: String,

    /// Questions asked per quiz.
    pub quiz_length: usize,

    /// Coins for a perfect quiz.
    pub quiz_reward: u32,

    /// Inclusive coin range for a combat victory.
    pub victory_reward_min: u32,
    pub victory_reward_max: u32,

    /// Tick period for regenerating opponents.
    pub regen_interval: Duration,
}

impl SessionConfig {
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            quiz_length: QUIZ_LENGTH,
            quiz_reward: QUIZ_REWARD,
            victory_reward_min: 10,
            victory_reward_max: 20,
            regen_interval: DEFAULT_REGEN_INTERVAL,
        }
    }

    pub fn with_quiz_length(mut self, length: usize) -> Self {
        self.quiz_length = length;
        self
    }

    pub fn with_quiz_reward(mut self, reward: u32) -> Self {
        self.quiz_reward = reward;
        self
    }

    pub fn with_victory_reward(mut self, min: u32, max: u32) -> Self {
        self.victory_reward_min = min;
        self.victory_reward_max = max;
        self
    }

    pub fn with_regen_interval(mut self, interval: Duration) -> Self {
        self.regen_interval = interval;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("Elev")
    }
}

/// Serializable summary of a session for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub player: PlayerStatus,
    pub defeated: usize,
    pub quiz_attempts: u32,
    pub encounters: u32,
    pub over: bool,
}

/// A single playthrough.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    player: PlayerCharacter,
    progress: Progress,
    engine: CombatEngine,
    gate: QuizGate,
    quiz_attempts: u32,
    encounters: u32,
    over: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let engine = CombatEngine::new()
            .with_reward_range(config.victory_reward_min, config.victory_reward_max);
        let gate = QuizGate::new(config.quiz_length, config.quiz_reward);
        Self {
            player: PlayerCharacter::new(config.player_name.clone()),
            progress: Progress::new(),
            engine,
            gate,
            quiz_attempts: 0,
            encounters: 0,
            over: false,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerCharacter {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerCharacter {
        &mut self.player
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn quiz_attempts(&self) -> u32 {
        self.quiz_attempts
    }

    pub fn encounters(&self) -> u32 {
        self.encounters
    }

    /// True once the player has died with no totem to spare.
    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_defeated(&self, id: OpponentId) -> bool {
        self.progress.is_defeated(id)
    }

    pub fn is_consumed(&self, id: LocationId) -> bool {
        self.progress.is_consumed(id)
    }

    pub fn mark_consumed(&mut self, id: LocationId) -> bool {
        self.progress.mark_consumed(id)
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            player: self.player.status(),
            defeated: self.progress.defeated_count(),
            quiz_attempts: self.quiz_attempts,
            encounters: self.encounters,
            over: self.over,
        }
    }

    /// Fight an opponent directly, without a quiz.
    pub fn resolve_encounter<A, L>(
        &mut self,
        opponent: &mut Opponent,
        actions: &mut A,
        luck: &mut L,
    ) -> Result<EncounterOutcome, EncounterError>
    where
        A: ActionSource + ?Sized,
        L: Luck,
    {
        self.check_can_engage(opponent)?;
        self.prepare(opponent);

        let outcome = self.engine.resolve(
            &mut self.player,
            opponent,
            &mut self.progress,
            actions,
            luck,
        )?;
        self.encounters += 1;
        self.record(&outcome);
        Ok(outcome)
    }

    /// Quiz the player against an opponent, fighting on the first miss.
    pub fn resolve_quiz_gate<Q, A, L>(
        &mut self,
        opponent: &mut Opponent,
        bank: &QuestionBank,
        answers: &mut Q,
        actions: &mut A,
        luck: &mut L,
    ) -> Result<QuizOutcome, EncounterError>
    where
        Q: AnswerSource + ?Sized,
        A: ActionSource + ?Sized,
        L: Luck,
    {
        self.check_can_engage(opponent)?;
        self.prepare(opponent);

        let outcome = self.gate.resolve(
            &self.engine,
            &mut self.player,
            opponent,
            &mut self.progress,
            bank,
            answers,
            actions,
            luck,
        )?;
        self.quiz_attempts += 1;
        if let QuizOutcome::RoutedToCombat { outcome, .. } = &outcome {
            self.encounters += 1;
            self.record(outcome);
        }
        Ok(outcome)
    }

    /// Buy and open a lootbox.
    pub fn open_lootbox<L: Luck>(&mut self, tier: LootTier, luck: &mut L) -> Result<LootDrop, EncounterError> {
        if self.over {
            return Err(EncounterError::PlayerDefeatedFatal);
        }
        loot::open(&mut self.player, tier, luck)
    }

    fn check_can_engage(&self, opponent: &Opponent) -> Result<(), EncounterError> {
        if self.over {
            return Err(EncounterError::PlayerDefeatedFatal);
        }
        if self.progress.is_defeated(opponent.id()) || !opponent.is_alive() {
            return Err(EncounterError::OpponentAlreadyDefeated {
                name: opponent.name().to_string(),
            });
        }
        Ok(())
    }

    fn prepare(&self, opponent: &mut Opponent) {
        if let Some(boss) = opponent.regeneration_mut() {
            if boss.regen_interval() != self.config.regen_interval {
                boss.set_regen_interval(self.config.regen_interval);
            }
        }
    }

    fn record(&mut self, outcome: &EncounterOutcome) {
        if let EncounterOutcome::Loss { .. } = outcome {
            self.over = true;
            warn!(target: "clash::session", player = self.player.name(), "session over");
        } else {
            info!(
                target: "clash::session",
                coins = self.player.coins(),
                defeated = self.progress.defeated_count(),
                "encounter won"
            );
        }
    }
}
