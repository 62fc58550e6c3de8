//! Testing utilities for the encounter engine.
//!
//! This module provides deterministic doubles for integration tests:
//! - `ScriptedLuck` pins every random outcome
//! - `ScriptedActions` replays a fixed list of player actions
//! - Assertion helpers for verifying player and opponent state

use crate::combat::{ActionSource, CombatEvent, CombatStatus, PlayerAction};
use crate::luck::Luck;
use crate::opponent::Opponent;
use crate::player::PlayerCharacter;
use std::collections::VecDeque;

/// A [`Luck`] that returns queued outcomes.
///
/// When a queue runs dry it falls back to the least eventful result:
/// chances fail, ranges yield their low end and draws keep bank order.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLuck {
    chances: VecDeque<bool>,
    rolls: VecDeque<i32>,
}

impl ScriptedLuck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results for `chance` calls (crit and block checks).
    pub fn with_chances(mut self, chances: impl IntoIterator<Item = bool>) -> Self {
        self.chances.extend(chances);
        self
    }

    /// Queue results for `between` calls (damage, rewards, loot picks).
    ///
    /// Values are clamped into the requested range.
    pub fn with_rolls(mut self, rolls: impl IntoIterator<Item = i32>) -> Self {
        self.rolls.extend(rolls);
        self
    }
}

impl Luck for ScriptedLuck {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn between(&mut self, low: i32, high: i32) -> i32 {
        match self.rolls.pop_front() {
            Some(value) if high > low => value.clamp(low, high),
            _ => low,
        }
    }

    fn draw(&mut self, len: usize, amount: usize) -> Vec<usize> {
        (0..len.min(amount)).collect()
    }
}

/// An [`ActionSource`] that replays scripted input lines.
///
/// Once the script is exhausted the player waits. Every observed event is
/// kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedActions {
    actions: VecDeque<PlayerAction>,
    events: Vec<CombatEvent>,
    prompts: usize,
}

impl ScriptedActions {
    /// Parse each line as the player would type it.
    pub fn new<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            actions: lines
                .into_iter()
                .map(|line| PlayerAction::parse(line.as_ref()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// How many times the engine asked for an action.
    pub fn prompts(&self) -> usize {
        self.prompts
    }
}

impl ActionSource for ScriptedActions {
    fn next_action(&mut self, _status: &CombatStatus) -> PlayerAction {
        self.prompts += 1;
        self.actions.pop_front().unwrap_or(PlayerAction::Wait)
    }

    fn observe(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
    }
}

/// A weak opponent that dies to one starter-weapon hit.
pub fn sample_dummy() -> Opponent {
    Opponent::scripted("Dummy", 10, 1, 1)
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert player health.
#[track_caller]
pub fn assert_player_health(player: &PlayerCharacter, expected: i32) {
    assert_eq!(
        player.health(),
        expected,
        "Expected player health {expected}, got {}",
        player.health()
    );
}

/// Assert opponent health.
#[track_caller]
pub fn assert_opponent_health(opponent: &Opponent, expected: i32) {
    assert_eq!(
        opponent.health(),
        expected,
        "Expected {} health {expected}, got {}",
        opponent.name(),
        opponent.health()
    );
}

/// Assert that at least one observed event matches the predicate.
#[track_caller]
pub fn assert_saw(actions: &ScriptedActions, what: &str, predicate: impl Fn(&CombatEvent) -> bool) {
    assert!(
        actions.events().iter().any(predicate),
        "Expected to observe {what}, got {:?}",
        actions.events()
    );
}

/// Assert that no observed event matches the predicate.
#[track_caller]
pub fn assert_never_saw(actions: &ScriptedActions, what: &str, predicate: impl Fn(&CombatEvent) -> bool) {
    assert!(
        !actions.events().iter().any(predicate),
        "Expected NOT to observe {what}, got {:?}",
        actions.events()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_luck_fallbacks() {
        let mut luck = ScriptedLuck::new().with_chances([true]).with_rolls([99]);
        assert!(luck.chance(0.15));
        assert!(!luck.chance(0.15));
        assert_eq!(luck.between(10, 20), 20);
        assert_eq!(luck.between(10, 20), 10);
        assert_eq!(luck.draw(3, 5), vec![0, 1, 2]);
    }

    #[test]
    fn test_scripted_actions_fall_back_to_wait() {
        let mut actions = ScriptedActions::new(["heal normal"]);
        let status = CombatStatus {
            round: 1,
            player: PlayerCharacter::new("P").status(),
            opponent: sample_dummy().status(),
        };
        assert_eq!(
            actions.next_action(&status),
            PlayerAction::Heal {
                potion: "normal".to_string()
            }
        );
        assert_eq!(actions.next_action(&status), PlayerAction::Wait);
        assert_eq!(actions.prompts(), 2);
    }
}
