//! QA tests for the regenerating boss.
//!
//! Timing-only checks run on a paused runtime. The full encounter runs on a
//! multi-threaded runtime because the engine blocks while the regeneration
//! task ticks in the background.

use clash_core::regen::RegenState;
use clash_core::testing::{assert_never_saw, assert_saw, ScriptedLuck};
use clash_core::{
    ActionSource, CombatEvent, CombatStatus, Opponent, PlayerAction, Session, SessionConfig, Weapon,
};
use std::time::Duration;

fn lars(interval: Duration) -> Opponent {
    Opponent::regenerating("Lars", 500, 20, 50, 20).with_regen_interval(interval)
}

// =============================================================================
// TEST 1: Ticks heal, clamp and stop
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_one_interval_heals_regen_amount() {
    let mut boss = lars(Duration::from_millis(17_500));
    boss.take_damage(100);
    boss.regeneration_mut().unwrap().start_regen().unwrap();

    tokio::time::sleep(Duration::from_millis(17_600)).await;
    assert_eq!(boss.health(), 420);

    let regen = boss.regeneration_mut().unwrap();
    regen.stop_regen();
    assert_eq!(regen.regeneration().state(), RegenState::Stopped);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(boss.health(), 420);
}

#[tokio::test(start_paused = true)]
async fn test_regeneration_clamps_at_max() {
    let mut boss = lars(Duration::from_secs(1));
    boss.take_damage(30);
    boss.regeneration_mut().unwrap().start_regen().unwrap();

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(boss.health(), 500);

    // Ticks that find the boss at full health heal nothing and say nothing.
    let regen = boss.regeneration_mut().unwrap();
    let events = regen.drain_regen_events();
    let gains: Vec<i32> = events.iter().map(|e| e.amount).collect();
    assert_eq!(gains, vec![20, 10]);
    assert!(events.iter().all(|e| e.health <= e.max_health));
    regen.stop_regen();
}

#[tokio::test(start_paused = true)]
async fn test_stopped_boss_can_restart() {
    let mut boss = lars(Duration::from_secs(1));
    boss.take_damage(100);
    let regen = boss.regeneration_mut().unwrap();
    regen.start_regen().unwrap();
    regen.stop_regen();
    regen.start_regen().unwrap();
    assert_eq!(regen.regeneration().state(), RegenState::Active);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(boss.health(), 420);
    boss.regeneration_mut().unwrap().stop_regen();
}

// =============================================================================
// TEST 2: A live fight against the boss
// =============================================================================

/// Plays an opening action, stalls long enough for the boss to heal, then
/// swings the frying pan until the fight ends.
struct StallingPlayer {
    opening: &'static str,
    prompts: usize,
    stall: Duration,
    events: Vec<CombatEvent>,
}

impl ActionSource for StallingPlayer {
    fn next_action(&mut self, _status: &CombatStatus) -> PlayerAction {
        self.prompts += 1;
        match self.prompts {
            1 => PlayerAction::parse(self.opening),
            2 => {
                std::thread::sleep(self.stall);
                PlayerAction::Wait
            }
            _ => PlayerAction::parse("attack stekpanna"),
        }
    }

    fn observe(&mut self, event: &CombatEvent) {
        self.events.push(event.clone());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_boss_regenerates_between_rounds_and_stops_on_defeat() {
    let config = SessionConfig::new("Tester").with_regen_interval(Duration::from_millis(40));
    let mut session = Session::new(config);
    session.player_mut().add_weapon(Weapon::new("stekpanna", 69));
    let mut boss = Opponent::regenerating("Lars", 100, 1, 1, 20);
    let mut player = StallingPlayer {
        opening: "attack träsvärd",
        prompts: 0,
        stall: Duration::from_millis(250),
        events: Vec::new(),
    };

    let outcome = tokio::task::block_in_place(|| {
        session.resolve_encounter(&mut boss, &mut player, &mut ScriptedLuck::new())
    })
    .unwrap();

    assert!(outcome.is_victory());
    assert!(outcome.log().regenerated > 0);
    assert!(player
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::Regenerated(event) if event.opponent == "Lars")));
    assert!(session.is_defeated(boss.id()));

    // No tick may bring a defeated boss back.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(boss.health(), 0);
    let regen = boss.regeneration_mut().unwrap();
    assert_eq!(regen.regeneration().state(), RegenState::Stopped);
    assert!(regen.drain_regen_events().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_player_death_stops_regeneration() {
    let config = SessionConfig::new("Tester").with_regen_interval(Duration::from_millis(20));
    let mut session = Session::new(config);
    session.player_mut().take_damage(80);
    let mut boss = Opponent::regenerating("Lars", 500, 20, 50, 20);
    let mut actions = clash_core::ScriptedActions::new(["attack träsvärd"]);

    let outcome = tokio::task::block_in_place(|| {
        session.resolve_encounter(&mut boss, &mut actions, &mut ScriptedLuck::new())
    })
    .unwrap();

    assert!(!outcome.is_victory());
    assert!(session.is_over());
    assert_saw(&actions, "game over", |e| matches!(e, CombatEvent::GameOver { .. }));
    assert_never_saw(&actions, "a victory", |e| matches!(e, CombatEvent::Victory { .. }));

    let health = boss.health();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(boss.health(), health);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_full_health_boss_logs_no_regeneration() {
    let config = SessionConfig::new("Tester").with_regen_interval(Duration::from_millis(20));
    let mut session = Session::new(config);
    session.player_mut().add_weapon(Weapon::new("stekpanna", 69));
    let mut boss = Opponent::regenerating("Lars", 60, 1, 1, 20);
    let mut player = StallingPlayer {
        opening: "wait",
        prompts: 0,
        stall: Duration::from_millis(200),
        events: Vec::new(),
    };

    let outcome = tokio::task::block_in_place(|| {
        session.resolve_encounter(&mut boss, &mut player, &mut ScriptedLuck::new())
    })
    .unwrap();

    assert!(outcome.is_victory());
    assert_eq!(outcome.log().regenerated, 0);
    assert!(!player
        .events
        .iter()
        .any(|e| matches!(e, CombatEvent::Regenerated(_))));
}
