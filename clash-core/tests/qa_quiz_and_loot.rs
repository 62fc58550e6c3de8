//! QA tests for the quiz gate, lootboxes and progress bookkeeping.

use clash_core::testing::{ScriptedActions, ScriptedLuck};
use clash_core::{
    EncounterError, LocationId, LootItem, LootTier, Opponent, QuestionBank, QuizOutcome, Session,
    SessionConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn physics_bank() -> QuestionBank {
    QuestionBank::from_pairs([
        ("Vilken enhet har kraft?", "Newton"),
        ("Vad är ljusets hastighet i km/s, ungefär?", "300000"),
        ("Vad kallas rörelseenergi?", "Kinetisk energi"),
        ("Vilken storhet mäts i joule?", "Energi"),
        ("Vad är g på jorden i m/s2, avrundat?", "9,82"),
        ("Vad mäts i watt?", "Effekt"),
        ("Vad heter enheten för tryck?", "Pascal"),
    ])
}

// =============================================================================
// TEST 1: Perfect quiz
// =============================================================================

#[test]
fn test_perfect_quiz_defeats_without_combat() {
    let bank = physics_bank();
    let mut session = Session::new(SessionConfig::new("Tester"));
    let mut henrik = Opponent::scripted("Henrik", 125, 8, 18);
    let mut rng = StdRng::seed_from_u64(2024);
    let mut asked = Vec::new();
    let mut answers = |prompt: &str| {
        asked.push(prompt.to_string());
        format!("  {}  ", bank.answer_for(prompt).unwrap_or_default().to_uppercase())
    };
    let mut actions = ScriptedActions::new(Vec::<String>::new());

    let outcome = session
        .resolve_quiz_gate(&mut henrik, &bank, &mut answers, &mut actions, &mut rng)
        .unwrap();

    assert_eq!(outcome, QuizOutcome::InstantWin { reward: 15 });
    assert_eq!(asked.len(), 5);
    let unique: HashSet<_> = asked.iter().collect();
    assert_eq!(unique.len(), 5);
    assert_eq!(session.player().coins(), 20);
    assert_eq!(henrik.health(), 0);
    assert!(session.is_defeated(henrik.id()));
    assert_eq!(actions.prompts(), 0);
}

// =============================================================================
// TEST 2: A miss hands off to combat exactly once
// =============================================================================

#[test]
fn test_late_miss_routes_to_single_combat() {
    let bank = physics_bank();
    let mut session = Session::new(SessionConfig::new("Tester"));
    let mut henrik = Opponent::scripted("Henrik", 10, 8, 18);
    let mut asked = 0;
    let mut answers = |prompt: &str| {
        asked += 1;
        if asked == 4 {
            "no idea".to_string()
        } else {
            bank.answer_for(prompt).unwrap_or_default().to_string()
        }
    };
    let mut actions = ScriptedActions::new(["attack träsvärd"]);

    let outcome = session
        .resolve_quiz_gate(
            &mut henrik,
            &bank,
            &mut answers,
            &mut actions,
            &mut ScriptedLuck::new().with_rolls([12]),
        )
        .unwrap();

    match outcome {
        QuizOutcome::RoutedToCombat { correct, outcome } => {
            assert_eq!(correct, 3);
            assert!(outcome.is_victory());
        }
        other => panic!("expected combat, got {other:?}"),
    }
    assert_eq!(asked, 4);
    assert_eq!(session.encounters(), 1);
    assert_eq!(session.quiz_attempts(), 1);
    // Combat reward of 12, no quiz bonus.
    assert_eq!(session.player().coins(), 17);
}

#[test]
fn test_defeated_teacher_is_not_quizzed_again() {
    let bank = physics_bank();
    let mut session = Session::new(SessionConfig::new("Tester"));
    let mut henrik = Opponent::scripted("Henrik", 125, 8, 18);
    let mut right = |prompt: &str| bank.answer_for(prompt).unwrap_or_default().to_string();

    session
        .resolve_quiz_gate(
            &mut henrik,
            &bank,
            &mut right,
            &mut ScriptedActions::new(Vec::<String>::new()),
            &mut ScriptedLuck::new(),
        )
        .unwrap();

    let mut called = false;
    let err = session
        .resolve_quiz_gate(
            &mut henrik,
            &bank,
            &mut |_: &str| {
                called = true;
                String::new()
            },
            &mut ScriptedActions::new(Vec::<String>::new()),
            &mut ScriptedLuck::new(),
        )
        .unwrap_err();

    assert!(matches!(err, EncounterError::OpponentAlreadyDefeated { .. }));
    assert!(!called);
    assert_eq!(session.quiz_attempts(), 1);
    assert_eq!(session.player().coins(), 20);
}

// =============================================================================
// TEST 3: Lootboxes
// =============================================================================

#[test]
fn test_lootbox_spending() {
    let mut session = Session::new(SessionConfig::new("Tester"));

    let err = session
        .open_lootbox(LootTier::Epic, &mut ScriptedLuck::new())
        .unwrap_err();
    assert_eq!(
        err,
        EncounterError::InsufficientFunds {
            needed: 15,
            available: 5
        }
    );

    let drop = session
        .open_lootbox(LootTier::Normal, &mut ScriptedLuck::new().with_rolls([2]))
        .unwrap();
    assert_eq!(drop.item.to_string(), "normal potion");
    assert!(matches!(drop.item, LootItem::Potion { .. }));
    assert_eq!(session.player().coins(), 0);
    assert_eq!(session.player().potions(clash_core::PotionKind::Normal), 3);
}

#[test]
fn test_lootbox_draws_cover_pool() {
    let mut session = Session::new(SessionConfig::new("Tester"));
    session.player_mut().award_coins(15 * 40);
    let mut rng = StdRng::seed_from_u64(77);
    let mut seen = HashSet::new();
    for _ in 0..40 {
        let drop = session.open_lootbox(LootTier::Epic, &mut rng).unwrap();
        seen.insert(drop.item.to_string());
    }
    assert_eq!(seen.len(), 5);
    assert_eq!(session.player().coins(), 5);
}

// =============================================================================
// TEST 4: Location bookkeeping
// =============================================================================

#[test]
fn test_locations_fire_once() {
    let mut session = Session::new(SessionConfig::new("Tester"));
    let rooms: Vec<LocationId> = (0..7).map(|_| LocationId::new()).collect();

    for room in &rooms {
        assert!(session.mark_consumed(*room));
    }
    for room in &rooms {
        assert!(session.is_consumed(*room));
        assert!(!session.mark_consumed(*room));
    }
}
