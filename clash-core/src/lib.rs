//! Encounter engine for the Quiz Clash school adventure.
//!
//! This crate provides:
//! - The player character and the two opponent kinds (scripted teachers and
//!   a regenerating boss)
//! - Round-based combat with crits, blocks, potions and totem revival
//! - A quiz gate that can beat a teacher without a fight
//! - Progress tracking, lootboxes and a session object tying it together
//!
//! # Quick Start
//!
//! ```ignore
//! use clash_core::{Opponent, Session, SessionConfig};
//! use clash_core::testing::ScriptedActions;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut session = Session::new(SessionConfig::new("Elliot"));
//! let mut johanna = Opponent::scripted("Johanna", 100, 1, 10);
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut actions = ScriptedActions::new(["attack träsvärd"]);
//!
//! let outcome = session.resolve_encounter(&mut johanna, &mut actions, &mut rng)?;
//! println!("{outcome:?}");
//! ```

pub mod combat;
pub mod error;
pub mod items;
pub mod loot;
pub mod luck;
pub mod opponent;
pub mod player;
pub mod progress;
pub mod quiz;
pub mod regen;
pub mod session;
pub mod testing;

// Primary public API
pub use combat::{
    ActionSource, CombatEngine, CombatEvent, CombatLog, CombatPhase, CombatStatus,
    EncounterOutcome, PlayerAction,
};
pub use error::EncounterError;
pub use loot::{LootDrop, LootItem, LootTier};
pub use luck::Luck;
pub use opponent::{Opponent, OpponentId, OpponentStatus};
pub use player::{PlayerCharacter, PlayerStatus, PotionKind, Weapon, WeaponGrant};
pub use progress::{LocationId, Progress};
pub use quiz::{AnswerSource, Question, QuestionBank, QuizGate, QuizOutcome};
pub use regen::{RegenError, RegenEvent, RegenState};
pub use session::{Session, SessionConfig, SessionStatus};
pub use testing::{ScriptedActions, ScriptedLuck};
