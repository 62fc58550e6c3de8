//! Error taxonomy shared by every encounter entry point.

use crate::player::PotionKind;
use crate::regen::RegenError;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while resolving encounters, quizzes and loot.
///
/// Most variants are recoverable: the engine reports them and asks the
/// player again within the same round. Only [`EncounterError::PlayerDefeatedFatal`]
/// ends a session.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum EncounterError {
    #[error("Invalid weapon: '{requested}'. Available weapons: {}", .owned.join(", "))]
    UnknownWeapon {
        requested: String,
        owned: Vec<String>,
    },

    #[error("Wait {:.1} more seconds between potions", .remaining.as_secs_f64())]
    HealCooldownActive { remaining: Duration },

    #[error("No {kind} potions left")]
    InsufficientPotions { kind: PotionKind },

    #[error("Unknown potion type: '{0}' (expected normal or epic)")]
    UnknownPotion(String),

    #[error("Invalid choice '{0}', turn lost")]
    UnrecognizedAction(String),

    #[error("Need {needed} coins but only have {available}")]
    InsufficientFunds { needed: u32, available: u32 },

    #[error("{name} is already defeated")]
    OpponentAlreadyDefeated { name: String },

    #[error("{opponent} has no quiz questions")]
    EmptyQuestionBank { opponent: String },

    #[error("Regeneration error: {0}")]
    Regen(#[from] RegenError),

    #[error("The player has fallen and the session is over")]
    PlayerDefeatedFatal,
}

impl EncounterError {
    /// Whether the player can simply be asked again.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            EncounterError::PlayerDefeatedFatal | EncounterError::Regen(_)
        )
    }

    /// Whether the failed action still hands the opponent its attack.
    pub fn costs_turn(&self) -> bool {
        matches!(self, EncounterError::UnrecognizedAction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_weapon_lists_inventory() {
        let err = EncounterError::UnknownWeapon {
            requested: "spoon".to_string(),
            owned: vec!["träsvärd".to_string(), "katana".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("'spoon'"));
        assert!(message.contains("träsvärd, katana"));
    }

    #[test]
    fn test_classification() {
        assert!(EncounterError::UnrecognizedAction("x".into()).costs_turn());
        assert!(EncounterError::UnrecognizedAction("x".into()).is_recoverable());

        let cooldown = EncounterError::HealCooldownActive {
            remaining: Duration::from_secs(2),
        };
        assert!(cooldown.is_recoverable());
        assert!(!cooldown.costs_turn());

        assert!(!EncounterError::PlayerDefeatedFatal.is_recoverable());
        assert!(!EncounterError::Regen(RegenError::NoRuntime).is_recoverable());
    }

    #[test]
    fn test_cooldown_message() {
        let err = EncounterError::HealCooldownActive {
            remaining: Duration::from_millis(2500),
        };
        assert_eq!(err.to_string(), "Wait 2.5 more seconds between potions");
    }
}
