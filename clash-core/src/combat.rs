//! Round-based combat resolution.
//!
//! [`CombatEngine::resolve`] drives one encounter to completion. Each round
//! the player picks an action through an [`ActionSource`], its effects are
//! applied, and unless the opponent fell the opponent strikes back. A fatal
//! hit is answered by a totem if the player has one.
//!
//! Rejections differ in cost: an unknown weapon, a potion on cooldown or an
//! empty potion slot are re-prompted within the same round, while input
//! that is not an action at all forfeits the player's turn.

use crate::error::EncounterError;
use crate::luck::Luck;
use crate::opponent::{Opponent, OpponentStatus};
use crate::player::{PlayerCharacter, PlayerStatus, PotionKind};
use crate::progress::Progress;
use crate::regen::RegenEvent;
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// Player Input
// ============================================================================

/// What the player wants to do this round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Attack { weapon: String },
    Heal { potion: String },
    Wait,
    /// Anything that is not one of the menu choices.
    Unrecognized { input: String },
}

impl PlayerAction {
    /// Parse a line such as `attack katana`, `1 katana`, `heal epic` or `3`.
    ///
    /// The first token selects the action; the remainder is its argument.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let (head, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (trimmed, ""),
        };

        match head.to_lowercase().as_str() {
            "1" | "attack" => PlayerAction::Attack {
                weapon: rest.to_string(),
            },
            "2" | "heal" => PlayerAction::Heal {
                potion: rest.to_string(),
            },
            "3" | "wait" => PlayerAction::Wait,
            _ => PlayerAction::Unrecognized {
                input: trimmed.to_string(),
            },
        }
    }
}

/// Snapshot handed to the [`ActionSource`] before every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatStatus {
    pub round: u32,
    pub player: PlayerStatus,
    pub opponent: OpponentStatus,
}

/// Supplies player actions and observes what happens in the fight.
pub trait ActionSource {
    fn next_action(&mut self, status: &CombatStatus) -> PlayerAction;

    fn observe(&mut self, _event: &CombatEvent) {}
}

// ============================================================================
// Events and Outcomes
// ============================================================================

/// Everything observable that happens during an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    EncounterStarted {
        opponent: String,
        health: i32,
        max_health: i32,
        regenerating: bool,
    },
    RoundStarted {
        round: u32,
    },
    Attacked {
        weapon: String,
        damage: i32,
        critical: bool,
        opponent_health: i32,
    },
    Healed {
        potion: PotionKind,
        restored: i32,
        health: i32,
    },
    ActionRejected {
        error: EncounterError,
    },
    Waited,
    TurnForfeited {
        input: String,
    },
    Blocked {
        opponent: String,
        damage: i32,
    },
    Hit {
        opponent: String,
        damage: i32,
        health: i32,
    },
    Regenerated(RegenEvent),
    TotemUsed {
        totems_left: u32,
    },
    Victory {
        opponent: String,
        reward: u32,
    },
    GameOver {
        opponent: String,
    },
}

/// Where the round state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatPhase {
    AwaitingPlayerAction,
    ActionResolved,
    OpponentDefeated,
    AwaitingEnemyAttack,
    RoundComplete,
    PlayerDefeated,
    Revived,
    GameOver,
}

/// Per-encounter statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombatLog {
    pub rounds: u32,
    pub damage_dealt: i32,
    pub damage_taken: i32,
    pub critical_hits: u32,
    pub blocks: u32,
    pub regenerated: i32,
    pub totems_used: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EncounterOutcome {
    Victory { reward: u32, log: CombatLog },
    /// The player died with no totem left. Terminal for the session.
    Loss { log: CombatLog },
}

impl EncounterOutcome {
    pub fn is_victory(&self) -> bool {
        matches!(self, EncounterOutcome::Victory { .. })
    }

    pub fn log(&self) -> &CombatLog {
        match self {
            EncounterOutcome::Victory { log, .. } | EncounterOutcome::Loss { log } => log,
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Resolves encounters between the player and a single opponent.
#[derive(Debug, Clone)]
pub struct CombatEngine {
    reward_min: i32,
    reward_max: i32,
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self {
            reward_min: 10,
            reward_max: 20,
        }
    }
}

impl CombatEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive coin range awarded on victory.
    pub fn with_reward_range(mut self, min: u32, max: u32) -> Self {
        self.reward_min = i32::try_from(min).unwrap_or(i32::MAX);
        self.reward_max = i32::try_from(max).unwrap_or(i32::MAX);
        self
    }

    /// Fight until the opponent falls or the player dies for good.
    ///
    /// A regenerating opponent starts healing when the encounter starts and
    /// is stopped before this returns, on either outcome.
    pub fn resolve<A, L>(
        &self,
        player: &mut PlayerCharacter,
        opponent: &mut Opponent,
        progress: &mut Progress,
        input: &mut A,
        luck: &mut L,
    ) -> Result<EncounterOutcome, EncounterError>
    where
        A: ActionSource + ?Sized,
        L: Luck,
    {
        if let Some(boss) = opponent.regeneration_mut() {
            boss.start_regen()?;
        }

        info!(
            target: "clash::combat",
            opponent = opponent.name(),
            health = opponent.health(),
            player_health = player.health(),
            "encounter started"
        );
        input.observe(&CombatEvent::EncounterStarted {
            opponent: opponent.name().to_string(),
            health: opponent.health(),
            max_health: opponent.max_health(),
            regenerating: opponent.status().regenerating,
        });

        let mut log = CombatLog {
            rounds: 1,
            ..CombatLog::default()
        };
        input.observe(&CombatEvent::RoundStarted { round: log.rounds });

        let mut phase = CombatPhase::AwaitingPlayerAction;
        let mut fatal_hit: Option<i32> = None;
        loop {
            debug!(target: "clash::combat", ?phase, round = log.rounds, "phase");
            phase = match phase {
                CombatPhase::AwaitingPlayerAction => {
                    deliver_regen_events(opponent, input, &mut log);
                    let status = CombatStatus {
                        round: log.rounds,
                        player: player.status(),
                        opponent: opponent.status(),
                    };
                    let action = input.next_action(&status);
                    match apply_action(action, player, opponent, input, &mut log, luck) {
                        Ok(()) => CombatPhase::ActionResolved,
                        Err(error) if error.costs_turn() => {
                            debug!(target: "clash::combat", %error, "turn forfeited");
                            let raw = match error {
                                EncounterError::UnrecognizedAction(raw) => raw,
                                other => other.to_string(),
                            };
                            input.observe(&CombatEvent::TurnForfeited { input: raw });
                            CombatPhase::AwaitingEnemyAttack
                        }
                        Err(error) if error.is_recoverable() => {
                            debug!(target: "clash::combat", %error, "action rejected");
                            input.observe(&CombatEvent::ActionRejected { error });
                            CombatPhase::AwaitingPlayerAction
                        }
                        Err(error) => {
                            if let Some(boss) = opponent.regeneration_mut() {
                                boss.stop_regen();
                            }
                            return Err(error);
                        }
                    }
                }

                CombatPhase::ActionResolved => {
                    if opponent.is_alive() {
                        CombatPhase::AwaitingEnemyAttack
                    } else {
                        CombatPhase::OpponentDefeated
                    }
                }

                CombatPhase::OpponentDefeated => {
                    if let Some(boss) = opponent.regeneration_mut() {
                        boss.stop_regen();
                        // Ticks that landed before the killing blow are stale now.
                        boss.drain_regen_events();
                    }
                    let rolled = luck.between(self.reward_min, self.reward_max);
                    let reward = u32::try_from(rolled).unwrap_or(0);
                    player.award_coins(reward);
                    progress.mark_defeated(opponent.id());

                    info!(
                        target: "clash::combat",
                        opponent = opponent.name(),
                        reward,
                        rounds = log.rounds,
                        "opponent defeated"
                    );
                    input.observe(&CombatEvent::Victory {
                        opponent: opponent.name().to_string(),
                        reward,
                    });
                    return Ok(EncounterOutcome::Victory { reward, log });
                }

                CombatPhase::AwaitingEnemyAttack => {
                    let damage = opponent.roll_attack(luck);
                    if player.roll_block(luck) {
                        log.blocks += 1;
                        input.observe(&CombatEvent::Blocked {
                            opponent: opponent.name().to_string(),
                            damage,
                        });
                        CombatPhase::RoundComplete
                    } else {
                        player.take_damage(damage);
                        log.damage_taken += damage;
                        if player.is_alive() {
                            input.observe(&CombatEvent::Hit {
                                opponent: opponent.name().to_string(),
                                damage,
                                health: player.health(),
                            });
                            CombatPhase::RoundComplete
                        } else {
                            // Reported once the totem check has settled the health.
                            fatal_hit = Some(damage);
                            CombatPhase::PlayerDefeated
                        }
                    }
                }

                CombatPhase::PlayerDefeated => {
                    let revived = player.use_totem();
                    if let Some(damage) = fatal_hit.take() {
                        input.observe(&CombatEvent::Hit {
                            opponent: opponent.name().to_string(),
                            damage,
                            health: player.health(),
                        });
                    }
                    if revived {
                        log.totems_used += 1;
                        input.observe(&CombatEvent::TotemUsed {
                            totems_left: player.totems(),
                        });
                        CombatPhase::Revived
                    } else {
                        CombatPhase::GameOver
                    }
                }

                CombatPhase::Revived | CombatPhase::RoundComplete => {
                    log.rounds += 1;
                    input.observe(&CombatEvent::RoundStarted { round: log.rounds });
                    CombatPhase::AwaitingPlayerAction
                }

                CombatPhase::GameOver => {
                    if let Some(boss) = opponent.regeneration_mut() {
                        boss.stop_regen();
                    }
                    warn!(
                        target: "clash::combat",
                        opponent = opponent.name(),
                        rounds = log.rounds,
                        "player defeated"
                    );
                    input.observe(&CombatEvent::GameOver {
                        opponent: opponent.name().to_string(),
                    });
                    return Ok(EncounterOutcome::Loss { log });
                }
            };
        }
    }
}

fn deliver_regen_events<A: ActionSource + ?Sized>(
    opponent: &mut Opponent,
    input: &mut A,
    log: &mut CombatLog,
) {
    let Some(boss) = opponent.regeneration_mut() else {
        return;
    };
    for event in boss.drain_regen_events() {
        log.regenerated += event.amount;
        input.observe(&CombatEvent::Regenerated(event));
    }
}

fn apply_action<A, L>(
    action: PlayerAction,
    player: &mut PlayerCharacter,
    opponent: &mut Opponent,
    input: &mut A,
    log: &mut CombatLog,
    luck: &mut L,
) -> Result<(), EncounterError>
where
    A: ActionSource + ?Sized,
    L: Luck,
{
    match action {
        PlayerAction::Attack { weapon } => {
            let roll = player.resolve_attack(&weapon, luck)?;
            let opponent_health = opponent.take_damage(roll.damage);
            log.damage_dealt += roll.damage;
            if roll.critical {
                log.critical_hits += 1;
            }
            input.observe(&CombatEvent::Attacked {
                weapon: roll.weapon,
                damage: roll.damage,
                critical: roll.critical,
                opponent_health,
            });
            Ok(())
        }
        PlayerAction::Heal { potion } => {
            let kind: PotionKind = potion.parse()?;
            let amount = player.resolve_heal(kind)?;
            let restored = player.restore_health(amount);
            input.observe(&CombatEvent::Healed {
                potion: kind,
                restored,
                health: player.health(),
            });
            Ok(())
        }
        PlayerAction::Wait => {
            input.observe(&CombatEvent::Waited);
            Ok(())
        }
        PlayerAction::Unrecognized { input: raw } => Err(EncounterError::UnrecognizedAction(raw)),
    }
}
