//! Opponents the player can fight.
//!
//! There are two kinds: a scripted teacher with a fixed health pool, and a
//! regenerating boss whose health is shared with a background
//! [`Regeneration`] task for the duration of an encounter.

use crate::luck::Luck;
use crate::regen::{RegenError, RegenEvent, Regeneration, SharedHealth, DEFAULT_REGEN_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Stable identity of an opponent, used for defeated-set bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpponentId(pub Uuid);

impl OpponentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OpponentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OpponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of an opponent for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpponentStatus {
    pub id: OpponentId,
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub regenerating: bool,
}

/// An opponent with a fixed health pool and a damage range.
#[derive(Debug, Clone)]
pub struct ScriptedOpponent {
    id: OpponentId,
    name: String,
    health: i32,
    max_health: i32,
    min_damage: i32,
    max_damage: i32,
}

/// An opponent that heals itself on a timer while an encounter is live.
#[derive(Debug)]
pub struct RegeneratingOpponent {
    id: OpponentId,
    name: String,
    health: SharedHealth,
    min_damage: i32,
    max_damage: i32,
    regen: Regeneration,
}

impl RegeneratingOpponent {
    pub fn regen_amount(&self) -> i32 {
        self.regen.amount()
    }

    pub fn regen_interval(&self) -> Duration {
        self.regen.interval()
    }

    /// Takes effect the next time regeneration starts.
    pub fn set_regen_interval(&mut self, interval: Duration) {
        self.regen.set_interval(interval);
    }

    pub fn regeneration(&self) -> &Regeneration {
        &self.regen
    }

    pub fn start_regen(&mut self) -> Result<(), RegenError> {
        self.regen.start(&self.health)
    }

    pub fn stop_regen(&mut self) {
        self.regen.stop(&self.health);
    }

    pub fn drain_regen_events(&mut self) -> Vec<RegenEvent> {
        self.regen.drain_events()
    }
}

#[derive(Debug)]
pub enum Opponent {
    Scripted(ScriptedOpponent),
    Regenerating(RegeneratingOpponent),
}

impl Opponent {
    /// A teacher-style opponent starting at full health.
    pub fn scripted(name: impl Into<String>, max_health: i32, min_damage: i32, max_damage: i32) -> Self {
        Opponent::Scripted(ScriptedOpponent {
            id: OpponentId::new(),
            name: name.into(),
            health: max_health,
            max_health,
            min_damage,
            max_damage,
        })
    }

    /// A boss that restores `regen_amount` health every
    /// [`DEFAULT_REGEN_INTERVAL`] while fighting.
    pub fn regenerating(
        name: impl Into<String>,
        max_health: i32,
        min_damage: i32,
        max_damage: i32,
        regen_amount: i32,
    ) -> Self {
        let name = name.into();
        Opponent::Regenerating(RegeneratingOpponent {
            id: OpponentId::new(),
            regen: Regeneration::new(name.clone(), regen_amount, DEFAULT_REGEN_INTERVAL),
            name,
            health: SharedHealth::new(max_health),
            min_damage,
            max_damage,
        })
    }

    /// Override the regeneration interval. No effect on scripted opponents.
    pub fn with_regen_interval(mut self, interval: Duration) -> Self {
        if let Opponent::Regenerating(boss) = &mut self {
            boss.regen.set_interval(interval);
        }
        self
    }

    pub fn id(&self) -> OpponentId {
        match self {
            Opponent::Scripted(o) => o.id,
            Opponent::Regenerating(o) => o.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Opponent::Scripted(o) => &o.name,
            Opponent::Regenerating(o) => &o.name,
        }
    }

    pub fn health(&self) -> i32 {
        match self {
            Opponent::Scripted(o) => o.health,
            Opponent::Regenerating(o) => o.health.current(),
        }
    }

    pub fn max_health(&self) -> i32 {
        match self {
            Opponent::Scripted(o) => o.max_health,
            Opponent::Regenerating(o) => o.health.max(),
        }
    }

    pub fn damage_range(&self) -> (i32, i32) {
        match self {
            Opponent::Scripted(o) => (o.min_damage, o.max_damage),
            Opponent::Regenerating(o) => (o.min_damage, o.max_damage),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health() > 0
    }

    /// Roll this opponent's attack damage.
    pub fn roll_attack<L: Luck>(&self, luck: &mut L) -> i32 {
        let (low, high) = self.damage_range();
        luck.between(low, high)
    }

    /// Apply player damage, flooring at zero. Returns remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        match self {
            Opponent::Scripted(o) => {
                o.health = (o.health - amount.max(0)).max(0);
                o.health
            }
            Opponent::Regenerating(o) => o.health.strike(amount),
        }
    }

    /// Drop health to zero, for opponents beaten without a fight.
    pub fn force_defeat(&mut self) {
        match self {
            Opponent::Scripted(o) => o.health = 0,
            Opponent::Regenerating(o) => {
                o.health.drain();
                o.regen.stop(&o.health);
            }
        }
    }

    pub fn regeneration_mut(&mut self) -> Option<&mut RegeneratingOpponent> {
        match self {
            Opponent::Scripted(_) => None,
            Opponent::Regenerating(o) => Some(o),
        }
    }

    pub fn status(&self) -> OpponentStatus {
        OpponentStatus {
            id: self.id(),
            name: self.name().to_string(),
            health: self.health(),
            max_health: self.max_health(),
            regenerating: match self {
                Opponent::Scripted(_) => false,
                Opponent::Regenerating(o) => o.regen.is_active(),
            },
        }
    }
}
