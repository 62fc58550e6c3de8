//! The player character.
//!
//! Holds health, coins, potions, totems and the weapon inventory, and the
//! self-contained actions the combat engine builds on: attacking with a
//! named weapon, drinking a potion, blocking and reviving with a totem.

use crate::error::EncounterError;
use crate::luck::Luck;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Health ceiling for the player; heals clamp here and totems restore to it.
pub const MAX_HEALTH: i32 = 100;

/// Probability that an attack lands as a critical hit.
pub const CRITICAL_CHANCE: f64 = 0.15;

/// Damage multiplier for a critical hit (result is floored).
pub const CRITICAL_MULTIPLIER: f64 = 2.5;

/// Probability that the player blocks an incoming attack outright.
pub const BLOCK_CHANCE: f64 = 0.30;

/// Minimum time between two successful potions.
pub const HEAL_COOLDOWN: Duration = Duration::from_secs(5);

const STARTING_COINS: u32 = 5;
const STARTING_NORMAL_POTIONS: u32 = 2;
const STARTING_EPIC_POTIONS: u32 = 1;

/// Normalize a weapon name for inventory lookups.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// A weapon and the damage it deals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub damage: i32,
}

impl Weapon {
    /// Create a weapon; the name is normalized.
    pub fn new(name: impl AsRef<str>, damage: i32) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            damage,
        }
    }

    /// The weapon every character starts with.
    pub fn starter() -> Self {
        Self::new("träsvärd", 10)
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} damage)", self.name, self.damage)
    }
}

/// Whether [`PlayerCharacter::add_weapon`] changed the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeaponGrant {
    Granted,
    AlreadyOwned,
}

/// The two potion strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotionKind {
    Normal,
    Epic,
}

impl PotionKind {
    /// Health restored by one potion, before clamping.
    pub fn restores(&self) -> i32 {
        match self {
            PotionKind::Normal => 50,
            PotionKind::Epic => 100,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PotionKind::Normal => "normal",
            PotionKind::Epic => "epic",
        }
    }
}

impl fmt::Display for PotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PotionKind {
    type Err = EncounterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "normal" | "1" => Ok(PotionKind::Normal),
            "epic" | "2" => Ok(PotionKind::Epic),
            _ => Err(EncounterError::UnknownPotion(s.trim().to_string())),
        }
    }
}

/// Damage produced by a successful attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackRoll {
    pub weapon: String,
    pub base_damage: i32,
    pub damage: i32,
    pub critical: bool,
}

/// Read-only snapshot of the player for status display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStatus {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub coins: u32,
    pub totems: u32,
    pub normal_potions: u32,
    pub epic_potions: u32,
    pub weapons: Vec<Weapon>,
}

/// The player character.
///
/// Mutated only through the operations below; the session owns it.
#[derive(Debug, Clone)]
pub struct PlayerCharacter {
    name: String,
    health: i32,
    coins: u32,
    totems: u32,
    normal_potions: u32,
    epic_potions: u32,
    last_heal: Option<Instant>,
    // Insertion order, unique normalized names.
    weapons: Vec<Weapon>,
}

impl PlayerCharacter {
    /// Create a fresh character with the starting kit.
    pub fn new(name: impl Into<String>) -> Self {
        let mut player = Self {
            name: name.into(),
            health: MAX_HEALTH,
            coins: STARTING_COINS,
            totems: 0,
            normal_potions: STARTING_NORMAL_POTIONS,
            epic_potions: STARTING_EPIC_POTIONS,
            last_heal: None,
            weapons: Vec::new(),
        };
        player.add_weapon_silently(Weapon::starter());
        player
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn totems(&self) -> u32 {
        self.totems
    }

    pub fn potions(&self, kind: PotionKind) -> u32 {
        match kind {
            PotionKind::Normal => self.normal_potions,
            PotionKind::Epic => self.epic_potions,
        }
    }

    /// Owned weapons in the order they were acquired.
    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn weapon_names(&self) -> Vec<String> {
        self.weapons.iter().map(|w| w.name.clone()).collect()
    }

    /// Look up an owned weapon by (unnormalized) name.
    pub fn weapon(&self, name: &str) -> Option<&Weapon> {
        let key = normalize_name(name);
        self.weapons.iter().find(|w| w.name == key)
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            name: self.name.clone(),
            health: self.health,
            max_health: MAX_HEALTH,
            coins: self.coins,
            totems: self.totems,
            normal_potions: self.normal_potions,
            epic_potions: self.epic_potions,
            weapons: self.weapons.clone(),
        }
    }

    /// Add a weapon unless one with the same name is already owned.
    ///
    /// An owned weapon is never overwritten, even with a stronger one.
    pub fn add_weapon(&mut self, weapon: Weapon) -> WeaponGrant {
        if self.weapon(&weapon.name).is_some() {
            debug!(target: "clash::player", weapon = %weapon.name, "weapon already owned");
            return WeaponGrant::AlreadyOwned;
        }
        info!(target: "clash::player", weapon = %weapon.name, damage = weapon.damage, "weapon unlocked");
        self.weapons.push(weapon);
        WeaponGrant::Granted
    }

    /// Add a weapon without reporting anything; used for the starting kit.
    pub fn add_weapon_silently(&mut self, weapon: Weapon) {
        if self.weapon(&weapon.name).is_none() {
            self.weapons.push(weapon);
        }
    }

    /// Compute the damage of an attack with the named weapon.
    ///
    /// Fails with [`EncounterError::UnknownWeapon`] when the weapon is not
    /// owned. Each call rolls independently for a critical hit.
    pub fn resolve_attack<L: Luck>(
        &self,
        weapon_name: &str,
        luck: &mut L,
    ) -> Result<AttackRoll, EncounterError> {
        let requested = normalize_name(weapon_name);
        let weapon = self
            .weapon(&requested)
            .ok_or_else(|| EncounterError::UnknownWeapon {
                requested: requested.clone(),
                owned: self.weapon_names(),
            })?;

        let base_damage = weapon.damage;
        let critical = luck.chance(CRITICAL_CHANCE);
        let damage = if critical {
            critical_damage(base_damage)
        } else {
            base_damage
        };

        Ok(AttackRoll {
            weapon: weapon.name.clone(),
            base_damage,
            damage,
            critical,
        })
    }

    /// Drink a potion now. See [`PlayerCharacter::resolve_heal_at`].
    pub fn resolve_heal(&mut self, kind: PotionKind) -> Result<i32, EncounterError> {
        self.resolve_heal_at(kind, Instant::now())
    }

    /// Drink a potion at the given instant.
    ///
    /// Returns the amount the potion restores; applying it to health is up
    /// to the caller via [`PlayerCharacter::restore_health`]. A rejected
    /// call leaves potions and the cooldown timer untouched.
    pub fn resolve_heal_at(&mut self, kind: PotionKind, now: Instant) -> Result<i32, EncounterError> {
        if let Some(last) = self.last_heal {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < HEAL_COOLDOWN {
                return Err(EncounterError::HealCooldownActive {
                    remaining: HEAL_COOLDOWN - elapsed,
                });
            }
        }

        let count = match kind {
            PotionKind::Normal => &mut self.normal_potions,
            PotionKind::Epic => &mut self.epic_potions,
        };
        if *count == 0 {
            return Err(EncounterError::InsufficientPotions { kind });
        }
        *count -= 1;
        self.last_heal = Some(now);
        debug!(target: "clash::player", potion = %kind, left = *count, "potion consumed");
        Ok(kind.restores())
    }

    /// Add health, clamped to [`MAX_HEALTH`]. Returns the amount actually gained.
    pub fn restore_health(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(MAX_HEALTH);
        self.health - before
    }

    /// Subtract damage, flooring health at zero. Returns the new health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = (self.health - amount.max(0)).max(0);
        self.health
    }

    /// Roll the block check for an incoming attack.
    pub fn roll_block<L: Luck>(&self, luck: &mut L) -> bool {
        luck.chance(BLOCK_CHANCE)
    }

    /// Spend a totem to come back at full health.
    ///
    /// Returns `false` without changing anything when no totem is left.
    pub fn use_totem(&mut self) -> bool {
        if self.totems == 0 {
            return false;
        }
        self.totems -= 1;
        self.health = MAX_HEALTH;
        info!(target: "clash::player", totems_left = self.totems, "totem used, health restored");
        true
    }

    pub fn award_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
        debug!(target: "clash::player", amount, total = self.coins, "coins awarded");
    }

    /// Pay coins, or fail without mutation.
    pub fn spend_coins(&mut self, amount: u32) -> Result<(), EncounterError> {
        if self.coins < amount {
            return Err(EncounterError::InsufficientFunds {
                needed: amount,
                available: self.coins,
            });
        }
        self.coins -= amount;
        Ok(())
    }

    pub fn grant_potion(&mut self, kind: PotionKind) {
        match kind {
            PotionKind::Normal => self.normal_potions += 1,
            PotionKind::Epic => self.epic_potions += 1,
        }
    }

    pub fn grant_totem(&mut self) {
        self.totems += 1;
    }
}

/// Damage dealt by a critical hit with the given base damage.
pub fn critical_damage(base: i32) -> i32 {
    (f64::from(base) * CRITICAL_MULTIPLIER).floor() as i32
}
