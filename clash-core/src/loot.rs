//! Lootboxes bought with coins.
//!
//! A normal box costs 5 coins, an epic box 15. Each draws one item
//! uniformly from its tier's pool and credits it to the player.

use crate::error::EncounterError;
use crate::items::get_weapon;
use crate::luck::Luck;
use crate::player::{PlayerCharacter, PotionKind, Weapon, WeaponGrant};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LootTier {
    Normal,
    Epic,
}

impl LootTier {
    pub fn cost(&self) -> u32 {
        match self {
            LootTier::Normal => 5,
            LootTier::Epic => 15,
        }
    }

    pub fn pool(&self) -> &'static [LootItem] {
        match self {
            LootTier::Normal => NORMAL_POOL.as_slice(),
            LootTier::Epic => EPIC_POOL.as_slice(),
        }
    }
}

impl fmt::Display for LootTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LootTier::Normal => f.write_str("normal"),
            LootTier::Epic => f.write_str("epic"),
        }
    }
}

impl FromStr for LootTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" | "1" => Ok(LootTier::Normal),
            "epic" | "2" => Ok(LootTier::Epic),
            other => Err(format!("unknown lootbox '{other}' (expected normal or epic)")),
        }
    }
}

/// Something a lootbox can contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LootItem {
    Weapon(Weapon),
    Potion { potion: PotionKind },
    Totem,
}

impl fmt::Display for LootItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LootItem::Weapon(weapon) => write!(f, "{weapon}"),
            LootItem::Potion { potion } => write!(f, "{potion} potion"),
            LootItem::Totem => f.write_str("totem"),
        }
    }
}

/// What came out of an opened box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LootDrop {
    pub tier: LootTier,
    pub item: LootItem,
    /// The drawn weapon was already owned, so nothing was added.
    pub duplicate: bool,
}

fn catalog(name: &str) -> LootItem {
    // Pool entries are all cataloged; an unknown name degrades to the starter.
    LootItem::Weapon(get_weapon(name).unwrap_or_else(Weapon::starter))
}

lazy_static::lazy_static! {
    static ref NORMAL_POOL: Vec<LootItem> = vec![
        catalog("kukri"),
        catalog("järnsvärd"),
        LootItem::Potion { potion: PotionKind::Normal },
        catalog("katana"),
        catalog("dagger"),
        catalog("pinne"),
    ];

    static ref EPIC_POOL: Vec<LootItem> = vec![
        LootItem::Potion { potion: PotionKind::Epic },
        catalog("battle_axe"),
        LootItem::Totem,
        catalog("lightsaber"),
        catalog("stekpanna"),
    ];
}

/// Pay for and open a lootbox.
///
/// Fails with [`EncounterError::InsufficientFunds`] and no mutation when the
/// player cannot afford it. A duplicate weapon still costs the coins.
pub fn open<L: Luck>(
    player: &mut PlayerCharacter,
    tier: LootTier,
    luck: &mut L,
) -> Result<LootDrop, EncounterError> {
    player.spend_coins(tier.cost())?;

    let pool = tier.pool();
    let item = pool[luck.pick(pool.len()).min(pool.len() - 1)].clone();

    let duplicate = match &item {
        LootItem::Weapon(weapon) => player.add_weapon(weapon.clone()) == WeaponGrant::AlreadyOwned,
        LootItem::Potion { potion } => {
            player.grant_potion(*potion);
            false
        }
        LootItem::Totem => {
            player.grant_totem();
            false
        }
    };

    info!(target: "clash::loot", %tier, item = %item, duplicate, coins_left = player.coins(), "lootbox opened");
    Ok(LootDrop {
        tier,
        item,
        duplicate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLuck;

    #[test]
    fn test_pools() {
        assert_eq!(LootTier::Normal.pool().len(), 6);
        assert_eq!(LootTier::Epic.pool().len(), 5);
        assert_eq!(LootTier::Epic.pool()[3], LootItem::Weapon(Weapon::new("lightsaber", 50)));
    }

    #[test]
    fn test_insufficient_funds_leaves_coins() {
        let mut player = PlayerCharacter::new("Broke");
        let err = open(&mut player, LootTier::Epic, &mut ScriptedLuck::new()).unwrap_err();
        assert_eq!(err, EncounterError::InsufficientFunds { needed: 15, available: 5 });
        assert_eq!(player.coins(), 5);
    }

    #[test]
    fn test_normal_box_grants_weapon() {
        let mut player = PlayerCharacter::new("Lucky");
        let drop = open(&mut player, LootTier::Normal, &mut ScriptedLuck::new().with_rolls([3])).unwrap();
        assert_eq!(drop.item, LootItem::Weapon(Weapon::new("katana", 15)));
        assert!(!drop.duplicate);
        assert_eq!(player.coins(), 0);
        assert!(player.weapon("katana").is_some());
    }

    #[test]
    fn test_duplicate_weapon_still_costs() {
        let mut player = PlayerCharacter::new("Collector");
        player.add_weapon(Weapon::new("kukri", 25));
        player.award_coins(5);
        let drop = open(&mut player, LootTier::Normal, &mut ScriptedLuck::new().with_rolls([0])).unwrap();
        assert!(drop.duplicate);
        assert_eq!(player.coins(), 5);
        assert_eq!(player.weapons().len(), 2);
    }

    #[test]
    fn test_epic_totem() {
        let mut player = PlayerCharacter::new("Saver");
        player.award_coins(10);
        let drop = open(&mut player, LootTier::Epic, &mut ScriptedLuck::new().with_rolls([2])).unwrap();
        assert_eq!(drop.item, LootItem::Totem);
        assert_eq!(player.totems(), 1);
    }

    #[test]
    fn test_tier_parse() {
        assert_eq!("EPIC".parse::<LootTier>(), Ok(LootTier::Epic));
        assert!("legendary".parse::<LootTier>().is_err());
    }
}
