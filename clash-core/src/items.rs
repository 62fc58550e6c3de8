//! Weapon catalog.
//!
//! Every weapon that can show up in the game, looked up by name. Loot pools
//! and the starting kit draw from here.

use crate::player::{normalize_name, Weapon};

/// Get a catalog weapon by name (case and surrounding whitespace ignored).
pub fn get_weapon(name: &str) -> Option<Weapon> {
    let key = normalize_name(name);
    WEAPONS.iter().find(|w| w.name == key).cloned()
}

lazy_static::lazy_static! {
    /// All known weapons with their damage.
    pub static ref WEAPONS: Vec<Weapon> = vec![
        Weapon::new("träsvärd", 10),
        Weapon::new("pie", 3),
        Weapon::new("pinne", 10),
        Weapon::new("katana", 15),
        Weapon::new("dagger", 17),
        Weapon::new("järnsvärd", 20),
        Weapon::new("kukri", 25),
        Weapon::new("battle_axe", 35),
        Weapon::new("lightsaber", 50),
        Weapon::new("stekpanna", 69),
    ];
}
