//! Static weapon and powerup tables

use serde::{Deserialize, Serialize};

use super::state::SoundKey;

/// A weapon definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weapon {
    pub name: &'static str,
    pub damage: i32,
    pub max_ammo: u32,
    pub reload_ms: f64,
    pub cooldown_ms: f64,
    /// Units per reference frame
    pub projectile_speed: f32,
    pub projectile_color: u32,
    pub sound: SoundKey,
}

/// Selectable weapons, keys 1-4
pub const WEAPONS: [Weapon; 4] = [
    Weapon {
        name: "Laser Blaster",
        damage: 10,
        max_ammo: 30,
        reload_ms: 1500.0,
        cooldown_ms: 200.0,
        projectile_speed: 1.0,
        projectile_color: 0x00ffff,
        sound: SoundKey::Laser,
    },
    Weapon {
        name: "Plasma Cannon",
        damage: 25,
        max_ammo: 15,
        reload_ms: 2000.0,
        cooldown_ms: 500.0,
        projectile_speed: 0.8,
        projectile_color: 0xff00ff,
        sound: SoundKey::Plasma,
    },
    Weapon {
        name: "Missile Launcher",
        damage: 50,
        max_ammo: 5,
        reload_ms: 3000.0,
        cooldown_ms: 1000.0,
        projectile_speed: 0.6,
        projectile_color: 0xff0000,
        sound: SoundKey::Missile,
    },
    Weapon {
        name: "Quantum Disruptor",
        damage: 100,
        max_ammo: 3,
        reload_ms: 4000.0,
        cooldown_ms: 1500.0,
        projectile_speed: 0.5,
        projectile_color: 0xffff00,
        sound: SoundKey::Quantum,
    },
];

/// Powerup types. Applying one is handled by the combat resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    HealthBoost,
    AmmoRefill,
    Shield,
    RapidFire,
    DoubleDamage,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::HealthBoost,
        PowerupKind::AmmoRefill,
        PowerupKind::Shield,
        PowerupKind::RapidFire,
        PowerupKind::DoubleDamage,
    ];

    /// Name, also used as the status effect key
    pub fn name(self) -> &'static str {
        match self {
            PowerupKind::HealthBoost => "Health Boost",
            PowerupKind::AmmoRefill => "Ammo Refill",
            PowerupKind::Shield => "Shield",
            PowerupKind::RapidFire => "Rapid Fire",
            PowerupKind::DoubleDamage => "Double Damage",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PowerupKind::HealthBoost => 0x00ff00,
            PowerupKind::AmmoRefill => 0x0000ff,
            PowerupKind::Shield => 0xffff00,
            PowerupKind::RapidFire => 0xff00ff,
            PowerupKind::DoubleDamage => 0xff0000,
        }
    }

    /// Duration of the timed status effect, if any
    pub fn duration_ms(self) -> Option<f64> {
        match self {
            PowerupKind::Shield => Some(15000.0),
            PowerupKind::RapidFire | PowerupKind::DoubleDamage => Some(10000.0),
            PowerupKind::HealthBoost | PowerupKind::AmmoRefill => None,
        }
    }

    /// Notification (title, description) shown on pickup
    pub fn notification(self) -> (&'static str, &'static str) {
        match self {
            PowerupKind::HealthBoost => ("Health Boost", "Health +50"),
            PowerupKind::AmmoRefill => ("Ammo Refill", "Ammo fully restored"),
            PowerupKind::Shield => ("Shield Activated", "15 seconds of protection"),
            PowerupKind::RapidFire => ("Rapid Fire", "10 seconds of increased fire rate"),
            PowerupKind::DoubleDamage => ("Double Damage", "10 seconds of increased damage"),
        }
    }
}

/// Health restored by a Health Boost
pub const HEALTH_BOOST_AMOUNT: i32 = 50;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_damage_increases_with_slot() {
        for pair in WEAPONS.windows(2) {
            assert!(pair[1].damage > pair[0].damage);
            assert!(pair[1].max_ammo < pair[0].max_ammo);
        }
    }

    #[test]
    fn test_timed_powerups_match_effect_names() {
        let timed: Vec<_> = PowerupKind::ALL
            .iter()
            .filter(|k| k.duration_ms().is_some())
            .map(|k| k.name())
            .collect();
        assert_eq!(timed, vec!["Shield", "Rapid Fire", "Double Damage"]);
    }
}
