//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time only from the session clock advanced by `tick`
//! - Stable iteration order (collection order, back-to-front on removal)
//! - No rendering or platform dependencies

pub mod catalog;
pub mod combat;
pub mod effects;
pub mod physics;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use catalog::{PowerupKind, WEAPONS, Weapon};
pub use effects::{ActiveEffect, StatusEffects};
pub use physics::collides;
pub use spawner::{SpawnCategory, SpawnScheduler};
pub use state::{
    Collectible, EntityId, Explosion, GameEvent, GameState, Hazard, Hostile, LightAttachment,
    Notification, NotificationKind, Particle, Player, Projectile, ProjectileOwner, SessionPhase,
    SoundKey,
};
pub use tick::{TickInput, tick};
