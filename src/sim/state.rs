//! Game state and core simulation types
//!
//! Everything a session needs lives in [`GameState`]; each entity kind has its own
//! collection, and every entity carries an [`EntityId`] that is never reused.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{PowerupKind, WEAPONS, Weapon};
use super::effects::StatusEffects;
use super::spawner::SpawnScheduler;
use crate::consts::*;
use crate::settings::DifficultyPreset;

/// Lifecycle phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Pre-start or post-quit; start screen is showing
    Idle,
    /// Simulation runs
    Active,
    /// Simulation frozen, rendering continues
    Paused,
    /// Player died; terminal until restart or quit
    Over,
}

/// Stable handle for a live entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    /// Fired by the player with the weapon at this catalog index
    Player { weapon: usize },
    /// Fired by a hostile craft
    Hostile,
}

/// Sounds the audio collaborator is asked to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKey {
    Laser,
    Plasma,
    Missile,
    Quantum,
    Hit,
    Explosion,
    PlayerHit,
    Reload,
    Powerup,
    LevelUp,
}

/// Which notification slot a message occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Powerup,
    LevelUp,
}

/// Side effects for the frontend, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundKey),
    PhaseChanged { from: SessionPhase, to: SessionPhase },
    NotificationShown { kind: NotificationKind, title: String, description: String },
    NotificationHidden { kind: NotificationKind },
    PlayerDamaged { amount: i32 },
    WeaponSwitched { index: usize },
    ReloadStarted,
    ReloadCompleted,
    LevelUp { level: u32 },
    CapturePointer,
    ReleasePointer,
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec3,
    /// Units per second
    pub vel: Vec3,
    /// Camera yaw/pitch the ship is aligned with
    pub yaw: f32,
    pub pitch: f32,
    pub boosting: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            boosting: false,
        }
    }
}

/// Point light attached to an entity; released together with its owner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightAttachment {
    pub color: u32,
    pub intensity: f32,
    pub range: f32,
}

/// A weapon round in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec3,
    /// Fixed at creation; never re-aimed
    pub dir: Vec3,
    /// Units per reference frame
    pub speed: f32,
    /// Already includes any damage multiplier active at fire time
    pub damage: i32,
    pub owner: ProjectileOwner,
    pub color: u32,
    pub ttl: u32,
    pub light: Option<LightAttachment>,
}

/// A drifting asteroid
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: EntityId,
    pub pos: Vec3,
    /// Units per second
    pub vel: Vec3,
    pub rotation: Vec3,
    /// Radians per reference frame on each axis
    pub spin: Vec3,
    pub size: f32,
    pub health: i32,
}

/// A pursuing enemy ship
#[derive(Debug, Clone)]
pub struct Hostile {
    pub id: EntityId,
    pub pos: Vec3,
    /// Recomputed every tick toward the player
    pub vel: Vec3,
    /// Units per reference frame
    pub speed: f32,
    pub health: i32,
    pub fire_interval_ms: f64,
    /// Session time of the last shot; `None` fires at the first opportunity
    pub last_fired_ms: Option<f64>,
    pub light: Option<LightAttachment>,
}

/// A powerup pickup
#[derive(Debug, Clone)]
pub struct Collectible {
    pub id: EntityId,
    pub kind: PowerupKind,
    pub pos: Vec3,
    pub rotation: Vec3,
    pub size: f32,
    pub ttl: u32,
    pub light: Option<LightAttachment>,
}

impl Collectible {
    /// 1.0 until the last fade window, then linear to 0
    pub fn opacity(&self) -> f32 {
        if self.ttl < COLLECTIBLE_FADE_TICKS {
            self.ttl as f32 / COLLECTIBLE_FADE_TICKS as f32
        } else {
            1.0
        }
    }
}

/// Debris particle from an explosion
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: EntityId,
    pub pos: Vec3,
    /// Units per reference frame
    pub vel: Vec3,
    pub size: f32,
    pub color: [f32; 3],
    pub ttl: u32,
}

impl Particle {
    pub fn opacity(&self) -> f32 {
        if self.ttl < PARTICLE_FADE_TICKS {
            self.ttl as f32 / PARTICLE_FADE_TICKS as f32
        } else {
            1.0
        }
    }
}

/// Flash light marking an explosion; its debris lives in `particles`
#[derive(Debug, Clone)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec3,
    pub scale: f32,
    pub particle_count: u32,
    pub ttl: u32,
    pub light: LightAttachment,
}

/// A notification currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub hide_at_ms: f64,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: SessionPhase,
    /// Starting difficulty applied on start/restart
    pub preset: DifficultyPreset,
    /// Session clock (ms), advances only while active
    pub clock_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Wall clock (ms) for on-screen messages, advances in every phase
    pub ui_clock_ms: f64,

    pub score: u64,
    pub health: i32,
    pub max_health: i32,
    pub ammo: u32,
    pub weapon_index: usize,
    pub level: u32,
    pub difficulty: f32,
    /// Kills since the last level-up
    pub kill_count: u32,
    pub is_reloading: bool,
    pub reload_started_ms: f64,
    pub last_shot_ms: Option<f64>,
    /// Whether the frontend currently holds pointer capture
    pub input_captured: bool,

    pub player: Player,
    pub projectiles: Vec<Projectile>,
    pub hazards: Vec<Hazard>,
    pub hostiles: Vec<Hostile>,
    pub collectibles: Vec<Collectible>,
    pub particles: Vec<Particle>,
    pub explosions: Vec<Explosion>,

    pub effects: StatusEffects,
    pub spawner: SpawnScheduler,
    pub notifications: Vec<Notification>,
    /// Cap on live particles (quality setting)
    pub max_particles: usize,
    /// Pending frontend side effects
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle session with the given seed and difficulty preset
    pub fn new(seed: u64, preset: DifficultyPreset) -> Self {
        let weapon = &WEAPONS[0];
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: SessionPhase::Idle,
            preset,
            clock_ms: 0.0,
            time_ticks: 0,
            ui_clock_ms: 0.0,
            score: 0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            ammo: weapon.max_ammo,
            weapon_index: 0,
            level: 1,
            difficulty: preset.multiplier(),
            kill_count: 0,
            is_reloading: false,
            reload_started_ms: 0.0,
            last_shot_ms: None,
            input_captured: false,
            player: Player::default(),
            projectiles: Vec::with_capacity(64),
            hazards: Vec::with_capacity(64),
            hostiles: Vec::with_capacity(16),
            collectibles: Vec::with_capacity(8),
            particles: Vec::with_capacity(256),
            explosions: Vec::with_capacity(16),
            effects: StatusEffects::default(),
            spawner: SpawnScheduler::default(),
            notifications: Vec::new(),
            max_particles: MAX_PARTICLES,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Currently selected weapon
    pub fn weapon(&self) -> &'static Weapon {
        &WEAPONS[self.weapon_index]
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, sound: SoundKey) {
        self.events.push(GameEvent::Sound(sound));
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drop every entity, active effect and notification
    pub fn clear_entities(&mut self) {
        self.projectiles.clear();
        self.hazards.clear();
        self.hostiles.clear();
        self.collectibles.clear();
        self.particles.clear();
        self.explosions.clear();
        self.effects.clear();
        for n in self.notifications.drain(..) {
            self.events.push(GameEvent::NotificationHidden { kind: n.kind });
        }
    }

    /// Number of live entities across all collections (player excluded)
    pub fn entity_count(&self) -> usize {
        self.projectiles.len()
            + self.hazards.len()
            + self.hostiles.len()
            + self.collectibles.len()
            + self.particles.len()
            + self.explosions.len()
    }

    /// Whether the Shield status effect currently covers the player
    pub fn shielded(&self) -> bool {
        self.effects.is_active(PowerupKind::Shield.name(), self.clock_ms)
    }
}
