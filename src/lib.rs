//! Space Defender - A 3D arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic gameplay simulation (physics, combat, spawning, session)
//! - `input`: Key/pointer mapping into per-tick input
//! - `hud`, `minimap`, `view`: Read-only projections for the frontend
//! - `settings`: User preferences
//! - `audio`: Web Audio sound effects (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod hud;
pub mod input;
pub mod minimap;
pub mod settings;
pub mod sim;
pub mod view;

pub use settings::{DifficultyPreset, QualityPreset, Settings, SettingsError};

use glam::{EulerRot, Quat, Vec3};

/// Game configuration constants
pub mod consts {
    /// Frame length the per-frame tuning values were authored against (60 Hz)
    pub const REFERENCE_DT: f32 = 1.0 / 60.0;
    /// Longest frame delta a single tick will absorb
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Player
    pub const PLAYER_RADIUS: f32 = 0.5;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    /// Velocity added per reference frame while a movement key is held
    pub const PLAYER_ACCEL: f32 = 0.15;
    pub const PLAYER_BOOST_ACCEL: f32 = 0.3;
    /// Velocity retained per reference frame
    pub const PLAYER_DAMPING: f32 = 0.95;
    /// Body drag: fraction of velocity lost per second, on top of `PLAYER_DAMPING`
    pub const PLAYER_LINEAR_DAMPING: f32 = 0.5;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f32 = 0.1;
    pub const PROJECTILE_TTL: u32 = 100;
    pub const HOSTILE_PROJECTILE_SPEED: f32 = 0.3;
    pub const HOSTILE_PROJECTILE_DAMAGE: i32 = 10;

    /// Hostiles
    pub const HOSTILE_RADIUS: f32 = 0.6;
    /// Centre distance at which a hostile rams the player
    pub const HOSTILE_CONTACT_DISTANCE: f32 = 1.0;
    pub const HOSTILE_BASE_HEALTH: f32 = 30.0;
    pub const HOSTILE_BASE_SPEED: f32 = 0.08;
    pub const HOSTILE_SPEED_PER_LEVEL: f32 = 0.01;
    pub const HOSTILE_FIRE_INTERVAL_MS: f64 = 2000.0;
    pub const HOSTILE_CONTACT_DAMAGE: i32 = 20;
    pub const HOSTILE_SCORE: u64 = 50;

    /// Hazards (asteroids)
    pub const HAZARD_MIN_SIZE: f32 = 0.5;
    pub const HAZARD_SIZE_RANGE: f32 = 1.5;
    pub const HAZARD_BASE_SPEED: f32 = 0.05;
    pub const HAZARD_SPEED_RANGE: f32 = 0.05;
    pub const HAZARD_TUMBLE: f32 = 0.02;

    /// Collectibles (powerups)
    pub const COLLECTIBLE_SIZE: f32 = 0.5;
    pub const COLLECTIBLE_TTL: u32 = 600;
    pub const COLLECTIBLE_SPIN: f32 = 0.03;
    pub const COLLECTIBLE_FADE_TICKS: u32 = 60;

    /// Effects
    pub const PARTICLE_FADE_TICKS: u32 = 10;
    pub const EXPLOSION_FLASH_TTL: u32 = 20;
    pub const MAX_PARTICLES: usize = 2000;

    /// Spawning
    pub const HAZARD_SPAWN_DISTANCE: f32 = 50.0;
    pub const HOSTILE_SPAWN_DISTANCE: f32 = 60.0;
    pub const COLLECTIBLE_SPAWN_MIN_DISTANCE: f32 = 30.0;
    pub const COLLECTIBLE_SPAWN_DISTANCE_RANGE: f32 = 20.0;
    pub const HAZARD_SPAWN_INTERVAL_MS: f64 = 1500.0;
    pub const HOSTILE_SPAWN_INTERVAL_MS: f64 = 3000.0;
    pub const COLLECTIBLE_SPAWN_INTERVAL_MS: f64 = 15000.0;

    /// Play space
    pub const CULL_DISTANCE: f32 = 100.0;
    pub const MINIMAP_RANGE: f32 = 50.0;

    /// Progression
    pub const KILLS_PER_LEVEL: u32 = 10;
    pub const DIFFICULTY_STEP: f32 = 0.2;
    pub const LEVEL_UP_HEAL: i32 = 20;

    /// UI timing
    pub const NOTIFICATION_DURATION_MS: f64 = 3000.0;
}

/// Fallback heading used when a direction cannot be derived (coincident points)
pub const DEFAULT_DIRECTION: Vec3 = Vec3::NEG_Z;

/// Normalize, falling back to [`DEFAULT_DIRECTION`] for zero or non-finite vectors
#[inline]
pub fn direction_or_default(v: Vec3) -> Vec3 {
    v.normalize_or(DEFAULT_DIRECTION)
}

/// Camera orientation from yaw (about +Y) and pitch (about +X), YXZ order
#[inline]
pub fn camera_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Forward (-Z) and right (+X) basis vectors of the camera
#[inline]
pub fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3) {
    let rotation = camera_rotation(yaw, pitch);
    (rotation * Vec3::NEG_Z, rotation * Vec3::X)
}

/// Unit vector from an azimuth angle (radians, around Y) and an elevation (radians above XZ)
#[inline]
pub fn spherical_direction(angle: f32, elevation: f32) -> Vec3 {
    Vec3::new(
        angle.cos() * elevation.cos(),
        elevation.sin(),
        angle.sin() * elevation.cos(),
    )
}
