//! Time-gated spawning
//!
//! Each category keeps a next-due timestamp on the session clock. Polling spawns at
//! most one entity per due category and reschedules it from the current difficulty
//! and level. A due chain that finds the session inactive is dropped; entering the
//! active phase starts any chain that is not running, with an immediate first spawn.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::catalog::PowerupKind;
use super::state::{Collectible, GameState, Hazard, Hostile, LightAttachment};
use crate::consts::*;
use crate::{direction_or_default, spherical_direction};

/// The three independent spawn chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnCategory {
    Hazard,
    Hostile,
    Collectible,
}

impl SpawnCategory {
    pub const ALL: [SpawnCategory; 3] = [
        SpawnCategory::Hazard,
        SpawnCategory::Hostile,
        SpawnCategory::Collectible,
    ];

    /// Delay until the next spawn of this category
    pub fn interval_ms(self, difficulty: f32, level: u32) -> f64 {
        let difficulty = f64::from(difficulty.max(f32::EPSILON));
        match self {
            SpawnCategory::Hazard => HAZARD_SPAWN_INTERVAL_MS / (difficulty * 1.2),
            SpawnCategory::Hostile => {
                HOSTILE_SPAWN_INTERVAL_MS / (difficulty * (1.0 + 0.1 * f64::from(level)))
            }
            SpawnCategory::Collectible => COLLECTIBLE_SPAWN_INTERVAL_MS,
        }
    }
}

/// Next-fire timestamps per category; `None` means the chain is not running
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnScheduler {
    hazard: Option<f64>,
    hostile: Option<f64>,
    collectible: Option<f64>,
}

impl SpawnScheduler {
    fn slot(&mut self, category: SpawnCategory) -> &mut Option<f64> {
        match category {
            SpawnCategory::Hazard => &mut self.hazard,
            SpawnCategory::Hostile => &mut self.hostile,
            SpawnCategory::Collectible => &mut self.collectible,
        }
    }

    /// When `category` is next due, if its chain is running
    pub fn next_due(&self, category: SpawnCategory) -> Option<f64> {
        match category {
            SpawnCategory::Hazard => self.hazard,
            SpawnCategory::Hostile => self.hostile,
            SpawnCategory::Collectible => self.collectible,
        }
    }

    pub fn is_scheduled(&self, category: SpawnCategory) -> bool {
        self.next_due(category).is_some()
    }

    /// Whether any chain is running
    pub fn is_running(&self) -> bool {
        SpawnCategory::ALL.iter().any(|&c| self.is_scheduled(c))
    }

    pub fn schedule(&mut self, category: SpawnCategory, at_ms: f64) {
        *self.slot(category) = Some(at_ms);
    }

    pub fn cancel(&mut self, category: SpawnCategory) {
        *self.slot(category) = None;
    }

    /// Start every chain that is not already running, due immediately.
    /// Running chains keep their schedule.
    pub fn start_all(&mut self, now_ms: f64) {
        for category in SpawnCategory::ALL {
            let slot = self.slot(category);
            if slot.is_none() {
                *slot = Some(now_ms);
            }
        }
    }

    pub fn stop_all(&mut self) {
        *self = Self::default();
    }
}

/// Spawn whatever is due at the current session time. Returns the number spawned.
pub fn poll(state: &mut GameState) -> usize {
    let now = state.clock_ms;
    let mut spawned = 0;
    for category in SpawnCategory::ALL {
        let Some(due) = state.spawner.next_due(category) else {
            continue;
        };
        if now < due {
            continue;
        }
        if !state.is_active() {
            state.spawner.cancel(category);
            log::debug!("{:?} spawn chain stopped in {:?}", category, state.phase);
            continue;
        }

        spawn(state, category);
        let interval = category.interval_ms(state.difficulty, state.level);
        state.spawner.schedule(category, now + interval);
        spawned += 1;
    }
    spawned
}

/// Create one entity of `category` around the player
pub fn spawn(state: &mut GameState, category: SpawnCategory) {
    match category {
        SpawnCategory::Hazard => {
            let hazard = create_hazard(state);
            log::debug!("Spawned hazard {:?} (size {:.2})", hazard.id, hazard.size);
            state.hazards.push(hazard);
        }
        SpawnCategory::Hostile => {
            let hostile = create_hostile(state);
            log::debug!("Spawned hostile {:?}", hostile.id);
            state.hostiles.push(hostile);
        }
        SpawnCategory::Collectible => {
            let collectible = create_collectible(state);
            log::debug!("Spawned {:?} pickup", collectible.kind);
            state.collectibles.push(collectible);
        }
    }
}

/// Random point `distance` away from `origin`, inside the elevation band
fn peripheral_position(rng: &mut Pcg32, origin: Vec3, distance: f32) -> Vec3 {
    let angle = rng.random::<f32>() * TAU;
    let elevation = (rng.random::<f32>() - 0.5) * FRAC_PI_2;
    origin + spherical_direction(angle, elevation) * distance
}

/// Asteroid aimed at the player's current position; size and speed grow with difficulty
pub fn create_hazard(state: &mut GameState) -> Hazard {
    let difficulty = state.difficulty;
    let target = state.player.pos;
    let rng = &mut state.rng;

    let pos = peripheral_position(rng, target, HAZARD_SPAWN_DISTANCE);
    let size = HAZARD_MIN_SIZE + rng.random::<f32>() * HAZARD_SIZE_RANGE * difficulty;
    let speed = HAZARD_BASE_SPEED + rng.random::<f32>() * HAZARD_SPEED_RANGE * difficulty;
    let spin = Vec3::new(
        (rng.random::<f32>() - 0.5) * HAZARD_TUMBLE,
        (rng.random::<f32>() - 0.5) * HAZARD_TUMBLE,
        (rng.random::<f32>() - 0.5) * HAZARD_TUMBLE,
    );

    Hazard {
        id: state.next_entity_id(),
        pos,
        vel: direction_or_default(target - pos) * speed / REFERENCE_DT,
        rotation: Vec3::ZERO,
        spin,
        size,
        health: ((size * 10.0).floor() as i32).max(1),
    }
}

/// Pursuing enemy; tougher, faster and quicker to fire as the run progresses
pub fn create_hostile(state: &mut GameState) -> Hostile {
    let pos = peripheral_position(&mut state.rng, state.player.pos, HOSTILE_SPAWN_DISTANCE);
    let difficulty = state.difficulty.max(f32::EPSILON);

    Hostile {
        id: state.next_entity_id(),
        pos,
        vel: Vec3::ZERO,
        speed: HOSTILE_BASE_SPEED + HOSTILE_SPEED_PER_LEVEL * state.level as f32,
        health: ((HOSTILE_BASE_HEALTH * difficulty).floor() as i32).max(1),
        fire_interval_ms: HOSTILE_FIRE_INTERVAL_MS / f64::from(difficulty),
        last_fired_ms: None,
        light: Some(LightAttachment {
            color: 0xff0000,
            intensity: 1.0,
            range: 10.0,
        }),
    }
}

/// Random powerup at a random distance
pub fn create_collectible(state: &mut GameState) -> Collectible {
    let spread = state.rng.random::<f32>() * COLLECTIBLE_SPAWN_DISTANCE_RANGE;
    let distance = COLLECTIBLE_SPAWN_MIN_DISTANCE + spread;
    let pos = peripheral_position(&mut state.rng, state.player.pos, distance);
    let kind = PowerupKind::ALL[state.rng.random_range(0..PowerupKind::ALL.len())];

    Collectible {
        id: state.next_entity_id(),
        kind,
        pos,
        rotation: Vec3::ZERO,
        size: COLLECTIBLE_SIZE,
        ttl: COLLECTIBLE_TTL,
        light: Some(LightAttachment {
            color: kind.color(),
            intensity: 1.0,
            range: 5.0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DifficultyPreset;
    use crate::sim::session;

    fn active_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, DifficultyPreset::Medium);
        session::start(&mut state);
        state.drain_events();
        state
    }

    #[test]
    fn test_intervals_scale_with_difficulty() {
        assert!((SpawnCategory::Hazard.interval_ms(1.0, 1) - 1250.0).abs() < 1e-9);
        assert!((SpawnCategory::Hostile.interval_ms(1.0, 1) - 3000.0 / 1.1).abs() < 1e-9);
        assert_eq!(SpawnCategory::Collectible.interval_ms(3.0, 9), 15000.0);
        let hazard = SpawnCategory::Hazard;
        let hostile = SpawnCategory::Hostile;
        assert!(hazard.interval_ms(2.0, 1) < hazard.interval_ms(1.0, 1));
        assert!(hostile.interval_ms(1.0, 5) < hostile.interval_ms(1.0, 1));
    }

    #[test]
    fn test_start_spawns_immediately_then_waits() {
        let mut state = active_state(3);
        assert_eq!(poll(&mut state), 3);
        assert_eq!(state.hazards.len(), 1);
        assert_eq!(state.hostiles.len(), 1);
        assert_eq!(state.collectibles.len(), 1);

        assert_eq!(poll(&mut state), 0);
        state.clock_ms = 1249.0;
        assert_eq!(poll(&mut state), 0);
        state.clock_ms = 1250.0;
        assert_eq!(poll(&mut state), 1);
        assert_eq!(state.hazards.len(), 2);
    }

    #[test]
    fn test_inactive_poll_drops_chain() {
        let mut state = active_state(3);
        poll(&mut state);
        session::pause(&mut state);
        state.clock_ms = 20000.0;
        assert_eq!(poll(&mut state), 0);
        assert!(!state.spawner.is_running());

        // Resuming restarts every chain with an immediate spawn
        session::resume(&mut state);
        assert_eq!(poll(&mut state), 3);
    }

    #[test]
    fn test_start_all_keeps_running_chains() {
        let mut scheduler = SpawnScheduler::default();
        scheduler.schedule(SpawnCategory::Hostile, 900.0);
        scheduler.start_all(100.0);
        assert_eq!(scheduler.next_due(SpawnCategory::Hostile), Some(900.0));
        assert_eq!(scheduler.next_due(SpawnCategory::Hazard), Some(100.0));
        scheduler.stop_all();
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_spawns_at_periphery() {
        let mut state = active_state(11);
        state.player.pos = Vec3::new(5.0, -2.0, 8.0);
        for _ in 0..50 {
            let hazard = create_hazard(&mut state);
            let d = hazard.pos.distance(state.player.pos);
            assert!((d - HAZARD_SPAWN_DISTANCE).abs() < 1e-3);
            // Elevation stays within ±45°
            let rel = (hazard.pos - state.player.pos) / d;
            assert!(rel.y.abs() <= std::f32::consts::FRAC_PI_4.sin() + 1e-4);

            let c = create_collectible(&mut state);
            let d = c.pos.distance(state.player.pos);
            assert!((30.0 - 1e-3..=50.0 + 1e-3).contains(&d));
        }
    }

    #[test]
    fn test_hazard_aims_at_player_with_health_from_size() {
        let mut state = active_state(5);
        for _ in 0..50 {
            let hazard = create_hazard(&mut state);
            assert_eq!(hazard.health, ((hazard.size * 10.0).floor() as i32).max(1));
            assert!(hazard.size >= HAZARD_MIN_SIZE);
            assert!(hazard.size <= HAZARD_MIN_SIZE + HAZARD_SIZE_RANGE);
            let to_player = (state.player.pos - hazard.pos).normalize();
            assert!(hazard.vel.normalize().dot(to_player) > 0.999);
            assert!(hazard.spin.abs().max_element() <= HAZARD_TUMBLE / 2.0);
        }
    }

    #[test]
    fn test_hostile_stats_follow_difficulty_and_level() {
        let mut state = active_state(5);
        state.difficulty = 1.5;
        state.level = 3;
        let hostile = create_hostile(&mut state);
        assert_eq!(hostile.health, 45);
        assert!((hostile.speed - 0.11).abs() < 1e-6);
        assert!((hostile.fire_interval_ms - 2000.0 / 1.5).abs() < 1e-6);
        assert!(hostile.last_fired_ms.is_none());
    }

    #[test]
    fn test_spawning_is_deterministic_per_seed() {
        let mut a = active_state(77);
        let mut b = active_state(77);
        for _ in 0..10 {
            let ha = create_hazard(&mut a);
            let hb = create_hazard(&mut b);
            assert_eq!(ha.pos, hb.pos);
            assert_eq!(ha.size, hb.size);
        }
    }
}
