//! Kinematic integration, lifetimes and culling
//!
//! Velocities are stored in units per second and integrated against the real frame
//! delta. Per-frame tuning values (acceleration, damping, spin) are scaled by the
//! frame step `dt / REFERENCE_DT`, so one step equals one 60 Hz frame.

use glam::Vec3;

use super::state::GameState;
use super::tick::TickInput;
use crate::consts::*;
use crate::{camera_basis, direction_or_default};

/// Frame step in reference frames for a delta in seconds
#[inline]
pub fn frame_step(dt: f32) -> f32 {
    dt / REFERENCE_DT
}

/// Sphere overlap: distance strictly less than the summed radii.
/// Coincident positions collide.
#[inline]
pub fn collides(a: Vec3, radius_a: f32, b: Vec3, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

/// Fraction of player velocity kept over a frame of `dt` seconds
#[inline]
pub fn player_retention(dt: f32) -> f32 {
    PLAYER_DAMPING.powf(frame_step(dt)) * (1.0 - PLAYER_LINEAR_DAMPING).powf(dt)
}

/// Decrement a tick lifetime; true when it has just reached zero
#[inline]
pub fn count_down(ttl: &mut u32) -> bool {
    *ttl = ttl.saturating_sub(1);
    *ttl == 0
}

/// Thrust along the camera basis, damp, then move the player
pub fn integrate_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let step = frame_step(dt);
    let player = &mut state.player;

    player.yaw = input.yaw;
    player.pitch = input.pitch;
    player.boosting = input.boost;

    let (forward, right) = camera_basis(input.yaw, input.pitch);
    let accel = if input.boost {
        PLAYER_BOOST_ACCEL
    } else {
        PLAYER_ACCEL
    };

    let mut thrust = Vec3::ZERO;
    if input.forward {
        thrust += forward;
    }
    if input.backward {
        thrust -= forward;
    }
    if input.right {
        thrust += right;
    }
    if input.left {
        thrust -= right;
    }

    player.vel += thrust * accel * step;
    player.vel *= player_retention(dt);
    player.pos += player.vel * dt;
}

/// Constant drift plus tumble
pub fn integrate_hazards(state: &mut GameState, dt: f32) {
    let step = frame_step(dt);
    for hazard in &mut state.hazards {
        hazard.pos += hazard.vel * dt;
        hazard.rotation += hazard.spin * step;
    }
}

/// Pure pursuit: velocity re-aimed at the player every tick, no inertia
pub fn steer_hostiles(state: &mut GameState, dt: f32) {
    let target = state.player.pos;
    for hostile in &mut state.hostiles {
        let heading = direction_or_default(target - hostile.pos);
        hostile.vel = heading * hostile.speed / REFERENCE_DT;
        hostile.pos += hostile.vel * dt;
    }
}

/// Spin and age pickups; expired ones are removed
pub fn advance_collectibles(state: &mut GameState, dt: f32) {
    let step = frame_step(dt);
    state.collectibles.retain_mut(|c| {
        c.rotation.x += COLLECTIBLE_SPIN * step;
        c.rotation.y += COLLECTIBLE_SPIN * 1.5 * step;
        if count_down(&mut c.ttl) {
            return false;
        }
        if let Some(light) = c.light.as_mut() {
            let fade = c.ttl.min(COLLECTIBLE_FADE_TICKS) as f32;
            light.intensity = fade / COLLECTIBLE_FADE_TICKS as f32;
        }
        true
    });
}

/// Debris and explosion flashes
pub fn advance_effects(state: &mut GameState, dt: f32) {
    let step = frame_step(dt);
    state.particles.retain_mut(|p| {
        p.pos += p.vel * step;
        !count_down(&mut p.ttl)
    });
    state.explosions.retain_mut(|e| {
        if count_down(&mut e.ttl) {
            return false;
        }
        e.light.intensity = e.ttl as f32 / 10.0;
        true
    });
}

/// Remove hazards and hostiles at or beyond the horizon, without combat side effects.
/// Only entities strictly inside `CULL_DISTANCE` survive.
pub fn cull_distant(state: &mut GameState) -> usize {
    let origin = state.player.pos;
    let before = state.hazards.len() + state.hostiles.len();
    state
        .hazards
        .retain(|h| h.pos.distance(origin) < CULL_DISTANCE);
    state
        .hostiles
        .retain(|h| h.pos.distance(origin) < CULL_DISTANCE);
    let culled = before - state.hazards.len() - state.hostiles.len();
    if culled > 0 {
        log::debug!("Culled {} distant entities", culled);
    }
    culled
}

/// Full integrator pass for one tick (projectiles are advanced by combat)
pub fn integrate(state: &mut GameState, input: &TickInput, dt: f32) {
    integrate_player(state, input, dt);
    integrate_hazards(state, dt);
    steer_hostiles(state, dt);
    advance_collectibles(state, dt);
    advance_effects(state, dt);
    cull_distant(state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DifficultyPreset;
    use crate::sim::state::{EntityId, Hazard, Hostile, Particle};

    fn hazard_at(state: &mut GameState, pos: Vec3) {
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            pos,
            vel: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: Vec3::ZERO,
            size: 1.0,
            health: 10,
        });
    }

    #[test]
    fn test_collides_is_symmetric_and_strict() {
        let a = Vec3::ZERO;
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(collides(a, 0.6, b, 0.5));
        assert!(collides(b, 0.5, a, 0.6));
        assert!(!collides(a, 0.5, b, 0.5));
        // Coincident points
        assert!(collides(a, 0.1, a, 0.1));
    }

    #[test]
    fn test_player_drifts_after_release() {
        let mut state = GameState::new(1, DifficultyPreset::Medium);
        let thrust = TickInput {
            forward: true,
            ..Default::default()
        };
        integrate_player(&mut state, &thrust, REFERENCE_DT);
        let v1 = state.player.vel;
        let kept = 0.95 * 0.5f32.powf(REFERENCE_DT);
        assert!((v1.z - (-0.15 * kept)).abs() < 1e-6);

        let coast = TickInput::default();
        integrate_player(&mut state, &coast, REFERENCE_DT);
        assert!((state.player.vel.z - v1.z * kept).abs() < 1e-6);
        assert!(state.player.pos.z < 0.0);
    }

    #[test]
    fn test_player_retention_is_frame_rate_independent() {
        let one = player_retention(2.0 * REFERENCE_DT);
        let two = player_retention(REFERENCE_DT).powi(2);
        assert!((one - two).abs() < 1e-6);
        // Body drag lowers terminal speed below the per-frame damping alone
        let terminal = PLAYER_ACCEL * player_retention(REFERENCE_DT)
            / (1.0 - player_retention(REFERENCE_DT));
        let undragged = PLAYER_ACCEL * PLAYER_DAMPING / (1.0 - PLAYER_DAMPING);
        assert!(terminal < undragged * 0.85);
    }

    #[test]
    fn test_boost_doubles_acceleration() {
        let mut a = GameState::new(1, DifficultyPreset::Medium);
        let mut b = GameState::new(1, DifficultyPreset::Medium);
        let normal = TickInput {
            right: true,
            ..Default::default()
        };
        let boosted = TickInput {
            right: true,
            boost: true,
            ..Default::default()
        };
        integrate_player(&mut a, &normal, REFERENCE_DT);
        integrate_player(&mut b, &boosted, REFERENCE_DT);
        assert!((b.player.vel.x - 2.0 * a.player.vel.x).abs() < 1e-6);
        assert!(b.player.boosting);
    }

    #[test]
    fn test_motion_is_frame_rate_independent_at_constant_velocity() {
        let mut a = GameState::new(1, DifficultyPreset::Medium);
        let mut b = GameState::new(1, DifficultyPreset::Medium);
        hazard_at(&mut a, Vec3::ZERO);
        hazard_at(&mut b, Vec3::ZERO);
        a.hazards[0].vel = Vec3::new(3.0, 0.0, 0.0);
        b.hazards[0].vel = Vec3::new(3.0, 0.0, 0.0);
        for _ in 0..60 {
            integrate_hazards(&mut a, 1.0 / 60.0);
        }
        for _ in 0..120 {
            integrate_hazards(&mut b, 1.0 / 120.0);
        }
        assert!((a.hazards[0].pos.x - 3.0).abs() < 1e-3);
        assert!((a.hazards[0].pos.x - b.hazards[0].pos.x).abs() < 1e-3);
    }

    #[test]
    fn test_hostile_pursuit_recomputed_each_tick() {
        let mut state = GameState::new(1, DifficultyPreset::Medium);
        let id = state.next_entity_id();
        state.hostiles.push(Hostile {
            id,
            pos: Vec3::new(10.0, 0.0, 0.0),
            vel: Vec3::new(0.0, 5.0, 0.0),
            speed: 0.1,
            health: 30,
            fire_interval_ms: 2000.0,
            last_fired_ms: None,
            light: None,
        });
        steer_hostiles(&mut state, REFERENCE_DT);
        let vel = state.hostiles[0].vel;
        assert!((vel - Vec3::new(-6.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_hostile_on_top_of_player_does_not_go_nan() {
        let mut state = GameState::new(1, DifficultyPreset::Medium);
        let id = state.next_entity_id();
        state.hostiles.push(Hostile {
            id,
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            speed: 0.1,
            health: 30,
            fire_interval_ms: 2000.0,
            last_fired_ms: None,
            light: None,
        });
        steer_hostiles(&mut state, REFERENCE_DT);
        assert!(state.hostiles[0].pos.is_finite());
    }

    #[test]
    fn test_cull_boundary_is_strict() {
        let mut state = GameState::new(1, DifficultyPreset::Medium);
        hazard_at(&mut state, Vec3::new(100.0, 0.0, 0.0));
        hazard_at(&mut state, Vec3::new(0.0, 0.0, 99.999));
        hazard_at(&mut state, Vec3::new(0.0, 100.5, 0.0));
        assert_eq!(cull_distant(&mut state), 2);
        assert_eq!(state.hazards.len(), 1);
        assert!((state.hazards[0].pos.z - 99.999).abs() < 1e-4);
    }

    #[test]
    fn test_particles_expire_on_zero() {
        let mut state = GameState::new(1, DifficultyPreset::Medium);
        state.particles.push(Particle {
            id: EntityId(99),
            pos: Vec3::ZERO,
            vel: Vec3::X,
            size: 0.1,
            color: [1.0, 0.5, 0.0],
            ttl: 2,
        });
        advance_effects(&mut state, REFERENCE_DT);
        assert_eq!(state.particles[0].ttl, 1);
        advance_effects(&mut state, REFERENCE_DT);
        assert!(state.particles.is_empty());
    }
}
