//! Weapons, hit resolution, damage and pickups
//!
//! Collections are walked back-to-front so removing the current element never
//! skips or revisits a neighbour. A projectile is consumed by the first target it
//! overlaps; the player's shots never hit the player, hostile shots only hit the player.

use glam::Vec3;
use rand::Rng;

use super::catalog::{HEALTH_BOOST_AMOUNT, PowerupKind, WEAPONS};
use super::physics::{collides, count_down, frame_step};
use super::session;
use super::state::{
    EntityId, Explosion, GameEvent, GameState, LightAttachment, NotificationKind, Particle,
    Projectile, ProjectileOwner, SoundKey,
};
use crate::consts::*;
use crate::{camera_basis, direction_or_default};

/// Debris emitted when a hazard is destroyed
pub const HAZARD_EXPLOSION_PARTICLES: u32 = 20;
/// Debris emitted when a hostile is destroyed
pub const HOSTILE_EXPLOSION_PARTICLES: u32 = 30;
const HAZARD_SPARK: (f32, u32) = (0.2, 5);
const HOSTILE_SPARK: (f32, u32) = (0.3, 8);
const EXPLOSION_LIGHT: LightAttachment = LightAttachment {
    color: 0xff5500,
    intensity: 2.0,
    range: 10.0,
};

/// Select weapon `index`, refilling its magazine. Out-of-range indices are ignored.
pub fn switch_weapon(state: &mut GameState, index: usize) -> bool {
    let Some(weapon) = WEAPONS.get(index) else {
        log::warn!("Ignoring weapon index {}", index);
        return false;
    };
    state.weapon_index = index;
    state.ammo = weapon.max_ammo;
    state.is_reloading = false;
    state.play(SoundKey::Reload);
    state.push_event(GameEvent::WeaponSwitched { index });
    log::info!("Weapon: {}", weapon.name);
    true
}

/// Begin reloading the current weapon; no-op while already reloading
pub fn start_reload(state: &mut GameState) -> bool {
    if state.is_reloading {
        return false;
    }
    state.is_reloading = true;
    state.reload_started_ms = state.clock_ms;
    state.play(SoundKey::Reload);
    state.push_event(GameEvent::ReloadStarted);
    true
}

/// Manual reload: only when the magazine is not already full
pub fn request_reload(state: &mut GameState) -> bool {
    if state.is_reloading || state.ammo >= state.weapon().max_ammo {
        return false;
    }
    start_reload(state)
}

/// Finish a reload once the weapon's reload time has elapsed on the session clock
pub fn update_reload(state: &mut GameState) -> bool {
    if !state.is_reloading {
        return false;
    }
    if state.clock_ms - state.reload_started_ms >= state.weapon().reload_ms {
        state.is_reloading = false;
        state.ammo = state.weapon().max_ammo;
        state.push_event(GameEvent::ReloadCompleted);
        return true;
    }
    false
}

/// Cooldown between shots, halved under Rapid Fire
pub fn effective_cooldown_ms(state: &GameState) -> f64 {
    let base = state.weapon().cooldown_ms;
    if state
        .effects
        .is_active(PowerupKind::RapidFire.name(), state.clock_ms)
    {
        base * 0.5
    } else {
        base
    }
}

/// Fire the current weapon along the camera's forward axis.
///
/// Empty magazine starts a reload instead; firing while reloading or inside the
/// cooldown does nothing. Double Damage is baked into the projectile here.
pub fn fire(state: &mut GameState) -> Option<EntityId> {
    if state.is_reloading {
        return None;
    }
    if state.ammo == 0 {
        start_reload(state);
        return None;
    }
    if let Some(last) = state.last_shot_ms {
        if state.clock_ms - last < effective_cooldown_ms(state) {
            return None;
        }
    }

    state.last_shot_ms = Some(state.clock_ms);
    state.ammo -= 1;

    let weapon = state.weapon();
    let multiplier = if state
        .effects
        .is_active(PowerupKind::DoubleDamage.name(), state.clock_ms)
    {
        2
    } else {
        1
    };
    let (forward, _) = camera_basis(state.player.yaw, state.player.pitch);
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        pos: state.player.pos,
        dir: direction_or_default(forward),
        speed: weapon.projectile_speed,
        damage: weapon.damage * multiplier,
        owner: ProjectileOwner::Player {
            weapon: state.weapon_index,
        },
        color: weapon.projectile_color,
        ttl: PROJECTILE_TTL,
        light: Some(LightAttachment {
            color: weapon.projectile_color,
            intensity: 1.0,
            range: 5.0,
        }),
    });
    state.play(weapon.sound);
    Some(id)
}

/// Apply damage to the player. Ignored outside the active phase or under Shield.
/// Returns whether health changed.
pub fn damage_player(state: &mut GameState, amount: i32) -> bool {
    if !state.is_active() || state.shielded() {
        return false;
    }
    state.health -= amount;
    state.push_event(GameEvent::PlayerDamaged { amount });
    state.play(SoundKey::PlayerHit);
    if state.health <= 0 {
        session::game_over(state);
    }
    true
}

/// Burst of debris plus a flash light. Particles beyond the cap are dropped.
pub fn spawn_explosion(state: &mut GameState, pos: Vec3, scale: f32, count: u32) -> EntityId {
    for _ in 0..count {
        if state.particles.len() >= state.max_particles {
            break;
        }
        let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
        let elevation =
            state.rng.random::<f32>() * std::f32::consts::PI - std::f32::consts::FRAC_PI_2;
        let speed = 0.05 + state.rng.random::<f32>() * 0.1;
        let color = [
            0.8 + state.rng.random::<f32>() * 0.2,
            0.2 + state.rng.random::<f32>() * 0.4,
            state.rng.random::<f32>() * 0.2,
        ];
        let ttl = 30 + (state.rng.random::<f32>() * 30.0) as u32;
        let id = state.next_entity_id();
        state.particles.push(Particle {
            id,
            pos,
            vel: crate::spherical_direction(angle, elevation) * speed,
            size: 0.1 * scale,
            color,
            ttl,
        });
    }

    let id = state.next_entity_id();
    state.explosions.push(Explosion {
        id,
        pos,
        scale,
        particle_count: count,
        ttl: EXPLOSION_FLASH_TTL,
        light: EXPLOSION_LIGHT,
    });
    state.play(SoundKey::Explosion);
    id
}

/// Score for destroying a hazard of this size
#[inline]
pub fn hazard_score(size: f32) -> u64 {
    (size * 10.0).floor().max(0.0) as u64
}

/// Contact damage dealt by a hazard of this size
#[inline]
pub fn hazard_contact_damage(size: f32) -> i32 {
    (size * 10.0).floor() as i32
}

/// Remove hazard `index` with an explosion; `award` grants score and a kill
fn destroy_hazard(state: &mut GameState, index: usize, award: bool) {
    let hazard = state.hazards.remove(index);
    spawn_explosion(state, hazard.pos, hazard.size, HAZARD_EXPLOSION_PARTICLES);
    if award {
        state.score += hazard_score(hazard.size);
        state.kill_count += 1;
        log::debug!("Hazard {:?} destroyed (size {:.2})", hazard.id, hazard.size);
    }
}

/// Remove hostile `index` with an explosion; its engine light goes with it
fn destroy_hostile(state: &mut GameState, index: usize, award: bool) {
    let hostile = state.hostiles.remove(index);
    spawn_explosion(state, hostile.pos, 1.0, HOSTILE_EXPLOSION_PARTICLES);
    if award {
        state.score += HOSTILE_SCORE;
        state.kill_count += 1;
        log::debug!("Hostile {:?} destroyed", hostile.id);
    }
}

/// Advance every projectile, expire it, then resolve at most one hit
pub fn resolve_projectiles(state: &mut GameState, dt: f32) {
    let step = frame_step(dt);
    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;

        let projectile = &mut state.projectiles[i];
        projectile.pos += projectile.dir * projectile.speed * step;
        if count_down(&mut projectile.ttl) {
            state.projectiles.remove(i);
            continue;
        }
        let (pos, damage, owner) = (projectile.pos, projectile.damage, projectile.owner);

        match owner {
            ProjectileOwner::Player { .. } => {
                if let Some(j) = state
                    .hazards
                    .iter()
                    .rposition(|h| collides(pos, PROJECTILE_RADIUS, h.pos, h.size))
                {
                    state.projectiles.remove(i);
                    state.hazards[j].health -= damage;
                    spawn_explosion(state, pos, HAZARD_SPARK.0, HAZARD_SPARK.1);
                    state.play(SoundKey::Hit);
                    if state.hazards[j].health <= 0 {
                        destroy_hazard(state, j, true);
                    }
                } else if let Some(j) = state
                    .hostiles
                    .iter()
                    .rposition(|h| collides(pos, PROJECTILE_RADIUS, h.pos, HOSTILE_RADIUS))
                {
                    state.projectiles.remove(i);
                    state.hostiles[j].health -= damage;
                    spawn_explosion(state, pos, HOSTILE_SPARK.0, HOSTILE_SPARK.1);
                    state.play(SoundKey::Hit);
                    if state.hostiles[j].health <= 0 {
                        destroy_hostile(state, j, true);
                    }
                }
            }
            ProjectileOwner::Hostile => {
                if collides(pos, PROJECTILE_RADIUS, state.player.pos, PLAYER_RADIUS) {
                    state.projectiles.remove(i);
                    damage_player(state, damage);
                }
            }
        }
    }
}

/// Ramming: the hazard/hostile is always destroyed (no score), the player is
/// damaged unless shielded
pub fn resolve_player_collisions(state: &mut GameState) {
    let player_pos = state.player.pos;

    let mut i = state.hazards.len();
    while i > 0 {
        i -= 1;
        let hazard = &state.hazards[i];
        if collides(hazard.pos, hazard.size, player_pos, PLAYER_RADIUS) {
            let damage = hazard_contact_damage(hazard.size);
            destroy_hazard(state, i, false);
            damage_player(state, damage);
        }
    }

    let mut i = state.hostiles.len();
    while i > 0 {
        i -= 1;
        if state.hostiles[i].pos.distance(player_pos) < HOSTILE_CONTACT_DISTANCE {
            destroy_hostile(state, i, false);
            damage_player(state, HOSTILE_CONTACT_DAMAGE);
        }
    }
}

/// Each hostile fires at the player's current position once its interval has elapsed.
/// The round's heading is fixed at creation.
pub fn hostile_fire(state: &mut GameState) {
    let now = state.clock_ms;
    let target = state.player.pos;
    let mut shots: Vec<(Vec3, Vec3)> = Vec::new();

    for hostile in &mut state.hostiles {
        let ready = hostile
            .last_fired_ms
            .is_none_or(|last| now - last > hostile.fire_interval_ms);
        if ready {
            hostile.last_fired_ms = Some(now);
            shots.push((hostile.pos, direction_or_default(target - hostile.pos)));
        }
    }

    for (pos, dir) in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            dir,
            speed: HOSTILE_PROJECTILE_SPEED,
            damage: HOSTILE_PROJECTILE_DAMAGE,
            owner: ProjectileOwner::Hostile,
            color: 0xff0000,
            ttl: PROJECTILE_TTL,
            light: None,
        });
        state.play(SoundKey::Plasma);
    }
}

/// Apply a powerup's effect to the session
pub fn apply_powerup(state: &mut GameState, kind: PowerupKind) {
    match kind {
        PowerupKind::HealthBoost => {
            state.health = (state.health + HEALTH_BOOST_AMOUNT).min(state.max_health);
        }
        PowerupKind::AmmoRefill => {
            state.ammo = state.weapon().max_ammo;
        }
        PowerupKind::Shield | PowerupKind::RapidFire | PowerupKind::DoubleDamage => {
            if let Some(duration) = kind.duration_ms() {
                let now = state.clock_ms;
                state.effects.add(kind.name(), duration, now);
            }
        }
    }
    let (title, description) = kind.notification();
    session::notify(state, NotificationKind::Powerup, title, description);
    log::info!("Powerup collected: {}", kind.name());
}

/// Pick up any collectible the player touches
pub fn collect_powerups(state: &mut GameState) {
    let player_pos = state.player.pos;
    let mut i = state.collectibles.len();
    while i > 0 {
        i -= 1;
        let c = &state.collectibles[i];
        if collides(c.pos, c.size, player_pos, PLAYER_RADIUS) {
            let kind = c.kind;
            state.collectibles.remove(i);
            apply_powerup(state, kind);
            state.play(SoundKey::Powerup);
        }
    }
}

/// Full combat pass for one tick
pub fn resolve(state: &mut GameState, dt: f32) {
    resolve_projectiles(state, dt);
    resolve_player_collisions(state);
    if state.is_active() {
        hostile_fire(state);
        collect_powerups(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DifficultyPreset;
    use crate::sim::state::{Collectible, Hazard, Hostile, SessionPhase};

    fn active_state() -> GameState {
        let mut state = GameState::new(42, DifficultyPreset::Medium);
        session::start(&mut state);
        state.spawner.stop_all();
        state.drain_events();
        state
    }

    fn add_hazard(state: &mut GameState, pos: Vec3, size: f32, health: i32) {
        let id = state.next_entity_id();
        state.hazards.push(Hazard {
            id,
            pos,
            vel: Vec3::ZERO,
            rotation: Vec3::ZERO,
            spin: Vec3::ZERO,
            size,
            health,
        });
    }

    fn add_hostile(state: &mut GameState, pos: Vec3, health: i32) {
        let id = state.next_entity_id();
        state.hostiles.push(Hostile {
            id,
            pos,
            vel: Vec3::ZERO,
            speed: 0.0,
            health,
            fire_interval_ms: 2000.0,
            last_fired_ms: Some(0.0),
            light: None,
        });
    }

    #[test]
    fn test_hazard_ram_without_shield() {
        let mut state = active_state();
        add_hazard(&mut state, Vec3::new(1.0, 0.0, 0.0), 2.0, 20);
        resolve_player_collisions(&mut state);
        assert_eq!(state.health, 80);
        assert!(state.hazards.is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert_eq!(state.explosions[0].particle_count, 20);
        assert_eq!(state.particles.len(), 20);
        // Ramming is not a kill
        assert_eq!(state.score, 0);
        assert_eq!(state.kill_count, 0);
    }

    #[test]
    fn test_shield_blocks_damage_but_destroys_rammer() {
        let mut state = active_state();
        state.effects.add("Shield", 15000.0, state.clock_ms);
        add_hazard(&mut state, Vec3::ZERO, 1.5, 15);
        add_hostile(&mut state, Vec3::new(0.0, 0.5, 0.0), 30);
        resolve_player_collisions(&mut state);
        assert_eq!(state.health, 100);
        assert!(state.hazards.is_empty());
        assert!(state.hostiles.is_empty());
    }

    #[test]
    fn test_hostile_contact_distance() {
        let mut state = active_state();
        add_hostile(&mut state, Vec3::new(1.05, 0.0, 0.0), 30);
        resolve_player_collisions(&mut state);
        assert_eq!(state.hostiles.len(), 1);
        assert_eq!(state.health, 100);

        state.hostiles[0].pos = Vec3::new(0.0, 0.0, 0.95);
        resolve_player_collisions(&mut state);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.health, 100 - HOSTILE_CONTACT_DAMAGE);
    }

    #[test]
    fn test_projectile_kills_hazard_once() {
        let mut state = active_state();
        add_hazard(&mut state, Vec3::new(0.0, 0.0, -1.5), 1.2, 10);
        assert!(fire(&mut state).is_some());
        resolve_projectiles(&mut state, REFERENCE_DT);

        assert!(state.projectiles.is_empty());
        assert!(state.hazards.is_empty());
        assert_eq!(state.score, 12);
        assert_eq!(state.kill_count, 1);
        // Spark + kill explosion
        assert_eq!(state.explosions.len(), 2);

        resolve_projectiles(&mut state, REFERENCE_DT);
        assert_eq!(state.score, 12);
        assert_eq!(state.kill_count, 1);
    }

    #[test]
    fn test_projectile_consumed_by_first_hit_only() {
        let mut state = active_state();
        add_hazard(&mut state, Vec3::new(0.0, 0.0, -1.0), 1.0, 100);
        add_hostile(&mut state, Vec3::new(0.0, 0.0, -1.0), 100);
        fire(&mut state);
        resolve_projectiles(&mut state, REFERENCE_DT);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.hazards[0].health, 90);
        assert_eq!(state.hostiles[0].health, 100);
    }

    #[test]
    fn test_hostile_kill_awards_flat_score() {
        let mut state = active_state();
        add_hostile(&mut state, Vec3::new(0.0, 0.0, -1.0), 5);
        fire(&mut state);
        resolve_projectiles(&mut state, REFERENCE_DT);
        assert!(state.hostiles.is_empty());
        assert_eq!(state.score, 50);
        assert_eq!(state.kill_count, 1);
        assert_eq!(state.explosions.last().map(|e| e.particle_count), Some(30));
    }

    #[test]
    fn test_projectile_ttl_counts_down_by_one() {
        let mut state = active_state();
        fire(&mut state);
        for expected in (1..PROJECTILE_TTL).rev() {
            resolve_projectiles(&mut state, REFERENCE_DT);
            assert_eq!(state.projectiles[0].ttl, expected);
        }
        resolve_projectiles(&mut state, REFERENCE_DT);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_double_damage_baked_at_fire_time() {
        let mut state = active_state();
        state.effects.add("Double Damage", 10000.0, state.clock_ms);
        fire(&mut state);
        assert_eq!(state.projectiles[0].damage, 20);
        // Expiry afterwards does not change the round in flight
        state.effects.clear();
        assert_eq!(state.projectiles[0].damage, 20);
    }

    #[test]
    fn test_fire_respects_cooldown_and_rapid_fire() {
        let mut state = active_state();
        assert!(fire(&mut state).is_some());
        state.clock_ms += 150.0;
        assert!(fire(&mut state).is_none());
        state.clock_ms += 50.0;
        assert!(fire(&mut state).is_some());

        state.effects.add("Rapid Fire", 10000.0, state.clock_ms);
        state.clock_ms += 100.0;
        assert!(fire(&mut state).is_some());
        assert_eq!(state.ammo, 27);
    }

    #[test]
    fn test_empty_magazine_auto_reloads() {
        let mut state = active_state();
        state.ammo = 0;
        assert!(fire(&mut state).is_none());
        assert!(state.is_reloading);

        // Firing while reloading is a no-op
        assert!(fire(&mut state).is_none());
        assert!(state.projectiles.is_empty());

        state.clock_ms += 1499.0;
        assert!(!update_reload(&mut state));
        state.clock_ms += 1.0;
        assert!(update_reload(&mut state));
        assert_eq!(state.ammo, 30);
        assert!(!state.is_reloading);
    }

    #[test]
    fn test_manual_reload_requires_missing_ammo() {
        let mut state = active_state();
        assert!(!request_reload(&mut state));
        state.ammo = 10;
        assert!(request_reload(&mut state));
        assert!(!request_reload(&mut state));
    }

    #[test]
    fn test_switch_weapon_round_trip() {
        let mut state = active_state();
        for (i, weapon) in WEAPONS.iter().enumerate() {
            assert!(switch_weapon(&mut state, i));
            assert_eq!(state.weapon_index, i);
            assert_eq!(state.ammo, weapon.max_ammo);
            assert_eq!(state.weapon().max_ammo, weapon.max_ammo);
        }
        assert!(!switch_weapon(&mut state, 4));
        assert_eq!(state.weapon_index, 3);
        assert_eq!(state.ammo, 3);
    }

    #[test]
    fn test_hostile_fires_after_interval() {
        let mut state = active_state();
        add_hostile(&mut state, Vec3::new(10.0, 0.0, 0.0), 30);
        state.clock_ms = 2000.0;
        hostile_fire(&mut state);
        assert!(state.projectiles.is_empty());
        state.clock_ms = 2001.0;
        hostile_fire(&mut state);
        assert_eq!(state.projectiles.len(), 1);
        let shot = &state.projectiles[0];
        assert_eq!(shot.owner, ProjectileOwner::Hostile);
        assert!((shot.dir - Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_hostile_shot_hits_player() {
        let mut state = active_state();
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos: Vec3::new(0.3, 0.0, 0.0),
            dir: Vec3::NEG_X,
            speed: HOSTILE_PROJECTILE_SPEED,
            damage: HOSTILE_PROJECTILE_DAMAGE,
            owner: ProjectileOwner::Hostile,
            color: 0xff0000,
            ttl: PROJECTILE_TTL,
            light: None,
        });
        resolve_projectiles(&mut state, REFERENCE_DT);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.health, 90);
    }

    #[test]
    fn test_player_death_is_reported_once() {
        let mut state = active_state();
        state.health = 10;
        add_hazard(&mut state, Vec3::ZERO, 2.0, 20);
        add_hazard(&mut state, Vec3::new(0.1, 0.0, 0.0), 2.0, 20);
        resolve_player_collisions(&mut state);
        assert_eq!(state.phase, SessionPhase::Over);
        assert_eq!(state.health, -10);
        let overs = state
            .drain_events()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::PhaseChanged {
                        to: SessionPhase::Over,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(overs, 1);
        assert!(!damage_player(&mut state, 10));
    }

    #[test]
    fn test_collect_powerups() {
        let mut state = active_state();
        state.health = 70;
        let id = state.next_entity_id();
        state.collectibles.push(Collectible {
            id,
            kind: PowerupKind::HealthBoost,
            pos: Vec3::new(0.5, 0.0, 0.0),
            rotation: Vec3::ZERO,
            size: COLLECTIBLE_SIZE,
            ttl: COLLECTIBLE_TTL,
            light: None,
        });
        collect_powerups(&mut state);
        assert!(state.collectibles.is_empty());
        assert_eq!(state.health, 100);
        assert_eq!(state.notifications.len(), 1);
    }

    #[test]
    fn test_timed_powerup_grants_effect() {
        let mut state = active_state();
        apply_powerup(&mut state, PowerupKind::Shield);
        assert!(state.shielded());
        state.clock_ms += 15000.0;
        assert!(!state.shielded());
    }

    #[test]
    fn test_particle_cap() {
        let mut state = active_state();
        state.max_particles = 8;
        spawn_explosion(&mut state, Vec3::ZERO, 1.0, 20);
        assert_eq!(state.particles.len(), 8);
        assert_eq!(state.explosions[0].particle_count, 20);
    }
}
