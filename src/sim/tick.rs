//! Per-frame simulation tick
//!
//! One call per display frame. Nothing advances outside the active phase, so the
//! session clock (and with it reloads, cooldowns, effects and spawn timers) stops
//! while paused.

use super::{combat, physics, session, spawner};
use super::state::GameState;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement keys held
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Boost held
    pub boost: bool,
    /// Fire held; rate-limited by the weapon cooldown
    pub fire: bool,
    /// Manual reload (edge-triggered)
    pub reload: bool,
    /// Weapon slot selected this frame (edge-triggered)
    pub select_weapon: Option<usize>,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
    /// Camera orientation in radians
    pub yaw: f32,
    pub pitch: f32,
}

/// Clamp a raw frame delta (seconds) into the range a tick absorbs
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = clamp_dt(dt);
    state.ui_clock_ms += f64::from(dt) * 1000.0;

    if input.pause {
        session::toggle_pause(state);
    }

    if !state.is_active() {
        // Messages shown just before a pause or death still time out
        session::update_notifications(state);
        return;
    }

    state.clock_ms += f64::from(dt) * 1000.0;
    state.time_ticks += 1;

    // Weapon handling
    if let Some(index) = input.select_weapon {
        combat::switch_weapon(state, index);
    }
    if input.reload {
        combat::request_reload(state);
    }
    combat::update_reload(state);

    physics::integrate(state, input, dt);

    if input.fire {
        combat::fire(state);
    }
    combat::resolve(state, dt);

    // A death during combat leaves the phase Over; due chains then lapse
    spawner::poll(state);

    let now = state.clock_ms;
    state.effects.sweep(now);
    session::update_notifications(state);

    if state.is_active() {
        session::check_level_up(state);
    }
}
