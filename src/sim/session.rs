//! Session lifecycle: Idle → Active ⇄ Paused → Over, plus level progression
//!
//! Every transition is guarded by the current phase, so repeating a request
//! (double pause, double restart, death after death) never re-applies side effects.
//! Transition functions return whether they applied.

use glam::Vec3;

use super::combat;
use super::state::{
    GameEvent, GameState, Notification, NotificationKind, Player, SessionPhase, SoundKey,
};
use crate::consts::*;

fn set_phase(state: &mut GameState, to: SessionPhase) {
    let from = state.phase;
    state.phase = to;
    state.push_event(GameEvent::PhaseChanged { from, to });
    log::info!("Session {:?} -> {:?}", from, to);
}

/// Reset counters, entities and the player for a fresh run
fn reset_run(state: &mut GameState) {
    state.clear_entities();
    state.clock_ms = 0.0;
    state.time_ticks = 0;
    state.score = 0;
    state.health = state.max_health;
    state.level = 1;
    state.kill_count = 0;
    state.difficulty = state.preset.multiplier();
    state.is_reloading = false;
    state.last_shot_ms = None;
    state.player = Player {
        pos: Vec3::ZERO,
        vel: Vec3::ZERO,
        ..state.player.clone()
    };
    combat::switch_weapon(state, 0);
}

/// Enter the active phase: request input capture and (re)start spawn chains
fn enter_active(state: &mut GameState) {
    set_phase(state, SessionPhase::Active);
    state.push_event(GameEvent::CapturePointer);
    let now = state.clock_ms;
    state.spawner.start_all(now);
}

/// Idle → Active
pub fn start(state: &mut GameState) -> bool {
    if state.phase != SessionPhase::Idle {
        log::warn!("Start ignored in {:?}", state.phase);
        return false;
    }
    reset_run(state);
    enter_active(state);
    true
}

/// Over → Active, as if freshly started
pub fn restart(state: &mut GameState) -> bool {
    if state.phase != SessionPhase::Over {
        log::warn!("Restart ignored in {:?}", state.phase);
        return false;
    }
    reset_run(state);
    state.spawner.stop_all();
    enter_active(state);
    true
}

/// Active → Paused
pub fn pause(state: &mut GameState) -> bool {
    if state.phase != SessionPhase::Active {
        return false;
    }
    set_phase(state, SessionPhase::Paused);
    true
}

/// Paused → Active
pub fn resume(state: &mut GameState) -> bool {
    if state.phase != SessionPhase::Paused {
        return false;
    }
    enter_active(state);
    true
}

/// Pause toggle input
pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.phase {
        SessionPhase::Active => pause(state),
        SessionPhase::Paused => resume(state),
        _ => false,
    }
}

/// Any phase → Idle with everything cleared
pub fn quit(state: &mut GameState) -> bool {
    if state.phase == SessionPhase::Idle {
        return false;
    }
    state.clear_entities();
    state.spawner.stop_all();
    state.score = 0;
    state.health = state.max_health;
    set_phase(state, SessionPhase::Idle);
    true
}

/// Active → Over. Only player death leads here.
pub fn game_over(state: &mut GameState) -> bool {
    if state.phase != SessionPhase::Active {
        return false;
    }
    set_phase(state, SessionPhase::Over);
    state.spawner.stop_all();
    state.push_event(GameEvent::ReleasePointer);
    log::info!("Game over: score {} at level {}", state.score, state.level);
    true
}

/// Pointer capture changed: losing it pauses, regaining it resumes
pub fn set_input_captured(state: &mut GameState, captured: bool) -> bool {
    state.input_captured = captured;
    if captured {
        resume(state)
    } else {
        pause(state)
    }
}

/// Kills needed to leave the current level
#[inline]
pub fn kills_for_next_level(level: u32) -> u32 {
    level * KILLS_PER_LEVEL
}

/// Level up once the kill threshold is met. Runs once per active tick.
pub fn check_level_up(state: &mut GameState) -> bool {
    if state.kill_count < kills_for_next_level(state.level) {
        return false;
    }
    state.level += 1;
    state.kill_count = 0;
    state.difficulty += DIFFICULTY_STEP;
    state.health = (state.health + LEVEL_UP_HEAL).min(state.max_health);

    let title = format!("Level {}", state.level);
    notify(state, NotificationKind::LevelUp, &title, "Difficulty increased");
    state.play(SoundKey::LevelUp);
    state.push_event(GameEvent::LevelUp { level: state.level });
    log::info!(
        "Level {} reached (difficulty {:.1})",
        state.level,
        state.difficulty
    );
    true
}

/// Show a notification in its slot for `NOTIFICATION_DURATION_MS`, replacing any
/// message already there
pub fn notify(state: &mut GameState, kind: NotificationKind, title: &str, description: &str) {
    state.notifications.retain(|n| n.kind != kind);
    state.notifications.push(Notification {
        kind,
        title: title.to_owned(),
        description: description.to_owned(),
        hide_at_ms: state.ui_clock_ms + NOTIFICATION_DURATION_MS,
    });
    state.push_event(GameEvent::NotificationShown {
        kind,
        title: title.to_owned(),
        description: description.to_owned(),
    });
}

/// Hide notifications whose display time has passed
pub fn update_notifications(state: &mut GameState) {
    let now = state.ui_clock_ms;
    let mut hidden = Vec::new();
    state.notifications.retain(|n| {
        let keep = n.hide_at_ms > now;
        if !keep {
            hidden.push(n.kind);
        }
        keep
    });
    for kind in hidden {
        state.push_event(GameEvent::NotificationHidden { kind });
    }
}
