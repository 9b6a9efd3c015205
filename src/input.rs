//! Keyboard/pointer mapping into per-tick input
//!
//! Held keys persist across frames; reload, weapon select and pause are
//! edge-triggered and consumed by [`InputState::take_tick_input`].

use std::f32::consts::FRAC_PI_2;

use crate::settings::Settings;
use crate::sim::TickInput;

/// Pitch stays just short of straight up/down
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.001;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    Left,
    Right,
    Boost,
    Reload,
    SelectWeapon(usize),
    Pause,
}

/// Map a `KeyboardEvent.code` to an action
pub fn action_for_key(code: &str) -> Option<Action> {
    match code {
        "KeyW" | "ArrowUp" => Some(Action::Forward),
        "KeyS" | "ArrowDown" => Some(Action::Backward),
        "KeyA" | "ArrowLeft" => Some(Action::Left),
        "KeyD" | "ArrowRight" => Some(Action::Right),
        "ShiftLeft" | "ShiftRight" => Some(Action::Boost),
        "Space" | "KeyR" => Some(Action::Reload),
        "Digit1" => Some(Action::SelectWeapon(0)),
        "Digit2" => Some(Action::SelectWeapon(1)),
        "Digit3" => Some(Action::SelectWeapon(2)),
        "Digit4" => Some(Action::SelectWeapon(3)),
        "Escape" | "KeyP" => Some(Action::Pause),
        _ => None,
    }
}

/// Accumulated input between frames
#[derive(Debug, Clone, Default)]
pub struct InputState {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    boost: bool,
    fire: bool,
    reload: bool,
    select_weapon: Option<usize>,
    pause: bool,
    yaw: f32,
    pitch: f32,
    sensitivity: f32,
    invert_y: bool,
}

impl InputState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            sensitivity: settings.mouse_sensitivity,
            invert_y: settings.invert_y,
            ..Default::default()
        }
    }

    /// Key pressed; returns whether the key is bound
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(action) = action_for_key(code) else {
            return false;
        };
        match action {
            Action::Forward => self.forward = true,
            Action::Backward => self.backward = true,
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Boost => self.boost = true,
            Action::Reload => self.reload = true,
            Action::SelectWeapon(index) => self.select_weapon = Some(index),
            Action::Pause => self.pause = true,
        }
        true
    }

    pub fn key_up(&mut self, code: &str) {
        match action_for_key(code) {
            Some(Action::Forward) => self.forward = false,
            Some(Action::Backward) => self.backward = false,
            Some(Action::Left) => self.left = false,
            Some(Action::Right) => self.right = false,
            Some(Action::Boost) => self.boost = false,
            _ => {}
        }
    }

    /// Primary button state (held-to-fire)
    pub fn set_fire(&mut self, down: bool) {
        self.fire = down;
    }

    /// Relative mouse movement in pixels while the pointer is captured
    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        let dy = if self.invert_y { -dy } else { dy };
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Request a pause toggle on the next tick
    pub fn request_pause(&mut self) {
        self.pause = true;
    }

    /// Drop every held key, e.g. when focus is lost
    pub fn release_all(&mut self) {
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
        self.boost = false;
        self.fire = false;
    }

    /// Face forward again, as on a fresh run
    pub fn reset_look(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }

    pub fn look(&self) -> (f32, f32) {
        (self.yaw, self.pitch)
    }

    /// Snapshot for this frame's tick, clearing edge-triggered inputs
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            forward: self.forward,
            backward: self.backward,
            left: self.left,
            right: self.right,
            boost: self.boost,
            fire: self.fire,
            reload: self.reload,
            select_weapon: self.select_weapon,
            pause: self.pause,
            yaw: self.yaw,
            pitch: self.pitch,
        };
        self.reload = false;
        self.select_weapon = None;
        self.pause = false;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(action_for_key("KeyW"), Some(Action::Forward));
        assert_eq!(action_for_key("ShiftRight"), Some(Action::Boost));
        assert_eq!(action_for_key("Digit4"), Some(Action::SelectWeapon(3)));
        assert_eq!(action_for_key("Digit5"), None);
        assert_eq!(action_for_key("Escape"), Some(Action::Pause));
    }

    #[test]
    fn test_edge_triggers_cleared_after_take() {
        let mut input = InputState::new(&Settings::default());
        input.key_down("KeyW");
        input.key_down("Space");
        input.key_down("Digit2");
        input.key_down("Escape");

        let first = input.take_tick_input();
        assert!(first.forward && first.reload && first.pause);
        assert_eq!(first.select_weapon, Some(1));

        let second = input.take_tick_input();
        assert!(second.forward);
        assert!(!second.reload && !second.pause);
        assert_eq!(second.select_weapon, None);

        input.key_up("KeyW");
        assert!(!input.take_tick_input().forward);
    }

    #[test]
    fn test_mouse_look_clamps_pitch() {
        let mut input = InputState::new(&Settings::default());
        input.mouse_move(100.0, -10_000.0);
        let (yaw, pitch) = input.look();
        assert!((yaw - (-0.2)).abs() < 1e-6);
        assert!((pitch - PITCH_LIMIT).abs() < 1e-6);
    }

    #[test]
    fn test_invert_y() {
        let settings = Settings {
            invert_y: true,
            ..Default::default()
        };
        let mut input = InputState::new(&settings);
        input.mouse_move(0.0, 100.0);
        assert!(input.look().1 > 0.0);
    }

    #[test]
    fn test_release_all_stops_fire_and_movement() {
        let mut input = InputState::new(&Settings::default());
        input.key_down("KeyD");
        input.set_fire(true);
        input.release_all();
        let tick = input.take_tick_input();
        assert!(!tick.right && !tick.fire);
    }
}
