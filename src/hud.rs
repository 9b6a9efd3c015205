//! HUD snapshot
//!
//! A plain value the frontend copies into the DOM each frame.

use serde::Serialize;

use crate::sim::{GameState, PowerupKind, SessionPhase};

/// Health bar colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthBand {
    /// Below 30%
    Critical,
    /// Below 60%
    Warning,
    Good,
}

impl HealthBand {
    pub fn from_percent(percent: f32) -> Self {
        if percent < 30.0 {
            HealthBand::Critical
        } else if percent < 60.0 {
            HealthBand::Warning
        } else {
            HealthBand::Good
        }
    }

    /// CSS colour for the health fill
    pub fn css_color(&self) -> &'static str {
        match self {
            HealthBand::Critical => "#f00",
            HealthBand::Warning => "#ff0",
            HealthBand::Good => "#0f0",
        }
    }
}

/// A timed powerup still running
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectTimer {
    pub name: &'static str,
    pub remaining_secs: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub phase: SessionPhase,
    pub score: u64,
    /// 0..=100
    pub health_percent: f32,
    pub health_band: HealthBand,
    /// Ammo count, or "Reloading..."
    pub ammo_label: String,
    pub weapon_index: usize,
    pub weapon_name: &'static str,
    pub level: u32,
    pub effects: Vec<EffectTimer>,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let health_percent =
            (state.health.max(0) as f32 / state.max_health.max(1) as f32 * 100.0).min(100.0);
        let ammo_label = if state.is_reloading {
            "Reloading...".to_owned()
        } else {
            state.ammo.to_string()
        };
        let effects = PowerupKind::ALL
            .iter()
            .filter(|k| k.duration_ms().is_some())
            .filter_map(|k| {
                let expires = state.effects.expires_at(k.name(), state.clock_ms)?;
                Some(EffectTimer {
                    name: k.name(),
                    remaining_secs: ((expires - state.clock_ms) / 1000.0) as f32,
                })
            })
            .collect();

        Self {
            phase: state.phase,
            score: state.score,
            health_percent,
            health_band: HealthBand::from_percent(health_percent),
            ammo_label,
            weapon_index: state.weapon_index,
            weapon_name: state.weapon().name,
            level: state.level,
            effects,
        }
    }
}
