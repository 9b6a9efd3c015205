//! Top-down minimap
//!
//! Player-relative positions on the XZ plane; only entities within
//! `MINIMAP_RANGE` on both axes are shown.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::consts::MINIMAP_RANGE;
use crate::sim::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlipKind {
    Hazard,
    Hostile,
    Collectible,
}

impl BlipKind {
    pub fn css_color(&self) -> &'static str {
        match self {
            BlipKind::Hazard => "#888",
            BlipKind::Hostile => "#f00",
            BlipKind::Collectible => "#0f0",
        }
    }

    /// Dot radius in pixels
    pub fn radius(&self) -> f64 {
        match self {
            BlipKind::Hazard => 2.0,
            BlipKind::Hostile | BlipKind::Collectible => 3.0,
        }
    }
}

/// One dot on the minimap
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Blip {
    pub kind: BlipKind,
    /// Offset from the player on the XZ plane as (dx, -dz)
    pub offset: Vec2,
}

impl Blip {
    /// Pixel position on a map centred at `center` with `scale` pixels per unit
    pub fn to_map(&self, center: Vec2, scale: f32) -> Vec2 {
        center + self.offset * scale
    }
}

fn relative(player: Vec3, pos: Vec3) -> Option<Vec2> {
    let dx = pos.x - player.x;
    let dz = pos.z - player.z;
    (dx.abs() < MINIMAP_RANGE && dz.abs() < MINIMAP_RANGE).then(|| Vec2::new(dx, -dz))
}

/// Blips for the current frame; empty unless the session is active
pub fn blips(state: &GameState) -> Vec<Blip> {
    if !state.is_active() {
        return Vec::new();
    }
    let player = state.player.pos;
    let hazards = state.hazards.iter().map(|h| (BlipKind::Hazard, h.pos));
    let hostiles = state.hostiles.iter().map(|h| (BlipKind::Hostile, h.pos));
    let collectibles = state
        .collectibles
        .iter()
        .map(|c| (BlipKind::Collectible, c.pos));

    hazards
        .chain(hostiles)
        .chain(collectibles)
        .filter_map(|(kind, pos)| relative(player, pos).map(|offset| Blip { kind, offset }))
        .collect()
}
