//! Per-frame render snapshot
//!
//! The renderer lives outside this crate. Every frame, paused or not, it receives
//! a serialised [`FrameView`] describing what to draw.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{GameState, PowerupKind, ProjectileOwner, SessionPhase};

/// Engine light intensity while boosting / cruising
pub const ENGINE_GLOW_BOOST: f32 = 2.0;
pub const ENGINE_GLOW_CRUISE: f32 = 1.0;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub engine_glow: f32,
    pub shield: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileView {
    pub id: u32,
    pub pos: Vec3,
    pub dir: Vec3,
    pub color: u32,
    pub hostile: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HazardView {
    pub id: u32,
    pub pos: Vec3,
    pub rotation: Vec3,
    pub size: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostileView {
    pub id: u32,
    pub pos: Vec3,
    /// Facing, toward the player
    pub heading: Vec3,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectibleView {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec3,
    pub rotation: Vec3,
    pub size: f32,
    pub color: u32,
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec3,
    pub size: f32,
    pub color: [f32; 3],
    pub opacity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightView {
    pub pos: Vec3,
    pub color: u32,
    pub intensity: f32,
    pub range: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameView {
    pub phase: SessionPhase,
    pub player: PlayerView,
    pub projectiles: Vec<ProjectileView>,
    pub hazards: Vec<HazardView>,
    pub hostiles: Vec<HostileView>,
    pub collectibles: Vec<CollectibleView>,
    pub particles: Vec<ParticleView>,
    /// Point lights owned by live entities (projectiles, hostiles, pickups, explosions)
    pub lights: Vec<LightView>,
}

impl FrameView {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        let mut lights = Vec::new();

        let projectiles = state
            .projectiles
            .iter()
            .map(|p| {
                if let Some(l) = p.light {
                    lights.push(LightView {
                        pos: p.pos,
                        color: l.color,
                        intensity: l.intensity,
                        range: l.range,
                    });
                }
                ProjectileView {
                    id: p.id.0,
                    pos: p.pos,
                    dir: p.dir,
                    color: p.color,
                    hostile: p.owner == ProjectileOwner::Hostile,
                }
            })
            .collect();

        let hazards = state
            .hazards
            .iter()
            .map(|h| HazardView {
                id: h.id.0,
                pos: h.pos,
                rotation: h.rotation,
                size: h.size,
            })
            .collect();

        let hostiles = state
            .hostiles
            .iter()
            .map(|h| {
                if let Some(l) = h.light {
                    lights.push(LightView {
                        pos: h.pos,
                        color: l.color,
                        intensity: l.intensity,
                        range: l.range,
                    });
                }
                HostileView {
                    id: h.id.0,
                    pos: h.pos,
                    heading: crate::direction_or_default(player.pos - h.pos),
                }
            })
            .collect();

        let collectibles = state
            .collectibles
            .iter()
            .map(|c| {
                if let Some(l) = c.light {
                    lights.push(LightView {
                        pos: c.pos,
                        color: l.color,
                        intensity: l.intensity,
                        range: l.range,
                    });
                }
                CollectibleView {
                    id: c.id.0,
                    kind: c.kind,
                    pos: c.pos,
                    rotation: c.rotation,
                    size: c.size,
                    color: c.kind.color(),
                    opacity: c.opacity(),
                }
            })
            .collect();

        let particles = state
            .particles
            .iter()
            .map(|p| ParticleView {
                pos: p.pos,
                size: p.size,
                color: p.color,
                opacity: p.opacity(),
            })
            .collect();

        lights.extend(state.explosions.iter().map(|e| LightView {
            pos: e.pos,
            color: e.light.color,
            intensity: e.light.intensity,
            range: e.light.range,
        }));

        Self {
            phase: state.phase,
            player: PlayerView {
                pos: player.pos,
                yaw: player.yaw,
                pitch: player.pitch,
                engine_glow: if player.boosting {
                    ENGINE_GLOW_BOOST
                } else {
                    ENGINE_GLOW_CRUISE
                },
                shield: state.shielded(),
            },
            projectiles,
            hazards,
            hostiles,
            collectibles,
            particles,
            lights,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
