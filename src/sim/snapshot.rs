//! Read-only render snapshot
//!
//! The renderer never touches the session directly. Once per frame the
//! session copies the poses it needs into a `RenderSnapshot`, which can be
//! handed across the wasm boundary as JSON.

use glam::Vec3;
use serde::Serialize;

use super::entities::{Decoration, ObstacleKind, PowerUpKind, RunwayLight};
use super::player::{MotionMode, PlayerPose};
use super::tick::{GameSession, RunPhase};

/// Player state as drawn
#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    /// Feet position including the cosmetic bob
    pub pos: Vec3,
    pub lane: i8,
    pub mode: MotionMode,
    pub pose: PlayerPose,
    pub magnet_active: bool,
    pub super_sneakers_active: bool,
    pub invincible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec3,
    /// Width, height, depth
    pub size: Vec3,
}

/// Floating collectible other than an orb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PickupSprite {
    PowerUp(PowerUpKind),
    MysteryBox,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub id: u32,
    pub sprite: PickupSprite,
    pub pos: Vec3,
    pub spin: f32,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub phase: RunPhase,
    pub score: u64,
    pub coins: u32,
    pub speed: f32,
    /// Vertical camera field of view (degrees)
    pub camera_fov: f32,
    pub headstart_offer: bool,
    pub player: PlayerView,
    pub obstacles: Vec<ObstacleView>,
    pub pickups: Vec<PickupView>,
    pub orbs: Vec<Vec3>,
    pub decorations: Vec<Decoration>,
    pub runway_lights: Vec<RunwayLight>,
}

pub fn build_snapshot(session: &GameSession) -> RenderSnapshot {
    let player = &session.player;
    let world = &session.world;

    let obstacles = world
        .obstacles
        .iter()
        .map(|obs| ObstacleView {
            id: obs.id,
            kind: obs.kind,
            pos: obs.pos,
            size: Vec3::new(obs.width, obs.height, obs.depth),
        })
        .collect();

    let mut pickups = Vec::with_capacity(world.power_ups.len() + world.mystery_boxes.len());
    pickups.extend(world.power_ups.iter().map(|p| PickupView {
        id: p.id,
        sprite: PickupSprite::PowerUp(p.kind),
        pos: p.pos,
        spin: p.spin,
    }));
    pickups.extend(world.mystery_boxes.iter().map(|b| PickupView {
        id: b.id,
        sprite: PickupSprite::MysteryBox,
        pos: b.pos,
        spin: b.spin,
    }));

    RenderSnapshot {
        phase: session.phase,
        score: session.final_score(),
        coins: session.coins,
        speed: session.current_speed(),
        camera_fov: session.camera.fov,
        headstart_offer: session.headstart_offer_open(),
        player: PlayerView {
            pos: player.position() + Vec3::Y * player.pose.bob,
            lane: player.lane,
            mode: player.motion_mode(),
            pose: player.pose.clone(),
            magnet_active: player.magnet_active,
            super_sneakers_active: player.super_sneakers_active,
            invincible: player.is_invincible(),
        },
        obstacles,
        pickups,
        orbs: world.orbs.iter().map(|o| o.pos).collect(),
        decorations: world.decorations.clone(),
        runway_lights: world.runway_lights.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_mirrors_session() {
        let mut session = GameSession::new(77, Tuning::default());
        session.start();
        session.world.spawn_timer = 1000.0;
        session.world.spawn_power_up(1, PowerUpKind::Magnet);
        session.world.spawn_mystery_box(-1);
        session.world.spawn_orb_line(0, 1.0);
        session.score = 42.7;

        let snap = session.snapshot();
        assert_eq!(snap.phase, RunPhase::Running);
        assert_eq!(snap.score, 42);
        assert!(snap.headstart_offer);
        assert_eq!(snap.pickups.len(), 2);
        assert_eq!(snap.pickups[0].sprite, PickupSprite::PowerUp(PowerUpKind::Magnet));
        assert_eq!(snap.pickups[1].sprite, PickupSprite::MysteryBox);
        assert_eq!(snap.orbs.len(), 5);
        assert_eq!(snap.runway_lights.len(), session.world.runway_lights.len());
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = GameSession::new(1, Tuning::default());
        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Idle\""));
    }
}
