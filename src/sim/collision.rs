//! Collision detection for the lane runner
//!
//! Hazards use an exact box overlap followed by per-kind clearance rules.
//! Pickups use a looser proximity test that ignores height.

use glam::Vec3;

use super::entities::{Obstacle, ObstacleKind};
use super::player::PlayerState;
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Overlap test; touching faces count as intersecting
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && self.max.cmpge(other.min).all()
    }
}

/// Decide whether a hazard actually hits the player.
///
/// Overlapping boxes are a hit unless the player is on a cruiser's roof,
/// rolling under a laser gate, or above an asteroid's height.
pub fn check_collision(player: &PlayerState, obstacle: &Obstacle) -> bool {
    if !player.hitbox().intersects(&obstacle.bounds()) {
        return false;
    }

    let y = player.vertical_position;
    match obstacle.kind {
        // Roof riders sit at or above the threshold
        ObstacleKind::Cruiser => y < CRUISER_ROOF_THRESHOLD,
        ObstacleKind::LaserGate { .. } => !player.rolling,
        ObstacleKind::Asteroid => y <= obstacle.height,
    }
}

/// Power-up / mystery box collection: tight Z and X window, no height check
pub fn check_pickup_proximity(player: &PlayerState, pos: Vec3) -> bool {
    (pos.z - PLAYER_Z).abs() < COLLECT_Z_TOLERANCE
        && (pos.x - player.current_offset).abs() < COLLECT_X_TOLERANCE
}

/// Currency orb collection: like pickups, plus a height window
pub fn check_orb_proximity(player: &PlayerState, pos: Vec3) -> bool {
    check_pickup_proximity(player, pos)
        && (pos.y - player.vertical_position).abs() < COLLECT_Y_TOLERANCE
}

/// Highest cruiser roof under horizontal position `x` at the player's Z, else 0
pub fn ground_height_at<'a>(obstacles: impl IntoIterator<Item = &'a Obstacle>, x: f32) -> f32 {
    obstacles
        .into_iter()
        .filter(|obs| obs.kind == ObstacleKind::Cruiser)
        .filter(|obs| (obs.pos.x - x).abs() <= obs.width / 2.0)
        .filter(|obs| obs.spans_z(PLAYER_Z))
        .fold(0.0, |ground, obs| ground.max(obs.height))
}

/// The player never moves along Z; the world scrolls past
pub const PLAYER_Z: f32 = 0.0;
