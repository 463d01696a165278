//! World entities streamed past the player
//!
//! Every entity carries a world-space position. X comes from its lane (or a
//! scenery offset), Z scrolls toward the player who sits at Z = 0.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;

/// Hazard variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Large ship occupying a lane; its roof can be ridden
    Cruiser,
    /// Low ground hazard, cleared by jumping
    Asteroid,
    /// Beam between pillars, cleared by rolling under it
    LaserGate {
        /// Clearance under the beam
        bottom_gap: f32,
    },
}

/// A hazard entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub lane: i8,
    pub pos: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl Obstacle {
    fn with_size(id: u32, kind: ObstacleKind, lane: i8, pos: Vec3, size: (f32, f32, f32)) -> Self {
        let (width, height, depth) = size;
        Self {
            id,
            kind,
            lane,
            pos,
            width,
            height,
            depth,
        }
    }

    pub fn cruiser(id: u32, lane: i8, pos: Vec3, height: f32) -> Self {
        let (width, _, depth) = CRUISER_SIZE;
        Self::with_size(id, ObstacleKind::Cruiser, lane, pos, (width, height, depth))
    }

    pub fn asteroid(id: u32, lane: i8, pos: Vec3) -> Self {
        Self::with_size(id, ObstacleKind::Asteroid, lane, pos, ASTEROID_SIZE)
    }

    pub fn laser_gate(id: u32, lane: i8, pos: Vec3) -> Self {
        let kind = ObstacleKind::LaserGate {
            bottom_gap: LASER_GATE_BOTTOM_GAP,
        };
        Self::with_size(id, kind, lane, pos, LASER_GATE_SIZE)
    }

    /// Box occupied by the obstacle: centred on X and Z, standing on the ground
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.width / 2.0, 0.0, self.depth / 2.0);
        Aabb::new(
            self.pos - half,
            Vec3::new(self.pos.x + half.x, self.pos.y + self.height, self.pos.z + half.z),
        )
    }

    /// Whether world-space Z = `z` lies inside the obstacle's depth span
    pub fn spans_z(&self, z: f32) -> bool {
        let rel = z - self.pos.z;
        rel <= self.depth / 2.0 && rel >= -self.depth / 2.0
    }
}

/// Single-use power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Jetpack,
    Magnet,
    Sneakers,
}

/// A floating power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec3,
    /// Display spin (radians)
    pub spin: f32,
}

/// A floating mystery box
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysteryBox {
    pub id: u32,
    pub pos: Vec3,
    pub spin: f32,
}

/// What a mystery box turned out to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MysteryReward {
    /// Run currency
    Coins(u32),
    /// One headstart consumable
    Headstart,
    /// Flat score bonus
    Score,
}

/// A currency orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyOrb {
    pub id: u32,
    pub pos: Vec3,
    /// Rest height the idle bob oscillates around
    pub base_y: f32,
    pub bob_phase: f32,
    /// Set once a magnet has grabbed the orb; it stops bobbing from then on
    pub pulled: bool,
}

impl CurrencyOrb {
    pub fn new(id: u32, pos: Vec3, bob_phase: f32) -> Self {
        Self {
            id,
            pos,
            base_y: pos.y,
            bob_phase,
            pulled: false,
        }
    }
}

/// Scenery variants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecorationKind {
    /// Space-centre building beside the runway (four art variants)
    Building { variant: u8 },
    /// Floating navigation beacon with a slow bob and spin
    Beacon {
        base_y: f32,
        bob_amplitude: f32,
        bob_speed: f32,
        spin_speed: f32,
        phase: f32,
    },
}

/// Cosmetic scenery; scrolled and recycled, never collides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoration {
    pub id: u32,
    pub kind: DecorationKind,
    pub pos: Vec3,
    pub spin: f32,
}

/// A runway edge light; the ring of them loops forever
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunwayLight {
    pub pos: Vec3,
    /// Pulse phase offset
    pub phase: f32,
}
