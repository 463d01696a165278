//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of I/O:
//! - Variable frame delta, clamped by the caller
//! - Seeded RNG only
//! - Side effects reported as `GameEvent`s
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entities;
pub mod events;
pub mod player;
pub mod snapshot;
pub mod tick;
pub mod world;

pub use autopilot::autopilot_action;
pub use collision::{Aabb, check_collision, ground_height_at};
pub use entities::{
    CurrencyOrb, Decoration, DecorationKind, MysteryBox, MysteryReward, Obstacle, ObstacleKind,
    PowerUp, PowerUpKind, RunwayLight,
};
pub use events::GameEvent;
pub use player::{FlatGround, GroundProbe, LaneDirection, MotionMode, PlayerState};
pub use snapshot::RenderSnapshot;
pub use tick::{CameraRig, GameSession, InputAction, RunPhase};
pub use world::{SpawnPattern, WorldStream, choose_pattern};
