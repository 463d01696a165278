//! Space Runner - A three-lane endless runner through a procedural space lane
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, world stream, collisions, run loop)
//! - `tuning`: Data-driven game balance
//! - `economy`: Score, currency, upgrades and the shop
//! - `persistence`: Key-value storage with per-key fallback to defaults
//! - `platform`: Frame clock and discrete input decoding
//! - `submit`: Fire-and-forget score submission
//! - `game`: Orchestrator that owns the side effects the core emits as events

pub mod economy;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod submit;
pub mod tuning;

pub use economy::{Inventory, Profile, Upgrades};
pub use game::Game;
pub use tuning::Tuning;

/// Fixed geometry, timing and probability constants
pub mod consts {
    /// Lanes are indexed -1, 0, 1
    pub const MIN_LANE: i8 = -1;
    pub const MAX_LANE: i8 = 1;
    pub const LANES: [i8; 3] = [-1, 0, 1];

    /// Frame delta clamp (seconds), prevents huge steps after a stalled tab
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Banking tilt applied on a lane change, and how long it lasts
    pub const BANK_IMPULSE: f32 = 0.24;
    pub const BANK_DURATION: f32 = 0.26;

    /// Roll
    pub const ROLL_DURATION: f32 = 0.6;
    /// Downward velocity forced when rolling out of a jump
    pub const ROLL_DROP_VELOCITY: f32 = -20.0;
    pub const ROLL_SCALE_Y: f32 = 0.72;

    /// Jetpack altitude approach rate (1/s)
    pub const JETPACK_LERP_RATE: f32 = 5.0;

    /// Hoverboard float height above the ground, bob amplitude and frequency
    pub const HOVER_OFFSET: f32 = 0.5;
    pub const HOVER_BOB_AMPLITUDE: f32 = 0.1;
    pub const HOVER_BOB_FREQUENCY: f32 = 10.0;
    pub const HOVER_LERP_RATE: f32 = 10.0;

    /// Grace period after a hoverboard breaks
    pub const INVINCIBILITY_DURATION: f32 = 1.0;
    /// Flicker toggles per second while invincible
    pub const FLICKER_RATE: f32 = 20.0;

    /// Player hitbox (half width, height, half depth) at unit vertical scale
    pub const PLAYER_HALF_WIDTH: f32 = 0.8;
    pub const PLAYER_HEIGHT: f32 = 1.6;
    pub const PLAYER_HALF_DEPTH: f32 = 1.3;
    /// Offset from the player's feet to the magnet attraction point
    pub const PLAYER_CENTER_HEIGHT: f32 = 1.0;

    /// Player is standing on a cruiser roof at or above this height
    pub const CRUISER_ROOF_THRESHOLD: f32 = 3.5;

    /// Obstacle footprints (width, height, depth)
    pub const CRUISER_SIZE: (f32, f32, f32) = (2.5, 4.0, 15.0);
    pub const ASTEROID_SIZE: (f32, f32, f32) = (2.5, 1.0, 0.5);
    pub const LASER_GATE_SIZE: (f32, f32, f32) = (2.5, 3.0, 0.2);
    pub const LASER_GATE_BOTTOM_GAP: f32 = 2.0;

    /// Where new content appears
    pub const SPAWN_Z: f32 = -100.0;
    /// Entities are removed once their Z passes these thresholds
    pub const OBSTACLE_DESPAWN_Z: f32 = 10.0;
    pub const PICKUP_DESPAWN_Z: f32 = 5.0;
    pub const SCENERY_DESPAWN_Z: f32 = 20.0;

    /// Spawn interval = max(floor, base - (multiplier - 1) * slope)
    pub const SPAWN_INTERVAL_BASE: f32 = 1.1;
    pub const SPAWN_INTERVAL_SLOPE: f32 = 0.45;
    pub const SPAWN_INTERVAL_FLOOR: f32 = 0.4;

    /// Spawn table
    pub const PICKUP_CHANCE: f32 = 0.12;
    pub const CRUISER_CHANCE: f32 = 0.35;
    pub const CRUISER_COIN_CHANCE: f32 = 0.5;
    pub const BUILDING_CHANCE: f32 = 0.12;
    pub const BEACON_CHANCE: f32 = 0.1;

    /// Currency orb lines
    pub const ORB_LINE_LENGTH: usize = 5;
    pub const ORB_SPACING: f32 = 3.0;
    pub const CRUISER_ORB_SPACING: f32 = 2.5;
    pub const CRUISER_ORB_HEIGHT: f32 = 5.5;
    pub const GROUND_ORB_HEIGHT: f32 = 1.0;
    pub const ORB_BOB_AMPLITUDE: f32 = 0.15;
    pub const ORB_BOB_FREQUENCY: f32 = 3.0;
    /// Magnet pull speed (units/s)
    pub const MAGNET_PULL_SPEED: f32 = 40.0;

    /// Pickups and mystery boxes float at this height
    pub const PICKUP_HEIGHT: f32 = 1.5;

    /// Proximity tolerances for collection
    pub const COLLECT_Z_TOLERANCE: f32 = 1.5;
    pub const COLLECT_X_TOLERANCE: f32 = 1.0;
    pub const COLLECT_Y_TOLERANCE: f32 = 1.5;

    /// Runway light ring
    pub const RUNWAY_START_Z: f32 = -160.0;
    pub const RUNWAY_END_Z: f32 = 20.0;
    pub const RUNWAY_SPACING: f32 = 12.0;
    pub const RUNWAY_SIDE_MARGIN: f32 = 0.55;

    /// Score
    pub const ORB_SCORE: f64 = 50.0;
    pub const MYSTERY_SCORE_BONUS: f64 = 5000.0;

    /// Headstart boost to the speed multiplier, and the score window it is offered in
    pub const HEADSTART_BOOST: f32 = 0.5;
    pub const HEADSTART_SCORE_WINDOW: f64 = 500.0;
}

/// Horizontal world position of a lane's centre
#[inline]
pub fn lane_to_x(lane: i8, lane_width: f32) -> f32 {
    lane as f32 * lane_width
}

/// Frame-rate scaled exponential approach of `current` toward `target`
#[inline]
pub fn approach(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}
