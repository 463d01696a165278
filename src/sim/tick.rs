//! Per-frame run loop
//!
//! `GameSession` owns one player and one world stream and advances them in a
//! fixed order each frame. Side effects are left to the caller, which drains
//! the events the session raises.

use serde::{Deserialize, Serialize};

use super::entities::MysteryReward;
use super::events::GameEvent;
use super::player::{LaneDirection, PlayerState};
use super::snapshot::{RenderSnapshot, build_snapshot};
use super::world::{FrameOutcome, WorldStream};
use crate::consts::*;
use crate::tuning::Tuning;

/// Run state machine: Idle -> Running -> Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Menu / game over; only the idle sway animates
    Idle,
    Running,
}

/// Discrete player actions, already decoded from device input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputAction {
    ChangeLane(LaneDirection),
    Jump,
    Roll,
    Hoverboard,
}

/// Minimum horizontal field of view kept on narrow screens (degrees)
pub const MIN_HORIZONTAL_FOV: f32 = 72.0;
pub const MIN_VERTICAL_FOV: f32 = 60.0;
pub const MAX_VERTICAL_FOV: f32 = 95.0;
/// FOV widening per unit of player height
pub const FOV_PER_HEIGHT: f32 = 1.5;
/// Per-frame FOV smoothing factor
pub const FOV_SMOOTHING: f32 = 0.1;

/// Presentation parameters derived from the player after its update
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraRig {
    /// Vertical field of view (degrees)
    pub fov: f32,
    pub aspect: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl CameraRig {
    pub fn new(aspect: f32) -> Self {
        let mut rig = Self { fov: 0.0, aspect };
        rig.fov = rig.base_fov();
        rig
    }

    /// Vertical FOV that keeps `MIN_HORIZONTAL_FOV` visible at this aspect ratio
    pub fn base_fov(&self) -> f32 {
        let aspect = if self.aspect > 0.0 { self.aspect } else { 1.0 };
        let half_h = MIN_HORIZONTAL_FOV.to_radians() / 2.0;
        let v_fov = (2.0 * (half_h.tan() / aspect).atan()).to_degrees();
        v_fov.clamp(MIN_VERTICAL_FOV, MAX_VERTICAL_FOV)
    }

    /// Ease the FOV toward the base plus a height-dependent widening
    pub fn follow(&mut self, player_height: f32) {
        let target = self.base_fov() + player_height * FOV_PER_HEIGHT;
        self.fov += (target - self.fov) * FOV_SMOOTHING;
    }
}

/// One play session: the player, the world, and run progression
#[derive(Debug, Clone)]
pub struct GameSession {
    pub phase: RunPhase,
    pub player: PlayerState,
    pub world: WorldStream,
    pub camera: CameraRig,
    /// Distance and pickup score of the current run
    pub score: f64,
    /// Currency collected this run (not yet banked)
    pub coins: u32,
    pub speed_multiplier: f32,
    /// Remaining time of each active headstart boost
    pub headstart_timers: Vec<f32>,
    tuning: Tuning,
    /// Seconds since the session was created, runs and menus alike
    elapsed: f32,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            phase: RunPhase::Idle,
            player: PlayerState::with_tuning(tuning.clone()),
            world: WorldStream::new(seed, tuning.clone()),
            camera: CameraRig::default(),
            score: 0.0,
            coins: 0,
            speed_multiplier: 1.0,
            headstart_timers: Vec::new(),
            tuning,
            elapsed: 0.0,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Swap in new balance values (e.g. after an upgrade purchase).
    /// Takes effect for both subsystems immediately.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.player.tuning = tuning.clone();
        self.world.set_tuning(tuning.clone());
        self.tuning = tuning;
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    /// Start or restart a run
    pub fn start(&mut self) {
        self.player.reset();
        self.world.reset();
        self.score = 0.0;
        self.coins = 0;
        self.speed_multiplier = 1.0;
        self.headstart_timers.clear();
        self.phase = RunPhase::Running;
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started");
    }

    /// Absolute scroll speed for the current multiplier
    pub fn current_speed(&self) -> f32 {
        self.tuning.speed_for(self.speed_multiplier)
    }

    /// Apply a decoded player action; ignored outside a run
    pub fn apply(&mut self, action: InputAction) {
        if !self.is_running() {
            return;
        }
        match action {
            InputAction::ChangeLane(direction) => self.player.change_lane(direction),
            InputAction::Jump => self.player.jump(),
            InputAction::Roll => self.player.roll(),
            InputAction::Hoverboard => self.player.activate_hoverboard(),
        }
    }

    /// Whether a headstart may be used right now (early in a running run)
    pub fn headstart_offer_open(&self) -> bool {
        self.is_running() && self.score < HEADSTART_SCORE_WINDOW
    }

    /// Jetpack plus a temporary speed boost. The caller pays for it.
    pub fn activate_headstart(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.player.activate_jetpack();
        self.speed_multiplier =
            (self.speed_multiplier + HEADSTART_BOOST).min(self.tuning.max_multiplier());
        self.headstart_timers.push(self.tuning.jetpack_duration);
        self.events.push(GameEvent::HeadstartUsed);
        log::info!("Headstart used, speed multiplier {:.2}", self.speed_multiplier);
        true
    }

    /// Advance one frame
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        self.elapsed += dt;

        if !self.is_running() {
            self.player.idle_sway(self.elapsed);
            return;
        }

        // 1. Player
        self.player.update(dt, self.speed_multiplier, &self.world);

        // 2. Presentation reads the updated player
        self.camera.follow(self.player.vertical_position);

        // 3. World, with hazards and pickups resolved against the player
        let speed = self.current_speed();
        let first_new = self.events.len();
        let outcome = self
            .world
            .update(dt, speed, &mut self.player, &mut self.events);
        self.apply_pickup_rewards(first_new);

        if outcome == FrameOutcome::Crashed {
            self.end_run();
            return;
        }

        // 4. Distance score
        self.score += (speed * dt / 2.0) as f64;

        // 5. Speed progression
        self.speed_multiplier = (self.speed_multiplier + self.tuning.acceleration * dt)
            .min(self.tuning.max_multiplier());

        self.tick_headstarts(dt);
    }

    fn apply_pickup_rewards(&mut self, first_new: usize) {
        for event in &self.events[first_new..] {
            match *event {
                GameEvent::OrbCollected => {
                    self.coins += 1;
                    self.score += ORB_SCORE;
                }
                GameEvent::MysteryBoxOpened(MysteryReward::Coins(amount)) => {
                    self.coins += amount;
                }
                GameEvent::MysteryBoxOpened(MysteryReward::Score) => {
                    self.score += MYSTERY_SCORE_BONUS;
                }
                // The headstart consumable belongs to the profile; the caller banks it
                _ => {}
            }
        }
    }

    fn tick_headstarts(&mut self, dt: f32) {
        let mut expired = 0;
        self.headstart_timers.retain_mut(|timer| {
            *timer -= dt;
            if *timer <= 0.0 {
                expired += 1;
                false
            } else {
                true
            }
        });
        for _ in 0..expired {
            self.speed_multiplier = (self.speed_multiplier - HEADSTART_BOOST).max(1.0);
        }
    }

    fn end_run(&mut self) {
        self.phase = RunPhase::Idle;
        self.headstart_timers.clear();
        let score = self.final_score();
        log::info!("Run ended: score {score}, {} coins", self.coins);
        self.events.push(GameEvent::RunEnded {
            score,
            coins: self.coins,
        });
    }

    /// Score as shown to the player
    pub fn final_score(&self) -> u64 {
        self.score.max(0.0).floor() as u64
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only copy of everything the renderer needs
    pub fn snapshot(&self) -> RenderSnapshot {
        build_snapshot(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::Obstacle;
    use glam::Vec3;
    use std::f32::consts::PI;

    const DT: f32 = 1.0 / 60.0;

    fn running_session() -> GameSession {
        let mut session = GameSession::new(1234, Tuning::default());
        session.start();
        session.drain_events();
        // Keep procedural spawns out of the way
        session.world.spawn_timer = 1000.0;
        session
    }

    #[test]
    fn test_idle_only_sways() {
        let mut session = GameSession::new(1, Tuning::default());
        session.tick(0.5);
        assert_eq!(session.world.entity_count(), 0);
        assert_eq!(session.score, 0.0);
        assert!((session.player.pose.yaw - (PI + 0.5f32.sin() * 0.1)).abs() < 1e-5);
    }

    #[test]
    fn test_start_emits_and_resets() {
        let mut session = GameSession::new(1, Tuning::default());
        session.score = 99.0;
        session.coins = 7;
        session.start();
        assert!(session.is_running());
        assert_eq!(session.score, 0.0);
        assert_eq!(session.coins, 0);
        assert_eq!(session.drain_events(), vec![GameEvent::RunStarted]);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_distance_score_and_acceleration() {
        let mut session = running_session();
        session.tick(0.1);
        assert!((session.score - 35.0 * 0.1 / 2.0).abs() < 1e-4);
        assert!((session.speed_multiplier - 1.001).abs() < 1e-6);
    }

    #[test]
    fn test_speed_multiplier_clamped() {
        let mut session = running_session();
        let max = session.tuning().max_multiplier();
        session.speed_multiplier = max - 0.0001;
        session.tick(0.1);
        assert_eq!(session.speed_multiplier, max);
        assert!((session.current_speed() - 59.0).abs() < 1e-3);
    }

    #[test]
    fn test_crash_ends_run() {
        let mut session = running_session();
        session.score = 123.9;
        let id = session.world.next_entity_id();
        session
            .world
            .obstacles
            .push(Obstacle::asteroid(id, 0, Vec3::new(0.0, 0.0, 0.0)));

        session.tick(DT);
        assert_eq!(session.phase, RunPhase::Idle);
        let events = session.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::Crashed, GameEvent::RunEnded { score: 123, coins: 0 }]
        );

        // World and score are frozen while idle
        let count = session.world.entity_count();
        session.tick(DT);
        assert_eq!(session.world.entity_count(), count);
        assert_eq!(session.score, 123.9);
    }

    #[test]
    fn test_orbs_add_coins_and_score() {
        let mut session = running_session();
        let id = session.world.next_entity_id();
        session
            .world
            .orbs
            .push(crate::sim::entities::CurrencyOrb::new(id, Vec3::new(0.0, 0.5, 0.0), 0.0));

        session.tick(DT);
        assert_eq!(session.coins, 1);
        assert!(session.score >= ORB_SCORE);
    }

    #[test]
    fn test_headstart_boost_reverts() {
        let mut session = running_session();
        assert!(session.headstart_offer_open());
        assert!(session.activate_headstart());
        assert!(session.player.flying);
        assert!((session.speed_multiplier - 1.5).abs() < 1e-6);

        // Jetpack duration is 6 s; step past it without hazards
        for _ in 0..400 {
            session.world.obstacles.clear();
            session.tick(DT);
        }
        assert!(session.headstart_timers.is_empty());
        assert!(session.speed_multiplier < 1.1);
    }

    #[test]
    fn test_headstart_refused_when_idle() {
        let mut session = GameSession::new(5, Tuning::default());
        assert!(!session.headstart_offer_open());
        assert!(!session.activate_headstart());
        assert_eq!(session.speed_multiplier, 1.0);
    }

    #[test]
    fn test_input_ignored_when_idle() {
        let mut session = GameSession::new(5, Tuning::default());
        session.apply(InputAction::ChangeLane(LaneDirection::Right));
        assert_eq!(session.player.lane, 0);

        session.start();
        session.apply(InputAction::ChangeLane(LaneDirection::Right));
        session.apply(InputAction::Jump);
        assert_eq!(session.player.lane, 1);
        assert!(session.player.jumping);
    }

    #[test]
    fn test_camera_widens_with_height() {
        let mut rig = CameraRig::new(16.0 / 9.0);
        let base = rig.fov;
        assert!((MIN_VERTICAL_FOV..=MAX_VERTICAL_FOV).contains(&base));
        for _ in 0..200 {
            rig.follow(8.0);
        }
        assert!((rig.fov - (base + 12.0)).abs() < 0.01);

        // Portrait screens get a taller FOV, capped at 95
        assert_eq!(CameraRig::new(0.3).base_fov(), MAX_VERTICAL_FOV);
        assert_eq!(CameraRig::new(4.0).base_fov(), MIN_VERTICAL_FOV);
    }
}
