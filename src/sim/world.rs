//! Procedural world stream
//!
//! Owns every entity ahead of the player. Each frame the stream spawns new
//! content from a fixed probability table, scrolls everything toward the
//! player, recycles what passed the camera, and resolves hazard hits and
//! pickups against the player.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{check_collision, check_orb_proximity, check_pickup_proximity, ground_height_at};
use super::entities::{
    CurrencyOrb, Decoration, DecorationKind, MysteryBox, MysteryReward, Obstacle, PowerUp,
    PowerUpKind, RunwayLight,
};
use super::events::GameEvent;
use super::player::{GroundProbe, PlayerState};
use crate::consts::*;
use crate::lane_to_x;
use crate::tuning::Tuning;

/// Item placed by the bonus branch of the spawn table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusItem {
    Jetpack,
    MysteryBox,
    Magnet,
    Sneakers,
}

/// Hazard placed in a blocked lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Asteroid,
    LaserGate,
}

/// One spawn decision. Exactly one branch fires per decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnPattern {
    /// A single power-up or mystery box, no obstacle
    Bonus { lane: i8, item: BonusItem },
    /// A rideable cruiser, optionally with orbs along its roof
    Cruiser { lane: i8, with_orbs: bool },
    /// One or two distinct lanes blocked by hazards, orbs in a free lane
    Hazards { blocked: Vec<(i8, HazardKind)> },
}

impl SpawnPattern {
    /// First lane (in -1, 0, 1 order) the hazards left open
    pub fn free_lane(&self) -> Option<i8> {
        match self {
            SpawnPattern::Hazards { blocked } => LANES
                .into_iter()
                .find(|lane| !blocked.iter().any(|(l, _)| l == lane)),
            _ => None,
        }
    }
}

fn random_lane<R: Rng + ?Sized>(rng: &mut R) -> i8 {
    LANES[rng.random_range(0..LANES.len())]
}

/// Draw one spawn decision from the probability table.
///
/// 12% bonus item (jetpack / mystery box / magnet / sneakers, 25% each);
/// otherwise 35% cruiser, else hazards in one or two lanes.
pub fn choose_pattern<R: Rng + ?Sized>(rng: &mut R) -> SpawnPattern {
    let kind_roll: f32 = rng.random();

    if rng.random::<f32>() < PICKUP_CHANCE {
        let lane = random_lane(rng);
        let r: f32 = rng.random();
        let item = if r < 0.25 {
            BonusItem::Jetpack
        } else if r < 0.5 {
            BonusItem::MysteryBox
        } else if r < 0.75 {
            BonusItem::Magnet
        } else {
            BonusItem::Sneakers
        };
        return SpawnPattern::Bonus { lane, item };
    }

    if kind_roll < CRUISER_CHANCE {
        let lane = random_lane(rng);
        let with_orbs = rng.random::<f32>() > CRUISER_COIN_CHANCE;
        return SpawnPattern::Cruiser { lane, with_orbs };
    }

    let attempts = rng.random_range(1..=2);
    let mut blocked: Vec<(i8, HazardKind)> = Vec::with_capacity(2);
    for _ in 0..attempts {
        let lane = random_lane(rng);
        if blocked.iter().any(|(l, _)| *l == lane) {
            continue;
        }
        let hazard = if rng.random::<f32>() > 0.5 {
            HazardKind::Asteroid
        } else {
            HazardKind::LaserGate
        };
        blocked.push((lane, hazard));
    }
    SpawnPattern::Hazards { blocked }
}

/// Roll the contents of a mystery box: 50% currency, 30% headstart, 20% score
pub fn resolve_mystery_reward<R: Rng + ?Sized>(rng: &mut R) -> MysteryReward {
    let r: f32 = rng.random();
    if r < 0.5 {
        MysteryReward::Coins(rng.random_range(500..1500))
    } else if r < 0.8 {
        MysteryReward::Headstart
    } else {
        MysteryReward::Score
    }
}

/// Seconds between spawn decisions at a given speed multiplier
pub fn spawn_interval_for(speed_multiplier: f32) -> f32 {
    (SPAWN_INTERVAL_BASE - (speed_multiplier - 1.0) * SPAWN_INTERVAL_SLOPE).max(SPAWN_INTERVAL_FLOOR)
}

/// Whether the player survived the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Crashed,
}

/// All streamed level content
#[derive(Debug, Clone)]
pub struct WorldStream {
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub mystery_boxes: Vec<MysteryBox>,
    pub orbs: Vec<CurrencyOrb>,
    pub decorations: Vec<Decoration>,
    pub runway_lights: Vec<RunwayLight>,
    /// Countdown to the next spawn decision
    pub spawn_timer: f32,
    tuning: Tuning,
    rng: Pcg32,
    /// Seconds since reset; drives idle animation
    elapsed: f32,
    next_id: u32,
}

impl WorldStream {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut world = Self {
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            mystery_boxes: Vec::new(),
            orbs: Vec::new(),
            decorations: Vec::new(),
            runway_lights: Vec::new(),
            spawn_timer: 0.0,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            elapsed: 0.0,
            next_id: 1,
        };
        world.reset_runway_lights();
        world
    }

    /// Clear all content for a new run
    pub fn reset(&mut self) {
        self.obstacles.clear();
        self.power_ups.clear();
        self.mystery_boxes.clear();
        self.orbs.clear();
        self.decorations.clear();
        self.spawn_timer = 0.0;
        self.elapsed = 0.0;
        self.reset_runway_lights();
    }

    pub fn set_tuning(&mut self, tuning: Tuning) {
        self.tuning = tuning;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Total number of live entities (excluding the runway light ring)
    pub fn entity_count(&self) -> usize {
        self.obstacles.len()
            + self.power_ups.len()
            + self.mystery_boxes.len()
            + self.orbs.len()
            + self.decorations.len()
    }

    /// Floor height under the player (highest cruiser roof, else 0)
    pub fn get_ground_height(&self, player: &PlayerState) -> f32 {
        ground_height_at(&self.obstacles, player.current_offset)
    }

    fn reset_runway_lights(&mut self) {
        self.runway_lights.clear();
        let side_x = self.tuning.path_width / 2.0 + RUNWAY_SIDE_MARGIN;
        let mut z = RUNWAY_START_Z;
        while z <= RUNWAY_END_Z {
            for (side_idx, x) in [-side_x, side_x].into_iter().enumerate() {
                self.runway_lights.push(RunwayLight {
                    pos: Vec3::new(x, 0.02, z),
                    phase: z.abs() * 0.12 + side_idx as f32 * 0.8,
                });
            }
            z += RUNWAY_SPACING;
        }
    }

    /// Advance the stream one frame at absolute scroll `speed`
    pub fn update(
        &mut self,
        dt: f32,
        speed: f32,
        player: &mut PlayerState,
        events: &mut Vec<GameEvent>,
    ) -> FrameOutcome {
        let dt = dt.max(0.0);
        let move_dist = speed.max(0.0) * dt;
        self.elapsed += dt;

        self.scroll_runway_lights(move_dist);

        // Per-frame rolls, so scenery density follows the frame rate
        if self.rng.random::<f32>() < BUILDING_CHANCE {
            self.spawn_building();
        }
        if self.rng.random::<f32>() < BEACON_CHANCE {
            self.spawn_beacon();
        }

        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            let pattern = choose_pattern(&mut self.rng);
            self.spawn_pattern(&pattern, player.flying);
            self.spawn_timer = spawn_interval_for(speed / self.tuning.base_speed);
        }

        let outcome = self.update_obstacles(move_dist, player, events);
        self.update_pickups(dt, move_dist, player, events);
        self.update_orbs(dt, move_dist, player, events);
        self.update_decorations(dt, move_dist);

        outcome
    }

    fn scroll_runway_lights(&mut self, move_dist: f32) {
        let loop_distance = (RUNWAY_END_Z - RUNWAY_START_Z) + RUNWAY_SPACING;
        for light in &mut self.runway_lights {
            light.pos.z += move_dist;
            if light.pos.z > RUNWAY_END_Z {
                light.pos.z -= loop_distance;
            }
        }
    }

    fn update_obstacles(
        &mut self,
        move_dist: f32,
        player: &mut PlayerState,
        events: &mut Vec<GameEvent>,
    ) -> FrameOutcome {
        let mut outcome = FrameOutcome::Continue;

        self.obstacles.retain_mut(|obs| {
            obs.pos.z += move_dist;
            if obs.pos.z > OBSTACLE_DESPAWN_Z {
                return false;
            }

            if outcome == FrameOutcome::Continue
                && !player.is_invincible()
                && check_collision(player, obs)
            {
                if player.handle_collision() {
                    events.push(GameEvent::HoverboardBroken);
                } else {
                    log::info!("Crashed into {:?} in lane {}", obs.kind, obs.lane);
                    events.push(GameEvent::Crashed);
                    outcome = FrameOutcome::Crashed;
                }
            }
            true
        });

        outcome
    }

    fn update_pickups(
        &mut self,
        dt: f32,
        move_dist: f32,
        player: &mut PlayerState,
        events: &mut Vec<GameEvent>,
    ) {
        let rng = &mut self.rng;
        self.mystery_boxes.retain_mut(|mystery| {
            mystery.pos.z += move_dist;
            mystery.spin += 2.0 * dt;
            if mystery.pos.z > PICKUP_DESPAWN_Z {
                return false;
            }
            if check_pickup_proximity(player, mystery.pos) {
                let reward = resolve_mystery_reward(&mut *rng);
                events.push(GameEvent::MysteryBoxOpened(reward));
                return false;
            }
            true
        });

        self.power_ups.retain_mut(|power_up| {
            power_up.pos.z += move_dist;
            power_up.spin += 2.0 * dt;
            if power_up.pos.z > PICKUP_DESPAWN_Z {
                return false;
            }
            if check_pickup_proximity(player, power_up.pos) {
                match power_up.kind {
                    PowerUpKind::Jetpack => player.activate_jetpack(),
                    PowerUpKind::Magnet => player.activate_magnet(),
                    PowerUpKind::Sneakers => player.activate_super_sneakers(),
                }
                events.push(GameEvent::PowerUpCollected(power_up.kind));
                return false;
            }
            true
        });
    }

    fn update_orbs(
        &mut self,
        dt: f32,
        move_dist: f32,
        player: &PlayerState,
        events: &mut Vec<GameEvent>,
    ) {
        let elapsed = self.elapsed;
        let magnet_range = self.tuning.magnet_range;
        let pull_target = player.position() + Vec3::Y * PLAYER_CENTER_HEIGHT;

        self.orbs.retain_mut(|orb| {
            orb.pos.z += move_dist;
            if orb.pos.z > PICKUP_DESPAWN_Z {
                return false;
            }

            let bob = (elapsed * ORB_BOB_FREQUENCY + orb.bob_phase).sin() * ORB_BOB_AMPLITUDE;
            if orb.pulled && !player.magnet_active {
                // Resume bobbing around wherever the pull left it
                orb.base_y = orb.pos.y - bob;
                orb.pulled = false;
            }
            if !orb.pulled {
                orb.pos.y = orb.base_y + bob;
            }

            if player.magnet_active {
                let to_player = pull_target - orb.pos;
                let distance = to_player.length();
                if distance < magnet_range && distance > 0.0 {
                    orb.pulled = true;
                    let step = (MAGNET_PULL_SPEED * dt).min(distance);
                    orb.pos += to_player / distance * step;
                }
            }

            if check_orb_proximity(player, orb.pos) {
                events.push(GameEvent::OrbCollected);
                return false;
            }
            true
        });
    }

    fn update_decorations(&mut self, dt: f32, move_dist: f32) {
        let elapsed = self.elapsed;
        self.decorations.retain_mut(|decoration| {
            decoration.pos.z += move_dist;
            if let DecorationKind::Beacon {
                base_y,
                bob_amplitude,
                bob_speed,
                spin_speed,
                phase,
            } = decoration.kind
            {
                decoration.pos.y = base_y + (elapsed * bob_speed + phase).sin() * bob_amplitude;
                decoration.spin += dt * spin_speed;
            }
            decoration.pos.z <= SCENERY_DESPAWN_Z
        });
    }

    /// Place the entities of one spawn decision at the far end of the lane
    pub fn spawn_pattern(&mut self, pattern: &SpawnPattern, player_flying: bool) {
        match *pattern {
            SpawnPattern::Bonus { lane, item } => match item {
                BonusItem::Jetpack => self.spawn_power_up(lane, PowerUpKind::Jetpack),
                BonusItem::MysteryBox => self.spawn_mystery_box(lane),
                BonusItem::Magnet => self.spawn_power_up(lane, PowerUpKind::Magnet),
                BonusItem::Sneakers => self.spawn_power_up(lane, PowerUpKind::Sneakers),
            },
            SpawnPattern::Cruiser { lane, with_orbs } => self.spawn_cruiser(lane, SPAWN_Z, with_orbs),
            SpawnPattern::Hazards { ref blocked } => {
                for &(lane, hazard) in blocked {
                    let id = self.next_entity_id();
                    let pos = self.lane_origin(lane, 0.0);
                    self.obstacles.push(match hazard {
                        HazardKind::Asteroid => Obstacle::asteroid(id, lane, pos),
                        HazardKind::LaserGate => Obstacle::laser_gate(id, lane, pos),
                    });
                }
                if let Some(lane) = pattern.free_lane() {
                    let height = if player_flying {
                        self.tuning.jetpack_height
                    } else {
                        GROUND_ORB_HEIGHT
                    };
                    self.spawn_orb_line(lane, height);
                }
            }
        }
    }

    fn lane_origin(&self, lane: i8, y: f32) -> Vec3 {
        Vec3::new(lane_to_x(lane, self.tuning.lane_width), y, SPAWN_Z)
    }

    pub fn spawn_cruiser(&mut self, lane: i8, z: f32, with_orbs: bool) {
        let id = self.next_entity_id();
        let x = lane_to_x(lane, self.tuning.lane_width);
        self.obstacles
            .push(Obstacle::cruiser(id, lane, Vec3::new(x, 0.0, z), self.tuning.cruiser_height));

        if with_orbs {
            for i in 0..ORB_LINE_LENGTH {
                let pos = Vec3::new(x, CRUISER_ORB_HEIGHT, z + i as f32 * CRUISER_ORB_SPACING);
                self.spawn_orb(pos);
            }
        }
    }

    /// A line of orbs receding from the spawn point
    pub fn spawn_orb_line(&mut self, lane: i8, height: f32) {
        let origin = self.lane_origin(lane, height);
        for i in 0..ORB_LINE_LENGTH {
            self.spawn_orb(origin - Vec3::Z * (i as f32 * ORB_SPACING));
        }
    }

    fn spawn_orb(&mut self, pos: Vec3) {
        let id = self.next_entity_id();
        let bob_phase = self.rng.random::<f32>() * TAU;
        self.orbs.push(CurrencyOrb::new(id, pos, bob_phase));
    }

    pub fn spawn_power_up(&mut self, lane: i8, kind: PowerUpKind) {
        let id = self.next_entity_id();
        let pos = self.lane_origin(lane, PICKUP_HEIGHT);
        self.power_ups.push(PowerUp {
            id,
            kind,
            pos,
            spin: 0.0,
        });
    }

    pub fn spawn_mystery_box(&mut self, lane: i8) {
        let id = self.next_entity_id();
        let pos = self.lane_origin(lane, PICKUP_HEIGHT);
        self.mystery_boxes.push(MysteryBox { id, pos, spin: 0.0 });
    }

    fn random_side(&mut self) -> f32 {
        if self.rng.random::<f32>() > 0.5 { 1.0 } else { -1.0 }
    }

    fn spawn_building(&mut self) {
        let side = self.random_side();
        let x = side * (15.0 + self.rng.random::<f32>() * 10.0);
        let variant = self.rng.random_range(0..4u8);
        let id = self.next_entity_id();
        self.decorations.push(Decoration {
            id,
            kind: DecorationKind::Building { variant },
            pos: Vec3::new(x, 0.0, SPAWN_Z),
            spin: 0.0,
        });
    }

    fn spawn_beacon(&mut self) {
        let side = self.random_side();
        let x = side * (6.0 + self.rng.random::<f32>() * 5.0);
        let base_y = 2.0 + self.rng.random::<f32>() * 2.5;
        let kind = DecorationKind::Beacon {
            base_y,
            bob_amplitude: 0.2 + self.rng.random::<f32>() * 0.2,
            bob_speed: 1.2 + self.rng.random::<f32>() * 1.4,
            spin_speed: 0.2 + self.rng.random::<f32>() * 0.25,
            phase: self.rng.random::<f32>() * TAU,
        };
        let id = self.next_entity_id();
        self.decorations.push(Decoration {
            id,
            kind,
            pos: Vec3::new(x, base_y, SPAWN_Z),
            spin: 0.0,
        });
    }
}

impl GroundProbe for WorldStream {
    fn ground_height(&self, x: f32) -> f32 {
        ground_height_at(&self.obstacles, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::ObstacleKind;

    const DT: f32 = 1.0 / 60.0;

    fn quiet_world() -> WorldStream {
        let mut world = WorldStream::new(7, Tuning::default());
        // Hold off procedural spawns so tests control the content
        world.spawn_timer = 1000.0;
        world
    }

    #[test]
    fn test_pattern_distribution() {
        let mut rng = Pcg32::seed_from_u64(0x5EED);
        let n = 100_000;
        let (mut bonus, mut cruiser, mut hazards) = (0u32, 0u32, 0u32);
        for _ in 0..n {
            match choose_pattern(&mut rng) {
                SpawnPattern::Bonus { .. } => bonus += 1,
                SpawnPattern::Cruiser { .. } => cruiser += 1,
                SpawnPattern::Hazards { .. } => hazards += 1,
            }
        }
        let frac = |c: u32| c as f64 / n as f64;
        assert!((frac(bonus) - 0.12).abs() < 0.01, "bonus {}", frac(bonus));
        assert!((frac(cruiser) - 0.88 * 0.35).abs() < 0.01, "cruiser {}", frac(cruiser));
        assert!((frac(hazards) - 0.88 * 0.65).abs() < 0.01, "hazards {}", frac(hazards));
    }

    #[test]
    fn test_bonus_items_are_even() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut counts = [0u32; 4];
        for _ in 0..1_000_000 {
            if let SpawnPattern::Bonus { item, .. } = choose_pattern(&mut rng) {
                let idx = match item {
                    BonusItem::Jetpack => 0,
                    BonusItem::MysteryBox => 1,
                    BonusItem::Magnet => 2,
                    BonusItem::Sneakers => 3,
                };
                counts[idx] += 1;
            }
        }
        let total: u32 = counts.iter().sum();
        for count in counts {
            let frac = count as f64 / total as f64;
            assert!((frac - 0.25).abs() < 0.01, "item fraction {frac}");
        }
    }

    #[test]
    fn test_hazards_leave_a_lane_open() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..10_000 {
            let pattern = choose_pattern(&mut rng);
            if let SpawnPattern::Hazards { blocked } = &pattern {
                assert!(!blocked.is_empty() && blocked.len() <= 2);
                if blocked.len() == 2 {
                    assert_ne!(blocked[0].0, blocked[1].0);
                }
                let free = pattern.free_lane().unwrap();
                assert!(blocked.iter().all(|(l, _)| *l != free));
            }
        }
    }

    #[test]
    fn test_free_lane_is_first_open() {
        let pattern = SpawnPattern::Hazards {
            blocked: vec![(-1, HazardKind::Asteroid), (1, HazardKind::LaserGate)],
        };
        assert_eq!(pattern.free_lane(), Some(0));
        let pattern = SpawnPattern::Hazards {
            blocked: vec![(0, HazardKind::Asteroid)],
        };
        assert_eq!(pattern.free_lane(), Some(-1));
    }

    #[test]
    fn test_spawn_interval_shrinks_with_floor() {
        assert!((spawn_interval_for(1.0) - 1.1).abs() < 1e-6);
        assert!(spawn_interval_for(1.5) < spawn_interval_for(1.2));
        assert_eq!(spawn_interval_for(5.0), SPAWN_INTERVAL_FLOOR);
    }

    #[test]
    fn test_first_frame_spawns() {
        let mut world = WorldStream::new(1, Tuning::default());
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        world.update(DT, 35.0, &mut player, &mut events);
        let spawned = world.obstacles.len() + world.power_ups.len() + world.mystery_boxes.len();
        assert!(spawned > 0);
        assert!((world.spawn_timer - 1.1).abs() < 1e-4);
    }

    #[test]
    fn test_hazard_orbs_follow_flight_altitude() {
        let mut world = quiet_world();
        let pattern = SpawnPattern::Hazards {
            blocked: vec![(0, HazardKind::Asteroid)],
        };
        world.spawn_pattern(&pattern, true);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.orbs.len(), ORB_LINE_LENGTH);
        assert!(world.orbs.iter().all(|o| o.base_y == 8.0 && o.pos.x == -3.5));

        world.orbs.clear();
        world.spawn_pattern(&pattern, false);
        assert!(world.orbs.iter().all(|o| o.base_y == GROUND_ORB_HEIGHT));
    }

    #[test]
    fn test_cruiser_orbs_line_the_roof() {
        let mut world = quiet_world();
        world.spawn_pattern(&SpawnPattern::Cruiser { lane: 1, with_orbs: true }, false);
        assert_eq!(world.obstacles[0].kind, ObstacleKind::Cruiser);
        assert_eq!(world.obstacles[0].height, 4.0);
        assert_eq!(world.orbs.len(), ORB_LINE_LENGTH);
        assert!(world.orbs.iter().all(|o| o.pos.y == CRUISER_ORB_HEIGHT && o.pos.x == 3.5));
    }

    #[test]
    fn test_entities_scroll_and_recycle() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        let mut events = Vec::new();

        world.spawn_cruiser(-1, -20.0, false);
        world.spawn_power_up(1, PowerUpKind::Magnet);

        world.update(0.5, 10.0, &mut player, &mut events);
        assert_eq!(world.obstacles[0].pos.z, -15.0);
        assert_eq!(world.power_ups[0].pos.z, -95.0);

        // Cruiser passes Z = 10 after another 2.5 s at 10 u/s
        for _ in 0..6 {
            world.update(0.5, 10.0, &mut player, &mut events);
        }
        assert!(world.obstacles.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_ground_height_from_cruiser() {
        let mut world = quiet_world();
        let player = PlayerState::new();
        assert_eq!(world.get_ground_height(&player), 0.0);
        world.spawn_cruiser(0, -5.0, false);
        assert_eq!(world.get_ground_height(&player), 4.0);
        world.spawn_cruiser(1, 0.0, false);
        assert_eq!(world.ground_height(3.5), 4.0);
        assert_eq!(world.ground_height(1.75), 0.0);
    }

    #[test]
    fn test_hazard_hit_crashes() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        let id = world.next_entity_id();
        world.obstacles.push(Obstacle::asteroid(id, 0, Vec3::new(0.0, 0.0, -0.1)));

        let outcome = world.update(DT, 0.0, &mut player, &mut events);
        assert_eq!(outcome, FrameOutcome::Crashed);
        assert_eq!(events, vec![GameEvent::Crashed]);
    }

    #[test]
    fn test_hoverboard_absorbs_hit_then_invincible() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        player.activate_hoverboard();
        let mut events = Vec::new();
        let id = world.next_entity_id();
        world.obstacles.push(Obstacle::laser_gate(id, 0, Vec3::new(0.0, 0.0, -0.1)));

        let outcome = world.update(DT, 0.0, &mut player, &mut events);
        assert_eq!(outcome, FrameOutcome::Continue);
        assert_eq!(events, vec![GameEvent::HoverboardBroken]);
        assert!(player.is_invincible());

        // Still overlapping, but the grace period covers it
        events.clear();
        let outcome = world.update(DT, 0.0, &mut player, &mut events);
        assert_eq!(outcome, FrameOutcome::Continue);
        assert!(events.is_empty());
    }

    #[test]
    fn test_power_up_collection_activates() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        world.spawn_power_up(0, PowerUpKind::Jetpack);
        world.power_ups[0].pos.z = -0.5;

        world.update(DT, 0.0, &mut player, &mut events);
        assert!(world.power_ups.is_empty());
        assert!(player.flying);
        assert_eq!(events, vec![GameEvent::PowerUpCollected(PowerUpKind::Jetpack)]);
    }

    #[test]
    fn test_mystery_box_resolves_reward() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        world.spawn_mystery_box(0);
        world.mystery_boxes[0].pos.z = 0.0;

        world.update(DT, 0.0, &mut player, &mut events);
        assert!(world.mystery_boxes.is_empty());
        match events.as_slice() {
            [GameEvent::MysteryBoxOpened(MysteryReward::Coins(n))] => {
                assert!((500..1500).contains(n))
            }
            [GameEvent::MysteryBoxOpened(_)] => {}
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_mystery_reward_distribution() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut counts = [0u32; 3];
        for _ in 0..100_000 {
            match resolve_mystery_reward(&mut rng) {
                MysteryReward::Coins(_) => counts[0] += 1,
                MysteryReward::Headstart => counts[1] += 1,
                MysteryReward::Score => counts[2] += 1,
            }
        }
        let frac = |c: u32| c as f64 / 100_000.0;
        assert!((frac(counts[0]) - 0.5).abs() < 0.01);
        assert!((frac(counts[1]) - 0.3).abs() < 0.01);
        assert!((frac(counts[2]) - 0.2).abs() < 0.01);
    }

    #[test]
    fn test_magnet_pulls_orb_closer_every_frame() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        player.activate_magnet();
        let mut events = Vec::new();
        let id = world.next_entity_id();
        world.orbs.push(CurrencyOrb::new(id, Vec3::new(3.5, 1.0, -10.0), 0.0));

        let target = player.position() + Vec3::Y * PLAYER_CENTER_HEIGHT;
        let mut last = world.orbs[0].pos.distance(target);
        assert!(last < 15.0);

        let mut collected = false;
        for _ in 0..120 {
            world.update(DT, 0.0, &mut player, &mut events);
            match world.orbs.first() {
                Some(orb) => {
                    let d = orb.pos.distance(target);
                    assert!(d < last, "distance {d} did not shrink from {last}");
                    last = d;
                }
                None => {
                    collected = true;
                    break;
                }
            }
        }
        assert!(collected);
        assert_eq!(events, vec![GameEvent::OrbCollected]);
    }

    #[test]
    fn test_orb_outside_magnet_range_only_bobs() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        player.activate_magnet();
        let mut events = Vec::new();
        let id = world.next_entity_id();
        world.orbs.push(CurrencyOrb::new(id, Vec3::new(0.0, 1.0, -40.0), 0.0));

        world.update(DT, 0.0, &mut player, &mut events);
        let orb = &world.orbs[0];
        assert!(!orb.pulled);
        assert_eq!(orb.pos.z, -40.0);
        assert!((orb.pos.y - 1.0).abs() <= ORB_BOB_AMPLITUDE);
    }

    #[test]
    fn test_orb_bobs_again_after_magnet_expires() {
        let mut world = quiet_world();
        let mut player = PlayerState::new();
        player.activate_magnet();
        let mut events = Vec::new();
        let id = world.next_entity_id();
        world.orbs.push(CurrencyOrb::new(id, Vec3::new(3.5, 1.0, -12.0), 0.0));

        for _ in 0..5 {
            world.update(DT, 0.0, &mut player, &mut events);
        }
        assert!(world.orbs[0].pulled);

        player.magnet_active = false;
        let held = world.orbs[0].pos;
        world.update(DT, 0.0, &mut player, &mut events);
        let orb = world.orbs[0].clone();
        assert!(!orb.pulled);
        assert_eq!(orb.pos.x, held.x);
        assert!((orb.pos.y - held.y).abs() <= 2.0 * ORB_BOB_AMPLITUDE);

        let mut heights = Vec::new();
        for _ in 0..60 {
            world.update(DT, 0.0, &mut player, &mut events);
            heights.push(world.orbs[0].pos.y);
        }
        assert_eq!(world.orbs[0].pos.x, held.x);
        assert!(heights.iter().all(|&y| (y - orb.base_y).abs() <= ORB_BOB_AMPLITUDE + 1e-5));
        assert!(heights.windows(2).any(|w| w[0] != w[1]));
        assert!(events.is_empty());
    }

    #[test]
    fn test_runway_lights_loop() {
        let mut world = quiet_world();
        assert_eq!(world.runway_lights.len(), 32);
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        for _ in 0..100 {
            world.update(0.1, 59.0, &mut player, &mut events);
            assert!(world
                .runway_lights
                .iter()
                .all(|l| l.pos.z <= RUNWAY_END_Z && l.pos.z > RUNWAY_END_Z - 192.0));
        }
        world.reset();
        assert_eq!(world.runway_lights[0].pos.z, RUNWAY_START_Z);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut world = WorldStream::new(9, Tuning::default());
        let mut player = PlayerState::new();
        let mut events = Vec::new();
        for _ in 0..300 {
            world.update(DT, 35.0, &mut player, &mut events);
        }
        assert!(world.entity_count() > 0);

        world.reset();
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.spawn_timer, 0.0);
        let lights: Vec<_> = world.runway_lights.iter().map(|l| l.pos).collect();

        world.reset();
        assert_eq!(world.entity_count(), 0);
        let again: Vec<_> = world.runway_lights.iter().map(|l| l.pos).collect();
        assert_eq!(lights, again);
    }
}
