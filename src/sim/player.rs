//! Player kinematics and timed abilities
//!
//! The player never moves along Z. It slides between three lanes, moves
//! vertically under one motion mode at a time, and carries independent buff
//! countdowns. Everything is advanced by `update`, nothing is scheduled.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::collision::{Aabb, PLAYER_Z};
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{approach, lane_to_x};
use glam::Vec3;

/// Something that can report the floor height under a horizontal position
pub trait GroundProbe {
    fn ground_height(&self, x: f32) -> f32;
}

/// Open ground everywhere; used before a world exists and in tests
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround;

impl GroundProbe for FlatGround {
    fn ground_height(&self, _x: f32) -> f32 {
        0.0
    }
}

/// Lane change direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    pub fn delta(self) -> i8 {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }
}

/// Which rule currently drives vertical motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionMode {
    Grounded,
    Jumping,
    Rolling,
    Flying,
    Hovering,
}

/// Cosmetic pose, read by the renderer only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPose {
    /// Heading (PI faces down the runway)
    pub yaw: f32,
    pub pitch: f32,
    /// Roll around the travel axis
    pub bank: f32,
    /// Bank impulse from the latest lane change
    pub bank_target: f32,
    /// Time left before the bank impulse clears
    pub bank_timer: f32,
    /// Vertical squash (0.72 while rolling)
    pub scale_y: f32,
    /// Idle hover bob added on top of the physical height
    pub bob: f32,
    /// False on the off-beats of the invincibility flicker
    pub visible: bool,
    /// Overcharged thrusters while super-sneakers are active
    pub thrusters_overcharged: bool,
    /// Magnet halo rotation
    pub halo_spin: f32,
    anim_time: f32,
}

impl Default for PlayerPose {
    fn default() -> Self {
        Self {
            yaw: PI,
            pitch: 0.0,
            bank: 0.0,
            bank_target: 0.0,
            bank_timer: 0.0,
            scale_y: 1.0,
            bob: 0.0,
            visible: true,
            thrusters_overcharged: false,
            halo_spin: 0.0,
            anim_time: 0.0,
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Lane index in -1..=1
    pub lane: i8,
    /// X of the current lane's centre
    pub target_offset: f32,
    /// Smoothed X, approaches `target_offset`
    pub current_offset: f32,
    pub vertical_position: f32,
    pub vertical_velocity: f32,
    /// Floor under the player this frame (cruiser roof or 0)
    pub ground_height: f32,

    // === Motion modes (at most one is true) ===
    pub jumping: bool,
    pub rolling: bool,
    pub roll_timer: f32,
    pub flying: bool,
    pub fly_timer: f32,
    pub hovering: bool,
    pub hover_timer: f32,

    // === Buffs ===
    pub magnet_active: bool,
    pub magnet_timer: f32,
    pub super_sneakers_active: bool,
    pub super_sneakers_timer: f32,
    /// Grace period after a hoverboard break
    pub invincible_timer: f32,

    pub pose: PlayerPose,
    pub tuning: Tuning,
    /// Seconds simulated since reset; drives the hover bob
    elapsed: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            lane: 0,
            target_offset: 0.0,
            current_offset: 0.0,
            vertical_position: 0.0,
            vertical_velocity: 0.0,
            ground_height: 0.0,
            jumping: false,
            rolling: false,
            roll_timer: 0.0,
            flying: false,
            fly_timer: 0.0,
            hovering: false,
            hover_timer: 0.0,
            magnet_active: false,
            magnet_timer: 0.0,
            super_sneakers_active: false,
            super_sneakers_timer: 0.0,
            invincible_timer: 0.0,
            pose: PlayerPose::default(),
            tuning,
            elapsed: 0.0,
        }
    }

    /// Restore run-start defaults (tuning is kept)
    pub fn reset(&mut self) {
        let tuning = std::mem::take(&mut self.tuning);
        *self = Self::with_tuning(tuning);
    }

    /// Current motion mode
    pub fn motion_mode(&self) -> MotionMode {
        if self.flying {
            MotionMode::Flying
        } else if self.hovering {
            MotionMode::Hovering
        } else if self.rolling {
            MotionMode::Rolling
        } else if self.jumping {
            MotionMode::Jumping
        } else {
            MotionMode::Grounded
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_timer > 0.0
    }

    /// World-space position (feet), without the cosmetic bob
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.current_offset, self.vertical_position, PLAYER_Z)
    }

    /// Collision box around the ship, squashed while rolling
    pub fn hitbox(&self) -> Aabb {
        let pos = self.position();
        let height = PLAYER_HEIGHT * self.pose.scale_y;
        Aabb::new(
            pos - Vec3::new(PLAYER_HALF_WIDTH, 0.0, PLAYER_HALF_DEPTH),
            pos + Vec3::new(PLAYER_HALF_WIDTH, height, PLAYER_HALF_DEPTH),
        )
    }

    /// Move one lane left or right; ignored at the edge lanes
    pub fn change_lane(&mut self, direction: LaneDirection) {
        let lane = self.lane + direction.delta();
        if !(MIN_LANE..=MAX_LANE).contains(&lane) {
            return;
        }
        self.lane = lane;
        self.target_offset = lane_to_x(lane, self.tuning.lane_width);

        // Each change restarts the tilt decay
        self.pose.bank_target = -(direction.delta() as f32) * BANK_IMPULSE;
        self.pose.bank_timer = BANK_DURATION;
    }

    pub fn jump(&mut self) {
        if self.jumping || self.rolling || self.flying || self.hovering {
            return;
        }
        self.vertical_velocity = if self.super_sneakers_active {
            self.tuning.jump_force_super
        } else {
            self.tuning.jump_force
        };
        self.jumping = true;
    }

    pub fn roll(&mut self) {
        if self.rolling || self.flying || self.hovering {
            return;
        }
        self.rolling = true;
        self.roll_timer = ROLL_DURATION;

        if self.jumping {
            // Dive out of the jump; gravity takes over from here
            self.jumping = false;
            self.vertical_velocity = ROLL_DROP_VELOCITY;
        }

        self.pose.scale_y = ROLL_SCALE_Y;
    }

    pub fn activate_jetpack(&mut self) {
        self.deactivate_hoverboard();
        self.flying = true;
        self.fly_timer = self.tuning.jetpack_duration;
        self.vertical_velocity = 0.0;
        self.jumping = false;
        self.rolling = false;
        self.roll_timer = 0.0;
        self.pose.scale_y = 1.0;
        self.pose.pitch = -0.2;
    }

    pub fn activate_magnet(&mut self) {
        self.magnet_active = true;
        self.magnet_timer = self.tuning.magnet_duration;
    }

    pub fn activate_super_sneakers(&mut self) {
        self.super_sneakers_active = true;
        self.super_sneakers_timer = self.tuning.super_sneakers_duration;
        self.pose.thrusters_overcharged = true;
    }

    fn deactivate_super_sneakers(&mut self) {
        self.super_sneakers_active = false;
        self.super_sneakers_timer = 0.0;
        self.pose.thrusters_overcharged = false;
    }

    pub fn activate_hoverboard(&mut self) {
        if self.flying || self.hovering {
            return;
        }
        self.hovering = true;
        self.hover_timer = self.tuning.hoverboard_duration;
        self.jumping = false;
        self.rolling = false;
        self.roll_timer = 0.0;
        self.pose.scale_y = 1.0;
    }

    fn deactivate_hoverboard(&mut self) {
        self.hovering = false;
        self.hover_timer = 0.0;
    }

    /// Resolve a hazard hit. Returns true if the hoverboard absorbed it.
    pub fn handle_collision(&mut self) -> bool {
        if !self.hovering {
            return false;
        }
        self.deactivate_hoverboard();
        self.invincible_timer = INVINCIBILITY_DURATION;
        log::debug!("Hoverboard broke, invincible for {INVINCIBILITY_DURATION}s");
        true
    }

    /// Advance one frame
    pub fn update<G: GroundProbe + ?Sized>(&mut self, dt: f32, speed_multiplier: f32, world: &G) {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.ground_height = world.ground_height(self.current_offset);

        // Invincibility flicker
        if self.invincible_timer > 0.0 {
            self.invincible_timer = (self.invincible_timer - dt).max(0.0);
            self.pose.visible = ((self.invincible_timer * FLICKER_RATE).floor() as i64) % 2 == 0;
        } else {
            self.pose.visible = true;
        }

        self.current_offset = approach(
            self.current_offset,
            self.target_offset,
            self.tuning.lane_switch_speed,
            dt,
        );

        self.update_vertical(dt);
        self.tick_buffs(dt);

        if self.rolling {
            self.roll_timer -= dt;
            if self.roll_timer <= 0.0 {
                self.rolling = false;
                self.roll_timer = 0.0;
                self.pose.scale_y = 1.0;
                if self.vertical_position <= self.ground_height {
                    self.vertical_position = self.ground_height;
                }
            }
        }

        self.update_pose(dt, speed_multiplier);
    }

    fn update_vertical(&mut self, dt: f32) {
        let ground = self.ground_height;

        if self.flying {
            self.fly_timer -= dt;
            self.vertical_position = approach(
                self.vertical_position,
                self.tuning.jetpack_height,
                JETPACK_LERP_RATE,
                dt,
            );
            if self.fly_timer <= 0.0 {
                self.flying = false;
                self.fly_timer = 0.0;
            }
        } else if self.hovering {
            self.hover_timer -= dt;
            if self.hover_timer <= 0.0 {
                self.deactivate_hoverboard();
            }
            let bob = (self.elapsed * HOVER_BOB_FREQUENCY).sin() * HOVER_BOB_AMPLITUDE;
            let hover_y = ground + HOVER_OFFSET + bob;
            self.vertical_position =
                approach(self.vertical_position, hover_y, HOVER_LERP_RATE, dt);
            self.vertical_velocity = 0.0;
        } else if self.jumping {
            self.integrate_gravity(dt);
            if self.vertical_position <= ground {
                self.vertical_position = ground;
                self.vertical_velocity = 0.0;
                self.jumping = false;
            }
        } else if self.vertical_position > ground {
            // Falling, e.g. drove off the end of a cruiser
            self.integrate_gravity(dt);
            if self.vertical_position <= ground {
                self.vertical_position = ground;
                self.vertical_velocity = 0.0;
            }
        } else if self.vertical_position < ground {
            // Ground rose underneath
            self.vertical_position = ground;
            self.vertical_velocity = 0.0;
        }

        if self.vertical_position < ground {
            self.vertical_position = ground;
        }
    }

    fn integrate_gravity(&mut self, dt: f32) {
        self.vertical_velocity += self.tuning.gravity * dt;
        self.vertical_position += self.vertical_velocity * dt;
    }

    fn tick_buffs(&mut self, dt: f32) {
        if self.magnet_active {
            self.magnet_timer -= dt;
            self.pose.halo_spin += 5.0 * dt;
            if self.magnet_timer <= 0.0 {
                self.magnet_active = false;
                self.magnet_timer = 0.0;
            }
        }

        if self.super_sneakers_active {
            self.super_sneakers_timer -= dt;
            if self.super_sneakers_timer <= 0.0 {
                self.deactivate_super_sneakers();
            }
        }
    }

    fn update_pose(&mut self, dt: f32, speed_multiplier: f32) {
        let grounded = self.motion_mode() == MotionMode::Grounded;
        let (rolling, flying) = (self.rolling, self.flying);
        let pose = &mut self.pose;

        if pose.bank_timer > 0.0 {
            pose.bank_timer -= dt;
            if pose.bank_timer <= 0.0 {
                pose.bank_timer = 0.0;
                pose.bank_target = 0.0;
            }
        }

        if grounded {
            pose.anim_time += dt * 15.0 * speed_multiplier;
            let t = pose.anim_time;
            pose.bob = (t * 2.0).sin().abs() * 0.08;
            pose.pitch += (-0.05 - pose.pitch) * 0.12;
            let bank_target = pose.bank_target + t.sin() * 0.03;
            pose.bank += (bank_target - pose.bank) * 0.18;
        } else {
            pose.bob = 0.0;
            let state_pitch = if rolling {
                -0.5
            } else if flying {
                -0.22
            } else {
                -0.12
            };
            pose.pitch += (state_pitch - pose.pitch) * 0.16;
            pose.bank += (pose.bank_target * 0.6 - pose.bank) * 0.12;
        }
    }

    /// Menu sway while no run is active
    pub fn idle_sway(&mut self, elapsed: f32) {
        self.pose.yaw = PI + elapsed.sin() * 0.1;
    }
}
