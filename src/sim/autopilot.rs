//! Demo autopilot
//!
//! Picks one action per frame from what is coming down the lanes. Used by
//! the headless native runner and the in-browser demo toggle.

use super::entities::{Obstacle, ObstacleKind};
use super::player::LaneDirection;
use super::tick::{GameSession, InputAction};
use crate::consts::LANES;

/// Seconds of warning before a low hazard reaches the player
const REACT_TIME: f32 = 0.3;
/// Seconds of warning before a cruiser's nose reaches the player
const STEER_TIME: f32 = 1.2;

fn front_z(obs: &Obstacle) -> f32 {
    obs.pos.z + obs.depth / 2.0
}

fn back_z(obs: &Obstacle) -> f32 {
    obs.pos.z - obs.depth / 2.0
}

/// Whether `lane` has no hazard arriving within `horizon` seconds
fn lane_is_clear(session: &GameSession, lane: i8, speed: f32, horizon: f32) -> bool {
    !session.world.obstacles.iter().any(|obs| {
        obs.lane == lane && back_z(obs) < 2.0 && front_z(obs) > -speed * horizon
    })
}

/// Decide the next action, if any
pub fn autopilot_action(session: &GameSession) -> Option<InputAction> {
    let player = &session.player;
    if !session.is_running() || player.flying {
        return None;
    }

    let speed = session.current_speed().max(1.0);
    let threat = session
        .world
        .obstacles
        .iter()
        .filter(|obs| obs.lane == player.lane && back_z(obs) < 1.5)
        .filter(|obs| front_z(obs) > -speed * STEER_TIME)
        .max_by(|a, b| front_z(a).total_cmp(&front_z(b)))?;

    match threat.kind {
        ObstacleKind::Cruiser => {
            // Riding the roof already
            if player.ground_height >= threat.height {
                return None;
            }
            let safe = LANES
                .into_iter()
                .filter(|&lane| lane != player.lane)
                .filter(|&lane| lane_is_clear(session, lane, speed, STEER_TIME))
                .min_by_key(|&lane| (lane - player.lane).abs())?;
            let direction = if safe < player.lane {
                LaneDirection::Left
            } else {
                LaneDirection::Right
            };
            Some(InputAction::ChangeLane(direction))
        }
        ObstacleKind::Asteroid if front_z(threat) > -speed * REACT_TIME => {
            (!player.jumping && !player.rolling).then_some(InputAction::Jump)
        }
        ObstacleKind::LaserGate { .. } if front_z(threat) > -speed * REACT_TIME => {
            (!player.rolling).then_some(InputAction::Roll)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use glam::Vec3;

    fn session_with(obstacle: impl FnOnce(u32) -> Obstacle) -> GameSession {
        let mut session = GameSession::new(3, Tuning::default());
        session.start();
        let id = session.world.next_entity_id();
        session.world.obstacles.push(obstacle(id));
        session
    }

    #[test]
    fn test_idle_does_nothing() {
        let session = GameSession::new(3, Tuning::default());
        assert_eq!(autopilot_action(&session), None);
    }

    #[test]
    fn test_jumps_close_asteroid() {
        let session = session_with(|id| Obstacle::asteroid(id, 0, Vec3::new(0.0, 0.0, -8.0)));
        assert_eq!(autopilot_action(&session), Some(InputAction::Jump));

        let far = session_with(|id| Obstacle::asteroid(id, 0, Vec3::new(0.0, 0.0, -30.0)));
        assert_eq!(autopilot_action(&far), None);
    }

    #[test]
    fn test_rolls_under_gate() {
        let session = session_with(|id| Obstacle::laser_gate(id, 0, Vec3::new(0.0, 0.0, -6.0)));
        assert_eq!(autopilot_action(&session), Some(InputAction::Roll));
    }

    #[test]
    fn test_steers_around_cruiser() {
        let mut session =
            session_with(|id| Obstacle::cruiser(id, 0, Vec3::new(0.0, 0.0, -30.0), 4.0));
        let id = session.world.next_entity_id();
        session
            .world
            .obstacles
            .push(Obstacle::asteroid(id, -1, Vec3::new(-3.5, 0.0, -20.0)));
        assert_eq!(
            autopilot_action(&session),
            Some(InputAction::ChangeLane(LaneDirection::Right))
        );
    }

    #[test]
    fn test_ignores_other_lanes() {
        let session = session_with(|id| Obstacle::asteroid(id, 1, Vec3::new(3.5, 0.0, -5.0)));
        assert_eq!(autopilot_action(&session), None);
    }
}
