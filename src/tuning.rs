//! Game balance and tuning
//!
//! Data-driven so a build can ship alternate balance as JSON. Upgrade levels
//! bought in the shop stretch the power-up durations.

use serde::{Deserialize, Serialize};

use crate::economy::Upgrades;

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Track ===
    /// Distance between lane centres
    pub lane_width: f32,
    /// Full width of the runway (scenery is placed outside it)
    pub path_width: f32,

    // === Speed ===
    /// Base scroll speed (units/s)
    pub base_speed: f32,
    /// Scroll speed cap (units/s)
    pub max_speed: f32,
    /// Speed multiplier growth per second
    pub acceleration: f32,

    // === Movement ===
    pub jump_force: f32,
    /// Jump force while super-sneakers are active
    pub jump_force_super: f32,
    pub gravity: f32,
    /// Lane change approach rate (1/s)
    pub lane_switch_speed: f32,

    // === Power-ups ===
    pub jetpack_duration: f32,
    /// Flight altitude while the jetpack is active
    pub jetpack_height: f32,
    pub magnet_duration: f32,
    /// Orbs inside this radius are pulled toward the player
    pub magnet_range: f32,
    pub super_sneakers_duration: f32,
    pub hoverboard_duration: f32,

    // === Obstacles ===
    pub cruiser_height: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lane_width: 3.5,
            path_width: 12.0,

            base_speed: 35.0,
            max_speed: 59.0,
            acceleration: 0.01,

            jump_force: 18.0,
            jump_force_super: 28.0,
            gravity: -45.0,
            lane_switch_speed: 15.0,

            jetpack_duration: 6.0,
            jetpack_height: 8.0,
            magnet_duration: 10.0,
            magnet_range: 15.0,
            super_sneakers_duration: 12.0,
            hoverboard_duration: 30.0,

            cruiser_height: 4.0,
        }
    }
}

impl Tuning {
    /// Parse tuning overrides; fields missing from the JSON keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Default balance with the shop upgrades applied
    pub fn with_upgrades(upgrades: &Upgrades) -> Self {
        Self::default().upgraded(upgrades)
    }

    /// Copy with power-up durations stretched by upgrade level (level 1 = base)
    pub fn upgraded(&self, upgrades: &Upgrades) -> Self {
        let steps = |level: u32| level.max(1).saturating_sub(1) as f32;
        let mut tuning = self.clone();
        tuning.magnet_duration += steps(upgrades.magnet) * 5.0;
        tuning.jetpack_duration += steps(upgrades.jetpack) * 2.0;
        tuning.super_sneakers_duration += steps(upgrades.sneakers) * 3.0;
        tuning
    }

    /// Largest speed multiplier that still produces a speed under the cap
    pub fn max_multiplier(&self) -> f32 {
        self.max_speed / self.base_speed
    }

    /// Absolute scroll speed for a multiplier
    pub fn speed_for(&self, multiplier: f32) -> f32 {
        (self.base_speed * multiplier).min(self.max_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrades_stretch_durations() {
        let upgrades = Upgrades {
            magnet: 3,
            jetpack: 2,
            sneakers: 6,
        };
        let tuning = Tuning::with_upgrades(&upgrades);
        assert_eq!(tuning.magnet_duration, 20.0);
        assert_eq!(tuning.jetpack_duration, 8.0);
        assert_eq!(tuning.super_sneakers_duration, 27.0);
    }

    #[test]
    fn test_level_one_is_base() {
        let tuning = Tuning::with_upgrades(&Upgrades::default());
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "base_speed": 40.0 }"#).unwrap();
        assert_eq!(tuning.base_speed, 40.0);
        assert_eq!(tuning.max_speed, 59.0);
        assert_eq!(tuning.lane_width, 3.5);
    }

    #[test]
    fn test_speed_is_capped() {
        let tuning = Tuning::default();
        assert_eq!(tuning.speed_for(1.0), 35.0);
        assert_eq!(tuning.speed_for(10.0), 59.0);
        assert!((tuning.max_multiplier() - 59.0 / 35.0).abs() < 1e-6);
    }
}
