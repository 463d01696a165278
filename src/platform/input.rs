//! Raw input decoding
//!
//! Keyboard keys, swipes and double taps become `InputAction`s. Nothing here
//! touches the session; the caller forwards the actions.

use crate::sim::{InputAction, LaneDirection};

/// Swipes shorter than this (pixels, on the dominant axis) count as taps
pub const SWIPE_THRESHOLD: f32 = 30.0;
/// Two taps closer than this (milliseconds) summon the hoverboard
pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

/// Map a `KeyboardEvent.key` value to an action
pub fn action_for_key(key: &str) -> Option<InputAction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(InputAction::ChangeLane(LaneDirection::Left)),
        "ArrowRight" | "d" | "D" => Some(InputAction::ChangeLane(LaneDirection::Right)),
        "ArrowUp" | "w" | "W" | " " => Some(InputAction::Jump),
        "ArrowDown" | "s" | "S" => Some(InputAction::Roll),
        "e" => Some(InputAction::Hoverboard),
        _ => None,
    }
}

/// Classify a touch from start to end point (screen pixels, y down)
pub fn decode_swipe(start: (f32, f32), end: (f32, f32)) -> Option<InputAction> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    if dx.abs().max(dy.abs()) < SWIPE_THRESHOLD {
        return None;
    }

    let action = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            InputAction::ChangeLane(LaneDirection::Right)
        } else {
            InputAction::ChangeLane(LaneDirection::Left)
        }
    } else if dy > 0.0 {
        InputAction::Roll
    } else {
        InputAction::Jump
    };
    Some(action)
}

/// Touch state carried between `touchstart` and `touchend`
#[derive(Debug, Clone, Default)]
pub struct TouchGestures {
    start: Option<(f32, f32)>,
    last_tap_ms: Option<f64>,
}

impl TouchGestures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a touch start; returns the hoverboard action on a double tap
    pub fn touch_start(&mut self, x: f32, y: f32, now_ms: f64) -> Option<InputAction> {
        self.start = Some((x, y));
        let double = self
            .last_tap_ms
            .is_some_and(|last| now_ms - last < DOUBLE_TAP_WINDOW_MS);
        self.last_tap_ms = Some(now_ms);
        double.then_some(InputAction::Hoverboard)
    }

    /// Finish a touch; returns the swipe action, if it was one
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<InputAction> {
        let start = self.start.take()?;
        decode_swipe(start, (x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        let left = Some(InputAction::ChangeLane(LaneDirection::Left));
        let right = Some(InputAction::ChangeLane(LaneDirection::Right));
        for key in ["ArrowLeft", "a", "A"] {
            assert_eq!(action_for_key(key), left);
        }
        for key in ["ArrowRight", "d", "D"] {
            assert_eq!(action_for_key(key), right);
        }
        for key in ["ArrowUp", "w", "W", " "] {
            assert_eq!(action_for_key(key), Some(InputAction::Jump));
        }
        for key in ["ArrowDown", "s", "S"] {
            assert_eq!(action_for_key(key), Some(InputAction::Roll));
        }
        assert_eq!(action_for_key("e"), Some(InputAction::Hoverboard));
        assert_eq!(action_for_key("E"), None);
        assert_eq!(action_for_key("Escape"), None);
    }

    #[test]
    fn test_short_swipe_is_tap() {
        assert_eq!(decode_swipe((100.0, 100.0), (125.0, 110.0)), None);
    }

    #[test]
    fn test_swipe_directions() {
        assert_eq!(
            decode_swipe((100.0, 100.0), (200.0, 120.0)),
            Some(InputAction::ChangeLane(LaneDirection::Right))
        );
        assert_eq!(
            decode_swipe((100.0, 100.0), (40.0, 90.0)),
            Some(InputAction::ChangeLane(LaneDirection::Left))
        );
        assert_eq!(decode_swipe((100.0, 100.0), (90.0, 20.0)), Some(InputAction::Jump));
        assert_eq!(decode_swipe((100.0, 100.0), (110.0, 180.0)), Some(InputAction::Roll));
    }

    #[test]
    fn test_double_tap_window() {
        let mut touch = TouchGestures::new();
        assert_eq!(touch.touch_start(0.0, 0.0, 1000.0), None);
        assert_eq!(touch.touch_end(0.0, 0.0), None);
        assert_eq!(touch.touch_start(0.0, 0.0, 1250.0), Some(InputAction::Hoverboard));
        assert_eq!(touch.touch_start(0.0, 0.0, 1600.0), None);
    }

    #[test]
    fn test_touch_end_without_start() {
        let mut touch = TouchGestures::new();
        assert_eq!(touch.touch_end(500.0, 0.0), None);
    }
}
