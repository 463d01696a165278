//! Frame clock

use crate::consts::MAX_FRAME_DT;

/// Turns monotonic frame timestamps (milliseconds) into a frame delta.
///
/// The delta is never negative and never exceeds `MAX_FRAME_DT`, so a tab
/// that was hidden for a minute resumes with one ordinary step.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta in seconds since the previous call; 0 on the first frame
    pub fn frame_delta(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        dt.clamp(0.0, MAX_FRAME_DT)
    }

    /// Forget the previous timestamp (e.g. after the loop was stopped)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame_delta(1234.0), 0.0);
    }

    #[test]
    fn test_regular_frames() {
        let mut clock = FrameClock::new();
        clock.frame_delta(1000.0);
        assert!((clock.frame_delta(1016.0) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_clamped_both_ways() {
        let mut clock = FrameClock::new();
        clock.frame_delta(1000.0);
        assert_eq!(clock.frame_delta(61_000.0), MAX_FRAME_DT);
        assert_eq!(clock.frame_delta(60_000.0), 0.0);
    }

    #[test]
    fn test_reset_restarts() {
        let mut clock = FrameClock::new();
        clock.frame_delta(0.0);
        clock.reset();
        assert_eq!(clock.frame_delta(50.0), 0.0);
    }
}
