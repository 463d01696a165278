//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame timing (monotonic timestamps to a clamped delta)
//! - Input events (keys, swipes and double taps to discrete actions)

pub mod input;
pub mod time;

pub use input::{TouchGestures, action_for_key, decode_swipe};
pub use time::FrameClock;
