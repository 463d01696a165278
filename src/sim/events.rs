//! Events raised during a frame
//!
//! The core never performs I/O. Anything the outside world should react to
//! (sound, HUD pops, persistence, score submission) is reported here and
//! drained by the caller after each tick.

use serde::{Deserialize, Serialize};

use super::entities::{MysteryReward, PowerUpKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    OrbCollected,
    PowerUpCollected(PowerUpKind),
    MysteryBoxOpened(MysteryReward),
    /// A hazard hit was absorbed by the hoverboard
    HoverboardBroken,
    HeadstartUsed,
    /// A hazard hit ended the run
    Crashed,
    /// Final tally of a finished run
    RunEnded { score: u64, coins: u32 },
}
