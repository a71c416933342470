//! Strike events emitted by the scheduler for the driver and for logging.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Pool lifecycle events, in the order they happened within a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StrikeEvent {
    /// An attacker left the waiting pool and started a strike.
    Launched {
        handle: u32,
        kind: WeaponKind,
        token: u64,
        duration: f32,
        /// Position the strike was aimed at.
        aim: Vec3,
        /// Whether `aim` is a lead prediction rather than the live target.
        predicted: bool,
    },
    /// A lead prediction fell outside the weapon's reach and was discarded.
    PredictionRejected {
        handle: u32,
        predicted: Vec3,
        reach: f32,
    },
    /// A strike ended on its own and the attacker returned to waiting.
    Completed {
        handle: u32,
        token: u64,
        reason: FinishReason,
    },
    /// A strike was cancelled and the attacker returned to waiting.
    Cancelled { handle: u32, token: u64 },
    /// The attacker pool was rebuilt.
    PoolRebuilt { attacker_count: usize },
}
