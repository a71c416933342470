//! Commands sent from the driver (training loop, harness) to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// All possible driver actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SwarmCommand {
    // --- Episode control ---
    /// Build the attacker pool (if needed) and start ticking.
    StartEpisode,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,

    // --- Pool control ---
    /// Cancel every in-flight strike and return all attackers to waiting.
    StopAll,
    /// Cancel in-flight strikes from a single attacker.
    StopAttacker { handle: u32 },
    /// Tear down all attackers and build a fresh pool.
    RebuildPool,

    // --- Target control ---
    /// Replace the target's velocity source. `None` disables prediction.
    SetTargetVelocity { velocity: Option<Vec3> },
    /// Move the target instantly.
    TeleportTarget { position: Vec3 },
}
