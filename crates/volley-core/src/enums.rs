//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Scheduling state of an attack handle.
///
/// The waiting pool is exactly the set of `Idle` handles and the active
/// pool is exactly the set of `Running` handles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleState {
    #[default]
    Idle,
    Running,
}

/// Movement style of an attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Follows a fitted curve from the curve library.
    CurveFollow,
    /// Closes distance, then sweeps an arc through the target direction.
    SwingArc,
    /// Flies straight at the target at a fixed approach speed.
    VelocityDriven,
}

/// Why a strike ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// The declared duration elapsed.
    Natural,
    /// The trajectory ended the strike before its duration (overshoot or arrival).
    EarlyExit,
}

/// Episode phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    #[default]
    Setup,
    Active,
    Paused,
}
