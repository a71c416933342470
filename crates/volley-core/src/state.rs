//! Swarm state snapshot: the complete visible state produced after each tick.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::StrikeEvent;
use crate::types::SimTime;

/// Complete swarm state after a tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwarmSnapshot {
    pub time: SimTime,
    pub phase: EpisodePhase,
    pub target: TargetView,
    pub attackers: Vec<AttackerView>,
    pub pool: PoolView,
    pub events: Vec<StrikeEvent>,
}

/// Target kinematics for display and observation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetView {
    pub position: Vec3,
    /// `None` when no velocity source is attached.
    pub velocity: Option<Vec3>,
}

/// One attacker body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackerView {
    pub handle: u32,
    pub kind: WeaponKind,
    pub state: HandleState,
    pub position: Vec3,
    pub orientation: Quat,
}

/// Pool occupancy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolView {
    pub waiting: usize,
    pub active: usize,
    pub max_concurrent: usize,
    /// Total strikes launched since the episode started.
    pub launched_total: u32,
}
