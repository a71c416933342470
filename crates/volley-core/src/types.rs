//! Fundamental geometric and simulation types.
//!
//! All positions are expressed in the swarm frame (the local frame of the
//! object that owns the attacker pool). Units are meters and seconds.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// 3D position in the swarm frame (meters).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec3);

/// 3D velocity (m/s). World-frame unless stated otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

/// Orientation of an attacker body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Orientation(pub Quat);

/// Position and orientation of an attacker after a motion step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

/// The local frame the swarm lives in.
///
/// Target velocities are measured in world space; the scheduler leads its
/// aim in the swarm frame, so velocities go through `to_local_direction`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwarmFrame {
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `position` with identity orientation.
    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

impl SwarmFrame {
    pub fn new(rotation: Quat) -> Self {
        Self {
            rotation: rotation.normalize(),
        }
    }

    /// Express a world-space direction in the swarm frame.
    pub fn to_local_direction(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }
}
