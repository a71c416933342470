//! Target lead prediction and weapon reach checks.
//!
//! A launch either aims at the live target position or leads it by the
//! target's swarm-frame velocity times the weapon's predicted impact time.
//! Lead points beyond the weapon's reach are discarded in favor of the
//! live position.

use glam::Vec3;

use volley_core::types::SwarmFrame;

/// Where a launch ends up aiming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimDecision {
    pub aim: Vec3,
    /// `aim` is a lead point rather than the live target.
    pub predicted: bool,
    /// Lead point that was discarded for being out of reach.
    pub rejected: Option<Vec3>,
}

/// Lead point for a target at `target` moving at `velocity_local`
/// (swarm frame), reached after `impact_time` seconds.
pub fn lead_point(target: Vec3, velocity_local: Vec3, impact_time: f32) -> Vec3 {
    target + velocity_local * impact_time
}

/// World-space target velocity expressed in the swarm frame.
pub fn local_velocity(frame: &SwarmFrame, world_velocity: Vec3) -> Vec3 {
    frame.to_local_direction(world_velocity)
}

/// Check if `point` lies within `reach` of a weapon at `weapon_position`.
pub fn within_reach(weapon_position: Vec3, point: Vec3, reach: f32) -> bool {
    weapon_position.distance(point) <= reach
}

/// Choose the aim point for a launch.
///
/// With no lead point the live target is used. A lead point outside the
/// weapon's reach falls back to the live target and is reported as rejected.
pub fn resolve_aim(
    weapon_position: Vec3,
    reach: f32,
    target: Vec3,
    lead: Option<Vec3>,
) -> AimDecision {
    match lead {
        Some(point) if within_reach(weapon_position, point, reach) => AimDecision {
            aim: point,
            predicted: true,
            rejected: None,
        },
        Some(point) => AimDecision {
            aim: target,
            predicted: false,
            rejected: Some(point),
        },
        None => AimDecision {
            aim: target,
            predicted: false,
            rejected: None,
        },
    }
}
