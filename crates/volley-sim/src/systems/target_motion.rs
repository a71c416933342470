//! Target kinematics: integrate velocity and keep the target inside the arena.

use glam::Vec3;
use hecs::World;

use volley_core::components::Target;
use volley_core::state::TargetView;
use volley_core::types::{Position, SwarmFrame, Velocity};

/// Move every target by its swarm-frame velocity. A target leaving the
/// arena sphere is clamped to its surface and its outward velocity reflected.
pub fn run(world: &mut World, dt: f32, arena_radius: f32, frame: &SwarmFrame) {
    for (_entity, (_target, pos, vel)) in
        world.query_mut::<(&Target, &mut Position, &mut Velocity)>()
    {
        pos.0 += frame.to_local_direction(vel.0) * dt;

        let range = pos.0.length();
        if arena_radius > 0.0 && range > arena_radius {
            let normal = pos.0 / range;
            pos.0 = normal * arena_radius;

            let outward = vel.0.dot(frame.rotation * normal);
            if outward > 0.0 {
                vel.0 -= 2.0 * outward * (frame.rotation * normal);
            }
        }
    }
}

/// Position and (world-frame) velocity of the first target, if one exists.
pub fn target_view(world: &World) -> Option<TargetView> {
    let mut query = world.query::<(&Target, &Position, Option<&Velocity>)>();
    query
        .iter()
        .next()
        .map(|(_entity, (_target, pos, vel))| TargetView {
            position: pos.0,
            velocity: vel.map(|v| v.0),
        })
}

/// Place the target at `position`.
pub fn teleport(world: &mut World, position: Vec3) {
    for (_entity, (_target, pos)) in world.query_mut::<(&Target, &mut Position)>() {
        pos.0 = position;
    }
}
