//! Snapshot system: queries the ECS world and the scheduler and builds a
//! complete SwarmSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use volley_core::components::AttackerBody;
use volley_core::enums::{EpisodePhase, HandleState};
use volley_core::events::StrikeEvent;
use volley_core::state::{AttackerView, SwarmSnapshot};
use volley_core::types::{Orientation, Position, SimTime};

use crate::handle::HandleId;
use crate::scheduler::AttackScheduler;
use crate::systems::target_motion;

/// Build a complete SwarmSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: EpisodePhase,
    scheduler: &AttackScheduler,
    events: Vec<StrikeEvent>,
) -> SwarmSnapshot {
    SwarmSnapshot {
        time: *time,
        phase,
        target: target_motion::target_view(world).unwrap_or_default(),
        attackers: build_attackers(world, scheduler),
        pool: scheduler.pool_view(),
        events,
    }
}

/// Build AttackerView list from all attacker bodies, ordered by handle.
fn build_attackers(world: &World, scheduler: &AttackScheduler) -> Vec<AttackerView> {
    let mut attackers: Vec<AttackerView> = world
        .query::<(&AttackerBody, &Position, &Orientation)>()
        .iter()
        .map(|(_entity, (body, pos, orientation))| AttackerView {
            handle: body.handle,
            kind: body.kind,
            state: scheduler
                .arena()
                .get(HandleId(body.handle))
                .map(|h| h.state())
                .unwrap_or(HandleState::Idle),
            position: pos.0,
            orientation: orientation.0,
        })
        .collect();
    attackers.sort_by_key(|a| a.handle);
    attackers
}
