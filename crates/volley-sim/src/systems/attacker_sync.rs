//! Attacker sync system: copies weapon poses onto attacker bodies.

use hecs::World;

use volley_core::components::AttackerBody;
use volley_core::types::{Orientation, Position};

use crate::handle::{HandleArena, HandleId};

/// Copy each handle's weapon pose onto the body carrying its id.
pub fn run(world: &mut World, arena: &HandleArena) {
    for (_entity, (body, pos, orientation)) in
        world.query_mut::<(&AttackerBody, &mut Position, &mut Orientation)>()
    {
        if let Some(handle) = arena.get(HandleId(body.handle)) {
            let pose = handle.weapon().pose();
            pos.0 = pose.position;
            orientation.0 = pose.orientation;
        }
    }
}

/// Spawn one body per handle, despawning any existing bodies first.
pub fn respawn_bodies(world: &mut World, arena: &HandleArena) {
    let stale: Vec<hecs::Entity> = world
        .query::<&AttackerBody>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    for entity in stale {
        // Entities came from the query above, so despawn cannot miss.
        let _ = world.despawn(entity);
    }

    for handle in arena.iter() {
        let pose = handle.weapon().pose();
        world.spawn((
            AttackerBody {
                handle: handle.id().0,
                kind: handle.weapon().kind(),
            },
            Position(pose.position),
            Orientation(pose.orientation),
        ));
    }
}
