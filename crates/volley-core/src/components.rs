//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods. Positions,
//! velocities and orientations reuse the newtypes in `types`.

use serde::{Deserialize, Serialize};

use crate::enums::WeaponKind;

/// Marker for the entity the swarm attacks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Target;

/// Scene body of one attacker, mirroring its attack handle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttackerBody {
    /// Handle id in the scheduler's arena.
    pub handle: u32,
    pub kind: WeaponKind,
}
