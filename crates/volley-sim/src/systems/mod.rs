//! ECS systems that operate on the swarm world each tick.
//!
//! Systems are plain functions over `&mut World` (or `&World` when
//! read-only). Attack state lives in the scheduler; the world holds the
//! scene bodies that mirror it.

pub mod attacker_sync;
pub mod snapshot;
pub mod target_motion;
