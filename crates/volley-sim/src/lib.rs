//! Attack scheduling and simulation for the volley swarm.
//!
//! Owns the hecs ECS world, the attack scheduler and its pool of weapons,
//! runs systems at a fixed tick rate and produces `SwarmSnapshot`s.

pub mod engine;
pub mod handle;
pub mod pool;
pub mod prediction;
pub mod scheduler;
pub mod systems;
pub mod weapons;

pub use engine::SwarmEngine;
pub use handle::{AttackHandle, HandleArena, HandleError, HandleId};
pub use scheduler::AttackScheduler;
pub use volley_core as core;
