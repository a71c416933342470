//! Core types and definitions for the volley attacker-swarm simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometric types, commands, snapshots, strike events, constants and
//! the configuration surface. It has no dependency on the ECS or on the
//! curve engine.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
