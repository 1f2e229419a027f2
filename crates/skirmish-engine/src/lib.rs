//! Tactical decision engine for a real-time strategy bot.
//!
//! Owns the decision state carried across ticks, runs the per-tick
//! decision systems against host collaborators, and ships a headless
//! reference arena (hecs world) plus a harness for deterministic runs.

pub mod arena;
pub mod collaborators;
pub mod engine;
pub mod harness;
pub mod roles;
pub mod scenario;
pub mod spatial;
pub mod squad;
pub mod systems;
pub mod world_setup;

pub use engine::TacticsEngine;
pub use harness::{MatchConfig, Skirmish};
pub use skirmish_core as core;

#[cfg(test)]
mod tests;
