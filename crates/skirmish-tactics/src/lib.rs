//! Tactical decision functions for the skirmish engine.
//!
//! Engagement scoring, target selection, the burrow decision, the
//! per-unit maneuver stack and squad grouping. Everything here is a pure
//! function of the tick's unit snapshot; persistent state lives in the
//! engine crate.

pub mod burrow;
pub mod engagement;
pub mod grid;
pub mod grouping;
pub mod maneuver;
pub mod profiles;
pub mod targeting;

pub use skirmish_core as core;
