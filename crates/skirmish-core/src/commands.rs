//! Unit commands emitted by the engine.
//!
//! Commands are fire-and-forget: the engine pushes them into a sink and
//! never waits on the outcome.

use serde::{Deserialize, Serialize};

use crate::enums::Ability;
use crate::types::{Point2, UnitTag};

/// What a command is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CommandTarget {
    /// Self-targeted abilities (burrow).
    None,
    Position { x: f32, y: f32 },
    Unit { tag: UnitTag },
}

impl CommandTarget {
    pub fn point(p: Point2) -> Self {
        CommandTarget::Position { x: p.x, y: p.y }
    }

    /// The target as a point, if it is one.
    pub fn as_point(&self) -> Option<Point2> {
        match *self {
            CommandTarget::Position { x, y } => Some(Point2::new(x, y)),
            _ => None,
        }
    }
}

/// A single order for one or more units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitCommand {
    pub ability: Ability,
    pub units: Vec<UnitTag>,
    pub target: CommandTarget,
}

impl UnitCommand {
    /// Order for a single unit.
    pub fn single(ability: Ability, unit: UnitTag, target: CommandTarget) -> Self {
        Self {
            ability,
            units: vec![unit],
            target,
        }
    }

    /// Same order for a group of units.
    pub fn group(ability: Ability, units: Vec<UnitTag>, target: CommandTarget) -> Self {
        Self {
            ability,
            units,
            target,
        }
    }
}
