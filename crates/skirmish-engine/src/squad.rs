//! Squad and defense-episode data model.
//!
//! Stored in `TacticsEngine`'s maps and carried across ticks. Unit data
//! itself is never stored here, only tags.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::enums::{Ability, SquadIntent};
use skirmish_core::state::SquadView;
use skirmish_core::types::{Point2, PointExt, SquadId, UnitTag};

/// The last group order a squad sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IssuedOrder {
    pub intent: SquadIntent,
    pub ability: Ability,
    pub target: Point2,
    pub tick: u64,
}

impl IssuedOrder {
    /// Whether `other` is the same order, with targets compared within
    /// `tolerance`.
    pub fn matches(&self, other: &IssuedOrder, tolerance: f32) -> bool {
        self.intent == other.intent
            && self.ability == other.ability
            && self.target.is_near(other.target, tolerance)
    }
}

/// A group of force units that decide and move together.
#[derive(Debug, Clone)]
pub struct Squad {
    pub id: SquadId,
    pub members: BTreeSet<UnitTag>,
    pub centroid: Point2,
    pub intent: Option<SquadIntent>,
    pub last_order: Option<IssuedOrder>,
}

impl Squad {
    pub fn new(id: SquadId, members: impl IntoIterator<Item = UnitTag>) -> Self {
        Self {
            id,
            members: members.into_iter().collect(),
            centroid: Point2::ZERO,
            intent: None,
            last_order: None,
        }
    }

    /// Record `order` unless it repeats the last one. Returns true if the
    /// order is new and should be sent.
    pub fn record_order(&mut self, order: IssuedOrder, tolerance: f32) -> bool {
        if let Some(last) = &self.last_order {
            if last.matches(&order, tolerance) {
                return false;
            }
        }
        self.last_order = Some(order);
        true
    }

    pub fn view(&self) -> SquadView {
        SquadView {
            squad_id: self.id,
            members: self.members.iter().copied().collect(),
            centroid: (self.centroid.x, self.centroid.y),
            intent: self.intent,
            last_order: self.last_order.map(|o| o.ability),
        }
    }
}

/// How a defender was last commanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefenderOrder {
    Attack(UnitTag),
    Withdraw,
}

/// One continuous stretch of enemy presence at a resource cluster.
#[derive(Debug, Clone, Default)]
pub struct DefenseEpisode {
    /// Defenders and the order each was last given.
    pub defenders: BTreeMap<UnitTag, Option<DefenderOrder>>,
    pub started_tick: u64,
}
