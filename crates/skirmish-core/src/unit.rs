//! Per-tick unit snapshot.
//!
//! Units are owned by the host simulation. The engine only ever sees
//! these plain-data copies, taken once at the start of a tick.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::{Ability, Alliance, UnitKind};
use crate::types::{Point2, UnitTag};

/// Abilities currently available to a unit (off cooldown, researched,
/// not blocked by state).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilitySet(BTreeSet<Ability>);

impl AbilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, ability: Ability) -> bool {
        self.0.contains(&ability)
    }

    pub fn insert(&mut self, ability: Ability) {
        self.0.insert(ability);
    }

    pub fn remove(&mut self, ability: Ability) {
        self.0.remove(&ability);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Ability> for AbilitySet {
    fn from_iter<T: IntoIterator<Item = Ability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Snapshot of one unit as seen on the current tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub tag: UnitTag,
    pub kind: UnitKind,
    pub alliance: Alliance,
    pub position: Point2,
    /// Footprint radius in game units.
    pub radius: f32,
    /// Health fraction (0.0 - 1.0).
    pub health: f32,
    /// Shield fraction (0.0 - 1.0). Units without shields report 0.0.
    pub shield: f32,
    pub burrowed: bool,
    /// Whether the weapon is off cooldown.
    pub weapon_ready: bool,
    pub abilities: AbilitySet,
    /// Last-known sighting of a unit that is no longer visible.
    pub is_memory: bool,
}

impl Unit {
    /// A fresh, fully healthy, visible unit with no abilities.
    pub fn new(tag: UnitTag, kind: UnitKind, alliance: Alliance, position: Point2) -> Self {
        Self {
            tag,
            kind,
            alliance,
            position,
            radius: 0.5,
            health: 1.0,
            shield: 0.0,
            burrowed: false,
            weapon_ready: true,
            abilities: AbilitySet::new(),
            is_memory: false,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health;
        self
    }

    pub fn with_shield(mut self, shield: f32) -> Self {
        self.shield = shield;
        self
    }

    pub fn with_burrowed(mut self, burrowed: bool) -> Self {
        self.burrowed = burrowed;
        self
    }

    pub fn with_weapon_ready(mut self, ready: bool) -> Self {
        self.weapon_ready = ready;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.insert(ability);
        self
    }

    pub fn with_memory(mut self, is_memory: bool) -> Self {
        self.is_memory = is_memory;
        self
    }

    pub fn is_enemy(&self) -> bool {
        self.alliance == Alliance::Enemy
    }

    /// Distance between footprints' centers.
    pub fn distance_to(&self, other: &Unit) -> f32 {
        self.position.distance(other.position)
    }

    /// Whether either burrow ability is currently available.
    pub fn can_toggle_burrow(&self) -> bool {
        self.abilities.contains(Ability::BurrowDown) || self.abilities.contains(Ability::BurrowUp)
    }
}
