//! Enumeration types used throughout the engine.

use serde::{Deserialize, Serialize};

/// Estimated outcome of a hypothetical fight between two unit sets.
/// Variants are declared weakest first, so the derived ordering is the
/// ordinal used by the attack decision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EngagementResult {
    LossStrong,
    LossMarginal,
    Tie,
    WinMarginal,
    WinStrong,
}

impl EngagementResult {
    /// Numeric ordinal, 0 (LossStrong) through 4 (WinStrong).
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Abilities the engine can order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Ability {
    /// Attack a unit, or attack-move to a point.
    Attack,
    /// Plain move, ignoring enemies on the way.
    Move,
    BurrowDown,
    BurrowUp,
}

/// Behavioral role held by a unit. Role membership is owned by the
/// role registry collaborator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum UnitRole {
    Attacking,
    Defending,
    Gathering,
    Harassing,
    Scouting,
}

/// Playable race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    #[default]
    Protoss,
    Terran,
    Zerg,
}

/// Which side a unit belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alliance {
    #[default]
    Own,
    Enemy,
}

/// Unit type tag. Per-type statistics live in the tactics crate's profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    // --- Workers ---
    Probe,
    Scv,
    Drone,

    // --- Army ---
    Zealot,
    Stalker,
    Adept,
    DarkTemplar,
    Observer,
    Marine,
    Marauder,
    WidowMine,
    Raven,
    Zergling,
    Roach,
    Hydralisk,
    Queen,
    Overseer,

    // --- Ignorable ---
    Larva,
    Egg,

    // --- Structures ---
    Nexus,
    Pylon,
    Gateway,
    PhotonCannon,
    ShieldBattery,
    CommandCenter,
    SupplyDepot,
    Barracks,
    Bunker,
    MissileTurret,
    Hatchery,
    SpawningPool,
    SpineCrawler,
    SporeCrawler,
}

/// Alert severity for operator-visible notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    #[default]
    Info,
    Warning,
    Critical,
}

/// Group-level intent chosen for a squad on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SquadIntent {
    Attack,
    Retreat,
}
