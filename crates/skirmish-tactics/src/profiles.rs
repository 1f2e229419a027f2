//! Per-type unit profiles.
//!
//! Consolidates the static statistics the decision code needs for each
//! unit kind.

use skirmish_core::enums::{Race, UnitKind};

/// Static profile for a unit kind.
#[derive(Debug, Clone, Copy)]
pub struct UnitProfile {
    pub race: Race,
    /// Supply cost.
    pub supply: f32,
    pub max_health: f32,
    pub max_shield: f32,
    /// Damage per second against ground targets.
    pub dps: f32,
    /// Ground weapon range, edge to edge. Zero for unarmed kinds.
    pub range: f32,
    /// Movement speed (game units per second).
    pub speed: f32,
    /// Footprint radius.
    pub radius: f32,
    pub is_structure: bool,
    pub is_worker: bool,
    pub is_detector: bool,
    pub is_flying: bool,
    /// Mine-type: burrows on sight of any enemy, ignores health.
    pub is_mine: bool,
    pub can_burrow: bool,
    /// Never worth targeting or reacting to (larvae, eggs).
    pub ignorable: bool,
}

impl UnitProfile {
    fn base(race: Race, supply: f32, max_health: f32, max_shield: f32) -> Self {
        Self {
            race,
            supply,
            max_health,
            max_shield,
            dps: 0.0,
            range: 0.0,
            speed: 0.0,
            radius: 0.5,
            is_structure: false,
            is_worker: false,
            is_detector: false,
            is_flying: false,
            is_mine: false,
            can_burrow: false,
            ignorable: false,
        }
    }

    fn armed(mut self, dps: f32, range: f32, speed: f32, radius: f32) -> Self {
        self.dps = dps;
        self.range = range;
        self.speed = speed;
        self.radius = radius;
        self
    }

    fn structure(mut self, radius: f32) -> Self {
        self.is_structure = true;
        self.radius = radius;
        self
    }

    fn worker(mut self) -> Self {
        self.is_worker = true;
        self
    }

    fn detector(mut self) -> Self {
        self.is_detector = true;
        self
    }

    fn flying(mut self) -> Self {
        self.is_flying = true;
        self
    }

    fn burrower(mut self) -> Self {
        self.can_burrow = true;
        self
    }

    /// Whether the kind has a weapon that can hit ground units.
    pub fn has_weapon(&self) -> bool {
        self.dps > 0.0
    }
}

/// Melee reach, edge to edge.
const MELEE: f32 = 0.1;

/// Get the profile for a given unit kind.
pub fn get_profile(kind: UnitKind) -> UnitProfile {
    use Race::*;

    match kind {
        UnitKind::Probe => UnitProfile::base(Protoss, 1.0, 20.0, 20.0)
            .armed(4.67, MELEE, 3.94, 0.375)
            .worker(),
        UnitKind::Scv => UnitProfile::base(Terran, 1.0, 45.0, 0.0)
            .armed(4.67, MELEE, 3.94, 0.375)
            .worker(),
        UnitKind::Drone => UnitProfile::base(Zerg, 1.0, 40.0, 0.0)
            .armed(4.67, MELEE, 3.94, 0.375)
            .worker()
            .burrower(),

        UnitKind::Zealot => UnitProfile::base(Protoss, 2.0, 100.0, 50.0).armed(18.6, MELEE, 3.15, 0.5),
        UnitKind::Stalker => UnitProfile::base(Protoss, 2.0, 80.0, 80.0).armed(9.7, 6.0, 4.13, 0.625),
        UnitKind::Adept => UnitProfile::base(Protoss, 2.0, 70.0, 70.0).armed(6.2, 4.0, 3.5, 0.5),
        UnitKind::DarkTemplar => {
            UnitProfile::base(Protoss, 2.0, 40.0, 80.0).armed(37.2, MELEE, 3.94, 0.5)
        }
        UnitKind::Observer => UnitProfile::base(Protoss, 1.0, 40.0, 30.0)
            .armed(0.0, 0.0, 2.63, 0.5)
            .detector()
            .flying(),
        UnitKind::Marine => UnitProfile::base(Terran, 1.0, 45.0, 0.0).armed(9.8, 5.0, 3.15, 0.375),
        UnitKind::Marauder => UnitProfile::base(Terran, 2.0, 125.0, 0.0).armed(9.3, 6.0, 3.15, 0.5625),
        UnitKind::WidowMine => {
            let mut mine = UnitProfile::base(Terran, 2.0, 90.0, 0.0)
                .armed(10.0, 5.0, 3.94, 0.5)
                .burrower();
            mine.is_mine = true;
            mine
        }
        UnitKind::Raven => UnitProfile::base(Terran, 2.0, 140.0, 0.0)
            .armed(0.0, 0.0, 3.85, 0.625)
            .detector()
            .flying(),
        UnitKind::Zergling => UnitProfile::base(Zerg, 0.5, 35.0, 0.0)
            .armed(10.0, MELEE, 4.13, 0.375)
            .burrower(),
        UnitKind::Roach => UnitProfile::base(Zerg, 2.0, 145.0, 0.0)
            .armed(11.2, 4.0, 3.15, 0.625)
            .burrower(),
        UnitKind::Hydralisk => UnitProfile::base(Zerg, 2.0, 90.0, 0.0)
            .armed(22.4, 5.0, 3.15, 0.625)
            .burrower(),
        UnitKind::Queen => UnitProfile::base(Zerg, 2.0, 175.0, 0.0)
            .armed(11.2, 5.0, 1.31, 0.875)
            .burrower(),
        UnitKind::Overseer => UnitProfile::base(Zerg, 0.0, 200.0, 0.0)
            .armed(0.0, 0.0, 2.62, 1.0)
            .detector()
            .flying(),

        UnitKind::Larva | UnitKind::Egg => {
            let mut profile = UnitProfile::base(Zerg, 0.0, 25.0, 0.0);
            profile.ignorable = true;
            profile
        }

        UnitKind::Nexus => UnitProfile::base(Protoss, 0.0, 1000.0, 1000.0).structure(2.75),
        UnitKind::Pylon => UnitProfile::base(Protoss, 0.0, 200.0, 200.0).structure(1.0),
        UnitKind::Gateway => UnitProfile::base(Protoss, 0.0, 500.0, 500.0).structure(1.75),
        UnitKind::PhotonCannon => UnitProfile::base(Protoss, 0.0, 150.0, 150.0)
            .armed(22.4, 7.0, 0.0, 1.125)
            .structure(1.125)
            .detector(),
        UnitKind::ShieldBattery => UnitProfile::base(Protoss, 0.0, 150.0, 150.0).structure(1.0),
        UnitKind::CommandCenter => UnitProfile::base(Terran, 0.0, 1500.0, 0.0).structure(2.75),
        UnitKind::SupplyDepot => UnitProfile::base(Terran, 0.0, 400.0, 0.0).structure(1.0),
        UnitKind::Barracks => UnitProfile::base(Terran, 0.0, 1000.0, 0.0).structure(1.75),
        UnitKind::Bunker => UnitProfile::base(Terran, 0.0, 400.0, 0.0)
            .armed(39.2, 6.0, 0.0, 1.5)
            .structure(1.5),
        UnitKind::MissileTurret => UnitProfile::base(Terran, 0.0, 250.0, 0.0)
            .structure(1.0)
            .detector(),
        UnitKind::Hatchery => UnitProfile::base(Zerg, 0.0, 1500.0, 0.0).structure(2.75),
        UnitKind::SpawningPool => UnitProfile::base(Zerg, 0.0, 1000.0, 0.0).structure(1.75),
        UnitKind::SpineCrawler => UnitProfile::base(Zerg, 0.0, 300.0, 0.0)
            .armed(18.9, 7.0, 0.0, 1.0)
            .structure(1.0),
        UnitKind::SporeCrawler => UnitProfile::base(Zerg, 0.0, 400.0, 0.0)
            .structure(1.0)
            .detector(),
    }
}

pub fn is_structure(kind: UnitKind) -> bool {
    get_profile(kind).is_structure
}

pub fn is_detector(kind: UnitKind) -> bool {
    get_profile(kind).is_detector
}

pub fn is_ignorable(kind: UnitKind) -> bool {
    get_profile(kind).ignorable
}
