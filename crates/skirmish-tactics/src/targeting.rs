//! Target selection.
//!
//! The macro attack point is a time-phased policy over what is currently
//! visible; the per-unit target is picked among enemies in range, units
//! before structures, structures by a fixed priority list.

use std::cmp::Ordering;

use skirmish_core::enums::UnitKind;
use skirmish_core::types::{Point2, UnitTag};
use skirmish_core::unit::Unit;

use crate::profiles::get_profile;

/// Where the army should be heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTarget {
    pub position: Point2,
    /// Structure the point was taken from, if any.
    pub structure: Option<UnitTag>,
}

impl AttackTarget {
    pub fn point(position: Point2) -> Self {
        Self {
            position,
            structure: None,
        }
    }
}

/// Cursor over the known expansion locations. Moves to the next location
/// (wrapping around) only once the current one has been seen.
#[derive(Debug, Clone)]
pub struct ExpansionCursor {
    locations: Vec<Point2>,
    next_index: usize,
    current: Point2,
}

impl ExpansionCursor {
    /// Starts on `initial`; the expansion list is only entered once that
    /// point has been scouted.
    pub fn new(initial: Point2, locations: Vec<Point2>) -> Self {
        Self {
            locations,
            next_index: 0,
            current: initial,
        }
    }

    pub fn current(&self) -> Point2 {
        self.current
    }

    /// Advance if the current location is visible. Returns the location
    /// to head for.
    pub fn advance_if_visible(&mut self, is_visible: impl Fn(Point2) -> bool) -> Point2 {
        if !self.locations.is_empty() && is_visible(self.current) {
            self.current = self.locations[self.next_index];
            self.next_index = (self.next_index + 1) % self.locations.len();
        }
        self.current
    }
}

/// Chooses the macro attack point once per tick.
#[derive(Debug, Clone)]
pub struct AttackTargetSelector {
    enemy_start: Point2,
    cursor: ExpansionCursor,
    early_game_secs: f64,
}

impl AttackTargetSelector {
    pub fn new(enemy_start: Point2, expansions: Vec<Point2>, early_game_secs: f64) -> Self {
        Self {
            enemy_start,
            cursor: ExpansionCursor::new(enemy_start, expansions),
            early_game_secs,
        }
    }

    pub fn enemy_start(&self) -> Point2 {
        self.enemy_start
    }

    pub fn cursor(&self) -> &ExpansionCursor {
        &self.cursor
    }

    /// `enemy_units` may contain anything; only visible enemy structures
    /// are considered.
    pub fn attack_target(
        &mut self,
        time_secs: f64,
        enemy_units: &[&Unit],
        is_visible: impl Fn(Point2) -> bool,
    ) -> AttackTarget {
        if time_secs < self.early_game_secs {
            return AttackTarget::point(self.enemy_start);
        }

        let start = self.enemy_start;
        let farthest = enemy_units
            .iter()
            .filter(|u| u.is_enemy() && !u.is_memory && get_profile(u.kind).is_structure)
            .max_by(|a, b| {
                a.position
                    .distance_squared(start)
                    .total_cmp(&b.position.distance_squared(start))
                    .then_with(|| b.tag.cmp(&a.tag))
            });

        if let Some(structure) = farthest {
            tracing::info!(
                kind = ?structure.kind,
                x = structure.position.x,
                y = structure.position.y,
                "farthest visible enemy structure"
            );
            return AttackTarget {
                position: structure.position,
                structure: Some(structure.tag),
            };
        }

        AttackTarget::point(self.cursor.advance_if_visible(is_visible))
    }
}

/// Scores how worthwhile a candidate is for an attacker. Higher is better.
pub trait TargetScorer {
    fn score(&self, attacker: &Unit, candidate: &Unit) -> f32;
}

/// Damage output per remaining effective hit point: kill what hurts most
/// and dies fastest.
#[derive(Debug, Clone, Copy, Default)]
pub struct LethalityScorer;

impl TargetScorer for LethalityScorer {
    fn score(&self, _attacker: &Unit, candidate: &Unit) -> f32 {
        let profile = get_profile(candidate.kind);
        let hp = profile.max_health * candidate.health + profile.max_shield * candidate.shield;
        profile.dps / hp.max(1.0)
    }
}

/// Defensive and detection structures first.
pub const DEFAULT_STRUCTURE_PRIORITY: &[UnitKind] = &[
    UnitKind::PhotonCannon,
    UnitKind::Bunker,
    UnitKind::SpineCrawler,
    UnitKind::MissileTurret,
    UnitKind::SporeCrawler,
    UnitKind::ShieldBattery,
    UnitKind::Pylon,
    UnitKind::SupplyDepot,
    UnitKind::Nexus,
    UnitKind::CommandCenter,
    UnitKind::Hatchery,
];

/// Per-unit target picker.
#[derive(Debug, Clone, Copy)]
pub struct TargetPicker {
    structure_priority: &'static [UnitKind],
}

impl Default for TargetPicker {
    fn default() -> Self {
        Self {
            structure_priority: DEFAULT_STRUCTURE_PRIORITY,
        }
    }
}

impl TargetPicker {
    pub fn with_priority(structure_priority: &'static [UnitKind]) -> Self {
        Self { structure_priority }
    }

    fn structure_rank(&self, kind: UnitKind) -> usize {
        self.structure_priority
            .iter()
            .position(|k| *k == kind)
            .unwrap_or(self.structure_priority.len())
    }

    /// Candidates the attacker can hit without moving.
    pub fn in_attack_range<'a>(&self, attacker: &Unit, candidates: &[&'a Unit]) -> Vec<&'a Unit> {
        let profile = get_profile(attacker.kind);
        if !profile.has_weapon() {
            return Vec::new();
        }
        candidates
            .iter()
            .copied()
            .filter(|c| attacker.distance_to(c) <= profile.range + attacker.radius + c.radius)
            .collect()
    }

    /// Best target among `candidates`: live units first, then structures
    /// by priority; ties broken by the scorer, then by distance.
    pub fn pick<'a>(
        &self,
        attacker: &Unit,
        candidates: &[&'a Unit],
        scorer: &dyn TargetScorer,
    ) -> Option<&'a Unit> {
        let live = candidates
            .iter()
            .copied()
            .filter(|c| c.health > 0.0 && !c.is_memory);

        let by_score = |a: &&Unit, b: &&Unit| -> Ordering {
            scorer
                .score(attacker, a)
                .total_cmp(&scorer.score(attacker, b))
                .then_with(|| {
                    attacker
                        .distance_to(b)
                        .total_cmp(&attacker.distance_to(a))
                })
                .then_with(|| b.tag.cmp(&a.tag))
        };

        let units: Vec<&Unit> = live
            .clone()
            .filter(|c| !get_profile(c.kind).is_structure)
            .collect();
        if !units.is_empty() {
            return units.into_iter().max_by(by_score);
        }

        live.filter(|c| get_profile(c.kind).is_structure)
            .max_by(|a, b| {
                self.structure_rank(b.kind)
                    .cmp(&self.structure_rank(a.kind))
                    .then_with(|| by_score(a, b))
            })
    }
}
