//! Per-unit micro: runs the maneuver stack for every force unit that has
//! not already been commanded this tick.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::SquadIntent;
use skirmish_core::types::{Point2, SquadId, UnitTag};
use skirmish_tactics::grid::DangerGrid;
use skirmish_tactics::maneuver::{decide_unit, decide_withdrawal, ManeuverContext};
use skirmish_tactics::targeting::{TargetPicker, TargetScorer};

use crate::spatial::{NeighborBatch, QueryKey, UnitIndex};
use crate::squad::Squad;
use crate::systems::TickOutput;

pub struct MicroContext<'a> {
    pub units: &'a UnitIndex,
    pub batch: &'a NeighborBatch,
    pub config: &'a TacticsConfig,
    pub grid: &'a dyn DangerGrid,
    pub scorer: &'a dyn TargetScorer,
    pub picker: &'a TargetPicker,
    pub target: Point2,
    pub rally: Point2,
}

/// Run the maneuver stack for each force unit.
pub fn run(
    force: &[UnitTag],
    squads: &BTreeMap<SquadId, Squad>,
    ctx: &MicroContext<'_>,
    out: &mut TickOutput<'_>,
) {
    let retreating: BTreeSet<UnitTag> = squads
        .values()
        .filter(|s| s.intent == Some(SquadIntent::Retreat))
        .flat_map(|s| s.members.iter().copied())
        .collect();
    let radius = ctx
        .config
        .neighbor_query_radius
        .max(ctx.config.mine_detection_radius);

    for &tag in force {
        if out.was_commanded(tag) {
            continue;
        }
        let Some(unit) = ctx.units.get(tag) else {
            continue;
        };

        let near_enemies = ctx
            .batch
            .within(QueryKey::Unit(tag), unit.position, radius, ctx.units);
        let maneuver = ManeuverContext {
            unit,
            near_enemies: &near_enemies,
            grid: ctx.grid,
            config: ctx.config,
            scorer: ctx.scorer,
            picker: ctx.picker,
        };
        // Retreating units disengage toward the rally instead of fighting.
        let command = if retreating.contains(&tag) {
            decide_withdrawal(&maneuver, ctx.rally)
        } else {
            decide_unit(&maneuver, ctx.target)
        };
        if let Some(command) = command {
            out.command(command);
        }
    }
}
