//! Squad coordination.
//!
//! Keeps squad membership in line with the force, groups newcomers into
//! new squads, decides attack or retreat per squad and sends group
//! orders only when they differ from the squad's last one.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::commands::{CommandTarget, UnitCommand};
use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::{Ability, SquadIntent};
use skirmish_core::events::TacticalEvent;
use skirmish_core::types::{centroid, Point2, SquadId, UnitTag};
use skirmish_core::unit::Unit;
use skirmish_tactics::burrow::{self, BurrowThresholds};
use skirmish_tactics::engagement::{should_attack, AttackContext, EngagementEvaluator};
use skirmish_tactics::grouping::{cluster, formation_radius};
use skirmish_tactics::maneuver::relevant_enemies;

use crate::spatial::{NeighborBatch, QueryKey, UnitIndex};
use crate::squad::{IssuedOrder, Squad};
use crate::systems::TickOutput;

/// Read-only inputs to the squad pass.
pub struct SquadTickContext<'a> {
    pub units: &'a UnitIndex,
    pub batch: &'a NeighborBatch,
    pub config: &'a TacticsConfig,
    pub evaluator: &'a dyn EngagementEvaluator,
    pub attack: AttackContext,
    pub target: Point2,
    pub rally: Point2,
    pub tick: u64,
}

/// Run the squad pass for the current force.
pub fn run(
    squads: &mut BTreeMap<SquadId, Squad>,
    next_squad_id: &mut u32,
    force: &[UnitTag],
    ctx: &SquadTickContext<'_>,
    out: &mut TickOutput<'_>,
) {
    reconcile(squads, force, out);
    form_new_squads(squads, next_squad_id, force, ctx, out);

    for squad in squads.values_mut() {
        decide_and_order(squad, ctx, out);
    }
}

/// Drop members that left the force, then drop empty squads.
pub fn reconcile(
    squads: &mut BTreeMap<SquadId, Squad>,
    force: &[UnitTag],
    out: &mut TickOutput<'_>,
) {
    let force: BTreeSet<UnitTag> = force.iter().copied().collect();
    squads.retain(|id, squad| {
        squad.members.retain(|tag| force.contains(tag));
        if squad.members.is_empty() {
            tracing::debug!(squad = id.0, "squad dissolved");
            out.event(TacticalEvent::SquadDissolved { squad: *id });
            false
        } else {
            true
        }
    });
}

/// Partition force members not yet in a squad into new squads.
pub fn form_new_squads(
    squads: &mut BTreeMap<SquadId, Squad>,
    next_squad_id: &mut u32,
    force: &[UnitTag],
    ctx: &SquadTickContext<'_>,
    out: &mut TickOutput<'_>,
) {
    let assigned: BTreeSet<UnitTag> = squads
        .values()
        .flat_map(|s| s.members.iter().copied())
        .collect();
    let unassigned: Vec<UnitTag> = force
        .iter()
        .copied()
        .filter(|tag| !assigned.contains(tag))
        .collect();
    let newcomers = ctx.units.own_units(&unassigned);
    if newcomers.is_empty() {
        return;
    }

    let radius = formation_radius(&newcomers, ctx.config.formation_margin);
    for members in cluster(&newcomers, radius) {
        let id = SquadId(*next_squad_id);
        *next_squad_id += 1;
        tracing::debug!(squad = id.0, size = members.len(), radius, "squad formed");
        out.event(TacticalEvent::SquadFormed {
            squad: id,
            size: members.len(),
        });
        squads.insert(id, Squad::new(id, members));
    }
}

/// Enemies a squad weighs its decision against: those around the macro
/// target plus those in any member's neighbor list.
fn nearby_enemies<'a>(
    members: &[&Unit],
    ctx: &SquadTickContext<'a>,
) -> Vec<&'a Unit> {
    let mut seen: BTreeMap<UnitTag, &'a Unit> = BTreeMap::new();
    let around_target = ctx.batch.within(
        QueryKey::AttackTarget,
        ctx.target,
        ctx.config.target_enemy_radius,
        ctx.units,
    );
    for enemy in around_target {
        seen.insert(enemy.tag, enemy);
    }
    for member in members {
        for enemy in in_contact(member, ctx) {
            seen.insert(enemy.tag, enemy);
        }
    }
    let all: Vec<&'a Unit> = seen.into_values().collect();
    relevant_enemies(&all)
}

/// Relevant enemies in a member's neighbor list.
fn in_contact<'a>(member: &Unit, ctx: &SquadTickContext<'a>) -> Vec<&'a Unit> {
    let near = ctx.batch.within(
        QueryKey::Unit(member.tag),
        member.position,
        ctx.config.neighbor_query_radius,
        ctx.units,
    );
    relevant_enemies(&near)
}

/// Whether the burrow stage will toggle `member` this tick.
fn burrows_now(member: &Unit, thresholds: &BurrowThresholds, ctx: &SquadTickContext<'_>) -> bool {
    let near = ctx.batch.within(
        QueryKey::Unit(member.tag),
        member.position,
        thresholds.detection_radius,
        ctx.units,
    );
    burrow::decide(member, &near, thresholds).is_some()
}

fn decide_and_order(squad: &mut Squad, ctx: &SquadTickContext<'_>, out: &mut TickOutput<'_>) {
    let tags: Vec<UnitTag> = squad.members.iter().copied().collect();
    let members = ctx.units.own_units(&tags);
    if members.is_empty() {
        return;
    }
    if let Some(center) = centroid(members.iter().map(|u| u.position)) {
        squad.centroid = center;
    }

    let enemies = nearby_enemies(&members, ctx);
    let result = ctx
        .evaluator
        .evaluate(&members, &enemies, ctx.config.engagement);
    let intent = if should_attack(&ctx.attack, result) {
        SquadIntent::Attack
    } else {
        SquadIntent::Retreat
    };
    tracing::debug!(
        squad = squad.id.0,
        members = members.len(),
        enemies = enemies.len(),
        ?result,
        ?intent,
        "squad decision"
    );

    if squad.intent != Some(intent) {
        out.event(TacticalEvent::IntentChanged {
            squad: squad.id,
            intent,
        });
        squad.intent = Some(intent);
    }

    // Burrowed units and units about to toggle burrow are left to the
    // maneuver stack.
    let thresholds = BurrowThresholds::from(ctx.config);
    let movable: Vec<&Unit> = members
        .iter()
        .copied()
        .filter(|u| !u.burrowed && !burrows_now(u, &thresholds, ctx))
        .collect();
    if movable.is_empty() {
        return;
    }

    match intent {
        SquadIntent::Attack => {
            let order = IssuedOrder {
                intent,
                ability: Ability::Attack,
                target: ctx.target,
                tick: ctx.tick,
            };
            if squad.record_order(order, ctx.config.attack_order_tolerance) {
                out.command(UnitCommand::group(
                    Ability::Attack,
                    movable.iter().map(|u| u.tag).collect(),
                    CommandTarget::point(ctx.target),
                ));
            }
        }
        SquadIntent::Retreat => {
            let radius = formation_radius(&members, ctx.config.formation_margin);
            let order = IssuedOrder {
                intent,
                ability: Ability::Move,
                target: ctx.rally,
                tick: ctx.tick,
            };
            if !squad.record_order(order, radius) {
                return;
            }

            let (engaged, free): (Vec<&Unit>, Vec<&Unit>) = movable
                .into_iter()
                .partition(|u| !in_contact(u, ctx).is_empty());
            let radius_sq = radius * radius;
            let stragglers: Vec<UnitTag> = free
                .iter()
                .filter(|u| u.position.distance_squared(ctx.rally) > radius_sq)
                .map(|u| u.tag)
                .collect();

            if !stragglers.is_empty() {
                out.command(UnitCommand::group(
                    Ability::Move,
                    stragglers,
                    CommandTarget::point(ctx.rally),
                ));
            }
            if !engaged.is_empty() {
                out.command(UnitCommand::group(
                    Ability::Move,
                    engaged.iter().map(|u| u.tag).collect(),
                    CommandTarget::point(ctx.rally),
                ));
            }
        }
    }
}
