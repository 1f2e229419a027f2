//! Individual maneuver stack.
//!
//! Each unit gets a fresh stack every tick. Steps are tried in order and
//! the first one that produces a command ends the evaluation, so a unit
//! never receives more than one command from here per tick.

use skirmish_core::commands::{CommandTarget, UnitCommand};
use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::Ability;
use skirmish_core::types::{Point2, PointExt};
use skirmish_core::unit::Unit;

use crate::burrow::{self, BurrowThresholds};
use crate::grid::DangerGrid;
use crate::profiles::get_profile;
use crate::targeting::{TargetPicker, TargetScorer};

/// Everything a maneuver needs to decide for one unit.
pub struct ManeuverContext<'a> {
    pub unit: &'a Unit,
    /// Enemies around the unit, already trimmed to the neighbor radius.
    pub near_enemies: &'a [&'a Unit],
    pub grid: &'a dyn DangerGrid,
    pub config: &'a TacticsConfig,
    pub scorer: &'a dyn TargetScorer,
    pub picker: &'a TargetPicker,
}

/// One step of the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Maneuver {
    /// Dodge area-effect spells. Never fires.
    AvoidAoe,
    /// Toggle burrow per the hysteresis rule.
    Burrow,
    /// Fire on the best of `targets` if the weapon is ready.
    ShootTargetInRange { targets: Vec<Unit> },
    /// Move to the nearest safe spot unless already safe.
    KeepUnitSafe,
    /// Attack `target` when the weapon is ready, step back otherwise.
    StutterUnitBack { target: Unit },
    /// Take the next waypoint of a danger-aware path.
    PathUnitToTarget { target: Point2 },
    /// Plain move, used when no path is available.
    MoveDirect { target: Point2 },
}

impl Maneuver {
    /// Produce the command for this step, or `None` if it does not apply.
    pub fn execute(&self, ctx: &ManeuverContext<'_>) -> Option<UnitCommand> {
        let unit = ctx.unit;
        match self {
            Maneuver::AvoidAoe => None,

            Maneuver::Burrow => {
                let thresholds = BurrowThresholds::from(ctx.config);
                burrow::decide(unit, ctx.near_enemies, &thresholds)
                    .map(|ability| UnitCommand::single(ability, unit.tag, CommandTarget::None))
            }

            Maneuver::ShootTargetInRange { targets } => {
                if !unit.weapon_ready || targets.is_empty() {
                    return None;
                }
                let candidates: Vec<&Unit> = targets.iter().collect();
                ctx.picker
                    .pick(unit, &candidates, ctx.scorer)
                    .map(|t| attack_unit(unit, t))
            }

            Maneuver::KeepUnitSafe => {
                if ctx.grid.is_position_safe(unit.position) {
                    return None;
                }
                let spot = ctx
                    .grid
                    .find_safe_spot(unit.position, ctx.config.safe_spot_search_radius)?;
                Some(move_to(unit, spot))
            }

            Maneuver::StutterUnitBack { target } => {
                if unit.weapon_ready {
                    Some(attack_unit(unit, target))
                } else {
                    let away = unit
                        .position
                        .towards(target.position, -ctx.config.stutter_step_distance);
                    Some(move_to(unit, away))
                }
            }

            Maneuver::PathUnitToTarget { target } => ctx
                .grid
                .next_path_point(unit.position, *target)
                .map(|waypoint| move_to(unit, waypoint)),

            Maneuver::MoveDirect { target } => Some(move_to(unit, *target)),
        }
    }
}

fn attack_unit(unit: &Unit, target: &Unit) -> UnitCommand {
    UnitCommand::single(
        Ability::Attack,
        unit.tag,
        CommandTarget::Unit { tag: target.tag },
    )
}

fn move_to(unit: &Unit, point: Point2) -> UnitCommand {
    UnitCommand::single(Ability::Move, unit.tag, CommandTarget::point(point))
}

/// Ordered, short-circuiting list of maneuvers.
#[derive(Debug, Clone, Default)]
pub struct CombatManeuver {
    steps: Vec<Maneuver>,
}

impl CombatManeuver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, step: Maneuver) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[Maneuver] {
        &self.steps
    }

    /// First command any step produces.
    pub fn execute(&self, ctx: &ManeuverContext<'_>) -> Option<UnitCommand> {
        self.steps.iter().find_map(|step| step.execute(ctx))
    }
}

/// Enemies worth reacting to: visible now and not ignorable.
pub fn relevant_enemies<'a>(near_enemies: &[&'a Unit]) -> Vec<&'a Unit> {
    near_enemies
        .iter()
        .copied()
        .filter(|e| !e.is_memory && !get_profile(e.kind).ignorable)
        .collect()
}

/// Build the stack for one unit heading for `objective`.
pub fn plan_unit(ctx: &ManeuverContext<'_>, objective: Point2) -> CombatManeuver {
    let mut stack = CombatManeuver::new();
    stack.add(Maneuver::AvoidAoe);
    stack.add(Maneuver::Burrow);

    let unit = ctx.unit;
    if unit.burrowed {
        return stack;
    }

    let enemies = relevant_enemies(ctx.near_enemies);
    if !enemies.is_empty() {
        let in_range = ctx.picker.in_attack_range(unit, &enemies);
        let (units, structures): (Vec<&Unit>, Vec<&Unit>) = in_range
            .into_iter()
            .partition(|e| !get_profile(e.kind).is_structure);
        let shoot_at = if units.is_empty() { structures } else { units };
        if !shoot_at.is_empty() {
            stack.add(Maneuver::ShootTargetInRange {
                targets: shoot_at.into_iter().cloned().collect(),
            });
        }

        if let Some(target) = ctx.picker.pick(unit, &enemies, ctx.scorer) {
            let profile = get_profile(unit.kind);
            if profile.max_shield > 0.0 && unit.shield < ctx.config.low_shield_threshold {
                stack.add(Maneuver::KeepUnitSafe);
            } else {
                stack.add(Maneuver::StutterUnitBack {
                    target: target.clone(),
                });
            }
        }
        return stack;
    }

    if !unit.position.is_near(objective, ctx.config.arrival_distance) {
        stack.add(Maneuver::PathUnitToTarget { target: objective });
        stack.add(Maneuver::MoveDirect { target: objective });
    }
    stack
}

/// Build the stack for a unit whose squad is falling back to `rally`.
///
/// Same opening steps as [`plan_unit`], but enemies in contact never
/// pull the unit into a fight: it steps out of danger, then heads home.
pub fn plan_withdrawal(ctx: &ManeuverContext<'_>, rally: Point2) -> CombatManeuver {
    let mut stack = CombatManeuver::new();
    stack.add(Maneuver::AvoidAoe);
    stack.add(Maneuver::Burrow);

    let unit = ctx.unit;
    if unit.burrowed {
        return stack;
    }

    if !relevant_enemies(ctx.near_enemies).is_empty() {
        stack.add(Maneuver::KeepUnitSafe);
    }
    if !unit.position.is_near(rally, ctx.config.arrival_distance) {
        stack.add(Maneuver::PathUnitToTarget { target: rally });
        stack.add(Maneuver::MoveDirect { target: rally });
    }
    stack
}

/// Plan and execute in one go.
pub fn decide_unit(ctx: &ManeuverContext<'_>, objective: Point2) -> Option<UnitCommand> {
    execute_logged(ctx, plan_unit(ctx, objective))
}

/// Plan a withdrawal and execute it.
pub fn decide_withdrawal(ctx: &ManeuverContext<'_>, rally: Point2) -> Option<UnitCommand> {
    execute_logged(ctx, plan_withdrawal(ctx, rally))
}

fn execute_logged(ctx: &ManeuverContext<'_>, stack: CombatManeuver) -> Option<UnitCommand> {
    let command = stack.execute(ctx);
    if let Some(command) = &command {
        tracing::debug!(
            unit = ctx.unit.tag.0,
            ability = ?command.ability,
            "maneuver"
        );
    }
    command
}
