//! Engagement evaluation: fight or withdraw.
//!
//! `evaluate` is a pure function of the two unit sets. The attack
//! decision layered on top adds the opening override and the supply-cap
//! clause.

use skirmish_core::config::EngagementOptions;
use skirmish_core::constants::*;
use skirmish_core::enums::EngagementResult;
use skirmish_core::types::{centroid, Point2};
use skirmish_core::unit::Unit;

use crate::profiles::get_profile;

/// Scores a hypothetical fight between two unit sets.
///
/// Implementations must be monotone: making one side strictly stronger
/// never moves the result toward that side losing.
pub trait EngagementEvaluator {
    fn evaluate(
        &self,
        own: &[&Unit],
        enemy: &[&Unit],
        options: EngagementOptions,
    ) -> EngagementResult;
}

/// Reference evaluator: Lanchester square-law strength ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrengthEvaluator;

impl EngagementEvaluator for StrengthEvaluator {
    fn evaluate(
        &self,
        own: &[&Unit],
        enemy: &[&Unit],
        options: EngagementOptions,
    ) -> EngagementResult {
        if own.is_empty() {
            return EngagementResult::LossStrong;
        }
        if enemy.is_empty() {
            return EngagementResult::WinStrong;
        }

        // Only our own arrival is discounted; the enemy is scored at full
        // strength so nothing on our side can raise it.
        let enemy_center = centroid(enemy.iter().map(|u| u.position));

        let (Some(own_strength), Some(enemy_strength)) = (
            side_strength(own, enemy_center, options, true),
            side_strength(enemy, None, options, false),
        ) else {
            tracing::warn!(
                own = own.len(),
                enemy = enemy.len(),
                "malformed unit statistics in engagement input, assuming the worst"
            );
            return EngagementResult::LossStrong;
        };

        classify_strengths(own_strength, enemy_strength)
    }
}

/// Square-law strength of one side: total dps times total effective hp.
/// Returns `None` if any unit carries non-finite or negative statistics.
///
/// Positioning and timing adjustments apply to the own side only; timing
/// discounts each unit by its distance to `opposing_center`.
pub fn side_strength(
    units: &[&Unit],
    opposing_center: Option<Point2>,
    options: EngagementOptions,
    is_own_side: bool,
) -> Option<f32> {
    let mut total_dps = 0.0f32;
    let mut total_hp = 0.0f32;

    for unit in units {
        if !(unit.health.is_finite() && unit.shield.is_finite()) {
            return None;
        }
        if unit.health < 0.0 || unit.shield < 0.0 || !unit.position.is_finite() {
            return None;
        }

        let profile = get_profile(unit.kind);
        if profile.ignorable {
            continue;
        }

        let mut dps = profile.dps;
        if options.workers_do_no_damage && profile.is_worker {
            dps = 0.0;
        }
        if is_own_side && options.good_positioning {
            dps *= GOOD_POSITIONING_BONUS;
        }
        if is_own_side && options.timing_adjust {
            if let Some(center) = opposing_center {
                dps *= arrival_factor(unit.position.distance(center), profile.range);
            }
        }

        total_dps += dps;
        total_hp +=
            profile.max_health * unit.health.min(1.0) + profile.max_shield * unit.shield.min(1.0);
    }

    Some(total_dps * total_hp)
}

/// Share of a unit's damage that arrives in time, by how far outside its
/// weapon range it stands.
fn arrival_factor(distance: f32, range: f32) -> f32 {
    let reach = range.max(1.0);
    if distance <= reach {
        1.0
    } else {
        (reach / distance).max(TIMING_ADJUST_FLOOR)
    }
}

/// Map two side strengths onto the ordinal scale.
pub fn classify_strengths(own: f32, enemy: f32) -> EngagementResult {
    if enemy <= 0.0 {
        return if own > 0.0 {
            EngagementResult::WinStrong
        } else {
            EngagementResult::Tie
        };
    }
    classify_ratio(own / enemy)
}

/// Map an own/enemy strength ratio onto the ordinal scale.
pub fn classify_ratio(ratio: f32) -> EngagementResult {
    if ratio >= WIN_STRONG_RATIO {
        EngagementResult::WinStrong
    } else if ratio >= WIN_MARGINAL_RATIO {
        EngagementResult::WinMarginal
    } else if ratio > TIE_RATIO {
        EngagementResult::Tie
    } else if ratio > LOSS_MARGINAL_RATIO {
        EngagementResult::LossMarginal
    } else {
        EngagementResult::LossStrong
    }
}

/// Inputs to the attack decision besides the engagement result.
#[derive(Debug, Clone, Copy)]
pub struct AttackContext {
    /// Build-order collaborator reports a committed rush-style opening.
    pub opening_override_active: bool,
    /// Army supply currently fielded.
    pub own_supply: f32,
    /// Supply cap remaining; zero or less means nothing more can be built.
    pub supply_left: f32,
    pub override_supply_threshold: f32,
}

/// Whether a force should engage.
pub fn should_attack(ctx: &AttackContext, result: EngagementResult) -> bool {
    let override_wins =
        ctx.opening_override_active && ctx.own_supply > ctx.override_supply_threshold;
    let favourable = result > EngagementResult::LossMarginal;
    let capped = ctx.supply_left <= 0.0;
    override_wins || favourable || capped
}
