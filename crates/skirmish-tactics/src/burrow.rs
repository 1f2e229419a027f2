//! Burrow decision with a hysteresis band.
//!
//! This is the only place that decides burrow transitions. Mines burrow
//! on sight; everything else burrows when hurt or detected and comes
//! back up only once healed past the upper threshold.

use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::Ability;
use skirmish_core::unit::Unit;

use crate::profiles::get_profile;

/// Thresholds for the burrow decision.
#[derive(Debug, Clone, Copy)]
pub struct BurrowThresholds {
    pub burrow_at_health: f32,
    pub unburrow_at_health: f32,
    pub detection_radius: f32,
}

impl From<&TacticsConfig> for BurrowThresholds {
    fn from(config: &TacticsConfig) -> Self {
        Self {
            burrow_at_health: config.burrow_at_health,
            unburrow_at_health: config.unburrow_at_health,
            detection_radius: config.mine_detection_radius,
        }
    }
}

/// Decide whether `unit` should toggle its burrow state this tick.
///
/// `near_enemies` may extend beyond the detection radius and may hold
/// remembered or ignorable units; both are trimmed here. Returns the ability to use, or `None` when the unit is already
/// in its target state or cannot burrow right now.
pub fn decide(unit: &Unit, near_enemies: &[&Unit], thresholds: &BurrowThresholds) -> Option<Ability> {
    if !unit.can_toggle_burrow() {
        return None;
    }

    let profile = get_profile(unit.kind);
    let radius_sq = thresholds.detection_radius * thresholds.detection_radius;
    let mut in_range = near_enemies
        .iter()
        .filter(|e| !e.is_memory && !get_profile(e.kind).ignorable)
        .filter(|e| e.position.distance_squared(unit.position) <= radius_sq);

    let wanted = if profile.is_mine {
        let enemy_present = in_range.next().is_some();
        match (unit.burrowed, enemy_present) {
            (false, true) => Some(Ability::BurrowDown),
            (true, false) => Some(Ability::BurrowUp),
            _ => None,
        }
    } else if profile.can_burrow {
        let has_detector = in_range.any(|e| get_profile(e.kind).is_detector);
        if unit.burrowed {
            (unit.health >= thresholds.unburrow_at_health && !has_detector)
                .then_some(Ability::BurrowUp)
        } else {
            (unit.health <= thresholds.burrow_at_health || has_detector)
                .then_some(Ability::BurrowDown)
        }
    } else {
        None
    };

    wanted.filter(|ability| unit.abilities.contains(*ability))
}
