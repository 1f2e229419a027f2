//! Tunable engine configuration.
//!
//! Every threshold the decision code consults lives here. A TOML file may
//! override any subset; omitted keys keep the defaults from `constants`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SkirmishError};

/// Assumptions handed to the engagement evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementOptions {
    /// Discount units that are too far away to join the fight in time.
    pub timing_adjust: bool,
    /// Assume our army is well positioned (concave, high ground).
    pub good_positioning: bool,
    /// Workers are counted as bodies but deal no damage.
    pub workers_do_no_damage: bool,
}

impl Default for EngagementOptions {
    fn default() -> Self {
        Self {
            timing_adjust: false,
            good_positioning: false,
            workers_do_no_damage: true,
        }
    }
}

/// Configuration for the tactical engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticsConfig {
    // === Burrow ===
    /// Burrow at or below this health fraction.
    pub burrow_at_health: f32,
    /// Unburrow at or above this health fraction.
    ///
    /// Must stay above `burrow_at_health`; the gap between the two is the
    /// hysteresis band.
    pub unburrow_at_health: f32,
    /// Enemy scan radius used by the burrow decision.
    pub mine_detection_radius: f32,

    // === Individual micro ===
    pub low_shield_threshold: f32,
    pub neighbor_query_radius: f32,
    pub stutter_step_distance: f32,
    pub safe_spot_search_radius: f32,
    pub arrival_distance: f32,

    // === Targeting ===
    pub early_game_secs: f64,
    pub target_enemy_radius: f32,

    // === Engagement ===
    pub override_supply_threshold: f32,
    pub engagement: EngagementOptions,

    // === Squads ===
    pub formation_margin: f32,
    pub rally_offset: f32,
    pub attack_order_tolerance: f32,

    // === Defense ===
    pub defense_radius: f32,
    pub defender_withdraw_health: f32,
}

impl Default for TacticsConfig {
    fn default() -> Self {
        Self {
            burrow_at_health: BURROW_AT_HEALTH,
            unburrow_at_health: UNBURROW_AT_HEALTH,
            mine_detection_radius: MINE_DETECTION_RADIUS,
            low_shield_threshold: LOW_SHIELD_THRESHOLD,
            neighbor_query_radius: NEIGHBOR_QUERY_RADIUS,
            stutter_step_distance: STUTTER_STEP_DISTANCE,
            safe_spot_search_radius: SAFE_SPOT_SEARCH_RADIUS,
            arrival_distance: ARRIVAL_DISTANCE,
            early_game_secs: EARLY_GAME_SECS,
            target_enemy_radius: TARGET_ENEMY_RADIUS,
            override_supply_threshold: OVERRIDE_SUPPLY_THRESHOLD,
            engagement: EngagementOptions::default(),
            formation_margin: FORMATION_MARGIN,
            rally_offset: RALLY_OFFSET,
            attack_order_tolerance: ATTACK_ORDER_TOLERANCE,
            defense_radius: DEFENSE_RADIUS,
            defender_withdraw_health: DEFENDER_WITHDRAW_HEALTH,
        }
    }
}

impl TacticsConfig {
    /// Load and validate a config from a TOML file.
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: TacticsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the decision invariants.
    pub fn validate(&self) -> Result<()> {
        let fraction = |name: &str, v: f32| {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(SkirmishError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {v}"
                )))
            }
        };
        fraction("burrow_at_health", self.burrow_at_health)?;
        fraction("unburrow_at_health", self.unburrow_at_health)?;
        fraction("low_shield_threshold", self.low_shield_threshold)?;
        fraction("defender_withdraw_health", self.defender_withdraw_health)?;

        if self.burrow_at_health >= self.unburrow_at_health {
            return Err(SkirmishError::InvalidConfig(format!(
                "burrow_at_health ({}) must be below unburrow_at_health ({})",
                self.burrow_at_health, self.unburrow_at_health
            )));
        }

        let radii = [
            ("mine_detection_radius", self.mine_detection_radius),
            ("neighbor_query_radius", self.neighbor_query_radius),
            ("target_enemy_radius", self.target_enemy_radius),
            ("defense_radius", self.defense_radius),
        ];
        for (name, r) in radii {
            if !(r.is_finite() && r > 0.0) {
                return Err(SkirmishError::InvalidConfig(format!(
                    "{name} must be a positive distance, got {r}"
                )));
            }
        }
        Ok(())
    }

    /// Largest radius any consumer of the per-tick neighbor batch needs.
    pub fn batch_query_radius(&self) -> f32 {
        self.neighbor_query_radius
            .max(self.mine_detection_radius)
            .max(self.target_enemy_radius)
            .max(self.defense_radius)
    }
}
