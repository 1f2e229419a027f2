//! Engine constants and default tuning parameters.
//!
//! Every tunable here has a matching field in `TacticsConfig`; these are
//! the values used when the config file omits it.

/// Game loops per game second at "faster" speed.
pub const TICK_RATE: f64 = 22.4;

// --- Burrow ---

/// Burrow when health fraction drops to or below this.
pub const BURROW_AT_HEALTH: f32 = 0.3;

/// Unburrow once health fraction has recovered to at least this.
pub const UNBURROW_AT_HEALTH: f32 = 0.9;

/// Enemy scan radius for the burrow decision (mines burrow on sight).
pub const MINE_DETECTION_RADIUS: f32 = 14.0;

// --- Individual micro ---

/// Shield fraction below which a unit disengages instead of fighting.
pub const LOW_SHIELD_THRESHOLD: f32 = 0.3;

/// Neighbor query radius around each force unit.
pub const NEIGHBOR_QUERY_RADIUS: f32 = 15.0;

/// How far a unit steps back while its weapon is on cooldown.
pub const STUTTER_STEP_DISTANCE: f32 = 2.5;

/// Search radius when looking for a safe spot on the danger grid.
pub const SAFE_SPOT_SEARCH_RADIUS: f32 = 12.0;

/// Distance at which a unit counts as having reached its objective.
pub const ARRIVAL_DISTANCE: f32 = 1.0;

// --- Targeting ---

/// Before this game time the army simply heads for the enemy start.
pub const EARLY_GAME_SECS: f64 = 240.0;

/// Enemies within this radius of the attack target count as defending it.
pub const TARGET_ENEMY_RADIUS: f32 = 20.0;

// --- Engagement ---

/// Army supply above which an active opening override forces the attack.
pub const OVERRIDE_SUPPLY_THRESHOLD: f32 = 6.0;

/// Strength ratio (own / enemy) cut points for the reference evaluator.
pub const WIN_STRONG_RATIO: f32 = 1.5;
pub const WIN_MARGINAL_RATIO: f32 = 1.1;
pub const TIE_RATIO: f32 = 0.9;
pub const LOSS_MARGINAL_RATIO: f32 = 0.6;

/// Own dps multiplier when good positioning is assumed.
pub const GOOD_POSITIONING_BONUS: f32 = 1.2;

/// Lowest contribution a far-away unit keeps under timing adjustment.
pub const TIMING_ADJUST_FLOOR: f32 = 0.25;

// --- Squads ---

/// Constant margin added to the derived formation radius.
pub const FORMATION_MARGIN: f32 = 2.0;

/// Rally point offset from the own natural toward the attack target.
pub const RALLY_OFFSET: f32 = 5.0;

/// Attack orders within this distance of the last one are duplicates.
pub const ATTACK_ORDER_TOLERANCE: f32 = 1.0;

// --- Defense ---

/// Enemies within this radius of a resource cluster start an episode.
pub const DEFENSE_RADIUS: f32 = 12.0;

/// Defenders below this health fraction fall back to the cluster center.
pub const DEFENDER_WITHDRAW_HEALTH: f32 = 0.25;
