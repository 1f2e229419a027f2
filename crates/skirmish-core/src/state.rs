//! Tick report: everything the engine decided on one tick.

use serde::{Deserialize, Serialize};

use crate::commands::UnitCommand;
use crate::enums::*;
use crate::events::{Alert, TacticalEvent};
use crate::types::{SimTime, SquadId, UnitTag};

/// Summary returned from every engine tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub time: SimTime,
    /// Macro attack point for this tick, `None` when there is no force.
    pub attack_target: Option<(f32, f32)>,
    /// Whether the build-order collaborator reported its opening as done.
    pub build_order_complete: bool,
    /// Every command sent to the sink this tick, in emission order.
    pub commands: Vec<UnitCommand>,
    pub alerts: Vec<Alert>,
    pub events: Vec<TacticalEvent>,
    pub squads: Vec<SquadView>,
    /// Units currently reassigned to defend a resource cluster.
    pub defenders: Vec<UnitTag>,
}

/// Squad status for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadView {
    pub squad_id: SquadId,
    pub members: Vec<UnitTag>,
    pub centroid: (f32, f32),
    pub intent: Option<SquadIntent>,
    pub last_order: Option<Ability>,
}
