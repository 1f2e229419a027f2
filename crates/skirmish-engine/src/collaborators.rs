//! Contracts the engine consumes from the host.
//!
//! The game client, pathing, role bookkeeping and the build order are
//! all owned elsewhere. The engine only talks to them through these
//! traits, once per tick, and never blocks on any of them.

use skirmish_core::commands::UnitCommand;
use skirmish_core::enums::UnitRole;
use skirmish_core::types::{ClusterId, Point2, SimTime, UnitTag};
use skirmish_core::unit::Unit;
use skirmish_tactics::engagement::EngagementEvaluator;
use skirmish_tactics::grid::DangerGrid;
use skirmish_tactics::targeting::TargetScorer;

/// An owned mining base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceCluster {
    pub id: ClusterId,
    pub center: Point2,
    /// Harvesters within this distance of `center` belong to the cluster.
    pub radius: f32,
}

/// Read-only view of the game state for the current tick.
pub trait GameView {
    fn time(&self) -> SimTime;

    /// Snapshot of every known unit, own and enemy, ordered by tag.
    fn units(&self) -> Vec<Unit>;

    /// Whether any own unit currently has vision of `position`.
    fn is_visible(&self, position: Point2) -> bool;

    fn enemy_start_location(&self) -> Point2;

    /// Own natural expansion, the anchor for the rally point.
    fn own_natural(&self) -> Point2;

    /// Known expansion locations in cycling order.
    fn expansion_locations(&self) -> Vec<Point2>;

    fn resource_clusters(&self) -> Vec<ResourceCluster>;

    /// Supply used by own army units.
    fn supply_army(&self) -> f32;

    /// Supply cap headroom.
    fn supply_left(&self) -> f32;
}

/// Which units a spatial query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryFilter {
    AllEnemy,
    EnemyGround,
}

/// Batched radius search.
pub trait SpatialQuery {
    /// For each query point, the tags of matching units within `radius`.
    /// The result has one entry per point, in the same order.
    fn query(&self, points: &[Point2], radius: f32, filter: QueryFilter) -> Vec<Vec<UnitTag>>;
}

/// Role membership, owned by the host.
pub trait RoleRegistry {
    fn members(&self, role: UnitRole) -> Vec<UnitTag>;

    fn assign(&mut self, tag: UnitTag, role: UnitRole);

    /// Return the unit to whatever role it held before its last assignment.
    fn release(&mut self, tag: UnitTag);
}

pub trait BuildOrderStatus {
    fn build_order_complete(&self) -> bool;

    /// The opening is a committed rush that should attack regardless of
    /// the engagement estimate.
    fn opening_override_active(&self) -> bool;
}

/// Where commands go. Sends never fail and never block.
pub trait CommandSink {
    fn send(&mut self, command: UnitCommand);
}

impl CommandSink for Vec<UnitCommand> {
    fn send(&mut self, command: UnitCommand) {
        self.push(command);
    }
}

/// Read-only collaborators for one tick.
pub struct TickInputs<'a> {
    pub game: &'a dyn GameView,
    pub spatial: &'a dyn SpatialQuery,
    pub grid: &'a dyn DangerGrid,
    pub build_order: &'a dyn BuildOrderStatus,
    pub evaluator: &'a dyn EngagementEvaluator,
    pub scorer: &'a dyn TargetScorer,
}
