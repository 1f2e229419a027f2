//! Per-tick unit index and the shared neighbor batch.
//!
//! All neighbor lookups for a tick come from one spatial query issued
//! with the largest radius any consumer needs. The result is frozen into
//! a `NeighborBatch` that every consumer reads and trims to its own
//! radius.

use std::collections::{BTreeMap, HashMap};

use skirmish_core::types::{ClusterId, Point2, UnitTag};
use skirmish_core::unit::Unit;

use crate::collaborators::{QueryFilter, ResourceCluster, SpatialQuery};

/// The tick's unit snapshot, keyed by tag.
#[derive(Debug, Clone, Default)]
pub struct UnitIndex {
    units: BTreeMap<UnitTag, Unit>,
}

impl UnitIndex {
    pub fn new(units: Vec<Unit>) -> Self {
        Self {
            units: units.into_iter().map(|u| (u.tag, u)).collect(),
        }
    }

    pub fn get(&self, tag: UnitTag) -> Option<&Unit> {
        self.units.get(&tag)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every enemy unit, memory sightings included.
    pub fn enemies(&self) -> Vec<&Unit> {
        self.units.values().filter(|u| u.is_enemy()).collect()
    }

    /// Own units for the given tags, skipping tags that are missing from
    /// the snapshot or belong to the enemy.
    pub fn own_units(&self, tags: &[UnitTag]) -> Vec<&Unit> {
        tags.iter()
            .filter_map(|tag| self.get(*tag))
            .filter(|u| !u.is_enemy())
            .collect()
    }
}

/// What a neighbor list was queried around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Unit(UnitTag),
    AttackTarget,
    Cluster(ClusterId),
}

/// Immutable neighbor lists for one tick.
#[derive(Debug, Clone, Default)]
pub struct NeighborBatch {
    radius: f32,
    lists: HashMap<QueryKey, Vec<UnitTag>>,
}

impl NeighborBatch {
    /// Issue the tick's single spatial query: one point per force unit,
    /// one for the attack target and one per resource cluster.
    pub fn build(
        spatial: &dyn SpatialQuery,
        force: &[&Unit],
        attack_target: Option<Point2>,
        clusters: &[ResourceCluster],
        radius: f32,
    ) -> Self {
        let mut keys = Vec::with_capacity(force.len() + clusters.len() + 1);
        let mut points = Vec::with_capacity(keys.capacity());

        for unit in force {
            keys.push(QueryKey::Unit(unit.tag));
            points.push(unit.position);
        }
        if let Some(target) = attack_target {
            keys.push(QueryKey::AttackTarget);
            points.push(target);
        }
        for cluster in clusters {
            keys.push(QueryKey::Cluster(cluster.id));
            points.push(cluster.center);
        }

        if points.is_empty() {
            return Self {
                radius,
                lists: HashMap::new(),
            };
        }

        let results = spatial.query(&points, radius, QueryFilter::AllEnemy);
        if results.len() != points.len() {
            tracing::warn!(
                expected = points.len(),
                got = results.len(),
                "spatial query returned a mismatched number of lists"
            );
        }

        let lists = keys.into_iter().zip(results).collect();
        Self { radius, lists }
    }

    /// Radius the batch was queried with.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Raw neighbor tags for `key`; empty if the key was never queried.
    pub fn neighbors(&self, key: QueryKey) -> &[UnitTag] {
        self.lists.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbors of `key` within `radius` of `center`, resolved against
    /// the snapshot. Tags missing from the snapshot are dropped.
    pub fn within<'a>(
        &self,
        key: QueryKey,
        center: Point2,
        radius: f32,
        units: &'a UnitIndex,
    ) -> Vec<&'a Unit> {
        let radius_sq = radius * radius;
        self.neighbors(key)
            .iter()
            .filter_map(|tag| units.get(*tag))
            .filter(|u| u.position.distance_squared(center) <= radius_sq)
            .collect()
    }
}
