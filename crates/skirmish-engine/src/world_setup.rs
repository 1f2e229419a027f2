//! Spawn factories for populating an arena.
//!
//! Own units are registered with the role book as they are created:
//! workers gather, army units attack.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::enums::{Alliance, UnitKind, UnitRole};
use skirmish_core::types::{Point2, UnitTag};

use crate::arena::{Arena, Order};
use crate::collaborators::{ResourceCluster, RoleRegistry};
use crate::roles::RoleBook;

/// Spawn a town hall on the cluster center and `workers` harvesters
/// scattered around it.
pub fn spawn_base(
    arena: &mut Arena,
    roles: &mut RoleBook,
    rng: &mut ChaCha8Rng,
    cluster: &ResourceCluster,
    hall: UnitKind,
    worker: UnitKind,
    workers: usize,
) -> Vec<UnitTag> {
    arena.spawn(hall, Alliance::Own, cluster.center);
    (0..workers)
        .map(|_| {
            let position = scatter(rng, cluster.center, cluster.radius * 0.6);
            let tag = arena.spawn(worker, Alliance::Own, position);
            roles.assign(tag, UnitRole::Gathering);
            tag
        })
        .collect()
}

/// Spawn own army units around `around` and put them in the attacking role.
pub fn spawn_army(
    arena: &mut Arena,
    roles: &mut RoleBook,
    rng: &mut ChaCha8Rng,
    composition: &[(UnitKind, usize)],
    around: Point2,
    spread: f32,
) -> Vec<UnitTag> {
    let mut tags = Vec::new();
    for &(kind, count) in composition {
        for _ in 0..count {
            let tag = arena.spawn(kind, Alliance::Own, scatter(rng, around, spread));
            roles.assign(tag, UnitRole::Attacking);
            tags.push(tag);
        }
    }
    tags
}

/// Spawn enemy units around `around`, optionally with a standing order.
pub fn spawn_enemy_group(
    arena: &mut Arena,
    rng: &mut ChaCha8Rng,
    composition: &[(UnitKind, usize)],
    around: Point2,
    spread: f32,
    order: Option<Order>,
) -> Vec<UnitTag> {
    let mut tags = Vec::new();
    for &(kind, count) in composition {
        for _ in 0..count {
            let tag = arena.spawn(kind, Alliance::Enemy, scatter(rng, around, spread));
            if let Some(order) = order {
                arena.set_order(tag, order);
            }
            tags.push(tag);
        }
    }
    tags
}

/// Spawn enemy structures at fixed spots.
pub fn spawn_enemy_structures(arena: &mut Arena, structures: &[(UnitKind, Point2)]) -> Vec<UnitTag> {
    structures
        .iter()
        .map(|&(kind, position)| arena.spawn(kind, Alliance::Enemy, position))
        .collect()
}

/// Uniform random point in a disc.
fn scatter(rng: &mut ChaCha8Rng, around: Point2, spread: f32) -> Point2 {
    if spread <= 0.0 {
        return around;
    }
    let angle: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let radius: f32 = spread * rng.gen_range(0.0f32..1.0).sqrt();
    around + Point2::new(angle.cos(), angle.sin()) * radius
}
