//! Proximity grouping for squad formation.

use skirmish_core::types::UnitTag;
use skirmish_core::unit::Unit;

/// Grouping radius for a set of units: `count / mean footprint radius`
/// plus a fixed margin. An empty set yields just the margin.
pub fn formation_radius(units: &[&Unit], margin: f32) -> f32 {
    if units.is_empty() {
        return margin;
    }
    let mean_radius = units.iter().map(|u| u.radius).sum::<f32>() / units.len() as f32;
    if mean_radius <= f32::EPSILON || !mean_radius.is_finite() {
        return margin;
    }
    units.len() as f32 / mean_radius + margin
}

/// Single-linkage clustering: two units share a group if a chain of
/// units, each within `radius` of the next, connects them.
///
/// Groups come out ordered by their smallest tag, members sorted.
pub fn cluster(units: &[&Unit], radius: f32) -> Vec<Vec<UnitTag>> {
    let n = units.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let radius_sq = radius * radius;
    for i in 0..n {
        for j in (i + 1)..n {
            if units[i].position.distance_squared(units[j].position) <= radius_sq {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
    }

    let mut groups: Vec<(usize, Vec<UnitTag>)> = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, members)) => members.push(units[i].tag),
            None => groups.push((root, vec![units[i].tag])),
        }
    }

    let mut groups: Vec<Vec<UnitTag>> = groups
        .into_iter()
        .map(|(_, mut members)| {
            members.sort();
            members
        })
        .collect();
    groups.sort_by_key(|members| members[0]);
    groups
}
