//! Resource cluster defense.
//!
//! While enemies stand near an owned cluster, its harvesters are pulled
//! into the defending role and fight back; once the cluster is clear
//! they go back to whatever they were doing. Alerts fire once per
//! episode.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::commands::{CommandTarget, UnitCommand};
use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::{Ability, AlertLevel, UnitRole};
use skirmish_core::events::TacticalEvent;
use skirmish_core::types::ClusterId;
use skirmish_core::unit::Unit;
use skirmish_tactics::maneuver::relevant_enemies;

use crate::collaborators::{ResourceCluster, RoleRegistry};
use crate::spatial::{NeighborBatch, QueryKey, UnitIndex};
use crate::squad::{DefenderOrder, DefenseEpisode};
use crate::systems::TickOutput;

/// Run the defense pass over every owned cluster.
#[allow(clippy::too_many_arguments)]
pub fn run(
    episodes: &mut BTreeMap<ClusterId, DefenseEpisode>,
    clusters: &[ResourceCluster],
    batch: &NeighborBatch,
    units: &UnitIndex,
    roles: &mut dyn RoleRegistry,
    config: &TacticsConfig,
    tick: u64,
    out: &mut TickOutput<'_>,
) {
    for cluster in clusters {
        let near = batch.within(
            QueryKey::Cluster(cluster.id),
            cluster.center,
            config.defense_radius,
            units,
        );
        let threats = relevant_enemies(&near);

        if threats.is_empty() {
            if let Some(episode) = episodes.remove(&cluster.id) {
                end_episode(cluster.id, episode, roles, out);
            }
            continue;
        }

        let episode = match episodes.entry(cluster.id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::info!(
                    cluster = cluster.id.0,
                    threats = threats.len(),
                    "enemies at resource cluster"
                );
                out.alert(
                    AlertLevel::Warning,
                    format!(
                        "{} enemy units near resource cluster {}",
                        threats.len(),
                        cluster.id.0
                    ),
                );
                out.event(TacticalEvent::ThreatDetected {
                    cluster: cluster.id,
                    threats: threats.len(),
                });
                entry.insert(DefenseEpisode {
                    started_tick: tick,
                    ..Default::default()
                })
            }
        };

        episode.defenders.retain(|tag, _| units.get(*tag).is_some());
        recruit(episode, cluster, units, roles);
        command_defenders(episode, cluster, &threats, units, config, out);
    }

    // Clusters that no longer exist end their episodes too.
    let live: BTreeSet<ClusterId> = clusters.iter().map(|c| c.id).collect();
    let gone: Vec<ClusterId> = episodes
        .keys()
        .filter(|id| !live.contains(id))
        .copied()
        .collect();
    for id in gone {
        if let Some(episode) = episodes.remove(&id) {
            end_episode(id, episode, roles, out);
        }
    }
}

/// Pull every harvester within the cluster radius into the episode.
fn recruit(
    episode: &mut DefenseEpisode,
    cluster: &ResourceCluster,
    units: &UnitIndex,
    roles: &mut dyn RoleRegistry,
) {
    let radius_sq = cluster.radius * cluster.radius;
    for tag in roles.members(UnitRole::Gathering) {
        let Some(unit) = units.get(tag) else {
            tracing::warn!(unit = tag.0, "gathering role member missing from snapshot");
            continue;
        };
        if unit.is_enemy() || unit.position.distance_squared(cluster.center) > radius_sq {
            continue;
        }
        roles.assign(tag, UnitRole::Defending);
        episode.defenders.insert(tag, None);
    }
}

/// Retaliate-and-withdraw; resend only when a defender's order changes.
fn command_defenders(
    episode: &mut DefenseEpisode,
    cluster: &ResourceCluster,
    threats: &[&Unit],
    units: &UnitIndex,
    config: &TacticsConfig,
    out: &mut TickOutput<'_>,
) {
    for (tag, last) in episode.defenders.iter_mut() {
        let Some(unit) = units.get(*tag) else {
            continue;
        };

        let order = if unit.health < config.defender_withdraw_health {
            DefenderOrder::Withdraw
        } else {
            let Some(nearest) = threats.iter().min_by(|a, b| {
                unit.distance_to(a)
                    .total_cmp(&unit.distance_to(b))
                    .then_with(|| a.tag.cmp(&b.tag))
            }) else {
                continue;
            };
            DefenderOrder::Attack(nearest.tag)
        };

        if *last == Some(order) {
            continue;
        }
        *last = Some(order);

        let command = match order {
            DefenderOrder::Attack(target) => UnitCommand::single(
                Ability::Attack,
                *tag,
                CommandTarget::Unit { tag: target },
            ),
            DefenderOrder::Withdraw => UnitCommand::single(
                Ability::Move,
                *tag,
                CommandTarget::point(cluster.center),
            ),
        };
        out.command(command);
    }
}

fn end_episode(
    cluster: ClusterId,
    episode: DefenseEpisode,
    roles: &mut dyn RoleRegistry,
    out: &mut TickOutput<'_>,
) {
    let released = episode.defenders.len();
    for tag in episode.defenders.into_keys() {
        roles.release(tag);
    }
    tracing::info!(cluster = cluster.0, released, "resource cluster clear");
    out.event(TacticalEvent::ThreatCleared { cluster, released });
}
