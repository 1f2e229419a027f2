//! Scenario definitions: hardcoded arena layouts.
//!
//! Each scenario fixes the map, the opening and both sides' starting
//! units. Unit placement is jittered by a seeded RNG, so the same seed
//! always produces the same arena.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skirmish_core::commands::CommandTarget;
use skirmish_core::enums::{Ability, UnitKind};
use skirmish_core::types::{ClusterId, Point2};

use crate::arena::{Arena, ArenaMap, Opening, Order};
use crate::collaborators::ResourceCluster;
use crate::roles::RoleBook;
use crate::world_setup;

/// Available scenarios.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// Two armies facing off across the map, enemy holding position.
    #[default]
    Standoff,
    /// Enemy light units run into the main mineral line.
    Raid,
    /// Widow mines and marines on a committed opening against a zerg push.
    Minefield,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 3] = [ScenarioId::Standoff, ScenarioId::Raid, ScenarioId::Minefield];
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioId::Standoff => "standoff",
            ScenarioId::Raid => "raid",
            ScenarioId::Minefield => "minefield",
        };
        f.write_str(name)
    }
}

impl FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioId::ALL
            .into_iter()
            .find(|id| id.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown scenario '{s}' (expected standoff, raid or minefield)"))
    }
}

const MAIN: ClusterId = ClusterId(0);
const NATURAL: ClusterId = ClusterId(1);

/// The shared two-base map.
pub fn default_map() -> ArenaMap {
    let own_start = Point2::new(16.0, 16.0);
    let own_natural = Point2::new(42.0, 22.0);
    ArenaMap {
        own_start,
        own_natural,
        enemy_start: Point2::new(130.0, 130.0),
        expansions: vec![
            Point2::new(108.0, 134.0),
            Point2::new(134.0, 108.0),
            Point2::new(90.0, 90.0),
        ],
        clusters: vec![
            ResourceCluster {
                id: MAIN,
                center: own_start,
                radius: 8.0,
            },
            ResourceCluster {
                id: NATURAL,
                center: own_natural,
                radius: 8.0,
            },
        ],
        supply_cap: 60.0,
    }
}

/// Build the arena and role book for a scenario.
pub fn build(scenario: ScenarioId, seed: u64) -> (Arena, RoleBook) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut roles = RoleBook::new();
    let map = default_map();
    let main = map.clusters[0];
    let natural = map.clusters[1];
    let enemy_start = map.enemy_start;

    match scenario {
        ScenarioId::Standoff => {
            let mut arena = Arena::new(map, Opening::default());
            world_setup::spawn_base(
                &mut arena, &mut roles, &mut rng, &main, UnitKind::Nexus, UnitKind::Probe, 8,
            );
            world_setup::spawn_army(
                &mut arena,
                &mut roles,
                &mut rng,
                &[(UnitKind::Stalker, 4), (UnitKind::Zealot, 4)],
                natural.center,
                4.0,
            );
            world_setup::spawn_enemy_group(
                &mut arena,
                &mut rng,
                &[(UnitKind::Zergling, 6), (UnitKind::Roach, 3)],
                Point2::new(80.0, 80.0),
                5.0,
                None,
            );
            world_setup::spawn_enemy_structures(
                &mut arena,
                &[
                    (UnitKind::Hatchery, enemy_start),
                    (UnitKind::SpawningPool, Point2::new(136.0, 124.0)),
                    (UnitKind::SpineCrawler, Point2::new(124.0, 124.0)),
                    (UnitKind::Hatchery, Point2::new(108.0, 134.0)),
                ],
            );
            (arena, roles)
        }
        ScenarioId::Raid => {
            let opening = Opening {
                complete_at_secs: 30.0,
                override_active: false,
            };
            let mut arena = Arena::new(map, opening);
            world_setup::spawn_base(
                &mut arena, &mut roles, &mut rng, &main, UnitKind::Nexus, UnitKind::Probe, 10,
            );
            world_setup::spawn_army(
                &mut arena,
                &mut roles,
                &mut rng,
                &[(UnitKind::Stalker, 2)],
                natural.center,
                3.0,
            );
            world_setup::spawn_enemy_group(
                &mut arena,
                &mut rng,
                &[(UnitKind::Zergling, 6)],
                Point2::new(40.0, 40.0),
                3.0,
                Some(Order {
                    ability: Ability::Attack,
                    target: CommandTarget::point(main.center),
                }),
            );
            world_setup::spawn_enemy_structures(&mut arena, &[(UnitKind::Hatchery, enemy_start)]);
            (arena, roles)
        }
        ScenarioId::Minefield => {
            let opening = Opening {
                complete_at_secs: 60.0,
                override_active: true,
            };
            let mut arena = Arena::new(map, opening);
            world_setup::spawn_base(
                &mut arena,
                &mut roles,
                &mut rng,
                &main,
                UnitKind::CommandCenter,
                UnitKind::Scv,
                8,
            );
            world_setup::spawn_army(
                &mut arena,
                &mut roles,
                &mut rng,
                &[(UnitKind::WidowMine, 3), (UnitKind::Marine, 6)],
                natural.center,
                4.0,
            );
            world_setup::spawn_enemy_group(
                &mut arena,
                &mut rng,
                &[
                    (UnitKind::Zergling, 8),
                    (UnitKind::Roach, 4),
                    (UnitKind::Overseer, 1),
                ],
                Point2::new(75.0, 60.0),
                5.0,
                Some(Order {
                    ability: Ability::Attack,
                    target: CommandTarget::point(natural.center),
                }),
            );
            world_setup::spawn_enemy_structures(&mut arena, &[(UnitKind::Hatchery, enemy_start)]);
            (arena, roles)
        }
    }
}
