//! Tests for the tactical engine, its systems and the reference arena.

use std::cell::Cell;
use std::collections::BTreeSet;

use proptest::prelude::*;

use skirmish_core::commands::{CommandTarget, UnitCommand};
use skirmish_core::config::{EngagementOptions, TacticsConfig};
use skirmish_core::enums::*;
use skirmish_core::events::TacticalEvent;
use skirmish_core::state::TickReport;
use skirmish_core::types::{ClusterId, Point2, PointExt, SimTime, SquadId, UnitTag};
use skirmish_core::unit::Unit;
use skirmish_tactics::engagement::{EngagementEvaluator, StrengthEvaluator};
use skirmish_tactics::grid::OpenGrid;
use skirmish_tactics::targeting::{LethalityScorer, TargetPicker};

use crate::arena::{Arena, Order};
use crate::collaborators::*;
use crate::engine::TacticsEngine;
use crate::harness::{MatchConfig, Skirmish};
use crate::roles::RoleBook;
use crate::scenario::{self, ScenarioId};
use crate::spatial::{NeighborBatch, QueryKey, UnitIndex};
use crate::squad::{IssuedOrder, Squad};

// ---- Test doubles ----

/// Scripted game state. Every enemy is visible and every point is seen.
struct MockGame {
    time: SimTime,
    units: Vec<Unit>,
    enemy_start: Point2,
    natural: Point2,
    expansions: Vec<Point2>,
    clusters: Vec<ResourceCluster>,
    supply_army: f32,
    supply_left: f32,
    override_active: bool,
    queries: Cell<usize>,
}

impl MockGame {
    fn new(units: Vec<Unit>) -> Self {
        Self {
            time: SimTime::from_secs(100.0),
            units,
            enemy_start: Point2::new(100.0, 100.0),
            natural: Point2::new(10.0, 0.0),
            expansions: vec![Point2::new(60.0, 90.0)],
            clusters: Vec::new(),
            supply_army: 20.0,
            supply_left: 40.0,
            override_active: false,
            queries: Cell::new(0),
        }
    }

    fn set_unit(&mut self, unit: Unit) {
        self.units.retain(|u| u.tag != unit.tag);
        self.units.push(unit);
    }

    fn remove_unit(&mut self, tag: u64) {
        self.units.retain(|u| u.tag != UnitTag(tag));
    }
}

impl GameView for MockGame {
    fn time(&self) -> SimTime {
        self.time
    }
    fn units(&self) -> Vec<Unit> {
        let mut units = self.units.clone();
        units.sort_by_key(|u| u.tag);
        units
    }
    fn is_visible(&self, _position: Point2) -> bool {
        true
    }
    fn enemy_start_location(&self) -> Point2 {
        self.enemy_start
    }
    fn own_natural(&self) -> Point2 {
        self.natural
    }
    fn expansion_locations(&self) -> Vec<Point2> {
        self.expansions.clone()
    }
    fn resource_clusters(&self) -> Vec<ResourceCluster> {
        self.clusters.clone()
    }
    fn supply_army(&self) -> f32 {
        self.supply_army
    }
    fn supply_left(&self) -> f32 {
        self.supply_left
    }
}

impl SpatialQuery for MockGame {
    fn query(&self, points: &[Point2], radius: f32, _filter: QueryFilter) -> Vec<Vec<UnitTag>> {
        self.queries.set(self.queries.get() + 1);
        points
            .iter()
            .map(|p| {
                self.units
                    .iter()
                    .filter(|u| u.is_enemy() && u.position.is_near(*p, radius))
                    .map(|u| u.tag)
                    .collect()
            })
            .collect()
    }
}

impl BuildOrderStatus for MockGame {
    fn build_order_complete(&self) -> bool {
        true
    }
    fn opening_override_active(&self) -> bool {
        self.override_active
    }
}

/// Evaluator that always returns the same verdict.
struct FixedEvaluator(EngagementResult);

impl EngagementEvaluator for FixedEvaluator {
    fn evaluate(&self, _own: &[&Unit], _enemy: &[&Unit], _o: EngagementOptions) -> EngagementResult {
        self.0
    }
}

fn own(tag: u64, kind: UnitKind, x: f32, y: f32) -> Unit {
    Unit::new(UnitTag(tag), kind, Alliance::Own, Point2::new(x, y))
}

fn enemy(tag: u64, kind: UnitKind, x: f32, y: f32) -> Unit {
    Unit::new(UnitTag(tag), kind, Alliance::Enemy, Point2::new(x, y))
}

fn roles_with(attacking: &[u64], gathering: &[u64]) -> RoleBook {
    let mut roles = RoleBook::new();
    for &t in attacking {
        roles.assign(UnitTag(t), UnitRole::Attacking);
    }
    for &t in gathering {
        roles.assign(UnitTag(t), UnitRole::Gathering);
    }
    roles
}

fn run_tick(
    engine: &mut TacticsEngine,
    game: &MockGame,
    evaluator: &dyn EngagementEvaluator,
    roles: &mut RoleBook,
) -> (TickReport, Vec<UnitCommand>) {
    let grid = OpenGrid::default();
    let inputs = TickInputs {
        game,
        spatial: game,
        grid: &grid,
        build_order: game,
        evaluator,
        scorer: &LethalityScorer,
    };
    let mut sink = Vec::new();
    let report = engine.tick(&inputs, roles, &mut sink);
    (report, sink)
}

fn group_attacks(commands: &[UnitCommand]) -> usize {
    commands
        .iter()
        .filter(|c| c.ability == Ability::Attack && matches!(c.target, CommandTarget::Position { .. }))
        .count()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    for scenario in ScenarioId::ALL {
        let config = MatchConfig {
            seed: 12345,
            scenario,
            ..Default::default()
        };
        let mut a = Skirmish::new(config.clone());
        let mut b = Skirmish::new(config);

        for _ in 0..300 {
            let json_a = serde_json::to_string(&a.step()).unwrap();
            let json_b = serde_json::to_string(&b.step()).unwrap();
            assert_eq!(json_a, json_b, "Reports diverged with same seed in {scenario}");
        }
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut a = Skirmish::new(MatchConfig {
        seed: 111,
        ..Default::default()
    });
    let mut b = Skirmish::new(MatchConfig {
        seed: 222,
        ..Default::default()
    });

    let diverged = (0..100).any(|_| {
        serde_json::to_string(&a.step()).unwrap() != serde_json::to_string(&b.step()).unwrap()
    });
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Tick pipeline ----

#[test]
fn test_single_spatial_query_per_tick() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
        own(3, UnitKind::Probe, 50.0, 50.0),
        enemy(10, UnitKind::Zergling, 5.0, 0.0),
    ]);
    game.clusters = vec![ResourceCluster {
        id: ClusterId(0),
        center: Point2::new(50.0, 50.0),
        radius: 8.0,
    }];
    let mut roles = roles_with(&[1, 2], &[3]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(game.queries.get(), 1);
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(game.queries.get(), 2);
}

#[test]
fn test_neighbor_batch_trims_locally() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        enemy(10, UnitKind::Zergling, 5.0, 0.0),
        enemy(11, UnitKind::Zergling, 18.0, 0.0),
    ]);
    let units = UnitIndex::new(game.units());
    let force = units.own_units(&[UnitTag(1)]);
    let batch = NeighborBatch::build(&game, &force, None, &[], 20.0);

    assert_eq!(batch.neighbors(QueryKey::Unit(UnitTag(1))).len(), 2);
    let near = batch.within(QueryKey::Unit(UnitTag(1)), Point2::ZERO, 10.0, &units);
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].tag, UnitTag(10));
    assert!(batch.neighbors(QueryKey::AttackTarget).is_empty());
}

#[test]
fn test_no_force_means_no_target() {
    let game = MockGame::new(vec![own(3, UnitKind::Probe, 0.0, 0.0)]);
    let mut roles = roles_with(&[], &[3]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(report.attack_target.is_none());
    assert!(sink.is_empty());
    assert!(report.squads.is_empty());
}

#[test]
fn test_missing_role_member_is_skipped() {
    let game = MockGame::new(vec![own(1, UnitKind::Marine, 0.0, 0.0)]);
    let mut roles = roles_with(&[1, 99], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.squads.len(), 1);
    assert_eq!(report.squads[0].members, vec![UnitTag(1)]);
}

#[test]
fn test_report_mirrors_sink() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.commands, sink);
    assert!(report.build_order_complete);
}

// ---- Macro target ----

#[test]
fn test_early_game_target_is_enemy_start() {
    let game = MockGame::new(vec![own(1, UnitKind::Marine, 0.0, 0.0)]);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.attack_target, Some((100.0, 100.0)));
    assert!(report
        .events
        .contains(&TacticalEvent::AttackTargetChanged { x: 100.0, y: 100.0 }));

    // Same target next tick: no repeat event.
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(!report
        .events
        .iter()
        .any(|e| matches!(e, TacticalEvent::AttackTargetChanged { .. })));
}

#[test]
fn test_late_game_target_is_farthest_structure() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        enemy(20, UnitKind::Hatchery, 100.0, 90.0),
        enemy(21, UnitKind::Hatchery, 100.0, 60.0),
    ]);
    game.time = SimTime::from_secs(300.0);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.attack_target, Some((100.0, 60.0)));
}

#[test]
fn test_late_game_cycles_expansions_without_structures() {
    let mut game = MockGame::new(vec![own(1, UnitKind::Marine, 0.0, 0.0)]);
    game.time = SimTime::from_secs(300.0);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    // Everything is visible, so the start is consumed on the first tick.
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.attack_target, Some((60.0, 90.0)));
    assert_eq!(
        engine.selector().map(|s| s.cursor().current()),
        Some(Point2::new(60.0, 90.0))
    );
}

// ---- Squads ----

#[test]
fn test_squad_order_deduplicated() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    let (_, first) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    let (_, second) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(group_attacks(&first), 1);
    assert_eq!(group_attacks(&second), 0);

    let order = &first[0];
    assert_eq!(order.units, vec![UnitTag(1), UnitTag(2)]);
    assert_eq!(order.target.as_point(), Some(Point2::new(100.0, 100.0)));
}

#[test]
fn test_squad_order_resent_when_target_moves() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

    // Past the early game with a visible structure: the target jumps.
    game.time = SimTime::from_secs(300.0);
    game.set_unit(enemy(20, UnitKind::Pylon, 80.0, 20.0));
    let (_, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(group_attacks(&sink), 1);
}

#[test]
fn test_issued_order_tolerance() {
    let a = IssuedOrder {
        intent: SquadIntent::Attack,
        ability: Ability::Attack,
        target: Point2::new(10.0, 10.0),
        tick: 1,
    };
    let near = IssuedOrder {
        target: Point2::new(10.5, 10.0),
        tick: 2,
        ..a
    };
    let retreat = IssuedOrder {
        intent: SquadIntent::Retreat,
        ability: Ability::Move,
        ..a
    };
    assert!(a.matches(&near, 1.0));
    assert!(!a.matches(&near, 0.1));
    assert!(!a.matches(&retreat, 1.0));

    let mut squad = Squad::new(SquadId(0), [UnitTag(1)]);
    assert!(squad.record_order(a, 1.0));
    assert!(!squad.record_order(near, 1.0));
    assert!(squad.record_order(retreat, 1.0));
}

#[test]
fn test_squads_split_by_distance() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
        own(3, UnitKind::Marine, 80.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2, 3], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.squads.len(), 2);
    let formed = report
        .events
        .iter()
        .filter(|e| matches!(e, TacticalEvent::SquadFormed { .. }))
        .count();
    assert_eq!(formed, 2);
}

#[test]
fn test_squad_dissolves_when_members_leave_force() {
    let game = MockGame::new(vec![own(1, UnitKind::Marine, 0.0, 0.0)]);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(engine.squads().len(), 1);

    roles.assign(UnitTag(1), UnitRole::Scouting);
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(engine.squads().is_empty());
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, TacticalEvent::SquadDissolved { .. })));
}

#[test]
fn test_newcomer_joins_new_squad_without_touching_old() {
    let mut game = MockGame::new(vec![own(1, UnitKind::Marine, 0.0, 0.0)]);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

    game.set_unit(own(2, UnitKind::Marine, 0.5, 0.0));
    roles.assign(UnitTag(2), UnitRole::Attacking);
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.squads.len(), 2);
    assert_eq!(report.squads[0].members, vec![UnitTag(1)]);
    assert_eq!(report.squads[1].members, vec![UnitTag(2)]);
}

#[test]
fn test_retreat_regroups_and_withdraws() {
    let mut units = vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 40.0, 40.0),
    ];
    // Enough roaches next to marine 1 to lose badly.
    for i in 0..6 {
        units.push(enemy(10 + i, UnitKind::Roach, 8.0, i as f32));
    }
    let game = MockGame::new(units);
    let config = TacticsConfig {
        formation_margin: 60.0,
        ..TacticsConfig::default()
    };
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(config);
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

    assert_eq!(report.squads.len(), 1);
    assert_eq!(report.squads[0].intent, Some(SquadIntent::Retreat));
    assert!(report.events.contains(&TacticalEvent::IntentChanged {
        squad: report.squads[0].squad_id,
        intent: SquadIntent::Retreat,
    }));

    // Marine 2 is inside the formation radius of the rally, so only the
    // engaged marine gets a group withdrawal; marine 2 paths on its own.
    let rally = Point2::new(10.0, 0.0).towards(Point2::new(100.0, 100.0), 5.0);
    let to_rally: Vec<&UnitCommand> = sink
        .iter()
        .filter(|c| c.ability == Ability::Move)
        .filter(|c| c.target.as_point().is_some_and(|p| p.is_near(rally, 1e-3)))
        .collect();
    assert_eq!(to_rally.len(), 1, "{sink:?}");
    assert_eq!(to_rally[0].units, vec![UnitTag(1)]);

    let own_path = sink
        .iter()
        .find(|c| c.units == vec![UnitTag(2)])
        .expect("marine 2 should path toward the rally");
    assert_eq!(own_path.ability, Ability::Move);
    let to = own_path.target.as_point().unwrap();
    assert!(to.distance(rally) < Point2::new(40.0, 40.0).distance(rally));
}

#[test]
fn test_opening_override_attacks_despite_marginal_loss() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        enemy(10, UnitKind::Marine, 5.0, 0.0),
    ]);
    game.override_active = true;
    game.supply_army = 7.0;
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let evaluator = FixedEvaluator(EngagementResult::LossMarginal);
    let (report, _) = run_tick(&mut engine, &game, &evaluator, &mut roles);
    assert_eq!(report.squads[0].intent, Some(SquadIntent::Attack));

    let mut engine = TacticsEngine::new(TacticsConfig::default());
    game.override_active = false;
    let (report, _) = run_tick(&mut engine, &game, &evaluator, &mut roles);
    assert_eq!(report.squads[0].intent, Some(SquadIntent::Retreat));
}

#[test]
fn test_burrowed_members_skip_group_orders() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Roach, 0.0, 0.0)
            .with_burrowed(true)
            .with_health(0.5)
            .with_ability(Ability::BurrowUp),
        own(2, UnitKind::Roach, 1.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let (_, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(group_attacks(&sink), 1);
    assert_eq!(sink[0].units, vec![UnitTag(2)]);
    assert!(sink.iter().all(|c| !c.units.contains(&UnitTag(1))));
}

proptest! {
    #[test]
    fn prop_squads_partition_force(
        positions in prop::collection::vec((0.0f32..200.0, 0.0f32..200.0), 1..24),
        joiners in prop::collection::vec((0.0f32..200.0, 0.0f32..200.0), 0..8),
    ) {
        let units: Vec<Unit> = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| own(i as u64 + 1, UnitKind::Zealot, x, y))
            .collect();
        let tags: Vec<u64> = (1..=positions.len() as u64).collect();
        let mut game = MockGame::new(units);
        let mut roles = roles_with(&tags, &[]);
        let mut engine = TacticsEngine::new(TacticsConfig::default());
        run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

        // Some leave, some join.
        let mut force: BTreeSet<UnitTag> = tags.iter().map(|t| UnitTag(*t)).collect();
        for t in tags.iter().step_by(3) {
            roles.assign(UnitTag(*t), UnitRole::Harassing);
            force.remove(&UnitTag(*t));
        }
        for (j, &(x, y)) in joiners.iter().enumerate() {
            let tag = 1000 + j as u64;
            game.set_unit(own(tag, UnitKind::Stalker, x, y));
            roles.assign(UnitTag(tag), UnitRole::Attacking);
            force.insert(UnitTag(tag));
        }
        let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

        let mut seen = BTreeSet::new();
        for squad in &report.squads {
            prop_assert!(!squad.members.is_empty());
            for tag in &squad.members {
                prop_assert!(seen.insert(*tag), "unit {:?} in two squads", tag);
            }
        }
        prop_assert_eq!(seen, force);
    }
}

// ---- Per-unit micro ----

#[test]
fn test_mine_burrows_on_sight_then_holds() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::WidowMine, 0.0, 0.0).with_ability(Ability::BurrowDown),
        enemy(10, UnitKind::Zergling, 10.0, 0.0),
    ]);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    // The mine is left out of its squad's order and burrows right away.
    let (_, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(group_attacks(&sink), 0, "{sink:?}");
    assert_eq!(sink.len(), 1, "{sink:?}");
    assert_eq!(sink[0].ability, Ability::BurrowDown);
    assert_eq!(sink[0].units, vec![UnitTag(1)]);
    assert_eq!(sink[0].target, CommandTarget::None);

    game.set_unit(
        own(1, UnitKind::WidowMine, 0.0, 0.0)
            .with_burrowed(true)
            .with_ability(Ability::BurrowUp),
    );
    let (_, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(sink.iter().all(|c| !c.units.contains(&UnitTag(1))), "{sink:?}");
}

#[test]
fn test_hurt_burrower_skips_group_order() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Roach, 0.0, 0.0)
            .with_health(0.2)
            .with_ability(Ability::BurrowDown),
        own(2, UnitKind::Roach, 1.0, 0.0),
        enemy(10, UnitKind::Marine, 6.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let evaluator = FixedEvaluator(EngagementResult::WinStrong);
    let (_, sink) = run_tick(&mut engine, &game, &evaluator, &mut roles);

    let burrow = sink
        .iter()
        .find(|c| c.ability == Ability::BurrowDown)
        .expect("hurt roach should burrow on the first tick");
    assert_eq!(burrow.units, vec![UnitTag(1)]);
    assert!(sink
        .iter()
        .filter(|c| c.ability == Ability::Attack)
        .all(|c| !c.units.contains(&UnitTag(1))));

    // The healthy roach still gets the squad's order.
    assert_eq!(group_attacks(&sink), 1);
    let group = sink
        .iter()
        .find(|c| c.ability == Ability::Attack)
        .expect("group attack");
    assert_eq!(group.units, vec![UnitTag(2)]);
}

#[test]
fn test_group_order_recipients_skip_micro() {
    let game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        own(2, UnitKind::Marine, 1.0, 0.0),
    ]);
    let mut roles = roles_with(&[1, 2], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    let (_, first) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(first.len(), 1);

    // Standing order unchanged: each unit now paths on its own.
    let (_, second) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(second.len(), 2);
    assert!(second.iter().all(|c| c.ability == Ability::Move && c.units.len() == 1));
}

#[test]
fn test_retreating_units_path_to_rally() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        enemy(10, UnitKind::Roach, 40.0, 40.0),
    ]);
    game.supply_army = 1.0;
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let evaluator = FixedEvaluator(EngagementResult::LossStrong);
    run_tick(&mut engine, &game, &evaluator, &mut roles);

    let (_, sink) = run_tick(&mut engine, &game, &evaluator, &mut roles);
    assert_eq!(sink.len(), 1);
    let rally = Point2::new(10.0, 0.0).towards(Point2::new(100.0, 100.0), 5.0);
    let to = sink[0].target.as_point().unwrap();
    assert!(to.distance(Point2::ZERO) <= OpenGrid::default().step + 1e-3);
    assert!(to.distance(rally) < rally.distance(Point2::ZERO));
}

#[test]
fn test_retreating_unit_keeps_withdrawing() {
    let mut game = MockGame::new(vec![
        own(1, UnitKind::Marine, 0.0, 0.0),
        enemy(10, UnitKind::Roach, 5.0, 0.0),
    ]);
    game.supply_army = 1.0;
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let evaluator = FixedEvaluator(EngagementResult::LossStrong);
    let rally = Point2::new(10.0, 0.0).towards(Point2::new(100.0, 100.0), 5.0);

    let (_, sink) = run_tick(&mut engine, &game, &evaluator, &mut roles);
    assert_eq!(sink.len(), 1, "{sink:?}");
    assert_eq!(sink[0].ability, Ability::Move);
    assert_eq!(sink[0].units, vec![UnitTag(1)]);
    assert!(sink[0].target.as_point().is_some_and(|p| p.is_near(rally, 1e-3)));

    // Standing retreat order is not resent; the unit falls back on its own
    // rather than turning on the roach in contact.
    for _ in 0..3 {
        let (report, sink) = run_tick(&mut engine, &game, &evaluator, &mut roles);
        assert_eq!(report.squads[0].intent, Some(SquadIntent::Retreat));
        assert!(
            sink.iter()
                .filter(|c| c.ability == Ability::Attack)
                .all(|c| !c.units.contains(&UnitTag(1))),
            "{sink:?}"
        );
        let own_move = sink
            .iter()
            .find(|c| c.units == vec![UnitTag(1)])
            .expect("marine should keep moving");
        assert_eq!(own_move.ability, Ability::Move);
        let to = own_move.target.as_point().unwrap();
        assert!(to.distance(rally) < rally.distance(Point2::ZERO));
    }
}

#[test]
fn test_custom_structure_priority() {
    static PYLONS_FIRST: &[UnitKind] = &[UnitKind::Pylon, UnitKind::PhotonCannon];
    let game = MockGame::new(vec![
        own(1, UnitKind::Stalker, 0.0, 0.0).with_shield(1.0),
        enemy(10, UnitKind::PhotonCannon, 3.0, 0.0),
        enemy(11, UnitKind::Pylon, 4.0, 0.0),
    ]);
    let mut roles = roles_with(&[1], &[]);
    let mut engine = TacticsEngine::new(TacticsConfig::default())
        .with_picker(TargetPicker::with_priority(PYLONS_FIRST));
    run_tick(&mut engine, &game, &FixedEvaluator(EngagementResult::WinStrong), &mut roles);
    let (_, sink) = run_tick(&mut engine, &game, &FixedEvaluator(EngagementResult::WinStrong), &mut roles);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].target, CommandTarget::Unit { tag: UnitTag(11) });
}

#[test]
fn test_one_command_per_unit_per_tick() {
    for scenario in ScenarioId::ALL {
        let mut skirmish = Skirmish::new(MatchConfig {
            scenario,
            ..Default::default()
        });
        for report in skirmish.run(400) {
            let mut seen = BTreeSet::new();
            for command in &report.commands {
                for tag in &command.units {
                    assert!(
                        seen.insert(*tag),
                        "unit {tag:?} commanded twice on tick {} in {scenario}",
                        report.time.tick
                    );
                }
            }
        }
    }
}

// ---- Defense ----

fn defense_game(threat_at: Option<Point2>) -> MockGame {
    let mut units = vec![
        own(1, UnitKind::Probe, 50.0, 50.0),
        own(2, UnitKind::Probe, 52.0, 50.0),
        own(3, UnitKind::Probe, 80.0, 80.0),
    ];
    if let Some(p) = threat_at {
        units.push(enemy(10, UnitKind::Zergling, p.x, p.y));
    }
    let mut game = MockGame::new(units);
    game.clusters = vec![ResourceCluster {
        id: ClusterId(0),
        center: Point2::new(50.0, 50.0),
        radius: 8.0,
    }];
    game
}

#[test]
fn test_defense_episode_lifecycle() {
    let mut roles = roles_with(&[], &[1, 2, 3]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());

    // Episode starts: nearby harvesters defend, one alert.
    let game = defense_game(Some(Point2::new(55.0, 50.0)));
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].level, AlertLevel::Warning);
    assert_eq!(report.defenders, vec![UnitTag(1), UnitTag(2)]);
    assert_eq!(roles.role_of(UnitTag(1)), Some(UnitRole::Defending));
    assert_eq!(roles.role_of(UnitTag(3)), Some(UnitRole::Gathering));
    assert_eq!(sink.len(), 2);
    assert!(sink
        .iter()
        .all(|c| c.target == CommandTarget::Unit { tag: UnitTag(10) }));

    // Same episode: no new alert, no repeated orders.
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(report.alerts.is_empty());
    assert!(sink.is_empty());

    // Clear: everyone released exactly once.
    let game = defense_game(None);
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(report.defenders.is_empty());
    assert!(report.events.contains(&TacticalEvent::ThreatCleared {
        cluster: ClusterId(0),
        released: 2,
    }));
    assert!(report.alerts.is_empty());
    assert_eq!(roles.role_of(UnitTag(1)), Some(UnitRole::Gathering));
    assert_eq!(roles.role_of(UnitTag(2)), Some(UnitRole::Gathering));

    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(report.events.is_empty());
    assert!(engine.episodes().is_empty());
}

#[test]
fn test_new_episode_alerts_again() {
    let mut roles = roles_with(&[], &[1, 2]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let raided = defense_game(Some(Point2::new(55.0, 50.0)));
    let quiet = defense_game(None);

    let alerts: usize = [&raided, &raided, &quiet, &raided]
        .into_iter()
        .map(|g| run_tick(&mut engine, g, &StrengthEvaluator, &mut roles).0.alerts.len())
        .sum();
    assert_eq!(alerts, 2);
}

#[test]
fn test_hurt_defender_withdraws_to_cluster_center() {
    let mut roles = roles_with(&[], &[1, 2]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let mut game = defense_game(Some(Point2::new(55.0, 50.0)));
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

    game.set_unit(own(2, UnitKind::Probe, 52.0, 50.0).with_health(0.1));
    let (_, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].units, vec![UnitTag(2)]);
    assert_eq!(sink[0].ability, Ability::Move);
    assert_eq!(sink[0].target.as_point(), Some(Point2::new(50.0, 50.0)));
}

#[test]
fn test_dead_defender_dropped_from_episode() {
    let mut roles = roles_with(&[], &[1, 2]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let mut game = defense_game(Some(Point2::new(55.0, 50.0)));
    run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);

    game.remove_unit(2);
    roles.forget(UnitTag(2));
    let (report, _) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert_eq!(report.defenders, vec![UnitTag(1)]);
}

#[test]
fn test_memory_enemies_do_not_trigger_defense() {
    let mut roles = roles_with(&[], &[1, 2]);
    let mut engine = TacticsEngine::new(TacticsConfig::default());
    let mut game = defense_game(None);
    game.set_unit(enemy(10, UnitKind::Zergling, 55.0, 50.0).with_memory(true));
    game.set_unit(enemy(11, UnitKind::Larva, 54.0, 50.0));
    let (report, sink) = run_tick(&mut engine, &game, &StrengthEvaluator, &mut roles);
    assert!(report.alerts.is_empty());
    assert!(sink.is_empty());
}

// ---- Role book ----

#[test]
fn test_role_book_release_restores_previous() {
    let mut roles = RoleBook::new();
    roles.assign(UnitTag(1), UnitRole::Gathering);
    roles.assign(UnitTag(1), UnitRole::Defending);
    assert_eq!(roles.members(UnitRole::Defending), vec![UnitTag(1)]);

    roles.release(UnitTag(1));
    assert_eq!(roles.role_of(UnitTag(1)), Some(UnitRole::Gathering));

    // Nothing left to restore.
    roles.release(UnitTag(1));
    assert_eq!(roles.role_of(UnitTag(1)), Some(UnitRole::Gathering));

    roles.forget(UnitTag(1));
    assert_eq!(roles.role_of(UnitTag(1)), None);
}

// ---- Arena ----

fn bare_arena() -> Arena {
    Arena::new(scenario::default_map(), Default::default())
}

#[test]
fn test_arena_tick_timing() {
    let mut arena = bare_arena();
    for _ in 0..224 {
        arena.step();
    }
    assert_eq!(arena.time().tick, 224);
    assert!((arena.time().elapsed_secs - 10.0).abs() < 1e-6);
}

#[test]
fn test_arena_move_order() {
    let mut arena = bare_arena();
    let tag = arena.spawn(UnitKind::Marine, Alliance::Own, Point2::ZERO);
    arena.apply_commands(&[UnitCommand::single(
        Ability::Move,
        tag,
        CommandTarget::point(Point2::new(3.0, 0.0)),
    )]);
    for _ in 0..60 {
        arena.step();
    }
    let unit = arena.unit(tag).unwrap();
    assert!(unit.position.is_near(Point2::new(3.0, 0.0), 0.11));
    assert!(arena.order_of(tag).is_none(), "move order should complete");
}

#[test]
fn test_arena_burrow_toggle_and_regen() {
    let mut arena = bare_arena();
    let tag = arena.spawn(UnitKind::Roach, Alliance::Own, Point2::ZERO);
    arena.update_unit(tag, |u| u.health = 0.2);
    arena.apply_commands(&[UnitCommand::single(
        Ability::BurrowDown,
        tag,
        CommandTarget::None,
    )]);

    let unit = arena.unit(tag).unwrap();
    assert!(unit.burrowed);
    assert!(unit.abilities.contains(Ability::BurrowUp));
    assert!(!unit.abilities.contains(Ability::BurrowDown));

    for _ in 0..224 {
        arena.step();
    }
    let unit = arena.unit(tag).unwrap();
    assert!((unit.health - 0.7).abs() < 0.01);
}

#[test]
fn test_arena_combat_kills_and_reports_dead() {
    let mut arena = bare_arena();
    let marine = arena.spawn(UnitKind::Marine, Alliance::Own, Point2::ZERO);
    let ling = arena.spawn(UnitKind::Zergling, Alliance::Enemy, Point2::new(3.0, 0.0));
    arena.apply_commands(&[UnitCommand::single(
        Ability::Attack,
        marine,
        CommandTarget::Unit { tag: ling },
    )]);

    let mut dead = Vec::new();
    for _ in 0..400 {
        dead.extend(arena.step());
    }
    assert!(dead.contains(&ling) || dead.contains(&marine));
    assert!(arena.unit(ling).is_none() || arena.unit(marine).is_none());
}

#[test]
fn test_arena_shields_absorb_first() {
    let mut arena = bare_arena();
    let stalker = arena.spawn(UnitKind::Stalker, Alliance::Own, Point2::ZERO);
    let marine = arena.spawn(UnitKind::Marine, Alliance::Enemy, Point2::new(4.0, 0.0));
    arena.set_order(
        marine,
        Order {
            ability: Ability::Attack,
            target: CommandTarget::Unit { tag: stalker },
        },
    );
    arena.step();
    let unit = arena.unit(stalker).unwrap();
    assert!(unit.shield < 1.0);
    assert_eq!(unit.health, 1.0);
}

#[test]
fn test_arena_spatial_filter_and_memory() {
    let mut arena = bare_arena();
    arena.spawn(UnitKind::Marine, Alliance::Own, Point2::ZERO);
    let ling = arena.spawn(UnitKind::Zergling, Alliance::Enemy, Point2::new(5.0, 0.0));
    let overseer = arena.spawn(UnitKind::Overseer, Alliance::Enemy, Point2::new(6.0, 0.0));
    let far = arena.spawn(UnitKind::Zergling, Alliance::Enemy, Point2::new(60.0, 0.0));

    let all = arena.query(&[Point2::ZERO], 10.0, QueryFilter::AllEnemy);
    assert_eq!(all, vec![vec![ling, overseer]]);
    let ground = arena.query(&[Point2::ZERO], 10.0, QueryFilter::EnemyGround);
    assert_eq!(ground, vec![vec![ling]]);

    let units = arena.units();
    let seen = |tag| units.iter().find(|u| u.tag == tag).map(|u| u.is_memory);
    assert_eq!(seen(ling), Some(false));
    assert_eq!(seen(far), Some(true));
    assert!(arena.is_visible(Point2::new(5.0, 5.0)));
    assert!(!arena.is_visible(Point2::new(60.0, 0.0)));
}

#[test]
fn test_arena_supply_accounting() {
    let (arena, _) = scenario::build(ScenarioId::Standoff, 7);
    // 4 stalkers + 4 zealots at 2 supply each; 8 probes at 1.
    assert_eq!(arena.supply_army(), 16.0);
    assert_eq!(arena.supply_left(), 60.0 - 24.0);
}

// ---- Scenarios ----

#[test]
fn test_scenario_from_str() {
    assert_eq!("raid".parse::<ScenarioId>(), Ok(ScenarioId::Raid));
    assert_eq!("MineField".parse::<ScenarioId>(), Ok(ScenarioId::Minefield));
    assert!("ladder".parse::<ScenarioId>().is_err());
}

#[test]
fn test_scenario_roles_assigned() {
    let (_, roles) = scenario::build(ScenarioId::Minefield, 1);
    assert_eq!(roles.members(UnitRole::Attacking).len(), 9);
    assert_eq!(roles.members(UnitRole::Gathering).len(), 8);
}

#[test]
fn test_raid_alerts_are_edge_triggered() {
    let mut skirmish = Skirmish::new(MatchConfig {
        scenario: ScenarioId::Raid,
        ..Default::default()
    });
    let reports = skirmish.run(900);

    let detected = reports
        .iter()
        .flat_map(|r| &r.events)
        .filter(|e| matches!(e, TacticalEvent::ThreatDetected { .. }))
        .count();
    let alerts: usize = reports.iter().map(|r| r.alerts.len()).sum();
    assert!(detected >= 1, "zerglings should reach the main");
    assert_eq!(alerts, detected);
    assert!(reports.iter().any(|r| !r.defenders.is_empty()));
}
