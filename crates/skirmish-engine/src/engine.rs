//! Tactical engine: one full decision pass per game tick.
//!
//! `TacticsEngine` owns the state carried across ticks (squads, the
//! expansion cursor, defense episodes) and reads everything else from the
//! collaborators handed to `tick`. Completely headless: it never talks to
//! a game client directly, which keeps it deterministic and testable.

use std::collections::BTreeMap;

use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::UnitRole;
use skirmish_core::events::TacticalEvent;
use skirmish_core::state::TickReport;
use skirmish_core::types::{ClusterId, Point2, PointExt, SquadId, UnitTag};
use skirmish_core::unit::Unit;
use skirmish_tactics::engagement::AttackContext;
use skirmish_tactics::targeting::{AttackTargetSelector, TargetPicker};

use crate::collaborators::{CommandSink, RoleRegistry, TickInputs};
use crate::spatial::{NeighborBatch, UnitIndex};
use crate::squad::{DefenseEpisode, Squad};
use crate::systems;
use crate::systems::micro::MicroContext;
use crate::systems::squads::SquadTickContext;
use crate::systems::TickOutput;

/// The tactical engine. Owns all decision state carried across ticks.
pub struct TacticsEngine {
    config: TacticsConfig,
    picker: TargetPicker,
    /// Created on the first tick, once the map is known.
    selector: Option<AttackTargetSelector>,
    last_attack_target: Option<Point2>,
    squads: BTreeMap<SquadId, Squad>,
    next_squad_id: u32,
    episodes: BTreeMap<ClusterId, DefenseEpisode>,
}

impl TacticsEngine {
    pub fn new(config: TacticsConfig) -> Self {
        Self {
            config,
            picker: TargetPicker::default(),
            selector: None,
            last_attack_target: None,
            squads: BTreeMap::new(),
            next_squad_id: 0,
            episodes: BTreeMap::new(),
        }
    }

    /// Replace the per-unit target picker.
    pub fn with_picker(mut self, picker: TargetPicker) -> Self {
        self.picker = picker;
        self
    }

    pub fn config(&self) -> &TacticsConfig {
        &self.config
    }

    pub fn squads(&self) -> &BTreeMap<SquadId, Squad> {
        &self.squads
    }

    pub fn episodes(&self) -> &BTreeMap<ClusterId, DefenseEpisode> {
        &self.episodes
    }

    pub fn selector(&self) -> Option<&AttackTargetSelector> {
        self.selector.as_ref()
    }

    /// Run one decision pass. Commands go to `sink`; the report repeats
    /// them alongside the tick's events and alerts.
    pub fn tick(
        &mut self,
        inputs: &TickInputs<'_>,
        roles: &mut dyn RoleRegistry,
        sink: &mut dyn CommandSink,
    ) -> TickReport {
        let game = inputs.game;
        let time = game.time();
        let units = UnitIndex::new(game.units());
        let clusters = game.resource_clusters();
        let build_order_complete = inputs.build_order.build_order_complete();
        let mut out = TickOutput::new(sink, time.tick);

        // 1. Force
        let force = self.collect_force(roles, &units);
        let force_units = units.own_units(&force);

        // 2. Macro attack target
        let target = if force.is_empty() {
            None
        } else {
            Some(self.macro_target(inputs, &units, time.elapsed_secs, &mut out))
        };

        // 3. Neighbor batch, shared read-only from here on
        let batch = NeighborBatch::build(
            inputs.spatial,
            &force_units,
            target,
            &clusters,
            self.config.batch_query_radius(),
        );

        // 4. Defense
        systems::defense::run(
            &mut self.episodes,
            &clusters,
            &batch,
            &units,
            roles,
            &self.config,
            time.tick,
            &mut out,
        );

        // 5. Squads, then 6. per-unit micro
        if let Some(target) = target {
            let rally = game
                .own_natural()
                .towards(target, self.config.rally_offset);
            let squad_ctx = SquadTickContext {
                units: &units,
                batch: &batch,
                config: &self.config,
                evaluator: inputs.evaluator,
                attack: AttackContext {
                    opening_override_active: inputs.build_order.opening_override_active(),
                    own_supply: game.supply_army(),
                    supply_left: game.supply_left(),
                    override_supply_threshold: self.config.override_supply_threshold,
                },
                target,
                rally,
                tick: time.tick,
            };
            systems::squads::run(
                &mut self.squads,
                &mut self.next_squad_id,
                &force,
                &squad_ctx,
                &mut out,
            );

            let micro_ctx = MicroContext {
                units: &units,
                batch: &batch,
                config: &self.config,
                grid: inputs.grid,
                scorer: inputs.scorer,
                picker: &self.picker,
                target,
                rally,
            };
            systems::micro::run(&force, &self.squads, &micro_ctx, &mut out);
        } else {
            systems::squads::reconcile(&mut self.squads, &force, &mut out);
        }

        // 7. Report
        let defenders: Vec<UnitTag> = self
            .episodes
            .values()
            .flat_map(|e| e.defenders.keys().copied())
            .collect();
        tracing::debug!(
            tick = time.tick,
            force = force.len(),
            build_order_complete,
            squads = self.squads.len(),
            commands = out.commands.len(),
            "tick complete"
        );

        TickReport {
            time,
            attack_target: target.map(|p| (p.x, p.y)),
            build_order_complete,
            commands: out.commands,
            alerts: out.alerts,
            events: out.events,
            squads: self.squads.values().map(Squad::view).collect(),
            defenders,
        }
    }

    /// Attacking-role members present in the snapshot as own units.
    fn collect_force(&self, roles: &dyn RoleRegistry, units: &UnitIndex) -> Vec<UnitTag> {
        let mut force: Vec<UnitTag> = roles
            .members(UnitRole::Attacking)
            .into_iter()
            .filter(|tag| match units.get(*tag) {
                Some(unit) if !unit.is_enemy() => true,
                _ => {
                    tracing::warn!(unit = tag.0, "attacking role member missing from snapshot");
                    false
                }
            })
            .collect();
        force.sort();
        force.dedup();
        force
    }

    fn macro_target(
        &mut self,
        inputs: &TickInputs<'_>,
        units: &UnitIndex,
        time_secs: f64,
        out: &mut TickOutput<'_>,
    ) -> Point2 {
        let game = inputs.game;
        let early_game_secs = self.config.early_game_secs;
        let selector = self.selector.get_or_insert_with(|| {
            AttackTargetSelector::new(
                game.enemy_start_location(),
                game.expansion_locations(),
                early_game_secs,
            )
        });

        let enemies: Vec<&Unit> = units.enemies();
        let target = selector
            .attack_target(time_secs, &enemies, |p| game.is_visible(p))
            .position;

        if self.last_attack_target != Some(target) {
            tracing::info!(x = target.x, y = target.y, "attack target changed");
            out.event(TacticalEvent::attack_target_changed(target));
            self.last_attack_target = Some(target);
        }
        target
    }
}
