//! Headless match harness: engine + arena + reference collaborators.
//!
//! Each `step` runs one engine decision pass against the arena, feeds the
//! commands back in and advances the arena one tick.

use skirmish_core::config::TacticsConfig;
use skirmish_core::state::TickReport;
use skirmish_tactics::engagement::StrengthEvaluator;
use skirmish_tactics::grid::OpenGrid;
use skirmish_tactics::targeting::LethalityScorer;

use crate::arena::Arena;
use crate::collaborators::TickInputs;
use crate::engine::TacticsEngine;
use crate::roles::RoleBook;
use crate::scenario::{self, ScenarioId};

/// Configuration for a headless run.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// RNG seed for determinism. Same seed = same match.
    pub seed: u64,
    pub scenario: ScenarioId,
    pub tactics: TacticsConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: ScenarioId::default(),
            tactics: TacticsConfig::default(),
        }
    }
}

pub struct Skirmish {
    arena: Arena,
    roles: RoleBook,
    engine: TacticsEngine,
    grid: OpenGrid,
    evaluator: StrengthEvaluator,
    scorer: LethalityScorer,
}

impl Skirmish {
    pub fn new(config: MatchConfig) -> Self {
        let (arena, roles) = scenario::build(config.scenario, config.seed);
        Self::from_parts(arena, roles, TacticsEngine::new(config.tactics))
    }

    /// Assemble a harness around a hand-built arena.
    pub fn from_parts(arena: Arena, roles: RoleBook, engine: TacticsEngine) -> Self {
        Self {
            arena,
            roles,
            engine,
            grid: OpenGrid::default(),
            evaluator: StrengthEvaluator,
            scorer: LethalityScorer,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn roles(&self) -> &RoleBook {
        &self.roles
    }

    pub fn engine(&self) -> &TacticsEngine {
        &self.engine
    }

    /// Decide, apply, advance.
    pub fn step(&mut self) -> TickReport {
        let mut commands = Vec::new();
        let inputs = TickInputs {
            game: &self.arena,
            spatial: &self.arena,
            grid: &self.grid,
            build_order: &self.arena,
            evaluator: &self.evaluator,
            scorer: &self.scorer,
        };
        let report = self.engine.tick(&inputs, &mut self.roles, &mut commands);

        self.arena.apply_commands(&commands);
        for tag in self.arena.step() {
            self.roles.forget(tag);
        }
        report
    }

    /// Run `ticks` steps and collect every report.
    pub fn run(&mut self, ticks: u64) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step()).collect()
    }
}
