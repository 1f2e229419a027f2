//! skirmish-runner: play a scenario headlessly and print what the engine did.
//!
//! Usage:
//!   skirmish-runner --scenario raid --ticks 900
//!   skirmish-runner --config tactics.toml --seed 7 --json > reports.jsonl

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use skirmish_core::config::TacticsConfig;
use skirmish_core::enums::Alliance;
use skirmish_core::error::Result;
use skirmish_core::events::TacticalEvent;
use skirmish_engine::collaborators::GameView;
use skirmish_engine::scenario::ScenarioId;
use skirmish_engine::{MatchConfig, Skirmish};

/// Headless skirmish runner
#[derive(Parser, Debug)]
#[command(name = "skirmish-runner")]
#[command(about = "Run the tactical engine against a scripted scenario")]
struct Args {
    /// TOML file overriding any subset of the tactics config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for unit placement
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Scenario to play: standoff, raid or minefield
    #[arg(long, default_value = "standoff")]
    scenario: ScenarioId,

    /// Number of game loops to run
    #[arg(long, default_value_t = 2240)]
    ticks: u64,

    /// Print every tick report as one JSON line instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skirmish_engine=info,skirmish_tactics=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let tactics = match &args.config {
        Some(path) => TacticsConfig::load_from_toml(path)?,
        None => TacticsConfig::default(),
    };
    tracing::info!(scenario = %args.scenario, seed = args.seed, ticks = args.ticks, "starting");

    let mut skirmish = Skirmish::new(MatchConfig {
        seed: args.seed,
        scenario: args.scenario,
        tactics,
    });

    let mut commands = 0usize;
    let mut alerts = Vec::new();
    let mut target_changes = 0usize;
    let mut last_squads = 0usize;

    for _ in 0..args.ticks {
        let report = skirmish.step();
        if args.json {
            println!("{}", serde_json::to_string(&report)?);
            continue;
        }
        commands += report.commands.len();
        target_changes += report
            .events
            .iter()
            .filter(|e| matches!(e, TacticalEvent::AttackTargetChanged { .. }))
            .count();
        last_squads = report.squads.len();
        alerts.extend(report.alerts);
    }

    if args.json {
        return Ok(());
    }

    let units = skirmish.arena().units();
    let own = units.iter().filter(|u| u.alliance == Alliance::Own).count();
    let enemy = units.len() - own;
    let time = skirmish.arena().time();

    println!("=== {} (seed {}) ===", args.scenario, args.seed);
    println!("Game time:       {:.1}s ({} loops)", time.elapsed_secs, time.tick);
    println!("Commands sent:   {commands}");
    println!("Target changes:  {target_changes}");
    println!("Squads at end:   {last_squads}");
    println!("Units left:      {own} own, {enemy} enemy");
    println!("Alerts:          {}", alerts.len());
    for alert in &alerts {
        println!("  [{:>6}] {:?}: {}", alert.tick, alert.level, alert.message);
    }
    Ok(())
}
