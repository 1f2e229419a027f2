//! Decision systems run by the engine each tick.
//!
//! Systems are plain functions over the tick's snapshot and the engine's
//! carried state. They write commands, events and alerts into a shared
//! `TickOutput`.

pub mod defense;
pub mod micro;
pub mod squads;

use std::collections::BTreeSet;

use skirmish_core::commands::UnitCommand;
use skirmish_core::enums::AlertLevel;
use skirmish_core::events::{Alert, TacticalEvent};
use skirmish_core::types::UnitTag;

use crate::collaborators::CommandSink;

/// Everything emitted during one tick.
pub struct TickOutput<'a> {
    sink: &'a mut dyn CommandSink,
    tick: u64,
    pub commands: Vec<UnitCommand>,
    pub events: Vec<TacticalEvent>,
    pub alerts: Vec<Alert>,
    commanded: BTreeSet<UnitTag>,
}

impl<'a> TickOutput<'a> {
    pub fn new(sink: &'a mut dyn CommandSink, tick: u64) -> Self {
        Self {
            sink,
            tick,
            commands: Vec::new(),
            events: Vec::new(),
            alerts: Vec::new(),
            commanded: BTreeSet::new(),
        }
    }

    /// Send a command and remember who received it.
    pub fn command(&mut self, command: UnitCommand) {
        self.commanded.extend(command.units.iter().copied());
        self.commands.push(command.clone());
        self.sink.send(command);
    }

    /// Whether `tag` already received a command this tick.
    pub fn was_commanded(&self, tag: UnitTag) -> bool {
        self.commanded.contains(&tag)
    }

    pub fn event(&mut self, event: TacticalEvent) {
        self.events.push(event);
    }

    pub fn alert(&mut self, level: AlertLevel, message: impl Into<String>) {
        self.alerts.push(Alert {
            level,
            message: message.into(),
            tick: self.tick,
        });
    }
}
