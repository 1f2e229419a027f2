//! Events emitted by the engine for operators and observers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{ClusterId, Point2, SquadId};

/// Tactical state changes worth surfacing outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TacticalEvent {
    /// Unclustered force members were grouped into a new squad.
    SquadFormed { squad: SquadId, size: usize },
    /// All members of a squad left the force.
    SquadDissolved { squad: SquadId },
    /// A squad switched between attacking and retreating.
    IntentChanged { squad: SquadId, intent: SquadIntent },
    /// Enemies appeared near an owned resource cluster.
    ThreatDetected { cluster: ClusterId, threats: usize },
    /// The threat episode at a resource cluster ended.
    ThreatCleared {
        cluster: ClusterId,
        released: usize,
    },
    /// The macro attack target moved.
    AttackTargetChanged { x: f32, y: f32 },
}

impl TacticalEvent {
    pub fn attack_target_changed(p: Point2) -> Self {
        TacticalEvent::AttackTargetChanged { x: p.x, y: p.y }
    }
}

/// Alert for the operator alert queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}
