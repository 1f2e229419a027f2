//! Fundamental geometric and simulation types.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D map position in game units. x = East, y = North.
pub type Point2 = Vec2;

/// Stable identifier of a unit, assigned by the host simulation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitTag(pub u64);

/// Engine-assigned squad identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SquadId(pub u32);

/// Identifier of an owned resource cluster (mining base).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ClusterId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current game loop (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed game time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Time at a given game loop.
    pub fn from_tick(tick: u64) -> Self {
        Self {
            tick,
            elapsed_secs: tick as f64 / crate::constants::TICK_RATE,
        }
    }

    /// Time at a given number of game seconds (rounded down to a whole loop).
    pub fn from_secs(secs: f64) -> Self {
        Self {
            tick: (secs * crate::constants::TICK_RATE) as u64,
            elapsed_secs: secs,
        }
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs += self.dt();
    }
}

/// Point helpers used by the decision code.
pub trait PointExt {
    /// Point `distance` units from `self` in the direction of `target`.
    /// A negative distance moves away from the target.
    fn towards(self, target: Point2, distance: f32) -> Point2;

    /// True if the two points are within `tolerance` of each other.
    fn is_near(self, other: Point2, tolerance: f32) -> bool;
}

impl PointExt for Point2 {
    fn towards(self, target: Point2, distance: f32) -> Point2 {
        let delta = target - self;
        let length = delta.length();
        if length <= f32::EPSILON {
            return self;
        }
        self + delta / length * distance
    }

    fn is_near(self, other: Point2, tolerance: f32) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}

/// Arithmetic mean of a set of points, `None` when empty.
pub fn centroid<I>(points: I) -> Option<Point2>
where
    I: IntoIterator<Item = Point2>,
{
    let mut sum = Vec2::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f32)
}
